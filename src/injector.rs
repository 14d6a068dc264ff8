//! Head injection
//!
//! The host may invoke its extension points several times while rendering a
//! page. [`Injector`] makes sure the tracking snippets land in the head
//! buffer once.

use tracing::{debug, info};

use crate::dimension::DimensionRegistry;
use crate::models::{AnalyticsConfig, RequestContext};
use crate::tracking::{engine_for, Diagnostics};

/// Append-only sink for HTML destined for the page head.
pub trait HeadSink {
    fn append(&mut self, html: &str);
}

impl HeadSink for String {
    fn append(&mut self, html: &str) {
        self.push_str(html);
    }
}

#[derive(Debug, Default, Clone)]
pub struct HeadBuffer {
    html: String,
}

impl HeadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl HeadSink for HeadBuffer {
    fn append(&mut self, html: &str) {
        self.html.push_str(html);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    #[default]
    NotInjected,
    Injected,
}

pub struct Injector<'r> {
    registry: &'r DimensionRegistry,
    state: InjectionState,
}

impl<'r> Injector<'r> {
    pub fn new(registry: &'r DimensionRegistry) -> Self {
        Self {
            registry,
            state: InjectionState::NotInjected,
        }
    }

    pub fn state(&self) -> InjectionState {
        self.state
    }

    /// Append the snippet of every enabled record to `head`.
    ///
    /// Only the first call does anything; later calls return 0 until
    /// [`reset`](Self::reset). Returns the number of snippets appended.
    /// A record whose type maps to no engine is reported to `diagnostics`
    /// and skipped; the records after it still render.
    pub fn inject(
        &mut self,
        records: &[AnalyticsConfig],
        ctx: &RequestContext,
        head: &mut dyn HeadSink,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        if self.state == InjectionState::Injected {
            debug!("Tracking code already injected, skipping");
            return 0;
        }
        self.state = InjectionState::Injected;

        let mut injected = 0;
        for settings in records.iter().filter(|settings| settings.enabled) {
            let vendor = match settings.vendor_type() {
                Ok(vendor) => vendor,
                Err(_) => {
                    diagnostics.record(format!(
                        "Analytics setting '{}' doesn't map to a tracking engine.",
                        settings.vendor
                    ));
                    continue;
                }
            };

            if engine_for(vendor).insert_tracking(settings, ctx, self.registry, head, diagnostics) {
                injected += 1;
            }
        }

        info!(injected, "Tracking code injection finished");
        injected
    }

    /// Forget a previous injection. Meant for test isolation.
    pub fn reset(&mut self) {
        self.state = InjectionState::NotInjected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::registry;
    use crate::models::UserInfo;

    fn piwik() -> AnalyticsConfig {
        AnalyticsConfig {
            id: Some(1),
            site_url: Some("somewhere".to_string()),
            site_id: "2468".to_string(),
            track_admin: true,
            ..AnalyticsConfig::default()
        }
    }

    fn admin() -> RequestContext {
        RequestContext {
            user: UserInfo {
                id: 2,
                full_name: "Admin User".to_string(),
                is_site_admin: true,
                ..UserInfo::default()
            },
            ..RequestContext::default()
        }
    }

    #[test]
    fn test_inject_once_appends_code() {
        let mut injector = Injector::new(registry());
        let mut head = HeadBuffer::new();
        let mut diagnostics = Diagnostics::new();

        let count = injector.inject(&[piwik()], &admin(), &mut head, &mut diagnostics);

        assert_eq!(count, 1);
        assert!(head.as_str().contains("<!-- Start Piwik Code -->"));
        assert_eq!(injector.state(), InjectionState::Injected);
    }

    #[test]
    fn test_inject_twice_does_not_reinject() {
        let mut injector = Injector::new(registry());
        let mut head = String::new();
        let mut diagnostics = Diagnostics::new();

        injector.inject(&[piwik()], &admin(), &mut head, &mut diagnostics);
        head = "Already injected.".to_string();
        let count = injector.inject(&[piwik()], &admin(), &mut head, &mut diagnostics);

        assert_eq!(count, 0);
        assert_eq!(head, "Already injected.");
    }

    #[test]
    fn test_reset_allows_another_injection() {
        let mut injector = Injector::new(registry());
        let mut head = HeadBuffer::new();
        let mut diagnostics = Diagnostics::new();

        injector.inject(&[piwik()], &admin(), &mut head, &mut diagnostics);
        injector.reset();
        assert_eq!(injector.state(), InjectionState::NotInjected);

        let count = injector.inject(&[piwik()], &admin(), &mut head, &mut diagnostics);
        assert_eq!(count, 1);
        assert_eq!(head.as_str().matches("<!-- Start Piwik Code -->").count(), 2);
    }

    #[test]
    fn test_disabled_record_produces_no_output() {
        let mut injector = Injector::new(registry());
        let mut head = HeadBuffer::new();
        let mut diagnostics = Diagnostics::new();
        let disabled = AnalyticsConfig {
            enabled: false,
            ..piwik()
        };

        assert_eq!(injector.inject(&[disabled], &admin(), &mut head, &mut diagnostics), 0);
        assert!(head.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_vendor_is_diagnosed_and_skipped() {
        let mut injector = Injector::new(registry());
        let mut head = HeadBuffer::new();
        let mut diagnostics = Diagnostics::new();
        let bogus = AnalyticsConfig {
            vendor: "i_am_bogus".to_string(),
            ..piwik()
        };

        let count = injector.inject(&[bogus, piwik()], &admin(), &mut head, &mut diagnostics);

        assert_eq!(count, 1);
        assert_eq!(
            diagnostics.messages(),
            &["Analytics setting 'i_am_bogus' doesn't map to a tracking engine.".to_string()]
        );
    }

    #[test]
    fn test_untracked_admin_still_marks_injected() {
        let mut injector = Injector::new(registry());
        let mut head = HeadBuffer::new();
        let mut diagnostics = Diagnostics::new();
        let no_admins = AnalyticsConfig {
            track_admin: false,
            ..piwik()
        };

        assert_eq!(injector.inject(&[no_admins], &admin(), &mut head, &mut diagnostics), 0);
        assert!(head.is_empty());
        assert_eq!(injector.state(), InjectionState::Injected);
    }
}
