//! Vendor tracking engines
//!
//! One engine per supported vendor. Each engine turns a settings record and
//! the request context into the HTML fragment appended to the page head.

pub mod ganalytics;
pub mod guniversal;
pub mod piwik;

pub use ganalytics::GoogleAnalytics;
pub use guniversal::GoogleUniversal;
pub use piwik::Piwik;

use tracing::debug;

use super::Diagnostics;
use crate::dimension::DimensionRegistry;
use crate::injector::HeadSink;
use crate::models::{AnalyticsConfig, RequestContext, VendorType};

pub trait TrackingEngine: Send + Sync {
    fn vendor(&self) -> VendorType;

    /// The full HTML fragment for this request, or `None` when the settings
    /// do not allow a snippet to be built.
    fn snippet(
        &self,
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        registry: &DimensionRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Option<String>;

    /// Append the snippet to the page head if this request is tracked.
    ///
    /// Returns whether anything was appended.
    fn insert_tracking(
        &self,
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        registry: &DimensionRegistry,
        head: &mut dyn HeadSink,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        if !should_track(settings, ctx) {
            debug!(
                vendor = self.vendor().as_str(),
                user_id = ctx.user.id,
                "Not tracking site administrator"
            );
            return false;
        }

        match self.snippet(settings, ctx, registry, diagnostics) {
            Some(html) => {
                head.append(&html);
                true
            }
            None => false,
        }
    }
}

pub fn engine_for(vendor: VendorType) -> &'static dyn TrackingEngine {
    match vendor {
        VendorType::Piwik => &Piwik,
        VendorType::Ganalytics => &GoogleAnalytics,
        VendorType::Guniversal => &GoogleUniversal,
    }
}

/// Site administrators are only tracked when the settings ask for it.
pub fn should_track(settings: &AnalyticsConfig, ctx: &RequestContext) -> bool {
    !ctx.user.is_site_admin || settings.track_admin
}

/// The name to record for the user, resolving masquerading sessions to the
/// real user when masquerade handling is enabled.
pub fn user_full_name(settings: &AnalyticsConfig, ctx: &RequestContext) -> String {
    let user = match &ctx.real_user {
        Some(real_user) if settings.masquerade_handling => real_user,
        _ => &ctx.user,
    };
    user.full_name.clone()
}

/// Indent every non-empty line of a script body.
pub(crate) fn indent(body: &str, prefix: &str) -> String {
    body.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{prefix}{line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInfo;

    fn ctx(is_site_admin: bool) -> RequestContext {
        RequestContext {
            user: UserInfo {
                id: 2,
                full_name: "Admin User".to_string(),
                is_site_admin,
                ..UserInfo::default()
            },
            ..RequestContext::default()
        }
    }

    #[test]
    fn test_should_track_truth_table() {
        for (is_admin, track_admin, expected) in [
            (true, true, true),
            (true, false, false),
            (false, true, true),
            (false, false, true),
        ] {
            let settings = AnalyticsConfig {
                track_admin,
                ..AnalyticsConfig::default()
            };
            assert_eq!(
                should_track(&settings, &ctx(is_admin)),
                expected,
                "admin={is_admin} track_admin={track_admin}"
            );
        }
    }

    #[test]
    fn test_user_full_name_without_masquerade() {
        let settings = AnalyticsConfig::default();
        assert_eq!(user_full_name(&settings, &ctx(true)), "Admin User");
    }

    #[test]
    fn test_user_full_name_while_masquerading() {
        let mut masquerading = ctx(false);
        masquerading.real_user = Some(masquerading.user.clone());
        masquerading.user = UserInfo {
            id: 1,
            full_name: "Guest user  ".to_string(),
            ..UserInfo::default()
        };

        let mut settings = AnalyticsConfig::default();
        assert_eq!(user_full_name(&settings, &masquerading), "Admin User");

        settings.masquerade_handling = false;
        assert_eq!(user_full_name(&settings, &masquerading), "Guest user  ");
    }

    #[test]
    fn test_engine_lookup_matches_vendor() {
        for vendor in [
            VendorType::Piwik,
            VendorType::Ganalytics,
            VendorType::Guniversal,
        ] {
            assert_eq!(engine_for(vendor).vendor(), vendor);
        }
    }

    #[test]
    fn test_untracked_admin_gets_nothing_appended() {
        let settings = AnalyticsConfig {
            site_url: Some("somewhere".to_string()),
            ..AnalyticsConfig::default()
        };
        let mut head = String::new();
        let mut diagnostics = Diagnostics::new();

        let appended = Piwik.insert_tracking(
            &settings,
            &ctx(true),
            crate::dimension::registry(),
            &mut head,
            &mut diagnostics,
        );

        assert!(!appended);
        assert!(head.is_empty());
    }

    #[test]
    fn test_indent_keeps_blank_lines() {
        assert_eq!(indent("a\n\nb", "  "), "  a\n\n  b\n");
    }
}
