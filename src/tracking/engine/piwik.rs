//! Piwik / Matomo tracker.

use super::{indent, user_full_name, TrackingEngine};
use crate::dimension::user::UserRole;
use crate::dimension::DimensionRegistry;
use crate::models::{AnalyticsConfig, RequestContext, Scope, VendorType};
use crate::tracking::render::{
    custom_variable_call, js_single_quoted, render_action_scope, render_visit_scope,
};
use crate::tracking::resolver::resolve_scope;
use crate::tracking::track_url::track_url;
use crate::tracking::Diagnostics;

#[derive(Debug, Default, Clone, Copy)]
pub struct Piwik;

impl Piwik {
    /// The four legacy custom variables, indices 1 to 4.
    pub fn custom_variables(settings: &AnalyticsConfig, ctx: &RequestContext) -> String {
        [
            ("UserName", user_full_name(settings, ctx)),
            ("UserRole", UserRole::describe(ctx)),
            ("Context", ctx.course.context_name.clone()),
            ("CourseName", ctx.course.full_name.clone()),
        ]
        .iter()
        .zip(1u8..)
        .map(|((name, value), index)| custom_variable_call(index, name, value))
        .collect()
    }

    /// Action scope calls followed by the visit scope page view.
    pub fn custom_dimensions(
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        registry: &DimensionRegistry,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let mut rendered = String::new();

        for scope in registry.scopes() {
            let bindings = settings.bindings(scope);
            if bindings.is_empty() {
                continue;
            }

            let dimensions = resolve_scope(registry, scope, bindings, ctx, settings, diagnostics);
            match scope {
                Scope::Action => rendered.push_str(&render_action_scope(&dimensions)),
                Scope::Visit => {
                    rendered.push_str(&render_visit_scope(&track_url(ctx, false, false), &dimensions))
                }
            }
        }

        rendered
    }

    /// Dimensions when enabled, the fixed custom variables otherwise.
    pub fn variables(
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        registry: &DimensionRegistry,
        diagnostics: &mut Diagnostics,
    ) -> String {
        if settings.use_dimensions {
            Self::custom_dimensions(settings, ctx, registry, diagnostics)
        } else {
            Self::custom_variables(settings, ctx)
        }
    }
}

impl TrackingEngine for Piwik {
    fn vendor(&self) -> VendorType {
        VendorType::Piwik
    }

    fn snippet(
        &self,
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        registry: &DimensionRegistry,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let site_url = settings
            .site_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())?;
        let site_url = js_single_quoted(site_url);
        let site_id = settings.site_id.trim();

        let mut script = String::from("var _paq = _paq || [];\n");

        if settings.clean_url {
            script.push_str(&format!(
                "_paq.push(['setDocumentTitle', '{}']);\n",
                js_single_quoted(&track_url(ctx, false, false))
            ));
        }

        script.push_str(&Self::variables(settings, ctx, registry, diagnostics));
        script.push_str(&format!("_paq.push(['setUserId', {}]);\n", ctx.user.id));
        script.push_str("_paq.push(['trackPageView']);\n");
        script.push_str("_paq.push(['enableLinkTracking']);\n");
        script.push_str("_paq.push(['enableHeartBeatTimer', 30]);\n");
        script.push_str("(function() {\n");
        script.push_str(&format!("  var u='//{site_url}/';\n"));
        script.push_str("  _paq.push(['setTrackerUrl', u+'piwik.php']);\n");
        script.push_str(&format!("  _paq.push(['setSiteId', {site_id}]);\n"));
        script.push_str(
            "  var d=document, g=d.createElement('script'), s=d.getElementsByTagName('script')[0];\n",
        );
        script.push_str(
            "  g.type='text/javascript'; g.async=true; g.defer=true; g.src=u+'piwik.js'; s.parentNode.insertBefore(g,s);\n",
        );
        script.push_str("})();\n");

        let noscript = if settings.image_track {
            format!(
                "<noscript><p><img src=\"//{site_url}/piwik.php?idsite={site_id}\" style=\"border:0;\" alt=\"\" /></p></noscript>\n"
            )
        } else {
            String::new()
        };

        Some(format!(
            "\n<!-- Start Piwik Code -->\n<script type='text/javascript'>\n{}</script>\n{}<!-- End Piwik Code -->\n",
            indent(&script, "    "),
            noscript
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::registry;
    use crate::models::{CourseInfo, DimensionBinding, UserInfo};

    fn foo_bar(is_site_admin: bool) -> RequestContext {
        RequestContext {
            user: UserInfo {
                id: 2,
                full_name: "Foo Bar".to_string(),
                is_site_admin,
                ..UserInfo::default()
            },
            course: CourseInfo {
                id: 1,
                full_name: "PHPUnit test site".to_string(),
                context_name: "Front page".to_string(),
                parent_contexts: vec!["System".to_string()],
                is_site: true,
                ..CourseInfo::default()
            },
            ..RequestContext::default()
        }
    }

    fn dimension_settings() -> AnalyticsConfig {
        let mut settings = AnalyticsConfig {
            site_url: Some("somewhere".to_string()),
            site_id: "2468".to_string(),
            use_dimensions: true,
            ..AnalyticsConfig::default()
        };
        settings.dimensions.insert(
            Scope::Visit,
            vec![
                DimensionBinding::new("2468", "user_name"),
                DimensionBinding::new("", "user_name"),
                DimensionBinding::new("55", "missing_plugin"),
            ],
        );
        settings.dimensions.insert(
            Scope::Action,
            vec![DimensionBinding::new("1357", "course_full_name")],
        );
        settings
    }

    #[test]
    fn test_custom_variables_for_admin() {
        let settings = AnalyticsConfig::default();

        assert_eq!(
            Piwik::custom_variables(&settings, &foo_bar(true)),
            "_paq.push([\"setCustomVariable\", 1, \"UserName\", \"Foo Bar\", \"page\"]);\n\
             _paq.push([\"setCustomVariable\", 2, \"UserRole\", \"Admin\", \"page\"]);\n\
             _paq.push([\"setCustomVariable\", 3, \"Context\", \"Front page\", \"page\"]);\n\
             _paq.push([\"setCustomVariable\", 4, \"CourseName\", \"PHPUnit test site\", \"page\"]);\n"
        );
    }

    #[test]
    fn test_custom_variables_for_user_without_roles() {
        let settings = AnalyticsConfig::default();
        let vars = Piwik::custom_variables(&settings, &foo_bar(false));

        assert!(vars.contains("_paq.push([\"setCustomVariable\", 2, \"UserRole\", \"\", \"page\"]);\n"));
        assert_eq!(vars.lines().count(), 4);
    }

    #[test]
    fn test_custom_dimensions_render_action_then_visit() {
        let mut diagnostics = Diagnostics::new();
        let rendered = Piwik::custom_dimensions(
            &dimension_settings(),
            &foo_bar(true),
            registry(),
            &mut diagnostics,
        );

        assert_eq!(
            rendered,
            "_paq.push([\"setCustomDimension\", customDimensionId = 1357, customDimensionValue = \"PHPUnit test site\"]);\n\
             _paq.push([\"trackPageView\",\"\",{\"dimension2468\":\"Foo Bar\"}]);\n"
        );
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_variables_honour_use_dimensions() {
        let mut settings = dimension_settings();
        let mut diagnostics = Diagnostics::new();

        let with = Piwik::variables(&settings, &foo_bar(true), registry(), &mut diagnostics);
        assert!(with.contains("setCustomDimension"));
        assert!(!with.contains("setCustomVariable"));

        settings.use_dimensions = false;
        let without = Piwik::variables(&settings, &foo_bar(true), registry(), &mut diagnostics);
        assert!(without.contains("setCustomVariable"));
        assert!(!without.contains("setCustomDimension"));
    }

    #[test]
    fn test_scope_without_bindings_renders_nothing() {
        let mut settings = dimension_settings();
        settings.dimensions.remove(&Scope::Visit);
        let mut diagnostics = Diagnostics::new();

        let rendered =
            Piwik::custom_dimensions(&settings, &foo_bar(true), registry(), &mut diagnostics);
        assert!(!rendered.contains("trackPageView"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_no_site_url_means_no_snippet() {
        let settings = AnalyticsConfig::default();
        let mut diagnostics = Diagnostics::new();

        assert!(Piwik
            .snippet(&settings, &foo_bar(false), registry(), &mut diagnostics)
            .is_none());
    }

    #[test]
    fn test_snippet_options() {
        let mut settings = AnalyticsConfig {
            site_url: Some("somewhere".to_string()),
            site_id: "2468".to_string(),
            ..AnalyticsConfig::default()
        };
        let mut diagnostics = Diagnostics::new();

        let full = Piwik
            .snippet(&settings, &foo_bar(false), registry(), &mut diagnostics)
            .unwrap();
        assert!(full.contains("_paq.push(['setDocumentTitle', '']);"));
        assert!(full.contains("<img src=\"//somewhere/piwik.php?idsite=2468\""));
        assert!(full.contains("_paq.push(['setSiteId', 2468]);"));
        assert!(full.contains("var u='//somewhere/';"));
        assert!(full.contains("_paq.push(['setUserId', 2]);"));

        settings.clean_url = false;
        settings.image_track = false;
        let bare = Piwik
            .snippet(&settings, &foo_bar(false), registry(), &mut diagnostics)
            .unwrap();
        assert!(!bare.contains("setDocumentTitle"));
        assert!(!bare.contains("<noscript>"));
        assert!(bare.ends_with("</script>\n<!-- End Piwik Code -->\n"));
    }
}
