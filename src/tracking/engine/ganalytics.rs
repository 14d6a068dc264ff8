//! Classic Google Analytics (`ga.js`) tracker.

use super::{indent, TrackingEngine};
use crate::dimension::DimensionRegistry;
use crate::models::{AnalyticsConfig, RequestContext, VendorType};
use crate::tracking::render::js_single_quoted;
use crate::tracking::track_url::track_url;
use crate::tracking::Diagnostics;

const LOADER: &str = "(function() {
  var ga = document.createElement('script'); ga.type = 'text/javascript'; ga.async = true;
  ga.src = ('https:' == document.location.protocol ? 'https://ssl' : 'http://www') + '.google-analytics.com/ga.js';
  var s = document.getElementsByTagName('script')[0]; s.parentNode.insertBefore(ga, s);
})();
";

#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleAnalytics;

impl TrackingEngine for GoogleAnalytics {
    fn vendor(&self) -> VendorType {
        VendorType::Ganalytics
    }

    fn snippet(
        &self,
        settings: &AnalyticsConfig,
        ctx: &RequestContext,
        _registry: &DimensionRegistry,
        _diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let site_id = settings.site_id.trim();
        if site_id.is_empty() {
            return None;
        }

        let page_view = if settings.clean_url {
            format!(
                "_gaq.push(['_trackPageview', '{}']);\n",
                js_single_quoted(&track_url(ctx, true, true))
            )
        } else {
            "_gaq.push(['_trackPageview']);\n".to_string()
        };

        let mut script = String::from("var _gaq = _gaq || [];\n");
        script.push_str(&format!(
            "_gaq.push(['_setAccount', '{}']);\n",
            js_single_quoted(site_id)
        ));
        script.push_str(&page_view);
        script.push_str("_gaq.push(['_setSiteSpeedSampleRate', 50]);\n");
        script.push_str(LOADER);

        Some(format!(
            "\n<!-- Start Google Analytics -->\n<script type='text/javascript'>\n{}</script>\n<!-- End Google Analytics -->\n",
            indent(&script, "  ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::registry;
    use crate::models::{CourseInfo, PageInfo};

    fn course_page() -> RequestContext {
        RequestContext {
            course: CourseInfo {
                id: 2,
                full_name: "Test course 1".to_string(),
                parent_contexts: vec!["Miscellaneous".to_string(), "System".to_string()],
                ..CourseInfo::default()
            },
            page: PageInfo {
                in_course: true,
                ..PageInfo::default()
            },
            ..RequestContext::default()
        }
    }

    fn settings(clean_url: bool) -> AnalyticsConfig {
        AnalyticsConfig {
            vendor: "ganalytics".to_string(),
            site_id: "UA-2468-1".to_string(),
            clean_url,
            ..AnalyticsConfig::default()
        }
    }

    #[test]
    fn test_clean_url_tracks_encoded_path() {
        let mut diagnostics = Diagnostics::new();
        let html = GoogleAnalytics
            .snippet(&settings(true), &course_page(), registry(), &mut diagnostics)
            .unwrap();

        assert!(html.contains("  _gaq.push(['_setAccount', 'UA-2468-1']);\n"));
        assert!(html.contains("  _gaq.push(['_trackPageview', '/Miscellaneous/Test+course+1/View']);\n"));
        assert!(html.contains("ga.js"));
    }

    #[test]
    fn test_unclean_url_tracks_default_page_view() {
        let mut diagnostics = Diagnostics::new();
        let html = GoogleAnalytics
            .snippet(&settings(false), &course_page(), registry(), &mut diagnostics)
            .unwrap();

        assert!(html.contains("  _gaq.push(['_trackPageview']);\n"));
        assert!(!html.contains("Test+course+1"));
    }

    #[test]
    fn test_missing_site_id_means_no_snippet() {
        let mut config = settings(true);
        config.site_id = "  ".to_string();
        let mut diagnostics = Diagnostics::new();

        assert!(GoogleAnalytics
            .snippet(&config, &course_page(), registry(), &mut diagnostics)
            .is_none());
    }
}
