//! Google Analytics Universal (`analytics.js`) tracker.

use super::TrackingEngine;
use crate::dimension::DimensionRegistry;
use crate::models::{AnalyticsConfig, RequestContext, VendorType};
use crate::tracking::render::js_single_quoted;
use crate::tracking::track_url::track_url;
use crate::tracking::Diagnostics;

const LOADER: &str = "(function(i,s,o,g,r,a,m){i['GoogleAnalyticsObject']=r;i[r]=i[r]||function(){
(i[r].q=i[r].q||[]).push(arguments)},i[r].l=1*new Date();a=s.createElement(o),
m=s.getElementsByTagName(o)[0];a.async=1;a.src=g;m.parentNode.insertBefore(a,m)
})(window,document,'script','https://www.google-analytics.com/analytics.js','ga');
";

#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleUniversal;

impl TrackingEngine for GoogleUniversal {
    fn vendor(&self) -> VendorType {
        VendorType::Guniversal
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

        let mut script = String::from(LOADER);
        script.push('\n');
        script.push_str(&format!(
            "ga('create', '{}', {{'siteSpeedSampleRate': 50}});\n",
            js_single_quoted(site_id)
        ));
        script.push_str(&format!("ga('set', 'userId', '{}');\n", ctx.user.id));

        if settings.clean_url {
            script.push_str(&format!(
                "ga('send', {{'hitType': 'pageview', 'page': '{}', 'title': '{}'}});\n",
                js_single_quoted(&track_url(ctx, true, true)),
                js_single_quoted(&ctx.page.heading)
            ));
        } else {
            script.push_str("ga('send', 'pageview');\n");
        }

        Some(format!(
            "\n<!-- Start Google Analytics -->\n<script>\n{script}</script>\n<!-- End Google Analytics -->\n"
        ))
    }
}
