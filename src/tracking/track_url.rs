//! Human readable page path used as tracked URL and document title.
//!
//! `[categories/]course/(View|Edit)` on course pages and
//! `[categories/]course/module/activity` on activity pages.

use url::form_urlencoded;

use crate::models::RequestContext;

const VIEW_LABEL: &str = "View";
const EDIT_LABEL: &str = "Edit";

fn segment(input: &str, encode: bool) -> String {
    if encode {
        form_urlencoded::byte_serialize(input.as_bytes()).collect()
    } else {
        input.to_string()
    }
}

pub fn track_url(ctx: &RequestContext, encode: bool, leading_slash: bool) -> String {
    let mut url = String::new();

    if leading_slash {
        url.push('/');
    }

    if !ctx.page.in_course {
        return url;
    }

    let course = &ctx.course;
    for category in course.category_path() {
        url.push_str(&segment(category, encode));
        url.push('/');
    }

    url.push_str(&segment(&course.full_name, encode));
    url.push('/');

    match &ctx.page.activity {
        Some(activity) => {
            url.push_str(&segment(&activity.module, encode));
            url.push('/');
            url.push_str(&segment(&activity.name, encode));
        }
        None if ctx.page.editing => url.push_str(EDIT_LABEL),
        None => url.push_str(VIEW_LABEL),
    }

    url
}
