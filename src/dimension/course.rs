//! Action scoped dimensions describing the current course.

use super::{non_empty, Dimension};
use crate::models::{AnalyticsConfig, RequestContext, Scope};

#[derive(Debug, Default)]
pub struct ContextName;

impl Dimension for ContextName {
    fn name(&self) -> &'static str {
        "context"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Context"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(ctx.course.context_name.as_str())
    }
}

#[derive(Debug, Default)]
pub struct CourseFullName;

impl Dimension for CourseFullName {
    fn name(&self) -> &'static str {
        "course_full_name"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Course full name"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(ctx.course.full_name.as_str())
    }
}

#[derive(Debug, Default)]
pub struct CourseShortName;

impl Dimension for CourseShortName {
    fn name(&self) -> &'static str {
        "course_short_name"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Course short name"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(ctx.course.short_name.as_str())
    }
}

#[derive(Debug, Default)]
pub struct CourseIdNumber;

impl Dimension for CourseIdNumber {
    fn name(&self) -> &'static str {
        "course_id_number"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Course ID number"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(ctx.course.id_number.as_str())
    }
}

/// Category names from the top level down, joined with a backslash.
#[derive(Debug, Default)]
pub struct CourseCategoryHierarchyFullPath;

impl Dimension for CourseCategoryHierarchyFullPath {
    fn name(&self) -> &'static str {
        "course_category_hierarchy_full_path"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Course category hierarchy full path"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(ctx.course.category_path().join("\\"))
    }
}

#[derive(Debug, Default)]
pub struct CourseEnrolmentMethod;

impl Dimension for CourseEnrolmentMethod {
    fn name(&self) -> &'static str {
        "course_enrolment_method"
    }

    fn scope(&self) -> Scope {
        Scope::Action
    }

    fn label(&self) -> &'static str {
        "Course enrolment method"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        // Everybody participates on the front page.
        if ctx.course.is_site {
            return None;
        }
        ctx.course.enrolment_method.clone().and_then(non_empty)
    }
}
