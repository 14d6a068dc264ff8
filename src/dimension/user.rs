//! Visit scoped dimensions describing the current user.

use super::{non_empty, Dimension};
use crate::models::{AnalyticsConfig, RequestContext, Scope};
use crate::tracking::engine::user_full_name;

const FACULTY_COST_CODE_FIELD: &str = "facultycostcode";

#[derive(Debug, Default)]
pub struct UserName;

impl Dimension for UserName {
    fn name(&self) -> &'static str {
        "user_name"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User name"
    }

    fn value(&self, ctx: &RequestContext, settings: &AnalyticsConfig) -> Option<String> {
        non_empty(user_full_name(settings, ctx))
    }
}

#[derive(Debug, Default)]
pub struct UserRole;

impl UserRole {
    /// "Admin" for site administrators, otherwise the assigned role names.
    pub fn describe(ctx: &RequestContext) -> String {
        if ctx.user.is_site_admin {
            "Admin".to_string()
        } else {
            ctx.user.roles.join(", ")
        }
    }
}

impl Dimension for UserRole {
    fn name(&self) -> &'static str {
        "user_role"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User role"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        non_empty(Self::describe(ctx))
    }
}

#[derive(Debug, Default)]
pub struct UserEmailDomain;

impl Dimension for UserEmailDomain {
    fn name(&self) -> &'static str {
        "user_email_domain"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User email domain"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        let email = ctx.user.email.as_deref()?;
        let (_, domain) = email.split_once('@')?;
        non_empty(domain)
    }
}

#[derive(Debug, Default)]
pub struct UserDepartment;

impl Dimension for UserDepartment {
    fn name(&self) -> &'static str {
        "user_department"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User department"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        ctx.user.department.clone().and_then(non_empty)
    }
}

#[derive(Debug, Default)]
pub struct UserInstitution;

impl Dimension for UserInstitution {
    fn name(&self) -> &'static str {
        "user_institution"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "User institution"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        ctx.user.institution.clone().and_then(non_empty)
    }
}

#[derive(Debug, Default)]
pub struct UserProfileFieldFacultyCostCode;

impl Dimension for UserProfileFieldFacultyCostCode {
    fn name(&self) -> &'static str {
        "user_profile_field_faculty_cost_code"
    }

    fn scope(&self) -> Scope {
        Scope::Visit
    }

    fn label(&self) -> &'static str {
        "Faculty cost code user profile field"
    }

    fn value(&self, ctx: &RequestContext, _settings: &AnalyticsConfig) -> Option<String> {
        ctx.user
            .profile
            .get(FACULTY_COST_CODE_FIELD)
            .cloned()
            .and_then(non_empty)
    }
}
