//! Request context handed to dimension plugins and tracking engines.
//!
//! The host platform resolves who is viewing what and passes it in; nothing
//! in the tracking core reads ambient state.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    /// Custom profile fields keyed by short name.
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    /// Names of the roles held in the current course context.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_site_admin: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseInfo {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub id_number: String,
    /// Human readable course context name, e.g. "Course: Maths 101".
    #[serde(default)]
    pub context_name: String,
    /// Names of the parent contexts, nearest first, ending with the system context.
    #[serde(default)]
    pub parent_contexts: Vec<String>,
    /// Enrolment method of the current user, when actively enrolled.
    #[serde(default)]
    pub enrolment_method: Option<String>,
    /// The front page course.
    #[serde(default)]
    pub is_site: bool,
}

impl CourseInfo {
    /// Category names from the top level down, with the system context dropped.
    pub fn category_path(&self) -> Vec<&str> {
        self.parent_contexts
            .iter()
            .rev()
            .skip(1)
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityInfo {
    /// Module type, e.g. "wiki".
    pub module: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether the page context sits inside the current course.
    #[serde(default)]
    pub in_course: bool,
    #[serde(default)]
    pub activity: Option<ActivityInfo>,
    #[serde(default)]
    pub editing: bool,
    #[serde(default)]
    pub heading: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    pub user: UserInfo,
    /// The real user behind a masquerading session.
    #[serde(default)]
    pub real_user: Option<UserInfo>,
    #[serde(default)]
    pub course: CourseInfo,
    #[serde(default)]
    pub page: PageInfo,
    #[serde(default)]
    pub remote_addr: Option<IpAddr>,
    /// Site setting, filled in by the service rather than by callers.
    #[serde(skip)]
    pub on_campus_networks: Vec<IpNet>,
}

impl RequestContext {
    pub fn is_masquerading(&self) -> bool {
        self.real_user.is_some()
    }
}
