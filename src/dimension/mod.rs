//! Dimension plugins
//!
//! A dimension computes one fact about the current request (user name, course
//! category path, ...) that can be mapped onto a vendor custom dimension slot.
//! Plugins are registered through an explicit constructor table and indexed
//! by scope and name.

pub mod campus;
pub mod course;
pub mod user;

use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AnalyticsConfig, RequestContext, Scope};

#[derive(Debug, Error)]
pub enum DimensionError {
    #[error("dimension plugin could not be constructed: {0}")]
    Construction(String),
}

pub trait Dimension: Send + Sync {
    /// Stable key used in stored configuration.
    fn name(&self) -> &'static str;

    fn scope(&self) -> Scope;

    /// Label shown to administrators.
    fn label(&self) -> &'static str;

    /// The value to report, or `None` when nothing applies to this request.
    fn value(&self, ctx: &RequestContext, settings: &AnalyticsConfig) -> Option<String>;
}

pub type DimensionConstructor = fn() -> Result<Box<dyn Dimension>, DimensionError>;

fn boxed<D: Dimension + Default + 'static>() -> Result<Box<dyn Dimension>, DimensionError> {
    Ok(Box::new(D::default()))
}

/// Built-in plugins, in no particular order.
pub const BUILTIN: &[DimensionConstructor] = &[
    boxed::<course::ContextName>,
    boxed::<course::CourseCategoryHierarchyFullPath>,
    boxed::<course::CourseEnrolmentMethod>,
    boxed::<course::CourseFullName>,
    boxed::<course::CourseIdNumber>,
    boxed::<course::CourseShortName>,
    boxed::<campus::IsOnCampus>,
    boxed::<user::UserDepartment>,
    boxed::<user::UserEmailDomain>,
    boxed::<user::UserInstitution>,
    boxed::<user::UserName>,
    boxed::<user::UserProfileFieldFacultyCostCode>,
    boxed::<user::UserRole>,
];

/// Plugins indexed by scope, then by name.
#[derive(Default)]
pub struct DimensionRegistry {
    plugins: BTreeMap<Scope, BTreeMap<&'static str, Box<dyn Dimension>>>,
}

impl DimensionRegistry {
    pub fn builtin() -> Self {
        Self::from_constructors(BUILTIN)
    }

    /// Build a registry, skipping any plugin whose constructor fails.
    pub fn from_constructors(constructors: &[DimensionConstructor]) -> Self {
        let mut registry = Self::default();
        for constructor in constructors {
            match constructor() {
                Ok(plugin) => registry.register(plugin),
                Err(e) => warn!("Skipping dimension plugin: {}", e),
            }
        }
        registry
    }

    pub fn register(&mut self, plugin: Box<dyn Dimension>) {
        debug!(name = plugin.name(), scope = %plugin.scope(), "Registered dimension plugin");
        self.plugins
            .entry(plugin.scope())
            .or_default()
            .insert(plugin.name(), plugin);
    }

    pub fn get(&self, scope: Scope, name: &str) -> Option<&dyn Dimension> {
        self.plugins
            .get(&scope)
            .and_then(|plugins| plugins.get(name))
            .map(|plugin| plugin.as_ref())
    }

    pub fn plugins(&self, scope: Scope) -> impl Iterator<Item = &dyn Dimension> {
        self.plugins
            .get(&scope)
            .into_iter()
            .flat_map(|plugins| plugins.values())
            .map(|plugin| plugin.as_ref())
    }

    /// Scopes that have at least one plugin, in rendering order.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        Scope::ALL
            .into_iter()
            .filter(|scope| self.plugins.contains_key(scope))
    }

    /// Select options for one scope, led by an empty "nothing selected" entry.
    pub fn options_for_scope(&self, scope: Scope) -> Vec<(String, String)> {
        std::iter::once((String::new(), String::new()))
            .chain(
                self.plugins(scope)
                    .map(|plugin| (plugin.name().to_string(), plugin.label().to_string())),
            )
            .collect()
    }
}

/// The process-wide registry of built-in plugins, built on first use.
pub fn registry() -> &'static DimensionRegistry {
    static REGISTRY: OnceLock<DimensionRegistry> = OnceLock::new();
    REGISTRY.get_or_init(DimensionRegistry::builtin)
}

/// Treat empty strings as "no value".
pub(crate) fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}
