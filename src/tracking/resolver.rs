//! Dimension resolution
//!
//! Each configured binding is looked up in the registry for its scope and
//! evaluated against the request. Bindings that cannot be used are dropped:
//! a missing plugin or a missing vendor id is reported through
//! [`Diagnostics`], an empty value is not.

use serde::Serialize;

use super::Diagnostics;
use crate::dimension::DimensionRegistry;
use crate::models::{AnalyticsConfig, DimensionBinding, RequestContext, Scope};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDimension {
    pub id: String,
    pub name: String,
    pub value: String,
}

/// Resolve one binding. `ordinal` is the 1-based position within its scope.
pub fn resolve_one(
    registry: &DimensionRegistry,
    scope: Scope,
    ordinal: usize,
    binding: &DimensionBinding,
    ctx: &RequestContext,
    settings: &AnalyticsConfig,
    diagnostics: &mut Diagnostics,
) -> Option<ResolvedDimension> {
    let name = binding.content.trim();
    if name.is_empty() {
        return None;
    }

    let Some(plugin) = registry.get(scope, name) else {
        diagnostics.record(format!("Dimension plugin '{name}' is missing."));
        return None;
    };

    let id = binding.id.trim();
    if id.is_empty() {
        diagnostics.record(format!(
            "Dimension {scope} plugin #{ordinal} has been chosen but no ID has been supplied."
        ));
        return None;
    }

    let value = plugin.value(ctx, settings).filter(|value| !value.is_empty())?;

    Some(ResolvedDimension {
        id: id.to_string(),
        name: name.to_string(),
        value,
    })
}

/// Resolve every binding of a scope, keeping configured order.
pub fn resolve_scope(
    registry: &DimensionRegistry,
    scope: Scope,
    bindings: &[DimensionBinding],
    ctx: &RequestContext,
    settings: &AnalyticsConfig,
    diagnostics: &mut Diagnostics,
) -> Vec<ResolvedDimension> {
    bindings
        .iter()
        .enumerate()
        .filter_map(|(index, binding)| {
            resolve_one(registry, scope, index + 1, binding, ctx, settings, diagnostics)
        })
        .collect()
}
