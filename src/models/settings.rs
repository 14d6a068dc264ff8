use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("analytics type '{0}' is not supported")]
    UnknownVendor(String),
    #[error("field '{field}' must be 0 or 1, got {value}")]
    InvalidFlag { field: &'static str, value: i32 },
    #[error("dimensions blob is malformed: {0}")]
    MalformedDimensions(String),
    #[error("{0}")]
    Invalid(String),
}

/// Where a dimension is reported: once per visit, or per page action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Action,
    Visit,
}

impl Scope {
    /// Rendering order of the dimension block.
    pub const ALL: [Scope; 2] = [Scope::Action, Scope::Visit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Action => "action",
            Scope::Visit => "visit",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "action" => Ok(Scope::Action),
            "visit" => Ok(Scope::Visit),
            other => Err(SettingsError::Invalid(format!("unknown scope '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorType {
    Piwik,
    Ganalytics,
    Guniversal,
}

impl VendorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorType::Piwik => "piwik",
            VendorType::Ganalytics => "ganalytics",
            VendorType::Guniversal => "guniversal",
        }
    }
}

impl FromStr for VendorType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "piwik" => Ok(VendorType::Piwik),
            "ganalytics" => Ok(VendorType::Ganalytics),
            "guniversal" => Ok(VendorType::Guniversal),
            other => Err(SettingsError::UnknownVendor(other.to_string())),
        }
    }
}

/// A vendor dimension slot and the plugin that fills it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBinding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
}

impl DimensionBinding {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

pub type Dimensions = BTreeMap<Scope, Vec<DimensionBinding>>;

/// Raw row of the `analytics` table.
#[derive(Debug, Clone, FromRow)]
pub struct AnalyticsRecord {
    pub id: i64,
    pub enabled: i32,
    pub vendor_type: String,
    pub site_id: String,
    pub site_url: Option<String>,
    pub track_admin: i32,
    pub masquerade_handling: i32,
    pub clean_url: i32,
    pub image_track: i32,
    pub use_dimensions: i32,
    pub dimensions: Option<String>,
}

/// One configured tracking integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(rename = "type", default = "AnalyticsConfig::default_vendor")]
    pub vendor: String,
    #[serde(default = "AnalyticsConfig::default_site_id")]
    pub site_id: String,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub track_admin: bool,
    #[serde(default = "default_true")]
    pub masquerade_handling: bool,
    #[serde(default = "default_true")]
    pub clean_url: bool,
    #[serde(default = "default_true")]
    pub image_track: bool,
    #[serde(default)]
    pub use_dimensions: bool,
    #[serde(default)]
    pub dimensions: Dimensions,
}

fn default_true() -> bool {
    true
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            id: None,
            enabled: true,
            vendor: Self::default_vendor(),
            site_id: Self::default_site_id(),
            site_url: None,
            track_admin: false,
            masquerade_handling: true,
            clean_url: true,
            image_track: true,
            use_dimensions: false,
            dimensions: Dimensions::new(),
        }
    }
}

impl AnalyticsConfig {
    fn default_vendor() -> String {
        VendorType::Piwik.as_str().to_string()
    }

    fn default_site_id() -> String {
        "1".to_string()
    }

    pub fn vendor_type(&self) -> Result<VendorType, SettingsError> {
        self.vendor.parse()
    }

    /// Bindings configured for a scope, in configured order.
    pub fn bindings(&self, scope: Scope) -> &[DimensionBinding] {
        self.dimensions
            .get(&scope)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dimensions blob as persisted; `None` when nothing is configured.
    pub fn dimensions_blob(&self) -> Result<Option<String>, SettingsError> {
        if self.dimensions.values().all(Vec::is_empty) {
            return Ok(None);
        }
        serde_json::to_string(&self.dimensions)
            .map(Some)
            .map_err(|e| SettingsError::MalformedDimensions(e.to_string()))
    }

    /// Checks applied before a record is saved.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let vendor = self.vendor_type()?;

        if self.site_id.trim().is_empty() {
            return Err(SettingsError::Invalid("site id is required".to_string()));
        }

        if vendor == VendorType::Piwik {
            let site_url = self.site_url.as_deref().map(str::trim).unwrap_or("");
            if site_url.is_empty() {
                return Err(SettingsError::Invalid(
                    "You must provide Piwik site URL.".to_string(),
                ));
            }
            if site_url.starts_with("http://") || site_url.starts_with("https://") {
                return Err(SettingsError::Invalid(
                    "Please provide URL without http(s).".to_string(),
                ));
            }
            if site_url.ends_with('/') {
                return Err(SettingsError::Invalid(
                    "Please provide URL without a trailing slash".to_string(),
                ));
            }
            if site_url.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
                return Err(SettingsError::Invalid(
                    "You must provide valid Piwik site URL.".to_string(),
                ));
            }
        }

        self.check_unquoted_ids()
    }

    /// Checks the fields written into the script unquoted: the Piwik site id
    /// and every dimension id. Runs on load as well as on save.
    pub fn check_unquoted_ids(&self) -> Result<(), SettingsError> {
        if self.vendor_type() == Ok(VendorType::Piwik) && !is_numeric(self.site_id.trim()) {
            return Err(SettingsError::Invalid(
                "Piwik site id must be numeric.".to_string(),
            ));
        }

        for (scope, bindings) in &self.dimensions {
            for binding in bindings {
                let id = binding.id.trim();
                if !id.is_empty() && !is_numeric(id) {
                    return Err(SettingsError::Invalid(format!(
                        "{scope} dimension id '{id}' must be numeric."
                    )));
                }
            }
        }

        Ok(())
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn flag(field: &'static str, value: i32) -> Result<bool, SettingsError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(SettingsError::InvalidFlag {
            field,
            value: other,
        }),
    }
}

impl TryFrom<AnalyticsRecord> for AnalyticsConfig {
    type Error = SettingsError;

    fn try_from(record: AnalyticsRecord) -> Result<Self, Self::Error> {
        let dimensions = match record.dimensions.as_deref().map(str::trim) {
            None | Some("") => Dimensions::new(),
            Some(blob) => serde_json::from_str(blob)
                .map_err(|e| SettingsError::MalformedDimensions(e.to_string()))?,
        };

        let config = Self {
            id: Some(record.id),
            enabled: flag("enabled", record.enabled)?,
            vendor: record.vendor_type,
            site_id: record.site_id,
            site_url: record.site_url.filter(|url| !url.is_empty()),
            track_admin: flag("track_admin", record.track_admin)?,
            masquerade_handling: flag("masquerade_handling", record.masquerade_handling)?,
            clean_url: flag("clean_url", record.clean_url)?,
            image_track: flag("image_track", record.image_track)?,
            use_dimensions: flag("use_dimensions", record.use_dimensions)?,
            dimensions,
        };
        config.check_unquoted_ids()?;
        Ok(config)
    }
}
