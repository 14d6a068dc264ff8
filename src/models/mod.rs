pub mod context;
pub mod settings;

pub use context::{ActivityInfo, CourseInfo, PageInfo, RequestContext, UserInfo};
pub use settings::{
    AnalyticsConfig, AnalyticsRecord, DimensionBinding, Dimensions, Scope, SettingsError,
    VendorType,
};
