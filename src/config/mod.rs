//! Configuration data model, file locations and merging.

pub mod merge;
pub mod paths;
pub mod schema;

pub use merge::merge_configs;
pub use paths::{Paths, resolve_path};
pub use schema::{
    AppConfig, BaseDirConfig, BaseDirOverride, MergedConfig, UserConfig, UserConfigKind,
    UserSections,
};
