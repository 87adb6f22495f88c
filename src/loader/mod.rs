//! File loading pipeline: read, parse, validate.

pub mod app;
pub mod safe;
pub mod user;

pub use app::AppConfigLoader;
pub use safe::{Check, SafeConfigLoader};
pub use user::UserConfigLoader;
