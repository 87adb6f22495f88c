//! Validated value types.

pub mod profile_prefix;
pub mod valid_path;

pub use profile_prefix::{ValidProfilePrefix, is_valid_profile_prefix};
pub use valid_path::{MAX_PATH_LENGTH, ValidPath, is_valid_path};
