pub mod config;
pub mod error;
pub mod error_utils;
pub mod sanitize;
pub mod types;

pub use error::*;
pub use error_utils::*;
pub use sanitize::sanitize_error_message;
pub use types::*;
