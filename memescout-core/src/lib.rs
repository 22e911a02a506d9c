pub mod config;
pub mod error;
pub mod error_utils;
pub mod request;
pub mod types;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use request::*;
pub use types::*;
