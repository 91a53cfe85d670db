//! blogsmith core library
//!
//! Site configuration, document header parsing and shared error types.

pub mod config;
pub mod error;
pub mod header;

pub use config::SiteConfig;
pub use error::{CoreError, Result};
pub use header::{DocumentHeader, FieldError, HeaderError, ParsedDocument};
