//! Shared utilities

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod process;

pub use config::Config;
pub use context::{Layout, LayoutOptions};
pub use diagnostic::Diagnostic;
