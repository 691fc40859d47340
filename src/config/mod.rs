pub mod app;
pub mod consts;
pub mod file;

// Re-export for convenience
pub use app::{AppConfig, GlobalArgs};
pub use file::ConfigFile;
