/// Process configuration loaded from environment variables
pub mod app;

/// Member name to Discord user ID directory loaded from a TOML file
pub mod members;

pub use app::AppConfig;
pub use members::MemberDirectory;
