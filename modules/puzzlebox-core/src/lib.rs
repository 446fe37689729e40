pub mod config;
pub mod deps;

pub use config::AppConfig;
pub use deps::ServerDeps;
