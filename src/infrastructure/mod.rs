pub mod config;
pub mod container;
pub mod database;
pub mod file_system;
pub mod process;

pub use config::AppConfig;
pub use container::AppContainer;
