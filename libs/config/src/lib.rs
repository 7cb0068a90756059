//! # Monitor Configuration
//!
//! Centralized configuration loading and defaults for the RSI monitor
//! services.
//!
//! ## Features
//!
//! - **Layered Loading**: serde defaults, optional TOML file, prefixed
//!   environment variables and plain-variable overrides, in that order
//! - **Service Defaults**: exchange endpoints, notification endpoints and
//!   the monitor's stock parameters
//!
//! ## Usage
//!
//! ```rust,no_run
//! use monitor_config::{resolve_config_path, ServiceConfigLoader};
//! # #[derive(serde::Deserialize)] struct MyConfig {}
//!
//! let path = resolve_config_path("MY_SERVICE_CONFIG_PATH", "configs/my_service.toml");
//! let config: MyConfig = ServiceConfigLoader::new("MY_SERVICE")
//!     .with_file(path)
//!     .with_env_override("telegram.bot_token", "TELEGRAM_TOKEN")
//!     .load()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{resolve_config_path, ServiceConfigLoader};
