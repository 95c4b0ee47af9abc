pub mod app_config;
pub mod setup;

pub use app_config::{
    config_path_from_env, AppConfig, BotConfig, BotType, ConfigError, RawConfig, RuntimeSettings,
};
