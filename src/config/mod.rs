/// TOML configuration with environment overrides.
pub mod app;
