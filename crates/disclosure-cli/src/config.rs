use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Built-in defaults, the lowest configuration layer
const DEFAULT_CONFIG: &str = r#"
[guides]
directories = ["guides"]
personal = true   # ~/.disclosure/guides
project = true    # ./.disclosure/guides

[logging]
level = "warn"  # trace, debug, info, warn, error
format = "text" # text or json
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct GuidesConfig {
    pub directories: Vec<PathBuf>,
    pub personal: bool,
    pub project: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub guides: GuidesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.disclosure/disclosure.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".disclosure").join("disclosure.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Global config: ~/.disclosure/disclosure.toml (optional)
    /// 3. Local override: ./disclosure.toml (optional)
    /// 4. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ));

        if let Some(global) = Self::global_config_path() {
            config_builder = config_builder.add_source(config::File::from(global).required(false));
        }

        config_builder = config_builder
            .add_source(config::File::with_name("disclosure").required(false))
            .add_source(
                config::Environment::with_prefix("DISCLOSURE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("guides.directories")
                    .try_parsing(true),
            );

        // Convenience override for a single guides directory
        if let Ok(dir) = env::var("DISCLOSURE_GUIDES_DIR") {
            config_builder = config_builder.set_override("guides.directories", vec![dir])?;
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
