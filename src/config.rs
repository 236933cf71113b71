use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shici")]
#[command(about = "Runs the shici poetry service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shici")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    database: String,
    port: i32,
    content_dir: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub turso_url: Option<String>,
    #[serde(default)]
    pub turso_auth_token: Option<String>,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_seconds: u64,
}

fn default_sync_interval() -> u64 {
    60
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_user_header() -> String {
    "x-user-id".to_string()
}

/// Identity is established by the upstream auth gateway, which forwards the
/// signed-in user's id in a request header.
#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            user_header: default_user_header(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }

    pub fn get_content_dir(&self) -> &str {
        &self.content_dir
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_config_with_defaults() {
        let cfg = Config::from_yaml(
            r#"
app:
  database: shici.db
  port: 8080
  content_dir: ./content
"#,
        )
        .unwrap();

        assert_eq!(cfg.app.get_db(), "shici.db");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.get_content_dir(), "./content");
        assert_eq!(cfg.app.sync_interval_seconds, 60);
        assert!(cfg.app.turso_url.is_none());
        assert_eq!(cfg.auth.user_header, "x-user-id");
    }

    #[test]
    fn substitutes_env_vars_and_defaults() {
        // SAFETY: the variable name is unique to this test.
        unsafe { env::set_var("SHICI_TEST_CONTENT_DIR", "/srv/poems") };

        let cfg = Config::from_yaml(
            r#"
app:
  database: ${SHICI_TEST_MISSING_DB:-fallback.db}
  port: 9000
  content_dir: ${SHICI_TEST_CONTENT_DIR}
auth:
  user_header: x-clerk-user
"#,
        )
        .unwrap();

        assert_eq!(cfg.app.get_db(), "fallback.db");
        assert_eq!(cfg.app.get_content_dir(), "/srv/poems");
        assert_eq!(cfg.auth.user_header, "x-clerk-user");
    }

    #[test]
    fn missing_app_section_is_an_error() {
        assert!(Config::from_yaml("auth:\n  user_header: x\n").is_err());
    }
}
