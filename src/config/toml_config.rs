use crate::core::token::SigningSecret;
use crate::utils::error::{Result, WidgetError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ALLOWED_DOMAINS: [&str; 4] = [
    "localhost",
    "127.0.0.1",
    "center.cruises",
    "www.center.cruises",
];

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    pub secret: Option<String>,
    #[serde(default)]
    pub insecure_dev_secret: bool,
    #[serde(default = "default_script_path")]
    pub script_path: String,
    #[serde(default = "default_style_path")]
    pub style_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub verbose: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

pub(crate) fn default_allowed_domains() -> Vec<String> {
    DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

pub(crate) fn default_script_path() -> String {
    "widget/dist/widget.min.js".to_string()
}

pub(crate) fn default_style_path() -> String {
    "widget/style.css".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            allowed_domains: default_allowed_domains(),
            secret: None,
            insecure_dev_secret: false,
            script_path: default_script_path(),
            style_path: default_style_path(),
        }
    }
}

/// 沒有被替換掉的 `${VAR}` 視同未設定
fn resolved(value: Option<&String>) -> Option<&str> {
    value
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty() && !v.contains("${"))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| WidgetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WIDGET_SECRET})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn secret(&self) -> Option<&str> {
        resolved(self.widget.secret.as_ref())
    }

    pub fn api_key(&self) -> Option<&str> {
        resolved(self.assistant.api_key.as_ref())
    }

    /// 缺少密鑰時拒絕啟動，除非明確允許使用開發用密鑰
    pub fn signing_secret(&self) -> Result<SigningSecret> {
        match self.secret() {
            Some(secret) => SigningSecret::new(secret),
            None if self.widget.insecure_dev_secret => {
                tracing::warn!("⚠️ No widget secret configured, using the insecure development secret");
                Ok(SigningSecret::insecure_dev())
            }
            None => Err(WidgetError::MissingConfigError {
                field: "widget.secret".to_string(),
            }),
        }
    }

    pub fn assistant_timeout(&self) -> Duration {
        Duration::from_secs(
            self.assistant
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;

        if self.widget.allowed_domains.is_empty() {
            return Err(WidgetError::InvalidConfigValueError {
                field: "widget.allowed_domains".to_string(),
                value: "[]".to_string(),
                reason: "At least one domain must be allowed".to_string(),
            });
        }
        for domain in &self.widget.allowed_domains {
            validation::validate_domain("widget.allowed_domains", domain)?;
        }

        validation::validate_path("widget.script_path", &self.widget.script_path)?;
        validation::validate_path("widget.style_path", &self.widget.style_path)?;

        validation::validate_url("assistant.endpoint", &self.assistant.endpoint)?;
        if let Some(timeout) = self.assistant.timeout_seconds {
            validation::validate_range("assistant.timeout_seconds", timeout, 1, 600)?;
        }

        self.signing_secret()?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "config-test-secret-with-at-least-32-chars";

    fn minimal(secret_line: &str) -> String {
        format!(
            r#"
[widget]
{}

[assistant]
endpoint = "https://ai.example.com/chat"
"#,
            secret_line
        )
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = format!(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[widget]
allowed_domains = ["center.cruises"]
secret = "{}"
script_path = "dist/widget.js"
style_path = "dist/widget.css"

[assistant]
endpoint = "https://ai.example.com/chat"
api_key = "sk-test"
timeout_seconds = 10

[logging]
format = "json"
"#,
            SECRET
        );

        let config = AppConfig::from_toml_str(&toml_content).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.widget.allowed_domains, vec!["center.cruises"]);
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.assistant_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str(&minimal(&format!("secret = \"{}\"", SECRET))).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.widget.allowed_domains, default_allowed_domains());
        assert_eq!(config.widget.script_path, "widget/dist/widget.min.js");
        assert_eq!(config.assistant_timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CRUISE_WIDGET_TEST_SECRET", SECRET);

        let config =
            AppConfig::from_toml_str(&minimal("secret = \"${CRUISE_WIDGET_TEST_SECRET}\"")).unwrap();
        assert_eq!(config.secret(), Some(SECRET));

        std::env::remove_var("CRUISE_WIDGET_TEST_SECRET");
    }

    #[test]
    fn test_missing_secret_is_a_startup_error() {
        let config = AppConfig::from_toml_str(&minimal("")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(WidgetError::MissingConfigError { .. })
        ));

        // 環境變數不存在時保留原字串，不能拿來當密鑰
        let config =
            AppConfig::from_toml_str(&minimal("secret = \"${CRUISE_WIDGET_UNSET_SECRET}\"")).unwrap();
        assert_eq!(config.secret(), None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_insecure_dev_secret_opt_in() {
        let config = AppConfig::from_toml_str(&minimal("insecure_dev_secret = true")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let toml_content = format!(
            r#"
[widget]
allowed_domains = ["https://center.cruises"]
secret = "{}"

[assistant]
endpoint = "https://ai.example.com/chat"
"#,
            SECRET
        );
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = minimal(&format!("secret = \"{}\"", SECRET))
            .replace("https://ai.example.com/chat", "not-a-url");
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str(&minimal("secret = \"too-short\"")).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(minimal(&format!("secret = \"{}\"", SECRET)).as_bytes())
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.assistant.endpoint, "https://ai.example.com/chat");
    }
}
