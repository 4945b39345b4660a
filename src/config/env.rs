use crate::config::toml_config::{
    default_allowed_domains, default_script_path, default_style_path, AppConfig,
    AssistantConfig, LogFormat, LoggingConfig, ServerConfig, WidgetConfig,
};
use crate::utils::error::{Result, WidgetError};
use crate::utils::validation::validate_required_field;
use std::env;
use std::str::FromStr;

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WidgetError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "Value is not a valid number".to_string(),
            }),
        None => Ok(None),
    }
}

fn split_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// 沒有設定檔時，只靠環境變數（含 .env）組出配置
    pub fn from_env() -> Result<Self> {
        let endpoint = var("AI_ENDPOINT");
        let endpoint = validate_required_field("AI_ENDPOINT", &endpoint)?.clone();

        let mut server = ServerConfig::default();
        if let Some(host) = var("HOST") {
            server.host = host;
        }
        if let Some(port) = parse_var::<u16>("PORT")? {
            server.port = port;
        }

        let widget = WidgetConfig {
            allowed_domains: var("WIDGET_ALLOWED_DOMAINS")
                .map(|raw| split_domains(&raw))
                .unwrap_or_else(default_allowed_domains),
            secret: var("WIDGET_SECRET"),
            insecure_dev_secret: false,
            script_path: var("WIDGET_SCRIPT_PATH").unwrap_or_else(default_script_path),
            style_path: var("WIDGET_STYLE_PATH").unwrap_or_else(default_style_path),
        };

        let assistant = AssistantConfig {
            endpoint,
            api_key: var("AI_API_KEY"),
            timeout_seconds: parse_var("AI_TIMEOUT_SECONDS")?,
        };

        let logging = LoggingConfig {
            format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Compact,
            },
            verbose: false,
        };

        Ok(Self {
            server,
            widget,
            assistant,
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_domains() {
        assert_eq!(
            split_domains(" center.cruises, ,localhost "),
            vec!["center.cruises", "localhost"]
        );
        assert!(split_domains("").is_empty());
    }

    // 環境變數是整個行程共用的，所有情境放在同一個測試裡依序執行
    #[test]
    fn test_from_env() {
        for name in [
            "AI_ENDPOINT",
            "WIDGET_ALLOWED_DOMAINS",
            "WIDGET_SECRET",
            "PORT",
            "AI_TIMEOUT_SECONDS",
        ] {
            env::remove_var(name);
        }

        assert!(matches!(
            AppConfig::from_env(),
            Err(WidgetError::MissingConfigError { .. })
        ));

        env::set_var("AI_ENDPOINT", "https://ai.example.com/chat");
        env::set_var("WIDGET_ALLOWED_DOMAINS", "center.cruises,localhost");
        env::set_var("WIDGET_SECRET", "env-test-secret-with-at-least-32-chars");
        env::set_var("PORT", "8081");
        env::set_var("AI_TIMEOUT_SECONDS", "12");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.widget.allowed_domains, vec!["center.cruises", "localhost"]);
        assert_eq!(config.assistant.timeout_seconds, Some(12));
        assert!(config.signing_secret().is_ok());

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            AppConfig::from_env(),
            Err(WidgetError::InvalidConfigValueError { .. })
        ));

        for name in [
            "AI_ENDPOINT",
            "WIDGET_ALLOWED_DOMAINS",
            "WIDGET_SECRET",
            "PORT",
            "AI_TIMEOUT_SECONDS",
        ] {
            env::remove_var(name);
        }
    }
}
