use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub inventory_api: InventoryApiConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub table: TablePolicy,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки backend REST API инвентаря
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

/// Как сохранять массовое редактирование: одним запросом или запросом на строку.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    Batch,
    PerRow,
}

impl FromStr for CommitMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(CommitMode::Batch),
            "per_row" | "per-row" => Ok(CommitMode::PerRow),
            _ => Err(()),
        }
    }
}

// Политики таблицы инвентаря
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TablePolicy {
    /// Снимать выделение после успешного сохранения массового редактирования.
    pub clear_selection_after_save: bool,
    /// Запрещать (а не только предупреждать) редактирование смеси копий и обычных строк.
    pub strict_mixed_edit: bool,
    pub commit_mode: CommitMode,
    pub default_page_size: u32,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            clear_selection_after_save: false,
            strict_mixed_edit: false,
            commit_mode: CommitMode::Batch,
            default_page_size: 20,
        }
    }
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(
    name: &'static str,
    default: &str,
    reason: &'static str,
) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|_| ConfigError::Invalid { name, value, reason })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_page_size: u32 =
            parse_var("DEFAULT_PAGE_SIZE", "20", "must be a valid number")?;
        if !(1..=100).contains(&default_page_size) {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_PAGE_SIZE",
                value: default_page_size.to_string(),
                reason: "must be between 1 and 100",
            });
        }

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000", "must be a valid port")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "seller_inventory=debug,tower_http=debug"),
            },
            inventory_api: InventoryApiConfig {
                base_url: env::var("INVENTORY_API_URL")
                    .map_err(|_| ConfigError::Missing("INVENTORY_API_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                token: env::var("INVENTORY_API_TOKEN").ok().filter(|t| !t.is_empty()),
                timeout_seconds: parse_var(
                    "INVENTORY_API_TIMEOUT_SECONDS",
                    "30",
                    "must be a valid number",
                )?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parse_var(
                    "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                    "5",
                    "must be a valid number",
                )?,
                timeout_seconds: parse_var(
                    "CIRCUIT_BREAKER_TIMEOUT_SECONDS",
                    "60",
                    "must be a valid number",
                )?,
            },
            table: TablePolicy {
                clear_selection_after_save: parse_var(
                    "CLEAR_SELECTION_AFTER_SAVE",
                    "false",
                    "must be true or false",
                )?,
                strict_mixed_edit: parse_var("STRICT_MIXED_EDIT", "false", "must be true or false")?,
                commit_mode: parse_var("EDIT_COMMIT_MODE", "batch", "must be batch or per_row")?,
                default_page_size,
            },
        })
    }
}
