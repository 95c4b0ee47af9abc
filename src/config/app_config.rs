use std::env;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::monitoring::NotifyRules;

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// 지원하는 봇 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotType {
    Telegram,
    Discord,
}

impl FromStr for BotType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(BotType::Telegram),
            "discord" => Ok(BotType::Discord),
            other => Err(ConfigError::UnknownBotType(other.to_string())),
        }
    }
}

/// 설정 파일(JSON) 형태 그대로의 설정
///
/// 키는 `BOT_TYPE`, `BOT_TOKEN`, `CHAT_ID` 처럼 대문자 스네이크 케이스입니다.
/// 필수 값 검증은 [`AppConfig::from_raw`]에서 수행합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawConfig {
    #[serde(default)]
    pub bot_type: String,
    #[serde(default)]
    pub bot_token: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub chat_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub log_file_path: String,
    #[serde(default)]
    pub notify_on_shift_1: bool,
    #[serde(default)]
    pub notify_on_shift_10: bool,
    #[serde(default)]
    pub notify_on_remaining_5: bool,
}

impl RawConfig {
    /// 설정 파일 읽기
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 설정 파일 저장
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// ID 값은 문자열 또는 숫자 모두 허용
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<IdValue>::deserialize(deserializer)? {
        Some(IdValue::Text(text)) => Some(text),
        Some(IdValue::Number(number)) => Some(number.to_string()),
        None => None,
    })
}

/// 알림 백엔드 설정 (정확히 하나)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotConfig {
    Telegram { bot_token: String, chat_id: String },
    Discord { bot_token: String, channel_id: u64 },
}

impl BotConfig {
    pub fn bot_type(&self) -> BotType {
        match self {
            BotConfig::Telegram { .. } => BotType::Telegram,
            BotConfig::Discord { .. } => BotType::Discord,
        }
    }
}

/// 환경 변수로 조정 가능한 런타임 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub poll_interval: Duration,
    pub notify_timeout: Duration,
    pub telegram_api_base: String,
    pub discord_api_base: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            discord_api_base: DEFAULT_DISCORD_API_BASE.to_string(),
        }
    }
}

impl RuntimeSettings {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            poll_interval: secs_from_env("POLL_INTERVAL_SECS", defaults.poll_interval)?,
            notify_timeout: secs_from_env("NOTIFY_TIMEOUT_SECS", defaults.notify_timeout)?,
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or(defaults.telegram_api_base),
            discord_api_base: env::var("DISCORD_API_BASE").unwrap_or(defaults.discord_api_base),
        })
    }
}

fn secs_from_env(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            let secs = value.trim().parse::<u64>().ok().filter(|secs| *secs > 0);
            secs.map(Duration::from_secs)
                .ok_or(ConfigError::InvalidNumber { name, value })
        }
        Err(_) => Ok(default),
    }
}

/// 애플리케이션 설정
///
/// 시작 시 한 번 로드되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub log_file_path: PathBuf,
    pub rules: NotifyRules,
    pub settings: RuntimeSettings,
}

impl AppConfig {
    /// 설정 파일에서 설정 로드
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = RawConfig::read(path)?;
        Self::from_raw(raw, RuntimeSettings::from_env()?)
    }

    /// 설정 파일이 없으면 대화형 설정을 실행한 뒤 저장하고 로드
    pub fn load_or_setup(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }

        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        Self::setup_and_save(path, &mut input, &mut output)
    }

    /// 대화형 설정 실행 후 검증을 통과한 답변만 파일로 저장
    pub fn setup_and_save<R, W>(
        path: &Path,
        input: &mut R,
        output: &mut W,
    ) -> Result<Self, ConfigError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "Config file {} not found, starting setup.", path.display())
            .map_err(ConfigError::Prompt)?;

        let raw = super::setup::run_setup(input, output)?;
        let config = Self::from_raw(raw.clone(), RuntimeSettings::from_env()?)?;
        raw.save(path)?;

        writeln!(output, "Configuration saved to {}", path.display())
            .map_err(ConfigError::Prompt)?;
        Ok(config)
    }

    /// 원본 설정 검증
    pub fn from_raw(raw: RawConfig, settings: RuntimeSettings) -> Result<Self, ConfigError> {
        let bot_type: BotType = raw.bot_type.parse()?;

        let bot_token = required(raw.bot_token, "BOT_TOKEN")?;

        let bot = match bot_type {
            BotType::Telegram => BotConfig::Telegram {
                bot_token,
                chat_id: required(raw.chat_id.unwrap_or_default(), "CHAT_ID")?,
            },
            BotType::Discord => {
                let channel_id = required(raw.channel_id.unwrap_or_default(), "CHANNEL_ID")?;
                BotConfig::Discord {
                    bot_token,
                    channel_id: channel_id
                        .parse()
                        .map_err(|_| ConfigError::InvalidChannelId(channel_id))?,
                }
            }
        };

        let log_file_path = PathBuf::from(required(raw.log_file_path, "LOG_FILE_PATH")?);

        Ok(Self {
            bot,
            log_file_path,
            rules: NotifyRules {
                on_shift_1: raw.notify_on_shift_1,
                on_shift_10: raw.notify_on_shift_10,
                on_remaining_5: raw.notify_on_remaining_5,
            },
            settings,
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// 설정 파일 경로 (`QUEUE_NOTIFIER_CONFIG` 환경 변수로 변경 가능)
pub fn config_path_from_env() -> PathBuf {
    env::var("QUEUE_NOTIFIER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bot type '{0}'. Use 'telegram' or 'discord'.")]
    UnknownBotType(String),
    #[error("Missing required config field {0}")]
    MissingField(&'static str),
    #[error("Invalid Discord channel ID '{0}'")]
    InvalidChannelId(String),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed config file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Failed to read setup answer: {0}")]
    Prompt(#[source] std::io::Error),
}
