//! 최초 실행 시 대화형 설정
//!
//! 설정 파일이 없을 때 한 번 실행되어 [`RawConfig`]를 만듭니다.
//! 입출력은 제네릭이므로 테스트에서는 메모리 버퍼를 사용합니다.

use std::io::{BufRead, Write};
use std::path::Path;

use super::app_config::{BotType, ConfigError, RawConfig};

/// 로그 파일 이름
pub const LOG_FILE_NAME: &str = "latest.log";

/// 대화형 설정 실행
pub fn run_setup<R, W>(input: &mut R, output: &mut W) -> Result<RawConfig, ConfigError>
where
    R: BufRead,
    W: Write,
{
    let bot_type_answer = prompt(input, output, "Choose bot type (telegram/discord): ")?;
    let bot_type: BotType = bot_type_answer.parse()?;

    let bot_token = prompt(input, output, "Enter bot token: ")?;

    let (chat_id, channel_id) = match bot_type {
        BotType::Telegram => (Some(prompt(input, output, "Enter chat ID: ")?), None),
        BotType::Discord => (None, Some(prompt(input, output, "Enter channel ID: ")?)),
    };

    let folder_path = prompt(input, output, "Enter path to log folder: ")?;

    let notify_on_shift_1 = prompt_yes_no(input, output, "Notify on 1 person shift? (yes/no): ")?;
    let notify_on_shift_10 =
        prompt_yes_no(input, output, "Notify on 10 person shift? (yes/no): ")?;
    let notify_on_remaining_5 =
        prompt_yes_no(input, output, "Notify when 5 people left? (yes/no): ")?;

    Ok(RawConfig {
        bot_type: bot_type_answer.trim().to_lowercase(),
        bot_token,
        chat_id,
        channel_id,
        log_file_path: normalize_log_path(&folder_path),
        notify_on_shift_1,
        notify_on_shift_10,
        notify_on_remaining_5,
    })
}

/// 로그 폴더 경로에 `latest.log`를 붙입니다 (이미 붙어 있으면 그대로).
pub fn normalize_log_path(folder_path: &str) -> String {
    if folder_path.ends_with(LOG_FILE_NAME) {
        folder_path.to_string()
    } else {
        Path::new(folder_path)
            .join(LOG_FILE_NAME)
            .to_string_lossy()
            .into_owned()
    }
}

fn prompt<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<String, ConfigError>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{}", question).map_err(ConfigError::Prompt)?;
    output.flush().map_err(ConfigError::Prompt)?;

    let mut answer = String::new();
    input.read_line(&mut answer).map_err(ConfigError::Prompt)?;
    Ok(answer.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

fn prompt_yes_no<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<bool, ConfigError>
where
    R: BufRead,
    W: Write,
{
    let answer = prompt(input, output, question)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str) -> (Result<RawConfig, ConfigError>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = run_setup(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn should_collect_telegram_answers() {
        // Arrange
        let answers = "Telegram\n123:abc\n-1001\n/home/me/logs\nyes\nno\n YES \n";

        // Act
        let (result, output) = run(answers);

        // Assert
        let raw = result.expect("setup should succeed");
        assert_eq!(raw.bot_type, "telegram");
        assert_eq!(raw.bot_token, "123:abc");
        assert_eq!(raw.chat_id, Some("-1001".to_string()));
        assert_eq!(raw.channel_id, None);
        assert_eq!(raw.log_file_path, "/home/me/logs/latest.log");
        assert!(raw.notify_on_shift_1);
        assert!(!raw.notify_on_shift_10);
        assert!(raw.notify_on_remaining_5);
        assert!(output.contains("Enter chat ID: "));
        assert!(!output.contains("Enter channel ID: "));
    }

    #[test]
    fn should_ask_for_channel_id_for_discord() {
        let answers = "discord\ntoken\n42\n/srv/game/latest.log\nno\nyes\nno\n";

        let (result, output) = run(answers);

        let raw = result.expect("setup should succeed");
        assert_eq!(raw.channel_id, Some("42".to_string()));
        assert_eq!(raw.chat_id, None);
        assert_eq!(raw.log_file_path, "/srv/game/latest.log");
        assert!(output.contains("Enter channel ID: "));
    }

    #[test]
    fn should_abort_on_unknown_bot_type() {
        let (result, output) = run("slack\n");

        assert!(matches!(result, Err(ConfigError::UnknownBotType(t)) if t == "slack"));
        assert!(!output.contains("Enter bot token: "));
    }

    #[test]
    fn should_treat_missing_answers_as_no() {
        let (result, _) = run("telegram\ntoken\n1\n/logs\n");

        let raw = result.expect("setup should succeed");
        assert!(!raw.notify_on_shift_1);
        assert!(!raw.notify_on_shift_10);
        assert!(!raw.notify_on_remaining_5);
    }

    #[test]
    fn should_keep_path_already_ending_with_log_name() {
        assert_eq!(normalize_log_path("logs/latest.log"), "logs/latest.log");
        assert_eq!(normalize_log_path("logs"), "logs/latest.log");
    }
}
