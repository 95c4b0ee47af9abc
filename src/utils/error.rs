use std::time::Duration;

/// 런타임 에러 타입
///
/// 알림 전송 경로에서 발생하는 실패를 표현합니다.
/// 폴링 루프를 중단시키지 않으며, 알림 경계에서 로깅 후 무시됩니다.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Destination unavailable: {0}")]
    DestinationUnavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl AppError {
    /// 에러 코드 반환 (구조화 로그 필드용)
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Http(_) => "NOTIFY5001",
            AppError::Api { .. } => "NOTIFY5002",
            AppError::DestinationUnavailable(_) => "NOTIFY4041",
            AppError::Timeout(_) => "NOTIFY5041",
            AppError::InvalidResponse(_) => "NOTIFY5003",
        }
    }
}

/// reqwest 에러를 AppError로 변환
///
/// Telegram URL에는 봇 토큰이 포함되므로 URL을 제거한 후 메시지를 남깁니다.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Http(error.without_url().to_string())
    }
}

/// 편의 함수들
impl AppError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AppError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn destination_unavailable(msg: impl Into<String>) -> Self {
        AppError::DestinationUnavailable(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        AppError::InvalidResponse(msg.into())
    }
}
