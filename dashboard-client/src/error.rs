use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `dashboard-client`.
pub enum DashboardClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): сеть, таймаут, декодирование.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Сервер вернул не-2xx статус.
    #[error("{message}")]
    Status {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение из тела ответа или стандартное описание статуса.
        message: String,
    },

    /// Некорректный запрос (сообщение передаётся как есть).
    #[error("{0}")]
    InvalidRequest(String),

    /// Операция не поддерживается для коллекции (например, запись комментариев).
    #[error("operation is not supported for {0}")]
    Unsupported(&'static str),
}

/// Результат операций `dashboard-client`.
pub type DashboardClientResult<T> = Result<T, DashboardClientError>;

impl DashboardClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| {
                        format!("Request failed with status code {}", status.as_u16())
                    });
                Self::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
