use dashboard_client::DashboardClientError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
/// Ошибки слоя состояния панели.
pub enum StateError {
    /// Запрос к удалённому ресурсу завершился ошибкой.
    ///
    /// Сообщение к этому моменту уже записано в `error` соответствующего хранилища.
    #[error(transparent)]
    Client(#[from] DashboardClientError),

    /// Данные формы не прошли валидацию, запрос не отправлялся.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Ошибка чтения/записи хранилища настроек.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Ошибка (де)сериализации сохранённых настроек.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Результат операций слоя состояния.
pub type StateResult<T> = Result<T, StateError>;
