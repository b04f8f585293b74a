use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CLI_INVALID: {0}")]
    Cli(String),
    #[error("STORE_INIT: {0}")]
    StoreInit(String),
    #[error("STORE_FAILURE: {0}")]
    Store(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    /// Re-labels a store failure raised while opening or migrating the database.
    pub fn into_init(self) -> Self {
        match self {
            Self::Store(message) | Self::Internal(message) | Self::Io(message) => Self::StoreInit(message),
            other => other,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn store_errors_relabel_as_init_failures() {
        let error = AppError::Store("disk I/O error".to_string()).into_init();
        assert!(matches!(error, AppError::StoreInit(_)));
        assert_eq!(error.to_string(), "STORE_INIT: disk I/O error");

        let untouched = AppError::NotFound("habit".to_string()).into_init();
        assert!(matches!(untouched, AppError::NotFound(_)));
    }

    #[test]
    fn rusqlite_errors_map_to_store_failures() {
        let error: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, AppError::Store(_)));
    }
}
