use crate::errors::domain::{
    classify_io_error, classify_message_by_patterns, DomainError, ErrorCode, IoErrorHint,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    DataDirUnavailable,
    PermissionDenied,
    ReadOnlyFilesystem,
    OpenFailed,
    SchemaInitFailed,
    ReadFailed,
    WriteFailed,
    SerializeFailed,
    ParseFailed,
    UnknownKey,
    TypeMismatch,
    UnknownError,
}

impl ErrorCode for StoreErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::DataDirUnavailable => "data_dir_unavailable",
            Self::PermissionDenied => "permission_denied",
            Self::ReadOnlyFilesystem => "read_only_filesystem",
            Self::OpenFailed => "open_failed",
            Self::SchemaInitFailed => "schema_init_failed",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
            Self::SerializeFailed => "serialize_failed",
            Self::ParseFailed => "parse_failed",
            Self::UnknownKey => "unknown_key",
            Self::TypeMismatch => "type_mismatch",
            Self::UnknownError => "unknown_error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    pub fn from_external_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let code = classify_message_by_patterns(
            &message,
            STORE_CLASSIFICATION_RULES,
            StoreErrorCode::UnknownError,
        );
        Self::new(code, message)
    }

    pub fn from_io_error(
        fallback: StoreErrorCode,
        context: impl Into<String>,
        error: std::io::Error,
    ) -> Self {
        let code = match classify_io_error(&error) {
            IoErrorHint::PermissionDenied => StoreErrorCode::PermissionDenied,
            IoErrorHint::ReadOnlyFilesystem => StoreErrorCode::ReadOnlyFilesystem,
            _ => fallback,
        };
        Self::new(code, format!("{}: {error}", context.into()))
    }

    pub fn from_sqlite_error(
        fallback: StoreErrorCode,
        context: impl Into<String>,
        error: rusqlite::Error,
    ) -> Self {
        let code = match &error {
            rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
                rusqlite::ffi::ErrorCode::PermissionDenied => StoreErrorCode::PermissionDenied,
                rusqlite::ffi::ErrorCode::ReadOnly => StoreErrorCode::ReadOnlyFilesystem,
                rusqlite::ffi::ErrorCode::CannotOpen => StoreErrorCode::OpenFailed,
                _ => fallback,
            },
            _ => fallback,
        };
        Self::new(code, format!("{}: {error}", context.into()))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StoreError {}

impl DomainError for StoreError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

const STORE_CLASSIFICATION_RULES: &[(StoreErrorCode, &[&str])] = &[
    (
        StoreErrorCode::DataDirUnavailable,
        &[
            "could not resolve data directory",
            "failed to create data dir",
        ],
    ),
    (StoreErrorCode::SerializeFailed, &["failed to serialize"]),
    (StoreErrorCode::ParseFailed, &["failed to parse"]),
    (StoreErrorCode::UnknownKey, &["no such key"]),
    (StoreErrorCode::TypeMismatch, &["expects a value of type"]),
];
