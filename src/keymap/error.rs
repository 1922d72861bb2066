use crate::errors::domain::{
    classify_io_error, classify_message_by_patterns, DomainError, ErrorCode, IoErrorHint,
};
use crate::settings::{StoreError, StoreErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeybindingErrorCode {
    SourceUnavailable,
    MalformedData,
    UnknownBinding,
    InvalidSlot,
    StoreFailed,
    WriteFailed,
    UnknownError,
}

impl ErrorCode for KeybindingErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::MalformedData => "malformed_data",
            Self::UnknownBinding => "unknown_binding",
            Self::InvalidSlot => "invalid_slot",
            Self::StoreFailed => "store_failed",
            Self::WriteFailed => "write_failed",
            Self::UnknownError => "unknown_error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeybindingError {
    code: KeybindingErrorCode,
    message: String,
}

impl KeybindingError {
    pub fn new(code: KeybindingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> KeybindingErrorCode {
        self.code
    }

    pub fn from_external_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let code = classify_message_by_patterns(
            &message,
            KEYBINDING_CLASSIFICATION_RULES,
            KeybindingErrorCode::UnknownError,
        );
        Self::new(code, message)
    }

    pub fn from_io_error(
        fallback: KeybindingErrorCode,
        context: impl Into<String>,
        error: std::io::Error,
    ) -> Self {
        let code = match classify_io_error(&error) {
            IoErrorHint::NotFound | IoErrorHint::PermissionDenied => {
                KeybindingErrorCode::SourceUnavailable
            }
            _ => fallback,
        };
        Self::new(code, format!("{}: {error}", context.into()))
    }

    /// Store failures keep their own message; missing keys mean the schema
    /// is not installed.
    pub fn from_store_error(error: StoreError) -> Self {
        let code = match error.code() {
            StoreErrorCode::UnknownKey | StoreErrorCode::OpenFailed => {
                KeybindingErrorCode::SourceUnavailable
            }
            StoreErrorCode::ParseFailed | StoreErrorCode::TypeMismatch => {
                KeybindingErrorCode::MalformedData
            }
            _ => KeybindingErrorCode::StoreFailed,
        };
        Self::new(code, error.to_string())
    }
}

impl From<StoreError> for KeybindingError {
    fn from(error: StoreError) -> Self {
        Self::from_store_error(error)
    }
}

impl fmt::Display for KeybindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for KeybindingError {}

impl DomainError for KeybindingError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type KeybindingResult<T> = Result<T, KeybindingError>;

const KEYBINDING_CLASSIFICATION_RULES: &[(KeybindingErrorCode, &[&str])] = &[
    (
        KeybindingErrorCode::MalformedData,
        &["failed to parse", "is not a json object", "not a keybinding"],
    ),
    (
        KeybindingErrorCode::SourceUnavailable,
        &["no such file or directory", "not found"],
    ),
    (
        KeybindingErrorCode::WriteFailed,
        &["failed to write", "failed to serialize"],
    ),
];
