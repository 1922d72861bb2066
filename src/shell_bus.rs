//! Outbound calls to the running desktop shell.
//!
//! Both calls are fire-and-forget. When no shell owns the bus name the
//! caller drops the request; nothing here is ever fatal.

use crate::errors::domain::{classify_message_by_patterns, DomainError, ErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusErrorCode {
    NoEndpoint,
    CallFailed,
    InvalidPayload,
}

impl ErrorCode for BusErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::NoEndpoint => "no_endpoint",
            Self::CallFailed => "call_failed",
            Self::InvalidPayload => "invalid_payload",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BusError {
    code: BusErrorCode,
    message: String,
}

impl BusError {
    pub fn new(code: BusErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> BusErrorCode {
        self.code
    }

    pub fn from_external_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let code = classify_message_by_patterns(
            &message,
            BUS_CLASSIFICATION_RULES,
            BusErrorCode::CallFailed,
        );
        Self::new(code, message)
    }
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BusError {}

impl DomainError for BusError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

const BUS_CLASSIFICATION_RULES: &[(BusErrorCode, &[&str])] = &[
    (
        BusErrorCode::NoEndpoint,
        &["not running", "no such name", "service unknown"],
    ),
    (BusErrorCode::InvalidPayload, &["invalid json", "invalid payload"]),
];

pub type BusResult<T> = Result<T, BusError>;

pub trait ShellBus {
    fn is_running(&self) -> bool;

    /// Pushes one changed setting to a running spice. `payload` is JSON.
    fn update_setting(
        &mut self,
        uuid: &str,
        instance_id: Option<&str>,
        key: &str,
        payload: &str,
    ) -> BusResult<()>;

    fn highlight_xlet(&mut self, uuid: &str, instance_id: Option<&str>, on: bool) -> BusResult<()>;
}

/// A bus with nobody listening.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShell;

impl ShellBus for NoShell {
    fn is_running(&self) -> bool {
        false
    }

    fn update_setting(
        &mut self,
        uuid: &str,
        _instance_id: Option<&str>,
        _key: &str,
        _payload: &str,
    ) -> BusResult<()> {
        Err(BusError::new(
            BusErrorCode::NoEndpoint,
            format!("shell not running, dropped update for {uuid}"),
        ))
    }

    fn highlight_xlet(&mut self, uuid: &str, _instance_id: Option<&str>, _on: bool) -> BusResult<()> {
        Err(BusError::new(
            BusErrorCode::NoEndpoint,
            format!("shell not running, dropped highlight for {uuid}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_messages_are_classified() {
        assert_eq!(
            BusError::from_external_message("org.Cinnamon: service unknown").code(),
            BusErrorCode::NoEndpoint
        );
        assert_eq!(
            BusError::from_external_message("timeout").code(),
            BusErrorCode::CallFailed
        );
    }

    #[test]
    fn no_shell_reports_missing_endpoint() {
        let mut bus = NoShell;
        assert!(!bus.is_running());
        let err = bus.highlight_xlet("a@b", None, true).unwrap_err();
        assert_eq!(err.code_str(), "no_endpoint");
    }
}
