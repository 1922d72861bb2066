use std::io::ErrorKind;

pub trait ErrorCode {
    #[allow(clippy::wrong_self_convention)]
    fn as_code_str(self) -> &'static str;
}

pub trait DomainError: std::error::Error {
    fn code_str(&self) -> &'static str;
    fn message(&self) -> &str;
}

pub fn classify_message_by_patterns<C: Copy>(
    message: &str,
    rules: &[(C, &[&str])],
    fallback: C,
) -> C {
    let normalized = message.to_ascii_lowercase();
    for &(code, patterns) in rules {
        if patterns.iter().any(|pattern| normalized.contains(pattern)) {
            return code;
        }
    }
    fallback
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorHint {
    NotFound,
    PermissionDenied,
    ReadOnlyFilesystem,
    Other,
}

/// Prefers the portable error kind and falls back to the raw errno, which is
/// where read-only filesystems and `ENOTDIR` show up.
pub fn classify_io_error(error: &std::io::Error) -> IoErrorHint {
    match error.kind() {
        ErrorKind::NotFound => IoErrorHint::NotFound,
        ErrorKind::PermissionDenied => IoErrorHint::PermissionDenied,
        _ => error
            .raw_os_error()
            .map(classify_raw_os_error)
            .unwrap_or(IoErrorHint::Other),
    }
}

pub fn classify_raw_os_error(raw: i32) -> IoErrorHint {
    #[cfg(unix)]
    {
        return match raw {
            1 | 13 => IoErrorHint::PermissionDenied, // EPERM | EACCES
            2 | 20 => IoErrorHint::NotFound,         // ENOENT | ENOTDIR
            30 => IoErrorHint::ReadOnlyFilesystem,   // EROFS
            _ => IoErrorHint::Other,
        };
    }

    #[allow(unreachable_code)]
    {
        let _ = raw;
        IoErrorHint::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Code {
        Missing,
        Broken,
        Other,
    }

    const RULES: &[(Code, &[&str])] = &[
        (Code::Missing, &["not found", "no such file"]),
        (Code::Broken, &["failed to parse"]),
    ];

    #[test]
    fn classifies_by_first_matching_rule() {
        assert_eq!(
            classify_message_by_patterns("No such file or directory", RULES, Code::Other),
            Code::Missing
        );
        assert_eq!(
            classify_message_by_patterns("Failed to parse value", RULES, Code::Other),
            Code::Broken
        );
        assert_eq!(
            classify_message_by_patterns("boom", RULES, Code::Other),
            Code::Other
        );
    }

    #[test]
    fn io_not_found_maps_to_hint() {
        let error = std::io::Error::new(ErrorKind::NotFound, "gone");
        assert_eq!(classify_io_error(&error), IoErrorHint::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn not_a_directory_counts_as_missing() {
        assert_eq!(classify_raw_os_error(20), IoErrorHint::NotFound);
        assert_eq!(classify_raw_os_error(30), IoErrorHint::ReadOnlyFilesystem);
    }
}
