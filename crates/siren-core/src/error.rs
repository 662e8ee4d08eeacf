use std::fmt;

/// Machine-readable error codes for scripts and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    AuthenticationFailed,
    IncidentNotFound,
    InvalidStateTransition,
    InvalidEnumValue,
    InvalidDraft,
    CorruptStorage,
    StorageWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::AuthenticationFailed => "E1101",
            Self::IncidentNotFound => "E2001",
            Self::InvalidStateTransition => "E2002",
            Self::InvalidEnumValue => "E2005",
            Self::InvalidDraft => "E2006",
            Self::CorruptStorage => "E3003",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in config.toml and retry."),
            Self::AuthenticationFailed => Some("Check the username and password."),
            Self::IncidentNotFound => None,
            Self::InvalidStateTransition => {
                Some("Resolved incidents cannot change status or resources.")
            }
            Self::InvalidEnumValue => Some("Use one of the documented type/status values."),
            Self::InvalidDraft => Some("Provide a location, a description, and complete party data."),
            Self::CorruptStorage => Some(
                "Remove or repair the incidents file, or set storage.on_corrupt = \"seed\".",
            ),
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `siren` process finishes."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
