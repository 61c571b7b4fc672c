use derive_more::IsVariant;
use std::fmt::Display;

/// Stable classification attached to every record diagnostic
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum ErrorCategory {
    DuplicateName,
    ShapeMismatch,
    BrokenOverride,
    IllegalSealing,
    NoCloneCandidate,
    MissingCopyConstructor,
    InvalidBase,
    MissingRuntimeSupport,
    InvalidPositional,
    DroppedAttribute,
    UnreadParameter,
    EqualsWithoutHashCode,
}

impl ErrorCategory {
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorCategory::DuplicateName => "duplicate-name",
            ErrorCategory::ShapeMismatch => "shape-mismatch",
            ErrorCategory::BrokenOverride => "broken-override",
            ErrorCategory::IllegalSealing => "illegal-sealing",
            ErrorCategory::NoCloneCandidate => "no-clone-candidate",
            ErrorCategory::MissingCopyConstructor => "missing-copy-constructor",
            ErrorCategory::InvalidBase => "invalid-base",
            ErrorCategory::MissingRuntimeSupport => "missing-runtime-support",
            ErrorCategory::InvalidPositional => "invalid-positional",
            ErrorCategory::DroppedAttribute => "dropped-attribute",
            ErrorCategory::UnreadParameter => "unread-parameter",
            ErrorCategory::EqualsWithoutHashCode => "equals-without-hash-code",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ErrorCategory::DroppedAttribute
                | ErrorCategory::UnreadParameter
                | ErrorCategory::EqualsWithoutHashCode
        )
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
