use asg::{BlockReason, ErrorCategory, MismatchReason, RuntimeSupportKind, SlotKind};
use colored::Colorize;
use diagnostics::{Diagnostic, Severity, Show, minimal_filename};
use source_files::{Source, SourceFiles};
use std::{fmt::Display, path::Path};

#[derive(Clone, Debug)]
pub struct RecordError {
    pub kind: RecordErrorKind,
    pub source: Source,
}

#[derive(Clone, Debug)]
pub enum RecordErrorKind {
    DuplicateParameter {
        name: String,
    },
    PositionalConflictsWithMember {
        record: String,
        name: String,
    },
    DuplicatePrimaryConstructor {
        record: String,
    },
    InheritedPositionalMismatch {
        name: String,
        base: String,
        reason: MismatchReason,
    },
    RequiredAfterOptional {
        name: String,
    },
    NoMatchingConstructor {
        ty: String,
        arity: usize,
    },
    MustChainToPrimaryConstructor {
        record: String,
    },
    SlotShapeMismatch {
        member: String,
        slot: SlotKind,
        reason: MismatchReason,
    },
    NoSuitableOverride {
        member: String,
    },
    MissingOverride {
        record: String,
        slot: SlotKind,
        base_member: String,
    },
    OverridesSealed {
        member: String,
        base_member: String,
    },
    AbstractAndSealed {
        record: String,
    },
    MustAllowOverriding {
        member: String,
        record: String,
    },
    AmbiguousOverride {
        record: String,
        slot: SlotKind,
        candidates: Vec<String>,
    },
    MissingBaseCopyConstructor {
        record: String,
        base: String,
    },
    MissingRuntimeSupport {
        record: String,
        slot: SlotKind,
        support: RuntimeSupportKind,
    },
    DroppedAttribute {
        attribute: String,
        reason: String,
    },
    UnreadParameter {
        name: String,
    },
    EqualsWithoutHashCode {
        record: String,
    },
}

impl RecordErrorKind {
    pub fn at(self, source: Source) -> RecordError {
        RecordError { kind: self, source }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RecordErrorKind::DuplicateParameter { .. }
            | RecordErrorKind::PositionalConflictsWithMember { .. }
            | RecordErrorKind::DuplicatePrimaryConstructor { .. } => ErrorCategory::DuplicateName,
            RecordErrorKind::InheritedPositionalMismatch { .. }
            | RecordErrorKind::SlotShapeMismatch { .. } => ErrorCategory::ShapeMismatch,
            RecordErrorKind::RequiredAfterOptional { .. }
            | RecordErrorKind::NoMatchingConstructor { .. }
            | RecordErrorKind::MustChainToPrimaryConstructor { .. } => {
                ErrorCategory::InvalidPositional
            }
            RecordErrorKind::NoSuitableOverride { .. }
            | RecordErrorKind::MissingOverride { .. }
            | RecordErrorKind::OverridesSealed { .. }
            | RecordErrorKind::AmbiguousOverride { .. } => ErrorCategory::BrokenOverride,
            RecordErrorKind::AbstractAndSealed { .. } | RecordErrorKind::MustAllowOverriding { .. } => {
                ErrorCategory::IllegalSealing
            }
            RecordErrorKind::MissingBaseCopyConstructor { .. } => {
                ErrorCategory::MissingCopyConstructor
            }
            RecordErrorKind::MissingRuntimeSupport { .. } => ErrorCategory::MissingRuntimeSupport,
            RecordErrorKind::DroppedAttribute { .. } => ErrorCategory::DroppedAttribute,
            RecordErrorKind::UnreadParameter { .. } => ErrorCategory::UnreadParameter,
            RecordErrorKind::EqualsWithoutHashCode { .. } => ErrorCategory::EqualsWithoutHashCode,
        }
    }

    /// Errors implied by a slot that could not be filled
    pub fn from_block(record: &str, slot: SlotKind, reason: &BlockReason) -> Option<Self> {
        match reason {
            BlockReason::MissingRuntimeSupport(support) => {
                Some(RecordErrorKind::MissingRuntimeSupport {
                    record: record.into(),
                    slot,
                    support: *support,
                })
            }
            BlockReason::MissingBaseCopyConstructor
            | BlockReason::MissingCopyConstructor
            | BlockReason::DependsOn(_)
            | BlockReason::RejectedPositional
            | BlockReason::BrokenBase => None,
        }
    }
}

impl Display for RecordErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordErrorKind::DuplicateParameter { name } => {
                write!(f, "The parameter name '{}' is a duplicate", name)
            }
            RecordErrorKind::PositionalConflictsWithMember { record, name } => write!(
                f,
                "Record '{}' already contains a member '{}' that cannot back the positional parameter",
                record, name
            ),
            RecordErrorKind::DuplicatePrimaryConstructor { record } => write!(
                f,
                "Record '{}' already defines a constructor with the same parameter types",
                record
            ),
            RecordErrorKind::InheritedPositionalMismatch { name, base, reason } => write!(
                f,
                "Positional parameter '{}' cannot bind to member '{}.{}': {}",
                name, base, name, reason
            ),
            RecordErrorKind::RequiredAfterOptional { name } => write!(
                f,
                "Required parameter '{}' cannot follow an optional parameter",
                name
            ),
            RecordErrorKind::NoMatchingConstructor { ty, arity } => write!(
                f,
                "Type '{}' has no accessible constructor that takes {} argument{}",
                ty,
                arity,
                if *arity == 1 { "" } else { "s" }
            ),
            RecordErrorKind::MustChainToPrimaryConstructor { record } => write!(
                f,
                "A constructor declared in record '{}' with a parameter list must have a 'this' constructor initializer",
                record
            ),
            RecordErrorKind::SlotShapeMismatch {
                member,
                slot,
                reason,
            } => write!(f, "'{}' cannot serve as the {}: {}", member, slot, reason),
            RecordErrorKind::NoSuitableOverride { member } => {
                write!(f, "'{}': no suitable member found to override", member)
            }
            RecordErrorKind::MissingOverride {
                record,
                slot,
                base_member,
            } => write!(
                f,
                "Record '{}' must override '{}' to provide its {}",
                record, base_member, slot
            ),
            RecordErrorKind::OverridesSealed {
                member,
                base_member,
            } => write!(
                f,
                "'{}' cannot override inherited member '{}' because it is sealed",
                member, base_member
            ),
            RecordErrorKind::AbstractAndSealed { record } => {
                write!(f, "Record '{}' cannot be both abstract and sealed", record)
            }
            RecordErrorKind::MustAllowOverriding { member, record } => write!(
                f,
                "'{}' must allow overriding because the containing type '{}' is not sealed",
                member, record
            ),
            RecordErrorKind::AmbiguousOverride {
                record,
                slot,
                candidates,
            } => write!(
                f,
                "The {} of record '{}' is ambiguous between {}",
                slot,
                record,
                candidates.join(" and ")
            ),
            RecordErrorKind::MissingBaseCopyConstructor { record, base } => write!(
                f,
                "Record '{}' requires an accessible copy constructor in base type '{}'",
                record, base
            ),
            RecordErrorKind::MissingRuntimeSupport {
                record,
                slot,
                support,
            } => write!(
                f,
                "Cannot synthesize the {} of record '{}' because runtime support for '{}' is missing",
                slot, record, support
            ),
            RecordErrorKind::DroppedAttribute { attribute, reason } => {
                write!(f, "Attribute '{}' is ignored: {}", attribute, reason)
            }
            RecordErrorKind::UnreadParameter { name } => write!(
                f,
                "Parameter '{}' is unread. Did you forget to use it to initialize the property with that name?",
                name
            ),
            RecordErrorKind::EqualsWithoutHashCode { record } => write!(
                f,
                "Record '{}' defines 'Equals' but not 'GetHashCode'",
                record
            ),
        }
    }
}

impl Show for RecordError {
    fn show(
        &self,
        w: &mut dyn std::fmt::Write,
        source_files: &SourceFiles,
        project_root: Option<&Path>,
    ) -> std::fmt::Result {
        let label = if self.kind.category().is_warning() {
            "warning:".yellow().bold()
        } else {
            "error:".bright_red().bold()
        };

        write!(
            w,
            "{}:{}:{}: {} {}",
            minimal_filename(self.source, source_files, project_root),
            self.source.location.line,
            self.source.location.column,
            label,
            self.kind,
        )
    }
}

impl Diagnostic for RecordError {
    fn severity(&self) -> Severity {
        if self.kind.category().is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    fn code(&self) -> Option<&'static str> {
        Some(self.kind.category().code())
    }
}
