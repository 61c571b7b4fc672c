use asg::ErrorCategory;
use colored::Colorize;
use derivative::Derivative;
use diagnostics::{Diagnostic, Severity, Show, minimal_filename};
use source_files::{Source, SourceFiles};
use std::{fmt::Display, path::Path};

#[derive(Clone, Debug, Derivative)]
#[derivative(PartialEq, Eq)]
pub struct BindError {
    pub kind: BindErrorKind,

    #[derivative(PartialEq = "ignore")]
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindErrorKind {
    NoCloneCandidate { ty: String },
    AmbiguousClone { ty: String, candidates: Vec<String> },
    UnknownMember { ty: String, name: String },
    NotWritable { ty: String, name: String },
    DuplicateAssignment { name: String },
    TypeMismatch { name: String, expected: String },
    Cancelled,
}

impl BindErrorKind {
    pub fn at(self, source: Source) -> BindError {
        BindError { kind: self, source }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            BindErrorKind::NoCloneCandidate { .. } | BindErrorKind::AmbiguousClone { .. } => {
                Some(ErrorCategory::NoCloneCandidate)
            }
            BindErrorKind::UnknownMember { .. }
            | BindErrorKind::NotWritable { .. }
            | BindErrorKind::DuplicateAssignment { .. }
            | BindErrorKind::TypeMismatch { .. }
            | BindErrorKind::Cancelled => None,
        }
    }
}

impl Display for BindErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindErrorKind::NoCloneCandidate { ty } => write!(
                f,
                "The receiver type '{}' is not a valid record type and is not a struct type",
                ty
            ),
            BindErrorKind::AmbiguousClone { ty, candidates } => write!(
                f,
                "The receiver type '{}' has more than one clone method: {}",
                ty,
                candidates.join(", ")
            ),
            BindErrorKind::UnknownMember { ty, name } => {
                write!(f, "'{}' does not contain a definition for '{}'", ty, name)
            }
            BindErrorKind::NotWritable { ty, name } => write!(
                f,
                "Member '{}.{}' cannot be assigned in a 'with' expression",
                ty, name
            ),
            BindErrorKind::DuplicateAssignment { name } => {
                write!(f, "Member '{}' is assigned more than once", name)
            }
            BindErrorKind::TypeMismatch { name, expected } => write!(
                f,
                "Value assigned to '{}' must be of type '{}'",
                name, expected
            ),
            BindErrorKind::Cancelled => write!(f, "compilation was cancelled"),
        }
    }
}

impl Show for BindError {
    fn show(
        &self,
        w: &mut dyn std::fmt::Write,
        source_files: &SourceFiles,
        project_root: Option<&Path>,
    ) -> std::fmt::Result {
        write!(
            w,
            "{}:{}:{}: {} {}",
            minimal_filename(self.source, source_files, project_root),
            self.source.location.line,
            self.source.location.column,
            "error:".bright_red().bold(),
            self.kind,
        )
    }
}

impl Diagnostic for BindError {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn code(&self) -> Option<&'static str> {
        self.kind.category().map(|category| category.code())
    }
}
