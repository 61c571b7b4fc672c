use asg::ErrorCategory;
use colored::Colorize;
use diagnostics::{Diagnostic, Severity, Show, minimal_filename};
use source_files::{Source, SourceFiles};
use std::{fmt::Display, path::Path};

#[derive(Clone, Debug)]
pub struct DeclareError {
    pub kind: DeclareErrorKind,
    pub source: Source,
}

#[derive(Clone, Debug)]
pub enum DeclareErrorKind {
    DuplicateType { name: String },
    UndeclaredType { name: String },
    RecordInheritsClass { record: String, base: String },
    ClassInheritsRecord { class: String, base: String },
    InheritsSealed { name: String, base: String },
    CyclicBase { cycle: Vec<String> },
}

impl DeclareErrorKind {
    pub fn at(self, source: Source) -> DeclareError {
        DeclareError { kind: self, source }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DeclareErrorKind::DuplicateType { .. } => ErrorCategory::DuplicateName,
            DeclareErrorKind::UndeclaredType { .. }
            | DeclareErrorKind::RecordInheritsClass { .. }
            | DeclareErrorKind::ClassInheritsRecord { .. }
            | DeclareErrorKind::InheritsSealed { .. }
            | DeclareErrorKind::CyclicBase { .. } => ErrorCategory::InvalidBase,
        }
    }
}

impl Display for DeclareErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclareErrorKind::DuplicateType { name } => {
                write!(f, "Type '{}' is already declared", name)
            }
            DeclareErrorKind::UndeclaredType { name } => write!(f, "Undeclared type '{}'", name),
            DeclareErrorKind::RecordInheritsClass { record, base } => write!(
                f,
                "Record '{}' cannot inherit from '{}' because it is not a record",
                record, base
            ),
            DeclareErrorKind::ClassInheritsRecord { class, base } => write!(
                f,
                "Class '{}' cannot inherit from record '{}'",
                class, base
            ),
            DeclareErrorKind::InheritsSealed { name, base } => {
                write!(f, "Type '{}' cannot derive from sealed type '{}'", name, base)
            }
            DeclareErrorKind::CyclicBase { cycle } => {
                write!(f, "Circular base type dependency {}", cycle.join(" -> "))
            }
        }
    }
}

impl Show for DeclareError {
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

impl Diagnostic for DeclareError {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn code(&self) -> Option<&'static str> {
        Some(self.kind.category().code())
    }
}
