mod show;

use append_only_vec::AppendOnlyVec;
use core::fmt::Debug;
use derive_more::IsVariant;
pub use show::{Show, minimal_filename};
use source_files::SourceFiles;
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum Severity {
    Error,
    Warning,
}

pub trait Diagnostic: Show + Send + Sync {
    fn severity(&self) -> Severity;

    /// Stable machine-readable category, if this diagnostic has one
    fn code(&self) -> Option<&'static str> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct DiagnosticFlags {
    pub print_without_collecting: bool,
    pub project_root: Option<PathBuf>,
}

impl DiagnosticFlags {
    pub fn collecting() -> Self {
        Self {
            print_without_collecting: false,
            project_root: None,
        }
    }
}

impl Default for DiagnosticFlags {
    fn default() -> Self {
        Self {
            print_without_collecting: true,
            project_root: None,
        }
    }
}

pub struct Diagnostics<'a> {
    source_files: &'a SourceFiles,
    diagnostics: AppendOnlyVec<Box<dyn Diagnostic>>,
    num_errors: AtomicUsize,
    num_warnings: AtomicUsize,
    flags: DiagnosticFlags,
}

impl<'a> Debug for Diagnostics<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

impl<'a> Diagnostics<'a> {
    pub fn new(source_files: &'a SourceFiles, flags: DiagnosticFlags) -> Self {
        Self {
            source_files,
            diagnostics: AppendOnlyVec::new(),
            num_errors: AtomicUsize::new(0),
            num_warnings: AtomicUsize::new(0),
            flags,
        }
    }

    pub fn flags(&self) -> &DiagnosticFlags {
        &self.flags
    }

    pub fn source_files(&self) -> &'a SourceFiles {
        self.source_files
    }

    pub fn push(&self, diagnostic: impl Diagnostic + 'static) {
        match diagnostic.severity() {
            Severity::Error => self.num_errors.fetch_add(1, Ordering::Relaxed),
            Severity::Warning => self.num_warnings.fetch_add(1, Ordering::Relaxed),
        };

        if self.flags.print_without_collecting {
            self.print(&diagnostic);
        } else {
            self.diagnostics.push(Box::new(diagnostic));
        }
    }

    pub fn num_errors(&self) -> usize {
        self.num_errors.load(Ordering::Relaxed)
    }

    pub fn num_warnings(&self) -> usize {
        self.num_warnings.load(Ordering::Relaxed)
    }

    pub fn has_errors(&self) -> bool {
        self.num_errors() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Diagnostic + 'static)> {
        self.diagnostics.iter().map(|diagnostic| &**diagnostic)
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.iter().filter_map(|diagnostic| diagnostic.code()).collect()
    }

    pub fn render(&self, diagnostic: &dyn Diagnostic) -> String {
        let mut message = String::new();
        let project_root = self.flags.project_root.as_deref();

        // Writing into a `String` cannot fail
        let _ = diagnostic.show(&mut message, self.source_files, project_root);
        message
    }

    pub fn render_all(&self) -> Vec<String> {
        self.iter().map(|diagnostic| self.render(diagnostic)).collect()
    }

    pub fn print_all(&self) {
        for diagnostic in self.iter() {
            self.print(diagnostic);
        }
    }

    pub fn print(&self, diagnostic: &dyn Diagnostic) {
        eprintln!("{}", self.render(diagnostic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::Colorize;
    use source_files::{Location, Source};
    use std::path::Path;

    struct Note {
        severity: Severity,
        message: &'static str,
        source: Option<Source>,
    }

    impl Show for Note {
        fn show(
            &self,
            w: &mut dyn std::fmt::Write,
            source_files: &SourceFiles,
            project_root: Option<&Path>,
        ) -> std::fmt::Result {
            let label = match self.severity {
                Severity::Error => "error:".bright_red().bold(),
                Severity::Warning => "warning:".yellow().bold(),
            };

            match self.source {
                Some(source) => write!(
                    w,
                    "{}:{}:{}: {} {}",
                    minimal_filename(source, source_files, project_root),
                    source.location.line,
                    source.location.column,
                    label,
                    self.message
                ),
                None => write!(w, "{} {}", label, self.message),
            }
        }
    }

    impl Diagnostic for Note {
        fn severity(&self) -> Severity {
            self.severity
        }

        fn code(&self) -> Option<&'static str> {
            self.severity.is_warning().then_some("note")
        }
    }

    #[test]
    fn test_collects_and_counts() {
        colored::control::set_override(false);

        let source_files = SourceFiles::new();
        let key = source_files.add("people.rec".into(), String::new());
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());

        diagnostics.push(Note {
            severity: Severity::Error,
            message: "Record 'Person' is broken",
            source: Some(Source::new(key, Location::new(3, 7))),
        });
        diagnostics.push(Note {
            severity: Severity::Warning,
            message: "Something looks off",
            source: None,
        });

        assert_eq!(diagnostics.num_errors(), 1);
        assert_eq!(diagnostics.num_warnings(), 1);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.codes(), vec!["note"]);
        assert_eq!(
            diagnostics.render_all(),
            vec![
                "people.rec:3:7: error: Record 'Person' is broken".to_string(),
                "warning: Something looks off".to_string(),
            ]
        );
    }
}
