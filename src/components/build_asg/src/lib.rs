mod bind;
mod cycle;
mod declare;
mod error;

use asg::Asg;
use ast::AstFile;
pub use bind::bind_type;
use diagnostics::Diagnostics;
pub use error::{DeclareError, DeclareErrorKind};
use source_files::SourceFiles;

/// Builds the symbol table for a file of declarations.
/// Base chains are validated and cycles flagged before any member
/// synthesis takes place.
#[tracing::instrument(skip_all, fields(types = file.types.len()))]
pub fn build_asg<'a>(
    file: &AstFile,
    source_files: &'a SourceFiles,
    diagnostics: &Diagnostics,
) -> Asg<'a> {
    let mut asg = Asg::new(source_files, file.runtime);

    for attribute_class in file.attribute_classes.iter() {
        asg.attribute_classes
            .insert(attribute_class.name.clone(), attribute_class.valid_on);
    }

    let declared = declare::declare_types(&mut asg, &file.types, diagnostics);
    bind::bind_types(&mut asg, &declared, diagnostics);
    cycle::mark_cycles(&mut asg, diagnostics);

    asg
}

#[cfg(test)]
mod tests {
    use super::*;
    use asg::Type;
    use ast::{MemberDecl, PositionalParam, TypeDecl, TypeName};
    use diagnostics::DiagnosticFlags;
    use pretty_assertions::assert_eq;

    fn build(types: Vec<TypeDecl>) -> (Vec<String>, Vec<(String, bool, Option<String>)>) {
        colored::control::set_override(false);

        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let asg = build_asg(&AstFile::new(types), &source_files, &diagnostics);

        let summary = asg
            .types
            .values()
            .map(|symbol| {
                (
                    symbol.name.clone(),
                    symbol.in_cycle,
                    symbol.base.map(|base| asg.types[base].name.clone()),
                )
            })
            .collect();

        let messages = diagnostics
            .render_all()
            .into_iter()
            .map(|message| {
                message
                    .split_once("error: ")
                    .map(|(_, rest)| rest.to_string())
                    .unwrap_or(message)
            })
            .collect();

        (messages, summary)
    }

    #[test]
    fn test_binds_record_chain() {
        let (messages, summary) = build(vec![
            TypeDecl::record("B")
                .inherits("A")
                .with_params([PositionalParam::new("I", TypeName::Int)]),
            TypeDecl::record("A"),
        ]);

        assert!(messages.is_empty());
        assert_eq!(
            summary,
            vec![
                ("object".into(), false, None),
                ("B".into(), false, Some("A".into())),
                ("A".into(), false, Some("object".into())),
            ]
        );
    }

    #[test]
    fn test_record_cannot_inherit_class() {
        let (messages, summary) = build(vec![
            TypeDecl::class("C"),
            TypeDecl::record("R").inherits("C"),
            TypeDecl::class("D").inherits("R"),
        ]);

        assert_eq!(
            messages,
            vec![
                "Record 'R' cannot inherit from 'C' because it is not a record".to_string(),
                "Class 'D' cannot inherit from record 'R'".to_string(),
            ]
        );
        assert_eq!(summary[2].2.as_deref(), Some("object"));
        assert_eq!(summary[3].2.as_deref(), Some("object"));
    }

    #[test]
    fn test_cycle_reported_once() {
        let (messages, summary) = build(vec![
            TypeDecl::record("A").inherits("B"),
            TypeDecl::record("B").inherits("A"),
            TypeDecl::record("C").inherits("A"),
            TypeDecl::record("D"),
        ]);

        assert_eq!(
            messages,
            vec!["Circular base type dependency A -> B -> A".to_string()]
        );

        let in_cycle = summary
            .iter()
            .map(|(name, in_cycle, _)| (name.as_str(), *in_cycle))
            .collect::<Vec<_>>();

        assert_eq!(
            in_cycle,
            vec![
                ("object", false),
                ("A", true),
                ("B", true),
                ("C", true),
                ("D", false),
            ]
        );
    }

    #[test]
    fn test_undeclared_member_type() {
        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let file = AstFile::new([TypeDecl::record("R")
            .with_member(MemberDecl::property("P", TypeName::named("Missing")).public())]);

        let asg = build_asg(&file, &source_files, &diagnostics);
        let record = asg.lookup("R").unwrap();

        assert_eq!(diagnostics.num_errors(), 1);
        assert_eq!(
            asg.types[record].declared[0].value_type(),
            Some(&Type::Error)
        );
    }

    #[test]
    fn test_duplicate_type_is_skipped() {
        let (messages, summary) = build(vec![TypeDecl::record("A"), TypeDecl::class("A")]);

        assert_eq!(messages, vec!["Type 'A' is already declared".to_string()]);
        assert_eq!(summary.len(), 2);
    }
}
