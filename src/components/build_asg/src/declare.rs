use crate::error::DeclareErrorKind;
use asg::{Asg, TypeKind, TypeRef, TypeSymbol};
use ast::{TypeDecl, TypeDeclKind};
use diagnostics::Diagnostics;

/// Creates one symbol per uniquely named declaration
pub fn declare_types<'d>(
    asg: &mut Asg,
    decls: &'d [TypeDecl],
    diagnostics: &Diagnostics,
) -> Vec<(TypeRef, &'d TypeDecl)> {
    let mut declared = Vec::with_capacity(decls.len());

    for decl in decls {
        if asg.names.contains_key(&decl.name) {
            diagnostics.push(
                DeclareErrorKind::DuplicateType {
                    name: decl.name.clone(),
                }
                .at(decl.source),
            );
            continue;
        }

        let type_ref = asg.types.insert(TypeSymbol {
            name: decl.name.clone(),
            kind: match decl.kind {
                TypeDeclKind::Record => TypeKind::Record,
                TypeDeclKind::Class => TypeKind::Class,
            },
            origin: decl.origin,
            privacy: decl.privacy,
            base: None,
            base_args: None,
            is_sealed: decl.is_sealed,
            is_abstract: decl.is_abstract,
            positional: None,
            declared: vec![],
            in_cycle: false,
            source: decl.source,
        });

        asg.names.insert(decl.name.clone(), type_ref);
        declared.push((type_ref, decl));
    }

    declared
}
