mod common;

use asg::{BlockReason, ResolutionOutcome, RuntimeSupport, RuntimeSupportKind, SlotKind, Type};
use ast::{AstFile, Expr, MemberDecl, MemberInit, Modifiers, ParamDecl, TypeDecl, TypeName};
use common::{a_and_b, compile, init_logging};
use compiler::{BuildOptions, CancellationToken};
use diagnostics::{DiagnosticFlags, Diagnostics};
use pretty_assertions::assert_eq;
use records::{BindErrorKind, InterpretError, Value, WithScope};
use source_files::{Source, SourceFiles};
use std::num::NonZero;

fn sealed_print_members() -> MemberDecl {
    MemberDecl::method(
        "PrintMembers",
        [ParamDecl::new("builder", TypeName::StringBuilder)],
        TypeName::Bool,
    )
    .protected()
    .with_modifiers(Modifiers::NONE.r#override().sealed())
    .with_body(Expr::bool(false))
}

#[test]
fn test_sealed_print_members_is_rejected_in_open_type() {
    let file = AstFile::new([
        TypeDecl::record("A"),
        TypeDecl::record("B").inherits("A").with_member(sealed_print_members()),
    ]);

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert_eq!(codes, vec!["illegal-sealing"]);
        assert!(matches!(
            compilation.outcome("B", SlotKind::PrintMembers),
            Some(ResolutionOutcome::UserSatisfied(_))
        ));
    });
}

#[test]
fn test_missing_string_builder_leaves_equality_working() {
    let file = AstFile::new(a_and_b())
        .with_runtime(RuntimeSupport::default().without(RuntimeSupportKind::StringBuilder));

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert_eq!(codes, vec!["missing-runtime-support"; 4]);
        assert!(compilation.slot_member("B", SlotKind::ToStringMethod).is_none());

        let interpreter = compilation.interpreter();
        let equal = common::new_b(5).call("Equals", [common::new_b(5)]);
        assert_eq!(interpreter.eval(&equal), Ok(Value::Bool(true)));

        // Falls back to the inherited object implementation
        let b = interpreter.construct("B", vec![Value::Int(5)]).unwrap();
        assert_eq!(interpreter.to_text(&b).unwrap(), "B");
    });
}

#[test]
fn test_cycle_is_reported_once_and_isolated() {
    let file = AstFile::new([
        TypeDecl::record("A").inherits("B"),
        TypeDecl::record("B").inherits("A"),
        TypeDecl::record("C"),
    ]);

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert_eq!(codes, vec!["invalid-base"]);

        let a = compilation.table("A").unwrap();
        assert!(a.status.is_broken());
        assert!(a.slots.is_empty());

        assert!(compilation.table("C").unwrap().status.is_complete());
        assert!(compilation.slot_member("C", SlotKind::CloneMethod).is_some());
    });
}

#[test]
fn test_with_on_class_has_no_clone_candidate() {
    let file = AstFile::new([TypeDecl::class("C")]);

    compile(file, BuildOptions::default(), |compilation, _| {
        let c = Type::Named(compilation.asg().lookup("C").unwrap());
        let inits = [MemberInit::new("X", Expr::int(1))];

        let error = compilation
            .bind_with(&c, &inits, WithScope::outside(Source::internal()))
            .unwrap_err();

        assert_eq!(
            error,
            BindErrorKind::NoCloneCandidate { ty: "C".into() }.at(Source::internal())
        );

        let interpreter = compilation.interpreter();
        let with = Expr::new_object("C", []).with([]);

        assert_eq!(
            interpreter.eval(&with),
            Err(InterpretError::With(BindErrorKind::NoCloneCandidate { ty: "C".into() }))
        );
    });
}

#[test]
fn test_with_rejects_unknown_member() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let b = Type::Named(compilation.asg().lookup("B").unwrap());
        let inits = [MemberInit::new("J", Expr::int(1))];

        let error = compilation
            .bind_with(&b, &inits, WithScope::outside(Source::internal()))
            .unwrap_err();

        assert_eq!(
            error.kind,
            BindErrorKind::UnknownMember {
                ty: "B".into(),
                name: "J".into(),
            }
        );
    });
}

#[test]
fn test_clone_return_type_follows_capability() {
    let clone_return = |covariant_returns: bool| {
        let mut options = BuildOptions::default();
        options.capabilities.covariant_returns = covariant_returns;

        let mut found = None;

        compile(AstFile::new(a_and_b()), options, |compilation, codes| {
            assert!(codes.is_empty(), "{:?}", codes);

            let b = compilation.table("B").unwrap();
            let clone = b.get(b.slot_member(SlotKind::CloneMethod).unwrap().index);
            let ty = clone.value_type().and_then(Type::as_named).unwrap();

            found = Some(compilation.asg().types[ty].name.clone());

            let bound = compilation
                .bind_with(
                    &Type::Named(b.owner),
                    &[],
                    WithScope::outside(Source::internal()),
                )
                .unwrap();
            assert_eq!(bound.needs_cast, !covariant_returns);
        });

        found.unwrap()
    };

    assert_eq!(clone_return(true), "B");
    assert_eq!(clone_return(false), "A");
}

#[test]
fn test_abstract_record_clone_has_no_body() {
    let file = AstFile::new([
        TypeDecl::record("A").r#abstract(),
        TypeDecl::record("B").inherits("A"),
    ]);

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert!(codes.is_empty(), "{:?}", codes);

        let a = compilation.table("A").unwrap();
        let clone = a.get(a.slot_member(SlotKind::CloneMethod).unwrap().index);
        assert!(clone.modifiers.is_abstract);

        let interpreter = compilation.interpreter();
        let copy = Expr::new_object("B", []).with([]).call("Equals", [Expr::new_object("B", [])]);
        assert_eq!(interpreter.eval(&copy), Ok(Value::Bool(true)));
    });
}

#[test]
fn test_user_equals_is_kept() {
    let record = TypeDecl::record("R")
        .with_member(
            MemberDecl::method("Equals", [ParamDecl::new("other", TypeName::named("R"))], TypeName::Bool)
                .public()
                .with_modifiers(Modifiers::NONE.r#virtual())
                .with_body(Expr::bool(true)),
        )
        .with_member(
            MemberDecl::method("GetHashCode", [], TypeName::Int)
                .public()
                .with_modifiers(Modifiers::NONE.r#override())
                .with_body(Expr::int(42)),
        );

    compile(AstFile::new([record]), BuildOptions::default(), |compilation, codes| {
        assert!(codes.is_empty(), "{:?}", codes);
        assert!(matches!(
            compilation.outcome("R", SlotKind::EqualsTyped),
            Some(ResolutionOutcome::UserSatisfied(_))
        ));

        let interpreter = compilation.interpreter();
        let r = interpreter.construct("R", vec![]).unwrap();
        assert_eq!(interpreter.hash(&r), Ok(42));
    });
}

#[test]
fn test_missing_base_copy_constructor_blocks_clone() {
    let base = TypeDecl::record("M")
        .from_metadata()
        .with_member(MemberDecl::constructor("M", []).public())
        .with_member(
            MemberDecl::method("<Clone>$", [], TypeName::named("M"))
                .public()
                .with_modifiers(Modifiers::NONE.r#virtual()),
        );

    let file = AstFile::new([base, TypeDecl::record("R").inherits("M")]);

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert!(codes.contains(&"missing-copy-constructor"), "{:?}", codes);
        assert!(matches!(
            compilation.outcome("R", SlotKind::CopyConstructor),
            Some(ResolutionOutcome::Blocked(BlockReason::MissingBaseCopyConstructor))
        ));
    });
}

#[test]
fn test_parallel_compilation_resolves_every_type() {
    let file = AstFile::new((0..32).map(|index| {
        let record = TypeDecl::record(format!("R{}", index));

        match index {
            0 => record,
            _ => record.inherits(format!("R{}", index - 1)),
        }
    }));

    let mut options = BuildOptions::default();
    options.available_parallelism = NonZero::new(4).unwrap();

    compile(file, options, |compilation, codes| {
        assert!(codes.is_empty(), "{:?}", codes);
        assert_eq!(compilation.stats().num_completed, compilation.asg().types.len());

        let interpreter = compilation.interpreter();
        let text = interpreter.eval(&Expr::new_object("R31", []).call("ToString", []));
        assert_eq!(text, Ok(Value::Str("R31 {  }".into())));
    });
}

#[test]
fn test_cancelled_compilation_publishes_nothing() {
    init_logging();

    let file = AstFile::new(a_and_b());
    let source_files = SourceFiles::new();
    let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
    let asg = records::declare(&file, &source_files, &diagnostics);
    let options = BuildOptions::default();

    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let compiled = records::compile_cancellable(&asg, &diagnostics, &options, cancellation);
    assert!(compiled.is_err());
}
