mod ctx;
mod error;
mod executor;
mod link;
mod positional;
mod routing;
mod shape;
mod slots;
mod synthesize;
mod typer;
mod validate;

pub use asg::ErrorCategory;
use compiler::Cancelled;
pub use ctx::RecordCtx;
pub use error::{RecordError, RecordErrorKind};
pub use executor::{Executor, ExecutorStats};
pub use positional::select_constructor;
pub use shape::{AccessRule, MemberShape, RecordShape, ReturnRule, ShapeRule, VirtualityRule, shape_rule};
pub use slots::record_shape;
pub use typer::{MemberLookup, TableLookup, Typer};

/// Publishes the member table of every type in the program.
/// Tables are computed in parallel, each only after its base type.
pub fn build_records(ctx: &RecordCtx) -> Result<ExecutorStats, Cancelled> {
    Executor::new(ctx).start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use asg::{
        Asg, BlockReason, MemberOrigin, MemberTable, ResolutionOutcome, RuntimeSupportKind,
        SlotKind, Type,
    };
    use ast::{
        AccessorDecl, Annotation, AstFile, Expr, MemberDecl, Modifiers, ParamDecl,
        PositionalParam, TypeDecl, TypeName,
    };
    use attributes::Privacy;
    use compiler::{BuildOptions, CancellationToken};
    use diagnostics::{DiagnosticFlags, Diagnostics};
    use pretty_assertions::assert_eq;
    use source_files::SourceFiles;
    use std::num::NonZero;

    fn check(file: AstFile, options: BuildOptions, f: impl FnOnce(&RecordCtx, Vec<&'static str>)) {
        colored::control::set_override(false);

        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let asg = build_asg::build_asg(&file, &source_files, &diagnostics);
        let ctx = RecordCtx::new(&asg, &diagnostics, &options);

        build_records(&ctx).unwrap();
        f(&ctx, diagnostics.codes());
    }

    fn table<'c>(ctx: &'c RecordCtx, name: &str) -> &'c MemberTable {
        ctx.published(ctx.asg.lookup(name).unwrap()).unwrap()
    }

    fn named(asg: &Asg, name: &str) -> Type {
        Type::Named(asg.lookup(name).unwrap())
    }

    fn a_and_b() -> Vec<TypeDecl> {
        vec![
            TypeDecl::record("A"),
            TypeDecl::record("B")
                .inherits("A")
                .with_params([PositionalParam::new("I", TypeName::Int)]),
        ]
    }

    /// A record compiled elsewhere, declaring the members a record provides
    fn metadata_record(name: &str, copy_constructor: Privacy) -> TypeDecl {
        let own = || TypeName::named(name);
        let r#virtual = Modifiers::NONE.r#virtual();

        TypeDecl::record(name)
            .from_metadata()
            .with_member(
                MemberDecl::property("EqualityContract", TypeName::TypeToken)
                    .protected()
                    .with_modifiers(r#virtual)
                    .with_accessors(Some(AccessorDecl::get()), None),
            )
            .with_member(
                MemberDecl::method("Equals", [ParamDecl::new("other", own())], TypeName::Bool)
                    .public()
                    .with_modifiers(r#virtual),
            )
            .with_member(
                MemberDecl::method("GetHashCode", [], TypeName::Int)
                    .public()
                    .with_modifiers(Modifiers::NONE.r#override()),
            )
            .with_member(
                MemberDecl::method(
                    "PrintMembers",
                    [ParamDecl::new("builder", TypeName::StringBuilder)],
                    TypeName::Bool,
                )
                .protected()
                .with_modifiers(r#virtual),
            )
            .with_member(MemberDecl::constructor(name, []).public())
            .with_member(
                MemberDecl::constructor(name, [ParamDecl::new("original", own())])
                    .with_privacy(copy_constructor),
            )
            .with_member(MemberDecl::method("<Clone>$", [], own()).public().with_modifiers(r#virtual))
    }

    #[test]
    fn test_positional_record_members() {
        check(AstFile::new(a_and_b()), BuildOptions::single_threaded(), |ctx, codes| {
            assert!(codes.is_empty(), "{:?}", codes);

            let b = table(ctx, "B");
            let property = b.named("I").next().unwrap().1;

            assert_eq!(property.origin, MemberOrigin::Positional(0));
            assert!(property.allows_initializer_write());
            assert_eq!(b.positional.len(), 1);

            let primary = b.get(b.primary_constructor.unwrap());
            assert_eq!(primary.param_types().collect::<Vec<_>>(), vec![&Type::Int]);

            let a_equals = table(ctx, "A").slot_member(SlotKind::EqualsTyped).unwrap();

            assert!(table(ctx, "A").outcome(SlotKind::BaseEquals).unwrap().is_omitted());
            assert!(matches!(
                b.outcome(SlotKind::BaseEquals),
                Some(ResolutionOutcome::Synthesize(target)) if target.member() == Some(a_equals)
            ));
        });
    }

    #[test]
    fn test_every_slot_is_settled() {
        check(AstFile::new(a_and_b()), BuildOptions::single_threaded(), |ctx, _| {
            let b = table(ctx, "B");

            let settled = SlotKind::ALL
                .iter()
                .filter(|slot| b.slot_member(**slot).is_some())
                .count();

            assert_eq!(b.slots.len(), SlotKind::ALL.len());
            assert_eq!(settled, SlotKind::ALL.len());
        });
    }

    #[test]
    fn test_user_equals_without_hash_code() {
        let record = TypeDecl::record("R").with_member(
            MemberDecl::method("Equals", [ParamDecl::new("other", TypeName::named("R"))], TypeName::Bool)
                .public()
                .with_modifiers(Modifiers::NONE.r#virtual())
                .with_body(Expr::bool(true)),
        );

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["equals-without-hash-code"]);

            let r = table(ctx, "R");
            assert!(r.outcome(SlotKind::EqualsTyped).unwrap().is_user_satisfied());
            assert_eq!(r.named("Equals").count(), 2);
        });
    }

    #[test]
    fn test_shape_mismatch_is_not_synthesized() {
        let record = TypeDecl::record("R").with_member(
            MemberDecl::method("GetHashCode", [], TypeName::Int)
                .public()
                .with_body(Expr::int(0)),
        );

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["shape-mismatch"]);

            let r = table(ctx, "R");
            assert!(r.outcome(SlotKind::HashCode).unwrap().is_shape_mismatch());
            assert_eq!(r.named("GetHashCode").count(), 1);
        });
    }

    #[test]
    fn test_sealed_print_members_in_open_type() {
        let derived = TypeDecl::record("B").inherits("A").with_member(
            MemberDecl::method(
                "PrintMembers",
                [ParamDecl::new("builder", TypeName::StringBuilder)],
                TypeName::Bool,
            )
            .protected()
            .with_modifiers(Modifiers::NONE.r#override().sealed())
            .with_body(Expr::bool(false)),
        );

        check(
            AstFile::new([TypeDecl::record("A"), derived]),
            BuildOptions::single_threaded(),
            |_, codes| assert_eq!(codes, vec!["illegal-sealing"]),
        );

        let sealed = TypeDecl::record("B").inherits("A").sealed().with_member(
            MemberDecl::method(
                "PrintMembers",
                [ParamDecl::new("builder", TypeName::StringBuilder)],
                TypeName::Bool,
            )
            .protected()
            .with_modifiers(Modifiers::NONE.r#override().sealed())
            .with_body(Expr::bool(false)),
        );

        check(
            AstFile::new([TypeDecl::record("A"), sealed]),
            BuildOptions::single_threaded(),
            |_, codes| assert!(codes.is_empty(), "{:?}", codes),
        );
    }

    #[test]
    fn test_missing_runtime_support_blocks_only_its_slots() {
        let file = AstFile::new(a_and_b()).with_runtime(
            ast::RuntimeSupport::default().without(RuntimeSupportKind::StringBuilder),
        );

        check(file, BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["missing-runtime-support"; 4]);

            let b = table(ctx, "B");

            assert!(matches!(
                b.outcome(SlotKind::ToStringMethod),
                Some(ResolutionOutcome::Blocked(BlockReason::MissingRuntimeSupport(
                    RuntimeSupportKind::StringBuilder
                )))
            ));
            assert!(b.slot_member(SlotKind::EqualsTyped).is_some());
            assert!(b.slot_member(SlotKind::CloneMethod).is_some());
        });
    }

    #[test]
    fn test_ambiguous_clone_candidates() {
        let base = metadata_record("M", Privacy::Protected).with_member(
            MemberDecl::method("<Clone>$", [], TypeName::Object)
                .public()
                .with_modifiers(Modifiers::NONE.r#virtual()),
        );

        let derived = TypeDecl::record("R").inherits("M");

        check(AstFile::new([base, derived]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["broken-override"]);

            let r = table(ctx, "R");
            assert!(matches!(
                r.outcome(SlotKind::CloneMethod),
                Some(ResolutionOutcome::Synthesize(target)) if target.is_ambiguous()
            ));
        });
    }

    #[test]
    fn test_missing_base_copy_constructor() {
        let base = metadata_record("M", Privacy::Private);

        let derived = TypeDecl::record("R").inherits("M");

        check(AstFile::new([base, derived]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["missing-copy-constructor"]);

            let r = table(ctx, "R");
            assert!(matches!(
                r.outcome(SlotKind::CloneMethod),
                Some(ResolutionOutcome::Blocked(BlockReason::DependsOn(SlotKind::CopyConstructor)))
            ));
        });
    }

    #[test]
    fn test_metadata_base_is_extended() {
        let base = metadata_record("M", Privacy::Protected);

        check(
            AstFile::new([base, TypeDecl::record("R").inherits("M")]),
            BuildOptions::single_threaded(),
            |ctx, codes| {
                assert!(codes.is_empty(), "{:?}", codes);

                let r = table(ctx, "R");
                let clone = r.get(r.slot_member(SlotKind::CloneMethod).unwrap().index);
                assert!(clone.overrides().is_some());
                assert_eq!(clone.value_type(), Some(&named(ctx.asg, "R")));
            },
        );
    }

    #[test]
    fn test_clone_return_without_covariant_returns() {
        let mut options = BuildOptions::single_threaded();
        options.capabilities.covariant_returns = false;

        check(AstFile::new(a_and_b()), options, |ctx, codes| {
            assert!(codes.is_empty(), "{:?}", codes);

            let b = table(ctx, "B");
            let clone = b.get(b.slot_member(SlotKind::CloneMethod).unwrap().index);
            assert_eq!(clone.value_type(), Some(&named(ctx.asg, "A")));
        });
    }

    #[test]
    fn test_deconstruction_lists_inherited_members_first() {
        let file = AstFile::new([
            TypeDecl::record("A").with_params([PositionalParam::new("I", TypeName::Int)]),
            TypeDecl::record("B")
                .inherits_with("A", [Expr::name("I")])
                .with_params([
                    PositionalParam::new("I", TypeName::Int),
                    PositionalParam::new("J", TypeName::String),
                ]),
        ]);

        check(file, BuildOptions::single_threaded(), |ctx, codes| {
            assert!(codes.is_empty(), "{:?}", codes);

            let b = table(ctx, "B");
            let names = b
                .deconstruction
                .iter()
                .map(|binding| binding.name.as_str())
                .collect::<Vec<_>>();

            assert_eq!(names, vec!["I", "J"]);

            let deconstruct = b.get(b.slot_member(SlotKind::Deconstruct).unwrap().index);
            assert!(deconstruct.params().iter().all(|param| param.is_out));
        });
    }

    #[test]
    fn test_unread_parameter_bound_to_declared_property() {
        let record = TypeDecl::record("R")
            .with_params([PositionalParam::new("X", TypeName::Int)])
            .with_member(MemberDecl::property("X", TypeName::Int).public());

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["unread-parameter"]);
            assert_eq!(table(ctx, "R").named("X").count(), 1);
        });
    }

    #[test]
    fn test_positional_conflicts_with_declared_method() {
        let record = TypeDecl::record("R")
            .with_params([PositionalParam::new("X", TypeName::Int)])
            .with_member(MemberDecl::method("X", [], TypeName::Int).public());

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["duplicate-name"]);

            let r = table(ctx, "R");
            assert_eq!(r.named("X").count(), 1);
            assert!(r.named("X").all(|(_, member)| member.kind.is_method()));
            assert!(r.positional[0].member.is_none());
            assert!(matches!(
                r.outcome(SlotKind::Deconstruct),
                Some(ResolutionOutcome::Blocked(BlockReason::RejectedPositional))
            ));
        });
    }

    #[test]
    fn test_inherited_positional_of_wrong_type() {
        let base = TypeDecl::record("A").with_member(MemberDecl::property("Y", TypeName::String).public());
        let derived = TypeDecl::record("B")
            .inherits("A")
            .with_params([PositionalParam::new("Y", TypeName::Int)]);

        check(AstFile::new([base, derived]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["shape-mismatch"]);

            let b = table(ctx, "B");
            assert_eq!(b.named("Y").count(), 0);
            assert!(b.positional[0].member.is_none());
        });
    }

    #[test]
    fn test_duplicate_positional_parameter() {
        let record = TypeDecl::record("R").with_params([
            PositionalParam::new("X", TypeName::Int),
            PositionalParam::new("X", TypeName::Int),
        ]);

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["duplicate-name"]);

            let r = table(ctx, "R");
            assert_eq!(r.named("X").count(), 1);
            assert!(r.positional[0].member.is_some());
            assert!(r.positional[1].member.is_none());
        });
    }

    #[test]
    fn test_required_parameter_after_optional() {
        let record = TypeDecl::record("R").with_params([
            PositionalParam::new("X", TypeName::Int).with_default(Expr::int(1)),
            PositionalParam::new("Y", TypeName::Int),
        ]);

        check(AstFile::new([record]), BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["invalid-positional"]);

            let r = table(ctx, "R");
            assert_eq!(r.positional.len(), 2);
            assert!(r.positional.iter().all(|binding| binding.member.is_some()));
        });
    }

    #[test]
    fn test_dropped_attribute_keeps_the_rest() {
        let file = AstFile::new([TypeDecl::record("R").with_params([PositionalParam::new(
            "X",
            TypeName::Int,
        )
        .with_attribute(Annotation::targeted("event", "Marker"))
        .with_attribute(Annotation::targeted("property", "Marker"))])])
        .with_attribute_class(ast::AttributeClass::new("Marker", attributes::TargetSet::ALL));

        check(file, BuildOptions::single_threaded(), |ctx, codes| {
            assert_eq!(codes, vec!["dropped-attribute"]);

            let property = table(ctx, "R").named("X").next().unwrap().1;
            assert_eq!(property.attributes, vec!["Marker".to_string()]);
        });
    }

    #[test]
    fn test_abstract_and_sealed() {
        let record = TypeDecl::record("R").r#abstract().sealed();

        check(AstFile::new([record]), BuildOptions::single_threaded(), |_, codes| {
            assert_eq!(codes, vec!["illegal-sealing"]);
        });
    }

    #[test]
    fn test_cycle_members_are_broken() {
        let file = AstFile::new([
            TypeDecl::record("A").inherits("B"),
            TypeDecl::record("B").inherits("A"),
            TypeDecl::record("C"),
        ]);

        check(file, BuildOptions::single_threaded(), |ctx, _| {
            assert!(table(ctx, "A").status.is_broken());
            assert!(table(ctx, "B").status.is_broken());
            assert!(table(ctx, "C").status.is_complete());
        });
    }

    #[test]
    fn test_parallel_matches_single_threaded() {
        let shape = |options: BuildOptions| {
            let file = AstFile::new(
                (0..24).map(|index| {
                    let record = TypeDecl::record(format!("R{}", index))
                        .with_params([PositionalParam::new(format!("P{}", index), TypeName::Int)]);

                    match index {
                        0 => record,
                        _ => record.inherits_with(format!("R{}", (index - 1) / 2), [Expr::int(0)]),
                    }
                }),
            );

            let mut summary = vec![];

            check(file, options, |ctx, codes| {
                assert!(codes.is_empty(), "{:?}", codes);

                for index in 0..24 {
                    let table = table(ctx, &format!("R{}", index));
                    summary.push((table.members.len(), table.deconstruction.len()));
                }
            });

            summary
        };

        let parallel = BuildOptions {
            available_parallelism: NonZero::new(4).unwrap(),
            ..BuildOptions::default()
        };

        assert_eq!(shape(BuildOptions::single_threaded()), shape(parallel));
    }

    #[test]
    fn test_cancelled_before_start() {
        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let asg = build_asg::build_asg(&AstFile::new(a_and_b()), &source_files, &diagnostics);
        let options = BuildOptions::default();

        let token = CancellationToken::new();
        let ctx = RecordCtx::new(&asg, &diagnostics, &options).with_cancellation(token.clone());
        token.cancel();

        assert_eq!(build_records(&ctx), Err(Cancelled));
        assert!(ctx.published(asg.lookup("B").unwrap()).is_none());
    }
}
