mod error;

use asg::{Member, MemberKey, MemberTable, Param, ResolutionOutcome, SlotKind, Type, TypeRef};
use ast::MemberInit;
use build_records::{RecordCtx, TableLookup, Typer, record_shape, shape_rule};
use compiler::Cancelled;
pub use error::{BindError, BindErrorKind};
use itertools::Itertools;
use source_files::Source;
use std::collections::HashSet;

/// Where a `with` expression is written
#[derive(Copy, Clone, Debug)]
pub struct WithScope<'s> {
    /// Type whose member body contains the expression
    pub this: Option<TypeRef>,
    pub params: &'s [Param],
    pub source: Source,
}

impl WithScope<'static> {
    pub fn outside(source: Source) -> Self {
        Self {
            this: None,
            params: &[],
            source,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BoundWith {
    pub receiver: TypeRef,
    pub clone: MemberKey,
    /// The clone method returns an ancestor type and its result is cast back
    pub needs_cast: bool,
    pub assignments: Vec<BoundAssignment>,
}

#[derive(Clone, Debug)]
pub struct BoundAssignment {
    pub member: MemberKey,
    pub value: ast::Expr,
}

/// Binds `receiver with { inits }` for a receiver of static type `receiver_type`
#[tracing::instrument(skip_all, fields(receiver = %ctx.type_name(receiver_type)))]
pub fn bind_with(
    ctx: &RecordCtx,
    receiver_type: &Type,
    inits: &[MemberInit],
    scope: WithScope,
) -> Result<BoundWith, BindError> {
    let cancelled = |Cancelled| BindErrorKind::Cancelled.at(scope.source);

    let receiver = match receiver_type {
        Type::Named(ty) => Some(*ty),
        Type::Param(param) => param.bound,
        _ => None,
    }
    .filter(|ty| *ty != ctx.asg.object)
    .ok_or_else(|| {
        BindErrorKind::NoCloneCandidate {
            ty: ctx.type_name(receiver_type),
        }
        .at(scope.source)
    })?;

    let clone = find_clone(ctx, receiver, scope)?;
    let returned = ctx.member(clone).map_err(cancelled)?.value_type().cloned();

    let mut seen = HashSet::new();
    let mut assignments = Vec::with_capacity(inits.len());

    for init in inits {
        if !seen.insert(init.name.as_str()) {
            return Err(BindErrorKind::DuplicateAssignment {
                name: init.name.clone(),
            }
            .at(init.source));
        }

        assignments.push(bind_assignment(ctx, receiver, init, scope)?);
    }

    Ok(BoundWith {
        receiver,
        clone,
        needs_cast: returned != Some(Type::Named(receiver)),
        assignments,
    })
}

/// Nearest accessible parameterless clone method of `receiver`. A record
/// whose own clone slot was resolved decides the answer, so a clone method
/// that could not be synthesized never falls back to an ancestor's.
fn find_clone(ctx: &RecordCtx, receiver: TypeRef, scope: WithScope) -> Result<MemberKey, BindError> {
    let name = SlotKind::CloneMethod.member_name();

    let no_candidate = || {
        BindErrorKind::NoCloneCandidate {
            ty: ctx.asg.types[receiver].name.clone(),
        }
        .at(scope.source)
    };

    for ty in std::iter::once(receiver).chain(ctx.asg.ancestors(receiver)) {
        let table = ctx
            .members(ty)
            .map_err(|Cancelled| BindErrorKind::Cancelled.at(scope.source))?;

        if let Some(entry) = table.slot(SlotKind::CloneMethod) {
            let resolved = match entry.outcome {
                ResolutionOutcome::UserSatisfied(_)
                | ResolutionOutcome::InheritedSatisfied(_)
                | ResolutionOutcome::Synthesize(_) => entry.member,
                ResolutionOutcome::ShapeMismatch(..)
                | ResolutionOutcome::Blocked(_)
                | ResolutionOutcome::Omitted => None,
            };

            let key = resolved.ok_or_else(no_candidate)?;
            let member = ctx.member(key).map_err(|Cancelled| BindErrorKind::Cancelled.at(scope.source))?;

            return if ctx.asg.can_access(scope.this, key.owner, member.privacy) {
                Ok(key)
            } else {
                Err(no_candidate())
            };
        }

        let found = table
            .named(name)
            .filter(|(_, member)| member.arity() == 0 && !member.is_static())
            .filter(|(key, member)| ctx.asg.can_access(scope.this, key.owner, member.privacy))
            .collect_vec();

        match found.as_slice() {
            [] => continue,
            [(key, member)] if is_clone_shaped(ctx, table, member) => return Ok(*key),
            [_] => return Err(no_candidate()),
            _ => {
                return Err(BindErrorKind::AmbiguousClone {
                    ty: ctx.asg.types[receiver].name.clone(),
                    candidates: found
                        .iter()
                        .map(|(key, member)| ctx.member_path(key.owner, member))
                        .collect(),
                }
                .at(scope.source));
            }
        }
    }

    Err(no_candidate())
}

/// Whether a clone method declared by a record without resolved slots, such
/// as one imported from metadata, has the shape a record's clone must have
fn is_clone_shaped(ctx: &RecordCtx, table: &MemberTable, member: &Member) -> bool {
    if !ctx.asg.types[table.owner].is_record() {
        return true;
    }

    let shape = record_shape(ctx, table);

    shape_rule(SlotKind::CloneMethod, &shape)
        .is_some_and(|rule| rule.check(ctx.asg, &shape, member).is_ok())
}

fn bind_assignment(
    ctx: &RecordCtx,
    receiver: TypeRef,
    init: &MemberInit,
    scope: WithScope,
) -> Result<BoundAssignment, BindError> {
    let type_name = &ctx.asg.types[receiver].name;

    let mut found = None;

    for ty in std::iter::once(receiver).chain(ctx.asg.ancestors(receiver)) {
        let table = ctx
            .members(ty)
            .map_err(|Cancelled| BindErrorKind::Cancelled.at(init.source))?;

        found = table.named(&init.name).find(|(_, member)| {
            !member.is_static() && (member.kind.is_field() || member.kind.is_property())
        });

        if found.is_some() {
            break;
        }
    }

    let Some((key, member)) = found else {
        return Err(BindErrorKind::UnknownMember {
            ty: type_name.clone(),
            name: init.name.clone(),
        }
        .at(init.source));
    };

    let writable = member
        .setter_privacy()
        .is_some_and(|privacy| ctx.asg.can_access(scope.this, key.owner, privacy));

    if !writable {
        return Err(BindErrorKind::NotWritable {
            ty: type_name.clone(),
            name: init.name.clone(),
        }
        .at(init.source));
    }

    let lookup = TableLookup {
        ctx,
        resolving: None,
    };

    let typer = Typer {
        asg: ctx.asg,
        lookup: &lookup,
        this: scope.this,
        params: scope.params,
    };

    if let Some(expected) = member.value_type() {
        if !typer.accepts(expected, &init.value) {
            return Err(BindErrorKind::TypeMismatch {
                name: init.name.clone(),
                expected: ctx.type_name(expected),
            }
            .at(init.value.source));
        }
    }

    Ok(BoundAssignment {
        member: key,
        value: init.value.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use asg::TypeParam;
    use ast::{AstFile, Expr, MemberDecl, Modifiers, ParamDecl, PositionalParam, TypeDecl, TypeName};
    use attributes::Privacy;
    use build_records::build_records;
    use compiler::BuildOptions;
    use diagnostics::{DiagnosticFlags, Diagnostics};
    use pretty_assertions::assert_eq;
    use source_files::SourceFiles;

    fn check(types: Vec<TypeDecl>, f: impl FnOnce(&RecordCtx)) {
        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let asg = build_asg::build_asg(&AstFile::new(types), &source_files, &diagnostics);
        let options = BuildOptions::single_threaded();
        let ctx = RecordCtx::new(&asg, &diagnostics, &options);

        build_records(&ctx).unwrap();
        f(&ctx);
    }

    fn point() -> Vec<TypeDecl> {
        vec![
            TypeDecl::record("Point").with_params([
                PositionalParam::new("X", TypeName::Int),
                PositionalParam::new("Y", TypeName::Int),
            ]),
            TypeDecl::class("Plain").with_member(MemberDecl::field("Z", TypeName::Int).public()),
        ]
    }

    fn outside() -> WithScope<'static> {
        WithScope::outside(source_files::Source::internal())
    }

    fn named(ctx: &RecordCtx, name: &str) -> Type {
        Type::Named(ctx.asg.lookup(name).unwrap())
    }

    #[test]
    fn test_binds_positional_assignments() {
        check(point(), |ctx| {
            let bound = bind_with(
                ctx,
                &named(ctx, "Point"),
                &[MemberInit::new("Y", Expr::int(3))],
                outside(),
            )
            .unwrap();

            let clone = ctx.member(bound.clone).unwrap();

            assert_eq!(clone.name, "<Clone>$");
            assert!(!bound.needs_cast);
            assert_eq!(bound.assignments.len(), 1);
            assert_eq!(ctx.member(bound.assignments[0].member).unwrap().name, "Y");
        });
    }

    #[test]
    fn test_class_has_no_clone() {
        check(point(), |ctx| {
            let error = bind_with(ctx, &named(ctx, "Plain"), &[], outside()).unwrap_err();

            assert_eq!(
                error.kind,
                BindErrorKind::NoCloneCandidate { ty: "Plain".into() }
            );
            assert_eq!(error.kind.category(), Some(asg::ErrorCategory::NoCloneCandidate));
        });
    }

    #[test]
    fn test_type_parameter_uses_its_bound() {
        check(point(), |ctx| {
            let bounded = Type::Param(TypeParam {
                name: "T".into(),
                bound: ctx.asg.lookup("Point"),
            });

            let unbounded = Type::Param(TypeParam {
                name: "U".into(),
                bound: None,
            });

            assert!(bind_with(ctx, &bounded, &[], outside()).is_ok());
            assert_eq!(
                bind_with(ctx, &unbounded, &[], outside()).unwrap_err().kind,
                BindErrorKind::NoCloneCandidate { ty: "U".into() }
            );
        });
    }

    #[test]
    fn test_rejects_bad_assignments() {
        check(point(), |ctx| {
            let point = named(ctx, "Point");

            let unknown = bind_with(ctx, &point, &[MemberInit::new("W", Expr::int(1))], outside());
            let duplicate = bind_with(
                ctx,
                &point,
                &[MemberInit::new("X", Expr::int(1)), MemberInit::new("X", Expr::int(2))],
                outside(),
            );
            let mismatch = bind_with(
                ctx,
                &point,
                &[MemberInit::new("X", Expr::string("one"))],
                outside(),
            );

            assert!(matches!(unknown.unwrap_err().kind, BindErrorKind::UnknownMember { .. }));
            assert!(matches!(
                duplicate.unwrap_err().kind,
                BindErrorKind::DuplicateAssignment { .. }
            ));
            assert!(matches!(mismatch.unwrap_err().kind, BindErrorKind::TypeMismatch { .. }));
        });
    }

    #[test]
    fn test_equality_contract_is_not_writable() {
        check(point(), |ctx| {
            let error = bind_with(
                ctx,
                &named(ctx, "Point"),
                &[MemberInit::new("EqualityContract", Expr::null())],
                outside(),
            )
            .unwrap_err();

            assert!(matches!(error.kind, BindErrorKind::NotWritable { .. }));
        });
    }

    fn metadata_base(copy_constructor: Privacy, clone_returns: TypeName) -> TypeDecl {
        TypeDecl::record("M")
            .from_metadata()
            .with_member(MemberDecl::constructor("M", []).public())
            .with_member(
                MemberDecl::constructor("M", [ParamDecl::new("original", TypeName::named("M"))])
                    .with_privacy(copy_constructor),
            )
            .with_member(
                MemberDecl::method("<Clone>$", [], clone_returns)
                    .public()
                    .with_modifiers(Modifiers::NONE.r#virtual()),
            )
    }

    #[test]
    fn test_blocked_clone_does_not_fall_back_to_base() {
        let types = vec![
            metadata_base(Privacy::Private, TypeName::named("M")),
            TypeDecl::record("R").inherits("M"),
        ];

        check(types, |ctx| {
            let r = ctx.published(ctx.asg.lookup("R").unwrap()).unwrap();
            assert!(r.outcome(SlotKind::CloneMethod).unwrap().is_blocked());

            let error = bind_with(ctx, &named(ctx, "R"), &[], outside()).unwrap_err();
            assert_eq!(error.kind, BindErrorKind::NoCloneCandidate { ty: "R".into() });
        });
    }

    #[test]
    fn test_clone_of_extended_metadata_record() {
        let types = vec![
            metadata_base(Privacy::Protected, TypeName::named("M")),
            TypeDecl::record("R").inherits("M"),
        ];

        check(types, |ctx| {
            let r = ctx.asg.lookup("R").unwrap();
            let bound = bind_with(ctx, &named(ctx, "R"), &[], outside()).unwrap();

            assert_eq!(bound.clone.owner, r);
            assert!(!bound.needs_cast);

            let base = bind_with(ctx, &named(ctx, "M"), &[], outside()).unwrap();
            assert_eq!(base.clone.owner, ctx.asg.lookup("M").unwrap());
        });
    }

    #[test]
    fn test_metadata_clone_with_wrong_shape_is_rejected() {
        check(vec![metadata_base(Privacy::Protected, TypeName::Object)], |ctx| {
            let error = bind_with(ctx, &named(ctx, "M"), &[], outside()).unwrap_err();
            assert_eq!(error.kind, BindErrorKind::NoCloneCandidate { ty: "M".into() });
        });
    }
}
