use crate::{RecordCtx, error::RecordErrorKind, positional::select_constructor};
use asg::{Body, Member, MemberKind, MemberTable, Type};
use compiler::Cancelled;

fn same_signature(candidate: &Member, member: &Member) -> bool {
    candidate.name == member.name
        && !candidate.is_static()
        && candidate.kind.is_method() == member.kind.is_method()
        && candidate.kind.is_property() == member.kind.is_property()
        && candidate.param_types().eq(member.param_types())
}

/// Points every member declared `override` at the member it overrides
pub fn link_overrides(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let owner = table.owner;
    let report = ctx.asg.types[owner].origin.is_source();

    for index in 0..table.members.len() {
        let member = &table.members[index];

        if !member.modifiers.is_override || member.overrides().is_some() {
            continue;
        }

        let found = ctx.find_inherited(owner, None, |candidate| same_signature(candidate, member))?;

        let Some(target) = found.first().copied() else {
            if report {
                ctx.error(
                    RecordErrorKind::NoSuitableOverride {
                        member: ctx.member_path(owner, member),
                    },
                    member.source,
                );
            }
            continue;
        };

        let base_member = ctx.member(target)?;

        if report && !base_member.is_overridable() {
            ctx.error(
                RecordErrorKind::OverridesSealed {
                    member: ctx.member_path(owner, member),
                    base_member: ctx.member_path(target.owner, base_member),
                },
                member.source,
            );
        }

        match &mut table.members[index].kind {
            MemberKind::Method(method) => method.overrides = Some(target),
            MemberKind::Property(property) => property.overrides = Some(target),
            MemberKind::Field(_) | MemberKind::Constructor(_) => (),
        }
    }

    Ok(())
}

/// Resolves the `base(...)` or `this(...)` target of user constructors
pub fn chain_constructors(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let owner = table.owner;
    let symbol = &ctx.asg.types[owner];
    let copy_shape = [Type::Named(owner)];

    for index in 0..table.members.len() {
        let member = &table.members[index];

        let Some(Body::UserConstructor(body)) = member.as_constructor().map(|ctor| &ctor.body)
        else {
            continue;
        };

        let is_copy_constructor = member.param_types().eq(copy_shape.iter());

        if symbol.has_parameter_list() && !body.chains_to_this && !is_copy_constructor {
            ctx.error(
                RecordErrorKind::MustChainToPrimaryConstructor {
                    record: symbol.name.clone(),
                },
                member.source,
            );
        }

        let params = member.params();

        let (target, found) = if body.chains_to_this {
            let candidates = table.constructors().filter(|(key, _)| key.index != index);
            (owner, select_constructor(ctx, owner, candidates, &body.chain_args, params))
        } else if let Some(base) = symbol.base {
            let candidates = ctx.members(base)?.constructors();
            (base, select_constructor(ctx, owner, candidates, &body.chain_args, params))
        } else {
            continue;
        };

        if found.is_none() {
            ctx.error(
                RecordErrorKind::NoMatchingConstructor {
                    ty: ctx.asg.types[target].name.clone(),
                    arity: body.chain_args.len(),
                },
                member.source,
            );
        }

        if let MemberKind::Constructor(constructor) = &mut table.members[index].kind {
            if let Body::UserConstructor(body) = &mut constructor.body {
                body.chains_to = found;
            }
        }
    }

    Ok(())
}
