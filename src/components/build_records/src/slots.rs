use crate::{
    RecordCtx,
    error::RecordErrorKind,
    shape::{RecordShape, shape_rule},
    synthesize::{InheritedMembers, Synthesis},
};
use asg::{
    BlockReason, MemberKey, MemberTable, OverrideTarget, ResolutionOutcome, SlotEntry, SlotKind,
    TableStatus, Type,
};
use compiler::Cancelled;

pub fn record_shape(ctx: &RecordCtx, table: &MemberTable) -> RecordShape {
    let symbol = &ctx.asg.types[table.owner];

    RecordShape {
        ty: table.owner,
        base_record: ctx.asg.base_record(table.owner),
        object: ctx.asg.object,
        is_sealed: symbol.is_sealed,
        is_abstract: symbol.is_abstract,
        deconstruction: if symbol.has_parameter_list() {
            table
                .deconstruction
                .iter()
                .map(|binding| binding.ty.clone())
                .collect()
        } else {
            vec![]
        },
    }
}

/// Resolves every slot in order, synthesizing as it goes so later slots
/// see the members chosen for earlier ones
#[tracing::instrument(skip_all)]
pub fn resolve_slots(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let shape = record_shape(ctx, table);
    let symbol = &ctx.asg.types[table.owner];

    let base_is_broken = match shape.base_record {
        Some(base) => ctx.members(base)?.status.is_broken(),
        None => false,
    };

    if base_is_broken {
        for slot in SlotKind::ALL {
            table.slots.insert(
                slot,
                SlotEntry {
                    outcome: ResolutionOutcome::Blocked(BlockReason::BrokenBase),
                    member: None,
                },
            );
        }
        table.status = TableStatus::Broken;
        return Ok(());
    }

    let synthesis = Synthesis {
        ctx,
        shape: &shape,
        covariant_returns: ctx.options.capabilities.covariant_returns,
        inherited: inherited_members(ctx, &shape)?,
    };

    for slot in SlotKind::ALL {
        let outcome = resolve_slot(ctx, &shape, table, slot)?;

        let entry = match outcome {
            ResolutionOutcome::UserSatisfied(key) | ResolutionOutcome::InheritedSatisfied(key) => {
                SlotEntry {
                    outcome,
                    member: Some(key),
                }
            }
            ResolutionOutcome::Synthesize(target) => match synthesis.synthesize(table, slot, &target) {
                Ok(member) => {
                    let member = member.map(|member| table.push(member));
                    tracing::trace!(?slot, ?member, "synthesized");

                    SlotEntry {
                        outcome: ResolutionOutcome::Synthesize(target),
                        member,
                    }
                }
                Err(reason) => {
                    report_block(ctx, &shape, slot, &reason);

                    SlotEntry {
                        outcome: ResolutionOutcome::Blocked(reason),
                        member: None,
                    }
                }
            },
            ResolutionOutcome::ShapeMismatch(..)
            | ResolutionOutcome::Blocked(_)
            | ResolutionOutcome::Omitted => SlotEntry {
                outcome,
                member: None,
            },
        };

        tracing::debug!(record = %symbol.name, ?slot, outcome = ?entry.outcome, "slot resolved");
        table.slots.insert(slot, entry);
    }

    Ok(())
}

fn resolve_slot(
    ctx: &RecordCtx,
    shape: &RecordShape,
    table: &MemberTable,
    slot: SlotKind,
) -> Result<ResolutionOutcome, Cancelled> {
    let Some(rule) = shape_rule(slot, shape) else {
        return Ok(ResolutionOutcome::Omitted);
    };

    let declared = table
        .iter()
        .find(|(_, member)| member.origin.is_declared() && rule.is_candidate(member));

    if let Some((key, member)) = declared {
        return Ok(match rule.check(ctx.asg, shape, member) {
            Ok(()) => ResolutionOutcome::UserSatisfied(key),
            Err(reason) => {
                ctx.error(
                    RecordErrorKind::SlotShapeMismatch {
                        member: ctx.member_path(table.owner, member),
                        slot,
                        reason: reason.clone(),
                    },
                    member.source,
                );
                ResolutionOutcome::ShapeMismatch(key, reason)
            }
        });
    }

    let settled_by = match slot {
        SlotKind::BaseEquals => SlotKind::EqualsTyped,
        _ => slot,
    };

    let inherited = ctx.find_inherited(shape.ty, Some(settled_by), |member| {
        rule.is_candidate(member) && !member.is_static()
    })?;

    if slot.is_to_string_method() {
        if let [key] = inherited[..] {
            if ctx.member(key)?.modifiers.is_sealed {
                return Ok(ResolutionOutcome::InheritedSatisfied(key));
            }
        }
    }

    if !rule.virtuality.continues_chain() {
        return Ok(ResolutionOutcome::Synthesize(OverrideTarget::Fresh));
    }

    Ok(ResolutionOutcome::Synthesize(match inherited.len() {
        0 => OverrideTarget::Fresh,
        1 => OverrideTarget::Member(inherited[0]),
        _ => OverrideTarget::Ambiguous(inherited),
    }))
}

fn report_block(ctx: &RecordCtx, shape: &RecordShape, slot: SlotKind, reason: &BlockReason) {
    let record = &ctx.asg.types[shape.ty];

    let kind = match reason {
        BlockReason::MissingBaseCopyConstructor => shape.base_record.map(|base| {
            RecordErrorKind::MissingBaseCopyConstructor {
                record: record.name.clone(),
                base: ctx.asg.types[base].name.clone(),
            }
        }),
        _ => RecordErrorKind::from_block(&record.name, slot, reason),
    };

    if let Some(kind) = kind {
        ctx.error(kind, record.source);
    }
}

fn single(found: Vec<MemberKey>) -> Option<MemberKey> {
    match found[..] {
        [key] => Some(key),
        _ => None,
    }
}

/// Base members that synthesized bodies call directly
fn inherited_members(ctx: &RecordCtx, shape: &RecordShape) -> Result<InheritedMembers, Cancelled> {
    let Some(base) = shape.base_record else {
        let object = ctx.members(shape.object)?;

        return Ok(InheritedMembers {
            copy_constructor: object
                .constructors()
                .find(|(_, ctor)| ctor.arity() == 0)
                .map(|(key, _)| key),
            ..Default::default()
        });
    };

    let base_type = Type::Named(base);
    let find = |slot: SlotKind, name: &'static str, params: &[Type]| {
        ctx.find_inherited(shape.ty, Some(slot), |member| {
            member.name == name
                && !member.is_static()
                && !member.is_constructor()
                && member.param_types().eq(params.iter())
        })
        .map(single)
    };

    let copy_constructor = ctx
        .members(base)?
        .constructors()
        .find(|(key, ctor)| {
            ctor.param_types().eq([base_type.clone()].iter())
                && ctx.asg.can_access(Some(shape.ty), key.owner, ctor.privacy)
        })
        .map(|(key, _)| key);

    let clone = find(SlotKind::CloneMethod, SlotKind::CloneMethod.member_name(), &[])?;

    let clone_return = match clone {
        Some(key) => ctx.member(key)?.value_type().cloned(),
        None => None,
    };

    Ok(InheritedMembers {
        equals_typed: find(SlotKind::EqualsTyped, "Equals", &[base_type.clone()])?,
        hash_code: find(SlotKind::HashCode, "GetHashCode", &[])?,
        print_members: find(SlotKind::PrintMembers, "PrintMembers", &[Type::StringBuilder])?,
        copy_constructor,
        clone_return,
    })
}
