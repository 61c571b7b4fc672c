use crate::{RecordCtx, error::RecordErrorKind};
use asg::{MemberTable, OverrideTarget, ResolutionOutcome, SlotKind};
use compiler::Cancelled;

/// Slots that must keep overriding the slot of the base record named second
const CHAINED: [(SlotKind, SlotKind); 4] = [
    (SlotKind::EqualityContract, SlotKind::EqualityContract),
    (SlotKind::BaseEquals, SlotKind::EqualsTyped),
    (SlotKind::PrintMembers, SlotKind::PrintMembers),
    (SlotKind::CloneMethod, SlotKind::CloneMethod),
];

/// Checks the finished table against the chain it extends
#[tracing::instrument(skip_all)]
pub fn validate(ctx: &RecordCtx, table: &MemberTable) -> Result<(), Cancelled> {
    let symbol = &ctx.asg.types[table.owner];

    if symbol.is_abstract && symbol.is_sealed {
        ctx.error(
            RecordErrorKind::AbstractAndSealed {
                record: symbol.name.clone(),
            },
            symbol.source,
        );
        return Ok(());
    }

    if table.status.is_broken() {
        return Ok(());
    }

    check_chains(ctx, table)?;
    check_sealing(ctx, table);
    check_ambiguity(ctx, table)?;

    let user_wrote = |slot| {
        table
            .outcome(slot)
            .is_some_and(ResolutionOutcome::is_user_satisfied)
    };

    if user_wrote(SlotKind::EqualsTyped) && !user_wrote(SlotKind::HashCode) {
        ctx.error(
            RecordErrorKind::EqualsWithoutHashCode {
                record: symbol.name.clone(),
            },
            symbol.source,
        );
    }

    Ok(())
}

fn check_chains(ctx: &RecordCtx, table: &MemberTable) -> Result<(), Cancelled> {
    let owner = table.owner;
    let symbol = &ctx.asg.types[owner];

    let Some(base) = ctx.asg.base_record(owner) else {
        return Ok(());
    };

    let base_table = ctx.members(base)?;

    for (slot, base_slot) in CHAINED {
        let Some(base_key) = base_table.slot_member(base_slot) else {
            continue;
        };

        let base_member = base_table.get(base_key.index);

        if !base_member.modifiers.is_dispatched() {
            continue;
        }

        let Some(entry) = table.slot(slot) else {
            continue;
        };

        let already_reported = match &entry.outcome {
            ResolutionOutcome::Blocked(_) | ResolutionOutcome::ShapeMismatch(..) => true,
            ResolutionOutcome::Synthesize(target) => target.is_ambiguous(),
            ResolutionOutcome::UserSatisfied(_)
            | ResolutionOutcome::InheritedSatisfied(_)
            | ResolutionOutcome::Omitted => false,
        };

        if already_reported {
            continue;
        }

        let member = entry.member.map(|key| table.get(key.index));

        let Some(member) = member.filter(|member| member.overrides() == Some(base_key)) else {
            ctx.error(
                RecordErrorKind::MissingOverride {
                    record: symbol.name.clone(),
                    slot,
                    base_member: ctx.member_path(base, base_member),
                },
                member.map_or(symbol.source, |member| member.source),
            );
            continue;
        };

        // User overrides of sealed members were reported while linking
        if member.origin.is_synthesized() && !base_member.is_overridable() {
            ctx.error(
                RecordErrorKind::OverridesSealed {
                    member: ctx.member_path(owner, member),
                    base_member: ctx.member_path(base, base_member),
                },
                symbol.source,
            );
        }
    }

    Ok(())
}

fn check_sealing(ctx: &RecordCtx, table: &MemberTable) {
    let symbol = &ctx.asg.types[table.owner];

    if symbol.is_sealed {
        return;
    }

    for slot in [
        SlotKind::EqualityContract,
        SlotKind::PrintMembers,
        SlotKind::EqualsTyped,
    ] {
        let Some(ResolutionOutcome::UserSatisfied(key)) = table.outcome(slot) else {
            continue;
        };

        let member = table.get(key.index);

        let closed = member.modifiers.is_sealed
            || (slot.is_equals_typed() && !member.modifiers.is_dispatched());

        if closed {
            ctx.error(
                RecordErrorKind::MustAllowOverriding {
                    member: ctx.member_path(table.owner, member),
                    record: symbol.name.clone(),
                },
                member.source,
            );
        }
    }
}

fn check_ambiguity(ctx: &RecordCtx, table: &MemberTable) -> Result<(), Cancelled> {
    let symbol = &ctx.asg.types[table.owner];

    for (slot, entry) in table.slots.iter() {
        let ResolutionOutcome::Synthesize(OverrideTarget::Ambiguous(candidates)) = &entry.outcome
        else {
            continue;
        };

        let candidates = candidates
            .iter()
            .map(|key| Ok(ctx.member_path(key.owner, ctx.member(*key)?)))
            .collect::<Result<Vec<_>, Cancelled>>()?;

        ctx.error(
            RecordErrorKind::AmbiguousOverride {
                record: symbol.name.clone(),
                slot: *slot,
                candidates,
            },
            symbol.source,
        );
    }

    Ok(())
}
