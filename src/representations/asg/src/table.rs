use super::{Member, RuntimeSupportKind, SlotKind, Type, TypeRef};
use attributes::Privacy;
use derive_more::IsVariant;
use indexmap::IndexMap;
use std::fmt::Display;

/// Addresses a member of any published member table
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub owner: TypeRef,
    pub index: usize,
}

impl MemberKey {
    pub fn new(owner: TypeRef, index: usize) -> Self {
        Self { owner, index }
    }
}

/// Every member of one type once positional processing, resolution and
/// synthesis are complete. Immutable after publication.
#[derive(Clone, Debug)]
pub struct MemberTable {
    pub owner: TypeRef,
    pub members: Vec<Member>,
    pub slots: IndexMap<SlotKind, SlotEntry>,
    pub primary_constructor: Option<usize>,
    /// One entry per parameter of the primary constructor
    pub positional: Vec<PositionalBinding>,
    /// Positional members in deconstruction order, inherited ones first
    pub deconstruction: Vec<PositionalBinding>,
    pub status: TableStatus,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum TableStatus {
    Complete,
    /// Base chain is broken, nothing was synthesized
    Broken,
}

#[derive(Clone, Debug)]
pub struct PositionalBinding {
    pub name: String,
    pub ty: Type,
    pub ordinal: usize,
    /// Property or field the parameter is stored into, `None` when the
    /// position was rejected
    pub member: Option<MemberKey>,
}

#[derive(Clone, Debug)]
pub struct SlotEntry {
    pub outcome: ResolutionOutcome,
    /// The member that fills the slot once resolution and synthesis finish
    pub member: Option<MemberKey>,
}

#[derive(Clone, Debug, IsVariant)]
pub enum ResolutionOutcome {
    UserSatisfied(MemberKey),
    InheritedSatisfied(MemberKey),
    ShapeMismatch(MemberKey, MismatchReason),
    Synthesize(OverrideTarget),
    Blocked(BlockReason),
    /// Slot does not apply to this record
    Omitted,
}

#[derive(Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum OverrideTarget {
    Fresh,
    Member(MemberKey),
    Ambiguous(Vec<MemberKey>),
}

impl OverrideTarget {
    pub fn member(&self) -> Option<MemberKey> {
        match self {
            OverrideTarget::Member(key) => Some(*key),
            OverrideTarget::Fresh | OverrideTarget::Ambiguous(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MismatchReason {
    Kind {
        expected: &'static str,
        found: &'static str,
    },
    ReturnType {
        expected: String,
        found: String,
    },
    Accessibility {
        expected: Privacy,
        found: Privacy,
    },
    MustBeOverridable,
    MustNotBeOverridable,
    MustOverride,
    Parameters,
    MustBeStatic,
    MustNotBeStatic,
    Sealed,
    /// Declared in an ancestor but not as the required property
    InheritedNotProperty,
}

impl Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchReason::Kind { expected, found } => {
                write!(f, "expected a {}, found a {}", expected, found)
            }
            MismatchReason::ReturnType { expected, found } => {
                write!(f, "return type must be '{}' but is '{}'", expected, found)
            }
            MismatchReason::Accessibility { expected, found } => {
                write!(f, "must be {} but is {}", expected, found)
            }
            MismatchReason::MustBeOverridable => write!(f, "must be virtual or abstract"),
            MismatchReason::MustNotBeOverridable => write!(f, "must not be virtual"),
            MismatchReason::MustOverride => write!(f, "must override the inherited member"),
            MismatchReason::Parameters => write!(f, "parameters must all be 'out' and match the positional members"),
            MismatchReason::MustBeStatic => write!(f, "must be static"),
            MismatchReason::MustNotBeStatic => write!(f, "must not be static"),
            MismatchReason::Sealed => write!(f, "must not be sealed"),
            MismatchReason::InheritedNotProperty => {
                write!(f, "inherited member must be a readable instance property of the same type")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum BlockReason {
    MissingRuntimeSupport(RuntimeSupportKind),
    MissingBaseCopyConstructor,
    MissingCopyConstructor,
    /// A slot this one builds on could not be filled
    DependsOn(SlotKind),
    RejectedPositional,
    BrokenBase,
}

impl Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::MissingRuntimeSupport(kind) => {
                write!(f, "runtime support for '{}' is missing", kind)
            }
            BlockReason::MissingBaseCopyConstructor => {
                write!(f, "base type has no accessible copy constructor")
            }
            BlockReason::MissingCopyConstructor => write!(f, "no copy constructor available"),
            BlockReason::DependsOn(slot) => write!(f, "{} is unavailable", slot),
            BlockReason::RejectedPositional => write!(f, "a positional parameter was rejected"),
            BlockReason::BrokenBase => write!(f, "base chain is broken"),
        }
    }
}

impl MemberTable {
    pub fn new(owner: TypeRef, members: Vec<Member>) -> Self {
        Self {
            owner,
            members,
            slots: IndexMap::new(),
            primary_constructor: None,
            positional: vec![],
            deconstruction: vec![],
            status: TableStatus::Complete,
        }
    }

    pub fn get(&self, index: usize) -> &Member {
        &self.members[index]
    }

    pub fn key(&self, index: usize) -> MemberKey {
        MemberKey::new(self.owner, index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberKey, &Member)> {
        self.members
            .iter()
            .enumerate()
            .map(|(index, member)| (self.key(index), member))
    }

    pub fn named<'t>(&'t self, name: &'t str) -> impl Iterator<Item = (MemberKey, &'t Member)> {
        self.iter().filter(move |(_, member)| member.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = (MemberKey, &Member)> {
        self.iter().filter(|(_, member)| member.is_constructor())
    }

    pub fn slot(&self, slot: SlotKind) -> Option<&SlotEntry> {
        self.slots.get(&slot)
    }

    /// Member filling `slot`, whether user-written, inherited or synthesized
    pub fn slot_member(&self, slot: SlotKind) -> Option<MemberKey> {
        self.slots.get(&slot).and_then(|entry| entry.member)
    }

    pub fn outcome(&self, slot: SlotKind) -> Option<&ResolutionOutcome> {
        self.slots.get(&slot).map(|entry| &entry.outcome)
    }

    pub fn push(&mut self, member: Member) -> MemberKey {
        self.members.push(member);
        self.key(self.members.len() - 1)
    }

    /// Instance state declared in this type, in declaration order
    pub fn state_members(&self) -> impl Iterator<Item = (MemberKey, &Member)> {
        self.iter().filter(|(_, member)| member.is_state_holding())
    }
}
