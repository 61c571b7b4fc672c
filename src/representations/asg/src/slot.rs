use derive_more::IsVariant;
use std::fmt::Display;

/// Member slots a record may have synthesized for it, in resolution order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, IsVariant)]
pub enum SlotKind {
    EqualityContract,
    EqualsTyped,
    EqualsObject,
    BaseEquals,
    HashCode,
    PrintMembers,
    ToStringMethod,
    CopyConstructor,
    CloneMethod,
    OperatorEquals,
    OperatorNotEquals,
    Deconstruct,
}

impl SlotKind {
    pub const ALL: [SlotKind; 12] = [
        SlotKind::EqualityContract,
        SlotKind::EqualsTyped,
        SlotKind::EqualsObject,
        SlotKind::BaseEquals,
        SlotKind::HashCode,
        SlotKind::PrintMembers,
        SlotKind::ToStringMethod,
        SlotKind::CopyConstructor,
        SlotKind::CloneMethod,
        SlotKind::OperatorEquals,
        SlotKind::OperatorNotEquals,
        SlotKind::Deconstruct,
    ];

    pub const fn member_name(&self) -> &'static str {
        match self {
            SlotKind::EqualityContract => "EqualityContract",
            SlotKind::EqualsTyped | SlotKind::EqualsObject | SlotKind::BaseEquals => "Equals",
            SlotKind::HashCode => "GetHashCode",
            SlotKind::PrintMembers => "PrintMembers",
            SlotKind::ToStringMethod => "ToString",
            SlotKind::CopyConstructor => super::CONSTRUCTOR_NAME,
            SlotKind::CloneMethod => "<Clone>$",
            SlotKind::OperatorEquals => "op_Equality",
            SlotKind::OperatorNotEquals => "op_Inequality",
            SlotKind::Deconstruct => "Deconstruct",
        }
    }
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SlotKind::EqualityContract => "equality contract",
            SlotKind::EqualsTyped => "typed equality",
            SlotKind::EqualsObject => "object equality",
            SlotKind::BaseEquals => "base equality",
            SlotKind::HashCode => "hash code",
            SlotKind::PrintMembers => "member printing",
            SlotKind::ToStringMethod => "string conversion",
            SlotKind::CopyConstructor => "copy constructor",
            SlotKind::CloneMethod => "clone method",
            SlotKind::OperatorEquals => "equality operator",
            SlotKind::OperatorNotEquals => "inequality operator",
            SlotKind::Deconstruct => "deconstruction",
        })
    }
}

#[test]
fn test_slots_are_listed_in_resolution_order() {
    let mut sorted = SlotKind::ALL;
    sorted.sort();
    assert_eq!(sorted, SlotKind::ALL);
    assert!(
        SlotKind::ALL.iter().position(|slot| slot.is_copy_constructor())
            < SlotKind::ALL.iter().position(|slot| slot.is_clone_method())
    );
}
