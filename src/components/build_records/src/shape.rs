use asg::{Asg, Member, MismatchReason, SlotKind, Type, TypeRef};
use attributes::Privacy;
use derive_more::IsVariant;

/// Facts about a record that decide the exact shape of each slot
#[derive(Clone, Debug)]
pub struct RecordShape {
    pub ty: TypeRef,
    pub base_record: Option<TypeRef>,
    pub object: TypeRef,
    pub is_sealed: bool,
    pub is_abstract: bool,
    /// Types of the members a synthesized `Deconstruct` would assign
    pub deconstruction: Vec<Type>,
}

impl RecordShape {
    pub fn is_root(&self) -> bool {
        self.base_record.is_none()
    }

    fn own(&self) -> Type {
        Type::Named(self.ty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeRule {
    pub slot: SlotKind,
    pub name: &'static str,
    pub shape: MemberShape,
    pub returns: ReturnRule,
    pub access: AccessRule,
    pub virtuality: VirtualityRule,
}

#[derive(Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum MemberShape {
    Property,
    Method(Vec<Type>),
    StaticMethod(Vec<Type>),
    /// Method whose parameters are all `out`
    OutMethod(Vec<Type>),
    Constructor(Vec<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnRule {
    Exact(Type),
    /// The declaring record, or a record it derives from
    DeclaringOrAncestor,
    Nothing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessRule {
    Exactly(Privacy),
    /// Public or protected unless the whole type is sealed
    NotPrivateUnlessSealed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum VirtualityRule {
    /// Virtual, abstract or override
    Overridable,
    NotOverridable,
    Override,
    /// Starts its own chain, must not override anything
    Fresh,
    Static,
    Any,
}

impl VirtualityRule {
    /// Whether the synthesized member continues an inherited chain
    pub fn continues_chain(&self) -> bool {
        self.is_override()
    }
}

/// The catalog entry for `slot`, or `None` when the slot does not apply
pub fn shape_rule(slot: SlotKind, record: &RecordShape) -> Option<ShapeRule> {
    let overridable_unless_sealed_root = if record.is_root() {
        if record.is_sealed {
            VirtualityRule::NotOverridable
        } else {
            VirtualityRule::Overridable
        }
    } else {
        VirtualityRule::Override
    };

    let protected_unless_sealed_root = if record.is_sealed && record.is_root() {
        Privacy::Private
    } else {
        Privacy::Protected
    };

    let rule = |shape, returns, access, virtuality| {
        Some(ShapeRule {
            slot,
            name: slot.member_name(),
            shape,
            returns,
            access,
            virtuality,
        })
    };

    let public = AccessRule::Exactly(Privacy::Public);

    match slot {
        SlotKind::EqualityContract => rule(
            MemberShape::Property,
            ReturnRule::Exact(Type::TypeToken),
            AccessRule::Exactly(protected_unless_sealed_root),
            overridable_unless_sealed_root,
        ),
        SlotKind::EqualsTyped => rule(
            MemberShape::Method(vec![record.own()]),
            ReturnRule::Exact(Type::Bool),
            public,
            VirtualityRule::Fresh,
        ),
        SlotKind::EqualsObject => rule(
            MemberShape::Method(vec![Type::Named(record.object)]),
            ReturnRule::Exact(Type::Bool),
            public,
            VirtualityRule::Override,
        ),
        SlotKind::BaseEquals => record.base_record.and_then(|base| {
            rule(
                MemberShape::Method(vec![Type::Named(base)]),
                ReturnRule::Exact(Type::Bool),
                public,
                VirtualityRule::Override,
            )
        }),
        SlotKind::HashCode => rule(
            MemberShape::Method(vec![]),
            ReturnRule::Exact(Type::Int),
            public,
            VirtualityRule::Override,
        ),
        SlotKind::PrintMembers => rule(
            MemberShape::Method(vec![Type::StringBuilder]),
            ReturnRule::Exact(Type::Bool),
            AccessRule::Exactly(protected_unless_sealed_root),
            overridable_unless_sealed_root,
        ),
        SlotKind::ToStringMethod => rule(
            MemberShape::Method(vec![]),
            ReturnRule::Exact(Type::String),
            public,
            VirtualityRule::Override,
        ),
        SlotKind::CopyConstructor => rule(
            MemberShape::Constructor(vec![record.own()]),
            ReturnRule::Nothing,
            AccessRule::NotPrivateUnlessSealed,
            VirtualityRule::Any,
        ),
        SlotKind::CloneMethod => rule(
            MemberShape::Method(vec![]),
            ReturnRule::DeclaringOrAncestor,
            public,
            if record.is_root() {
                VirtualityRule::Any
            } else {
                VirtualityRule::Override
            },
        ),
        SlotKind::OperatorEquals | SlotKind::OperatorNotEquals => rule(
            MemberShape::StaticMethod(vec![record.own(), record.own()]),
            ReturnRule::Exact(Type::Bool),
            public,
            VirtualityRule::Static,
        ),
        SlotKind::Deconstruct => (!record.deconstruction.is_empty())
            .then(|| {
                rule(
                    MemberShape::OutMethod(record.deconstruction.clone()),
                    ReturnRule::Exact(Type::Void),
                    public,
                    VirtualityRule::Any,
                )
            })
            .flatten(),
    }
}

impl ShapeRule {
    pub fn param_types(&self) -> Option<&[Type]> {
        match &self.shape {
            MemberShape::Property => None,
            MemberShape::Method(params)
            | MemberShape::StaticMethod(params)
            | MemberShape::OutMethod(params)
            | MemberShape::Constructor(params) => Some(params),
        }
    }

    /// Whether `member` is an attempt at this slot: same name and parameter
    /// list, or same arity for deconstruction
    pub fn is_candidate(&self, member: &Member) -> bool {
        if member.name != self.name {
            return false;
        }

        match &self.shape {
            MemberShape::Property => !member.is_constructor(),
            MemberShape::OutMethod(params) => {
                member.kind.is_method() && member.arity() == params.len()
            }
            MemberShape::Constructor(params) => {
                member.is_constructor() && member.param_types().eq(params.iter())
            }
            MemberShape::Method(params) | MemberShape::StaticMethod(params) => {
                !member.is_constructor()
                    && !member.kind.is_field()
                    && member.param_types().eq(params.iter())
            }
        }
    }

    /// Checks every field of the rule against a candidate
    pub fn check(&self, asg: &Asg, record: &RecordShape, member: &Member) -> Result<(), MismatchReason> {
        self.check_kind(member)?;
        self.check_static(member)?;
        self.check_returns(asg, record, member)?;
        self.check_params(member)?;
        self.check_access(record, member)?;
        self.check_virtuality(member)
    }

    fn check_kind(&self, member: &Member) -> Result<(), MismatchReason> {
        let expected = match &self.shape {
            MemberShape::Property => "property",
            MemberShape::Constructor(_) => "constructor",
            MemberShape::Method(_) | MemberShape::StaticMethod(_) | MemberShape::OutMethod(_) => {
                "method"
            }
        };

        if member.describe() == expected {
            Ok(())
        } else {
            Err(MismatchReason::Kind {
                expected,
                found: member.describe(),
            })
        }
    }

    fn check_static(&self, member: &Member) -> Result<(), MismatchReason> {
        match (self.virtuality.is_static(), member.is_static()) {
            (true, false) => Err(MismatchReason::MustBeStatic),
            (false, true) => Err(MismatchReason::MustNotBeStatic),
            _ => Ok(()),
        }
    }

    fn check_returns(&self, asg: &Asg, record: &RecordShape, member: &Member) -> Result<(), MismatchReason> {
        let found = member.value_type();

        let matches = match &self.returns {
            ReturnRule::Nothing => true,
            ReturnRule::Exact(expected) => found == Some(expected),
            ReturnRule::DeclaringOrAncestor => found
                .and_then(Type::as_named)
                .is_some_and(|returned| {
                    returned != record.object && asg.is_same_or_derived(record.ty, returned)
                }),
        };

        if matches {
            return Ok(());
        }

        let expected = match &self.returns {
            ReturnRule::Exact(expected) => asg.type_name(expected),
            ReturnRule::DeclaringOrAncestor | ReturnRule::Nothing => {
                asg.type_name(&Type::Named(record.ty))
            }
        };

        Err(MismatchReason::ReturnType {
            expected,
            found: found.map_or_else(|| "nothing".into(), |found| asg.type_name(found)),
        })
    }

    fn check_params(&self, member: &Member) -> Result<(), MismatchReason> {
        let MemberShape::OutMethod(params) = &self.shape else {
            return Ok(());
        };

        let matches = member.params().len() == params.len()
            && member
                .params()
                .iter()
                .zip(params.iter())
                .all(|(param, ty)| param.is_out && param.ty == *ty);

        if matches {
            Ok(())
        } else {
            Err(MismatchReason::Parameters)
        }
    }

    fn check_access(&self, record: &RecordShape, member: &Member) -> Result<(), MismatchReason> {
        match self.access {
            AccessRule::Exactly(expected) if member.privacy != expected => {
                Err(MismatchReason::Accessibility {
                    expected,
                    found: member.privacy,
                })
            }
            AccessRule::NotPrivateUnlessSealed
                if !record.is_sealed && member.privacy.is_private() =>
            {
                Err(MismatchReason::Accessibility {
                    expected: Privacy::Protected,
                    found: member.privacy,
                })
            }
            _ => Ok(()),
        }
    }

    fn check_virtuality(&self, member: &Member) -> Result<(), MismatchReason> {
        let modifiers = member.modifiers;

        match self.virtuality {
            VirtualityRule::Overridable if !modifiers.is_dispatched() => {
                Err(MismatchReason::MustBeOverridable)
            }
            VirtualityRule::NotOverridable if modifiers.is_dispatched() => {
                Err(MismatchReason::MustNotBeOverridable)
            }
            VirtualityRule::Override if !modifiers.is_override => Err(MismatchReason::MustOverride),
            VirtualityRule::Fresh if modifiers.is_override => Err(MismatchReason::MustNotBeOverridable),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> (TypeRef, TypeRef, TypeRef) {
        let mut map = slotmap::SlotMap::<TypeRef, ()>::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    fn record(sealed: bool, derived: bool) -> RecordShape {
        let (object, base, ty) = keys();

        RecordShape {
            ty,
            base_record: derived.then_some(base),
            object,
            is_sealed: sealed,
            is_abstract: false,
            deconstruction: vec![],
        }
    }

    #[test]
    fn test_equality_contract_privacy() {
        let open_root = shape_rule(SlotKind::EqualityContract, &record(false, false)).unwrap();
        let sealed_root = shape_rule(SlotKind::EqualityContract, &record(true, false)).unwrap();
        let sealed_derived = shape_rule(SlotKind::EqualityContract, &record(true, true)).unwrap();

        assert_eq!(open_root.access, AccessRule::Exactly(Privacy::Protected));
        assert_eq!(open_root.virtuality, VirtualityRule::Overridable);
        assert_eq!(sealed_root.access, AccessRule::Exactly(Privacy::Private));
        assert_eq!(sealed_root.virtuality, VirtualityRule::NotOverridable);
        assert_eq!(sealed_derived.access, AccessRule::Exactly(Privacy::Protected));
        assert_eq!(sealed_derived.virtuality, VirtualityRule::Override);
    }

    #[test]
    fn test_slots_that_do_not_apply() {
        let root = record(false, false);

        assert_eq!(shape_rule(SlotKind::BaseEquals, &root), None);
        assert_eq!(shape_rule(SlotKind::Deconstruct, &root), None);
        assert!(shape_rule(SlotKind::BaseEquals, &record(false, true)).is_some());
    }

    #[test]
    fn test_operators_are_static_and_public() {
        let root = record(false, false);
        let rule = shape_rule(SlotKind::OperatorNotEquals, &root).unwrap();

        assert_eq!(rule.name, "op_Inequality");
        assert_eq!(rule.virtuality, VirtualityRule::Static);
        assert_eq!(
            rule.shape,
            MemberShape::StaticMethod(vec![Type::Named(root.ty), Type::Named(root.ty)])
        );
    }
}
