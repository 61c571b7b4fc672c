use crate::{
    RecordCtx,
    shape::{AccessRule, RecordShape, shape_rule},
};
use asg::{
    Accessor, BlockReason, Body, Constructor, Expr, Member, MemberKey, MemberKind, MemberOrigin,
    MemberTable, Method, Modifiers, OverrideTarget, Param, Property, RuntimeSupportKind, SlotKind,
    Stmt, Type,
};
use ast::AccessorKind;
use attributes::Privacy;
use itertools::Itertools;

/// Members of the base record that synthesized bodies call non-virtually
#[derive(Clone, Debug, Default)]
pub struct InheritedMembers {
    pub equals_typed: Option<MemberKey>,
    pub hash_code: Option<MemberKey>,
    pub print_members: Option<MemberKey>,
    /// Base copy constructor, or the parameterless `object` constructor for
    /// a root record
    pub copy_constructor: Option<MemberKey>,
    pub clone_return: Option<Type>,
}

pub struct Synthesis<'s, 'a> {
    pub ctx: &'s RecordCtx<'a>,
    pub shape: &'s RecordShape,
    pub covariant_returns: bool,
    pub inherited: InheritedMembers,
}

type Synthesized = Result<Option<Member>, BlockReason>;

impl<'s, 'a> Synthesis<'s, 'a> {
    /// Builds the member for `slot`. Slots whose prerequisites are missing
    /// are blocked rather than filled with a partial body.
    pub fn synthesize(&self, table: &MemberTable, slot: SlotKind, target: &OverrideTarget) -> Synthesized {
        match slot {
            SlotKind::EqualityContract => self.equality_contract(target),
            SlotKind::EqualsTyped => self.equals_typed(table),
            SlotKind::EqualsObject => self.equals_object(table, target),
            SlotKind::BaseEquals => self.base_equals(table, target),
            SlotKind::HashCode => self.hash_code(table, target),
            SlotKind::PrintMembers => self.print_members(table, target),
            SlotKind::ToStringMethod => self.to_string(table, target),
            SlotKind::CopyConstructor => self.copy_constructor(table),
            SlotKind::CloneMethod => self.clone(table, target),
            SlotKind::OperatorEquals => self.operator_equals(table),
            SlotKind::OperatorNotEquals => self.operator_not_equals(table),
            SlotKind::Deconstruct => self.deconstruct(table),
        }
    }

    fn own(&self) -> Type {
        Type::Named(self.shape.ty)
    }

    fn require(&self, kind: RuntimeSupportKind) -> Result<(), BlockReason> {
        if self.ctx.asg.runtime.has(kind) {
            Ok(())
        } else {
            Err(BlockReason::MissingRuntimeSupport(kind))
        }
    }

    fn depends_on(table: &MemberTable, slot: SlotKind) -> Result<MemberKey, BlockReason> {
        table
            .slot_member(slot)
            .ok_or(BlockReason::DependsOn(slot))
    }

    fn privacy(&self, slot: SlotKind) -> Privacy {
        match shape_rule(slot, self.shape).map(|rule| rule.access) {
            Some(AccessRule::Exactly(privacy)) => privacy,
            Some(AccessRule::NotPrivateUnlessSealed) | None => Privacy::Public,
        }
    }

    /// `override` when continuing a chain, otherwise `virtual` unless sealed
    fn chain_modifiers(&self, target: &OverrideTarget) -> Modifiers {
        if !target.is_fresh() {
            Modifiers::NONE.r#override()
        } else if self.shape.is_sealed {
            Modifiers::NONE
        } else {
            Modifiers::NONE.r#virtual()
        }
    }

    fn member(&self, slot: SlotKind, kind: MemberKind, privacy: Privacy, modifiers: Modifiers) -> Member {
        Member {
            name: slot.member_name().into(),
            kind,
            privacy,
            modifiers,
            origin: MemberOrigin::Synthesized(slot),
            attributes: vec![],
            source: self.ctx.asg.source_of(self.shape.ty),
        }
    }

    fn method(
        &self,
        slot: SlotKind,
        params: Vec<Param>,
        return_type: Type,
        body: Vec<Stmt>,
        target: &OverrideTarget,
    ) -> Member {
        self.member(
            slot,
            MemberKind::Method(Method {
                params,
                return_type,
                body: Body::Synthesized(body),
                overrides: target.member(),
            }),
            self.privacy(slot),
            self.chain_modifiers(target),
        )
    }

    /// Reads a member the way generated code would: fields directly,
    /// properties through their getter
    fn read(&self, table: &MemberTable, object: Expr, key: MemberKey) -> Expr {
        let member = if key.owner == table.owner {
            Some(table.get(key.index))
        } else {
            self.ctx
                .published(key.owner)
                .map(|published| published.get(key.index))
        };

        match member.map(|member| &member.kind) {
            Some(MemberKind::Field(_)) => Expr::load(object, key),
            _ => Expr::get(object, key),
        }
    }

    fn equality_contract(&self, target: &OverrideTarget) -> Synthesized {
        self.require(RuntimeSupportKind::TypeToken)?;

        let slot = SlotKind::EqualityContract;
        let privacy = self.privacy(slot);

        Ok(Some(self.member(
            slot,
            MemberKind::Property(Property {
                ty: Type::TypeToken,
                getter: Some(Accessor::new(AccessorKind::Get, privacy)),
                setter: None,
                initializer: None,
                body: Some(Body::Synthesized(vec![Stmt::Return(Expr::TypeToken(
                    self.shape.ty,
                ))])),
                backing_field_attributes: vec![],
                overrides: target.member(),
            }),
            privacy,
            self.chain_modifiers(target),
        )))
    }

    fn equals_typed(&self, table: &MemberTable) -> Synthesized {
        let state = table
            .state_members()
            .map(|(key, member)| (key, member.value_type().cloned()))
            .collect_vec();

        if !state.is_empty() {
            self.require(RuntimeSupportKind::StructuralComparer)?;
        }

        let other = Expr::Param(0);

        let first = match self.shape.base_record {
            None => {
                self.require(RuntimeSupportKind::StructuralComparer)?;
                let contract = Self::depends_on(table, SlotKind::EqualityContract)?;

                Expr::and(
                    Expr::not(Expr::null_check(other.clone())),
                    Expr::StructuralEquals {
                        ty: Type::TypeToken,
                        left: Box::new(Expr::get(Expr::This, contract)),
                        right: Box::new(Expr::get(other.clone(), contract)),
                    },
                )
            }
            Some(_) => {
                let base = self
                    .inherited
                    .equals_typed
                    .ok_or(BlockReason::DependsOn(SlotKind::EqualsTyped))?;

                Expr::call_direct(Expr::This, base, vec![other.clone()])
            }
        };

        let fields = state.into_iter().map(|(key, ty)| Expr::StructuralEquals {
            ty: ty.unwrap_or(Type::Error),
            left: Box::new(Expr::load(Expr::This, key)),
            right: Box::new(Expr::load(other.clone(), key)),
        });

        let body = Expr::or(
            Expr::reference_equals(Expr::This, other.clone()),
            Expr::all(std::iter::once(first).chain(fields)),
        );

        Ok(Some(self.method(
            SlotKind::EqualsTyped,
            vec![Param::new("other", self.own())],
            Type::Bool,
            vec![Stmt::Return(body)],
            &OverrideTarget::Fresh,
        )))
    }

    fn equals_object(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        let equals = Self::depends_on(table, SlotKind::EqualsTyped)?;

        let body = Expr::call(
            Expr::This,
            equals,
            vec![Expr::As(Box::new(Expr::Param(0)), self.shape.ty)],
        );

        Ok(Some(self.method(
            SlotKind::EqualsObject,
            vec![Param::new("obj", Type::Named(self.shape.object))],
            Type::Bool,
            vec![Stmt::Return(body)],
            target,
        )))
    }

    fn base_equals(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        let Some(base) = self.shape.base_record else {
            return Ok(None);
        };

        if target.is_fresh() {
            return Err(BlockReason::DependsOn(SlotKind::EqualsTyped));
        }

        let equals = Self::depends_on(table, SlotKind::EqualsObject)?;
        let body = Expr::call(Expr::This, equals, vec![Expr::Param(0)]);

        let mut member = self.method(
            SlotKind::BaseEquals,
            vec![Param::new("other", Type::Named(base))],
            Type::Bool,
            vec![Stmt::Return(body)],
            target,
        );
        member.modifiers = Modifiers::NONE.r#override().sealed();
        Ok(Some(member))
    }

    fn hash_code(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        let state = table
            .state_members()
            .map(|(key, member)| (key, member.value_type().cloned()))
            .collect_vec();

        if !state.is_empty() {
            self.require(RuntimeSupportKind::StructuralComparer)?;
            self.require(RuntimeSupportKind::HashCombiner)?;
        }

        let seed = match self.shape.base_record {
            None => {
                self.require(RuntimeSupportKind::StructuralComparer)?;
                let contract = Self::depends_on(table, SlotKind::EqualityContract)?;

                Expr::StructuralHash {
                    ty: Type::TypeToken,
                    value: Box::new(Expr::get(Expr::This, contract)),
                }
            }
            Some(_) => {
                let base = self
                    .inherited
                    .hash_code
                    .ok_or(BlockReason::DependsOn(SlotKind::HashCode))?;

                Expr::call_direct(Expr::This, base, vec![])
            }
        };

        let hash = state.into_iter().fold(seed, |hash, (key, ty)| {
            Expr::HashCombine(
                Box::new(hash),
                Box::new(Expr::StructuralHash {
                    ty: ty.unwrap_or(Type::Error),
                    value: Box::new(Expr::load(Expr::This, key)),
                }),
            )
        });

        Ok(Some(self.method(
            SlotKind::HashCode,
            vec![],
            Type::Int,
            vec![Stmt::Return(hash)],
            target,
        )))
    }

    fn print_members(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        self.require(RuntimeSupportKind::StringBuilder)?;

        let builder = Expr::Param(0);

        let base = match self.shape.base_record {
            Some(_) => Some(
                self.inherited
                    .print_members
                    .ok_or(BlockReason::DependsOn(SlotKind::PrintMembers))?,
            ),
            None => None,
        };

        let printable = table
            .iter()
            .filter(|(_, member)| member.is_printable())
            .map(|(key, member)| (key, member.name.clone()))
            .collect_vec();

        let append = |text: Expr| Stmt::Append {
            builder: builder.clone(),
            text,
        };

        let base_call = base.map(|base| Expr::call_direct(Expr::This, base, vec![builder.clone()]));

        let mut body = vec![];

        if printable.is_empty() {
            body.push(Stmt::Return(base_call.unwrap_or(Expr::Bool(false))));
        } else {
            if let Some(base_call) = base_call {
                body.push(Stmt::If {
                    condition: base_call,
                    then: vec![append(Expr::Str(", ".into()))],
                });
            }

            for (position, (key, name)) in printable.into_iter().enumerate() {
                if position > 0 {
                    body.push(append(Expr::Str(", ".into())));
                }

                body.push(append(Expr::Str(format!("{} = ", name))));
                body.push(append(Expr::ToText(Box::new(self.read(
                    table,
                    Expr::This,
                    key,
                )))));
            }

            body.push(Stmt::Return(Expr::Bool(true)));
        }

        Ok(Some(self.method(
            SlotKind::PrintMembers,
            vec![Param::new("builder", Type::StringBuilder)],
            Type::Bool,
            body,
            target,
        )))
    }

    fn to_string(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        self.require(RuntimeSupportKind::StringBuilder)?;

        let print_members = Self::depends_on(table, SlotKind::PrintMembers)?;
        let builder = Expr::Local(0);
        let name = &self.ctx.asg.types[self.shape.ty].name;

        let append = |text: &str| Stmt::Append {
            builder: builder.clone(),
            text: Expr::Str(text.into()),
        };

        let body = vec![
            Stmt::Let(0, Expr::NewBuilder),
            append(name.as_str()),
            append(" { "),
            Stmt::Eval(Expr::call(Expr::This, print_members, vec![builder.clone()])),
            append(" }"),
            Stmt::Return(Expr::BuilderText(Box::new(builder.clone()))),
        ];

        Ok(Some(self.method(
            SlotKind::ToStringMethod,
            vec![],
            Type::String,
            body,
            target,
        )))
    }

    fn copy_constructor(&self, table: &MemberTable) -> Synthesized {
        let base = self
            .inherited
            .copy_constructor
            .ok_or(BlockReason::MissingBaseCopyConstructor)?;

        let original = Expr::Param(0);

        let mut body = vec![Stmt::CallConstructor {
            ctor: base,
            args: if self.shape.is_root() {
                vec![]
            } else {
                vec![original.clone()]
            },
        }];

        body.extend(table.state_members().map(|(key, _)| Stmt::Store {
            object: Expr::This,
            member: key,
            value: Expr::load(original.clone(), key),
        }));

        Ok(Some(self.member(
            SlotKind::CopyConstructor,
            MemberKind::Constructor(Constructor {
                params: vec![Param::new("original", self.own())],
                body: Body::Synthesized(body),
            }),
            if self.shape.is_sealed {
                Privacy::Private
            } else {
                Privacy::Protected
            },
            Modifiers::NONE,
        )))
    }

    fn clone(&self, table: &MemberTable, target: &OverrideTarget) -> Synthesized {
        let return_type = match (&self.inherited.clone_return, target.is_fresh()) {
            (Some(inherited), false) if !self.covariant_returns => inherited.clone(),
            _ => self.own(),
        };

        let modifiers = match (target.is_fresh(), self.shape.is_abstract) {
            (false, true) => Modifiers::NONE.r#override().r#abstract(),
            (false, false) => Modifiers::NONE.r#override(),
            (true, true) => Modifiers::NONE.r#abstract(),
            (true, false) => self.chain_modifiers(target),
        };

        let body = if self.shape.is_abstract {
            Body::None
        } else {
            let copy = Self::depends_on(table, SlotKind::CopyConstructor)?;

            Body::Synthesized(vec![Stmt::Return(Expr::New {
                ctor: copy,
                args: vec![Expr::This],
            })])
        };

        Ok(Some(self.member(
            SlotKind::CloneMethod,
            MemberKind::Method(Method {
                params: vec![],
                return_type,
                body,
                overrides: target.member(),
            }),
            Privacy::Public,
            modifiers,
        )))
    }

    fn operator_params(&self) -> Vec<Param> {
        vec![Param::new("left", self.own()), Param::new("right", self.own())]
    }

    fn operator_equals(&self, table: &MemberTable) -> Synthesized {
        let equals = Self::depends_on(table, SlotKind::EqualsTyped)?;
        let (left, right) = (Expr::Param(0), Expr::Param(1));

        let body = Expr::or(
            Expr::reference_equals(left.clone(), right.clone()),
            Expr::and(
                Expr::not(Expr::null_check(left.clone())),
                Expr::call(left, equals, vec![right]),
            ),
        );

        let mut member = self.method(
            SlotKind::OperatorEquals,
            self.operator_params(),
            Type::Bool,
            vec![Stmt::Return(body)],
            &OverrideTarget::Fresh,
        );
        member.modifiers = Modifiers::NONE.r#static();
        Ok(Some(member))
    }

    fn operator_not_equals(&self, table: &MemberTable) -> Synthesized {
        let equals = Self::depends_on(table, SlotKind::OperatorEquals)?;

        let body = Expr::not(Expr::CallStatic {
            method: equals,
            args: vec![Expr::Param(0), Expr::Param(1)],
        });

        let mut member = self.method(
            SlotKind::OperatorNotEquals,
            self.operator_params(),
            Type::Bool,
            vec![Stmt::Return(body)],
            &OverrideTarget::Fresh,
        );
        member.modifiers = Modifiers::NONE.r#static();
        Ok(Some(member))
    }

    fn deconstruct(&self, table: &MemberTable) -> Synthesized {
        let mut params = Vec::with_capacity(table.deconstruction.len());
        let mut body = Vec::with_capacity(table.deconstruction.len());

        for (position, binding) in table.deconstruction.iter().enumerate() {
            let member = binding.member.ok_or(BlockReason::RejectedPositional)?;

            params.push(Param::out(binding.name.clone(), binding.ty.clone()));
            body.push(Stmt::StoreOut {
                param: position,
                value: self.read(table, Expr::This, member),
            });
        }

        let mut member = self.method(
            SlotKind::Deconstruct,
            params,
            Type::Void,
            body,
            &OverrideTarget::Fresh,
        );
        member.modifiers = Modifiers::NONE;
        Ok(Some(member))
    }
}
