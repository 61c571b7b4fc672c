use super::{Body, Constructor, Intrinsic, Member, MemberKind, MemberOrigin, Method, Param, Type, TypeRef};
use ast::{Modifiers, Origin};
use attributes::Privacy;
use derive_more::IsVariant;
use source_files::Source;

#[derive(Clone, Debug)]
pub struct TypeSymbol {
    pub name: String,
    pub kind: TypeKind,
    pub origin: Origin,
    pub privacy: Privacy,
    pub base: Option<TypeRef>,
    /// Arguments the primary constructor forwards to the base constructor
    pub base_args: Option<Vec<ast::Expr>>,
    pub is_sealed: bool,
    pub is_abstract: bool,
    /// `None` when the record has no parameter list
    pub positional: Option<Vec<PositionalMember>>,
    pub declared: Vec<Member>,
    /// Set for every type whose base chain loops back on itself or runs
    /// into such a loop
    pub in_cycle: bool,
    pub source: Source,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum TypeKind {
    Object,
    Class,
    Record,
}

#[derive(Clone, Debug)]
pub struct PositionalMember {
    pub name: String,
    pub ty: Type,
    pub ordinal: usize,
    pub default: Option<ast::Expr>,
    pub attributes: Vec<ast::Annotation>,
    pub source: Source,
}

impl TypeSymbol {
    /// The implicit root of every hierarchy
    pub fn object(this: TypeRef) -> Self {
        let builtin = |name: &str, kind: MemberKind, modifiers: Modifiers| Member {
            name: name.into(),
            kind,
            privacy: Privacy::Public,
            modifiers,
            origin: MemberOrigin::Builtin,
            attributes: vec![],
            source: Source::internal(),
        };

        let method = |params: Vec<Param>, return_type: Type, intrinsic: Intrinsic| {
            MemberKind::Method(Method {
                params,
                return_type,
                body: Body::Intrinsic(intrinsic),
                overrides: None,
            })
        };

        Self {
            name: "object".into(),
            kind: TypeKind::Object,
            origin: Origin::Metadata,
            privacy: Privacy::Public,
            base: None,
            base_args: None,
            is_sealed: false,
            is_abstract: false,
            positional: None,
            declared: vec![
                builtin(
                    ".ctor",
                    MemberKind::Constructor(Constructor {
                        params: vec![],
                        body: Body::Intrinsic(Intrinsic::ObjectConstructor),
                    }),
                    Modifiers::NONE,
                ),
                builtin(
                    "Equals",
                    method(
                        vec![Param::new("obj", Type::Named(this))],
                        Type::Bool,
                        Intrinsic::ObjectEquals,
                    ),
                    Modifiers::NONE.r#virtual(),
                ),
                builtin(
                    "GetHashCode",
                    method(vec![], Type::Int, Intrinsic::ObjectHashCode),
                    Modifiers::NONE.r#virtual(),
                ),
                builtin(
                    "ToString",
                    method(vec![], Type::String, Intrinsic::ObjectToString),
                    Modifiers::NONE.r#virtual(),
                ),
            ],
            in_cycle: false,
            source: Source::internal(),
        }
    }

    pub fn is_record(&self) -> bool {
        self.kind.is_record()
    }

    pub fn has_parameter_list(&self) -> bool {
        self.positional.is_some()
    }

    pub fn positional(&self) -> &[PositionalMember] {
        self.positional.as_deref().unwrap_or_default()
    }
}
