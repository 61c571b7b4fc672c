use super::{Body, MemberKey, SlotKind, Type};
use ast::{AccessorKind, Modifiers};
use attributes::Privacy;
use derive_more::IsVariant;
use source_files::Source;

pub const CONSTRUCTOR_NAME: &str = ".ctor";

#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub privacy: Privacy,
    pub modifiers: Modifiers,
    pub origin: MemberOrigin,
    pub attributes: Vec<String>,
    pub source: Source,
}

#[derive(Clone, Debug, IsVariant)]
pub enum MemberKind {
    Field(Field),
    Property(Property),
    Method(Method),
    Constructor(Constructor),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum MemberOrigin {
    Declared,
    /// Property produced from the parameter at this position
    Positional(usize),
    PrimaryConstructor,
    /// Parameterless constructor of a type that declares none
    DefaultConstructor,
    Synthesized(SlotKind),
    Builtin,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub ty: Type,
    pub is_readonly: bool,
    pub initializer: Option<ast::Expr>,
}

#[derive(Clone, Debug)]
pub struct Property {
    pub ty: Type,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub initializer: Option<ast::Expr>,
    /// Computed getter; `None` for auto-properties
    pub body: Option<Body>,
    /// Attributes routed onto the compiler-generated backing field
    pub backing_field_attributes: Vec<String>,
    pub overrides: Option<MemberKey>,
}

#[derive(Clone, Debug)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub privacy: Privacy,
    pub attributes: Vec<String>,
}

impl Accessor {
    pub fn new(kind: AccessorKind, privacy: Privacy) -> Self {
        Self {
            kind,
            privacy,
            attributes: vec![],
        }
    }
}

#[derive(Clone, Debug)]
pub struct Method {
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Body,
    pub overrides: Option<MemberKey>,
}

#[derive(Clone, Debug)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub body: Body,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub is_out: bool,
    pub default: Option<ast::Expr>,
    pub attributes: Vec<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            is_out: false,
            default: None,
            attributes: vec![],
        }
    }

    pub fn out(name: impl Into<String>, ty: Type) -> Self {
        Self {
            is_out: true,
            ..Self::new(name, ty)
        }
    }
}

impl Member {
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static
    }

    pub fn is_constructor(&self) -> bool {
        self.kind.is_constructor()
    }

    pub fn as_method(&self) -> Option<&Method> {
        match &self.kind {
            MemberKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&Property> {
        match &self.kind {
            MemberKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match &self.kind {
            MemberKind::Constructor(constructor) => Some(constructor),
            _ => None,
        }
    }

    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Method(method) => &method.params,
            MemberKind::Constructor(constructor) => &constructor.params,
            MemberKind::Field(_) | MemberKind::Property(_) => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.params().len()
    }

    pub fn param_types(&self) -> impl Iterator<Item = &Type> {
        self.params().iter().map(|param| &param.ty)
    }

    /// Type read from a field or property, or returned by a method
    pub fn value_type(&self) -> Option<&Type> {
        match &self.kind {
            MemberKind::Field(field) => Some(&field.ty),
            MemberKind::Property(property) => Some(&property.ty),
            MemberKind::Method(method) => Some(&method.return_type),
            MemberKind::Constructor(_) => None,
        }
    }

    pub fn overrides(&self) -> Option<MemberKey> {
        match &self.kind {
            MemberKind::Method(method) => method.overrides,
            MemberKind::Property(property) => property.overrides,
            MemberKind::Field(_) | MemberKind::Constructor(_) => None,
        }
    }

    pub fn is_overridable(&self) -> bool {
        self.modifiers.is_overridable()
    }

    /// Instance fields and auto-properties, which own per-instance state
    pub fn is_state_holding(&self) -> bool {
        if self.is_static() {
            return false;
        }

        match &self.kind {
            MemberKind::Field(_) => true,
            MemberKind::Property(property) => {
                property.body.is_none() && !self.modifiers.is_abstract
            }
            MemberKind::Method(_) | MemberKind::Constructor(_) => false,
        }
    }

    /// Whether this member can be read as an instance value
    pub fn is_readable_instance_value(&self) -> bool {
        if self.is_static() {
            return false;
        }

        match &self.kind {
            MemberKind::Field(_) => true,
            MemberKind::Property(property) => property.getter.is_some(),
            MemberKind::Method(_) | MemberKind::Constructor(_) => false,
        }
    }

    pub fn getter_privacy(&self) -> Option<Privacy> {
        match &self.kind {
            MemberKind::Field(_) => Some(self.privacy),
            MemberKind::Property(property) => property
                .getter
                .as_ref()
                .map(|getter| getter.privacy.most_restrictive(self.privacy)),
            MemberKind::Method(_) | MemberKind::Constructor(_) => None,
        }
    }

    /// Privacy of the write path, if the member can be written at all
    pub fn setter_privacy(&self) -> Option<Privacy> {
        match &self.kind {
            MemberKind::Field(field) => (!field.is_readonly).then_some(self.privacy),
            MemberKind::Property(property) => property
                .setter
                .as_ref()
                .map(|setter| setter.privacy.most_restrictive(self.privacy)),
            MemberKind::Method(_) | MemberKind::Constructor(_) => None,
        }
    }

    /// Fields whose writes are only legal inside constructors or object initializers
    pub fn allows_initializer_write(&self) -> bool {
        match &self.kind {
            MemberKind::Field(field) => field.is_readonly,
            MemberKind::Property(property) => property
                .setter
                .as_ref()
                .is_some_and(|setter| setter.kind.is_init()),
            MemberKind::Method(_) | MemberKind::Constructor(_) => false,
        }
    }

    /// Public instance fields and public readable properties appear in `ToString`.
    /// Overrides are printed by the type that introduced them.
    pub fn is_printable(&self) -> bool {
        !self.is_static()
            && !self.modifiers.is_override
            && self.name != SlotKind::EqualityContract.member_name()
            && self.getter_privacy() == Some(Privacy::Public)
            && !self.origin.is_synthesized()
    }

    pub fn describe(&self) -> &'static str {
        match &self.kind {
            MemberKind::Field(_) => "field",
            MemberKind::Property(_) => "property",
            MemberKind::Method(_) => "method",
            MemberKind::Constructor(_) => "constructor",
        }
    }
}
