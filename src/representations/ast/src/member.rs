use super::{Annotation, Expr, MemberInit, Modifiers, TypeName};
use attributes::Privacy;
use derive_more::IsVariant;
use source_files::Source;

#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberDeclKind,
    pub privacy: Privacy,
    pub modifiers: Modifiers,
    pub attributes: Vec<Annotation>,
    pub source: Source,
}

#[derive(Clone, Debug, IsVariant)]
pub enum MemberDeclKind {
    Field(FieldDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Operator(OperatorDecl),
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub ty: TypeName,
    pub is_readonly: bool,
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct PropertyDecl {
    pub ty: TypeName,
    pub getter: Option<AccessorDecl>,
    pub setter: Option<AccessorDecl>,
    pub initializer: Option<Expr>,
    /// Computed getter; auto-properties have none
    pub getter_body: Option<Expr>,
}

#[derive(Copy, Clone, Debug)]
pub struct AccessorDecl {
    pub kind: AccessorKind,
    /// Accessor-level privacy narrowing the property's own
    pub privacy: Option<Privacy>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeName,
    pub is_out: bool,
    pub default: Option<Expr>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            name: name.into(),
            ty,
            is_out: false,
            default: None,
        }
    }

    pub fn out(name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            is_out: true,
            ..Self::new(name, ty)
        }
    }
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub params: Vec<ParamDecl>,
    pub return_type: TypeName,
    pub body: Option<Expr>,
}

#[derive(Clone, Debug)]
pub struct ConstructorDecl {
    pub params: Vec<ParamDecl>,
    pub initializer: Option<ConstructorInitializer>,
    pub assignments: Vec<MemberInit>,
}

#[derive(Clone, Debug, IsVariant)]
pub enum ConstructorInitializer {
    Base(Vec<Expr>),
    This(Vec<Expr>),
}

#[derive(Clone, Debug)]
pub struct OperatorDecl {
    pub operator: OverloadableOperator,
    pub params: Vec<ParamDecl>,
    pub return_type: TypeName,
    pub body: Option<Expr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum OverloadableOperator {
    Equality,
    Inequality,
}

impl OverloadableOperator {
    /// Name the operator is emitted under
    pub fn member_name(&self) -> &'static str {
        match self {
            OverloadableOperator::Equality => "op_Equality",
            OverloadableOperator::Inequality => "op_Inequality",
        }
    }
}

impl MemberDecl {
    fn new(name: impl Into<String>, kind: MemberDeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            privacy: Privacy::Private,
            modifiers: Modifiers::NONE,
            attributes: vec![],
            source: Source::internal(),
        }
    }

    pub fn field(name: impl Into<String>, ty: TypeName) -> Self {
        Self::new(
            name,
            MemberDeclKind::Field(FieldDecl {
                ty,
                is_readonly: false,
                initializer: None,
            }),
        )
    }

    /// `T Name { get; set; }`
    pub fn property(name: impl Into<String>, ty: TypeName) -> Self {
        Self::new(
            name,
            MemberDeclKind::Property(PropertyDecl {
                ty,
                getter: Some(AccessorDecl {
                    kind: AccessorKind::Get,
                    privacy: None,
                }),
                setter: Some(AccessorDecl {
                    kind: AccessorKind::Set,
                    privacy: None,
                }),
                initializer: None,
                getter_body: None,
            }),
        )
    }

    pub fn method(
        name: impl Into<String>,
        params: impl IntoIterator<Item = ParamDecl>,
        return_type: TypeName,
    ) -> Self {
        Self::new(
            name,
            MemberDeclKind::Method(MethodDecl {
                params: params.into_iter().collect(),
                return_type,
                body: None,
            }),
        )
    }

    pub fn constructor(name: impl Into<String>, params: impl IntoIterator<Item = ParamDecl>) -> Self {
        Self::new(
            name,
            MemberDeclKind::Constructor(ConstructorDecl {
                params: params.into_iter().collect(),
                initializer: None,
                assignments: vec![],
            }),
        )
    }

    pub fn operator(
        operator: OverloadableOperator,
        params: impl IntoIterator<Item = ParamDecl>,
        return_type: TypeName,
    ) -> Self {
        Self::new(
            operator.member_name(),
            MemberDeclKind::Operator(OperatorDecl {
                operator,
                params: params.into_iter().collect(),
                return_type,
                body: None,
            }),
        )
        .with_modifiers(Modifiers::NONE.r#static())
    }

    pub fn public(self) -> Self {
        self.with_privacy(Privacy::Public)
    }

    pub fn protected(self) -> Self {
        self.with_privacy(Privacy::Protected)
    }

    pub fn with_privacy(self, privacy: Privacy) -> Self {
        Self { privacy, ..self }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }

    pub fn with_attribute(mut self, annotation: Annotation) -> Self {
        self.attributes.push(annotation);
        self
    }

    pub fn at(self, source: Source) -> Self {
        Self { source, ..self }
    }

    /// Attaches an expression body to a method, operator or computed property
    pub fn with_body(mut self, body: Expr) -> Self {
        match &mut self.kind {
            MemberDeclKind::Method(method) => method.body = Some(body),
            MemberDeclKind::Operator(operator) => operator.body = Some(body),
            MemberDeclKind::Property(property) => property.getter_body = Some(body),
            MemberDeclKind::Field(field) => field.initializer = Some(body),
            MemberDeclKind::Constructor(_) => (),
        }
        self
    }

    pub fn with_initializer(mut self, initializer: Expr) -> Self {
        match &mut self.kind {
            MemberDeclKind::Field(field) => field.initializer = Some(initializer),
            MemberDeclKind::Property(property) => property.initializer = Some(initializer),
            _ => (),
        }
        self
    }

    pub fn readonly(mut self) -> Self {
        if let MemberDeclKind::Field(field) = &mut self.kind {
            field.is_readonly = true;
        }
        self
    }

    /// Replaces a property's accessors
    pub fn with_accessors(mut self, getter: Option<AccessorDecl>, setter: Option<AccessorDecl>) -> Self {
        if let MemberDeclKind::Property(property) = &mut self.kind {
            property.getter = getter;
            property.setter = setter;
        }
        self
    }

    pub fn with_constructor_initializer(mut self, initializer: ConstructorInitializer) -> Self {
        if let MemberDeclKind::Constructor(constructor) = &mut self.kind {
            constructor.initializer = Some(initializer);
        }
        self
    }

    pub fn with_assignment(mut self, assignment: MemberInit) -> Self {
        if let MemberDeclKind::Constructor(constructor) = &mut self.kind {
            constructor.assignments.push(assignment);
        }
        self
    }
}

impl AccessorDecl {
    pub fn get() -> Self {
        Self {
            kind: AccessorKind::Get,
            privacy: None,
        }
    }

    pub fn set() -> Self {
        Self {
            kind: AccessorKind::Set,
            privacy: None,
        }
    }

    pub fn init() -> Self {
        Self {
            kind: AccessorKind::Init,
            privacy: None,
        }
    }

    pub fn with_privacy(self, privacy: Privacy) -> Self {
        Self {
            privacy: Some(privacy),
            ..self
        }
    }
}
