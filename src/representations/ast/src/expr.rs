use derive_more::IsVariant;
use source_files::Source;
use std::fmt::Display;

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub source: Source,
}

#[derive(Clone, Debug, IsVariant)]
pub enum ExprKind {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Name(String),
    This,
    Member(Box<Expr>, String),
    Call(Box<Call>),
    New(Box<New>),
    With(Box<With>),
    Binary(Box<Binary>),
    Not(Box<Expr>),
    Cast(Box<Cast>),
}

impl ExprKind {
    pub fn at(self, source: Source) -> Expr {
        Expr { kind: self, source }
    }
}

#[derive(Clone, Debug)]
pub struct Call {
    /// Calls without a receiver target the enclosing instance
    pub receiver: Option<Expr>,
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct New {
    pub type_name: String,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct With {
    pub receiver: Expr,
    pub inits: Vec<MemberInit>,
}

#[derive(Clone, Debug)]
pub struct MemberInit {
    pub name: String,
    pub value: Expr,
    pub source: Source,
}

impl MemberInit {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        let source = value.source;

        Self {
            name: name.into(),
            value,
            source,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binary {
    pub operator: BinaryOperator,
    pub left: Expr,
    pub right: Expr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum BinaryOperator {
    Add,
    Equals,
    NotEquals,
    And,
    Or,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Cast {
    pub to: String,
    pub value: Expr,
}

impl Expr {
    pub fn new(kind: ExprKind, source: Source) -> Self {
        Self { kind, source }
    }

    pub fn int(value: i64) -> Self {
        ExprKind::Integer(value).at(Source::internal())
    }

    pub fn bool(value: bool) -> Self {
        ExprKind::Boolean(value).at(Source::internal())
    }

    pub fn string(value: impl Into<String>) -> Self {
        ExprKind::String(value.into()).at(Source::internal())
    }

    pub fn null() -> Self {
        ExprKind::Null.at(Source::internal())
    }

    pub fn name(name: impl Into<String>) -> Self {
        ExprKind::Name(name.into()).at(Source::internal())
    }

    pub fn this() -> Self {
        ExprKind::This.at(Source::internal())
    }

    pub fn member(self, name: impl Into<String>) -> Self {
        let source = self.source;
        ExprKind::Member(Box::new(self), name.into()).at(source)
    }

    pub fn call(self, name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        let source = self.source;

        ExprKind::Call(Box::new(Call {
            receiver: Some(self),
            name: name.into(),
            args: args.into_iter().collect(),
        }))
        .at(source)
    }

    pub fn call_own(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        ExprKind::Call(Box::new(Call {
            receiver: None,
            name: name.into(),
            args: args.into_iter().collect(),
        }))
        .at(Source::internal())
    }

    pub fn new_object(type_name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        ExprKind::New(Box::new(New {
            type_name: type_name.into(),
            args: args.into_iter().collect(),
        }))
        .at(Source::internal())
    }

    pub fn with(self, inits: impl IntoIterator<Item = MemberInit>) -> Self {
        let source = self.source;

        ExprKind::With(Box::new(With {
            receiver: self,
            inits: inits.into_iter().collect(),
        }))
        .at(source)
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        let source = left.source;
        ExprKind::Binary(Box::new(Binary {
            operator,
            left,
            right,
        }))
        .at(source)
    }

    pub fn not(self) -> Self {
        let source = self.source;
        ExprKind::Not(Box::new(self)).at(source)
    }

    pub fn cast(self, to: impl Into<String>) -> Self {
        let source = self.source;

        ExprKind::Cast(Box::new(Cast {
            to: to.into(),
            value: self,
        }))
        .at(source)
    }

    pub fn at(self, source: Source) -> Self {
        Self { source, ..self }
    }

    /// Whether evaluating this expression reads the plain name `name`
    pub fn mentions(&self, name: &str) -> bool {
        match &self.kind {
            ExprKind::Integer(_)
            | ExprKind::Boolean(_)
            | ExprKind::String(_)
            | ExprKind::Null
            | ExprKind::This => false,
            ExprKind::Name(found) => found == name,
            ExprKind::Member(inner, _) | ExprKind::Not(inner) => inner.mentions(name),
            ExprKind::Call(call) => {
                call.receiver.as_ref().is_some_and(|receiver| receiver.mentions(name))
                    || call.args.iter().any(|arg| arg.mentions(name))
            }
            ExprKind::New(new) => new.args.iter().any(|arg| arg.mentions(name)),
            ExprKind::With(with) => {
                with.receiver.mentions(name) || with.inits.iter().any(|init| init.value.mentions(name))
            }
            ExprKind::Binary(binary) => binary.left.mentions(name) || binary.right.mentions(name),
            ExprKind::Cast(cast) => cast.value.mentions(name),
        }
    }
}
