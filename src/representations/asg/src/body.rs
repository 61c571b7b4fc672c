use super::{MemberKey, Type, TypeRef};
use derive_more::IsVariant;

#[derive(Clone, Debug, IsVariant)]
pub enum Body {
    /// Abstract members and signatures imported from metadata
    None,
    Intrinsic(Intrinsic),
    /// Expression body written by the user
    User(ast::Expr),
    /// Constructor written by the user, chained to its resolved target
    UserConstructor(UserConstructor),
    Synthesized(Vec<Stmt>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum Intrinsic {
    ObjectConstructor,
    ObjectEquals,
    ObjectHashCode,
    ObjectToString,
}

#[derive(Clone, Debug)]
pub struct UserConstructor {
    /// Written as `: this(...)`, which skips this type's initializers
    pub chains_to_this: bool,
    pub chain_args: Vec<ast::Expr>,
    /// `None` until the constructor is chained during member resolution
    pub chains_to: Option<MemberKey>,
    pub assignments: Vec<ast::MemberInit>,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Return(Expr),
    Let(usize, Expr),
    Store {
        object: Expr,
        member: MemberKey,
        value: Expr,
    },
    StoreOut {
        param: usize,
        value: Expr,
    },
    CallConstructor {
        ctor: MemberKey,
        args: Vec<Expr>,
    },
    /// Runs the field and property initializers declared in this type
    RunInitializers(TypeRef),
    Append {
        builder: Expr,
        text: Expr,
    },
    If {
        condition: Expr,
        then: Vec<Stmt>,
    },
    Eval(Expr),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum Dispatch {
    Virtual,
    /// Non-virtual call, as for `base.M()`
    Direct,
}

#[derive(Clone, Debug, IsVariant)]
pub enum Expr {
    Bool(bool),
    Int(i32),
    Str(String),
    Null,
    This,
    Param(usize),
    Local(usize),
    TypeToken(TypeRef),
    /// Raw read of a field or an auto-property's backing state
    Load {
        object: Box<Expr>,
        member: MemberKey,
    },
    Get {
        object: Box<Expr>,
        property: MemberKey,
        dispatch: Dispatch,
    },
    Call {
        receiver: Box<Expr>,
        method: MemberKey,
        args: Vec<Expr>,
        dispatch: Dispatch,
    },
    CallStatic {
        method: MemberKey,
        args: Vec<Expr>,
    },
    New {
        ctor: MemberKey,
        args: Vec<Expr>,
    },
    NewBuilder,
    BuilderText(Box<Expr>),
    /// `value as T`, null when the runtime type does not derive from `T`
    As(Box<Expr>, TypeRef),
    ReferenceEquals(Box<Expr>, Box<Expr>),
    IsNull(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    StructuralEquals {
        ty: Type,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    StructuralHash {
        ty: Type,
        value: Box<Expr>,
    },
    /// `hash * -1521134295 + value` with wrapping arithmetic
    HashCombine(Box<Expr>, Box<Expr>),
    ToText(Box<Expr>),
    /// User-written expression evaluated with the current parameters in scope
    User(ast::Expr),
}

impl Expr {
    pub fn load(object: Expr, member: MemberKey) -> Self {
        Self::Load {
            object: Box::new(object),
            member,
        }
    }

    pub fn get(object: Expr, property: MemberKey) -> Self {
        Self::Get {
            object: Box::new(object),
            property,
            dispatch: Dispatch::Virtual,
        }
    }

    pub fn call(receiver: Expr, method: MemberKey, args: Vec<Expr>) -> Self {
        Self::Call {
            receiver: Box::new(receiver),
            method,
            args,
            dispatch: Dispatch::Virtual,
        }
    }

    pub fn call_direct(receiver: Expr, method: MemberKey, args: Vec<Expr>) -> Self {
        Self::Call {
            receiver: Box::new(receiver),
            method,
            args,
            dispatch: Dispatch::Direct,
        }
    }

    pub fn reference_equals(left: Expr, right: Expr) -> Self {
        Self::ReferenceEquals(Box::new(left), Box::new(right))
    }

    pub fn null_check(value: Expr) -> Self {
        Self::IsNull(Box::new(value))
    }

    pub fn not(value: Expr) -> Self {
        Self::Not(Box::new(value))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Folds `a && b && ...`, `true` when empty
    pub fn all(conditions: impl IntoIterator<Item = Expr>) -> Self {
        conditions
            .into_iter()
            .reduce(Expr::and)
            .unwrap_or(Expr::Bool(true))
    }
}
