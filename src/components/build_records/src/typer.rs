use crate::RecordCtx;
use asg::{Asg, Member, Param, Type, TypeRef};
use ast::{BinaryOperator, Expr, ExprKind};

/// Answers member type queries for the static typer
pub trait MemberLookup {
    /// Type of the field or property `name`, or the return type of the
    /// method `name` taking `arity` arguments
    fn member_type(&self, ty: TypeRef, name: &str, arity: Option<usize>) -> Option<Type>;
}

/// Best-effort static types of user expressions.
/// `None` means the type is unknown and every check against it passes.
pub struct Typer<'t> {
    pub asg: &'t Asg<'t>,
    pub lookup: &'t dyn MemberLookup,
    pub this: Option<TypeRef>,
    pub params: &'t [Param],
}

impl<'t> Typer<'t> {
    pub fn infer(&self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Integer(_) => Some(Type::Int),
            ExprKind::Boolean(_) => Some(Type::Bool),
            ExprKind::String(_) => Some(Type::String),
            ExprKind::Null => Some(Type::Null),
            ExprKind::This => self.this.map(Type::Named),
            ExprKind::Name(name) => self
                .params
                .iter()
                .find(|param| param.name == *name)
                .map(|param| param.ty.clone())
                .or_else(|| {
                    self.this
                        .and_then(|this| self.lookup.member_type(this, name, None))
                }),
            ExprKind::Member(receiver, name) => {
                let receiver = self.infer(receiver)?;
                self.lookup.member_type(self.named(&receiver)?, name, None)
            }
            ExprKind::Call(call) => {
                let receiver = match &call.receiver {
                    Some(receiver) => self.named(&self.infer(receiver)?)?,
                    None => self.this?,
                };

                self.lookup
                    .member_type(receiver, &call.name, Some(call.args.len()))
            }
            ExprKind::New(new) => self.asg.lookup(&new.type_name).map(Type::Named),
            ExprKind::With(with) => self.infer(&with.receiver),
            ExprKind::Binary(binary) => match binary.operator {
                BinaryOperator::Add => {
                    let left = self.infer(&binary.left);
                    let right = self.infer(&binary.right);

                    match (left, right) {
                        (Some(Type::Int), Some(Type::Int)) => Some(Type::Int),
                        (Some(Type::String), _) | (_, Some(Type::String)) => Some(Type::String),
                        _ => None,
                    }
                }
                BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::And
                | BinaryOperator::Or => Some(Type::Bool),
            },
            ExprKind::Not(_) => Some(Type::Bool),
            ExprKind::Cast(cast) => self.asg.lookup(&cast.to).map(Type::Named),
        }
    }

    /// Whether `expr` may be passed where `expected` is required
    pub fn accepts(&self, expected: &Type, expr: &Expr) -> bool {
        self.infer(expr)
            .is_none_or(|found| found.is_error() || self.asg.is_assignable(&found, expected))
    }

    fn named(&self, ty: &Type) -> Option<TypeRef> {
        match ty {
            Type::Named(type_ref) => Some(*type_ref),
            Type::Param(param) => param.bound,
            _ => None,
        }
    }
}

/// Looks members up in member tables.
/// While the table of `resolving` is being computed, only its own
/// declarations and its ancestors' published tables are consulted.
pub struct TableLookup<'c, 'a> {
    pub ctx: &'c RecordCtx<'a>,
    pub resolving: Option<TypeRef>,
}

fn is_match(member: &Member, name: &str, arity: Option<usize>) -> bool {
    member.name == name
        && !member.is_constructor()
        && match arity {
            None => !member.kind.is_method(),
            Some(arity) => member.kind.is_method() && member.arity() == arity,
        }
}

impl<'c, 'a> TableLookup<'c, 'a> {
    fn in_tables(&self, ty: TypeRef, name: &str, arity: Option<usize>) -> Option<Type> {
        std::iter::once(ty)
            .chain(self.ctx.asg.ancestors(ty))
            .filter_map(|ty| self.ctx.members(ty).ok())
            .find_map(|table| {
                table
                    .members
                    .iter()
                    .find(|member| is_match(member, name, arity))
                    .and_then(|member| member.value_type().cloned())
            })
    }
}

impl<'c, 'a> MemberLookup for TableLookup<'c, 'a> {
    fn member_type(&self, ty: TypeRef, name: &str, arity: Option<usize>) -> Option<Type> {
        let Some(resolving) = self.resolving else {
            return self.in_tables(ty, name, arity);
        };

        let asg = self.ctx.asg;

        if ty == resolving {
            let symbol = &asg.types[ty];

            let declared = symbol
                .declared
                .iter()
                .find(|member| is_match(member, name, arity))
                .and_then(|member| member.value_type().cloned());

            let positional = || {
                arity.is_none().then(|| {
                    symbol
                        .positional()
                        .iter()
                        .find(|param| param.name == name)
                        .map(|param| param.ty.clone())
                })?
            };

            return declared
                .or_else(positional)
                .or_else(|| symbol.base.and_then(|base| self.in_tables(base, name, arity)));
        }

        asg.is_same_or_derived(resolving, ty)
            .then(|| self.in_tables(ty, name, arity))
            .flatten()
    }
}
