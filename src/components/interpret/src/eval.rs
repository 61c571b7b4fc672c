use crate::{Frame, Interpreter, InterpretError, Result, Value};
use asg::{Dispatch, SlotKind, Type, TypeRef};
use ast::{BinaryOperator, Binary, Expr, ExprKind, With};
use bind_with::{WithScope, bind_with};
use build_records::{TableLookup, Typer};
use source_files::Source;

impl<'c, 'a> Interpreter<'c, 'a> {
    /// Evaluates a user-written expression
    pub(crate) fn eval_ast(&self, expr: &Expr, frame: &Frame) -> Result<Value> {
        self.step()?;

        match &expr.kind {
            ExprKind::Integer(value) => i32::try_from(*value)
                .map(Value::Int)
                .map_err(|_| InterpretError::IntegerOverflow(*value)),
            ExprKind::Boolean(value) => Ok(Value::Bool(*value)),
            ExprKind::String(value) => Ok(Value::Str(value.clone())),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::This => frame
                .this
                .clone()
                .map(Value::Object)
                .ok_or(InterpretError::NullReference),
            ExprKind::Name(name) => self.eval_name(name, frame),
            ExprKind::Member(receiver, name) => {
                let receiver = self.eval_ast(receiver, frame)?;
                let object = receiver.as_object()?;
                let runtime = object.borrow().ty;
                let key = self.find_value_member(runtime, name, frame.this_type)?;

                self.read(object, key, Dispatch::Virtual)
            }
            ExprKind::Call(call) => {
                let (receiver, static_type) = match &call.receiver {
                    Some(receiver) => {
                        let value = self.eval_ast(receiver, frame)?;
                        let static_type = self.static_type(receiver, frame);
                        (value, static_type)
                    }
                    None => {
                        let this = frame.this.clone().ok_or(InterpretError::NullReference)?;
                        (Value::Object(this), frame.this_type.map(Type::Named))
                    }
                };

                let receiver_type = static_type
                    .as_ref()
                    .and_then(named)
                    .or_else(|| receiver.runtime_type())
                    .ok_or(InterpretError::NullReference)?;

                let args = self.eval_args(&call.args, frame)?;
                let arg_types = self.arg_types(&call.args, &args, frame);
                let method = self.select_method(receiver_type, frame.this_type, &call.name, &arg_types)?;

                if self.ctx.member(method)?.is_static() {
                    self.call_static(method, args)
                } else {
                    self.call_virtual(&receiver, method, args)
                }
            }
            ExprKind::New(new) => {
                let ty = self
                    .ctx
                    .asg
                    .lookup(&new.type_name)
                    .ok_or_else(|| InterpretError::UnknownType(new.type_name.clone()))?;

                let args = self.eval_args(&new.args, frame)?;
                let arg_types = self.arg_types(&new.args, &args, frame);
                let ctor = self.select_constructor(ty, frame.this_type, &arg_types)?;

                self.new_object(ctor, args)
            }
            ExprKind::With(with) => self.eval_with(with, expr.source, frame),
            ExprKind::Binary(binary) => self.eval_binary(binary, frame),
            ExprKind::Not(value) => Ok(Value::Bool(!self.eval_ast(value, frame)?.as_bool()?)),
            ExprKind::Cast(cast) => {
                let value = self.eval_ast(&cast.value, frame)?;

                let to = self
                    .ctx
                    .asg
                    .lookup(&cast.to)
                    .ok_or_else(|| InterpretError::UnknownType(cast.to.clone()))?;

                match value.runtime_type() {
                    None if value.is_null() || to == self.ctx.asg.object => Ok(value),
                    Some(runtime) if self.ctx.asg.is_same_or_derived(runtime, to) => Ok(value),
                    runtime => Err(InterpretError::InvalidCast {
                        from: runtime
                            .map(|runtime| self.ctx.asg.types[runtime].name.clone())
                            .unwrap_or_else(|| "value".into()),
                        to: cast.to.clone(),
                    }),
                }
            }
        }
    }

    /// Parameters shadow the members of the enclosing instance
    fn eval_name(&self, name: &str, frame: &Frame) -> Result<Value> {
        if let Some(index) = frame.params.iter().position(|param| param.name == name) {
            return frame
                .args
                .get(index)
                .cloned()
                .ok_or(InterpretError::TypeError("missing argument"));
        }

        let Some(this) = &frame.this else {
            return Err(InterpretError::UnknownMember {
                ty: "<top level>".into(),
                name: name.into(),
            });
        };

        let runtime = this.borrow().ty;
        let key = self.find_value_member(runtime, name, frame.this_type)?;
        self.read(this, key, Dispatch::Virtual)
    }

    fn eval_args(&self, args: &[Expr], frame: &Frame) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.eval_ast(arg, frame)).collect()
    }

    fn static_type(&self, expr: &Expr, frame: &Frame) -> Option<Type> {
        let lookup = TableLookup {
            ctx: self.ctx,
            resolving: None,
        };

        Typer {
            asg: self.ctx.asg,
            lookup: &lookup,
            this: frame.this_type,
            params: frame.params,
        }
        .infer(expr)
        .filter(|ty| !ty.is_error())
    }

    /// Static argument types, falling back to the runtime type of each value
    fn arg_types(&self, exprs: &[Expr], values: &[Value], frame: &Frame) -> Vec<Option<Type>> {
        exprs
            .iter()
            .zip(values)
            .map(|(expr, value)| {
                self.static_type(expr, frame)
                    .or_else(|| self.value_type(value))
            })
            .collect()
    }

    fn eval_with(&self, with: &With, source: Source, frame: &Frame) -> Result<Value> {
        let receiver = self.eval_ast(&with.receiver, frame)?;
        let object = receiver.as_object()?;

        let receiver_type = self
            .static_type(&with.receiver, frame)
            .filter(|ty| named(ty).is_some())
            .unwrap_or(Type::Named(object.borrow().ty));

        let scope = WithScope {
            this: frame.this_type,
            params: frame.params,
            source,
        };

        let bound = bind_with(self.ctx, &receiver_type, &with.inits, scope)
            .map_err(|error| InterpretError::With(error.kind))?;

        let copy = self.call_virtual(&receiver, bound.clone, vec![])?;
        let copied = copy.as_object()?;
        let runtime = copied.borrow().ty;

        if bound.needs_cast && !self.ctx.asg.is_same_or_derived(runtime, bound.receiver) {
            return Err(InterpretError::InvalidCast {
                from: self.ctx.asg.types[runtime].name.clone(),
                to: self.ctx.asg.types[bound.receiver].name.clone(),
            });
        }

        for assignment in &bound.assignments {
            let value = self.eval_ast(&assignment.value, frame)?;
            let member = self.resolve_virtual(runtime, assignment.member)?;
            self.store(copied, member, value);
        }

        Ok(copy)
    }

    fn eval_binary(&self, binary: &Binary, frame: &Frame) -> Result<Value> {
        match binary.operator {
            BinaryOperator::And => {
                let left = self.eval_ast(&binary.left, frame)?.as_bool()?;
                Ok(Value::Bool(left && self.eval_ast(&binary.right, frame)?.as_bool()?))
            }
            BinaryOperator::Or => {
                let left = self.eval_ast(&binary.left, frame)?.as_bool()?;
                Ok(Value::Bool(left || self.eval_ast(&binary.right, frame)?.as_bool()?))
            }
            BinaryOperator::Add => {
                let left = self.eval_ast(&binary.left, frame)?;
                let right = self.eval_ast(&binary.right, frame)?;

                match (&left, &right) {
                    (Value::Int(left), Value::Int(right)) => Ok(Value::Int(left.wrapping_add(*right))),
                    (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(
                        self.text_of(&left)? + &self.text_of(&right)?,
                    )),
                    _ => Err(InterpretError::TypeError("operands of '+' must be ints or strings")),
                }
            }
            BinaryOperator::Equals | BinaryOperator::NotEquals => {
                let slot = if binary.operator.is_equals() {
                    SlotKind::OperatorEquals
                } else {
                    SlotKind::OperatorNotEquals
                };

                let left = self.eval_ast(&binary.left, frame)?;
                let right = self.eval_ast(&binary.right, frame)?;

                let exprs = [binary.left.clone(), binary.right.clone()];
                let values = [left.clone(), right.clone()];
                let arg_types = self.arg_types(&exprs, &values, frame);

                let user_operator = arg_types[0]
                    .as_ref()
                    .and_then(named)
                    .and_then(|ty| {
                        self.select_method(ty, frame.this_type, slot.member_name(), &arg_types)
                            .ok()
                    })
                    .filter(|method| self.ctx.member(*method).is_ok_and(|member| member.is_static()));

                match user_operator {
                    Some(method) => self.call_static(method, vec![left, right]),
                    None => {
                        let equal = left == right;
                        Ok(Value::Bool(equal == binary.operator.is_equals()))
                    }
                }
            }
        }
    }
}

fn named(ty: &Type) -> Option<TypeRef> {
    match ty {
        Type::Named(ty) => Some(*ty),
        Type::Param(param) => param.bound,
        _ => None,
    }
}
