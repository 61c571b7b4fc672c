use crate::{Frame, Interpreter, InterpretError, ObjectRef, Result, Value, stable_hash};
use asg::{Body, Expr, Intrinsic, Member, MemberKey, MemberKind, Stmt, TypeRef, UserConstructor};

fn body_of(member: &Member) -> Option<&Body> {
    match &member.kind {
        MemberKind::Method(method) => Some(&method.body),
        MemberKind::Constructor(constructor) => Some(&constructor.body),
        MemberKind::Property(property) => property.body.as_ref(),
        MemberKind::Field(_) => None,
    }
}

impl<'c, 'a> Interpreter<'c, 'a> {
    /// Runs the body of `key` in `frame`
    pub(crate) fn invoke(&self, key: MemberKey, frame: &mut Frame) -> Result<Value> {
        self.step()?;

        let depth = self.depth.get();
        if depth >= Self::MAX_CALL_DEPTH {
            return Err(InterpretError::StackOverflow);
        }

        let member = self.ctx.member(key)?;
        tracing::trace!(name = %member.name, depth, "invoke");

        let Some(body) = body_of(member) else {
            return Err(InterpretError::AbstractCall(self.ctx.member_path(key.owner, member)));
        };

        self.depth.set(depth + 1);
        let result = self.run_body(key, body, frame);
        self.depth.set(depth);
        result
    }

    pub(crate) fn run_body(&self, key: MemberKey, body: &Body, frame: &mut Frame) -> Result<Value> {
        match body {
            Body::None => {
                let member = self.ctx.member(key)?;
                Err(InterpretError::AbstractCall(self.ctx.member_path(key.owner, member)))
            }
            Body::Intrinsic(intrinsic) => self.intrinsic(*intrinsic, frame),
            Body::User(expr) => self.eval_ast(expr, frame),
            Body::UserConstructor(constructor) => {
                self.run_user_constructor(key, constructor, frame)?;
                Ok(Value::Null)
            }
            Body::Synthesized(stmts) => Ok(self.exec_block(stmts, frame)?.unwrap_or(Value::Null)),
        }
    }

    fn intrinsic(&self, intrinsic: Intrinsic, frame: &Frame) -> Result<Value> {
        let this = frame.this.clone().ok_or(InterpretError::NullReference)?;

        match intrinsic {
            Intrinsic::ObjectConstructor => Ok(Value::Null),
            Intrinsic::ObjectEquals => {
                let other = frame.args.first().cloned().unwrap_or(Value::Null);
                Ok(Value::Bool(Value::Object(this).is_same_reference(&other)))
            }
            Intrinsic::ObjectHashCode => Ok(Value::Int(this.borrow().id as i32)),
            Intrinsic::ObjectToString => {
                let ty = this.borrow().ty;
                Ok(Value::Str(self.ctx.asg.types[ty].name.clone()))
            }
        }
    }

    fn run_user_constructor(&self, key: MemberKey, body: &UserConstructor, frame: &mut Frame) -> Result<()> {
        let this = frame.this.clone().ok_or(InterpretError::NullReference)?;

        let chain_args = body
            .chain_args
            .iter()
            .map(|arg| self.eval_ast(arg, frame))
            .collect::<Result<Vec<_>>>()?;

        if !body.chains_to_this {
            self.run_initializers(key.owner, frame)?;
        }

        match body.chains_to {
            Some(target) => self.run_constructor(target, this.clone(), chain_args)?,
            None => self.run_unchained(key, &this, frame)?,
        }

        for assignment in &body.assignments {
            let value = self.eval_ast(&assignment.value, frame)?;
            let member = self.find_value_member(key.owner, &assignment.name, Some(key.owner))?;
            let runtime = this.borrow().ty;
            let member = self.resolve_virtual(runtime, member)?;

            self.store(&this, member, value);
        }

        Ok(())
    }

    /// Constructors imported from metadata have nothing to chain to.
    /// Their copy constructors copy the state the type declares.
    fn run_unchained(&self, key: MemberKey, this: &ObjectRef, frame: &Frame) -> Result<()> {
        let symbol = &self.ctx.asg.types[key.owner];

        if symbol.origin.is_source() && symbol.base.is_some() {
            return Err(InterpretError::UnchainedConstructor(symbol.name.clone()));
        }

        let member = self.ctx.member(key)?;
        let is_copy = member.param_types().eq([asg::Type::Named(key.owner)].iter());

        if let (true, Some(Value::Object(original))) = (is_copy, frame.args.first()) {
            for (state, _) in self.ctx.members(key.owner)?.state_members() {
                let value = self.load(original, state);
                self.store(this, state, value);
            }
        }

        Ok(())
    }

    fn run_initializers(&self, ty: TypeRef, frame: &Frame) -> Result<()> {
        let this = frame.this.clone().ok_or(InterpretError::NullReference)?;

        for (key, member) in self.ctx.members(ty)?.state_members() {
            let initializer = match &member.kind {
                MemberKind::Field(field) => field.initializer.as_ref(),
                MemberKind::Property(property) => property.initializer.as_ref(),
                MemberKind::Method(_) | MemberKind::Constructor(_) => None,
            };

            if let Some(initializer) = initializer {
                let value = self.eval_ast(initializer, frame)?;
                self.store(&this, key, value);
            }
        }

        Ok(())
    }

    /// Executes statements until one returns
    fn exec_block(&self, stmts: &[Stmt], frame: &mut Frame) -> Result<Option<Value>> {
        for stmt in stmts {
            self.step()?;

            match stmt {
                Stmt::Return(value) => return self.eval_body(value, frame).map(Some),
                Stmt::Let(local, value) => {
                    let value = self.eval_body(value, frame)?;

                    if frame.locals.len() <= *local {
                        frame.locals.resize(*local + 1, Value::Null);
                    }
                    frame.locals[*local] = value;
                }
                Stmt::Store {
                    object,
                    member,
                    value,
                } => {
                    let object = self.eval_body(object, frame)?;
                    let value = self.eval_body(value, frame)?;
                    self.store(object.as_object()?, *member, value);
                }
                Stmt::StoreOut { param, value } => {
                    let value = self.eval_body(value, frame)?;

                    let slot = frame
                        .args
                        .get_mut(*param)
                        .ok_or(InterpretError::TypeError("missing out parameter"))?;
                    *slot = value;
                }
                Stmt::CallConstructor { ctor, args } => {
                    let args = self.eval_all(args, frame)?;
                    let this = frame.this.clone().ok_or(InterpretError::NullReference)?;
                    self.run_constructor(*ctor, this, args)?;
                }
                Stmt::RunInitializers(ty) => self.run_initializers(*ty, frame)?,
                Stmt::Append { builder, text } => {
                    let builder = self.eval_body(builder, frame)?;
                    let text = self.eval_body(text, frame)?;
                    let text = self.text_of(&text)?;

                    builder.as_builder()?.borrow_mut().push_str(&text);
                }
                Stmt::If { condition, then } => {
                    if self.eval_body(condition, frame)?.as_bool()? {
                        if let Some(returned) = self.exec_block(then, frame)? {
                            return Ok(Some(returned));
                        }
                    }
                }
                Stmt::Eval(value) => {
                    self.eval_body(value, frame)?;
                }
            }
        }

        Ok(None)
    }

    fn eval_all(&self, exprs: &[Expr], frame: &Frame) -> Result<Vec<Value>> {
        exprs.iter().map(|expr| self.eval_body(expr, frame)).collect()
    }

    fn eval_body(&self, expr: &Expr, frame: &Frame) -> Result<Value> {
        match expr {
            Expr::Bool(value) => Ok(Value::Bool(*value)),
            Expr::Int(value) => Ok(Value::Int(*value)),
            Expr::Str(value) => Ok(Value::Str(value.clone())),
            Expr::Null => Ok(Value::Null),
            Expr::This => frame
                .this
                .clone()
                .map(Value::Object)
                .ok_or(InterpretError::NullReference),
            Expr::Param(index) => frame
                .args
                .get(*index)
                .cloned()
                .ok_or(InterpretError::TypeError("missing argument")),
            Expr::Local(index) => Ok(frame.locals.get(*index).cloned().unwrap_or(Value::Null)),
            Expr::TypeToken(ty) => Ok(Value::TypeToken(*ty)),
            Expr::Load { object, member } => {
                let object = self.eval_body(object, frame)?;
                Ok(self.load(object.as_object()?, *member))
            }
            Expr::Get {
                object,
                property,
                dispatch,
            } => {
                let object = self.eval_body(object, frame)?;
                self.read(object.as_object()?, *property, *dispatch)
            }
            Expr::Call {
                receiver,
                method,
                args,
                dispatch,
            } => {
                let receiver = self.eval_body(receiver, frame)?;
                let args = self.eval_all(args, frame)?;
                self.call_with(&receiver, *method, args, *dispatch)
            }
            Expr::CallStatic { method, args } => {
                let args = self.eval_all(args, frame)?;
                self.call_static(*method, args)
            }
            Expr::New { ctor, args } => {
                let args = self.eval_all(args, frame)?;
                self.new_object(*ctor, args)
            }
            Expr::NewBuilder => Ok(Value::builder()),
            Expr::BuilderText(builder) => {
                let builder = self.eval_body(builder, frame)?;
                Ok(Value::Str(builder.as_builder()?.borrow().clone()))
            }
            Expr::As(value, ty) => {
                let value = self.eval_body(value, frame)?;

                Ok(match value.runtime_type() {
                    Some(runtime) if self.ctx.asg.is_same_or_derived(runtime, *ty) => value,
                    _ => Value::Null,
                })
            }
            Expr::ReferenceEquals(left, right) => {
                let left = self.eval_body(left, frame)?;
                let right = self.eval_body(right, frame)?;
                Ok(Value::Bool(left.is_same_reference(&right)))
            }
            Expr::IsNull(value) => Ok(Value::Bool(self.eval_body(value, frame)?.is_null())),
            Expr::Not(value) => Ok(Value::Bool(!self.eval_body(value, frame)?.as_bool()?)),
            Expr::And(left, right) => Ok(Value::Bool(
                self.eval_body(left, frame)?.as_bool()? && self.eval_body(right, frame)?.as_bool()?,
            )),
            Expr::Or(left, right) => Ok(Value::Bool(
                self.eval_body(left, frame)?.as_bool()? || self.eval_body(right, frame)?.as_bool()?,
            )),
            Expr::StructuralEquals { left, right, .. } => {
                let left = self.eval_body(left, frame)?;
                let right = self.eval_body(right, frame)?;
                Ok(Value::Bool(self.structural_equals(&left, &right)?))
            }
            Expr::StructuralHash { value, .. } => {
                let value = self.eval_body(value, frame)?;
                Ok(Value::Int(self.structural_hash(&value)?))
            }
            Expr::HashCombine(hash, value) => {
                let hash = self.eval_body(hash, frame)?.as_int()?;
                let value = self.eval_body(value, frame)?.as_int()?;
                Ok(Value::Int(hash.wrapping_mul(-1521134295).wrapping_add(value)))
            }
            Expr::ToText(value) => {
                let value = self.eval_body(value, frame)?;
                Ok(Value::Str(self.text_of(&value)?))
            }
            Expr::User(expr) => self.eval_ast(expr, frame),
        }
    }

    /// Virtual `object` method every instance has, such as `ToString`
    fn object_method(&self, name: &str, arity: usize) -> Result<MemberKey> {
        let object = self.ctx.asg.object;

        self.ctx
            .members(object)?
            .named(name)
            .find(|(_, member)| member.kind.is_method() && member.arity() == arity)
            .map(|(key, _)| key)
            .ok_or_else(|| InterpretError::UnknownMember {
                ty: "object".into(),
                name: name.into(),
            })
    }

    pub(crate) fn text_of(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => String::new(),
            Value::Int(value) => value.to_string(),
            Value::Bool(true) => "True".into(),
            Value::Bool(false) => "False".into(),
            Value::Str(value) => value.clone(),
            Value::TypeToken(ty) => self.ctx.asg.types[*ty].name.clone(),
            Value::Builder(builder) => builder.borrow().clone(),
            Value::Object(_) => {
                let to_string = self.object_method("ToString", 0)?;

                match self.call_virtual(value, to_string, vec![])? {
                    Value::Str(text) => text,
                    other => self.text_of(&other)?,
                }
            }
        })
    }

    /// Default equality of two values of the same static type
    pub(crate) fn structural_equals(&self, left: &Value, right: &Value) -> Result<bool> {
        match (left, right) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Object(_), _) => {
                let equals = self.object_method("Equals", 1)?;
                self.call_virtual(left, equals, vec![right.clone()])?.as_bool()
            }
            _ => Ok(left == right),
        }
    }

    pub(crate) fn structural_hash(&self, value: &Value) -> Result<i32> {
        Ok(match value {
            Value::Null => 0,
            Value::Int(value) => *value,
            Value::Bool(value) => i32::from(*value),
            Value::Str(value) => stable_hash(value),
            Value::TypeToken(ty) => stable_hash(&self.ctx.asg.types[*ty].name),
            Value::Builder(builder) => stable_hash(&builder.borrow()),
            Value::Object(_) => {
                let hash_code = self.object_method("GetHashCode", 0)?;
                self.call_virtual(value, hash_code, vec![])?.as_int()?
            }
        })
    }
}
