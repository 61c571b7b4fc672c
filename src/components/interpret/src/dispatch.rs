use crate::{Frame, Interpreter, InterpretError, ObjectRef, Result, Value};
use asg::{Dispatch, Member, MemberKey, Type, TypeRef};
use itertools::Itertools;

impl<'c, 'a> Interpreter<'c, 'a> {
    /// Most derived override of `key` in `runtime`, following the override
    /// target recorded on each member
    pub(crate) fn resolve_virtual(&self, runtime: TypeRef, key: MemberKey) -> Result<MemberKey> {
        if runtime == key.owner {
            return Ok(key);
        }

        if let Some(resolved) = self.dispatch_cache.borrow().get(&(runtime, key)) {
            return Ok(*resolved);
        }

        let mut resolved = key;

        for ty in std::iter::once(runtime).chain(self.ctx.asg.ancestors(runtime)) {
            if ty == key.owner {
                break;
            }

            let table = self.ctx.members(ty)?;
            let mut found = None;

            for (candidate, member) in table.iter() {
                if self.overrides_transitively(member, key)? {
                    found = Some(candidate);
                    break;
                }
            }

            if let Some(found) = found {
                resolved = found;
                break;
            }
        }

        self.dispatch_cache
            .borrow_mut()
            .insert((runtime, key), resolved);
        Ok(resolved)
    }

    fn overrides_transitively(&self, member: &Member, key: MemberKey) -> Result<bool> {
        let mut next = member.overrides();

        while let Some(target) = next {
            if target == key {
                return Ok(true);
            }

            next = self.ctx.member(target)?.overrides();
        }

        Ok(false)
    }

    pub(crate) fn frame_for(
        &self,
        key: MemberKey,
        this: Option<ObjectRef>,
        args: Vec<Value>,
    ) -> Result<Frame<'c>> {
        let member = self.ctx.member(key)?;

        Ok(Frame {
            this,
            this_type: Some(key.owner),
            args,
            params: member.params(),
            locals: vec![],
        })
    }

    pub(crate) fn call_virtual(&self, receiver: &Value, method: MemberKey, args: Vec<Value>) -> Result<Value> {
        self.call_with(receiver, method, args, Dispatch::Virtual)
    }

    pub(crate) fn call_with(
        &self,
        receiver: &Value,
        method: MemberKey,
        args: Vec<Value>,
        dispatch: Dispatch,
    ) -> Result<Value> {
        let object = receiver.as_object()?;

        let method = match dispatch {
            Dispatch::Virtual => self.resolve_virtual(object.borrow().ty, method)?,
            Dispatch::Direct => method,
        };

        let mut frame = self.frame_for(method, Some(object.clone()), args)?;
        self.invoke(method, &mut frame)
    }

    pub(crate) fn call_static(&self, method: MemberKey, args: Vec<Value>) -> Result<Value> {
        let mut frame = self.frame_for(method, None, args)?;
        self.invoke(method, &mut frame)
    }

    /// Allocates an instance of the constructor's type and runs the constructor
    pub(crate) fn new_object(&self, ctor: MemberKey, args: Vec<Value>) -> Result<Value> {
        let value = self.allocate(ctor.owner);
        let object = value.as_object()?.clone();

        self.run_constructor(ctor, object, args)?;
        Ok(value)
    }

    pub(crate) fn run_constructor(&self, ctor: MemberKey, this: ObjectRef, args: Vec<Value>) -> Result<()> {
        let mut frame = self.frame_for(ctor, Some(this), args)?;
        self.invoke(ctor, &mut frame)?;
        Ok(())
    }

    /// Reads a field, or a property through its getter
    pub(crate) fn read(&self, object: &ObjectRef, key: MemberKey, dispatch: Dispatch) -> Result<Value> {
        let key = match dispatch {
            Dispatch::Virtual => self.resolve_virtual(object.borrow().ty, key)?,
            Dispatch::Direct => key,
        };

        let member = self.ctx.member(key)?;

        match member.as_property().and_then(|property| property.body.as_ref()) {
            Some(_) => {
                let mut frame = self.frame_for(key, Some(object.clone()), vec![])?;
                self.invoke(key, &mut frame)
            }
            None if member.modifiers.is_abstract => {
                Err(InterpretError::AbstractCall(self.ctx.member_path(key.owner, member)))
            }
            None => Ok(self.load(object, key)),
        }
    }

    pub(crate) fn load(&self, object: &ObjectRef, key: MemberKey) -> Value {
        if let Some(value) = object.borrow().state.get(&key) {
            return value.clone();
        }

        match self.ctx.member(key).ok().and_then(Member::value_type) {
            Some(Type::Int) => Value::Int(0),
            Some(Type::Bool) => Value::Bool(false),
            _ => Value::Null,
        }
    }

    /// Writes the state of a field or auto-property
    pub(crate) fn store(&self, object: &ObjectRef, key: MemberKey, value: Value) {
        object.borrow_mut().state.insert(key, value);
    }

    /// Static type of a runtime value, as far as overload resolution cares
    pub(crate) fn value_type(&self, value: &Value) -> Option<Type> {
        match value {
            Value::Null => Some(Type::Null),
            Value::Int(_) => Some(Type::Int),
            Value::Bool(_) => Some(Type::Bool),
            Value::Str(_) => Some(Type::String),
            Value::TypeToken(_) => Some(Type::TypeToken),
            Value::Builder(_) => Some(Type::StringBuilder),
            Value::Object(object) => Some(Type::Named(object.borrow().ty)),
        }
    }

    /// Nearest field or property called `name`, starting at `ty`
    pub(crate) fn find_value_member(&self, ty: TypeRef, name: &str, from: Option<TypeRef>) -> Result<MemberKey> {
        for ty in std::iter::once(ty).chain(self.ctx.asg.ancestors(ty)) {
            let found = self.ctx.members(ty)?.named(name).find(|(key, member)| {
                !member.is_static()
                    && (member.kind.is_field() || member.kind.is_property())
                    && self.ctx.asg.can_access(from, key.owner, member.privacy)
            });

            if let Some((key, _)) = found {
                return Ok(key);
            }
        }

        Err(InterpretError::UnknownMember {
            ty: self.ctx.asg.types[ty].name.clone(),
            name: name.into(),
        })
    }

    /// Overload resolution over the methods called `name` visible from `ty`.
    /// Unknown argument types are compatible with every parameter.
    pub(crate) fn select_method(
        &self,
        ty: TypeRef,
        from: Option<TypeRef>,
        name: &str,
        arg_types: &[Option<Type>],
    ) -> Result<MemberKey> {
        for level in std::iter::once(ty).chain(self.ctx.asg.ancestors(ty)) {
            let candidates = self
                .ctx
                .members(level)?
                .named(name)
                .filter(|(_, member)| member.kind.is_method() && member.arity() == arg_types.len())
                .filter(|(key, member)| self.ctx.asg.can_access(from, key.owner, member.privacy))
                .collect_vec();

            if let Some(best) = self.most_specific(&candidates, arg_types) {
                return Ok(best);
            }
        }

        Err(InterpretError::UnknownMember {
            ty: self.ctx.asg.types[ty].name.clone(),
            name: name.into(),
        })
    }

    pub(crate) fn select_constructor(
        &self,
        ty: TypeRef,
        from: Option<TypeRef>,
        arg_types: &[Option<Type>],
    ) -> Result<MemberKey> {
        let candidates = self
            .ctx
            .members(ty)?
            .constructors()
            .filter(|(_, member)| member.arity() == arg_types.len())
            .filter(|(key, member)| self.ctx.asg.can_access(from, key.owner, member.privacy))
            .collect_vec();

        self.most_specific(&candidates, arg_types)
            .ok_or_else(|| InterpretError::NoConstructor {
                ty: self.ctx.asg.types[ty].name.clone(),
                arity: arg_types.len(),
            })
    }

    fn most_specific(&self, candidates: &[(MemberKey, &Member)], arg_types: &[Option<Type>]) -> Option<MemberKey> {
        let asg = self.ctx.asg;

        let applicable = candidates
            .iter()
            .filter(|(_, member)| {
                member
                    .param_types()
                    .zip(arg_types)
                    .all(|(param, arg)| arg.as_ref().is_none_or(|arg| asg.is_assignable(arg, param)))
            })
            .collect_vec();

        let at_least_as_specific = |left: &Member, right: &Member| {
            left.param_types()
                .zip(right.param_types())
                .all(|(left, right)| asg.is_assignable(left, right))
        };

        applicable
            .iter()
            .find(|(_, candidate)| {
                applicable
                    .iter()
                    .all(|(_, other)| at_least_as_specific(*candidate, *other))
            })
            .or(applicable.first())
            .map(|(key, _)| *key)
    }
}
