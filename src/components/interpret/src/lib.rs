mod dispatch;
mod error;
mod eval;
mod exec;
mod value;

use asg::{Param, SlotKind, TypeRef};
use build_records::RecordCtx;
pub use error::InterpretError;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};
pub use value::{BuilderRef, Instance, ObjectRef, Value, stable_hash};

pub(crate) type Result<T> = std::result::Result<T, InterpretError>;

/// Activation record of one member body
pub(crate) struct Frame<'p> {
    pub this: Option<ObjectRef>,
    /// Type declaring the running member, which decides accessibility
    pub this_type: Option<TypeRef>,
    pub args: Vec<Value>,
    pub params: &'p [Param],
    pub locals: Vec<Value>,
}

impl<'p> Frame<'p> {
    pub fn top_level() -> Self {
        Self {
            this: None,
            this_type: None,
            args: vec![],
            params: &[],
            locals: vec![],
        }
    }
}

/// Executes synthesized and user-written member bodies over published
/// member tables
pub struct Interpreter<'c, 'a> {
    ctx: &'c RecordCtx<'a>,
    max_steps_left: Cell<Option<u64>>,
    depth: Cell<usize>,
    next_id: Cell<usize>,
    dispatch_cache: RefCell<HashMap<(TypeRef, asg::MemberKey), asg::MemberKey>>,
}

impl<'c, 'a> Interpreter<'c, 'a> {
    pub const MAX_CALL_DEPTH: usize = 512;

    pub fn new(ctx: &'c RecordCtx<'a>, max_steps_left: Option<u64>) -> Self {
        Self {
            ctx,
            max_steps_left: Cell::new(max_steps_left),
            depth: Cell::new(0),
            next_id: Cell::new(0),
            dispatch_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Evaluates an expression outside of any type
    pub fn eval(&self, expr: &ast::Expr) -> Result<Value> {
        self.eval_ast(expr, &Frame::top_level())
    }

    /// `new T(args)` with the constructor chosen by the runtime argument types
    pub fn construct(&self, type_name: &str, args: Vec<Value>) -> Result<Value> {
        let ty = self.lookup_type(type_name)?;
        let arg_types = args.iter().map(|arg| self.value_type(arg)).collect::<Vec<_>>();
        let ctor = self.select_constructor(ty, None, &arg_types)?;

        self.new_object(ctor, args)
    }

    /// Calls the instance method `name` on `receiver` with virtual dispatch
    pub fn call(&self, receiver: &Value, name: &str, args: Vec<Value>) -> Result<Value> {
        let object = receiver.as_object()?;
        let ty = object.borrow().ty;
        let arg_types = args.iter().map(|arg| self.value_type(arg)).collect::<Vec<_>>();
        let method = self.select_method(ty, None, name, &arg_types)?;

        self.call_virtual(receiver, method, args)
    }

    /// Reads the field or property `name`
    pub fn get(&self, receiver: &Value, name: &str) -> Result<Value> {
        let object = receiver.as_object()?;
        let ty = object.borrow().ty;
        let key = self.find_value_member(ty, name, None)?;

        self.read(object, key, asg::Dispatch::Virtual)
    }

    pub fn to_text(&self, value: &Value) -> Result<String> {
        self.text_of(value)
    }

    /// `left.Equals((object)right)`
    pub fn equals(&self, left: &Value, right: &Value) -> Result<bool> {
        self.structural_equals(left, right)
    }

    pub fn hash(&self, value: &Value) -> Result<i32> {
        self.structural_hash(value)
    }

    /// Values assigned to the `out` parameters of `Deconstruct`
    pub fn deconstruct(&self, value: &Value) -> Result<Vec<Value>> {
        let object = value.as_object()?;
        let ty = object.borrow().ty;
        let ty_name = self.ctx.asg.types[ty].name.clone();

        let method = std::iter::once(ty)
            .chain(self.ctx.asg.ancestors(ty))
            .find_map(|ty| {
                self.ctx
                    .published(ty)
                    .and_then(|table| table.slot_member(SlotKind::Deconstruct))
            })
            .ok_or(InterpretError::UnknownMember {
                ty: ty_name,
                name: SlotKind::Deconstruct.member_name().into(),
            })?;

        let arity = self.ctx.member(method)?.arity();
        let mut frame = self.frame_for(method, Some(object.clone()), vec![Value::Null; arity])?;

        self.invoke(method, &mut frame)?;
        Ok(frame.args)
    }

    /// Applies the static `op_Equality` or `op_Inequality` declared on `type_name`
    pub fn operator(&self, type_name: &str, slot: SlotKind, left: Value, right: Value) -> Result<bool> {
        let ty = self.lookup_type(type_name)?;

        let method = self
            .ctx
            .members(ty)?
            .slot_member(slot)
            .ok_or(InterpretError::UnknownMember {
                ty: type_name.into(),
                name: slot.member_name().into(),
            })?;

        self.call_static(method, vec![left, right])?.as_bool()
    }

    fn lookup_type(&self, name: &str) -> Result<TypeRef> {
        self.ctx
            .asg
            .lookup(name)
            .ok_or_else(|| InterpretError::UnknownType(name.into()))
    }

    fn step(&self) -> Result<()> {
        match self.max_steps_left.get() {
            Some(0) => Err(InterpretError::TimedOut),
            Some(steps) => {
                self.max_steps_left.set(Some(steps - 1));
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn allocate(&self, ty: TypeRef) -> Value {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Value::object(ty, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{
        AccessorDecl, AstFile, BinaryOperator, Expr, MemberDecl, MemberInit, ParamDecl,
        PositionalParam, TypeDecl, TypeName,
    };
    use build_records::build_records;
    use compiler::BuildOptions;
    use diagnostics::{DiagnosticFlags, Diagnostics};
    use pretty_assertions::assert_eq;
    use source_files::SourceFiles;

    fn run(types: Vec<TypeDecl>, max_steps: Option<u64>, f: impl FnOnce(&Interpreter)) {
        let file = AstFile::new(types);
        let source_files = SourceFiles::new();
        let diagnostics = Diagnostics::new(&source_files, DiagnosticFlags::collecting());
        let asg = build_asg::build_asg(&file, &source_files, &diagnostics);
        let options = BuildOptions::single_threaded();
        let ctx = RecordCtx::new(&asg, &diagnostics, &options);

        build_records(&ctx).unwrap();
        assert_eq!(diagnostics.codes(), Vec::<&str>::new());

        f(&Interpreter::new(&ctx, max_steps));
    }

    fn a_and_b() -> Vec<TypeDecl> {
        vec![
            TypeDecl::record("A"),
            TypeDecl::record("B")
                .inherits("A")
                .with_params([PositionalParam::new("I", TypeName::Int)])
                .with_member(
                    MemberDecl::method("IsSelf", [], TypeName::Bool)
                        .public()
                        .with_body(Expr::binary(
                            BinaryOperator::Equals,
                            Expr::this().with([]).cast("object"),
                            Expr::this().cast("object"),
                        )),
                ),
        ]
    }

    fn new_b(value: i64) -> Expr {
        Expr::new_object("B", [Expr::int(value)])
    }

    #[test]
    fn test_positional_equality() {
        run(a_and_b(), None, |interpreter| {
            let equal = new_b(1).call("Equals", [new_b(1)]);
            let unequal = new_b(1).call("Equals", [new_b(2)]);

            assert_eq!(interpreter.eval(&equal), Ok(Value::Bool(true)));
            assert_eq!(interpreter.eval(&unequal), Ok(Value::Bool(false)));
        });
    }

    #[test]
    fn test_equality_through_base_reference() {
        run(a_and_b(), None, |interpreter| {
            let equal = new_b(1).cast("A").call("Equals", [new_b(1)]);
            let unequal = new_b(1).cast("A").call("Equals", [new_b(2)]);

            assert_eq!(interpreter.eval(&equal), Ok(Value::Bool(true)));
            assert_eq!(interpreter.eval(&unequal), Ok(Value::Bool(false)));
        });
    }

    #[test]
    fn test_to_string() {
        run(a_and_b(), None, |interpreter| {
            let a = interpreter.construct("A", vec![]).unwrap();
            let b = interpreter.construct("B", vec![Value::Int(1)]).unwrap();

            assert_eq!(interpreter.to_text(&a).unwrap(), "A {  }");
            assert_eq!(interpreter.to_text(&b).unwrap(), "B { I = 1 }");
        });
    }

    #[test]
    fn test_with_makes_an_equal_copy() {
        run(a_and_b(), None, |interpreter| {
            let changed = interpreter
                .eval(&new_b(1).with([MemberInit::new("I", Expr::int(2))]))
                .unwrap();
            let copy = new_b(1).with([]).call("Equals", [new_b(1)]);
            let is_self = new_b(1).call("IsSelf", []);

            assert_eq!(interpreter.get(&changed, "I"), Ok(Value::Int(2)));
            assert_eq!(interpreter.eval(&copy), Ok(Value::Bool(true)));
            assert_eq!(interpreter.eval(&is_self), Ok(Value::Bool(false)));
        });
    }

    #[test]
    fn test_hash_and_operators() {
        run(a_and_b(), None, |interpreter| {
            let one = interpreter.construct("B", vec![Value::Int(1)]).unwrap();
            let other_one = interpreter.construct("B", vec![Value::Int(1)]).unwrap();
            let two = interpreter.construct("B", vec![Value::Int(2)]).unwrap();

            assert_eq!(interpreter.hash(&one), interpreter.hash(&other_one));
            assert_ne!(interpreter.hash(&one), interpreter.hash(&two));

            let equals = interpreter.operator("B", SlotKind::OperatorEquals, one.clone(), other_one);
            let not_equals = interpreter.operator("B", SlotKind::OperatorNotEquals, one, two);

            assert_eq!(equals, Ok(true));
            assert_eq!(not_equals, Ok(true));
            assert_eq!(
                interpreter.eval(&Expr::binary(BinaryOperator::Equals, new_b(3), new_b(3))),
                Ok(Value::Bool(true))
            );
        });
    }

    #[test]
    fn test_deconstruct() {
        run(a_and_b(), None, |interpreter| {
            let b = interpreter.construct("B", vec![Value::Int(5)]).unwrap();
            assert_eq!(interpreter.deconstruct(&b), Ok(vec![Value::Int(5)]));
        });
    }

    #[test]
    fn test_user_constructor_assignments() {
        let point = TypeDecl::record("P")
            .with_member(
                MemberDecl::property("X", TypeName::Int)
                    .public()
                    .with_accessors(Some(AccessorDecl::get()), Some(AccessorDecl::init())),
            )
            .with_member(
                MemberDecl::constructor("P", [ParamDecl::new("x", TypeName::Int)])
                    .public()
                    .with_assignment(MemberInit::new("X", Expr::name("x"))),
            );

        run(vec![point], None, |interpreter| {
            let p = interpreter.construct("P", vec![Value::Int(3)]).unwrap();

            assert_eq!(interpreter.get(&p, "X"), Ok(Value::Int(3)));
            assert_eq!(interpreter.to_text(&p).unwrap(), "P { X = 3 }");
        });
    }

    #[test]
    fn test_step_limit() {
        run(a_and_b(), Some(3), |interpreter| {
            assert_eq!(
                interpreter.construct("B", vec![Value::Int(1)]),
                Err(InterpretError::TimedOut)
            );
        });
    }

    #[test]
    fn test_integer_literal_overflow() {
        run(a_and_b(), None, |interpreter| {
            assert_eq!(
                interpreter.eval(&Expr::int(1 << 40)),
                Err(InterpretError::IntegerOverflow(1 << 40))
            );
        });
    }
}
