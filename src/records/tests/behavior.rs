mod common;

use asg::SlotKind;
use ast::{AstFile, BinaryOperator, Expr, MemberInit, PositionalParam, TypeDecl, TypeName};
use common::{a_and_b, compile, new_b};
use compiler::BuildOptions;
use pretty_assertions::assert_eq;
use records::Value;

#[test]
fn test_scenario_equality() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, codes| {
        assert!(codes.is_empty(), "{:?}", codes);
        let interpreter = compilation.interpreter();

        let cases = [
            (new_b(1).call("Equals", [new_b(1)]), true),
            (new_b(1).call("Equals", [new_b(2)]), false),
            (new_b(1).cast("A").call("Equals", [new_b(1)]), true),
            (new_b(1).cast("object").call("Equals", [new_b(1)]), true),
            (Expr::new_object("A", []).call("Equals", [new_b(1)]), false),
        ];

        for (expr, expected) in cases {
            assert_eq!(interpreter.eval(&expr), Ok(Value::Bool(expected)), "{:?}", expr);
        }
    });
}

#[test]
fn test_comparisons_with_null() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();
        let b = interpreter.construct("B", vec![Value::Int(1)]).unwrap();

        assert_eq!(interpreter.call(&b, "Equals", vec![Value::Null]), Ok(Value::Bool(false)));
        assert_eq!(
            interpreter.operator("B", SlotKind::OperatorEquals, Value::Null, Value::Null),
            Ok(true)
        );
        assert_eq!(
            interpreter.operator("B", SlotKind::OperatorEquals, Value::Null, b.clone()),
            Ok(false)
        );
        assert_eq!(
            interpreter.operator("B", SlotKind::OperatorNotEquals, b, Value::Null),
            Ok(true)
        );
    });
}

#[test]
fn test_scenario_to_string() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();

        let a = interpreter.eval(&Expr::new_object("A", []).call("ToString", []));
        let b = interpreter.eval(&new_b(1).call("ToString", []));

        assert_eq!(a, Ok(Value::Str("A {  }".into())));
        assert_eq!(b, Ok(Value::Str("B { I = 1 }".into())));
    });
}

#[test]
fn test_to_string_is_idempotent() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();
        let b = interpreter.construct("B", vec![Value::Int(7)]).unwrap();

        let first = interpreter.to_text(&b).unwrap();
        let second = interpreter.to_text(&b).unwrap();

        assert_eq!(first, second);
    });
}

#[test]
fn test_equal_instances_have_equal_hashes() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();
        let left = interpreter.construct("B", vec![Value::Int(4)]).unwrap();
        let right = interpreter.construct("B", vec![Value::Int(4)]).unwrap();

        assert_eq!(interpreter.equals(&left, &left), Ok(true));
        assert_eq!(interpreter.equals(&left, &right), Ok(true));
        assert_eq!(interpreter.hash(&left), interpreter.hash(&right));
    });
}

#[test]
fn test_different_runtime_types_are_never_equal() {
    let file = AstFile::new([
        TypeDecl::record("A").with_params([PositionalParam::new("I", TypeName::Int)]),
        TypeDecl::record("B")
            .inherits_with("A", [Expr::name("I")])
            .with_params([PositionalParam::new("I", TypeName::Int)]),
    ]);

    compile(file, BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();
        let a = interpreter.construct("A", vec![Value::Int(1)]).unwrap();
        let b = interpreter.construct("B", vec![Value::Int(1)]).unwrap();

        assert_eq!(interpreter.equals(&a, &b), Ok(false));
        assert_eq!(interpreter.equals(&b, &a), Ok(false));
    });
}

#[test]
fn test_with_copy_is_equal_but_not_identical() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();

        let equal = new_b(1).with([]).call("Equals", [new_b(1)]);
        let identical = Expr::binary(
            BinaryOperator::Equals,
            new_b(1).with([]).cast("object"),
            new_b(1).cast("object"),
        );
        let changed = interpreter
            .eval(&new_b(1).with([MemberInit::new("I", Expr::int(9))]))
            .unwrap();

        assert_eq!(interpreter.eval(&equal), Ok(Value::Bool(true)));
        assert_eq!(interpreter.eval(&identical), Ok(Value::Bool(false)));
        assert_eq!(interpreter.get(&changed, "I"), Ok(Value::Int(9)));
    });
}

#[test]
fn test_deconstruct_yields_constructor_arguments() {
    let file = AstFile::new([TypeDecl::record("P").with_params([
        PositionalParam::new("X", TypeName::Int),
        PositionalParam::new("Name", TypeName::String),
    ])]);

    compile(file, BuildOptions::default(), |compilation, codes| {
        assert!(codes.is_empty(), "{:?}", codes);

        let interpreter = compilation.interpreter();
        let p = interpreter
            .construct("P", vec![Value::Int(3), Value::Str("three".into())])
            .unwrap();

        assert_eq!(
            interpreter.deconstruct(&p),
            Ok(vec![Value::Int(3), Value::Str("three".into())])
        );
        assert_eq!(interpreter.to_text(&p).unwrap(), "P { X = 3, Name = three }");
    });
}

#[test]
fn test_equality_operators() {
    compile(AstFile::new(a_and_b()), BuildOptions::default(), |compilation, _| {
        let interpreter = compilation.interpreter();

        let equals = Expr::binary(BinaryOperator::Equals, new_b(2), new_b(2));
        let not_equals = Expr::binary(BinaryOperator::NotEquals, new_b(2), new_b(3));

        assert_eq!(interpreter.eval(&equals), Ok(Value::Bool(true)));
        assert_eq!(interpreter.eval(&not_equals), Ok(Value::Bool(true)));
    });
}
