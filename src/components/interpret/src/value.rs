use crate::InterpretError;
use asg::{MemberKey, TypeRef};
use by_address::ByAddress;
use derive_more::IsVariant;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

pub type ObjectRef = ByAddress<Rc<RefCell<Instance>>>;
pub type BuilderRef = ByAddress<Rc<RefCell<String>>>;

/// Runtime values. Objects and builders compare by identity.
#[derive(Clone, Debug, PartialEq, IsVariant)]
pub enum Value {
    Null,
    Int(i32),
    Bool(bool),
    Str(String),
    TypeToken(TypeRef),
    Object(ObjectRef),
    Builder(BuilderRef),
}

#[derive(Debug)]
pub struct Instance {
    pub ty: TypeRef,
    /// Allocation order, used as the identity hash
    pub id: usize,
    pub state: HashMap<MemberKey, Value>,
}

impl Value {
    pub fn object(ty: TypeRef, id: usize) -> Self {
        Self::Object(ByAddress(Rc::new(RefCell::new(Instance {
            ty,
            id,
            state: HashMap::new(),
        }))))
    }

    pub fn builder() -> Self {
        Self::Builder(ByAddress(Rc::new(RefCell::new(String::new()))))
    }

    pub fn as_bool(&self) -> Result<bool, InterpretError> {
        match self {
            Value::Bool(value) => Ok(*value),
            _ => Err(InterpretError::TypeError("expected a bool")),
        }
    }

    pub fn as_int(&self) -> Result<i32, InterpretError> {
        match self {
            Value::Int(value) => Ok(*value),
            _ => Err(InterpretError::TypeError("expected an int")),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectRef, InterpretError> {
        match self {
            Value::Object(object) => Ok(object),
            Value::Null => Err(InterpretError::NullReference),
            _ => Err(InterpretError::TypeError("expected an object")),
        }
    }

    pub fn as_builder(&self) -> Result<&BuilderRef, InterpretError> {
        match self {
            Value::Builder(builder) => Ok(builder),
            Value::Null => Err(InterpretError::NullReference),
            _ => Err(InterpretError::TypeError("expected a StringBuilder")),
        }
    }

    /// Runtime type of an object
    pub fn runtime_type(&self) -> Option<TypeRef> {
        match self {
            Value::Object(object) => Some(object.borrow().ty),
            _ => None,
        }
    }

    pub fn is_same_reference(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(left), Value::Object(right)) => left == right,
            (Value::Builder(left), Value::Builder(right)) => left == right,
            _ => false,
        }
    }
}

/// 32-bit FNV-1a, so hashes are stable between runs
pub fn stable_hash(text: &str) -> i32 {
    let hash = text.bytes().fold(0x811c9dc5u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x01000193)
    });

    hash as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash() {
        assert_eq!(stable_hash(""), 0x811c9dc5u32 as i32);
        assert_eq!(stable_hash("a"), stable_hash("a"));
        assert_ne!(stable_hash("a"), stable_hash("b"));
    }

    #[test]
    fn test_builders_compare_by_identity() {
        let builder = Value::builder();

        assert!(builder.is_same_reference(&builder.clone()));
        assert!(!builder.is_same_reference(&Value::builder()));
        assert!(Value::Null.is_same_reference(&Value::Null));
    }
}
