use super::TypeRef;
use derive_more::IsVariant;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum Type {
    Void,
    Bool,
    Int,
    String,
    TypeToken,
    StringBuilder,
    /// Type of the `null` literal, assignable to any reference type
    Null,
    Named(TypeRef),
    Param(TypeParam),
    /// Placeholder for a name that failed to bind
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<TypeRef>,
}

impl Type {
    pub fn as_named(&self) -> Option<TypeRef> {
        match self {
            Type::Named(type_ref) => Some(*type_ref),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::String | Type::TypeToken | Type::StringBuilder | Type::Named(_) | Type::Param(_)
        )
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::String => f.write_str("string"),
            Type::TypeToken => f.write_str("Type"),
            Type::StringBuilder => f.write_str("StringBuilder"),
            Type::Null => f.write_str("null"),
            Type::Named(_) => f.write_str("<named>"),
            Type::Param(param) => f.write_str(&param.name),
            Type::Error => f.write_str("<error>"),
        }
    }
}
