use std::fmt::Display;

/// A type as written in a declaration, before names are bound
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeName {
    Void,
    Bool,
    Int,
    String,
    Object,
    TypeToken,
    StringBuilder,
    Named(String),
    Param(TypeParamName),
}

impl TypeName {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamName {
    pub name: String,
    /// A `where T : SomeRecord` style constraint
    pub bound: Option<String>,
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Void => f.write_str("void"),
            TypeName::Bool => f.write_str("bool"),
            TypeName::Int => f.write_str("int"),
            TypeName::String => f.write_str("string"),
            TypeName::Object => f.write_str("object"),
            TypeName::TypeToken => f.write_str("Type"),
            TypeName::StringBuilder => f.write_str("StringBuilder"),
            TypeName::Named(name) => f.write_str(name),
            TypeName::Param(param) => f.write_str(&param.name),
        }
    }
}
