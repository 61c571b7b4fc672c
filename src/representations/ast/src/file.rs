use super::{AttributeClass, TypeDecl};
use derive_more::IsVariant;

#[derive(Clone, Debug, Default)]
pub struct AstFile {
    pub types: Vec<TypeDecl>,
    pub attribute_classes: Vec<AttributeClass>,
    pub runtime: RuntimeSupport,
}

impl AstFile {
    pub fn new(types: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self {
            types: types.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_attribute_class(mut self, attribute_class: AttributeClass) -> Self {
        self.attribute_classes.push(attribute_class);
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeSupport) -> Self {
        self.runtime = runtime;
        self
    }
}

/// Primitives the runtime support layer provides to synthesized members
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeSupport {
    pub structural_comparer: bool,
    pub hash_combiner: bool,
    pub string_builder: bool,
    pub type_token: bool,
}

impl RuntimeSupport {
    pub fn has(&self, kind: RuntimeSupportKind) -> bool {
        match kind {
            RuntimeSupportKind::StructuralComparer => self.structural_comparer,
            RuntimeSupportKind::HashCombiner => self.hash_combiner,
            RuntimeSupportKind::StringBuilder => self.string_builder,
            RuntimeSupportKind::TypeToken => self.type_token,
        }
    }

    pub fn without(mut self, kind: RuntimeSupportKind) -> Self {
        match kind {
            RuntimeSupportKind::StructuralComparer => self.structural_comparer = false,
            RuntimeSupportKind::HashCombiner => self.hash_combiner = false,
            RuntimeSupportKind::StringBuilder => self.string_builder = false,
            RuntimeSupportKind::TypeToken => self.type_token = false,
        }
        self
    }
}

impl Default for RuntimeSupport {
    fn default() -> Self {
        Self {
            structural_comparer: true,
            hash_combiner: true,
            string_builder: true,
            type_token: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IsVariant)]
pub enum RuntimeSupportKind {
    StructuralComparer,
    HashCombiner,
    StringBuilder,
    TypeToken,
}

impl std::fmt::Display for RuntimeSupportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RuntimeSupportKind::StructuralComparer => "EqualityComparer<T>",
            RuntimeSupportKind::HashCombiner => "HashCode.Combine",
            RuntimeSupportKind::StringBuilder => "StringBuilder",
            RuntimeSupportKind::TypeToken => "Type",
        })
    }
}
