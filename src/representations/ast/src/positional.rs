use super::{Annotation, Expr, TypeName};
use source_files::Source;

/// One entry of a record's primary parameter list
#[derive(Clone, Debug)]
pub struct PositionalParam {
    pub name: String,
    pub ty: TypeName,
    pub default: Option<Expr>,
    pub attributes: Vec<Annotation>,
    pub source: Source,
}

impl PositionalParam {
    pub fn new(name: impl Into<String>, ty: TypeName) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            attributes: vec![],
            source: Source::internal(),
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_attribute(mut self, annotation: Annotation) -> Self {
        self.attributes.push(annotation);
        self
    }

    pub fn at(self, source: Source) -> Self {
        Self { source, ..self }
    }
}
