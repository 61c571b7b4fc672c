use attributes::TargetSet;
use source_files::Source;

/// An attribute written on a declaration, e.g. `[property: JsonName]`
#[derive(Clone, Debug)]
pub struct Annotation {
    pub name: String,
    /// Routing keyword written before the colon, if any
    pub target: Option<String>,
    pub source: Source,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            source: Source::internal(),
        }
    }

    pub fn targeted(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Some(target.into()),
            source: Source::internal(),
        }
    }

    pub fn at(self, source: Source) -> Self {
        Self { source, ..self }
    }
}

/// Declaration of an attribute class and where it may be applied
#[derive(Clone, Debug)]
pub struct AttributeClass {
    pub name: String,
    pub valid_on: TargetSet,
}

impl AttributeClass {
    pub fn new(name: impl Into<String>, valid_on: TargetSet) -> Self {
        Self {
            name: name.into(),
            valid_on,
        }
    }
}
