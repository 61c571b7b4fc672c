use super::{Expr, MemberDecl, PositionalParam};
use attributes::Privacy;
use derive_more::IsVariant;
use source_files::Source;

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    pub origin: Origin,
    pub privacy: Privacy,
    pub is_sealed: bool,
    pub is_abstract: bool,
    /// `None` when the declaration has no parameter list at all
    pub params: Option<Vec<PositionalParam>>,
    pub base: Option<BaseSpec>,
    pub members: Vec<MemberDecl>,
    pub source: Source,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, IsVariant)]
pub enum TypeDeclKind {
    Record,
    Class,
}

/// Whether a declaration was written in this compilation or imported
/// from a separately compiled module (with every member already present)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, IsVariant)]
pub enum Origin {
    #[default]
    Source,
    Metadata,
}

#[derive(Clone, Debug)]
pub struct BaseSpec {
    pub name: String,
    /// Arguments forwarded to the base constructor, e.g. `: Base(X, 1)`
    pub args: Option<Vec<Expr>>,
    pub source: Source,
}

impl TypeDecl {
    fn new(name: impl Into<String>, kind: TypeDeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            origin: Origin::Source,
            privacy: Privacy::Public,
            is_sealed: false,
            is_abstract: false,
            params: None,
            base: None,
            members: vec![],
            source: Source::internal(),
        }
    }

    pub fn record(name: impl Into<String>) -> Self {
        Self::new(name, TypeDeclKind::Record)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeDeclKind::Class)
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = PositionalParam>) -> Self {
        self.params = Some(params.into_iter().collect());
        self
    }

    pub fn inherits(mut self, name: impl Into<String>) -> Self {
        self.base = Some(BaseSpec {
            name: name.into(),
            args: None,
            source: self.source,
        });
        self
    }

    pub fn inherits_with(mut self, name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        self.base = Some(BaseSpec {
            name: name.into(),
            args: Some(args.into_iter().collect()),
            source: self.source,
        });
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn sealed(self) -> Self {
        Self {
            is_sealed: true,
            ..self
        }
    }

    pub fn r#abstract(self) -> Self {
        Self {
            is_abstract: true,
            ..self
        }
    }

    pub fn from_metadata(self) -> Self {
        Self {
            origin: Origin::Metadata,
            ..self
        }
    }

    pub fn at(self, source: Source) -> Self {
        Self { source, ..self }
    }

    pub fn is_record(&self) -> bool {
        self.kind.is_record()
    }
}
