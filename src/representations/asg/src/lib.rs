mod body;
mod category;
mod datatype;
mod member;
mod slot;
mod table;
mod type_symbol;

pub use ast::{Modifiers, Origin, RuntimeSupport, RuntimeSupportKind};
use attributes::{Privacy, TargetSet};
pub use body::*;
pub use category::ErrorCategory;
pub use datatype::*;
use indexmap::IndexMap;
pub use member::*;
pub use slot::*;
use slotmap::{SlotMap, new_key_type};
use source_files::{Source, SourceFiles};
pub use table::*;
pub use type_symbol::*;

new_key_type! {
    pub struct TypeRef;
}

#[derive(Clone, Debug)]
pub struct Asg<'a> {
    pub source_files: &'a SourceFiles,
    pub types: SlotMap<TypeRef, TypeSymbol>,
    pub names: IndexMap<String, TypeRef>,
    pub object: TypeRef,
    pub runtime: RuntimeSupport,
    pub attribute_classes: IndexMap<String, TargetSet>,
}

impl<'a> Asg<'a> {
    pub const MAX_CHAIN_DEPTH: usize = 1024;

    pub fn new(source_files: &'a SourceFiles, runtime: RuntimeSupport) -> Self {
        let mut types = SlotMap::with_key();
        let object = types.insert_with_key(TypeSymbol::object);

        let mut names = IndexMap::new();
        names.insert("object".into(), object);

        Self {
            source_files,
            types,
            names,
            object,
            runtime,
            attribute_classes: IndexMap::new(),
        }
    }

    pub fn object_type(&self) -> Type {
        Type::Named(self.object)
    }

    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.names.get(name).copied()
    }

    /// Strict ancestors of `ty`, nearest first, ending at `object`
    pub fn ancestors(&self, ty: TypeRef) -> impl Iterator<Item = TypeRef> + '_ {
        let mut next = self.types[ty].base;
        let mut depth = 0;

        std::iter::from_fn(move || {
            let current = next?;

            depth += 1;
            if depth > Self::MAX_CHAIN_DEPTH || self.types[current].in_cycle {
                return None;
            }

            next = self.types[current].base;
            Some(current)
        })
    }

    /// Nearest ancestor that is itself a record
    pub fn base_record(&self, ty: TypeRef) -> Option<TypeRef> {
        self.types[ty]
            .base
            .filter(|base| self.types[*base].kind.is_record())
    }

    pub fn is_same_or_derived(&self, derived: TypeRef, base: TypeRef) -> bool {
        derived == base || self.ancestors(derived).any(|ancestor| ancestor == base)
    }

    /// Whether a value of static type `from` can be used where `to` is expected
    pub fn is_assignable(&self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Named(from), Type::Named(to)) => self.is_same_or_derived(*from, *to),
            (Type::Null, Type::Named(_) | Type::String | Type::StringBuilder | Type::TypeToken) => {
                true
            }
            (Type::Param(param), Type::Named(to)) => {
                *to == self.object
                    || param
                        .bound
                        .is_some_and(|bound| self.is_same_or_derived(bound, *to))
            }
            (_, Type::Named(to)) if *to == self.object => !from.is_void(),
            _ => from == to,
        }
    }

    /// Whether code inside `from` sees a member of `owner` with `privacy`
    pub fn can_access(&self, from: Option<TypeRef>, owner: TypeRef, privacy: Privacy) -> bool {
        match privacy {
            Privacy::Public => true,
            Privacy::Protected => from.is_some_and(|from| self.is_same_or_derived(from, owner)),
            Privacy::Private => from == Some(owner),
        }
    }

    pub fn type_name(&self, ty: &Type) -> String {
        match ty {
            Type::Named(type_ref) => self.types[*type_ref].name.clone(),
            Type::Param(param) => param.name.clone(),
            _ => ty.to_string(),
        }
    }

    pub fn source_of(&self, ty: TypeRef) -> Source {
        self.types[ty].source
    }
}
