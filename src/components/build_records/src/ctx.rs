use crate::{error::RecordErrorKind, link, positional, slots, validate};
use asg::{Asg, Member, MemberKey, MemberTable, TableStatus, Type, TypeRef};
use compiler::{BuildOptions, CancellationToken, Cancelled};
use diagnostics::Diagnostics;
use itertools::Itertools;
use once_map::sync::OnceMap;
use source_files::Source;

/// Per-compilation state for record member resolution.
/// Member tables are computed on first request and never change afterward.
pub struct RecordCtx<'a> {
    pub asg: &'a Asg<'a>,
    pub diagnostics: &'a Diagnostics<'a>,
    pub options: &'a BuildOptions,
    pub cancellation: CancellationToken,
    cache: OnceMap<TypeRef, Box<MemberTable>>,
}

impl<'a> RecordCtx<'a> {
    pub fn new(asg: &'a Asg<'a>, diagnostics: &'a Diagnostics<'a>, options: &'a BuildOptions) -> Self {
        Self {
            asg,
            diagnostics,
            options,
            cancellation: CancellationToken::new(),
            cache: OnceMap::new(),
        }
    }

    pub fn with_cancellation(self, cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            ..self
        }
    }

    /// Member table of `ty`, resolving its base chain first
    pub fn members(&self, ty: TypeRef) -> Result<&MemberTable, Cancelled> {
        if let Some(table) = self.cache.get(&ty) {
            return Ok(table);
        }

        let symbol = &self.asg.types[ty];

        if !symbol.in_cycle {
            if let Some(base) = symbol.base {
                self.members(base)?;
            }
        }

        self.cache
            .try_insert(ty, |ty| self.compute(*ty).map(Box::new))
    }

    /// Table of `ty` if it has already been published
    pub fn published(&self, ty: TypeRef) -> Option<&MemberTable> {
        self.cache.get(&ty)
    }

    pub fn member(&self, key: MemberKey) -> Result<&Member, Cancelled> {
        Ok(self.members(key.owner)?.get(key.index))
    }

    pub fn error(&self, kind: RecordErrorKind, source: Source) {
        self.diagnostics.push(kind.at(source));
    }

    /// Visible members of the nearest ancestor that has any member accepted
    /// by `accept`. A settled slot of that ancestor takes precedence.
    pub fn find_inherited(
        &self,
        ty: TypeRef,
        slot: Option<asg::SlotKind>,
        accept: impl Fn(&Member) -> bool,
    ) -> Result<Vec<MemberKey>, Cancelled> {
        for ancestor in self.asg.ancestors(ty) {
            let table = self.members(ancestor)?;

            if let Some(member) = slot.and_then(|slot| table.slot_member(slot)) {
                return Ok(vec![member]);
            }

            let found = table
                .iter()
                .filter(|(_, member)| !member.privacy.is_private() && accept(member))
                .map(|(key, _)| key)
                .collect_vec();

            if !found.is_empty() {
                return Ok(found);
            }
        }

        Ok(vec![])
    }

    /// Human readable path such as `Point.Equals(Point)`
    pub fn member_path(&self, owner: TypeRef, member: &Member) -> String {
        let owner_name = &self.asg.types[owner].name;

        let params = || {
            member
                .param_types()
                .map(|ty| self.asg.type_name(ty))
                .join(", ")
        };

        if member.is_constructor() {
            format!("{}.{}({})", owner_name, owner_name, params())
        } else if member.kind.is_method() {
            format!("{}.{}({})", owner_name, member.name, params())
        } else {
            format!("{}.{}", owner_name, member.name)
        }
    }

    pub fn type_name(&self, ty: &Type) -> String {
        self.asg.type_name(ty)
    }

    #[tracing::instrument(skip(self), fields(name = %self.asg.types[ty].name))]
    fn compute(&self, ty: TypeRef) -> Result<MemberTable, Cancelled> {
        self.cancellation.check()?;

        let symbol = &self.asg.types[ty];
        let mut table = MemberTable::new(ty, symbol.declared.clone());

        if symbol.in_cycle {
            table.status = TableStatus::Broken;
            return Ok(table);
        }

        let is_source = symbol.origin.is_source();

        if is_source {
            if symbol.is_record() {
                positional::process(self, &mut table)?;
            }

            positional::add_default_constructor(self, &mut table)?;
        } else if symbol.is_record() {
            positional::bind_metadata(self, &mut table)?;
        }

        link::link_overrides(self, &mut table)?;

        if is_source {
            link::chain_constructors(self, &mut table)?;
        }

        if is_source && symbol.is_record() {
            slots::resolve_slots(self, &mut table)?;
            validate::validate(self, &table)?;
        }

        tracing::trace!(members = table.members.len(), "published");
        Ok(table)
    }
}
