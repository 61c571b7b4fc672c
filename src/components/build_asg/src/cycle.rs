use crate::error::DeclareErrorKind;
use asg::{Asg, TypeRef};
use diagnostics::Diagnostics;
use indexmap::IndexSet;
use itertools::Itertools;
use std::collections::HashSet;

/// Flags every type whose base chain loops, reporting each loop once
pub fn mark_cycles(asg: &mut Asg, diagnostics: &Diagnostics) {
    let mut settled = HashSet::<TypeRef>::new();
    let order = asg.types.keys().collect_vec();

    for start in order {
        let mut path = IndexSet::<TypeRef>::new();
        let mut current = Some(start);
        let mut broken = false;

        while let Some(ty) = current {
            if settled.contains(&ty) {
                broken = asg.types[ty].in_cycle;
                break;
            }

            if !path.insert(ty) {
                if let Some(begin) = path.get_index_of(&ty) {
                    report_cycle(asg, &path, begin, diagnostics);
                }

                broken = true;
                break;
            }

            current = asg.types[ty].base;
        }

        if broken {
            for ty in path.iter() {
                asg.types[*ty].in_cycle = true;
            }
        }

        settled.extend(path);
    }
}

fn report_cycle(asg: &Asg, path: &IndexSet<TypeRef>, begin: usize, diagnostics: &Diagnostics) {
    let members = path.iter().skip(begin).copied().collect_vec();
    let Some(first) = members.first().copied() else {
        return;
    };

    tracing::debug!(len = members.len(), "base cycle");

    let cycle = members
        .iter()
        .chain(std::iter::once(&first))
        .map(|ty| asg.types[*ty].name.clone())
        .collect_vec();

    diagnostics.push(DeclareErrorKind::CyclicBase { cycle }.at(asg.types[first].source));
}
