use crate::{
    RecordCtx,
    error::RecordErrorKind,
    routing::{AttributeRouter, RoutedAttributes},
    typer::{TableLookup, Typer},
};
use asg::{
    Accessor, Body, Constructor, Expr, Member, MemberKey, MemberKind, MemberOrigin, MemberTable,
    MismatchReason, Modifiers, Param, PositionalBinding, PositionalMember, Property, Stmt, TypeRef,
    CONSTRUCTOR_NAME,
};
use ast::AccessorKind;
use attributes::Privacy;
use compiler::Cancelled;
use itertools::Itertools;
use std::collections::HashSet;

enum Binding {
    Synthesized(MemberKey),
    Existing(MemberKey),
    Rejected,
}

/// Produces the positional properties and the primary constructor
#[tracing::instrument(skip_all)]
pub fn process(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let asg = ctx.asg;
    let owner = table.owner;
    let symbol = &asg.types[owner];

    let inherited_deconstruction = match asg.base_record(owner) {
        Some(base) => ctx.members(base)?.deconstruction.clone(),
        None => vec![],
    };

    let Some(params) = &symbol.positional else {
        table.deconstruction = inherited_deconstruction;
        return Ok(());
    };

    let mut seen = HashSet::new();
    let mut seen_optional = false;
    let mut ctor_params = Vec::with_capacity(params.len());
    let mut stores = vec![];

    for (position, param) in params.iter().enumerate() {
        if param.default.is_some() {
            seen_optional = true;
        } else if seen_optional {
            ctx.error(
                RecordErrorKind::RequiredAfterOptional {
                    name: param.name.clone(),
                },
                param.source,
            );
        }

        let binding = if seen.insert(param.name.as_str()) {
            bind_position(ctx, table, param)?
        } else {
            ctx.error(
                RecordErrorKind::DuplicateParameter {
                    name: param.name.clone(),
                },
                param.source,
            );
            Binding::Rejected
        };

        let member = match binding {
            Binding::Synthesized(key) => {
                stores.push(Stmt::Store {
                    object: Expr::This,
                    member: key,
                    value: Expr::Param(position),
                });
                Some(key)
            }
            Binding::Existing(key) => {
                warn_if_unread(ctx, table, param);
                Some(key)
            }
            Binding::Rejected => None,
        };

        let routed = route_attributes(ctx, param, matches!(binding, Binding::Synthesized(_)));

        if let Some(key) = member.filter(|key| key.owner == owner) {
            apply_routed(&mut table.members[key.index], &routed);
        }

        ctor_params.push(Param {
            name: param.name.clone(),
            ty: param.ty.clone(),
            is_out: false,
            default: param.default.clone(),
            attributes: routed.param,
        });

        table.positional.push(PositionalBinding {
            name: param.name.clone(),
            ty: param.ty.clone(),
            ordinal: param.ordinal,
            member,
        });
    }

    let redeclared = params.iter().map(|param| param.name.as_str()).collect::<HashSet<_>>();

    table.deconstruction = inherited_deconstruction
        .into_iter()
        .filter(|binding| !redeclared.contains(binding.name.as_str()))
        .chain(table.positional.iter().cloned())
        .collect();

    let duplicate = table.constructors().find(|(_, member)| {
        member.origin.is_declared() && member.param_types().eq(ctor_params.iter().map(|param| &param.ty))
    });

    if let Some((_, duplicate)) = duplicate {
        ctx.error(
            RecordErrorKind::DuplicatePrimaryConstructor {
                record: symbol.name.clone(),
            },
            duplicate.source,
        );
    }

    let base_args = symbol.base_args.as_deref().unwrap_or_default();
    let base_ctor = resolve_base_constructor(ctx, owner, base_args, &ctor_params)?;

    let mut body = stores;
    body.push(Stmt::RunInitializers(owner));
    body.extend(base_ctor.map(|ctor| Stmt::CallConstructor {
        ctor,
        args: base_args.iter().cloned().map(Expr::User).collect(),
    }));

    let key = table.push(Member {
        name: CONSTRUCTOR_NAME.into(),
        kind: MemberKind::Constructor(Constructor {
            params: ctor_params,
            body: Body::Synthesized(body),
        }),
        privacy: Privacy::Public,
        modifiers: Modifiers::NONE,
        origin: MemberOrigin::PrimaryConstructor,
        attributes: vec![],
        source: symbol.source,
    });

    table.primary_constructor = Some(key.index);
    tracing::trace!(params = table.positional.len(), "primary constructor");
    Ok(())
}

fn bind_position(
    ctx: &RecordCtx,
    table: &mut MemberTable,
    param: &PositionalMember,
) -> Result<Binding, Cancelled> {
    let asg = ctx.asg;
    let owner = table.owner;

    let declared = table
        .iter()
        .filter(|(_, member)| member.origin.is_declared() && member.name == param.name)
        .filter(|(_, member)| !member.is_constructor())
        .collect_vec();

    if !declared.is_empty() {
        let compatible = declared.iter().find(|(_, member)| {
            member.is_readable_instance_value() && member.value_type() == Some(&param.ty)
        });

        return Ok(match compatible {
            Some((key, _)) => Binding::Existing(*key),
            None => {
                ctx.error(
                    RecordErrorKind::PositionalConflictsWithMember {
                        record: asg.types[owner].name.clone(),
                        name: param.name.clone(),
                    },
                    param.source,
                );
                Binding::Rejected
            }
        });
    }

    let inherited = ctx.find_inherited(owner, None, |member| {
        member.name == param.name && !member.is_constructor()
    })?;

    let Some(inherited) = inherited.first().copied() else {
        return Ok(Binding::Synthesized(table.push(positional_property(param, None))));
    };

    let member = ctx.member(inherited)?;

    let is_property = member.kind.is_property()
        && member.is_readable_instance_value()
        && member.value_type() == Some(&param.ty);

    if !is_property {
        ctx.error(
            RecordErrorKind::InheritedPositionalMismatch {
                name: param.name.clone(),
                base: asg.types[inherited.owner].name.clone(),
                reason: MismatchReason::InheritedNotProperty,
            },
            param.source,
        );
        return Ok(Binding::Rejected);
    }

    if member.modifiers.is_abstract {
        return Ok(Binding::Synthesized(
            table.push(positional_property(param, Some(inherited))),
        ));
    }

    Ok(Binding::Existing(inherited))
}

fn positional_property(param: &PositionalMember, overrides: Option<MemberKey>) -> Member {
    Member {
        name: param.name.clone(),
        kind: MemberKind::Property(Property {
            ty: param.ty.clone(),
            getter: Some(Accessor::new(AccessorKind::Get, Privacy::Public)),
            setter: Some(Accessor::new(AccessorKind::Init, Privacy::Public)),
            initializer: None,
            body: None,
            backing_field_attributes: vec![],
            overrides,
        }),
        privacy: Privacy::Public,
        modifiers: if overrides.is_some() {
            Modifiers::NONE.r#override()
        } else {
            Modifiers::NONE
        },
        origin: MemberOrigin::Positional(param.ordinal),
        attributes: vec![],
        source: param.source,
    }
}

fn route_attributes(ctx: &RecordCtx, param: &PositionalMember, property_synthesized: bool) -> RoutedAttributes {
    let mut router = AttributeRouter::new(&ctx.asg.attribute_classes, property_synthesized);

    for annotation in param.attributes.iter() {
        if let Err(reason) = router.route(annotation) {
            ctx.error(
                RecordErrorKind::DroppedAttribute {
                    attribute: annotation.name.clone(),
                    reason: reason.to_string(),
                },
                annotation.source,
            );
        }
    }

    router.finish()
}

fn apply_routed(member: &mut Member, routed: &RoutedAttributes) {
    if !member.origin.is_positional() {
        return;
    }

    member.attributes.extend(routed.property.iter().cloned());

    if let MemberKind::Property(property) = &mut member.kind {
        property
            .backing_field_attributes
            .extend(routed.field.iter().cloned());

        if let Some(getter) = &mut property.getter {
            getter.attributes.extend(routed.method.iter().cloned());
        }
    }
}

fn warn_if_unread(ctx: &RecordCtx, table: &MemberTable, param: &PositionalMember) {
    if !ctx.options.warn_unread_parameters {
        return;
    }

    let symbol = &ctx.asg.types[table.owner];

    let read_by_initializer = table.members.iter().any(|member| {
        let initializer = match &member.kind {
            MemberKind::Field(field) => field.initializer.as_ref(),
            MemberKind::Property(property) => property.initializer.as_ref(),
            MemberKind::Method(_) | MemberKind::Constructor(_) => None,
        };

        initializer.is_some_and(|initializer| initializer.mentions(&param.name))
    });

    let read_by_base = symbol
        .base_args
        .iter()
        .flatten()
        .any(|arg| arg.mentions(&param.name));

    if !read_by_initializer && !read_by_base {
        ctx.error(
            RecordErrorKind::UnreadParameter {
                name: param.name.clone(),
            },
            param.source,
        );
    }
}

/// Gives types that declare no constructor a parameterless one
pub fn add_default_constructor(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let owner = table.owner;
    let symbol = &ctx.asg.types[owner];

    if symbol.has_parameter_list() || table.constructors().next().is_some() {
        return Ok(());
    }

    let base_ctor = resolve_base_constructor(ctx, owner, &[], &[])?;

    let mut body = vec![Stmt::RunInitializers(owner)];
    body.extend(base_ctor.map(|ctor| Stmt::CallConstructor { ctor, args: vec![] }));

    table.push(Member {
        name: CONSTRUCTOR_NAME.into(),
        kind: MemberKind::Constructor(Constructor {
            params: vec![],
            body: Body::Synthesized(body),
        }),
        privacy: if symbol.is_abstract {
            Privacy::Protected
        } else {
            Privacy::Public
        },
        modifiers: Modifiers::NONE,
        origin: MemberOrigin::DefaultConstructor,
        attributes: vec![],
        source: symbol.source,
    });

    Ok(())
}

/// Positional bindings of a record imported from metadata, whose properties
/// are all declared explicitly
pub fn bind_metadata(ctx: &RecordCtx, table: &mut MemberTable) -> Result<(), Cancelled> {
    let owner = table.owner;
    let symbol = &ctx.asg.types[owner];

    let inherited = match ctx.asg.base_record(owner) {
        Some(base) => ctx.members(base)?.deconstruction.clone(),
        None => vec![],
    };

    let own = symbol
        .positional()
        .iter()
        .map(|param| PositionalBinding {
            name: param.name.clone(),
            ty: param.ty.clone(),
            ordinal: param.ordinal,
            member: table
                .named(&param.name)
                .find(|(_, member)| member.kind.is_property())
                .map(|(key, _)| key),
        })
        .collect_vec();

    table.deconstruction = inherited
        .into_iter()
        .filter(|binding| !own.iter().any(|param| param.name == binding.name))
        .chain(own.iter().cloned())
        .collect();
    table.positional = own;
    Ok(())
}

/// Base constructor a type's implicit or primary constructor chains to
pub fn resolve_base_constructor(
    ctx: &RecordCtx,
    owner: TypeRef,
    args: &[ast::Expr],
    params: &[Param],
) -> Result<Option<MemberKey>, Cancelled> {
    let Some(base) = ctx.asg.types[owner].base else {
        return Ok(None);
    };

    let base_table = ctx.members(base)?;
    let found = select_constructor(ctx, owner, base_table.constructors(), args, params);

    if found.is_none() {
        ctx.error(
            RecordErrorKind::NoMatchingConstructor {
                ty: ctx.asg.types[base].name.clone(),
                arity: args.len(),
            },
            ctx.asg.types[owner].source,
        );
    }

    Ok(found)
}

/// First accessible constructor whose parameters accept `args`
pub fn select_constructor<'m>(
    ctx: &RecordCtx,
    from: TypeRef,
    candidates: impl Iterator<Item = (MemberKey, &'m Member)>,
    args: &[ast::Expr],
    params: &[Param],
) -> Option<MemberKey> {
    let lookup = TableLookup {
        ctx,
        resolving: Some(from),
    };

    let typer = Typer {
        asg: ctx.asg,
        lookup: &lookup,
        this: Some(from),
        params,
    };

    candidates
        .filter(|(key, member)| ctx.asg.can_access(Some(from), key.owner, member.privacy))
        .find(|(_, member)| {
            member.arity() == args.len()
                && member
                    .param_types()
                    .zip(args.iter())
                    .all(|(ty, arg)| typer.accepts(ty, arg))
        })
        .map(|(key, _)| key)
}
