use crate::error::DeclareErrorKind;
use asg::{
    Accessor, Asg, Body, Constructor, Field, Member, MemberKind, MemberOrigin, Method, Param,
    PositionalMember, Property, Type, TypeParam, TypeRef, UserConstructor, CONSTRUCTOR_NAME,
};
use ast::{
    AccessorDecl, BaseSpec, ConstructorInitializer, MemberDecl, MemberDeclKind, ParamDecl,
    TypeDecl, TypeName,
};
use attributes::Privacy;
use diagnostics::Diagnostics;
use source_files::Source;

pub fn bind_types(asg: &mut Asg, declared: &[(TypeRef, &TypeDecl)], diagnostics: &Diagnostics) {
    for (type_ref, decl) in declared.iter().copied() {
        let base = bind_base(asg, type_ref, decl, diagnostics);

        let positional = decl.params.as_ref().map(|params| {
            params
                .iter()
                .enumerate()
                .map(|(ordinal, param)| PositionalMember {
                    name: param.name.clone(),
                    ty: bind_type(asg, &param.ty, param.source, diagnostics),
                    ordinal,
                    default: param.default.clone(),
                    attributes: param.attributes.clone(),
                    source: param.source,
                })
                .collect()
        });

        let members = decl
            .members
            .iter()
            .map(|member| bind_member(asg, member, diagnostics))
            .collect();

        let symbol = &mut asg.types[type_ref];
        symbol.base = Some(base);
        symbol.base_args = decl.base.as_ref().and_then(|base| base.args.clone());
        symbol.positional = positional;
        symbol.declared = members;
    }
}

fn bind_base(asg: &Asg, type_ref: TypeRef, decl: &TypeDecl, diagnostics: &Diagnostics) -> TypeRef {
    let Some(BaseSpec { name, source, .. }) = &decl.base else {
        return asg.object;
    };

    let Some(base) = asg.lookup(name) else {
        diagnostics.push(DeclareErrorKind::UndeclaredType { name: name.clone() }.at(*source));
        return asg.object;
    };

    let base_symbol = &asg.types[base];
    let symbol = &asg.types[type_ref];

    if symbol.is_record() && base != asg.object && !base_symbol.is_record() {
        diagnostics.push(
            DeclareErrorKind::RecordInheritsClass {
                record: symbol.name.clone(),
                base: base_symbol.name.clone(),
            }
            .at(*source),
        );
        return asg.object;
    }

    if !symbol.is_record() && base_symbol.is_record() {
        diagnostics.push(
            DeclareErrorKind::ClassInheritsRecord {
                class: symbol.name.clone(),
                base: base_symbol.name.clone(),
            }
            .at(*source),
        );
        return asg.object;
    }

    if base_symbol.is_sealed {
        diagnostics.push(
            DeclareErrorKind::InheritsSealed {
                name: symbol.name.clone(),
                base: base_symbol.name.clone(),
            }
            .at(*source),
        );
    }

    base
}

pub fn bind_type(asg: &Asg, ty: &TypeName, source: Source, diagnostics: &Diagnostics) -> Type {
    let lookup = |name: &str| {
        let found = asg.lookup(name);

        if found.is_none() {
            diagnostics.push(DeclareErrorKind::UndeclaredType { name: name.into() }.at(source));
        }

        found
    };

    match ty {
        TypeName::Void => Type::Void,
        TypeName::Bool => Type::Bool,
        TypeName::Int => Type::Int,
        TypeName::String => Type::String,
        TypeName::Object => asg.object_type(),
        TypeName::TypeToken => Type::TypeToken,
        TypeName::StringBuilder => Type::StringBuilder,
        TypeName::Named(name) => lookup(name).map(Type::Named).unwrap_or(Type::Error),
        TypeName::Param(param) => Type::Param(TypeParam {
            name: param.name.clone(),
            bound: param.bound.as_deref().and_then(lookup),
        }),
    }
}

fn bind_params(
    asg: &Asg,
    params: &[ParamDecl],
    source: Source,
    diagnostics: &Diagnostics,
) -> Vec<Param> {
    params
        .iter()
        .map(|param| Param {
            name: param.name.clone(),
            ty: bind_type(asg, &param.ty, source, diagnostics),
            is_out: param.is_out,
            default: param.default.clone(),
            attributes: vec![],
        })
        .collect()
}

fn bind_accessor(accessor: &Option<AccessorDecl>, privacy: Privacy) -> Option<Accessor> {
    accessor
        .as_ref()
        .map(|accessor| Accessor::new(accessor.kind, accessor.privacy.unwrap_or(privacy)))
}

fn bind_member(asg: &Asg, member: &MemberDecl, diagnostics: &Diagnostics) -> Member {
    let source = member.source;

    let kind = match &member.kind {
        MemberDeclKind::Field(field) => MemberKind::Field(Field {
            ty: bind_type(asg, &field.ty, source, diagnostics),
            is_readonly: field.is_readonly,
            initializer: field.initializer.clone(),
        }),
        MemberDeclKind::Property(property) => MemberKind::Property(Property {
            ty: bind_type(asg, &property.ty, source, diagnostics),
            getter: bind_accessor(&property.getter, member.privacy),
            setter: bind_accessor(&property.setter, member.privacy),
            initializer: property.initializer.clone(),
            body: property.getter_body.clone().map(Body::User),
            backing_field_attributes: vec![],
            overrides: None,
        }),
        MemberDeclKind::Method(method) => MemberKind::Method(Method {
            params: bind_params(asg, &method.params, source, diagnostics),
            return_type: bind_type(asg, &method.return_type, source, diagnostics),
            body: method.body.clone().map(Body::User).unwrap_or(Body::None),
            overrides: None,
        }),
        MemberDeclKind::Operator(operator) => MemberKind::Method(Method {
            params: bind_params(asg, &operator.params, source, diagnostics),
            return_type: bind_type(asg, &operator.return_type, source, diagnostics),
            body: operator.body.clone().map(Body::User).unwrap_or(Body::None),
            overrides: None,
        }),
        MemberDeclKind::Constructor(constructor) => {
            let (chains_to_this, chain_args) = match &constructor.initializer {
                Some(ConstructorInitializer::This(args)) => (true, args.clone()),
                Some(ConstructorInitializer::Base(args)) => (false, args.clone()),
                None => (false, vec![]),
            };

            MemberKind::Constructor(Constructor {
                params: bind_params(asg, &constructor.params, source, diagnostics),
                body: Body::UserConstructor(UserConstructor {
                    chains_to_this,
                    chain_args,
                    chains_to: None,
                    assignments: constructor.assignments.clone(),
                }),
            })
        }
    };

    let name = if member.kind.is_constructor() {
        CONSTRUCTOR_NAME.to_string()
    } else {
        member.name.clone()
    };

    Member {
        name,
        kind,
        privacy: member.privacy,
        modifiers: member.modifiers,
        origin: MemberOrigin::Declared,
        attributes: member
            .attributes
            .iter()
            .map(|annotation| annotation.name.clone())
            .collect(),
        source,
    }
}
