//! Component instantiation and type-variable inference (spec §4.5
//! "Instantiation").
//!
//! There is no teacher file to ground this on (the teacher never
//! instantiates a component type against argument types — it only
//! validates already-linked runtime instances), so the shape below follows
//! spec §4.5's own numbered steps directly: collect and uniqueness-check
//! the named arguments, infer each `uvar` binding by structurally searching
//! an import's declared shape for the bound variable next to the
//! corresponding concrete argument, substitute the inferred bindings into
//! the remaining imports and the resulting instance type, and check each
//! argument against its (now-concrete) import in order.
//!
//! Design note called out in spec §9: a `uvar` reference nested inside an
//! imported *instance* type is itself expressed as a bound variable
//! relative to that instance type's own `evars` header, so recovering the
//! right context-level `uvar` index requires adding that nested header's
//! length to the search depth at each level of descent — a naive
//! implementation that skips this offset will misidentify which uvar an
//! inner bound variable refers to as soon as imports nest an instance.

use std::collections::HashMap;

use crate::{
    context::Ctx,
    defs::{ComponentType, DefType, ExternDecl, ExternDesc, InstanceType},
    error::{Region, TypeError},
    externs::ExternName,
    naming::check_unique,
    subst::{bsubst_component, bsubst_instance},
    subtype::subtype_extern_desc_reason,
    vars::TypeVar,
};

/// Resolve a concrete component-sort index (already present in `ctx`) to
/// its [`ExternDesc`].
pub fn resolve_sort_desc(ctx: &Ctx, idx: crate::ir::ComponentSortIdx) -> Result<ExternDesc, TypeError> {
    use crate::ir::ComponentSortIdx as S;
    let region = Region::SYNTHETIC;
    match idx {
        S::Func(i) => ctx.funcs.get(i as usize).cloned().map(ExternDesc::Func).ok_or_else(|| TypeError::internal(region, "func index out of range")),
        S::Value(i) => ctx
            .values
            .get(i as usize)
            .map(|v| ExternDesc::Value(v.ty.clone()))
            .ok_or_else(|| TypeError::internal(region, "value index out of range")),
        S::Type(i) => ctx.types.get(i as usize).cloned().map(ExternDesc::Type).ok_or_else(|| TypeError::internal(region, "type index out of range")),
        S::Instance(i) => ctx
            .instances
            .get(i as usize)
            .map(|slot| ExternDesc::Instance(slot.ty.clone()))
            .ok_or_else(|| TypeError::internal(region, "instance index out of range")),
        S::Component(i) => ctx.components.get(i as usize).cloned().map(ExternDesc::Component).ok_or_else(|| TypeError::internal(region, "component index out of range")),
    }
}

/// Search `expected` (an import's declared desc, which may mention a bound
/// `uvar` placeholder) against `actual` (the concrete desc supplied for
/// that import) for the binding of `target` (a context-relative `uvar`
/// index, i.e. already offset by how many `uvars` precede it in the
/// component type's own header). `depth` accumulates the length of any
/// instance/component headers entered along the way, per the offset rule
/// above.
fn find_binding(expected: &ExternDesc, actual: &ExternDesc, target: u32, depth: u32) -> Option<DefType> {
    match (expected, actual) {
        (ExternDesc::Type(DefType::Var(TypeVar::Bound(i))), ExternDesc::Type(actual_dt)) if *i == target + depth => Some(actual_dt.clone()),
        (ExternDesc::Instance(e_it), ExternDesc::Instance(a_it)) => {
            let inner_depth = depth + e_it.evars.len() as u32;
            find_binding_in_decls(&e_it.exports, &a_it.exports, target, inner_depth)
        }
        (ExternDesc::Component(e_ct), ExternDesc::Component(a_ct)) => {
            let inner_depth = depth + e_ct.uvars.len() as u32;
            find_binding_in_decls(&e_ct.imports, &a_ct.imports, target, inner_depth)
        }
        _ => None,
    }
}

fn find_binding_in_decls(expected: &[ExternDecl], actual: &[ExternDecl], target: u32, depth: u32) -> Option<DefType> {
    for e in expected {
        if let Some(a) = actual.iter().find(|a| a.name == e.name) {
            if let Some(found) = find_binding(&e.desc, &a.desc, target, depth) {
                return Some(found);
            }
        }
    }
    None
}

/// Instantiate `ct` against the named arguments, returning the resulting
/// (fully concrete, up to its own `evars`) instance type.
pub fn instantiate(ctx: &Ctx, ct: &ComponentType, args: &[(ExternName, crate::ir::ComponentSortIdx)], region: Region) -> Result<InstanceType, TypeError> {
    let names: Vec<&ExternName> = args.iter().map(|(n, _)| n).collect();
    check_unique(names.into_iter(), region)?;

    let mut actual_by_name: HashMap<String, ExternDesc> = HashMap::new();
    for (name, idx) in args {
        actual_by_name.insert(name.raw(), resolve_sort_desc(ctx, *idx)?);
    }

    let mut images: Vec<Option<DefType>> = vec![None; ct.uvars.len()];
    for (target, slot) in images.iter_mut().enumerate() {
        for decl in &ct.imports {
            if let Some(actual) = actual_by_name.get(&decl.name.raw()) {
                if let Some(found) = find_binding(&decl.desc, actual, target as u32, 0) {
                    *slot = Some(found);
                    break;
                }
            }
        }
    }
    let images: Vec<DefType> = images
        .into_iter()
        .enumerate()
        .map(|(i, o)| o.ok_or_else(|| TypeError::invalid(region, format!("cannot infer type argument u{i}: no instantiate-arg fixes its value"))))
        .collect::<Result<_, _>>()?;

    let concrete = bsubst_component(ct, 0, &images);

    for decl in &concrete.imports {
        let actual = actual_by_name
            .get(&decl.name.raw())
            .ok_or_else(|| TypeError::invalid(region, format!("missing instantiate-arg for import `{}`", decl.name)))?;
        if let Err(reason) = subtype_extern_desc_reason(ctx, actual, &decl.desc) {
            return Err(TypeError::invalid(region, format!("instantiate-arg for `{}` does not match the expected import type: {reason}", decl.name)));
        }
    }

    Ok(bsubst_instance(&concrete.instance, 0, &[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        defs::{FuncType, InstanceType, ParamList},
        value_types::ValType,
        vars::{Binder, Bound},
    };

    #[test]
    fn infers_uvar_from_matching_type_import() {
        let ct = ComponentType {
            uvars: vec![Binder { bound: Bound::Eq(Box::new(DefType::Value(ValType::Bool))) }],
            imports: vec![
                ExternDecl { name: ExternName::plain("t"), desc: ExternDesc::Type(DefType::Var(TypeVar::Bound(0))) },
                ExternDecl {
                    name: ExternName::plain("f"),
                    desc: ExternDesc::Func(FuncType {
                        params: ParamList::Unnamed(Box::new(ValType::Bool)),
                        result: ParamList::Named(vec![]),
                    }),
                },
            ],
            instance: InstanceType::empty(),
        };
        let ctx = Ctx::new();
        let args = vec![
            (ExternName::plain("t"), crate::ir::ComponentSortIdx::Type(0)),
            (ExternName::plain("f"), crate::ir::ComponentSortIdx::Func(0)),
        ];
        let mut ctx_with_slots = ctx.clone();
        ctx_with_slots.push_type(DefType::Value(ValType::U32));
        ctx_with_slots.push_func(FuncType { params: ParamList::Unnamed(Box::new(ValType::U32)), result: ParamList::Named(vec![]) });

        let result = instantiate(&ctx_with_slots, &ct, &args, Region::SYNTHETIC);
        assert!(result.is_ok());
    }

    #[test]
    fn missing_arg_is_rejected() {
        let ct = ComponentType {
            uvars: vec![],
            imports: vec![ExternDecl {
                name: ExternName::plain("f"),
                desc: ExternDesc::Func(FuncType { params: ParamList::Named(vec![]), result: ParamList::Named(vec![]) }),
            }],
            instance: InstanceType::empty(),
        };
        let ctx = Ctx::new();
        let result = instantiate(&ctx, &ct, &[], Region::SYNTHETIC);
        assert!(result.is_err());
    }
}
