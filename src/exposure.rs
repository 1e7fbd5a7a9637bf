//! Export exposure and free-uvar-closure checks (spec §4.9 "Imports &
//! exports (top-level)").
//!
//! Two distinct traversals over the same recursive type algebra, grounded
//! directly in spec §4.9's prose (no teacher file covers this — the
//! teacher links already-concrete runtime instances and never has an
//! abstract-resource or free-uvar exposure question to ask of a type):
//!
//! - [`contains_bare_resource`]: does a descriptor reachably mention a
//!   locally-minted `DT_resource_type i` that is not hidden behind a type
//!   variable? Used by the top-level export check (invariant I4, spec §8
//!   S1): `"Cannot export type containing bare resource type"`.
//! - [`collect_uvars`]: every free `uvar` index a descriptor reachably
//!   mentions. Used after folding a (possibly nested) component body to
//!   confirm every uvar its own imports/exports mention was itself opened
//!   by one of that component's own imports (spec §4.9, §8 S2):
//!   `"Component type may not refer to non-imported uvar"`.

use crate::{
    defs::{ComponentType, DefType, ExternDesc, FuncType, InstanceType, ParamList},
    value_types::ValType,
    vars::TypeVar,
};

/// Does this extern descriptor reachably mention a bare (non-variable)
/// resource type identity?
pub fn contains_bare_resource(desc: &ExternDesc) -> bool {
    match desc {
        ExternDesc::CoreModule(_) => false,
        ExternDesc::Func(ft) => functype_has_bare_resource(ft),
        ExternDesc::Value(vt) => valtype_has_bare_resource(vt),
        ExternDesc::Type(dt) => deftype_has_bare_resource(dt),
        ExternDesc::Instance(it) => instance_has_bare_resource(it),
        ExternDesc::Component(ct) => component_has_bare_resource(ct),
    }
}

fn deftype_has_bare_resource(dt: &DefType) -> bool {
    match dt {
        DefType::Resource(_) => true,
        DefType::Var(_) => false,
        DefType::Value(vt) => valtype_has_bare_resource(vt),
        DefType::Func(ft) => functype_has_bare_resource(ft),
        DefType::Component(ct) => component_has_bare_resource(ct),
        DefType::Instance(it) => instance_has_bare_resource(it),
    }
}

fn valtype_has_bare_resource(vt: &ValType) -> bool {
    match vt {
        ValType::List(t) | ValType::Option(t) => valtype_has_bare_resource(t),
        ValType::Tuple(ts) => ts.iter().any(valtype_has_bare_resource),
        ValType::Record(r) => r.fields.iter().any(|f| valtype_has_bare_resource(&f.ty)),
        ValType::Variant(v) => v.cases.iter().any(|c| c.ty.as_ref().is_some_and(valtype_has_bare_resource)),
        ValType::Result { ok, err } => ok.as_deref().is_some_and(valtype_has_bare_resource) || err.as_deref().is_some_and(valtype_has_bare_resource),
        ValType::Own(dt) | ValType::Borrow(dt) => deftype_has_bare_resource(dt),
        ValType::Bool
        | ValType::S8
        | ValType::U8
        | ValType::S16
        | ValType::U16
        | ValType::S32
        | ValType::U32
        | ValType::S64
        | ValType::U64
        | ValType::F32
        | ValType::F64
        | ValType::Char
        | ValType::String
        | ValType::Enum(_)
        | ValType::Flags(_) => false,
    }
}

fn paramlist_has_bare_resource(p: &ParamList) -> bool {
    p.types().into_iter().any(valtype_has_bare_resource)
}

fn functype_has_bare_resource(ft: &FuncType) -> bool {
    paramlist_has_bare_resource(&ft.params) || paramlist_has_bare_resource(&ft.result)
}

fn instance_has_bare_resource(it: &InstanceType) -> bool {
    it.exports.iter().any(|d| contains_bare_resource(&d.desc))
}

fn component_has_bare_resource(ct: &ComponentType) -> bool {
    ct.imports.iter().any(|d| contains_bare_resource(&d.desc)) || instance_has_bare_resource(&ct.instance)
}

/// Every free `uvar` index reachable from this descriptor, appended to `out`.
pub fn collect_uvars(desc: &ExternDesc, out: &mut Vec<u32>) {
    match desc {
        ExternDesc::CoreModule(_) => {}
        ExternDesc::Func(ft) => collect_uvars_func(ft, out),
        ExternDesc::Value(vt) => collect_uvars_val(vt, out),
        ExternDesc::Type(dt) => collect_uvars_deftype(dt, out),
        ExternDesc::Instance(it) => collect_uvars_instance(it, out),
        ExternDesc::Component(ct) => collect_uvars_component(ct, out),
    }
}

fn collect_uvars_deftype(dt: &DefType, out: &mut Vec<u32>) {
    match dt {
        DefType::Var(TypeVar::Uvar(i)) => out.push(*i),
        DefType::Var(_) | DefType::Resource(_) => {}
        DefType::Value(vt) => collect_uvars_val(vt, out),
        DefType::Func(ft) => collect_uvars_func(ft, out),
        DefType::Component(ct) => collect_uvars_component(ct, out),
        DefType::Instance(it) => collect_uvars_instance(it, out),
    }
}

fn collect_uvars_val(vt: &ValType, out: &mut Vec<u32>) {
    match vt {
        ValType::List(t) | ValType::Option(t) => collect_uvars_val(t, out),
        ValType::Tuple(ts) => ts.iter().for_each(|t| collect_uvars_val(t, out)),
        ValType::Record(r) => r.fields.iter().for_each(|f| collect_uvars_val(&f.ty, out)),
        ValType::Variant(v) => v.cases.iter().filter_map(|c| c.ty.as_ref()).for_each(|t| collect_uvars_val(t, out)),
        ValType::Result { ok, err } => {
            if let Some(t) = ok {
                collect_uvars_val(t, out);
            }
            if let Some(t) = err {
                collect_uvars_val(t, out);
            }
        }
        ValType::Own(dt) | ValType::Borrow(dt) => collect_uvars_deftype(dt, out),
        _ => {}
    }
}

fn collect_uvars_paramlist(p: &ParamList, out: &mut Vec<u32>) {
    p.types().into_iter().for_each(|t| collect_uvars_val(t, out));
}

fn collect_uvars_func(ft: &FuncType, out: &mut Vec<u32>) {
    collect_uvars_paramlist(&ft.params, out);
    collect_uvars_paramlist(&ft.result, out);
}

fn collect_uvars_instance(it: &InstanceType, out: &mut Vec<u32>) {
    it.exports.iter().for_each(|d| collect_uvars(&d.desc, out));
}

fn collect_uvars_component(ct: &ComponentType, out: &mut Vec<u32>) {
    ct.imports.iter().for_each(|d| collect_uvars(&d.desc, out));
    collect_uvars_instance(&ct.instance, out);
}

/// Do every free uvar this descriptor mentions fall within the first
/// `uvar_count` uvars of the enclosing (currently-being-folded) component
/// type? (spec §4.9, §8 S2).
pub fn uses_only_covered_uvars(desc: &ExternDesc, uvar_count: u32) -> bool {
    let mut found = Vec::new();
    collect_uvars(desc, &mut found);
    found.iter().all(|&i| i < uvar_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ResourceId;

    #[test]
    fn bare_resource_type_export_is_detected() {
        let desc = ExternDesc::Type(DefType::Resource(ResourceId(0)));
        assert!(contains_bare_resource(&desc));
    }

    #[test]
    fn resource_hidden_behind_uvar_is_not_bare() {
        let desc = ExternDesc::Type(DefType::Var(TypeVar::Uvar(0)));
        assert!(!contains_bare_resource(&desc));
    }

    #[test]
    fn own_handle_to_bare_resource_is_detected_through_a_function_result() {
        let ft = FuncType {
            params: ParamList::Named(vec![]),
            result: ParamList::Unnamed(Box::new(ValType::Own(Box::new(DefType::Resource(ResourceId(1)))))),
        };
        assert!(contains_bare_resource(&ExternDesc::Func(ft)));
    }

    #[test]
    fn uvar_within_declared_range_is_covered() {
        let desc = ExternDesc::Type(DefType::Var(TypeVar::Uvar(0)));
        assert!(uses_only_covered_uvars(&desc, 1));
        assert!(!uses_only_covered_uvars(&desc, 0));
    }
}
