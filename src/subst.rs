//! Capture-avoiding substitution over the type algebra (spec §4.2
//! "Substitution").
//!
//! Two distinct operations, matching the two distinct variable
//! populations in [`crate::vars::TypeVar`]:
//!
//! - [`bsubst`] opens a binder list: it replaces de Bruijn `Bound` indices
//!   at the current nesting depth with concrete `DefType`s, shifting
//!   deeper bound indices down as binders are consumed. This is how a
//!   component type's own `uvars`/`evars` become concrete once the
//!   component is instantiated or its body is entered.
//! - [`ftsubst`] replaces a specific *free* `Uvar`/`Evar` (identified by its
//!   index into the enclosing context, not by nesting depth) with a
//!   concrete `DefType` wherever it occurs. This is how instantiation
//!   plugs an inferred uvar solution into the rest of a component type.
//!
//! There is no teacher file to ground this on directly — `wrt-component`
//! decodes already-concrete types from a binary and never carries bound
//! type variables — so the traversal shape here is derived straight from
//! the recursive type algebra in `defs.rs`/`value_types.rs`: every case of
//! `DefType` and `ValType` that can contain a nested `DefType` or `ValType`
//! is walked, and the binder-carrying cases (`ComponentType`, `InstanceType`)
//! bump the cutoff/depth as they are entered, exactly as a lambda-calculus
//! substitution would cross a `forall`/`exists`.

use crate::{
    defs::{ComponentType, DefType, ExternDecl, ExternDesc, FuncType, InstanceType, ParamList},
    value_types::{Case, Field, Record, ValType, Variant},
    vars::TypeVar,
};

/// Replace bound variables at nesting depth `cutoff..cutoff+images.len()`
/// with `images`, shifting any deeper bound variable down by
/// `images.len()` so indices stay correct once those binders are gone.
pub fn bsubst(dt: &DefType, cutoff: u32, images: &[DefType]) -> DefType {
    match dt {
        DefType::Var(TypeVar::Bound(i)) => {
            if *i < cutoff {
                dt.clone()
            } else if (*i - cutoff) < images.len() as u32 {
                images[(*i - cutoff) as usize].clone()
            } else {
                DefType::Var(TypeVar::Bound(*i - images.len() as u32))
            }
        }
        DefType::Var(_) => dt.clone(),
        DefType::Resource(_) => dt.clone(),
        DefType::Value(vt) => DefType::Value(bsubst_val(vt, cutoff, images)),
        DefType::Func(ft) => DefType::Func(bsubst_func(ft, cutoff, images)),
        DefType::Component(ct) => DefType::Component(Box::new(bsubst_component(ct, cutoff, images))),
        DefType::Instance(it) => DefType::Instance(Box::new(bsubst_instance(it, cutoff, images))),
    }
}

fn bsubst_val(vt: &ValType, cutoff: u32, images: &[DefType]) -> ValType {
    match vt {
        ValType::List(t) => ValType::List(Box::new(bsubst_val(t, cutoff, images))),
        ValType::Option(t) => ValType::Option(Box::new(bsubst_val(t, cutoff, images))),
        ValType::Tuple(ts) => ValType::Tuple(ts.iter().map(|t| bsubst_val(t, cutoff, images)).collect()),
        ValType::Record(r) => ValType::Record(Record {
            fields: r.fields.iter().map(|f| Field { name: f.name.clone(), ty: bsubst_val(&f.ty, cutoff, images) }).collect(),
        }),
        ValType::Variant(v) => ValType::Variant(Variant {
            cases: v
                .cases
                .iter()
                .map(|c| Case { name: c.name.clone(), ty: c.ty.as_ref().map(|t| bsubst_val(t, cutoff, images)), refines: c.refines })
                .collect(),
        }),
        ValType::Result { ok, err } => ValType::Result {
            ok: ok.as_ref().map(|t| Box::new(bsubst_val(t, cutoff, images))),
            err: err.as_ref().map(|t| Box::new(bsubst_val(t, cutoff, images))),
        },
        ValType::Own(dt) => ValType::Own(Box::new(bsubst(dt, cutoff, images))),
        ValType::Borrow(dt) => ValType::Borrow(Box::new(bsubst(dt, cutoff, images))),
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
        | ValType::Flags(_) => vt.clone(),
    }
}

fn bsubst_params(p: &ParamList, cutoff: u32, images: &[DefType]) -> ParamList {
    match p {
        ParamList::Unnamed(t) => ParamList::Unnamed(Box::new(bsubst_val(t, cutoff, images))),
        ParamList::Named(v) => ParamList::Named(v.iter().map(|(n, t)| (n.clone(), bsubst_val(t, cutoff, images))).collect()),
    }
}

fn bsubst_func(ft: &FuncType, cutoff: u32, images: &[DefType]) -> FuncType {
    FuncType { params: bsubst_params(&ft.params, cutoff, images), result: bsubst_params(&ft.result, cutoff, images) }
}

fn bsubst_extern_desc(desc: &ExternDesc, cutoff: u32, images: &[DefType]) -> ExternDesc {
    match desc {
        ExternDesc::CoreModule(m) => ExternDesc::CoreModule(m.clone()),
        ExternDesc::Func(ft) => ExternDesc::Func(bsubst_func(ft, cutoff, images)),
        ExternDesc::Value(vt) => ExternDesc::Value(bsubst_val(vt, cutoff, images)),
        ExternDesc::Type(dt) => ExternDesc::Type(bsubst(dt, cutoff, images)),
        ExternDesc::Instance(it) => ExternDesc::Instance(bsubst_instance(it, cutoff, images)),
        ExternDesc::Component(ct) => ExternDesc::Component(bsubst_component(ct, cutoff, images)),
    }
}

fn bsubst_decls(decls: &[ExternDecl], cutoff: u32, images: &[DefType]) -> Vec<ExternDecl> {
    decls.iter().map(|d| ExternDecl { name: d.name.clone(), desc: bsubst_extern_desc(&d.desc, cutoff, images) }).collect()
}

pub fn bsubst_instance(it: &InstanceType, cutoff: u32, images: &[DefType]) -> InstanceType {
    let inner_cutoff = cutoff + it.evars.len() as u32;
    InstanceType { evars: it.evars.clone(), exports: bsubst_decls(&it.exports, inner_cutoff, images) }
}

pub fn bsubst_component(ct: &ComponentType, cutoff: u32, images: &[DefType]) -> ComponentType {
    let inner_cutoff = cutoff + ct.uvars.len() as u32;
    ComponentType {
        uvars: ct.uvars.clone(),
        imports: bsubst_decls(&ct.imports, inner_cutoff, images),
        instance: bsubst_instance(&ct.instance, inner_cutoff, images),
    }
}

/// Replace every occurrence of the free variable `target` with `image`,
/// leaving all other variables (bound or free) untouched.
pub fn ftsubst(dt: &DefType, target: TypeVar, image: &DefType) -> DefType {
    match dt {
        DefType::Var(v) if *v == target => image.clone(),
        DefType::Var(_) | DefType::Resource(_) => dt.clone(),
        DefType::Value(vt) => DefType::Value(ftsubst_val(vt, target, image)),
        DefType::Func(ft) => DefType::Func(ftsubst_func(ft, target, image)),
        DefType::Component(ct) => DefType::Component(Box::new(ftsubst_component(ct, target, image))),
        DefType::Instance(it) => DefType::Instance(Box::new(ftsubst_instance(it, target, image))),
    }
}

fn ftsubst_val(vt: &ValType, target: TypeVar, image: &DefType) -> ValType {
    match vt {
        ValType::List(t) => ValType::List(Box::new(ftsubst_val(t, target, image))),
        ValType::Option(t) => ValType::Option(Box::new(ftsubst_val(t, target, image))),
        ValType::Tuple(ts) => ValType::Tuple(ts.iter().map(|t| ftsubst_val(t, target, image)).collect()),
        ValType::Record(r) => ValType::Record(Record {
            fields: r.fields.iter().map(|f| Field { name: f.name.clone(), ty: ftsubst_val(&f.ty, target, image) }).collect(),
        }),
        ValType::Variant(v) => ValType::Variant(Variant {
            cases: v
                .cases
                .iter()
                .map(|c| Case { name: c.name.clone(), ty: c.ty.as_ref().map(|t| ftsubst_val(t, target, image)), refines: c.refines })
                .collect(),
        }),
        ValType::Result { ok, err } => ValType::Result {
            ok: ok.as_ref().map(|t| Box::new(ftsubst_val(t, target, image))),
            err: err.as_ref().map(|t| Box::new(ftsubst_val(t, target, image))),
        },
        ValType::Own(dt) => ValType::Own(Box::new(ftsubst(dt, target, image))),
        ValType::Borrow(dt) => ValType::Borrow(Box::new(ftsubst(dt, target, image))),
        _ => vt.clone(),
    }
}

fn ftsubst_params(p: &ParamList, target: TypeVar, image: &DefType) -> ParamList {
    match p {
        ParamList::Unnamed(t) => ParamList::Unnamed(Box::new(ftsubst_val(t, target, image))),
        ParamList::Named(v) => ParamList::Named(v.iter().map(|(n, t)| (n.clone(), ftsubst_val(t, target, image))).collect()),
    }
}

fn ftsubst_func(ft: &FuncType, target: TypeVar, image: &DefType) -> FuncType {
    FuncType { params: ftsubst_params(&ft.params, target, image), result: ftsubst_params(&ft.result, target, image) }
}

fn ftsubst_extern_desc(desc: &ExternDesc, target: TypeVar, image: &DefType) -> ExternDesc {
    match desc {
        ExternDesc::CoreModule(m) => ExternDesc::CoreModule(m.clone()),
        ExternDesc::Func(ft) => ExternDesc::Func(ftsubst_func(ft, target, image)),
        ExternDesc::Value(vt) => ExternDesc::Value(ftsubst_val(vt, target, image)),
        ExternDesc::Type(dt) => ExternDesc::Type(ftsubst(dt, target, image)),
        ExternDesc::Instance(it) => ExternDesc::Instance(ftsubst_instance(it, target, image)),
        ExternDesc::Component(ct) => ExternDesc::Component(ftsubst_component(ct, target, image)),
    }
}

pub fn ftsubst_instance(it: &InstanceType, target: TypeVar, image: &DefType) -> InstanceType {
    InstanceType {
        evars: it.evars.clone(),
        exports: it.exports.iter().map(|d| ExternDecl { name: d.name.clone(), desc: ftsubst_extern_desc(&d.desc, target, image) }).collect(),
    }
}

pub fn ftsubst_component(ct: &ComponentType, target: TypeVar, image: &DefType) -> ComponentType {
    ComponentType {
        uvars: ct.uvars.clone(),
        imports: ct.imports.iter().map(|d| ExternDecl { name: d.name.clone(), desc: ftsubst_extern_desc(&d.desc, target, image) }).collect(),
        instance: ftsubst_instance(&ct.instance, target, image),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::TypeVar;

    #[test]
    fn bsubst_replaces_matching_bound_index() {
        let dt = DefType::Var(TypeVar::Bound(0));
        let image = DefType::Value(ValType::Bool);
        assert_eq!(bsubst(&dt, 0, std::slice::from_ref(&image)), image);
    }

    #[test]
    fn bsubst_shifts_deeper_index() {
        let dt = DefType::Var(TypeVar::Bound(2));
        let image = DefType::Value(ValType::Bool);
        let images = [image];
        assert_eq!(bsubst(&dt, 0, &images), DefType::Var(TypeVar::Bound(1)));
    }

    #[test]
    fn bsubst_leaves_shallower_index_untouched() {
        let dt = DefType::Var(TypeVar::Bound(0));
        let image = DefType::Value(ValType::Bool);
        let images = [image];
        assert_eq!(bsubst(&dt, 1, &images), dt);
    }

    #[test]
    fn ftsubst_replaces_matching_uvar() {
        let target = TypeVar::Uvar(5);
        let dt = DefType::Var(target);
        let image = DefType::Value(ValType::U32);
        assert_eq!(ftsubst(&dt, target, &image), image);
    }
}
