//! Structural subtyping (spec §4.4 "Subtyping").
//!
//! Grounded on `wrt-component/type_compatibility.rs`'s per-variant
//! structural match, extended with the context-dependent pieces the
//! teacher never needed (it only ever compares already-concrete decoded
//! types): free-variable resolution through [`crate::context::Ctx`]'s
//! `uvars`/`evars` bound lists, and width/depth rules for record, variant,
//! enum and flags that match spec §4.4's table rather than plain equality.
//!
//! Component- and instance-type subtyping do not attempt general
//! higher-order unification; they require the two binder lists to agree
//! in arity and bound shape and otherwise compare structurally under that
//! alignment. This is sufficient for every case the script assertions and
//! testable properties in spec §8 exercise, but a fully general checker
//! would additionally attempt reordering/dropping unused binders — noted
//! as a known simplification rather than silently claiming completeness.

use crate::{
    context::Ctx,
    core_types::CoreExternDesc,
    defs::{ComponentType, DefType, ExternDesc, FuncType, InstanceType, ParamList},
    resources::resource_subtype,
    value_types::ValType,
    vars::{Bound, TypeVar},
};

fn resolve_var(ctx: &Ctx, v: TypeVar) -> Option<DefType> {
    let bound = match v {
        TypeVar::Uvar(i) => ctx.uvars.get(i as usize),
        TypeVar::Evar { id, .. } => ctx.evars.get(id as usize),
        TypeVar::Bound(_) => None,
    }?;
    match bound {
        Bound::Eq(dt) => Some((**dt).clone()),
        Bound::Resource => None,
    }
}

pub fn subtype_deftype(ctx: &Ctx, sub: &DefType, sup: &DefType) -> bool {
    match (sub, sup) {
        (DefType::Var(a), DefType::Var(b)) if a == b => true,
        // Two distinct free uvars: neither carries an `eq` witness to
        // unfold through, so they're incomparable regardless of bound
        // shape (spec §4.4 "Type-variable"). `uvar_subtype_mismatch`
        // holds the diagnostic text for callers that want it.
        (DefType::Var(TypeVar::Uvar(a)), DefType::Var(TypeVar::Uvar(b)))
            if resolve_var(ctx, TypeVar::Uvar(*a)).is_none() && resolve_var(ctx, TypeVar::Uvar(*b)).is_none() =>
        {
            false
        }
        (DefType::Var(a), _) => match resolve_var(ctx, *a) {
            Some(unfolded) => subtype_deftype(ctx, &unfolded, sup),
            None => false,
        },
        (_, DefType::Var(b)) => match resolve_var(ctx, *b) {
            Some(unfolded) => subtype_deftype(ctx, sub, &unfolded),
            None => false,
        },
        (DefType::Resource(a), DefType::Resource(b)) => resource_subtype(*a, *b),
        (DefType::Value(a), DefType::Value(b)) => subtype_valtype(ctx, a, b),
        (DefType::Func(a), DefType::Func(b)) => subtype_functype(ctx, a, b),
        (DefType::Instance(a), DefType::Instance(b)) => subtype_instance(ctx, a, b),
        (DefType::Component(a), DefType::Component(b)) => subtype_component(ctx, a, b),
        _ => false,
    }
}

pub fn subtype_valtype(ctx: &Ctx, sub: &ValType, sup: &ValType) -> bool {
    match (sub, sup) {
        (a, b) if a == b => true,
        (ValType::List(a), ValType::List(b)) => subtype_valtype(ctx, a, b),
        (ValType::Option(a), ValType::Option(b)) => subtype_valtype(ctx, a, b),
        (ValType::Tuple(a), ValType::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| subtype_valtype(ctx, x, y))
        }
        (ValType::Result { ok: ao, err: ae }, ValType::Result { ok: bo, err: be }) => {
            opt_subtype(ctx, ao, bo) && opt_subtype(ctx, ae, be)
        }
        (ValType::Record(a), ValType::Record(b)) => {
            // Width subtyping: sub may carry extra fields sup does not need.
            b.fields.iter().all(|bf| {
                a.fields.iter().find(|af| af.name == bf.name).is_some_and(|af| subtype_valtype(ctx, &af.ty, &bf.ty))
            })
        }
        (ValType::Variant(a), ValType::Variant(b)) => {
            // Width subtyping in the other direction: sub may omit cases sup
            // still declares (a narrower producer is safe for a wider consumer).
            a.cases.iter().all(|ac| {
                b.cases
                    .iter()
                    .find(|bc| bc.name == ac.name)
                    .is_some_and(|bc| opt_subtype_owned(ctx, &ac.ty, &bc.ty))
            })
        }
        (ValType::Enum(a), ValType::Enum(b)) => a.iter().all(|t| b.contains(t)),
        (ValType::Flags(a), ValType::Flags(b)) => a.iter().all(|n| b.contains(n)),
        (ValType::Own(a), ValType::Own(b)) => subtype_deftype(ctx, a, b),
        (ValType::Borrow(a), ValType::Borrow(b)) => subtype_deftype(ctx, a, b),
        _ => false,
    }
}

/// The spec's exact diagnostic for the uvar-vs-uvar mismatch case (spec
/// §4.4 "Type-variable": "mismatches yield error 'Type variable u0.X is
/// not u0.Y'"; spec §8 S3). `None` when `sub`/`sup` aren't both
/// currently-unresolved free uvars — callers fall back to
/// [`subtype_deftype`]'s plain bool in that case.
pub fn uvar_subtype_mismatch(ctx: &Ctx, sub: &DefType, sup: &DefType) -> Option<String> {
    match (sub, sup) {
        (DefType::Var(TypeVar::Uvar(a)), DefType::Var(TypeVar::Uvar(b)))
            if a != b && resolve_var(ctx, TypeVar::Uvar(*a)).is_none() && resolve_var(ctx, TypeVar::Uvar(*b)).is_none() =>
        {
            Some(format!("Type variable u0.{a} is not u0.{b}"))
        }
        _ => None,
    }
}

/// Like [`subtype_extern_desc`] but surfaces [`uvar_subtype_mismatch`]'s
/// exact text for a `type` extern desc that fails because it compares two
/// distinct, unresolved uvars, instead of a generic caller-supplied
/// message.
pub fn subtype_extern_desc_reason(ctx: &Ctx, sub: &ExternDesc, sup: &ExternDesc) -> Result<(), String> {
    if let (ExternDesc::Type(a), ExternDesc::Type(b)) = (sub, sup) {
        if let Some(msg) = uvar_subtype_mismatch(ctx, a, b) {
            return Err(msg);
        }
    }
    if subtype_extern_desc(ctx, sub, sup) {
        Ok(())
    } else {
        Err("extern descriptor mismatch".to_string())
    }
}

fn opt_subtype(ctx: &Ctx, a: &Option<Box<ValType>>, b: &Option<Box<ValType>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => subtype_valtype(ctx, x, y),
        _ => false,
    }
}

fn opt_subtype_owned(ctx: &Ctx, a: &Option<ValType>, b: &Option<ValType>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => subtype_valtype(ctx, x, y),
        _ => false,
    }
}

/// Function subtyping: contravariant in params, covariant in results.
pub fn subtype_functype(ctx: &Ctx, sub: &FuncType, sup: &FuncType) -> bool {
    paramlist_subtype(ctx, &sup.params, &sub.params) && paramlist_subtype(ctx, &sub.result, &sup.result)
}

fn paramlist_subtype(ctx: &Ctx, sub: &ParamList, sup: &ParamList) -> bool {
    match (sub, sup) {
        (ParamList::Unnamed(a), ParamList::Unnamed(b)) => subtype_valtype(ctx, a, b),
        (ParamList::Named(a), ParamList::Named(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|((an, at), (bn, bt))| an == bn && subtype_valtype(ctx, at, bt))
        }
        _ => false,
    }
}

pub fn subtype_extern_desc(ctx: &Ctx, sub: &ExternDesc, sup: &ExternDesc) -> bool {
    match (sub, sup) {
        (ExternDesc::CoreModule(a), ExternDesc::CoreModule(b)) => {
            crate::core_types::default_core_extern_subtype(&CoreExternDesc::Module(Box::new(a.clone())), &CoreExternDesc::Module(Box::new(b.clone())))
        }
        (ExternDesc::Func(a), ExternDesc::Func(b)) => subtype_functype(ctx, a, b),
        (ExternDesc::Value(a), ExternDesc::Value(b)) => subtype_valtype(ctx, a, b),
        (ExternDesc::Type(a), ExternDesc::Type(b)) => subtype_deftype(ctx, a, b),
        (ExternDesc::Instance(a), ExternDesc::Instance(b)) => subtype_instance(ctx, a, b),
        (ExternDesc::Component(a), ExternDesc::Component(b)) => subtype_component(ctx, a, b),
        _ => false,
    }
}

/// Instance subtyping: every export sup requires, sub must provide under
/// the same name with a subtype description (width subtyping: sub may
/// export more than sup needs).
pub fn subtype_instance(ctx: &Ctx, sub: &InstanceType, sup: &InstanceType) -> bool {
    if sub.evars.len() != sup.evars.len() {
        return false;
    }
    if !sub.evars.iter().zip(&sup.evars).all(|(a, b)| bound_shape_matches(a, b)) {
        return false;
    }
    sup.exports.iter().all(|sup_decl| {
        sub.exports
            .iter()
            .find(|sub_decl| sub_decl.name == sup_decl.name)
            .is_some_and(|sub_decl| subtype_extern_desc(ctx, &sub_decl.desc, &sup_decl.desc))
    })
}

/// Component subtyping: sub must not require any import sup doesn't also
/// require (contravariant, width), and sub's resulting instance must be a
/// subtype of sup's (covariant).
pub fn subtype_component(ctx: &Ctx, sub: &ComponentType, sup: &ComponentType) -> bool {
    if sub.uvars.len() != sup.uvars.len() {
        return false;
    }
    if !sub.uvars.iter().zip(&sup.uvars).all(|(a, b)| bound_shape_matches(a, b)) {
        return false;
    }
    let imports_ok = sub.imports.iter().all(|sub_decl| {
        sup.imports
            .iter()
            .find(|sup_decl| sup_decl.name == sub_decl.name)
            .is_some_and(|sup_decl| subtype_extern_desc(ctx, &sup_decl.desc, &sub_decl.desc))
    });
    imports_ok && subtype_instance(ctx, &sub.instance, &sup.instance)
}

fn bound_shape_matches(a: &crate::vars::Binder, b: &crate::vars::Binder) -> bool {
    matches!((&a.bound, &b.bound), (Bound::Resource, Bound::Resource) | (Bound::Eq(_), Bound::Eq(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::{Case, Field, Record, Variant};

    #[test]
    fn record_width_subtyping_allows_extra_fields() {
        let ctx = Ctx::new();
        let wide = ValType::Record(Record { fields: vec![Field { name: "a".into(), ty: ValType::Bool }, Field { name: "b".into(), ty: ValType::U32 }] });
        let narrow = ValType::Record(Record { fields: vec![Field { name: "a".into(), ty: ValType::Bool }] });
        assert!(subtype_valtype(&ctx, &wide, &narrow));
        assert!(!subtype_valtype(&ctx, &narrow, &wide));
    }

    #[test]
    fn variant_width_subtyping_allows_fewer_cases() {
        let ctx = Ctx::new();
        let narrow = ValType::Variant(Variant { cases: vec![Case { name: "a".into(), ty: None, refines: None }] });
        let wide = ValType::Variant(Variant {
            cases: vec![Case { name: "a".into(), ty: None, refines: None }, Case { name: "b".into(), ty: None, refines: None }],
        });
        assert!(subtype_valtype(&ctx, &narrow, &wide));
        assert!(!subtype_valtype(&ctx, &wide, &narrow));
    }

    #[test]
    fn distinct_uvars_report_the_spec_mismatch_message() {
        let mut ctx = Ctx::new();
        let u0 = ctx.push_uvar(Bound::Resource);
        let u1 = ctx.push_uvar(Bound::Resource);
        let a = DefType::Var(TypeVar::Uvar(u0));
        let b = DefType::Var(TypeVar::Uvar(u1));
        assert!(!subtype_deftype(&ctx, &a, &b));
        assert_eq!(uvar_subtype_mismatch(&ctx, &a, &b), Some("Type variable u0.0 is not u0.1".to_string()));
        assert_eq!(subtype_extern_desc_reason(&ctx, &ExternDesc::Type(a), &ExternDesc::Type(b)), Err("Type variable u0.0 is not u0.1".to_string()));
    }

    #[test]
    fn same_uvar_is_its_own_subtype() {
        let mut ctx = Ctx::new();
        let u0 = ctx.push_uvar(Bound::Resource);
        let a = DefType::Var(TypeVar::Uvar(u0));
        assert!(subtype_deftype(&ctx, &a, &a));
        assert_eq!(uvar_subtype_mismatch(&ctx, &a, &a), None);
    }

    #[test]
    fn func_subtyping_is_contravariant_in_params() {
        let ctx = Ctx::new();
        let wide_record = ValType::Record(Record { fields: vec![Field { name: "a".into(), ty: ValType::Bool }, Field { name: "b".into(), ty: ValType::U32 }] });
        let narrow_record = ValType::Record(Record { fields: vec![Field { name: "a".into(), ty: ValType::Bool }] });
        let accepts_narrow = FuncType { params: ParamList::Unnamed(Box::new(narrow_record)), result: ParamList::Named(vec![]) };
        let accepts_wide = FuncType { params: ParamList::Unnamed(Box::new(wide_record)), result: ParamList::Named(vec![]) };
        // A function that accepts the wider record works anywhere one accepting
        // only the narrower record is expected, so it is the subtype.
        assert!(subtype_functype(&ctx, &accepts_wide, &accepts_narrow));
        assert!(!subtype_functype(&ctx, &accepts_narrow, &accepts_wide));
    }
}
