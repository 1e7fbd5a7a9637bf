//! Canonical ABI type-level checks (spec §4.6 "Canonical ABI").
//!
//! This engine never lifts or lowers an actual value — that is
//! `wrt-component/src/canonical_abi/canonical_abi.rs`'s job, and it is
//! firmly a runtime (memory-marshaling) concern out of scope here. What
//! *is* in scope is the type-level question the canonical ABI definitions
//! raise before any byte is ever moved: does this value type's flattened
//! core representation fit the flattening caps, and does a `canon lift` /
//! `canon lower` / resource built-in's declared core signature match what
//! flattening the component-level type actually produces.

use crate::{
    core_types::{CoreFuncType, CoreValType},
    defs::{FuncType, ParamList},
    error::{Region, TypeError},
    value_types::ValType,
};

/// Component Model §canon: at most this many flattened core parameters
/// before falling back to a single linear-memory pointer parameter.
pub const MAX_FLAT_PARAMS: usize = 16;
/// At most this many flattened core results before falling back to an
/// out-pointer parameter instead of direct results.
pub const MAX_FLAT_RESULTS: usize = 1;

/// Flatten one value type into its core numeric representation. Compound
/// types flatten to one core value per leaf field/case-discriminant,
/// matching the Component Model's structural flattening rules; `string`
/// and `list` always flatten to a pointer/length pair (`i32 i32`) since
/// their storage is never inline.
pub fn flatten_valtype(vt: &ValType) -> Vec<CoreValType> {
    match vt {
        ValType::Bool | ValType::S8 | ValType::U8 | ValType::S16 | ValType::U16 | ValType::S32 | ValType::U32 | ValType::Char => {
            vec![CoreValType::I32]
        }
        ValType::S64 | ValType::U64 => vec![CoreValType::I64],
        ValType::F32 => vec![CoreValType::F32],
        ValType::F64 => vec![CoreValType::F64],
        ValType::String | ValType::List(_) => vec![CoreValType::I32, CoreValType::I32],
        ValType::Own(_) | ValType::Borrow(_) => vec![CoreValType::I32],
        ValType::Tuple(ts) => ts.iter().flat_map(flatten_valtype).collect(),
        ValType::Record(r) => r.fields.iter().flat_map(|f| flatten_valtype(&f.ty)).collect(),
        ValType::Option(t) => {
            let mut flat = vec![CoreValType::I32];
            flat.extend(flatten_valtype(t));
            flat
        }
        ValType::Result { ok, err } => {
            let mut merged: Vec<CoreValType> = Vec::new();
            if let Some(t) = ok {
                merged = merge_case_flats(merged, flatten_valtype(t));
            }
            if let Some(t) = err {
                merged = merge_case_flats(merged, flatten_valtype(t));
            }
            let mut flat = vec![CoreValType::I32];
            flat.extend(merged);
            flat
        }
        ValType::Variant(v) => {
            let mut merged: Vec<CoreValType> = Vec::new();
            for c in &v.cases {
                if let Some(t) = &c.ty {
                    merged = merge_case_flats(merged, flatten_valtype(t));
                }
            }
            let mut flat = vec![CoreValType::I32];
            flat.extend(merged);
            flat
        }
        ValType::Enum(_) | ValType::Flags(_) => vec![CoreValType::I32],
    }
}

/// Merge two cases' flattened payloads positionally (spec §4.6: variant
/// payloads share one overlaid set of flat slots, since only one case is
/// live at a time — width is the *widened max*, not the sum, of the
/// cases' widths). Slots present in only one case pass through unchanged;
/// slots present in both widen `i32`+`f32` to `i32`, anything else
/// mismatched to `i64`.
fn merge_case_flats(a: Vec<CoreValType>, b: Vec<CoreValType>) -> Vec<CoreValType> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| match (a.get(i), b.get(i)) {
            (Some(&x), Some(&y)) => merge_slot(x, y),
            (Some(&x), None) | (None, Some(&x)) => x,
            (None, None) => unreachable!("index bounded by max length"),
        })
        .collect()
}

fn merge_slot(a: CoreValType, b: CoreValType) -> CoreValType {
    if a == b {
        return a;
    }
    match (a, b) {
        (CoreValType::I32, CoreValType::F32) | (CoreValType::F32, CoreValType::I32) => CoreValType::I32,
        _ => CoreValType::I64,
    }
}

fn flatten_paramlist(p: &ParamList) -> Vec<CoreValType> {
    p.types().into_iter().flat_map(flatten_valtype).collect()
}

/// Flatten a component-level function type into the core function type the
/// canonical ABI requires, applying the parameter/result caps (falling
/// back to a single `i32` pointer when the flat form would overflow them).
///
/// `lift` selects where an overflowing result's pointer lands (spec §4.6:
/// "overflowing results become a single pointer i32 in params (lower) or
/// results (lift)"), and the two `canon` instructions pass it per spec
/// §4.6's own wiring: `canon lift` calls `flatten(f, lift=false)` (the
/// pointer joins the flattened *params*), `canon lower` calls `flatten(f,
/// lift=true)` (the pointer is the sole flattened *result*).
pub fn flatten_functype(ft: &FuncType, lift: bool) -> CoreFuncType {
    let flat_params = flatten_paramlist(&ft.params);
    let mut params = if flat_params.len() > MAX_FLAT_PARAMS { vec![CoreValType::I32] } else { flat_params };

    let flat_results = flatten_paramlist(&ft.result);
    let results = if flat_results.len() > MAX_FLAT_RESULTS {
        if lift {
            vec![CoreValType::I32]
        } else {
            params.push(CoreValType::I32);
            vec![]
        }
    } else {
        flat_results
    };

    CoreFuncType { params, results }
}

/// Check that `canon lift`'s declared core function signature matches what
/// flattening `func_type` actually produces (spec §4.6: "`canon lift`
/// requires the core function's signature equal the flattened component
/// function type"), using the `lift=false` flattening per spec §4.6's
/// `canon lift cf as f` wiring.
pub fn check_lift_signature(core_ty: &CoreFuncType, func_type: &FuncType, region: Region) -> Result<(), TypeError> {
    let expected = flatten_functype(func_type, false);
    if core_ty != &expected {
        return Err(TypeError::invalid(
            region,
            format!("canon lift core signature does not match the flattened component function type (expected {expected:?}, found {core_ty:?})"),
        ));
    }
    Ok(())
}

/// `canon lower` produces a core function whose signature is the
/// `lift=true` flattening of the given component function type, per spec
/// §4.6's `canon lower f as cf` wiring.
pub fn lower_signature(func_type: &FuncType) -> CoreFuncType {
    flatten_functype(func_type, true)
}

/// `resource.new`: core signature `(param <rep>) (result i32)` where
/// `<rep>` is always `i32` for this engine's purposes (the representation
/// type is an embedder choice out of scope here; only arity/shape matter).
pub fn resource_new_signature() -> CoreFuncType {
    CoreFuncType { params: vec![CoreValType::I32], results: vec![CoreValType::I32] }
}

/// `resource.drop`: core signature `(param i32)`, no result.
pub fn resource_drop_signature() -> CoreFuncType {
    CoreFuncType { params: vec![CoreValType::I32], results: vec![] }
}

/// `resource.rep`: core signature `(param i32) (result i32)`.
pub fn resource_rep_signature() -> CoreFuncType {
    CoreFuncType { params: vec![CoreValType::I32], results: vec![CoreValType::I32] }
}
