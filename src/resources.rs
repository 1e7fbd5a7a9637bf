//! Resource type identity (spec §3 "Resource types", §4.1 "Resource
//! export/import identity").
//!
//! Grounded on `wrt-component/generative_types.rs`'s `GenerativeTypeRegistry`
//! (fresh `AtomicU32`-counted identities, `BoundKind::{Eq,Sub}` bounds on
//! those identities) but collapsed to the pure type-level question this
//! checker answers: two resource types are related only when they carry the
//! identical generative [`ResourceId`] minted by [`crate::context::Ctx::mint_resource`]
//! — there is no runtime handle table here, just identity comparison and
//! destructor-signature shape checking.

use crate::{
    defs::{FuncType, ParamList, ResourceType},
    error::{Region, TypeError},
    ids::ResourceId,
};

/// Resource types are nominal, not structural: `r1 <: r2` iff they share the
/// same minted identity (spec §4.1: "two resource types are related only
/// when equal, as Res(i) <: Res(i) and never Res(i) <: Res(j) for i != j").
pub fn resource_subtype(a: ResourceId, b: ResourceId) -> bool {
    a == b
}

/// A resource destructor must be a function of one parameter (the handle's
/// representation type is irrelevant to the checker, which treats the
/// destructor purely as a zero-result, one-param core function) and no
/// results (spec §4.6 "Resource built-ins": `resource.drop` calls the
/// destructor and discards any return value, so the destructor itself must
/// not produce one).
pub fn check_destructor_shape(ty: &FuncType, region: Region) -> Result<(), TypeError> {
    if ty.params.len() != 1 {
        return Err(TypeError::invalid(
            region,
            format!("resource destructor must take exactly one parameter, found {}", ty.params.len()),
        ));
    }
    if !ty.result.is_empty() {
        return Err(TypeError::invalid(region, "resource destructor must not return a value"));
    }
    Ok(())
}

/// Build the function type a destructor is required to have, given the
/// (irrelevant, but documented for symmetry with the rest of the checker)
/// representation type of handles into this resource.
pub fn destructor_signature() -> FuncType {
    FuncType {
        params: ParamList::Unnamed(Box::new(crate::value_types::ValType::U32)),
        result: ParamList::Named(Vec::new()),
    }
}

/// A freshly-minted resource, bundled with the region it was declared at —
/// used by `wf.rs`/`elaborate.rs` to report export-position violations
/// (spec §4.1: "a resource type may be exported only together with, or
/// after, its defining declaration").
#[derive(Debug, Clone, Copy)]
pub struct ResourceDecl {
    pub ty: ResourceType,
    pub region: Region,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_identity_subtypes() {
        assert!(resource_subtype(ResourceId(3), ResourceId(3)));
    }

    #[test]
    fn distinct_identity_does_not_subtype() {
        assert!(!resource_subtype(ResourceId(3), ResourceId(4)));
    }

    #[test]
    fn destructor_shape_rejects_results() {
        let bad = FuncType {
            params: ParamList::Unnamed(Box::new(crate::value_types::ValType::U32)),
            result: ParamList::Unnamed(Box::new(crate::value_types::ValType::Bool)),
        };
        assert!(check_destructor_shape(&bad, Region::SYNTHETIC).is_err());
    }

    #[test]
    fn destructor_shape_accepts_one_param_no_result() {
        assert!(check_destructor_shape(&destructor_signature(), Region::SYNTHETIC).is_ok());
    }
}
