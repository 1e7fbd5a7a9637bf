//! Crate-wide re-exports for the types call sites reach for most often.

pub use crate::{
    context::Ctx,
    defs::{ComponentType, DefType, ExternDecl, ExternDesc, FuncType, InstanceType, ResourceType},
    error::{Category, Region, Result, TypeError},
    externs::ExternName,
    ids::{InstanceId, ResourceId, ValueId},
    value_types::ValType,
    vars::{Bound, TypeVar},
};
