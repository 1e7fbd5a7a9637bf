//! Alias resolution (spec §4.8 "Aliases"): `alias outer`, `alias export`,
//! `alias core export`.
//!
//! An alias never creates a new definition; it copies an existing one
//! (from an ancestor component's context, or from an instance's export
//! list) into the current context under a fresh local index, so everything
//! downstream can keep referring to definitions purely by index.

use crate::{
    context::{Ctx, Scope, Sort},
    core_types::CoreExternDesc,
    defs::ExternDesc,
    error::{Region, TypeError},
    ir::{AliasDef, AliasKind},
};

/// Resolve `alias outer $depth $idx (kind)`: read a definition out of an
/// ancestor context (spec §9: "an `outer` alias may only read a sort
/// already defined in the lexically enclosing component body at the time
/// this nested component began elaboration").
pub fn alias_outer(scope: &Scope, depth: u32, idx: u32, kind: AliasKind, region: Region) -> Result<ExternDescOrSort, TypeError> {
    let ctx = scope
        .ancestor(depth)
        .ok_or_else(|| TypeError::invalid(region, format!("alias outer depth {depth} exceeds the component nesting depth")))?;
    if kind == AliasKind::Type {
        // spec §4.9, §8 S2: "Outer alias may not refer to type variable" —
        // an ancestor's abstract import/export (a bare `uvar`/`evar`
        // reference) is not a stable cross-component reference; only a
        // concrete type definition may be aliased this way.
        let dt = ctx.types.get(idx as usize).ok_or_else(|| TypeError::internal(region, format!("alias outer index {idx} out of range for the requested sort")))?;
        if matches!(dt, crate::defs::DefType::Var(_)) {
            return Err(TypeError::invalid(region, "Outer alias may not refer to type variable"));
        }
        return Ok(ExternDescOrSort::Desc(ExternDesc::Type(dt.clone())));
    }
    match kind {
        AliasKind::Func => ctx.funcs.get(idx as usize).cloned().map(ExternDesc::Func).map(ExternDescOrSort::Desc),
        AliasKind::Value => Err(TypeError::invalid(region, "alias outer may not target a value (values are not stable across component boundaries)")),
        AliasKind::Type => unreachable!("handled above"),
        AliasKind::Instance => ctx.instances.get(idx as usize).map(|s| s.ty.clone()).map(ExternDesc::Instance).map(ExternDescOrSort::Desc),
        AliasKind::Component => ctx.components.get(idx as usize).cloned().map(ExternDesc::Component).map(ExternDescOrSort::Desc),
    }
    .ok_or_else(|| TypeError::internal(region, format!("alias outer index {idx} out of range for the requested sort")))
}

/// What an alias resolves to before it is pushed back into the current
/// context — a component-level desc, or (for `alias core export`) a core
/// extern desc.
pub enum ExternDescOrSort {
    Desc(ExternDesc),
    Core(CoreExternDesc),
}

/// Resolve `alias export $instance "name" (kind)`: look an export up by
/// name in an already-instantiated instance's type, marking it dead per
/// the same linearity rule as any other read of an instance export
/// (spec §3 "Lifecycle").
pub fn alias_export(ctx: &mut Ctx, instance_idx: u32, name: &crate::externs::ExternName, region: Region) -> Result<ExternDesc, TypeError> {
    let slot = ctx
        .instances
        .get(instance_idx as usize)
        .ok_or_else(|| TypeError::internal(region, format!("instance index {instance_idx} out of range")))?;
    let (export_idx, desc) = slot
        .ty
        .exports
        .iter()
        .enumerate()
        .find(|(_, d)| &d.name == name)
        .map(|(i, d)| (i, d.desc.clone()))
        .ok_or_else(|| TypeError::invalid(region, format!("instance has no export named `{name}`")))?;
    if !slot.export_alive[export_idx] {
        return Err(TypeError::invalid(region, format!("export `{name}` has already been consumed")));
    }
    Ok(desc)
}

/// Resolve `alias core export $instance "name" (kind)` against a core
/// instance's type (the oracle-validated shape from `core_types.rs`).
pub fn alias_core_export(ctx: &Ctx, instance_idx: u32, name: &str, region: Region) -> Result<CoreExternDesc, TypeError> {
    let inst = ctx
        .core_instances
        .get(instance_idx as usize)
        .ok_or_else(|| TypeError::internal(region, format!("core instance index {instance_idx} out of range")))?;
    inst.exports
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, d)| d.clone())
        .ok_or_else(|| TypeError::invalid(region, format!("core instance has no export named `{name}`")))
}

/// Apply an [`AliasDef`] against the current context, returning the
/// [`Sort`] the newly-introduced local slot landed at.
pub fn apply_alias(scope: &mut Scope, def: &AliasDef, region: Region) -> Result<Sort, TypeError> {
    match def {
        AliasDef::Outer { depth, idx, kind } => match alias_outer(scope, *depth, *idx, *kind, region)? {
            ExternDescOrSort::Desc(desc) => Ok(push_desc(&mut scope.ctx, desc)),
            ExternDescOrSort::Core(_) => unreachable!("alias outer never yields a core desc"),
        },
        AliasDef::Export { instance_idx, name, .. } => {
            let desc = alias_export(&mut scope.ctx, *instance_idx, name, region)?;
            Ok(push_desc(&mut scope.ctx, desc))
        }
        AliasDef::CoreExport { instance_idx, name, .. } => {
            let desc = alias_core_export(&scope.ctx, *instance_idx, name, region)?;
            Ok(push_core_desc(&mut scope.ctx, desc))
        }
    }
}

pub(crate) fn push_desc(ctx: &mut Ctx, desc: ExternDesc) -> Sort {
    match desc {
        ExternDesc::Func(ft) => Sort::Func(ctx.push_func(ft)),
        ExternDesc::Value(vt) => Sort::Value(ctx.push_value(vt)),
        ExternDesc::Type(dt) => Sort::Type(ctx.push_type(dt)),
        ExternDesc::Instance(it) => Sort::Instance(ctx.push_instance(it)),
        ExternDesc::Component(ct) => Sort::Component(ctx.push_component(ct)),
        ExternDesc::CoreModule(mt) => Sort::CoreModule(ctx.push_core_module(mt)),
    }
}

fn push_core_desc(ctx: &mut Ctx, desc: CoreExternDesc) -> Sort {
    match desc {
        CoreExternDesc::Func(ft) => Sort::CoreFunc(ctx.push_core_func(ft)),
        CoreExternDesc::Table(tt) => Sort::CoreTable(ctx.push_core_table(tt)),
        CoreExternDesc::Memory(mt) => Sort::CoreMemory(ctx.push_core_mem(mt)),
        CoreExternDesc::Global(gt) => Sort::CoreGlobal(ctx.push_core_global(gt)),
        CoreExternDesc::Module(mt) => Sort::CoreModule(ctx.push_core_module(*mt)),
        CoreExternDesc::Instance(it) => Sort::CoreInstance(ctx.push_core_instance(*it)),
        CoreExternDesc::Type => Sort::CoreType(ctx.push_core_type(CoreExternDesc::Type)),
    }
}
