//! Top-level fold over a component body (spec §4.10 "Component bodies"):
//! walk each definition in source order, threading the accumulating
//! [`Ctx`] through, and assemble the resulting [`ComponentType`].
//!
//! Grounded conceptually on `wrt-component/component.rs`'s
//! imports/exports/instances accumulation (`WrtComponentType`), but driven
//! here by the resolved [`crate::ir::Definition`] tree instead of a
//! decoded binary, and producing the binder-carrying `ComponentType` this
//! crate's algebra uses rather than a flat decoded record.

use tracing::{debug, instrument, warn};

use crate::{
    alias::{apply_alias, push_desc},
    canonical_abi::{check_lift_signature, lower_signature, resource_drop_signature, resource_new_signature, resource_rep_signature},
    config::Limits,
    context::{Ctx, Scope},
    core_types::{CoreExternDesc, CoreFuncType, CoreValidator},
    defs::{ComponentType, DefType, ExternDecl, ExternDesc, FuncType, InstanceType, ParamList},
    elaborate::elaborate_type_def,
    error::{Region, TypeError},
    exposure::{contains_bare_resource, uses_only_covered_uvars},
    instantiate::{instantiate, resolve_sort_desc},
    ir::{CanonDef, ComponentSortIdx, CoreDef, Definition, Spanned},
    linearity::{check_end_of_component, consume_instance_wholesale, consume_value},
    naming::check_unique,
    start::check_start,
};

/// Check an entire top-level component body with default [`Limits`],
/// returning the [`ComponentType`] it denotes from the outside.
#[instrument(skip(defs, validator))]
pub fn check_component(defs: &[Spanned<Definition>], validator: &dyn CoreValidator) -> Result<ComponentType, TypeError> {
    check_component_with_limits(defs, validator, &Limits::default())
}

/// Check an entire top-level component body, enforcing `limits` (in
/// particular the maximum component-nesting depth).
pub fn check_component_with_limits(defs: &[Spanned<Definition>], validator: &dyn CoreValidator, limits: &Limits) -> Result<ComponentType, TypeError> {
    let mut root = Scope::root();
    fold_body(&mut root, defs, validator, limits, 0)
}

fn deftype_to_extern_desc(dt: DefType) -> ExternDesc {
    match dt {
        DefType::Func(ft) => ExternDesc::Func(ft),
        DefType::Value(vt) => ExternDesc::Value(vt),
        DefType::Component(ct) => ExternDesc::Component(*ct),
        DefType::Instance(it) => ExternDesc::Instance(*it),
        other => ExternDesc::Type(other),
    }
}

fn fold_body(scope: &mut Scope, defs: &[Spanned<Definition>], validator: &dyn CoreValidator, limits: &Limits, depth: usize) -> Result<ComponentType, TypeError> {
    if depth > limits.max_nesting_depth {
        return Err(TypeError::invalid(Region::SYNTHETIC, format!("component nesting depth exceeds the configured limit of {}", limits.max_nesting_depth)));
    }

    let mut imports: Vec<ExternDecl> = Vec::new();
    let mut exports: Vec<ExternDecl> = Vec::new();

    for Spanned { node, region } in defs {
        let region = *region;
        match node {
            Definition::Core(core_def) => fold_core_def(&mut scope.ctx, core_def, validator, region)?,

            Definition::Component(nested) => {
                let child_ct = {
                    let mut child = scope.child();
                    fold_body(&mut child, nested, validator, limits, depth + 1)?
                };
                scope.ctx.push_component(child_ct);
            }

            Definition::Instantiate { component_idx, args } => {
                let component = scope
                    .ctx
                    .components
                    .get(*component_idx as usize)
                    .cloned()
                    .ok_or_else(|| TypeError::internal(region, format!("component index {component_idx} out of range")))?;
                consume_instantiate_args(&mut scope.ctx, args, region)?;
                let it = instantiate(&scope.ctx, &component, args, region)?;
                scope.ctx.push_instance(it);
            }

            Definition::InlineInstance(items) => {
                let names: Vec<_> = items.iter().map(|(n, _)| n).collect();
                check_unique(names.into_iter(), region)?;
                let mut decls = Vec::with_capacity(items.len());
                for (name, idx) in items {
                    let desc = resolve_sort_desc(&scope.ctx, *idx)?;
                    decls.push(ExternDecl { name: name.clone(), desc });
                }
                consume_instantiate_args(&mut scope.ctx, items, region)?;
                scope.ctx.push_instance(InstanceType { evars: Vec::new(), exports: decls });
            }

            Definition::Alias(alias_def) => {
                apply_alias(scope, alias_def, region)?;
            }

            Definition::Type(expr) => {
                let dt = elaborate_type_def(&mut scope.ctx, expr, region)?;
                scope.ctx.push_type(dt);
            }

            Definition::Canon(canon_def) => fold_canon_def(&mut scope.ctx, canon_def, region)?,

            Definition::Start(start_def) => check_start(&mut scope.ctx, start_def, region)?,

            Definition::Import { name, ty } => {
                let dt = elaborate_type_def(&mut scope.ctx, ty, region)?;
                let desc = deftype_to_extern_desc(dt);
                push_desc(&mut scope.ctx, desc.clone());
                imports.push(ExternDecl { name: name.clone(), desc });
            }

            Definition::Export { name, item, ascribed } => {
                let actual = resolve_sort_desc(&scope.ctx, *item)?;
                consume_export_item(&mut scope.ctx, *item, region)?;
                let desc = match ascribed {
                    Some(expr) => {
                        let ascribed_dt = elaborate_type_def(&mut scope.ctx, expr, region)?;
                        let ascribed_desc = deftype_to_extern_desc(ascribed_dt);
                        if let Err(reason) = crate::subtype::subtype_extern_desc_reason(&scope.ctx, &actual, &ascribed_desc) {
                            return Err(TypeError::invalid(region, format!("export `{name}` does not match its ascribed type: {reason}")));
                        }
                        ascribed_desc
                    }
                    None => actual,
                };
                // Exportability check (spec §4.9, invariant I4, §8 S1): a
                // top-level export may not smuggle out a bare local resource
                // identity that wasn't itself exported abstractly — the
                // `sub resource` ascription path above replaces any bare
                // `DT_resource_type` with a fresh evar before we get here, so
                // anything still bare at this point is a genuine leak.
                if contains_bare_resource(&desc) {
                    return Err(TypeError::invalid(region, "Cannot export type containing bare resource type"));
                }
                exports.push(ExternDecl { name: name.clone(), desc });
            }
        }
    }

    check_unique(imports.iter().map(|d| &d.name), Region::SYNTHETIC)?;
    check_unique(exports.iter().map(|d| &d.name), Region::SYNTHETIC)?;
    check_end_of_component(&scope.ctx, Region::SYNTHETIC)?;

    // Closure check (spec §4.9, §8 S2): nothing this component body imports
    // or exports may mention a uvar that isn't one of its own — a foreign
    // uvar can only have gotten in through an `alias outer` of a compound
    // (instance/component/func) descriptor that happened to embed one
    // (`alias outer` of a bare type variable is rejected directly in
    // `alias.rs`).
    let uvar_count = scope.ctx.uvars.len() as u32;
    if let Some(decl) = imports.iter().chain(exports.iter()).find(|d| !uses_only_covered_uvars(&d.desc, uvar_count)) {
        return Err(TypeError::invalid(Region::SYNTHETIC, format!("Component type may not refer to non-imported uvar (at `{}`)", decl.name)));
    }

    debug!(imports = imports.len(), exports = exports.len(), uvars = scope.ctx.uvars.len(), evars = scope.ctx.evars.len(), "folded component body");

    let uvars = scope.ctx.uvars.iter().cloned().map(|bound| crate::vars::Binder { bound }).collect();
    let evars = scope.ctx.evars.iter().cloned().map(|bound| crate::vars::Binder { bound }).collect();
    Ok(ComponentType { uvars, imports, instance: InstanceType { evars, exports } })
}

fn consume_instantiate_args(ctx: &mut Ctx, args: &[(crate::externs::ExternName, ComponentSortIdx)], region: Region) -> Result<(), TypeError> {
    for (_, idx) in args {
        match idx {
            ComponentSortIdx::Value(i) => consume_value(ctx, *i, region)?,
            ComponentSortIdx::Instance(i) => consume_instance_wholesale(ctx, *i, region)?,
            _ => {}
        }
    }
    Ok(())
}

fn consume_export_item(ctx: &mut Ctx, item: ComponentSortIdx, region: Region) -> Result<(), TypeError> {
    match item {
        ComponentSortIdx::Value(i) => consume_value(ctx, i, region),
        ComponentSortIdx::Instance(i) => consume_instance_wholesale(ctx, i, region),
        _ => Ok(()),
    }
}

fn fold_core_def(ctx: &mut Ctx, def: &CoreDef, validator: &dyn CoreValidator, region: Region) -> Result<(), TypeError> {
    match def {
        CoreDef::Module { module_id } => {
            let mt = validator.validate_module(*module_id).map_err(|msg| TypeError::invalid(region, format!("core module validation failed: {msg}")))?;
            ctx.push_core_module(mt);
            Ok(())
        }
        CoreDef::Instantiate { module_idx, args } => {
            let module = ctx
                .core_modules
                .get(*module_idx as usize)
                .cloned()
                .ok_or_else(|| TypeError::internal(region, format!("core module index {module_idx} out of range")))?;
            for (name, arg) in args {
                let crate::ir::CoreInstantiateArg::Instance(inst_idx) = arg;
                let provided = ctx
                    .core_instances
                    .get(*inst_idx as usize)
                    .cloned()
                    .ok_or_else(|| TypeError::internal(region, format!("core instance index {inst_idx} out of range")))?;
                // A core module's two-level import namespace groups every
                // `(module_name, field_name, desc)` entry sharing `name`
                // into the one instance the `with` clause must satisfy.
                let expected_exports: Vec<(String, CoreExternDesc)> =
                    module.imports.iter().filter(|(m, _, _)| m == name).map(|(_, n, d)| (n.clone(), d.clone())).collect();
                if expected_exports.is_empty() {
                    return Err(TypeError::invalid(region, format!("core module has no import named `{name}`")));
                }
                let expected = crate::core_types::CoreInstanceType { exports: expected_exports };
                if !crate::core_types::instance_type_subtype(&provided, &expected) {
                    return Err(TypeError::invalid(region, format!("instance argument for `{name}` does not satisfy the core module's import requirements")));
                }
            }
            ctx.push_core_instance(module.instance.clone());
            Ok(())
        }
        CoreDef::InlineExports(items) => {
            let exports = items
                .iter()
                .map(|(name, sort)| {
                    let desc = match sort {
                        crate::ir::CoreSortIdx::Func(i) => ctx.core_funcs.get(*i as usize).cloned().map(CoreExternDesc::Func),
                        crate::ir::CoreSortIdx::Table(i) => ctx.core_tables.get(*i as usize).copied().map(CoreExternDesc::Table),
                        crate::ir::CoreSortIdx::Memory(i) => ctx.core_mems.get(*i as usize).copied().map(CoreExternDesc::Memory),
                        crate::ir::CoreSortIdx::Global(i) => ctx.core_globals.get(*i as usize).copied().map(CoreExternDesc::Global),
                        crate::ir::CoreSortIdx::Type(_) => Some(CoreExternDesc::Type),
                    };
                    desc.map(|d| (name.clone(), d)).ok_or_else(|| TypeError::internal(region, "core sort index out of range"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            ctx.push_core_instance(crate::core_types::CoreInstanceType { exports });
            Ok(())
        }
        CoreDef::AliasExport { instance_idx, name, kind } => {
            let desc = crate::alias::alias_core_export(ctx, *instance_idx, name, region)?;
            let _ = kind;
            match desc {
                CoreExternDesc::Func(ft) => {
                    ctx.push_core_func(ft);
                }
                CoreExternDesc::Table(tt) => {
                    ctx.push_core_table(tt);
                }
                CoreExternDesc::Memory(mt) => {
                    ctx.push_core_mem(mt);
                }
                CoreExternDesc::Global(gt) => {
                    ctx.push_core_global(gt);
                }
                CoreExternDesc::Module(mt) => {
                    ctx.push_core_module(*mt);
                }
                CoreExternDesc::Instance(it) => {
                    ctx.push_core_instance(*it);
                }
                CoreExternDesc::Type => {}
            }
            Ok(())
        }
    }
}

fn fold_canon_def(ctx: &mut Ctx, def: &CanonDef, region: Region) -> Result<(), TypeError> {
    match def {
        CanonDef::Lift { core_func_idx, func_type, opts } => {
            let core_ty = ctx
                .core_funcs
                .get(*core_func_idx as usize)
                .cloned()
                .ok_or_else(|| TypeError::internal(region, format!("core function index {core_func_idx} out of range")))?;
            check_lift_signature(&core_ty, func_type, region)?;
            if opts.memory_idx.is_some() && opts.realloc_idx.is_none() {
                warn!("canon lift supplies a memory option without realloc; accepted conservatively");
            }
            ctx.push_func(func_type.clone());
            Ok(())
        }
        CanonDef::Lower { func_idx, opts } => {
            let func_type = ctx
                .funcs
                .get(*func_idx as usize)
                .cloned()
                .ok_or_else(|| TypeError::internal(region, format!("function index {func_idx} out of range")))?;
            let _ = opts;
            let core_ty: CoreFuncType = lower_signature(&func_type);
            ctx.push_core_func(core_ty);
            Ok(())
        }
        CanonDef::ResourceNew { resource_type_idx } => {
            require_resource_type(ctx, *resource_type_idx, region)?;
            let ft = core_func_as_func(resource_new_signature());
            ctx.push_func(ft);
            Ok(())
        }
        CanonDef::ResourceDrop { resource_type_idx } => {
            require_resource_type(ctx, *resource_type_idx, region)?;
            let ft = core_func_as_func(resource_drop_signature());
            ctx.push_func(ft);
            Ok(())
        }
        CanonDef::ResourceRep { resource_type_idx } => {
            require_resource_type(ctx, *resource_type_idx, region)?;
            let ft = core_func_as_func(resource_rep_signature());
            ctx.push_func(ft);
            Ok(())
        }
    }
}

fn require_resource_type(ctx: &Ctx, type_idx: u32, region: Region) -> Result<(), TypeError> {
    match ctx.types.get(type_idx as usize) {
        Some(DefType::Resource(_)) => Ok(()),
        Some(DefType::Var(v)) if matches!(v, crate::vars::TypeVar::Uvar(_) | crate::vars::TypeVar::Evar { .. }) => Ok(()),
        _ => Err(TypeError::invalid(region, format!("type index {type_idx} is not a resource type"))),
    }
}

fn core_func_as_func(cf: CoreFuncType) -> FuncType {
    use crate::value_types::ValType;
    let to_val = |v: &crate::core_types::CoreValType| match v {
        crate::core_types::CoreValType::I32 => ValType::U32,
        crate::core_types::CoreValType::I64 => ValType::U64,
        crate::core_types::CoreValType::F32 => ValType::F32,
        crate::core_types::CoreValType::F64 => ValType::F64,
    };
    FuncType {
        params: ParamList::Named(cf.params.iter().enumerate().map(|(i, t)| (format!("p{i}"), to_val(t))).collect()),
        result: ParamList::Named(cf.results.iter().enumerate().map(|(i, t)| (format!("r{i}"), to_val(t))).collect()),
    }
}
