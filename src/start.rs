//! `start` definition checking (spec §4.7 "Start definitions").
//!
//! A start function is invoked with a fixed set of already-in-scope value
//! slots and produces a fixed number of fresh ones; both ends are
//! linearity-significant, so this module is the one place value slots get
//! consumed (`ctx.mark_value_dead`) purely because of a `start`, as opposed
//! to because they were threaded into an instantiate-arg.

use crate::{context::Ctx, error::{Region, TypeError}, ir::StartDef, subtype::subtype_valtype};

/// Check a `start` definition against the context, consuming its argument
/// value slots and introducing fresh ones for its results.
pub fn check_start(ctx: &mut Ctx, def: &StartDef, region: Region) -> Result<(), TypeError> {
    if ctx.has_start {
        return Err(TypeError::invalid(region, "a component may declare at most one start definition"));
    }

    let func = ctx
        .funcs
        .get(def.func_idx as usize)
        .cloned()
        .ok_or_else(|| TypeError::internal(region, format!("start function index {} out of range", def.func_idx)))?;

    let expected_params = func.params.types();
    if expected_params.len() != def.args.len() {
        return Err(TypeError::invalid(
            region,
            format!("start function expects {} argument(s), found {}", expected_params.len(), def.args.len()),
        ));
    }

    for (expected, &value_idx) in expected_params.iter().zip(&def.args) {
        let slot = ctx
            .values
            .get(value_idx as usize)
            .ok_or_else(|| TypeError::internal(region, format!("start argument value index {value_idx} out of range")))?;
        if !slot.alive {
            return Err(TypeError::invalid(region, format!("start argument value ${value_idx} has already been consumed")));
        }
        if !subtype_valtype(ctx, &slot.ty, expected) {
            return Err(TypeError::invalid(region, format!("start argument value ${value_idx} does not match the expected parameter type")));
        }
    }

    let expected_results = func.result.types().len();
    if expected_results as u32 != def.result_count {
        return Err(TypeError::invalid(
            region,
            format!("start declares {} result value(s) but the function produces {expected_results}", def.result_count),
        ));
    }

    for &value_idx in &def.args {
        ctx.mark_value_dead(value_idx);
    }
    for ty in func.result.types() {
        ctx.push_value(ty.clone());
    }

    ctx.has_start = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        defs::{FuncType, ParamList},
        value_types::ValType,
    };

    #[test]
    fn start_consumes_args_and_produces_results() {
        let mut ctx = Ctx::new();
        let func_idx = ctx.push_func(FuncType {
            params: ParamList::Unnamed(Box::new(ValType::Bool)),
            result: ParamList::Unnamed(Box::new(ValType::U32)),
        });
        let value_idx = ctx.push_value(ValType::Bool);
        let def = StartDef { func_idx, args: vec![value_idx], result_count: 1 };

        check_start(&mut ctx, &def, Region::SYNTHETIC).unwrap();
        assert!(!ctx.values[value_idx as usize].alive);
        assert_eq!(ctx.values.len(), 2);
        assert!(ctx.has_start);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut ctx = Ctx::new();
        let func_idx = ctx.push_func(FuncType { params: ParamList::Named(vec![]), result: ParamList::Named(vec![]) });
        let def = StartDef { func_idx, args: vec![], result_count: 0 };
        check_start(&mut ctx, &def, Region::SYNTHETIC).unwrap();
        assert!(check_start(&mut ctx, &def, Region::SYNTHETIC).is_err());
    }
}
