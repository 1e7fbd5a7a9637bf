//! Linearity / generativity side-channel (spec §3 "Lifecycle", invariant
//! I6: "no value or instance-export may be used twice, and none may be
//! left live at the end of a component body").
//!
//! `context.rs` carries the actual liveness bits (`ValueSlot::alive`,
//! `InstanceSlot::export_alive`); this module is the narrow set of
//! entry points every other pass goes through to consume a slot, so the
//! "already consumed" check and its error message stay in one place
//! rather than being repeated at each call site.

use crate::{context::Ctx, error::{Region, TypeError}};

/// Consume a value slot, failing if it was already consumed.
pub fn consume_value(ctx: &mut Ctx, value_idx: u32, region: Region) -> Result<(), TypeError> {
    let slot = ctx
        .values
        .get(value_idx as usize)
        .ok_or_else(|| TypeError::internal(region, format!("value index {value_idx} out of range")))?;
    if !slot.alive {
        return Err(TypeError::invalid(region, format!("value ${value_idx} has already been consumed")));
    }
    ctx.mark_value_dead(value_idx);
    Ok(())
}

/// Consume a single named export of an instance, failing if it was
/// already consumed.
pub fn consume_instance_export(ctx: &mut Ctx, instance_idx: u32, export_idx: u32, region: Region) -> Result<(), TypeError> {
    let slot = ctx
        .instances
        .get(instance_idx as usize)
        .ok_or_else(|| TypeError::internal(region, format!("instance index {instance_idx} out of range")))?;
    if !slot.export_alive[export_idx as usize] {
        return Err(TypeError::invalid(region, format!("export {export_idx} of instance ${instance_idx} has already been consumed")));
    }
    ctx.mark_instance_export_dead(instance_idx, export_idx);
    Ok(())
}

/// Consume an entire instance at once — used when the instance itself
/// (rather than one of its individual exports) flows into an
/// instantiate-arg (spec §3: "passing an instance wholesale consumes all
/// of its exports").
pub fn consume_instance_wholesale(ctx: &mut Ctx, instance_idx: u32, region: Region) -> Result<(), TypeError> {
    let slot = ctx
        .instances
        .get(instance_idx as usize)
        .ok_or_else(|| TypeError::internal(region, format!("instance index {instance_idx} out of range")))?;
    if !slot.any_live() {
        return Err(TypeError::invalid(region, format!("instance ${instance_idx} has no live exports left to pass")));
    }
    ctx.mark_instance_fully_dead(instance_idx);
    Ok(())
}

/// Final invariant I6 check, run once after a component body's last
/// definition has been folded.
pub fn check_end_of_component(ctx: &Ctx, region: Region) -> Result<(), TypeError> {
    ctx.check_fully_dead().map_err(|msg| TypeError::invalid(region, msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::ValType;

    #[test]
    fn double_consume_is_rejected() {
        let mut ctx = Ctx::new();
        let idx = ctx.push_value(ValType::Bool);
        consume_value(&mut ctx, idx, Region::SYNTHETIC).unwrap();
        assert!(consume_value(&mut ctx, idx, Region::SYNTHETIC).is_err());
    }

    #[test]
    fn live_value_fails_end_of_component_check() {
        let mut ctx = Ctx::new();
        ctx.push_value(ValType::Bool);
        assert!(check_end_of_component(&ctx, Region::SYNTHETIC).is_err());
    }

    #[test]
    fn consumed_value_passes_end_of_component_check() {
        let mut ctx = Ctx::new();
        let idx = ctx.push_value(ValType::Bool);
        consume_value(&mut ctx, idx, Region::SYNTHETIC).unwrap();
        assert!(check_end_of_component(&ctx, Region::SYNTHETIC).is_ok());
    }
}
