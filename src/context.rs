//! The definition context (spec §3 "Context (`ctx`)", §4.5 "Context
//! machinery").
//!
//! Grounded conceptually on `wrt-component`'s various registries
//! (`GenerativeTypeRegistry`, `ResourceTable`, `ComponentInstance`'s
//! imports/exports/functions lists) collapsed into the single immutable,
//! thread-through record spec §9 calls for: "Implement the context as an
//! immutable record updated per definition, not as shared mutable state;
//! failed checks discard the half-built update." Each `push_*`/`mark_*`
//! method takes `&mut self` and is only ever called after every check for
//! that definition has already succeeded, so a failing definition never
//! leaves a partial update behind (the caller simply drops the in-progress
//! `Ctx` clone on error — see `driver.rs`).

use crate::{
    core_types::{CoreExternDesc, CoreFuncType, CoreGlobalType, CoreInstanceType, CoreMemType, CoreModuleType, CoreTableType},
    defs::{ComponentType, DefType, FuncType, InstanceType, ResourceType},
    ids::ResourceId,
    value_types::ValType,
    vars::Bound,
};

/// A value slot: its type, and whether it is still live (spec §3
/// "Lifecycle", invariant I6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSlot {
    pub ty: ValType,
    pub alive: bool,
}

/// An instance slot: its type, and a per-export liveness vector mirroring
/// `ty.exports` (spec §3 "Lifecycle": "Instance-export slots are created
/// live when the instance is introduced").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSlot {
    pub ty: InstanceType,
    pub export_alive: Vec<bool>,
}

impl InstanceSlot {
    pub fn new(ty: InstanceType) -> Self {
        let n = ty.exports.len();
        InstanceSlot { ty, export_alive: vec![true; n] }
    }

    pub fn any_live(&self) -> bool {
        self.export_alive.iter().any(|&a| a)
    }
}

/// The accumulating definition context threaded through a single
/// component's fold (spec §3 "Context").
#[derive(Debug, Clone, Default)]
pub struct Ctx {
    // --- core sub-context ---
    pub core_modules: Vec<CoreModuleType>,
    pub core_instances: Vec<CoreInstanceType>,
    pub core_funcs: Vec<CoreFuncType>,
    pub core_tables: Vec<CoreTableType>,
    pub core_mems: Vec<CoreMemType>,
    pub core_globals: Vec<CoreGlobalType>,
    pub core_types: Vec<CoreExternDesc>,

    // --- component-level context ---
    pub components: Vec<ComponentType>,
    pub instances: Vec<InstanceSlot>,
    pub funcs: Vec<FuncType>,
    pub values: Vec<ValueSlot>,
    pub types: Vec<DefType>,
    pub rtypes: Vec<ResourceType>,
    pub uvars: Vec<Bound>,
    pub evars: Vec<Bound>,

    /// Whether a type exported from this context may still mention a uvar
    /// (true only while elaborating the *inside* of an abstract component
    /// type itself, i.e. import-position checking; false for the top-level
    /// driver's own component body, where invariant I4 applies in full).
    pub allow_uvar_in_export: bool,

    /// Whether this component body has already declared a `start`
    /// definition (spec §4.7: "at most one `start` per component body").
    pub has_start: bool,
}

impl Ctx {
    pub fn new() -> Self {
        Ctx::default()
    }

    // -- pushes, called only after all checks for a definition passed --

    pub fn push_core_module(&mut self, ty: CoreModuleType) -> u32 {
        self.core_modules.push(ty);
        (self.core_modules.len() - 1) as u32
    }

    pub fn push_core_instance(&mut self, ty: CoreInstanceType) -> u32 {
        self.core_instances.push(ty);
        (self.core_instances.len() - 1) as u32
    }

    pub fn push_core_func(&mut self, ty: CoreFuncType) -> u32 {
        self.core_funcs.push(ty);
        (self.core_funcs.len() - 1) as u32
    }

    pub fn push_core_table(&mut self, ty: CoreTableType) -> u32 {
        self.core_tables.push(ty);
        (self.core_tables.len() - 1) as u32
    }

    pub fn push_core_mem(&mut self, ty: CoreMemType) -> u32 {
        self.core_mems.push(ty);
        (self.core_mems.len() - 1) as u32
    }

    pub fn push_core_global(&mut self, ty: CoreGlobalType) -> u32 {
        self.core_globals.push(ty);
        (self.core_globals.len() - 1) as u32
    }

    pub fn push_component(&mut self, ty: ComponentType) -> u32 {
        self.components.push(ty);
        (self.components.len() - 1) as u32
    }

    pub fn push_instance(&mut self, ty: InstanceType) -> u32 {
        self.instances.push(InstanceSlot::new(ty));
        (self.instances.len() - 1) as u32
    }

    pub fn push_func(&mut self, ty: FuncType) -> u32 {
        self.funcs.push(ty);
        (self.funcs.len() - 1) as u32
    }

    pub fn push_value(&mut self, ty: ValType) -> u32 {
        self.values.push(ValueSlot { ty, alive: true });
        (self.values.len() - 1) as u32
    }

    pub fn push_type(&mut self, ty: DefType) -> u32 {
        self.types.push(ty);
        (self.types.len() - 1) as u32
    }

    /// Record a core `type` export's descriptor (spec §3 "Core sorts":
    /// `type` is one of the core sorts an `alias core export`/inline-export
    /// may target). This engine never interprets a core type descriptor
    /// further — it is the oracle's concern — but the slot must still exist
    /// so a later core-level reference to it resolves to something real
    /// rather than a fabricated index into an unrelated sort's table.
    pub fn push_core_type(&mut self, desc: CoreExternDesc) -> u32 {
        self.core_types.push(desc);
        (self.core_types.len() - 1) as u32
    }

    /// Mint a fresh generative resource identity (spec §3 "Resource types").
    pub fn mint_resource(&mut self, destructor: Option<u32>) -> ResourceId {
        let id = ResourceId(self.rtypes.len() as u32);
        self.rtypes.push(ResourceType { id, destructor });
        id
    }

    pub fn push_uvar(&mut self, bound: Bound) -> u32 {
        self.uvars.push(bound);
        (self.uvars.len() - 1) as u32
    }

    pub fn push_evar(&mut self, bound: Bound) -> u32 {
        self.evars.push(bound);
        (self.evars.len() - 1) as u32
    }

    // -- linearity --

    pub fn mark_value_dead(&mut self, idx: u32) {
        self.values[idx as usize].alive = false;
    }

    pub fn mark_instance_export_dead(&mut self, instance_idx: u32, export_idx: u32) {
        self.instances[instance_idx as usize].export_alive[export_idx as usize] = false;
    }

    /// Mark every export of an instance dead at once — used when the whole
    /// instance flows into an instantiate-arg (spec §3 "Lifecycle": "when
    /// the instance is used as an instantiate-arg its exports become
    /// dead").
    pub fn mark_instance_fully_dead(&mut self, instance_idx: u32) {
        for alive in &mut self.instances[instance_idx as usize].export_alive {
            *alive = false;
        }
    }

    /// Invariant I6: no live value, no live instance-export remains.
    pub fn check_fully_dead(&self) -> Result<(), String> {
        if let Some((i, _)) = self.values.iter().enumerate().find(|(_, v)| v.alive) {
            return Err(format!("live value at end of component: value ${i}"));
        }
        if let Some((i, _)) = self.instances.iter().enumerate().find(|(_, inst)| inst.any_live()) {
            return Err(format!("live instance-export at end of component: instance ${i}"));
        }
        Ok(())
    }

    /// "Instance-to-context expansion": introduce an instance's exports
    /// into scope as if they were locally-defined component/func/value/type
    /// slots (spec §4.5 step 6, §4.8 aliases). Returns the indices of the
    /// newly introduced slots, one per export, in export order.
    pub fn expand_instance_exports(&mut self, instance_ty: &InstanceType) -> Vec<Sort> {
        let mut introduced = Vec::with_capacity(instance_ty.exports.len());
        for decl in &instance_ty.exports {
            let sort = match &decl.desc {
                crate::defs::ExternDesc::Func(ft) => Sort::Func(self.push_func(ft.clone())),
                crate::defs::ExternDesc::Value(vt) => Sort::Value(self.push_value(vt.clone())),
                crate::defs::ExternDesc::Type(dt) => Sort::Type(self.push_type(dt.clone())),
                crate::defs::ExternDesc::Instance(it) => Sort::Instance(self.push_instance(it.clone())),
                crate::defs::ExternDesc::Component(ct) => Sort::Component(self.push_component(ct.clone())),
                crate::defs::ExternDesc::CoreModule(mt) => Sort::CoreModule(self.push_core_module(mt.clone())),
            };
            introduced.push(sort);
        }
        introduced
    }
}

/// The component-sort index a just-introduced slot landed at, used by
/// alias resolution and instance-export expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Func(u32),
    Value(u32),
    Type(u32),
    Instance(u32),
    Component(u32),
    CoreModule(u32),
    CoreFunc(u32),
    CoreInstance(u32),
    CoreTable(u32),
    CoreMemory(u32),
    CoreGlobal(u32),
    CoreType(u32),
}

/// A stack of contexts along the `outer`-alias parent chain (spec §4.8,
/// §9 "Cyclic references ... Instance-type exports ... indices internal to
/// the instance header"). The current (innermost) context is mutated in
/// place; ancestors are read-only snapshots taken at the point a nested
/// component began elaboration, matching how a nested component may only
/// *read* an enclosing definition as it stood then, never write one.
///
/// Ancestors are stored by value rather than by reference: each one is an
/// immutable snapshot (spec §9's "read-only from here" requirement), and
/// avoiding a borrowed parent chain keeps this type free of self-referential
/// lifetimes while a component is still being folded.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub ctx: Ctx,
    /// `ancestors[0]` is the immediate parent, `ancestors[1]` its parent,
    /// and so on.
    pub ancestors: Vec<Ctx>,
}

impl Scope {
    pub fn root() -> Self {
        Scope { ctx: Ctx::new(), ancestors: Vec::new() }
    }

    /// Begin a nested component's context, snapshotting `self.ctx` as the
    /// new scope's immediate parent.
    pub fn child(&self) -> Scope {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.push(self.ctx.clone());
        ancestors.extend(self.ancestors.iter().cloned());
        Scope { ctx: Ctx::new(), ancestors }
    }

    /// The context `depth` parents up the chain (0 = this scope's own
    /// context), for `alias outer $depth $idx`.
    pub fn ancestor(&self, depth: u32) -> Option<&Ctx> {
        if depth == 0 {
            Some(&self.ctx)
        } else {
            self.ancestors.get((depth - 1) as usize)
        }
    }
}
