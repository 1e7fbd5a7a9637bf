//! Core-Wasm type vocabulary and sorts (spec §3 "Core types", §3 "Sorts").
//!
//! The core-Wasm validator itself is out of scope (spec §1: "treated as a
//! trusted oracle returning a core module's import/export types"). This
//! module only defines the types that oracle hands back, plus the
//! [`CoreValidator`] trait an embedder implements to provide it.

use std::fmt;

/// A core Wasm numeric value type (spec §3: "parameter/result lists of
/// primitive numeric types").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreValType {
    I32,
    I64,
    F32,
    F64,
}

impl fmt::Display for CoreValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoreValType::I32 => "i32",
            CoreValType::I64 => "i64",
            CoreValType::F32 => "f32",
            CoreValType::F64 => "f64",
        };
        f.write_str(s)
    }
}

/// A core function type: flat lists of numeric params/results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CoreFuncType {
    pub params: Vec<CoreValType>,
    pub results: Vec<CoreValType>,
}

/// A core table type — delegated wholesale to the oracle; this engine only
/// ever compares two for subtyping (width: supertype's limits contained),
/// which is itself folded into the oracle via [`CoreValidator::table_subtype`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreTableType {
    pub min: u32,
    pub max: Option<u32>,
    pub element_is_func: bool,
}

/// A core linear memory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreMemType {
    pub min: u32,
    pub max: Option<u32>,
}

/// A core global type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreGlobalType {
    pub value: CoreValType,
    pub mutable: bool,
}

/// The "what it is" side of a core extern declaration, tagged by core sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CoreExternDesc {
    Func(CoreFuncType),
    Table(CoreTableType),
    Memory(CoreMemType),
    Global(CoreGlobalType),
    Type,
    Module(Box<CoreModuleType>),
    Instance(Box<CoreInstanceType>),
}

/// A core module type: an ordered list of named imports plus the resulting
/// instance type (spec §3: "core module types (list of import declarations
/// + an instance type)").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CoreModuleType {
    pub imports: Vec<(String, String, CoreExternDesc)>,
    pub instance: CoreInstanceType,
}

/// A core instance type: the set of a module instance's exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CoreInstanceType {
    pub exports: Vec<(String, CoreExternDesc)>,
}

/// The two universes of sort (spec §3 "Sorts").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreSort {
    Func,
    Table,
    Memory,
    Global,
    Type,
    Module,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSort {
    Func,
    Value,
    Type,
    Component,
    Instance,
}

/// A sort tag from either universe, the tagged wrapper spec §3 calls for:
/// "plus a tagged wrapper embedding any core sort".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Core(CoreSort),
    Component(ComponentSort),
}

/// The trusted oracle this engine delegates core-Wasm validation to.
///
/// An embedder (outside this crate's scope, per spec §1) supplies a real
/// implementation backed by an actual core-Wasm validator; this crate never
/// constructs module bytes or parses core sections itself.
pub trait CoreValidator {
    /// Validate and type a decoded core module, returning its module type.
    fn validate_module(&self, module_id: u32) -> Result<CoreModuleType, String>;

    /// Structural subtyping between two core extern descriptors, delegated
    /// wholesale to the core-Wasm type system (spec §4.4: "Core extern
    /// desc: delegated to the core-Wasm subtype relation").
    fn extern_desc_subtype(&self, sub: &CoreExternDesc, sup: &CoreExternDesc) -> bool {
        default_core_extern_subtype(sub, sup)
    }
}

/// A structural fallback used by [`CoreValidator::extern_desc_subtype`]'s
/// default and by tests that don't wire a real oracle: same-kind descs
/// compare by simple structural rules (func types by equality, tables/mems
/// by width subtyping, globals invariantly).
pub fn default_core_extern_subtype(sub: &CoreExternDesc, sup: &CoreExternDesc) -> bool {
    match (sub, sup) {
        (CoreExternDesc::Func(a), CoreExternDesc::Func(b)) => a == b,
        (CoreExternDesc::Table(a), CoreExternDesc::Table(b)) => {
            a.element_is_func == b.element_is_func
                && a.min >= b.min
                && match (a.max, b.max) {
                    (_, None) => true,
                    (Some(am), Some(bm)) => am <= bm,
                    (None, Some(_)) => false,
                }
        }
        (CoreExternDesc::Memory(a), CoreExternDesc::Memory(b)) => {
            a.min >= b.min
                && match (a.max, b.max) {
                    (_, None) => true,
                    (Some(am), Some(bm)) => am <= bm,
                    (None, Some(_)) => false,
                }
        }
        (CoreExternDesc::Global(a), CoreExternDesc::Global(b)) => a == b,
        (CoreExternDesc::Type, CoreExternDesc::Type) => true,
        (CoreExternDesc::Module(a), CoreExternDesc::Module(b)) => module_type_subtype(a, b),
        (CoreExternDesc::Instance(a), CoreExternDesc::Instance(b)) => instance_type_subtype(a, b),
        _ => false,
    }
}

fn module_type_subtype(sub: &CoreModuleType, sup: &CoreModuleType) -> bool {
    // Contravariant in imports (supertype may require no more than the
    // subtype does), covariant in the resulting instance type.
    sup.imports.iter().all(|(m, n, sup_desc)| {
        sub.imports
            .iter()
            .find(|(sm, sn, _)| sm == m && sn == n)
            .is_some_and(|(_, _, sub_desc)| default_core_extern_subtype(sub_desc, sup_desc))
    }) && instance_type_subtype(&sub.instance, &sup.instance)
}

/// Instance-type subtyping (spec §4.4 "Core extern desc"): `sub` is a
/// subtype of `sup` iff every one of `sup`'s exports is present in `sub`
/// under the same name and its descriptor is a subtype. Exposed (not just
/// an internal helper of [`default_core_extern_subtype`]) so callers that
/// already hold two [`CoreInstanceType`]s — e.g. a core-module
/// instantiation's declared import vs. the instance argument supplied for
/// it — can check them directly without round-tripping through
/// [`CoreExternDesc::Instance`].
pub fn instance_type_subtype(sub: &CoreInstanceType, sup: &CoreInstanceType) -> bool {
    sup.exports.iter().all(|(name, sup_desc)| {
        sub.exports
            .iter()
            .find(|(n, _)| n == name)
            .is_some_and(|(_, sub_desc)| default_core_extern_subtype(sub_desc, sup_desc))
    })
}
