//! The resolved intermediate representation this engine consumes (spec §1,
//! §6 "External interfaces"): a tree of definitions already past surface
//! parsing and variable resolution. Every name has already been turned into
//! an index (`outer`-depth-qualified where it crosses a component
//! boundary); this engine never looks a name up by string except at an
//! explicit import/export boundary, where strong uniqueness is re-checked
//! (`naming.rs`).
//!
//! There is no teacher file to ground the shape of this IR on — the
//! teacher decodes straight from a binary instead of from a resolved
//! surface tree — so this is built directly from spec §6's description of
//! what a resolver/parser stage is expected to hand the checker.

use crate::{
    defs::{ComponentType, FuncType, InstanceType},
    error::Region,
    externs::ExternName,
    value_types::ValType,
    vars::Bound,
};

/// A node carrying the source region it was resolved from.
#[derive(Debug, Clone)]
pub struct Spanned<T> {
    pub node: T,
    pub region: Region,
}

impl<T> Spanned<T> {
    pub fn new(node: T, region: Region) -> Self {
        Spanned { node, region }
    }
}

/// A reference to an already-defined component-level type, or an inline
/// literal. Literals still need [`crate::elaborate`] to assign fresh
/// uvar/evar slots to any binders their header introduces.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `type_index i` — an already-elaborated type living in `ctx.types`.
    Defined(u32),
    Value(ValType),
    Func(FuncType),
    Component(Box<ComponentType>),
    Instance(Box<InstanceType>),
    /// `resource` with an optional destructor core-function index.
    Resource { destructor: Option<u32> },
    /// An `(import "t" (type <bound>))` that introduces a fresh abstract
    /// type the rest of the component body may refer to — becomes a
    /// `uvar` binder on the enclosing component's own type (spec §3
    /// "Type variables").
    AbstractImport(Bound),
    /// An `(export "t" (type (eq ...)))`-style export that hides its
    /// concrete definition behind a fresh existential — becomes an
    /// `evar` binder on the enclosing instance type.
    AbstractExport(Bound),
}

/// A core-level definition (spec §1: the embedded core validator handles
/// the module's own internals; this engine only records the resulting
/// module/instance/func types it hands back).
#[derive(Debug, Clone)]
pub enum CoreDef {
    /// `core module` — opaque bytes the oracle is asked to validate.
    Module { module_id: u32 },
    /// `core instance (instantiate $m (with ...))`.
    Instantiate { module_idx: u32, args: Vec<(String, CoreInstantiateArg)> },
    /// `core instance (export "name" (func|table|memory|global) ...)` —
    /// an inline instance built from existing core items.
    InlineExports(Vec<(String, CoreSortIdx)>),
    /// `core alias export $i "name" (kind)`.
    AliasExport { instance_idx: u32, name: String, kind: crate::core_types::CoreSort },
}

#[derive(Debug, Clone, Copy)]
pub enum CoreInstantiateArg {
    Instance(u32),
}

#[derive(Debug, Clone, Copy)]
pub enum CoreSortIdx {
    Func(u32),
    Table(u32),
    Memory(u32),
    Global(u32),
    Type(u32),
}

/// An instantiation argument at the component level: a named sort index
/// supplied to fill one of the callee's imports (spec §4.5).
#[derive(Debug, Clone, Copy)]
pub enum ComponentSortIdx {
    Func(u32),
    Value(u32),
    Type(u32),
    Instance(u32),
    Component(u32),
}

/// The canonical-ABI operations a `canon` definition can introduce (spec
/// §4.6).
#[derive(Debug, Clone)]
pub enum CanonDef {
    Lift { core_func_idx: u32, func_type: FuncType, opts: CanonOpts },
    Lower { func_idx: u32, opts: CanonOpts },
    ResourceNew { resource_type_idx: u32 },
    ResourceDrop { resource_type_idx: u32 },
    ResourceRep { resource_type_idx: u32 },
}

/// Canonical options accepted but, per spec's scope, not deeply validated
/// beyond shape (string encoding tag, optional memory/realloc core indices).
#[derive(Debug, Clone, Default)]
pub struct CanonOpts {
    pub string_encoding: Option<StringEncoding>,
    pub memory_idx: Option<u32>,
    pub realloc_idx: Option<u32>,
    pub post_return_idx: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Utf16,
    Latin1Utf16,
}

/// `alias outer $depth $idx (kind)` / `alias export $inst "name" (kind)` /
/// `alias core export` (spec §4.8).
#[derive(Debug, Clone)]
pub enum AliasDef {
    Outer { depth: u32, idx: u32, kind: AliasKind },
    Export { instance_idx: u32, name: ExternName, kind: AliasKind },
    CoreExport { instance_idx: u32, name: String, kind: crate::core_types::CoreSort },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Func,
    Value,
    Type,
    Instance,
    Component,
}

/// The start-function definition (spec §4.7): the function index to call
/// and the value-slot arguments to feed it.
#[derive(Debug, Clone)]
pub struct StartDef {
    pub func_idx: u32,
    pub args: Vec<u32>,
    /// Number of results the start function produces, bound to fresh value
    /// slots in declaration order.
    pub result_count: u32,
}

/// One definition inside a component body, in source order.
#[derive(Debug, Clone)]
pub enum Definition {
    Core(CoreDef),
    /// A nested component, given by its full body.
    Component(Vec<Spanned<Definition>>),
    /// `instance (instantiate $c (with ...))`.
    Instantiate { component_idx: u32, args: Vec<(ExternName, ComponentSortIdx)> },
    /// An inline instance built purely from existing exports, with no
    /// instantiation (spec §3 "instance ... of existing exports").
    InlineInstance(Vec<(ExternName, ComponentSortIdx)>),
    Alias(AliasDef),
    Type(TypeExpr),
    Canon(CanonDef),
    Start(StartDef),
    Import { name: ExternName, ty: TypeExpr },
    Export { name: ExternName, item: ComponentSortIdx, ascribed: Option<TypeExpr> },
}
