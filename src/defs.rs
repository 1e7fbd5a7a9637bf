//! Definition types (`DT`, spec §3 "Definition types") and the component /
//! instance / function type forms built from them.
//!
//! Grounded on `wrt-component/types.rs` (`ComponentError`, the overall shape
//! of a "thing with imports and exports") and `wrt-component/component.rs`'s
//! `WrtComponentType` (imports/exports/instances triple), generalized here
//! into the binder-carrying recursive algebra spec §3/§4 actually specifies
//! (uvars, evars, nested instance types) rather than the teacher's flat
//! decoded-from-binary representation.

use std::fmt;

use crate::{ids::ResourceId, value_types::ValType, vars::{Binder, TypeVar}};

/// Either a single unnamed value, or an ordered list of uniquely-named
/// values (spec §3 "Function types": `ft_params`/`ft_result`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamList {
    Unnamed(Box<ValType>),
    Named(Vec<(String, ValType)>),
}

impl ParamList {
    pub fn len(&self) -> usize {
        match self {
            ParamList::Unnamed(_) => 1,
            ParamList::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value types in declaration order, discarding names.
    pub fn types(&self) -> Vec<&ValType> {
        match self {
            ParamList::Unnamed(t) => vec![t.as_ref()],
            ParamList::Named(v) => v.iter().map(|(_, t)| t).collect(),
        }
    }

    pub fn names(&self) -> Option<Vec<&str>> {
        match self {
            ParamList::Unnamed(_) => None,
            ParamList::Named(v) => Some(v.iter().map(|(n, _)| n.as_str()).collect()),
        }
    }
}

/// A component-level function type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncType {
    pub params: ParamList,
    pub result: ParamList,
}

/// A named extern declaration (spec §3 "Extern declarations").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternDecl {
    pub name: crate::externs::ExternName,
    pub desc: ExternDesc,
}

/// The "what it is" side of a component-level extern decl.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternDesc {
    CoreModule(crate::core_types::CoreModuleType),
    Func(FuncType),
    Value(ValType),
    Type(DefType),
    Instance(InstanceType),
    Component(ComponentType),
}

/// A component type: the binder list its imports may mention, the ordered
/// imports themselves, and the resulting instance type (spec §3
/// "Component / instance types").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentType {
    pub uvars: Vec<Binder>,
    pub imports: Vec<ExternDecl>,
    pub instance: InstanceType,
}

impl ComponentType {
    pub fn empty() -> Self {
        ComponentType { uvars: Vec::new(), imports: Vec::new(), instance: InstanceType::empty() }
    }
}

/// An instance type: the existentials it may mention, plus its exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InstanceType {
    pub evars: Vec<Binder>,
    pub exports: Vec<ExternDecl>,
}

impl InstanceType {
    pub fn empty() -> Self {
        InstanceType::default()
    }
}

/// A generative resource type identity (spec §3 "Resource types").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub id: ResourceId,
    /// Index of the destructor function, if one was declared.
    pub destructor: Option<u32>,
}

/// The internal type algebra (`DT`, spec §3 "Definition types"): value,
/// function, component, instance, resource, or a variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefType {
    Value(ValType),
    Func(FuncType),
    Component(Box<ComponentType>),
    Instance(Box<InstanceType>),
    /// `DT_resource_type i` — `i` is the mint index into `ctx.rtypes`.
    Resource(ResourceId),
    Var(TypeVar),
}

/// Readable (not round-trippable) renderings, for error messages and test
/// failures — spec §9 assumes component types are "suitable for printing".
impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        for (i, t) in self.params.types().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, ") -> (")?;
        for (i, t) in self.result.types().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{t}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for DefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefType::Value(vt) => write!(f, "{vt}"),
            DefType::Func(ft) => write!(f, "{ft}"),
            DefType::Component(ct) => write!(f, "{ct}"),
            DefType::Instance(it) => write!(f, "{it}"),
            DefType::Resource(id) => write!(f, "resource#{}", id.0),
            DefType::Var(v) => write!(f, "{v:?}"),
        }
    }
}

impl fmt::Display for ExternDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternDesc::CoreModule(_) => write!(f, "core module"),
            ExternDesc::Func(ft) => write!(f, "{ft}"),
            ExternDesc::Value(vt) => write!(f, "{vt}"),
            ExternDesc::Type(dt) => write!(f, "type {dt}"),
            ExternDesc::Instance(it) => write!(f, "{it}"),
            ExternDesc::Component(ct) => write!(f, "{ct}"),
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance {{ ")?;
        for (i, decl) in self.exports.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", decl.name, decl.desc)?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component {{ imports: {{ ")?;
        for (i, decl) in self.imports.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", decl.name, decl.desc)?;
        }
        write!(f, " }}, exports: {} }}", self.instance)
    }
}

/// Import- vs export-position polarity (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Param,
    Export,
}
