//! Component Model value types (spec §3 "Value types").
//!
//! Grounded on `wrt-component/types.rs`'s `ValType`/`Record`/`Variant`/
//! `Case`/`Enum`/`Flags` enums, with the no_std `BoundedVec` / safety-critical
//! cfg-gating stripped (this crate targets `std` only — no embedded/ASIL
//! concerns are in scope here) and `own`/`borrow` changed to reference a
//! [`DefType`] rather than a bare `u32`, since spec §4.1 requires their
//! referent be "a resource-bounded type variable or a locally-defined
//! resource type" — a `u32` index can't express that distinction, a boxed
//! `DefType` can.

use std::fmt;

use crate::defs::DefType;

/// A component-model value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValType {
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
    Char,
    String,
    List(Box<ValType>),
    Record(Record),
    Tuple(Vec<ValType>),
    Variant(Variant),
    Enum(Vec<String>),
    Option(Box<ValType>),
    Result { ok: Option<Box<ValType>>, err: Option<Box<ValType>> },
    Flags(Vec<String>),
    /// `own <R>` — a transferable (linear) handle to a resource.
    Own(Box<DefType>),
    /// `borrow <R>` — a non-transferable handle to a resource.
    Borrow(Box<DefType>),
}

impl ValType {
    pub fn list(elem: ValType) -> Self {
        ValType::List(Box::new(elem))
    }

    pub fn option(elem: ValType) -> Self {
        ValType::Option(Box::new(elem))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValType::Bool
                | ValType::S8
                | ValType::U8
                | ValType::S16
                | ValType::U16
                | ValType::S32
                | ValType::U32
                | ValType::S64
                | ValType::U64
                | ValType::F32
                | ValType::F64
                | ValType::Char
                | ValType::String
        )
    }
}

/// Not round-trippable surface syntax — just enough to make an error
/// message or test failure readable.
impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::Bool => write!(f, "bool"),
            ValType::S8 => write!(f, "s8"),
            ValType::U8 => write!(f, "u8"),
            ValType::S16 => write!(f, "s16"),
            ValType::U16 => write!(f, "u16"),
            ValType::S32 => write!(f, "s32"),
            ValType::U32 => write!(f, "u32"),
            ValType::S64 => write!(f, "s64"),
            ValType::U64 => write!(f, "u64"),
            ValType::F32 => write!(f, "f32"),
            ValType::F64 => write!(f, "f64"),
            ValType::Char => write!(f, "char"),
            ValType::String => write!(f, "string"),
            ValType::List(elem) => write!(f, "list<{elem}>"),
            ValType::Record(r) => {
                write!(f, "record {{ ")?;
                for (i, field) in r.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            ValType::Tuple(elems) => {
                write!(f, "tuple<")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            ValType::Variant(v) => {
                write!(f, "variant {{ ")?;
                for (i, case) in v.cases.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match &case.ty {
                        Some(ty) => write!(f, "{}({})", case.name, ty)?,
                        None => write!(f, "{}", case.name)?,
                    }
                }
                write!(f, " }}")
            }
            ValType::Enum(tags) => write!(f, "enum {{ {} }}", tags.join(", ")),
            ValType::Option(inner) => write!(f, "option<{inner}>"),
            ValType::Result { ok, err } => {
                let ok = ok.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "_".into());
                let err = err.as_ref().map(|t| t.to_string()).unwrap_or_else(|| "_".into());
                write!(f, "result<{ok}, {err}>")
            }
            ValType::Flags(names) => write!(f, "flags {{ {} }}", names.join(", ")),
            ValType::Own(dt) => write!(f, "own<{dt}>"),
            ValType::Borrow(dt) => write!(f, "borrow<{dt}>"),
        }
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: ValType,
}

/// Record type: an ordered list of named fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Record {
    pub fields: Vec<Field>,
}

/// A variant case: a name, an optional payload, and an optional back
/// pointer to a preceding case it refines (spec §3, §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Case {
    pub name: String,
    pub ty: Option<ValType>,
    /// Index (within the same variant) of the case this one refines.
    pub refines: Option<u32>,
}

/// Variant type: an ordered list of cases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Variant {
    pub cases: Vec<Case>,
}
