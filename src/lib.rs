//! Type elaboration and validation for a resolved WebAssembly Component
//! Model intermediate representation.
//!
//! This crate answers exactly one question: given a component body already
//! past surface parsing and variable resolution — nested components, core
//! modules, instances, aliases, typed imports/exports, canonical-ABI
//! adapters, resource types, and an optional start definition — is it
//! well-formed and well-typed, and if so what is its [`defs::ComponentType`]
//! as seen from the outside? If not, where (a [`error::Region`]) and why (a
//! [`error::Category`] plus a stable, prefix-matchable message) did it fail?
//!
//! The surface lexer/parser, the variable-resolution/desugaring pass,
//! binary decode/encode, runtime execution, and the core-Wasm validator
//! itself are all out of scope; an embedder supplies the last of these
//! through [`core_types::CoreValidator`].
//!
//! Entry points: [`driver::check_component`] for a single top-level
//! component body, or [`script::run_command`] to drive an `assert_invalid`
//! / `assert_malformed` script assertion against it.

pub mod alias;
pub mod canonical_abi;
pub mod config;
pub mod context;
pub mod core_types;
pub mod defs;
pub mod driver;
pub mod elaborate;
pub mod error;
pub mod exposure;
pub mod externs;
pub mod ids;
pub mod instantiate;
pub mod ir;
pub mod linearity;
pub mod naming;
pub mod prelude;
pub mod resources;
pub mod script;
pub mod start;
pub mod subst;
pub mod subtype;
pub mod value_types;
pub mod vars;
pub mod wf;

pub use config::Limits;
pub use core_types::CoreValidator;
pub use defs::ComponentType;
pub use driver::{check_component, check_component_with_limits};
pub use error::{Category, Region, Result, TypeError};
