//! Small newtype identifiers threaded through the type model.
//!
//! Grounded on `wrt-component`'s `TypeId`/`ResourceId`/`ComponentInstanceId`
//! pattern (teacher's `types.rs`), trimmed of the serialization/checksum
//! machinery that pattern carries in the teacher (that machinery exists
//! there to support binary snapshotting of live runtime state, which is out
//! of scope for a pure type checker).

/// Identifies a resource type's generative identity (spec §3 "Resource
/// types": "a fresh opaque identity is minted at its declaration site").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

/// Identifies a value slot in a [`crate::context::Ctx`] (for linearity
/// tracking, spec §3 "Lifecycle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

/// Identifies an instance slot in a [`crate::context::Ctx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);
