//! Error types for the Component Model type checker.
//!
//! Mirrors the error-category discipline of `wrt-error` (category + stable
//! code + message) but collapsed to the categories this engine actually
//! raises, and carrying a source [`Region`] instead of a numeric code table.

use std::fmt;

use thiserror::Error;

/// A half-open byte range into the source the resolved IR was built from.
///
/// The region-resolution pass that produced the IR is out of scope for this
/// engine; we only ever thread regions through, never invent them. A
/// synthetic check (e.g. an internal invariant) uses [`Region::SYNTHETIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Byte offset of the region's start.
    pub start: u32,
    /// Byte offset one past the region's end.
    pub end: u32,
}

impl Region {
    /// A region standing in for "no real source location" (internal checks).
    pub const SYNTHETIC: Region = Region { start: 0, end: 0 };

    /// Construct a region from a `start..end` byte range.
    pub const fn new(start: u32, end: u32) -> Self {
        Region { start, end }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The category of an error, per spec §7 / the script-level assertion
/// runner's vocabulary (spec §6, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A type-system violation: elaboration, subtyping, well-formedness,
    /// linearity, instantiation, export exposure, or canonical ABI.
    Invalid,
    /// Raised by the surface parser (out of scope here; passed through by
    /// the assertion runner when a resolver/parser stage is simulated).
    Syntax,
    /// Raised if the engine is wired to a core validator that rejects a
    /// module/instance it was asked to treat as an oracle.
    Link,
    /// A runtime trap, pass-through only.
    Trap,
    /// Resource exhaustion, pass-through only.
    Exhaustion,
    /// A runtime crash, pass-through only.
    Crash,
    /// An encoding error, pass-through only.
    Encoding,
    /// An assertion's observed error category/message did not match what
    /// was expected.
    Assert,
    /// Script-driver abort.
    Abort,
    /// I/O failure at the script-driver boundary (never raised by the
    /// engine itself, which performs no I/O).
    Io,
}

impl Category {
    /// The lowercase string the script-level surface uses to tag this
    /// category (spec §6: `{"parsing", "validation", "link failure", ...}`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Invalid => "validation",
            Category::Syntax => "parsing",
            Category::Link => "link failure",
            Category::Trap => "runtime trap",
            Category::Exhaustion => "resource exhaustion",
            Category::Crash => "runtime crash",
            Category::Encoding => "encoding error",
            Category::Assert => "assertion failure",
            Category::Abort => "script error",
            Category::Io => "i/o error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A region-tagged, category-tagged engine error.
///
/// `message` always begins with the stable prefix the spec pins down for a
/// given failure (e.g. `"Cannot export type containing bare resource
/// type"`) so `assert_invalid`/`assert_malformed` can match on a prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category}: {message} (at {region})")]
pub struct TypeError {
    /// What kind of failure this is.
    pub category: Category,
    /// Where in the (resolved) source it occurred.
    pub region: Region,
    /// Stable, prefix-matchable message.
    pub message: String,
}

impl TypeError {
    /// Build an `Invalid` (type-system) error — the overwhelming majority
    /// of errors this engine raises.
    pub fn invalid(region: Region, message: impl Into<String>) -> Self {
        TypeError { category: Category::Invalid, region, message: message.into() }
    }

    /// Build an internal-invariant-violation error. The spec (§4.5 step 2,
    /// §9) calls these out by name ("Impossible: ...") — they indicate the
    /// resolved IR violated an invariant the resolver was supposed to
    /// guarantee, not a user-facing type error, but they still surface
    /// through the same `Invalid` category since there is no separate
    /// channel for them in the script-level surface.
    pub fn internal(region: Region, message: impl Into<String>) -> Self {
        TypeError { category: Category::Invalid, region, message: format!("Impossible: {}", message.into()) }
    }

    /// Does this error's message begin with `prefix`? Used by the
    /// assertion runner (`assert_invalid`/`assert_malformed`).
    pub fn message_starts_with(&self, prefix: &str) -> bool {
        self.message.starts_with(prefix)
    }
}

/// The engine's result alias.
pub type Result<T> = std::result::Result<T, TypeError>;
