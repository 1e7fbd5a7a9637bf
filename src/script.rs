//! The script-level assertion runner (spec §6 "External interfaces", §8
//! "Testable properties", scenarios S1-S6): `assert_invalid` and
//! `assert_malformed` wrap a component body and expect it to be rejected
//! with a particular error category (and, for `assert_invalid`, often a
//! particular stable message prefix).
//!
//! `assert_malformed` expects a `Syntax`-category failure — that is, a
//! failure the surface lexer/parser or variable-resolution pass would
//! raise before this engine ever sees a resolved IR at all. Since both of
//! those passes are out of this engine's scope (spec §1 Non-goals), a
//! malformed-script command never reaches [`check_component`]; this
//! runner only records that such a command was expected to fail upstream,
//! so a script's assertion list can still be driven uniformly.

use crate::{
    core_types::CoreValidator,
    driver::check_component,
    error::{Category, TypeError},
    ir::{Definition, Spanned},
};

/// What a script command expects to happen when its body is checked.
#[derive(Debug, Clone)]
pub enum Expectation {
    /// The component body is well-typed.
    Valid,
    /// `assert_invalid`: checking must fail with [`Category::Invalid`],
    /// optionally with a message carrying the given stable prefix.
    Invalid { message_prefix: Option<String> },
    /// `assert_malformed`: out of this engine's scope (spec §1); recorded
    /// but never actually run through [`check_component`].
    Malformed,
}

/// The result of running one script command against the engine.
#[derive(Debug, Clone)]
pub enum ScriptOutcome {
    Pass,
    Fail { expected: String, actual: Option<TypeError> },
    /// `assert_malformed` commands always report this — there is nothing
    /// for this engine to run.
    NotApplicable,
}

impl ScriptOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, ScriptOutcome::Pass)
    }
}

/// Run a single script command's body through the engine and judge the
/// outcome against its expectation.
pub fn run_command(defs: &[Spanned<Definition>], expect: &Expectation, validator: &dyn CoreValidator) -> ScriptOutcome {
    match expect {
        Expectation::Malformed => ScriptOutcome::NotApplicable,

        Expectation::Valid => match check_component(defs, validator) {
            Ok(_) => ScriptOutcome::Pass,
            Err(e) => ScriptOutcome::Fail { expected: "a well-typed component".into(), actual: Some(e) },
        },

        Expectation::Invalid { message_prefix } => match check_component(defs, validator) {
            Ok(_) => ScriptOutcome::Fail { expected: "an Invalid-category rejection".into(), actual: None },
            Err(e) => {
                if e.category != Category::Invalid {
                    return ScriptOutcome::Fail { expected: format!("category {}", Category::Invalid), actual: Some(e) };
                }
                if let Some(prefix) = message_prefix {
                    if !e.message_starts_with(prefix) {
                        return ScriptOutcome::Fail { expected: format!("message starting with `{prefix}`"), actual: Some(e) };
                    }
                }
                ScriptOutcome::Pass
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core_types::CoreModuleType,
        error::Region,
        ir::{ComponentSortIdx, TypeExpr},
        value_types::{Field, Record, ValType},
    };

    struct NullValidator;
    impl CoreValidator for NullValidator {
        fn validate_module(&self, _module_id: u32) -> Result<CoreModuleType, String> {
            Err("no core modules in this script".into())
        }
    }

    #[test]
    fn assert_invalid_accepts_bad_record_field_name() {
        let bad_record = ValType::Record(Record { fields: vec![Field { name: "NevEr".into(), ty: ValType::Bool }] });
        let defs = vec![
            Spanned::new(Definition::Type(TypeExpr::Value(bad_record)), Region::new(0, 10)),
            Spanned::new(
                Definition::Export { name: crate::externs::ExternName::plain("t"), item: ComponentSortIdx::Type(0), ascribed: None },
                Region::new(10, 20),
            ),
        ];
        let outcome = run_command(&defs, &Expectation::Invalid { message_prefix: None }, &NullValidator);
        assert!(outcome.is_pass(), "{outcome:?}");
    }

    #[test]
    fn assert_invalid_fails_when_component_is_actually_valid() {
        let defs = vec![
            Spanned::new(Definition::Type(TypeExpr::Value(ValType::Bool)), Region::new(0, 10)),
            Spanned::new(
                Definition::Export { name: crate::externs::ExternName::plain("t"), item: ComponentSortIdx::Type(0), ascribed: None },
                Region::new(10, 20),
            ),
        ];
        let outcome = run_command(&defs, &Expectation::Invalid { message_prefix: None }, &NullValidator);
        assert!(!outcome.is_pass());
    }

    #[test]
    fn valid_expectation_accepts_well_typed_body() {
        let defs = vec![
            Spanned::new(Definition::Type(TypeExpr::Value(ValType::Bool)), Region::new(0, 10)),
            Spanned::new(
                Definition::Export { name: crate::externs::ExternName::plain("t"), item: ComponentSortIdx::Type(0), ascribed: None },
                Region::new(10, 20),
            ),
        ];
        let outcome = run_command(&defs, &Expectation::Valid, &NullValidator);
        assert!(outcome.is_pass());
    }

    #[test]
    fn malformed_expectation_is_never_run() {
        let outcome = run_command(&[], &Expectation::Malformed, &NullValidator);
        assert!(matches!(outcome, ScriptOutcome::NotApplicable));
    }
}
