//! End-to-end checks driving the public API the way an embedder would:
//! build a resolved IR by hand, hand it to [`wrt_component_check::check_component`]
//! with a stub core validator, and inspect the resulting component type or
//! error.

use wrt_component_check::{
    core_types::{CoreModuleType, CoreValidator},
    error::{Category, Region},
    ir::{ComponentSortIdx, Definition, Spanned, TypeExpr},
    externs::ExternName,
    value_types::{Field, Record, ValType},
    check_component,
};

struct NullValidator;
impl CoreValidator for NullValidator {
    fn validate_module(&self, _module_id: u32) -> Result<CoreModuleType, String> {
        Err("this test never instantiates a core module".into())
    }
}

#[test]
fn a_component_exporting_a_plain_value_type_is_well_typed() {
    let defs = vec![
        Spanned::new(Definition::Type(TypeExpr::Value(ValType::U32)), Region::new(0, 5)),
        Spanned::new(
            Definition::Export { name: ExternName::plain("count"), item: ComponentSortIdx::Type(0), ascribed: None },
            Region::new(5, 20),
        ),
    ];

    let ct = check_component(&defs, &NullValidator).expect("should type-check");
    assert_eq!(ct.instance.exports.len(), 1);
    assert_eq!(ct.instance.exports[0].name, ExternName::plain("count"));
}

#[test]
fn record_with_non_kebab_field_name_is_rejected() {
    let bad = ValType::Record(Record { fields: vec![Field { name: "NotKebab".into(), ty: ValType::Bool }] });
    let defs = vec![
        Spanned::new(Definition::Type(TypeExpr::Value(bad)), Region::new(0, 5)),
        Spanned::new(
            Definition::Export { name: ExternName::plain("r"), item: ComponentSortIdx::Type(0), ascribed: None },
            Region::new(5, 20),
        ),
    ];

    let err = check_component(&defs, &NullValidator).unwrap_err();
    assert_eq!(err.category, Category::Invalid);
    assert!(err.message_starts_with("record field name `NotKebab` is not in kebab case"));
}

#[test]
fn duplicate_export_names_are_rejected() {
    let defs = vec![
        Spanned::new(Definition::Type(TypeExpr::Value(ValType::Bool)), Region::new(0, 5)),
        Spanned::new(
            Definition::Export { name: ExternName::plain("dup"), item: ComponentSortIdx::Type(0), ascribed: None },
            Region::new(5, 10),
        ),
        Spanned::new(
            Definition::Export { name: ExternName::plain("dup"), item: ComponentSortIdx::Type(0), ascribed: None },
            Region::new(10, 15),
        ),
    ];

    let err = check_component(&defs, &NullValidator).unwrap_err();
    assert_eq!(err.category, Category::Invalid);
}

#[test]
fn nested_component_is_checked_and_becomes_a_local_type() {
    let inner = vec![
        Spanned::new(Definition::Type(TypeExpr::Value(ValType::Bool)), Region::new(0, 5)),
        Spanned::new(
            Definition::Export { name: ExternName::plain("flag"), item: ComponentSortIdx::Type(0), ascribed: None },
            Region::new(5, 10),
        ),
    ];
    let outer = vec![Spanned::new(Definition::Component(inner), Region::new(0, 20))];

    let ct = check_component(&outer, &NullValidator).expect("nested component should type-check");
    assert!(ct.instance.exports.is_empty());
}
