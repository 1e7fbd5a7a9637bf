//! Well-formedness of value types (spec §4.1 "Value type well-formedness").
//!
//! Grounded on `wrt-component/type_compatibility.rs`'s per-variant match
//! structure, generalized to a [`Position`]-parameterized check: spec §4.1
//! requires `borrow<T>` be rejected outside parameter position ("a `borrow`
//! handle may appear only where it cannot outlive the call it was passed
//! into — i.e. never in a result or an export"), while `own<T>` is
//! unrestricted. Record/variant/enum/flags field and case lists are
//! checked for kebab-case naming and strong uniqueness using `naming.rs`.

use crate::{
    defs::{FuncType, ParamList, Position},
    error::{Region, TypeError},
    externs::ExternName,
    naming::{check_unique, require_kebab_case},
    value_types::ValType,
};

pub fn wf_valtype(vt: &ValType, pos: Position, region: Region) -> Result<(), TypeError> {
    match vt {
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
        | ValType::String => Ok(()),

        ValType::List(t) | ValType::Option(t) => wf_valtype(t, pos, region),

        ValType::Tuple(ts) => {
            for t in ts {
                wf_valtype(t, pos, region)?;
            }
            Ok(())
        }

        ValType::Result { ok, err } => {
            if let Some(t) = ok {
                wf_valtype(t, pos, region)?;
            }
            if let Some(t) = err {
                wf_valtype(t, pos, region)?;
            }
            Ok(())
        }

        ValType::Record(r) => {
            let names: Vec<ExternName> = r.fields.iter().map(|f| ExternName::plain(f.name.clone())).collect();
            for f in &r.fields {
                require_kebab_case("record field name", &f.name, region)?;
            }
            check_unique(names.iter(), region)?;
            for f in &r.fields {
                wf_valtype(&f.ty, pos, region)?;
            }
            Ok(())
        }

        ValType::Variant(v) => {
            if v.cases.is_empty() {
                return Err(TypeError::invalid(region, "variant must have at least one case"));
            }
            let names: Vec<ExternName> = v.cases.iter().map(|c| ExternName::plain(c.name.clone())).collect();
            for c in &v.cases {
                require_kebab_case("variant case name", &c.name, region)?;
            }
            check_unique(names.iter(), region)?;
            for (i, c) in v.cases.iter().enumerate() {
                if let Some(r) = c.refines {
                    if r as usize >= i {
                        return Err(TypeError::invalid(
                            region,
                            format!("variant case `{}` refines case {r}, which does not precede it", c.name),
                        ));
                    }
                }
                if let Some(t) = &c.ty {
                    wf_valtype(t, pos, region)?;
                }
            }
            Ok(())
        }

        ValType::Enum(tags) => {
            if tags.is_empty() {
                return Err(TypeError::invalid(region, "enum must have at least one tag"));
            }
            let names: Vec<ExternName> = tags.iter().map(|t| ExternName::plain(t.clone())).collect();
            for t in tags {
                require_kebab_case("enum tag name", t, region)?;
            }
            check_unique(names.iter(), region)
        }

        ValType::Flags(names) => {
            if names.is_empty() {
                return Err(TypeError::invalid(region, "flags must declare at least one name"));
            }
            let extern_names: Vec<ExternName> = names.iter().map(|n| ExternName::plain(n.clone())).collect();
            for n in names {
                require_kebab_case("flags name", n, region)?;
            }
            check_unique(extern_names.iter(), region)
        }

        ValType::Own(_) => Ok(()),

        ValType::Borrow(_) => match pos {
            Position::Param => Ok(()),
            Position::Export => Err(TypeError::invalid(region, "a `borrow` handle may not appear in export/result position")),
        },
    }
}

/// A function type is well-formed when its parameter names (if named) are
/// unique and kebab-case, its result names likewise, and every mentioned
/// value type is well-formed in the appropriate polarity — params are
/// parameter position, results are export position (spec §4.1: "a
/// function's result types are checked as if exported").
pub fn wf_functype(ft: &FuncType, region: Region) -> Result<(), TypeError> {
    wf_paramlist(&ft.params, Position::Param, region)?;
    wf_paramlist(&ft.result, Position::Export, region)
}

fn wf_paramlist(p: &ParamList, pos: Position, region: Region) -> Result<(), TypeError> {
    if let ParamList::Named(named) = p {
        let names: Vec<ExternName> = named.iter().map(|(n, _)| ExternName::plain(n.clone())).collect();
        for (n, _) in named {
            require_kebab_case("parameter name", n, region)?;
        }
        check_unique(names.iter(), region)?;
    }
    for t in p.types() {
        wf_valtype(t, pos, region)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::{Case, Record, Variant};

    #[test]
    fn borrow_rejected_in_export_position() {
        use crate::{defs::DefType, ids::ResourceId};
        let bad = ValType::Borrow(Box::new(DefType::Resource(ResourceId(0))));
        assert!(wf_valtype(&bad, Position::Export, Region::SYNTHETIC).is_err());
        assert!(wf_valtype(&bad, Position::Param, Region::SYNTHETIC).is_ok());
    }

    #[test]
    fn variant_refines_must_precede() {
        let v = ValType::Variant(Variant {
            cases: vec![
                Case { name: "a".into(), ty: None, refines: Some(1) },
                Case { name: "b".into(), ty: None, refines: None },
            ],
        });
        assert!(wf_valtype(&v, Position::Export, Region::SYNTHETIC).is_err());
    }

    #[test]
    fn record_duplicate_field_rejected() {
        use crate::value_types::Field;
        let r = ValType::Record(Record {
            fields: vec![
                Field { name: "a".into(), ty: ValType::Bool },
                Field { name: "a".into(), ty: ValType::Bool },
            ],
        });
        assert!(wf_valtype(&r, Position::Export, Region::SYNTHETIC).is_err());
    }

    #[test]
    fn enum_tag_must_be_kebab_case() {
        let e = ValType::Enum(vec!["NevEr".into()]);
        let err = wf_valtype(&e, Position::Export, Region::SYNTHETIC).unwrap_err();
        assert!(err.message_starts_with("enum tag name `NevEr` is not in kebab case"));
    }
}
