//! Name validation and strong-uniqueness (spec §4.1, §6 "Naming rules",
//! §9 Design Notes: "Name-conflict detection should be structured around a
//! canonical 'stripped label' function plus a 'kind' tag").

use crate::{
    error::{Region, TypeError},
    externs::{ExternName, NameLabel},
};

/// Is `s` valid "kebab-case": lowercase words separated by single dashes,
/// no leading/trailing/doubled dash, at least one character.
pub fn is_kebab_case(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut prev_dash = true; // forbid leading dash
    let mut saw_non_dash = false;
    for (i, c) in s.char_indices() {
        if c == '-' {
            if prev_dash {
                return false;
            }
            prev_dash = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_dash = false;
            saw_non_dash = true;
        } else {
            return false;
        }
        let _ = i;
    }
    saw_non_dash && !prev_dash
}

/// Require `what` (e.g. "enum tag name", "record field name") to be
/// kebab-case, producing the spec's pinned error wording (spec §8 S6:
/// `` "enum tag name `NevEr` is not in kebab case" ``).
pub fn require_kebab_case(what: &str, name: &str, region: Region) -> Result<(), TypeError> {
    if is_kebab_case(name) {
        Ok(())
    } else {
        Err(TypeError::invalid(
            region,
            format!("{what} `{name}` is not in kebab case"),
        ))
    }
}

/// The kind tag used for strong-uniqueness comparison (spec §6): a plain
/// name, an interface name, or an interface name carrying an `implements`
/// label (which is compared against bare plain names too).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameKind {
    Plain,
    Interface,
    Implements,
}

/// Strip method/static/constructor/implements labels from a name, returning
/// the canonical comparison key plus its [`NameKind`] (spec §6: "the
/// `[implements=<iface>]` ... labels are stripped for conflict-detection
/// but preserved for output; strong-uniqueness compares post-strip labels
/// but also forbids collisions between a stripped `implements` label and a
/// bare plain name").
pub fn strip_label(name: &ExternName) -> (String, NameKind) {
    match name {
        ExternName::Plain(s) => (s.clone(), NameKind::Plain),
        ExternName::Interface { labels, .. } => {
            if let Some(NameLabel::Implements(iface)) =
                labels.iter().find(|l| matches!(l, NameLabel::Implements(_)))
            {
                (iface.clone(), NameKind::Implements)
            } else {
                (name.raw(), NameKind::Interface)
            }
        }
    }
}

/// Strong-uniqueness check over a list of names (spec §5 I5, §8 P6):
/// instantiation-arg names and inline-export names must be unique within
/// their list, where uniqueness is computed on the stripped comparison key,
/// with `Implements`-tagged keys also forbidden from colliding with a bare
/// `Plain` key of the same text.
pub fn check_unique<'a>(
    names: impl IntoIterator<Item = &'a ExternName>,
    region: Region,
) -> Result<(), TypeError> {
    let mut seen: Vec<(String, NameKind)> = Vec::new();
    for name in names {
        let (key, kind) = strip_label(name);
        let collides = seen.iter().any(|(k, kk)| {
            k == &key
                && (kk == &kind
                    || matches!((kk, &kind), (NameKind::Plain, NameKind::Implements) | (NameKind::Implements, NameKind::Plain)))
        });
        if collides {
            return Err(TypeError::invalid(region, format!("Duplicate name `{key}`")));
        }
        seen.push((key, kind));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_accepts_and_rejects() {
        assert!(is_kebab_case("foo-bar"));
        assert!(is_kebab_case("foo"));
        assert!(is_kebab_case("foo2-bar3"));
        assert!(!is_kebab_case("NevEr"));
        assert!(!is_kebab_case("foo--bar"));
        assert!(!is_kebab_case("-foo"));
        assert!(!is_kebab_case("foo-"));
        assert!(!is_kebab_case(""));
    }

    #[test]
    fn require_kebab_case_message_matches_spec() {
        let err = require_kebab_case("enum tag name", "NevEr", Region::SYNTHETIC).unwrap_err();
        assert!(err.message_starts_with("enum tag name `NevEr` is not in kebab case"));
    }

    #[test]
    fn duplicate_plain_names_rejected() {
        let names = vec![ExternName::plain("a"), ExternName::plain("a")];
        assert!(check_unique(names.iter(), Region::SYNTHETIC).is_err());
    }

    #[test]
    fn distinct_names_accepted() {
        let names = vec![ExternName::plain("a"), ExternName::plain("b")];
        assert!(check_unique(names.iter(), Region::SYNTHETIC).is_ok());
    }
}
