//! Consistency rules for the set of operations declared on one parameter.
//!
//! The rules look at operation names only, never at configured values:
//! `value` fixes the parameter outright and therefore excludes every other
//! operation, and `one_of` excludes the list-shaping operations `subset_of`,
//! `superset_of` and `add`. Everything else, including any custom operation,
//! combines freely.

use crate::error::PolicyError;
use crate::operation::{OperationName, PolicyOperation};

/// Returns `true` if the given operation names may be declared together on
/// one metadata parameter.
///
/// # Examples
///
/// ```
/// use fedpolicy::operation::combination::is_valid_combination;
/// use fedpolicy::OperationName;
///
/// assert!(is_valid_combination(&[
///     OperationName::SUBSET_OF,
///     OperationName::SUPERSET_OF,
///     OperationName::ESSENTIAL,
/// ]));
/// assert!(!is_valid_combination(&[OperationName::VALUE, OperationName::DEFAULT]));
/// assert!(!is_valid_combination(&[OperationName::ONE_OF, OperationName::ADD]));
/// ```
pub fn is_valid_combination(names: &[OperationName]) -> bool {
    conflicting_pair(names).is_none()
}

/// Returns the first conflicting pair of names, if any.
pub(crate) fn conflicting_pair(
    names: &[OperationName],
) -> Option<(OperationName, OperationName)> {
    for (index, name) in names.iter().enumerate() {
        for other in &names[index + 1..] {
            if excludes(name, other) || excludes(other, name) {
                return Some((name.clone(), other.clone()));
            }
        }
    }
    None
}

/// Validates a parameter's operation set, naming the offending pair on
/// failure. Invoked at entry construction, after parsing and after every
/// merge step.
pub(crate) fn validate(
    parameter: &str,
    operations: &[PolicyOperation],
) -> Result<(), PolicyError> {
    let names: Vec<OperationName> = operations.iter().map(PolicyOperation::name).collect();
    match conflicting_pair(&names) {
        Some((first, second)) => Err(PolicyError::InvalidCombination {
            parameter: parameter.to_owned(),
            first,
            second,
        }),
        None => Ok(()),
    }
}

fn excludes(name: &OperationName, other: &OperationName) -> bool {
    if *name == OperationName::VALUE {
        return *other != OperationName::VALUE;
    }
    if *name == OperationName::ONE_OF {
        return *other == OperationName::SUBSET_OF
            || *other == OperationName::SUPERSET_OF
            || *other == OperationName::ADD;
    }
    false
}

#[cfg(test)]
mod combination_tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<OperationName> {
        raw.iter().copied().map(OperationName::from).collect()
    }

    macro_rules! combination_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (set, expected) = $value;
                assert_eq!(is_valid_combination(&names(&set)), expected);
            }
        )*
        }
    }

    combination_tests! {
        empty_set_is_valid: ([], true),
        single_value_is_valid: (["value"], true),
        value_excludes_default: (["value", "default"], false),
        value_excludes_essential: (["essential", "value"], false),
        value_excludes_one_of: (["value", "one_of"], false),
        value_excludes_custom: (["value", "regexp"], false),
        one_of_excludes_subset_of: (["one_of", "subset_of"], false),
        one_of_excludes_superset_of: (["superset_of", "one_of"], false),
        one_of_excludes_add: (["one_of", "add"], false),
        one_of_with_default_is_valid: (["one_of", "default", "essential"], true),
        subset_and_superset_coexist: (["subset_of", "superset_of"], true),
        full_list_shaping_set_is_valid: (["subset_of", "superset_of", "add", "default", "essential"], true),
        custom_combines_freely: (["regexp", "subset_of", "essential"], true),
    }

    #[test]
    fn test_conflicting_pair_names_the_offenders() {
        let set = names(&["essential", "one_of", "add"]);
        let (first, second) = conflicting_pair(&set).unwrap();

        assert_eq!(first, OperationName::ONE_OF);
        assert_eq!(second, OperationName::ADD);
    }
}
