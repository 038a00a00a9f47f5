//! PHCU split naming
//!
//! A primary health care unit from the registry maps to two linked DHIS2
//! entries: the health center itself, and a wrapper org unit whose id is the
//! registry id with a `_PHCU` suffix. The wrapper's display name is the
//! source name with its trailing facility-type words stripped.

use regex::Regex;
use std::sync::OnceLock;

fn type_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(health center|primary clinic)\s*$").unwrap())
}

/// Derive the wrapper org unit's display name from the source facility name
///
/// Strips a trailing "Health Center" or "Primary Clinic" (case-insensitive),
/// trims, and appends `_PHCU`.
pub fn wrapper_name(source_name: &str) -> String {
    let stripped = type_suffix_re().replace(source_name, "");
    format!("{}_PHCU", stripped.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Adama Health Center", "Adama_PHCU"; "health center suffix")]
    #[test_case("Adama Health center", "Adama_PHCU"; "mixed case suffix")]
    #[test_case("Adama Primary Clinic", "Adama_PHCU"; "primary clinic suffix")]
    #[test_case("Adama Hospital", "Adama Hospital_PHCU"; "no recognised suffix")]
    #[test_case("Health Center", "_PHCU"; "name is only the suffix")]
    fn test_wrapper_name(input: &str, expected: &str) {
        assert_eq!(wrapper_name(input), expected);
    }

    #[test]
    fn test_suffix_only_stripped_at_end() {
        assert_eq!(
            wrapper_name("Health Center of Adama"),
            "Health Center of Adama_PHCU"
        );
    }
}
