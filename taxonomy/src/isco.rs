//! ISCO code helpers.

/// Code stored for occupations that carry no ISCO classification.
pub const UNKNOWN_CODE: &str = "0000";

/// Number of tiers in the ISCO classification.
pub const TIERS: usize = 4;

/// Canonical English labels of the ten ISCO major groups. These override
/// whatever labels the corpus holds for the same codes.
pub const MAJOR_GROUPS: [(&str, &str); 10] = [
    ("0", "Armed forces occupations"),
    ("1", "Managers"),
    ("2", "Professionals"),
    ("3", "Technicians and associate professionals"),
    ("4", "Clerical support workers"),
    ("5", "Service and sales workers"),
    ("6", "Skilled agricultural, forestry and fishery workers"),
    ("7", "Craft and related trades workers"),
    ("8", "Plant and machine operators and assemblers"),
    ("9", "Elementary occupations"),
];

/// Normalize a raw code from the source data. Missing, blank and `nan`
/// values become [`UNKNOWN_CODE`].
pub fn normalize_code(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(code) if !code.is_empty() && !code.eq_ignore_ascii_case("nan") => code.to_string(),
        _ => UNKNOWN_CODE.to_string(),
    }
}

/// The four tier codes of `code`, most general first, or `None` when the
/// code is too short to place in every tier.
///
/// Codes longer than four characters keep the full code as the last tier.
pub fn tier_codes(code: &str) -> Option<[String; TIERS]> {
    let mut prefixes = code.char_indices().map(|(i, c)| &code[..i + c.len_utf8()]);
    let first = prefixes.next()?;
    let second = prefixes.next()?;
    let third = prefixes.next()?;
    prefixes.next()?;

    Some([
        first.to_string(),
        second.to_string(),
        third.to_string(),
        code.to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tier_codes() {
        assert_eq!(
            tier_codes("7231"),
            Some([
                "7".to_string(),
                "72".to_string(),
                "723".to_string(),
                "7231".to_string()
            ])
        );
    }

    #[test]
    fn test_tier_codes_keeps_long_codes_whole() {
        let tiers = tier_codes("72310").unwrap();
        assert_eq!(tiers[2], "723");
        assert_eq!(tiers[3], "72310");
    }

    #[test]
    fn test_short_codes_have_no_tiers() {
        assert_eq!(tier_codes(""), None);
        assert_eq!(tier_codes("7"), None);
        assert_eq!(tier_codes("723"), None);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(Some(" 7231 ")), "7231");
        assert_eq!(normalize_code(Some("NaN")), UNKNOWN_CODE);
        assert_eq!(normalize_code(Some("")), UNKNOWN_CODE);
        assert_eq!(normalize_code(None), UNKNOWN_CODE);
    }
}
