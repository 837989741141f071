//! Dosage extraction from experiment names.
//!
//! Experiments follow the naming convention `<prefix>_<dosage>[kK]_<suffix>`
//! where the dosage is a decimal number with either `,` or `.` as separator,
//! e.g. `Xe_12,5K_2`. The prefix before the first underscore is ignored.

/// Pulls the dosage out of an experiment name.
///
/// Matching starts after the first `_`. Returns `None` when the name does
/// not follow the convention; callers surface that as a warning and skip the
/// experiment, never as an error.
pub fn extract_dosage(name: &str) -> Option<f64> {
    let rest = name.split_once('_')?.1;
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut seen_separator = false;
            while i < bytes.len() {
                match bytes[i] {
                    b'0'..=b'9' => i += 1,
                    b'.' | b',' if !seen_separator => {
                        seen_separator = true;
                        i += 1;
                    }
                    _ => break,
                }
            }
            // The number must be followed by the `k`/`K` unit and a `_`.
            if matches!(bytes.get(i), Some(b'k' | b'K')) && bytes.get(i + 1) == Some(&b'_') {
                return rest[start..i].replace(',', ".").parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Xe_5K_1", Some(5.0))]
    #[case("Xe_12,5k_2", Some(12.5))]
    #[case("Xe_12.5k_2", Some(12.5))]
    #[case("Xe_NoDose_3", None)]
    #[case("CO_H2O_0,75K_run4", Some(0.75))]
    #[case("no_underscore_number", None)]
    #[case("Xe", None)]
    // dosage token must sit after the first underscore: prefix is ignored
    #[case("5K_only_prefix", None)]
    // the unit must be followed by a separator
    #[case("Xe_5K", None)]
    fn naming_convention(#[case] name: &str, #[case] expected: Option<f64>) {
        assert_eq!(extract_dosage(name), expected);
    }
}
