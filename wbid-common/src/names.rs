//! Species name canonicalization
//!
//! Classifier labels and catalog rows both spell scientific names loosely
//! (`Gallus_Gallus`, `gallus gallus `). Every membership comparison goes
//! through [`normalize_scientific_name`] on both sides; the SQL side mirrors
//! it with `LOWER(TRIM(REPLACE(scientific_name, '_', ' ')))`.

/// Lowercase, replace underscores with spaces, trim surrounding whitespace.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
///
/// # Examples
/// ```
/// use wbid_common::names::normalize_scientific_name;
///
/// assert_eq!(normalize_scientific_name("Gallus_Gallus"), "gallus gallus");
/// assert_eq!(
///     normalize_scientific_name("Gallus_Gallus"),
///     normalize_scientific_name("gallus gallus")
/// );
/// ```
pub fn normalize_scientific_name(name: &str) -> String {
    name.to_lowercase().replace('_', " ").trim().to_string()
}

/// Human-readable species name from a raw class label.
///
/// Underscores become spaces and each word is title-cased, so
/// `anas_platyrhynchos` renders as `Anas Platyrhynchos`.
pub fn display_name(label: &str) -> String {
    title_case(&label.replace('_', " "))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["Gallus_Gallus", "  Anas platyrhynchos ", "ARDEA_ALBA", "x"] {
            let once = normalize_scientific_name(raw);
            assert_eq!(normalize_scientific_name(&once), once);
        }
    }

    #[test]
    fn underscores_and_case_compare_equal() {
        assert_eq!(
            normalize_scientific_name("Gallus_Gallus"),
            normalize_scientific_name("gallus gallus")
        );
    }

    #[test]
    fn trailing_underscore_is_trimmed() {
        assert_eq!(normalize_scientific_name("anas_crecca_"), "anas crecca");
    }

    #[test]
    fn display_name_title_cases_words() {
        assert_eq!(display_name("anas_platyrhynchos"), "Anas Platyrhynchos");
        assert_eq!(display_name("ANAS_PLATYRHYNCHOS"), "Anas Platyrhynchos");
        assert_eq!(display_name("Tringa_ochropus"), "Tringa Ochropus");
    }

    #[test]
    fn display_name_keeps_hyphenated_parts_capitalized() {
        assert_eq!(display_name("black-winged_stilt"), "Black-Winged Stilt");
    }
}
