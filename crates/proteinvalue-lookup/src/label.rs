// Nutrition-label text heuristics. OCR output is messy, so this is
// best-effort pattern matching: extract what we can, admit nothing.
use regex::Regex;
use tracing::debug;

/// Servings-per-container values outside this range are OCR noise, not food.
const SERVINGS_SANITY: std::ops::RangeInclusive<u32> = 1..=500;

/// Best-effort values pulled out of recognized label text. Advisory only -
/// the user confirms or corrects before anything reaches the store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelReading {
    /// Grams of protein per serving.
    pub protein: Option<f64>,
    /// Servings per container.
    pub servings: Option<u32>,
}

impl LabelReading {
    pub fn is_empty(&self) -> bool {
        self.protein.is_none() && self.servings.is_none()
    }
}

/// Scan recognized label text for protein and serving counts.
///
/// Never fails: text with nothing recognizable simply produces empty fields.
pub fn parse_label_text(text: &str) -> LabelReading {
    let reading = LabelReading {
        protein: extract_protein(text),
        servings: extract_servings(text),
    };
    debug!(
        "Label text parsed: protein={:?} servings={:?}",
        reading.protein, reading.servings
    );
    reading
}

/// Protein grams: "Protein 25g", "protein: 24.5 g", "25 g protein",
/// "protein 25 grams".
fn extract_protein(text: &str) -> Option<f64> {
    let patterns = [
        r"(?i)protein[:\s]*(\d+(?:\.\d+)?)\s*g(?:rams?)?\b",
        r"(?i)(\d+(?:\.\d+)?)\s*g(?:rams?)?\s*(?:of\s*)?protein",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(text) {
            if let Ok(grams) = caps[1].parse::<f64>() {
                if grams > 0.0 {
                    return Some(grams);
                }
            }
        }
    }
    None
}

/// Servings per container: "Servings Per Container 30", "servings: 24",
/// "about 30 servings", "24 servings".
fn extract_servings(text: &str) -> Option<u32> {
    let patterns = [
        r"(?i)servings?\s*(?:per\s*container)?[:\s]+(\d+)",
        r"(?i)about\s*(\d+)\s*servings?",
        r"(?i)(\d+)\s*servings?",
    ];

    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(text) {
            if let Ok(count) = caps[1].parse::<u32>() {
                if SERVINGS_SANITY.contains(&count) {
                    return Some(count);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_typical_label() {
        let text = "Nutrition Facts\nServings Per Container 30\nProtein 24g\nCalcium 10%";
        let reading = parse_label_text(text);
        assert_eq!(reading.protein, Some(24.0));
        assert_eq!(reading.servings, Some(30));
        assert!(!reading.is_empty());
    }

    #[test]
    fn reads_colon_and_decimal_variants() {
        let reading = parse_label_text("protein: 24.5 g\nservings: 25");
        assert_eq!(reading.protein, Some(24.5));
        assert_eq!(reading.servings, Some(25));
    }

    #[test]
    fn reads_amount_before_keyword() {
        let reading = parse_label_text("Each scoop has 25 g protein. About 30 servings.");
        assert_eq!(reading.protein, Some(25.0));
        assert_eq!(reading.servings, Some(30));
    }

    #[test]
    fn reads_grams_spelled_out() {
        let reading = parse_label_text("PROTEIN 21 GRAMS per scoop");
        assert_eq!(reading.protein, Some(21.0));
    }

    #[test]
    fn implausible_serving_counts_are_rejected() {
        let reading = parse_label_text("servings per container 9999");
        assert_eq!(reading.servings, None);
    }

    #[test]
    fn garbage_degrades_to_empty_reading() {
        let reading = parse_label_text("l0rem 1psum @@ %% ##");
        assert!(reading.is_empty());
    }

    #[test]
    fn empty_text_degrades_to_empty_reading() {
        assert!(parse_label_text("").is_empty());
    }
}
