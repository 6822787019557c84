use lazy_static::lazy_static;
use regex::Regex;

/// Fallback serving weight when a source gives no usable gram value.
pub const DEFAULT_GRAMS: f64 = 100.0;
const DEFAULT_LABEL: &str = "100 g";

lazy_static! {
    // Parenthesized quantity takes precedence: "1 bar (40 g)" -> 40
    static ref PAREN_QTY: Regex =
        Regex::new(r"(?i)\(\s*(\d+(?:[.,]\d+)?)\s*(?:g|ml)\b").unwrap();
    // Bare quantity anywhere in the string: "250ml" -> 250
    static ref BARE_QTY: Regex =
        Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:g|ml)\b").unwrap();
}

/// A serving description reduced to a display label and a gram weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedServing {
    /// Trimmed original text, or "100 g" when the input was empty
    pub label: String,
    /// Always positive; defaults to 100 when no usable value was found
    pub grams: f64,
    /// Whether the source stated a serving at all, even if the numeric
    /// weight had to fall back to the default
    pub provided: bool,
}

impl ParsedServing {
    fn default_serving(provided: bool) -> Self {
        ParsedServing {
            label: DEFAULT_LABEL.to_string(),
            grams: DEFAULT_GRAMS,
            provided,
        }
    }
}

/// Extract a label and gram weight from a free-text serving description.
/// Malformed input never errors; it degrades to the 100 g default.
pub fn parse_serving(raw: Option<&str>) -> ParsedServing {
    let raw = match raw {
        Some(s) => s.trim(),
        None => return ParsedServing::default_serving(false),
    };
    if raw.is_empty() {
        return ParsedServing::default_serving(false);
    }

    let grams = extract_grams(raw)
        .filter(|g| *g > 0.0)
        .unwrap_or(DEFAULT_GRAMS);

    ParsedServing {
        label: raw.to_string(),
        grams,
        provided: true,
    }
}

fn extract_grams(raw: &str) -> Option<f64> {
    let captures = PAREN_QTY.captures(raw).or_else(|| BARE_QTY.captures(raw))?;
    captures.get(1)?.as_str().replace(',', ".").parse().ok()
}
