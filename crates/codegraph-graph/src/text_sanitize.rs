//! Text sanitisation and CSV array-field escaping shared by the storage
//! writer and the pipeline driver's file-content guard (spec §6).

/// CRLF normalised to LF, lone surrogates and BOM code points stripped,
/// other non-printable bytes removed. Rust `String`s are already valid
/// UTF-8 so "lone surrogate" here means the `\u{FFFD}` replacement
/// character a lossy read substitutes for one.
pub fn sanitize_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|&c| c != '\u{FEFF}' && c != '\u{FFFD}' && (c == '\n' || c == '\t' || !c.is_control()))
        .collect()
}

/// Binary classification per spec §6: true when more than 10% of the first
/// 1000 code units are non-printable.
pub fn is_probably_binary(text: &str) -> bool {
    let sample: Vec<char> = text.chars().take(1000).collect();
    if sample.is_empty() {
        return false;
    }
    let non_printable = sample
        .iter()
        .filter(|&&c| c != '\n' && c != '\t' && (c.is_control() || c == '\u{FFFD}'))
        .count();
    (non_printable as f64) / (sample.len() as f64) > 0.10
}

/// Joins array-field items with a comma separator, escaping backslashes and
/// commas *within* each item (`\,`, `\\`) so the separator stays
/// unambiguous — spec §6's CSV escaping boundary (scenario 6).
pub fn format_array(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.replace('\\', "\\\\").replace(',', "\\,"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_is_normalised_to_lf() {
        assert_eq!(sanitize_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn bom_and_replacement_characters_are_stripped() {
        let input = "\u{FEFF}hello\u{FFFD}world";
        assert_eq!(sanitize_text(input), "helloworld");
    }

    #[test]
    fn mostly_control_bytes_are_classified_binary() {
        let binary: String = std::iter::repeat('\u{0001}').take(200).collect();
        assert!(is_probably_binary(&binary));
        assert!(!is_probably_binary("fn main() {}\n"));
    }

    #[test]
    fn array_escaping_preserves_the_literal_backslash_comma_sequence() {
        let items = vec!["auth".to_string(), "login".to_string(), "pass,word".to_string()];
        let formatted = format_array(&items);
        assert_eq!(formatted, "auth,login,pass\\,word");
    }
}
