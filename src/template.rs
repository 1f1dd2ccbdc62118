//! `${key}` placeholder substitution
//!
//! The certificate SVG and the email bodies are plain text templates with
//! `${field}` placeholders that must each resolve to exactly one key in the
//! render context. An unresolved placeholder is an error, never silently
//! passed through, so a typo in a template fails the batch instead of
//! mailing out a certificate with a literal `${name}` on it.

use std::collections::HashMap;

use crate::{Error, Result};

/// Substitute every `${key}` in `template` with the matching context value.
///
/// Fails with [`Error::MissingKey`] when a placeholder has no context entry
/// and [`Error::Malformed`] when a `${` is never closed. Text outside
/// placeholders, including bare `$` signs, is copied through verbatim.
pub fn render(template: &str, context: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            let mut tail: String = rest[start..].chars().take(24).collect();
            if rest[start..].chars().count() > 24 {
                tail.push_str("...");
            }
            Error::Malformed(tail)
        })?;
        let key = &after[..end];
        let value = context
            .get(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_placeholders() {
        let ctx = context(&[("name", "JANE DOE"), ("marathon", "Lakeside Marathon")]);
        let rendered = render("${name} finished the ${marathon}.", &ctx).unwrap();
        assert_eq!(rendered, "JANE DOE finished the Lakeside Marathon.");
    }

    #[test]
    fn test_missing_key() {
        let ctx = context(&[("name", "JANE DOE")]);
        let err = render("${name} ran ${distance} km", &ctx).unwrap_err();
        match err {
            Error::MissingKey(key) => assert_eq!(key, "distance"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_placeholder() {
        let ctx = context(&[("name", "JANE DOE")]);
        let err = render("congrats ${name", &ctx).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_bare_dollar_passes_through() {
        let ctx = context(&[("fee", "25")]);
        let rendered = render("entry fee: $${fee} (was $30)", &ctx).unwrap();
        assert_eq!(rendered, "entry fee: $25 (was $30)");
    }

    #[test]
    fn test_deterministic() {
        let ctx = context(&[("name", "ALEX"), ("year", "2024")]);
        let template = "<text>${name}</text><text>${year}</text>";
        let first = render(template, &ctx).unwrap();
        let second = render(template, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjacent_and_repeated_placeholders() {
        let ctx = context(&[("a", "x"), ("b", "y")]);
        assert_eq!(render("${a}${b}${a}", &ctx).unwrap(), "xyx");
    }
}
