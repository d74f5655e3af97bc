//! Reader for the dictionary literals stored in price cells.
//!
//! The scraper writes price details as a dictionary repr, e.g.
//! `{'Market': 120.0, 'MarketCurrency': 'GBP', 'Kuoni': 95, 'Refundable': True}`.
//! The literal is rewritten into JSON (double-quoted strings, lowercase
//! keywords) and then parsed with serde_json.

use roomberg_core::{Error, Result};
use serde_json::{Map, Value};

/// Parse a dictionary literal into a JSON object.
pub fn parse_mapping(text: &str) -> Result<Map<String, Value>> {
    let json = to_json(text)?;
    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::literal("literal is not a mapping")),
        Err(e) => Err(Error::literal(e.to_string())),
    }
}

/// Rewrite a literal into JSON text.
///
/// `True`, `False` and `None` are only replaced as whole words outside of
/// strings.
pub fn to_json(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some('\\') => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => return Err(Error::literal("unterminated string")),
                        },
                        Some('"') => out.push_str("\\\""),
                        Some(other) => out.push(other),
                        None => return Err(Error::literal("unterminated string")),
                    }
                }
                out.push('"');
            }
            '"' => {
                out.push('"');
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            let escaped = chars
                                .next()
                                .ok_or_else(|| Error::literal("unterminated string"))?;
                            out.push('\\');
                            out.push(escaped);
                        }
                        Some(other) => out.push(other),
                        None => return Err(Error::literal("unterminated string")),
                    }
                }
                out.push('"');
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    other => other,
                });
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_mapping() {
        let map = parse_mapping(
            "{'Market': 100.0, 'MarketCurrency': 'GBP', 'Kuoni': 80, 'KuoniCurrency': 'GBP'}",
        )
        .unwrap();
        assert_eq!(map["Market"], json!(100.0));
        assert_eq!(map["Kuoni"], json!(80));
        assert_eq!(map["KuoniCurrency"], json!("GBP"));
    }

    #[test]
    fn test_keywords_at_token_boundaries() {
        let map = parse_mapping("{'a': True, 'b': False, 'c': None}").unwrap();
        assert_eq!(map["a"], json!(true));
        assert_eq!(map["b"], json!(false));
        assert_eq!(map["c"], Value::Null);
    }

    #[test]
    fn test_keywords_inside_strings_untouched() {
        let map = parse_mapping("{'note': 'None of True is False', 'Nonesuch': 1}").unwrap();
        assert_eq!(map["note"], json!("None of True is False"));
        assert_eq!(map["Nonesuch"], json!(1));
    }

    #[test]
    fn test_quotes_inside_strings() {
        let map = parse_mapping(r#"{'name': 'it\'s "grand"', "other": 'x'}"#).unwrap();
        assert_eq!(map["name"], json!("it's \"grand\""));
        assert_eq!(map["other"], json!("x"));
    }

    #[test]
    fn test_nested_values() {
        let map = parse_mapping("{'rooms': [{'n': 2}, None], 'rate': -1.5e2}").unwrap();
        assert_eq!(map["rooms"], json!([{"n": 2}, null]));
        assert_eq!(map["rate"], json!(-150.0));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_mapping("{'Market': 100").is_err());
        assert!(parse_mapping("{'Market: 100}").is_err());
        assert!(parse_mapping("{'Market': undefined}").is_err());
        assert!(parse_mapping("[1, 2]").is_err());
        assert!(parse_mapping("garbage").is_err());
    }
}
