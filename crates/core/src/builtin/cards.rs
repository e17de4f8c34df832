//! Luhn checksum and credit card brands.

use regex::Regex;
use serde_json::Value;

use crate::handler::{Check, HandlerEntry};
use crate::messages::MessageTable;
use crate::registry::Registry;
use crate::types::scalar_text;

/// Card brands in evaluation order with their number patterns.
const BRANDS: &[(&str, &str)] = &[
    ("visa", r"4[0-9]{12}(?:[0-9]{3})?"),
    ("mastercard", r"5[1-5][0-9]{14}|2(?:2[2-9][0-9]|[3-6][0-9][0-9]|7[01][0-9]|720)[0-9]{12}"),
    ("amex", r"3[47][0-9]{13}"),
    ("dinersclub", r"3(?:0[0-5]|[68][0-9])[0-9]{11}"),
    ("discover", r"6(?:011|5[0-9][0-9])[0-9]{12}"),
    ("jcb", r"(?:2131|1800|35[0-9]{3})[0-9]{11}"),
];

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register(
        "luhn",
        HandlerEntry::test(|value, _| digits(value).is_some_and(|d| d.len() > 1 && luhn(&d))),
    );
    messages.set("luhn", "is not a valid number");

    handlers.register(
        "creditCard",
        HandlerEntry::formats(BRANDS.iter().map(|(brand, source)| (*brand, brand_check(source)))),
    );
    messages.set("creditCard", "is not a valid credit card number");
}

fn brand_check(source: &str) -> Check {
    let re = Regex::new(&format!("^(?:{source})$")).expect("builtin card pattern compiles");
    Check::test(move |value, _| digits(value).is_some_and(|d| re.is_match(&d) && luhn(&d)))
}

/// Digits of a card-like value with spaces and dashes removed.
fn digits(value: &Value) -> Option<String> {
    if matches!(value, Value::Bool(_)) {
        return None;
    }
    let cleaned: String = scalar_text(value)?
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    (!cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit())).then_some(cleaned)
}

/// Luhn (mod 10) checksum over a string of ASCII digits.
pub fn luhn(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{passes, run};
    use super::*;
    use serde_json::json;

    #[test]
    fn luhn_checksum() {
        assert!(luhn("79927398713"));
        assert!(!luhn("79927398710"));
        assert!(!luhn("7992a398713"));
    }

    #[test]
    fn luhn_handler_strips_separators() {
        assert!(passes("luhn", json!("7992 7398 713")));
        assert!(passes("luhn", json!(79927398713u64)));
        assert!(!passes("luhn", json!("0")));
        assert!(!passes("luhn", json!(true)));
    }

    #[test]
    fn card_brands() {
        assert!(passes("creditCard", json!("4111 1111 1111 1111")));
        assert!(passes("creditCard", json!("5500-0000-0000-0004")));
        assert!(passes("creditCard", json!("340000000000009")));
        assert!(passes("creditCard", json!("6011000000000004")));
        assert!(!passes("creditCard", json!("4111111111111112")));
        assert!(!passes("creditCard", json!("1234")));
    }

    #[test]
    fn pinned_brand() {
        assert!(run("creditCard", json!("4111111111111111"), json!({"format": "visa"})));
        assert!(!run("creditCard", json!("4111111111111111"), json!({"format": "amex"})));
        assert!(run(
            "creditCard",
            json!("340000000000009"),
            json!({"format": ["visa", "amex"]})
        ));
    }
}
