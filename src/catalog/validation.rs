//! Product field validation.
//!
//! Works on the raw JSON body rather than a typed struct so that type mismatches
//! (`"price": "12"`, `"inStock": "yes"`) are reported as messages instead of
//! deserialization failures. Every field is checked; messages accumulate.

use serde_json::Value;

pub const NAME_MESSAGE: &str = "Name is required and must be a non-empty string";
pub const DESCRIPTION_MESSAGE: &str = "Description is required and must be a string";
pub const PRICE_MESSAGE: &str = "Price is required and must be a non-negative number";
pub const CATEGORY_MESSAGE: &str = "Category is required and must be a non-empty string";
pub const IN_STOCK_MESSAGE: &str = "InStock must be a boolean value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every field must be present
    Full,
    /// Absent fields are skipped; present ones are still checked
    Partial,
}

type FieldRule = (&'static str, fn(&Value) -> bool, &'static str);

const RULES: [FieldRule; 5] = [
    ("name", is_non_empty_string, NAME_MESSAGE),
    ("description", is_non_empty_string, DESCRIPTION_MESSAGE),
    ("price", is_non_negative_number, PRICE_MESSAGE),
    ("category", is_non_empty_string, CATEGORY_MESSAGE),
    ("inStock", Value::is_boolean, IN_STOCK_MESSAGE),
];

/// Check `fields` and return every violation; an empty vector means valid.
///
/// A body that is not a JSON object has every field absent.
pub fn validate_product(fields: &Value, mode: ValidationMode) -> Vec<String> {
    RULES
        .iter()
        .filter_map(|(key, is_valid, message)| match (fields.get(*key), mode) {
            (None, ValidationMode::Partial) => None,
            (None, ValidationMode::Full) => Some(message.to_string()),
            (Some(value), _) if is_valid(value) => None,
            (Some(_), _) => Some(message.to_string()),
        })
        .collect()
}

fn is_non_empty_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn is_non_negative_number(value: &Value) -> bool {
    value.as_f64().is_some_and(|n| n >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "name": "Pen",
            "description": "Blue ink pen",
            "price": 1.5,
            "category": "Office",
            "inStock": true
        })
    }

    #[test]
    fn test_valid_full_body() {
        assert!(validate_product(&valid_body(), ValidationMode::Full).is_empty());
    }

    #[test]
    fn test_empty_body_reports_every_field() {
        let errors = validate_product(&json!({}), ValidationMode::Full);
        assert_eq!(
            errors,
            vec![
                NAME_MESSAGE,
                DESCRIPTION_MESSAGE,
                PRICE_MESSAGE,
                CATEGORY_MESSAGE,
                IN_STOCK_MESSAGE
            ]
        );
    }

    #[test]
    fn test_partial_skips_absent_fields() {
        assert!(validate_product(&json!({}), ValidationMode::Partial).is_empty());
        assert!(validate_product(&json!({ "price": 0 }), ValidationMode::Partial).is_empty());
    }

    #[test]
    fn test_partial_still_reports_malformed_fields() {
        let errors = validate_product(
            &json!({ "name": "   ", "inStock": "yes", "price": null }),
            ValidationMode::Partial,
        );
        assert_eq!(errors, vec![NAME_MESSAGE, PRICE_MESSAGE, IN_STOCK_MESSAGE]);
    }

    #[test]
    fn test_type_mismatches() {
        let mut body = valid_body();
        body["price"] = json!("12.50");
        body["inStock"] = json!(1);
        body["category"] = json!(["Office"]);

        let errors = validate_product(&body, ValidationMode::Full);
        assert_eq!(errors, vec![PRICE_MESSAGE, CATEGORY_MESSAGE, IN_STOCK_MESSAGE]);
    }

    #[test]
    fn test_negative_price() {
        let mut body = valid_body();
        body["price"] = json!(-0.01);
        assert_eq!(validate_product(&body, ValidationMode::Full), vec![PRICE_MESSAGE]);

        body["price"] = json!(0);
        assert!(validate_product(&body, ValidationMode::Full).is_empty());
    }

    #[test]
    fn test_blank_description_message() {
        let mut body = valid_body();
        body["description"] = json!("  ");

        let errors = validate_product(&body, ValidationMode::Full);
        assert_eq!(errors, vec!["Description is required and must be a string"]);
    }

    #[test]
    fn test_non_object_body() {
        assert_eq!(validate_product(&json!([1, 2]), ValidationMode::Full).len(), 5);
        assert!(validate_product(&json!("text"), ValidationMode::Partial).is_empty());
    }
}
