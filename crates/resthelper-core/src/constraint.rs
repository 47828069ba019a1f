//! Caller-supplied equality constraints.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One `(attribute, value)` equality predicate.
///
/// A field-set lookup ANDs every constraint it receives. Callers that build
/// constraint lists conditionally may pass `None` entries; those are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    /// Attribute name on the target entity.
    pub name: String,
    /// Value the attribute must equal.
    pub value: Value,
}

impl FieldConstraint {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_decodes_from_json() {
        let c: FieldConstraint =
            serde_json::from_str(r#"{"name": "gender", "value": "F"}"#).unwrap();
        assert_eq!(c, FieldConstraint::new("gender", "F"));

        let c: FieldConstraint =
            serde_json::from_str(r#"{"name": "voided", "value": false}"#).unwrap();
        assert_eq!(c.value(), &Value::Bool(false));

        let c: FieldConstraint =
            serde_json::from_str(r#"{"name": "tags", "value": [1, 2]}"#).unwrap();
        assert_eq!(c.value(), &Value::Json(serde_json::json!([1, 2])));
    }
}
