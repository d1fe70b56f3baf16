use std::fmt;

use crate::errors::InterpretError;

/// A tagged scalar. Equality is tolerance-sensitive for the float tags, so `Value`
/// deliberately does not derive `PartialEq` — use [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Double(f64),
    Str(String),
}

impl Value {
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Float/double equality within `precision`; int/string equality is exact.
/// `precision` must share the comparands' tag for the float tags, or carry the
/// same tag when both comparands are float/double — mismatches are fatal, since
/// they indicate a malformed solver file rather than a failed candidate.
pub fn compare(precision: &Value, a: &Value, b: &Value) -> Result<bool, InterpretError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Str(x), Value::Str(y)) => Ok(x == y),
        (Value::Float(x), Value::Float(y)) => match precision {
            Value::Float(p) => Ok((x - y).abs() <= *p),
            other => Err(InterpretError::PrecisionTagMismatch {
                precision_tag: other.tag(),
                value_tag: "float",
            }),
        },
        (Value::Double(x), Value::Double(y)) => match precision {
            Value::Double(p) => Ok((x - y).abs() <= *p),
            other => Err(InterpretError::PrecisionTagMismatch {
                precision_tag: other.tag(),
                value_tag: "double",
            }),
        },
        (left, right) => Err(InterpretError::TypeMismatch {
            op: "compare",
            detail: format!("{} == {}", left.tag(), right.tag()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_equality_is_exact() {
        assert!(compare(&Value::Int(0), &Value::Int(5), &Value::Int(5)).unwrap());
        assert!(!compare(&Value::Int(0), &Value::Int(5), &Value::Int(6)).unwrap());
    }

    #[test]
    fn float_equality_is_tolerance_monotone() {
        let precision = Value::Float(0.5);
        assert!(compare(&precision, &Value::Float(2.0), &Value::Float(3.49)).unwrap());
        assert!(!compare(&precision, &Value::Float(2.0), &Value::Float(4.0)).unwrap());
    }

    #[test]
    fn precision_tag_mismatch_is_fatal() {
        let precision = Value::Int(0);
        assert!(matches!(
            compare(&precision, &Value::Float(1.0), &Value::Float(1.0)),
            Err(InterpretError::PrecisionTagMismatch { .. })
        ));
    }

    #[test]
    fn mismatched_types_are_fatal() {
        assert!(matches!(
            compare(&Value::Int(0), &Value::Int(1), &Value::Str("1".into())),
            Err(InterpretError::TypeMismatch { .. })
        ));
    }
}
