//! JSON number arithmetic helpers.

use serde_json::{Number, Value};

/// Adds two JSON numbers, preserving integers where possible.
///
/// Both values must be numbers. If both fit in `i64` the result stays an
/// integer; otherwise the addition happens in `f64`. Returns `None` when
/// either value is not a number.
#[must_use]
pub fn add_numbers(current: &Value, delta: &Value) -> Option<Value> {
    let (Value::Number(a), Value::Number(b)) = (current, delta) else {
        return None;
    };
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Some(Value::Number(Number::from(sum)));
        }
    }
    let sum = a.as_f64()? + b.as_f64()?;
    Number::from_f64(sum).map(Value::Number)
}

/// Negates a JSON number, preserving integers where possible.
#[must_use]
pub fn negate_number(n: &Number) -> Number {
    if let Some(i) = n.as_i64() {
        if let Some(neg) = i.checked_neg() {
            return Number::from(neg);
        }
    }
    n.as_f64()
        .and_then(|f| Number::from_f64(-f))
        .unwrap_or_else(|| Number::from(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_addition_stays_integer() {
        let sum = add_numbers(&json!(2), &json!(3)).unwrap();
        assert_eq!(sum, json!(5));
        assert!(sum.is_i64());
    }

    #[test]
    fn float_addition() {
        let sum = add_numbers(&json!(1.5), &json!(2)).unwrap();
        assert_eq!(sum, json!(3.5));
    }

    #[test]
    fn non_numbers_are_rejected() {
        assert!(add_numbers(&json!("five"), &json!(1)).is_none());
        assert!(add_numbers(&json!(1), &json!(null)).is_none());
        assert!(add_numbers(&json!([1]), &json!(1)).is_none());
    }

    #[test]
    fn overflow_falls_back_to_float() {
        let sum = add_numbers(&json!(i64::MAX), &json!(1)).unwrap();
        assert!(sum.is_f64());
    }

    #[test]
    fn negate() {
        assert_eq!(Value::Number(negate_number(&Number::from(3))), json!(-3));
        assert_eq!(
            Value::Number(negate_number(&Number::from_f64(1.5).unwrap())),
            json!(-1.5)
        );
    }
}
