//! Nesting-depth guard against pathologically nested payloads.
//!
//! The root value sits at depth 0 and every value held by an array or object
//! sits one level deeper than its container.  Both walks use an explicit
//! stack, so an adversarial payload cannot exhaust the call stack here.

use serde_json::Value;

/// Default ceiling used by the request guard.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Returns `false` if any value inside `value` sits deeper than `max_depth`.
///
/// The walk stops at the first offending value.
///
/// ```rust
/// use input_sanitizer::is_secure_object;
/// use serde_json::json;
///
/// assert!(is_secure_object(&json!({"a": {"b": 1}}), 2));
/// assert!(!is_secure_object(&json!({"a": {"b": 1}}), 1));
/// ```
pub fn is_secure_object(value: &Value, max_depth: usize) -> bool {
    let mut stack: Vec<(&Value, usize)> = vec![(value, 0)];

    while let Some((current, depth)) = stack.pop() {
        if depth > max_depth {
            return false;
        }
        push_children(current, depth, &mut stack);
    }

    true
}

/// Depth of the deepest value inside `value`.
///
/// Scalars and empty containers have depth 0.
pub fn nesting_depth(value: &Value) -> usize {
    let mut stack: Vec<(&Value, usize)> = vec![(value, 0)];
    let mut deepest = 0;

    while let Some((current, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        push_children(current, depth, &mut stack);
    }

    deepest
}

fn push_children<'a>(value: &'a Value, depth: usize, stack: &mut Vec<(&'a Value, usize)>) {
    match value {
        Value::Array(items) => stack.extend(items.iter().map(|v| (v, depth + 1))),
        Value::Object(map) => stack.extend(map.values().map(|v| (v, depth + 1))),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested(levels: usize) -> Value {
        (0..levels).fold(json!("leaf"), |inner, i| {
            if i % 2 == 0 {
                json!([inner])
            } else {
                json!({ "k": inner })
            }
        })
    }

    #[test]
    fn scalars_have_depth_zero() {
        assert_eq!(nesting_depth(&json!(1)), 0);
        assert_eq!(nesting_depth(&json!("x")), 0);
        assert_eq!(nesting_depth(&json!(null)), 0);
    }

    #[test]
    fn empty_containers_have_depth_zero() {
        assert_eq!(nesting_depth(&json!([])), 0);
        assert_eq!(nesting_depth(&json!({})), 0);
    }

    #[test]
    fn depth_counts_container_levels() {
        for levels in 0..8 {
            assert_eq!(nesting_depth(&nested(levels)), levels);
        }
    }

    #[test]
    fn deepest_branch_wins() {
        let v = json!({ "shallow": 1, "deep": { "a": [[{ "b": 2 }]] } });
        assert_eq!(nesting_depth(&v), 5);
    }

    #[test]
    fn guard_threshold_is_inclusive() {
        let v = nested(5);
        assert!(is_secure_object(&v, 5));
        assert!(!is_secure_object(&v, 4));
        assert!(is_secure_object(&v, DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn zero_depth_only_admits_scalars_and_empty_containers() {
        assert!(is_secure_object(&json!("x"), 0));
        assert!(is_secure_object(&json!({}), 0));
        assert!(!is_secure_object(&json!([1]), 0));
    }

    #[test]
    fn very_deep_payload_does_not_overflow() {
        let mut v = json!(0);
        for _ in 0..100_000 {
            v = Value::Array(vec![v]);
        }
        assert!(!is_secure_object(&v, DEFAULT_MAX_DEPTH));
        assert_eq!(nesting_depth(&v), 100_000);
        // Dropping a value this deep recurses inside serde_json.
        std::mem::forget(v);
    }
}
