//! S-expression helpers shared by config overrides, frame replay and event
//! output.

use lexpr::Value;

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `t` / `nil` rendering of a boolean.
pub fn bool_sexp(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

/// Render an optional number, `nil` when unset.
pub fn opt_float_sexp(v: Option<f64>) -> String {
    v.map(|x| format!("{:.3}", x))
        .unwrap_or_else(|| "nil".to_string())
}

/// Format an event s-expression: `(:type :event :event :<name> ...)`.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

fn is_key(v: &Value, key: &str) -> bool {
    match v {
        Value::Keyword(k) => k.as_ref() == key,
        Value::Symbol(s) => s.strip_prefix(':') == Some(key),
        _ => false,
    }
}

/// Look up the raw value following `:key` in a plist.
///
/// Accepts both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser).
pub fn plist_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = value;
    while let Value::Cons(pair) = current {
        let Value::Cons(next) = pair.cdr() else {
            return None;
        };
        if is_key(pair.car(), key) {
            return Some(next.car());
        }
        // Values are never matched as keys.
        current = next.cdr();
    }
    None
}

/// Keys present in a plist, in order, without the leading colon.
pub fn plist_keys(value: &Value) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        match pair.car() {
            Value::Keyword(k) => keys.push(k.to_string()),
            Value::Symbol(s) => {
                if let Some(k) = s.strip_prefix(':') {
                    keys.push(k.to_string());
                }
            }
            _ => {}
        }
        // Skip the value cell.
        current = match pair.cdr() {
            Value::Cons(next) => next.cdr(),
            _ => break,
        };
    }
    keys
}

/// Textual form of a plist value: keywords lose their colon, booleans and
/// the empty list become `t`/`nil`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = plist_get(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => v.strip_prefix(':').unwrap_or(v).to_string(),
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => bool_sexp(*b).to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        other => other.to_string(),
    })
}

/// Numeric value of a leaf.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Elements of a proper list; anything else yields an empty vector.
pub fn list_items(value: &Value) -> Vec<&Value> {
    let mut items = Vec::new();
    let mut current = value;
    while let Value::Cons(pair) = current {
        items.push(pair.car());
        current = pair.cdr();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_format_event() {
        assert_eq!(
            format_event("zoom-step", &[("steps", "2")]),
            "(:type :event :event :zoom-step :steps 2)"
        );
        assert_eq!(format_event("click", &[]), "(:type :event :event :click)");
    }

    #[test]
    fn test_get_keyword_from_plist() {
        let v = lexpr::from_str("(:mode :touch :name \"x\" :n 3)").unwrap();
        assert_eq!(get_keyword(&v, "mode"), Some("touch".to_string()));
        assert_eq!(get_keyword(&v, "name"), Some("x".to_string()));
        assert_eq!(get_keyword(&v, "n"), Some("3".to_string()));
        assert_eq!(get_keyword(&v, "missing"), None);
    }

    #[test]
    fn test_as_f64_accepts_integers() {
        let v = lexpr::from_str("(:a 1.5 :b 2 :c -0.25 :d \"1.5\")").unwrap();
        let get = |k| plist_get(&v, k).and_then(as_f64);
        assert_eq!(get("a"), Some(1.5));
        assert_eq!(get("b"), Some(2.0));
        assert_eq!(get("c"), Some(-0.25));
        assert_eq!(get("d"), None);
    }

    #[test]
    fn test_boolean_keywords() {
        let v = lexpr::from_str("(:on t :off nil)").unwrap();
        assert_eq!(get_keyword(&v, "on"), Some("t".to_string()));
        assert_eq!(get_keyword(&v, "off"), Some("nil".to_string()));
    }

    #[test]
    fn test_values_are_not_keys() {
        let v = lexpr::from_str("(:mode :touch :touch 5)").unwrap();
        assert_eq!(get_keyword(&v, "touch"), Some("5".to_string()));
    }

    #[test]
    fn test_plist_keys() {
        let v = lexpr::from_str("(:a 1 :b (1 2) :c \"x\")").unwrap();
        assert_eq!(plist_keys(&v), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_items() {
        let v = lexpr::from_str("(:xs (1 2 3))").unwrap();
        let xs = plist_get(&v, "xs").unwrap();
        let nums: Vec<f64> = list_items(xs).into_iter().filter_map(as_f64).collect();
        assert_eq!(nums, vec![1.0, 2.0, 3.0]);
        assert!(list_items(&Value::Null).is_empty());
    }

    #[test]
    fn test_opt_float_sexp() {
        assert_eq!(opt_float_sexp(None), "nil");
        assert_eq!(opt_float_sexp(Some(1.5)), "1.500");
    }
}
