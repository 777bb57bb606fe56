//! # Metadata Text Serializer
//!
//! Renders an [`Object`] as compact text (no inserted whitespace) that
//! [`parse`](super::parse) reads back to an equal value.

use super::error::SerializeError;
use super::parser::MAX_NESTING_DEPTH;
use super::value::{Object, Value};

/// Serialize a metadata document.
///
/// Entries whose value is [`Value::Null`] are skipped. Floats always carry a
/// `.` so they parse back as floats.
///
/// # Errors
/// [`SerializeError::UnsupportedValueType`] for values the parser could not
/// read back: a null inside an array, a negative number, a non-finite float,
/// or containers nested deeper than [`MAX_NESTING_DEPTH`].
pub fn serialize(object: &Object) -> Result<String, SerializeError> {
    let mut out = String::new();
    write_object(&mut out, object, 0)?;
    Ok(out)
}

fn write_object(out: &mut String, object: &Object, depth: usize) -> Result<(), SerializeError> {
    out.push('{');
    let mut first = true;
    for (key, value) in object {
        if value.is_null() {
            continue;
        }
        if !first {
            out.push(',');
        }
        first = false;
        write_string(out, key);
        out.push(':');
        write_value(out, value, depth)?;
    }
    out.push('}');
    Ok(())
}

/// `depth` counts the containers already open below the top-level object.
fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), SerializeError> {
    if matches!(value, Value::Object(_) | Value::Array(_)) && depth >= MAX_NESTING_DEPTH {
        return Err(SerializeError::UnsupportedValueType(format!(
            "{} nested deeper than {MAX_NESTING_DEPTH} levels",
            value.type_name()
        )));
    }
    match value {
        Value::Object(map) => write_object(out, map, depth + 1)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, depth + 1)?;
            }
            out.push(']');
        }
        Value::Str(s) => write_string(out, s),
        Value::Int(n) if *n < 0 => return Err(unsupported(value)),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(f) => write_float(out, *f).ok_or_else(|| unsupported(value))?,
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => return Err(unsupported(value)),
    }
    Ok(())
}

fn write_float(out: &mut String, f: f64) -> Option<()> {
    if !f.is_finite() || f < 0.0 {
        return None;
    }
    // -0.0 compares equal to zero but displays with a sign
    let text = if f == 0.0 { "0".to_string() } else { f.to_string() };
    out.push_str(&text);
    if !text.contains('.') {
        out.push_str(".0");
    }
    Some(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn unsupported(value: &Value) -> SerializeError {
    let detail = match value {
        Value::Int(n) => format!("negative integer {n}"),
        Value::Float(f) => format!("float {f}"),
        other => other.type_name().to_string(),
    };
    SerializeError::UnsupportedValueType(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::parse;

    fn obj(entries: Vec<(&str, Value)>) -> Object {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_compact_output() {
        let meta = obj(vec![
            ("author", Value::from("John Doe")),
            ("year", Value::Int(2025)),
        ]);
        assert_eq!(serialize(&meta).unwrap(), r#"{"author":"John Doe","year":2025}"#);
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(serialize(&Object::new()).unwrap(), "{}");
    }

    #[test]
    fn test_null_entries_skipped() {
        let meta = obj(vec![
            ("a", Value::Null),
            ("b", Value::Bool(true)),
            ("c", Value::Null),
        ]);
        assert_eq!(serialize(&meta).unwrap(), r#"{"b":true}"#);
    }

    #[test]
    fn test_float_keeps_decimal_point() {
        let meta = obj(vec![("a", Value::Float(2.0)), ("b", Value::Float(0.125))]);
        let text = serialize(&meta).unwrap();
        assert_eq!(text, r#"{"a":2.0,"b":0.125}"#);
        assert_eq!(parse(&text).unwrap(), meta);
    }

    #[test]
    fn test_negative_zero_renders_as_zero() {
        let meta = obj(vec![("z", Value::Float(-0.0))]);
        assert_eq!(serialize(&meta).unwrap(), r#"{"z":0.0}"#);
    }

    #[test]
    fn test_escapes() {
        let meta = obj(vec![("k\"", Value::from("line\none\ttab\\ \r"))]);
        let text = serialize(&meta).unwrap();
        assert_eq!(text, r#"{"k\"":"line\none\ttab\\ \r"}"#);
        assert_eq!(parse(&text).unwrap(), meta);
    }

    #[test]
    fn test_nested_round_trip() {
        let inner = obj(vec![("tags", Value::from(vec!["a", "b"])), ("n", Value::Int(7))]);
        let meta = obj(vec![
            ("inner", Value::Object(inner)),
            ("list", Value::Array(vec![Value::Float(1.5), Value::Bool(false), Value::Array(vec![])])),
            ("unicode", Value::from("日本語 ✓")),
        ]);
        let text = serialize(&meta).unwrap();
        assert_eq!(parse(&text).unwrap(), meta);
    }

    fn nested_arrays(levels: usize) -> Value {
        let mut value = Value::Int(1);
        for _ in 0..levels {
            value = Value::Array(vec![value]);
        }
        value
    }

    #[test]
    fn test_nesting_limit_matches_parser() {
        let meta = obj(vec![("a", nested_arrays(MAX_NESTING_DEPTH))]);
        let text = serialize(&meta).unwrap();
        assert_eq!(parse(&text).unwrap(), meta);

        let too_deep = obj(vec![("a", nested_arrays(MAX_NESTING_DEPTH + 1))]);
        assert!(matches!(
            serialize(&too_deep),
            Err(SerializeError::UnsupportedValueType(_))
        ));
    }

    #[test]
    fn test_unsupported_values() {
        let cases = vec![
            Value::Array(vec![Value::Null]),
            Value::Int(-1),
            Value::Float(-2.5),
            Value::Float(f64::NAN),
            Value::Float(f64::INFINITY),
        ];
        for value in cases {
            let meta = obj(vec![("bad", value)]);
            assert!(matches!(
                serialize(&meta),
                Err(SerializeError::UnsupportedValueType(_))
            ));
        }
    }
}
