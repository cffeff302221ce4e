//! Python literal syntax for argument values.

use crate::scene::ArgValue;

/// Render a literal argument the way Python's `repr` would.
pub fn python_literal(value: &ArgValue) -> String {
    match value {
        ArgValue::Bool(true) => "True".to_string(),
        ArgValue::Bool(false) => "False".to_string(),
        ArgValue::Int(v) => v.to_string(),
        ArgValue::Float(v) => python_float(*v),
        ArgValue::Str(s) => python_string(s),
    }
}

pub fn python_float(v: f64) -> String {
    if v.is_nan() {
        "float('nan')".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else {
        // Debug keeps the trailing ".0" on integral values
        format!("{:?}", v)
    }
}

/// Single-quoted Python string literal.
pub fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Python boolean keyword.
pub fn python_bool(v: bool) -> &'static str {
    if v {
        "True"
    } else {
        "False"
    }
}
