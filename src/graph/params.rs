//! Query parameter and procedure call rendering.
//!
//! Parameters travel inline as a `CYPHER name=value ...` prefix, so every
//! value is rendered as a Cypher literal.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::{GraphError, Result};
use crate::resultset::Value;

/// Prefixes `query` with `CYPHER` parameter bindings, in key order.
///
/// Returns `query` unchanged when `params` is empty.
pub fn prepare_query(query: &str, params: &BTreeMap<String, Value>) -> Result<String> {
    if params.is_empty() {
        return Ok(query.to_owned());
    }
    let mut out = String::from("CYPHER ");
    for (name, value) in params {
        out.push_str(name);
        out.push('=');
        literal(&mut out, value)?;
        out.push(' ');
    }
    out.push_str(query);
    Ok(out)
}

/// Renders `CALL procedure("arg",...)`, optionally followed by `YIELD a,b`.
pub fn prepare_procedure(procedure: &str, args: &[&str], yields: &[&str]) -> String {
    let mut out = format!("CALL {procedure}(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        quote(&mut out, arg);
    }
    out.push(')');
    if !yields.is_empty() {
        out.push_str(" YIELD ");
        out.push_str(&yields.join(","));
    }
    out
}

fn quote(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

fn literal(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        Value::Integer(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Double(v) => {
            if !v.is_finite() {
                return Err(GraphError::InvalidArgument(format!(
                    "non-finite double {v} cannot be sent as a parameter"
                )));
            }
            let _ = write!(out, "{v:?}");
        }
        Value::String(v) => quote(out, v),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                literal(out, item)?;
            }
            out.push(']');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                literal(out, item)?;
            }
            out.push('}');
        }
        Value::Point(p) => {
            let _ = write!(
                out,
                "point({{latitude: {:?}, longitude: {:?}}})",
                p.latitude(),
                p.longitude()
            );
        }
        Value::Vector(items) => {
            out.push_str("vecf32([");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{item:?}");
            }
            out.push_str("])");
        }
        Value::Node(_) | Value::Edge(_) | Value::Path(_) | Value::Opaque { .. } => {
            return Err(GraphError::InvalidArgument(format!(
                "graph entities cannot be sent as parameters: {value}"
            )));
        }
    }
    Ok(())
}
