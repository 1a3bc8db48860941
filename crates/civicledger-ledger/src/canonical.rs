//! Canonical JSON serialization used as digest input.
//!
//! Version 1: object keys sorted by UTF-8 byte order at every nesting level,
//! no insignificant whitespace, serde_json number and string formatting.
//! Identical logical payloads always serialize to byte-identical output, so
//! digest recomputation is reproducible across runs.

use serde_json::Value;

use civicledger_types::{CivicError, Result};

/// Bump this whenever the canonical encoding changes; recorded digests are
/// only comparable within one version.
pub const CANONICAL_VERSION: u32 = 1;

/// Payloads nested deeper than this are rejected rather than recursed into.
const MAX_DEPTH: usize = 128;

/// Serialize a payload value into its canonical textual form.
pub fn to_canonical_json(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(CivicError::PayloadNotSerializable(format!(
            "payload nested deeper than {MAX_DEPTH} levels"
        )));
    }
    match value {
        // serde_json's own formatting is deterministic for scalars,
        // including string escaping and number rendering.
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            out.push_str(&value.to_string());
        }
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
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_value(out, &map[*key], depth + 1)?;
            }
            out.push('}');
        }
    }
    Ok(())
}
