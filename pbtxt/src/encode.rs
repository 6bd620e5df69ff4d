//! Serializer for protobuf text format.

use serde_json::{Map, Value};

use crate::error::FormatError;

/// Encode an ordered mapping as protobuf text format.
///
/// Strings are always quoted, so an enum spelling such as `KIND_GPU`
/// comes back as `"KIND_GPU"` rather than a bare identifier. Decoding
/// either form yields the same mapping.
pub fn encode(map: &Map<String, Value>) -> Result<String, FormatError> {
    let mut out = String::new();
    encode_body(map, 0, &mut out)?;
    Ok(out)
}

fn encode_body(
    map: &Map<String, Value>,
    indent: usize,
    out: &mut String,
) -> Result<(), FormatError> {
    let pad = "  ".repeat(indent);
    for (name, value) in map {
        match value {
            Value::Object(inner) => {
                out.push_str(&format!("{pad}{name} {{\n"));
                encode_body(inner, indent + 1, out)?;
                out.push_str(&format!("{pad}}}\n"));
            }
            Value::Array(items) if items.iter().any(Value::is_object) => {
                out.push_str(&format!("{pad}{name} [\n"));
                for (i, item) in items.iter().enumerate() {
                    let Value::Object(inner) = item else {
                        return Err(FormatError::Unencodable {
                            reason: format!(
                                "field {name:?} mixes messages and scalars"
                            ),
                        });
                    };
                    out.push_str(&format!("{pad}  {{\n"));
                    encode_body(inner, indent + 2, out)?;
                    out.push_str(&format!("{pad}  }}"));
                    out.push_str(if i + 1 < items.len() { ",\n" } else { "\n" });
                }
                out.push_str(&format!("{pad}]\n"));
            }
            Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(|item| scalar(name, item))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push_str(&format!("{pad}{name}: [{}]\n", rendered.join(", ")));
            }
            scalar_value => {
                out.push_str(&format!("{pad}{name}: {}\n", scalar(name, scalar_value)?));
            }
        }
    }
    Ok(())
}

fn scalar(name: &str, value: &Value) -> Result<String, FormatError> {
    match value {
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(quote(s)),
        Value::Null => Err(FormatError::Unencodable {
            reason: format!("field {name:?} is null"),
        }),
        Value::Array(_) | Value::Object(_) => Err(FormatError::Unencodable {
            reason: format!("field {name:?} nests a container inside a scalar list"),
        }),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
