// src/pipeline/repair.rs
//
// The upstream services write response bodies as zero or more JSON object
// literals back-to-back, with no separators and no enclosing array. This
// module splits such a body at object boundaries and parses each object.
// The scanner tracks string and escape state, so a literal "}{" inside a
// string value does not split an object.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

/// Split a concatenated-object body and parse each object.
///
/// An empty or whitespace-only body is an empty vector, not an error.
/// Imbalanced braces, trailing garbage, or an object that fails to parse
/// all come back as `Err`; callers degrade to empty and log.
pub fn parse_concat_objects(body: &str) -> Result<Vec<Value>> {
    let mut objects = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                if start.is_none() {
                    return Err(anyhow!("string literal outside any object at byte {i}"));
                }
                in_string = true;
            }
            '{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(anyhow!("unbalanced '}}' at byte {i}"));
                }
                depth -= 1;
                if depth == 0 {
                    let begin = start.take().unwrap_or(i);
                    let slice = &body[begin..=i];
                    let value: Value = serde_json::from_str(slice)
                        .with_context(|| format!("object #{} failed to parse", objects.len()))?;
                    objects.push(value);
                }
            }
            c if c.is_whitespace() => {}
            other => {
                if start.is_none() {
                    return Err(anyhow!("unexpected {other:?} between objects at byte {i}"));
                }
            }
        }
    }

    if start.is_some() {
        return Err(anyhow!("truncated body: object never closed"));
    }
    Ok(objects)
}
