use serde_json::Value;

/// Marker appended to anything cut short.
pub const ELLIPSIS: char = '…';

/// Keep at most `max_chars` characters of `content`.
///
/// Counts characters, not bytes, so multi-byte text is never split. A cut
/// string gets [`ELLIPSIS`] appended.
pub fn truncate_chars(content: &str, max_chars: usize) -> (String, bool) {
    match content.char_indices().nth(max_chars) {
        None => (content.to_string(), false),
        Some((byte_idx, _)) => {
            let mut result = content[..byte_idx].to_string();
            result.push(ELLIPSIS);
            (result, true)
        }
    }
}

/// Cut `content` so the result, [`ELLIPSIS`] included, is at most
/// `max_bytes` long. Cuts on a char boundary.
pub fn truncate_bytes(content: &str, max_bytes: usize) -> (String, bool) {
    if content.len() <= max_bytes {
        return (content.to_string(), false);
    }
    let Some(room) = max_bytes.checked_sub(ELLIPSIS.len_utf8()) else {
        return (String::new(), true);
    };
    let mut end = room;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    let mut result = content[..end].to_string();
    result.push(ELLIPSIS);
    (result, true)
}

/// Result of collapsing a snapshot into per-table counts.
pub struct Summary {
    pub text: String,
    pub tables: usize,
}

/// Collapse a snapshot document into one line per table:
/// `"<table>: N records"`, plus `; example: {k: v, ...}` built from the
/// first row when the table is non-empty.
///
/// The sample keeps at most `max_fields` fields and at most `value_chars`
/// characters per value. The reserved `schema_key` entry is skipped.
/// Returns `None` when the snapshot is not a JSON object.
pub fn summarize_snapshot(
    snapshot: &str,
    schema_key: &str,
    max_fields: usize,
    value_chars: usize,
) -> Option<Summary> {
    let doc: Value = serde_json::from_str(snapshot).ok()?;
    let tables = doc.as_object()?;

    let mut lines = Vec::new();
    for (table, rows) in tables {
        if table == schema_key {
            continue;
        }
        let Some(rows) = rows.as_array() else {
            continue;
        };

        let mut line = format!("{table}: {} records", rows.len());
        if let Some(first) = rows.first() {
            line.push_str("; example: ");
            line.push_str(&sample_row(first, max_fields, value_chars));
        }
        lines.push(line);
    }

    Some(Summary {
        tables: lines.len(),
        text: lines.join("\n"),
    })
}

fn sample_row(row: &Value, max_fields: usize, value_chars: usize) -> String {
    let Some(fields) = row.as_object() else {
        let (v, _) = truncate_chars(&row.to_string(), value_chars);
        return v;
    };

    let parts: Vec<String> = fields
        .iter()
        .take(max_fields)
        .map(|(k, v)| {
            let raw = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let (short, _) = truncate_chars(&raw, value_chars);
            format!("{k}: {short}")
        })
        .collect();

    format!("{{{}}}", parts.join(", "))
}
