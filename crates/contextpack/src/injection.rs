/// Format the instruction block, optionally followed by a style hint.
pub fn format_instructions(preamble: &str, style_hint: Option<&str>) -> String {
    match style_hint {
        Some(hint) => format!(
            "\
=== INSTRUCTIONS ===
{preamble}
{hint}
=== END_INSTRUCTIONS ===
"
        ),
        None => format!(
            "\
=== INSTRUCTIONS ===
{preamble}
=== END_INSTRUCTIONS ===
"
        ),
    }
}

/// Format the static table/relationship description.
pub fn format_schema(schema: &str) -> String {
    format!(
        "\
=== SCHEMA ===
{schema}
=== END_SCHEMA ===
"
    )
}

/// Format the data section. `kind` is `full` or `summary`.
pub fn format_data(kind: &str, data: &str) -> String {
    let data_chars = data.len();
    format!(
        "\
=== DATA ({kind}) ===
DATA_CHARS: {data_chars}
{data}
=== END_DATA ===
"
    )
}

/// Header line of the question section.
pub const QUESTION_HEADER: &str = "=== QUESTION ===";

/// Format the question section. Always the last section of a prompt, with
/// nothing after the question itself.
pub fn format_question(query: &str) -> String {
    format!("{QUESTION_HEADER}\n{query}")
}

/// The question text of an assembled prompt, or the whole prompt when it
/// has no question section.
pub fn question_of(prompt: &str) -> &str {
    match prompt.rsplit_once(QUESTION_HEADER) {
        Some((_, rest)) => rest.strip_prefix('\n').unwrap_or(rest),
        None => prompt,
    }
}
