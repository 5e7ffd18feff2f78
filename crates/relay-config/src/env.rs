use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Failure while expanding placeholders
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    #[error("environment variable not found: `{0}` (line {1})")]
    MissingVariable(String, usize),
    #[error("only variables scoped with 'env.' are supported: `{0}` (line {1})")]
    UnsupportedScope(String, usize),
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.NAME }}` or `{{ env.NAME | default("value") }}`
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("placeholder pattern must compile")
    })
}

/// Expand `{{ env.VAR }}` placeholders in raw TOML text
///
/// Runs before deserialization so config structs hold plain values.
/// Comment lines are left untouched, so commented-out secrets never need
/// to be set.
pub fn expand_env(input: &str) -> Result<String, ExpandError> {
    let mut lines = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_owned());
        } else {
            lines.push(expand_line(line, index + 1)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn expand_line(line: &str, line_number: usize) -> Result<String, ExpandError> {
    let mut output = String::with_capacity(line.len());
    let mut cursor = 0;

    for captures in placeholder().captures_iter(line) {
        let whole = captures.get(0).expect("group 0 always matches");
        output.push_str(&line[cursor..whole.start()]);
        output.push_str(&resolve(&captures, line_number)?);
        cursor = whole.end();
    }

    output.push_str(&line[cursor..]);
    Ok(output)
}

fn resolve(captures: &Captures<'_>, line_number: usize) -> Result<String, ExpandError> {
    let key = &captures[1];
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(ExpandError::UnsupportedScope(key.to_owned(), line_number));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(ExpandError::MissingVariable(name.to_owned(), line_number)),
    }
}
