//! Naming rules binding the three artifacts together.
//!
//! `base_name` is derived from the source file name; `type_name` and the
//! instance name are derived from it deterministically, so the binding
//! layer's import and the interaction layer's export always agree.

/// Fixed suffix appended to the PascalCase type name.
pub const TYPE_SUFFIX: &str = "Page";

/// Affix tokens stripped from source file names before deriving the base
/// name.
const STRIP_AFFIXES: &[&str] = &["requirement", "requirements", "req", "story", "jira"];

/// Leading tokens dropped when deriving a method name from a step text.
const LEADING_SKIP_TOKENS: &[&str] = &["the", "a", "an", "i", "user", "we", "they", "it"];

/// Fallback method name for steps whose tokens are all skipped.
const FALLBACK_METHOD_NAME: &str = "performStep";

/// Derives the sanitized base name from a source file name: extension and
/// tracker affixes stripped, lower-cased, non-alphanumerics hyphenated with
/// repeats collapsed. Returns None when nothing usable remains.
pub fn sanitize_base_name(source_file_name: &str) -> Option<String> {
    let stem = source_file_name
        .rsplit('/')
        .next()
        .unwrap_or(source_file_name);
    let stem = stem.split('.').next().unwrap_or(stem);

    let lowered = stem.to_lowercase();
    let hyphenated: String = lowered
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let tokens: Vec<&str> = hyphenated
        .split('-')
        .filter(|t| !t.is_empty() && !STRIP_AFFIXES.contains(t))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join("-"))
    }
}

/// PascalCase type name for a base name, with the fixed suffix.
pub fn type_name(base_name: &str) -> String {
    let pascal: String = base_name
        .split('-')
        .filter(|t| !t.is_empty())
        .map(capitalize)
        .collect();
    format!("{}{}", pascal, TYPE_SUFFIX)
}

/// camelCase instance name for a type name.
pub fn instance_name(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Derives the handler method name from a step text: alphanumeric tokens,
/// leading articles and pronouns stripped, camelCased. The result starts
/// with the step's verb whenever the step leads with an action.
pub fn derive_method_name(step_text: &str) -> String {
    let tokens: Vec<String> = step_text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let start = tokens
        .iter()
        .position(|t| !LEADING_SKIP_TOKENS.contains(&t.as_str()))
        .unwrap_or(tokens.len());
    let meaningful = &tokens[start..];

    if meaningful.is_empty() {
        return FALLBACK_METHOD_NAME.to_string();
    }

    let mut name = meaningful[0].clone();
    for token in &meaningful[1..] {
        name.push_str(&capitalize(token));
    }
    name
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
