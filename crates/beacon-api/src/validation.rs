//! Pure input classifiers. The injection heuristic is defense-in-depth on
//! top of parameterized queries, not a substitute for them.

use std::sync::LazyLock;

use regex::Regex;

static SQL_INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // SQL keywords as whole words
        r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|EXECUTE|UNION|SCRIPT)\b",
        // Quote, statement and comment punctuation
        r"('|\\'|;|--|/\*|\*/|\+|%|=)",
        // or/and eventually followed by a digit or quote
        r#"(?i)\b(or|and)\b.*(\d|'|")"#,
        r"(?i)\bunion\b.*\bselect\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Heuristic denylist. Expect false positives on legitimate prose that
/// happens to contain `=`, `+` or an SQL keyword.
pub fn contains_sql_injection(input: &str) -> bool {
    SQL_INJECTION_PATTERNS.iter().any(|p| p.is_match(input))
}

pub fn validate_length(field: &str, value: &str, max_length: usize) -> Result<(), String> {
    if value.chars().count() > max_length {
        return Err(format!("{field} must be less than {max_length} characters"));
    }
    Ok(())
}

/// Fails listing every field that is absent or blank after trimming.
pub fn validate_required(fields: &[(&str, Option<&str>)]) -> Result<(), String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("Missing required fields: {}", missing.join(", ")))
    }
}

/// Escapes the HTML-significant characters `<` `>` `"` `'` `/`, in that
/// order. The output is safe to re-run: no substitution produces a
/// character from the set.
pub fn sanitize_xss(input: &str) -> String {
    input
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
        .replace('/', "&#x2F;")
}
