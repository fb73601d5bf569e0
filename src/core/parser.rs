use crate::domain::model::{ImportRow, RowError, RowErrorKind};
use regex::Regex;
use std::sync::LazyLock;

/// Rows handled per invocation unless the caller asks for another cap.
pub const DEFAULT_MAX_ROWS: usize = 20;

/// domain, username, title, topic and one reserved field.
const MAX_FIELDS: usize = 5;

static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9,.\s-]+$").expect("line pattern is valid"));
static DOMAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]*$").expect("domain pattern is valid"));
static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("username pattern is valid"));

pub type ParsedLine = (usize, std::result::Result<ImportRow, RowError>);

/// 切分原始文字：去除空白行，最多保留 `max_rows` 行
///
/// Returns `(line_number, trimmed_line)` pairs; line numbers are 1-based positions in
/// `raw`, so blank lines still advance the count.
pub fn split_lines(raw: &str, max_rows: usize) -> Vec<(usize, &str)> {
    raw.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .take(max_rows)
        .collect()
}

/// Validates one trimmed, non-empty line into an [`ImportRow`].
pub fn validate_line(line_number: usize, line: &str) -> std::result::Result<ImportRow, RowError> {
    if !LINE_PATTERN.is_match(line) {
        return Err(RowError::new(
            RowErrorKind::BadCharactersInLine,
            line_number,
            format!(
                "bad characters in line \"{}\" (only letters, digits, commas, periods, spaces and hyphens are allowed)",
                line
            ),
        ));
    }

    let fields: Vec<&str> = line.splitn(MAX_FIELDS, ',').map(str::trim).collect();
    if fields.len() < 2 {
        return Err(RowError::new(
            RowErrorKind::TooFewArguments,
            line_number,
            format!("too few arguments in \"{}\" (expected domain, username)", line),
        ));
    }

    let domain = fields[0];
    if !DOMAIN_PATTERN.is_match(domain) {
        return Err(RowError::new(
            RowErrorKind::NonAlphanumericDomain,
            line_number,
            format!("domain \"{}\" must contain only letters, digits and hyphens", domain),
        ));
    }

    let username = fields[1];
    if !USERNAME_PATTERN.is_match(username) {
        return Err(RowError::new(
            RowErrorKind::BadCharactersInUsername,
            line_number,
            format!("bad characters in username \"{}\"", username),
        ));
    }

    Ok(ImportRow {
        domain: domain.to_string(),
        username: username.to_string(),
        title: non_empty(fields.get(2)),
        topic: non_empty(fields.get(3)),
    })
}

fn non_empty(field: Option<&&str>) -> Option<String> {
    field
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// Splits `raw` into at most `max_rows` rows and validates each one.
pub fn split_and_validate(raw: &str, max_rows: usize) -> Vec<ParsedLine> {
    split_lines(raw, max_rows)
        .into_iter()
        .map(|(line_number, line)| (line_number, validate_line(line_number, line)))
        .collect()
}
