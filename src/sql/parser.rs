//! Column and constraint parsing for `CREATE TABLE` bodies.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::statement::statements;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::infer::{InferenceOptions, infer_relationships};
use crate::schema::{Column, ForeignKey, Schema, Table};

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("column pattern is valid")
}

static PRIMARY_KEY: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bPRIMARY\s+KEY\b"));
static PRIMARY_KEY_LIST: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)\bPRIMARY\s+KEY\s*\(([^)]*)\)"));
static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bFOREIGN\s+KEY\b"));
static FOREIGN_KEY_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"(?i)\bFOREIGN\s+KEY\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#));
static REFERENCED_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)\bREFERENCES\s+(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#)
});
static REFERENCED_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)\bREFERENCES\s+(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?\w+[`"]?\s*\(\s*[`"]?(\w+)[`"]?\s*\)"#)
});
static IGNORED: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\b(?:CONSTRAINT|INDEX|KEY)\b"));
static COLUMN_DEF: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r#"(?i)^[`"]?(\w+)[`"]?\s+(\w+(?:\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\))?)"#)
});
static NOT_NULL: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\bNOT\s+NULL\b"));
static DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?is)\bDEFAULT\s+(.+?)(?:\s+(?:NOT\s+NULL|NULL|UNIQUE|PRIMARY\s+KEY|REFERENCES|CHECK|COMMENT|AUTO_INCREMENT|CONSTRAINT)\b.*)?$",
    )
});

/// Columns and key constraints found in one table body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBody {
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Parse DDL text into tables and infer their relationships.
pub fn parse_ddl(input: &str, options: &InferenceOptions, diagnostics: &mut Diagnostics) -> Schema {
    let mut tables = parse_tables(input);
    infer_relationships(&mut tables, options, diagnostics);
    info!(tables = tables.len(), "parsed DDL");
    Schema { tables }
}

/// Read and parse a DDL file. An unreadable file is the only failure.
pub fn parse_ddl_file(
    path: impl AsRef<Path>,
    options: &InferenceOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Schema> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_ddl(&input, options, diagnostics))
}

/// Parse every `CREATE TABLE` block without inferring relationships.
pub fn parse_tables(input: &str) -> Vec<Table> {
    statements(input)
        .map(|block| {
            let body = parse_table_body(block.body);
            debug!(
                table = block.name,
                columns = body.columns.len(),
                foreign_keys = body.foreign_keys.len(),
                "parsed table"
            );

            let mut table = Table::new(block.name);
            table.columns = body.columns;
            table.primary_key = body.primary_key;
            table.foreign_keys = body.foreign_keys;
            table
        })
        .collect()
}

/// Parse the text between the outer parentheses of a `CREATE TABLE`.
///
/// Lines that match nothing are skipped; they never fail the table.
pub fn parse_table_body(body: &str) -> TableBody {
    let mut parsed = TableBody::default();

    for line in split_top_level(body) {
        // Keywords are only matched outside string literals.
        let masked = mask_literals(line);
        let masked = masked.as_str();

        if let Some(list) = PRIMARY_KEY_LIST.captures(masked) {
            for name in list[1].split(',') {
                push_primary_key(&mut parsed.primary_key, unquote(name));
            }
        } else if FOREIGN_KEY.is_match(masked) {
            if let Some(fk) = parse_foreign_key(masked) {
                parsed.foreign_keys.push(fk);
            }
        } else if !PRIMARY_KEY.is_match(masked) && IGNORED.is_match(masked) {
            continue;
        } else if let Some(column) = parse_column(line, masked) {
            // Inline `PRIMARY KEY` and `REFERENCES` on a column definition.
            if PRIMARY_KEY.is_match(masked) {
                push_primary_key(&mut parsed.primary_key, &column.name);
            }
            if let Some((table, referenced)) = parse_reference(masked) {
                parsed.foreign_keys.push(ForeignKey {
                    column: column.name.clone(),
                    referenced_table: table,
                    referenced_column: referenced,
                });
            }
            parsed.columns.push(column);
        }
    }

    parsed
}

fn parse_foreign_key(line: &str) -> Option<ForeignKey> {
    let column = FOREIGN_KEY_COLUMN.captures(line)?[1].to_string();
    let (referenced_table, referenced_column) = parse_reference(line)?;
    Some(ForeignKey {
        column,
        referenced_table,
        referenced_column,
    })
}

fn parse_reference(line: &str) -> Option<(String, String)> {
    let table = REFERENCED_TABLE.captures(line)?[1].to_string();
    let column = REFERENCED_COLUMN.captures(line)?[1].to_string();
    Some((table, column))
}

/// `line` is the original text, `masked` the same text after
/// [`mask_literals`]. Offsets are shared between the two.
fn parse_column(line: &str, masked: &str) -> Option<Column> {
    let caps = COLUMN_DEF.captures(masked)?;
    let mut column = Column::new(&caps[1], &caps[2]);
    column.nullable = !NOT_NULL.is_match(masked);
    column.default_value = DEFAULT
        .captures(masked)
        .and_then(|c| c.get(1))
        .map(|m| line[m.range()].trim().to_string())
        .filter(|v| !v.is_empty());
    Some(column)
}

/// Blank out the contents of single-quoted literals, byte for byte, keeping
/// the quotes themselves.
fn mask_literals(line: &str) -> String {
    let mut masked = String::with_capacity(line.len());
    let mut in_quote = false;
    for c in line.chars() {
        if c == '\'' {
            in_quote = !in_quote;
            masked.push(c);
        } else if in_quote {
            masked.extend(std::iter::repeat_n('_', c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    masked
}

fn push_primary_key(keys: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !keys.iter().any(|k| k == name) {
        keys.push(name.to_string());
    }
}

fn unquote(name: &str) -> &str {
    name.trim().trim_matches(|c| c == '`' || c == '"')
}

/// Split on commas at parenthesis depth zero, outside single quotes.
/// Pieces come back trimmed; empty pieces are dropped.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
