//! Locates `CREATE TABLE` blocks in raw DDL text.

use std::sync::LazyLock;

use regex::Regex;

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\bCREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?\s*\("#,
    )
    .expect("CREATE TABLE pattern is valid")
});

/// One `CREATE TABLE` statement: the table name and the text between its
/// outer parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBlock<'a> {
    pub name: &'a str,
    pub body: &'a str,
}

/// Lazy iterator over the table blocks of a DDL script.
///
/// Statements whose parentheses never close yield nothing; the search
/// resumes right after their header.
pub struct Statements<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Statements<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Statements<'a> {
    type Item = TableBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.input.len() {
            let caps = CREATE_TABLE.captures_at(self.input, self.pos)?;
            let header = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let body_start = header.end();

            match closing_paren(&self.input[body_start..]) {
                Some(len) => {
                    self.pos = body_start + len + 1;
                    return Some(TableBlock {
                        name,
                        body: &self.input[body_start..body_start + len],
                    });
                }
                None => {
                    tracing::debug!(table = name, "unterminated CREATE TABLE body");
                    self.pos = body_start;
                }
            }
        }
        None
    }
}

/// Iterate the table blocks of `input`.
pub fn statements(input: &str) -> Statements<'_> {
    Statements::new(input)
}

/// Byte offset of the `)` closing an already-opened parenthesis, skipping
/// parentheses inside single-quoted literals.
fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_quote = false;

    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
