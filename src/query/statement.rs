//! Built statements: SQL text with `:name` placeholders plus their bound values.
//!
//! SQLite binds the names directly. PostgreSQL and MySQL only understand
//! positional placeholders, so their providers call [`Statement::positional`],
//! which rewrites `:name` outside of quoted literals and identifiers and leaves
//! PostgreSQL `::type` casts alone.

use crate::error::{OrmError, Result};
use crate::value::Value;
use std::collections::HashSet;

/// Placeholder syntax a driver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...` (PostgreSQL)
    Numbered,
    /// `?` (MySQL / MariaDB)
    Question,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    /// Parameter names without the leading colon, in binding order.
    pub params: Vec<(String, Value)>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Rewrite named placeholders for a positional driver.
    ///
    /// Returns the rewritten SQL and the values in placeholder order. A name used
    /// twice binds once with [`PlaceholderStyle::Numbered`] and twice with
    /// [`PlaceholderStyle::Question`].
    pub fn positional(&self, style: PlaceholderStyle) -> Result<(String, Vec<&Value>)> {
        let chars: Vec<char> = self.sql.chars().collect();
        let mut sql = String::with_capacity(self.sql.len());
        let mut ordered: Vec<&Value> = Vec::new();
        let mut numbered: Vec<&str> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '\'' | '"' | '`' => {
                    let end = skip_quoted(&chars, i);
                    sql.extend(&chars[i..end]);
                    i = end;
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    sql.push_str("::");
                    i += 2;
                }
                ':' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                        end += 1;
                    }
                    let name: String = chars[start..end].iter().collect();
                    match self.params.iter().find(|(param, _)| *param == name) {
                        Some((param, value)) if !name.is_empty() => {
                            match style {
                                PlaceholderStyle::Question => {
                                    sql.push('?');
                                    ordered.push(value);
                                }
                                PlaceholderStyle::Numbered => {
                                    let index = match numbered.iter().position(|n| *n == param.as_str()) {
                                        Some(index) => index,
                                        None => {
                                            numbered.push(param.as_str());
                                            ordered.push(value);
                                            numbered.len() - 1
                                        }
                                    };
                                    sql.push_str(&format!("${}", index + 1));
                                }
                            }
                            i = end;
                        }
                        _ => {
                            sql.push(':');
                            i += 1;
                        }
                    }
                }
                other => {
                    sql.push(other);
                    i += 1;
                }
            }
        }

        if let Some((name, _)) = self
            .params
            .iter()
            .find(|(name, _)| !numbered.contains(&name.as_str()) && style == PlaceholderStyle::Numbered)
        {
            return Err(OrmError::Build(format!(
                "parameter `{name}` is bound but never referenced in: {}",
                self.sql
            )));
        }

        Ok((sql, ordered))
    }
}

/// Index just past the quoted run starting at `start`. A doubled delimiter
/// is an escaped delimiter; a backslash escapes the next character inside `'...'`.
fn skip_quoted(chars: &[char], start: usize) -> usize {
    let delimiter = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        if delimiter == '\'' && chars[i] == '\\' {
            i += 2;
            continue;
        }
        if chars[i] == delimiter {
            if chars.get(i + 1) == Some(&delimiter) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// Hands out unique parameter names for one statement.
///
/// Names are the column sanitized to `[A-Za-z0-9_]`, optionally suffixed; if the
/// result was already handed out, `_<n>` is appended until it is unique.
#[derive(Debug, Default)]
pub struct ParamNames {
    used: HashSet<String>,
}

impl ParamNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column name reduced to `[A-Za-z0-9_]` (`p` when nothing is left).
    pub fn sanitize(column: &str) -> String {
        let cleaned: String = column
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if cleaned.is_empty() {
            "p".to_string()
        } else {
            cleaned
        }
    }

    /// Reserve `base` (already sanitized), disambiguating on collision.
    pub fn reserve(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
