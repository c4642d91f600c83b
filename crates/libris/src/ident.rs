//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a table or field name, supporting dotted notation and quoted parts.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts use `` ` `` or `"`, allow any characters except NUL, and escape the quote by
//!   doubling it
//!
//! # Example
//! ```
//! use libris::{Dialect, Ident};
//!
//! let t = Ident::parse("library.books")?;
//! assert_eq!(t.to_sql(Dialect::MySql), "library.books");
//! assert_eq!(t.to_quoted(Dialect::MySql), "`library`.`books`");
//! # Ok::<(), libris::LibError>(())
//! ```

use crate::dialect::{Dialect, write_quoted};
use crate::error::{LibError, LibResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

impl IdentPart {
    pub fn name(&self) -> &str {
        match self {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// A SQL identifier (table, field or schema-qualified name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `library.books`
    /// - Quoted: `` `Book Table` `` or `"Book Table"`
    /// - Mixed: `library."Books".id`
    pub fn parse(s: &str) -> LibResult<Self> {
        if s.is_empty() {
            return Err(LibError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(LibError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(LibError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(LibError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if let Some(&q) = chars.peek().filter(|c| **c == '"' || **c == '`') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == q => {
                            if chars.peek() == Some(&q) {
                                chars.next();
                                name.push(q);
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(LibError::validation("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(LibError::validation("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !ok {
                    return Err(LibError::validation(format!(
                        "Invalid character '{c}' in identifier '{s}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(LibError::validation("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// Render unquoted parts verbatim and quoted parts with the dialect's quote.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write(&mut out, dialect, false);
        out
    }

    /// Render with every part quoted.
    pub fn to_quoted(&self, dialect: Dialect) -> String {
        let mut out = String::new();
        self.write(&mut out, dialect, true);
        out
    }

    /// The last part's bare name (e.g. `books` for `library.books`).
    pub fn name(&self) -> &str {
        self.parts.last().map(IdentPart::name).unwrap_or_default()
    }

    fn write(&self, out: &mut String, dialect: Dialect, quote_all: bool) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) if !quote_all => out.push_str(s),
                IdentPart::Unquoted(s) | IdentPart::Quoted(s) => write_quoted(out, s, dialect),
            }
        }
    }
}

/// Validate a single column name for quoting.
pub(crate) fn check_column(name: &str) -> LibResult<()> {
    if name.is_empty() {
        return Err(LibError::validation("Column name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(LibError::validation(
            "Column name cannot contain NUL character",
        ));
    }
    Ok(())
}
