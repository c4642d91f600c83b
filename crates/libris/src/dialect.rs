//! SQL dialects: identifier quoting and placeholder style.

use crate::error::LibError;
use std::fmt;
use std::str::FromStr;

/// Target SQL dialect of a generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Backtick identifiers and positional `?` placeholders.
    #[default]
    MySql,
    /// Double-quoted identifiers and numbered `$n` placeholders.
    Postgres,
}

impl Dialect {
    /// The character used to quote identifiers.
    pub const fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Postgres => '"',
        }
    }

    /// Whether `INSERT ... RETURNING` is available.
    pub const fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Write the placeholder for the `index`-th (1-based) bound value.
    pub fn write_placeholder(self, out: &mut String, index: usize) {
        match self {
            Dialect::MySql => out.push('?'),
            Dialect::Postgres => {
                out.push('$');
                out.push_str(&index.to_string());
            }
        }
    }

    /// Count the placeholders in a SQL string generated for this dialect.
    ///
    /// Generated SQL never carries literals, so outside quoted identifiers every `?` (or `$`
    /// followed by digits, not part of a bare identifier) is a placeholder.
    pub fn count_placeholders(self, sql: &str) -> usize {
        let quote = self.quote_char() as u8;
        let bytes = sql.as_bytes();
        let mut quoted = false;
        let mut count = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if b == quote {
                // a doubled quote toggles twice and stays inside the identifier
                quoted = !quoted;
                continue;
            }
            if quoted {
                continue;
            }
            let hit = match self {
                Dialect::MySql => b == b'?',
                Dialect::Postgres => {
                    b == b'$'
                        && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
                        && !i
                            .checked_sub(1)
                            .and_then(|p| bytes.get(p))
                            .is_some_and(|&c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
                }
            };
            if hit {
                count += 1;
            }
        }
        count
    }

    pub const fn name(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = LibError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(LibError::validation(format!("unknown dialect: {other}"))),
        }
    }
}

/// Quote a single identifier (no dot splitting) for `dialect`, doubling embedded quotes.
pub fn quote_ident(name: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name, dialect);
    out
}

pub(crate) fn write_quoted(out: &mut String, name: &str, dialect: Dialect) {
    let q = dialect.quote_char();
    out.push(q);
    for ch in name.chars() {
        if ch == q {
            out.push(q);
        }
        out.push(ch);
    }
    out.push(q);
}
