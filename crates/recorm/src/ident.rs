//! Backtick identifier formatting.
//!
//! This module provides [`Ident`], a parsed table or column reference with an
//! optional alias, rendered with backtick quoting:
//!
//! - `col` → `` `col` ``
//! - `table.col` → `` `table`.`col` ``
//! - `col alias` / `col AS alias` → `` `col` AS alias ``
//! - `t.*` → `` `t`.* ``
//!
//! Backticks already present in the input are stripped before re-quoting. This
//! keeps the output well formed; it is not an escaping mechanism, so callers
//! must not pass untrusted input as identifiers.
//!
//! # Example
//! ```ignore
//! use recorm::Ident;
//!
//! assert_eq!(Ident::parse("users.name n").to_sql(), "`users`.`name` AS n");
//! ```

use std::fmt;

/// A part of a dotted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// A name, rendered inside backticks.
    Name(String),
    /// `*`, rendered bare.
    Wildcard,
}

/// A table or column reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
    pub alias: Option<String>,
}

impl Ident {
    /// Parse a reference of the form `[table.]name [[AS] alias]`.
    ///
    /// Parsing never fails: an empty input yields an empty identifier that
    /// renders as an empty string.
    pub fn parse(s: &str) -> Self {
        let cleaned: String = s.chars().filter(|&c| c != '`').collect();
        let mut tokens = cleaned.split_whitespace();

        let Some(reference) = tokens.next() else {
            return Self::default();
        };

        let rest: Vec<&str> = tokens.collect();
        let alias = match rest.as_slice() {
            [] => None,
            [kw, alias, ..] if kw.eq_ignore_ascii_case("as") => Some((*alias).to_string()),
            [.., last] => Some((*last).to_string()),
        };

        let parts = reference
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| {
                if p == "*" {
                    IdentPart::Wildcard
                } else {
                    IdentPart::Name(p.to_string())
                }
            })
            .collect();

        Self { parts, alias }
    }

    /// Attach (or replace) the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Name(name) => {
                    out.push('`');
                    out.push_str(name);
                    out.push('`');
                }
                IdentPart::Wildcard => out.push('*'),
            }
        }
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Quote a reference string; shorthand for `Ident::parse(s).to_sql()`.
pub fn quote(s: &str) -> String {
    Ident::parse(s).to_sql()
}

/// Quote each reference and join them with `", "`.
pub fn quote_list<S: AsRef<str>>(refs: &[S]) -> String {
    let mut out = String::new();
    for (i, r) in refs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        Ident::parse(r.as_ref()).write_sql(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert_eq!(quote("users"), "`users`");
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(quote("users.name"), "`users`.`name`");
    }

    #[test]
    fn ident_alias() {
        assert_eq!(quote("age value"), "`age` AS value");
        assert_eq!(quote("users.age value1"), "`users`.`age` AS value1");
    }

    #[test]
    fn ident_explicit_as() {
        assert_eq!(quote("users.age AS years"), "`users`.`age` AS years");
        assert_eq!(quote("age as years"), "`age` AS years");
    }

    #[test]
    fn ident_strips_backticks() {
        assert_eq!(quote("`users`.`id`"), "`users`.`id`");
        assert_eq!(quote("`na`me`"), "`name`");
    }

    #[test]
    fn ident_trims_whitespace() {
        assert_eq!(quote("  id  "), "`id`");
    }

    #[test]
    fn ident_wildcard() {
        assert_eq!(quote("users.*"), "`users`.*");
        assert_eq!(quote("*"), "*");
    }

    #[test]
    fn ident_empty() {
        assert!(Ident::parse("").is_empty());
        assert_eq!(quote("   "), "");
    }

    #[test]
    fn quote_list_joins() {
        assert_eq!(quote_list(&["id", "role"]), "`id`, `role`");
    }

    #[test]
    fn with_alias_overrides() {
        assert_eq!(Ident::parse("a.b c").with_alias("d").to_sql(), "`a`.`b` AS d");
    }
}
