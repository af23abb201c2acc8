//! Parser combinators using nom
//!
//! Shared low-level pieces for the DDL statement parsers: identifiers in
//! all supported quoting styles, string literals, keywords, balanced paren
//! groups, and SQL type tokens.

use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    error::{Error, ErrorKind},
};

// =============================================================================
// Identifiers
// =============================================================================

/// A parsed identifier plus how it was quoted in the source.
///
/// Double-quoted identifiers match case-sensitively; bare and
/// backtick-quoted identifiers match case-insensitively, reflecting the
/// dialects' own case folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub exact: bool,
}

impl Ident {
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exact: false,
        }
    }

    /// Whether this identifier refers to `other`
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        if self.exact {
            self.name == other
        } else {
            self.name.eq_ignore_ascii_case(other)
        }
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Parse a bare SQL word (identifier or keyword)
pub fn word(input: &str) -> IResult<&str, &str> {
    let (rest, head) = take_while1(is_word_start).parse(input)?;
    let (rest, tail) = take_while(is_word_char).parse(rest)?;
    let len = head.len() + tail.len();
    Ok((rest, &input[..len]))
}

/// Parse an identifier: bare, double-quoted, or backtick-quoted
pub fn ident(input: &str) -> IResult<&str, Ident> {
    if let Ok((rest, name)) = quoted('"')(input) {
        return Ok((rest, Ident { name, exact: true }));
    }
    if let Ok((rest, name)) = quoted('`')(input) {
        return Ok((rest, Ident { name, exact: false }));
    }
    let (rest, name) = word(input)?;
    Ok((rest, Ident::bare(name)))
}

/// Parse a delimited identifier with `q` as both delimiter and escape
/// (doubling the delimiter escapes it)
fn quoted(q: char) -> impl Fn(&str) -> IResult<&str, String> {
    move |input: &str| {
        let (mut rest, _) = char(q).parse(input)?;
        let mut name = String::new();
        loop {
            match rest.chars().next() {
                None => return Err(fail(rest)),
                Some(c) if c == q => {
                    rest = &rest[c.len_utf8()..];
                    if rest.starts_with(q) {
                        name.push(q);
                        rest = &rest[q.len_utf8()..];
                    } else {
                        return Ok((rest, name));
                    }
                }
                Some(c) => {
                    name.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
    }
}

/// Parse a single-quoted string literal, `''` escaping a quote
pub fn string_literal(input: &str) -> IResult<&str, String> {
    quoted('\'')(input)
}

// =============================================================================
// Keywords and whitespace
// =============================================================================

/// Case-insensitive keyword with a word-boundary check, so `kw("KEY")`
/// does not bite into `keyring`
pub fn kw(keyword: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input: &str| {
        let Some(candidate) = input.get(..keyword.len()) else {
            return Err(fail(input));
        };
        if !candidate.eq_ignore_ascii_case(keyword) {
            return Err(fail(input));
        }
        let rest = &input[keyword.len()..];
        if rest.chars().next().is_some_and(is_word_char) {
            return Err(fail(input));
        }
        Ok((rest, candidate))
    }
}

/// Two keywords separated by whitespace (`kw2("NOT", "NULL")`)
pub fn kw2(a: &'static str, b: &'static str) -> impl Fn(&str) -> IResult<&str, &str> {
    move |input: &str| {
        let (rest, _) = kw(a)(input)?;
        let (rest, _) = multispace1.parse(rest)?;
        let (rest, _) = kw(b)(rest)?;
        let taken = input.len() - rest.len();
        Ok((rest, &input[..taken]))
    }
}

/// Optional whitespace
pub fn ws(input: &str) -> IResult<&str, &str> {
    multispace0.parse(input)
}

/// Required whitespace
pub fn ws1(input: &str) -> IResult<&str, &str> {
    multispace1.parse(input)
}

// =============================================================================
// Paren groups and list splitting
// =============================================================================

/// Parse a `( ... )` group, returning the inner text. Nested parens and
/// quoted content are honored.
pub fn paren_group(input: &str) -> IResult<&str, &str> {
    let (inner_start, _) = char('(').parse(input)?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, c) in inner_start.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        let rest = &inner_start[idx + 1..];
                        return Ok((rest, &inner_start[..idx]));
                    }
                    depth -= 1;
                }
                _ => {}
            },
        }
    }
    Err(fail(input))
}

/// Split text on top-level commas, honoring nested parens and quotes
#[must_use]
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(input[start..idx].trim());
                    start = idx + 1;
                }
                _ => {}
            },
        }
    }
    let last = input[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts.retain(|p| !p.is_empty());
    parts
}

// =============================================================================
// Type tokens
// =============================================================================

/// Words that continue a multi-word type name (`character varying`,
/// `timestamp with time zone`)
const TYPE_CONTINUATIONS: &[&str] = &["VARYING", "PRECISION", "WITH", "WITHOUT", "TIME", "ZONE"];

/// Parse a column type token: a word, optional `( args )`, and any
/// multi-word continuations, normalized to single spaces
pub fn type_token(input: &str) -> IResult<&str, String> {
    let (mut rest, base) = word(input)?;
    let mut token = base.to_string();
    let mut had_args = false;

    loop {
        let (after_ws, _) = ws(rest)?;
        if !had_args && after_ws.starts_with('(') {
            let (after_args, inner) = paren_group(after_ws)?;
            token.push('(');
            token.push_str(inner.trim());
            token.push(')');
            had_args = true;
            rest = after_args;
            continue;
        }
        match word(after_ws) {
            Ok((after_word, w))
                if TYPE_CONTINUATIONS
                    .iter()
                    .any(|c| w.eq_ignore_ascii_case(c)) =>
            {
                token.push(' ');
                token.push_str(w);
                rest = after_word;
            }
            _ => break,
        }
    }
    Ok((rest, token))
}

fn fail(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Error(Error::new(input, ErrorKind::Tag))
}
