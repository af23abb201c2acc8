//! DDL repair heuristics
//!
//! Pre-processing for hand-edited SQL before it reaches the parser. Each
//! pass is a named, independently testable text-to-text transform; all of
//! them are total and idempotent, and [`repair`] applies them in a fixed
//! order because later passes assume earlier ones already normalized the
//! text. Generator output is never run through repair.
//!
//! [`validate_sql_syntax`] is separate and advisory: it reports structural
//! problems without fixing them and never blocks repair or parse.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ValidationIssue;
use crate::generate::FOREIGN_KEY_SECTION_HEADER;

/// Apply all repair passes in order: identifier quoting, general syntax
/// fixes, foreign-key dedup.
#[must_use]
pub fn repair(raw: &str) -> String {
    let quoted = quote_compound_identifiers(raw);
    let fixed = fix_common_sql_issues(&quoted);
    dedup_foreign_key_statements(&fixed)
}

// =============================================================================
// Pass 1: quote bare two-word identifiers
// =============================================================================

static COMPOUND_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(CREATE[ \t]+TABLE(?:[ \t]+IF[ \t]+NOT[ \t]+EXISTS)?|ALTER[ \t]+TABLE|REFERENCES)([ \t]+)([A-Za-z_][A-Za-z0-9_]*)[ \t]+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("compound identifier pattern")
});

/// Words that legitimately follow a single-word table name in the clauses
/// we rewrite; seeing one means the identifier was not multi-word.
const CLAUSE_KEYWORDS: &[&str] = &[
    "ADD", "ALTER", "AS", "CHANGE", "CONSTRAINT", "DISABLE", "DROP", "ENABLE", "EXISTS",
    "FOREIGN", "IF", "MODIFY", "NOT", "ON", "OWNER", "PRIMARY", "RENAME", "SET", "TO", "UNIQUE",
];

fn is_clause_keyword(word: &str) -> bool {
    CLAUSE_KEYWORDS
        .iter()
        .any(|k| word.eq_ignore_ascii_case(k))
}

/// Wrap a bare two-word identifier after `CREATE TABLE`, `ALTER TABLE`, or
/// `REFERENCES` in double quotes so it parses as one name.
///
/// Heuristic: exactly two bare word tokens, neither a clause keyword, with
/// no quoting already present.
#[must_use]
pub fn quote_compound_identifiers(sql: &str) -> String {
    COMPOUND_IDENT
        .replace_all(sql, |caps: &Captures<'_>| {
            let head = &caps[1];
            let ws = &caps[2];
            let first = &caps[3];
            let second = &caps[4];
            if is_clause_keyword(first) || is_clause_keyword(second) {
                caps[0].to_string()
            } else {
                format!("{head}{ws}\"{first} {second}\"")
            }
        })
        .into_owned()
}

// =============================================================================
// Pass 2: general syntax normalization
// =============================================================================

/// Fix a fixed set of common authoring mistakes:
///
/// 1. duplicated commas and trailing commas before `)` are dropped;
/// 2. a statement line followed by a new `CREATE`/`ALTER`/`DROP`/`INSERT`
///    head (or end of input) gets its missing `;`;
/// 3. a column list left unbalanced at end of input gets its closing
///    parens.
///
/// Line-oriented by design; each rule is idempotent.
#[must_use]
pub fn fix_common_sql_issues(sql: &str) -> String {
    let sql = normalize_commas(sql);
    let sql = terminate_statements(&sql);
    balance_parens(&sql)
}

/// Drop `,,` runs and commas directly before a closing paren
fn normalize_commas(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let bytes: Vec<char> = sql.chars().collect();
    let mut quote: Option<char> = None;
    let mut in_comment = false;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            out.push(c);
            i += 1;
            continue;
        }
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '-' if bytes.get(i + 1) == Some(&'-') => {
                    in_comment = true;
                    out.push(c);
                }
                ',' => {
                    let mut j = i + 1;
                    while j < bytes.len() && bytes[j].is_whitespace() {
                        j += 1;
                    }
                    match bytes.get(j) {
                        Some(',') | Some(')') => {} // drop this comma
                        _ => out.push(c),
                    }
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }
    out
}

/// Append `;` to statements that run straight into the next statement head
/// or the end of input
fn terminate_statements(sql: &str) -> String {
    let had_trailing_newline = sql.ends_with('\n');
    let mut lines: Vec<String> = sql.lines().map(str::to_string).collect();

    let mut quote: Option<char> = None;
    let mut depth: i32 = 0;
    let mut start_depth = Vec::with_capacity(lines.len());
    let mut end_depth = Vec::with_capacity(lines.len());
    let mut start_quote = Vec::with_capacity(lines.len());
    for line in &lines {
        start_depth.push(depth);
        start_quote.push(quote);
        let events = scan_line(line, &mut quote);
        depth += events.depth_delta;
        end_depth.push(depth);
    }

    let mut last_content: Option<usize> = None;
    let mut pending: Vec<usize> = Vec::new();
    for i in 0..lines.len() {
        if start_quote[i].is_none() && start_depth[i] == 0 && is_statement_head(&lines[i]) {
            if let Some(prev) = last_content {
                if end_depth[prev] == 0 && needs_terminator(&lines[prev]) {
                    pending.push(prev);
                }
            }
        }
        if !code_part(&lines[i]).trim().is_empty() {
            last_content = Some(i);
        }
    }
    if let Some(prev) = last_content {
        if quote.is_none() && end_depth[prev] == 0 && needs_terminator(&lines[prev]) {
            pending.push(prev);
        }
    }
    for i in pending {
        lines[i] = append_semicolon(&lines[i]);
    }

    let mut out = lines.join("\n");
    if had_trailing_newline {
        out.push('\n');
    }
    out
}

/// Close parens left open at end of input
fn balance_parens(sql: &str) -> String {
    let mut quote: Option<char> = None;
    let mut depth: i32 = 0;
    for line in sql.lines() {
        depth += scan_line(line, &mut quote).depth_delta;
    }
    if depth <= 0 || quote.is_some() {
        return sql.to_string();
    }

    let closers = ")".repeat(depth as usize);
    let trimmed = sql.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(';') {
        format!("{stripped}{closers};\n")
    } else {
        format!("{trimmed}\n{closers};\n")
    }
}

fn is_statement_head(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["CREATE", "ALTER", "DROP", "INSERT"].iter().any(|head| {
        trimmed
            .get(..head.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(head))
            && trimmed[head.len()..]
                .chars()
                .next()
                .is_none_or(char::is_whitespace)
    })
}

fn needs_terminator(line: &str) -> bool {
    let code = code_part(line);
    let trimmed = code.trim_end();
    !trimmed.is_empty() && !trimmed.ends_with(';') && !trimmed.ends_with(',')
}

/// Insert `;` after the code portion of a line, before any inline comment
fn append_semicolon(line: &str) -> String {
    let code = code_part(line);
    let cut = code.trim_end().len();
    let mut out = String::with_capacity(line.len() + 1);
    out.push_str(&line[..cut]);
    out.push(';');
    out.push_str(&line[cut..]);
    out
}

/// The part of a line preceding any `--` comment that starts outside quotes
fn code_part(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    for (k, &(idx, c)) in chars.iter().enumerate() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '-' if chars.get(k + 1).map(|&(_, n)| n) == Some('-') => {
                    return &line[..idx];
                }
                _ => {}
            },
        }
    }
    line
}

struct LineEvents {
    depth_delta: i32,
}

/// Track paren depth across one line, honoring quotes and `--` comments.
/// The entering quote state is updated in place (quotes may span lines).
fn scan_line(line: &str, quote: &mut Option<char>) -> LineEvents {
    let mut depth_delta = 0;
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match *quote {
            Some(q) => {
                if c == q {
                    *quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => *quote = Some(c),
                '-' if chars.get(i + 1) == Some(&'-') => break,
                '(' => depth_delta += 1,
                ')' => depth_delta -= 1,
                _ => {}
            },
        }
        i += 1;
    }
    LineEvents { depth_delta }
}

// =============================================================================
// Pass 3: foreign-key statement dedup
// =============================================================================

/// Within the foreign-key section only, drop `ALTER TABLE .. ADD
/// CONSTRAINT` lines whose trimmed text exactly repeats an earlier one.
///
/// Sections start at a line equal to [`FOREIGN_KEY_SECTION_HEADER`] and end
/// at the first statement that is not an `ALTER TABLE .. ADD CONSTRAINT`
/// line, a comment, or a blank. Text outside a section passes through
/// untouched. Dedup is by exact statement text, not constraint name: two
/// statements can share a name but differ in body, and those both survive.
#[must_use]
pub fn dedup_foreign_key_statements(sql: &str) -> String {
    let had_trailing_newline = sql.ends_with('\n');
    let mut out: Vec<&str> = Vec::new();
    let mut in_section = false;
    let mut seen: HashSet<&str> = HashSet::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed == FOREIGN_KEY_SECTION_HEADER {
            in_section = true;
            seen.clear();
            out.push(line);
            continue;
        }
        if in_section {
            if is_alter_add_constraint(trimmed) {
                if !seen.insert(trimmed) {
                    continue;
                }
            } else if !trimmed.is_empty() && !trimmed.starts_with("--") {
                in_section = false;
            }
        }
        out.push(line);
    }

    let mut joined = out.join("\n");
    if had_trailing_newline {
        joined.push('\n');
    }
    joined
}

fn is_alter_add_constraint(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.starts_with("ALTER TABLE") && upper.contains("ADD CONSTRAINT")
}

// =============================================================================
// Validation (advisory)
// =============================================================================

/// Report structural problems without fixing them: unbalanced parens,
/// unclosed quotes, an unterminated final statement.
#[must_use]
pub fn validate_sql_syntax(sql: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut quote: Option<char> = None;
    let mut quote_opened_at = 0;
    let mut open_stack: Vec<usize> = Vec::new();
    let mut last_content: Option<(usize, String)> = None;

    for (n, line) in sql.lines().enumerate() {
        let line_no = n + 1;
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    '\'' | '"' | '`' => {
                        quote = Some(c);
                        quote_opened_at = line_no;
                    }
                    '-' if chars.get(i + 1) == Some(&'-') => break,
                    '(' => open_stack.push(line_no),
                    ')' => {
                        if open_stack.pop().is_none() {
                            issues.push(ValidationIssue {
                                line: line_no,
                                message: "closing paren without a matching open".to_string(),
                            });
                        }
                    }
                    _ => {}
                },
            }
            i += 1;
        }
        let code = code_part(line).trim();
        if !code.is_empty() {
            last_content = Some((line_no, code.to_string()));
        }
    }

    if let Some(q) = quote {
        issues.push(ValidationIssue {
            line: quote_opened_at,
            message: format!("unclosed {q} quote"),
        });
    }
    for line in open_stack {
        issues.push(ValidationIssue {
            line,
            message: "unclosed paren".to_string(),
        });
    }
    if let Some((line, code)) = last_content {
        if !code.ends_with(';') {
            issues.push(ValidationIssue {
                line,
                message: "final statement is not terminated with `;`".to_string(),
            });
        }
    }
    issues
}
