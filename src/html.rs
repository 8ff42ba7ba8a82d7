//! Structural checking and indentation of generated HTML.
//!
//! The generated page goes through two passes before it is written:
//!
//! 1. [`validate`] looks for structural problems: unbalanced or stray tags,
//!    end tags on void elements, duplicate ids and attributes, unterminated
//!    comments and raw-text elements, a missing doctype. Findings carry
//!    line/column positions. They are reported, never fatal.
//! 2. [`prettify`] re-indents the document one element per line, keeping
//!    short text-only elements on a single line.
//!
//! Missing `alt` text and inline `style` attributes are not reported unless
//! enabled through [`Rules`]; the page uses inline styles for per-entry colors.
//!
//! Both passes share a small tokenizer that understands exactly what the
//! renderer emits: tags with quoted attributes, text, comments, a doctype, and
//! raw `<script>`/`<style>` bodies.

use std::collections::HashSet;
use std::fmt;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const INDENT: &str = "  ";

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Doctype(String),
    Comment { raw: String, terminated: bool },
    StartTag {
        name: String,
        raw: String,
        attrs: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag { name: String, raw: String },
    Text(String),
    RawText { content: String, terminated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

/// Byte offset → 1-based line/column (columns count chars).
struct LineMap<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineMap<'a> {
    fn new(source: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = self.source[self.starts[line]..offset].chars().count();
        (line + 1, col + 1)
    }
}

fn tag_name(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Parse `name="value" flag other='x'` into pairs. Names are lowercased.
fn parse_attrs(s: &str) -> Vec<(String, Option<String>)> {
    let mut attrs = Vec::new();
    let mut chars = s.char_indices().peekable();
    loop {
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace() || *c == '/') {
            chars.next();
        }
        let Some(&(start, _)) = chars.peek() else {
            break;
        };
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        let name = s[start..end].to_ascii_lowercase();
        if name.is_empty() {
            // Lone '=' with no attribute name
            chars.next();
            continue;
        }
        while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            chars.next();
        }
        let value = if chars.peek().is_some_and(|(_, c)| *c == '=') {
            chars.next();
            while chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
                chars.next();
            }
            let mut value = String::new();
            match chars.peek().map(|&(_, c)| c) {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == q {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
            Some(value)
        } else {
            None
        };
        attrs.push((name, value));
    }
    attrs
}

/// Index of the `>` closing a tag that starts at `from`, skipping quoted values.
fn find_tag_end(s: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + i),
            _ => {}
        }
    }
    None
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let len = source.len();

    while pos < len {
        let rest = &source[pos..];
        if !rest.starts_with('<') {
            let end = rest.find('<').map(|i| pos + i).unwrap_or(len);
            tokens.push(Token {
                kind: TokenKind::Text(source[pos..end].to_string()),
                offset: pos,
            });
            pos = end;
            continue;
        }

        if rest.starts_with("<!--") {
            let (raw, terminated, next) = match rest[4..].find("-->") {
                Some(i) => (&rest[..4 + i + 3], true, pos + 4 + i + 3),
                None => (rest, false, len),
            };
            tokens.push(Token {
                kind: TokenKind::Comment {
                    raw: raw.to_string(),
                    terminated,
                },
                offset: pos,
            });
            pos = next;
            continue;
        }

        if rest.starts_with("<!") {
            let end = rest.find('>').map(|i| pos + i + 1).unwrap_or(len);
            tokens.push(Token {
                kind: TokenKind::Doctype(source[pos..end].to_string()),
                offset: pos,
            });
            pos = end;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            let name = tag_name(after);
            if !name.is_empty() {
                let end = find_tag_end(source, pos).map(|i| i + 1).unwrap_or(len);
                tokens.push(Token {
                    kind: TokenKind::EndTag {
                        name,
                        raw: source[pos..end].to_string(),
                    },
                    offset: pos,
                });
                pos = end;
                continue;
            }
        }

        let name = tag_name(&rest[1..]);
        if name.is_empty() || !rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            // A bare '<' in text
            let end = rest[1..].find('<').map(|i| pos + 1 + i).unwrap_or(len);
            tokens.push(Token {
                kind: TokenKind::Text(source[pos..end].to_string()),
                offset: pos,
            });
            pos = end;
            continue;
        }

        let end = find_tag_end(source, pos).map(|i| i + 1).unwrap_or(len);
        let raw = &source[pos..end];
        let inner = raw
            .trim_start_matches('<')
            .trim_end_matches('>')
            .get(name.len()..)
            .unwrap_or("");
        let self_closing = raw.ends_with("/>");
        tokens.push(Token {
            kind: TokenKind::StartTag {
                name: name.clone(),
                raw: raw.to_string(),
                attrs: parse_attrs(inner),
                self_closing,
            },
            offset: pos,
        });
        pos = end;

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
            let closing = format!("</{name}");
            let body = &source[pos..];
            let found = body.to_ascii_lowercase().find(&closing);
            let body_end = found.map(|i| pos + i).unwrap_or(len);
            tokens.push(Token {
                kind: TokenKind::RawText {
                    content: source[pos..body_end].to_string(),
                    terminated: found.is_some(),
                },
                offset: pos,
            });
            pos = body_end;
        }
    }
    tokens
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One structural finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

/// Optional checks, off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rules {
    /// Report `<img>` without an `alt` attribute.
    pub require_alt: bool,
    /// Report any `style` attribute.
    pub forbid_inline_style: bool,
}

/// Check the structure of `source`. An empty result means no findings.
pub fn validate(source: &str, rules: Rules) -> Vec<Issue> {
    let map = LineMap::new(source);
    let mut issues = Vec::new();
    let mut report = |offset: usize, severity: Severity, message: String| {
        let (line, column) = map.position(offset);
        issues.push(Issue {
            severity,
            line,
            column,
            message,
        });
    };

    let tokens = tokenize(source);
    let has_doctype = tokens.iter().any(|t| {
        matches!(&t.kind, TokenKind::Doctype(d) if d.to_ascii_lowercase().starts_with("<!doctype html"))
    });
    if !has_doctype {
        report(0, Severity::Warning, "missing <!DOCTYPE html>".to_string());
    }

    let mut open: Vec<(String, usize)> = Vec::new();
    let mut ids: HashSet<String> = HashSet::new();

    for token in &tokens {
        match &token.kind {
            TokenKind::StartTag {
                name,
                attrs,
                self_closing,
                ..
            } => {
                let mut seen = HashSet::new();
                for (attr, value) in attrs {
                    if !seen.insert(attr.as_str()) {
                        report(
                            token.offset,
                            Severity::Error,
                            format!("duplicate attribute {attr:?} on <{name}>"),
                        );
                    }
                    if attr == "id" {
                        let id = value.clone().unwrap_or_default();
                        if id.is_empty() {
                            report(token.offset, Severity::Error, format!("empty id on <{name}>"));
                        } else if !ids.insert(id.clone()) {
                            report(token.offset, Severity::Error, format!("duplicate id {id:?}"));
                        }
                    }
                    if attr == "style" && rules.forbid_inline_style {
                        report(
                            token.offset,
                            Severity::Warning,
                            format!("inline style on <{name}>"),
                        );
                    }
                }
                if name == "img" && rules.require_alt && !attrs.iter().any(|(a, _)| a == "alt") {
                    report(token.offset, Severity::Warning, "<img> without alt".to_string());
                }
                if !is_void(name) && !self_closing {
                    open.push((name.clone(), token.offset));
                }
            }
            TokenKind::EndTag { name, .. } => {
                if is_void(name) {
                    report(
                        token.offset,
                        Severity::Error,
                        format!("end tag for void element </{name}>"),
                    );
                    continue;
                }
                match open.iter().rposition(|(n, _)| n == name) {
                    Some(idx) => {
                        for (unclosed, at) in open.drain(idx + 1..).rev() {
                            report(at, Severity::Error, format!("<{unclosed}> is never closed"));
                        }
                        open.pop();
                    }
                    None => report(token.offset, Severity::Error, format!("stray end tag </{name}>")),
                }
            }
            TokenKind::Comment { terminated, .. } if !terminated => {
                report(token.offset, Severity::Error, "unterminated comment".to_string());
            }
            TokenKind::RawText { terminated, .. } if !terminated => {
                report(
                    token.offset,
                    Severity::Error,
                    "raw text element runs to end of document".to_string(),
                );
            }
            _ => {}
        }
    }

    for (name, at) in open.into_iter().rev() {
        report(at, Severity::Error, format!("<{name}> is never closed"));
    }

    issues.sort_by_key(|i| (i.line, i.column));
    issues
}

// ============================================================================
// Pretty printing
// ============================================================================

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Re-indent `source`, one element per line.
///
/// Elements whose only child is a text run stay on one line. Raw-text bodies
/// keep their lines, re-indented. Whitespace inside text runs is collapsed.
pub fn prettify(source: &str) -> String {
    let tokens = tokenize(source);
    let mut out = String::with_capacity(source.len() + source.len() / 4);
    let mut depth: usize = 0;
    let push_line = |depth: usize, line: &str, out: &mut String| {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push_str(line);
        out.push('\n');
    };

    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i].kind {
            TokenKind::Doctype(raw) => push_line(depth, raw.trim(), &mut out),
            TokenKind::Comment { raw, .. } => push_line(depth, raw.trim(), &mut out),
            TokenKind::StartTag {
                name,
                raw,
                self_closing,
                ..
            } => {
                if is_void(name) || *self_closing {
                    push_line(depth, raw, &mut out);
                    i += 1;
                    continue;
                }
                // <tag></tag> and <tag>text</tag> stay on one line
                let next = tokens.get(i + 1).map(|t| &t.kind);
                let after = tokens.get(i + 2).map(|t| &t.kind);
                let inline = match (next, after) {
                    (Some(TokenKind::EndTag { name: end, raw: end_raw }), _) if end == name => {
                        Some((format!("{raw}{end_raw}"), 2))
                    }
                    (
                        Some(TokenKind::Text(text)),
                        Some(TokenKind::EndTag { name: end, raw: end_raw }),
                    ) if end == name => Some((
                        format!("{raw}{}{end_raw}", collapse_whitespace(text)),
                        3,
                    )),
                    _ => None,
                };
                if let Some((line, consumed)) = inline {
                    push_line(depth, &line, &mut out);
                    i += consumed;
                    continue;
                }
                push_line(depth, raw, &mut out);
                depth += 1;
            }
            TokenKind::EndTag { raw, .. } => {
                depth = depth.saturating_sub(1);
                push_line(depth, raw, &mut out);
            }
            TokenKind::Text(text) => {
                let collapsed = collapse_whitespace(text);
                if !collapsed.is_empty() {
                    push_line(depth, &collapsed, &mut out);
                }
            }
            TokenKind::RawText { content, .. } => {
                for line in content.lines() {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        push_line(depth, trimmed, &mut out);
                    }
                }
            }
        }
        i += 1;
    }
    out
}
