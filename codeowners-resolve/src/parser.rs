use std::{fs::File, io::Read, path::Path};

use crate::{
    error::{Diagnostic, DiagnosticKind, LoadError, Span},
    ruleset::{self, RuleSetBuilder},
    Loaded,
};

/// Parse a CODEOWNERS file from a string, returning a `ParseResult` containing
/// the parsed rules and any diagnostics for lines that were skipped.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source).parse()
}

/// Parse a CODEOWNERS file from a file path. Only failing to read the file is
/// an error; problems with individual lines end up in
/// [`ParseResult::diagnostics`].
pub fn parse_file(path: &Path) -> Result<ParseResult, LoadError> {
    let mut file = File::open(path)?;
    let mut source = String::new();
    file.read_to_string(&mut source)?;
    Ok(parse(&source))
}

/// The result of parsing a CODEOWNERS file. Contains a `Vec` of parsed rules
/// in file order and a `Vec` of diagnostics for lines that couldn't be parsed.
/// Unlike a fatal error, diagnostics never stop the remaining lines from being
/// parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub rules: Vec<Rule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Compile the parsed rules into a [`ruleset::RuleSet`]. Diagnostics from
    /// parsing are kept, and any raised while compiling patterns are merged in
    /// line order.
    pub fn into_loaded(self) -> Loaded {
        let mut builder = RuleSetBuilder::new();
        for rule in self.rules {
            builder.add(rule);
        }
        let (ruleset, compile_diagnostics) = builder.build();

        let mut diagnostics = self.diagnostics;
        diagnostics.extend(compile_diagnostics);
        diagnostics.sort_by_key(|d| d.line);

        for diagnostic in &diagnostics {
            tracing::warn!(
                line = diagnostic.line,
                kind = %diagnostic.kind,
                "{}",
                diagnostic.message
            );
        }
        tracing::debug!(
            rules = ruleset.len(),
            diagnostics = diagnostics.len(),
            "loaded CODEOWNERS rules"
        );

        Loaded {
            ruleset,
            diagnostics,
        }
    }
}

/// A parsed CODEOWNERS rule: the pattern and owner tokens of one line, each
/// wrapped in `Spanned` to preserve the original source location.
///
/// Owners are kept verbatim. Nothing checks that they look like `@user`,
/// `@org/team` or an email address; that's up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// 1-based line number, which doubles as the rule's precedence.
    pub line: usize,
    pub pattern: Spanned<String>,
    pub owners: Vec<Spanned<String>>,
}

impl Rule {
    fn new(line: usize, pattern: Spanned<String>, owners: Vec<Spanned<String>>) -> Rule {
        Rule {
            line,
            pattern,
            owners,
        }
    }
}

impl From<Rule> for ruleset::Rule {
    fn from(rule: Rule) -> Self {
        ruleset::Rule::new(
            rule.line,
            rule.pattern.0,
            rule.owners.into_iter().map(|o| o.0).collect(),
        )
    }
}

/// A wrapper around a value that preserves the original source location of the
/// value. Contains the value and a `Span` indicating the location of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T>(pub T, pub Span);

impl<T> Spanned<T> {
    fn new(val: impl Into<T>, span: impl Into<Span>) -> Spanned<T> {
        Spanned(val.into(), span.into())
    }
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 0,
            line_start: 0,
            diagnostics: Vec::new(),
        }
    }

    fn parse(mut self) -> ParseResult {
        let mut rules = Vec::new();
        while self.pos < self.source.len() {
            self.line += 1;
            self.line_start = self.pos;
            if let Some(rule) = self.parse_line() {
                rules.push(rule);
            }
            self.skip_line();
        }

        ParseResult {
            rules,
            diagnostics: self.diagnostics,
        }
    }

    fn parse_line(&mut self) -> Option<Rule> {
        // Blank lines and full-line comments. A `#` after the pattern is not
        // a comment marker and ends up in an owner token.
        self.skip_whitespace();
        match self.peek() {
            None | Some('#') => return None,
            Some(_) => {}
        }

        if let Some(offset) = self.line_text().find('\0') {
            let start = self.line_start + offset;
            self.malformed("lines cannot contain null bytes", (start, start + 1));
            return None;
        }

        let pattern = self.parse_token();
        if pattern.0.chars().all(|c| c == '/') {
            self.malformed("pattern has no path segments", pattern.1);
            return None;
        }

        let mut owners = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }
            owners.push(self.parse_token());
        }

        Some(Rule::new(self.line, pattern, owners))
    }

    fn parse_token(&mut self) -> Spanned<String> {
        let start = self.pos;
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            token.push(c);
            self.next();
        }
        Spanned::new(token, (start, self.pos))
    }

    fn malformed(&mut self, message: &str, span: impl Into<Span>) {
        let text = self.line_text();
        self.diagnostics.push(Diagnostic::new(
            self.line,
            DiagnosticKind::MalformedLine,
            message,
            text,
            span,
        ));
    }

    // The current line without its terminator
    fn line_text(&self) -> &'a str {
        let rest = &self.source[self.line_start..];
        let end = memchr::memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        rest[..end].trim_end_matches('\r')
    }

    fn skip_line(&mut self) {
        let rest = &self.source.as_bytes()[self.pos..];
        self.pos = match memchr::memchr(b'\n', rest) {
            Some(offset) => self.pos + offset + 1,
            None => self.source.len(),
        };
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.next();
        }
    }

    // Peek at the next character on the current line
    fn peek(&self) -> Option<char> {
        match self.source[self.pos..].chars().next() {
            Some('\n') => None,
            c => c,
        }
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}
