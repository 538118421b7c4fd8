//! Errors and non-fatal diagnostics produced while loading a CODEOWNERS file.

use std::{fmt, io};

/// A fatal error: the CODEOWNERS source couldn't be obtained, so no rules
/// were loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to read CODEOWNERS source: {0}")]
    UnreadableSource(#[from] io::Error),
}

/// A span of text in a CODEOWNERS file. Contains the start and end byte offsets
/// of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span(pub usize, pub usize);

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span(start, end)
    }
}

/// The class of problem a [`Diagnostic`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The line couldn't be turned into a rule and was skipped.
    MalformedLine,
    /// The rule was kept, but part of its pattern isn't modelled exactly and
    /// was degraded to a simpler match.
    UnsupportedPatternConstruct,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MalformedLine => f.write_str("malformed line"),
            DiagnosticKind::UnsupportedPatternConstruct => {
                f.write_str("unsupported pattern construct")
            }
        }
    }
}

/// A non-fatal problem with a single line. Loading continues past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
    /// The offending text: the raw line for malformed lines, or the pattern
    /// for degraded ones.
    pub text: String,
    pub span: Span,
}

impl Diagnostic {
    pub(crate) fn new(
        line: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
        text: impl Into<String>,
        span: impl Into<Span>,
    ) -> Diagnostic {
        Diagnostic {
            line,
            kind,
            message: message.into(),
            text: text.into(),
            span: span.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}: {} ({:?})",
            self.line, self.kind, self.message, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(
            3,
            DiagnosticKind::MalformedLine,
            "lines cannot contain null bytes",
            "foo\0 @bar",
            (10, 19),
        );
        assert_eq!(
            diagnostic.to_string(),
            "line 3: malformed line: lines cannot contain null bytes (\"foo\\0 @bar\")"
        );

        let err = LoadError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "unable to read CODEOWNERS source: gone");
    }
}
