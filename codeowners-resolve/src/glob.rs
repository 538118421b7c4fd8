use regex::Regex;

/// A compiled glob for a single path segment. `*` matches any run of
/// characters and `?` matches exactly one; neither crosses a `/` because
/// candidates are always individual segments.
///
/// Most segments in real CODEOWNERS files are literals or have a single
/// leading or trailing star, so those get cheap string comparisons and only
/// the rest fall back to a regex.
#[derive(Debug, Clone)]
pub enum SegmentGlob {
    Unconditional,
    Literal(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    Regex(Regex),
}

impl SegmentGlob {
    pub(crate) fn new(glob: &str) -> Self {
        if glob == "*" || glob == "**" {
            return Self::Unconditional;
        }
        // `**` only means something as a whole segment. Anywhere else the
        // segment isn't treated as a glob at all.
        if glob.contains("**") || !has_wildcard(glob.chars()) {
            return Self::Literal(glob.to_owned());
        }

        let inner = glob.strip_prefix('*').unwrap_or(glob);
        let inner = inner.strip_suffix('*').unwrap_or(inner);
        if !has_wildcard(inner.chars()) {
            let leading_star = glob.starts_with('*');
            let trailing_star = glob.ends_with('*');
            match (leading_star, trailing_star) {
                (false, true) => return Self::Prefix(inner.to_owned()),
                (true, false) => return Self::Suffix(inner.to_owned()),
                (true, true) => return Self::Contains(inner.to_owned()),
                (false, false) => {}
            }
        }

        let source = glob_to_regex(glob);
        match Regex::new(&source) {
            Ok(re) => Self::Regex(re),
            Err(err) => {
                tracing::warn!(glob = %glob, error = %err, "falling back to literal segment match");
                Self::Literal(glob.to_owned())
            }
        }
    }

    pub(crate) fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Literal(literal) => literal == candidate,
            Self::Prefix(prefix) => candidate.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => candidate.ends_with(suffix.as_str()),
            Self::Contains(needle) => {
                memchr::memmem::find(candidate.as_bytes(), needle.as_bytes()).is_some()
            }
            Self::Regex(re) => re.is_match(candidate),
        }
    }

    /// The literal text of the segment, if it contains no wildcards.
    pub(crate) fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(literal) => Some(literal.as_str()),
            _ => None,
        }
    }
}

fn has_wildcard(mut chars: impl Iterator<Item = char>) -> bool {
    chars.any(|c| c == '*' || c == '?')
}

fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() + 8);
    regex.push_str(r"\A");
    for c in glob.chars() {
        match c {
            '*' => regex.push_str(r"[^/]*"),
            '?' => regex.push_str(r"[^/]"),
            _ => {
                if regex_syntax::is_meta_character(c) {
                    regex.push('\\');
                }
                regex.push(c);
            }
        }
    }
    regex.push_str(r"\z");
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(matches!(SegmentGlob::new("*"), SegmentGlob::Unconditional));
        assert!(matches!(SegmentGlob::new("**"), SegmentGlob::Unconditional));
        assert!(matches!(SegmentGlob::new("foo"), SegmentGlob::Literal(_)));
        assert!(matches!(SegmentGlob::new("foo*"), SegmentGlob::Prefix(_)));
        assert!(matches!(SegmentGlob::new("*.rb"), SegmentGlob::Suffix(_)));
        assert!(matches!(SegmentGlob::new("**.rb"), SegmentGlob::Literal(_)));
        assert!(matches!(SegmentGlob::new("a***"), SegmentGlob::Literal(_)));
        assert!(matches!(SegmentGlob::new("*test*"), SegmentGlob::Contains(_)));
        assert!(matches!(SegmentGlob::new("a*b"), SegmentGlob::Regex(_)));
        assert!(matches!(SegmentGlob::new("?oo"), SegmentGlob::Regex(_)));
        assert!(matches!(SegmentGlob::new("*.?s"), SegmentGlob::Regex(_)));
    }

    #[test]
    fn test_matching() {
        let examples = [
            ("*", "", true),
            ("*", "anything", true),
            ("foo", "foo", true),
            ("foo", "Foo", false),
            ("foo", "foobar", false),
            ("foo*", "foobar", true),
            ("foo*", "foo", true),
            ("foo*", "barfoo", false),
            ("*.md", "README.md", true),
            ("*.md", "README.mdx", false),
            ("*spec*", "user_spec.rb", true),
            ("*spec*", "user.rb", false),
            ("a*b", "ab", true),
            ("a*b", "axxb", true),
            ("a*b", "axxc", false),
            ("f??", "foo", true),
            ("f??", "fo", false),
            ("?oo", "zoo", true),
            ("v1.?", "v1.2", true),
            ("v1.?", "v1x2", false),
            ("!important", "!important", true),
            ("[abc]*", "[abc]x", true),
            ("[abc]*", "a", false),
            ("a+b*c", "a+bxc", true),
            ("foo**", "foo**", true),
            ("foo**", "foobar", false),
            ("**.rb", "x.rb", false),
        ];

        for (glob, candidate, expected) in examples {
            assert_eq!(
                SegmentGlob::new(glob).is_match(candidate),
                expected,
                "glob `{}` against `{}`",
                glob,
                candidate
            );
        }
    }
}
