//! Compiles CODEOWNERS patterns into [`Matcher`]s.
//!
//! Patterns follow the gitignore globbing rules, with one CODEOWNERS-specific
//! twist: a pattern whose last segment is a lone `*` only matches direct
//! children of its directory rather than everything beneath it.

use crate::glob::SegmentGlob;

/// A pattern compiled for matching against `/`-separated, repository-relative
/// paths. Built once per rule by [`compile`]; matching never re-parses the
/// pattern text.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A root-anchored path with no wildcards, e.g. `/README.md` or
    /// `app/models/user.rb`. Matches the path itself and anything beneath it.
    Literal { path: String },
    /// A root-anchored directory with no wildcards, e.g. `/config/` or
    /// `docs/**`. Matches everything beneath the directory but not a file of
    /// the same name.
    PrefixDirectory { dir: String },
    /// A single segment without a leading slash, e.g. `foo`, `*.md` or
    /// `build/`, matched against every segment of the path.
    AnyDepthSegment { glob: SegmentGlob, dir_only: bool },
    /// A leading `**` followed by literal segments only, e.g. `**/fixtures`.
    /// A bare `**` is represented with an empty tail.
    DoubleStar { tail: Vec<String>, dir_only: bool },
    /// Any other combination of segments. Matching tracks the set of path
    /// positions each pattern prefix can reach, so `**` segments never
    /// backtrack.
    Mixed {
        segments: Vec<Segment>,
        dir_only: bool,
        recursive: bool,
    },
}

/// One segment of a [`Matcher::Mixed`] pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// `**`: zero or more whole path segments.
    AnyDepth,
    Glob(SegmentGlob),
}

/// The output of [`compile`]: the matcher plus a description of any pattern
/// construct that was degraded rather than modelled exactly.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub matcher: Matcher,
    pub issue: Option<&'static str>,
}

/// Compile a pattern into a [`Matcher`]. Compilation never fails: constructs
/// that aren't modelled are degraded and reported via [`Compiled::issue`].
pub fn compile(pattern: &str) -> Compiled {
    let shape = Shape::parse(pattern);
    let issue = shape.issue;
    Compiled {
        matcher: Matcher::from_shape(&shape),
        issue,
    }
}

impl Matcher {
    fn from_shape(shape: &Shape<'_>) -> Matcher {
        let dir_only = shape.dir_only;
        let segments = shape
            .segments
            .iter()
            .map(|&segment| match segment {
                "**" => Segment::AnyDepth,
                glob => Segment::Glob(SegmentGlob::new(glob)),
            })
            .collect::<Vec<_>>();

        if segments.is_empty() {
            return if dir_only {
                Matcher::DoubleStar {
                    tail: Vec::new(),
                    dir_only,
                }
            } else {
                // Nothing left to match against; only reachable for
                // patterns made entirely of slashes.
                Matcher::Mixed {
                    segments,
                    dir_only,
                    recursive: false,
                }
            };
        }

        if !shape.anchored {
            if let [Segment::Glob(glob)] = segments.as_slice() {
                return Matcher::AnyDepthSegment {
                    glob: glob.clone(),
                    dir_only,
                };
            }
        }

        let (leading_double_star, rest) = match segments.split_first() {
            Some((Segment::AnyDepth, rest)) => (true, rest),
            _ => (false, segments.as_slice()),
        };
        if let Some(literals) = literal_segments(rest) {
            if leading_double_star {
                return Matcher::DoubleStar {
                    tail: literals,
                    dir_only,
                };
            }
            let path = literals.join("/");
            return if dir_only {
                Matcher::PrefixDirectory { dir: path }
            } else {
                Matcher::Literal { path }
            };
        }

        Matcher::Mixed {
            segments,
            dir_only,
            recursive: shape.is_recursive(),
        }
    }

    /// Returns true if the matcher accepts the given repository-relative
    /// path. Empty paths never match.
    pub fn matches(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        let segments = path.split('/').collect::<Vec<_>>();
        self.matches_segments(path, &segments)
    }

    /// Like [`Matcher::matches`], but with the path already split into
    /// segments so callers testing many matchers split it only once.
    pub(crate) fn matches_segments(&self, path: &str, segments: &[&str]) -> bool {
        match self {
            Matcher::Literal { path: literal } => {
                path == literal || is_beneath(path, literal)
            }
            Matcher::PrefixDirectory { dir } => is_beneath(path, dir),
            Matcher::AnyDepthSegment { glob, dir_only } => {
                // A directory-only pattern can't match the final segment
                let candidates = if *dir_only {
                    &segments[..segments.len().saturating_sub(1)]
                } else {
                    segments
                };
                candidates.iter().any(|segment| glob.is_match(segment))
            }
            Matcher::DoubleStar { tail, dir_only } => {
                let required = tail.len() + usize::from(*dir_only);
                let Some(last_start) = segments.len().checked_sub(required) else {
                    return false;
                };
                (0..=last_start).any(|start| {
                    segments[start..start + tail.len()]
                        .iter()
                        .zip(tail)
                        .all(|(segment, literal)| segment == literal)
                })
            }
            Matcher::Mixed {
                segments: pattern,
                dir_only,
                recursive,
            } => match_from(pattern, segments, *dir_only, *recursive),
        }
    }
}

fn is_beneath(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

fn literal_segments(segments: &[Segment]) -> Option<Vec<String>> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Glob(glob) => glob.as_literal().map(str::to_owned),
            Segment::AnyDepth => None,
        })
        .collect()
}

fn match_from(pattern: &[Segment], path: &[&str], dir_only: bool, recursive: bool) -> bool {
    // reachable[i] is set when the pattern segments seen so far can consume
    // exactly the first i path segments
    let mut reachable = vec![false; path.len() + 1];
    reachable[0] = true;

    for segment in pattern {
        match segment {
            Segment::AnyDepth => {
                let mut seen = false;
                for slot in reachable.iter_mut() {
                    seen |= *slot;
                    *slot = seen;
                }
            }
            Segment::Glob(glob) => {
                for i in (0..path.len()).rev() {
                    reachable[i + 1] = reachable[i] && glob.is_match(path[i]);
                }
                reachable[0] = false;
            }
        }
        if !reachable.contains(&true) {
            return false;
        }
    }

    reachable.iter().enumerate().any(|(consumed, &ok)| {
        let remaining = path.len() - consumed;
        ok && if !recursive {
            remaining == 0
        } else if dir_only {
            remaining > 0
        } else {
            true
        }
    })
}

/// The normalised form of a pattern, shared by [`Matcher`] and the pattern
/// set NFA so both agree on what a pattern means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Shape<'a> {
    /// Whether the pattern only matches from the repository root. Leading `**`
    /// segments are kept in `segments` and take care of matching at depth.
    pub(crate) anchored: bool,
    /// Whether the pattern only matches paths strictly beneath the last
    /// segment (a trailing `/` or `/**`).
    pub(crate) dir_only: bool,
    /// Non-empty segments, with consecutive `**` collapsed and a trailing `**`
    /// folded into `dir_only`.
    pub(crate) segments: Vec<&'a str>,
    pub(crate) issue: Option<&'static str>,
}

impl<'a> Shape<'a> {
    pub(crate) fn parse(pattern: &'a str) -> Self {
        let (pattern, leading_slash) = match pattern.strip_prefix('/') {
            Some(pattern) => (pattern, true),
            None => (pattern, false),
        };
        let (pattern, trailing_slash) = match pattern.strip_suffix('/') {
            Some(pattern) => (pattern, true),
            None => (pattern, false),
        };

        let mut issue = None;
        let mut segments: Vec<&str> = Vec::new();
        for segment in pattern.split('/') {
            if segment.is_empty() {
                issue = Some("empty path segment ignored");
                continue;
            }
            if segment == "**" && segments.last() == Some(&"**") {
                continue;
            }
            if segment != "**" && segment.contains("**") {
                issue = Some("`**` inside a path segment is matched literally");
            }
            segments.push(segment);
        }

        // A slash anywhere but the end anchors the pattern to the root
        let anchored = leading_slash || segments.len() > 1;

        let mut dir_only = trailing_slash;
        if segments.last() == Some(&"**") {
            segments.pop();
            dir_only = true;
        }

        if segments.is_empty() && !dir_only {
            issue = Some("pattern has no path segments and matches nothing");
        }

        Shape {
            anchored,
            dir_only,
            segments,
            issue,
        }
    }

    /// Whether the pattern matches nothing at all.
    pub(crate) fn is_void(&self) -> bool {
        self.segments.is_empty() && !self.dir_only
    }

    /// Whether a match also covers everything beneath the matched path. Only
    /// patterns ending in a lone `*` segment are limited to direct children.
    pub(crate) fn is_recursive(&self) -> bool {
        if self.dir_only {
            return true;
        }
        match self.segments.last() {
            Some(last) => *last != "*",
            None => false,
        }
    }
}
