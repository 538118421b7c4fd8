//! Resolve which owners a CODEOWNERS file assigns to repository paths.
//!
//! ```
//! let loaded = codeowners_resolve::load("*.md @docs\n/config/ @ops\n");
//! let ruleset = loaded.ruleset;
//!
//! assert_eq!(ruleset.resolve("README.md").owners(), ["@docs"]);
//! assert_eq!(ruleset.resolve("config/app.rb").owners(), ["@ops"]);
//! assert!(!ruleset.resolve("src/main.rs").matched());
//! ```
//!
//! When several rules match a path, the last one in the file wins and its
//! owners replace those of earlier rules entirely.

pub mod error;
mod glob;
pub mod parser;
mod path_tree;
pub mod pattern;
mod patternset;
mod ruleset;

use std::{io::Read, path::Path};

pub use error::{Diagnostic, DiagnosticKind, LoadError, Span};
pub use pattern::Matcher;
pub use ruleset::{Resolution, Rule, RuleSet, RuleSetBuilder};

/// A loaded CODEOWNERS file: the compiled rules plus diagnostics for every
/// line that was skipped or degraded along the way.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub ruleset: RuleSet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse and compile CODEOWNERS source text. Never fails; problems with
/// individual lines are reported in [`Loaded::diagnostics`].
pub fn load(source: &str) -> Loaded {
    parser::parse(source).into_loaded()
}

/// Read CODEOWNERS source from a reader and load it.
pub fn from_reader(mut reader: impl Read) -> Result<Loaded, LoadError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    Ok(load(&source))
}

/// Read a CODEOWNERS file from disk and load it.
pub fn from_path(path: impl AsRef<Path>) -> Result<Loaded, LoadError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading CODEOWNERS file");
    Ok(parser::parse_file(path)?.into_loaded())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_load() {
        let source = "\
# Docs
*.md            @org/docs

# Ops owns config, but not the generated bits
/config/        @org/ops @alice
/config/gen/
";
        let loaded = load(source);
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.ruleset.len(), 3);

        let rules = &loaded.ruleset;
        assert_eq!(rules.resolve("docs/intro.md").owners(), ["@org/docs"]);
        assert_eq!(
            rules.resolve("config/app.yml").owners(),
            ["@org/ops", "@alice"]
        );

        let generated = rules.resolve("config/gen/schema.rb");
        assert!(generated.matched());
        assert!(generated.owners().is_empty());
        assert_eq!(generated.rule().map(Rule::line), Some(6));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CODEOWNERS");
        std::fs::write(&path, "/src/ @dev\nbad\0line @x\n").unwrap();

        let loaded = from_path(&path).unwrap();
        assert_eq!(
            loaded.ruleset.owners("src/lib.rs"),
            Some(&["@dev".to_string()][..])
        );
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].kind, DiagnosticKind::MalformedLine);

        let missing = from_path(dir.path().join("nope"));
        assert!(matches!(missing, Err(LoadError::UnreadableSource(_))));
    }

    #[test]
    fn test_from_reader() {
        let loaded = from_reader("docs/* @docs\n".as_bytes()).unwrap();
        assert_eq!(loaded.ruleset.resolve("docs/a.md").owners(), ["@docs"]);

        let invalid_utf8: &[u8] = &[b'a', b' ', 0xff, 0xfe];
        let err = from_reader(invalid_utf8).unwrap_err();
        match err {
            LoadError::UnreadableSource(err) => {
                assert_eq!(err.kind(), io::ErrorKind::InvalidData)
            }
        }
    }
}
