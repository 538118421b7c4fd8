use crate::{
    error::{Diagnostic, DiagnosticKind},
    parser,
    pattern::{self, Matcher},
    patternset::{self, TreeMatcher},
};

/// A CODEOWNERS rule with its pattern compiled, ready for matching.
#[derive(Debug, Clone)]
pub struct Rule {
    line: usize,
    pattern: String,
    owners: Vec<String>,
    matcher: Matcher,
}

impl Rule {
    /// Create a rule, compiling its pattern. `line` is the rule's 1-based
    /// position in the file.
    pub(crate) fn new(line: usize, pattern: impl Into<String>, owners: Vec<String>) -> Rule {
        Self::compile(line, pattern.into(), owners).0
    }

    fn compile(
        line: usize,
        pattern: String,
        owners: Vec<String>,
    ) -> (Rule, Option<&'static str>) {
        let compiled = pattern::compile(&pattern);
        let rule = Rule {
            line,
            pattern,
            owners,
            matcher: compiled.matcher,
        };
        (rule, compiled.issue)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The rule's owners. Empty for a rule that explicitly declares a path
    /// unowned.
    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// The outcome of resolving a path: the winning rule, if any rule matched.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    rule: Option<&'a Rule>,
}

impl<'a> Resolution<'a> {
    /// Owners of the path. Empty both when nothing matched and when the
    /// winning rule has no owners; use [`Resolution::matched`] to tell the two
    /// apart.
    pub fn owners(&self) -> &'a [String] {
        self.rule.map(Rule::owners).unwrap_or(&[])
    }

    /// Whether any rule matched the path.
    pub fn matched(&self) -> bool {
        self.rule.is_some()
    }

    /// The rule that determined the owners.
    pub fn rule(&self) -> Option<&'a Rule> {
        self.rule
    }
}

/// An immutable, ordered set of CODEOWNERS rules. Rules stay in file order;
/// when several match a path, the last one wins outright.
///
/// A `RuleSet` is `Send + Sync` and holds no interior mutability, so it can be
/// shared freely between threads resolving paths concurrently.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    pattern_set: TreeMatcher,
}

impl RuleSet {
    // Precedence follows position in `rules`, so callers must pass them in
    // file order. Only `RuleSetBuilder` and tests construct sets directly.
    pub(crate) fn new(rules: Vec<Rule>) -> Self {
        let mut builder = patternset::Builder::new();
        for rule in &rules {
            builder.add(&rule.pattern);
        }
        Self {
            rules,
            pattern_set: builder.build(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the owners of a `/`-separated, repository-relative path.
    /// Rules are tried from the bottom of the file up and the first match
    /// wins, so owners are never merged across rules.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        if path.is_empty() {
            return Resolution { rule: None };
        }

        let segments = path.split('/').collect::<Vec<_>>();
        let rule = self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.matcher.matches_segments(path, &segments));
        Resolution { rule }
    }

    /// The owners of a path, or `None` if the path is unowned, either because
    /// no rule matched or because the winning rule has no owners.
    pub fn owners(&self, path: &str) -> Option<&[String]> {
        let owners = self.resolve(path).owners();
        if owners.is_empty() {
            None
        } else {
            Some(owners)
        }
    }

    /// All rules matching a path, in file order. The last one is the rule
    /// [`RuleSet::resolve`] picks.
    pub fn matching_rules(&self, path: &str) -> Vec<&Rule> {
        if path.is_empty() {
            return Vec::new();
        }

        let segments = path.split('/').collect::<Vec<_>>();
        self.rules
            .iter()
            .filter(|rule| rule.matcher.matches_segments(path, &segments))
            .collect()
    }

    /// Resolve many paths at once, returning one [`Resolution`] per path in
    /// input order. Paths sharing a directory are only matched against the
    /// directory's segments once, which makes this much faster than calling
    /// [`RuleSet::resolve`] in a loop when resolving a whole repository.
    pub fn resolve_all(&self, paths: &[impl AsRef<str>]) -> Vec<Resolution<'_>> {
        self.pattern_set
            .matches_for_paths(paths)
            .into_iter()
            .map(|ids| Resolution {
                rule: ids.last().map(|&id| &self.rules[id]),
            })
            .collect()
    }

    /// Resolve many paths in parallel on the rayon thread pool.
    #[cfg(feature = "parallel")]
    pub fn par_resolve<P>(&self, paths: &[P]) -> Vec<Resolution<'_>>
    where
        P: AsRef<str> + Sync,
    {
        use rayon::prelude::*;

        paths
            .par_iter()
            .map(|path| self.resolve(path.as_ref()))
            .collect()
    }
}

/// Compiles parsed rules into a [`RuleSet`], recording a diagnostic for every
/// pattern that had to be degraded. Rules must be added in file order: a rule
/// added later takes precedence over every rule added before it.
pub struct RuleSetBuilder {
    rules: Vec<Rule>,
    diagnostics: Vec<Diagnostic>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, rule: parser::Rule) {
        let parser::Rule {
            line,
            pattern,
            owners,
        } = rule;
        let parser::Spanned(pattern, span) = pattern;

        let diagnostic_text = pattern.clone();
        let (rule, issue) = Rule::compile(
            line,
            pattern,
            owners.into_iter().map(|o| o.0).collect(),
        );
        if let Some(issue) = issue {
            self.diagnostics.push(Diagnostic::new(
                line,
                DiagnosticKind::UnsupportedPatternConstruct,
                issue,
                diagnostic_text,
                span,
            ));
        }
        self.rules.push(rule);
    }

    /// Build the `RuleSet`, returning it along with the diagnostics raised
    /// while compiling patterns.
    pub fn build(self) -> (RuleSet, Vec<Diagnostic>) {
        (RuleSet::new(self.rules), self.diagnostics)
    }
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
