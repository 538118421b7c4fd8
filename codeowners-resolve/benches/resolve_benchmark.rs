use codeowners_resolve::RuleSet;
use criterion::{criterion_group, criterion_main, Criterion};

const TEST_PATHS: &[&str] = &[
    "file-a",
    "dir-a/file-a",
    "dir-a/dir-c/file-a",
    "dir-a/dir-c/file-b",
    "dir-b/file-a",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

const TEST_PATTERNS: &[&str] = &[
    "*",
    "*-a",
    "file-*",
    "/dir-b",
    "dir-a/dir-b",
    "**/dir-*/file-*",
    "dir-*/*",
    "dir-b/dir-d/dir-e/dir-f/dir-g/file-a",
];

fn build_ruleset(patterns: &[String]) -> RuleSet {
    let source = patterns
        .iter()
        .map(|pattern| format!("{} @org/team\n", pattern))
        .collect::<String>();

    codeowners_resolve::load(&source).ruleset
}

// A rule file shaped like a large monorepo's: a few thousand directory
// rules plus some extension and any-depth rules.
fn large_patterns() -> Vec<String> {
    let mut patterns = vec![
        "*".to_string(),
        "*.md".to_string(),
        "**/fixtures/".to_string(),
    ];
    for team in 0..50 {
        for component in 0..40 {
            patterns.push(format!("/services/team-{}/component-{}/", team, component));
        }
        patterns.push(format!("/services/team-{}/*.yml", team));
    }
    patterns
}

fn large_paths() -> Vec<String> {
    let mut paths = Vec::new();
    for team in (0..50).step_by(7) {
        for component in (0..40).step_by(3) {
            for file in ["src/lib.rs", "README.md", "fixtures/a.json", "deploy.yml"] {
                paths.push(format!(
                    "services/team-{}/component-{}/{}",
                    team, component, file
                ));
            }
        }
    }
    paths
}

fn resolve_benchmark(c: &mut Criterion) {
    let small_patterns = TEST_PATTERNS.iter().map(|p| p.to_string()).collect::<Vec<_>>();
    c.bench_function("building", |b| b.iter(|| build_ruleset(&small_patterns)));

    let ruleset = build_ruleset(&small_patterns);
    c.bench_function("resolving", |b| {
        b.iter(|| {
            for p in TEST_PATHS {
                ruleset.resolve(p);
            }
        })
    });

    let large = build_ruleset(&large_patterns());
    let paths = large_paths();
    c.bench_function("resolving large ruleset one by one", |b| {
        b.iter(|| {
            for p in &paths {
                large.resolve(p);
            }
        })
    });
    c.bench_function("resolving large ruleset in bulk", |b| {
        b.iter(|| large.resolve_all(&paths))
    });
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
