use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use converter::{Options, Strategy};
use nsc::ErrorKind;

const CASE_EXTENSION: &str = ".case";

#[derive(Debug, Deserialize)]
pub struct CaseConfig {
    /// Human-readable case description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected stdout line (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected failure, by error kind name (e.g. "MalformedInput").
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Also run the universal converter and require identical output.
    #[serde(default)]
    pub cross_check: bool,

    /// Pipeline options (block_capacity, max_blocks, chunk_size, strategy, drain_trailing).
    #[serde(default)]
    pub options: Options,
}

/// Split a `.case` file into its TOML frontmatter and the raw request bytes.
///
/// The request is everything after the closing `---` line, verbatim.
fn parse_case_file(content: &str) -> Result<(CaseConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let after_open = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- frontmatter delimiter")?;

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let toml_str = after_open[..close_pos].trim_end_matches('\r');

    let rest = &after_open[close_pos + 4..];
    let request = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: CaseConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, request))
}

pub enum CaseOutcome {
    Pass,
    Fail(String),
}

pub struct CaseResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: CaseOutcome,
}

impl CaseResult {
    fn label(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
                .to_string()
        })
    }
}

fn run_single_case(path: &Path) -> CaseResult {
    let fail = |description: Option<String>, reason: String| CaseResult {
        path: path.to_path_buf(),
        description,
        outcome: CaseOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let (config, request) = match parse_case_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    match check_case(&config, request) {
        None => CaseResult {
            path: path.to_path_buf(),
            description,
            outcome: CaseOutcome::Pass,
        },
        Some(reason) => fail(description, reason),
    }
}

/// Run one request against its expectations. Returns `Some(reason)` on mismatch.
fn check_case(config: &CaseConfig, request: &str) -> Option<String> {
    let expected_kind = match config.expect_error.as_deref().map(ErrorKind::from_name) {
        None => None,
        Some(Some(kind)) => Some(kind),
        Some(None) => {
            return Some(format!(
                "unknown error kind \"{}\"",
                config.expect_error.as_deref().unwrap_or_default()
            ));
        }
    };

    let result = converter::convert_str(request, &config.options);

    let output = match (expected_kind, result) {
        (Some(kind), Err(error)) if error.kind() == kind => return None,
        (Some(kind), Err(error)) => {
            return Some(format!(
                "expected {} error, got {}: {}",
                kind.name(),
                error.kind().name(),
                error
            ));
        }
        (Some(kind), Ok(output)) => {
            return Some(format!(
                "expected {} error, but conversion printed {}",
                kind.name(),
                output.trim()
            ));
        }
        (None, Err(error)) => {
            return Some(format!(
                "unexpected {} error: {}",
                error.kind().name(),
                error
            ));
        }
        (None, Ok(output)) => output,
    };

    if let Some(expected) = &config.expect_output {
        if output.trim() != expected.trim() {
            return Some(format!(
                "output mismatch\n  expected: {}\n  actual:   {}",
                expected.trim(),
                output.trim()
            ));
        }
    }

    if config.cross_check {
        let universal = Options {
            strategy: Strategy::Universal,
            ..config.options
        };
        match converter::convert_str(request, &universal) {
            Ok(other) if other == output => {}
            Ok(other) => {
                return Some(format!(
                    "strategies disagree\n  auto:      {}\n  universal: {}",
                    output.trim(),
                    other.trim()
                ));
            }
            Err(error) => return Some(format!("universal converter failed: {}", error)),
        }
    }

    None
}

/// Discover `.case` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_cases(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_cases(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_cases(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(CASE_EXTENSION) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

/// List available categories for the given case path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_EXTENSION, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} cases)", label, files.len());
    }
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

/// Select the categories to run. An empty filter selects everything.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                selected.insert(cat.as_str(), files);
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// Run all `.case` files under `path` (or a single file).
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let run_categories: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no {} files found in {}", CASE_EXTENSION, path.display());
            return 1;
        }
        select_categories(&all, categories)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    };

    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<CaseResult> = Vec::new();

    for (cat, files) in &run_categories {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", paint(header, "1", no_color));
        }

        for file in files {
            let result = run_single_case(file);
            match &result.outcome {
                CaseOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                CaseOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let CaseOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
