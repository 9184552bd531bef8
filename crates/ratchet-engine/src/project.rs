//! Project configuration: locating, reading and resolving `tsconfig.json`.
//!
//! Config files are JSONC (comments and trailing commas allowed). `extends`
//! chains are merged with the child winning, and every path-valued setting is
//! rebased onto the directory of the file that declared it before merging.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use walkdir::WalkDir;

pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

const TS_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];
const JS_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Package folders that wildcard includes never descend into.
const COMMON_PACKAGE_FOLDERS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

// =============================================================================
// tsconfig.json
// =============================================================================

/// `extends` accepts a single path or, since TypeScript 5.0, a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    Single(String),
    Many(Vec<String>),
}

impl Extends {
    fn into_vec(self) -> Vec<String> {
        match self {
            Extends::Single(path) => vec![path],
            Extends::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<Extends>,
    /// Kept as raw JSON; only a handful of options matter to the codemod.
    #[serde(default)]
    pub compiler_options: Option<Map<String, Value>>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

impl TsConfig {
    /// Make relative `include`/`exclude`/`files` entries and `outDir`
    /// absolute against `dir`.
    fn rebase(&mut self, dir: &Path) {
        for list in [&mut self.include, &mut self.exclude, &mut self.files]
            .into_iter()
            .flatten()
        {
            for entry in list.iter_mut() {
                *entry = rebase_path(dir, entry);
            }
        }
        if let Some(Value::String(out_dir)) = self
            .compiler_options
            .as_mut()
            .and_then(|options| options.get_mut("outDir"))
        {
            *out_dir = rebase_path(dir, out_dir);
        }
    }
}

pub fn parse_tsconfig(source: &str) -> Result<TsConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse tsconfig JSON")?;
    Ok(config)
}

/// Load `path` and everything it extends, merged into one config with
/// absolute paths.
pub fn load_tsconfig(path: &Path) -> Result<TsConfig> {
    let mut visited = FxHashSet::default();
    load_tsconfig_inner(path, &mut visited)
}

fn load_tsconfig_inner(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsConfig> {
    let canonical = canonicalize_or_owned(path);
    if !visited.insert(canonical.clone()) {
        bail!("tsconfig extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
    let mut config = parse_tsconfig(&source)
        .with_context(|| format!("failed to parse tsconfig: {}", path.display()))?;
    let config_dir = path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;
    config.rebase(config_dir);

    if let Some(extends) = config.extends.take() {
        let mut base: Option<TsConfig> = None;
        for specifier in extends.into_vec() {
            let base_path = resolve_extends_path(path, &specifier)?;
            trace!(base = %base_path.display(), "loading extended tsconfig");
            let loaded = load_tsconfig_inner(&base_path, visited)?;
            base = Some(match base {
                Some(earlier) => merge_configs(earlier, loaded),
                None => loaded,
            });
        }
        if let Some(base) = base {
            config = merge_configs(base, config);
        }
    }

    visited.remove(&canonical);
    Ok(config)
}

/// Relative specifiers resolve against the extending file; anything else is
/// looked up as a package in the nearest `node_modules`.
fn resolve_extends_path(current_path: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current_path
        .parent()
        .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;

    let candidate = PathBuf::from(extends);
    if candidate.is_absolute() || extends.starts_with("./") || extends.starts_with("../") {
        let mut candidate = base_dir.join(candidate);
        if candidate.extension().is_none() {
            candidate.set_extension("json");
        }
        return Ok(candidate);
    }

    for dir in base_dir.ancestors() {
        let package = dir.join("node_modules").join(extends);
        if package.is_file() {
            return Ok(package);
        }
        let with_extension = package.with_extension("json");
        if package.extension().is_none() && with_extension.is_file() {
            return Ok(with_extension);
        }
        let nested = package.join(CONFIG_FILE_NAME);
        if nested.is_file() {
            return Ok(nested);
        }
    }
    bail!(
        "cannot resolve extended tsconfig '{}' from {}",
        extends,
        current_path.display()
    )
}

fn merge_configs(base: TsConfig, mut child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(mut base_opts), Some(child_opts)) => {
            base_opts.extend(child_opts);
            Some(base_opts)
        }
        (base_opts, child_opts) => child_opts.or(base_opts),
    };

    TsConfig {
        extends: None,
        compiler_options,
        include: child.include.or(base.include),
        exclude: child.exclude.or(base.exclude),
        files: child.files.or(base.files),
    }
}

// =============================================================================
// Locating the config
// =============================================================================

/// Nearest `tsconfig.json` in `start` or any of its ancestors.
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .map(|candidate| canonicalize_or_owned(&candidate))
}

/// Resolve the config to use: an explicit `--project` file or directory, or
/// the nearest one above `cwd`.
pub fn resolve_tsconfig_path(cwd: &Path, project: Option<&Path>) -> Result<PathBuf> {
    let Some(project) = project else {
        return find_tsconfig(cwd).ok_or_else(|| anyhow!("Could not find a valid 'tsconfig.json'."));
    };

    let mut candidate = if project.is_absolute() {
        project.to_path_buf()
    } else {
        cwd.join(project)
    };

    if candidate.is_dir() {
        candidate = candidate.join(CONFIG_FILE_NAME);
    }

    if !candidate.exists() {
        bail!("tsconfig not found at {}", candidate.display());
    }

    if !candidate.is_file() {
        bail!("project path is not a file: {}", candidate.display());
    }

    Ok(canonicalize_or_owned(&candidate))
}

// =============================================================================
// Project
// =============================================================================

/// A loaded project: where its config lives and the source files it covers.
#[derive(Debug, Clone)]
pub struct Project {
    pub config_path: PathBuf,
    /// Directory containing the config; the checker runs from here.
    pub root_dir: PathBuf,
    /// Absolute paths of the files the checker is asked to check.
    pub file_names: Vec<PathBuf>,
}

impl Project {
    pub fn load(config_path: &Path) -> Result<Project> {
        let config_path = canonicalize_or_owned(config_path);
        let root_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("tsconfig has no parent directory"))?;

        let config = load_tsconfig(&config_path)?;
        let file_names = discover_files(&root_dir, &config)?;
        debug!(
            config = %config_path.display(),
            files = file_names.len(),
            "loaded project"
        );

        Ok(Project {
            config_path,
            root_dir,
            file_names,
        })
    }
}

fn option_flag(options: Option<&Map<String, Value>>, name: &str) -> bool {
    options
        .and_then(|options| options.get(name))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

// =============================================================================
// File discovery
// =============================================================================

fn discover_files(root_dir: &Path, config: &TsConfig) -> Result<Vec<PathBuf>> {
    let compiler_options = config.compiler_options.as_ref();
    let allow_js = option_flag(compiler_options, "allowJs");
    let is_source = |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                TS_EXTENSIONS.contains(&ext) || (allow_js && JS_EXTENSIONS.contains(&ext))
            })
    };

    let mut seen = FxHashSet::default();
    let mut file_names = Vec::new();

    for file in config.files.iter().flatten() {
        let path = PathBuf::from(file);
        if !path.is_file() {
            bail!("file '{}' listed in tsconfig 'files' not found", file);
        }
        if seen.insert(path.clone()) {
            file_names.push(path);
        }
    }

    let include = match (&config.include, &config.files) {
        (Some(include), _) => include.clone(),
        (None, Some(_)) => Vec::new(),
        (None, None) => vec![rebase_path(root_dir, "**/*")],
    };

    let mut exclude = match &config.exclude {
        Some(exclude) => exclude.clone(),
        None => COMMON_PACKAGE_FOLDERS
            .iter()
            .map(|folder| rebase_path(root_dir, folder))
            .collect(),
    };
    if let Some(out_dir) = compiler_options
        .and_then(|options| options.get("outDir"))
        .and_then(Value::as_str)
    {
        exclude.push(rebase_path(root_dir, out_dir));
    }
    let excluded = build_exclude_set(&exclude)?;

    for pattern in &include {
        let pattern = include_glob(pattern);
        let matcher = compile_glob(&pattern)?;
        let walk_root = literal_prefix(&pattern);
        trace!(pattern = %pattern, root = %walk_root.display(), "walking include pattern");

        let walker = WalkDir::new(&walk_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let is_package_folder = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| COMMON_PACKAGE_FOLDERS.contains(&name));
                !is_package_folder && !excluded.is_match(slash_path(entry.path()))
            });

        for entry in walker.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_source(path) {
                continue;
            }
            let normalized = slash_path(path);
            if !matcher.is_match(&normalized) || excluded.is_match(&normalized) {
                continue;
            }
            if seen.insert(path.to_path_buf()) {
                file_names.push(path.to_path_buf());
            }
        }
    }

    Ok(file_names)
}

/// An include entry whose last segment has neither a wildcard nor an
/// extension names a directory.
fn include_glob(pattern: &str) -> String {
    let trimmed = pattern.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if !has_wildcard(last) && Path::new(last).extension().is_none() {
        format!("{trimmed}/**/*")
    } else {
        trimmed.to_string()
    }
}

/// Each exclude entry matches itself and everything below it.
fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let trimmed = pattern.trim_end_matches('/');
        for candidate in [trimmed.to_string(), format!("{trimmed}/**")] {
            let glob = GlobBuilder::new(&candidate)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
            builder.add(glob);
        }
    }
    builder.build().context("failed to build exclude patterns")
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid include pattern '{pattern}'"))?;
    Ok(glob.compile_matcher())
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Directory portion of `pattern` before its first wildcard segment.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    if pattern.starts_with('/') {
        prefix.push("/");
    }
    for segment in pattern.split('/').filter(|segment| !segment.is_empty()) {
        if has_wildcard(segment) {
            break;
        }
        prefix.push(segment);
    }
    if Path::new(pattern) == prefix {
        // Literal file path: walk its directory.
        prefix.pop();
    }
    prefix
}

fn rebase_path(dir: &Path, path: &str) -> String {
    let path = Path::new(path);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    };
    slash_path(&normalize_path(&joined))
}

/// Lexically resolve `.` and `..` components.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn canonicalize_or_owned(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// =============================================================================
// JSONC
// =============================================================================

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let next = chars.clone().find(|next| !next.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn relative_names(project: &Project) -> Vec<String> {
        project
            .file_names
            .iter()
            .map(|path| slash_path(path.strip_prefix(&project.root_dir).unwrap()))
            .collect()
    }

    #[test]
    fn test_parse_tsconfig_accepts_comments_and_trailing_commas() {
        let source = r#"{
            // strictness
            "compilerOptions": { "strict": true, /* inline */ "outDir": "dist", },
            "include": ["src", "http://not-a-comment",],
        }"#;
        let config = parse_tsconfig(source).unwrap();
        let options = config.compiler_options.unwrap();
        assert_eq!(options.get("strict"), Some(&Value::Bool(true)));
        assert_eq!(
            config.include.unwrap(),
            vec!["src".to_string(), "http://not-a-comment".to_string()]
        );
    }

    #[test]
    fn test_parse_tsconfig_rejects_invalid_json() {
        let err = parse_tsconfig("{ \"include\": [ }").unwrap_err();
        assert!(err.to_string().contains("failed to parse tsconfig JSON"));
    }

    #[test]
    fn test_extends_merges_child_over_base() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("configs/base.json"),
            r#"{ "compilerOptions": { "strict": false, "allowJs": true, "outDir": "../build" }, "include": ["../lib"] }"#,
        );
        write(
            &dir.path().join("tsconfig.json"),
            r#"{ "extends": "./configs/base", "compilerOptions": { "strict": true } }"#,
        );

        let config = load_tsconfig(&dir.path().join("tsconfig.json")).unwrap();
        let options = config.compiler_options.unwrap();
        assert_eq!(options.get("strict"), Some(&Value::Bool(true)));
        assert_eq!(options.get("allowJs"), Some(&Value::Bool(true)));

        let out_dir = options.get("outDir").and_then(Value::as_str).unwrap();
        assert!(out_dir.ends_with("/build"), "{out_dir}");
        assert!(!out_dir.contains(".."), "{out_dir}");
        let include = config.include.unwrap();
        assert!(include[0].ends_with("/lib") && !include[0].contains("configs"));
    }

    #[test]
    fn test_extends_cycle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#);
        write(&dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#);

        let err = load_tsconfig(&dir.path().join("a.json")).unwrap_err();
        assert!(format!("{err:#}").contains("cycle"));
    }

    #[test]
    fn test_extends_package_from_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("node_modules/@tsconfig/strictest/tsconfig.json"),
            r#"{ "compilerOptions": { "strict": true } }"#,
        );
        write(
            &dir.path().join("tsconfig.json"),
            r#"{ "extends": "@tsconfig/strictest" }"#,
        );

        let config = load_tsconfig(&dir.path().join("tsconfig.json")).unwrap();
        assert_eq!(
            config.compiler_options.unwrap().get("strict"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_find_tsconfig_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("tsconfig.json"), "{}");
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();

        let found = find_tsconfig(&nested).unwrap();
        assert_eq!(found, canonicalize_or_owned(&dir.path().join("tsconfig.json")));
    }

    #[test]
    fn test_resolve_tsconfig_path_accepts_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("app/tsconfig.json"), "{}");

        let resolved = resolve_tsconfig_path(dir.path(), Some(Path::new("app"))).unwrap();
        assert!(resolved.ends_with("app/tsconfig.json"));

        let missing = resolve_tsconfig_path(dir.path(), Some(Path::new("nope")));
        assert!(missing.unwrap_err().to_string().contains("tsconfig not found"));
    }

    #[test]
    fn test_missing_tsconfig_reports_setup_failure() {
        let dir = tempfile::tempdir().unwrap();
        // tempdirs live outside any project, but guard against a stray config above
        if find_tsconfig(dir.path()).is_some() {
            return;
        }
        let err = resolve_tsconfig_path(dir.path(), None).unwrap_err();
        assert_eq!(err.to_string(), "Could not find a valid 'tsconfig.json'.");
    }

    #[test]
    fn test_project_discovers_default_include() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("tsconfig.json"), r#"{ "compilerOptions": { "outDir": "dist" } }"#);
        write(&dir.path().join("src/a.ts"), "");
        write(&dir.path().join("src/b.tsx"), "");
        write(&dir.path().join("src/c.js"), "");
        write(&dir.path().join("dist/a.d.ts"), "");
        write(&dir.path().join("node_modules/pkg/index.ts"), "");

        let project = Project::load(&dir.path().join("tsconfig.json")).unwrap();
        assert_eq!(relative_names(&project), vec!["src/a.ts", "src/b.tsx"]);
    }

    #[test]
    fn test_project_include_exclude_and_allow_js() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("tsconfig.json"),
            r#"{
                "compilerOptions": { "allowJs": true },
                "include": ["src"],
                "exclude": ["src/**/*.test.ts", "src/generated"]
            }"#,
        );
        write(&dir.path().join("src/a.ts"), "");
        write(&dir.path().join("src/a.test.ts"), "");
        write(&dir.path().join("src/b.mjs"), "");
        write(&dir.path().join("src/generated/types.ts"), "");
        write(&dir.path().join("scripts/tool.ts"), "");

        let project = Project::load(&dir.path().join("tsconfig.json")).unwrap();
        assert_eq!(relative_names(&project), vec!["src/a.ts", "src/b.mjs"]);
    }

    #[test]
    fn test_project_files_without_include() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("tsconfig.json"), r#"{ "files": ["./main.ts"] }"#);
        write(&dir.path().join("main.ts"), "");
        write(&dir.path().join("other.ts"), "");

        let project = Project::load(&dir.path().join("tsconfig.json")).unwrap();
        assert_eq!(relative_names(&project), vec!["main.ts"]);
    }

    #[test]
    fn test_literal_prefix_stops_at_wildcard() {
        assert_eq!(literal_prefix("/repo/src/**/*.ts"), PathBuf::from("/repo/src"));
        assert_eq!(literal_prefix("/repo/main.ts"), PathBuf::from("/repo"));
    }
}
