//! Structural Insertion Engine.
//!
//! Each issue is matched against the parsed tree: the outermost node whose
//! 1-indexed range equals the issue range exactly receives one annotation.
//! Where the annotation goes follows a small decision table:
//!
//! 1. a tag name, attribute or spread inside a tag climbs to the enclosing
//!    tag or attribute;
//! 2. a markup child (element, fragment, `{}` container, text) of an element
//!    gets a `{/* ... */}` sibling immediately before it;
//! 3. a tag whose element is itself a child of another element gets the
//!    sibling before that element;
//! 4. anything else gets a leading `//` line comment, hoisted to the
//!    enclosing construct when the node follows a keyword that must share
//!    its line (`return`, `private`, `async`, `type`, ...).
//!
//! Edits are text insertions at node starts, so every original byte is kept.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use ratchet_common::annotation::{line_comment, markup_comment};
use ratchet_common::{AnnotationSource, Insertion, Issue, IssuesPerFile, LineMap, SourceRange, apply_insertions};
use ratchet_parser::{NodeArena, NodeIndex, ParsedSourceFile, syntax_kind_ext};
use ratchet_scanner::SyntaxKind;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info_span, trace, warn};

use crate::worker::WORKER_STACK_SIZE;

/// Extensions the structural pass rewrites.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mjs", "cjs", "js", "ts", "jsx", "tsx", "mts", "cts"];

/// Per-file outcome counts, in the shape of a codemod runner report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructuralSummary {
    /// Files rewritten.
    pub ok: usize,
    /// Files whose output equals their input.
    pub nochange: usize,
    /// Paths without issues or with an unsupported extension.
    pub skip: usize,
    /// Files that could not be read, parsed or written.
    pub error: usize,
}

impl StructuralSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Ok => self.ok += 1,
            FileOutcome::NoChange => self.nochange += 1,
            FileOutcome::Skip => self.skip += 1,
            FileOutcome::Error => self.error += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileOutcome {
    Ok,
    NoChange,
    Skip,
    Error,
}

// =============================================================================
// Pass
// =============================================================================

/// Rewrite every file in `paths` that has issues. Files are independent and
/// processed in parallel; a failing file only bumps the `error` count.
pub fn run_structural_pass(paths: &[String], issues: &IssuesPerFile) -> Result<StructuralSummary> {
    let _span = info_span!("structural_pass", files = paths.len()).entered();

    let pool = rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|index| format!("ratchet-structural-{index}"))
        .build()
        .context("failed to start structural pass thread pool")?;

    let outcomes: Vec<FileOutcome> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| transform_file(path, issues))
            .collect()
    });

    let mut summary = StructuralSummary::default();
    for outcome in outcomes {
        summary.record(outcome);
    }
    debug!(?summary, "structural pass finished");
    Ok(summary)
}

fn transform_file(path: &str, issues: &IssuesPerFile) -> FileOutcome {
    if !has_supported_extension(path) {
        trace!(path, "unsupported extension");
        return FileOutcome::Skip;
    }
    let Some(file_issues) = issues.get(path) else {
        trace!(path, "no issues for file");
        return FileOutcome::Skip;
    };

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            warn!(path, %err, "cannot read file");
            return FileOutcome::Error;
        }
    };

    let output = match transform_source(path, &source, file_issues) {
        Ok(output) => output,
        Err(err) => {
            warn!(path, error = %format!("{err:#}"), "structural transform failed");
            return FileOutcome::Error;
        }
    };

    if output == source {
        return FileOutcome::NoChange;
    }
    if let Err(err) = std::fs::write(path, output) {
        warn!(path, %err, "cannot write file");
        return FileOutcome::Error;
    }
    debug!(path, "annotated");
    FileOutcome::Ok
}

pub fn has_supported_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

// =============================================================================
// Transform
// =============================================================================

/// Annotate `source` for `issues`. Sources with syntax errors are rejected;
/// issues without an exact node match are left for the offset pass.
pub fn transform_source(file_name: &str, source: &str, issues: &[Issue]) -> Result<String> {
    let parsed = ParsedSourceFile::parse(file_name, source);
    if let Some(first) = parsed.diagnostics.first() {
        bail!(
            "{} syntax error(s), first at offset {}: {}",
            parsed.diagnostics.len(),
            first.start,
            first.message
        );
    }

    let line_map = LineMap::build(source);
    let by_range = index_by_range(&parsed, &line_map);

    // Texts attached at one position keep their attachment order
    let mut attached: BTreeMap<u32, String> = BTreeMap::new();
    for issue in issues {
        let Some(&node) = by_range.get(&issue.range()) else {
            trace!(code = issue.code, range = ?issue.range(), "no node with this exact range");
            continue;
        };
        let Some(placement) = place_annotation(&parsed, node) else {
            trace!(code = issue.code, "no insertion slot");
            continue;
        };
        let (anchor, comment) = match placement {
            Placement::LeadingComment(anchor) => {
                (anchor, line_comment(issue.code, AnnotationSource::Structural))
            }
            Placement::MarkupSiblingBefore(anchor) => (anchor, markup_comment(issue.code)),
        };
        let Some(pos) = parsed.node(anchor).map(|node| node.pos) else {
            continue;
        };
        let indentation = line_map.indentation_of(pos, source);
        let text = attached.entry(pos).or_default();
        text.push_str(&comment);
        text.push('\n');
        text.push_str(indentation);
    }

    let insertions = attached
        .into_iter()
        .map(|(pos, text)| Insertion::new(pos, text))
        .collect();
    Ok(apply_insertions(source, insertions))
}

/// First node in pre-order (the outermost) for every distinct range.
fn index_by_range(parsed: &ParsedSourceFile, line_map: &LineMap) -> FxHashMap<SourceRange, NodeIndex> {
    let mut by_range = FxHashMap::default();
    for index in parsed.arena.preorder(parsed.root) {
        let Some(node) = parsed.node(index) else {
            continue;
        };
        let range = SourceRange::from_offsets(line_map, &parsed.text, node.pos, node.end);
        by_range.entry(range).or_insert(index);
    }
    by_range
}

// =============================================================================
// Placement
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// `// text` on its own line before the node.
    LeadingComment(NodeIndex),
    /// `{/* text */}` as a markup sibling before the node.
    MarkupSiblingBefore(NodeIndex),
}

fn is_element(kind: Option<u16>) -> bool {
    matches!(
        kind,
        Some(syntax_kind_ext::JSX_ELEMENT | syntax_kind_ext::JSX_FRAGMENT)
    )
}

fn is_markup_child(kind: Option<u16>) -> bool {
    is_element(kind)
        || kind == Some(syntax_kind_ext::JSX_EXPRESSION)
        || kind == Some(SyntaxKind::JsxText as u16)
}

fn place_annotation(parsed: &ParsedSourceFile, node: NodeIndex) -> Option<Placement> {
    let arena = &parsed.arena;
    let mut current = climb_out_of_jsx_name(arena, node);
    let mut parent = arena.parent(current);

    // A comment cannot sit between `<` and the tag name, nor between an
    // attribute name and its `=`
    if matches!(
        parent.and_then(|p| arena.kind(p)),
        Some(syntax_kind_ext::JSX_OPENING_ELEMENT | syntax_kind_ext::JSX_ATTRIBUTE)
    ) {
        current = parent?;
        parent = arena.parent(current);
    }

    // Closing tags are annotated through their element
    if matches!(
        arena.kind(current),
        Some(
            syntax_kind_ext::JSX_CLOSING_ELEMENT
                | syntax_kind_ext::JSX_OPENING_FRAGMENT
                | syntax_kind_ext::JSX_CLOSING_FRAGMENT
        )
    ) || parent.and_then(|p| arena.kind(p)) == Some(syntax_kind_ext::JSX_CLOSING_ELEMENT)
    {
        while !is_element(arena.kind(current)) {
            current = arena.parent(current)?;
        }
        parent = arena.parent(current);
    }

    let parent_kind = parent.and_then(|p| arena.kind(p));
    if is_element(parent_kind) && is_markup_child(arena.kind(current)) {
        return Some(Placement::MarkupSiblingBefore(current));
    }

    let grandparent_kind = parent.and_then(|p| arena.parent(p)).and_then(|g| arena.kind(g));
    if is_element(parent_kind) && is_element(grandparent_kind) {
        return Some(Placement::MarkupSiblingBefore(parent?));
    }

    Some(Placement::LeadingComment(hoist_past_line_sensitive_keyword(parsed, current)))
}

/// From part of a dotted or namespaced tag/attribute name to the whole name.
fn climb_out_of_jsx_name(arena: &NodeArena, node: NodeIndex) -> NodeIndex {
    let mut name = node;
    while let Some(parent) = arena.parent(name) {
        if !matches!(
            arena.kind(parent),
            Some(syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION | syntax_kind_ext::JSX_NAMESPACED_NAME)
        ) {
            break;
        }
        name = parent;
    }
    let in_tag = arena.parent(name).and_then(|p| arena.kind(p)).is_some_and(|kind| {
        matches!(
            kind,
            syntax_kind_ext::JSX_OPENING_ELEMENT
                | syntax_kind_ext::JSX_CLOSING_ELEMENT
                | syntax_kind_ext::JSX_ATTRIBUTE
        )
    });
    if in_tag { name } else { node }
}

/// Keywords whose construct changes meaning when the next token is on
/// another line.
fn is_line_sensitive(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ReturnKeyword
            | SyntaxKind::ThrowKeyword
            | SyntaxKind::YieldKeyword
            | SyntaxKind::BreakKeyword
            | SyntaxKind::ContinueKeyword
            | SyntaxKind::PrivateKeyword
            | SyntaxKind::PublicKeyword
            | SyntaxKind::ProtectedKeyword
            | SyntaxKind::ReadonlyKeyword
            | SyntaxKind::OverrideKeyword
            | SyntaxKind::DeclareKeyword
            | SyntaxKind::AbstractKeyword
            | SyntaxKind::AccessorKeyword
            | SyntaxKind::AsyncKeyword
            | SyntaxKind::TypeKeyword
            | SyntaxKind::InterfaceKeyword
            | SyntaxKind::NamespaceKeyword
            | SyntaxKind::ModuleKeyword
            | SyntaxKind::AssertsKeyword
    )
}

/// A line comment ends with a line break, so it cannot go between a
/// line-sensitive keyword and the node after it. The anchor moves to the
/// nearest ancestor that starts at or before the keyword, and again if that
/// ancestor follows another such keyword. The source file itself is never an
/// anchor.
fn hoist_past_line_sensitive_keyword(parsed: &ParsedSourceFile, node: NodeIndex) -> NodeIndex {
    let mut anchor = node;
    loop {
        let Some(pos) = parsed.node(anchor).map(|n| n.pos) else {
            return anchor;
        };
        let Some(keyword) = parsed.token_before(pos).filter(|token| is_line_sensitive(token.kind)) else {
            return anchor;
        };

        let mut ancestor = anchor;
        anchor = loop {
            let Some(parent) = parsed.arena.parent(ancestor) else {
                return anchor;
            };
            let Some(parent_node) = parsed.node(parent) else {
                return anchor;
            };
            if parent_node.is(syntax_kind_ext::SOURCE_FILE) {
                trace!(keyword = ?keyword.kind, "no construct encloses the keyword");
                return anchor;
            }
            if parent_node.pos <= keyword.pos {
                break parent;
            }
            ancestor = parent;
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(range: SourceRange, code: u32) -> Issue {
        Issue::new(range, code, "message")
    }

    /// Range of the first occurrence of `needle` in `source`.
    fn range_of(source: &str, needle: &str) -> SourceRange {
        let start = source.find(needle).unwrap() as u32;
        let line_map = LineMap::build(source);
        SourceRange::from_offsets(&line_map, source, start, start + needle.len() as u32)
    }

    #[test]
    fn test_leading_comment_on_statement() {
        let source = "const x: number = \"a\";\n";
        let issues = [issue(SourceRange::new(1, 1, 1, 23), 2322)];
        let output = transform_source("a.ts", source, &issues).unwrap();
        assert_eq!(
            output,
            "// @ts-expect-error ratchet TS2322 (jscodeshift)\nconst x: number = \"a\";\n"
        );
    }

    #[test]
    fn test_no_matching_issue_leaves_text_unchanged() {
        let source = "function f() {\n  return 1;\n}\n";
        let issues = [issue(SourceRange::new(2, 3, 2, 6), 2322)];
        assert_eq!(transform_source("a.ts", source, &issues).unwrap(), source);
    }

    #[test]
    fn test_partial_overlap_is_not_a_match() {
        let source = "let value = compute(1);\n";
        let issues = [issue(range_of(source, "compute(1"), 2345)];
        assert_eq!(transform_source("a.ts", source, &issues).unwrap(), source);
    }

    #[test]
    fn test_indentation_follows_node_line() {
        let source = "function f() {\n    const x: string = 1;\n}\n";
        let issues = [issue(range_of(source, "x"), 2322)];
        let output = transform_source("a.ts", source, &issues).unwrap();
        assert_eq!(
            output,
            "function f() {\n    const // @ts-expect-error ratchet TS2322 (jscodeshift)\n    x: string = 1;\n}\n"
        );
    }

    #[test]
    fn test_same_range_issues_each_annotate() {
        let source = "  foo(bar);\n";
        let range = range_of(source, "foo(bar)");
        let issues = [issue(range, 2345), issue(range, 2554)];
        let output = transform_source("a.ts", source, &issues).unwrap();
        assert_eq!(
            output,
            "  // @ts-expect-error ratchet TS2345 (jscodeshift)\n  // @ts-expect-error ratchet TS2554 (jscodeshift)\n  foo(bar);\n"
        );
    }

    #[test]
    fn test_nested_element_gets_markup_sibling() {
        let source = "const el = <Parent><Child prop=\"a\" /></Parent>;\n";
        let issues = [issue(range_of(source, "<Child prop=\"a\" />"), 2741)];
        let output = transform_source("view.tsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "const el = <Parent>{/* @ts-expect-error ratchet TS2741 (jscodeshift) */}\n<Child prop=\"a\" /></Parent>;\n"
        );
    }

    #[test]
    fn test_attribute_value_climbs_to_attribute() {
        let source = "const el = (\n  <div>\n    <Child prop=\"a\" />\n  </div>\n);\n";
        let issues = [issue(range_of(source, "\"a\""), 2322)];
        let output = transform_source("view.tsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "const el = (\n  <div>\n    <Child // @ts-expect-error ratchet TS2322 (jscodeshift)\n    prop=\"a\" />\n  </div>\n);\n"
        );
    }

    #[test]
    fn test_tag_name_in_nested_element_inserts_before_element() {
        let source = "const el = (\n  <div>\n    <Child prop=\"a\">\n      text\n    </Child>\n  </div>\n);\n";
        let issues = [issue(range_of(source, "Child"), 2786)];
        let output = transform_source("view.tsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "const el = (\n  <div>\n    {/* @ts-expect-error ratchet TS2786 (jscodeshift) */}\n    <Child prop=\"a\">\n      text\n    </Child>\n  </div>\n);\n"
        );
    }

    #[test]
    fn test_top_level_tag_name_gets_line_comment() {
        let source = "const el = <Missing />;\n";
        let issues = [issue(range_of(source, "Missing"), 2304)];
        let output = transform_source("view.tsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "const el = // @ts-expect-error ratchet TS2304 (jscodeshift)\n<Missing />;\n"
        );
    }

    #[test]
    fn test_expression_child_in_fragment_gets_markup_sibling() {
        let source = "const el = (\n  <>\n    {value}\n  </>\n);\n";
        let issues = [issue(range_of(source, "{value}"), 2322)];
        let output = transform_source("view.jsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "const el = (\n  <>\n    {/* @ts-expect-error ratchet TS2322 (jscodeshift) */}\n    {value}\n  </>\n);\n"
        );
    }

    #[test]
    fn test_return_operand_annotates_statement() {
        let source = "function f() {\n  return <Missing />;\n}\n";
        let issues = [issue(range_of(source, "Missing"), 2304)];
        let output = transform_source("view.tsx", source, &issues).unwrap();
        assert_eq!(
            output,
            "function f() {\n  // @ts-expect-error ratchet TS2304 (jscodeshift)\n  return <Missing />;\n}\n"
        );
    }

    /// Annotate the last occurrence of `needle` and compare the output.
    fn assert_annotates_last(file_name: &str, source: &str, needle: &str, code: u32, expected: &str) {
        let start = source.rfind(needle).unwrap() as u32;
        let line_map = LineMap::build(source);
        let range = SourceRange::from_offsets(&line_map, source, start, start + needle.len() as u32);
        let output = transform_source(file_name, source, &[issue(range, code)]).unwrap();
        assert_eq!(output, expected, "annotating {needle:?} in {source:?}");
    }

    #[test]
    fn test_class_member_modifiers_annotate_member() {
        for modifier in ["private", "public", "protected", "readonly", "declare", "accessor"] {
            let source = format!("class A {{\n  {modifier} foo: string;\n}}\n");
            let expected = format!(
                "class A {{\n  // @ts-expect-error ratchet TS2564 (jscodeshift)\n  {modifier} foo: string;\n}}\n"
            );
            assert_annotates_last("a.ts", &source, "foo", 2564, &expected);
        }
    }

    #[test]
    fn test_stacked_modifiers_annotate_member() {
        assert_annotates_last(
            "a.ts",
            "class B extends A {\n  protected override readonly foo = 1;\n}\n",
            "foo",
            4113,
            "class B extends A {\n  // @ts-expect-error ratchet TS4113 (jscodeshift)\n  protected override readonly foo = 1;\n}\n",
        );
    }

    #[test]
    fn test_override_and_abstract_methods_annotate_member() {
        assert_annotates_last(
            "a.ts",
            "class B extends A {\n  override run(): void {}\n}\n",
            "run",
            4113,
            "class B extends A {\n  // @ts-expect-error ratchet TS4113 (jscodeshift)\n  override run(): void {}\n}\n",
        );
        assert_annotates_last(
            "a.ts",
            "abstract class A {\n  abstract run(): void;\n}\n",
            "run",
            2391,
            "abstract class A {\n  // @ts-expect-error ratchet TS2391 (jscodeshift)\n  abstract run(): void;\n}\n",
        );
    }

    #[test]
    fn test_parameter_property_annotates_parameter() {
        assert_annotates_last(
            "a.ts",
            "class A {\n  constructor(private name) {}\n}\n",
            "name",
            7006,
            "class A {\n  constructor(// @ts-expect-error ratchet TS7006 (jscodeshift)\n  private name) {}\n}\n",
        );
    }

    #[test]
    fn test_declaration_keywords_annotate_declaration() {
        for (keyword, rest) in [
            ("type", " = string;"),
            ("interface", " {}"),
            ("namespace", " {}"),
            ("module", " {}"),
        ] {
            let source = format!("{keyword} Foo{rest}\n");
            let expected = format!("// @ts-expect-error ratchet TS2300 (jscodeshift)\n{keyword} Foo{rest}\n");
            assert_annotates_last("a.ts", &source, "Foo", 2300, &expected);
        }
    }

    #[test]
    fn test_async_arrow_parameter_annotates_arrow() {
        assert_annotates_last(
            "a.ts",
            "const f = async value => 1;\n",
            "value",
            7006,
            "const f = // @ts-expect-error ratchet TS7006 (jscodeshift)\nasync value => 1;\n",
        );
    }

    #[test]
    fn test_async_method_annotates_method() {
        assert_annotates_last(
            "a.ts",
            "class A {\n  async load() {}\n}\n",
            "load",
            7010,
            "class A {\n  // @ts-expect-error ratchet TS7010 (jscodeshift)\n  async load() {}\n}\n",
        );
    }

    #[test]
    fn test_labelled_jumps_annotate_statement() {
        for jump in ["break", "continue"] {
            let source = format!("outer: for (;;) {{\n  {jump} outer;\n}}\n");
            let expected = format!(
                "outer: for (;;) {{\n  // @ts-expect-error ratchet TS1107 (jscodeshift)\n  {jump} outer;\n}}\n"
            );
            assert_annotates_last("a.ts", &source, "outer", 1107, &expected);
        }
    }

    #[test]
    fn test_throw_and_yield_operands_annotate_keyword() {
        assert_annotates_last(
            "a.ts",
            "function f() {\n  throw new Missing();\n}\n",
            "new Missing()",
            2304,
            "function f() {\n  // @ts-expect-error ratchet TS2304 (jscodeshift)\n  throw new Missing();\n}\n",
        );
        assert_annotates_last(
            "a.ts",
            "function* g() {\n  yield value;\n}\n",
            "value",
            2304,
            "function* g() {\n  // @ts-expect-error ratchet TS2304 (jscodeshift)\n  yield value;\n}\n",
        );
    }

    #[test]
    fn test_ts_file_parses_type_assertions() {
        let source = "const n = <number>value;\n";
        let issues = [issue(range_of(source, "<number>value"), 2352)];
        let output = transform_source("cast.ts", source, &issues).unwrap();
        assert_eq!(
            output,
            "const n = // @ts-expect-error ratchet TS2352 (jscodeshift)\n<number>value;\n"
        );
    }

    #[test]
    fn test_syntax_errors_fail_the_file() {
        let source = "const = ;\n";
        let issues = [issue(SourceRange::new(1, 1, 1, 6), 1005)];
        assert!(transform_source("bad.ts", source, &issues).is_err());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(has_supported_extension("src/a.tsx"));
        assert!(has_supported_extension("lib/b.cjs"));
        assert!(!has_supported_extension("tsconfig.json"));
        assert!(!has_supported_extension("README"));
    }
}
