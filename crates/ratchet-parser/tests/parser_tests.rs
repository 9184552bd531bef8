//! Tests for statement, type and JSX parsing.

use ratchet_parser::{NodeIndex, ParsedSourceFile, syntax_kind_ext};
use ratchet_scanner::SyntaxKind;

fn parse(file_name: &str, source: &str) -> ParsedSourceFile {
    ParsedSourceFile::parse(file_name, source)
}

fn assert_clean(file_name: &str, source: &str) -> ParsedSourceFile {
    let parsed = parse(file_name, source);
    assert!(
        parsed.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}: {:?}\n{}",
        parsed.diagnostics,
        parsed.arena.dump(parsed.root)
    );
    parsed
}

/// First node of `kind` in pre-order.
fn find_kind(parsed: &ParsedSourceFile, kind: u16) -> Option<NodeIndex> {
    parsed
        .arena
        .preorder(parsed.root)
        .into_iter()
        .find(|&idx| parsed.arena.kind(idx) == Some(kind))
}

fn statements(parsed: &ParsedSourceFile) -> Vec<NodeIndex> {
    parsed.arena.children(parsed.root).to_vec()
}

#[test]
fn parse_variable_statement_ranges_exclude_trivia() {
    let parsed = assert_clean("a.ts", "  // lead\n  const x: number = \"a\";\n");
    let stmts = statements(&parsed);
    assert_eq!(stmts.len(), 1);
    assert_eq!(parsed.node_text(stmts[0]), "const x: number = \"a\";");

    let declaration = find_kind(&parsed, syntax_kind_ext::VARIABLE_DECLARATION).unwrap();
    assert_eq!(parsed.node_text(declaration), "x: number = \"a\"");
}

#[test]
fn parse_common_statements_without_errors() {
    let source = r#"
import fs, { readFile as rf, type Stats } from "fs";
import * as path from "path";
import json from "./data.json" with { type: "json" };
import legacy = require("legacy");
export { a as b } from "./other";
export * as ns from "./ns";
export type { T } from "./types";
export default function main(argv: string[]): number {
    label: for (let i = 0, j = 10; i < j; i++) {
        if (i % 2) continue label; else break;
    }
    for (const key in obj) {}
    for await (const item of stream) {}
    do { x--; } while (x > 0)
    while (true) { throw new Error(`bad ${x}`); }
    switch (x) {
        case 1:
        case 2: return 1;
        default: break;
    }
    try { risky(); } catch ({ message }) { log(message); } finally { done(); }
    return argv.length;
}
"#;
    let parsed = assert_clean("main.ts", source);
    assert!(find_kind(&parsed, syntax_kind_ext::FOR_OF_STATEMENT).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::FOR_IN_STATEMENT).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::CASE_BLOCK).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::IMPORT_EQUALS_DECLARATION).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::NAMESPACE_EXPORT).is_some());
}

#[test]
fn parse_declarations_without_errors() {
    let source = r#"
@sealed
export abstract class Repo<T extends { id: string } = Entity> extends Base<T> implements Store, Disposable {
    static readonly instances = new Map<string, Repo<any>>();
    private items: T[] = [];
    declare readonly kind?: "repo";
    #secret!: number;
    [key: string]: unknown;
    static { Repo.instances.clear(); }
    constructor(private readonly db: Db, public name = "default") { super(); }
    get size(): number { return this.items.length; }
    set size(value) {}
    async *entries(): AsyncGenerator<T> { yield* this.items; }
    abstract find(id: string): T | undefined;
    @log() save<K extends keyof T>(key: K, value: T[K]): asserts value is NonNullable<T[K]> {}
}
interface Store extends Disposable {
    readonly name: string;
    get(id: string): Entity;
    (call: number): void;
    new (x: number): Store;
    [index: number]: string;
    optional?: boolean;
}
type Mapped<T> = { readonly [K in keyof T as `get${Capitalize<K & string>}`]-?: () => T[K] };
type Cond<T> = T extends (infer U extends string)[] ? U : T extends Promise<infer V> ? V : never;
type Fn = new (...args: any[]) => object;
type Tuple = [name: string, age?: number, ...rest: boolean[]];
type Q = typeof import("./mod").value;
const enum Color { Red = 1, Green = Red << 1, "Blue" }
declare module "ambient" {
    export function helper(): void;
}
namespace Outer.Inner { export const x = 1; }
declare global { interface Window { app: unknown } }
export = Repo;
"#;
    let parsed = assert_clean("decl.ts", source);
    assert!(find_kind(&parsed, syntax_kind_ext::CLASS_STATIC_BLOCK_DECLARATION).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::MAPPED_TYPE).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::CONDITIONAL_TYPE).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::INFER_TYPE).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::NAMED_TUPLE_MEMBER).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::TYPE_PREDICATE).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::EXPORT_ASSIGNMENT).is_some());
}

#[test]
fn parse_expressions_without_errors() {
    let source = r#"
const a = b ?? c?.d?.[e]?.(f) ?? g!;
const h = async (x: number, { y }: Opts = {}) => await x * 2;
const i = <T,>(v: T): T => v;
const j = x as const satisfies readonly number[];
const k = tag`one${two}three`;
const l = /ab+c/gi.test(s) ? [1, , ...rest] : { m, n: 1, [o]: 2, p() {}, get q() { return 1; }, ...r };
const s = function* gen() { const t = yield; };
const u = new.target ?? new Foo<Bar>(1)(2);
const v = class extends W {};
x += y >>>= z;
obj.method<string>(arg);
"#;
    assert_clean("expr.ts", source);
}

#[test]
fn parse_type_assertion_only_outside_jsx() {
    let parsed = assert_clean("cast.ts", "const x = <number>y;");
    assert!(find_kind(&parsed, syntax_kind_ext::TYPE_ASSERTION).is_some());
}

#[test]
fn parse_binary_expression_children_exclude_operator() {
    let parsed = assert_clean("bin.ts", "a + b * c;");
    let binary = find_kind(&parsed, syntax_kind_ext::BINARY_EXPRESSION).unwrap();
    let children = parsed.arena.children(binary);
    assert_eq!(children.len(), 2);
    assert_eq!(parsed.node_text(children[0]), "a");
    assert_eq!(parsed.node_text(children[1]), "b * c");
}

#[test]
fn parse_jsx_element_shape() {
    let source = "const el = <Parent><Child prop=\"a\" /></Parent>;";
    let parsed = assert_clean("view.tsx", source);

    let outer = find_kind(&parsed, syntax_kind_ext::JSX_ELEMENT).unwrap();
    assert_eq!(parsed.node_text(outer), "<Parent><Child prop=\"a\" /></Parent>");
    let outer_children = parsed.arena.children(outer);
    assert_eq!(outer_children.len(), 3);
    assert_eq!(
        parsed.arena.kind(outer_children[0]),
        Some(syntax_kind_ext::JSX_OPENING_ELEMENT)
    );
    assert_eq!(parsed.arena.kind(outer_children[1]), Some(syntax_kind_ext::JSX_ELEMENT));
    assert_eq!(
        parsed.arena.kind(outer_children[2]),
        Some(syntax_kind_ext::JSX_CLOSING_ELEMENT)
    );

    let child = outer_children[1];
    assert_eq!(parsed.node_text(child), "<Child prop=\"a\" />");
    let opening = parsed.arena.children(child)[0];
    assert_eq!(parsed.node_text(opening), "<Child prop=\"a\" />");
    let attribute = parsed.arena.children(opening)[1];
    assert_eq!(parsed.arena.kind(attribute), Some(syntax_kind_ext::JSX_ATTRIBUTE));
    assert_eq!(parsed.node_text(attribute), "prop=\"a\"");
    assert_eq!(parsed.arena.parent(attribute), Some(opening));
}

#[test]
fn parse_jsx_children_keep_text_and_expressions() {
    let source = "const el = (\n  <>\n    <span data-id={id} {...rest}>hi {name}</span>\n    {/* note */}\n  </>\n);\n";
    let parsed = assert_clean("frag.jsx", source);

    let fragment = find_kind(&parsed, syntax_kind_ext::JSX_FRAGMENT).unwrap();
    let kinds: Vec<u16> = parsed
        .arena
        .children(fragment)
        .iter()
        .filter_map(|&c| parsed.arena.kind(c))
        .collect();
    assert_eq!(
        kinds,
        vec![
            syntax_kind_ext::JSX_OPENING_FRAGMENT,
            SyntaxKind::JsxText as u16,
            syntax_kind_ext::JSX_ELEMENT,
            SyntaxKind::JsxText as u16,
            syntax_kind_ext::JSX_EXPRESSION,
            SyntaxKind::JsxText as u16,
            syntax_kind_ext::JSX_CLOSING_FRAGMENT,
        ]
    );

    let spread = find_kind(&parsed, syntax_kind_ext::JSX_SPREAD_ATTRIBUTE).unwrap();
    assert_eq!(parsed.node_text(spread), "{...rest}");
    let attribute = find_kind(&parsed, syntax_kind_ext::JSX_ATTRIBUTE).unwrap();
    assert_eq!(parsed.node_text(attribute), "data-id={id}");
}

#[test]
fn parse_generic_arrow_in_tsx_is_not_markup() {
    let parsed = assert_clean("gen.tsx", "const id = <T,>(x: T) => x;");
    assert!(find_kind(&parsed, syntax_kind_ext::ARROW_FUNCTION).is_some());
    assert!(find_kind(&parsed, syntax_kind_ext::JSX_ELEMENT).is_none());
}

#[test]
fn parse_recovers_from_malformed_statements() {
    let parsed = parse("bad.ts", "const x = 1\nconst y = ;\n) const z = 3;");
    assert!(parsed.has_errors());
    let last = *statements(&parsed).last().unwrap();
    assert_eq!(parsed.node_text(last), "const z = 3;");
}

#[test]
fn parse_unclosed_jsx_reports_error() {
    let parsed = parse("open.tsx", "const el = <div><span></div>;");
    assert!(parsed.has_errors());
}

#[test]
fn token_at_returns_first_token_ending_after_offset() {
    let parsed = assert_clean("tok.ts", "let a = 1;\n  foo(a);\n");
    let token = parsed.token_at(0).unwrap();
    assert_eq!((token.pos, token.end), (0, 3));

    // Inside leading whitespace of line 2: the next token is `foo`
    let token = parsed.token_at(11).unwrap();
    assert_eq!(&parsed.text[token.pos as usize..token.end as usize], "foo");

    assert!(parsed.token_at(parsed.text.len() as u32).is_none());
}

#[test]
fn token_before_returns_last_token_ending_at_offset() {
    let parsed = assert_clean("tok.ts", "class A {\n  private foo: string;\n}\n");
    let foo = parsed.text.find("foo").unwrap() as u32;
    let token = parsed.token_before(foo).unwrap();
    assert_eq!(token.kind, SyntaxKind::PrivateKeyword);

    assert!(parsed.token_before(0).is_none());
}

#[test]
fn parse_deep_nesting_is_bounded() {
    let source = format!("const x = {}1{};", "(".repeat(2000), ")".repeat(2000));
    // Debug builds need more than the default test-thread stack at the limit
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse("deep.ts", &source).has_errors())
        .unwrap();
    assert!(handle.join().unwrap());
}
