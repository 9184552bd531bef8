//! TypeScript and TSX parsing for ts-ratchet.
//!
//! `ParsedSourceFile::parse` is the entry point used by the annotation
//! engine; the lower-level `ParserState` is exposed for tests and tooling.

pub mod parser;

pub use parser::{
    LanguageVariant, Node, NodeArena, NodeIndex, ParseDiagnostic, ParsedSourceFile, ParserState,
    TokenSpan, parse_source_file, syntax_kind_ext,
};
