//! Recursive-descent TypeScript/TSX parser producing an arena syntax tree.
//!
//! Only what the annotation passes need is modeled: node kinds, trivia-free
//! ranges, parent links and the ordered list of consumed tokens. Identifiers,
//! literals, keywords and JSX text become leaf nodes; punctuation does not,
//! apart from the generator `*`.

pub mod base;
pub mod node;
pub mod state;
mod state_expressions;
mod state_jsx;
mod state_statements;
mod state_types;
pub mod syntax_kind_ext;

pub use base::{NodeIndex, TokenSpan};
pub use node::{Node, NodeArena};
pub use state::{LanguageVariant, ParseDiagnostic, ParserState};

/// A parsed file: text, tree, consumed tokens and syntax errors.
#[derive(Clone, Debug)]
pub struct ParsedSourceFile {
    pub file_name: String,
    pub text: String,
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub tokens: Vec<TokenSpan>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedSourceFile {
    /// Parse `text`, choosing JSX support from the file extension.
    pub fn parse(file_name: impl Into<String>, text: impl Into<String>) -> ParsedSourceFile {
        let file_name = file_name.into();
        let variant = LanguageVariant::from_file_name(&file_name);
        parse_source_file(file_name, text.into(), variant)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// First consumed token whose end lies strictly after `offset`.
    pub fn token_at(&self, offset: u32) -> Option<TokenSpan> {
        let index = self.tokens.partition_point(|token| token.end <= offset);
        self.tokens.get(index).copied()
    }

    /// Last consumed token that ends at or before `offset`.
    pub fn token_before(&self, offset: u32) -> Option<TokenSpan> {
        let index = self.tokens.partition_point(|token| token.end <= offset);
        index.checked_sub(1).and_then(|index| self.tokens.get(index)).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.arena.get(index)
    }

    /// Source text covered by `index`.
    pub fn node_text(&self, index: NodeIndex) -> &str {
        self.arena
            .get(index)
            .and_then(|node| self.text.get(node.pos as usize..node.end as usize))
            .unwrap_or("")
    }
}

pub fn parse_source_file(file_name: String, text: String, variant: LanguageVariant) -> ParsedSourceFile {
    let mut state = ParserState::new(file_name.clone(), text.clone(), variant);
    let root = state.parse_source_file();
    let (arena, tokens, diagnostics) = state.into_parts();
    ParsedSourceFile {
        file_name,
        text,
        arena,
        root,
        tokens,
        diagnostics,
    }
}
