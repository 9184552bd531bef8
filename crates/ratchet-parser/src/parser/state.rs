//! Parser state and token-level helpers.
//!
//! The grammar itself is split across `state_statements`, `state_expressions`,
//! `state_types` and `state_jsx`; this module owns the scanner, the arena,
//! the consumed-token record and speculative-parse snapshots.

use ratchet_scanner::{ScannerSnapshot, ScannerState, SyntaxKind};

use super::base::{NodeIndex, TokenSpan};
use super::node::NodeArena;

/// Nesting limit for recursive productions.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 256;

pub(crate) const CONTEXT_FLAG_JSX: u32 = 1 << 0;
pub(crate) const CONTEXT_FLAG_DISALLOW_IN: u32 = 1 << 1;
pub(crate) const CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES: u32 = 1 << 2;

/// A syntax error reported while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub start: u32,
    pub length: u32,
    pub message: String,
}

/// Whether `<` in expression position starts markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanguageVariant {
    Standard,
    Jsx,
}

impl LanguageVariant {
    /// `.ts`, `.mts`, `.cts` (and declaration files) parse without JSX.
    pub fn from_file_name(file_name: &str) -> LanguageVariant {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".ts") || lower.ends_with(".mts") || lower.ends_with(".cts") {
            LanguageVariant::Standard
        } else {
            LanguageVariant::Jsx
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ParserSnapshot {
    scanner: ScannerSnapshot,
    token: SyntaxKind,
    last_token_end: u32,
    arena_len: usize,
    tokens_len: usize,
    diagnostics_len: usize,
}

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) tokens: Vec<TokenSpan>,
    pub(crate) file_name: String,
    pub(crate) current_token: SyntaxKind,
    pub(crate) context_flags: u32,
    /// End of the most recently consumed token; the end of a finished node.
    pub(crate) last_token_end: u32,
    pub(crate) parse_diagnostics: Vec<ParseDiagnostic>,
    pub(crate) recursion_depth: u32,
    /// Number of enclosing `look_ahead`/`try_parse` calls.
    speculation_depth: u32,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String, variant: LanguageVariant) -> ParserState {
        let estimated_nodes = source_text.len() / 8;
        let context_flags = match variant {
            LanguageVariant::Jsx => CONTEXT_FLAG_JSX,
            LanguageVariant::Standard => 0,
        };
        ParserState {
            scanner: ScannerState::new(source_text),
            arena: NodeArena::with_capacity(estimated_nodes),
            tokens: Vec::with_capacity(estimated_nodes),
            file_name,
            current_token: SyntaxKind::Unknown,
            context_flags,
            last_token_end: 0,
            parse_diagnostics: Vec::new(),
            recursion_depth: 0,
            speculation_depth: 0,
        }
    }

    pub fn get_arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn get_diagnostics(&self) -> &[ParseDiagnostic] {
        &self.parse_diagnostics
    }

    /// Tokens consumed so far, in source order.
    pub fn get_tokens(&self) -> &[TokenSpan] {
        &self.tokens
    }

    pub fn into_parts(self) -> (NodeArena, Vec<TokenSpan>, Vec<ParseDiagnostic>) {
        (self.arena, self.tokens, self.parse_diagnostics)
    }

    // =========================================================================
    // Token access
    // =========================================================================

    #[inline]
    pub(crate) const fn token(&self) -> SyntaxKind {
        self.current_token
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    pub(crate) fn in_jsx_context(&self) -> bool {
        self.context_flags & CONTEXT_FLAG_JSX != 0
    }

    /// Record the current token as consumed.
    fn record_current_token(&mut self) {
        let pos = self.scanner.token_pos();
        let end = self.scanner.token_end();
        if end > pos {
            self.tokens.push(TokenSpan {
                kind: self.current_token,
                pos,
                end,
            });
            self.last_token_end = end;
        }
    }

    /// Consume the current token and scan the next one.
    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.consume_with(ScannerState::next_token)
    }

    /// Consume the current token and scan the next one with a context-specific
    /// scan (JSX children, JSX attribute values).
    pub(crate) fn consume_with(&mut self, scan: fn(&mut ScannerState) -> SyntaxKind) -> SyntaxKind {
        self.record_current_token();
        self.current_token = scan(&mut self.scanner);
        self.current_token
    }

    /// Re-scan the current token in place; the rescanned token is what gets
    /// recorded when it is consumed.
    pub(crate) fn re_scan(&mut self, scan: fn(&mut ScannerState) -> SyntaxKind) -> SyntaxKind {
        self.current_token = scan(&mut self.scanner);
        self.current_token
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report `'<kind>' expected.` without consuming.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.parse_error_at_current_token(&format!("'{}' expected.", token_to_string(kind)));
        false
    }

    pub(crate) fn parse_error_at_current_token(&mut self, message: &str) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        // One diagnostic per position keeps cascades down
        if self.speculation_depth == 0
            && self
                .parse_diagnostics
                .last()
                .is_some_and(|last| last.start == start)
        {
            return;
        }
        self.parse_diagnostics.push(ParseDiagnostic {
            start,
            length,
            message: message.to_string(),
        });
    }

    pub(crate) const fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// Automatic semicolon insertion point.
    pub(crate) fn can_parse_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::SemicolonToken)
            || self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.has_preceding_line_break()
    }

    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if !self.can_parse_semicolon() {
            self.parse_error_at_current_token("';' expected.");
        }
    }

    // =========================================================================
    // Speculative parsing
    // =========================================================================

    pub(crate) fn save(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            token: self.current_token,
            last_token_end: self.last_token_end,
            arena_len: self.arena.nodes.len(),
            tokens_len: self.tokens.len(),
            diagnostics_len: self.parse_diagnostics.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.token;
        self.last_token_end = snapshot.last_token_end;
        self.arena.nodes.truncate(snapshot.arena_len);
        self.tokens.truncate(snapshot.tokens_len);
        self.parse_diagnostics.truncate(snapshot.diagnostics_len);
    }

    /// Run `f` and rewind everything it consumed.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut ParserState) -> T) -> T {
        let snapshot = self.save();
        self.speculation_depth += 1;
        let result = f(self);
        self.speculation_depth -= 1;
        self.restore(snapshot);
        result
    }

    /// Run `f`; keep its effects only if it returns `Some` without reporting
    /// a syntax error.
    pub(crate) fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut ParserState) -> Option<T>,
    ) -> Option<T> {
        let snapshot = self.save();
        self.speculation_depth += 1;
        let result = f(self);
        self.speculation_depth -= 1;
        match result {
            Some(result) if self.parse_diagnostics.len() == snapshot.diagnostics_len => {
                Some(result)
            }
            _ => {
                self.restore(snapshot);
                None
            }
        }
    }

    /// Advance and report whether the next token is on the same line.
    pub(crate) fn next_token_is_on_same_line(&mut self) -> bool {
        self.next_token();
        !self.has_preceding_line_break()
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    /// Finish a node that started at `start` and ends at the last consumed token.
    pub(crate) fn finish_node(&mut self, kind: u16, start: u32, children: Vec<NodeIndex>) -> NodeIndex {
        let end = self.last_token_end.max(start);
        self.arena.add_node(kind, start, end, children)
    }

    /// Turn the current token into a leaf node of `kind` and consume it.
    pub(crate) fn parse_token_node_as(&mut self, kind: u16) -> NodeIndex {
        let node = self
            .arena
            .add_token(kind, self.token_pos(), self.token_end());
        self.next_token();
        node
    }

    pub(crate) fn parse_token_node(&mut self) -> NodeIndex {
        self.parse_token_node_as(self.current_token as u16)
    }

    /// Zero-width identifier standing in for a missing name.
    pub(crate) fn create_missing_identifier(&mut self, message: &str) -> NodeIndex {
        self.parse_error_at_current_token(message);
        let pos = self.token_pos();
        self.arena
            .add_token(SyntaxKind::Identifier as u16, pos, pos)
    }

    pub(crate) fn is_identifier(&self) -> bool {
        self.current_token.is_identifier_like()
    }

    /// Binding identifier; contextual keywords are accepted.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_identifier() {
            self.parse_token_node_as(SyntaxKind::Identifier as u16)
        } else {
            self.create_missing_identifier("Identifier expected.")
        }
    }

    pub(crate) fn is_identifier_or_keyword(&self) -> bool {
        self.current_token == SyntaxKind::Identifier || self.current_token.is_keyword()
    }

    /// Property name after `.`; any keyword is accepted.
    pub(crate) fn parse_identifier_name(&mut self) -> NodeIndex {
        if self.is_identifier_or_keyword() {
            self.parse_token_node_as(SyntaxKind::Identifier as u16)
        } else if self.is_token(SyntaxKind::PrivateIdentifier) {
            self.parse_token_node()
        } else {
            self.create_missing_identifier("Identifier expected.")
        }
    }

    /// Enter a recursive production; `false` once the nesting limit is hit.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.parse_error_at_current_token("Maximum nesting depth exceeded.");
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// Run `f` with `flag` set (or cleared) in the context flags.
    pub(crate) fn with_context<T>(
        &mut self,
        flag: u32,
        set: bool,
        f: impl FnOnce(&mut ParserState) -> T,
    ) -> T {
        let saved = self.context_flags;
        if set {
            self.context_flags |= flag;
        } else {
            self.context_flags &= !flag;
        }
        let result = f(self);
        self.context_flags = saved;
        result
    }
}

/// Source text of a punctuation or keyword token, for error messages.
pub(crate) fn token_to_string(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::OpenBraceToken => "{",
        SyntaxKind::CloseBraceToken => "}",
        SyntaxKind::OpenParenToken => "(",
        SyntaxKind::CloseParenToken => ")",
        SyntaxKind::OpenBracketToken => "[",
        SyntaxKind::CloseBracketToken => "]",
        SyntaxKind::DotToken => ".",
        SyntaxKind::SemicolonToken => ";",
        SyntaxKind::CommaToken => ",",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::LessThanSlashToken => "</",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::EqualsToken => "=",
        SyntaxKind::EqualsGreaterThanToken => "=>",
        SyntaxKind::ColonToken => ":",
        SyntaxKind::QuestionToken => "?",
        SyntaxKind::SlashToken => "/",
        SyntaxKind::WhileKeyword => "while",
        SyntaxKind::FromKeyword => "from",
        SyntaxKind::AsKeyword => "as",
        SyntaxKind::InKeyword => "in",
        SyntaxKind::Identifier => "identifier",
        _ => "token",
    }
}
