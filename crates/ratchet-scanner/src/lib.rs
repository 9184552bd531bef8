//! TypeScript/TSX scanner for the ts-ratchet codemod.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine with snapshot/restore and the
//!   context-dependent re-scans the parser drives (`>` compounds, regular
//!   expressions, template continuations, JSX text and attribute values)

pub mod syntax_kind;
pub use syntax_kind::{SyntaxKind, keyword_from_text};

pub mod scanner;
pub use scanner::{ScannerSnapshot, ScannerState};
