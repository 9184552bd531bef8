//! Common types and utilities for the ts-ratchet codemod.
//!
//! This crate provides the data contract shared by the collector and both
//! insertion engines:
//! - Checker diagnostics (`Diagnostic`) and their line/column form (`Issue`)
//! - Per-file issue grouping (`IssuesPerFile`, `ReducedDiagnostics`)
//! - Position/Range types and the offset <-> line/column `LineMap`
//! - Offset-based text insertion (`Insertion`, `apply_insertions`)
//! - Suppression annotation text

// Diagnostics as reported by the checker and as consumed by the engines
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, Issue, IssuesPerFile, ReducedDiagnostics,
};

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, SourceRange};

// Offset-based multi-point text editing
pub mod text_edit;
pub use text_edit::{Insertion, apply_insertions};

// Suppression annotation text
pub mod annotation;
pub use annotation::AnnotationSource;
