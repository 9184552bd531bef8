//! Suppression annotation text.
//!
//! Downstream tooling scans for these markers verbatim, so the format is
//! fixed: `@ts-expect-error ratchet TS<code> (<engine tag>)`.

/// Directive understood by the TypeScript checker.
pub const EXPECT_ERROR_DIRECTIVE: &str = "@ts-expect-error";

/// Which insertion engine produced an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationSource {
    /// Syntax-tree pass.
    Structural,
    /// Raw text offset pass.
    Offset,
}

impl AnnotationSource {
    /// Tag written at the end of every annotation from this engine.
    pub const fn tag(self) -> &'static str {
        match self {
            AnnotationSource::Structural => "jscodeshift",
            AnnotationSource::Offset => "ts-morph",
        }
    }
}

/// Bare annotation text, without comment delimiters.
pub fn annotation_text(code: u32, source: AnnotationSource) -> String {
    format!(
        "{EXPECT_ERROR_DIRECTIVE} ratchet TS{code} ({})",
        source.tag()
    )
}

/// `// @ts-expect-error ratchet TS<code> (<tag>)`
pub fn line_comment(code: u32, source: AnnotationSource) -> String {
    format!("// {}", annotation_text(code, source))
}

/// Markup-tree form: a block comment inside an empty expression container,
/// `{/* @ts-expect-error ratchet TS<code> (jscodeshift) */}`.
pub fn markup_comment(code: u32) -> String {
    format!(
        "{{/* {} */}}",
        annotation_text(code, AnnotationSource::Structural)
    )
}
