//! Scanner state machine.
//!
//! The scanner is driven by the parser one token at a time. Context the
//! scanner cannot know on its own (is `/` a regex? is `>` the end of a type
//! argument list or a shift operator? are we inside JSX children?) is
//! resolved by the parser calling one of the `re_scan_*` / `scan_jsx_*`
//! methods, mirroring the TypeScript scanner.

use std::sync::Arc;

use crate::syntax_kind::{SyntaxKind, keyword_from_text};

/// Saved scanner position for speculative parsing.
#[derive(Clone, Copy, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    full_start: usize,
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    unterminated: bool,
}

pub struct ScannerState {
    text: Arc<str>,
    /// Current scan position (byte offset).
    pos: usize,
    /// Start of the current token including leading trivia.
    full_start: usize,
    /// Start of the current token excluding trivia.
    token_start: usize,
    token: SyntaxKind,
    preceding_line_break: bool,
    /// The current string/template/regex token ran to end of input.
    unterminated: bool,
}

impl ScannerState {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        ScannerState {
            text: text.into(),
            pos: 0,
            full_start: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            preceding_line_break: false,
            unterminated: false,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.text
    }

    pub fn source_text_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub const fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Start of the current token, excluding leading trivia.
    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Start of the current token, including leading trivia.
    pub fn token_full_start(&self) -> u32 {
        self.full_start as u32
    }

    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    pub const fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    pub const fn is_unterminated(&self) -> bool {
        self.unterminated
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            full_start: self.full_start,
            token_start: self.token_start,
            token: self.token,
            preceding_line_break: self.preceding_line_break,
            unterminated: self.unterminated,
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.full_start = snapshot.full_start;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.preceding_line_break = snapshot.preceding_line_break;
        self.unterminated = snapshot.unterminated;
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.text.get(pos..)?.chars().next()
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '$' || ch == '_' || (!ch.is_ascii() && ch.is_alphabetic())
    }

    fn is_identifier_part(ch: char) -> bool {
        ch.is_ascii_alphanumeric()
            || ch == '$'
            || ch == '_'
            || ch == '\u{200C}'
            || ch == '\u{200D}'
            || (!ch.is_ascii() && ch.is_alphanumeric())
    }

    fn is_line_break(ch: char) -> bool {
        matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    /// Skip whitespace and comments, recording whether a line break was seen.
    fn skip_trivia(&mut self) {
        // Shebang is only trivia at the very start of the file
        if self.pos == 0 && self.text.starts_with("#!") {
            while let Some(ch) = self.char_at(self.pos) {
                if Self::is_line_break(ch) {
                    break;
                }
                self.pos += ch.len_utf8();
            }
        }

        while let Some(ch) = self.char_at(self.pos) {
            match ch {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    self.preceding_line_break = true;
                    self.pos += ch.len_utf8();
                }
                ' ' | '\t' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}' => {
                    self.pos += ch.len_utf8();
                }
                '/' if self.byte_at(self.pos + 1) == Some(b'/') => {
                    self.pos += 2;
                    while let Some(c) = self.char_at(self.pos) {
                        if Self::is_line_break(c) {
                            break;
                        }
                        self.pos += c.len_utf8();
                    }
                }
                '/' if self.byte_at(self.pos + 1) == Some(b'*') => {
                    self.pos += 2;
                    loop {
                        match self.char_at(self.pos) {
                            None => break,
                            Some('*') if self.byte_at(self.pos + 1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(c) => {
                                if Self::is_line_break(c) {
                                    self.preceding_line_break = true;
                                }
                                self.pos += c.len_utf8();
                            }
                        }
                    }
                }
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                _ => break,
            }
        }
    }

    // =========================================================================
    // Main scan
    // =========================================================================

    /// Scan the next token.
    pub fn next_token(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.preceding_line_break = false;
        self.unterminated = false;
        self.skip_trivia();
        self.token_start = self.pos;
        self.token = self.scan_token();
        self.token
    }

    fn scan_token(&mut self) -> SyntaxKind {
        let Some(ch) = self.char_at(self.pos) else {
            return SyntaxKind::EndOfFileToken;
        };

        if Self::is_identifier_start(ch) || ch == '\\' {
            return self.scan_identifier();
        }
        if ch.is_ascii_digit() {
            return self.scan_number();
        }

        let next = self.byte_at(self.pos + 1);
        let next2 = self.byte_at(self.pos + 2);

        let (kind, len) = match ch {
            '"' | '\'' => return self.scan_string(ch),
            '`' => {
                self.pos += 1;
                return self.scan_template_rest(true);
            }
            '.' => {
                if next.is_some_and(|b| b.is_ascii_digit()) {
                    return self.scan_number();
                }
                if next == Some(b'.') && next2 == Some(b'.') {
                    (SyntaxKind::DotDotDotToken, 3)
                } else {
                    (SyntaxKind::DotToken, 1)
                }
            }
            '{' => (SyntaxKind::OpenBraceToken, 1),
            '}' => (SyntaxKind::CloseBraceToken, 1),
            '(' => (SyntaxKind::OpenParenToken, 1),
            ')' => (SyntaxKind::CloseParenToken, 1),
            '[' => (SyntaxKind::OpenBracketToken, 1),
            ']' => (SyntaxKind::CloseBracketToken, 1),
            ';' => (SyntaxKind::SemicolonToken, 1),
            ',' => (SyntaxKind::CommaToken, 1),
            ':' => (SyntaxKind::ColonToken, 1),
            '~' => (SyntaxKind::TildeToken, 1),
            '@' => (SyntaxKind::AtToken, 1),
            '?' => match next {
                Some(b'.') if !next2.is_some_and(|b| b.is_ascii_digit()) => {
                    (SyntaxKind::QuestionDotToken, 2)
                }
                Some(b'?') if next2 == Some(b'=') => (SyntaxKind::QuestionQuestionEqualsToken, 3),
                Some(b'?') => (SyntaxKind::QuestionQuestionToken, 2),
                _ => (SyntaxKind::QuestionToken, 1),
            },
            '<' => match next {
                Some(b'<') if next2 == Some(b'=') => (SyntaxKind::LessThanLessThanEqualsToken, 3),
                Some(b'<') => (SyntaxKind::LessThanLessThanToken, 2),
                Some(b'=') => (SyntaxKind::LessThanEqualsToken, 2),
                _ => (SyntaxKind::LessThanToken, 1),
            },
            // Always a single `>`; compounds are formed by `re_scan_greater_token`
            '>' => (SyntaxKind::GreaterThanToken, 1),
            '=' => match next {
                Some(b'=') if next2 == Some(b'=') => (SyntaxKind::EqualsEqualsEqualsToken, 3),
                Some(b'=') => (SyntaxKind::EqualsEqualsToken, 2),
                Some(b'>') => (SyntaxKind::EqualsGreaterThanToken, 2),
                _ => (SyntaxKind::EqualsToken, 1),
            },
            '!' => match next {
                Some(b'=') if next2 == Some(b'=') => (SyntaxKind::ExclamationEqualsEqualsToken, 3),
                Some(b'=') => (SyntaxKind::ExclamationEqualsToken, 2),
                _ => (SyntaxKind::ExclamationToken, 1),
            },
            '+' => match next {
                Some(b'+') => (SyntaxKind::PlusPlusToken, 2),
                Some(b'=') => (SyntaxKind::PlusEqualsToken, 2),
                _ => (SyntaxKind::PlusToken, 1),
            },
            '-' => match next {
                Some(b'-') => (SyntaxKind::MinusMinusToken, 2),
                Some(b'=') => (SyntaxKind::MinusEqualsToken, 2),
                _ => (SyntaxKind::MinusToken, 1),
            },
            '*' => match next {
                Some(b'*') if next2 == Some(b'=') => (SyntaxKind::AsteriskAsteriskEqualsToken, 3),
                Some(b'*') => (SyntaxKind::AsteriskAsteriskToken, 2),
                Some(b'=') => (SyntaxKind::AsteriskEqualsToken, 2),
                _ => (SyntaxKind::AsteriskToken, 1),
            },
            '/' => match next {
                Some(b'=') => (SyntaxKind::SlashEqualsToken, 2),
                _ => (SyntaxKind::SlashToken, 1),
            },
            '%' => match next {
                Some(b'=') => (SyntaxKind::PercentEqualsToken, 2),
                _ => (SyntaxKind::PercentToken, 1),
            },
            '&' => match next {
                Some(b'&') if next2 == Some(b'=') => {
                    (SyntaxKind::AmpersandAmpersandEqualsToken, 3)
                }
                Some(b'&') => (SyntaxKind::AmpersandAmpersandToken, 2),
                Some(b'=') => (SyntaxKind::AmpersandEqualsToken, 2),
                _ => (SyntaxKind::AmpersandToken, 1),
            },
            '|' => match next {
                Some(b'|') if next2 == Some(b'=') => (SyntaxKind::BarBarEqualsToken, 3),
                Some(b'|') => (SyntaxKind::BarBarToken, 2),
                Some(b'=') => (SyntaxKind::BarEqualsToken, 2),
                _ => (SyntaxKind::BarToken, 1),
            },
            '^' => match next {
                Some(b'=') => (SyntaxKind::CaretEqualsToken, 2),
                _ => (SyntaxKind::CaretToken, 1),
            },
            '#' => {
                if self
                    .char_at(self.pos + 1)
                    .is_some_and(Self::is_identifier_start)
                {
                    self.pos += 1;
                    self.consume_identifier_parts();
                    return SyntaxKind::PrivateIdentifier;
                }
                (SyntaxKind::HashToken, 1)
            }
            _ => (SyntaxKind::Unknown, ch.len_utf8()),
        };

        self.pos += len;
        kind
    }

    fn consume_identifier_parts(&mut self) {
        while let Some(ch) = self.char_at(self.pos) {
            if Self::is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else if ch == '\\' && self.byte_at(self.pos + 1) == Some(b'u') {
                self.skip_unicode_escape();
            } else {
                break;
            }
        }
    }

    fn skip_unicode_escape(&mut self) {
        // \uXXXX or \u{X...}
        self.pos += 2;
        if self.byte_at(self.pos) == Some(b'{') {
            while let Some(b) = self.byte_at(self.pos) {
                self.pos += 1;
                if b == b'}' {
                    break;
                }
            }
        } else {
            let mut count = 0;
            while count < 4 && self.byte_at(self.pos).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
                count += 1;
            }
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        if self.byte_at(self.pos) == Some(b'\\') {
            if self.byte_at(self.pos + 1) != Some(b'u') {
                self.pos += 1;
                return SyntaxKind::Unknown;
            }
            self.skip_unicode_escape();
        } else if let Some(ch) = self.char_at(self.pos) {
            self.pos += ch.len_utf8();
        }
        self.consume_identifier_parts();
        keyword_from_text(&self.text[start..self.pos]).unwrap_or(SyntaxKind::Identifier)
    }

    fn scan_digits(&mut self, is_digit: fn(u8) -> bool) {
        while let Some(b) = self.byte_at(self.pos) {
            if is_digit(b) || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let first = self.byte_at(self.pos);
        let second = self.byte_at(self.pos + 1).map(|b| b.to_ascii_lowercase());

        if first == Some(b'0') && matches!(second, Some(b'x' | b'o' | b'b')) {
            self.pos += 2;
            match second {
                Some(b'x') => self.scan_digits(|b| b.is_ascii_hexdigit()),
                Some(b'o') => self.scan_digits(|b| (b'0'..=b'7').contains(&b)),
                _ => self.scan_digits(|b| b == b'0' || b == b'1'),
            }
        } else {
            self.scan_digits(|b| b.is_ascii_digit());
            if self.byte_at(self.pos) == Some(b'.') {
                self.pos += 1;
                self.scan_digits(|b| b.is_ascii_digit());
            }
            if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
                let mut look = self.pos + 1;
                if matches!(self.byte_at(look), Some(b'+' | b'-')) {
                    look += 1;
                }
                if self.byte_at(look).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos = look;
                    self.scan_digits(|b| b.is_ascii_digit());
                }
            }
        }

        if self.byte_at(self.pos) == Some(b'n') {
            self.pos += 1;
            return SyntaxKind::BigIntLiteral;
        }
        SyntaxKind::NumericLiteral
    }

    fn scan_string(&mut self, quote: char) -> SyntaxKind {
        self.pos += 1;
        loop {
            match self.char_at(self.pos) {
                None => {
                    self.unterminated = true;
                    break;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.char_at(self.pos) {
                        self.pos += escaped.len_utf8();
                    }
                }
                Some('\n' | '\r') => {
                    self.unterminated = true;
                    break;
                }
                Some(c) => self.pos += c.len_utf8(),
            }
        }
        SyntaxKind::StringLiteral
    }

    /// Scan template characters after "`" or "}" up to the next "`" or "${".
    fn scan_template_rest(&mut self, is_start: bool) -> SyntaxKind {
        loop {
            match self.char_at(self.pos) {
                None => {
                    self.unterminated = true;
                    return if is_start {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                Some('`') => {
                    self.pos += 1;
                    return if is_start {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                Some('$') if self.byte_at(self.pos + 1) == Some(b'{') => {
                    self.pos += 2;
                    return if is_start {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.char_at(self.pos) {
                        self.pos += escaped.len_utf8();
                    }
                }
                Some(c) => self.pos += c.len_utf8(),
            }
        }
    }

    // =========================================================================
    // Re-scans driven by the parser
    // =========================================================================

    /// Combine a `>` token with following `>`/`=` characters into a compound
    /// operator. Only called in binary-expression position.
    pub fn re_scan_greater_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::GreaterThanToken {
            return self.token;
        }
        let (kind, extra) = match (self.byte_at(self.pos), self.byte_at(self.pos + 1), self.byte_at(self.pos + 2)) {
            (Some(b'>'), Some(b'>'), Some(b'=')) => {
                (SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken, 3)
            }
            (Some(b'>'), Some(b'>'), _) => (SyntaxKind::GreaterThanGreaterThanGreaterThanToken, 2),
            (Some(b'>'), Some(b'='), _) => (SyntaxKind::GreaterThanGreaterThanEqualsToken, 2),
            (Some(b'>'), _, _) => (SyntaxKind::GreaterThanGreaterThanToken, 1),
            (Some(b'='), _, _) => (SyntaxKind::GreaterThanEqualsToken, 1),
            _ => (SyntaxKind::GreaterThanToken, 0),
        };
        self.pos += extra;
        self.token = kind;
        kind
    }

    /// Re-scan a `/` or `/=` token as a regular expression literal.
    pub fn re_scan_slash_token(&mut self) -> SyntaxKind {
        if !matches!(self.token, SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken) {
            return self.token;
        }
        self.pos = self.token_start + 1;
        let mut in_class = false;
        loop {
            match self.char_at(self.pos) {
                None => {
                    self.unterminated = true;
                    break;
                }
                Some(c) if Self::is_line_break(c) => {
                    self.unterminated = true;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    if let Some(escaped) = self.char_at(self.pos) {
                        self.pos += escaped.len_utf8();
                    }
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    if c == '[' {
                        in_class = true;
                    } else if c == ']' {
                        in_class = false;
                    }
                    self.pos += c.len_utf8();
                }
            }
        }
        // Flags
        while let Some(ch) = self.char_at(self.pos) {
            if Self::is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    /// Re-scan a `}` token as the continuation of a template literal.
    pub fn re_scan_template_token(&mut self) -> SyntaxKind {
        if self.token != SyntaxKind::CloseBraceToken {
            return self.token;
        }
        self.pos = self.token_start + 1;
        self.token = self.scan_template_rest(false);
        self.token
    }

    // =========================================================================
    // JSX
    // =========================================================================

    /// Scan the next token inside JSX children: text up to `{` or `<`, or one
    /// of `{`, `<`, `</`. Trivia is not skipped; whitespace is JSX text.
    pub fn scan_jsx_token(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.token_start = self.pos;
        self.preceding_line_break = false;
        self.unterminated = false;

        self.token = match self.char_at(self.pos) {
            None => SyntaxKind::EndOfFileToken,
            Some('<') => {
                if self.byte_at(self.pos + 1) == Some(b'/') {
                    self.pos += 2;
                    SyntaxKind::LessThanSlashToken
                } else {
                    self.pos += 1;
                    SyntaxKind::LessThanToken
                }
            }
            Some('{') => {
                self.pos += 1;
                SyntaxKind::OpenBraceToken
            }
            Some(_) => {
                while let Some(c) = self.char_at(self.pos) {
                    if c == '{' || c == '<' {
                        break;
                    }
                    if Self::is_line_break(c) {
                        self.preceding_line_break = true;
                    }
                    self.pos += c.len_utf8();
                }
                SyntaxKind::JsxText
            }
        };
        self.token
    }

    /// Extend the current identifier or keyword token with `-`-joined parts
    /// (`data-id`, `aria-label`).
    pub fn scan_jsx_identifier(&mut self) -> SyntaxKind {
        if !self.token.is_keyword() && self.token != SyntaxKind::Identifier {
            return self.token;
        }
        let mut extended = false;
        while let Some(ch) = self.char_at(self.pos) {
            if ch == '-' || Self::is_identifier_part(ch) {
                self.pos += ch.len_utf8();
                extended = true;
            } else {
                break;
            }
        }
        if extended {
            self.token = SyntaxKind::Identifier;
        }
        self.token
    }

    /// Scan the next token as a JSX attribute value: quoted strings are taken
    /// verbatim (no escapes); anything else scans normally.
    pub fn scan_jsx_attribute_value(&mut self) -> SyntaxKind {
        self.full_start = self.pos;
        self.preceding_line_break = false;
        self.unterminated = false;
        self.skip_trivia();
        self.token_start = self.pos;

        self.token = match self.char_at(self.pos) {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                loop {
                    match self.char_at(self.pos) {
                        None => {
                            self.unterminated = true;
                            break;
                        }
                        Some(c) if c == quote => {
                            self.pos += 1;
                            break;
                        }
                        Some(c) => self.pos += c.len_utf8(),
                    }
                }
                SyntaxKind::StringLiteral
            }
            _ => self.scan_token(),
        };
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
        let mut scanner = ScannerState::new(source);
        let mut tokens = Vec::new();
        loop {
            let kind = scanner.next_token();
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
            tokens.push((kind, scanner.token_text().to_string()));
        }
        tokens
    }

    #[test]
    fn test_scan_variable_statement() {
        let tokens = scan_all("const x: number = \"a\";");
        let kinds: Vec<SyntaxKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::ConstKeyword,
                SyntaxKind::Identifier,
                SyntaxKind::ColonToken,
                SyntaxKind::NumberKeyword,
                SyntaxKind::EqualsToken,
                SyntaxKind::StringLiteral,
                SyntaxKind::SemicolonToken,
            ]
        );
        assert_eq!(tokens[5].1, "\"a\"");
    }

    #[test]
    fn test_trivia_and_line_breaks() {
        let mut scanner = ScannerState::new("a // comment\n  /* block */ b");
        scanner.next_token();
        assert!(!scanner.has_preceding_line_break());
        scanner.next_token();
        assert!(scanner.has_preceding_line_break());
        assert_eq!(scanner.token_text(), "b");
        assert_eq!(scanner.token_full_start(), 1);
    }

    #[test]
    fn test_numbers() {
        let tokens = scan_all("1_000 0xFF .5 1e-3 10n");
        let kinds: Vec<SyntaxKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::NumericLiteral,
                SyntaxKind::NumericLiteral,
                SyntaxKind::NumericLiteral,
                SyntaxKind::NumericLiteral,
                SyntaxKind::BigIntLiteral,
            ]
        );
    }

    #[test]
    fn test_greater_than_is_rescanned_on_demand() {
        let mut scanner = ScannerState::new("a >>= b");
        scanner.next_token();
        assert_eq!(scanner.next_token(), SyntaxKind::GreaterThanToken);
        assert_eq!(
            scanner.re_scan_greater_token(),
            SyntaxKind::GreaterThanGreaterThanEqualsToken
        );
        assert_eq!(scanner.token_text(), ">>=");
    }

    #[test]
    fn test_regex_rescan() {
        let mut scanner = ScannerState::new("/[/]+\\//gi.test(s)");
        assert_eq!(scanner.next_token(), SyntaxKind::SlashToken);
        assert_eq!(
            scanner.re_scan_slash_token(),
            SyntaxKind::RegularExpressionLiteral
        );
        assert_eq!(scanner.token_text(), "/[/]+\\//gi");
        assert_eq!(scanner.next_token(), SyntaxKind::DotToken);
    }

    #[test]
    fn test_template_continuation() {
        let mut scanner = ScannerState::new("`a${b}c${d}e`");
        assert_eq!(scanner.next_token(), SyntaxKind::TemplateHead);
        assert_eq!(scanner.next_token(), SyntaxKind::Identifier);
        assert_eq!(scanner.next_token(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.re_scan_template_token(), SyntaxKind::TemplateMiddle);
        assert_eq!(scanner.next_token(), SyntaxKind::Identifier);
        scanner.next_token();
        assert_eq!(scanner.re_scan_template_token(), SyntaxKind::TemplateTail);
        assert_eq!(scanner.token_text(), "}e`");
    }

    #[test]
    fn test_jsx_text_and_identifiers() {
        let mut scanner = ScannerState::new("<div data-id='x\\'>hi {name}</div>");
        assert_eq!(scanner.next_token(), SyntaxKind::LessThanToken);
        scanner.next_token();
        assert_eq!(scanner.token_text(), "div");
        scanner.next_token();
        assert_eq!(scanner.scan_jsx_identifier(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_text(), "data-id");
        assert_eq!(scanner.next_token(), SyntaxKind::EqualsToken);
        assert_eq!(scanner.scan_jsx_attribute_value(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.token_text(), "'x\\'");
        assert_eq!(scanner.next_token(), SyntaxKind::GreaterThanToken);
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::JsxText);
        assert_eq!(scanner.token_text(), "hi ");
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::OpenBraceToken);
        scanner.next_token();
        scanner.next_token();
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::LessThanSlashToken);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut scanner = ScannerState::new("a b c");
        scanner.next_token();
        let snapshot = scanner.save_state();
        scanner.next_token();
        scanner.next_token();
        scanner.restore_state(snapshot);
        assert_eq!(scanner.token_text(), "a");
        scanner.next_token();
        assert_eq!(scanner.token_text(), "b");
    }
}
