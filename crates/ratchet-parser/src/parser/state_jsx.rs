//! Parser state - JSX parsing methods
//!
//! Elements always wrap their opening tag; attributes are direct children of
//! the opening tag. Text between tags (including whitespace-only runs) is
//! kept as `JsxText` token nodes so markup children can be targeted.

use ratchet_scanner::{ScannerState, SyntaxKind};

use super::base::NodeIndex;
use super::state::ParserState;
use super::syntax_kind_ext;

impl ParserState {
    // =========================================================================
    // Parse Methods - JSX
    // =========================================================================

    /// Parse `<tag ...>children</tag>`, `<tag />` or `<>children</>`.
    ///
    /// The current token is `<`. `in_children` is true when the element is
    /// itself a child of another element, so the token after its final `>`
    /// must be scanned as JSX text.
    pub(crate) fn parse_jsx_element_or_fragment(&mut self, in_children: bool) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier("Expression expected.");
        }
        let result = self.parse_jsx_element_or_fragment_worker(in_children);
        self.exit_recursion();
        result
    }

    fn parse_jsx_element_or_fragment_worker(&mut self, in_children: bool) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // <

        if self.is_token(SyntaxKind::GreaterThanToken) {
            return self.parse_jsx_fragment(start_pos, in_children);
        }

        let mut opening_children = vec![self.parse_jsx_tag_name()];
        if self.is_token(SyntaxKind::LessThanToken) {
            opening_children.extend(self.parse_type_arguments());
        }
        self.parse_jsx_attributes(&mut opening_children);

        // Self-closing
        if self.parse_optional(SyntaxKind::SlashToken) {
            self.parse_jsx_closing_greater_than(in_children);
            let opening = self.finish_node(syntax_kind_ext::JSX_OPENING_ELEMENT, start_pos, opening_children);
            return self.finish_node(syntax_kind_ext::JSX_ELEMENT, start_pos, vec![opening]);
        }

        self.parse_jsx_closing_greater_than(true);
        let opening = self.finish_node(syntax_kind_ext::JSX_OPENING_ELEMENT, start_pos, opening_children);

        let mut children = vec![opening];
        children.extend(self.parse_jsx_children());

        if self.is_token(SyntaxKind::LessThanSlashToken) {
            let closing_start = self.token_pos();
            self.next_token(); // </
            let name = self.parse_jsx_tag_name();
            self.parse_jsx_closing_greater_than(in_children);
            children.push(self.finish_node(syntax_kind_ext::JSX_CLOSING_ELEMENT, closing_start, vec![name]));
        } else {
            self.parse_error_at_current_token("JSX element has no corresponding closing tag.");
        }
        self.finish_node(syntax_kind_ext::JSX_ELEMENT, start_pos, children)
    }

    /// `<>children</>`; the current token is the `>` of the opening fragment.
    fn parse_jsx_fragment(&mut self, start_pos: u32, in_children: bool) -> NodeIndex {
        self.parse_jsx_closing_greater_than(true);
        let opening = self.finish_node(syntax_kind_ext::JSX_OPENING_FRAGMENT, start_pos, Vec::new());

        let mut children = vec![opening];
        children.extend(self.parse_jsx_children());

        if self.is_token(SyntaxKind::LessThanSlashToken) {
            let closing_start = self.token_pos();
            self.next_token(); // </
            self.parse_jsx_closing_greater_than(in_children);
            children.push(self.finish_node(syntax_kind_ext::JSX_CLOSING_FRAGMENT, closing_start, Vec::new()));
        } else {
            self.parse_error_at_current_token("JSX fragment has no corresponding closing tag.");
        }
        self.finish_node(syntax_kind_ext::JSX_FRAGMENT, start_pos, children)
    }

    /// Consume `>`; the following token is JSX text when `jsx_text_follows`.
    fn parse_jsx_closing_greater_than(&mut self, jsx_text_follows: bool) {
        if !self.is_token(SyntaxKind::GreaterThanToken) {
            self.parse_error_at_current_token("'>' expected.");
            return;
        }
        if jsx_text_follows {
            self.consume_with(ScannerState::scan_jsx_token);
        } else {
            self.next_token();
        }
    }

    /// `div`, `data-x`, `svg:rect`, `Foo.Bar.Baz` or `this.Component`.
    fn parse_jsx_tag_name(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        if self.is_token(SyntaxKind::ThisKeyword) {
            let mut name = self.parse_token_node();
            while self.parse_optional(SyntaxKind::DotToken) {
                let right = self.parse_identifier_name();
                name = self.finish_node(syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION, start_pos, vec![name, right]);
            }
            return name;
        }

        let mut name = self.parse_jsx_identifier();
        if self.parse_optional(SyntaxKind::ColonToken) {
            let local = self.parse_jsx_identifier();
            return self.finish_node(syntax_kind_ext::JSX_NAMESPACED_NAME, start_pos, vec![name, local]);
        }
        while self.parse_optional(SyntaxKind::DotToken) {
            let right = self.parse_identifier_name();
            name = self.finish_node(syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION, start_pos, vec![name, right]);
        }
        name
    }

    /// Identifier or keyword, extended with `-` parts.
    fn parse_jsx_identifier(&mut self) -> NodeIndex {
        if !self.is_identifier_or_keyword() {
            return self.create_missing_identifier("Identifier expected.");
        }
        self.re_scan(ScannerState::scan_jsx_identifier);
        self.parse_token_node_as(SyntaxKind::Identifier as u16)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn parse_jsx_attributes(&mut self, children: &mut Vec<NodeIndex>) {
        loop {
            match self.token() {
                SyntaxKind::GreaterThanToken | SyntaxKind::SlashToken | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::OpenBraceToken => children.push(self.parse_jsx_spread_attribute()),
                _ if self.is_identifier_or_keyword() => children.push(self.parse_jsx_attribute()),
                _ => {
                    self.parse_error_at_current_token("Identifier expected.");
                    self.next_token();
                }
            }
        }
    }

    /// `name`, `name="x"`, `name={expr}`, `name=<el />` or `ns:name="x"`.
    fn parse_jsx_attribute(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut name = self.parse_jsx_identifier();
        if self.parse_optional(SyntaxKind::ColonToken) {
            let local = self.parse_jsx_identifier();
            name = self.finish_node(syntax_kind_ext::JSX_NAMESPACED_NAME, start_pos, vec![name, local]);
        }
        let mut children = vec![name];

        if self.is_token(SyntaxKind::EqualsToken) {
            self.consume_with(ScannerState::scan_jsx_attribute_value);
            match self.token() {
                SyntaxKind::StringLiteral => children.push(self.parse_token_node()),
                SyntaxKind::OpenBraceToken => children.push(self.parse_jsx_attribute_expression()),
                SyntaxKind::LessThanToken => children.push(self.parse_jsx_element_or_fragment(false)),
                _ => self.parse_error_at_current_token("'{' expected."),
            }
        }
        self.finish_node(syntax_kind_ext::JSX_ATTRIBUTE, start_pos, children)
    }

    fn parse_jsx_attribute_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        let mut children = Vec::new();
        if !self.is_token(SyntaxKind::CloseBraceToken) {
            children.push(self.parse_expression_allow_in());
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::JSX_EXPRESSION, start_pos, children)
    }

    /// `{...props}`
    fn parse_jsx_spread_attribute(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        self.parse_expected(SyntaxKind::DotDotDotToken);
        let expression = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::JSX_SPREAD_ATTRIBUTE, start_pos, vec![expression])
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Children up to the closing `</`. The current token was scanned as JSX.
    fn parse_jsx_children(&mut self) -> Vec<NodeIndex> {
        let mut children = Vec::new();
        loop {
            match self.token() {
                SyntaxKind::JsxText => {
                    let text = self.arena.add_token(
                        SyntaxKind::JsxText as u16,
                        self.token_pos(),
                        self.token_end(),
                    );
                    self.consume_with(ScannerState::scan_jsx_token);
                    children.push(text);
                }
                SyntaxKind::OpenBraceToken => children.push(self.parse_jsx_child_expression()),
                SyntaxKind::LessThanToken => children.push(self.parse_jsx_element_or_fragment(true)),
                SyntaxKind::LessThanSlashToken => break,
                _ => {
                    self.parse_error_at_current_token("Expected corresponding closing tag.");
                    break;
                }
            }
        }
        children
    }

    /// `{expr}`, `{...expr}` or an empty `{}` / `{/* comment */}` between tags.
    fn parse_jsx_child_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        let mut children = Vec::new();
        if !self.is_token(SyntaxKind::CloseBraceToken) {
            self.parse_optional(SyntaxKind::DotDotDotToken);
            children.push(self.parse_expression_allow_in());
        }
        if self.is_token(SyntaxKind::CloseBraceToken) {
            self.consume_with(ScannerState::scan_jsx_token);
        } else {
            self.parse_error_at_current_token("'}' expected.");
        }
        self.finish_node(syntax_kind_ext::JSX_EXPRESSION, start_pos, children)
    }
}
