//! Parser state - expression parsing methods

use ratchet_scanner::{ScannerState, SyntaxKind};

use super::base::NodeIndex;
use super::state::{CONTEXT_FLAG_DISALLOW_IN, ParserState};
use super::syntax_kind_ext;

impl ParserState {
    // =========================================================================
    // Parse Methods - Expressions
    // =========================================================================

    /// Parse expression (including the comma operator)
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut expr = self.parse_assignment_expression_or_higher();
        while self.is_token(SyntaxKind::CommaToken) {
            self.next_token();
            let right = self.parse_assignment_expression_or_higher();
            expr = self.finish_node(syntax_kind_ext::BINARY_EXPRESSION, start_pos, vec![expr, right]);
        }
        expr
    }

    /// Expression with the `in` operator allowed, regardless of context.
    pub(crate) fn parse_expression_allow_in(&mut self) -> NodeIndex {
        self.with_context(CONTEXT_FLAG_DISALLOW_IN, false, Self::parse_expression)
    }

    pub(crate) fn parse_assignment_expression_allow_in(&mut self) -> NodeIndex {
        self.with_context(
            CONTEXT_FLAG_DISALLOW_IN,
            false,
            Self::parse_assignment_expression_or_higher,
        )
    }

    pub(crate) fn parse_assignment_expression_or_higher(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier("Expression expected.");
        }
        let result = self.parse_assignment_expression_worker();
        self.exit_recursion();
        result
    }

    fn parse_assignment_expression_worker(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::YieldKeyword) {
            return self.parse_yield_expression();
        }

        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }

        let start_pos = self.token_pos();
        let expr = self.parse_binary_expression_or_higher(0);

        self.re_scan(ScannerState::re_scan_greater_token);
        if self.token().is_assignment_operator() {
            self.next_token();
            let right = self.parse_assignment_expression_or_higher();
            return self.finish_node(syntax_kind_ext::BINARY_EXPRESSION, start_pos, vec![expr, right]);
        }

        self.parse_conditional_expression_rest(start_pos, expr)
    }

    fn parse_yield_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let mut children = Vec::new();
        if !self.has_preceding_line_break() {
            if self.is_token(SyntaxKind::AsteriskToken) {
                children.push(self.parse_token_node());
                children.push(self.parse_assignment_expression_or_higher());
            } else if self.is_start_of_expression() {
                children.push(self.parse_assignment_expression_or_higher());
            }
        }
        self.finish_node(syntax_kind_ext::YIELD_EXPRESSION, start_pos, children)
    }

    fn parse_conditional_expression_rest(&mut self, start_pos: u32, condition: NodeIndex) -> NodeIndex {
        if !self.is_token(SyntaxKind::QuestionToken) {
            return condition;
        }
        self.next_token();
        let when_true = self.parse_assignment_expression_allow_in();
        self.parse_expected(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression_or_higher();
        self.finish_node(
            syntax_kind_ext::CONDITIONAL_EXPRESSION,
            start_pos,
            vec![condition, when_true, when_false],
        )
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow_function(&mut self) -> Option<NodeIndex> {
        match self.token() {
            SyntaxKind::AsyncKeyword => {
                let is_async_arrow = self.look_ahead(|p| {
                    p.next_token_is_on_same_line()
                        && (p.is_identifier()
                            || p.is_token(SyntaxKind::OpenParenToken)
                            || p.is_token(SyntaxKind::LessThanToken))
                });
                if !is_async_arrow {
                    return None;
                }
                let (start_pos, children) = self.try_parse(|p| p.parse_arrow_function_head(true))?;
                Some(self.parse_arrow_function_body(start_pos, children))
            }
            SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken => {
                if self.is_token(SyntaxKind::LessThanToken)
                    && self.in_jsx_context()
                    && !self.look_ahead(Self::is_jsx_generic_arrow_start)
                {
                    return None;
                }
                let (start_pos, children) = self.try_parse(|p| p.parse_arrow_function_head(false))?;
                Some(self.parse_arrow_function_body(start_pos, children))
            }
            _ if self.is_identifier() => {
                let is_simple_arrow = self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::EqualsGreaterThanToken) && !p.has_preceding_line_break()
                });
                if !is_simple_arrow {
                    return None;
                }
                let start_pos = self.token_pos();
                let name = self.parse_identifier();
                let parameter = self.finish_node(syntax_kind_ext::PARAMETER, start_pos, vec![name]);
                self.next_token(); // =>
                Some(self.parse_arrow_function_body(start_pos, vec![parameter]))
            }
            _ => None,
        }
    }

    /// In JSX files `<T,>` and `<T extends U>` start a generic arrow function;
    /// anything else after `<` is markup.
    fn is_jsx_generic_arrow_start(&mut self) -> bool {
        self.next_token();
        if !self.is_identifier() {
            return false;
        }
        self.next_token();
        if self.is_token(SyntaxKind::CommaToken) {
            return true;
        }
        if self.is_token(SyntaxKind::ExtendsKeyword) {
            self.next_token();
            return !matches!(
                self.token(),
                SyntaxKind::EqualsToken | SyntaxKind::GreaterThanToken | SyntaxKind::SlashToken
            );
        }
        false
    }

    /// Everything up to and including `=>`. `None` when the tokens do not
    /// form an arrow function head.
    fn parse_arrow_function_head(&mut self, is_async: bool) -> Option<(u32, Vec<NodeIndex>)> {
        let start_pos = self.token_pos();
        let mut children = Vec::new();
        if is_async {
            children.push(self.parse_token_node());
        }

        if is_async && self.is_identifier() {
            let param_start = self.token_pos();
            let name = self.parse_identifier();
            children.push(self.finish_node(syntax_kind_ext::PARAMETER, param_start, vec![name]));
        } else {
            if self.is_token(SyntaxKind::LessThanToken) {
                children.extend(self.parse_type_parameters());
            }
            if !self.is_token(SyntaxKind::OpenParenToken) {
                return None;
            }
            children.extend(self.parse_parameter_list());
            if self.parse_optional(SyntaxKind::ColonToken) {
                children.push(self.parse_type_or_type_predicate());
            }
        }

        if !self.is_token(SyntaxKind::EqualsGreaterThanToken) || self.has_preceding_line_break() {
            return None;
        }
        self.next_token();
        Some((start_pos, children))
    }

    fn parse_arrow_function_body(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_function_block()
        } else {
            self.parse_assignment_expression_or_higher()
        };
        children.push(body);
        self.finish_node(syntax_kind_ext::ARROW_FUNCTION, start_pos, children)
    }

    // =========================================================================
    // Binary and unary expressions
    // =========================================================================

    /// Binary operator precedence; 0 when the token is not a binary operator.
    pub(crate) fn binary_operator_precedence(&self, kind: SyntaxKind) -> u8 {
        match kind {
            SyntaxKind::QuestionQuestionToken => 4,
            SyntaxKind::BarBarToken => 5,
            SyntaxKind::AmpersandAmpersandToken => 6,
            SyntaxKind::BarToken => 7,
            SyntaxKind::CaretToken => 8,
            SyntaxKind::AmpersandToken => 9,
            SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken => 10,
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::GreaterThanEqualsToken
            | SyntaxKind::InstanceOfKeyword
            | SyntaxKind::InKeyword
            | SyntaxKind::AsKeyword
            | SyntaxKind::SatisfiesKeyword => 11,
            SyntaxKind::LessThanLessThanToken
            | SyntaxKind::GreaterThanGreaterThanToken
            | SyntaxKind::GreaterThanGreaterThanGreaterThanToken => 12,
            SyntaxKind::PlusToken | SyntaxKind::MinusToken => 13,
            SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => 14,
            SyntaxKind::AsteriskAsteriskToken => 15,
            _ => 0,
        }
    }

    pub(crate) fn parse_binary_expression_or_higher(&mut self, precedence: u8) -> NodeIndex {
        let start_pos = self.token_pos();
        let left = self.parse_unary_expression_or_higher();
        self.parse_binary_expression_rest(precedence, start_pos, left)
    }

    fn parse_binary_expression_rest(&mut self, precedence: u8, start_pos: u32, mut left: NodeIndex) -> NodeIndex {
        loop {
            self.re_scan(ScannerState::re_scan_greater_token);
            let operator = self.token();
            let new_precedence = self.binary_operator_precedence(operator);
            if new_precedence == 0 {
                break;
            }
            // `**` is right-associative
            let consume = if operator == SyntaxKind::AsteriskAsteriskToken {
                new_precedence >= precedence
            } else {
                new_precedence > precedence
            };
            if !consume {
                break;
            }
            if operator == SyntaxKind::InKeyword && self.context_flags & CONTEXT_FLAG_DISALLOW_IN != 0 {
                break;
            }

            if matches!(operator, SyntaxKind::AsKeyword | SyntaxKind::SatisfiesKeyword) {
                if self.has_preceding_line_break() {
                    break;
                }
                self.next_token();
                let type_node = if operator == SyntaxKind::AsKeyword && self.is_token(SyntaxKind::ConstKeyword) {
                    self.parse_token_node()
                } else {
                    self.parse_type()
                };
                let kind = if operator == SyntaxKind::AsKeyword {
                    syntax_kind_ext::AS_EXPRESSION
                } else {
                    syntax_kind_ext::SATISFIES_EXPRESSION
                };
                left = self.finish_node(kind, start_pos, vec![left, type_node]);
                continue;
            }

            self.next_token();
            let right = self.parse_binary_expression_or_higher(new_precedence);
            left = self.finish_node(syntax_kind_ext::BINARY_EXPRESSION, start_pos, vec![left, right]);
        }
        left
    }

    pub(crate) fn parse_unary_expression_or_higher(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier("Expression expected.");
        }
        let result = self.parse_unary_expression_worker();
        self.exit_recursion();
        result
    }

    fn parse_unary_expression_worker(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let prefix_kind = match self.token() {
            SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken => Some(syntax_kind_ext::PREFIX_UNARY_EXPRESSION),
            SyntaxKind::DeleteKeyword => Some(syntax_kind_ext::DELETE_EXPRESSION),
            SyntaxKind::TypeOfKeyword => Some(syntax_kind_ext::TYPE_OF_EXPRESSION),
            SyntaxKind::VoidKeyword => Some(syntax_kind_ext::VOID_EXPRESSION),
            SyntaxKind::AwaitKeyword if self.look_ahead(Self::next_token_starts_await_operand) => {
                Some(syntax_kind_ext::AWAIT_EXPRESSION)
            }
            _ => None,
        };

        if let Some(kind) = prefix_kind {
            self.next_token();
            let operand = self.parse_unary_expression_or_higher();
            return self.finish_node(kind, start_pos, vec![operand]);
        }

        // `<T>expr` type assertion; in JSX files `<` starts markup instead
        if self.is_token(SyntaxKind::LessThanToken) && !self.in_jsx_context() {
            self.next_token();
            let type_node = self.parse_type();
            self.parse_expected(SyntaxKind::GreaterThanToken);
            let expression = self.parse_unary_expression_or_higher();
            return self.finish_node(syntax_kind_ext::TYPE_ASSERTION, start_pos, vec![type_node, expression]);
        }

        let expression = self.parse_left_hand_side_expression_or_higher();
        if matches!(self.token(), SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken)
            && !self.has_preceding_line_break()
        {
            self.next_token();
            return self.finish_node(syntax_kind_ext::POSTFIX_UNARY_EXPRESSION, start_pos, vec![expression]);
        }
        expression
    }

    fn next_token_starts_await_operand(&mut self) -> bool {
        self.next_token_is_on_same_line() && self.is_start_of_expression()
    }

    /// Whether the current token can begin an expression.
    pub(crate) fn is_start_of_expression(&self) -> bool {
        match self.token() {
            SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateHead
            | SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::NewKeyword
            | SyntaxKind::SlashToken
            | SyntaxKind::SlashEqualsToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::TildeToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::DeleteKeyword
            | SyntaxKind::TypeOfKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::ImportKeyword
            | SyntaxKind::PrivateIdentifier
            | SyntaxKind::AtToken => true,
            kind => kind.is_identifier_like(),
        }
    }

    // =========================================================================
    // Member access and calls
    // =========================================================================

    pub(crate) fn parse_left_hand_side_expression_or_higher(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let expression = match self.token() {
            SyntaxKind::ImportKeyword | SyntaxKind::SuperKeyword => self.parse_token_node(),
            _ => self.parse_primary_expression(),
        };
        self.parse_member_expression_rest(start_pos, expression, true)
    }

    /// Property/element access, non-null assertions, tagged templates and,
    /// when `allow_calls`, call expressions and instantiation expressions.
    pub(crate) fn parse_member_expression_rest(
        &mut self,
        start_pos: u32,
        mut expression: NodeIndex,
        allow_calls: bool,
    ) -> NodeIndex {
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    expression = self.finish_node(
                        syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION,
                        start_pos,
                        vec![expression, name],
                    );
                }
                SyntaxKind::QuestionDotToken => {
                    self.next_token();
                    if self.is_token(SyntaxKind::OpenBracketToken) {
                        expression = self.parse_element_access_rest(start_pos, expression);
                    } else if self.is_token(SyntaxKind::OpenParenToken) {
                        let mut children = vec![expression];
                        children.extend(self.parse_argument_list());
                        expression = self.finish_node(syntax_kind_ext::CALL_EXPRESSION, start_pos, children);
                    } else if self.is_token(SyntaxKind::LessThanToken) {
                        let mut children = vec![expression];
                        if let Some(type_arguments) = self.try_parse_type_arguments_in_expression() {
                            children.extend(type_arguments);
                        }
                        children.extend(self.parse_argument_list());
                        expression = self.finish_node(syntax_kind_ext::CALL_EXPRESSION, start_pos, children);
                    } else {
                        let name = self.parse_identifier_name();
                        expression = self.finish_node(
                            syntax_kind_ext::PROPERTY_ACCESS_EXPRESSION,
                            start_pos,
                            vec![expression, name],
                        );
                    }
                }
                SyntaxKind::ExclamationToken if !self.has_preceding_line_break() => {
                    self.next_token();
                    expression = self.finish_node(syntax_kind_ext::NON_NULL_EXPRESSION, start_pos, vec![expression]);
                }
                SyntaxKind::OpenBracketToken => {
                    expression = self.parse_element_access_rest(start_pos, expression);
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    let template = self.parse_template_literal();
                    expression = self.finish_node(
                        syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION,
                        start_pos,
                        vec![expression, template],
                    );
                }
                SyntaxKind::OpenParenToken if allow_calls => {
                    let mut children = vec![expression];
                    children.extend(self.parse_argument_list());
                    expression = self.finish_node(syntax_kind_ext::CALL_EXPRESSION, start_pos, children);
                }
                SyntaxKind::LessThanToken if allow_calls => {
                    let Some(type_arguments) = self.try_parse_type_arguments_in_expression() else {
                        break;
                    };
                    let mut children = vec![expression];
                    children.extend(type_arguments);
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        children.extend(self.parse_argument_list());
                        expression = self.finish_node(syntax_kind_ext::CALL_EXPRESSION, start_pos, children);
                    } else if self.token().is_template_start() {
                        children.push(self.parse_template_literal());
                        expression =
                            self.finish_node(syntax_kind_ext::TAGGED_TEMPLATE_EXPRESSION, start_pos, children);
                    } else {
                        expression =
                            self.finish_node(syntax_kind_ext::EXPRESSION_WITH_TYPE_ARGUMENTS, start_pos, children);
                    }
                }
                _ => break,
            }
        }
        expression
    }

    fn parse_element_access_rest(&mut self, start_pos: u32, expression: NodeIndex) -> NodeIndex {
        self.next_token(); // [
        let argument = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(
            syntax_kind_ext::ELEMENT_ACCESS_EXPRESSION,
            start_pos,
            vec![expression, argument],
        )
    }

    /// `(a, ...b)`
    pub(crate) fn parse_argument_list(&mut self) -> Vec<NodeIndex> {
        let mut arguments = Vec::new();
        self.parse_expected(SyntaxKind::OpenParenToken);
        while !self.is_token(SyntaxKind::CloseParenToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            arguments.push(self.parse_spread_or_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        arguments
    }

    fn parse_spread_or_assignment_expression(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::DotDotDotToken) {
            let start_pos = self.token_pos();
            self.next_token();
            let expression = self.parse_assignment_expression_allow_in();
            return self.finish_node(syntax_kind_ext::SPREAD_ELEMENT, start_pos, vec![expression]);
        }
        self.parse_assignment_expression_allow_in()
    }

    /// `f<T>` in expression position; rewinds unless what follows the `>`
    /// confirms a type argument list.
    pub(crate) fn try_parse_type_arguments_in_expression(&mut self) -> Option<Vec<NodeIndex>> {
        self.try_parse(|p| {
            if !p.parse_optional(SyntaxKind::LessThanToken) {
                return None;
            }
            let mut arguments = Vec::new();
            loop {
                arguments.push(p.parse_type());
                if !p.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            if !p.parse_optional(SyntaxKind::GreaterThanToken) {
                return None;
            }
            p.can_follow_type_arguments_in_expression().then_some(arguments)
        })
    }

    fn can_follow_type_arguments_in_expression(&self) -> bool {
        match self.token() {
            SyntaxKind::OpenParenToken
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateHead => true,
            SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken => false,
            kind => {
                self.has_preceding_line_break()
                    || self.binary_operator_precedence(kind) > 0
                    || !self.is_start_of_expression()
            }
        }
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    pub(crate) fn parse_primary_expression(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::PrivateIdentifier => self.parse_token_node(),
            SyntaxKind::TemplateHead => self.parse_template_literal(),
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal_expression(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal_expression(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(),
            SyntaxKind::AsyncKeyword
                if self.look_ahead(|p| {
                    p.next_token_is_on_same_line() && p.is_token(SyntaxKind::FunctionKeyword)
                }) =>
            {
                self.parse_function_expression()
            }
            SyntaxKind::ClassKeyword | SyntaxKind::AtToken => self.parse_class_expression(),
            SyntaxKind::NewKeyword => self.parse_new_expression(),
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.re_scan(ScannerState::re_scan_slash_token);
                self.parse_token_node()
            }
            SyntaxKind::LessThanToken if self.in_jsx_context() => self.parse_jsx_element_or_fragment(false),
            _ if self.is_identifier() => self.parse_identifier(),
            _ => self.create_missing_identifier("Expression expected."),
        }
    }

    fn parse_parenthesized_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let expression = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.finish_node(syntax_kind_ext::PARENTHESIZED_EXPRESSION, start_pos, vec![expression])
    }

    fn parse_array_literal_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            // Holes have no node of their own
            if self.parse_optional(SyntaxKind::CommaToken) {
                continue;
            }
            let pos_before = self.token_pos();
            elements.push(self.parse_spread_or_assignment_expression());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(syntax_kind_ext::ARRAY_LITERAL_EXPRESSION, start_pos, elements)
    }

    fn parse_object_literal_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            properties.push(self.parse_object_literal_element());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::OBJECT_LITERAL_EXPRESSION, start_pos, properties)
    }

    fn parse_object_literal_element(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();

        if self.parse_optional(SyntaxKind::DotDotDotToken) {
            let expression = self.parse_assignment_expression_allow_in();
            return self.finish_node(syntax_kind_ext::SPREAD_ASSIGNMENT, start_pos, vec![expression]);
        }

        let mut children = Vec::new();
        let mut accessor_kind = None;
        let mut is_method = false;

        if matches!(
            self.token(),
            SyntaxKind::AsyncKeyword | SyntaxKind::GetKeyword | SyntaxKind::SetKeyword
        ) && self.look_ahead(Self::next_token_is_property_name_on_same_line)
        {
            accessor_kind = match self.token() {
                SyntaxKind::GetKeyword => Some(syntax_kind_ext::GET_ACCESSOR),
                SyntaxKind::SetKeyword => Some(syntax_kind_ext::SET_ACCESSOR),
                _ => {
                    is_method = true;
                    None
                }
            };
            children.push(self.parse_token_node());
        }
        if self.is_token(SyntaxKind::AsteriskToken) {
            is_method = true;
            children.push(self.parse_token_node());
        }

        children.push(self.parse_property_name());

        if let Some(kind) = accessor_kind {
            self.parse_function_signature(&mut children);
            children.push(self.parse_function_block());
            return self.finish_node(kind, start_pos, children);
        }

        if is_method
            || self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            self.parse_function_signature(&mut children);
            children.push(self.parse_function_block());
            return self.finish_node(syntax_kind_ext::METHOD_DECLARATION, start_pos, children);
        }

        // `?` / `!` are only valid in patterns and error recovery
        if matches!(self.token(), SyntaxKind::QuestionToken | SyntaxKind::ExclamationToken) {
            self.next_token();
        }

        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_assignment_expression_allow_in());
            return self.finish_node(syntax_kind_ext::PROPERTY_ASSIGNMENT, start_pos, children);
        }

        // Shorthand, optionally with a cover-grammar initializer `{ a = 1 } = o`
        if self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(self.parse_assignment_expression_allow_in());
        }
        self.finish_node(syntax_kind_ext::SHORTHAND_PROPERTY_ASSIGNMENT, start_pos, children)
    }

    pub(crate) fn next_token_is_property_name_on_same_line(&mut self) -> bool {
        self.next_token_is_on_same_line()
            && (self.is_property_name_start() || self.is_token(SyntaxKind::AsteriskToken))
    }

    pub(crate) fn is_property_name_start(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::PrivateIdentifier
                | SyntaxKind::OpenBracketToken
        ) || self.is_identifier_or_keyword()
    }

    pub(crate) fn parse_property_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::PrivateIdentifier
            | SyntaxKind::NoSubstitutionTemplateLiteral => self.parse_token_node(),
            SyntaxKind::OpenBracketToken => {
                let start_pos = self.token_pos();
                self.next_token();
                let expression = self.parse_assignment_expression_allow_in();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                self.finish_node(syntax_kind_ext::COMPUTED_PROPERTY_NAME, start_pos, vec![expression])
            }
            _ => self.parse_identifier_name(),
        }
    }

    /// `` `a${b}c` `` or a no-substitution template.
    pub(crate) fn parse_template_literal(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::NoSubstitutionTemplateLiteral) {
            return self.parse_token_node();
        }

        let start_pos = self.token_pos();
        let mut children = vec![self.parse_token_node()];
        loop {
            let span_start = self.token_pos();
            let expression = self.parse_expression_allow_in();
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_error_at_current_token("'}' expected.");
                children.push(self.finish_node(syntax_kind_ext::TEMPLATE_SPAN, span_start, vec![expression]));
                break;
            }
            let literal_kind = self.re_scan(ScannerState::re_scan_template_token);
            let literal = self.parse_token_node();
            children.push(self.finish_node(
                syntax_kind_ext::TEMPLATE_SPAN,
                span_start,
                vec![expression, literal],
            ));
            if literal_kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        self.finish_node(syntax_kind_ext::TEMPLATE_EXPRESSION, start_pos, children)
    }

    fn parse_function_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = Vec::new();
        if self.is_token(SyntaxKind::AsyncKeyword) {
            children.push(self.parse_token_node());
        }
        self.parse_expected(SyntaxKind::FunctionKeyword);
        if self.is_token(SyntaxKind::AsteriskToken) {
            children.push(self.parse_token_node());
        }
        if self.is_identifier() {
            children.push(self.parse_identifier());
        }
        self.parse_function_signature(&mut children);
        children.push(self.parse_function_block());
        self.finish_node(syntax_kind_ext::FUNCTION_EXPRESSION, start_pos, children)
    }

    fn parse_class_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let children = self.parse_decorators();
        self.parse_class_rest(syntax_kind_ext::CLASS_EXPRESSION, start_pos, children)
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // new

        if self.parse_optional(SyntaxKind::DotToken) {
            let name = self.parse_identifier_name();
            return self.finish_node(syntax_kind_ext::META_PROPERTY, start_pos, vec![name]);
        }

        let callee_start = self.token_pos();
        let callee = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        let callee = self.parse_member_expression_rest(callee_start, callee, false);

        let mut children = vec![callee];
        if self.is_token(SyntaxKind::LessThanToken) {
            if let Some(type_arguments) = self.try_parse_type_arguments_in_expression() {
                children.extend(type_arguments);
            }
        }
        if self.is_token(SyntaxKind::OpenParenToken) {
            children.extend(self.parse_argument_list());
        }
        self.finish_node(syntax_kind_ext::NEW_EXPRESSION, start_pos, children)
    }

    /// `@expr` decorators before a class, member or parameter.
    pub(crate) fn parse_decorators(&mut self) -> Vec<NodeIndex> {
        let mut decorators = Vec::new();
        while self.is_token(SyntaxKind::AtToken) {
            let start_pos = self.token_pos();
            self.next_token();
            let expression = self.parse_left_hand_side_expression_or_higher();
            decorators.push(self.finish_node(syntax_kind_ext::DECORATOR, start_pos, vec![expression]));
        }
        decorators
    }
}
