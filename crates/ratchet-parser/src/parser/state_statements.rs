//! Parser state - source file, statement and declaration parsing methods

use ratchet_scanner::SyntaxKind;
use tracing::trace;

use super::base::NodeIndex;
use super::state::{CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, CONTEXT_FLAG_DISALLOW_IN, ParserState};
use super::syntax_kind_ext;

impl ParserState {
    // =========================================================================
    // Parse Methods - Source File
    // =========================================================================

    /// Parse the whole file and link parents. The root spans the entire text.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let statements = self.parse_statement_list(false);
        let end = self.scanner.source_text().len() as u32;
        let root = self
            .arena
            .add_node(syntax_kind_ext::SOURCE_FILE, 0, end, statements);
        self.arena.link_parents(root);
        trace!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.parse_diagnostics.len(),
            "parsed source file"
        );
        root
    }

    /// Statements up to end of file, or up to `}` when `in_block`.
    fn parse_statement_list(&mut self, in_block: bool) -> Vec<NodeIndex> {
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken)
            && !(in_block && self.is_token(SyntaxKind::CloseBraceToken))
        {
            let pos_before = self.token_pos();
            let statement = self.parse_statement();
            if self.token_pos() == pos_before {
                // No progress: skip the offending token.
                self.parse_error_at_current_token("Declaration or statement expected.");
                self.next_token();
                continue;
            }
            statements.push(statement);
        }
        statements
    }

    // =========================================================================
    // Parse Methods - Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            let start_pos = self.token_pos();
            return self.finish_node(syntax_kind_ext::EMPTY_STATEMENT, start_pos, Vec::new());
        }
        let result = self.parse_statement_worker();
        self.exit_recursion();
        result
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                self.finish_node(syntax_kind_ext::EMPTY_STATEMENT, start_pos, Vec::new())
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword => self.parse_break_or_continue(syntax_kind_ext::CONTINUE_STATEMENT),
            SyntaxKind::BreakKeyword => self.parse_break_or_continue(syntax_kind_ext::BREAK_STATEMENT),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WithKeyword => self.parse_with_statement(),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DebuggerKeyword => {
                self.next_token();
                self.parse_semicolon();
                self.finish_node(syntax_kind_ext::DEBUGGER_STATEMENT, start_pos, Vec::new())
            }
            SyntaxKind::AtToken => self.parse_declaration(),
            _ if self.look_ahead(Self::is_start_of_declaration) => self.parse_declaration(),
            _ if self.is_identifier()
                && self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::ColonToken)
                }) =>
            {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return self.finish_node(syntax_kind_ext::BLOCK, start_pos, Vec::new());
        }
        let statements = self.parse_statement_list(true);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::BLOCK, start_pos, statements)
    }

    /// Function, method and accessor bodies.
    pub(crate) fn parse_function_block(&mut self) -> NodeIndex {
        let saved = self.context_flags;
        self.context_flags &= !(CONTEXT_FLAG_DISALLOW_IN | CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES);
        let block = self.parse_block();
        self.context_flags = saved;
        block
    }

    /// Body when present, otherwise the `;` ending an overload or ambient
    /// signature.
    fn parse_function_block_or_semicolon(&mut self, children: &mut Vec<NodeIndex>) {
        if self.is_token(SyntaxKind::OpenBraceToken) {
            children.push(self.parse_function_block());
        } else {
            self.parse_semicolon();
        }
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let expression = self.parse_expression_allow_in();
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::EXPRESSION_STATEMENT, start_pos, vec![expression])
    }

    fn parse_labeled_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let label = self.parse_identifier();
        self.next_token(); // :
        let statement = self.parse_statement();
        self.finish_node(syntax_kind_ext::LABELED_STATEMENT, start_pos, vec![label, statement])
    }

    /// `(expr)` as used by `if`, `while`, `with` and `switch`.
    fn parse_parenthesized_condition(&mut self) -> NodeIndex {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);
        condition
    }

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // if
        let mut children = vec![self.parse_parenthesized_condition()];
        children.push(self.parse_statement());
        if self.parse_optional(SyntaxKind::ElseKeyword) {
            children.push(self.parse_statement());
        }
        self.finish_node(syntax_kind_ext::IF_STATEMENT, start_pos, children)
    }

    fn parse_do_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // do
        let body = self.parse_statement();
        self.parse_expected(SyntaxKind::WhileKeyword);
        let condition = self.parse_parenthesized_condition();
        // ASI after `do ... while (x)` always applies
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.finish_node(syntax_kind_ext::DO_STATEMENT, start_pos, vec![body, condition])
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // while
        let condition = self.parse_parenthesized_condition();
        let body = self.parse_statement();
        self.finish_node(syntax_kind_ext::WHILE_STATEMENT, start_pos, vec![condition, body])
    }

    fn parse_with_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // with
        let object = self.parse_parenthesized_condition();
        let body = self.parse_statement();
        self.finish_node(syntax_kind_ext::WITH_STATEMENT, start_pos, vec![object, body])
    }

    /// `for (;;)`, `for (x in o)`, `for (x of xs)` and `for await (x of xs)`.
    fn parse_for_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // for
        let mut children = Vec::new();
        if self.is_token(SyntaxKind::AwaitKeyword) {
            children.push(self.parse_token_node());
        }
        self.parse_expected(SyntaxKind::OpenParenToken);

        let initializer = if self.is_token(SyntaxKind::SemicolonToken) {
            None
        } else if self.is_start_of_variable_declaration_list() {
            Some(self.with_context(CONTEXT_FLAG_DISALLOW_IN, true, Self::parse_variable_declaration_list))
        } else {
            Some(self.with_context(CONTEXT_FLAG_DISALLOW_IN, true, Self::parse_expression))
        };
        children.extend(initializer);

        let kind = if initializer.is_some() && self.parse_optional(SyntaxKind::OfKeyword) {
            children.push(self.parse_assignment_expression_allow_in());
            syntax_kind_ext::FOR_OF_STATEMENT
        } else if initializer.is_some() && self.parse_optional(SyntaxKind::InKeyword) {
            children.push(self.parse_expression_allow_in());
            syntax_kind_ext::FOR_IN_STATEMENT
        } else {
            self.parse_expected(SyntaxKind::SemicolonToken);
            if !self.is_token(SyntaxKind::SemicolonToken) && !self.is_token(SyntaxKind::CloseParenToken) {
                children.push(self.parse_expression_allow_in());
            }
            self.parse_expected(SyntaxKind::SemicolonToken);
            if !self.is_token(SyntaxKind::CloseParenToken) {
                children.push(self.parse_expression_allow_in());
            }
            syntax_kind_ext::FOR_STATEMENT
        };

        self.parse_expected(SyntaxKind::CloseParenToken);
        children.push(self.parse_statement());
        self.finish_node(kind, start_pos, children)
    }

    fn parse_break_or_continue(&mut self, kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let mut children = Vec::new();
        if !self.can_parse_semicolon() && self.is_identifier() {
            children.push(self.parse_identifier());
        }
        self.parse_semicolon();
        self.finish_node(kind, start_pos, children)
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // return
        let mut children = Vec::new();
        if !self.can_parse_semicolon() {
            children.push(self.parse_expression_allow_in());
        }
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::RETURN_STATEMENT, start_pos, children)
    }

    fn parse_throw_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // throw
        let mut children = Vec::new();
        if self.has_preceding_line_break() {
            self.parse_error_at_current_token("Line break not permitted here.");
        }
        if !self.can_parse_semicolon() || self.has_preceding_line_break() {
            children.push(self.parse_expression_allow_in());
        }
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::THROW_STATEMENT, start_pos, children)
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // switch
        let expression = self.parse_parenthesized_condition();

        let block_start = self.token_pos();
        let mut clauses = Vec::new();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let clause_start = self.token_pos();
            let (kind, mut children) = if self.parse_optional(SyntaxKind::CaseKeyword) {
                (syntax_kind_ext::CASE_CLAUSE, vec![self.parse_expression_allow_in()])
            } else if self.parse_optional(SyntaxKind::DefaultKeyword) {
                (syntax_kind_ext::DEFAULT_CLAUSE, Vec::new())
            } else {
                self.parse_error_at_current_token("'case' or 'default' expected.");
                self.next_token();
                continue;
            };
            self.parse_expected(SyntaxKind::ColonToken);
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                let pos_before = self.token_pos();
                let statement = self.parse_statement();
                if self.token_pos() == pos_before {
                    self.parse_error_at_current_token("Declaration or statement expected.");
                    self.next_token();
                    continue;
                }
                children.push(statement);
            }
            clauses.push(self.finish_node(kind, clause_start, children));
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let case_block = self.finish_node(syntax_kind_ext::CASE_BLOCK, block_start, clauses);

        self.finish_node(syntax_kind_ext::SWITCH_STATEMENT, start_pos, vec![expression, case_block])
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // try
        let mut children = vec![self.parse_block()];

        if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_start = self.token_pos();
            self.next_token();
            let mut catch_children = Vec::new();
            if self.parse_optional(SyntaxKind::OpenParenToken) {
                let declaration_start = self.token_pos();
                let mut declaration = vec![self.parse_binding_name()];
                if self.parse_optional(SyntaxKind::ColonToken) {
                    declaration.push(self.parse_type());
                }
                catch_children.push(self.finish_node(
                    syntax_kind_ext::VARIABLE_DECLARATION,
                    declaration_start,
                    declaration,
                ));
                self.parse_expected(SyntaxKind::CloseParenToken);
            }
            catch_children.push(self.parse_block());
            children.push(self.finish_node(syntax_kind_ext::CATCH_CLAUSE, catch_start, catch_children));
        }

        if self.parse_optional(SyntaxKind::FinallyKeyword) {
            children.push(self.parse_block());
        } else if children.len() == 1 {
            self.parse_error_at_current_token("'catch' or 'finally' expected.");
        }
        self.finish_node(syntax_kind_ext::TRY_STATEMENT, start_pos, children)
    }

    // =========================================================================
    // Parse Methods - Variables and binding patterns
    // =========================================================================

    fn is_start_of_variable_declaration_list(&mut self) -> bool {
        match self.token() {
            SyntaxKind::VarKeyword | SyntaxKind::ConstKeyword => true,
            SyntaxKind::LetKeyword => self.look_ahead(|p| {
                p.next_token();
                p.is_identifier() || p.is_token(SyntaxKind::OpenBracketToken) || p.is_token(SyntaxKind::OpenBraceToken)
            }),
            SyntaxKind::UsingKeyword => self.look_ahead(|p| p.next_token_is_on_same_line() && p.is_identifier()),
            SyntaxKind::AwaitKeyword => self.look_ahead(|p| {
                p.next_token_is_on_same_line()
                    && p.is_token(SyntaxKind::UsingKeyword)
                    && p.next_token_is_on_same_line()
                    && p.is_identifier()
            }),
            _ => false,
        }
    }

    /// `var`/`let`/`const`/`using`/`await using` followed by declarations.
    pub(crate) fn parse_variable_declaration_list(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        if self.parse_optional(SyntaxKind::AwaitKeyword) {
            self.parse_expected(SyntaxKind::UsingKeyword);
        } else {
            self.next_token(); // var, let, const or using
        }

        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declaration());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.finish_node(syntax_kind_ext::VARIABLE_DECLARATION_LIST, start_pos, declarations)
    }

    fn parse_variable_declaration(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = vec![self.parse_binding_name()];
        // Definite assignment `let x!: T`
        if !self.has_preceding_line_break() {
            self.parse_optional(SyntaxKind::ExclamationToken);
        }
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type());
        }
        if self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(self.parse_assignment_expression_or_higher());
        }
        self.finish_node(syntax_kind_ext::VARIABLE_DECLARATION, start_pos, children)
    }

    fn parse_variable_statement(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        children.push(self.parse_variable_declaration_list());
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::VARIABLE_STATEMENT, start_pos, children)
    }

    /// Identifier, `{ ... }` or `[ ... ]` binding target.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => self.parse_identifier(),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let element_start = self.token_pos();
            let mut children = Vec::new();
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                children.push(self.parse_identifier());
            } else {
                let name = self.parse_property_name();
                children.push(name);
                if self.parse_optional(SyntaxKind::ColonToken) {
                    children.push(self.parse_binding_name());
                }
                if self.parse_optional(SyntaxKind::EqualsToken) {
                    children.push(self.parse_assignment_expression_allow_in());
                }
            }
            elements.push(self.finish_node(syntax_kind_ext::BINDING_ELEMENT, element_start, children));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::OBJECT_BINDING_PATTERN, start_pos, elements)
    }

    fn parse_array_binding_pattern(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // [
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            // Holes produce no node
            if self.parse_optional(SyntaxKind::CommaToken) {
                continue;
            }
            let element_start = self.token_pos();
            self.parse_optional(SyntaxKind::DotDotDotToken);
            let mut children = vec![self.parse_binding_name()];
            if self.parse_optional(SyntaxKind::EqualsToken) {
                children.push(self.parse_assignment_expression_allow_in());
            }
            elements.push(self.finish_node(syntax_kind_ext::BINDING_ELEMENT, element_start, children));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(syntax_kind_ext::ARRAY_BINDING_PATTERN, start_pos, elements)
    }

    // =========================================================================
    // Parse Methods - Parameters and signatures
    // =========================================================================

    pub(crate) fn token_is_parameter_modifier(&self) -> bool {
        matches!(
            self.token(),
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::OverrideKeyword
        )
    }

    /// `( a, b?: T, ...rest )`
    pub(crate) fn parse_parameter_list(&mut self) -> Vec<NodeIndex> {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return parameters;
        }
        let saved = self.context_flags;
        self.context_flags &= !(CONTEXT_FLAG_DISALLOW_IN | CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES);
        while !self.is_token(SyntaxKind::CloseParenToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            parameters.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.context_flags = saved;
        self.parse_expected(SyntaxKind::CloseParenToken);
        parameters
    }

    pub(crate) fn parse_parameter(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = self.parse_decorators();
        while self.token_is_parameter_modifier()
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier()
                    || p.is_token(SyntaxKind::OpenBraceToken)
                    || p.is_token(SyntaxKind::OpenBracketToken)
                    || p.token_is_parameter_modifier()
            })
        {
            children.push(self.parse_token_node());
        }
        self.parse_optional(SyntaxKind::DotDotDotToken);
        if self.is_token(SyntaxKind::ThisKeyword) {
            children.push(self.parse_token_node_as(SyntaxKind::Identifier as u16));
        } else {
            children.push(self.parse_binding_name());
        }
        self.parse_optional(SyntaxKind::QuestionToken);
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type());
        }
        if self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(self.parse_assignment_expression_allow_in());
        }
        self.finish_node(syntax_kind_ext::PARAMETER, start_pos, children)
    }

    /// Type parameters, parameters and return type, appended to `children`.
    pub(crate) fn parse_function_signature(&mut self, children: &mut Vec<NodeIndex>) {
        if self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_parameters());
        }
        children.extend(self.parse_parameter_list());
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type_or_type_predicate());
        }
    }

    // =========================================================================
    // Parse Methods - Declarations
    // =========================================================================

    fn is_modifier_kind(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::OverrideKeyword
                | SyntaxKind::AccessorKeyword
                | SyntaxKind::ExportKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::ConstKeyword
        )
    }

    /// Whether the current modifier keyword is followed by something it can
    /// modify, rather than being used as a name.
    fn next_token_can_follow_modifier(&mut self) -> bool {
        match self.token() {
            SyntaxKind::ConstKeyword => {
                self.next_token();
                self.is_token(SyntaxKind::EnumKeyword)
            }
            SyntaxKind::ExportKeyword => {
                self.next_token();
                !matches!(
                    self.token(),
                    SyntaxKind::EqualsToken
                        | SyntaxKind::AsteriskToken
                        | SyntaxKind::OpenBraceToken
                        | SyntaxKind::AsKeyword
                )
            }
            SyntaxKind::DefaultKeyword => {
                self.next_token();
                matches!(
                    self.token(),
                    SyntaxKind::ClassKeyword
                        | SyntaxKind::FunctionKeyword
                        | SyntaxKind::InterfaceKeyword
                        | SyntaxKind::AbstractKeyword
                        | SyntaxKind::AtToken
                ) || (self.is_token(SyntaxKind::AsyncKeyword)
                    && self.look_ahead(|p| {
                        p.next_token_is_on_same_line() && p.is_token(SyntaxKind::FunctionKeyword)
                    }))
            }
            SyntaxKind::StaticKeyword | SyntaxKind::AsyncKeyword | SyntaxKind::AccessorKeyword => {
                self.next_token_is_on_same_line()
                    && (self.is_property_name_start()
                        || self.is_token(SyntaxKind::AsteriskToken)
                        || self.is_token(SyntaxKind::AtToken))
            }
            _ => {
                self.next_token_is_on_same_line()
                    && (self.is_property_name_start()
                        || self.is_token(SyntaxKind::AsteriskToken)
                        || self.is_token(SyntaxKind::DotDotDotToken))
            }
        }
    }

    fn parse_modifiers(&mut self, children: &mut Vec<NodeIndex>) {
        while Self::is_modifier_kind(self.token()) && self.look_ahead(Self::next_token_can_follow_modifier) {
            children.push(self.parse_token_node());
        }
    }

    /// Look-ahead predicate: does a declaration (as opposed to an expression
    /// statement) start here?
    fn is_start_of_declaration(&mut self) -> bool {
        loop {
            match self.token() {
                SyntaxKind::VarKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::ClassKeyword
                | SyntaxKind::EnumKeyword => return true,
                SyntaxKind::ConstKeyword => {
                    return self.look_ahead(|p| {
                        p.next_token();
                        p.is_identifier()
                            || p.is_token(SyntaxKind::EnumKeyword)
                            || p.is_token(SyntaxKind::OpenBraceToken)
                            || p.is_token(SyntaxKind::OpenBracketToken)
                    });
                }
                SyntaxKind::LetKeyword | SyntaxKind::UsingKeyword | SyntaxKind::AwaitKeyword => {
                    return self.is_start_of_variable_declaration_list();
                }
                SyntaxKind::InterfaceKeyword | SyntaxKind::TypeKeyword => {
                    return self.next_token_is_on_same_line() && self.is_identifier();
                }
                SyntaxKind::ModuleKeyword | SyntaxKind::NamespaceKeyword => {
                    return self.next_token_is_on_same_line()
                        && (self.is_identifier() || self.is_token(SyntaxKind::StringLiteral));
                }
                SyntaxKind::GlobalKeyword => {
                    self.next_token();
                    return matches!(
                        self.token(),
                        SyntaxKind::OpenBraceToken | SyntaxKind::Identifier | SyntaxKind::ExportKeyword
                    );
                }
                SyntaxKind::ImportKeyword => {
                    self.next_token();
                    return !matches!(
                        self.token(),
                        SyntaxKind::OpenParenToken | SyntaxKind::DotToken | SyntaxKind::LessThanToken
                    );
                }
                SyntaxKind::ExportKeyword => {
                    self.next_token();
                    if matches!(
                        self.token(),
                        SyntaxKind::EqualsToken
                            | SyntaxKind::AsteriskToken
                            | SyntaxKind::OpenBraceToken
                            | SyntaxKind::DefaultKeyword
                            | SyntaxKind::AsKeyword
                            | SyntaxKind::AtToken
                    ) {
                        return true;
                    }
                    if self.is_token(SyntaxKind::TypeKeyword) {
                        return true;
                    }
                    continue;
                }
                SyntaxKind::AbstractKeyword
                | SyntaxKind::AccessorKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::PublicKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::OverrideKeyword => {
                    if !self.next_token_is_on_same_line() {
                        return false;
                    }
                    continue;
                }
                _ => return false,
            }
        }
    }

    /// Decorators and modifiers, then the declaration they apply to.
    fn parse_declaration(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();

        if self.is_token(SyntaxKind::ExportKeyword) && !self.look_ahead(Self::next_token_can_follow_modifier) {
            return self.parse_export_declaration(start_pos);
        }
        if self.is_token(SyntaxKind::ExportKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::DefaultKeyword) && !p.next_token_can_follow_modifier()
            })
        {
            return self.parse_export_default_assignment(start_pos);
        }
        if self.is_token(SyntaxKind::ExportKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::TypeKeyword)
                    && p.look_ahead(|q| {
                        q.next_token();
                        q.is_token(SyntaxKind::OpenBraceToken) || q.is_token(SyntaxKind::AsteriskToken)
                    })
            })
        {
            return self.parse_export_declaration(start_pos);
        }

        let mut children = self.parse_decorators();
        self.parse_modifiers(&mut children);

        match self.token() {
            SyntaxKind::VarKeyword
            | SyntaxKind::LetKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::UsingKeyword
            | SyntaxKind::AwaitKeyword => self.parse_variable_statement(start_pos, children),
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(start_pos, children),
            SyntaxKind::ClassKeyword => {
                self.parse_class_rest(syntax_kind_ext::CLASS_DECLARATION, start_pos, children)
            }
            SyntaxKind::InterfaceKeyword => self.parse_interface_declaration(start_pos, children),
            SyntaxKind::TypeKeyword => self.parse_type_alias_declaration(start_pos, children),
            SyntaxKind::EnumKeyword => self.parse_enum_declaration(start_pos, children),
            SyntaxKind::ModuleKeyword | SyntaxKind::NamespaceKeyword | SyntaxKind::GlobalKeyword => {
                self.parse_module_declaration(start_pos, children)
            }
            SyntaxKind::ImportKeyword => self.parse_import_declaration(start_pos, children),
            _ => {
                // Modifiers or decorators without a declaration
                self.parse_error_at_current_token("Declaration expected.");
                if children.is_empty() {
                    return self.parse_expression_statement();
                }
                self.finish_node(syntax_kind_ext::EXPRESSION_STATEMENT, start_pos, children)
            }
        }
    }

    fn parse_function_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // function
        if self.is_token(SyntaxKind::AsteriskToken) {
            children.push(self.parse_token_node());
        }
        if self.is_identifier() {
            children.push(self.parse_identifier());
        }
        self.parse_function_signature(&mut children);
        self.parse_function_block_or_semicolon(&mut children);
        self.finish_node(syntax_kind_ext::FUNCTION_DECLARATION, start_pos, children)
    }

    fn parse_interface_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // interface
        children.push(self.parse_identifier());
        if self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_parameters());
        }
        children.extend(self.parse_heritage_clauses());
        children.extend(self.parse_type_member_list());
        self.finish_node(syntax_kind_ext::INTERFACE_DECLARATION, start_pos, children)
    }

    fn parse_type_alias_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // type
        children.push(self.parse_identifier());
        if self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_parameters());
        }
        self.parse_expected(SyntaxKind::EqualsToken);
        children.push(self.parse_type());
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::TYPE_ALIAS_DECLARATION, start_pos, children)
    }

    fn parse_enum_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // enum
        children.push(self.parse_identifier());
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
                let member_start = self.token_pos();
                let mut member = vec![self.parse_property_name()];
                if self.parse_optional(SyntaxKind::EqualsToken) {
                    member.push(self.parse_assignment_expression_allow_in());
                }
                children.push(self.finish_node(syntax_kind_ext::ENUM_MEMBER, member_start, member));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.finish_node(syntax_kind_ext::ENUM_DECLARATION, start_pos, children)
    }

    /// `namespace A.B { }`, `module "m" { }`, `declare module "m";` and `global { }`.
    fn parse_module_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        if self.is_token(SyntaxKind::GlobalKeyword) {
            children.push(self.parse_token_node_as(SyntaxKind::Identifier as u16));
        } else {
            self.next_token(); // module or namespace
            if self.is_token(SyntaxKind::StringLiteral) {
                children.push(self.parse_token_node());
            } else {
                children.push(self.parse_identifier());
            }
        }
        self.parse_module_body(start_pos, children)
    }

    fn parse_module_body(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        if self.parse_optional(SyntaxKind::DotToken) {
            let nested_start = self.token_pos();
            let name = self.parse_identifier();
            children.push(self.parse_module_body(nested_start, vec![name]));
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            let block_start = self.token_pos();
            self.next_token();
            let statements = self.parse_statement_list(true);
            self.parse_expected(SyntaxKind::CloseBraceToken);
            children.push(self.finish_node(syntax_kind_ext::MODULE_BLOCK, block_start, statements));
        } else {
            self.parse_semicolon();
        }
        self.finish_node(syntax_kind_ext::MODULE_DECLARATION, start_pos, children)
    }

    // =========================================================================
    // Parse Methods - Classes
    // =========================================================================

    /// From `class` onwards; decorators and modifiers are already in `children`.
    pub(crate) fn parse_class_rest(&mut self, kind: u16, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        if self.is_identifier()
            && !self.is_token(SyntaxKind::ImplementsKeyword)
            && !self.is_token(SyntaxKind::ExtendsKeyword)
        {
            children.push(self.parse_identifier());
        }
        if self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_parameters());
        }
        children.extend(self.parse_heritage_clauses());

        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            let saved = self.context_flags;
            self.context_flags &= !(CONTEXT_FLAG_DISALLOW_IN | CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES);
            while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
                let pos_before = self.token_pos();
                let member = self.parse_class_member();
                if self.token_pos() == pos_before {
                    self.parse_error_at_current_token("Declaration or statement expected.");
                    self.next_token();
                    continue;
                }
                children.push(member);
            }
            self.context_flags = saved;
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        self.finish_node(kind, start_pos, children)
    }

    /// `extends A<T>, B` / `implements C` clauses of classes and interfaces.
    fn parse_heritage_clauses(&mut self) -> Vec<NodeIndex> {
        let mut clauses = Vec::new();
        while matches!(self.token(), SyntaxKind::ExtendsKeyword | SyntaxKind::ImplementsKeyword) {
            let clause_start = self.token_pos();
            self.next_token();
            let mut types = Vec::new();
            loop {
                let type_start = self.token_pos();
                let mut children = vec![self.parse_left_hand_side_expression_or_higher()];
                if self.is_token(SyntaxKind::LessThanToken) {
                    children.extend(self.parse_type_arguments());
                }
                types.push(self.finish_node(
                    syntax_kind_ext::EXPRESSION_WITH_TYPE_ARGUMENTS,
                    type_start,
                    children,
                ));
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            clauses.push(self.finish_node(syntax_kind_ext::HERITAGE_CLAUSE, clause_start, types));
        }
        clauses
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();

        if self.is_token(SyntaxKind::SemicolonToken) {
            self.next_token();
            return self.finish_node(syntax_kind_ext::SEMICOLON_CLASS_ELEMENT, start_pos, Vec::new());
        }

        if self.is_token(SyntaxKind::StaticKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenBraceToken)
            })
        {
            self.next_token(); // static
            let body = self.parse_function_block();
            return self.finish_node(syntax_kind_ext::CLASS_STATIC_BLOCK_DECLARATION, start_pos, vec![body]);
        }

        let mut children = self.parse_decorators();
        self.parse_modifiers(&mut children);

        if self.is_token(SyntaxKind::ConstructorKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            self.next_token(); // constructor
            self.parse_function_signature(&mut children);
            self.parse_function_block_or_semicolon(&mut children);
            return self.finish_node(syntax_kind_ext::CONSTRUCTOR, start_pos, children);
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.look_ahead(Self::is_index_signature_start) {
            let signature = self.parse_index_signature(start_pos, children);
            self.parse_semicolon();
            return signature;
        }

        if matches!(self.token(), SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && self.look_ahead(Self::next_token_is_property_name_on_same_line)
        {
            let kind = if self.is_token(SyntaxKind::GetKeyword) {
                syntax_kind_ext::GET_ACCESSOR
            } else {
                syntax_kind_ext::SET_ACCESSOR
            };
            children.push(self.parse_token_node());
            children.push(self.parse_property_name());
            self.parse_function_signature(&mut children);
            self.parse_function_block_or_semicolon(&mut children);
            return self.finish_node(kind, start_pos, children);
        }

        let is_generator = self.is_token(SyntaxKind::AsteriskToken);
        if is_generator {
            children.push(self.parse_token_node());
        }

        children.push(self.parse_property_name());
        self.parse_optional(SyntaxKind::QuestionToken);

        if is_generator || self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            self.parse_function_signature(&mut children);
            self.parse_function_block_or_semicolon(&mut children);
            return self.finish_node(syntax_kind_ext::METHOD_DECLARATION, start_pos, children);
        }

        if !self.has_preceding_line_break() {
            self.parse_optional(SyntaxKind::ExclamationToken);
        }
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type());
        }
        if self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(self.parse_assignment_expression_allow_in());
        }
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::PROPERTY_DECLARATION, start_pos, children)
    }

    // =========================================================================
    // Parse Methods - Imports and exports
    // =========================================================================

    fn parse_import_declaration(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // import

        // import "m";
        if self.is_token(SyntaxKind::StringLiteral) {
            children.push(self.parse_token_node());
            self.parse_import_attributes(&mut children);
            self.parse_semicolon();
            return self.finish_node(syntax_kind_ext::IMPORT_DECLARATION, start_pos, children);
        }

        let clause_start = self.token_pos();
        let mut clause = Vec::new();
        if self.is_token(SyntaxKind::TypeKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                (p.is_identifier() && !p.is_token(SyntaxKind::FromKeyword))
                    || p.is_token(SyntaxKind::OpenBraceToken)
                    || p.is_token(SyntaxKind::AsteriskToken)
            })
        {
            clause.push(self.parse_token_node());
        }

        if self.is_identifier() {
            let name = self.parse_identifier();
            // import x = require("m") / import x = A.B
            if self.is_token(SyntaxKind::EqualsToken) {
                children.extend(clause);
                children.push(name);
                return self.parse_import_equals_rest(start_pos, children);
            }
            clause.push(name);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                return self.finish_import_declaration(start_pos, children, clause_start, clause);
            }
        }

        if self.is_token(SyntaxKind::AsteriskToken) {
            let namespace_start = self.token_pos();
            self.next_token();
            self.parse_expected(SyntaxKind::AsKeyword);
            let name = self.parse_identifier();
            clause.push(self.finish_node(syntax_kind_ext::NAMESPACE_IMPORT, namespace_start, vec![name]));
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            clause.push(self.parse_named_specifiers(
                syntax_kind_ext::NAMED_IMPORTS,
                syntax_kind_ext::IMPORT_SPECIFIER,
            ));
        } else {
            self.parse_error_at_current_token("Identifier expected.");
        }
        self.finish_import_declaration(start_pos, children, clause_start, clause)
    }

    fn finish_import_declaration(
        &mut self,
        start_pos: u32,
        mut children: Vec<NodeIndex>,
        clause_start: u32,
        clause: Vec<NodeIndex>,
    ) -> NodeIndex {
        children.push(self.finish_node(syntax_kind_ext::IMPORT_CLAUSE, clause_start, clause));
        self.parse_expected(SyntaxKind::FromKeyword);
        if self.is_token(SyntaxKind::StringLiteral) {
            children.push(self.parse_token_node());
        } else {
            self.parse_error_at_current_token("String literal expected.");
        }
        self.parse_import_attributes(&mut children);
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::IMPORT_DECLARATION, start_pos, children)
    }

    fn parse_import_equals_rest(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // =
        if self.is_token(SyntaxKind::RequireKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken)
            })
        {
            let reference_start = self.token_pos();
            self.next_token(); // require
            self.next_token(); // (
            let mut reference = Vec::new();
            if self.is_token(SyntaxKind::StringLiteral) {
                reference.push(self.parse_token_node());
            } else {
                self.parse_error_at_current_token("String literal expected.");
            }
            self.parse_expected(SyntaxKind::CloseParenToken);
            children.push(self.finish_node(
                syntax_kind_ext::EXTERNAL_MODULE_REFERENCE,
                reference_start,
                reference,
            ));
        } else {
            children.push(self.parse_entity_name());
        }
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::IMPORT_EQUALS_DECLARATION, start_pos, children)
    }

    /// `with { type: "json" }` (or the older `assert { ... }`).
    fn parse_import_attributes(&mut self, children: &mut Vec<NodeIndex>) {
        let is_assert = self.is_token(SyntaxKind::Identifier) && self.scanner.token_text() == "assert";
        if (self.is_token(SyntaxKind::WithKeyword) || is_assert) && !self.has_preceding_line_break()
        {
            self.next_token();
            if self.is_token(SyntaxKind::OpenBraceToken) {
                children.push(self.parse_primary_expression());
            } else {
                self.parse_error_at_current_token("'{' expected.");
            }
        }
    }

    /// `{ a, b as c, type d }` for imports and exports.
    fn parse_named_specifiers(&mut self, list_kind: u16, specifier_kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        let mut specifiers = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let specifier_start = self.token_pos();
            let mut children = Vec::new();
            if self.is_token(SyntaxKind::TypeKeyword) && self.look_ahead(Self::is_type_only_specifier) {
                children.push(self.parse_token_node());
            }
            children.push(self.parse_module_export_name());
            if self.parse_optional(SyntaxKind::AsKeyword) {
                children.push(self.parse_module_export_name());
            }
            specifiers.push(self.finish_node(specifier_kind, specifier_start, children));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(list_kind, start_pos, specifiers)
    }

    /// `type` in `{ type a }` or `{ type as as b }` is a modifier; in
    /// `{ type }` or `{ type as b }` it is the imported name.
    fn is_type_only_specifier(&mut self) -> bool {
        self.next_token();
        if self.is_token(SyntaxKind::AsKeyword) {
            self.next_token();
            return self.is_token(SyntaxKind::AsKeyword);
        }
        self.is_identifier_or_keyword() || self.is_token(SyntaxKind::StringLiteral)
    }

    fn parse_module_export_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            self.parse_token_node()
        } else {
            self.parse_identifier_name()
        }
    }

    /// `export = x`, `export * from "m"`, `export { a } from "m"`,
    /// `export type { a }`, `export as namespace N`.
    fn parse_export_declaration(&mut self, start_pos: u32) -> NodeIndex {
        self.next_token(); // export

        if self.parse_optional(SyntaxKind::EqualsToken) {
            let expression = self.parse_assignment_expression_allow_in();
            self.parse_semicolon();
            return self.finish_node(syntax_kind_ext::EXPORT_ASSIGNMENT, start_pos, vec![expression]);
        }

        if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_expected(SyntaxKind::NamespaceKeyword);
            let name = self.parse_identifier();
            self.parse_semicolon();
            return self.finish_node(syntax_kind_ext::NAMESPACE_EXPORT_DECLARATION, start_pos, vec![name]);
        }

        let mut children = Vec::new();
        if self.is_token(SyntaxKind::TypeKeyword) {
            children.push(self.parse_token_node());
        }

        if self.is_token(SyntaxKind::AsteriskToken) {
            let namespace_start = self.token_pos();
            self.next_token();
            if self.parse_optional(SyntaxKind::AsKeyword) {
                let name = self.parse_module_export_name();
                children.push(self.finish_node(syntax_kind_ext::NAMESPACE_EXPORT, namespace_start, vec![name]));
            }
            self.parse_expected(SyntaxKind::FromKeyword);
            if self.is_token(SyntaxKind::StringLiteral) {
                children.push(self.parse_token_node());
            } else {
                self.parse_error_at_current_token("String literal expected.");
            }
        } else {
            children.push(self.parse_named_specifiers(
                syntax_kind_ext::NAMED_EXPORTS,
                syntax_kind_ext::EXPORT_SPECIFIER,
            ));
            if self.parse_optional(SyntaxKind::FromKeyword) {
                if self.is_token(SyntaxKind::StringLiteral) {
                    children.push(self.parse_token_node());
                } else {
                    self.parse_error_at_current_token("String literal expected.");
                }
            }
        }
        self.parse_import_attributes(&mut children);
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::EXPORT_DECLARATION, start_pos, children)
    }

    /// `export default <expression>;`
    fn parse_export_default_assignment(&mut self, start_pos: u32) -> NodeIndex {
        self.next_token(); // export
        self.next_token(); // default
        let expression = self.parse_assignment_expression_allow_in();
        self.parse_semicolon();
        self.finish_node(syntax_kind_ext::EXPORT_ASSIGNMENT, start_pos, vec![expression])
    }
}
