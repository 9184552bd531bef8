//! Parser state - type parsing methods

use ratchet_scanner::{ScannerState, SyntaxKind};

use super::base::NodeIndex;
use super::state::{CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, ParserState};
use super::syntax_kind_ext;

impl ParserState {
    // =========================================================================
    // Parse Methods - Types
    // =========================================================================

    pub(crate) fn parse_type(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return self.create_missing_identifier("Type expected.");
        }
        let result = self.parse_type_worker();
        self.exit_recursion();
        result
    }

    /// Type inside brackets, parentheses or braces, where conditional types
    /// are always allowed again.
    pub(crate) fn parse_type_allow_conditional(&mut self) -> NodeIndex {
        self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, false, Self::parse_type)
    }

    fn parse_type_worker(&mut self) -> NodeIndex {
        if self.is_start_of_function_or_constructor_type() {
            return self.parse_function_or_constructor_type();
        }

        let start_pos = self.token_pos();
        let check_type = self.parse_union_type_or_higher();

        // A line break before `extends` prevents conditional type parsing.
        if !self.is_token(SyntaxKind::ExtendsKeyword)
            || self.has_preceding_line_break()
            || self.context_flags & CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES != 0
        {
            return check_type;
        }

        self.next_token(); // extends
        let extends_type = self.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, true, Self::parse_type);
        self.parse_expected(SyntaxKind::QuestionToken);
        let true_type = self.parse_type_allow_conditional();
        self.parse_expected(SyntaxKind::ColonToken);
        let false_type = self.parse_type_allow_conditional();

        self.finish_node(
            syntax_kind_ext::CONDITIONAL_TYPE,
            start_pos,
            vec![check_type, extends_type, true_type, false_type],
        )
    }

    /// Return type position: `x is T`, `asserts x`, `asserts x is T` or a type.
    pub(crate) fn parse_type_or_type_predicate(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();

        if self.is_token(SyntaxKind::AssertsKeyword)
            && self.look_ahead(|p| {
                p.next_token_is_on_same_line()
                    && (p.is_identifier() || p.is_token(SyntaxKind::ThisKeyword))
            })
        {
            let mut children = vec![self.parse_token_node()];
            children.push(self.parse_type_predicate_parameter_name());
            if self.is_token(SyntaxKind::IsKeyword) && !self.has_preceding_line_break() {
                self.next_token();
                children.push(self.parse_type());
            }
            return self.finish_node(syntax_kind_ext::TYPE_PREDICATE, start_pos, children);
        }

        if (self.is_identifier() || self.is_token(SyntaxKind::ThisKeyword))
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::IsKeyword) && !p.has_preceding_line_break()
            })
        {
            let name = self.parse_type_predicate_parameter_name();
            self.next_token(); // is
            let type_node = self.parse_type();
            return self.finish_node(syntax_kind_ext::TYPE_PREDICATE, start_pos, vec![name, type_node]);
        }

        self.parse_type()
    }

    fn parse_type_predicate_parameter_name(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::ThisKeyword) {
            self.parse_token_node_as(syntax_kind_ext::THIS_TYPE)
        } else {
            self.parse_identifier()
        }
    }

    // =========================================================================
    // Function and constructor types
    // =========================================================================

    fn is_start_of_function_or_constructor_type(&mut self) -> bool {
        match self.token() {
            SyntaxKind::LessThanToken | SyntaxKind::NewKeyword => true,
            SyntaxKind::OpenParenToken => self.look_ahead(Self::is_unambiguously_start_of_function_type),
            SyntaxKind::AbstractKeyword => self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::NewKeyword)
            }),
            _ => false,
        }
    }

    fn is_unambiguously_start_of_function_type(&mut self) -> bool {
        self.next_token(); // (
        if self.is_token(SyntaxKind::CloseParenToken) || self.is_token(SyntaxKind::DotDotDotToken) {
            return true;
        }
        if self.skip_parameter_start() {
            if matches!(
                self.token(),
                SyntaxKind::ColonToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::QuestionToken
                    | SyntaxKind::EqualsToken
            ) {
                return true;
            }
            if self.parse_optional(SyntaxKind::CloseParenToken)
                && self.is_token(SyntaxKind::EqualsGreaterThanToken)
            {
                return true;
            }
        }
        false
    }

    fn skip_parameter_start(&mut self) -> bool {
        while self.token_is_parameter_modifier() {
            self.next_token();
        }
        if self.is_identifier() || self.is_token(SyntaxKind::ThisKeyword) {
            self.next_token();
            return true;
        }
        if self.is_token(SyntaxKind::OpenBracketToken) || self.is_token(SyntaxKind::OpenBraceToken) {
            let diagnostics_before = self.parse_diagnostics.len();
            self.parse_binding_name();
            return self.parse_diagnostics.len() == diagnostics_before;
        }
        false
    }

    fn parse_function_or_constructor_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = Vec::new();
        if self.is_token(SyntaxKind::AbstractKeyword) {
            children.push(self.parse_token_node());
        }
        let kind = if self.parse_optional(SyntaxKind::NewKeyword) {
            syntax_kind_ext::CONSTRUCTOR_TYPE
        } else {
            syntax_kind_ext::FUNCTION_TYPE
        };
        if self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_parameters());
        }
        children.extend(self.parse_parameter_list());
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        children.push(self.with_context(
            CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES,
            false,
            Self::parse_type_or_type_predicate,
        ));
        self.finish_node(kind, start_pos, children)
    }

    // =========================================================================
    // Unions, intersections and operators
    // =========================================================================

    /// Parse union type: A | B | C
    fn parse_union_type_or_higher(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let has_leading_bar = self.parse_optional(SyntaxKind::BarToken);
        let first = self.parse_intersection_type_or_higher();
        if !has_leading_bar && !self.is_token(SyntaxKind::BarToken) {
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_type_or_higher());
        }
        self.finish_node(syntax_kind_ext::UNION_TYPE, start_pos, types)
    }

    /// Parse intersection type: A & B & C
    fn parse_intersection_type_or_higher(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let has_leading_amp = self.parse_optional(SyntaxKind::AmpersandToken);
        let first = self.parse_type_operator_or_higher();
        if !has_leading_amp && !self.is_token(SyntaxKind::AmpersandToken) {
            return first;
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::AmpersandToken) {
            types.push(self.parse_type_operator_or_higher());
        }
        self.finish_node(syntax_kind_ext::INTERSECTION_TYPE, start_pos, types)
    }

    fn parse_type_operator_or_higher(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::KeyOfKeyword | SyntaxKind::UniqueKeyword | SyntaxKind::ReadonlyKeyword => {
                self.next_token();
                let operand = self.parse_type_operator_or_higher();
                self.finish_node(syntax_kind_ext::TYPE_OPERATOR, start_pos, vec![operand])
            }
            SyntaxKind::InferKeyword => self.parse_infer_type(),
            _ if self.is_start_of_function_or_constructor_type() => self.parse_function_or_constructor_type(),
            _ => self.parse_postfix_type_or_higher(),
        }
    }

    /// `infer U` or `infer U extends C`; the constraint is only taken when
    /// it cannot be the start of an enclosing conditional type.
    fn parse_infer_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // infer
        let parameter_start = self.token_pos();
        let mut parameter_children = vec![self.parse_identifier()];

        if self.is_token(SyntaxKind::ExtendsKeyword) {
            let outer_disallows = self.context_flags & CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES != 0;
            let constraint = self.try_parse(|p| {
                p.next_token();
                let constraint =
                    p.with_context(CONTEXT_FLAG_DISALLOW_CONDITIONAL_TYPES, true, Self::parse_type);
                (outer_disallows || !p.is_token(SyntaxKind::QuestionToken)).then_some(constraint)
            });
            if let Some(constraint) = constraint {
                parameter_children.push(constraint);
            }
        }

        let parameter = self.finish_node(syntax_kind_ext::TYPE_PARAMETER, parameter_start, parameter_children);
        self.finish_node(syntax_kind_ext::INFER_TYPE, start_pos, vec![parameter])
    }

    /// `T[]` and `T[K]`
    fn parse_postfix_type_or_higher(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut type_node = self.parse_non_array_type();
        while !self.has_preceding_line_break() && self.is_token(SyntaxKind::OpenBracketToken) {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                type_node = self.finish_node(syntax_kind_ext::ARRAY_TYPE, start_pos, vec![type_node]);
            } else {
                let index_type = self.parse_type_allow_conditional();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                type_node = self.finish_node(
                    syntax_kind_ext::INDEXED_ACCESS_TYPE,
                    start_pos,
                    vec![type_node, index_type],
                );
            }
        }
        type_node
    }

    // =========================================================================
    // Primary types
    // =========================================================================

    fn parse_non_array_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::AnyKeyword
            | SyntaxKind::UnknownKeyword
            | SyntaxKind::StringKeyword
            | SyntaxKind::NumberKeyword
            | SyntaxKind::BigIntKeyword
            | SyntaxKind::SymbolKeyword
            | SyntaxKind::BooleanKeyword
            | SyntaxKind::NeverKeyword
            | SyntaxKind::ObjectKeyword
            | SyntaxKind::UndefinedKeyword
            | SyntaxKind::VoidKeyword
            | SyntaxKind::NullKeyword
                if !self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::DotToken)
                }) =>
            {
                self.parse_token_node()
            }
            SyntaxKind::ThisKeyword => self.parse_token_node_as(syntax_kind_ext::THIS_TYPE),
            SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let literal = self.parse_token_node();
                self.finish_node(syntax_kind_ext::LITERAL_TYPE, start_pos, vec![literal])
            }
            SyntaxKind::MinusToken
                if self.look_ahead(|p| {
                    p.next_token();
                    matches!(p.token(), SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral)
                }) =>
            {
                self.next_token();
                let literal = self.parse_token_node();
                let negated = self.finish_node(syntax_kind_ext::PREFIX_UNARY_EXPRESSION, start_pos, vec![literal]);
                self.finish_node(syntax_kind_ext::LITERAL_TYPE, start_pos, vec![negated])
            }
            SyntaxKind::TemplateHead => self.parse_template_literal_type(),
            SyntaxKind::TypeOfKeyword => self.parse_type_query(),
            SyntaxKind::ImportKeyword => self.parse_import_type(),
            SyntaxKind::OpenBraceToken => {
                if self.look_ahead(Self::is_start_of_mapped_type) {
                    self.parse_mapped_type()
                } else {
                    let members = self.parse_type_member_list();
                    self.finish_node(syntax_kind_ext::TYPE_LITERAL, start_pos, members)
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_type_allow_conditional();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.finish_node(syntax_kind_ext::PARENTHESIZED_TYPE, start_pos, vec![inner])
            }
            _ if self.is_identifier_or_keyword() => self.parse_type_reference(),
            _ => self.create_missing_identifier("Type expected."),
        }
    }

    /// `A.B.C<T>`
    fn parse_type_reference(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let name = self.parse_entity_name();
        let mut children = vec![name];
        if !self.has_preceding_line_break() && self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_arguments());
        }
        self.finish_node(syntax_kind_ext::TYPE_REFERENCE, start_pos, children)
    }

    /// Dotted name; every segment may be a keyword.
    pub(crate) fn parse_entity_name(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut name = self.parse_identifier_name();
        while self.is_token(SyntaxKind::DotToken) {
            self.next_token();
            let right = self.parse_identifier_name();
            name = self.finish_node(syntax_kind_ext::QUALIFIED_NAME, start_pos, vec![name, right]);
        }
        name
    }

    /// Parse type arguments: <T, U, V>
    pub(crate) fn parse_type_arguments(&mut self) -> Vec<NodeIndex> {
        let mut arguments = Vec::new();
        self.parse_expected(SyntaxKind::LessThanToken);
        while !self.is_token(SyntaxKind::GreaterThanToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            arguments.push(self.parse_type_allow_conditional());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        arguments
    }

    /// Parse type parameters: <const T extends U = V, in out K>
    pub(crate) fn parse_type_parameters(&mut self) -> Vec<NodeIndex> {
        let mut parameters = Vec::new();
        if !self.parse_expected(SyntaxKind::LessThanToken) {
            return parameters;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let start_pos = self.token_pos();
            let mut children = Vec::new();
            while matches!(
                self.token(),
                SyntaxKind::ConstKeyword | SyntaxKind::InKeyword | SyntaxKind::OutKeyword
            ) && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier()
            }) {
                children.push(self.parse_token_node());
            }
            children.push(self.parse_identifier());
            if self.parse_optional(SyntaxKind::ExtendsKeyword) {
                children.push(self.parse_type_allow_conditional());
            }
            if self.parse_optional(SyntaxKind::EqualsToken) {
                children.push(self.parse_type_allow_conditional());
            }
            parameters.push(self.finish_node(syntax_kind_ext::TYPE_PARAMETER, start_pos, children));
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        parameters
    }

    /// `typeof a.b<T>` or `typeof import("m")`
    fn parse_type_query(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // typeof
        if self.is_token(SyntaxKind::ImportKeyword) {
            let import_type = self.parse_import_type();
            return self.finish_node(syntax_kind_ext::TYPE_QUERY, start_pos, vec![import_type]);
        }
        let mut children = vec![self.parse_entity_name()];
        if !self.has_preceding_line_break() && self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_arguments());
        }
        self.finish_node(syntax_kind_ext::TYPE_QUERY, start_pos, children)
    }

    /// `import("m").A.B<T>`
    fn parse_import_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // import
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut children = vec![self.parse_type()];
        if self.parse_optional(SyntaxKind::CommaToken) && !self.is_token(SyntaxKind::CloseParenToken) {
            // Import attributes: `{ with: { ... } }`
            children.push(self.parse_assignment_expression_allow_in());
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        if self.parse_optional(SyntaxKind::DotToken) {
            children.push(self.parse_entity_name());
        }
        if !self.has_preceding_line_break() && self.is_token(SyntaxKind::LessThanToken) {
            children.extend(self.parse_type_arguments());
        }
        self.finish_node(syntax_kind_ext::IMPORT_TYPE, start_pos, children)
    }

    /// `` `prefix-${T}-suffix` ``
    fn parse_template_literal_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = vec![self.parse_token_node()];
        loop {
            let span_start = self.token_pos();
            let type_node = self.parse_type_allow_conditional();
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_error_at_current_token("'}' expected.");
                children.push(self.finish_node(
                    syntax_kind_ext::TEMPLATE_LITERAL_TYPE_SPAN,
                    span_start,
                    vec![type_node],
                ));
                break;
            }
            let literal_kind = self.re_scan(ScannerState::re_scan_template_token);
            let literal = self.parse_token_node();
            children.push(self.finish_node(
                syntax_kind_ext::TEMPLATE_LITERAL_TYPE_SPAN,
                span_start,
                vec![type_node, literal],
            ));
            if literal_kind != SyntaxKind::TemplateMiddle {
                break;
            }
        }
        self.finish_node(syntax_kind_ext::TEMPLATE_LITERAL_TYPE, start_pos, children)
    }

    // =========================================================================
    // Tuples
    // =========================================================================

    fn parse_tuple_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // [
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            elements.push(self.parse_tuple_element_type());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.finish_node(syntax_kind_ext::TUPLE_TYPE, start_pos, elements)
    }

    fn parse_tuple_element_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = Vec::new();
        let is_rest = self.parse_optional(SyntaxKind::DotDotDotToken);

        if self.look_ahead(Self::is_named_tuple_member_start) {
            children.push(self.parse_identifier_name());
            self.parse_optional(SyntaxKind::QuestionToken);
            self.parse_expected(SyntaxKind::ColonToken);
            children.push(self.parse_type_allow_conditional());
            return self.finish_node(syntax_kind_ext::NAMED_TUPLE_MEMBER, start_pos, children);
        }

        let type_node = self.parse_type_allow_conditional();
        if is_rest {
            return self.finish_node(syntax_kind_ext::REST_TYPE, start_pos, vec![type_node]);
        }
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return self.finish_node(syntax_kind_ext::OPTIONAL_TYPE, start_pos, vec![type_node]);
        }
        type_node
    }

    fn is_named_tuple_member_start(&mut self) -> bool {
        if !self.is_identifier_or_keyword() {
            return false;
        }
        self.next_token();
        if self.parse_optional(SyntaxKind::QuestionToken) {
            return self.is_token(SyntaxKind::ColonToken);
        }
        self.is_token(SyntaxKind::ColonToken)
    }

    // =========================================================================
    // Type literals, mapped types and type members
    // =========================================================================

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.next_token(); // {
        if matches!(self.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
            self.next_token();
            return self.is_token(SyntaxKind::ReadonlyKeyword);
        }
        if self.is_token(SyntaxKind::ReadonlyKeyword) {
            self.next_token();
        }
        if !self.parse_optional(SyntaxKind::OpenBracketToken) || !self.is_identifier() {
            return false;
        }
        self.next_token();
        self.is_token(SyntaxKind::InKeyword)
    }

    /// `{ readonly [K in keyof T as N]?: T[K] }`
    fn parse_mapped_type(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token(); // {
        let mut children = Vec::new();
        if matches!(self.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
            self.next_token();
        }
        if self.is_token(SyntaxKind::ReadonlyKeyword) {
            children.push(self.parse_token_node());
        }
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let parameter_start = self.token_pos();
        let name = self.parse_identifier();
        self.parse_expected(SyntaxKind::InKeyword);
        let constraint = self.parse_type_allow_conditional();
        children.push(self.finish_node(
            syntax_kind_ext::TYPE_PARAMETER,
            parameter_start,
            vec![name, constraint],
        ));
        if self.parse_optional(SyntaxKind::AsKeyword) {
            children.push(self.parse_type_allow_conditional());
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        if matches!(self.token(), SyntaxKind::PlusToken | SyntaxKind::MinusToken) {
            self.next_token();
        }
        self.parse_optional(SyntaxKind::QuestionToken);
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type_allow_conditional());
        }
        if !self.parse_optional(SyntaxKind::SemicolonToken) {
            self.parse_optional(SyntaxKind::CommaToken);
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.finish_node(syntax_kind_ext::MAPPED_TYPE, start_pos, children)
    }

    /// `{ member; member, ... }` for type literals and interfaces.
    pub(crate) fn parse_type_member_list(&mut self) -> Vec<NodeIndex> {
        let mut members = Vec::new();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while !self.is_token(SyntaxKind::CloseBraceToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            members.push(self.parse_type_member());
            if !self.parse_optional(SyntaxKind::SemicolonToken) {
                self.parse_optional(SyntaxKind::CommaToken);
            }
            if self.token_pos() == pos_before {
                self.parse_error_at_current_token("Property or signature expected.");
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    fn parse_type_member(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let mut children = Vec::new();

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            self.parse_function_signature(&mut children);
            return self.finish_node(syntax_kind_ext::CALL_SIGNATURE, start_pos, children);
        }

        if self.is_token(SyntaxKind::NewKeyword)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            self.next_token();
            self.parse_function_signature(&mut children);
            return self.finish_node(syntax_kind_ext::CONSTRUCT_SIGNATURE, start_pos, children);
        }

        if self.is_token(SyntaxKind::ReadonlyKeyword)
            && self.look_ahead(|p| {
                p.next_token_is_on_same_line() && p.is_property_name_start()
            })
        {
            children.push(self.parse_token_node());
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.look_ahead(Self::is_index_signature_start) {
            return self.parse_index_signature(start_pos, children);
        }

        if matches!(self.token(), SyntaxKind::GetKeyword | SyntaxKind::SetKeyword)
            && self.look_ahead(|p| p.next_token_is_on_same_line() && p.is_property_name_start())
        {
            let kind = if self.is_token(SyntaxKind::GetKeyword) {
                syntax_kind_ext::GET_ACCESSOR
            } else {
                syntax_kind_ext::SET_ACCESSOR
            };
            children.push(self.parse_token_node());
            children.push(self.parse_property_name());
            self.parse_function_signature(&mut children);
            return self.finish_node(kind, start_pos, children);
        }

        children.push(self.parse_property_name());
        self.parse_optional(SyntaxKind::QuestionToken);

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            self.parse_function_signature(&mut children);
            return self.finish_node(syntax_kind_ext::METHOD_SIGNATURE, start_pos, children);
        }

        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type_allow_conditional());
        }
        self.finish_node(syntax_kind_ext::PROPERTY_SIGNATURE, start_pos, children)
    }

    pub(crate) fn is_index_signature_start(&mut self) -> bool {
        self.next_token(); // [
        if self.is_token(SyntaxKind::DotDotDotToken) || self.is_token(SyntaxKind::CloseBracketToken) {
            return true;
        }
        if !self.is_identifier() {
            return false;
        }
        self.next_token();
        matches!(self.token(), SyntaxKind::ColonToken | SyntaxKind::CommaToken)
    }

    /// `[key: string]: T` with any modifiers already collected in `children`.
    pub(crate) fn parse_index_signature(&mut self, start_pos: u32, mut children: Vec<NodeIndex>) -> NodeIndex {
        self.next_token(); // [
        while !self.is_token(SyntaxKind::CloseBracketToken) && !self.is_token(SyntaxKind::EndOfFileToken) {
            let pos_before = self.token_pos();
            children.push(self.parse_parameter());
            if !self.parse_optional(SyntaxKind::CommaToken) || self.token_pos() == pos_before {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        if self.parse_optional(SyntaxKind::ColonToken) {
            children.push(self.parse_type_allow_conditional());
        }
        self.finish_node(syntax_kind_ext::INDEX_SIGNATURE, start_pos, children)
    }
}
