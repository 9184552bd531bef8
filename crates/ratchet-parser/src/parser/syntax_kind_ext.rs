//! Node kinds that have no token counterpart.
//!
//! Token and keyword nodes use `SyntaxKind as u16` directly; composite
//! nodes use the constants below, numbered after `SyntaxKind::LAST_TOKEN`.

use ratchet_scanner::SyntaxKind;

const BASE: u16 = SyntaxKind::LAST_TOKEN as u16 + 1;

// Names
pub const QUALIFIED_NAME: u16 = BASE;
pub const COMPUTED_PROPERTY_NAME: u16 = BASE + 1;

// Signature elements
pub const TYPE_PARAMETER: u16 = BASE + 2;
pub const PARAMETER: u16 = BASE + 3;
pub const DECORATOR: u16 = BASE + 4;

// Type members
pub const PROPERTY_SIGNATURE: u16 = BASE + 5;
pub const PROPERTY_DECLARATION: u16 = BASE + 6;
pub const METHOD_SIGNATURE: u16 = BASE + 7;
pub const METHOD_DECLARATION: u16 = BASE + 8;
pub const CLASS_STATIC_BLOCK_DECLARATION: u16 = BASE + 9;
pub const CONSTRUCTOR: u16 = BASE + 10;
pub const GET_ACCESSOR: u16 = BASE + 11;
pub const SET_ACCESSOR: u16 = BASE + 12;
pub const CALL_SIGNATURE: u16 = BASE + 13;
pub const CONSTRUCT_SIGNATURE: u16 = BASE + 14;
pub const INDEX_SIGNATURE: u16 = BASE + 15;

// Types
pub const TYPE_PREDICATE: u16 = BASE + 16;
pub const TYPE_REFERENCE: u16 = BASE + 17;
pub const FUNCTION_TYPE: u16 = BASE + 18;
pub const CONSTRUCTOR_TYPE: u16 = BASE + 19;
pub const TYPE_QUERY: u16 = BASE + 20;
pub const TYPE_LITERAL: u16 = BASE + 21;
pub const ARRAY_TYPE: u16 = BASE + 22;
pub const TUPLE_TYPE: u16 = BASE + 23;
pub const OPTIONAL_TYPE: u16 = BASE + 24;
pub const REST_TYPE: u16 = BASE + 25;
pub const UNION_TYPE: u16 = BASE + 26;
pub const INTERSECTION_TYPE: u16 = BASE + 27;
pub const CONDITIONAL_TYPE: u16 = BASE + 28;
pub const INFER_TYPE: u16 = BASE + 29;
pub const PARENTHESIZED_TYPE: u16 = BASE + 30;
pub const THIS_TYPE: u16 = BASE + 31;
pub const TYPE_OPERATOR: u16 = BASE + 32;
pub const INDEXED_ACCESS_TYPE: u16 = BASE + 33;
pub const MAPPED_TYPE: u16 = BASE + 34;
pub const LITERAL_TYPE: u16 = BASE + 35;
pub const NAMED_TUPLE_MEMBER: u16 = BASE + 36;
pub const TEMPLATE_LITERAL_TYPE: u16 = BASE + 37;
pub const TEMPLATE_LITERAL_TYPE_SPAN: u16 = BASE + 38;
pub const IMPORT_TYPE: u16 = BASE + 39;

// Binding patterns
pub const OBJECT_BINDING_PATTERN: u16 = BASE + 40;
pub const ARRAY_BINDING_PATTERN: u16 = BASE + 41;
pub const BINDING_ELEMENT: u16 = BASE + 42;

// Expressions
pub const ARRAY_LITERAL_EXPRESSION: u16 = BASE + 43;
pub const OBJECT_LITERAL_EXPRESSION: u16 = BASE + 44;
pub const PROPERTY_ACCESS_EXPRESSION: u16 = BASE + 45;
pub const ELEMENT_ACCESS_EXPRESSION: u16 = BASE + 46;
pub const CALL_EXPRESSION: u16 = BASE + 47;
pub const NEW_EXPRESSION: u16 = BASE + 48;
pub const TAGGED_TEMPLATE_EXPRESSION: u16 = BASE + 49;
pub const TYPE_ASSERTION: u16 = BASE + 50;
pub const PARENTHESIZED_EXPRESSION: u16 = BASE + 51;
pub const FUNCTION_EXPRESSION: u16 = BASE + 52;
pub const ARROW_FUNCTION: u16 = BASE + 53;
pub const DELETE_EXPRESSION: u16 = BASE + 54;
pub const TYPE_OF_EXPRESSION: u16 = BASE + 55;
pub const VOID_EXPRESSION: u16 = BASE + 56;
pub const AWAIT_EXPRESSION: u16 = BASE + 57;
pub const PREFIX_UNARY_EXPRESSION: u16 = BASE + 58;
pub const POSTFIX_UNARY_EXPRESSION: u16 = BASE + 59;
pub const BINARY_EXPRESSION: u16 = BASE + 60;
pub const CONDITIONAL_EXPRESSION: u16 = BASE + 61;
pub const TEMPLATE_EXPRESSION: u16 = BASE + 62;
pub const YIELD_EXPRESSION: u16 = BASE + 63;
pub const SPREAD_ELEMENT: u16 = BASE + 64;
pub const CLASS_EXPRESSION: u16 = BASE + 65;
pub const OMITTED_EXPRESSION: u16 = BASE + 66;
pub const EXPRESSION_WITH_TYPE_ARGUMENTS: u16 = BASE + 67;
pub const AS_EXPRESSION: u16 = BASE + 68;
pub const NON_NULL_EXPRESSION: u16 = BASE + 69;
pub const META_PROPERTY: u16 = BASE + 70;
pub const SATISFIES_EXPRESSION: u16 = BASE + 71;
pub const TEMPLATE_SPAN: u16 = BASE + 72;

// Statements
pub const BLOCK: u16 = BASE + 73;
pub const EMPTY_STATEMENT: u16 = BASE + 74;
pub const VARIABLE_STATEMENT: u16 = BASE + 75;
pub const EXPRESSION_STATEMENT: u16 = BASE + 76;
pub const IF_STATEMENT: u16 = BASE + 77;
pub const DO_STATEMENT: u16 = BASE + 78;
pub const WHILE_STATEMENT: u16 = BASE + 79;
pub const FOR_STATEMENT: u16 = BASE + 80;
pub const FOR_IN_STATEMENT: u16 = BASE + 81;
pub const FOR_OF_STATEMENT: u16 = BASE + 82;
pub const CONTINUE_STATEMENT: u16 = BASE + 83;
pub const BREAK_STATEMENT: u16 = BASE + 84;
pub const RETURN_STATEMENT: u16 = BASE + 85;
pub const WITH_STATEMENT: u16 = BASE + 86;
pub const SWITCH_STATEMENT: u16 = BASE + 87;
pub const LABELED_STATEMENT: u16 = BASE + 88;
pub const THROW_STATEMENT: u16 = BASE + 89;
pub const TRY_STATEMENT: u16 = BASE + 90;
pub const DEBUGGER_STATEMENT: u16 = BASE + 91;
pub const VARIABLE_DECLARATION: u16 = BASE + 92;
pub const VARIABLE_DECLARATION_LIST: u16 = BASE + 93;

// Declarations
pub const FUNCTION_DECLARATION: u16 = BASE + 94;
pub const CLASS_DECLARATION: u16 = BASE + 95;
pub const INTERFACE_DECLARATION: u16 = BASE + 96;
pub const TYPE_ALIAS_DECLARATION: u16 = BASE + 97;
pub const ENUM_DECLARATION: u16 = BASE + 98;
pub const MODULE_DECLARATION: u16 = BASE + 99;
pub const MODULE_BLOCK: u16 = BASE + 100;
pub const CASE_BLOCK: u16 = BASE + 101;
pub const IMPORT_EQUALS_DECLARATION: u16 = BASE + 102;
pub const IMPORT_DECLARATION: u16 = BASE + 103;
pub const IMPORT_CLAUSE: u16 = BASE + 104;
pub const NAMESPACE_IMPORT: u16 = BASE + 105;
pub const NAMED_IMPORTS: u16 = BASE + 106;
pub const IMPORT_SPECIFIER: u16 = BASE + 107;
pub const EXPORT_ASSIGNMENT: u16 = BASE + 108;
pub const EXPORT_DECLARATION: u16 = BASE + 109;
pub const NAMED_EXPORTS: u16 = BASE + 110;
pub const NAMESPACE_EXPORT: u16 = BASE + 111;
pub const EXPORT_SPECIFIER: u16 = BASE + 112;
pub const EXTERNAL_MODULE_REFERENCE: u16 = BASE + 113;
pub const NAMESPACE_EXPORT_DECLARATION: u16 = BASE + 114;

// JSX
//
// An element always wraps its opening tag; attributes are direct children
// of the opening tag. A self-closing element has no closing tag child.
pub const JSX_ELEMENT: u16 = BASE + 115;
pub const JSX_OPENING_ELEMENT: u16 = BASE + 116;
pub const JSX_CLOSING_ELEMENT: u16 = BASE + 117;
pub const JSX_FRAGMENT: u16 = BASE + 118;
pub const JSX_OPENING_FRAGMENT: u16 = BASE + 119;
pub const JSX_CLOSING_FRAGMENT: u16 = BASE + 120;
pub const JSX_ATTRIBUTE: u16 = BASE + 121;
pub const JSX_SPREAD_ATTRIBUTE: u16 = BASE + 122;
pub const JSX_EXPRESSION: u16 = BASE + 123;
pub const JSX_NAMESPACED_NAME: u16 = BASE + 124;

// Clauses
pub const CASE_CLAUSE: u16 = BASE + 125;
pub const DEFAULT_CLAUSE: u16 = BASE + 126;
pub const HERITAGE_CLAUSE: u16 = BASE + 127;
pub const CATCH_CLAUSE: u16 = BASE + 128;

// Property assignments
pub const PROPERTY_ASSIGNMENT: u16 = BASE + 129;
pub const SHORTHAND_PROPERTY_ASSIGNMENT: u16 = BASE + 130;
pub const SPREAD_ASSIGNMENT: u16 = BASE + 131;
pub const ENUM_MEMBER: u16 = BASE + 132;

// Top level
pub const SOURCE_FILE: u16 = BASE + 133;
pub const SEMICOLON_CLASS_ELEMENT: u16 = BASE + 134;

/// Human-readable name of a node kind, for logs and test failures.
pub fn kind_name(kind: u16) -> String {
    if kind < BASE {
        return match token_kind(kind) {
            Some(token) => format!("{token:?}"),
            None if kind >= SyntaxKind::FIRST_KEYWORD as u16 => format!("Keyword({kind})"),
            None => format!("Token({kind})"),
        };
    }
    let name = match kind {
        QUALIFIED_NAME => "QualifiedName",
        COMPUTED_PROPERTY_NAME => "ComputedPropertyName",
        TYPE_PARAMETER => "TypeParameter",
        PARAMETER => "Parameter",
        DECORATOR => "Decorator",
        PROPERTY_SIGNATURE => "PropertySignature",
        PROPERTY_DECLARATION => "PropertyDeclaration",
        METHOD_SIGNATURE => "MethodSignature",
        METHOD_DECLARATION => "MethodDeclaration",
        CLASS_STATIC_BLOCK_DECLARATION => "ClassStaticBlockDeclaration",
        CONSTRUCTOR => "Constructor",
        GET_ACCESSOR => "GetAccessor",
        SET_ACCESSOR => "SetAccessor",
        CALL_SIGNATURE => "CallSignature",
        CONSTRUCT_SIGNATURE => "ConstructSignature",
        INDEX_SIGNATURE => "IndexSignature",
        TYPE_PREDICATE => "TypePredicate",
        TYPE_REFERENCE => "TypeReference",
        FUNCTION_TYPE => "FunctionType",
        CONSTRUCTOR_TYPE => "ConstructorType",
        TYPE_QUERY => "TypeQuery",
        TYPE_LITERAL => "TypeLiteral",
        ARRAY_TYPE => "ArrayType",
        TUPLE_TYPE => "TupleType",
        OPTIONAL_TYPE => "OptionalType",
        REST_TYPE => "RestType",
        UNION_TYPE => "UnionType",
        INTERSECTION_TYPE => "IntersectionType",
        CONDITIONAL_TYPE => "ConditionalType",
        INFER_TYPE => "InferType",
        PARENTHESIZED_TYPE => "ParenthesizedType",
        THIS_TYPE => "ThisType",
        TYPE_OPERATOR => "TypeOperator",
        INDEXED_ACCESS_TYPE => "IndexedAccessType",
        MAPPED_TYPE => "MappedType",
        LITERAL_TYPE => "LiteralType",
        NAMED_TUPLE_MEMBER => "NamedTupleMember",
        TEMPLATE_LITERAL_TYPE => "TemplateLiteralType",
        TEMPLATE_LITERAL_TYPE_SPAN => "TemplateLiteralTypeSpan",
        IMPORT_TYPE => "ImportType",
        OBJECT_BINDING_PATTERN => "ObjectBindingPattern",
        ARRAY_BINDING_PATTERN => "ArrayBindingPattern",
        BINDING_ELEMENT => "BindingElement",
        ARRAY_LITERAL_EXPRESSION => "ArrayLiteralExpression",
        OBJECT_LITERAL_EXPRESSION => "ObjectLiteralExpression",
        PROPERTY_ACCESS_EXPRESSION => "PropertyAccessExpression",
        ELEMENT_ACCESS_EXPRESSION => "ElementAccessExpression",
        CALL_EXPRESSION => "CallExpression",
        NEW_EXPRESSION => "NewExpression",
        TAGGED_TEMPLATE_EXPRESSION => "TaggedTemplateExpression",
        TYPE_ASSERTION => "TypeAssertion",
        PARENTHESIZED_EXPRESSION => "ParenthesizedExpression",
        FUNCTION_EXPRESSION => "FunctionExpression",
        ARROW_FUNCTION => "ArrowFunction",
        DELETE_EXPRESSION => "DeleteExpression",
        TYPE_OF_EXPRESSION => "TypeOfExpression",
        VOID_EXPRESSION => "VoidExpression",
        AWAIT_EXPRESSION => "AwaitExpression",
        PREFIX_UNARY_EXPRESSION => "PrefixUnaryExpression",
        POSTFIX_UNARY_EXPRESSION => "PostfixUnaryExpression",
        BINARY_EXPRESSION => "BinaryExpression",
        CONDITIONAL_EXPRESSION => "ConditionalExpression",
        TEMPLATE_EXPRESSION => "TemplateExpression",
        YIELD_EXPRESSION => "YieldExpression",
        SPREAD_ELEMENT => "SpreadElement",
        CLASS_EXPRESSION => "ClassExpression",
        OMITTED_EXPRESSION => "OmittedExpression",
        EXPRESSION_WITH_TYPE_ARGUMENTS => "ExpressionWithTypeArguments",
        AS_EXPRESSION => "AsExpression",
        NON_NULL_EXPRESSION => "NonNullExpression",
        META_PROPERTY => "MetaProperty",
        SATISFIES_EXPRESSION => "SatisfiesExpression",
        TEMPLATE_SPAN => "TemplateSpan",
        BLOCK => "Block",
        EMPTY_STATEMENT => "EmptyStatement",
        VARIABLE_STATEMENT => "VariableStatement",
        EXPRESSION_STATEMENT => "ExpressionStatement",
        IF_STATEMENT => "IfStatement",
        DO_STATEMENT => "DoStatement",
        WHILE_STATEMENT => "WhileStatement",
        FOR_STATEMENT => "ForStatement",
        FOR_IN_STATEMENT => "ForInStatement",
        FOR_OF_STATEMENT => "ForOfStatement",
        CONTINUE_STATEMENT => "ContinueStatement",
        BREAK_STATEMENT => "BreakStatement",
        RETURN_STATEMENT => "ReturnStatement",
        WITH_STATEMENT => "WithStatement",
        SWITCH_STATEMENT => "SwitchStatement",
        LABELED_STATEMENT => "LabeledStatement",
        THROW_STATEMENT => "ThrowStatement",
        TRY_STATEMENT => "TryStatement",
        DEBUGGER_STATEMENT => "DebuggerStatement",
        VARIABLE_DECLARATION => "VariableDeclaration",
        VARIABLE_DECLARATION_LIST => "VariableDeclarationList",
        FUNCTION_DECLARATION => "FunctionDeclaration",
        CLASS_DECLARATION => "ClassDeclaration",
        INTERFACE_DECLARATION => "InterfaceDeclaration",
        TYPE_ALIAS_DECLARATION => "TypeAliasDeclaration",
        ENUM_DECLARATION => "EnumDeclaration",
        MODULE_DECLARATION => "ModuleDeclaration",
        MODULE_BLOCK => "ModuleBlock",
        CASE_BLOCK => "CaseBlock",
        IMPORT_EQUALS_DECLARATION => "ImportEqualsDeclaration",
        IMPORT_DECLARATION => "ImportDeclaration",
        IMPORT_CLAUSE => "ImportClause",
        NAMESPACE_IMPORT => "NamespaceImport",
        NAMED_IMPORTS => "NamedImports",
        IMPORT_SPECIFIER => "ImportSpecifier",
        EXPORT_ASSIGNMENT => "ExportAssignment",
        EXPORT_DECLARATION => "ExportDeclaration",
        NAMED_EXPORTS => "NamedExports",
        NAMESPACE_EXPORT => "NamespaceExport",
        EXPORT_SPECIFIER => "ExportSpecifier",
        EXTERNAL_MODULE_REFERENCE => "ExternalModuleReference",
        NAMESPACE_EXPORT_DECLARATION => "NamespaceExportDeclaration",
        JSX_ELEMENT => "JsxElement",
        JSX_OPENING_ELEMENT => "JsxOpeningElement",
        JSX_CLOSING_ELEMENT => "JsxClosingElement",
        JSX_FRAGMENT => "JsxFragment",
        JSX_OPENING_FRAGMENT => "JsxOpeningFragment",
        JSX_CLOSING_FRAGMENT => "JsxClosingFragment",
        JSX_ATTRIBUTE => "JsxAttribute",
        JSX_SPREAD_ATTRIBUTE => "JsxSpreadAttribute",
        JSX_EXPRESSION => "JsxExpression",
        JSX_NAMESPACED_NAME => "JsxNamespacedName",
        CASE_CLAUSE => "CaseClause",
        DEFAULT_CLAUSE => "DefaultClause",
        HERITAGE_CLAUSE => "HeritageClause",
        CATCH_CLAUSE => "CatchClause",
        PROPERTY_ASSIGNMENT => "PropertyAssignment",
        SHORTHAND_PROPERTY_ASSIGNMENT => "ShorthandPropertyAssignment",
        SPREAD_ASSIGNMENT => "SpreadAssignment",
        ENUM_MEMBER => "EnumMember",
        SOURCE_FILE => "SourceFile",
        SEMICOLON_CLASS_ELEMENT => "SemicolonClassElement",
        _ => return format!("Unknown({kind})"),
    };
    name.to_string()
}

/// The leaf token kind with the given discriminant.
fn token_kind(kind: u16) -> Option<SyntaxKind> {
    use SyntaxKind as K;
    const LEAF_KINDS: &[SyntaxKind] = &[
        K::Identifier,
        K::PrivateIdentifier,
        K::NumericLiteral,
        K::BigIntLiteral,
        K::StringLiteral,
        K::JsxText,
        K::RegularExpressionLiteral,
        K::NoSubstitutionTemplateLiteral,
        K::TemplateHead,
        K::TemplateMiddle,
        K::TemplateTail,
        K::DotDotDotToken,
        K::QuestionToken,
        K::ExclamationToken,
        K::AsteriskToken,
        K::EndOfFileToken,
    ];
    LEAF_KINDS.iter().copied().find(|k| *k as u16 == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_kinds_follow_tokens() {
        assert!(QUALIFIED_NAME > SyntaxKind::LAST_TOKEN as u16);
        assert_eq!(kind_name(JSX_OPENING_ELEMENT), "JsxOpeningElement");
        assert_eq!(kind_name(SyntaxKind::Identifier as u16), "Identifier");
        assert!(kind_name(SyntaxKind::ConstKeyword as u16).starts_with("Keyword("));
    }
}
