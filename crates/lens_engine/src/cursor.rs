//! Cursor snapshots: read-only views of AST nodes.

use lens_source::Location;
use serde::{Deserialize, Serialize};

/// Identity of a cursor within one translation unit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CursorId(pub u64);

/// The syntactic kind of an AST node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum CursorKind {
    /// A free function.
    FunctionDecl,
    /// A member function.
    CxxMethod,
    /// A constructor.
    Constructor,
    /// A destructor.
    Destructor,
    /// A function template.
    FunctionTemplate,
    /// A variable.
    VarDecl,
    /// A data member.
    FieldDecl,
    /// A function parameter.
    ParmDecl,
    /// A non-type template parameter.
    NonTypeTemplateParameter,
    /// An enumerator.
    EnumConstantDecl,
    /// A struct.
    StructDecl,
    /// A class.
    ClassDecl,
    /// A union.
    UnionDecl,
    /// An enum.
    EnumDecl,
    /// A typedef.
    TypedefDecl,
    /// A class template.
    ClassTemplate,
    /// A macro definition.
    MacroDefinition,
    /// A macro use.
    MacroExpansion,
    /// A `{ ... }` statement block.
    CompoundStmt,
    /// A reference to a declaration in an expression.
    DeclRefExpr,
    /// A reference to a member in an expression.
    MemberRefExpr,
    /// A call expression.
    CallExpr,
    /// A reference to a type.
    TypeRef,
    /// A namespace.
    Namespace,
    /// Anything not modelled above.
    #[default]
    Other,
}

impl CursorKind {
    /// Returns `true` for functions, methods, constructors, destructors and
    /// function templates.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            CursorKind::FunctionDecl
                | CursorKind::CxxMethod
                | CursorKind::Constructor
                | CursorKind::Destructor
                | CursorKind::FunctionTemplate
        )
    }

    /// Returns `true` for kinds reported by symbol collection.
    pub fn is_symbol(self) -> bool {
        self.is_function_like()
            || matches!(
                self,
                CursorKind::VarDecl
                    | CursorKind::FieldDecl
                    | CursorKind::ParmDecl
                    | CursorKind::EnumConstantDecl
                    | CursorKind::StructDecl
                    | CursorKind::ClassDecl
                    | CursorKind::UnionDecl
                    | CursorKind::EnumDecl
                    | CursorKind::TypedefDecl
                    | CursorKind::MacroDefinition
            )
    }

    /// Returns `true` for records, enums and namespaces, which own members.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            CursorKind::ClassDecl
                | CursorKind::StructDecl
                | CursorKind::UnionDecl
                | CursorKind::ClassTemplate
                | CursorKind::EnumDecl
                | CursorKind::Namespace
        )
    }

    /// Returns `true` for expression references to other declarations.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            CursorKind::DeclRefExpr
                | CursorKind::MemberRefExpr
                | CursorKind::CallExpr
                | CursorKind::TypeRef
                | CursorKind::MacroExpansion
        )
    }

    /// Ranking used to order completions: functions first, macros last.
    pub fn completion_score(self) -> u8 {
        match self {
            CursorKind::FunctionDecl
            | CursorKind::CxxMethod
            | CursorKind::Constructor
            | CursorKind::Destructor
            | CursorKind::FunctionTemplate => 0,
            CursorKind::VarDecl
            | CursorKind::FieldDecl
            | CursorKind::ParmDecl
            | CursorKind::NonTypeTemplateParameter => 1,
            CursorKind::ClassDecl
            | CursorKind::StructDecl
            | CursorKind::ClassTemplate
            | CursorKind::EnumDecl => 2,
            CursorKind::EnumConstantDecl => 3,
            CursorKind::MacroDefinition => 4,
            _ => 5,
        }
    }

    /// Human-readable kind shown in hover text.
    pub fn describe(self) -> &'static str {
        match self {
            CursorKind::FunctionDecl => "function",
            CursorKind::CxxMethod => "method",
            CursorKind::Constructor => "constructor",
            CursorKind::Destructor => "destructor",
            CursorKind::FunctionTemplate => "function template",
            CursorKind::VarDecl => "variable",
            CursorKind::FieldDecl => "field",
            CursorKind::ParmDecl => "parameter",
            CursorKind::NonTypeTemplateParameter => "template parameter",
            CursorKind::EnumConstantDecl => "enum constant",
            CursorKind::StructDecl => "struct",
            CursorKind::ClassDecl => "class",
            CursorKind::UnionDecl => "union",
            CursorKind::EnumDecl => "enum",
            CursorKind::TypedefDecl => "typedef",
            CursorKind::ClassTemplate => "class template",
            CursorKind::MacroDefinition | CursorKind::MacroExpansion => "macro",
            _ => "",
        }
    }
}

/// A named function parameter as declared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name; empty for anonymous parameters.
    pub name: String,
    /// Spelled type, qualifiers included.
    pub type_name: String,
}

impl ParameterInfo {
    /// Creates a parameter.
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A snapshot of one AST node.
///
/// Cursors are plain values copied out of the engine; holding one does not
/// keep any engine state alive. Two cursors are the same node when their ids
/// match and they came from the same unit.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    /// Node identity within its unit.
    pub id: CursorId,
    /// Node kind.
    pub kind: CursorKind,
    /// Bare name (`digitalWrite`).
    pub spelling: String,
    /// Name with parameter types (`digitalWrite(uint8_t, uint8_t)`).
    pub display_name: String,
    /// Cross-unit identity string of the declared or referenced entity.
    pub usr: String,
    /// Spelling location of the node's name.
    pub location: Location,
    /// Location just past the node's last character.
    pub extent_end: Location,
    /// Result type for function-like nodes.
    pub result_type: String,
    /// Spelled type of the node.
    pub type_name: String,
    /// Whether the node is a definition rather than a declaration.
    pub is_definition: bool,
    /// Whether the declaration has static storage.
    pub is_static: bool,
    /// Whether a function takes a trailing `...`.
    pub is_variadic: bool,
    /// Declared parameters of function-like nodes.
    pub parameters: Vec<ParameterInfo>,
    /// Brief documentation comment, if the engine found one.
    pub brief_comment: Option<String>,
    /// Full raw documentation comment, if the engine found one.
    pub raw_comment: Option<String>,
}

impl Cursor {
    /// Returns `true` if both cursors denote the same node.
    pub fn same_node(&self, other: &Cursor) -> bool {
        self.id == other.id
    }
}
