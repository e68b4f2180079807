#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDeclaration>,
}

impl TranslationUnit {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.items.iter().filter_map(|item| match item {
            ExternalDeclaration::Function(function) => Some(function),
            ExternalDeclaration::Declaration(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDeclaration {
    Function(FunctionDefinition),
    Declaration(Declaration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub specifiers: Vec<DeclarationSpecifier>,
    pub declarator: Declarator,
    pub body: CompoundStatement,
}

impl FunctionDefinition {
    pub fn name(&self) -> &str {
        self.declarator.name().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub specifiers: Vec<DeclarationSpecifier>,
    pub declarators: Vec<InitDeclarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationSpecifier {
    StorageClass(StorageClass),
    Type(TypeSpecifier),
    Qualifier(TypeQualifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecifier {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Bool,
    Struct(RecordSpecifier),
    Union(RecordSpecifier),
    Enum(EnumSpecifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeQualifier {
    Const,
    Restrict,
    Volatile,
}

/// `struct`/`union` tag with an optional member list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpecifier {
    pub tag: Option<String>,
    pub members: Option<Vec<Declaration>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpecifier {
    pub tag: Option<String>,
    pub enumerators: Option<Vec<Enumerator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitDeclarator {
    pub declarator: Declarator,
    pub initializer: Option<Expr>,
}

/// `pointer* direct-declarator`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub pointers: Vec<Vec<TypeQualifier>>,
    pub direct: DirectDeclarator,
}

impl Declarator {
    /// Name introduced by this declarator; `None` for abstract declarators.
    pub fn name(&self) -> Option<&str> {
        match &self.direct.base {
            DeclaratorBase::Identifier(name) => Some(name),
            DeclaratorBase::Nested(inner) => inner.name(),
            DeclaratorBase::Abstract => None,
        }
    }

    /// Parameter list of the outermost function suffix, if this declares a function.
    pub fn parameters(&self) -> Option<&ParameterList> {
        self.direct.suffixes.iter().find_map(|suffix| match suffix {
            DeclaratorSuffix::Function(params) => Some(params),
            DeclaratorSuffix::Array(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectDeclarator {
    pub base: DeclaratorBase,
    pub suffixes: Vec<DeclaratorSuffix>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaratorBase {
    Identifier(String),
    Nested(Box<Declarator>),
    Abstract,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaratorSuffix {
    Array(Option<Expr>),
    Function(ParameterList),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterList {
    pub params: Vec<ParameterDeclaration>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub specifiers: Vec<DeclarationSpecifier>,
    pub declarator: Option<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStatement {
    pub items: Vec<BlockItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Declaration(Declaration),
    Statement(Statement),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `expr;` or the empty statement `;`.
    Expression(Option<Expr>),
    Compound(CompoundStatement),
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expr,
        body: Box<Statement>,
    },
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Char(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter. All levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogicalOr => 1,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Equal | BinaryOp::NotEqual => 6,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => 7,
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => 8,
            BinaryOp::Add | BinaryOp::Subtract => 9,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitXor,
    BitOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    AddressOf,
    Deref,
    Plus,
    Negate,
    BitwiseNot,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SizeofOperand {
    Expr(Box<Expr>),
    /// `sizeof ( type-name )`: specifiers plus pointer depth.
    Type {
        specifiers: Vec<DeclarationSpecifier>,
        pointers: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Constant),
    Identifier(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Sizeof(SizeofOperand),
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: String,
        /// `->` rather than `.`
        through_pointer: bool,
    },
}

impl Expr {
    #[cfg(test)]
    pub fn int(value: i64) -> Self {
        Expr::Constant(Constant::Int(value))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}
