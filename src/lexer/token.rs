use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    Literal(Literal),
    Identifier(String),
    Keyword(Keyword),
    Punctuator(Punctuator),
    Directive(Directive),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Int(i64),
    /// Character constant, already decoded to its integer value.
    Char(i64),
    Float(f64),
    /// String body between the quotes, escapes left undecoded.
    Str(String),
}

/// A `#name` line head. The operands that follow stay ordinary tokens.
#[derive(Debug, PartialEq, Clone)]
pub enum Directive {
    Define { has_value: bool },
    Undef,
    Include,
    Ifdef,
    Ifndef,
    Else,
    Endif,
    Other(String),
}

impl Directive {
    pub fn name(&self) -> &str {
        match self {
            Directive::Define { .. } => "define",
            Directive::Undef => "undef",
            Directive::Include => "include",
            Directive::Ifdef => "ifdef",
            Directive::Ifndef => "ifndef",
            Directive::Else => "else",
            Directive::Endif => "endif",
            Directive::Other(name) => name,
        }
    }
}

macro_rules! spelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

spelled_enum! {
    Keyword {
        Auto => "auto",
        Break => "break",
        Case => "case",
        Char => "char",
        Const => "const",
        Continue => "continue",
        Default => "default",
        Do => "do",
        Double => "double",
        Else => "else",
        Enum => "enum",
        Extern => "extern",
        Float => "float",
        For => "for",
        Goto => "goto",
        If => "if",
        Inline => "inline",
        Int => "int",
        Long => "long",
        Register => "register",
        Restrict => "restrict",
        Return => "return",
        Short => "short",
        Signed => "signed",
        Sizeof => "sizeof",
        Static => "static",
        Struct => "struct",
        Switch => "switch",
        Typedef => "typedef",
        Union => "union",
        Unsigned => "unsigned",
        Void => "void",
        Volatile => "volatile",
        While => "while",
        Bool => "_Bool",
    }
}

spelled_enum! {
    /// Ordered longest spelling first so a linear scan is maximal munch.
    Punctuator {
        Ellipsis => "...",
        ShlAssign => "<<=",
        ShrAssign => ">>=",
        Arrow => "->",
        Increment => "++",
        Decrement => "--",
        Shl => "<<",
        Shr => ">>",
        LessEq => "<=",
        GreaterEq => ">=",
        EqEq => "==",
        NotEq => "!=",
        AndAnd => "&&",
        OrOr => "||",
        MulAssign => "*=",
        DivAssign => "/=",
        ModAssign => "%=",
        AddAssign => "+=",
        SubAssign => "-=",
        AndAssign => "&=",
        XorAssign => "^=",
        OrAssign => "|=",
        HashHash => "##",
        OpenBracket => "[",
        CloseBracket => "]",
        OpenParen => "(",
        CloseParen => ")",
        OpenBrace => "{",
        CloseBrace => "}",
        Dot => ".",
        Amp => "&",
        Star => "*",
        Plus => "+",
        Minus => "-",
        Tilde => "~",
        Bang => "!",
        Slash => "/",
        Percent => "%",
        Less => "<",
        Greater => ">",
        Caret => "^",
        Pipe => "|",
        Question => "?",
        Colon => ":",
        Semicolon => ";",
        Assign => "=",
        Comma => ",",
        Hash => "#",
    }
}

/// Keyword lookup, dispatched on the first byte so only the keywords sharing
/// it are compared.
pub fn keyword(ident: &str) -> Option<Keyword> {
    use Keyword::*;

    let candidates: &[Keyword] = match ident.as_bytes().first()? {
        b'a' => &[Auto],
        b'b' => &[Break],
        b'c' => &[Case, Char, Const, Continue],
        b'd' => &[Default, Do, Double],
        b'e' => &[Else, Enum, Extern],
        b'f' => &[Float, For],
        b'g' => &[Goto],
        b'i' => &[If, Inline, Int],
        b'l' => &[Long],
        b'r' => &[Register, Restrict, Return],
        b's' => &[Short, Signed, Sizeof, Static, Struct, Switch],
        b't' => &[Typedef],
        b'u' => &[Union, Unsigned],
        b'v' => &[Void, Volatile],
        b'w' => &[While],
        b'_' => &[Bool],
        _ => return None,
    };

    candidates
        .iter()
        .copied()
        .find(|kw| kw.as_str().len() == ident.len() && kw.as_str() == ident)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, col: usize) -> Self {
        Token { kind, line, col }
    }

    pub fn is_punct(&self, punct: Punctuator) -> bool {
        self.kind == TokenKind::Punctuator(punct)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(Literal::Int(value)) => write!(f, "{value}"),
            TokenKind::Literal(Literal::Char(value)) => match u8::try_from(*value) {
                Ok(byte) if byte.is_ascii_graphic() || byte == b' ' => {
                    write!(f, "'{}'", char::from(byte))
                }
                _ => write!(f, "'\\x{value:x}'"),
            },
            TokenKind::Literal(Literal::Float(value)) => write!(f, "{value:?}"),
            TokenKind::Literal(Literal::Str(text)) => write!(f, "\"{text}\""),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Punctuator(punct) => write!(f, "{punct}"),
            TokenKind::Directive(directive) => write!(f, "#{}", directive.name()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}
