use std::fmt;

/// Expression operators carried by `TokenId::Expr` and `TokenId::IncDec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprOp {
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    Plus,
    Minus,
    Div,
    Mod,
    LShift,
    RShift,
    Mul,
    Inc,
    Dec,
}

impl ExprOp {
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            ExprOp::Less
                | ExprOp::LessEq
                | ExprOp::Greater
                | ExprOp::GreaterEq
                | ExprOp::Eq
                | ExprOp::NotEq
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            ExprOp::Plus
                | ExprOp::Minus
                | ExprOp::Div
                | ExprOp::Mod
                | ExprOp::LShift
                | ExprOp::RShift
                | ExprOp::Mul
        )
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ExprOp::Less => "<",
            ExprOp::LessEq => "<=",
            ExprOp::Greater => ">",
            ExprOp::GreaterEq => ">=",
            ExprOp::Eq => "==",
            ExprOp::NotEq => "!=",
            ExprOp::Plus => "+",
            ExprOp::Minus => "-",
            ExprOp::Div => "/",
            ExprOp::Mod => "%",
            ExprOp::LShift => "<<",
            ExprOp::RShift => ">>",
            ExprOp::Mul => "*",
            ExprOp::Inc => "++",
            ExprOp::Dec => "--",
        }
    }
}

/// Logical operators carried by `TokenId::Logical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOp {
    And,
    Or,
    Not,
}

impl CondOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CondOp::And => "&&",
            CondOp::Or => "||",
            CondOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenId {
    /// Lexical error. The token text holds the message.
    Err,
    LParen,
    RParen,
    If,
    Else,
    LBrace,
    RBrace,
    Logical(CondOp),
    Expr(ExprOp),
    Semi,
    /// String or numeric literal. The token text holds the decoded value.
    Literal,
    /// Identifier directly followed by `(`.
    Function,
    Newline,
    Id,
    Eof,
    Comma,
    Var,
    Assignment,
    For,
    IncDec(ExprOp),
    Return,
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Err => write!(f, "<error>"),
            TokenId::LParen => write!(f, "("),
            TokenId::RParen => write!(f, ")"),
            TokenId::If => write!(f, "if"),
            TokenId::Else => write!(f, "else"),
            TokenId::LBrace => write!(f, "{{"),
            TokenId::RBrace => write!(f, "}}"),
            TokenId::Logical(op) => write!(f, "{}", op.symbol()),
            TokenId::Expr(op) | TokenId::IncDec(op) => write!(f, "{}", op.symbol()),
            TokenId::Semi => write!(f, ";"),
            TokenId::Literal => write!(f, "literal"),
            TokenId::Function => write!(f, "function name"),
            TokenId::Newline => write!(f, "newline"),
            TokenId::Id => write!(f, "identifier"),
            TokenId::Eof => write!(f, "end of script"),
            TokenId::Comma => write!(f, ","),
            TokenId::Var => write!(f, "var"),
            TokenId::Assignment => write!(f, "="),
            TokenId::For => write!(f, "for"),
            TokenId::Return => write!(f, "return"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub text: String,
}

impl Token {
    pub fn new(id: TokenId, text: impl Into<String>) -> Self {
        Token {
            id,
            text: text.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenId::Eof, "")
    }
}
