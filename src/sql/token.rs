/// Token types for the SQL lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    And,
    Or,
    Not,
    Like,
    Is,
    Null,
    As,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    True,
    False,

    // Operators
    Eq,      // =
    Ne,      // != or <>
    Lt,      // <
    Gt,      // >
    Le,      // <=
    Ge,      // >=
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Delimiters
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;

    // Literals and placeholders
    Number(f64),
    String(String),
    Identifier(String),
    Param, // positional `?`

    // Special
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(token_type: TokenType, line: usize, column: usize) -> Self {
        Self {
            token_type,
            line,
            column,
        }
    }
}

impl TokenType {
    /// Case-insensitive keyword lookup.
    pub fn from_keyword(s: &str) -> Option<Self> {
        let keyword = match s.to_ascii_lowercase().as_str() {
            "select" => TokenType::Select,
            "from" => TokenType::From,
            "where" => TokenType::Where,
            "insert" => TokenType::Insert,
            "into" => TokenType::Into,
            "values" => TokenType::Values,
            "update" => TokenType::Update,
            "set" => TokenType::Set,
            "delete" => TokenType::Delete,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "not" => TokenType::Not,
            "like" => TokenType::Like,
            "is" => TokenType::Is,
            "null" => TokenType::Null,
            "as" => TokenType::As,
            "order" => TokenType::Order,
            "by" => TokenType::By,
            "asc" => TokenType::Asc,
            "desc" => TokenType::Desc,
            "limit" => TokenType::Limit,
            "offset" => TokenType::Offset,
            "true" => TokenType::True,
            "false" => TokenType::False,
            _ => return None,
        };
        Some(keyword)
    }
}
