//! SQL token types.
//!
//! The token set is closed: reserved keywords, operators and punctuation,
//! three literal kinds and two identifier kinds. Every [`Token`] keeps the
//! verbatim source text it was matched from along with its byte span.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // -----------------------------------------------------------------------
    // Keywords
    // -----------------------------------------------------------------------
    /// `SELECT`
    Select,
    /// `FROM`
    From,
    /// `WHERE`
    Where,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `INSERT`
    Insert,
    /// `INTO`
    Into,
    /// `VALUES`
    Values,
    /// `UPDATE`
    Update,
    /// `SET`
    Set,
    /// `DELETE`
    Delete,
    /// `CREATE`
    Create,
    /// `TABLE`
    Table,
    /// `DROP`
    Drop,
    /// `JOIN`
    Join,
    /// `INNER`
    Inner,
    /// `LEFT`
    Left,
    /// `RIGHT`
    Right,
    /// `ON`
    On,
    /// `GROUP`
    Group,
    /// `BY`
    By,
    /// `ORDER`
    Order,
    /// `HAVING`
    Having,
    /// `LIMIT`
    Limit,
    /// `AS`
    As,
    /// `DISTINCT`
    Distinct,
    /// `NULL`
    Null,
    /// `NOT`
    Not,
    /// `IS`
    Is,
    /// `LIKE`
    Like,
    /// `IN`
    In,
    /// `BETWEEN`
    Between,
    /// `COUNT`
    Count,
    /// `SUM`
    Sum,
    /// `AVG`
    Avg,
    /// `MAX`
    Max,
    /// `MIN`
    Min,

    // -----------------------------------------------------------------------
    // Operators and punctuation
    // -----------------------------------------------------------------------
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `<>` or `!=`
    Ne,
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Mod,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `(`
    #[serde(rename = "LPAREN")]
    LParen,
    /// `)`
    #[serde(rename = "RPAREN")]
    RParen,
    /// `.`
    Dot,

    // -----------------------------------------------------------------------
    // Literals and identifiers
    // -----------------------------------------------------------------------
    /// Single-quoted string, quotes included in the token text.
    String,
    /// Backtick-quoted identifier, backticks included in the token text.
    BacktickIdentifier,
    /// `digits.digits`
    Decimal,
    /// `digits`
    Integer,
    /// Letter or underscore, then letters, digits or underscores.
    Identifier,
}

/// Reserved words in lexing priority order.
pub(crate) const KEYWORDS: &[(&str, TokenKind)] = &[
    ("SELECT", TokenKind::Select),
    ("FROM", TokenKind::From),
    ("WHERE", TokenKind::Where),
    ("AND", TokenKind::And),
    ("OR", TokenKind::Or),
    ("INSERT", TokenKind::Insert),
    ("INTO", TokenKind::Into),
    ("VALUES", TokenKind::Values),
    ("UPDATE", TokenKind::Update),
    ("SET", TokenKind::Set),
    ("DELETE", TokenKind::Delete),
    ("CREATE", TokenKind::Create),
    ("TABLE", TokenKind::Table),
    ("DROP", TokenKind::Drop),
    ("JOIN", TokenKind::Join),
    ("INNER", TokenKind::Inner),
    ("LEFT", TokenKind::Left),
    ("RIGHT", TokenKind::Right),
    ("ON", TokenKind::On),
    ("GROUP", TokenKind::Group),
    ("BY", TokenKind::By),
    ("ORDER", TokenKind::Order),
    ("HAVING", TokenKind::Having),
    ("LIMIT", TokenKind::Limit),
    ("AS", TokenKind::As),
    ("DISTINCT", TokenKind::Distinct),
    ("NULL", TokenKind::Null),
    ("NOT", TokenKind::Not),
    ("IS", TokenKind::Is),
    ("LIKE", TokenKind::Like),
    ("IN", TokenKind::In),
    ("BETWEEN", TokenKind::Between),
    ("COUNT", TokenKind::Count),
    ("SUM", TokenKind::Sum),
    ("AVG", TokenKind::Avg),
    ("MAX", TokenKind::Max),
    ("MIN", TokenKind::Min),
];

impl TokenKind {
    /// Looks up a reserved word, ignoring ASCII case.
    pub fn keyword(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, kind)| *kind)
    }

    /// Returns `true` for the reserved words.
    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    /// Returns `true` for `= <> != < <= > >=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// Returns `true` for `COUNT SUM AVG MIN MAX`.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Count | Self::Sum | Self::Avg | Self::Min | Self::Max
        )
    }

    /// Returns `true` for plain and backtick-quoted identifiers.
    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier | Self::BacktickIdentifier)
    }

    /// Returns `true` for string, integer and decimal literals.
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Decimal)
    }

    /// Returns `true` for `LEFT RIGHT INNER`.
    pub fn is_join_qualifier(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Inner)
    }

    /// Canonical upper-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Table => "TABLE",
            Self::Drop => "DROP",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::On => "ON",
            Self::Group => "GROUP",
            Self::By => "BY",
            Self::Order => "ORDER",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::As => "AS",
            Self::Distinct => "DISTINCT",
            Self::Null => "NULL",
            Self::Not => "NOT",
            Self::Is => "IS",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Ge => "GE",
            Self::Le => "LE",
            Self::Ne => "NE",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Multiply => "MULTIPLY",
            Self::Divide => "DIVIDE",
            Self::Mod => "MOD",
            Self::Semicolon => "SEMICOLON",
            Self::Comma => "COMMA",
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::Dot => "DOT",
            Self::String => "STRING",
            Self::BacktickIdentifier => "BACKTICK_IDENTIFIER",
            Self::Decimal => "DECIMAL",
            Self::Integer => "INTEGER",
            Self::Identifier => "IDENTIFIER",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token.
///
/// `start..end` is the byte range of `text` in the source string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Matched text, original case preserved.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Creates a token covering `text` starting at byte `start`.
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        let end = start + text.len();
        Self {
            kind,
            text,
            start,
            end,
        }
    }

    /// Returns `true` if the token has the given kind.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Returns `true` if the text equals `word`, ignoring ASCII case.
    pub fn text_eq_ignore_case(&self, word: &str) -> bool {
        self.text.eq_ignore_ascii_case(word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.text)
    }
}
