//! Hand-written SQL tokenizer.
//!
//! The [`Lexer`] scans its input left to right and never fails. At each
//! position it skips whitespace and comments, then tries the classification
//! rules in a fixed priority order and keeps the first one that matches:
//!
//! 1. reserved keywords (whole words only, case-insensitive)
//! 2. two-character comparison operators, then single-character operators
//!    and punctuation
//! 3. `'single quoted'` strings
//! 4. `` `backtick quoted` `` identifiers
//! 5. decimals (`digits.digits`), then integers
//! 6. identifiers (`[A-Za-z_][A-Za-z0-9_]*`)
//!
//! A character no rule accepts is dropped and scanning continues after it.

use tracing::debug;

use crate::token::{Token, TokenKind};

/// Operators and punctuation. Two-character forms come first so `>=` is not
/// split into `>` and `=`.
const OPERATORS: &[(&str, TokenKind)] = &[
    (">=", TokenKind::Ge),
    ("<=", TokenKind::Le),
    ("<>", TokenKind::Ne),
    ("!=", TokenKind::Ne),
    ("=", TokenKind::Eq),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Mod),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    (".", TokenKind::Dot),
];

/// Tokenizes `sql` into a vector of tokens in source order.
pub fn tokenize(sql: &str) -> Vec<Token> {
    let tokens = Lexer::new(sql).tokenize();
    debug!("Tokenized {} bytes into {} tokens", sql.len(), tokens.len());
    tokens
}

/// Characters that continue a word for keyword boundary checks.
fn is_word_char(chr: char) -> bool {
    chr.is_alphanumeric() || chr == '_'
}

/// Characters allowed after the first one in an identifier.
fn is_ident_part(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || chr == '_'
}

/// SQL tokenizer over a borrowed input string. See [`Lexer::tokenize`].
pub struct Lexer<'i> {
    /// Source text.
    input: &'i str,
    /// Byte offset of the next unread character.
    position: usize,
}

impl<'i> Lexer<'i> {
    /// Creates a lexer positioned at the start of `input`.
    pub fn new(input: &'i str) -> Self {
        Self { input, position: 0 }
    }

    /// Consumes the lexer and returns every token in the input.
    pub fn tokenize(self) -> Vec<Token> {
        self.collect()
    }

    /// Unread part of the input.
    fn rest(&self) -> &'i str {
        &self.input[self.position..]
    }

    /// Returns the next token, or `None` once the input is exhausted.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            let chr = self.rest().chars().next()?;

            if chr.is_whitespace() {
                self.position += chr.len_utf8();
                continue;
            }

            if self.skip_comment() {
                continue;
            }

            match self.classify(chr) {
                Some(token) => {
                    self.position = token.end;
                    return Some(token);
                }
                // Unknown character.
                None => self.position += chr.len_utf8(),
            }
        }
    }

    /// Skips a `-- line` or `/* block */` comment starting at the current
    /// position. An unterminated block comment is left for the operator
    /// rules to lex as `/` and `*`.
    fn skip_comment(&mut self) -> bool {
        let rest = self.rest();

        if rest.starts_with("--") {
            self.position += rest.find('\n').map_or(rest.len(), |newline| newline + 1);
            return true;
        }

        if let Some(body) = rest.strip_prefix("/*") {
            if let Some(close) = body.find("*/") {
                self.position += 2 + close + 2;
                return true;
            }
        }

        false
    }

    /// Applies the classification rules in priority order.
    fn classify(&self, first: char) -> Option<Token> {
        self.match_word(first)
            .or_else(|| self.match_operator())
            .or_else(|| self.match_quoted('\'', TokenKind::String))
            .or_else(|| self.match_quoted('`', TokenKind::BacktickIdentifier))
            .or_else(|| self.match_number())
    }

    /// Keywords and identifiers. A reserved word only counts as a keyword
    /// when it stands alone as a word on both sides.
    fn match_word(&self, first: char) -> Option<Token> {
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }

        let rest = self.rest();
        let len = rest
            .find(|chr: char| !is_ident_part(chr))
            .unwrap_or(rest.len());
        let word = &rest[..len];

        let kind = match TokenKind::keyword(word) {
            Some(keyword) if self.word_boundary_before() && Self::word_boundary_at(rest, len) => {
                keyword
            }
            _ => TokenKind::Identifier,
        };

        Some(Token::new(kind, word, self.position))
    }

    fn word_boundary_before(&self) -> bool {
        self.input[..self.position]
            .chars()
            .next_back()
            .map_or(true, |chr| !is_word_char(chr))
    }

    fn word_boundary_at(text: &str, offset: usize) -> bool {
        text[offset..]
            .chars()
            .next()
            .map_or(true, |chr| !is_word_char(chr))
    }

    fn match_operator(&self) -> Option<Token> {
        let rest = self.rest();
        OPERATORS
            .iter()
            .find(|(op, _)| rest.starts_with(op))
            .map(|(op, kind)| Token::new(*kind, *op, self.position))
    }

    /// A run of non-quote characters between two `quote` characters. No
    /// escapes are recognised; an unterminated literal does not match.
    fn match_quoted(&self, quote: char, kind: TokenKind) -> Option<Token> {
        let body = self.rest().strip_prefix(quote)?;
        let close = body.find(quote)?;
        let len = 2 * quote.len_utf8() + close;
        Some(Token::new(kind, &self.rest()[..len], self.position))
    }

    fn match_number(&self) -> Option<Token> {
        let rest = self.rest();
        let digits = |text: &str| {
            text.find(|chr: char| !chr.is_ascii_digit())
                .unwrap_or(text.len())
        };

        let integer = digits(rest);
        if integer == 0 {
            return None;
        }

        if let Some(fraction) = rest[integer..].strip_prefix('.') {
            let fraction_len = digits(fraction);
            if fraction_len > 0 {
                let len = integer + 1 + fraction_len;
                return Some(Token::new(TokenKind::Decimal, &rest[..len], self.position));
            }
        }

        Some(Token::new(TokenKind::Integer, &rest[..integer], self.position))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        tokenize(sql).into_iter().map(|token| token.kind).collect()
    }

    fn texts(sql: &str) -> Vec<std::string::String> {
        tokenize(sql).into_iter().map(|token| token.text).collect()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(kinds("SELECT * FROM users"), vec![Select, Multiply, From, Identifier]);
        assert_eq!(texts("SELECT * FROM users"), vec!["SELECT", "*", "FROM", "users"]);
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_keep_text() {
        let tokens = tokenize("select Count(*) frOm t");
        assert_eq!(tokens[0].kind, Select);
        assert_eq!(tokens[0].text, "select");
        assert_eq!(tokens[1].kind, Count);
        assert_eq!(tokens[1].text, "Count");
        assert_eq!(tokens[5].kind, From);
        assert_eq!(tokens[5].text, "frOm");
    }

    #[test]
    fn test_keyword_needs_word_boundaries() {
        assert_eq!(kinds("selected"), vec![Identifier]);
        assert_eq!(kinds("order_id"), vec![Identifier]);
        assert_eq!(kinds("_from"), vec![Identifier]);
        // A digit glued to the front means the word is not a keyword.
        assert_eq!(kinds("1FROM"), vec![Integer, Identifier]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds(">= <= <> != = < > + - * / % ; , ( ) ."),
            vec![
                Ge, Le, Ne, Ne, Eq, Lt, Gt, Plus, Minus, Multiply, Divide, Mod, Semicolon,
                Comma, LParen, RParen, Dot
            ]
        );
        assert_eq!(texts("a<>b"), vec!["a", "<>", "b"]);
        assert_eq!(texts("a!=b"), vec!["a", "!=", "b"]);
        assert_eq!(kinds("a>=1"), vec![Identifier, Ge, Integer]);
    }

    #[test]
    fn test_literals() {
        let tokens = tokenize("'it''s' `my col` 3.14 42 7.");
        let found: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (String, "'it'"),
                (String, "'s'"),
                (BacktickIdentifier, "`my col`"),
                (Decimal, "3.14"),
                (Integer, "42"),
                (Integer, "7"),
                (Dot, "."),
            ]
        );
    }

    #[test]
    fn test_string_spans_lines_and_keeps_keywords() {
        let tokens = tokenize("'a\nFROM b'");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, String);
    }

    #[test]
    fn test_unterminated_quotes_are_skipped() {
        assert_eq!(kinds("'abc"), vec![Identifier]);
        assert_eq!(texts("`abc"), vec!["abc"]);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        assert_eq!(kinds("SELECT @a # $ ! ?"), vec![Select, Identifier]);
        assert_eq!(texts("SELECT é1 ; 名前"), vec!["SELECT", "1", ";"]);
    }

    #[test]
    fn test_spans_are_byte_offsets_into_source() {
        let sql = "SELECT  name /* c */ FROM\n\tt";
        for token in tokenize(sql) {
            assert_eq!(&sql[token.start..token.end], token.text);
        }
        let tokens = tokenize(sql);
        assert_eq!(tokens[1].start, 8);
        assert_eq!(tokens[2].start, 21);
    }

    #[test]
    fn test_line_comments() {
        let with_comment: Vec<_> = kinds("SELECT 1 -- comment\n");
        assert_eq!(with_comment, kinds("SELECT 1\n"));
        assert_eq!(kinds("SELECT 1 -- trailing comment"), vec![Select, Integer]);
        assert_eq!(kinds("-- only a comment"), vec![]);
        assert_eq!(
            kinds("SELECT a -- first\nFROM t -- second\n"),
            vec![Select, Identifier, From, Identifier]
        );
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(
            kinds("SELECT /* multi\nline */ a FROM/**/t"),
            vec![Select, Identifier, From, Identifier]
        );
        assert_eq!(kinds("a /* unterminated"), vec![Identifier, Divide, Multiply, Identifier]);
    }

    #[test]
    fn test_comment_markers_inside_strings() {
        assert_eq!(texts("'--x' '/*y*/'"), vec!["'--x'", "'/*y*/'"]);
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\r\n ").is_empty());
        assert!(tokenize("/* */ -- \n").is_empty());
    }

    #[test]
    fn test_all_keywords_lex_as_keywords() {
        for (name, kind) in crate::token::KEYWORDS {
            assert_eq!(kinds(name), vec![*kind], "keyword {name}");
            assert_eq!(kinds(&name.to_lowercase()), vec![*kind], "keyword {name}");
        }
        assert_eq!(kinds("ASC DESC"), vec![Identifier, Identifier]);
    }
}
