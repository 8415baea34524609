//! Select items, column references and conditions.

use super::{ParseResult, Parser, MAX_CONDITION_TERMS};
use crate::token::{Token, TokenKind};
use crate::tree::{Node, NodeType};

/// Tokens that end the select list.
const SELECT_LIST_TERMINATORS: &[TokenKind] = &[
    TokenKind::From,
    TokenKind::Where,
    TokenKind::Group,
    TokenKind::Order,
    TokenKind::Having,
    TokenKind::Limit,
    TokenKind::Semicolon,
];

/// Words that cannot be an implicit select-item alias.
const SELECT_ALIAS_STOPWORDS: &[&str] = &["FROM", "WHERE", "GROUP", "ORDER", "HAVING", "LIMIT"];

/// Words that cannot be an implicit table alias.
const TABLE_ALIAS_STOPWORDS: &[&str] = &[
    "LEFT", "RIGHT", "INNER", "JOIN", "WHERE", "GROUP", "ORDER", "HAVING", "LIMIT",
];

fn is_implicit_alias(token: &Token, stopwords: &[&str]) -> bool {
    token.is(TokenKind::Identifier) && !stopwords.iter().any(|word| token.text_eq_ignore_case(word))
}

/// Select-list literals carry a lower-case `data_type`.
fn select_literal(token: &Token) -> Node {
    Node::literal(&token.text, token.kind.as_str().to_lowercase())
}

/// Condition literals carry the token kind as `data_type`.
fn condition_literal(token: &Token) -> Node {
    Node::literal(&token.text, token.kind.as_str())
}

impl<'t> Parser<'t> {
    fn at_select_list_end(&self) -> bool {
        self.current()
            .map_or(true, |token| SELECT_LIST_TERMINATORS.contains(&token.kind))
    }

    /// Comma-separated select items, possibly none.
    pub(super) fn parse_select_list(&mut self) -> ParseResult<Node> {
        let mut list = Node::new(NodeType::SelectItemList);
        while let Some(item) = self.parse_select_item()? {
            list.children.push(item);
            if self.consume_if(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(list)
    }

    /// `*`, or an expression with an optional alias.
    fn parse_select_item(&mut self) -> ParseResult<Option<Node>> {
        if self.at_select_list_end() {
            return Ok(None);
        }

        if let Some(star) = self.consume_if(TokenKind::Multiply) {
            return Ok(Some(Node::leaf(NodeType::SelectStar, &star.text)));
        }

        let expr = self.parse_select_expression()?;

        let alias = if self.consume_if(TokenKind::As).is_some() {
            let alias = self.advance().ok_or_else(|| self.error("alias after AS"))?;
            Some(alias)
        } else {
            self.consume_if_with_token(|token| is_implicit_alias(token, SELECT_ALIAS_STOPWORDS))
        };

        Ok(Some(match alias {
            Some(alias) => Node::new(NodeType::SelectItem)
                .with_alias(&alias.text)
                .with_child(expr),
            None => expr,
        }))
    }

    /// One select-list expression. The caller guarantees a current token.
    fn parse_select_expression(&mut self) -> ParseResult<Node> {
        let Some(token) = self.current() else {
            return Err(self.error("select expression"));
        };

        if token.kind.is_aggregate() && self.peek_is(1, TokenKind::LParen) {
            return self.parse_function_call();
        }
        if token.kind.is_identifier() {
            return self.parse_column_reference();
        }

        self.advance();
        if token.kind.is_literal() {
            Ok(select_literal(token))
        } else {
            Ok(Node::leaf(NodeType::Expression, &token.text))
        }
    }

    /// `name` or `table.name`, as `(table, column)` texts.
    fn parse_dotted_name(&mut self) -> ParseResult<Option<(Option<&'t str>, &'t str)>> {
        let Some(first) = self.consume_if_with(|kind| kind.is_identifier()) else {
            return Ok(None);
        };

        if self.consume_if(TokenKind::Dot).is_none() {
            return Ok(Some((None, first.text.as_str())));
        }

        let second = self
            .consume_if_with(|kind| kind.is_identifier())
            .ok_or_else(|| self.error("identifier after '.'"))?;
        Ok(Some((Some(first.text.as_str()), second.text.as_str())))
    }

    /// `column_reference` for the select list and condition atoms.
    fn parse_column_reference(&mut self) -> ParseResult<Node> {
        match self.parse_dotted_name()? {
            Some((table, column)) => Ok(Node::column_reference(table.map(str::to_string), column)),
            None => Err(self.error(TokenKind::Identifier)),
        }
    }

    /// `qualified_column` or `column` for join conditions and sort or
    /// grouping keys.
    pub(super) fn parse_qualified_column(&mut self) -> ParseResult<Option<Node>> {
        Ok(self.parse_dotted_name()?.map(|(table, column)| match table {
            Some(table) => Node::qualified_column(table, column),
            None => Node::leaf(NodeType::Column, column),
        }))
    }

    /// Column reference, literal or aggregate call.
    fn parse_expression_atom(&mut self) -> ParseResult<Option<Node>> {
        let Some(token) = self.current() else {
            return Ok(None);
        };

        if token.kind.is_identifier() {
            self.parse_column_reference().map(Some)
        } else if token.kind.is_literal() {
            self.advance();
            Ok(Some(condition_literal(token)))
        } else if token.kind.is_aggregate() {
            self.parse_function_call().map(Some)
        } else {
            Ok(None)
        }
    }

    /// `AGG [( [* | atom] )]`. Only one argument is recognised; both
    /// parentheses are taken when present and otherwise left alone.
    fn parse_function_call(&mut self) -> ParseResult<Node> {
        let Some(name) = self.consume_if_with(|kind| kind.is_aggregate()) else {
            return Err(self.error("aggregate function"));
        };

        let mut call = Node::new(NodeType::FunctionCall);
        call.function_name = Some(name.text.clone());

        if self.consume_if(TokenKind::LParen).is_none() {
            return Ok(call);
        }

        if let Some(star) = self.consume_if(TokenKind::Multiply) {
            call = call.with_child(Node::leaf(NodeType::Wildcard, &star.text));
        } else if !self.check(TokenKind::RParen) {
            let argument = self.nested(|parser| parser.parse_expression_atom())?;
            call = call.with_optional_child(argument);
        }

        self.consume_if(TokenKind::RParen);
        Ok(call)
    }

    /// Simple conditions joined by `AND` / `OR`, left-associative with equal
    /// precedence.
    pub(super) fn parse_condition(&mut self) -> ParseResult<Option<Node>> {
        let Some(mut left) = self.parse_simple_condition()? else {
            return Ok(None);
        };

        let mut terms = 1;
        while let Some(op) =
            self.consume_if_with(|kind| matches!(kind, TokenKind::And | TokenKind::Or))
        {
            if terms == MAX_CONDITION_TERMS {
                return Err(self.too_deep("condition chain", MAX_CONDITION_TERMS));
            }
            terms += 1;

            let right = self
                .parse_simple_condition()?
                .ok_or_else(|| self.error(format!("condition after {}", op.text)))?;
            left = Node::binary(NodeType::LogicalOperation, &op.text, left, right);
        }

        Ok(Some(left))
    }

    /// `atom`, `atom <op> atom` or `atom IS [NOT] NULL`.
    fn parse_simple_condition(&mut self) -> ParseResult<Option<Node>> {
        let Some(left) = self.parse_expression_atom()? else {
            return Ok(None);
        };

        if let Some(op) = self.consume_if_with(|kind| kind.is_comparison()) {
            let right = self
                .parse_expression_atom()?
                .ok_or_else(|| self.error(format!("expression after '{}'", op.text)))?;
            return Ok(Some(Node::binary(NodeType::Comparison, &op.text, left, right)));
        }

        if self.consume_if(TokenKind::Is).is_some() {
            let negated = self.consume_if(TokenKind::Not).is_some();
            self.expect(TokenKind::Null)?;
            let operator = if negated { "IS NOT NULL" } else { "IS NULL" };
            return Ok(Some(
                Node::new(NodeType::NullCheck)
                    .with_operator(operator)
                    .with_child(left),
            ));
        }

        Ok(Some(left))
    }

    /// `column <op> column` after ON. Without an operator the left column is
    /// returned on its own.
    pub(super) fn parse_join_condition(&mut self) -> ParseResult<Option<Node>> {
        let Some(left) = self.parse_qualified_column()? else {
            return Ok(None);
        };

        let Some(op) = self.consume_if_with(|kind| kind.is_comparison()) else {
            return Ok(Some(left));
        };

        let right = self
            .parse_qualified_column()?
            .ok_or_else(|| self.error(format!("column after '{}'", op.text)))?;
        Ok(Some(Node::binary(NodeType::JoinCondition, &op.text, left, right)))
    }

    /// `table [[AS] alias]`. Never fails; `None` if no table name is present.
    pub(super) fn parse_table_reference(&mut self) -> Option<Node> {
        let table = self.consume_if_with(|kind| kind.is_identifier())?;

        let alias = if self.consume_if(TokenKind::As).is_some() {
            self.consume_if(TokenKind::Identifier)
        } else {
            self.consume_if_with_token(|token| is_implicit_alias(token, TABLE_ALIAS_STOPWORDS))
        };

        Some(Node::table_reference(
            &table.text,
            alias.map(|alias| alias.text.clone()),
        ))
    }

    /// Consumes the current token if it satisfies `predicate`.
    fn consume_if_with_token(&mut self, predicate: impl FnOnce(&Token) -> bool) -> Option<&'t Token> {
        match self.current() {
            Some(token) if predicate(token) => self.advance(),
            _ => None,
        }
    }
}
