//! SQL Parser for SqlScope.
//!
//! A recursive-descent parser over the token vector produced by the
//! [`lexer`](crate::lexer). It never backtracks: every decision is made on
//! the current token plus at most one token of lookahead.
//!
//! # Supported SQL
//!
//! - SELECT with FROM, `[LEFT|RIGHT|INNER] JOIN … ON`, WHERE, GROUP BY,
//!   HAVING, ORDER BY and LIMIT, in that order
//! - INSERT, UPDATE, DELETE and CREATE are recognised and reported as empty
//!   placeholder nodes
//!
//! # Usage
//!
//! ```
//! use sqlscope_sql::parser::parse;
//! use sqlscope_sql::NodeType;
//!
//! let tree = parse("SELECT id, name FROM users WHERE age > 18");
//! assert_eq!(tree.kind, NodeType::QueryAnalysis);
//!
//! // Failures come back as an `error` node instead of a Rust error.
//! let tree = parse("SELECT a FROM t WHERE a IS 5");
//! assert_eq!(tree.kind, NodeType::Error);
//! ```

use thiserror::Error;
use tracing::warn;

use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};
use crate::tree::{Node, NodeType};

mod expr;
mod select;

/// Deepest nesting of aggregate calls inside one another.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Most simple conditions one `AND`/`OR` chain may join.
pub const MAX_CONDITION_TERMS: usize = 512;

/// Errors raised when a token the grammar requires is missing.
///
/// These never escape [`parse`]; they are turned into an `error` node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A different token was found where `expected` was required.
    #[error("expected {expected}, found {found} at offset {offset}")]
    Unexpected {
        /// What the grammar required.
        expected: String,
        /// Kind and text of the token found instead.
        found: String,
        /// Byte offset of the offending token.
        offset: usize,
    },

    /// The input ended where `expected` was required.
    #[error("expected {expected}, found end of input")]
    UnexpectedEof {
        /// What the grammar required.
        expected: String,
    },

    /// An expression nests or chains deeper than the parser allows.
    #[error("{what} exceeds {limit} levels at offset {offset}")]
    TooDeep {
        /// The construct that grew too deep.
        what: &'static str,
        /// The limit that was exceeded.
        limit: usize,
        /// Byte offset of the token where the limit was hit.
        offset: usize,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Tokenizes and parses a single SQL statement.
///
/// Always returns a tree: `root` for an input with no tokens, an `error`
/// node when a required token is missing, otherwise the statement's node.
pub fn parse(sql: &str) -> Node {
    let tokens = tokenize(sql);
    Parser::new(&tokens).parse()
}

/// Recursive-descent parser over a borrowed token slice.
///
/// Holds the only mutable state of a parse, the cursor, so a parser is
/// built per statement and never shared.
pub struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    /// Creates a parser positioned at the first token.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parses the statement, converting a [`ParseError`] into an `error`
    /// node.
    pub fn parse(mut self) -> Node {
        if self.tokens.is_empty() {
            return Node::new(NodeType::Root);
        }

        match self.parse_statement() {
            Ok(node) => node,
            Err(e) => {
                warn!("Failed to parse statement: {}", e);
                Node::error(e.to_string())
            }
        }
    }

    /// Dispatches on the first token.
    pub fn parse_statement(&mut self) -> ParseResult<Node> {
        let Some(token) = self.current() else {
            return Ok(Node::new(NodeType::Root));
        };

        let placeholder = match token.kind {
            TokenKind::Select => return self.parse_select(),
            TokenKind::Insert => NodeType::Insert,
            TokenKind::Update => NodeType::Update,
            TokenKind::Delete => NodeType::Delete,
            TokenKind::Create => NodeType::Create,
            _ => return Ok(Node::leaf(NodeType::UnknownStatement, token.text.clone())),
        };

        self.advance();
        Ok(Node::new(placeholder))
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    fn current(&self) -> Option<&'t Token> {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.position + offset)
    }

    /// Number of tokens not yet consumed.
    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.position)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_is(0, kind)
    }

    fn peek_is(&self, offset: usize, kind: TokenKind) -> bool {
        self.peek(offset).is_some_and(|token| token.is(kind))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.current()?;
        self.position += 1;
        Some(token)
    }

    /// Consumes the current token if its kind satisfies `predicate`.
    fn consume_if_with(&mut self, predicate: impl FnOnce(TokenKind) -> bool) -> Option<&'t Token> {
        match self.current() {
            Some(token) if predicate(token.kind) => self.advance(),
            _ => None,
        }
    }

    fn consume_if(&mut self, kind: TokenKind) -> Option<&'t Token> {
        self.consume_if_with(|found| found == kind)
    }

    /// Consumes a token of the given kind or fails.
    fn expect(&mut self, kind: TokenKind) -> ParseResult<&'t Token> {
        match self.consume_if(kind) {
            Some(token) => Ok(token),
            None => Err(self.error(kind)),
        }
    }

    /// Runs `f` one aggregate nesting level deeper, failing past
    /// [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep("aggregate nesting", MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn too_deep(&self, what: &'static str, limit: usize) -> ParseError {
        let offset = self
            .current()
            .or_else(|| self.tokens.last())
            .map_or(0, |token| token.start);
        ParseError::TooDeep {
            what,
            limit,
            offset,
        }
    }

    /// Builds an error describing what was required at the current token.
    fn error(&self, expected: impl ToString) -> ParseError {
        let expected = expected.to_string();
        match self.current() {
            Some(token) => ParseError::Unexpected {
                expected,
                found: format!("{} '{}'", token.kind, token.text),
                offset: token.start,
            },
            None => ParseError::UnexpectedEof { expected },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ast(tree: &Node) -> &Node {
        assert_eq!(tree.kind, NodeType::QueryAnalysis, "{}", tree);
        &tree.children[0]
    }

    fn plan_kinds(tree: &Node) -> Vec<NodeType> {
        tree.children[1].children.iter().map(|c| c.kind).collect()
    }

    fn select_items(tree: &Node) -> &[Node] {
        let list = ast(tree)
            .find_child(NodeType::SelectExpressionList)
            .expect("select list");
        assert_eq!(list.children[0].kind, NodeType::SelectItemList);
        &list.children[0].children
    }

    fn clause<'a>(tree: &'a Node, wrapper: NodeType) -> &'a Node {
        let node = ast(tree).find_child(wrapper).expect("clause wrapper");
        assert_eq!(node.children.len(), 1);
        &node.children[0]
    }

    #[test]
    fn test_empty_input_yields_root() {
        for sql in ["", "   \n\t", "-- nothing here\n", "/* still nothing */", "@#$"] {
            let tree = parse(sql);
            assert_eq!(tree.kind, NodeType::Root);
            assert!(tree.children.is_empty());
        }
    }

    #[test]
    fn test_placeholder_statements() {
        let cases = [
            ("INSERT INTO t VALUES (1)", NodeType::Insert),
            ("update t set a = 1", NodeType::Update),
            ("DELETE FROM t WHERE id = 1", NodeType::Delete),
            ("CREATE TABLE t (id INT)", NodeType::Create),
        ];
        for (sql, kind) in cases {
            let tree = parse(sql);
            assert_eq!(tree.kind, kind);
            assert!(tree.children.is_empty());
        }
    }

    #[test]
    fn test_unknown_statement() {
        let tree = parse("drop table users");
        assert_eq!(tree.kind, NodeType::UnknownStatement);
        assert_eq!(tree.value.as_deref(), Some("drop"));

        let tree = parse("42");
        assert_eq!(tree.kind, NodeType::UnknownStatement);
        assert_eq!(tree.value.as_deref(), Some("42"));
    }

    #[test]
    fn test_select_star() {
        let tree = parse("SELECT * FROM users");
        let items = select_items(&tree);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, NodeType::SelectStar);
        assert_eq!(items[0].value.as_deref(), Some("*"));

        let from = clause(&tree, NodeType::TableReferences);
        assert_eq!(from.kind, NodeType::FromClause);
        let table = &from.children[0];
        assert_eq!(table.kind, NodeType::TableReference);
        assert_eq!(table.table_name.as_deref(), Some("users"));
        assert_eq!(table.alias, None);

        assert_eq!(
            plan_kinds(&tree),
            vec![NodeType::TableScan, NodeType::SelectOperation]
        );
    }

    #[test]
    fn test_select_items_and_where() {
        let tree = parse("SELECT id, name AS n FROM t WHERE id = 5");
        let items = select_items(&tree);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0], Node::column_reference(None, "id"));

        assert_eq!(items[1].kind, NodeType::SelectItem);
        assert_eq!(items[1].alias.as_deref(), Some("n"));
        assert_eq!(items[1].children, vec![Node::column_reference(None, "name")]);

        let where_clause = clause(&tree, NodeType::WhereExpression);
        assert_eq!(where_clause.kind, NodeType::WhereClause);
        let comparison = &where_clause.children[0];
        assert_eq!(comparison.kind, NodeType::Comparison);
        assert_eq!(comparison.operator.as_deref(), Some("="));
        assert_eq!(comparison.children[0], Node::column_reference(None, "id"));
        assert_eq!(comparison.children[1], Node::literal("5", "INTEGER"));

        assert_eq!(
            plan_kinds(&tree),
            vec![
                NodeType::TableScan,
                NodeType::FilterOperation,
                NodeType::SelectOperation
            ]
        );
    }

    #[test]
    fn test_left_join() {
        let tree = parse("SELECT a FROM t1 LEFT JOIN t2 ON t1.id = t2.id");
        let joined = ast(&tree)
            .find_child(NodeType::JoinedTable)
            .expect("joined table");
        assert_eq!(joined.children.len(), 1);

        let join = &joined.children[0];
        assert_eq!(join.kind, NodeType::Join);
        assert_eq!(join.children[0], Node::leaf(NodeType::JoinType, "LEFT"));
        assert_eq!(join.children[1], Node::keyword("JOIN"));
        assert_eq!(join.children[2], Node::table_reference("t2", None));

        let on = &join.children[3];
        assert_eq!(on.kind, NodeType::On);
        assert_eq!(on.children[0], Node::keyword("ON"));
        let condition = &on.children[1];
        assert_eq!(condition.kind, NodeType::JoinCondition);
        assert_eq!(condition.operator.as_deref(), Some("="));
        assert_eq!(condition.children[0], Node::qualified_column("t1", "id"));
        assert_eq!(condition.children[1], Node::qualified_column("t2", "id"));

        assert_eq!(
            plan_kinds(&tree),
            vec![
                NodeType::TableScan,
                NodeType::JoinOperation,
                NodeType::SelectOperation
            ]
        );
    }

    #[test]
    fn test_count_star() {
        let tree = parse("SELECT COUNT(*) FROM t");
        let items = select_items(&tree);
        assert_eq!(items[0].kind, NodeType::FunctionCall);
        assert_eq!(items[0].function_name.as_deref(), Some("COUNT"));
        assert_eq!(items[0].children, vec![Node::leaf(NodeType::Wildcard, "*")]);
    }

    #[test]
    fn test_missing_select_list_does_not_fail() {
        let tree = parse("SELECT FROM");
        assert!(select_items(&tree).is_empty());

        let from = clause(&tree, NodeType::TableReferences);
        assert!(from.children.is_empty());
    }

    #[test]
    fn test_error_node_for_missing_required_token() {
        let tree = parse("SELECT a FROM t WHERE a IS 5");
        assert!(tree.is_error());
        assert!(tree.children.is_empty());
        assert_eq!(
            tree.message.as_deref(),
            Some("expected NULL, found INTEGER '5' at offset 27")
        );

        let tree = parse("SELECT a FROM t WHERE a =");
        assert!(tree.is_error());
        assert!(tree.message.unwrap().ends_with("found end of input"));
    }

    #[test]
    fn test_full_clause_order_in_plan() {
        let tree = parse(
            "SELECT dept, COUNT(*) AS total FROM emp e \
             INNER JOIN dept d ON e.dept_id = d.id \
             WHERE e.active = 1 AND e.salary > 1000.50 \
             GROUP BY dept \
             HAVING COUNT(*) > 3 \
             ORDER BY dept DESC \
             LIMIT 10;",
        );

        let plan = &tree.children[1];
        assert_eq!(plan.kind, NodeType::ExecutionPlan);
        let orders: Vec<u8> = plan
            .children
            .iter()
            .map(|c| c.execution_order.unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let wrappers: Vec<NodeType> = ast(&tree).children.iter().map(|c| c.kind).collect();
        assert_eq!(
            wrappers,
            vec![
                NodeType::SelectExpressionList,
                NodeType::TableReferences,
                NodeType::JoinedTable,
                NodeType::WhereExpression,
                NodeType::GroupByExpression,
                NodeType::HavingExpression,
                NodeType::OrderByExpression,
                NodeType::LimitExpression,
            ]
        );
    }

    #[test]
    fn test_plan_children_mirror_ast_clauses() {
        let tree = parse("SELECT a FROM t WHERE b = 'x' LIMIT 3");
        let plan = &tree.children[1];

        let filter = plan.find_child(NodeType::FilterOperation).unwrap();
        assert_eq!(filter.children[0], *clause(&tree, NodeType::WhereExpression));
        assert_eq!(
            filter.description.as_deref(),
            Some("Filter out rows that do not satisfy the condition")
        );

        let limit = plan.find_child(NodeType::LimitOperation).unwrap();
        assert_eq!(limit.children[0], *clause(&tree, NodeType::LimitExpression));
    }

    #[test]
    fn test_deterministic_output() {
        let sql = "SELECT u.name n, SUM(o.total) FROM users u JOIN orders o ON u.id = o.user_id \
                   GROUP BY u.name ORDER BY n";
        let first = parse(sql).to_json_pretty().unwrap();
        let second = parse(sql).to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_prefix_parses() {
        let sql = "SELECT t1.a AS x, b y, MAX(c), 'lit', 2.5 FROM t1 alias \
                   LEFT JOIN t2 ON t1.id >= t2.id RIGHT JOIN t3 \
                   WHERE a IS NOT NULL OR b <> 3 GROUP BY t1.a, b \
                   HAVING SUM(c) != 0 ORDER BY a ASC, b desc LIMIT 5";
        for end in (0..=sql.len()).filter(|end| sql.is_char_boundary(*end)) {
            let tree = parse(&sql[..end]);
            assert!(tree.to_json().is_ok());
            if tree.kind == NodeType::QueryAnalysis {
                assert_eq!(tree.children.len(), 2);
                let orders: Vec<u8> = tree.children[1]
                    .children
                    .iter()
                    .map(|c| c.execution_order.unwrap())
                    .collect();
                assert!(orders.windows(2).all(|w| w[0] < w[1]), "{:?}", orders);
            } else {
                assert!(matches!(
                    tree.kind,
                    NodeType::Root | NodeType::Error | NodeType::UnknownStatement
                ));
            }
        }
    }

    #[test]
    fn test_parser_can_be_driven_directly() {
        let tokens = tokenize("SELECT 1");
        let mut parser = Parser::new(&tokens);
        let node = parser.parse_statement().unwrap();
        assert_eq!(node.kind, NodeType::QueryAnalysis);
        assert_eq!(parser.remaining(), 0);

        let tokens = tokenize("SELECT a.");
        let mut parser = Parser::new(&tokens);
        assert_eq!(
            parser.parse_statement(),
            Err(ParseError::UnexpectedEof {
                expected: "identifier after '.'".to_string()
            })
        );
    }
}
