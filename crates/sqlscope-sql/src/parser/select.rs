//! SELECT statement and its clauses.
//!
//! Each optional clause is attempted only when its leading keyword (and for
//! `GROUP BY` / `ORDER BY`, the `BY` right after it) is the current token.
//! Parsed clause bodies go both into the AST, in source order, and into the
//! [`ExecutionPlan`], which orders them for evaluation.

use tracing::debug;

use super::{ParseResult, Parser};
use crate::plan::{Clause, ExecutionPlan};
use crate::token::TokenKind;
use crate::tree::{Node, NodeType};

const SELECT_STATEMENT_DESCRIPTION: &str = "Abstract syntax tree of the SQL query";
const QUERY_ANALYSIS_DESCRIPTION: &str = "SQL query analysis result";

/// Adds a parsed clause to both the AST and the plan.
fn record(ast: &mut Node, plan: &mut ExecutionPlan, clause: Clause, body: Vec<Node>) {
    ast.children.push(clause.wrap(body.clone()));
    plan.record(clause, body);
}

impl Parser<'_> {
    /// Parses a SELECT statement into `query_analysis[select_statement,
    /// execution_plan]`.
    pub(super) fn parse_select(&mut self) -> ParseResult<Node> {
        let mut ast =
            Node::new(NodeType::SelectStatement).with_description(SELECT_STATEMENT_DESCRIPTION);
        let mut plan = ExecutionPlan::new();

        self.expect(TokenKind::Select)?;
        let select_list = self.parse_select_list()?;
        record(&mut ast, &mut plan, Clause::Select, vec![select_list]);

        if self.check(TokenKind::From) {
            let from = self.parse_from_clause()?;
            record(&mut ast, &mut plan, Clause::From, vec![from]);
        }

        let joins = self.parse_join_clauses()?;
        if !joins.is_empty() {
            record(&mut ast, &mut plan, Clause::Join, joins);
        }

        if self.check(TokenKind::Where) {
            let where_clause = self.parse_where_clause()?;
            record(&mut ast, &mut plan, Clause::Where, vec![where_clause]);
        }

        if self.check(TokenKind::Group) && self.peek_is(1, TokenKind::By) {
            let group_by = self.parse_group_by_clause()?;
            record(&mut ast, &mut plan, Clause::GroupBy, vec![group_by]);
        }

        if self.check(TokenKind::Having) {
            let having = self.parse_having_clause()?;
            record(&mut ast, &mut plan, Clause::Having, vec![having]);
        }

        if self.check(TokenKind::Order) && self.peek_is(1, TokenKind::By) {
            let order_by = self.parse_order_by_clause()?;
            record(&mut ast, &mut plan, Clause::OrderBy, vec![order_by]);
        }

        if self.check(TokenKind::Limit) {
            let limit = self.parse_limit_clause()?;
            record(&mut ast, &mut plan, Clause::Limit, vec![limit]);
        }

        if let Some(token) = self.current() {
            debug!(
                "Ignoring {} trailing tokens starting with {} at offset {}",
                self.remaining(),
                token,
                token.start
            );
        }

        Ok(Node::new(NodeType::QueryAnalysis)
            .with_description(QUERY_ANALYSIS_DESCRIPTION)
            .with_children(vec![ast, plan.into_node()]))
    }

    /// `FROM table [[AS] alias]`
    fn parse_from_clause(&mut self) -> ParseResult<Node> {
        self.expect(TokenKind::From)?;
        let table = self.parse_table_reference();
        Ok(Node::new(NodeType::FromClause).with_optional_child(table))
    }

    /// Zero or more JOIN clauses. A qualifier that is not followed by `JOIN`
    /// ends the list.
    fn parse_join_clauses(&mut self) -> ParseResult<Vec<Node>> {
        let mut joins = Vec::new();
        while self
            .current()
            .is_some_and(|token| token.kind.is_join_qualifier() || token.is(TokenKind::Join))
        {
            match self.parse_join_clause()? {
                Some(join) => joins.push(join),
                None => break,
            }
        }
        Ok(joins)
    }

    /// `[LEFT|RIGHT|INNER] JOIN table [ON condition]`
    fn parse_join_clause(&mut self) -> ParseResult<Option<Node>> {
        let mut join = Node::new(NodeType::Join);

        if let Some(qualifier) = self.consume_if_with(|kind| kind.is_join_qualifier()) {
            join = join.with_child(Node::leaf(NodeType::JoinType, &qualifier.text));
        }

        let Some(keyword) = self.consume_if(TokenKind::Join) else {
            debug!("Join qualifier not followed by JOIN, ending join list");
            return Ok(None);
        };
        join = join
            .with_child(Node::keyword(&keyword.text))
            .with_optional_child(self.parse_table_reference());

        if let Some(on) = self.consume_if(TokenKind::On) {
            let condition = self.parse_join_condition()?;
            join = join.with_child(
                Node::new(NodeType::On)
                    .with_child(Node::keyword(&on.text))
                    .with_optional_child(condition),
            );
        }

        Ok(Some(join))
    }

    /// `WHERE condition`
    fn parse_where_clause(&mut self) -> ParseResult<Node> {
        self.expect(TokenKind::Where)?;
        let condition = self.parse_condition()?;
        Ok(Node::new(NodeType::WhereClause).with_optional_child(condition))
    }

    /// `GROUP BY column [, column]*`
    fn parse_group_by_clause(&mut self) -> ParseResult<Node> {
        let group = self.expect(TokenKind::Group)?;
        let by = self.expect(TokenKind::By)?;

        let mut list = Node::new(NodeType::GroupList);
        loop {
            if let Some(column) = self.parse_qualified_column()? {
                list.children.push(column);
            }
            if self.consume_if(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(Node::new(NodeType::GroupBy)
            .with_child(Node::keyword(format!("{} {}", group.text, by.text)))
            .with_child(list))
    }

    /// `HAVING condition`
    fn parse_having_clause(&mut self) -> ParseResult<Node> {
        let having = self.expect(TokenKind::Having)?;
        let condition = self.parse_condition()?;
        Ok(Node::new(NodeType::Having)
            .with_child(Node::keyword(&having.text))
            .with_optional_child(condition))
    }

    /// `ORDER BY column [ASC|DESC] [, column [ASC|DESC]]*`
    fn parse_order_by_clause(&mut self) -> ParseResult<Node> {
        let order = self.expect(TokenKind::Order)?;
        let by = self.expect(TokenKind::By)?;

        let mut list = Node::new(NodeType::OrderList);
        loop {
            if let Some(column) = self.parse_qualified_column()? {
                let direction = self.consume_sort_direction();
                list.children.push(
                    Node::new(NodeType::OrderItem)
                        .with_child(column)
                        .with_optional_child(direction),
                );
            }
            if self.consume_if(TokenKind::Comma).is_none() {
                break;
            }
        }

        Ok(Node::new(NodeType::OrderBy)
            .with_child(Node::keyword(format!("{} {}", order.text, by.text)))
            .with_child(list))
    }

    /// `ASC` and `DESC` are not reserved, so they are matched on text.
    fn consume_sort_direction(&mut self) -> Option<Node> {
        let token = self.current()?;
        if token.text_eq_ignore_case("ASC") || token.text_eq_ignore_case("DESC") {
            self.advance();
            Some(Node::leaf(NodeType::SortDirection, &token.text))
        } else {
            None
        }
    }

    /// `LIMIT integer`
    fn parse_limit_clause(&mut self) -> ParseResult<Node> {
        let limit = self.expect(TokenKind::Limit)?;
        let count = self
            .consume_if(TokenKind::Integer)
            .map(|token| Node::literal(&token.text, token.kind.as_str()));
        Ok(Node::new(NodeType::Limit)
            .with_child(Node::keyword(&limit.text))
            .with_optional_child(count))
    }
}
