//! Clause-ordered execution plan.
//!
//! A SELECT is written as `SELECT … FROM … JOIN … WHERE … GROUP BY … HAVING
//! … ORDER BY … LIMIT` but evaluated as scan, join, filter, group, project,
//! group filter, sort, limit. Each [`Clause`] carries its fixed position in
//! that evaluation order. The parser records clauses into an
//! [`ExecutionPlan`] as it meets them in the source, and the plan sorts them
//! by that position once, when it is turned into a [`Node`].

use std::fmt;

use crate::tree::{Node, NodeType};

/// A SELECT clause that can appear in the execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    /// Select list (projection).
    Select,
    /// FROM table.
    From,
    /// One or more JOINs.
    Join,
    /// WHERE condition.
    Where,
    /// GROUP BY columns.
    GroupBy,
    /// HAVING condition.
    Having,
    /// ORDER BY keys.
    OrderBy,
    /// LIMIT count.
    Limit,
}

impl Clause {
    /// Every clause in source order.
    pub const ALL: [Clause; 8] = [
        Clause::Select,
        Clause::From,
        Clause::Join,
        Clause::Where,
        Clause::GroupBy,
        Clause::Having,
        Clause::OrderBy,
        Clause::Limit,
    ];

    /// Fixed key of the clause.
    pub fn key(&self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Join => "JOIN",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP_BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER_BY",
            Clause::Limit => "LIMIT",
        }
    }

    /// Position of the clause in relational evaluation order, 1-based.
    pub fn execution_order(&self) -> u8 {
        match self {
            Clause::From => 1,
            Clause::Join => 2,
            Clause::Where => 3,
            Clause::GroupBy => 4,
            Clause::Select => 5,
            Clause::Having => 6,
            Clause::OrderBy => 7,
            Clause::Limit => 8,
        }
    }

    /// Tag of the AST node wrapping the clause.
    pub fn wrapper(&self) -> NodeType {
        match self {
            Clause::Select => NodeType::SelectExpressionList,
            Clause::From => NodeType::TableReferences,
            Clause::Join => NodeType::JoinedTable,
            Clause::Where => NodeType::WhereExpression,
            Clause::GroupBy => NodeType::GroupByExpression,
            Clause::Having => NodeType::HavingExpression,
            Clause::OrderBy => NodeType::OrderByExpression,
            Clause::Limit => NodeType::LimitExpression,
        }
    }

    /// Tag of the plan operation for the clause.
    pub fn operation(&self) -> NodeType {
        match self {
            Clause::Select => NodeType::SelectOperation,
            Clause::From => NodeType::TableScan,
            Clause::Join => NodeType::JoinOperation,
            Clause::Where => NodeType::FilterOperation,
            Clause::GroupBy => NodeType::GroupOperation,
            Clause::Having => NodeType::GroupFilterOperation,
            Clause::OrderBy => NodeType::SortOperation,
            Clause::Limit => NodeType::LimitOperation,
        }
    }

    /// What the operation does to the working set.
    pub fn description(&self) -> &'static str {
        match self {
            Clause::Select => "Project the selected columns or expressions",
            Clause::From => "Scan the base table to build the working set",
            Clause::Join => "Join the working set with other tables",
            Clause::Where => "Filter out rows that do not satisfy the condition",
            Clause::GroupBy => "Group rows by the listed columns",
            Clause::Having => "Filter groups after aggregation",
            Clause::OrderBy => "Sort the result rows",
            Clause::Limit => "Limit the number of rows returned",
        }
    }

    /// Builds the AST wrapper node for the clause body.
    pub fn wrap(&self, children: Vec<Node>) -> Node {
        Node::new(self.wrapper()).with_children(children)
    }

    /// Builds the plan operation node for the clause body.
    pub fn descriptor(&self, children: Vec<Node>) -> Node {
        let mut node = Node::new(self.operation())
            .with_description(self.description())
            .with_children(children);
        node.execution_order = Some(self.execution_order());
        node
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Clauses recorded while parsing one SELECT.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    clauses: Vec<(Clause, Node)>,
}

impl ExecutionPlan {
    /// Description of the `execution_plan` node.
    pub const DESCRIPTION: &'static str = "Logical execution plan of the SQL query";

    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a clause with its parsed body. Recording the same clause
    /// again replaces the earlier body.
    pub fn record(&mut self, clause: Clause, children: Vec<Node>) {
        let descriptor = clause.descriptor(children);
        match self.clauses.iter_mut().find(|(c, _)| *c == clause) {
            Some(entry) => entry.1 = descriptor,
            None => self.clauses.push((clause, descriptor)),
        }
    }

    /// Returns `true` if the clause has been recorded.
    pub fn contains(&self, clause: Clause) -> bool {
        self.clauses.iter().any(|(c, _)| *c == clause)
    }

    /// Number of recorded clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Builds the `execution_plan` node with the recorded operations in
    /// evaluation order.
    pub fn into_node(mut self) -> Node {
        self.clauses.sort_by_key(|(clause, _)| clause.execution_order());
        Node::new(NodeType::ExecutionPlan)
            .with_description(Self::DESCRIPTION)
            .with_children(self.clauses.into_iter().map(|(_, node)| node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_orders_are_a_permutation() {
        let mut orders: Vec<u8> = Clause::ALL.iter().map(Clause::execution_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_clause_tags() {
        assert_eq!(Clause::From.operation(), NodeType::TableScan);
        assert_eq!(Clause::Having.operation(), NodeType::GroupFilterOperation);
        assert_eq!(Clause::GroupBy.wrapper(), NodeType::GroupByExpression);
        assert_eq!(Clause::OrderBy.key(), "ORDER_BY");
    }

    #[test]
    fn test_plan_sorts_by_execution_order() {
        let mut plan = ExecutionPlan::new();
        for clause in Clause::ALL {
            plan.record(clause, vec![Node::keyword(clause.key())]);
        }
        assert_eq!(plan.len(), 8);

        let node = plan.into_node();
        assert_eq!(node.kind, NodeType::ExecutionPlan);
        let orders: Vec<_> = node
            .children
            .iter()
            .map(|child| child.execution_order.unwrap())
            .collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(node.children[4].kind, NodeType::SelectOperation);
        assert_eq!(node.children[4].children[0].value.as_deref(), Some("SELECT"));
    }

    #[test]
    fn test_record_replaces_existing_clause() {
        let mut plan = ExecutionPlan::new();
        plan.record(Clause::Where, vec![Node::keyword("first")]);
        plan.record(Clause::Where, vec![Node::keyword("second")]);
        assert_eq!(plan.len(), 1);
        assert!(plan.contains(Clause::Where));
        assert!(!plan.contains(Clause::From));

        let node = plan.into_node();
        assert_eq!(node.children[0].children[0].value.as_deref(), Some("second"));
    }

    #[test]
    fn test_descriptor_fields() {
        let node = Clause::Limit.descriptor(Vec::new());
        assert_eq!(node.kind, NodeType::LimitOperation);
        assert_eq!(node.execution_order, Some(8));
        assert_eq!(node.description.as_deref(), Some(Clause::Limit.description()));
    }

    #[test]
    fn test_empty_plan() {
        let plan = ExecutionPlan::new();
        assert!(plan.is_empty());
        assert!(plan.into_node().children.is_empty());
    }
}
