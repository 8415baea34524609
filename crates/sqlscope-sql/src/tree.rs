//! Result tree representation.
//!
//! Every node of the output, AST and execution plan alike, is a [`Node`]: a
//! closed [`NodeType`] tag, a handful of optional scalar fields whose meaning
//! depends on the tag, and an ordered list of children. The JSON produced by
//! serde is the wire format consumed by the CLI and the HTTP service.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Tag of a result tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    // -----------------------------------------------------------------------
    // Statement level
    // -----------------------------------------------------------------------
    /// Top-level result of a SELECT: `[select_statement, execution_plan]`.
    QueryAnalysis,
    /// Root of the SELECT AST.
    SelectStatement,
    /// Root of the execution plan.
    ExecutionPlan,
    /// Result for an input with no tokens.
    Root,
    /// Terminal node for a statement that failed to parse.
    Error,
    /// Statement whose first token is not a recognised statement keyword.
    UnknownStatement,
    /// INSERT placeholder.
    #[serde(rename = "INSERT")]
    Insert,
    /// UPDATE placeholder.
    #[serde(rename = "UPDATE")]
    Update,
    /// DELETE placeholder.
    #[serde(rename = "DELETE")]
    Delete,
    /// CREATE placeholder.
    #[serde(rename = "CREATE")]
    Create,

    // -----------------------------------------------------------------------
    // AST clause wrappers
    // -----------------------------------------------------------------------
    /// Wraps the select list.
    SelectExpressionList,
    /// Wraps the FROM clause.
    TableReferences,
    /// Wraps every JOIN clause.
    JoinedTable,
    /// Wraps the WHERE clause.
    WhereExpression,
    /// Wraps the GROUP BY clause.
    GroupByExpression,
    /// Wraps the HAVING clause.
    HavingExpression,
    /// Wraps the ORDER BY clause.
    OrderByExpression,
    /// Wraps the LIMIT clause.
    LimitExpression,

    // -----------------------------------------------------------------------
    // Clauses
    // -----------------------------------------------------------------------
    /// Comma-separated select items.
    SelectItemList,
    /// Aliased select item; `alias` is set.
    SelectItem,
    /// Bare `*` in the select list.
    SelectStar,
    /// FROM clause body.
    FromClause,
    /// One JOIN clause.
    #[serde(rename = "JOIN")]
    Join,
    /// `LEFT`, `RIGHT` or `INNER`.
    JoinType,
    /// Keyword text as written, e.g. `GROUP BY`.
    Keyword,
    /// ON part of a JOIN clause.
    #[serde(rename = "ON")]
    On,
    /// WHERE clause body.
    WhereClause,
    /// GROUP BY clause body.
    #[serde(rename = "GROUP_BY")]
    GroupBy,
    /// Grouping columns.
    GroupList,
    /// HAVING clause body.
    #[serde(rename = "HAVING")]
    Having,
    /// ORDER BY clause body.
    #[serde(rename = "ORDER_BY")]
    OrderBy,
    /// Sort keys.
    OrderList,
    /// One sort key with an optional direction.
    OrderItem,
    /// `ASC` or `DESC`.
    SortDirection,
    /// LIMIT clause body.
    #[serde(rename = "LIMIT")]
    Limit,

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------
    /// Column in a select list or condition; `column_name`, `table_name`.
    ColumnReference,
    /// `table.column` in a join, grouping or sort key; `table`, `column`.
    QualifiedColumn,
    /// Unqualified column in a join, grouping or sort key; `value`.
    Column,
    /// Table in FROM or JOIN; `table_name`, `alias`.
    TableReference,
    /// String, integer or decimal literal; `value`, `data_type`.
    Literal,
    /// Aggregate call; `function_name`.
    FunctionCall,
    /// `*` argument of an aggregate.
    Wildcard,
    /// Any other single token in a select list.
    Expression,
    /// `a <op> b`.
    Comparison,
    /// `a AND b` / `a OR b`.
    LogicalOperation,
    /// `a IS [NOT] NULL`.
    NullCheck,
    /// `a <op> b` inside ON.
    JoinCondition,

    // -----------------------------------------------------------------------
    // Execution plan operations
    // -----------------------------------------------------------------------
    /// FROM.
    TableScan,
    /// JOIN.
    JoinOperation,
    /// WHERE.
    FilterOperation,
    /// GROUP BY.
    GroupOperation,
    /// SELECT list.
    SelectOperation,
    /// HAVING.
    GroupFilterOperation,
    /// ORDER BY.
    SortOperation,
    /// LIMIT.
    LimitOperation,
}

impl NodeType {
    /// Name used in the JSON `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryAnalysis => "query_analysis",
            Self::SelectStatement => "select_statement",
            Self::ExecutionPlan => "execution_plan",
            Self::Root => "root",
            Self::Error => "error",
            Self::UnknownStatement => "unknown_statement",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::SelectExpressionList => "select_expression_list",
            Self::TableReferences => "table_references",
            Self::JoinedTable => "joined_table",
            Self::WhereExpression => "where_expression",
            Self::GroupByExpression => "group_by_expression",
            Self::HavingExpression => "having_expression",
            Self::OrderByExpression => "order_by_expression",
            Self::LimitExpression => "limit_expression",
            Self::SelectItemList => "select_item_list",
            Self::SelectItem => "select_item",
            Self::SelectStar => "select_star",
            Self::FromClause => "from_clause",
            Self::Join => "JOIN",
            Self::JoinType => "join_type",
            Self::Keyword => "keyword",
            Self::On => "ON",
            Self::WhereClause => "where_clause",
            Self::GroupBy => "GROUP_BY",
            Self::GroupList => "group_list",
            Self::Having => "HAVING",
            Self::OrderBy => "ORDER_BY",
            Self::OrderList => "order_list",
            Self::OrderItem => "order_item",
            Self::SortDirection => "sort_direction",
            Self::Limit => "LIMIT",
            Self::ColumnReference => "column_reference",
            Self::QualifiedColumn => "qualified_column",
            Self::Column => "column",
            Self::TableReference => "table_reference",
            Self::Literal => "literal",
            Self::FunctionCall => "function_call",
            Self::Wildcard => "wildcard",
            Self::Expression => "expression",
            Self::Comparison => "comparison",
            Self::LogicalOperation => "logical_operation",
            Self::NullCheck => "null_check",
            Self::JoinCondition => "join_condition",
            Self::TableScan => "table_scan",
            Self::JoinOperation => "join_operation",
            Self::FilterOperation => "filter_operation",
            Self::GroupOperation => "group_operation",
            Self::SelectOperation => "select_operation",
            Self::GroupFilterOperation => "group_filter_operation",
            Self::SortOperation => "sort_operation",
            Self::LimitOperation => "limit_operation",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the result tree.
///
/// Fields other than `kind` and `children` are only present for the tags
/// that use them and are omitted from JSON when unset. Field order here is
/// the key order of the serialized object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node tag.
    #[serde(rename = "type")]
    pub kind: NodeType,

    /// Verbatim token text (literals, keywords, columns, aliases).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Comparison or logical operator text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Table of a `table_reference` or qualifier of a `column_reference`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    /// Alias of a `table_reference` or `select_item`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Column of a `column_reference`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    /// Qualifier of a `qualified_column`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Column of a `qualified_column`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Literal kind: `string`, `integer` or `decimal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Aggregate name as written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    /// Failure description of an `error` node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Position of a plan operation in evaluation order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_order: Option<u8>,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ordered child nodes.
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Creates a node with no fields and no children.
    pub fn new(kind: NodeType) -> Self {
        Self {
            kind,
            value: None,
            operator: None,
            table_name: None,
            alias: None,
            column_name: None,
            table: None,
            column: None,
            data_type: None,
            function_name: None,
            message: None,
            execution_order: None,
            description: None,
            children: Vec::new(),
        }
    }

    /// Creates a childless node carrying `value`.
    pub fn leaf(kind: NodeType, value: impl Into<String>) -> Self {
        Self::new(kind).with_value(value)
    }

    /// Creates a `keyword` node.
    pub fn keyword(text: impl Into<String>) -> Self {
        Self::leaf(NodeType::Keyword, text)
    }

    /// Creates a `literal` node.
    pub fn literal(value: impl Into<String>, data_type: impl Into<String>) -> Self {
        let mut node = Self::leaf(NodeType::Literal, value);
        node.data_type = Some(data_type.into());
        node
    }

    /// Creates a `column_reference` node.
    pub fn column_reference(table: Option<String>, column: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::ColumnReference);
        node.table_name = table;
        node.column_name = Some(column.into());
        node
    }

    /// Creates a `qualified_column` node.
    pub fn qualified_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::QualifiedColumn);
        node.table = Some(table.into());
        node.column = Some(column.into());
        node
    }

    /// Creates a `table_reference` node.
    pub fn table_reference(table: impl Into<String>, alias: Option<String>) -> Self {
        let mut node = Self::new(NodeType::TableReference);
        node.table_name = Some(table.into());
        node.alias = alias;
        node
    }

    /// Creates a binary node such as `comparison` or `logical_operation`.
    pub fn binary(kind: NodeType, operator: impl Into<String>, left: Node, right: Node) -> Self {
        Self::new(kind)
            .with_operator(operator)
            .with_children(vec![left, right])
    }

    /// Creates the terminal `error` node.
    pub fn error(message: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::Error);
        node.message = Some(message.into());
        node
    }

    /// Sets `value`.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets `operator`.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Sets `alias`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets `description`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child if there is one.
    pub fn with_optional_child(mut self, child: Option<Node>) -> Self {
        self.children.extend(child);
        self
    }

    /// Returns the first child with the given tag.
    pub fn find_child(&self, kind: NodeType) -> Option<&Node> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Returns the first node with the given tag, searching depth-first.
    pub fn find(&self, kind: NodeType) -> Option<&Node> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind))
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }

    /// Returns `true` for the terminal `error` node.
    pub fn is_error(&self) -> bool {
        self.kind == NodeType::Error
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serializes to JSON indented by two spaces.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the tree as indented text, one node per line.
    pub fn display_tree(&self) -> String {
        let mut output = String::new();
        self.format_node(0, &mut output);
        output
    }

    fn format_node(&self, indent: usize, output: &mut String) {
        let prefix = "  ".repeat(indent);
        output.push_str(&prefix);
        output.push_str(self.kind.as_str());

        let fields = [
            ("value", &self.value),
            ("operator", &self.operator),
            ("table_name", &self.table_name),
            ("alias", &self.alias),
            ("column_name", &self.column_name),
            ("table", &self.table),
            ("column", &self.column),
            ("data_type", &self.data_type),
            ("function_name", &self.function_name),
            ("message", &self.message),
        ];
        for (name, field) in fields {
            if let Some(text) = field {
                let _ = write!(output, " {}={}", name, text);
            }
        }
        if let Some(order) = self.execution_order {
            let _ = write!(output, " [{}]", order);
        }
        output.push('\n');

        for child in &self.children {
            child.format_node(indent + 1, output);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_omits_unset_fields() {
        let node = Node::literal("5", "integer");
        assert_eq!(
            node.to_json().unwrap(),
            r#"{"type":"literal","value":"5","data_type":"integer","children":[]}"#
        );
    }

    #[test]
    fn test_uppercase_tags() {
        for (kind, name) in [
            (NodeType::Join, "JOIN"),
            (NodeType::On, "ON"),
            (NodeType::GroupBy, "GROUP_BY"),
            (NodeType::OrderBy, "ORDER_BY"),
            (NodeType::Insert, "INSERT"),
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", name));
            assert_eq!(kind.as_str(), name);
        }
    }

    #[test]
    fn test_as_str_matches_serde_name() {
        for kind in [
            NodeType::QueryAnalysis,
            NodeType::SelectExpressionList,
            NodeType::GroupFilterOperation,
            NodeType::UnknownStatement,
            NodeType::ColumnReference,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_round_trip_through_json() {
        let node = Node::new(NodeType::Comparison)
            .with_operator("=")
            .with_child(Node::column_reference(Some("u".into()), "id"))
            .with_child(Node::literal("'x'", "string"));
        let json = node.to_json_pretty().unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.to_json_pretty().unwrap(), json);
    }

    #[test]
    fn test_builders() {
        let table = Node::table_reference("users", Some("u".to_string()));
        assert_eq!(table.table_name.as_deref(), Some("users"));
        assert_eq!(table.alias.as_deref(), Some("u"));

        let column = Node::qualified_column("t1", "id");
        assert_eq!(column.table.as_deref(), Some("t1"));
        assert_eq!(column.column.as_deref(), Some("id"));

        let node = Node::new(NodeType::WhereClause).with_optional_child(None);
        assert!(node.children.is_empty());

        let error = Node::error("boom");
        assert!(error.is_error());
        assert_eq!(error.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_find_and_size() {
        let tree = Node::new(NodeType::SelectStatement).with_child(
            Node::new(NodeType::WhereExpression).with_child(
                Node::new(NodeType::WhereClause).with_child(Node::literal("1", "integer")),
            ),
        );
        assert_eq!(tree.size(), 4);
        assert!(tree.find(NodeType::Literal).is_some());
        assert!(tree.find(NodeType::Join).is_none());
        assert!(tree.find_child(NodeType::WhereExpression).is_some());
        assert!(tree.find_child(NodeType::WhereClause).is_none());
    }

    #[test]
    fn test_display_tree() {
        let tree = Node::new(NodeType::FromClause)
            .with_child(Node::table_reference("users", Some("u".to_string())));
        assert_eq!(
            tree.display_tree(),
            "from_clause\n  table_reference table_name=users alias=u\n"
        );
    }
}
