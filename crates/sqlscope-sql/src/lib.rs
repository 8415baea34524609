//! # sqlscope-sql
//!
//! Turns a single SQL statement into an abstract syntax tree plus a
//! clause-ordered execution plan.
//!
//! This crate implements:
//! - Tokenization with lenient recovery (unknown characters are skipped)
//! - Recursive-descent parsing of `SELECT` with up to eight optional clauses
//! - Execution-plan assembly ordered by relational evaluation order
//!
//! # Usage
//!
//! ```
//! use sqlscope_sql::{parse, NodeType};
//!
//! let tree = parse("SELECT * FROM users");
//! assert_eq!(tree.kind, NodeType::QueryAnalysis);
//!
//! let plan = &tree.children[1];
//! assert_eq!(plan.children[0].kind, NodeType::TableScan);
//! assert_eq!(plan.children[1].kind, NodeType::SelectOperation);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// SQL tokens
pub mod token;

/// SQL tokenizer
pub mod lexer;

/// Result tree nodes
pub mod tree;

/// Clause-ordered execution plan
pub mod plan;

/// Recursive-descent parser
pub mod parser;

pub use lexer::{tokenize, Lexer};
pub use parser::{
    parse, ParseError, ParseResult, Parser, MAX_CONDITION_TERMS, MAX_NESTING_DEPTH,
};
pub use plan::{Clause, ExecutionPlan};
pub use token::{Token, TokenKind};
pub use tree::{Node, NodeType};
