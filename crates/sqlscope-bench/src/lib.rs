//! SqlScope Performance Benchmarks
//!
//! Benchmarks for the tokenizer and parser. Run with:
//! ```bash
//! cargo bench -p sqlscope-bench
//! ```

pub mod queries;
