/// flatdb SQL engine
///
/// Architecture:
/// - Lexer: tokenizes statement text
/// - Parser: recursive descent, builds the typed statement AST
/// - Evaluator: evaluates expressions against records
/// - Executor: runs statements against the table store

pub mod ast;
pub mod evaluator;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Expr, SelectStmt, Statement};
pub use evaluator::ExprEvaluator;
pub use executor::{select_rows, QueryExecutor, RunSummary};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenType};

use crate::error::Result;

/// Parse a single statement, rejecting trailing input. Returns the AST and
/// the number of `?` placeholders it carries.
pub fn parse_statement(sql: &str) -> Result<(Statement, usize)> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut parser = Parser::new(tokens);
    let statement = parser.parse()?;
    parser.finish()?;
    Ok((statement, parser.param_count()))
}
