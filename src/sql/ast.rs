/// Abstract syntax tree for the supported statement subset
use crate::types::Value;

/// Top-level statement. One statement references exactly one table; there are
/// no joins, subqueries or DDL in this engine.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

impl Statement {
    pub fn table(&self) -> &str {
        match self {
            Statement::Select(s) => &s.table,
            Statement::Insert(s) => &s.table,
            Statement::Update(s) => &s.table,
            Statement::Delete(s) => &s.table,
        }
    }

    pub fn returns_rows(&self) -> bool {
        matches!(self, Statement::Select(_))
    }
}

/// SELECT statement
#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub columns: Vec<SelectColumn>,
    pub table: String,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderByKey>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum SelectColumn {
    /// `*`
    Star,
    /// `column [AS alias]`
    Column { name: String, alias: Option<String> },
    /// `COUNT(*)` / `SUM(col)` `[AS alias]`
    Aggregate {
        func: AggregateFunc,
        alias: Option<String>,
    },
}

impl SelectColumn {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, SelectColumn::Aggregate { .. })
    }
}

#[derive(Debug, Clone)]
pub enum AggregateFunc {
    CountStar,
    Sum(String),
}

impl AggregateFunc {
    /// Output column name when no alias is given.
    pub fn default_name(&self) -> &'static str {
        match self {
            AggregateFunc::CountStar => "count",
            AggregateFunc::Sum(_) => "sum",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderByKey {
    pub column: String,
    pub asc: bool, // true = ASC, false = DESC
}

/// INSERT statement (single row)
#[derive(Debug, Clone)]
pub struct InsertStmt {
    pub table: String,
    /// Column names bound positionally against `values`. When absent the new
    /// record receives only the auto-assigned columns (id and timestamps).
    pub columns: Option<Vec<String>>,
    pub values: Vec<Expr>,
}

/// UPDATE statement. No WHERE clause means every row in the table.
#[derive(Debug, Clone)]
pub struct UpdateStmt {
    pub table: String,
    pub assignments: Vec<(String, Expr)>,
    pub where_clause: Option<Expr>,
}

/// DELETE statement. No WHERE clause means every row in the table.
#[derive(Debug, Clone)]
pub struct DeleteStmt {
    pub table: String,
    pub where_clause: Option<Expr>,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference
    Column(String),

    /// Literal value
    Literal(Value),

    /// Positional `?` placeholder, numbered left to right from 0
    Param(usize),

    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expr>,
    },

    /// `expr [NOT] LIKE pattern` with `%` and `_` wildcards
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },

    /// `expr IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    /// Function call; currently `datetime('now')`
    FunctionCall { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq, // =
    Ne, // != or <>
    Lt, // <
    Gt, // >
    Le, // <=
    Ge, // >=

    // Logical
    And,
    Or,

    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

impl BinaryOperator {
    /// Operator precedence (higher = tighter binding)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Gt
            | BinaryOperator::Le
            | BinaryOperator::Ge => 3,
            BinaryOperator::Add | BinaryOperator::Sub => 4,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Mod => 5,
        }
    }
}
