/// SQL parser - converts tokens into the typed statement AST
use super::ast::*;
use super::token::{Token, TokenType};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    params: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            params: 0,
        }
    }

    /// Parse one statement. The leading keyword decides the statement kind;
    /// anything else is a parse error rather than a silent no-op.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = match &self.current().token_type {
            TokenType::Select => Statement::Select(self.parse_select()?),
            TokenType::Insert => Statement::Insert(self.parse_insert()?),
            TokenType::Update => Statement::Update(self.parse_update()?),
            TokenType::Delete => Statement::Delete(self.parse_delete()?),
            _ => return Err(self.error("Expected SELECT, INSERT, UPDATE, or DELETE")),
        };

        // Optionally consume semicolon
        if matches!(self.current().token_type, TokenType::Semicolon) {
            self.advance();
        }

        Ok(stmt)
    }

    /// Reject trailing input; statements joined together are not supported.
    pub fn finish(&mut self) -> Result<()> {
        if matches!(self.current().token_type, TokenType::Eof) {
            Ok(())
        } else {
            Err(self.error("Expected end of statement"))
        }
    }

    /// Number of `?` placeholders seen so far.
    pub fn param_count(&self) -> usize {
        self.params
    }

    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.expect(TokenType::Select)?;

        let columns = self.parse_select_columns()?;

        self.expect(TokenType::From)?;
        let table = self.parse_identifier()?;

        let where_clause = if self.match_token(TokenType::Where) {
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        let order_by = if self.match_token(TokenType::Order) {
            self.expect(TokenType::By)?;
            self.parse_order_by()?
        } else {
            Vec::new()
        };

        let limit = if self.match_token(TokenType::Limit) {
            Some(self.parse_usize()?)
        } else {
            None
        };

        let offset = if self.match_token(TokenType::Offset) {
            Some(self.parse_usize()?)
        } else {
            None
        };

        Ok(SelectStmt {
            columns,
            table,
            where_clause,
            order_by,
            limit,
            offset,
        })
    }

    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>> {
        let mut columns = Vec::new();

        loop {
            if self.match_token(TokenType::Star) {
                columns.push(SelectColumn::Star);
            } else {
                let name = self.parse_identifier()?;

                if matches!(self.current().token_type, TokenType::LParen) {
                    let func = self.parse_aggregate(&name)?;
                    let alias = self.parse_alias()?;
                    columns.push(SelectColumn::Aggregate { func, alias });
                } else {
                    let alias = self.parse_alias()?;
                    columns.push(SelectColumn::Column { name, alias });
                }
            }

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok(columns)
    }

    /// `COUNT(*)` or `SUM(column)`; other functions have no meaning in a
    /// select list here.
    fn parse_aggregate(&mut self, name: &str) -> Result<AggregateFunc> {
        self.expect(TokenType::LParen)?;
        let func = match name.to_ascii_uppercase().as_str() {
            "COUNT" => {
                self.expect(TokenType::Star)
                    .map_err(|_| self.error("COUNT supports only COUNT(*)"))?;
                AggregateFunc::CountStar
            }
            "SUM" => {
                let column = self.parse_identifier()?;
                AggregateFunc::Sum(column)
            }
            _ => return Err(self.error(&format!("Unsupported function in select list: {}", name))),
        };
        self.expect(TokenType::RParen)?;
        Ok(func)
    }

    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.match_token(TokenType::As) {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_order_by(&mut self) -> Result<Vec<OrderByKey>> {
        let mut keys = Vec::new();

        loop {
            let column = self.parse_identifier()?;
            let asc = if self.match_token(TokenType::Desc) {
                false
            } else {
                self.match_token(TokenType::Asc); // optional
                true
            };

            keys.push(OrderByKey { column, asc });

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok(keys)
    }

    fn parse_insert(&mut self) -> Result<InsertStmt> {
        self.expect(TokenType::Insert)?;
        self.expect(TokenType::Into)?;

        let table = self.parse_identifier()?;

        // Optional column list
        let columns = if self.match_token(TokenType::LParen) {
            let cols = self.parse_identifier_list()?;
            self.expect(TokenType::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(TokenType::Values)?;
        self.expect(TokenType::LParen)?;
        let values = self.parse_expr_list()?;
        self.expect(TokenType::RParen)?;

        if let Some(cols) = &columns {
            if cols.len() != values.len() {
                return Err(Error::Parse(format!(
                    "INSERT has {} columns but {} values",
                    cols.len(),
                    values.len()
                )));
            }
        }

        Ok(InsertStmt {
            table,
            columns,
            values,
        })
    }

    fn parse_update(&mut self) -> Result<UpdateStmt> {
        self.expect(TokenType::Update)?;
        let table = self.parse_identifier()?;
        self.expect(TokenType::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.parse_identifier()?;
            self.expect(TokenType::Eq)?;
            let expr = self.parse_expr(0)?;
            assignments.push((column, expr));

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        let where_clause = if self.match_token(TokenType::Where) {
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        Ok(UpdateStmt {
            table,
            assignments,
            where_clause,
        })
    }

    fn parse_delete(&mut self) -> Result<DeleteStmt> {
        self.expect(TokenType::Delete)?;
        self.expect(TokenType::From)?;
        let table = self.parse_identifier()?;

        let where_clause = if self.match_token(TokenType::Where) {
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        Ok(DeleteStmt {
            table,
            where_clause,
        })
    }

    /// Parse an expression using Pratt parsing for operator precedence.
    /// `LIKE`, `NOT LIKE` and `IS [NOT] NULL` bind at comparison precedence.
    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_prefix_expr()?;

        loop {
            if min_precedence <= 3 {
                if self.match_token(TokenType::Like) {
                    let pattern = self.parse_expr(4)?;
                    left = Expr::Like {
                        expr: Box::new(left),
                        pattern: Box::new(pattern),
                        negated: false,
                    };
                    continue;
                }
                if matches!(self.current().token_type, TokenType::Not)
                    && matches!(self.peek().token_type, TokenType::Like)
                {
                    self.advance(); // NOT
                    self.advance(); // LIKE
                    let pattern = self.parse_expr(4)?;
                    left = Expr::Like {
                        expr: Box::new(left),
                        pattern: Box::new(pattern),
                        negated: true,
                    };
                    continue;
                }
                if self.match_token(TokenType::Is) {
                    let negated = self.match_token(TokenType::Not);
                    self.expect(TokenType::Null)?;
                    left = Expr::IsNull {
                        expr: Box::new(left),
                        negated,
                    };
                    continue;
                }
            }

            let Some(op) = self.try_parse_binary_op() else {
                break;
            };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }

            self.advance(); // consume operator
            let right = self.parse_expr(precedence + 1)?;

            left = Expr::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn try_parse_binary_op(&self) -> Option<BinaryOperator> {
        let op = match self.current().token_type {
            TokenType::Eq => BinaryOperator::Eq,
            TokenType::Ne => BinaryOperator::Ne,
            TokenType::Lt => BinaryOperator::Lt,
            TokenType::Gt => BinaryOperator::Gt,
            TokenType::Le => BinaryOperator::Le,
            TokenType::Ge => BinaryOperator::Ge,
            TokenType::And => BinaryOperator::And,
            TokenType::Or => BinaryOperator::Or,
            TokenType::Plus => BinaryOperator::Add,
            TokenType::Minus => BinaryOperator::Sub,
            TokenType::Star => BinaryOperator::Mul,
            TokenType::Slash => BinaryOperator::Div,
            TokenType::Percent => BinaryOperator::Mod,
            _ => return None,
        };
        Some(op)
    }

    fn parse_prefix_expr(&mut self) -> Result<Expr> {
        match &self.current().token_type {
            TokenType::Not => {
                self.advance();
                // NOT binds over comparisons: NOT a = 1 reads NOT (a = 1)
                let expr = self.parse_expr(3)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Not,
                    expr: Box::new(expr),
                })
            }
            TokenType::Minus => {
                self.advance();
                let expr = self.parse_expr(6)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: Box::new(expr),
                })
            }
            TokenType::Plus => {
                self.advance();
                let expr = self.parse_expr(6)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOperator::Plus,
                    expr: Box::new(expr),
                })
            }

            TokenType::LParen => {
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::RParen)?;
                Ok(expr)
            }

            TokenType::Number(n) => {
                let n = *n;
                self.advance();
                // Integral literals become Integer, everything else Float
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Ok(Expr::Literal(Value::Integer(n as i64)))
                } else {
                    Ok(Expr::Literal(Value::Float(n)))
                }
            }
            TokenType::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(Expr::Literal(Value::Text(s)))
            }
            TokenType::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            TokenType::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            TokenType::Null => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }

            TokenType::Param => {
                self.advance();
                let ordinal = self.params;
                self.params += 1;
                Ok(Expr::Param(ordinal))
            }

            // Identifier: column reference or function call
            TokenType::Identifier(_) => {
                let name = self.parse_identifier()?;

                if self.match_token(TokenType::LParen) {
                    let args = if matches!(self.current().token_type, TokenType::RParen) {
                        Vec::new()
                    } else {
                        self.parse_expr_list()?
                    };
                    self.expect(TokenType::RParen)?;
                    return Ok(Expr::FunctionCall { name, args });
                }

                Ok(Expr::Column(name))
            }

            _ => Err(self.error("Expected expression")),
        }
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = Vec::new();
        loop {
            exprs.push(self.parse_expr(0)?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        loop {
            names.push(self.parse_identifier()?);
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(names)
    }

    fn parse_identifier(&mut self) -> Result<String> {
        if let TokenType::Identifier(name) = &self.current().token_type {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error("Expected identifier"))
        }
    }

    fn parse_usize(&mut self) -> Result<usize> {
        if let TokenType::Number(n) = self.current().token_type {
            if n.fract() != 0.0 || n < 0.0 {
                return Err(self.error("Expected non-negative integer"));
            }
            self.advance();
            Ok(n as usize)
        } else {
            Err(self.error("Expected number"))
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek(&self) -> &Token {
        let next = (self.position + 1).min(self.tokens.len() - 1);
        &self.tokens[next]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if std::mem::discriminant(&self.current().token_type) == std::mem::discriminant(&token_type)
        {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token_type: TokenType) -> Result<()> {
        if std::mem::discriminant(&self.current().token_type) == std::mem::discriminant(&token_type)
        {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("Expected {:?}", token_type)))
        }
    }

    fn error(&self, msg: &str) -> Error {
        let token = self.current();
        Error::Parse(format!(
            "{} at line {} column {}",
            msg, token.line, token.column
        ))
    }
}
