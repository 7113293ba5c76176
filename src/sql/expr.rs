//! Expression AST for the single-table SELECTs the compiler emits.
//!
//! Every variant must be handled in `to_tokens_for_dialect()`; the compiler
//! enforces this. Values are never embedded: comparisons take an
//! [`Expr::Param`] on the right-hand side.

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Column reference, quoted on output.
    Column(String),

    /// Reference to a projection alias, emitted unquoted.
    Alias(String),

    /// Positional parameter (1-based).
    Param(usize),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// Wildcard: *
    Star,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Lt,
    Gt,
    Like,
    And,
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream (default dialect).
    pub fn to_tokens(&self) -> TokenStream {
        self.to_tokens_for_dialect(Dialect::default())
    }

    /// Convert this expression to a token stream for a specific dialect.
    pub fn to_tokens_for_dialect(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column(name) => {
                ts.push(Token::Ident(name.clone()));
            }

            Expr::Alias(name) => {
                ts.push(Token::BareIdent(name.clone()));
            }

            Expr::Param(index) => {
                ts.push(Token::Placeholder(*index));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens_for_dialect(dialect));
                ts.space();
                ts.push(binary_op_to_token(*op));
                ts.space();
                ts.append(&right.to_tokens_for_dialect(dialect));
            }

            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone()));
                ts.lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens_for_dialect(dialect));
                }
                ts.rparen();
            }

            Expr::Star => {
                ts.push(Token::Star);
            }
        }

        ts
    }
}

fn binary_op_to_token(op: BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Like => Token::Like,
        BinaryOperator::And => Token::And,
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column(name.into())
}

/// Refer to a projection alias.
pub fn alias(name: &str) -> Expr {
    Expr::Alias(name.into())
}

/// Create a positional parameter.
pub fn param(index: usize) -> Expr {
    Expr::Param(index)
}

/// Create a wildcard.
pub fn star() -> Expr {
    Expr::Star
}

/// Create a function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

/// COUNT(expr)
pub fn count(expr: Expr) -> Expr {
    func("COUNT", vec![expr])
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building expressions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: Expr) -> Expr {
        binary(self.into_expr(), BinaryOperator::Eq, other)
    }

    fn gt(self, other: Expr) -> Expr {
        binary(self.into_expr(), BinaryOperator::Gt, other)
    }

    fn lt(self, other: Expr) -> Expr {
        binary(self.into_expr(), BinaryOperator::Lt, other)
    }

    fn like(self, pattern: Expr) -> Expr {
        binary(self.into_expr(), BinaryOperator::Like, pattern)
    }

    fn and(self, other: Expr) -> Expr {
        binary(self.into_expr(), BinaryOperator::And, other)
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
