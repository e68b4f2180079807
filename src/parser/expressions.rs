use super::ast::*;
use super::declarations::classify;
use super::Parser;
use crate::lexer::{Keyword, Literal, Punctuator, TokenKind};
use crate::CompileError;

fn binary_op(punct: Punctuator) -> Option<BinaryOp> {
    let op = match punct {
        Punctuator::Star => BinaryOp::Multiply,
        Punctuator::Slash => BinaryOp::Divide,
        Punctuator::Percent => BinaryOp::Modulo,
        Punctuator::Plus => BinaryOp::Add,
        Punctuator::Minus => BinaryOp::Subtract,
        Punctuator::Shl => BinaryOp::ShiftLeft,
        Punctuator::Shr => BinaryOp::ShiftRight,
        Punctuator::Less => BinaryOp::Less,
        Punctuator::Greater => BinaryOp::Greater,
        Punctuator::LessEq => BinaryOp::LessEq,
        Punctuator::GreaterEq => BinaryOp::GreaterEq,
        Punctuator::EqEq => BinaryOp::Equal,
        Punctuator::NotEq => BinaryOp::NotEqual,
        Punctuator::Amp => BinaryOp::BitAnd,
        Punctuator::Caret => BinaryOp::BitXor,
        Punctuator::Pipe => BinaryOp::BitOr,
        Punctuator::AndAnd => BinaryOp::LogicalAnd,
        Punctuator::OrOr => BinaryOp::LogicalOr,
        _ => return None,
    };
    Some(op)
}

fn assign_op(punct: Punctuator) -> Option<AssignOp> {
    let op = match punct {
        Punctuator::Assign => AssignOp::Assign,
        Punctuator::MulAssign => AssignOp::Multiply,
        Punctuator::DivAssign => AssignOp::Divide,
        Punctuator::ModAssign => AssignOp::Modulo,
        Punctuator::AddAssign => AssignOp::Add,
        Punctuator::SubAssign => AssignOp::Subtract,
        Punctuator::ShlAssign => AssignOp::ShiftLeft,
        Punctuator::ShrAssign => AssignOp::ShiftRight,
        Punctuator::AndAssign => AssignOp::BitAnd,
        Punctuator::XorAssign => AssignOp::BitXor,
        Punctuator::OrAssign => AssignOp::BitOr,
        _ => return None,
    };
    Some(op)
}

fn unary_op(punct: Punctuator) -> Option<UnaryOp> {
    let op = match punct {
        Punctuator::Increment => UnaryOp::PreIncrement,
        Punctuator::Decrement => UnaryOp::PreDecrement,
        Punctuator::Amp => UnaryOp::AddressOf,
        Punctuator::Star => UnaryOp::Deref,
        Punctuator::Plus => UnaryOp::Plus,
        Punctuator::Minus => UnaryOp::Negate,
        Punctuator::Tilde => UnaryOp::BitwiseNot,
        Punctuator::Bang => UnaryOp::LogicalNot,
        _ => return None,
    };
    Some(op)
}

impl<'a> Parser<'a> {
    fn peek_punct(&self) -> Option<Punctuator> {
        match self.peek_kind()? {
            TokenKind::Punctuator(punct) => Some(*punct),
            _ => None,
        }
    }

    pub(super) fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.parse_assignment()
    }

    /// `unary-expr assign-op assignment-expr | conditional-expr`.
    ///
    /// Both alternatives start with a unary expression; when no assignment
    /// operator follows, it becomes the leftmost operand of the conditional.
    pub(super) fn parse_assignment(&mut self) -> Result<Expr, CompileError> {
        let unary = self.parse_unary()?;

        if let Some(op) = self.peek_punct().and_then(assign_op) {
            self.pos += 1;
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign {
                op,
                target: Box::new(unary),
                value: Box::new(value),
            });
        }

        let condition = self.binary_rest(unary, 1)?;
        self.conditional_rest(condition)
    }

    pub(super) fn parse_conditional(&mut self) -> Result<Expr, CompileError> {
        let condition = self.parse_binary(1)?;
        self.conditional_rest(condition)
    }

    fn conditional_rest(&mut self, condition: Expr) -> Result<Expr, CompileError> {
        if !self.eat_punct(Punctuator::Question) {
            return Ok(condition);
        }

        let then_expr = self.parse_expression()?;
        self.expect_punct(Punctuator::Colon)?;
        let else_expr = self.parse_conditional()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, CompileError> {
        let lhs = self.parse_unary()?;
        self.binary_rest(lhs, min_precedence)
    }

    /// Extends `lhs` with operators binding at least as tightly as `min_precedence`.
    fn binary_rest(&mut self, mut lhs: Expr, min_precedence: u8) -> Result<Expr, CompileError> {
        while let Some(op) = self.peek_punct().and_then(binary_op) {
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_binary(op.precedence() + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        if self.eat_keyword(Keyword::Sizeof) {
            let type_name_follows = self.at_punct(Punctuator::OpenParen)
                && self.peek_nth(1).and_then(classify).is_some();
            if type_name_follows {
                self.pos += 1;
                let operand = self.parse_type_name()?;
                self.expect_punct(Punctuator::CloseParen)?;
                return Ok(Expr::Sizeof(operand));
            }
            let operand = self.parse_unary()?;
            return Ok(Expr::Sizeof(SizeofOperand::Expr(Box::new(operand))));
        }

        if let Some(op) = self.peek_punct().and_then(unary_op) {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.parse_primary()?;

        loop {
            let Some(punct) = self.peek_punct() else {
                break;
            };
            expr = match punct {
                Punctuator::OpenBracket => {
                    self.pos += 1;
                    let index = self.parse_expression()?;
                    self.expect_punct(Punctuator::CloseBracket)?;
                    Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                Punctuator::OpenParen => {
                    self.pos += 1;
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }
                Punctuator::Dot | Punctuator::Arrow => {
                    self.pos += 1;
                    let field = self.expect_identifier()?;
                    Expr::Member {
                        base: Box::new(expr),
                        field,
                        through_pointer: punct == Punctuator::Arrow,
                    }
                }
                Punctuator::Increment | Punctuator::Decrement => {
                    self.pos += 1;
                    let op = if punct == Punctuator::Increment {
                        PostfixOp::Increment
                    } else {
                        PostfixOp::Decrement
                    };
                    Expr::Postfix {
                        op,
                        operand: Box::new(expr),
                    }
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    /// Call arguments after the opening `(`, through the closing `)`.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut args = Vec::new();
        if self.eat_punct(Punctuator::CloseParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_assignment()?);
            if !self.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        self.expect_punct(Punctuator::CloseParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let constant = match self.peek_kind() {
            Some(TokenKind::Literal(Literal::Int(value))) => Constant::Int(*value),
            Some(TokenKind::Literal(Literal::Char(value))) => Constant::Char(*value),
            Some(TokenKind::Literal(Literal::Float(value))) => Constant::Float(*value),
            Some(TokenKind::Literal(Literal::Str(text))) => Constant::Str(text.clone()),
            Some(TokenKind::Identifier(name)) => {
                self.pos += 1;
                return Ok(Expr::Identifier(name.clone()));
            }
            Some(TokenKind::Punctuator(Punctuator::OpenParen)) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect_punct(Punctuator::CloseParen)?;
                return Ok(expr);
            }
            _ => return Err(self.error("expected expression")),
        };
        self.pos += 1;
        Ok(Expr::Constant(constant))
    }
}
