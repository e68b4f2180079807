//! Statements: expression, compound, `if`/`else`, `while` and `return`.

use super::ast::*;
use super::Parser;
use crate::lexer::{Keyword, Punctuator};
use crate::CompileError;

impl<'a> Parser<'a> {
    /// `{ block-item* }`
    pub(super) fn parse_compound_statement(&mut self) -> Result<CompoundStatement, CompileError> {
        self.expect_punct(Punctuator::OpenBrace)?;
        let mut items = Vec::new();
        while !self.eat_punct(Punctuator::CloseBrace) {
            if self.at_end() {
                return Err(self.error("expected '}'"));
            }
            let item = if self.at_declaration_start() {
                BlockItem::Declaration(self.parse_declaration()?)
            } else {
                BlockItem::Statement(self.parse_statement()?)
            };
            items.push(item);
        }
        Ok(CompoundStatement { items })
    }

    pub(super) fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        if self.at_punct(Punctuator::OpenBrace) {
            return Ok(Statement::Compound(self.parse_compound_statement()?));
        }

        if self.eat_keyword(Keyword::If) {
            let condition = self.parse_parenthesized()?;
            let then_branch = Box::new(self.parse_statement()?);
            let else_branch = if self.eat_keyword(Keyword::Else) {
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };
            return Ok(Statement::If {
                condition,
                then_branch,
                else_branch,
            });
        }

        if self.eat_keyword(Keyword::While) {
            let condition = self.parse_parenthesized()?;
            let body = Box::new(self.parse_statement()?);
            return Ok(Statement::While { condition, body });
        }

        if self.eat_keyword(Keyword::Return) {
            let value = if self.at_punct(Punctuator::Semicolon) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.expect_punct(Punctuator::Semicolon)?;
            return Ok(Statement::Return(value));
        }

        if self.eat_punct(Punctuator::Semicolon) {
            return Ok(Statement::Expression(None));
        }

        let expr = self.parse_expression()?;
        self.expect_punct(Punctuator::Semicolon)?;
        Ok(Statement::Expression(Some(expr)))
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, CompileError> {
        self.expect_punct(Punctuator::OpenParen)?;
        let expr = self.parse_expression()?;
        self.expect_punct(Punctuator::CloseParen)?;
        Ok(expr)
    }
}
