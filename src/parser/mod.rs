//! Recursive-descent parser producing a [`TranslationUnit`].

pub mod ast;
mod declarations;
mod expressions;
mod statements;

pub use ast::*;

use crate::lexer::{Keyword, Punctuator, Token, TokenKind};
use crate::CompileError;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

pub fn parse(tokens: &[Token]) -> Result<TranslationUnit, CompileError> {
    let mut parser = Parser { tokens, pos: 0 };
    let unit = parser.parse_translation_unit()?;
    log::debug!(
        "parsed {} external declarations ({} functions)",
        unit.items.len(),
        unit.functions().count()
    );
    Ok(unit)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_punct(&self, punct: Punctuator) -> bool {
        self.peek().is_some_and(|t| t.is_punct(punct))
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(kw))
    }

    fn eat_punct(&mut self, punct: Punctuator) -> bool {
        if self.at_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: Punctuator) -> Result<(), CompileError> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{punct}'")))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn eat_identifier(&mut self) -> Option<String> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                self.pos += 1;
                Some(name.clone())
            }
            _ => None,
        }
    }

    /// Syntax error at the current token.
    fn error(&self, message: impl Into<String>) -> CompileError {
        let (found, line, col) = match self.peek() {
            Some(token) => (format!("`{token}`"), token.line, token.col),
            None => {
                let (line, col) = self
                    .tokens
                    .last()
                    .map(|t| (t.line, t.col))
                    .unwrap_or((1, 1));
                ("end of input".to_string(), line, col)
            }
        };
        CompileError::Syntax {
            message: message.into(),
            found,
            line,
            col,
        }
    }

    fn parse_translation_unit(&mut self) -> Result<TranslationUnit, CompileError> {
        let mut items = Vec::new();
        while !self.at_end() {
            items.push(self.parse_external_declaration()?);
        }
        Ok(TranslationUnit { items })
    }
}
