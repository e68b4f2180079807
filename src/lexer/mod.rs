mod token;

pub use token::{keyword, Directive, Keyword, Literal, Punctuator, Token, TokenKind};

use crate::CompileError;

/// Single forward cursor over a source buffer.
struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    /// No token has been produced on the current line yet.
    line_start: bool,
}

pub fn tokenize(source: &[u8]) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        line: 1,
        col: 1,
        line_start: true,
    };
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    log::debug!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
            self.line_start = true;
        } else {
            self.col += 1;
        }
        Some(byte)
    }

    fn error(&self, message: impl Into<String>, line: usize, col: usize) -> CompileError {
        CompileError::Lex {
            message: message.into(),
            line,
            col,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, CompileError> {
        self.skip_trivia()?;

        let (line, col) = (self.line, self.col);
        let Some(byte) = self.peek() else {
            return Ok(None);
        };

        let kind = match byte {
            b'#' if self.line_start => self.directive()?,
            b'\'' => self.char_literal()?,
            b'"' => self.string_literal()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let ident = self.identifier();
                match keyword(&ident) {
                    Some(kw) => TokenKind::Keyword(kw),
                    None => TokenKind::Identifier(ident),
                }
            }
            _ => match self.punctuator() {
                Some(punct) => TokenKind::Punctuator(punct),
                None => {
                    let shown = if byte.is_ascii_graphic() {
                        char::from(byte).to_string()
                    } else {
                        format!("\\x{byte:02x}")
                    };
                    return Err(self.error(format!("unexpected character: '{shown}'"), line, col));
                }
            },
        };

        self.line_start = false;
        Ok(Some(Token::new(kind, line, col)))
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n' | b'\x0b' | b'\x0c'), _) => {
                    self.bump();
                }
                (Some(b'/'), Some(b'/')) => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some(b'*') if self.peek() == Some(b'/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(self.error("unterminated block comment", line, col));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.bump();
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.bump();
        }
        // Identifier bytes are ASCII by construction.
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            value = value.wrapping_mul(10).wrapping_add(i64::from(digit - b'0'));
            self.bump();
        }

        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.bump();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.bump();
            }
            let text = String::from_utf8_lossy(&self.src[start..self.pos]);
            // digits '.' digits always parses
            let value = text.parse::<f64>().unwrap_or_default();
            return TokenKind::Literal(Literal::Float(value));
        }

        TokenKind::Literal(Literal::Int(value))
    }

    fn char_literal(&mut self) -> Result<TokenKind, CompileError> {
        let (line, col) = (self.line, self.col);
        self.bump();

        let value = match self.peek() {
            None | Some(b'\n') => {
                return Err(self.error("unterminated character literal", line, col));
            }
            Some(b'\'') => return Err(self.error("empty character literal", line, col)),
            Some(b'\\') => {
                self.bump();
                let (esc_line, esc_col) = (self.line, self.col);
                let Some(esc) = self.bump() else {
                    return Err(self.error("unterminated character literal", line, col));
                };
                match esc {
                    b'0' => 0,
                    b'n' => i64::from(b'\n'),
                    b't' => i64::from(b'\t'),
                    b'r' => i64::from(b'\r'),
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'v' => 0x0b,
                    b'\\' | b'\'' | b'"' | b'?' => i64::from(esc),
                    other => {
                        return Err(self.error(
                            format!("unknown escape sequence: '\\{}'", char::from(other)),
                            esc_line,
                            esc_col,
                        ));
                    }
                }
            }
            Some(byte) => {
                self.bump();
                i64::from(byte)
            }
        };

        if self.peek() != Some(b'\'') {
            return Err(self.error("unterminated character literal", line, col));
        }
        self.bump();
        Ok(TokenKind::Literal(Literal::Char(value)))
    }

    fn string_literal(&mut self) -> Result<TokenKind, CompileError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        let start = self.pos;
        let mut escaped = false;

        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error("unterminated string literal", line, col));
                }
                Some(b'"') if !escaped => break,
                Some(byte) => {
                    escaped = byte == b'\\' && !escaped;
                    self.bump();
                }
            }
        }

        let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
        self.bump();
        Ok(TokenKind::Literal(Literal::Str(text)))
    }

    fn punctuator(&mut self) -> Option<Punctuator> {
        let rest = &self.src[self.pos..];
        let punct = Punctuator::ALL
            .iter()
            .copied()
            .find(|p| rest.starts_with(p.as_str().as_bytes()))?;
        for _ in 0..punct.as_str().len() {
            self.bump();
        }
        Some(punct)
    }

    fn directive(&mut self) -> Result<TokenKind, CompileError> {
        let (line, col) = (self.line, self.col);
        self.bump();
        self.skip_blanks();

        if !matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_')) {
            return Err(self.error("expected directive name after '#'", line, col));
        }
        let name = self.identifier();

        let directive = match name.as_str() {
            "define" => Directive::Define {
                has_value: self.define_has_value(),
            },
            "undef" => Directive::Undef,
            "include" => Directive::Include,
            "ifdef" => Directive::Ifdef,
            "ifndef" => Directive::Ifndef,
            "else" => Directive::Else,
            "endif" => Directive::Endif,
            _ => Directive::Other(name),
        };
        Ok(TokenKind::Directive(directive))
    }

    /// Looks past the macro name without consuming anything: does the rest of
    /// the line hold a replacement value? Block comments count as blanks.
    fn define_has_value(&self) -> bool {
        let mut i = self.pos;
        let at = |i: usize| self.src.get(i).copied();

        while matches!(at(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        while matches!(at(i), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            i += 1;
        }

        loop {
            match (at(i), at(i + 1)) {
                (Some(b' ' | b'\t' | b'\r'), _) => i += 1,
                (Some(b'/'), Some(b'*')) => {
                    i += 2;
                    loop {
                        match (at(i), at(i + 1)) {
                            (Some(b'*'), Some(b'/')) => {
                                i += 2;
                                break;
                            }
                            (Some(_), _) => i += 1,
                            // skip_trivia reports the unterminated comment
                            (None, _) => return false,
                        }
                    }
                }
                (None | Some(b'\n'), _) => return false,
                (Some(b'/'), Some(b'/')) => return false,
                _ => return true,
            }
        }
    }
}
