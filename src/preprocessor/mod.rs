mod macros;

use macros::MacroTable;

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use crate::lexer::{tokenize, Directive, Literal, Punctuator, Token, TokenKind};
use crate::CompileError;

/// Conditional-inclusion state. There is no nesting counter: the first
/// `#else`/`#endif` seen while disabled re-enables output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Enabled,
    Disabled,
}

/// Token-level preprocessor. One instance owns the macro table for a whole
/// compilation, including every file it pulls in through `#include "..."`.
#[derive(Debug, Default)]
pub struct Preprocessor {
    macros: MacroTable,
    /// Directory of the file being preprocessed, for resolving quoted includes.
    current_dir: Option<PathBuf>,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads, lexes and preprocesses the file at `path`.
    pub fn run_file(&mut self, path: &Path) -> Result<Vec<Token>, CompileError> {
        let source = fs::read(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tokens = tokenize(&source)?;

        let outer_dir = mem::replace(&mut self.current_dir, path.parent().map(Path::to_path_buf));
        let result = self.run(tokens);
        self.current_dir = outer_dir;
        result
    }

    pub fn run(&mut self, tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut state = State::Enabled;
        let mut tokens = tokens.into_iter();

        while let Some(token) = tokens.next() {
            let directive = match &token.kind {
                TokenKind::Directive(directive) => directive.clone(),
                _ => {
                    if state == State::Enabled {
                        self.substitute(token, &mut output);
                    }
                    continue;
                }
            };

            let next = match (state, directive) {
                (State::Disabled, Directive::Else | Directive::Endif) => State::Enabled,
                (State::Disabled, _) => State::Disabled,
                (State::Enabled, Directive::Define { has_value }) => {
                    let name = expect_name(&token, tokens.next(), "#define")?;
                    let value = if has_value { tokens.next() } else { None };
                    log::debug!("#define {name} {}", DisplayValue(value.as_ref()));
                    self.macros.define(name, value);
                    State::Enabled
                }
                (State::Enabled, Directive::Undef) => {
                    let name = expect_name(&token, tokens.next(), "#undef")?;
                    if !self.macros.undefine(&name) {
                        log::trace!("#undef of unbound macro {name}");
                    }
                    State::Enabled
                }
                (State::Enabled, Directive::Include) => {
                    self.include(&token, &mut tokens, &mut output)?;
                    State::Enabled
                }
                (State::Enabled, directive @ (Directive::Ifdef | Directive::Ifndef)) => {
                    let keyword = format!("#{}", directive.name());
                    let name = expect_name(&token, tokens.next(), &keyword)?;
                    let holds = self.macros.is_defined(&name) == (directive == Directive::Ifdef);
                    if holds {
                        State::Enabled
                    } else {
                        State::Disabled
                    }
                }
                (State::Enabled, Directive::Else) => State::Disabled,
                (State::Enabled, Directive::Endif) => State::Enabled,
                (State::Enabled, Directive::Other(name)) => {
                    return Err(directive_error(&token, format!("unsupported directive #{name}")));
                }
            };

            if next != state {
                log::trace!("{}:{} {} -> {next:?}", token.line, token.col, token);
            }
            state = next;
        }

        Ok(output)
    }

    fn substitute(&self, token: Token, output: &mut Vec<Token>) {
        let TokenKind::Identifier(name) = &token.kind else {
            output.push(token);
            return;
        };

        match self.macros.lookup(name) {
            Some(Some(value)) => output.push(Token::new(value.kind.clone(), token.line, token.col)),
            Some(None) => {}
            None => output.push(token),
        }
    }

    fn include(
        &mut self,
        directive: &Token,
        tokens: &mut impl Iterator<Item = Token>,
        output: &mut Vec<Token>,
    ) -> Result<(), CompileError> {
        match tokens.next().filter(|t| t.line == directive.line) {
            Some(Token {
                kind: TokenKind::Literal(Literal::Str(file)),
                ..
            }) => {
                let path = match &self.current_dir {
                    Some(dir) => dir.join(&file),
                    None => PathBuf::from(&file),
                };
                log::debug!("including {}", path.display());

                let included = self.run_file(&path).map_err(|err| CompileError::Include {
                    path: path.clone(),
                    source: Box::new(err),
                })?;
                output.extend(included);
                Ok(())
            }
            Some(open) if open.is_punct(Punctuator::Less) => {
                // System headers are not searched for; the body is skipped.
                let line = directive.line;
                if tokens
                    .take_while(|t| t.line == line)
                    .any(|t| t.is_punct(Punctuator::Greater))
                {
                    Ok(())
                } else {
                    Err(directive_error(directive, "missing '>' in #include"))
                }
            }
            _ => Err(directive_error(
                directive,
                "#include expects \"FILENAME\" or <FILENAME>",
            )),
        }
    }
}

/// The operand of a directive must sit on the directive's own line.
fn expect_name(directive: &Token, next: Option<Token>, what: &str) -> Result<String, CompileError> {
    match next.filter(|t| t.line == directive.line) {
        Some(Token {
            kind: TokenKind::Identifier(name),
            ..
        }) => Ok(name),
        _ => Err(directive_error(directive, format!("{what} expects an identifier"))),
    }
}

fn directive_error(token: &Token, message: impl Into<String>) -> CompileError {
    CompileError::Preprocess {
        message: message.into(),
        line: token.line,
        col: token.col,
    }
}

struct DisplayValue<'a>(Option<&'a Token>);

impl std::fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(token) => write!(f, "{token}"),
            None => Ok(()),
        }
    }
}
