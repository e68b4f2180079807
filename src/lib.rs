pub mod lexer;
pub mod preprocessor;
pub mod parser;
pub mod codegen;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Every way a compilation can fail. The first error wins; nothing is retried.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error at {line}:{col}: {message}")]
    Lex {
        message: String,
        line: usize,
        col: usize,
    },

    #[error("error at {line}:{col}: {message}")]
    Preprocess {
        message: String,
        line: usize,
        col: usize,
    },

    #[error("in file included from {}: {source}", .path.display())]
    Include {
        path: PathBuf,
        #[source]
        source: Box<CompileError>,
    },

    #[error("error at {line}:{col}: {message}, found {found}")]
    Syntax {
        message: String,
        found: String,
        line: usize,
        col: usize,
    },

    #[error("code generation failed: {message}")]
    Codegen { message: String },

    #[error("could not write assembly: {0}")]
    Emit(#[from] io::Error),
}

impl CompileError {
    /// Source position of the error, if it has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            CompileError::Lex { line, col, .. }
            | CompileError::Preprocess { line, col, .. }
            | CompileError::Syntax { line, col, .. } => Some((*line, *col)),
            CompileError::Include { source, .. } => source.position(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Compiles an in-memory source buffer to assembly text.
///
/// Quoted includes are resolved against the working directory.
pub fn compile(source: &[u8]) -> Result<String> {
    let tokens = lexer::tokenize(source)?;
    let tokens = preprocessor::Preprocessor::new().run(tokens)?;
    let unit = parser::parse(&tokens)?;
    let mut out = Vec::new();
    codegen::generate(&unit, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Compiles the file at `path`, streaming assembly into `out`.
///
/// Output written before a code generation error is incomplete and should be
/// discarded by the caller.
pub fn compile_file<W: io::Write>(path: &Path, out: &mut W) -> Result<()> {
    let tokens = preprocessor::Preprocessor::new().run_file(path)?;
    let unit = parser::parse(&tokens)?;
    codegen::generate(&unit, out)
}
