use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use minicc::lexer::{tokenize, Token};
use minicc::preprocessor::Preprocessor;
use minicc::{parser, CompileError};

/// Compile a C source file to x86-64 assembly.
#[derive(Debug, Parser)]
#[command(name = "minicc", version)]
struct Args {
    /// C source file.
    file: PathBuf,

    /// Write output here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this stage and print its result.
    #[arg(long, value_enum, default_value_t = Stage::Asm)]
    stage: Stage,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stage {
    Lex,
    Preprocess,
    Parse,
    Asm,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{}: {e}", args.file.display());
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CompileError> {
    // Nothing reaches the output unless every stage succeeds.
    let mut out = Vec::new();

    match args.stage {
        Stage::Lex => {
            let source = fs::read(&args.file).map_err(|source| CompileError::Io {
                path: args.file.clone(),
                source,
            })?;
            write_tokens(&tokenize(&source)?, &mut out)?;
        }
        Stage::Preprocess => {
            let tokens = Preprocessor::new().run_file(&args.file)?;
            write_tokens(&tokens, &mut out)?;
        }
        Stage::Parse => {
            let tokens = Preprocessor::new().run_file(&args.file)?;
            let unit = parser::parse(&tokens)?;
            writeln!(out, "{unit:#?}")?;
        }
        Stage::Asm => minicc::compile_file(&args.file, &mut out)?,
    }

    match &args.output {
        Some(path) => fs::write(path, &out).map_err(|source| CompileError::Io {
            path: path.clone(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&out)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// One token per line, prefixed with its position.
fn write_tokens(tokens: &[Token], out: &mut impl Write) -> io::Result<()> {
    for token in tokens {
        writeln!(out, "{}:{}\t{token}", token.line, token.col)?;
    }
    Ok(())
}
