use std::fs;
use std::process;

use clap::{Parser, Subcommand};
use log::{LevelFilter, info};

use loxparse::ParseError;
use loxparse::parser::{self, lexer};

#[derive(Parser)]
#[command(name = "loxparse")]
#[command(about = "Lexer, parser and formatter for Lox source files", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream
    Tokens {
        /// Source file
        input: String,
    },

    /// Parse and print the AST
    Parse {
        /// Source file
        input: String,
    },

    /// Print the program in canonical form
    Fmt {
        /// Source file
        input: String,

        /// Fail instead of printing when the file is not canonically formatted
        #[arg(long)]
        check: bool,
    },

    /// Only check the syntax
    Check {
        /// Source file
        input: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Tokens { input } => {
            let source = read(&input)?;
            for token in lexer::Lexer::new(&source) {
                match token {
                    Ok(token) => println!(
                        "{:>4}:{:<3} {:<12} {}",
                        token.span.line,
                        token.span.column,
                        format!("{:?}", token.kind),
                        token.lexeme
                    ),
                    Err(e) => fail(&input, &e),
                }
            }
        }
        Commands::Parse { input } => {
            let source = read(&input)?;
            match parser::parse(&source) {
                Ok(program) => println!("{:#?}", program),
                Err(e) => fail(&input, &e),
            }
        }
        Commands::Fmt { input, check } => {
            let source = read(&input)?;
            let formatted = match parser::parse(&source) {
                Ok(program) => program.to_string(),
                Err(e) => fail(&input, &e),
            };

            if check {
                if formatted != source {
                    eprintln!("{}: not canonically formatted", input);
                    process::exit(1);
                }
                info!("{} is canonically formatted", input);
            } else {
                print!("{}", formatted);
            }
        }
        Commands::Check { input } => {
            let source = read(&input)?;
            match parser::parse(&source) {
                Ok(program) => println!("ok: {} declarations", program.declarations.len()),
                Err(e) => fail(&input, &e),
            }
        }
    }

    Ok(())
}

fn read(input: &str) -> std::io::Result<String> {
    info!("reading {}", input);
    fs::read_to_string(input)
}

/// Reports a parse failure as `file:line:column: error` and exits.
fn fail(input: &str, error: &ParseError) -> ! {
    let span = error.span();
    eprintln!("{}:{}:{}: {}", input, span.line, span.column, error);
    process::exit(1);
}
