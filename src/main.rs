use std::fs;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;

use mo::ast::Module;
use mo::pretty;
use mo::source::parse_module;
use mo::typer::{type_module, TypeError};

#[derive(ClapParser)]
#[command(name = "mo", about = "The Mo language compiler front-end")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lex, parse and type a Mo file, reporting the first error
    Check { file: String },
    /// Dump the untyped syntax tree
    Ast { file: String },
    /// Type a Mo file and pretty-print the typed tree back as source
    Print { file: String },
}

fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Cannot open file '{}': {}", path, e))
}

fn load(path: &str) -> Module {
    let source = read_file(path).unwrap_or_else(|e| fail(&e));
    parse_module(&source, path).unwrap_or_else(|e| fail(&e))
}

fn fail(msg: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), msg);
    process::exit(1);
}

fn fail_typing(err: &TypeError) -> ! {
    eprintln!(
        "{} {} {}",
        err.pos.to_string().dimmed(),
        "error:".red().bold(),
        err.kind
    );
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let module = load(&file);
            match type_module(&module) {
                Ok((typed, _)) => {
                    println!(
                        "{} {} ({} type definition{})",
                        "ok:".green().bold(),
                        file,
                        typed.defs.len(),
                        if typed.defs.len() == 1 { "" } else { "s" }
                    );
                }
                Err(e) => fail_typing(&e),
            }
        }
        Commands::Ast { file } => {
            let module = load(&file);
            println!("{:#?}", module);
        }
        Commands::Print { file } => {
            let module = load(&file);
            match type_module(&module) {
                Ok((typed, _)) => print!("{}", pretty::module(&typed)),
                Err(e) => fail_typing(&e),
            }
        }
    }
}
