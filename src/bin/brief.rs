use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};

use brief::{BriefError, Interpreter, Repl, preprocess};

#[derive(Parser)]
#[command(author, version, about = "Brief concatenative language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Brief script or LIBRA library file
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a snippet of Brief code
    Eval { source: String },
}

fn main() -> Result<(), BriefError> {
    let args = Args::parse();
    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => run_script(script),
        Command::Repl => {
            let mut repl = Repl::new();
            repl.run()
        }
        Command::Eval { source } => {
            let mut interpreter = Interpreter::new();
            interpreter.execute(&source);
            report(&interpreter);
            Ok(())
        }
    }
}

fn run_script(path: PathBuf) -> Result<(), BriefError> {
    let source = fs::read_to_string(&path)?;
    let mut interpreter = Interpreter::new();
    let segments = interpreter.prepare_source(&source);
    if segments.is_empty() {
        for line in preprocess::source_to_lines(&source) {
            interpreter.execute(&line);
            report(&interpreter);
        }
    } else {
        for segment in &segments {
            interpreter.define_statement(segment);
        }
        report(&interpreter);
    }
    Ok(())
}

fn report(interpreter: &Interpreter) {
    for result in interpreter.results() {
        println!("{result}");
    }
    for text in interpreter.display_console() {
        println!("{text}");
    }
    for error in interpreter.errors() {
        eprintln!("{error}");
    }
}
