// ABOUTME: Binary entry point: runs a source file to completion, or drives an interactive REPL

use std::fs;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use scarab::error::EvalError;
use scarab::eval::{self, Context};
use scarab::list;
use scarab::parser;

const WELCOME_MESSAGE: &str = "scarab";
const WELCOME_SUBTITLE: &str = "a small homoiconic, s-expression-based scripting language";
const HISTORY_FILE: &str = ".scarab_history";

#[derive(ClapParser, Debug)]
#[command(
    name = "scarab",
    version,
    about = "a small homoiconic, s-expression-based scripting language"
)]
struct CliArgs {
    /// Source file to run. With no file, starts an interactive REPL.
    file: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    match args.file {
        Some(path) => run_file(&path),
        None => run_repl(),
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("scarab: cannot read {path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let program = match parser::parse_string(&source, path) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Parse error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ctx = Context::new();
    for form in list::iter(&program) {
        if let Err(e) = eval::eval(&mut ctx, form) {
            eprintln!("Error: {}", e.to_value().inspect());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

/// Interactive loop: each line is parsed as a complete open-list program (so
/// one line may hold several top-level forms, matching the original's
/// per-`fgets`-buffer parse), results are numbered only when more than one
/// form was parsed, and a lone `nil` result prints nothing.
fn run_repl() -> ExitCode {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut ctx = Context::new();
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("scarab: failed to start line editor: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _ = editor.load_history(HISTORY_FILE);

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(&line);
                run_repl_line(&mut ctx, &line);
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => {
                eprintln!("scarab: {e}");
                break;
            }
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
    ExitCode::SUCCESS
}

fn run_repl_line(ctx: &mut Context, line: &str) {
    let forms = match parser::parse_string(line, "<repl>") {
        Ok(forms) => forms,
        Err(e) => {
            println!("Parse error: {e}");
            return;
        }
    };

    let print_number = list::length(&forms) > 1;
    for (i, form) in list::iter(&forms).enumerate() {
        match eval::eval(ctx, form) {
            Ok(result) => {
                if print_number {
                    println!("{}. {}", i + 1, result.inspect());
                } else if !result.is_nil() {
                    println!("{}", result.inspect());
                }
            }
            Err(e) => print_eval_error(&e),
        }
    }
}

fn print_eval_error(err: &EvalError) {
    println!("Error: {}", err.to_value().inspect());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_form_nil_result_prints_nothing() {
        let mut ctx = Context::new();
        let forms = parser::parse_string("nil", "<test>").unwrap();
        assert_eq!(list::length(&forms), 1);
        let result = eval::eval(&mut ctx, list::iter(&forms).next().unwrap()).unwrap();
        assert!(result.is_nil());
    }

    #[test]
    fn multiple_forms_on_one_line_are_numbered() {
        let forms = parser::parse_string("1\n2", "<test>").unwrap();
        assert_eq!(list::length(&forms), 2);
    }
}
