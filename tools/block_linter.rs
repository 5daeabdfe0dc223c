/// Block Linter. Checks the block structure and command words of a prose
/// program without running it.
///
/// Usage: block_linter <program>...
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process;

use proseloop::core::format::Format;
use proseloop::parse_source;
use proseloop::schema::command::{BlockKind, Keyword, Line, Node};

#[derive(Parser, Debug)]
#[command(name = "block_linter")]
#[command(about = "Check block structure and command words of prose programs")]
struct Args {
    /// Program files to check
    #[arg(required = true)]
    programs: Vec<PathBuf>,
}

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Vec<String>,
    blocks: usize,
    commands: usize,
    snippets: HashSet<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut failed = false;

    for path in &args.programs {
        println!("\n=== {} ===\n", path.display());
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("ERROR: Failed to read program: {}", e);
                failed = true;
                continue;
            }
        };
        let program = match parse_source(&source) {
            Ok(program) => program,
            Err(e) => {
                println!("ERROR: {}", e);
                failed = true;
                continue;
            }
        };

        let mut report = Report::default();
        lint_nodes(&program.nodes, &mut report);

        if report.errors.is_empty() && report.warnings.is_empty() {
            println!("All checks passed!");
        }
        for warning in &report.warnings {
            println!("WARNING: {}", warning);
        }
        for error in &report.errors {
            println!("ERROR: {}", error);
        }
        println!(
            "\nSummary: {} commands, {} blocks, {} errors, {} warnings",
            report.commands,
            report.blocks,
            report.errors.len(),
            report.warnings.len()
        );
        failed |= !report.errors.is_empty();
    }

    process::exit(if failed { 1 } else { 0 });
}

fn lint_nodes(nodes: &[Node], report: &mut Report) {
    for node in nodes {
        match node {
            Node::Line(line) => lint_line(line, report),
            Node::Block(block) => {
                report.blocks += 1;
                match block.kind {
                    BlockKind::Gen => lint_gen_body(&block.body, report),
                    BlockKind::Desc => {
                        if let [name] = block.opener.param_words().as_slice() {
                            report.snippets.insert(name.to_lowercase());
                        }
                        lint_nodes(&block.body, report);
                    }
                    BlockKind::Loop => lint_nodes(&block.body, report),
                }
            }
        }
    }
}

fn lint_line(line: &Line, report: &mut Report) {
    if line.is_blank() || line.is_comment() {
        return;
    }
    report.commands += 1;
    let Some(keyword) = Keyword::parse(&line.keyword()).filter(|k| !k.is_structural()) else {
        report
            .errors
            .push(format!("line {}: unrecognized command '{}'", line.number, line.text));
        return;
    };
    match keyword {
        Keyword::Format => {
            if let [codes] = line.param_words().as_slice() {
                if let Err(e) = Format::parse(codes) {
                    report.errors.push(format!("line {}: {}", line.number, e));
                }
            }
        }
        Keyword::Call => {
            if let [name] = line.param_words().as_slice() {
                if !report.snippets.contains(&name.to_lowercase()) {
                    report.warnings.push(format!(
                        "line {}: CALL {} before any DESC of that name",
                        line.number, name
                    ));
                }
            }
        }
        _ => {}
    }
}

/// `GEN` bodies hold field lines, not commands, and may not nest blocks.
fn lint_gen_body(body: &[Node], report: &mut Report) {
    for node in body {
        match node {
            Node::Block(inner) => report.errors.push(format!(
                "line {}: nested {} inside GEN",
                inner.opener.number,
                inner.kind.name()
            )),
            Node::Line(line) if line.is_blank() || line.is_comment() => {}
            Node::Line(line) => {
                let count = line.text.split_whitespace().count();
                if !(3..=4).contains(&count) {
                    report.errors.push(format!(
                        "line {}: GEN field lines take 3 - 4 words, found {}",
                        line.number, count
                    ));
                }
            }
        }
    }
}
