/// proseloop: run a prose program and write the story to a markdown file.
///
/// Usage: proseloop <program> [--config <ron>] [--vocab <dir>] [--seed <n>] [--output <file>]
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, warn};

use proseloop::config::RunConfig;
use proseloop::core::format::output_word_count;
use proseloop::output::{write_story, NamePolicy};
use proseloop::run::{prepare_seed, read_program, RunError};
use proseloop::Interpreter;

#[derive(Parser, Debug)]
#[command(name = "proseloop")]
#[command(about = "Run a prose program and write the generated story")]
struct Args {
    /// Program file, one command per line
    program: PathBuf,

    /// RON run configuration
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Vocabulary root holding the sentence and word folders
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible story
    #[arg(long, short = 's')]
    seed: Option<u64>,

    /// Output file; proposed from the first sentence when omitted
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load_from_ron(path)?,
        None => RunConfig::default(),
    };
    if let Some(vocab) = args.vocab {
        config.vocabulary_root = vocab;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let (seed, load_warnings) = prepare_seed(&config)?;
    for warning in &load_warnings {
        warn!("{}", warning);
    }
    let program = read_program(&args.program)?;
    info!(program = %args.program.display(), "running program");

    let mut interpreter = Interpreter::builder()
        .seed_opt(config.seed)
        .display(|text| println!("{}", text))
        .build();
    let state = interpreter.run(&seed, &program)?;

    let path = match args.output {
        Some(path) => path,
        None => {
            let mut rng = match config.seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let proposed = PathBuf::from(NamePolicy::from(&config).propose(&state.output, &mut rng));
            if proposed.exists() {
                ask_for_name(&proposed)
            } else {
                proposed
            }
        }
    };

    println!(
        "Writing {} words to file: {}",
        output_word_count(&state.output),
        path.display()
    );
    write_story(&path, &state.output)?;
    Ok(())
}

/// Prompt for another file name. An empty answer keeps the proposal.
fn ask_for_name(proposed: &Path) -> PathBuf {
    print!("{} exists. Enter filename for story: ", proposed.display());
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return proposed.to_path_buf();
    }
    match answer.trim() {
        "" => proposed.to_path_buf(),
        name => PathBuf::from(name),
    }
}
