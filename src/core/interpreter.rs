//! The execution engine: walks the program tree and threads program state
//! through every command.
//!
//! Two termination disciplines nest freely: a repeat block either runs a
//! fixed number of passes, or keeps replaying until the output has grown by
//! a number of words.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::core::commands::{
    new_chapter, recite, ref_gender, set_format, shift, special_write, store_snippet,
};
use crate::core::error::{ErrorKind, ScriptError, Warning};
use crate::core::expr::{self, Style};
use crate::core::format::{word_count, Format, FormatCode};
use crate::core::params::{Amount, Counting};
use crate::core::store::{Folder, Namespace, Store};
use crate::schema::command::{BlockKind, Keyword, Line, Node, Program};
use crate::schema::gender::GenderCatalog;
use crate::schema::value::{Catalog, ValueRef};

/// Passes between liveness events on long repeats.
const LIVENESS_INTERVAL: u64 = 10_000;
/// Remaining units above which a repeat counts as long.
const LIVENESS_THRESHOLD: usize = 10_000;

/// Receives the text of `DISPLAY` commands.
pub type DisplaySink = Box<dyn FnMut(&str)>;

/// Everything a run starts from. Built once, never mutated by execution.
#[derive(Debug, Clone)]
pub struct ProgramSeed {
    pub word_sets: Catalog,
    pub sentence_sets: Catalog,
    pub genders: GenderCatalog,
    pub format: Format,
    /// User variable that reads as the whole word folder.
    pub words_alias: String,
    /// User variable that reads as the whole sentence folder.
    pub sentences_alias: String,
}

impl ProgramSeed {
    pub fn new(word_sets: Catalog, sentence_sets: Catalog) -> Self {
        Self {
            word_sets,
            sentence_sets,
            genders: GenderCatalog::default(),
            format: Format::default(),
            words_alias: "wfolder".to_string(),
            sentences_alias: "sfolder".to_string(),
        }
    }

    pub fn with_genders(mut self, genders: GenderCatalog) -> Self {
        self.genders = genders;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_aliases(mut self, words: &str, sentences: &str) -> Self {
        self.words_alias = words.to_string();
        self.sentences_alias = sentences.to_string();
        self
    }

    /// A fresh program state for one run.
    pub fn initial_state(&self) -> ProgramState {
        let mut store = Store::new(self.word_sets.clone(), self.sentence_sets.clone());
        store.alias_folder(&self.words_alias, Folder::Words);
        store.alias_folder(&self.sentences_alias, Folder::Sentences);
        ProgramState {
            format: self.format.clone(),
            chapter: 0,
            output: Vec::new(),
            output_words: 0,
            current: None,
            genders: self.genders.clone(),
            store,
            warnings: Vec::new(),
        }
    }
}

/// The mutable state of a run. Moved through every command handler.
#[derive(Debug, Clone)]
pub struct ProgramState {
    pub format: Format,
    pub chapter: u32,
    /// Finished sentences, in order. Append only.
    pub output: Vec<String>,
    output_words: usize,
    /// The line being executed, for error context.
    pub current: Option<Line>,
    pub genders: GenderCatalog,
    pub store: Store,
    pub warnings: Vec<Warning>,
}

impl ProgramState {
    pub fn push_sentence(&mut self, sentence: String) {
        self.output_words += word_count(&sentence);
        self.output.push(sentence);
    }

    /// Words across the whole output so far.
    pub fn word_count(&self) -> usize {
        self.output_words
    }

    /// Record a warning and log it. Execution carries on.
    pub fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// The interpreter. Built via `Interpreter::builder()`.
pub struct Interpreter {
    pub(crate) rng: StdRng,
    pub(crate) display: DisplaySink,
}

/// Builder for constructing an `Interpreter`.
pub struct InterpreterBuilder {
    seed: Option<u64>,
    display: Option<DisplaySink>,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder {
            seed: None,
            display: None,
        }
    }

    /// Run a whole program from a seed.
    pub fn run(&mut self, seed: &ProgramSeed, program: &Program) -> Result<ProgramState, ScriptError> {
        let state = seed.initial_state();
        let state = self.execute(state, &program.nodes, 0, 1, Counting::Cycles)?;
        info!(
            sentences = state.output.len(),
            words = state.word_count(),
            warnings = state.warnings.len(),
            "program finished"
        );
        Ok(state)
    }

    /// Replay `nodes` until `progress` reaches `stop`.
    ///
    /// In cycle mode progress is the number of completed passes; in word
    /// mode it is the output word count, recounted after every pass.
    pub fn execute(
        &mut self,
        mut state: ProgramState,
        nodes: &[Node],
        mut progress: usize,
        stop: usize,
        mode: Counting,
    ) -> Result<ProgramState, ScriptError> {
        let mut passes: u64 = 0;
        while progress < stop {
            if passes > 0 && passes % LIVENESS_INTERVAL == 0 && stop - progress > LIVENESS_THRESHOLD {
                info!(passes, progress, stop, "still running");
            }
            for node in nodes {
                state = self.step(state, node)?;
            }
            passes += 1;
            progress = match mode {
                Counting::Cycles => progress + 1,
                Counting::Words => state.word_count(),
            };
        }
        Ok(state)
    }

    fn step(&mut self, mut state: ProgramState, node: &Node) -> Result<ProgramState, ScriptError> {
        match node {
            Node::Line(line) => {
                state.current = Some(line.clone());
                self.dispatch(state, line)
            }
            Node::Block(block) => {
                state.current = Some(block.opener.clone());
                debug!(line = block.opener.number, kind = block.kind.name(), "block");
                match block.kind {
                    BlockKind::Gen => self.generate(state, block),
                    BlockKind::Desc => store_snippet(state, block),
                    BlockKind::Loop => {
                        let (amount, mode) = loop_target(&state, &block.opener, &mut self.rng)?;
                        let (progress, stop) = match mode {
                            Counting::Cycles => (0, amount),
                            Counting::Words => (state.word_count(), state.word_count() + amount),
                        };
                        self.execute(state, &block.body, progress, stop, mode)
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
        if line.is_blank() || line.is_comment() {
            return Ok(state);
        }
        let keyword = Keyword::parse(&line.keyword())
            .filter(|k| !k.is_structural())
            .ok_or_else(|| ScriptError::new(ErrorKind::UnknownCommand, line, "unrecognized command"))?;
        debug!(line = line.number, command = keyword.name(), "dispatch");

        if let Some(style) = Style::from_keyword(keyword) {
            let mut state = state;
            expr::assign(style, line, &mut state.store, &mut self.rng)?;
            return Ok(state);
        }
        match keyword {
            Keyword::Display => self.display(state, line),
            Keyword::Write => self.write(state, line),
            Keyword::Format => set_format(state, line),
            Keyword::NewLine => special_write(state, line, " ", FormatCode::LineAfter),
            Keyword::NewPara => special_write(state, line, " ", FormatCode::ParagraphAfter),
            Keyword::NewChapter => new_chapter(state, line),
            Keyword::RefGender => ref_gender(state, line),
            Keyword::Recite => recite(state, line),
            Keyword::Shift => shift(state, line),
            Keyword::Shuffle => self.shuffle(state, line),
            Keyword::Call => self.call(state, line),
            _ => Err(ScriptError::new(ErrorKind::UnknownCommand, line, "unrecognized command")),
        }
    }
}

/// Parse a `LOOP` opener into a resolved target and counting mode.
fn loop_target(
    state: &ProgramState,
    opener: &Line,
    rng: &mut StdRng,
) -> Result<(usize, Counting), ScriptError> {
    const USAGE: &str = "LOOP 5, LOOP 4--10, LOOP 500W or LOOP 600W--900W";
    let params = opener.param_words();
    let (amount, mode) = match params.as_slice() {
        [] => (1, Counting::Cycles),
        [param] => match Amount::parse(param) {
            Some(amount) => (amount.resolve(rng), amount.counting()),
            None => match state.store.lookup(param, Namespace::All) {
                // a one-item list holding a whole number, as `ASSIGNLIST n = "3"` makes
                Some(ValueRef::List([text])) => match Amount::parse_count(text.trim()) {
                    Some(Amount::Count(n)) => (n, Counting::Cycles),
                    _ => {
                        return Err(ScriptError::parameter_value(
                            opener,
                            "a variable holding a whole number",
                            text.to_string(),
                        ))
                    }
                },
                Some(other) => {
                    return Err(ScriptError::parameter_value(
                        opener,
                        "a variable holding a whole number",
                        format!("a variable of type {}", other.kind()),
                    ))
                }
                None => return Err(ScriptError::syntax(opener, USAGE).actual(param.to_string())),
            },
        },
        more => return Err(ScriptError::parameter_count(opener, USAGE, more.len())),
    };
    if amount == 0 {
        return Err(ScriptError::parameter_value(opener, "a repeat target above zero", "0"));
    }
    Ok((amount, mode))
}

impl InterpreterBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Seed from configuration when present, else from entropy.
    pub fn seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Where `DISPLAY` output goes. Defaults to an info-level log event.
    pub fn display(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.display = Some(Box::new(sink));
        self
    }

    pub fn build(self) -> Interpreter {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let display: DisplaySink = match self.display {
            Some(sink) => sink,
            None => Box::new(|text: &str| info!(target: "proseloop::display", "{}", text)),
        };
        Interpreter { rng, display }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::parse_source;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn seed() -> ProgramSeed {
        ProgramSeed::new(
            Catalog::from_entries([
                ("noun".to_string(), words(&["cat"])),
                ("verb".to_string(), words(&["sat"])),
            ]),
            Catalog::from_entries([("story".to_string(), words(&["the _noun_ _verb_"]))]),
        )
    }

    fn run(source: &str) -> Result<ProgramState, ScriptError> {
        let program = parse_source(source)?;
        Interpreter::builder().seed(11).build().run(&seed(), &program)
    }

    #[test]
    fn loop_repeats_body() {
        let state = run("FORMAT CPS\nLOOP 3\nWRITE story wfolder\nLOOPEND").unwrap();
        assert_eq!(state.output, vec!["The cat sat. "; 3]);
        assert_eq!(state.word_count(), 9);
    }

    #[test]
    fn nested_loops_multiply() {
        let state = run("LOOP 2\nLOOP 3\nNEWLINE\nLOOPEND\nNEWPARA\nLOOPEND").unwrap();
        assert_eq!(state.output.len(), 8);
        assert_eq!(state.output[3], " \n\n");
    }

    #[test]
    fn bare_loop_runs_once() {
        let state = run("LOOP\nNEWLINE\nEND").unwrap();
        assert_eq!(state.output.len(), 1);
    }

    #[test]
    fn word_loop_stops_at_target() {
        let state = run("LOOP 10W\nWRITE story wfolder\nLOOPEND").unwrap();
        assert_eq!(state.word_count(), 12);
        assert_eq!(state.output.len(), 4);
    }

    #[test]
    fn zero_loop_is_rejected() {
        let err = run("LOOP 0\nNEWLINE\nLOOPEND").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameterValue);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn loop_parameter_errors() {
        assert_eq!(run("LOOP 1 2\nLOOPEND").unwrap_err().kind, ErrorKind::ParameterCount);
        assert_eq!(run("LOOP lots\nLOOPEND").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(
            run("LOOP noun\nLOOPEND").unwrap_err().kind,
            ErrorKind::InvalidParameterValue
        );
    }

    #[test]
    fn loop_count_from_variable() {
        let state = run("ASSIGNLIST times = \"4\"\nLOOP times\nNEWLINE\nLOOPEND").unwrap();
        assert_eq!(state.output.len(), 4);

        let err = run("ASSIGNLIST times = \"4\" + \"5\"\nLOOP times\nLOOPEND").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameterValue);
        assert_eq!(err.line, 2);
        assert_eq!(
            run("ASSIGNLIST times = \"0\"\nLOOP times\nLOOPEND").unwrap_err().kind,
            ErrorKind::InvalidParameterValue
        );
    }

    #[test]
    fn unknown_command_halts() {
        let err = run("NEWLINE\nFROBNICATE now").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownCommand);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let state = run("# a comment\n\n   \nNEWLINE").unwrap();
        assert_eq!(state.output.len(), 1);
    }

    #[test]
    fn display_goes_to_sink() {
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&seen);
        let program = parse_source("NEWCHAPTER\nDISPLAY").unwrap();
        let mut interp = Interpreter::builder()
            .seed(1)
            .display(move |text| sink.borrow_mut().push(text.to_string()))
            .build();
        interp.run(&seed(), &program).unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Chapter 1"));
        assert!(seen[0].contains("BEGIN DISPLAY"));
    }

    #[test]
    fn seed_is_not_mutated() {
        let s = seed();
        let program = parse_source("ASSIGNLIST noun = \"dog\"").unwrap();
        let state = Interpreter::builder().seed(3).build().run(&s, &program).unwrap();
        assert_eq!(state.store.word_sets().get("noun"), Some(&words(&["dog"])[..]));
        assert_eq!(s.word_sets.get("noun"), Some(&words(&["cat"])[..]));
    }
}
