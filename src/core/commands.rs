//! Leaf command handlers. Each takes the program state by value and hands
//! back the updated state.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::{ErrorKind, ScriptError, Warning};
use crate::core::expr::{split_assignment, store_all};
use crate::core::format::{Format, FormatCode};
use crate::core::interpreter::{Interpreter, ProgramState};
use crate::core::params::{parse_offset, string_literal, Amount, Counting};
use crate::core::select::{next_index, shift_pointer, shuffle_group};
use crate::core::store::{split_dotted, Namespace};
use crate::core::substitute::substitute_all;
use crate::schema::command::{Block, Line};
use crate::schema::gender::GenderError;
use crate::schema::value::{Catalog, Value, ValueRef};

/// Where `WRITE` takes its sentences from.
enum Sentences {
    List(Vec<String>),
    /// Each entry holds alternatives; one is drawn per use.
    Catalog(Catalog),
}

impl Sentences {
    fn len(&self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Catalog(catalog) => catalog.len(),
        }
    }

    /// The sentence at `index`, wrapping. `None` for an empty catalog entry.
    fn pick<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Option<String> {
        match self {
            Self::List(list) => list.get(index % list.len()).cloned(),
            Self::Catalog(catalog) => {
                let (_, options) = &catalog.entries()[index % catalog.len()];
                options.choose(rng).cloned()
            }
        }
    }
}

/// A list holding a single empty string.
fn is_blank_list(list: &[String]) -> bool {
    list.len() == 1 && list[0].is_empty()
}

impl Interpreter {
    /// `WRITE sentences words [amount] [RANDOM|ORDER]`
    pub(crate) fn write(&mut self, mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
        let params = line.param_words();
        if !(2..=4).contains(&params.len()) {
            return Err(ScriptError::parameter_count(line, "2 - 4 parameters", params.len()));
        }
        let sentence_name = params[0].to_lowercase();
        let word_name = params[1].to_lowercase();

        let words = match state.store.lookup(&word_name, Namespace::All) {
            None => return Err(ScriptError::unknown_variable(line, &word_name)),
            Some(found) if found.is_empty() => {
                return Err(
                    ScriptError::new(ErrorKind::EmptySource, line, "the specified word variable is empty")
                        .expected("a non-empty word variable")
                        .actual(word_name),
                )
            }
            Some(ValueRef::Catalog(catalog)) => catalog.clone(),
            Some(other) => {
                return Err(ScriptError::type_mismatch(
                    line,
                    &word_name,
                    "a variable of type catalog",
                    other.kind().name(),
                ))
            }
        };
        let sentences = match state.store.lookup(&sentence_name, Namespace::All) {
            None => return Err(ScriptError::unknown_variable(line, &sentence_name)),
            Some(found) if found.is_empty() || found.as_list().is_some_and(is_blank_list) => {
                return Err(
                    ScriptError::new(ErrorKind::EmptySource, line, "the specified sentence variable is empty")
                        .expected("a valid and non-empty sentence variable name")
                        .actual(sentence_name),
                )
            }
            Some(ValueRef::List(list)) => Sentences::List(list.to_vec()),
            Some(ValueRef::Catalog(catalog)) => Sentences::Catalog(catalog.clone()),
            Some(other) => {
                return Err(ScriptError::type_mismatch(
                    line,
                    &sentence_name,
                    "a variable of type list or catalog",
                    other.kind().name(),
                ))
            }
        };

        let (amount, mode) = match params.get(2) {
            None => (1, Counting::Cycles),
            Some(text) => {
                let amount = Amount::parse(text).ok_or_else(|| {
                    ScriptError::syntax(
                        line,
                        "a number or numerical range, or an amount of words or numerical range of words",
                    )
                    .actual(text.to_string())
                })?;
                (amount.resolve(&mut self.rng), amount.counting())
            }
        };
        let ordered = match params.get(3).map(|s| s.to_lowercase()) {
            None => false,
            Some(order) if order == "order" => true,
            Some(order) if order == "random" => false,
            Some(order) => return Err(ScriptError::syntax(line, "RANDOM or ORDER").actual(order)),
        };

        let (mut progress, stop) = match mode {
            Counting::Cycles => (0, amount),
            Counting::Words => (state.word_count(), state.word_count() + amount),
        };
        let size = sentences.len();
        let mut index = if ordered { 0 } else { self.rng.gen_range(0..size) };

        while progress < stop {
            let sentence = sentences.pick(index, &mut self.rng).ok_or_else(|| {
                ScriptError::parameter_value(
                    line,
                    "a sentence catalog without empty entries",
                    "an empty value",
                )
            })?;
            let filled = substitute_all(&sentence, &words, &state.store, &mut self.rng);
            for miss in &filled.misses {
                let message = if miss.empty {
                    format!(
                        "unable to complete word substitution for {}: the word set is empty or not a list",
                        miss.placeholder
                    )
                } else {
                    format!(
                        "unable to complete word substitution for {}: no such word set in {}",
                        miss.placeholder, word_name
                    )
                };
                state.warn(Warning::severe(message).at(line));
            }
            let formatted = state.format.apply(&filled.text);
            state.push_sentence(formatted);

            progress = match mode {
                Counting::Cycles => progress + 1,
                Counting::Words => state.word_count(),
            };
            index = next_index(index, size, ordered, &mut self.rng);
        }
        Ok(state)
    }

    /// `DISPLAY [n]`: all sentences, the first `n`, or the last `-n`.
    pub(crate) fn display(&mut self, mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
        let params = line.param_words();
        let total = state.output.len();
        let range = match params.as_slice() {
            [] => 0..total,
            [count] => {
                let n = parse_offset(count).ok_or_else(|| {
                    ScriptError::parameter_value(line, "a non-zero numerical parameter", count.to_string())
                })?;
                let wanted = n.unsigned_abs() as usize;
                if wanted > total {
                    state.warn(
                        Warning::mild(
                            "the number of sentences requested is larger than the story; displaying all sentences",
                        )
                        .at(line),
                    );
                    0..total
                } else if n > 0 {
                    0..wanted
                } else {
                    total - wanted..total
                }
            }
            more => {
                return Err(ScriptError::parameter_count(
                    line,
                    "0 or 1 numeric parameters",
                    more.len(),
                ))
            }
        };

        let shown = state.output[range].join("\n");
        let text = format!(
            "\n---BEGIN DISPLAY COMMAND {text} in line {number}---\n{shown}\n---END DISPLAY COMMAND {text} in line {number}---",
            text = line.text,
            number = line.number,
        );
        (self.display)(&text);
        Ok(state)
    }

    /// `SHUFFLE group`
    pub(crate) fn shuffle(&mut self, mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
        let params = line.param_words();
        let [name] = params.as_slice() else {
            return Err(ScriptError::parameter_count(line, "1 parameter", params.len()));
        };
        let name = name.to_lowercase();
        if name.contains('.') {
            return Err(ScriptError::syntax(line, "a gen").actual("a variable inside a gen"));
        }
        let group = state
            .store
            .group_mut(&name)
            .ok_or_else(|| ScriptError::unknown_variable(line, &name))?;
        shuffle_group(group, &mut self.rng);
        Ok(state)
    }

    /// `CALL name`: run a stored snippet once.
    pub(crate) fn call(&mut self, state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
        let params = line.param_words();
        let [name] = params.as_slice() else {
            return Err(ScriptError::parameter_count(
                line,
                "one parameter only, the name of the desc to be called",
                params.len(),
            ));
        };
        let name = name.to_lowercase();
        let nodes = state.store.snippet(&name).map(|n| n.to_vec()).ok_or_else(|| {
            ScriptError::new(
                ErrorKind::UnknownVariable,
                line,
                format!(
                    "unable to call the desc {} as it does not exist or was not defined prior to calling it",
                    name
                ),
            )
        })?;
        self.execute(state, &nodes, 0, 1, Counting::Cycles)
    }
}

/// `FORMAT codes`
pub(crate) fn set_format(mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
    let params = line.param_words();
    let [codes] = params.as_slice() else {
        return Err(ScriptError::parameter_count(line, "1 string parameter", params.len()));
    };
    state.format = Format::parse(codes).map_err(|e| {
        ScriptError::new(ErrorKind::UnknownFormatCode, line, e.to_string())
    })?;
    Ok(state)
}

/// Append a fixed sentence under a fixed format code, ignoring the active
/// format. Backs `NEWLINE`, `NEWPARA` and `NEWCHAPTER`.
pub(crate) fn special_write(
    mut state: ProgramState,
    line: &Line,
    sentence: &str,
    code: FormatCode,
) -> Result<ProgramState, ScriptError> {
    if !line.params().is_empty() {
        return Err(ScriptError::new(ErrorKind::ParameterCount, line, "command takes no parameters")
            .expected("no parameters"));
    }
    state.push_sentence(code.apply(sentence));
    Ok(state)
}

pub(crate) fn new_chapter(mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
    state.chapter += 1;
    let heading = format!("Chapter {}", state.chapter);
    special_write(state, line, &heading, FormatCode::Subheading)
}

/// `REFGENDER gender.field... = variable`
pub(crate) fn ref_gender(mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
    let (lhs, rhs) = split_assignment(line.params())
        .ok_or_else(|| ScriptError::syntax(line, "gender.names = your_variable"))?;
    let rhs_words: Vec<&str> = rhs.split_whitespace().collect();
    let [source] = rhs_words.as_slice() else {
        return Err(ScriptError::syntax(line, "only 1 variable on the right hand side").actual(rhs.to_string()));
    };
    let source = source.to_lowercase();
    let value = match state.store.lookup(&source, Namespace::All) {
        None => return Err(ScriptError::unknown_variable(line, &source)),
        Some(ValueRef::List(list)) => list.to_vec(),
        Some(other) => {
            return Err(ScriptError::type_mismatch(
                line,
                &source,
                "variable of type list",
                format!("variable of type {}", other.kind()),
            ))
        }
    };

    for target in lhs.split_whitespace() {
        let target = target.to_lowercase();
        let (gender, field) = split_dotted(&target).ok_or_else(|| {
            ScriptError::syntax(line, "male.names, female.names, etc").actual(target.clone())
        })?;
        state
            .genders
            .override_field(gender, field, value.clone())
            .map_err(|e| match &e {
                GenderError::UnknownGender(_) => ScriptError::new(ErrorKind::UnknownGender, line, e.to_string()),
                GenderError::UnknownField(field) => ScriptError::unknown_variable(line, field),
                _ => ScriptError::new(ErrorKind::InvalidParameterValue, line, e.to_string()),
            })?;
    }
    Ok(state)
}

/// `RECITE target... = variable [+ "prefix"] [+ all]`
pub(crate) fn recite(mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
    const USAGE: &str = "newvarname = existingvar + prepend-string-literal[optional] + all[optional]";
    let (lhs, rhs) = split_assignment(line.params()).ok_or_else(|| ScriptError::syntax(line, USAGE))?;
    let terms: Vec<&str> = rhs.split(" + ").map(str::trim).collect();
    if terms.len() > 3 {
        return Err(ScriptError::syntax(line, USAGE));
    }
    let source = terms[0].to_lowercase();

    let mut prefix = "";
    let mut across_group = false;
    if let Some(second) = terms.get(1) {
        if let Some(literal) = string_literal(second) {
            prefix = literal;
        } else if second.eq_ignore_ascii_case("all") {
            across_group = true;
        } else {
            return Err(ScriptError::parameter_value(
                line,
                "a valid string literal in quotes or the word 'all' without quotes",
                second.to_string(),
            ));
        }
    }
    if let Some(third) = terms.get(2) {
        if !third.eq_ignore_ascii_case("all") {
            return Err(ScriptError::parameter_value(
                line,
                "the word 'all' at the end, without quotes",
                third.to_string(),
            ));
        }
        across_group = true;
    }

    let list = match state.store.lookup(&source, Namespace::All) {
        None => return Err(ScriptError::unknown_variable(line, &source)),
        Some(ValueRef::List(list)) => list.to_vec(),
        Some(other) => return Err(ScriptError::type_mismatch(line, &source, "a list", other.kind().name())),
    };
    let items = match split_dotted(&source) {
        Some((group, field)) if across_group => state
            .store
            .group(group)
            .map(|g| g.field_across(field))
            .unwrap_or_default(),
        _ => list,
    };
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    if unique.is_empty() {
        state.warn(Warning::severe(format!("empty variable {}", source)).at(line));
    }

    let sentence = recite_list(&unique, prefix);
    store_all(line, &mut state.store, lhs, Value::List(vec![sentence]))?;
    Ok(state)
}

/// Render items as `pa, pb and pc`, with `prefix` in front of each item.
/// The prefix is used exactly as written, so `"the "` carries its own
/// space and no extra one is added.
fn recite_list(items: &[String], prefix: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(if i + 1 == items.len() { " and " } else { ", " });
        }
        out.push_str(prefix);
        out.push_str(item);
    }
    out
}

/// `SHIFT group [offset]`
pub(crate) fn shift(mut state: ProgramState, line: &Line) -> Result<ProgramState, ScriptError> {
    let params = line.param_words();
    if !(1..=2).contains(&params.len()) {
        return Err(ScriptError::parameter_count(line, "1 or 2 parameters", params.len()));
    }
    let name = params[0].to_lowercase();
    let offset = match params.get(1) {
        None => 1,
        Some(text) => parse_offset(text).ok_or_else(|| {
            ScriptError::syntax(line, "a non-zero numerical parameter").actual(text.to_string())
        })?,
    };
    if name.contains('.') {
        return Err(ScriptError::syntax(line, "a gen").actual("a variable inside a gen"));
    }
    let group = state
        .store
        .group_mut(&name)
        .ok_or_else(|| ScriptError::unknown_variable(line, &name))?;
    if shift_pointer(group, offset).is_err() {
        state.warn(
            Warning::severe(format!(
                "referenced gen {} is empty or its pointer is undefined",
                name
            ))
            .at(line),
        );
    }
    Ok(state)
}

/// Store a `DESC` block's body under its name, unexecuted.
pub(crate) fn store_snippet(mut state: ProgramState, block: &Block) -> Result<ProgramState, ScriptError> {
    let params = block.opener.param_words();
    let [name] = params.as_slice() else {
        return Err(ScriptError::parameter_count(
            &block.opener,
            "one parameter only, the name of the variable for storing this desc",
            params.len(),
        ));
    };
    state.store.define_snippet(&name.to_lowercase(), block.body.clone());
    Ok(state)
}
