//! Assignment commands: `ASSIGNLIST`, `ASSIGNCATALOG`, `ASSIGNGEN`,
//! `WORDJOIN` and the four case conversions.
//!
//! Every assignment has the shape `CMD lhs... = rhs`. The right-hand side is
//! evaluated once and the result stored under each left-hand name.

use rand::Rng;

use crate::core::error::ScriptError;
use crate::core::params::{string_literal, Amount};
use crate::core::select::unique_sample;
use crate::core::store::{Namespace, Store, StoreError};
use crate::schema::command::{Keyword, Line};
use crate::schema::entity::Entity;
use crate::schema::value::{Catalog, Kind, Value, ValueRef};

/// How an assignment evaluates its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    List,
    Catalog,
    EntityAll,
    WordJoin,
    Upper,
    Lower,
    SentenceCase,
    SentenceCaseLower,
}

impl Style {
    pub fn from_keyword(keyword: Keyword) -> Option<Self> {
        let style = match keyword {
            Keyword::AssignList => Self::List,
            Keyword::AssignCatalog => Self::Catalog,
            Keyword::AssignGen => Self::EntityAll,
            Keyword::WordJoin => Self::WordJoin,
            Keyword::UpCase => Self::Upper,
            Keyword::LowCase => Self::Lower,
            Keyword::SupCase => Self::SentenceCase,
            Keyword::SlowCase => Self::SentenceCaseLower,
            _ => return None,
        };
        Some(style)
    }

    /// The value kind this style builds with `+` and `-`, if any.
    fn set_kind(&self) -> Option<Kind> {
        match self {
            Self::List => Some(Kind::List),
            Self::Catalog => Some(Kind::Catalog),
            Self::EntityAll => Some(Kind::Group),
            _ => None,
        }
    }

    fn allowed(&self) -> &'static str {
        match self {
            Self::List => "a string literal or a variable of type list",
            Self::Catalog => "a variable of type list or catalog",
            Self::EntityAll => "a variable of type gen",
            _ => "a string literal or a variable of type list",
        }
    }
}

/// Split `lhs = rhs` into exactly two non-empty, trimmed sides.
pub fn split_assignment(params: &str) -> Option<(&str, &str)> {
    let mut parts = params.split(" = ");
    let lhs = parts.next()?.trim();
    let rhs = parts.next()?.trim();
    if parts.next().is_some() || lhs.is_empty() || rhs.is_empty() {
        return None;
    }
    Some((lhs, rhs))
}

/// Run one assignment line against the store.
pub fn assign<R: Rng + ?Sized>(
    style: Style,
    line: &Line,
    store: &mut Store,
    rng: &mut R,
) -> Result<(), ScriptError> {
    let (lhs, rhs) = split_assignment(line.params()).ok_or_else(|| {
        ScriptError::syntax(line, "newvariable = value").actual("too few arguments or ' = ' missing")
    })?;
    let value = evaluate(style, rhs, line, store, rng)?;
    store_all(line, store, lhs, value)
}

/// Store `value` under every whitespace-separated name in `lhs`.
pub fn store_all(line: &Line, store: &mut Store, lhs: &str, value: Value) -> Result<(), ScriptError> {
    for name in lhs.split_whitespace() {
        store
            .assign(name, value.clone())
            .map_err(|err| store_error(line, name, err))?;
    }
    Ok(())
}

pub(crate) fn store_error(line: &Line, name: &str, err: StoreError) -> ScriptError {
    match err {
        StoreError::Missing(_) => ScriptError::unknown_variable(line, name),
        StoreError::Mismatch {
            expected, actual, ..
        } => ScriptError::type_mismatch(line, name, expected.name(), actual.name()),
    }
}

/// Evaluate a right-hand side without storing it.
pub fn evaluate<R: Rng + ?Sized>(
    style: Style,
    rhs: &str,
    line: &Line,
    store: &Store,
    rng: &mut R,
) -> Result<Value, ScriptError> {
    match style {
        Style::WordJoin => word_join(rhs, line, store).map(Value::List),
        Style::Upper | Style::Lower | Style::SentenceCase | Style::SentenceCaseLower => {
            let items = list_operand(rhs.trim(), line, store)?;
            Ok(Value::List(items.iter().map(|s| convert_case(style, s)).collect()))
        }
        _ => {
            if let Some(value) = select_shorthand(style, rhs, line, store, rng)? {
                return Ok(value);
            }
            set_expression(style, rhs, line, store)
        }
    }
}

/// A string literal or an existing list, as an owned list.
fn list_operand(term: &str, line: &Line, store: &Store) -> Result<Vec<String>, ScriptError> {
    if let Some(literal) = string_literal(term) {
        return Ok(vec![literal.to_string()]);
    }
    match store.lookup(term, Namespace::All) {
        None => Err(ScriptError::unknown_variable(line, term)),
        Some(ValueRef::List(list)) => Ok(list.to_vec()),
        Some(other) => Err(ScriptError::type_mismatch(
            line,
            term,
            "a variable of type list or a string literal",
            other.kind().name(),
        )),
    }
}

/// Pairwise concatenation, the shorter operand repeating. Empty operands
/// leave the accumulated result alone.
fn word_join(rhs: &str, line: &Line, store: &Store) -> Result<Vec<String>, ScriptError> {
    let terms: Vec<&str> = rhs.split(" + ").collect();
    if terms.len() < 2 {
        return Err(ScriptError::parameter_count(
            line,
            "2 parameters on the right hand side",
            terms.len(),
        ));
    }
    let mut joined: Vec<String> = Vec::new();
    for term in terms {
        let operand = list_operand(term.trim(), line, store)?;
        if operand.is_empty() || operand == [""] {
            continue;
        }
        if joined.is_empty() {
            joined = operand;
            continue;
        }
        let size = joined.len().max(operand.len());
        joined = (0..size)
            .map(|i| format!("{}{}", joined[i % joined.len()], operand[i % operand.len()]))
            .collect();
    }
    Ok(joined)
}

fn convert_case(style: Style, item: &str) -> String {
    let mut chars = item.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    match style {
        Style::Upper => item.to_uppercase(),
        Style::Lower => item.to_lowercase(),
        Style::SentenceCase => first.to_uppercase().chain(chars).collect(),
        Style::SentenceCaseLower => first.to_lowercase().chain(chars).collect(),
        _ => item.to_string(),
    }
}

/// `variable count`: a unique random selection of `count` items.
fn select_shorthand<R: Rng + ?Sized>(
    style: Style,
    rhs: &str,
    line: &Line,
    store: &Store,
    rng: &mut R,
) -> Result<Option<Value>, ScriptError> {
    let words: Vec<&str> = rhs.split_whitespace().collect();
    let &[name, count] = words.as_slice() else {
        return Ok(None);
    };
    let Some(amount) = Amount::parse_count(count) else {
        return Ok(None);
    };
    let count = amount.resolve(rng);
    if count == 0 {
        return Err(ScriptError::parameter_value(
            line,
            "one or more items to select",
            "0",
        ));
    }
    let source = store
        .lookup(name, Namespace::All)
        .ok_or_else(|| ScriptError::unknown_variable(line, name))?;
    let expected = style.set_kind().unwrap_or(Kind::List);
    let value = match (style, source) {
        (Style::List, ValueRef::List(list)) => Value::List(unique_sample(list, count, &[], rng)),
        (Style::Catalog, ValueRef::Catalog(catalog)) => Value::Catalog(Catalog::from_entries(
            unique_sample(catalog.entries(), count, &[], rng),
        )),
        (Style::EntityAll, ValueRef::Group(group)) => {
            Value::Group(unique_sample(group.members(), count, &[], rng))
        }
        (_, other) => {
            return Err(ScriptError::type_mismatch(
                line,
                name,
                expected.name(),
                other.kind().name(),
            ))
        }
    };
    Ok(Some(value))
}

enum Accumulator {
    List(Vec<String>),
    Catalog(Catalog),
    Group(Vec<Entity>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Subtract,
}

/// `a + b - c + d`: split on ` + `, then each group on ` - `. The first
/// term of each group is added and the rest subtracted, left to right.
fn set_expression(style: Style, rhs: &str, line: &Line, store: &Store) -> Result<Value, ScriptError> {
    let mut acc = match style {
        Style::Catalog => Accumulator::Catalog(Catalog::new()),
        Style::EntityAll => Accumulator::Group(Vec::new()),
        _ => Accumulator::List(Vec::new()),
    };
    for group in rhs.split(" + ") {
        for (i, term) in group.split(" - ").enumerate() {
            let op = if i == 0 { Op::Add } else { Op::Subtract };
            apply_term(&mut acc, op, term.trim(), style, line, store)?;
        }
    }
    Ok(match acc {
        Accumulator::List(list) => Value::List(list),
        Accumulator::Catalog(catalog) => Value::Catalog(catalog),
        Accumulator::Group(members) => Value::Group(members),
    })
}

fn apply_term(
    acc: &mut Accumulator,
    op: Op,
    term: &str,
    style: Style,
    line: &Line,
    store: &Store,
) -> Result<(), ScriptError> {
    let literal = string_literal(term);
    let var = match literal {
        Some(_) => None,
        None => Some(
            store
                .lookup(term, Namespace::All)
                .ok_or_else(|| ScriptError::unknown_variable(line, term))?,
        ),
    };
    let mismatch = |actual: &str| ScriptError::type_mismatch(line, term, style.allowed(), actual);

    match (acc, literal, var) {
        (Accumulator::List(list), Some(text), _) => {
            let item = [text.to_string()];
            combine_list(list, &item, op);
        }
        (Accumulator::List(list), None, Some(ValueRef::List(items))) => combine_list(list, items, op),
        (Accumulator::Catalog(catalog), None, Some(ValueRef::List(items))) => {
            let key = term.to_lowercase();
            match op {
                Op::Add => catalog.insert(key, items.to_vec()),
                Op::Subtract => {
                    catalog.remove(&key);
                }
            }
        }
        (Accumulator::Catalog(catalog), None, Some(ValueRef::Catalog(other))) => match op {
            Op::Add => catalog.merge(other),
            Op::Subtract => {
                for key in other.keys() {
                    catalog.remove(key);
                }
            }
        },
        (Accumulator::Group(members), None, Some(ValueRef::Group(group))) => {
            combine_list(members, group.members(), op)
        }
        (_, Some(_), _) => return Err(mismatch("a string literal")),
        (_, None, Some(other)) => return Err(mismatch(other.kind().name())),
        (_, None, None) => return Err(ScriptError::unknown_variable(line, term)),
    }
    Ok(())
}

/// Union or difference, keeping first occurrences in order.
fn combine_list<T: Clone + PartialEq>(acc: &mut Vec<T>, items: &[T], op: Op) {
    match op {
        Op::Add => {
            for item in items {
                if !acc.contains(item) {
                    acc.push(item.clone());
                }
            }
        }
        Op::Subtract => acc.retain(|existing| !items.contains(existing)),
    }
}
