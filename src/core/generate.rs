//! Entity generation: the `GEN` block.
//!
//! ```text
//! GEN crew 2--4 human
//! trait 2 adjectives
//! hometown 1 cities ALLUNIQUE
//! GENEND
//! ```
//!
//! The opener names the group, how many entities to make and an optional
//! gender set. Each body line fills one field on every entity with a unique
//! sample from a list; `ALLUNIQUE` also keeps entities from sharing items.

use rand::seq::SliceRandom;
use tracing::debug;

use crate::core::error::{ErrorKind, ScriptError, Warning};
use crate::core::expr::store_error;
use crate::core::interpreter::{Interpreter, ProgramState};
use crate::core::params::Amount;
use crate::core::select::{sample_one, unique_sample};
use crate::core::store::Namespace;
use crate::schema::command::{Block, Line, Node};
use crate::schema::entity::Entity;
use crate::schema::gender::Pronouns;
use crate::schema::value::{Value, ValueRef};

impl Interpreter {
    pub(crate) fn generate(&mut self, mut state: ProgramState, block: &Block) -> Result<ProgramState, ScriptError> {
        let opener = &block.opener;
        let params = opener.param_words();
        if params.is_empty() || params.len() > 3 {
            return Err(ScriptError::parameter_count(
                opener,
                "a gen name, then an optional amount and gender set",
                params.len(),
            ));
        }
        let name = params[0].to_lowercase();
        if name.contains('.') {
            return Err(ScriptError::syntax(opener, "a gen name without a period").actual(name));
        }
        if state.store.group(&name).is_some() {
            state.warn(
                Warning::mild(format!(
                    "assigning variable {} - variable already exists. Data will be overwritten",
                    name
                ))
                .at(opener),
            );
        }

        let amount = match params.get(1) {
            None => 1,
            Some(text) => Amount::parse_count(text)
                .ok_or_else(|| ScriptError::syntax(opener, "a number or numeric range").actual(text.to_string()))?
                .resolve(&mut self.rng),
        };
        if amount == 0 {
            return Err(ScriptError::parameter_value(opener, "greater than zero", "0"));
        }

        let mut members = match params.get(2) {
            None => vec![Entity::new(); amount],
            Some(set) => self.gendered_entities(&state, opener, &set.to_lowercase(), amount)?,
        };

        for node in &block.body {
            let line = match node {
                Node::Line(line) => line,
                Node::Block(inner) => {
                    return Err(ScriptError::new(
                        ErrorKind::NestedBlock,
                        &inner.opener,
                        "you cannot have nested structures in this location",
                    )
                    .in_command("GEN"));
                }
            };
            state.current = Some(line.clone());
            self.fill_field(&mut state, &mut members, line)?;
        }

        debug!(group = %name, members = members.len(), "generated entities");
        state
            .store
            .assign(&name, Value::Group(members))
            .map_err(|e| store_error(opener, &name, e))?;
        if let Some(group) = state.store.group_mut(&name) {
            group.set_pointer(0);
        }
        Ok(state)
    }

    /// One entity per slot, each with a gender drawn from `set`, a name
    /// unique within the block and that gender's pronoun forms.
    fn gendered_entities(
        &mut self,
        state: &ProgramState,
        opener: &Line,
        set: &str,
        amount: usize,
    ) -> Result<Vec<Entity>, ScriptError> {
        let undefined = || {
            ScriptError::new(
                ErrorKind::UnknownGender,
                opener,
                format!("desired gender {} is not defined", set),
            )
        };
        let genders = state.genders.set(set).ok_or_else(undefined)?;

        let mut used_names: Vec<String> = Vec::with_capacity(amount);
        let mut members = Vec::with_capacity(amount);
        for _ in 0..amount {
            let profile = genders
                .choose(&mut self.rng)
                .and_then(|gender| state.genders.profile(gender))
                .ok_or_else(undefined)?;
            let mut entity = Entity::new();
            let name = sample_one(&profile.names, &used_names, &mut self.rng);
            entity.set_field("name", name.iter().cloned().collect());
            used_names.extend(name);
            for field in Pronouns::FIELDS {
                if let Some(forms) = profile.pronouns.field(field) {
                    entity.set_field(field, forms.clone());
                }
            }
            members.push(entity);
        }
        Ok(members)
    }

    /// Apply one body line: `field count source [ALLUNIQUE]`.
    fn fill_field(
        &mut self,
        state: &mut ProgramState,
        members: &mut [Entity],
        line: &Line,
    ) -> Result<(), ScriptError> {
        if line.is_blank() || line.is_comment() {
            return Ok(());
        }
        let words: Vec<&str> = line.text.split_whitespace().collect();
        if !(3..=4).contains(&words.len()) {
            return Err(ScriptError::parameter_count(line, "3 - 4 parameters", words.len()).in_command("GEN"));
        }
        let field = words[0].to_lowercase();
        if members.first().is_some_and(|m| m.has_field(&field)) {
            state.warn(
                Warning::mild(format!(
                    "assigning variable {} - variable already exists. Data will be overwritten",
                    field
                ))
                .at(line)
                .in_command("GEN"),
            );
        }

        let count = Amount::parse_count(words[1])
            .ok_or_else(|| {
                ScriptError::parameter_value(
                    line,
                    "a valid number or numeric range in second argument",
                    words[1].to_string(),
                )
                .in_command("GEN")
            })?
            .resolve(&mut self.rng);
        if count == 0 {
            return Err(ScriptError::parameter_value(line, "a non-zero number", "0").in_command("GEN"));
        }
        let all_unique = match words.get(3) {
            None => false,
            Some(flag) if flag.eq_ignore_ascii_case("allunique") => true,
            Some(flag) => {
                return Err(ScriptError::parameter_value(line, "ALLUNIQUE", flag.to_string()).in_command("GEN"))
            }
        };

        let source_name = words[2].to_lowercase();
        let source = match state.store.lookup(&source_name, Namespace::All) {
            None => return Err(ScriptError::unknown_variable(line, &source_name).in_command("GEN")),
            Some(ValueRef::List(list)) => list,
            Some(other) => {
                return Err(
                    ScriptError::type_mismatch(line, &source_name, "list", other.kind().name()).in_command("GEN"),
                )
            }
        };

        let mut taken: Vec<String> = Vec::new();
        for member in members.iter_mut() {
            let picked = unique_sample(source, count, &taken, &mut self.rng);
            if all_unique {
                taken.extend(picked.iter().cloned());
            }
            member.set_field(field.clone(), picked);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interpreter::ProgramSeed;
    use crate::core::structure::parse_source;
    use crate::schema::value::Catalog;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn seed() -> ProgramSeed {
        ProgramSeed::new(
            Catalog::from_entries([
                ("color".to_string(), words(&["red", "green", "blue", "teal", "gold", "grey"])),
                ("city".to_string(), words(&["Ash", "Birch", "Cedar", "Dale"])),
            ]),
            Catalog::from_entries([("story".to_string(), words(&["_crew.name_ waved"]))]),
        )
    }

    fn run(source: &str) -> Result<ProgramState, ScriptError> {
        let program = parse_source(source)?;
        Interpreter::builder().seed(9).build().run(&seed(), &program)
    }

    #[test]
    fn gen_fills_fields_per_entity() {
        let state = run("GEN towns 3\nsister 2 city\nGENEND").unwrap();
        let group = state.store.group("towns").unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group.pointer(), Some(0));
        for town in group.members() {
            let sisters = town.field("sister").unwrap();
            assert_eq!(sisters.len(), 2);
            assert_ne!(sisters[0], sisters[1]);
        }
    }

    #[test]
    fn all_unique_spreads_items_across_entities() {
        let state = run("GEN towns 4\nname 1 city ALLUNIQUE\nGENEND").unwrap();
        let names: HashSet<String> = state
            .store
            .group("towns")
            .unwrap()
            .field_across("name")
            .into_iter()
            .collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn all_unique_runs_dry() {
        let state = run("GEN towns 3\nname 2 city allunique\nGENEND").unwrap();
        let group = state.store.group("towns").unwrap();
        assert_eq!(group.members()[0].field("name").map(|f| f.len()), Some(2));
        assert_eq!(group.members()[1].field("name").map(|f| f.len()), Some(2));
        assert_eq!(group.members()[2].field("name").map(|f| f.len()), Some(0));
    }

    #[test]
    fn gendered_entities_get_names_and_pronouns() {
        let state = run("GEN crew 5 female\nmood 1 color\nGENEND").unwrap();
        let group = state.store.group("crew").unwrap();
        let names: HashSet<String> = group.field_across("name").into_iter().collect();
        assert_eq!(names.len(), 5);
        for member in group.members() {
            assert_eq!(member.field("heshe"), Some(&words(&["she"])[..]));
            assert_eq!(member.field("isare"), Some(&words(&["is"])[..]));
            assert!(member.has_field("mood"));
        }
    }

    #[test]
    fn generated_names_reach_sentences() {
        let state = run("GEN crew 1 male\nGENEND\nFORMAT X\nWRITE story wfolder").unwrap();
        let name = state.store.group("crew").unwrap().members()[0].field("name").unwrap()[0].clone();
        assert_eq!(state.output, vec![format!("{} waved", name)]);
    }

    #[test]
    fn regenerating_warns_and_replaces() {
        let state = run("GEN a 2\nGENEND\nSHIFT a\nGEN a 3\nGENEND").unwrap();
        assert_eq!(state.warnings.len(), 1);
        let group = state.store.group("a").unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group.pointer(), Some(0));
    }

    #[test]
    fn duplicate_field_warns() {
        let state = run("GEN a 1\nc 1 color\nc 1 color\nGENEND").unwrap();
        assert_eq!(state.warnings.len(), 1);
    }

    #[test]
    fn opener_errors() {
        assert_eq!(run("GEN\nGENEND").unwrap_err().kind, ErrorKind::ParameterCount);
        assert_eq!(run("GEN a.b\nGENEND").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(run("GEN a lots\nGENEND").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(run("GEN a 0\nGENEND").unwrap_err().kind, ErrorKind::InvalidParameterValue);
        assert_eq!(run("GEN a 1 alien\nGENEND").unwrap_err().kind, ErrorKind::UnknownGender);
        assert_eq!(run("GEN color 1\nGENEND").unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn body_errors() {
        let err = run("GEN a 1\nc 1\nGENEND").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParameterCount);
        assert_eq!(err.command, "GEN");
        assert_eq!(err.line, 2);
        assert_eq!(run("GEN a 1\nc x color\nGENEND").unwrap_err().kind, ErrorKind::InvalidParameterValue);
        assert_eq!(run("GEN a 1\nc 0 color\nGENEND").unwrap_err().kind, ErrorKind::InvalidParameterValue);
        assert_eq!(run("GEN a 1\nc 1 color ONCE\nGENEND").unwrap_err().kind, ErrorKind::InvalidParameterValue);
        assert_eq!(run("GEN a 1\nc 1 ghost\nGENEND").unwrap_err().kind, ErrorKind::UnknownVariable);
        assert_eq!(run("GEN a 1\nc 1 wfolder\nGENEND").unwrap_err().kind, ErrorKind::TypeMismatch);
        assert_eq!(run("GEN a 1\nLOOP\nLOOPEND\nGENEND").unwrap_err().kind, ErrorKind::NestedBlock);
    }
}
