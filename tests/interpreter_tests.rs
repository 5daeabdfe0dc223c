/// Interpreter integration tests: whole programs from source to output.
use pretty_assertions::assert_eq;
use proseloop::core::store::Namespace;
use proseloop::schema::value::{Catalog, ValueRef};
use proseloop::{parse_source, ErrorKind, Interpreter, ProgramSeed, ProgramState, ScriptError};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn seed() -> ProgramSeed {
    ProgramSeed::new(
        Catalog::from_entries([
            ("noun".to_string(), strings(&["cat"])),
            ("verb".to_string(), strings(&["sat"])),
            ("object".to_string(), strings(&["lamp", "kettle", "map", "rope", "torch"])),
            ("place".to_string(), strings(&["Ashford", "Brill", "Corran", "Dunmore"])),
        ]),
        Catalog::from_entries([
            ("story".to_string(), strings(&["the _noun_ _verb_"])),
            ("intro".to_string(), strings(&["_crew.name_ came from _crew.home_"])),
        ]),
    )
}

fn run_with(seed_value: u64, source: &str) -> Result<ProgramState, ScriptError> {
    let program = parse_source(source)?;
    Interpreter::builder().seed(seed_value).build().run(&seed(), &program)
}

fn run(source: &str) -> Result<ProgramState, ScriptError> {
    run_with(42, source)
}

fn list<'a>(state: &'a ProgramState, name: &str) -> Option<&'a [String]> {
    state.store.lookup(name, Namespace::All).and_then(|v| v.as_list())
}

#[test]
fn list_union_deduplicates() {
    let state = run("ASSIGNLIST x = \"a\" + \"b\" + \"a\"").unwrap();
    assert_eq!(list(&state, "x"), Some(&strings(&["a", "b"])[..]));
}

#[test]
fn loop_writes_one_sentence_per_pass() {
    let state = run("LOOP 3\nWRITE story wfolder\nLOOPEND").unwrap();
    assert_eq!(state.output.len(), 3);
}

#[test]
fn format_cps_capitalises_and_punctuates() {
    let state = run("FORMAT CPS\nWRITE story wfolder").unwrap();
    assert_eq!(state.output, vec!["The cat sat. "]);
}

#[test]
fn unmatched_closer_names_its_line() {
    let err = run("FORMAT CPS\nWRITE story wfolder\nLOOPEND").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnmatchedCloser);
    assert_eq!(err.line, 3);
    assert_eq!(err.text, "LOOPEND");
}

#[test]
fn same_seed_same_story() {
    let source = "GEN crew 3 all\nhome 1 place ALLUNIQUE\nGENEND\n\
                  LOOP 2--5\nWRITE intro wfolder\nSHIFT crew\nLOOPEND";
    let first = run_with(99, source).unwrap();
    let second = run_with(99, source).unwrap();
    assert_eq!(first.output, second.output);
    assert!((2..=5).contains(&first.output.len()));
}

#[test]
fn shift_walks_the_crew() {
    let source = "GEN crew 3 robot\nhome 1 place ALLUNIQUE\nGENEND\n\
                  FORMAT X\nLOOP 3\nWRITE intro wfolder\nSHIFT crew\nLOOPEND";
    let state = run(source).unwrap();
    let group = state.store.group("crew").unwrap();
    let expected: Vec<String> = group
        .members()
        .iter()
        .map(|m| format!("{} came from {}", m.field("name").unwrap()[0], m.field("home").unwrap()[0]))
        .collect();
    assert_eq!(state.output, expected);
    assert_eq!(group.pointer(), Some(0));
}

#[test]
fn word_loop_inside_cycle_loop() {
    let state = run("LOOP 2\nLOOP 5W\nWRITE story wfolder\nLOOPEND\nNEWPARA\nLOOPEND").unwrap();
    // Each word loop writes two three-word sentences to pass five words.
    assert_eq!(state.output.len(), 6);
    assert_eq!(state.word_count(), 12);
}

#[test]
fn snippets_share_state_with_caller() {
    let source = "DESC tally\nASSIGNLIST seen = seen + \"x\"\nNEWLINE\nDESCEND\n\
                  ASSIGNLIST seen = \"start\"\nLOOP 3\nCALL tally\nLOOPEND";
    let state = run(source).unwrap();
    assert_eq!(state.output.len(), 3);
    assert_eq!(list(&state, "seen"), Some(&strings(&["start", "x"])[..]));
}

#[test]
fn recite_gathers_whole_group() {
    let source = "GEN crew 4\nkit 1 object ALLUNIQUE\nGENEND\nRECITE packed = crew.kit + \"a \" + all";
    let state = run(source).unwrap();
    let packed = list(&state, "packed").unwrap();
    assert_eq!(packed.len(), 1);
    assert_eq!(packed[0].matches("a ").count(), 4);
    assert_eq!(packed[0].matches(", ").count(), 2);
    assert!(packed[0].contains(" and a "));
}

#[test]
fn assign_gen_combines_groups() {
    let source = "GEN a 2 female\nGENEND\nGEN b 1 male\nGENEND\nASSIGNGEN both = a + b\nASSIGNGEN solo = both - a";
    let state = run(source).unwrap();
    assert_eq!(state.store.group("both").map(|g| g.len()), Some(3));
    let solo = state.store.group("solo").unwrap();
    assert_eq!(solo.len(), 1);
    assert_eq!(solo.pointer(), Some(0));
    assert_eq!(solo.members()[0].field("heshe"), Some(&strings(&["he"])[..]));
}

#[test]
fn refgender_changes_later_generation() {
    let source = "ASSIGNLIST names = \"Quill\"\nREFGENDER robot.names = names\nGEN bots 1 robot\nGENEND";
    let state = run(source).unwrap();
    let bot = &state.store.group("bots").unwrap().members()[0];
    assert_eq!(bot.field("name"), Some(&strings(&["Quill"])[..]));
}

#[test]
fn case_and_join_commands() {
    let source = "ASSIGNLIST a = \"red\" + \"blue\"\nASSIGNLIST b = \" fox\"\n\
                  WORDJOIN c = a + b\nUPCASE d = c\nSUPCASE e = a";
    let state = run(source).unwrap();
    assert_eq!(list(&state, "c"), Some(&strings(&["red fox", "blue fox"])[..]));
    assert_eq!(list(&state, "d"), Some(&strings(&["RED FOX", "BLUE FOX"])[..]));
    assert_eq!(list(&state, "e"), Some(&strings(&["Red", "Blue"])[..]));
}

#[test]
fn catalog_selection_shorthand() {
    let state = run("ASSIGNCATALOG pick = wfolder 2").unwrap();
    match state.store.lookup("pick", Namespace::All) {
        Some(ValueRef::Catalog(catalog)) => assert_eq!(catalog.len(), 2),
        other => panic!("expected a catalog, got {:?}", other),
    }
}

#[test]
fn errors_carry_command_context() {
    let err = run("NEWLINE\nLOOP 2\nWRITE story\nLOOPEND").unwrap_err();
    assert_eq!(err.kind, ErrorKind::ParameterCount);
    assert_eq!(err.command, "WRITE");
    assert_eq!(err.line, 3);
    let message = err.to_string();
    assert!(message.contains("Expected: 2 - 4 parameters"), "{}", message);
}

#[test]
fn warnings_do_not_stop_execution() {
    let state = run("ASSIGNLIST s = \"_missing_ waits\"\nWRITE s wfolder\nNEWLINE").unwrap();
    assert_eq!(state.output.len(), 2);
    assert_eq!(state.output[0], "SOMETHING waits. ");
    assert_eq!(state.warnings.len(), 1);
}
