use brief::{DiagnosticKind, Interpreter, Value, preprocess};

fn eval(source: &str) -> Interpreter {
    let mut interpreter = Interpreter::new();
    interpreter.execute(source);
    interpreter
}

fn top(interpreter: &Interpreter) -> Value {
    interpreter
        .stack()
        .last()
        .cloned()
        .expect("stack should not be empty")
}

fn top_number(interpreter: &Interpreter) -> f64 {
    match top(interpreter) {
        Value::Number(n) => n,
        other => panic!("expected number on top, found {other:?}"),
    }
}

fn top_text(interpreter: &Interpreter) -> String {
    match top(interpreter) {
        Value::Text(s) => s,
        other => panic!("expected string on top, found {other:?}"),
    }
}

fn top_bool(interpreter: &Interpreter) -> bool {
    match top(interpreter) {
        Value::Boolean(b) => b,
        other => panic!("expected boolean on top, found {other:?}"),
    }
}

fn error_messages(interpreter: &Interpreter) -> Vec<String> {
    interpreter
        .errors()
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect()
}

fn numbers(interpreter: &Interpreter) -> Vec<f64> {
    interpreter
        .stack()
        .iter()
        .map(|value| match value {
            Value::Number(n) => *n,
            other => panic!("expected numeric stack, found {other:?}"),
        })
        .collect()
}

#[test]
fn binds_second_operand_as_right_hand_side() {
    let interpreter = eval("10 4 -");
    assert_eq!(top_number(&interpreter), 6.0);
    assert!(interpreter.errors().is_empty());
}

#[test]
fn division_by_zero_recovers_with_zero() {
    let interpreter = eval("5 0 /");
    assert_eq!(
        error_messages(&interpreter),
        vec!["divisor for '/' must not be 0"]
    );
    assert_eq!(top_number(&interpreter), 0.0);
}

#[test]
fn stack_pops_in_reverse_push_order() {
    let mut interpreter = Interpreter::new();
    for n in 1..=5 {
        interpreter.push(Value::Number(f64::from(n)));
    }
    for n in (1..=5).rev() {
        assert_eq!(interpreter.pop(), Some(Value::Number(f64::from(n))));
    }
    assert!(interpreter.stack().is_empty());
    assert!(interpreter.errors().is_empty());
}

#[test]
fn dup_then_pop_leaves_original_value() {
    let interpreter = eval("7 dup pop");
    assert_eq!(numbers(&interpreter), vec![7.0]);
}

#[test]
fn stack_underflow_skips_the_primitive() {
    let interpreter = eval("+");
    assert_eq!(error_messages(&interpreter), vec!["Stack underflow!"]);
    assert!(interpreter.stack().is_empty());
}

#[test]
fn undefined_word_diagnoses_without_stack_effect() {
    let interpreter = eval("foo");
    assert_eq!(error_messages(&interpreter), vec!["Undefined word: 'foo'"]);
    assert_eq!(
        interpreter.errors()[0].kind,
        DiagnosticKind::Resolution
    );
    assert!(interpreter.stack().is_empty());
}

#[test]
fn define_and_invoke_in_a_single_execute() {
    let interpreter = eval(r#"[ dup * ] "square" define 5 square ."#);
    assert_eq!(interpreter.results(), ["25"]);
    assert_eq!(top_number(&interpreter), 25.0);
    assert!(interpreter.errors().is_empty());
}

#[test]
fn dot_records_result_and_keeps_the_value() {
    let interpreter = eval("1 2 . .");
    assert_eq!(interpreter.results(), ["2", "2"]);
    assert_eq!(numbers(&interpreter), vec![1.0, 2.0]);
}

#[test]
fn quotations_are_inert_until_applied() {
    let interpreter = eval("[ 1 2 + ]");
    assert_eq!(interpreter.stack().len(), 1);
    assert_eq!(interpreter.print(&top(&interpreter)), "1 2 + ");

    let interpreter = eval("[ 1 2 + ] apply");
    assert_eq!(top_number(&interpreter), 3.0);
}

#[test]
fn map_squares_a_list_in_order() {
    let interpreter = eval("[ 1 2 3 4 5 ] [ dup * ] map");
    assert_eq!(interpreter.print(&top(&interpreter)), "1 4 9 16 25 ");
}

#[test]
fn map_transforms_strings_per_character() {
    let interpreter = eval(r#""abc" [ 1 + ] map"#);
    assert_eq!(top_text(&interpreter), "bcd");
}

#[test]
fn filter_keeps_matching_elements() {
    let interpreter = eval("[ 1 2 3 4 5 6 ] [ 3 > ] filter");
    assert_eq!(interpreter.print(&top(&interpreter)), "4 5 6 ");
}

#[test]
fn fold_threads_an_accumulator() {
    let interpreter = eval("[ 1 2 3 ] 0 [ + ] fold");
    assert_eq!(top_number(&interpreter), 6.0);
}

#[test]
fn range_builds_an_inclusive_list() {
    let interpreter = eval("5 1 range [ dup * ] map");
    assert_eq!(interpreter.print(&top(&interpreter)), "1 4 9 16 25 ");
}

#[test]
fn print_parse_lex_round_trip_preserves_tokens() {
    let source = "[ 1 2 [ 3 ] ] dup + swap";
    let mut interpreter = Interpreter::new();
    let original = interpreter.lex(source);
    let ast = interpreter.parse(source);
    let printed = interpreter.print_ast(&ast);
    assert_eq!(interpreter.lex(&printed), original);
}

#[test]
fn reserved_words_are_parse_errors() {
    let interpreter = eval("1 $ 2");
    assert_eq!(error_messages(&interpreter), vec!["Reserved word: '$'"]);
    assert_eq!(interpreter.errors()[0].kind, DiagnosticKind::Parse);
    assert_eq!(numbers(&interpreter), vec![1.0, 2.0]);
}

#[test]
fn incomplete_string_token_reports_once_and_short_circuits() {
    let interpreter = eval(r#"1 2 "abc"#);
    let messages = error_messages(&interpreter);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Incomplete string token"));
    // The compile-stage lex saw the existing diagnostic and produced no
    // tokens, so nothing ran.
    assert!(interpreter.stack().is_empty());
}

#[test]
fn nan_is_a_numeric_literal_not_an_undefined_word() {
    let interpreter = eval("NaN ifinteger");
    assert!(!top_bool(&interpreter));
    assert!(interpreter.errors().is_empty());
}

#[test]
fn character_arithmetic_shifts_code_points() {
    let interpreter = eval(r#""a" 1 +"#);
    assert_eq!(top_text(&interpreter), "b");

    let interpreter = eval(r#""b" to-upper"#);
    assert_eq!(top_text(&interpreter), "B");

    let interpreter = eval(r#""Q" to-lower"#);
    assert_eq!(top_text(&interpreter), "q");
}

#[test]
fn string_cons_and_snoc() {
    let interpreter = eval(r#""b" "cd" cons"#);
    assert_eq!(top_text(&interpreter), "bcd");

    let mut interpreter = eval(r#""abc" snoc"#);
    assert_eq!(interpreter.pop(), Some(Value::Text("bc".into())));
    assert_eq!(interpreter.pop(), Some(Value::Text("a".into())));

    let interpreter = eval(r#""abc" first"#);
    assert_eq!(top_text(&interpreter), "a");

    let interpreter = eval(r#""abc" rest"#);
    assert_eq!(top_text(&interpreter), "bc");
}

#[test]
fn list_cons_prepends_a_literal() {
    let interpreter = eval("5 [ 1 2 ] cons");
    assert_eq!(interpreter.print(&top(&interpreter)), "5 1 2 ");

    let interpreter = eval("[ 2 3 ] 1 swons");
    assert_eq!(interpreter.print(&top(&interpreter)), "1 2 3 ");
}

#[test]
fn list_snoc_pops_the_head() {
    let mut interpreter = eval("[ 7 8 ] snoc");
    match interpreter.pop() {
        Some(Value::Quotation(_)) => {}
        other => panic!("expected quotation on top, found {other:?}"),
    }
    assert_eq!(interpreter.pop(), Some(Value::Number(7.0)));
}

#[test]
fn snoc_on_empty_input_diagnoses_and_returns_it_unchanged() {
    let interpreter = eval("[ ] snoc");
    assert_eq!(
        error_messages(&interpreter),
        vec!["argument for 'snoc' must be a non-empty list/quotation/string"]
    );
    assert_eq!(interpreter.stack().len(), 1);
}

#[test]
fn concat_joins_matching_kinds_only() {
    let interpreter = eval(r#""ab" "cd" concat"#);
    assert_eq!(top_text(&interpreter), "abcd");

    let interpreter = eval("[ 1 ] [ 2 ] concat");
    assert_eq!(interpreter.print(&top(&interpreter)), "1 2 ");

    let interpreter = eval(r#""a" [ 1 ] concat"#);
    assert_eq!(interpreter.errors().len(), 1);
    assert_eq!(top_text(&interpreter), "a");
}

#[test]
fn concat_of_an_aliased_list_terminates() {
    let interpreter = eval("[ 1 2 ] dup concat");
    assert_eq!(interpreter.print(&top(&interpreter)), "1 2 1 2 ");
}

#[test]
fn size_counts_characters_and_elements() {
    let interpreter = eval(r#""hello" size"#);
    assert_eq!(top_number(&interpreter), 5.0);

    let interpreter = eval("[ 1 2 3 ] size");
    assert_eq!(top_number(&interpreter), 3.0);
}

#[test]
fn ifte_selects_a_branch() {
    let interpreter = eval("[ true ] [ 1 ] [ 2 ] ifte");
    assert_eq!(top_number(&interpreter), 1.0);

    let interpreter = eval("[ false ] [ 1 ] [ 2 ] ifte");
    assert_eq!(top_number(&interpreter), 2.0);
}

#[test]
fn ifte_aborts_on_non_boolean_predicate() {
    let interpreter = eval("[ 5 ] [ 1 ] [ 2 ] ifte");
    assert_eq!(
        error_messages(&interpreter),
        vec!["predicate quotation does not evaluate to a boolean"]
    );
    assert!(interpreter.stack().is_empty());
}

#[test]
fn dip_runs_under_the_top_value() {
    let interpreter = eval("1 5 [ dup ] dip");
    assert_eq!(numbers(&interpreter), vec![1.0, 1.0, 5.0]);
}

#[test]
fn keep_restores_its_argument() {
    let interpreter = eval("5 [ dup * ] keep");
    assert_eq!(numbers(&interpreter), vec![25.0, 5.0]);
}

#[test]
fn cleave_applies_both_quotations_to_one_value() {
    let interpreter = eval("5 [ 1 + ] [ 2 + ] cleave");
    assert_eq!(numbers(&interpreter), vec![6.0, 7.0]);
}

#[test]
fn rolldown_rotates_the_top_three() {
    let interpreter = eval("1 2 3 rolldown");
    assert_eq!(numbers(&interpreter), vec![2.0, 3.0, 1.0]);
}

#[test]
fn when_and_unless_gate_on_their_predicates() {
    let interpreter = eval("[ true ] [ 7 ] when");
    assert_eq!(top_number(&interpreter), 7.0);

    let interpreter = eval("[ false ] [ 7 ] unless");
    assert_eq!(top_number(&interpreter), 7.0);
}

#[test]
fn neg_and_abs() {
    let interpreter = eval("3 neg");
    assert_eq!(top_number(&interpreter), -3.0);

    let interpreter = eval("3 neg abs");
    assert_eq!(top_number(&interpreter), 3.0);
}

#[test]
fn boolean_words_follow_truthiness() {
    let interpreter = eval("0 5 or");
    assert_eq!(top_number(&interpreter), 5.0);

    let interpreter = eval("1 2 and");
    assert_eq!(top_number(&interpreter), 2.0);

    let interpreter = eval("true false xor");
    assert!(top_bool(&interpreter));

    let interpreter = eval("true true xor");
    assert!(!top_bool(&interpreter));

    let interpreter = eval("5 not");
    assert!(!top_bool(&interpreter));
}

#[test]
fn comparisons_order_within_a_kind() {
    let interpreter = eval("2 3 <");
    assert!(top_bool(&interpreter));

    let interpreter = eval(r#""abc" "abd" <"#);
    assert!(top_bool(&interpreter));

    let interpreter = eval(r#"1 "a" <"#);
    assert_eq!(interpreter.errors().len(), 1);
    assert!(!top_bool(&interpreter));
}

#[test]
fn equality_is_structural() {
    let interpreter = eval("[ 1 2 ] [ 1 2 ] =");
    assert!(top_bool(&interpreter));

    let interpreter = eval(r#"1 "1" ="#);
    assert!(!top_bool(&interpreter));
    assert!(interpreter.errors().is_empty());
}

#[test]
fn type_predicates_inspect_the_tag() {
    assert!(top_bool(&eval("[ ] iflist")));
    assert!(top_bool(&eval("5 ifinteger")));
    assert!(!top_bool(&eval("5.5 ifinteger")));
    assert!(top_bool(&eval("5.5 iffloat")));
    assert!(top_bool(&eval(r#""s" ifstring"#)));
}

#[test]
fn putchars_appends_to_the_display_console() {
    let interpreter = eval(r#""hi" putchars"#);
    assert_eq!(interpreter.display_console(), ["hi"]);

    let interpreter = eval("5 putchars");
    assert_eq!(
        error_messages(&interpreter),
        vec!["string needed for 'putchars'"]
    );
}

#[test]
fn words_lists_primitives_sorted_by_name() {
    let interpreter = eval("words");
    let listing = interpreter.print(&top(&interpreter));
    assert!(listing.contains("define "));
    assert!(listing.contains("dup "));
    assert!(!listing.contains("abs "));
}

#[test]
fn defines_lists_secondaries_sorted_by_name() {
    let mut interpreter = Interpreter::new();
    interpreter.execute(r#"[ dup * ] "square" define"#);
    interpreter.execute("defines");
    let listing = interpreter.print(&top(&interpreter));
    assert!(listing.contains("square "));
    assert!(listing.contains("abs "));
    assert!(!listing.contains("dup "));
}

#[test]
fn defines_registry_captures_the_body_text() {
    let interpreter = eval(r#"[ dup * ] "square" define"#);
    assert_eq!(
        interpreter.defines().get("square").map(String::as_str),
        Some("dup *")
    );
}

#[test]
fn dictionary_and_stack_persist_across_executes() {
    let mut interpreter = Interpreter::new();
    interpreter.execute(r#"[ dup * ] "square" define"#);
    interpreter.execute("3 square");
    assert_eq!(top_number(&interpreter), 9.0);

    interpreter.execute("4");
    assert_eq!(numbers(&interpreter), vec![9.0, 4.0]);
}

#[test]
fn execute_clears_the_diagnostics_registers() {
    let mut interpreter = Interpreter::new();
    interpreter.execute("foo");
    assert_eq!(interpreter.errors().len(), 1);
    interpreter.execute("1 .");
    assert!(interpreter.errors().is_empty());
    assert_eq!(interpreter.results(), ["1"]);
}

#[test]
fn reset_clears_the_stack_but_nothing_else() {
    let mut interpreter = Interpreter::new();
    interpreter.execute(r#"[ dup * ] "square" define 2 foo"#);
    assert_eq!(interpreter.errors().len(), 1);

    interpreter.reset();
    assert!(interpreter.stack().is_empty());
    assert_eq!(interpreter.errors().len(), 1);

    interpreter.execute("3 square");
    assert_eq!(top_number(&interpreter), 9.0);
}

#[test]
fn later_define_overwrites_the_former_binding() {
    let mut interpreter = Interpreter::new();
    interpreter.execute(r#"[ 1 + ] "bump" define"#);
    interpreter.execute(r#"[ 2 + ] "bump" define"#);
    interpreter.execute("10 bump");
    assert_eq!(top_number(&interpreter), 12.0);
}

#[test]
fn recursive_definitions_hit_the_depth_cap() {
    let mut interpreter = Interpreter::with_max_depth(32);
    interpreter.execute(r#"[ self ] "self" define"#);
    interpreter.execute("self");
    let messages = error_messages(&interpreter);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("nesting deeper than 32"));
}

#[test]
fn render_escapes_markup_and_tags_node_kinds() {
    let mut interpreter = Interpreter::new();
    let ast = interpreter.parse(r#"[ 1 ] "<b>" dup mystery"#);
    let html = interpreter.render(&ast);
    assert!(html.contains("<span class='list'><span class='literal'>1</span></span>"));
    assert!(html.contains("<span class='literal'>&lt;b&gt;</span>"));
    assert!(html.contains("<span class='primitive'>dup</span>"));
    assert!(html.contains("<span class='error'>mystery</span>"));
}

#[test]
fn strip_comments_handles_nesting_strings_and_line_comments() {
    let mut interpreter = Interpreter::new();

    let stripped = preprocess::strip_comments("keep (* drop (* deeper *) more *) tail");
    assert_eq!(interpreter.lex(&stripped), ["keep", "tail"]);

    let stripped = preprocess::strip_comments("value # trailing note");
    assert_eq!(interpreter.lex(&stripped), ["value"]);

    let stripped = preprocess::strip_comments(r#""a (* kept *) #" putchars"#);
    assert_eq!(
        interpreter.lex(&stripped),
        [r#""a (* kept *) #""#, "putchars"]
    );
}

#[test]
fn source_to_lines_trims_and_drops_blanks() {
    let lines = preprocess::source_to_lines("3 4 *.\n\n(* note *)\n2 2 +.\n");
    assert_eq!(lines, ["3 4 * .", "2 2 + ."]);
}

#[test]
fn libra_blocks_register_their_definitions() {
    let mut interpreter = Interpreter::new();
    interpreter.load_library(
        r#"
(* arithmetic helpers *)
LIBRA
    sum == 0 [ + ] fold;   # fold into an accumulator
    prod == 1 [ * ] fold.
"#,
    );
    interpreter.execute("[ 1 2 3 4 ] sum .");
    assert_eq!(interpreter.results(), ["10"]);

    interpreter.execute("[ 1 2 3 4 ] prod .");
    assert_eq!(interpreter.results(), ["24"]);

    assert_eq!(
        interpreter.defines().get("sum").map(String::as_str),
        Some("0 [ + ] fold")
    );
}

#[test]
fn non_libra_sources_execute_line_by_line() {
    let mut interpreter = Interpreter::new();
    interpreter.load_library("3 4 * .\n# comment only\n2 2 + .\n");
    // Each line is a fresh top-level execute; the last one's results remain.
    assert_eq!(interpreter.results(), ["4"]);
    assert_eq!(numbers(&interpreter), vec![12.0, 4.0]);
}

#[test]
fn prepare_source_rejects_non_libra_input() {
    let mut interpreter = Interpreter::new();
    assert!(interpreter.prepare_source("1 2 +").is_empty());
}
