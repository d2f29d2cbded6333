use std::rc::Rc;

use crate::{
    ast::{AstNode, Literal},
    diagnostics::Diagnostic,
    render,
    runtime::Interpreter,
    value::{CompiledWord, Value, WordOutput, new_list},
};

/// The combinator layer is loaded through the same `define` mechanism as
/// user code; only the kernel below is native. Definitions are ordered so
/// every word is bound before something else names it, since resolution
/// happens at parse time.
const BOOTSTRAP: &[&str] = &[
    r#"[ [ ] ifte ]                    "when"      define"#,
    r#"[ [ ] swap ifte ]               "unless"    define"#,
    r#"[ [ dup ] dip ]                 "dupd"      define"#,
    r#"[ [ swap ] dip ]                "swapd"     define"#,
    r#"[ swapd swap ]                  "rolldown"  define"#,
    r#"[ rolldown rolldown ]           "rollup"    define"#,
    r#"[ 0 swap - ]                    "neg"       define"#,
    r#"[ dup 0 < [ neg ] when ]        "abs"       define"#,
    r#"[ dupd dip ]                    "keep"      define"#,
    r#"[ [ true ] swap when ]          "apply"     define"#,
    r#"[ [ keep ] dip apply ]          "cleave"    define"#,
    r#"[ pop pop ]                     "pop2"      define"#,
    r#"[ pop pop pop ]                 "pop3"      define"#,
    r#"[ swap cons ]                   "swons"     define"#,
    r#"[ [ pop ] dip ]                 "popd"      define"#,
    r#"[ snoc pop ]                    "first"     define"#,
    r#"[ snoc swap pop ]               "rest"      define"#,
    r#"[ [ dup "a" >= ] [ 32 - ] [ ] ifte ] "to-upper" define"#,
    r#"[ [ dup "a" < ] [ 32 + ] [ ] ifte ]  "to-lower" define"#,
    r#"[ "Monday" "Tuesday" "Wednesday" "Thursday" "Friday" "Saturday" "Sunday" ] "weekdays" define"#,
];

pub fn install(interpreter: &mut Interpreter) {
    interpreter.primitive("define", 2, word_define);

    interpreter.primitive("pop", 1, stack_pop);
    interpreter.primitive(".", 1, stack_print_top);
    interpreter.primitive("dup", 1, stack_dup);
    interpreter.primitive("swap", 2, stack_swap);

    interpreter.primitive("putchars", 1, io_putchars);

    interpreter.primitive("dip", 2, combinator_dip);
    interpreter.primitive("ifte", 3, combinator_ifte);

    interpreter.primitive("+", 2, arithmetic_add);
    interpreter.primitive("-", 2, arithmetic_sub);
    interpreter.primitive("*", 2, arithmetic_mul);
    interpreter.primitive("/", 2, arithmetic_div);
    interpreter.primitive("rem", 2, arithmetic_rem);

    interpreter.primitive("=", 2, comparison_eq);
    interpreter.primitive("<", 2, comparison_lt);
    interpreter.primitive(">", 2, comparison_gt);
    interpreter.primitive("<=", 2, comparison_le);
    interpreter.primitive(">=", 2, comparison_ge);

    interpreter.primitive("not", 1, boolean_not);
    interpreter.primitive("and", 2, boolean_and);
    interpreter.primitive("or", 2, boolean_or);
    interpreter.primitive("xor", 2, boolean_xor);
    interpreter.primitive("true", 0, constant_true);
    interpreter.primitive("false", 0, constant_false);

    interpreter.primitive("iflist", 1, predicate_iflist);
    interpreter.primitive("ifinteger", 1, predicate_ifinteger);
    interpreter.primitive("iffloat", 1, predicate_iffloat);
    interpreter.primitive("ifstring", 1, predicate_ifstring);

    interpreter.primitive("size", 1, list_size);
    interpreter.primitive("cons", 2, list_cons);
    interpreter.primitive("snoc", 1, list_snoc);
    interpreter.primitive("concat", 2, list_concat);
    interpreter.primitive("range", 2, list_range);

    interpreter.primitive("map", 2, iterate_map);
    interpreter.primitive("filter", 2, iterate_filter);
    interpreter.primitive("fold", 3, iterate_fold);

    interpreter.primitive("words", 0, dictionary_words);
    interpreter.primitive("defines", 0, dictionary_defines);

    for source in BOOTSTRAP {
        interpreter.execute(source);
    }
}

fn word_define(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Quotation(body), Value::Text(name)) => {
            interp.define(Rc::clone(body), name);
            WordOutput::none()
        }
        _ => WordOutput::error(Diagnostic::runtime(
            "'define' expects a quotation followed by a name string",
        )),
    }
}

fn stack_pop(_: &mut Interpreter, _: &[Value]) -> WordOutput {
    WordOutput::none()
}

fn stack_print_top(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    interp.push_result(render::print_value(&args[0]));
    WordOutput::push(args[0].clone())
}

fn stack_dup(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::many(vec![args[0].clone(), args[0].clone()])
}

fn stack_swap(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::many(vec![args[1].clone(), args[0].clone()])
}

fn io_putchars(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    match &args[0] {
        Value::Text(s) => {
            interp.concat_display_console(s.clone());
            WordOutput::none()
        }
        _ => WordOutput::error(Diagnostic::runtime("string needed for 'putchars'")),
    }
}

fn combinator_dip(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    let restored = args[0].clone();
    if !matches!(args[1], Value::Quotation(_)) {
        return WordOutput::recovered(
            restored,
            Diagnostic::runtime("second argument of 'dip' must be a quotation"),
        );
    }
    interp.run_value(&args[1]);
    WordOutput::push(restored)
}

fn combinator_ifte(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    interp.run_value(&args[0]);
    match interp.pop() {
        Some(Value::Boolean(b)) => {
            interp.run_value(if b { &args[1] } else { &args[2] });
            WordOutput::none()
        }
        _ => WordOutput::error(Diagnostic::runtime(
            "predicate quotation does not evaluate to a boolean",
        )),
    }
}

fn char_shift(text: &str, delta: f64, negate: bool) -> Option<WordOutput> {
    let mut chars = text.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let delta = delta as i64;
    let code = c as i64 + if negate { -delta } else { delta };
    let shifted = u32::try_from(code).ok().and_then(char::from_u32);
    Some(match shifted {
        Some(c) => WordOutput::push(Value::Text(c.to_string())),
        None => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("character arithmetic left no valid character"),
        ),
    })
}

fn arithmetic_add(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    if let (Value::Text(s), Value::Number(n)) = (&args[0], &args[1]) {
        if let Some(output) = char_shift(s, *n, false) {
            return output;
        }
    }
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => WordOutput::push(Value::Number(y + x)),
        _ => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("operands for '+' must be numbers"),
        ),
    }
}

fn arithmetic_sub(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    if let (Value::Text(s), Value::Number(n)) = (&args[0], &args[1]) {
        if let Some(output) = char_shift(s, *n, true) {
            return output;
        }
    }
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => WordOutput::push(Value::Number(y - x)),
        _ => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("operands for '-' must be numbers"),
        ),
    }
}

fn arithmetic_mul(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => WordOutput::push(Value::Number(y * x)),
        _ => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("operands for '*' must be numbers"),
        ),
    }
}

fn arithmetic_div(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => {
            if *x == 0.0 {
                WordOutput::recovered(
                    Value::Number(0.0),
                    Diagnostic::runtime("divisor for '/' must not be 0"),
                )
            } else {
                WordOutput::push(Value::Number(y / x))
            }
        }
        _ => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("operands for '/' must be numbers"),
        ),
    }
}

fn arithmetic_rem(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => WordOutput::push(Value::Number(y % x)),
        _ => WordOutput::error(Diagnostic::runtime("operands for 'rem' must be numbers")),
    }
}

fn comparison_eq(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(args[0] == args[1]))
}

fn ordering(args: &[Value], name: &str, test: fn(std::cmp::Ordering) -> bool) -> WordOutput {
    let ord = match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => y.partial_cmp(x),
        (Value::Text(y), Value::Text(x)) => Some(y.cmp(x)),
        (Value::Boolean(y), Value::Boolean(x)) => Some(y.cmp(x)),
        _ => {
            return WordOutput::recovered(
                Value::Boolean(false),
                Diagnostic::runtime(format!(
                    "operands for '{name}' must share a comparable type"
                )),
            );
        }
    };
    // NaN comparisons are false, not diagnostics.
    WordOutput::push(Value::Boolean(ord.is_some_and(test)))
}

fn comparison_lt(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    ordering(args, "<", std::cmp::Ordering::is_lt)
}

fn comparison_gt(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    ordering(args, ">", std::cmp::Ordering::is_gt)
}

fn comparison_le(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    ordering(args, "<=", std::cmp::Ordering::is_le)
}

fn comparison_ge(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    ordering(args, ">=", std::cmp::Ordering::is_ge)
}

fn boolean_not(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(!args[0].is_truthy()))
}

fn boolean_and(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    let (y, x) = (&args[0], &args[1]);
    WordOutput::push(if y.is_truthy() { x.clone() } else { y.clone() })
}

fn boolean_or(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    let (y, x) = (&args[0], &args[1]);
    WordOutput::push(if y.is_truthy() { y.clone() } else { x.clone() })
}

fn boolean_xor(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    let (y, x) = (&args[0], &args[1]);
    let either = if y.is_truthy() { y } else { x };
    if !either.is_truthy() {
        WordOutput::push(either.clone())
    } else {
        WordOutput::push(Value::Boolean(!(y.is_truthy() && x.is_truthy())))
    }
}

fn constant_true(_: &mut Interpreter, _: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(true))
}

fn constant_false(_: &mut Interpreter, _: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(false))
}

fn predicate_iflist(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(matches!(args[0], Value::Quotation(_))))
}

fn predicate_ifinteger(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    let integral = matches!(&args[0], Value::Number(n) if n.fract() == 0.0);
    WordOutput::push(Value::Boolean(integral))
}

fn predicate_iffloat(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    let fractional = matches!(&args[0], Value::Number(n) if n.fract() != 0.0);
    WordOutput::push(Value::Boolean(fractional))
}

fn predicate_ifstring(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    WordOutput::push(Value::Boolean(matches!(args[0], Value::Text(_))))
}

fn list_size(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match &args[0] {
        Value::Text(s) => WordOutput::push(Value::Number(s.chars().count() as f64)),
        Value::Quotation(list) => WordOutput::push(Value::Number(list.borrow().len() as f64)),
        _ => WordOutput::recovered(
            Value::Number(0.0),
            Diagnostic::runtime("argument for 'size' must be a string or list/quotation"),
        ),
    }
}

fn list_cons(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    if let (Value::Text(c), Value::Text(rest)) = (&args[0], &args[1]) {
        if c.chars().count() == 1 {
            return WordOutput::push(Value::Text(format!("{c}{rest}")));
        }
    }
    match (&args[0], &args[1]) {
        (Value::Quotation(_), _) => WordOutput::recovered(
            args[1].clone(),
            Diagnostic::runtime(
                "arguments for 'cons' must be a literal followed by a list/quotation",
            ),
        ),
        (x, Value::Quotation(list)) => {
            let node = match x {
                Value::Word(word) => AstNode::Word(word.clone()),
                other => AstNode::Literal(Literal::of(other.clone())),
            };
            list.borrow_mut().insert(0, node);
            WordOutput::push(args[1].clone())
        }
        _ => WordOutput::recovered(
            args[1].clone(),
            Diagnostic::runtime(
                "arguments for 'cons' must be a literal followed by a list/quotation",
            ),
        ),
    }
}

fn list_snoc(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    match &args[0] {
        Value::Text(s) if !s.is_empty() => {
            let mut chars = s.chars();
            if let Some(first) = chars.next() {
                interp.push(Value::Text(first.to_string()));
            }
            WordOutput::push(Value::Text(chars.as_str().to_string()))
        }
        Value::Quotation(list) if !list.borrow().is_empty() => {
            let node = list.borrow_mut().remove(0);
            if let Some(value) = node.value() {
                interp.push(value);
            }
            WordOutput::push(args[0].clone())
        }
        _ => WordOutput::recovered(
            args[0].clone(),
            Diagnostic::runtime("argument for 'snoc' must be a non-empty list/quotation/string"),
        ),
    }
}

fn list_concat(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Text(a), Value::Text(b)) => WordOutput::push(Value::Text(format!("{a}{b}"))),
        (Value::Quotation(a), Value::Quotation(b)) => {
            // Snapshot first: the right operand may alias the left.
            let appended: Vec<AstNode> = b.borrow().clone();
            a.borrow_mut().extend(appended);
            WordOutput::push(args[0].clone())
        }
        _ => WordOutput::recovered(
            args[0].clone(),
            Diagnostic::runtime(
                "arguments for 'concat' must both be strings or both lists/quotations",
            ),
        ),
    }
}

fn list_range(_: &mut Interpreter, args: &[Value]) -> WordOutput {
    match (&args[0], &args[1]) {
        (Value::Number(y), Value::Number(x)) => {
            let mut nodes = Vec::new();
            let mut i = *x;
            while i <= *y {
                nodes.push(AstNode::Literal(Literal::of(Value::Number(i))));
                i += 1.0;
            }
            WordOutput::push(Value::Quotation(new_list(nodes)))
        }
        _ => WordOutput::recovered(
            Value::Quotation(new_list(Vec::new())),
            Diagnostic::runtime("operands for 'range' must be numbers"),
        ),
    }
}

fn iterate_map(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    let quote = args[1].clone();
    match &args[0] {
        Value::Text(s) => {
            let mut out = String::new();
            for c in s.chars() {
                interp.push(Value::Text(c.to_string()));
                interp.run_value(&quote);
                if let Some(result) = interp.pop() {
                    out.push_str(&render::print_value(&result));
                }
            }
            WordOutput::push(Value::Text(out))
        }
        Value::Quotation(list) => {
            let mut i = 0;
            loop {
                // Short borrows only: the quotation may alias the list being
                // mapped, so no borrow is held while it runs.
                let element = {
                    let nodes = list.borrow();
                    match nodes.get(i) {
                        Some(node) => node.value(),
                        None => break,
                    }
                };
                if let Some(value) = element {
                    interp.push(value);
                }
                interp.run_value(&quote);
                if let Some(result) = interp.pop() {
                    let mut nodes = list.borrow_mut();
                    if i < nodes.len() {
                        nodes[i] = AstNode::Literal(Literal::of(result));
                    }
                }
                i += 1;
            }
            WordOutput::push(args[0].clone())
        }
        _ => WordOutput::error(Diagnostic::runtime(
            "first argument of 'map' must be a string or list/quotation",
        )),
    }
}

fn iterate_filter(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    let quote = args[1].clone();
    match &args[0] {
        Value::Text(s) => {
            let mut kept = String::new();
            for c in s.chars() {
                interp.push(Value::Text(c.to_string()));
                interp.run_value(&quote);
                if interp.pop().is_some_and(|v| v.is_truthy()) {
                    kept.push(c);
                }
            }
            WordOutput::push(Value::Text(kept))
        }
        Value::Quotation(list) => {
            let mut kept = Vec::new();
            let mut i = 0;
            loop {
                let (element, node) = {
                    let nodes = list.borrow();
                    match nodes.get(i) {
                        Some(node) => (node.value(), node.clone()),
                        None => break,
                    }
                };
                if let Some(value) = element {
                    interp.push(value);
                }
                interp.run_value(&quote);
                if interp.pop().is_some_and(|v| v.is_truthy()) {
                    kept.push(node);
                }
                i += 1;
            }
            WordOutput::push(Value::Quotation(new_list(kept)))
        }
        _ => WordOutput::error(Diagnostic::runtime(
            "first argument of 'filter' must be a string or list/quotation",
        )),
    }
}

fn iterate_fold(interp: &mut Interpreter, args: &[Value]) -> WordOutput {
    let quote = args[2].clone();
    let mut accumulator = args[1].clone();
    match &args[0] {
        Value::Text(s) => {
            for c in s.chars() {
                interp.push(accumulator.clone());
                interp.push(Value::Text(c.to_string()));
                interp.run_value(&quote);
                if let Some(result) = interp.pop() {
                    accumulator = result;
                }
            }
            WordOutput::push(accumulator)
        }
        Value::Quotation(list) => {
            let mut i = 0;
            loop {
                let element = {
                    let nodes = list.borrow();
                    match nodes.get(i) {
                        Some(node) => node.value(),
                        None => break,
                    }
                };
                interp.push(accumulator.clone());
                if let Some(value) = element {
                    interp.push(value);
                }
                interp.run_value(&quote);
                if let Some(result) = interp.pop() {
                    accumulator = result;
                }
                i += 1;
            }
            WordOutput::push(accumulator)
        }
        _ => WordOutput::error(Diagnostic::runtime(
            "first argument of 'fold' must be a string or list/quotation",
        )),
    }
}

fn sorted_entries(interp: &Interpreter, keep: fn(&CompiledWord) -> bool) -> WordOutput {
    let mut words: Vec<CompiledWord> = interp
        .dictionary()
        .entries()
        .filter(|word| keep(word))
        .cloned()
        .collect();
    words.sort_by(|a, b| a.name.cmp(&b.name));
    let nodes = words.into_iter().map(AstNode::Word).collect();
    WordOutput::push(Value::Quotation(new_list(nodes)))
}

fn dictionary_words(interp: &mut Interpreter, _: &[Value]) -> WordOutput {
    sorted_entries(interp, CompiledWord::is_primitive)
}

fn dictionary_defines(interp: &mut Interpreter, _: &[Value]) -> WordOutput {
    sorted_entries(interp, CompiledWord::is_secondary)
}
