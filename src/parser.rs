use std::collections::VecDeque;

use crate::{
    ast::AstNode,
    diagnostics::Diagnostic,
    dictionary::Dictionary,
    lexer::Token,
    value::{ListRef, new_list},
};

/// Legacy reserved words: once bound to host-side primitives, now rejected
/// at parse time.
const RESERVED: [&str; 3] = ["$", "append", "empty"];

/// Recursive-descent parse, consuming tokens destructively from the front.
/// `[` opens a nested quotation, `]` closes the current one. An unclosed
/// list at end of input returns whatever was accumulated, without a
/// diagnostic.
pub fn parse(
    dictionary: &Dictionary,
    tokens: &mut VecDeque<Token>,
    diagnostics: &mut Vec<Diagnostic>,
) -> ListRef {
    let mut ast = Vec::new();
    while let Some(token) = tokens.pop_front() {
        match token.as_str() {
            "[" => ast.push(AstNode::List(parse(dictionary, tokens, diagnostics))),
            "]" => return new_list(ast),
            t if RESERVED.contains(&t) => {
                diagnostics.push(Diagnostic::parse(format!("Reserved word: '{t}'")));
            }
            _ => ast.push(dictionary.resolve(&token)),
        }
    }
    new_list(ast)
}
