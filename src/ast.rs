use std::rc::Rc;

use crate::{
    render,
    value::{CompiledWord, ListRef, Value},
};

/// A literal leaf: the display text it was parsed from and the value it
/// pushes. `map` rewrites both fields in place when it transforms a list.
#[derive(Clone)]
pub struct Literal {
    pub disp: String,
    pub val: Value,
}

impl Literal {
    pub fn of(val: Value) -> Self {
        Self {
            disp: render::print_value(&val),
            val,
        }
    }
}

#[derive(Clone)]
pub enum AstNode {
    Literal(Literal),
    List(ListRef),
    Word(CompiledWord),
    /// Lazy error placeholder: resolution is retried at execution time and
    /// only then diagnosed.
    Undefined(String),
}

impl AstNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNode::Literal(_) => "literal",
            AstNode::List(_) => "list",
            AstNode::Word(word) => word.kind_name(),
            AstNode::Undefined(_) => "error",
        }
    }

    pub fn disp(&self) -> String {
        match self {
            AstNode::Literal(literal) => literal.disp.clone(),
            AstNode::List(list) => format!("[ {}] ", render::print_list(list)),
            AstNode::Word(word) => word.name.clone(),
            AstNode::Undefined(token) => token.clone(),
        }
    }

    /// The stack value this node denotes, if it denotes one.
    pub fn value(&self) -> Option<Value> {
        match self {
            AstNode::Literal(literal) => Some(literal.val.clone()),
            AstNode::List(list) => Some(Value::Quotation(Rc::clone(list))),
            AstNode::Word(word) => Some(Value::Word(word.clone())),
            AstNode::Undefined(_) => None,
        }
    }
}

impl PartialEq for AstNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AstNode::Literal(a), AstNode::Literal(b)) => a.val == b.val,
            (AstNode::List(a), AstNode::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (AstNode::Word(a), AstNode::Word(b)) => a == b,
            (AstNode::Undefined(a), AstNode::Undefined(b)) => a == b,
            _ => false,
        }
    }
}
