use std::{cell::RefCell, fmt, rc::Rc};

use crate::{ast::AstNode, diagnostics::Diagnostic, render, runtime::Interpreter};

/// Shared handle to a quotation body. Quotations travel by reference and may
/// be mutated in place by `map`/`cons`/`snoc`/`concat`.
pub type ListRef = Rc<RefCell<Vec<AstNode>>>;

pub fn new_list(nodes: Vec<AstNode>) -> ListRef {
    Rc::new(RefCell::new(nodes))
}

/// A primitive implementation. Receives the popped arguments (first declared
/// parameter bound to the deepest popped value) and returns the values to
/// push plus any diagnostics, which the VM loop composes into the stack and
/// the errors register.
pub type PrimitiveFn = fn(&mut Interpreter, &[Value]) -> WordOutput;

/// A stack element.
#[derive(Clone)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Quotation(ListRef),
    Word(CompiledWord),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Quotation(_) => "list",
            Value::Word(_) => "word",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Quotation(_) | Value::Word(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Quotation(a), Value::Quotation(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Word(a), Value::Word(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render::print_value(self))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::Word(word) => write!(f, "<{} {}>", word.kind_name(), word.name),
            other => write!(f, "{}", render::print_value(other)),
        }
    }
}

/// A runnable dictionary entry: a built-in with explicit arity metadata, or
/// a user/library word compiled from a quotation.
#[derive(Clone)]
pub enum WordBody {
    Primitive { arity: usize, func: PrimitiveFn },
    Secondary { body: ListRef },
}

#[derive(Clone)]
pub struct CompiledWord {
    pub name: String,
    pub body: WordBody,
}

impl CompiledWord {
    pub fn primitive(name: impl Into<String>, arity: usize, func: PrimitiveFn) -> Self {
        Self {
            name: name.into(),
            body: WordBody::Primitive { arity, func },
        }
    }

    pub fn secondary(name: impl Into<String>, body: ListRef) -> Self {
        Self {
            name: name.into(),
            body: WordBody::Secondary { body },
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.body, WordBody::Primitive { .. })
    }

    pub fn is_secondary(&self) -> bool {
        matches!(self.body, WordBody::Secondary { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self.body {
            WordBody::Primitive { .. } => "primitive",
            WordBody::Secondary { .. } => "secondary",
        }
    }
}

impl PartialEq for CompiledWord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.is_primitive() == other.is_primitive()
    }
}

/// The outcome of one primitive invocation: values pushed left to right (so
/// the last one ends on top) and diagnostics appended to the errors register.
#[derive(Default)]
pub struct WordOutput {
    pub values: Vec<Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl WordOutput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn push(value: Value) -> Self {
        Self {
            values: vec![value],
            diagnostics: Vec::new(),
        }
    }

    pub fn many(values: Vec<Value>) -> Self {
        Self {
            values,
            diagnostics: Vec::new(),
        }
    }

    pub fn error(diagnostic: Diagnostic) -> Self {
        Self {
            values: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }

    /// An error recovered with a best-effort substitute value.
    pub fn recovered(value: Value, diagnostic: Diagnostic) -> Self {
        Self {
            values: vec![value],
            diagnostics: vec![diagnostic],
        }
    }
}
