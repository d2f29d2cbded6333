use std::{collections::VecDeque, rc::Rc};

use indexmap::IndexMap;

use crate::{
    ast::AstNode,
    diagnostics::Diagnostic,
    dictionary::Dictionary,
    lexer::{self, Token},
    parser, preprocess, render,
    value::{CompiledWord, ListRef, PrimitiveFn, Value, WordBody},
};

/// Default cap on quotation nesting. `Run` recurses through the host call
/// stack, so the limit has to live in the engine rather than the language.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Owns the single value stack. The logical top of the stack is the back of
/// the vector; all primitive argument passing is defined relative to it.
#[derive(Default)]
pub struct ExecutionContext {
    stack: Vec<Value>,
}

impl ExecutionContext {
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }
}

/// A runnable unit produced by `compile`. Executing it against the session
/// is the act of interpretation.
pub struct CompiledUnit {
    body: ListRef,
}

impl CompiledUnit {
    pub fn body(&self) -> &ListRef {
        &self.body
    }
}

/// One interpreter session: dictionary, stack, diagnostics registers, and
/// the `defines` source registry. Sessions are independent; callers may
/// construct as many as they need.
pub struct Interpreter {
    dictionary: Dictionary,
    context: ExecutionContext,
    errors: Vec<Diagnostic>,
    results: Vec<String>,
    display_console: Vec<String>,
    defines: IndexMap<String, String>,
    max_depth: usize,
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut interpreter = Self {
            dictionary: Dictionary::new(),
            context: ExecutionContext::default(),
            errors: Vec::new(),
            results: Vec::new(),
            display_console: Vec::new(),
            defines: IndexMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        };
        crate::stdlib::install(&mut interpreter);
        interpreter
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        let mut interpreter = Self::new();
        interpreter.max_depth = max_depth;
        interpreter
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // --- registration ---

    /// Register a built-in word. The declared arity becomes its fixed stack
    /// arity; it is not inferred from the implementation.
    pub fn primitive(&mut self, name: &str, arity: usize, func: PrimitiveFn) {
        self.dictionary
            .insert(CompiledWord::primitive(name, arity, func));
    }

    /// Bind a quotation as a secondary word. Rebinding a name overwrites the
    /// former binding silently.
    pub fn define(&mut self, quotation: ListRef, name: &str) {
        self.dictionary
            .insert(CompiledWord::secondary(name, quotation));
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// All bound word names, in binding order.
    pub fn words(&self) -> Vec<String> {
        self.dictionary.names()
    }

    // --- diagnostics registers ---

    pub fn push_error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn push_result(&mut self, result: impl Into<String>) {
        self.results.push(result.into());
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    pub fn concat_display_console(&mut self, text: impl Into<String>) {
        self.display_console.push(text.into());
    }

    pub fn display_console(&self) -> &[String] {
        &self.display_console
    }

    pub fn clear_display_console(&mut self) {
        self.display_console.clear();
    }

    /// Source text of every captured `define`, keyed by word name.
    pub fn defines(&self) -> &IndexMap<String, String> {
        &self.defines
    }

    // --- stack ---

    pub fn push(&mut self, value: Value) {
        self.context.stack.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        if self.context.stack.is_empty() {
            self.push_error(Diagnostic::runtime("Stack underflow!"));
        }
        self.context.stack.pop()
    }

    pub fn peek(&mut self) -> Option<Value> {
        if self.context.stack.is_empty() {
            self.push_error(Diagnostic::runtime("Stack underflow!"));
        }
        self.context.stack.last().cloned()
    }

    pub fn stack(&self) -> &[Value] {
        self.context.stack()
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Clears the stack only: dictionary and diagnostics registers survive.
    pub fn reset(&mut self) {
        self.context.stack.clear();
    }

    // --- pipeline ---

    /// Lex source into tokens. If the errors register is already non-empty
    /// the lexer yields no tokens, so one failure cannot compound into a
    /// cascade of follow-on diagnostics.
    pub fn lex(&mut self, source: &str) -> Vec<Token> {
        if !self.errors.is_empty() {
            return Vec::new();
        }
        let (tokens, incomplete) = lexer::scan(source);
        if let Some(diagnostic) = incomplete {
            self.errors.push(diagnostic);
        }
        tokens
    }

    /// Resolve a single token the way the parser would.
    pub fn word(&self, token: &str) -> AstNode {
        self.dictionary.resolve(token)
    }

    pub fn parse(&mut self, source: &str) -> ListRef {
        let mut tokens: VecDeque<Token> = self.lex(source).into();
        parser::parse(&self.dictionary, &mut tokens, &mut self.errors)
    }

    pub fn compile(&mut self, source: &str) -> CompiledUnit {
        CompiledUnit {
            body: self.parse(source),
        }
    }

    pub fn run_unit(&mut self, unit: &CompiledUnit) {
        self.run(&unit.body);
    }

    /// Execute a quotation against the shared context. This is how
    /// combinators invoke quoted code and the engine's sole recursion
    /// mechanism; depth is capped by the session's configured limit.
    pub fn run(&mut self, quotation: &ListRef) {
        if self.depth >= self.max_depth {
            self.push_error(Diagnostic::runtime(format!(
                "Quotation nesting deeper than {} levels",
                self.max_depth
            )));
            return;
        }
        self.depth += 1;
        // Snapshot the body: the running quotation may be mutated in place
        // by the very words it executes.
        let nodes: Vec<AstNode> = quotation.borrow().clone();
        for node in &nodes {
            self.execute_node(node);
        }
        self.depth -= 1;
    }

    pub(crate) fn run_value(&mut self, value: &Value) {
        match value {
            Value::Quotation(list) => {
                let list = Rc::clone(list);
                self.run(&list);
            }
            // A bare value is the program that pushes itself, so `ifte` and
            // friends accept an already-computed predicate as well as a
            // predicate quotation.
            other => self.push(other.clone()),
        }
    }

    /// Top-level entry point: clears the diagnostics registers, captures a
    /// trailing `define` into the registry, compiles, and runs. Dictionary
    /// and stack persist across calls.
    pub fn execute(&mut self, source: &str) {
        self.clear_errors();
        self.clear_results();
        self.clear_display_console();
        self.depth = 0;
        self.store_if_define(source);
        let unit = self.compile(source);
        self.run_unit(&unit);
    }

    pub fn print(&self, value: &Value) -> String {
        render::print_value(value)
    }

    pub fn print_ast(&self, ast: &ListRef) -> String {
        render::print_list(ast)
    }

    pub fn render(&self, ast: &ListRef) -> String {
        render::render(ast)
    }

    // --- library preprocessing ---

    /// Strip comments, lex, and segment a `LIBRA … .` block into its
    /// `;`-terminated statement groups. Returns no groups when the source is
    /// not a LIBRA block.
    pub fn prepare_source(&mut self, source: &str) -> Vec<Vec<Token>> {
        let stripped = preprocess::strip_comments(source);
        let mut tokens = self.lex(&stripped);
        let is_libra = tokens
            .first()
            .is_some_and(|t| t.eq_ignore_ascii_case("libra"))
            && tokens.last().is_some_and(|t| t == ".");
        if !is_libra {
            return Vec::new();
        }
        let last = tokens.len() - 1;
        tokens[last] = ";".to_string();
        tokens.remove(0);
        fill_groups(tokens)
    }

    /// Rewrite a `name == body… ;` statement group to a `define` and execute
    /// it. Anything else is skipped without comment, so a library may mix
    /// definitions with material this loader does not handle.
    pub fn define_statement(&mut self, tokens: &[Token]) {
        let len = tokens.len();
        if len < 4 {
            return;
        }
        if tokens[1] != "==" || tokens[len - 1] != ";" {
            return;
        }
        let body = tokens[2..len - 1].join(" ");
        let source = format!("[ {body} ] \"{}\" define", tokens[0]);
        self.execute(&source);
    }

    /// Load library source: a LIBRA block registers each well-formed
    /// definition; any other source is executed line by line after comment
    /// stripping.
    pub fn load_library(&mut self, source: &str) {
        let segments = self.prepare_source(source);
        if !segments.is_empty() {
            for segment in &segments {
                self.define_statement(segment);
            }
            return;
        }
        for line in preprocess::source_to_lines(source) {
            self.execute(&line);
        }
    }

    // --- internals ---

    fn execute_node(&mut self, node: &AstNode) {
        match node {
            AstNode::Word(word) => self.invoke(word.clone()),
            AstNode::List(list) => self.push(Value::Quotation(Rc::clone(list))),
            AstNode::Literal(literal) => self.push(literal.val.clone()),
            AstNode::Undefined(token) => {
                // The word may have been bound since parse time, e.g. by a
                // `define` earlier in the same source or by the word itself
                // for a recursive definition.
                match self.dictionary.get(token).cloned() {
                    Some(word) => self.invoke(word),
                    None => self.push_error(Diagnostic::resolution(format!(
                        "Undefined word: '{token}'"
                    ))),
                }
            }
        }
    }

    fn invoke(&mut self, word: CompiledWord) {
        match word.body {
            WordBody::Secondary { body } => self.run(&body),
            WordBody::Primitive { arity, func } => {
                if self.context.stack.len() < arity {
                    // Underflow skips the invocation entirely: the primitive
                    // never sees fabricated arguments and the stack is left
                    // as it was.
                    self.push_error(Diagnostic::runtime("Stack underflow!"));
                    return;
                }
                let split = self.context.stack.len() - arity;
                let args: Vec<Value> = self.context.stack.split_off(split);
                let output = func(self, &args);
                self.context.stack.extend(output.values);
                self.errors.extend(output.diagnostics);
            }
        }
    }

    /// The define-capture pre-scan: when a source's last token is `define`,
    /// remember the quotation body text under the defined name so the host
    /// can display non-primitive definitions.
    fn store_if_define(&mut self, source: &str) {
        let tokens = self.lex(source);
        let len = tokens.len();
        if len < 5 || tokens[len - 1] != "define" {
            return;
        }
        let body = tokens[1..len - 3].join(" ");
        let name = tokens[len - 2].replace('"', "");
        self.defines.insert(name, body);
    }
}

fn fill_groups(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for token in tokens {
        let terminator = token == ";";
        current.push(token);
        if terminator {
            groups.push(std::mem::take(&mut current));
        }
    }
    groups
}
