use indexmap::IndexMap;

use crate::{
    ast::{AstNode, Literal},
    value::{CompiledWord, Value},
};

/// The word dictionary: name to compiled word. Later bindings of the same
/// name silently overwrite; entries are never pruned.
#[derive(Default)]
pub struct Dictionary {
    words: IndexMap<String, CompiledWord>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: CompiledWord) {
        self.words.insert(word.name.clone(), word);
    }

    pub fn get(&self, name: &str) -> Option<&CompiledWord> {
        self.words.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.words.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CompiledWord> {
        self.words.values()
    }

    /// Resolve a token: dictionary hit, then literal, then the lazy error
    /// placeholder. A quoted token becomes a string literal with the quotes
    /// stripped; anything that parses as a number (`NaN` included) becomes a
    /// numeric literal.
    pub fn resolve(&self, token: &str) -> AstNode {
        if let Some(word) = self.words.get(token) {
            return AstNode::Word(word.clone());
        }
        literal(token).unwrap_or_else(|| AstNode::Undefined(token.to_string()))
    }
}

fn literal(token: &str) -> Option<AstNode> {
    if token.len() > 1 && token.starts_with('"') && token.ends_with('"') {
        let text = &token[1..token.len() - 1];
        return Some(AstNode::Literal(Literal {
            disp: text.to_string(),
            val: Value::Text(text.to_string()),
        }));
    }
    token.parse::<f64>().ok().map(|n| {
        AstNode::Literal(Literal {
            disp: token.to_string(),
            val: Value::Number(n),
        })
    })
}
