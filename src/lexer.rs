use crate::diagnostics::Diagnostic;

/// A token is an opaque slice of source text. String tokens keep their
/// surrounding quotes; the resolver strips them.
pub type Token = String;

/// Scan source text into tokens. `[`, `]`, and `;` always tokenize as
/// standalone tokens; a `"` opening a fresh token starts a string that runs
/// to the next unescaped `"`. An unterminated string does not fail the scan:
/// it is reported alongside whatever tokens were already produced, and the
/// partial token is dropped.
pub fn scan(source: &str) -> (Vec<Token>, Option<Diagnostic>) {
    let mut padded = String::with_capacity(source.len() + 1);
    for c in source.chars() {
        match c {
            '[' => padded.push_str(" [ "),
            ']' => padded.push_str(" ] "),
            ';' => padded.push_str(" ; "),
            _ => padded.push(c),
        }
    }
    padded.push(' ');

    let mut tokens = Vec::new();
    let mut tok = String::new();
    let mut in_string = false;
    let mut last = '\0';
    for c in padded.chars() {
        if in_string {
            tok.push(c);
            if c == '"' && last != '\\' {
                tokens.push(std::mem::take(&mut tok));
                in_string = false;
            }
            last = c;
        } else if is_whitespace(c) {
            if !tok.is_empty() {
                tokens.push(std::mem::take(&mut tok));
            }
        } else {
            if tok.is_empty() && c == '"' {
                in_string = true;
            }
            tok.push(c);
        }
    }

    let incomplete = (!tok.is_empty())
        .then(|| Diagnostic::lex(format!("Incomplete string token: '{tok}'")));
    (tokens, incomplete)
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r' | '\t' | '\u{c}')
}
