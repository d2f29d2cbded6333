use crate::{
    ast::AstNode,
    value::{ListRef, Value},
};

/// Plain textual rendering, used by the `.` primitive and diagnostics.
/// Numbers format the way the stack stores them: `25` rather than `25.0`.
pub fn print_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Text(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Quotation(list) => print_list(list),
        Value::Word(word) => word.name.clone(),
    }
}

/// Render a quotation body: leaves by display text, nested lists bracketed.
/// The outermost list carries no brackets of its own.
pub fn print_list(list: &ListRef) -> String {
    let mut output = String::new();
    for node in list.borrow().iter() {
        match node {
            AstNode::List(inner) => {
                output.push_str("[ ");
                output.push_str(&print_list(inner));
                output.push_str("] ");
            }
            node => {
                output.push_str(&node.disp());
                output.push(' ');
            }
        }
    }
    output
}

/// Markup rendering for the embedding host: one `<span>` per node, classed
/// by node kind, display text HTML-escaped.
pub fn render(list: &ListRef) -> String {
    let mut html = String::new();
    for node in list.borrow().iter() {
        match node {
            AstNode::List(inner) => {
                html.push_str("<span class='list'>");
                html.push_str(&render(inner));
                html.push_str("</span>");
            }
            node => {
                html.push_str(&format!(
                    "<span class='{}'>{}</span>",
                    node.kind_name(),
                    escape(&node.disp())
                ));
            }
        }
    }
    html
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
