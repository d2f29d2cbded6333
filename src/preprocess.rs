use std::{iter::Peekable, str::Chars};

/// Stands in for a newline inside a string literal so a later line split
/// cannot break the literal apart.
const NEWLINE_PLACEHOLDER: &str = "!@#$";

/// Strip `(* … *)` block comments (nested to any depth) and `#` line
/// comments from library source. Comment markers inside string literals are
/// copied verbatim; a top-level `.` is padded so it always tokenizes as a
/// standalone terminator.
pub fn strip_comments(source: &str) -> String {
    let mut chars = source.chars().peekable();
    let mut result = String::from(" ");
    strip(&mut chars, &mut result, true, false);
    result
}

fn strip(chars: &mut Peekable<Chars<'_>>, result: &mut String, keep: bool, in_string: bool) {
    while let Some(c) = chars.next() {
        match c {
            '(' => {
                if in_string {
                    if keep {
                        result.push(c);
                    }
                } else if chars.peek() == Some(&'*') {
                    chars.next();
                    // Re-enter at every depth so nesting stays balanced.
                    strip(chars, result, false, false);
                }
                // A bare `(` outside a string is dropped.
            }
            '*' => {
                if !in_string && chars.peek() == Some(&')') {
                    chars.next();
                    return;
                }
                if keep {
                    result.push(c);
                }
            }
            '"' => {
                if keep {
                    result.push(c);
                }
                if in_string {
                    return;
                }
                strip(chars, result, keep, true);
            }
            '#' => {
                if in_string {
                    if keep {
                        result.push(c);
                    }
                } else {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
            }
            '\n' => {
                if in_string && keep {
                    result.push_str(NEWLINE_PLACEHOLDER);
                } else {
                    result.push(c);
                }
            }
            '.' => {
                if in_string {
                    if keep {
                        result.push(c);
                    }
                } else if keep {
                    result.push_str(" .");
                }
            }
            _ => {
                if keep {
                    result.push(c);
                }
            }
        }
    }
}

/// Comment-stripped source as trimmed, non-empty statement lines.
pub fn source_to_lines(source: &str) -> Vec<String> {
    strip_comments(source)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
