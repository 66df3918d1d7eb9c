//! Converts LaTeX source into a node tree.
//!
//! Only two constructs are recognised: `\frac{A}{B}` and `\lim_{S} E`, where `E` runs to the end
//! of the line. Everything else is kept as literal text. The parser never fails - anything which
//! looks like the start of a construct but doesn't complete is just more text.

use super::tree::{IdAllocator, Node, NodeList, PLACEHOLDERS};

const FRACTION_HEAD: &str = "\\frac{";
const LIMIT_HEAD: &str = "\\lim_{";

/// Parses one flat string into a [NodeList]. Used directly for the document root, and recursively
/// for the contents of every construct's groups.
pub struct Parser<'a> {
    chars: Vec<char>,
    index: usize,
    ids: &'a mut IdAllocator,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, ids: &'a mut IdAllocator) -> Self {
        Parser { chars: source.chars().collect(), index: 0, ids }
    }

    pub fn parse(mut self) -> NodeList {
        let mut items = vec![];
        let mut text = String::new();

        while !self.eoi() {
            let start = self.index;
            if let Some(node) = self.parse_construct() {
                flush_text(&mut text, &mut items);
                items.push(node);
            } else {
                // Not a construct after all, so rewind and take just one literal character
                self.index = start;
                text.push(self.chars[self.index]);
                self.advance();
            }
        }

        flush_text(&mut text, &mut items);
        NodeList { items }
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn eoi(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// If the input at the current position starts with `s`, consumes it and returns true.
    fn eat(&mut self, s: &str) -> bool {
        let len = s.chars().count();
        let matches = self.chars.len() >= self.index + len
            && s.chars().zip(&self.chars[self.index..]).all(|(a, b)| a == *b);

        if matches {
            self.index += len;
        }
        matches
    }

    fn parse_construct(&mut self) -> Option<Node> {
        if self.eat(FRACTION_HEAD) {
            let numerator = self.group()?;
            if !self.eat("{") {
                return None;
            }
            let denominator = self.group()?;

            // Allocate before descending, so identities follow document order
            let id = self.ids.allocate();
            Some(Node::Fraction {
                id,
                numerator: self.parse_nested(&numerator),
                denominator: self.parse_nested(&denominator),
            })
        } else if self.eat(LIMIT_HEAD) {
            let subscript = self.group()?;
            while matches!(self.current(), Some(' ' | '\t')) {
                self.advance();
            }
            let expression = self.rest_of_line();

            let id = self.ids.allocate();
            Some(Node::Limit {
                id,
                subscript: self.parse_nested(&subscript),
                expression: self.parse_nested(&expression),
            })
        } else {
            None
        }
    }

    fn parse_nested(&mut self, source: &str) -> NodeList {
        Parser::new(source.trim(), &mut *self.ids).parse()
    }

    /// Collects the contents of a brace group whose opening brace has already been consumed, and
    /// consumes the closing brace. Returns `None` if the group is never closed.
    ///
    /// Backslash escapes (`\{`, `\}`, `\\`) are copied through without affecting depth.
    fn group(&mut self) -> Option<String> {
        let mut depth = 0usize;
        let mut contents = String::new();

        loop {
            let c = self.current()?;
            self.advance();

            match c {
                '\\' => {
                    contents.push(c);
                    if let Some(escaped) = self.current() {
                        contents.push(escaped);
                        self.advance();
                    }
                }
                '{' => {
                    depth += 1;
                    contents.push(c);
                }
                '}' if depth == 0 => return Some(contents),
                '}' => {
                    depth -= 1;
                    contents.push(c);
                }
                _ => contents.push(c),
            }
        }
    }

    /// Consumes everything up to (but not including) the next line break.
    fn rest_of_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.current() {
            if c == '\n' || c == '\r' {
                break;
            }
            line.push(c);
            self.advance();
        }
        line
    }
}

/// Moves any collected literal text into `items` as a text run, dropping caret anchors.
fn flush_text(text: &mut String, items: &mut Vec<Node>) {
    let run = strip_placeholder(text);
    if !run.is_empty() {
        items.push(Node::Text(run.to_string()));
    }
    text.clear();
}

/// Strips at most one placeholder character from each end of `s`.
pub fn strip_placeholder(s: &str) -> &str {
    let s = s.strip_prefix(&PLACEHOLDERS[..]).unwrap_or(s);
    s.strip_suffix(&PLACEHOLDERS[..]).unwrap_or(s)
}

/// Returns true if every brace in `s` is matched and `s` doesn't end in a lone backslash, so that
/// it could sit inside a group without changing where the group ends.
pub fn is_balanced(s: &str) -> bool {
    let mut depth = 0usize;
    let mut escaped = false;

    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }

    depth == 0 && !escaped
}
