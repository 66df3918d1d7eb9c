//! Canonical LaTeX output for the node tree.

use crate::serialize::{Deserializable, Serializable};

use super::tree::{Document, Node, NodeList, PLACEHOLDERS};

impl Serializable for Document {
    fn write_latex(&self, out: &mut String) {
        self.root.write_latex(out)
    }
}

impl Deserializable for Document {
    fn deserialize(latex: &str) -> Self {
        Document::parse(latex)
    }
}

impl Serializable for NodeList {
    fn write_latex(&self, out: &mut String) {
        for item in &self.items {
            item.write_latex(out);
        }
    }
}

impl Serializable for Node {
    fn write_latex(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Continuation { content, .. } =>
                out.extend(content.chars().filter(|c| !PLACEHOLDERS.contains(c))),

            Node::Fraction { numerator, denominator, .. } => {
                out.push_str("\\frac");
                write_group(numerator, out);
                write_group(denominator, out);
            }
            Node::Limit { subscript, expression, .. } => {
                out.push_str("\\lim_");
                write_group(subscript, out);
                out.push(' ');
                out.push_str(expression.serialize().trim());
            }
        }
    }
}

/// Writes a region as a brace group. Braces in the region's text which have no partner are
/// escaped, and a trailing lone backslash gets a space after it, so the group always ends where
/// it should when parsed again.
fn write_group(region: &NodeList, out: &mut String) {
    let content = region.serialize();
    let chars = content.trim().chars().collect::<Vec<_>>();

    let mut unmatched = vec![false; chars.len()];
    let mut open = vec![];
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => open.push(i),
            '}' => if open.pop().is_none() {
                unmatched[i] = true;
            },
            _ => {}
        }
    }
    for i in open {
        unmatched[i] = true;
    }

    out.push('{');
    for (&c, &lone) in chars.iter().zip(&unmatched) {
        if lone {
            out.push('\\');
        }
        out.push(c);
    }
    if escaped {
        out.push(' ');
    }
    out.push('}');
}
