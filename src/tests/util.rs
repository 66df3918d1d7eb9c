use crate::{error::HostError, sync::Host};

macro_rules! list {
    ($($x:expr),* $(,)?) => { crate::node::tree::NodeList { items: vec![ $($x),* ] } };
}

macro_rules! text {
    ($s:expr) => { crate::node::tree::Node::Text(String::from($s)) };
}

macro_rules! frac {
    ($id:literal, $n:expr, $d:expr $(,)?) => {
        crate::node::tree::Node::Fraction {
            id: crate::node::tree::NodeId($id),
            numerator: $n,
            denominator: $d,
        }
    };
}

macro_rules! limit {
    ($id:literal, $s:expr, $e:expr $(,)?) => {
        crate::node::tree::Node::Limit {
            id: crate::node::tree::NodeId($id),
            subscript: $s,
            expression: $e,
        }
    };
}

macro_rules! continuation {
    ($id:literal) => {
        crate::node::tree::Node::Continuation {
            id: crate::node::tree::NodeId($id),
            content: String::from("\u{00A0}"),
        }
    };
}

/// An in-memory host which records everything asked of it.
#[derive(Debug, Default)]
pub struct MockHost {
    pub text: String,
    pub writes: Vec<String>,
    pub inserts: Vec<String>,
    pub previews: Vec<String>,
    pub preview_errors: Vec<String>,
    pub fail_writes: bool,
    pub fail_previews: bool,
    pub no_editor: bool,
}

impl MockHost {
    pub fn with_text(text: &str) -> Self {
        Self { text: text.to_string(), ..Self::default() }
    }
}

impl Host for MockHost {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn replace_text(&mut self, text: &str) -> Result<(), HostError> {
        if self.fail_writes {
            return Err(HostError::Rejected("read-only".into()));
        }
        self.text = text.to_string();
        self.writes.push(text.to_string());
        Ok(())
    }

    fn insert_at_caret(&mut self, literal: &str) -> Result<(), HostError> {
        if self.no_editor {
            return Err(HostError::NoActiveEditor);
        }
        self.text.push_str(literal);
        self.inserts.push(literal.to_string());
        Ok(())
    }

    fn show_preview(&mut self, latex: &str) -> Result<(), HostError> {
        if self.fail_previews {
            return Err(HostError::Rejected("renderer unavailable".into()));
        }
        self.previews.push(latex.to_string());
        Ok(())
    }

    fn show_preview_error(&mut self, message: &str) {
        self.preview_errors.push(message.to_string());
    }
}
