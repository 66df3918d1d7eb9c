//! The quick-insert panel: a pair of plain text fields which splice `numerator/denominator`
//! straight into the host document at its caret.
//!
//! This path never touches the node tree, parser or serializer. It inserts a flat `a/b`, not a
//! `\frac`.

use tracing::debug;

use crate::{error::HostError, sync::Host};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PanelField {
    Numerator,
    Denominator,
}

/// Keys the panel responds to.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PanelKey {
    Tab,
    Enter,
    Backspace,
    Char(char),
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FractionPanel {
    pub numerator: String,
    pub denominator: String,
    pub focus: PanelField,
}

impl Default for FractionPanel {
    fn default() -> Self {
        Self { numerator: String::new(), denominator: String::new(), focus: PanelField::Numerator }
    }
}

impl FractionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text the panel would insert right now.
    pub fn literal(&self) -> String {
        format!("{}/{}", self.numerator, self.denominator)
    }

    /// Handles a key. Returns true if the panel submitted its contents to the host.
    pub fn handle(&mut self, key: PanelKey, host: &mut impl Host) -> Result<bool, HostError> {
        match key {
            PanelKey::Tab => {
                self.focus = match self.focus {
                    PanelField::Numerator => PanelField::Denominator,
                    PanelField::Denominator => PanelField::Numerator,
                };
            }
            PanelKey::Enter => {
                self.submit(host)?;
                return Ok(true);
            }
            PanelKey::Backspace => { self.field_mut().pop(); }
            PanelKey::Char(c) => self.field_mut().push(c),
        }
        Ok(false)
    }

    /// Inserts the current contents at the host's caret. The fields are cleared and the numerator
    /// refocused whether or not the host accepted the insertion.
    pub fn submit(&mut self, host: &mut impl Host) -> Result<(), HostError> {
        let literal = self.literal();
        let result = host.insert_at_caret(&literal);
        debug!(%literal, ok = result.is_ok(), "quick-insert fraction");

        self.clear();
        result
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            PanelField::Numerator => &mut self.numerator,
            PanelField::Denominator => &mut self.denominator,
        }
    }
}
