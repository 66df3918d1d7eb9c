/// Implemented by anything which has a canonical LaTeX form.
pub trait Serializable {
    /// Appends the canonical LaTeX for this item to `out`.
    fn write_latex(&self, out: &mut String);

    /// Returns the canonical LaTeX for this item.
    fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_latex(&mut out);
        out
    }
}

/// Implemented by types which can be rebuilt from LaTeX. Deserializing is infallible - text which
/// does not form a recognised construct is kept as literal text.
pub trait Deserializable where Self: Sized {
    fn deserialize(latex: &str) -> Self;
}
