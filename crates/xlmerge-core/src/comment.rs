//! Cell comments (notes)

/// A comment attached to a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellComment {
    /// Author name (may be empty)
    pub author: String,
    /// Comment text
    pub text: String,
    /// Whether the comment box is shown without hovering
    pub visible: bool,
}

impl CellComment {
    /// Create a comment with an author and text
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            visible: false,
        }
    }

    /// Create an authorless comment
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            author: String::new(),
            text: text.into(),
            visible: false,
        }
    }

    /// True when the author field is non-empty
    pub fn has_author(&self) -> bool {
        !self.author.is_empty()
    }
}

impl std::fmt::Display for CellComment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_author() {
            write!(f, "[{}]: {}", self.author, self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_author_when_present() {
        assert_eq!(CellComment::new("Ana", "check").to_string(), "[Ana]: check");
        assert_eq!(CellComment::text_only("check").to_string(), "check");
    }
}
