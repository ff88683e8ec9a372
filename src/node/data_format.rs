use std::fmt;

/// Kind of value a resource exchanges, as announced to the testbed in advertisements and as the
/// `rt` attribute in `/.well-known/core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Two-state value, e.g. `on`/`off`.
    Boolean,
    Number,
    Text,
    Unspecified,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Text => "text",
            Self::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
