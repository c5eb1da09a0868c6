use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextAction {
    Uppercase,
    Reverse,
    Count,
    Words,
    Other(String),
}

impl TextAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "uppercase" => TextAction::Uppercase,
            "reverse" => TextAction::Reverse,
            "count" => TextAction::Count,
            "words" => TextAction::Words,
            other => TextAction::Other(other.to_string()),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            TextAction::Uppercase => text.to_uppercase(),
            TextAction::Reverse => text.chars().rev().collect(),
            TextAction::Count => format!("Tiene {} caracteres", text.chars().count()),
            // a run of spaces yields empty pieces, so "a  b" counts 3
            TextAction::Words => format!("Tiene {} palabras", text.split(' ').count()),
            TextAction::Other(_) => format!("Procesado: {}", text),
        }
    }
}

impl fmt::Display for TextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextAction::Uppercase => write!(f, "uppercase"),
            TextAction::Reverse => write!(f, "reverse"),
            TextAction::Count => write!(f, "count"),
            TextAction::Words => write!(f, "words"),
            TextAction::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Run the transform named by `action` over `text`.
pub fn apply(text: &str, action: &str) -> String {
    TextAction::parse(action).apply(text)
}
