use serde::{Deserialize, Serialize};
use std::fmt;

/// A value type. `{"ptr": "int"}` in JSON, `ptr<int>` in text.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Bool,
    Float,
    Char,
    Ptr(Box<Type>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Float => write!(f, "float"),
            Type::Char => write!(f, "char"),
            Type::Ptr(inner) => write!(f, "ptr<{}>", inner),
        }
    }
}

/// The literal carried by a `const` instruction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Float(f64),
    Char(char),
}

/// Source position as emitted by `bril2json -p`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: Type,
}

impl Argument {
    pub fn new(name: &str, arg_type: Type) -> Self {
        Self {
            name: name.to_string(),
            arg_type,
        }
    }
}
