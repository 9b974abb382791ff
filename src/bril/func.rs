use super::instr::Code;
use super::types::{Argument, Position, Type};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub instrs: Vec<Code>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

impl Function {
    pub fn new(name: &str, instrs: Vec<Code>) -> Self {
        Self {
            name: name.to_string(),
            args: vec![],
            instrs,
            return_type: None,
            pos: None,
        }
    }

    /// Row of the function header. Parameters are considered defined here.
    pub fn header_row(&self) -> u32 {
        self.pos.map(|p| p.row).unwrap_or(0)
    }

    /// Source row of every instruction (labels skipped), in program order.
    ///
    /// Instructions without a position get the row they would occupy in the
    /// canonical text form: one line for the header, then one line per entry.
    pub fn instr_rows(&self) -> Vec<u32> {
        let header = self.header_row();

        self.instrs
            .iter()
            .enumerate()
            .filter_map(|(i, code)| match code {
                Code::Instruction(instr) => Some(
                    instr
                        .get_pos()
                        .map(|p| p.row)
                        .unwrap_or(header + 1 + i as u32),
                ),
                Code::Label(_) => None,
            })
            .collect()
    }
}

/// A whole program. One function is conventionally named `main`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }

    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
