use super::types::{Literal, Position, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstOp {
    #[serde(rename = "const")]
    Const,
}

/// Opcodes of operations that write a destination.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueOpcode {
    Add,
    Mul,
    Sub,
    Div,
    Id,
    Nop,
    Eq,
    Lt,
    Gt,
    Ge,
    Le,
    Not,
    And,
    Or,
    Call,
    Load,
    PtrAdd,
    Alloc,
    Fadd,
    Fmul,
    Fsub,
    Fdiv,
    Feq,
    Flt,
    Fle,
    Fgt,
    Fge,
    Ceq,
    Clt,
    Cle,
    Cgt,
    Cge,
    Char2Int,
    Int2Char,
    Phi,
}

impl ValueOpcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueOpcode::Add => "add",
            ValueOpcode::Mul => "mul",
            ValueOpcode::Sub => "sub",
            ValueOpcode::Div => "div",
            ValueOpcode::Id => "id",
            ValueOpcode::Nop => "nop",
            ValueOpcode::Eq => "eq",
            ValueOpcode::Lt => "lt",
            ValueOpcode::Gt => "gt",
            ValueOpcode::Ge => "ge",
            ValueOpcode::Le => "le",
            ValueOpcode::Not => "not",
            ValueOpcode::And => "and",
            ValueOpcode::Or => "or",
            ValueOpcode::Call => "call",
            ValueOpcode::Load => "load",
            ValueOpcode::PtrAdd => "ptradd",
            ValueOpcode::Alloc => "alloc",
            ValueOpcode::Fadd => "fadd",
            ValueOpcode::Fmul => "fmul",
            ValueOpcode::Fsub => "fsub",
            ValueOpcode::Fdiv => "fdiv",
            ValueOpcode::Feq => "feq",
            ValueOpcode::Flt => "flt",
            ValueOpcode::Fle => "fle",
            ValueOpcode::Fgt => "fgt",
            ValueOpcode::Fge => "fge",
            ValueOpcode::Ceq => "ceq",
            ValueOpcode::Clt => "clt",
            ValueOpcode::Cle => "cle",
            ValueOpcode::Cgt => "cgt",
            ValueOpcode::Cge => "cge",
            ValueOpcode::Char2Int => "char2int",
            ValueOpcode::Int2Char => "int2char",
            ValueOpcode::Phi => "phi",
        }
    }

    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            ValueOpcode::Add
                | ValueOpcode::Mul
                | ValueOpcode::Eq
                | ValueOpcode::And
                | ValueOpcode::Or
                | ValueOpcode::Fadd
                | ValueOpcode::Fmul
                | ValueOpcode::Feq
                | ValueOpcode::Ceq
        )
    }
}

/// Opcodes of operations that only have an effect.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EffectOpcode {
    Br,
    Jmp,
    Print,
    Ret,
    Call,
    Store,
    Free,
    Speculate,
    Guard,
    Commit,
    Nop,
}

impl EffectOpcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectOpcode::Br => "br",
            EffectOpcode::Jmp => "jmp",
            EffectOpcode::Print => "print",
            EffectOpcode::Ret => "ret",
            EffectOpcode::Call => "call",
            EffectOpcode::Store => "store",
            EffectOpcode::Free => "free",
            EffectOpcode::Speculate => "speculate",
            EffectOpcode::Guard => "guard",
            EffectOpcode::Commit => "commit",
            EffectOpcode::Nop => "nop",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Constant {
    pub op: ConstOp,
    pub dest: String,
    #[serde(rename = "type")]
    pub const_type: Type,
    pub value: Literal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValueOperation {
    pub op: ValueOpcode,
    pub dest: String,
    #[serde(rename = "type")]
    pub op_type: Type,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EffectOperation {
    pub op: EffectOpcode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funcs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Instruction {
    Constant(Constant),
    Value(ValueOperation),
    Effect(EffectOperation),
}

impl Instruction {
    pub fn constant(dest: &str, const_type: Type, value: Literal) -> Self {
        Instruction::Constant(Constant {
            op: ConstOp::Const,
            dest: dest.to_string(),
            const_type,
            value,
            pos: None,
        })
    }

    pub fn value(op: ValueOpcode, dest: &str, op_type: Type, args: &[&str]) -> Self {
        Instruction::Value(ValueOperation {
            op,
            dest: dest.to_string(),
            op_type,
            args: args.iter().map(|a| a.to_string()).collect(),
            funcs: vec![],
            labels: vec![],
            pos: None,
        })
    }

    pub fn effect(op: EffectOpcode, args: &[&str], labels: &[&str]) -> Self {
        Instruction::Effect(EffectOperation {
            op,
            args: args.iter().map(|a| a.to_string()).collect(),
            funcs: vec![],
            labels: labels.iter().map(|l| l.to_string()).collect(),
            pos: None,
        })
    }

    pub fn with_pos(mut self, pos: Position) -> Self {
        self.set_pos(Some(pos));
        self
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            Instruction::Constant(_) => "const",
            Instruction::Value(v) => v.op.as_str(),
            Instruction::Effect(e) => e.op.as_str(),
        }
    }

    pub fn get_pos(&self) -> Option<Position> {
        match self {
            Instruction::Constant(c) => c.pos,
            Instruction::Value(v) => v.pos,
            Instruction::Effect(e) => e.pos,
        }
    }

    pub fn set_pos(&mut self, pos: Option<Position>) {
        match self {
            Instruction::Constant(c) => c.pos = pos,
            Instruction::Value(v) => v.pos = pos,
            Instruction::Effect(e) => e.pos = pos,
        }
    }

    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Constant(c) => Some(&c.dest),
            Instruction::Value(v) => Some(&v.dest),
            Instruction::Effect(_) => None,
        }
    }

    pub fn dest_type(&self) -> Option<&Type> {
        match self {
            Instruction::Constant(c) => Some(&c.const_type),
            Instruction::Value(v) => Some(&v.op_type),
            Instruction::Effect(_) => None,
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            Instruction::Constant(_) => &[],
            Instruction::Value(v) => &v.args,
            Instruction::Effect(e) => &e.args,
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Instruction::Constant(_) => None,
            Instruction::Value(v) => Some(&mut v.args),
            Instruction::Effect(e) => Some(&mut e.args),
        }
    }

    pub fn funcs(&self) -> &[String] {
        match self {
            Instruction::Constant(_) => &[],
            Instruction::Value(v) => &v.funcs,
            Instruction::Effect(e) => &e.funcs,
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            Instruction::Constant(_) => &[],
            Instruction::Value(v) => &v.labels,
            Instruction::Effect(e) => &e.labels,
        }
    }

    /// `br`, `jmp` and `ret` end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Effect(EffectOperation {
                op: EffectOpcode::Br | EffectOpcode::Jmp | EffectOpcode::Ret,
                ..
            })
        )
    }

    /// Labels control may transfer to, for `br` and `jmp`.
    pub fn jump_targets(&self) -> &[String] {
        match self {
            Instruction::Effect(EffectOperation {
                op: EffectOpcode::Br | EffectOpcode::Jmp,
                labels,
                ..
            }) => labels,
            _ => &[],
        }
    }

    pub fn has_side_effects(&self) -> bool {
        match self {
            Instruction::Constant(_) => false,
            Instruction::Value(v) => v.op == ValueOpcode::Call,
            Instruction::Effect(_) => true,
        }
    }
}

/// A jump target. Not an instruction, carries no value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Label {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,
}

/// One entry of a function body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Code {
    Label(Label),
    Instruction(Instruction),
}

impl Code {
    pub fn label(name: &str) -> Self {
        Code::Label(Label {
            label: name.to_string(),
            pos: None,
        })
    }

    pub fn get_pos(&self) -> Option<Position> {
        match self {
            Code::Label(l) => l.pos,
            Code::Instruction(i) => i.get_pos(),
        }
    }
}

impl From<Instruction> for Code {
    fn from(instr: Instruction) -> Self {
        Code::Instruction(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::printer::instruction_to_text(self))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::printer::code_to_text(self))
    }
}
