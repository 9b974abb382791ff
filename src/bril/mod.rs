mod func;
mod instr;
pub mod printer;
pub mod signature;
mod types;

pub use func::{Function, Program};
pub use instr::{
    Code, ConstOp, Constant, EffectOpcode, EffectOperation, Instruction, Label, ValueOpcode,
    ValueOperation,
};
pub use printer::{function_to_text, instruction_to_text, program_to_text};
pub use types::{Argument, Literal, Position, Type};
