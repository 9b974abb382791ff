mod dce;
mod lvn;

pub use dce::{
    dead_stores, eliminate_dead_assignments, eliminate_dead_code, DefId, EliminationBlocksResult,
    EliminationProgramResult,
};
pub use lvn::{apply_lvn_to_block, apply_lvn_to_program, ValueId};
