mod block;
mod block_builder;
mod graph;

pub mod analysis;
pub mod optimizer;

#[cfg(test)]
mod tests;

pub use block::{blocks_to_function, BasicBlock, START_LABEL};
pub use block_builder::{build_blocks, group_basic_blocks, FuncBlockMapping};
pub use graph::{
    blocks_to_block_graph, blocks_to_instr_graph, resolve_successors, BlockGraph, BlockNode,
    Graph, InstrGraph, InstrNode, Node, NodeId,
};
