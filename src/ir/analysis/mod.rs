mod dfa;
mod dominance;
mod reaching_defs;

pub use dfa::{
    filter, intersection, union, union_all, BlockDataFlowMachine, DataFlow, DataFlowMachine, Fact,
    InstrDataFlowMachine,
};
pub use dominance::{
    annotate_dominance, compute_dominators, dominance, dominators, Dominance, DominanceKind,
    Dominators,
};
pub use reaching_defs::{
    function_reaching_definitions, reaching_definitions, Definition, FuncReachingDefs,
    ReachingDefinitions, ReachingSet,
};
