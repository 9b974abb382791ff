use super::dfa::{union_all, DataFlow, Fact, InstrDataFlowMachine};
use crate::bril::{Function, Program};
use crate::config::Config;
use crate::error::Result;
use crate::ir::{build_blocks, InstrNode, Node};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub type ReachingSet = BTreeMap<String, BTreeSet<u32>>;

pub type FuncReachingDefs = BTreeMap<u32, ReachingSet>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Definition {
    pub var: String,
    pub row: u32,
}

impl Fact for Definition {
    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

pub struct ReachingDefinitions {
    rows: Vec<u32>,
}

impl ReachingDefinitions {
    pub fn new(func: &Function) -> Self {
        Self {
            rows: func.instr_rows(),
        }
    }

    fn row(&self, node: &Node<InstrNode>) -> u32 {
        self.rows.get(node.index()).copied().unwrap_or_default()
    }
}

impl<'a> DataFlow<InstrNode<'a>> for ReachingDefinitions {
    type Fact = Definition;

    fn gen(&self, node: &Node<InstrNode<'a>>) -> Vec<Definition> {
        match node.get_value().get_instr().dest() {
            Some(var) => vec![Definition {
                var: var.to_string(),
                row: self.row(node),
            }],
            None => vec![],
        }
    }

    fn kill(
        &self,
        node: &Node<InstrNode<'a>>,
        input: &[Definition],
        _gen: &[Definition],
    ) -> Vec<Definition> {
        let Some(var) = node.get_value().get_instr().dest() else {
            return vec![];
        };
        let row = self.row(node);

        input
            .iter()
            .filter(|def| def.var == var && def.row != row)
            .cloned()
            .collect()
    }

    fn merge(&self, inputs: &[&[Definition]]) -> Vec<Definition> {
        union_all(inputs)
    }
}

pub fn function_reaching_definitions(func: &Function, config: &Config) -> Result<FuncReachingDefs> {
    let blocks = build_blocks(func);
    let mut result = FuncReachingDefs::new();

    if blocks.is_empty() {
        return Ok(result);
    }

    let analysis = ReachingDefinitions::new(func);
    let mut machine =
        InstrDataFlowMachine::for_instrs(analysis, &blocks)?.with_order(config.worklist);

    // labels only, nothing to reach
    let Some(root) = machine.get_graph().get_root() else {
        return Ok(result);
    };

    let header = func.header_row();
    let params = func
        .args
        .iter()
        .map(|arg| Definition {
            var: arg.name.clone(),
            row: header,
        })
        .collect();

    machine.init(root, params);
    machine.run()?;

    for node in machine.get_graph().nodes() {
        let Some(data_in) = machine.get_data_in(node.index()) else {
            continue;
        };

        let mut reaching = ReachingSet::new();
        for def in data_in {
            reaching.entry(def.var.clone()).or_default().insert(def.row);
        }

        result.insert(machine.get_analysis().row(node), reaching);
    }

    debug!(
        func = func.name.as_str(),
        instrs = result.len(),
        "computed reaching definitions"
    );

    Ok(result)
}

pub fn reaching_definitions(program: &Program, config: &Config) -> BTreeMap<String, FuncReachingDefs> {
    program
        .functions
        .iter()
        .map(|func| {
            let defs = function_reaching_definitions(func, config).unwrap_or_else(|err| {
                warn!(func = func.name.as_str(), %err, "reaching definitions failed");
                FuncReachingDefs::new()
            });

            (func.name.clone(), defs)
        })
        .collect()
}
