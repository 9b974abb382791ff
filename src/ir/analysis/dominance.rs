use super::dfa::{intersection, BlockDataFlowMachine, DataFlow};
use crate::config::Config;
use crate::error::Result;
use crate::ir::{BasicBlock, BlockNode, FuncBlockMapping, Node};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DominanceKind {
    Strict,
    NonStrict,
}

impl DominanceKind {
    fn note_prefix(&self) -> &'static str {
        match self {
            DominanceKind::Strict => "strictly dominated by",
            DominanceKind::NonStrict => "dominated by",
        }
    }
}

pub type Dominators = BTreeMap<String, Vec<String>>;

pub struct Dominance;

impl<'a> DataFlow<BlockNode<'a>> for Dominance {
    type Fact = String;

    fn gen(&self, node: &Node<BlockNode<'a>>) -> Vec<String> {
        vec![node.get_value().get_block().get_label().to_string()]
    }

    fn kill(&self, _: &Node<BlockNode<'a>>, _: &[String], _: &[String]) -> Vec<String> {
        vec![]
    }

    fn merge(&self, inputs: &[&[String]]) -> Vec<String> {
        intersection(inputs)
    }
}

pub fn compute_dominators(
    blocks: &[BasicBlock],
    kind: DominanceKind,
    config: &Config,
) -> Result<Dominators> {
    let mut result = Dominators::new();

    if blocks.is_empty() {
        return Ok(result);
    }

    let mut machine = BlockDataFlowMachine::for_blocks(Dominance, blocks)?.with_order(config.worklist);
    machine.run()?;

    for (index, block) in blocks.iter().enumerate() {
        let facts = match kind {
            DominanceKind::Strict => machine.get_data_in(index),
            DominanceKind::NonStrict => machine.get_data_out(index),
        };

        // unreachable blocks are never visited and get no entry
        let Some(facts) = facts else {
            continue;
        };

        let dominators = blocks
            .iter()
            .map(|b| b.get_label())
            .filter(|label| facts.iter().any(|fact| fact == label))
            .map(str::to_string)
            .collect();

        result.insert(block.get_label().to_string(), dominators);
    }

    debug!(
        blocks = blocks.len(),
        visits = machine.get_visits(),
        "computed dominators"
    );

    Ok(result)
}

pub fn annotate_dominance(
    blocks: &mut [BasicBlock],
    kind: DominanceKind,
    config: &Config,
) -> Result<()> {
    let dominators = compute_dominators(blocks, kind, config)?;

    for block in blocks.iter_mut() {
        let Some(labels) = dominators.get(block.get_label()) else {
            continue;
        };

        block.add_note(format!("{}: {}", kind.note_prefix(), labels.join(", ")));
    }

    Ok(())
}

pub fn dominators(
    funcs: &FuncBlockMapping,
    kind: DominanceKind,
    config: &Config,
) -> Result<BTreeMap<String, Dominators>> {
    funcs
        .iter()
        .map(|(name, blocks)| Ok((name.clone(), compute_dominators(blocks, kind, config)?)))
        .collect()
}

pub fn dominance(funcs: &mut FuncBlockMapping, kind: DominanceKind, config: &Config) -> Result<()> {
    for blocks in funcs.values_mut() {
        annotate_dominance(blocks, kind, config)?;
    }

    Ok(())
}
