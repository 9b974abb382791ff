use super::block::BasicBlock;
use crate::bril::Instruction;
use crate::error::{AnalysisError, Result};
use std::collections::{HashMap, HashSet};
use std::ops::Index;

pub type NodeId = usize;

#[derive(Debug)]
pub struct Node<T> {
    id: NodeId,
    value: T,
    prev: Vec<NodeId>,
    next: Vec<NodeId>,
}

impl<T> Node<T> {
    pub fn index(&self) -> NodeId {
        self.id
    }

    pub fn get_value(&self) -> &T {
        &self.value
    }

    pub fn get_prev(&self) -> &[NodeId] {
        &self.prev
    }

    pub fn get_next(&self) -> &[NodeId] {
        &self.next
    }
}

#[derive(Debug)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
    labels: Vec<String>,
    root: Option<NodeId>,
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            labels: vec![],
            root: None,
        }
    }

    pub fn add_node(&mut self, value: T, label: &str) -> NodeId {
        let id = self.nodes.len();

        self.nodes.push(Node {
            id,
            value,
            prev: vec![],
            next: vec![],
        });
        self.labels.push(label.to_string());

        id
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if self.nodes[from].next.contains(&to) {
            return;
        }

        self.nodes[from].next.push(to);
        self.nodes[to].prev.push(from);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub fn get_label(&self, id: NodeId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for Graph<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id]
    }
}

#[derive(Debug)]
pub struct InstrNode<'a> {
    instr: &'a Instruction,
    block: usize,
}

impl<'a> InstrNode<'a> {
    pub fn get_instr(&self) -> &'a Instruction {
        self.instr
    }

    pub fn get_block_index(&self) -> usize {
        self.block
    }
}

#[derive(Debug)]
pub struct BlockNode<'a> {
    block: &'a BasicBlock,
}

impl<'a> BlockNode<'a> {
    pub fn get_block(&self) -> &'a BasicBlock {
        self.block
    }
}

// Node n is the n-th instruction of the function, labels not counted.
pub type InstrGraph<'a> = Graph<InstrNode<'a>>;

pub type BlockGraph<'a> = Graph<BlockNode<'a>>;

pub fn resolve_successors(blocks: &[BasicBlock]) -> Result<Vec<Vec<usize>>> {
    let label_to_index: HashMap<&str, usize> = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| (block.get_label(), index))
        .collect();

    blocks
        .iter()
        .map(|block| {
            block
                .get_next()
                .iter()
                .map(|label| {
                    label_to_index
                        .get(label.as_str())
                        .copied()
                        .ok_or_else(|| AnalysisError::unresolved_label(block.get_label(), label))
                })
                .collect()
        })
        .collect()
}

pub fn blocks_to_block_graph(blocks: &[BasicBlock]) -> Result<BlockGraph<'_>> {
    let mut graph = Graph::new();

    if blocks.is_empty() {
        return Ok(graph);
    }

    let successors = resolve_successors(blocks)?;

    for block in blocks.iter() {
        graph.add_node(BlockNode { block }, block.get_label());
    }

    for (index, succs) in successors.iter().enumerate() {
        for succ in succs.iter() {
            graph.add_edge(index, *succ);
        }
    }

    graph.set_root(0);

    Ok(graph)
}

pub fn blocks_to_instr_graph(blocks: &[BasicBlock]) -> Result<InstrGraph<'_>> {
    let mut graph = Graph::new();

    if blocks.is_empty() {
        return Ok(graph);
    }

    let successors = resolve_successors(blocks)?;
    let spans: Vec<Option<(NodeId, NodeId)>> = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| chain_block(&mut graph, index, block))
        .collect();

    for (index, span) in spans.iter().enumerate() {
        let Some((_, end)) = span else {
            continue;
        };

        for succ in successors[index].iter() {
            for start in entry_nodes(*succ, &spans, &successors) {
                graph.add_edge(*end, start);
            }
        }
    }

    if let Some(root) = entry_nodes(0, &spans, &successors).first() {
        graph.set_root(*root);
    }

    Ok(graph)
}

// Links the instructions of a block in sequence, returning the first and
// last node. Empty blocks have neither.
fn chain_block<'a>(
    graph: &mut InstrGraph<'a>,
    index: usize,
    block: &'a BasicBlock,
) -> Option<(NodeId, NodeId)> {
    let mut span: Option<(NodeId, NodeId)> = None;

    for instr in block.get_instrs().iter() {
        let id = graph.add_node(InstrNode { instr, block: index }, block.get_label());

        span = match span {
            Some((start, end)) => {
                graph.add_edge(end, id);
                Some((start, id))
            }
            None => Some((id, id)),
        };
    }

    span
}

// First instructions control reaches when entering `block`, looking through
// empty blocks.
fn entry_nodes(
    block: usize,
    spans: &[Option<(NodeId, NodeId)>],
    successors: &[Vec<usize>],
) -> Vec<NodeId> {
    let mut entries = vec![];
    let mut visited = HashSet::new();
    let mut work_list = vec![block];

    while let Some(current) = work_list.pop() {
        if !visited.insert(current) {
            continue;
        }

        match spans[current] {
            Some((start, _)) => {
                if !entries.contains(&start) {
                    entries.push(start);
                }
            }
            None => work_list.extend(successors[current].iter().rev()),
        }
    }

    entries
}
