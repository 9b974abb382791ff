use super::super::block::BasicBlock;
use super::super::graph::{
    blocks_to_block_graph, blocks_to_instr_graph, BlockNode, Graph, InstrNode, Node, NodeId,
};
use crate::config::WorklistOrder;
use crate::error::{AnalysisError, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use tracing::{debug, trace};

pub trait Fact: Clone + Debug {
    fn equals(&self, other: &Self) -> bool;
}

macro_rules! value_fact {
    ($($t:ty),*) => {
        $(
            impl Fact for $t {
                fn equals(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_fact!(String, bool, i64, u32, usize);

// out = (merge(preds) ∪ gen) \ kill. Must be monotone to reach a fixed point.
pub trait DataFlow<N> {
    type Fact: Fact;

    fn gen(&self, node: &Node<N>) -> Vec<Self::Fact>;
    fn kill(&self, node: &Node<N>, input: &[Self::Fact], gen: &[Self::Fact]) -> Vec<Self::Fact>;
    fn merge(&self, inputs: &[&[Self::Fact]]) -> Vec<Self::Fact>;
}

pub struct DataFlowMachine<N, A: DataFlow<N>> {
    analysis: A,
    graph: Graph<N>,
    data_in: HashMap<NodeId, Vec<A::Fact>>,
    data_out: HashMap<NodeId, Vec<A::Fact>>,
    seeds: HashMap<NodeId, Vec<A::Fact>>,
    order: WorklistOrder,
    visits: usize,
}

pub type InstrDataFlowMachine<'a, A> = DataFlowMachine<InstrNode<'a>, A>;
pub type BlockDataFlowMachine<'a, A> = DataFlowMachine<BlockNode<'a>, A>;

impl<'a, A: DataFlow<InstrNode<'a>>> DataFlowMachine<InstrNode<'a>, A> {
    pub fn for_instrs(analysis: A, blocks: &'a [BasicBlock]) -> Result<Self> {
        Ok(Self::new(analysis, blocks_to_instr_graph(blocks)?))
    }
}

impl<'a, A: DataFlow<BlockNode<'a>>> DataFlowMachine<BlockNode<'a>, A> {
    pub fn for_blocks(analysis: A, blocks: &'a [BasicBlock]) -> Result<Self> {
        Ok(Self::new(analysis, blocks_to_block_graph(blocks)?))
    }
}

impl<N, A: DataFlow<N>> DataFlowMachine<N, A> {
    pub fn new(analysis: A, graph: Graph<N>) -> Self {
        Self {
            analysis,
            graph,
            data_in: HashMap::new(),
            data_out: HashMap::new(),
            seeds: HashMap::new(),
            order: WorklistOrder::default(),
            visits: 0,
        }
    }

    pub fn with_order(mut self, order: WorklistOrder) -> Self {
        self.order = order;
        self
    }

    pub fn init(&mut self, index: NodeId, data: Vec<A::Fact>) -> &mut Self {
        self.seeds.insert(index, data);
        self
    }

    pub fn run(&mut self) -> Result<()> {
        let root = self.graph.get_root().ok_or(AnalysisError::MissingRoot)?;
        let mut work_list = WorkList::new(self.order);

        work_list.push(root);

        while let Some(index) = work_list.pop() {
            let node = self
                .graph
                .get_node(index)
                .ok_or(AnalysisError::UnknownNode(index))?;

            self.visits += 1;

            let input = self.merge_input(node, root)?;
            let gen = self.analysis.gen(node);
            let all_in = union(&input, &gen);
            let killed = self.analysis.kill(node, &input, &gen);
            let out = filter(&all_in, &killed);

            trace!(node = index, facts_in = input.len(), facts_out = out.len(), "visit");

            self.data_in.insert(index, input);

            let changed = match self.data_out.get(&index) {
                Some(previous) => !same_facts(previous, &out),
                None => true,
            };

            if changed {
                self.data_out.insert(index, out);

                for succ in node.get_next().iter() {
                    work_list.push(*succ);
                }
            }
        }

        debug!(
            nodes = self.graph.len(),
            visits = self.visits,
            "data flow reached a fixed point"
        );

        Ok(())
    }

    // The root also has an implicit entry edge carrying its seed.
    fn merge_input(&self, node: &Node<N>, root: NodeId) -> Result<Vec<A::Fact>> {
        let index = node.index();
        let mut inputs: Vec<&[A::Fact]> = vec![];

        if let Some(seed) = self.seeds.get(&index) {
            inputs.push(seed);
        } else if index == root {
            inputs.push(&[]);
        }

        for pred in node.get_prev().iter() {
            if self.graph.get_node(*pred).is_none() {
                return Err(AnalysisError::UnknownNode(*pred));
            }

            if let Some(out) = self.data_out.get(pred) {
                inputs.push(out);
            }
        }

        if inputs.is_empty() {
            return Ok(vec![]);
        }

        Ok(self.analysis.merge(&inputs))
    }

    pub fn get_graph(&self) -> &Graph<N> {
        &self.graph
    }

    pub fn get_analysis(&self) -> &A {
        &self.analysis
    }

    pub fn get_data_in(&self, index: NodeId) -> Option<&[A::Fact]> {
        self.data_in.get(&index).map(Vec::as_slice)
    }

    pub fn get_data_out(&self, index: NodeId) -> Option<&[A::Fact]> {
        self.data_out.get(&index).map(Vec::as_slice)
    }

    pub fn get_visits(&self) -> usize {
        self.visits
    }
}

struct WorkList {
    queue: VecDeque<NodeId>,
    queued: HashSet<NodeId>,
    order: WorklistOrder,
}

impl WorkList {
    fn new(order: WorklistOrder) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            order,
        }
    }

    fn push(&mut self, index: NodeId) {
        if self.order == WorklistOrder::Dedup && !self.queued.insert(index) {
            return;
        }

        self.queue.push_back(index);
    }

    fn pop(&mut self) -> Option<NodeId> {
        let index = self.queue.pop_front()?;

        self.queued.remove(&index);

        Some(index)
    }
}

pub fn union<F: Fact>(a: &[F], b: &[F]) -> Vec<F> {
    let mut result: Vec<F> = Vec::with_capacity(a.len() + b.len());

    for fact in a.iter().chain(b.iter()) {
        if !result.iter().any(|existing| existing.equals(fact)) {
            result.push(fact.clone());
        }
    }

    result
}

pub fn filter<F: Fact>(a: &[F], b: &[F]) -> Vec<F> {
    a.iter()
        .filter(|fact| !b.iter().any(|other| fact.equals(other)))
        .cloned()
        .collect()
}

pub fn intersection<F: Fact>(inputs: &[&[F]]) -> Vec<F> {
    let Some((first, rest)) = inputs.split_first() else {
        return vec![];
    };

    let first = union(first, &[]);

    first
        .into_iter()
        .filter(|fact| rest.iter().all(|set| set.iter().any(|other| fact.equals(other))))
        .collect()
}

pub fn union_all<F: Fact>(inputs: &[&[F]]) -> Vec<F> {
    inputs
        .iter()
        .fold(vec![], |acc: Vec<F>, set| union(&acc, set))
}

fn same_facts<F: Fact>(a: &[F], b: &[F]) -> bool {
    a.len() == b.len() && a.iter().all(|fact| b.iter().any(|other| fact.equals(other)))
}
