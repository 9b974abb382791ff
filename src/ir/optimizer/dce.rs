use crate::bril::Program;
use crate::config::Config;
use crate::error::Result;
use crate::ir::{blocks_to_function, build_blocks, resolve_successors, BasicBlock};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

pub type DefId = (usize, usize);

// Variable to the definitions of it that are current along one path.
type Definitions = BTreeMap<String, BTreeSet<DefId>>;

#[derive(Clone, Debug, PartialEq)]
pub struct EliminationBlocksResult {
    pub passes: Vec<Vec<BasicBlock>>,
    pub converged: Vec<BasicBlock>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EliminationProgramResult {
    pub passes: Vec<Program>,
    pub converged: Program,
}

// A block is walked again only when entered with a definition it has not seen.
pub fn dead_stores(blocks: &[BasicBlock]) -> Result<BTreeSet<DefId>> {
    if blocks.is_empty() {
        return Ok(BTreeSet::new());
    }

    let successors = resolve_successors(blocks)?;
    let mut block_in: HashMap<usize, Definitions> = HashMap::new();
    let mut all_defs: BTreeSet<DefId> = BTreeSet::new();
    let mut used: HashSet<DefId> = HashSet::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut work_list: Vec<(usize, Definitions)> = vec![(0, Definitions::new())];

    while let Some((index, incoming)) = work_list.pop() {
        let first_visit = visited.insert(index);
        let seen = block_in.entry(index).or_default();

        if !merge_definitions(seen, &incoming) && !first_visit {
            continue;
        }

        let mut defs = seen.clone();

        for (instr_index, instr) in blocks[index].get_instrs().iter().enumerate() {
            for arg in instr.args() {
                if let Some(reaching) = defs.get(arg) {
                    used.extend(reaching.iter().copied());
                }
            }

            if let Some(dest) = instr.dest() {
                let id = (index, instr_index);

                all_defs.insert(id);
                defs.insert(dest.to_string(), BTreeSet::from([id]));
            }
        }

        for succ in successors[index].iter().rev() {
            work_list.push((*succ, defs.clone()));
        }
    }

    Ok(all_defs
        .into_iter()
        .filter(|id| !used.contains(id))
        .filter(|(block, instr)| !blocks[*block].get_instrs()[*instr].has_side_effects())
        .collect())
}

// Union `incoming` into `seen`. True when something was added.
fn merge_definitions(seen: &mut Definitions, incoming: &Definitions) -> bool {
    let mut changed = false;

    for (var, ids) in incoming.iter() {
        let entry = seen.entry(var.clone()).or_default();

        for id in ids.iter() {
            changed |= entry.insert(*id);
        }
    }

    changed
}

fn remove_dead(blocks: &[BasicBlock], dead: &BTreeSet<DefId>) -> Vec<BasicBlock> {
    blocks
        .iter()
        .enumerate()
        .map(|(block_index, block)| {
            let instrs = block
                .get_instrs()
                .iter()
                .enumerate()
                .filter(|(instr_index, _)| !dead.contains(&(block_index, *instr_index)))
                .map(|(_, instr)| instr.clone())
                .collect();

            block.with_instrs(instrs)
        })
        .collect()
}

pub fn eliminate_dead_code(blocks: Vec<BasicBlock>, config: &Config) -> Result<EliminationBlocksResult> {
    let mut passes = vec![blocks];

    loop {
        let Some(current) = passes.last() else {
            break;
        };

        let dead = dead_stores(current)?;
        if dead.is_empty() {
            break;
        }

        if let Some(max) = config.max_dce_passes {
            if passes.len() > max {
                warn!(max, dead = dead.len(), "dead code elimination stopped before converging");
                break;
            }
        }

        let next = remove_dead(current, &dead);
        passes.push(next);
    }

    let converged = passes.last().cloned().unwrap_or_default();

    Ok(EliminationBlocksResult { passes, converged })
}

pub fn eliminate_dead_assignments(program: &Program, config: &Config) -> Result<EliminationProgramResult> {
    let mut results = Vec::with_capacity(program.functions.len());

    for func in program.functions.iter() {
        let result = eliminate_dead_code(build_blocks(func), config)?;

        debug!(
            func = func.name.as_str(),
            passes = result.passes.len() - 1,
            "dead code elimination converged"
        );

        results.push(result);
    }

    let pass_count = results
        .iter()
        .map(|result| result.passes.len())
        .max()
        .unwrap_or(1);

    let passes = (0..pass_count)
        .map(|pass| {
            let functions = program
                .functions
                .iter()
                .zip(results.iter())
                .map(|(func, result)| {
                    let index = pass.min(result.passes.len() - 1);
                    blocks_to_function(func, &result.passes[index])
                })
                .collect();

            Program::new(functions)
        })
        .collect();

    let converged = Program::new(
        program
            .functions
            .iter()
            .zip(results.iter())
            .map(|(func, result)| blocks_to_function(func, &result.converged))
            .collect(),
    );

    Ok(EliminationProgramResult { passes, converged })
}
