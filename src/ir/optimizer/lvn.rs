use crate::bril::signature::signature;
use crate::bril::{
    Constant, ConstOp, EffectOpcode, Instruction, Literal, Program, ValueOpcode, ValueOperation,
};
use crate::config::Config;
use crate::error::Result;
use crate::ir::{blocks_to_function, build_blocks, BasicBlock};
use murmurhash3::murmurhash3_x64_128;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

pub type ValueId = usize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ExprKind {
    Unop,
    Binop,
    Unknown,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
struct ValueExpr {
    kind: ExprKind,
    op: &'static str,
    refs: Vec<ValueId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Literal>,
}

impl ValueExpr {
    fn unknown(id: ValueId) -> Self {
        Self {
            kind: ExprKind::Unknown,
            op: "unknown",
            refs: vec![id],
            value: None,
        }
    }

    fn fingerprint(&self) -> Result<u64> {
        let bytes = serde_json::to_vec(self)?;
        let hash = murmurhash3_x64_128(&bytes, 0);

        Ok(hash.0 ^ hash.1)
    }
}

struct ValueTable {
    exprs: Vec<ValueExpr>,
    buckets: HashMap<u64, Vec<ValueId>>,
}

impl ValueTable {
    fn new() -> Self {
        Self {
            exprs: vec![],
            buckets: HashMap::new(),
        }
    }

    fn get(&self, id: ValueId) -> Option<&ValueExpr> {
        self.exprs.get(id)
    }

    fn intern(&mut self, expr: ValueExpr) -> Result<ValueId> {
        let fingerprint = expr.fingerprint()?;
        let bucket = self.buckets.entry(fingerprint).or_default();

        if let Some(id) = bucket.iter().find(|id| self.exprs[**id] == expr) {
            return Ok(*id);
        }

        let id = self.exprs.len();
        self.exprs.push(expr);
        bucket.push(id);

        Ok(id)
    }

    // Unknown values only equal themselves, so they skip the lookup.
    fn fresh_unknown(&mut self) -> Result<ValueId> {
        let id = self.exprs.len();
        let expr = ValueExpr::unknown(id);

        self.buckets.entry(expr.fingerprint()?).or_default().push(id);
        self.exprs.push(expr);

        Ok(id)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Commit {
    value: Option<Literal>,
    reference: Option<String>,
}

struct NumberPool {
    table: ValueTable,
    var_to_num: HashMap<String, ValueId>,
    num_to_vars: HashMap<ValueId, Vec<String>>,
    commits: HashMap<usize, HashMap<String, Commit>>,
    commutative: bool,
}

impl NumberPool {
    fn new(config: &Config) -> Self {
        Self {
            table: ValueTable::new(),
            var_to_num: HashMap::new(),
            num_to_vars: HashMap::new(),
            commits: HashMap::new(),
            commutative: config.commutative_lvn,
        }
    }

    fn update(&mut self, instr: &Instruction, index: usize) -> Result<Option<Commit>> {
        let Some(kind) = classify(instr) else {
            return Ok(None);
        };

        if kind != ExprKind::Unknown {
            if let Some(signature) = signature(instr) {
                signature.check_arity(instr)?;
            }
        }

        let mut refs = Vec::with_capacity(instr.args().len());
        for arg in instr.args() {
            let id = self.var_number(arg)?;

            if let Some(commit) = self.commit_for(id) {
                self.commits
                    .entry(index)
                    .or_default()
                    .insert(arg.clone(), commit);
            }

            refs.push(id);
        }

        let Some(dest) = instr.dest() else {
            return Ok(None);
        };

        let id = match (kind, instr) {
            (ExprKind::Unknown, _) => self.table.fresh_unknown()?,
            (_, Instruction::Constant(c)) => self.table.intern(ValueExpr {
                kind,
                op: "const",
                refs: vec![],
                value: Some(c.value),
            })?,
            (_, Instruction::Value(v)) if v.op == ValueOpcode::Id => refs[0],
            (_, Instruction::Value(v)) => {
                if self.commutative && v.op.is_commutative() {
                    refs.sort_unstable();
                }

                self.table.intern(ValueExpr {
                    kind,
                    op: v.op.as_str(),
                    refs,
                    value: None,
                })?
            }
            (_, Instruction::Effect(_)) => return Ok(None),
        };

        let commit = self.commit_for(id);
        self.set_variable(dest, id);

        Ok(commit)
    }

    fn var_number(&mut self, var: &str) -> Result<ValueId> {
        if let Some(id) = self.var_to_num.get(var) {
            return Ok(*id);
        }

        // defined outside this block
        let id = self.table.fresh_unknown()?;
        self.set_variable(var, id);

        Ok(id)
    }

    fn set_variable(&mut self, var: &str, id: ValueId) {
        if let Some(old) = self.var_to_num.insert(var.to_string(), id) {
            if let Some(vars) = self.num_to_vars.get_mut(&old) {
                vars.retain(|v| v != var);
            }
        }

        self.num_to_vars.entry(id).or_default().push(var.to_string());
    }

    fn commit_for(&self, id: ValueId) -> Option<Commit> {
        let value = self
            .table
            .get(id)
            .filter(|expr| expr.op == "const")
            .and_then(|expr| expr.value);
        let reference = self
            .num_to_vars
            .get(&id)
            .and_then(|vars| vars.first())
            .cloned();

        if value.is_none() && reference.is_none() {
            return None;
        }

        Some(Commit { value, reference })
    }

    fn arg_commits(&self, index: usize) -> Option<&HashMap<String, Commit>> {
        self.commits.get(&index)
    }
}

fn classify(instr: &Instruction) -> Option<ExprKind> {
    match instr {
        Instruction::Constant(_) => Some(ExprKind::Unop),
        Instruction::Value(v) => Some(match v.op {
            ValueOpcode::Add
            | ValueOpcode::Mul
            | ValueOpcode::Sub
            | ValueOpcode::Div
            | ValueOpcode::Eq
            | ValueOpcode::Lt
            | ValueOpcode::Gt
            | ValueOpcode::Le
            | ValueOpcode::Ge
            | ValueOpcode::And
            | ValueOpcode::Or
            | ValueOpcode::Fadd
            | ValueOpcode::Fmul
            | ValueOpcode::Fsub
            | ValueOpcode::Fdiv
            | ValueOpcode::Feq
            | ValueOpcode::Flt
            | ValueOpcode::Fgt
            | ValueOpcode::Fle
            | ValueOpcode::Fge
            | ValueOpcode::Ceq
            | ValueOpcode::Clt
            | ValueOpcode::Cgt
            | ValueOpcode::Cle
            | ValueOpcode::Cge => ExprKind::Binop,
            ValueOpcode::Id | ValueOpcode::Not | ValueOpcode::Char2Int | ValueOpcode::Int2Char => {
                ExprKind::Unop
            }
            ValueOpcode::Call
            | ValueOpcode::Load
            | ValueOpcode::PtrAdd
            | ValueOpcode::Alloc
            | ValueOpcode::Phi
            | ValueOpcode::Nop => ExprKind::Unknown,
        }),
        Instruction::Effect(e) => match e.op {
            EffectOpcode::Print | EffectOpcode::Ret | EffectOpcode::Guard | EffectOpcode::Br => {
                Some(ExprKind::Unop)
            }
            EffectOpcode::Store | EffectOpcode::Free | EffectOpcode::Call => {
                Some(ExprKind::Unknown)
            }
            EffectOpcode::Jmp | EffectOpcode::Speculate | EffectOpcode::Commit | EffectOpcode::Nop => {
                None
            }
        },
    }
}

fn rewrite(instr: &Instruction, commit: Commit) -> Option<Instruction> {
    let dest = instr.dest()?.to_string();
    let dest_type = instr.dest_type()?.clone();
    let pos = instr.get_pos();

    if let Some(value) = commit.value {
        return Some(Instruction::Constant(Constant {
            op: ConstOp::Const,
            dest,
            const_type: dest_type,
            value,
            pos,
        }));
    }

    commit.reference.map(|reference| {
        Instruction::Value(ValueOperation {
            op: ValueOpcode::Id,
            dest,
            op_type: dest_type,
            args: vec![reference],
            funcs: vec![],
            labels: vec![],
            pos,
        })
    })
}

pub fn apply_lvn_to_block(block: &mut BasicBlock, config: &Config) -> Result<usize> {
    let mut pool = NumberPool::new(config);
    let mut changed = 0;

    for (index, instr) in block.get_instrs_mut().iter_mut().enumerate() {
        let replacement = match pool.update(instr, index)? {
            Some(commit) => rewrite(instr, commit),
            None => None,
        };

        if let Some(replacement) = replacement {
            if replacement != *instr {
                *instr = replacement;
                changed += 1;
            }
            continue;
        }

        let Some(commits) = pool.arg_commits(index) else {
            continue;
        };
        let Some(args) = instr.args_mut() else {
            continue;
        };

        for arg in args.iter_mut() {
            if let Some(reference) = commits.get(arg.as_str()).and_then(|c| c.reference.as_ref()) {
                if *reference != *arg {
                    *arg = reference.clone();
                    changed += 1;
                }
            }
        }
    }

    Ok(changed)
}

pub fn apply_lvn_to_program(program: &Program, config: &Config) -> Result<Program> {
    let mut functions = Vec::with_capacity(program.functions.len());

    for func in program.functions.iter() {
        let mut blocks = build_blocks(func);
        let mut changed = 0;

        for block in blocks.iter_mut() {
            changed += apply_lvn_to_block(block, config)?;
        }

        debug!(func = func.name.as_str(), changed, "applied local value numbering");

        functions.push(blocks_to_function(func, &blocks));
    }

    Ok(Program::new(functions))
}
