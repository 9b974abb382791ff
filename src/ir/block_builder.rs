use super::block::{BasicBlock, START_LABEL};
use crate::bril::{Code, Function, Instruction, Label, Program};
use std::collections::BTreeMap;
use std::mem;

pub type FuncBlockMapping = BTreeMap<String, Vec<BasicBlock>>;

pub fn build_blocks(func: &Function) -> Vec<BasicBlock> {
    BlockBuilder::build(func)
}

pub fn group_basic_blocks(program: &Program) -> FuncBlockMapping {
    program
        .functions
        .iter()
        .map(|func| (func.name.clone(), build_blocks(func)))
        .collect()
}

struct BlockBuilder<'a> {
    func_name: &'a str,
    blocks: Vec<BasicBlock>,
    current_block: BasicBlock,
}

impl<'a> BlockBuilder<'a> {
    fn new(func_name: &'a str) -> Self {
        Self {
            func_name,
            blocks: vec![],
            current_block: BasicBlock::synthetic(format!("{}.{}", func_name, START_LABEL)),
        }
    }

    fn build(func: &'a Function) -> Vec<BasicBlock> {
        let mut builder = Self::new(&func.name);

        for (index, code) in func.instrs.iter().enumerate() {
            match code {
                Code::Label(label) => builder.process_label(label),
                Code::Instruction(instr) if instr.is_terminator() => {
                    builder.process_terminator(instr, index)
                }
                Code::Instruction(instr) => builder.process_basic_instr(instr),
            }
        }

        let last = mem::replace(
            &mut builder.current_block,
            BasicBlock::synthetic(String::new()),
        );
        builder.insert_block(last);

        builder.blocks
    }

    fn process_basic_instr(&mut self, instr: &Instruction) {
        self.current_block.push_instr(instr.clone());
    }

    fn process_label(&mut self, label: &Label) {
        // falling into a label is an edge even without a jump
        self.current_block.add_next(&label.label);

        self.set_current(BasicBlock::from_label(label));
    }

    fn process_terminator(&mut self, instr: &Instruction, index: usize) {
        for target in instr.jump_targets() {
            self.current_block.add_next(target);
        }

        self.current_block.push_instr(instr.clone());

        // code after a terminator starts on the following line
        let label = format!("{}.l{}", self.func_name, index + 2);
        self.set_current(BasicBlock::synthetic(label));
    }

    fn set_current(&mut self, block: BasicBlock) {
        let closed = mem::replace(&mut self.current_block, block);

        self.insert_block(closed);
    }

    // Empty labeled blocks stay so that jumps to them still resolve.
    fn insert_block(&mut self, block: BasicBlock) {
        if block.is_empty() && block.is_synthetic() {
            return;
        }

        self.blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bril::{EffectOpcode, Literal, Type, ValueOpcode};
    use crate::ir::blocks_to_function;
    use pretty_assertions::assert_eq;

    fn const_int(dest: &str, value: i64) -> Code {
        Instruction::constant(dest, Type::Int, Literal::Int(value)).into()
    }

    fn jmp(label: &str) -> Code {
        Instruction::effect(EffectOpcode::Jmp, &[], &[label]).into()
    }

    fn labels(blocks: &[BasicBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.get_label()).collect()
    }

    #[test]
    fn empty_function_has_no_blocks() {
        let func = Function::new("main", vec![]);

        assert!(build_blocks(&func).is_empty());
    }

    #[test]
    fn straight_line_code_is_one_block() {
        let func = Function::new(
            "main",
            vec![
                const_int("a", 4),
                Instruction::value(ValueOpcode::Add, "b", Type::Int, &["a", "a"]).into(),
                Instruction::effect(EffectOpcode::Print, &["b"], &[]).into(),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(1, blocks.len());
        assert_eq!("main.start", blocks[0].get_label());
        assert_eq!(3, blocks[0].get_instrs().len());
        assert!(blocks[0].get_next().is_empty());
    }

    #[test]
    fn labels_split_blocks_and_fall_through() {
        let func = Function::new(
            "main",
            vec![
                const_int("a", 1),
                Code::label("next"),
                const_int("b", 2),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(vec!["main.start", "next"], labels(&blocks));
        assert_eq!(&vec!["next".to_string()], blocks[0].get_next());
    }

    #[test]
    fn branches_record_both_targets() {
        let func = Function::new(
            "main",
            vec![
                Instruction::constant("c", Type::Bool, Literal::Bool(true)).into(),
                Instruction::effect(EffectOpcode::Br, &["c"], &["left", "right"]).into(),
                Code::label("left"),
                jmp("end"),
                Code::label("right"),
                jmp("end"),
                Code::label("end"),
                Instruction::effect(EffectOpcode::Ret, &[], &[]).into(),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(vec!["main.start", "left", "right", "end"], labels(&blocks));
        assert_eq!(&vec!["left".to_string(), "right".to_string()], blocks[0].get_next());
        assert_eq!(&vec!["end".to_string()], blocks[1].get_next());
        assert_eq!(&vec!["end".to_string()], blocks[2].get_next());
        assert!(blocks[3].get_next().is_empty());
    }

    #[test]
    fn code_after_terminator_gets_synthetic_label() {
        let func = Function::new(
            "f",
            vec![
                Instruction::effect(EffectOpcode::Ret, &[], &[]).into(),
                const_int("dead", 1),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(vec!["f.start", "f.l2"], labels(&blocks));
        assert!(blocks[1].is_synthetic());
        assert!(blocks[0].get_next().is_empty());
    }

    #[test]
    fn empty_labeled_blocks_are_kept() {
        let func = Function::new(
            "main",
            vec![
                const_int("a", 1),
                Code::label("first"),
                Code::label("second"),
                const_int("b", 2),
                Code::label("end"),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(vec!["main.start", "first", "second", "end"], labels(&blocks));
        assert!(blocks[1].is_empty());
        assert_eq!(&vec!["second".to_string()], blocks[1].get_next());
        assert!(blocks[3].is_empty());
    }

    #[test]
    fn blocks_reassemble_into_original_function() {
        let func = Function::new(
            "main",
            vec![
                const_int("i", 0),
                Code::label("loop"),
                Instruction::value(ValueOpcode::Lt, "c", Type::Bool, &["i", "i"]).into(),
                Instruction::effect(EffectOpcode::Br, &["c"], &["loop", "done"]).into(),
                Code::label("done"),
                Instruction::effect(EffectOpcode::Print, &["i"], &[]).into(),
            ],
        );
        let blocks = build_blocks(&func);

        assert_eq!(func, blocks_to_function(&func, &blocks));
    }
}
