use crate::bril::{Code, Function, Instruction, Label, Position};

pub const START_LABEL: &str = "start";

#[derive(Clone, Debug, PartialEq)]
pub struct BasicBlock {
    label: String,
    instrs: Vec<Instruction>,
    next: Vec<String>,
    notes: Vec<String>,
    synthetic: bool,
    label_pos: Option<Position>,
}

impl BasicBlock {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            instrs: vec![],
            next: vec![],
            notes: vec![],
            synthetic: false,
            label_pos: None,
        }
    }

    pub fn from_label(label: &Label) -> Self {
        Self {
            label_pos: label.pos,
            ..Self::new(&label.label)
        }
    }

    // Invented labels are not emitted by `to_code`.
    pub fn synthetic(label: String) -> Self {
        Self {
            label,
            instrs: vec![],
            next: vec![],
            notes: vec![],
            synthetic: true,
            label_pos: None,
        }
    }

    pub fn with_instrs(&self, instrs: Vec<Instruction>) -> Self {
        Self {
            label: self.label.clone(),
            instrs,
            next: self.next.clone(),
            notes: vec![],
            synthetic: self.synthetic,
            label_pos: self.label_pos,
        }
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn get_instrs(&self) -> &Vec<Instruction> {
        &self.instrs
    }

    pub fn get_instrs_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instrs
    }

    pub fn get_next(&self) -> &Vec<String> {
        &self.next
    }

    pub fn get_notes(&self) -> &Vec<String> {
        &self.notes
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn push_instr(&mut self, instr: Instruction) {
        self.instrs.push(instr);
    }

    pub fn add_next(&mut self, label: &str) {
        self.next.push(label.to_string());
    }

    pub fn add_note(&mut self, note: String) {
        self.notes.push(note);
    }

    pub fn to_code(&self) -> Vec<Code> {
        let mut code = Vec::with_capacity(self.instrs.len() + 1);

        if !self.synthetic {
            code.push(Code::Label(Label {
                label: self.label.clone(),
                pos: self.label_pos,
            }));
        }

        code.extend(self.instrs.iter().cloned().map(Code::Instruction));
        code
    }
}

pub fn blocks_to_function(template: &Function, blocks: &[BasicBlock]) -> Function {
    Function {
        name: template.name.clone(),
        args: template.args.clone(),
        instrs: blocks.iter().flat_map(|block| block.to_code()).collect(),
        return_type: template.return_type.clone(),
        pos: template.pos,
    }
}
