use super::func::{Function, Program};
use super::instr::{Code, Instruction, Label};
use super::types::{Argument, Literal, Type};

const CONTROL_CHARS: [(char, &str); 8] = [
    ('\0', "\\0"),
    ('\u{7}', "\\a"),
    ('\u{8}', "\\b"),
    ('\t', "\\t"),
    ('\n', "\\n"),
    ('\u{b}', "\\v"),
    ('\u{c}', "\\f"),
    ('\r', "\\r"),
];

pub fn program_to_text(program: &Program) -> String {
    program
        .functions
        .iter()
        .map(function_to_text)
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn function_to_text(func: &Function) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(&func.name);
    push_args(&mut result, &func.args);
    if let Some(ty) = &func.return_type {
        result.push_str(&format!(": {}", ty));
    }
    result.push_str(" {\n");

    for code in func.instrs.iter() {
        match code {
            Code::Label(label) => result.push_str(&label_to_text(label)),
            Code::Instruction(instr) => {
                result.push_str("  ");
                result.push_str(&instruction_to_text(instr));
            }
        }
        result.push('\n');
    }

    result.push('}');
    result
}

pub fn code_to_text(code: &Code) -> String {
    match code {
        Code::Label(label) => label_to_text(label),
        Code::Instruction(instr) => instruction_to_text(instr),
    }
}

pub fn instruction_to_text(instr: &Instruction) -> String {
    if let Instruction::Constant(c) = instr {
        return format!(
            "{}: {} = const {};",
            c.dest,
            c.const_type,
            literal_to_text(&c.const_type, &c.value)
        );
    }

    let mut rhs = instr.op_name().to_string();
    for func in instr.funcs() {
        rhs.push_str(" @");
        rhs.push_str(func);
    }
    for arg in instr.args() {
        rhs.push(' ');
        rhs.push_str(arg);
    }
    for label in instr.labels() {
        rhs.push_str(" .");
        rhs.push_str(label);
    }

    match (instr.dest(), instr.dest_type()) {
        (Some(dest), Some(ty)) => format!("{}: {} = {};", dest, ty, rhs),
        _ => format!("{};", rhs),
    }
}

fn label_to_text(label: &Label) -> String {
    format!(".{}:", label.label)
}

fn literal_to_text(ty: &Type, value: &Literal) -> String {
    match (ty, value) {
        (Type::Char, Literal::Char(c)) => {
            let escaped = CONTROL_CHARS
                .iter()
                .find(|(ctrl, _)| ctrl == c)
                .map(|(_, esc)| esc.to_string())
                .unwrap_or_else(|| c.to_string());

            format!("'{}'", escaped)
        }
        (_, Literal::Int(i)) => i.to_string(),
        (_, Literal::Bool(b)) => b.to_string(),
        (_, Literal::Float(f)) => f.to_string(),
        (_, Literal::Char(c)) => c.to_string(),
    }
}

fn push_args(result: &mut String, args: &[Argument]) {
    if args.is_empty() {
        return;
    }

    let args = args
        .iter()
        .map(|arg| format!("{}: {}", arg.name, arg.arg_type))
        .collect::<Vec<String>>()
        .join(", ");

    result.push('(');
    result.push_str(&args);
    result.push(')');
}
