use super::instr::{EffectOpcode, Instruction, ValueOpcode};
use crate::error::{AnalysisError, Result};

/// A type in an operation signature. `Var` is the signature's single type
/// variable, `PtrVar` a pointer to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigType {
    Int,
    Bool,
    Float,
    Char,
    Var,
    PtrVar,
}

/// Shape of an operation: argument types, result type and how many labels
/// and function names it names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub args: &'static [SigType],
    pub dest: Option<SigType>,
    pub labels: usize,
    pub funcs: usize,
}

const fn sig(args: &'static [SigType], dest: Option<SigType>) -> Signature {
    Signature {
        args,
        dest,
        labels: 0,
        funcs: 0,
    }
}

use SigType::*;

const INT_BINOP: Signature = sig(&[Int, Int], Some(Int));
const INT_CMP: Signature = sig(&[Int, Int], Some(Bool));
const BOOL_BINOP: Signature = sig(&[Bool, Bool], Some(Bool));
const FLOAT_BINOP: Signature = sig(&[Float, Float], Some(Float));
const FLOAT_CMP: Signature = sig(&[Float, Float], Some(Bool));
const CHAR_CMP: Signature = sig(&[Char, Char], Some(Bool));

pub fn value_signature(op: ValueOpcode) -> Option<Signature> {
    let signature = match op {
        ValueOpcode::Add | ValueOpcode::Mul | ValueOpcode::Sub | ValueOpcode::Div => INT_BINOP,
        ValueOpcode::Eq | ValueOpcode::Lt | ValueOpcode::Gt | ValueOpcode::Le | ValueOpcode::Ge => {
            INT_CMP
        }
        ValueOpcode::Not => sig(&[Bool], Some(Bool)),
        ValueOpcode::And | ValueOpcode::Or => BOOL_BINOP,
        ValueOpcode::Id => sig(&[Var], Some(Var)),
        ValueOpcode::Nop => sig(&[], None),
        ValueOpcode::Fadd | ValueOpcode::Fmul | ValueOpcode::Fsub | ValueOpcode::Fdiv => {
            FLOAT_BINOP
        }
        ValueOpcode::Feq
        | ValueOpcode::Flt
        | ValueOpcode::Fgt
        | ValueOpcode::Fle
        | ValueOpcode::Fge => FLOAT_CMP,
        ValueOpcode::Alloc => sig(&[Int], Some(PtrVar)),
        ValueOpcode::Load => sig(&[PtrVar], Some(Var)),
        ValueOpcode::PtrAdd => sig(&[PtrVar, Int], Some(PtrVar)),
        ValueOpcode::Ceq
        | ValueOpcode::Clt
        | ValueOpcode::Cgt
        | ValueOpcode::Cle
        | ValueOpcode::Cge => CHAR_CMP,
        ValueOpcode::Char2Int => sig(&[Char], Some(Int)),
        ValueOpcode::Int2Char => sig(&[Int], Some(Char)),
        ValueOpcode::Call | ValueOpcode::Phi => return None,
    };

    Some(signature)
}

pub fn effect_signature(op: EffectOpcode) -> Option<Signature> {
    let signature = match op {
        EffectOpcode::Jmp => Signature {
            labels: 1,
            ..sig(&[], None)
        },
        EffectOpcode::Br => Signature {
            labels: 2,
            ..sig(&[Bool], None)
        },
        EffectOpcode::Guard => Signature {
            labels: 1,
            ..sig(&[Bool], None)
        },
        EffectOpcode::Nop | EffectOpcode::Speculate | EffectOpcode::Commit => sig(&[], None),
        EffectOpcode::Free => sig(&[PtrVar], None),
        EffectOpcode::Store => sig(&[PtrVar, Var], None),
        EffectOpcode::Print | EffectOpcode::Ret | EffectOpcode::Call => return None,
    };

    Some(signature)
}

/// The signature of an instruction's operation. `const` has none, and neither
/// do variadic operations (`call`, `phi`, `print`, `ret`).
pub fn signature(instr: &Instruction) -> Option<Signature> {
    match instr {
        Instruction::Constant(_) => None,
        Instruction::Value(v) => value_signature(v.op),
        Instruction::Effect(e) => effect_signature(e.op),
    }
}

impl Signature {
    pub fn check_arity(&self, instr: &Instruction) -> Result<()> {
        let counts = [
            ("arguments", self.args.len(), instr.args().len()),
            ("labels", self.labels, instr.labels().len()),
            ("functions", self.funcs, instr.funcs().len()),
        ];

        for (what, expected, found) in counts {
            if expected != found {
                return Err(AnalysisError::malformed(
                    instr,
                    format!(
                        "`{}` expects {} {}, found {}",
                        instr.op_name(),
                        expected,
                        what,
                        found
                    ),
                ));
            }
        }

        if self.dest.is_some() != instr.dest().is_some() {
            return Err(AnalysisError::malformed(
                instr,
                format!("`{}` destination does not match its signature", instr.op_name()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bril::Type;

    #[test]
    fn binop_arity_is_checked() {
        let good = Instruction::value(ValueOpcode::Add, "c", Type::Int, &["a", "b"]);
        let bad = Instruction::value(ValueOpcode::Add, "c", Type::Int, &["a"]);
        let sig = signature(&good).unwrap();

        assert!(sig.check_arity(&good).is_ok());
        assert!(sig.check_arity(&bad).is_err());
    }

    #[test]
    fn br_needs_two_labels() {
        let br = Instruction::effect(EffectOpcode::Br, &["cond"], &["then"]);
        let err = signature(&br).unwrap().check_arity(&br).unwrap_err();

        assert!(err.to_string().contains("expects 2 labels, found 1"));
    }

    #[test]
    fn call_and_phi_have_no_signature() {
        assert_eq!(value_signature(ValueOpcode::Call), None);
        assert_eq!(value_signature(ValueOpcode::Phi), None);
        assert_eq!(effect_signature(EffectOpcode::Call), None);
    }
}
