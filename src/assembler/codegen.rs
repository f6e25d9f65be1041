//! Renders resolved statements to Hack machine words.
use super::ast::{Instruction, Operand, Statement};
use super::error::Error;

/// Largest value an A-instruction can load.
pub const MAX_ADDRESS: u16 = 0x7FFF;

const C_PREFIX: u16 = 0b111 << 13;

/// Assembles one resolved instruction to its 16-bit word.
/// Labels produce no word.
pub fn encode(instruction: &Instruction, line: usize) -> Result<Option<u16>, Error> {
    match instruction {
        Instruction::L(_) => Ok(None),
        Instruction::A(Operand::Literal(value)) => {
            if *value > MAX_ADDRESS {
                return Err(Error::AddressOutOfRange { value: value.to_string(), line });
            }
            Ok(Some(*value))
        }
        Instruction::A(Operand::Symbol(name)) => {
            Err(Error::UnresolvedSymbol { symbol: name.clone(), line })
        }
        Instruction::C { dest, comp, jump } => {
            Ok(Some(C_PREFIX | (comp.bits() << 6) | (dest.bits() << 3) | jump.bits()))
        }
    }
}

/// Assembles every statement, in order, skipping labels.
pub fn generate(statements: &[Statement]) -> Result<Vec<u16>, Vec<Error>> {
    let mut words = Vec::with_capacity(statements.len());
    let mut errors = Vec::new();

    for st in statements {
        match encode(&st.instruction, st.line) {
            Ok(Some(word)) => words.push(word),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    debug!("generated {} word(s)", words.len());
    Ok(words)
}

/// Formats a word as 16 binary digits, most significant bit first.
pub fn to_binary(word: u16) -> String {
    format!("{:016b}", word)
}
