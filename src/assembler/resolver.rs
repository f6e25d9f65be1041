//! Two-pass symbol resolution.
//!
//! The first pass walks the whole program to bind every label to the ROM
//! address of the instruction following it. Only then does the second pass
//! replace symbolic operands with addresses, allocating RAM for every name
//! that is neither predefined nor a label.
use std::convert::TryFrom;

use super::ast::{Instruction, Operand, Statement};
use super::error::Error;
use super::symbols::{Binding, SymbolTable};

/// Pass 1: binds labels. Returns the number of ROM words the program occupies.
pub fn bind_labels(statements: &[Statement], symbols: &mut SymbolTable) -> Result<usize, Vec<Error>> {
    let mut errors = Vec::new();
    let mut pc: usize = 0;

    for st in statements {
        let label = match &st.instruction {
            Instruction::L(label) => label,
            _ => {
                pc += 1;
                continue;
            }
        };

        let address = match u16::try_from(pc) {
            Ok(address) => address,
            Err(_) => {
                errors.push(Error::AddressOutOfRange { value: pc.to_string(), line: st.line });
                continue;
            }
        };

        match symbols.bind_label(label, address) {
            Binding::Bound => trace!("label {} = {}", label, address),
            Binding::Reserved(fixed) => {
                warn!("line {}: label `{}` shadows a predefined symbol and is ignored (kept at {})", st.line, label, fixed)
            }
            Binding::Duplicate(existing) => errors.push(Error::DuplicateLabel {
                label: label.clone(),
                address: existing,
                line: st.line,
            }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    debug!("pass 1: {} ROM word(s), {} label(s)", pc, symbols.user_defined());
    Ok(pc)
}

/// Pass 2: resolves every symbolic operand, allocating variables in order of first use.
pub fn allocate_variables(
    statements: Vec<Statement>,
    symbols: &mut SymbolTable,
) -> Result<Vec<Statement>, Vec<Error>> {
    let mut errors = Vec::new();
    let mut resolved = Vec::with_capacity(statements.len());

    for st in statements {
        let name = match st.instruction {
            Instruction::A(Operand::Symbol(name)) => name,
            _ => {
                resolved.push(st);
                continue;
            }
        };

        let known = symbols.contains(&name);
        match symbols.allocate_variable(&name) {
            Some(address) => {
                if !known {
                    trace!("variable {} = {}", name, address);
                }
                resolved.push(Statement { instruction: Instruction::A(Operand::Literal(address)), line: st.line });
            }
            None => errors.push(Error::VariableSpaceExhausted { symbol: name, line: st.line }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    debug!("pass 2: {} variable(s)", symbols.variable_count());
    Ok(resolved)
}

/// Runs both passes over `statements`.
pub fn resolve(statements: Vec<Statement>, symbols: &mut SymbolTable) -> Result<Vec<Statement>, Vec<Error>> {
    bind_labels(&statements, symbols)?;
    allocate_variables(statements, symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::parser::parse;

    fn operands(statements: &[Statement]) -> Vec<u16> {
        statements
            .iter()
            .filter_map(|st| match st.instruction {
                Instruction::A(Operand::Literal(v)) => Some(v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_label_addresses_skip_labels() {
        let statements = parse("(START)\n@1\n(A1)\n(A2)\nD=A\n@2\n(END)").unwrap();
        let mut symbols = SymbolTable::new();
        assert_eq!(bind_labels(&statements, &mut symbols), Ok(3));

        assert_eq!(symbols.get("START"), Some(0));
        assert_eq!(symbols.get("A1"), Some(1));
        assert_eq!(symbols.get("A2"), Some(1));
        assert_eq!(symbols.get("END"), Some(3));
    }

    #[test]
    fn test_forward_references() {
        let statements = parse("@END\n0;JMP\n@x\n(END)\n@END").unwrap();
        let mut symbols = SymbolTable::new();
        let resolved = resolve(statements, &mut symbols).unwrap();

        assert_eq!(operands(&resolved), vec![3, 16, 3]);
        assert_eq!(symbols.variable_count(), 1);
    }

    #[test]
    fn test_variables_in_first_use_order() {
        let mut source = String::new();
        for _ in 0..16 {
            source.push_str("D=A\n");
        }
        source.push_str("@i\n@j\n@i\n@R3\n@k\n@SCREEN");

        let mut symbols = SymbolTable::new();
        let resolved = resolve(parse(&source).unwrap(), &mut symbols).unwrap();

        assert_eq!(operands(&resolved), vec![16, 17, 16, 3, 18, 16384]);
        assert_eq!(symbols.get("i"), Some(16));
        assert_eq!(symbols.get("j"), Some(17));
        assert_eq!(symbols.get("k"), Some(18));
    }

    #[test]
    fn test_reserved_label_is_ignored() {
        let statements = parse("@1\n(SP)\n@SP").unwrap();
        let mut symbols = SymbolTable::new();
        let resolved = resolve(statements, &mut symbols).unwrap();
        assert_eq!(operands(&resolved), vec![1, 0]);
        assert_eq!(symbols.get("SP"), Some(0));
    }

    #[test]
    fn test_duplicate_label() {
        let statements = parse("(LOOP)\n@1\n(LOOP)\n@2").unwrap();
        let mut symbols = SymbolTable::new();
        assert_eq!(
            bind_labels(&statements, &mut symbols),
            Err(vec![Error::DuplicateLabel { label: "LOOP".to_owned(), address: 0, line: 3 }])
        );
        assert_eq!(symbols.get("LOOP"), Some(0));
    }

    #[test]
    fn test_variable_space_exhausted() {
        let mut source = String::new();
        for i in 0..(16384 - 16) {
            source.push_str(&format!("@v{}\n", i));
        }
        source.push_str("@one_too_many\n@v0");

        let mut symbols = SymbolTable::new();
        let errors = resolve(parse(&source).unwrap(), &mut symbols).unwrap_err();
        assert_eq!(
            errors,
            vec![Error::VariableSpaceExhausted { symbol: "one_too_many".to_owned(), line: 16369 }]
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let source = "@a\n(L)\n@b\n@L\n@a\n0;JMP";
        let first = resolve(parse(source).unwrap(), &mut SymbolTable::new()).unwrap();
        let second = resolve(parse(source).unwrap(), &mut SymbolTable::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(operands(&first), vec![16, 17, 1, 16]);
    }
}
