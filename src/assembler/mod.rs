//! The Assembler module is in charge of taking a
//! Hack assembly file and producing its machine words.
//!
//! It does this by implementing a lazy tokenizer, a recursive
//! descent parser, a two-pass symbol resolver and a code generator.
//! Each stage collects every error it can find before giving up.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod symbols;

use self::ast::Statement;
use self::error::Error;
use self::symbols::SymbolTable;

/// The result of assembling one source file.
#[derive(Clone, Debug)]
pub struct Assembly {
    /// Resolved statements, labels included.
    pub statements: Vec<Statement>,
    /// One word per A/C instruction, in program order.
    pub words: Vec<u16>,
    pub symbols: SymbolTable,
}

impl Assembly {
    /// The words as 16-character binary strings.
    pub fn lines(&self) -> Vec<String> {
        self.words.iter().map(|w| codegen::to_binary(*w)).collect()
    }
}

/// Assembles `source` from text to machine words.
pub fn assemble(source: &str) -> Result<Assembly, Vec<Error>> {
    let statements = parser::parse(source)?;

    let mut symbols = SymbolTable::new();
    let statements = resolver::resolve(statements, &mut symbols)?;
    let words = codegen::generate(&statements)?;

    info!(
        "assembled {} word(s), {} symbol(s) defined by the program",
        words.len(),
        symbols.user_defined()
    );
    Ok(Assembly { statements, words, symbols })
}
