//! This AST describes a parsed Hack assembly file.
//!
//! Execution begins with the first instruction in the file.
//! Comments are prefixed with a double slash (//) and are single-line only.
//! Statements are delimited by newlines.
//!
//! Supported statements:
//!
//! ```nasm
//! @value          // A-instruction: load a 15-bit constant into A
//! @symbol         // A-instruction: load a label or variable address into A
//! (LABEL)         // L-instruction: name the ROM address of the next instruction
//! dest=comp;jump  // C-instruction: both dest= and ;jump are optional
//! ```
//!
//! Example source file:
//!
//! ```nasm
//! // Adds 1 + ... + 100 into sum.
//!     @i
//!     M=1         // i = 1 (i is a variable, allocated at RAM[16])
//!     @sum
//!     M=0
//! (LOOP)
//!     @i
//!     D=M
//!     @100
//!     D=D-A
//!     @END
//!     D;JGT       // labels may be used before they are defined
//!     @i
//!     D=M
//!     @sum
//!     M=D+M
//!     @i
//!     M=M+1
//!     @LOOP
//!     0;JMP
//! (END)
//!     @END
//!     0;JMP
//! ```

use std::fmt;

/// A parsed statement together with the line it was written on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Statement {
    pub instruction: Instruction,
    pub line: usize,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.instruction)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    A(Operand),
    L(String),
    C { dest: Dest, comp: Comp, jump: Jump },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::A(operand) => write!(f, "@{}", operand),
            Instruction::L(label) => write!(f, "({})", label),
            Instruction::C { dest, comp, jump } => {
                if *dest != Dest::Null {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if *jump != Jump::Null {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    /// A 15-bit constant or an already resolved address.
    Literal(u16),
    /// A label or variable that still has to be resolved.
    Symbol(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Symbol(name) => write!(f, "{}", name),
        }
    }
}

/// The destination field of a C-instruction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dest {
    Null,
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    /// Builds the dest from the registers it names, in any order.
    pub fn from_registers(a: bool, d: bool, m: bool) -> Dest {
        match (a, d, m) {
            (false, false, false) => Dest::Null,
            (false, false, true) => Dest::M,
            (false, true, false) => Dest::D,
            (false, true, true) => Dest::MD,
            (true, false, false) => Dest::A,
            (true, false, true) => Dest::AM,
            (true, true, false) => Dest::AD,
            (true, true, true) => Dest::AMD,
        }
    }

    /// The 3-bit dest code: A is bit 2, D bit 1 and M bit 0.
    pub fn bits(self) -> u16 {
        match self {
            Dest::Null => 0b000,
            Dest::M => 0b001,
            Dest::D => 0b010,
            Dest::MD => 0b011,
            Dest::A => 0b100,
            Dest::AM => 0b101,
            Dest::AD => 0b110,
            Dest::AMD => 0b111,
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Dest::Null => Ok(()),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// The jump field of a C-instruction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Jump {
    Null,
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl Jump {
    pub fn bits(self) -> u16 {
        match self {
            Jump::Null => 0b000,
            Jump::JGT => 0b001,
            Jump::JEQ => 0b010,
            Jump::JGE => 0b011,
            Jump::JLT => 0b100,
            Jump::JNE => 0b101,
            Jump::JLE => 0b110,
            Jump::JMP => 0b111,
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Jump::Null => Ok(()),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A register that may appear in a comp expression.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Register {
    A,
    D,
    M,
}

/// A single operand of a comp expression, before it is checked
/// against the comp table.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Term {
    Reg(Register),
    Num(u32),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Reg(reg) => write!(f, "{:?}", reg),
            Term::Num(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::And => '&',
            BinaryOp::Or => '|',
        };
        write!(f, "{}", c)
    }
}

/// The shape of a comp expression as written in the source.
/// Only the shapes listed in [`Comp`] can be encoded.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CompExpr {
    Term(Term),
    Not(Term),
    Neg(Term),
    Binary(Term, BinaryOp, Term),
}

impl CompExpr {
    /// Returns the first numeric literal outside {0, 1}, if any.
    /// Negation of 1 is handled by the `Neg` shape, so -1 never shows up here.
    pub fn bad_literal(&self) -> Option<u32> {
        let terms = match *self {
            CompExpr::Term(t) | CompExpr::Not(t) | CompExpr::Neg(t) => [Some(t), None],
            CompExpr::Binary(l, _, r) => [Some(l), Some(r)],
        };
        terms.iter().flatten().find_map(|t| match t {
            Term::Num(n) if *n > 1 => Some(*n),
            _ => None,
        })
    }
}

impl fmt::Display for CompExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompExpr::Term(t) => write!(f, "{}", t),
            CompExpr::Not(t) => write!(f, "!{}", t),
            CompExpr::Neg(t) => write!(f, "-{}", t),
            CompExpr::Binary(l, op, r) => write!(f, "{}{}{}", l, op, r),
        }
    }
}

/// Every computation the Hack ALU can perform.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    pub const ALL: [Comp; 28] = [
        Comp::Zero,
        Comp::One,
        Comp::MinusOne,
        Comp::D,
        Comp::A,
        Comp::M,
        Comp::NotD,
        Comp::NotA,
        Comp::NotM,
        Comp::NegD,
        Comp::NegA,
        Comp::NegM,
        Comp::DPlusOne,
        Comp::APlusOne,
        Comp::MPlusOne,
        Comp::DMinusOne,
        Comp::AMinusOne,
        Comp::MMinusOne,
        Comp::DPlusA,
        Comp::DPlusM,
        Comp::DMinusA,
        Comp::DMinusM,
        Comp::AMinusD,
        Comp::MMinusD,
        Comp::DAndA,
        Comp::DAndM,
        Comp::DOrA,
        Comp::DOrM,
    ];

    /// Looks up the comp for a written expression.
    /// Returns None for shapes the ALU has no encoding for.
    pub fn from_expr(expr: CompExpr) -> Option<Comp> {
        use BinaryOp::*;
        use CompExpr as E;
        use Register::{A, D, M};
        use Term::{Num, Reg};

        let comp = match expr {
            E::Term(Num(0)) => Comp::Zero,
            E::Term(Num(1)) => Comp::One,
            E::Neg(Num(1)) => Comp::MinusOne,
            E::Term(Reg(D)) => Comp::D,
            E::Term(Reg(A)) => Comp::A,
            E::Term(Reg(M)) => Comp::M,
            E::Not(Reg(D)) => Comp::NotD,
            E::Not(Reg(A)) => Comp::NotA,
            E::Not(Reg(M)) => Comp::NotM,
            E::Neg(Reg(D)) => Comp::NegD,
            E::Neg(Reg(A)) => Comp::NegA,
            E::Neg(Reg(M)) => Comp::NegM,
            E::Binary(Reg(D), Add, Num(1)) => Comp::DPlusOne,
            E::Binary(Reg(A), Add, Num(1)) => Comp::APlusOne,
            E::Binary(Reg(M), Add, Num(1)) => Comp::MPlusOne,
            E::Binary(Reg(D), Sub, Num(1)) => Comp::DMinusOne,
            E::Binary(Reg(A), Sub, Num(1)) => Comp::AMinusOne,
            E::Binary(Reg(M), Sub, Num(1)) => Comp::MMinusOne,
            E::Binary(Reg(D), Add, Reg(A)) => Comp::DPlusA,
            E::Binary(Reg(D), Add, Reg(M)) => Comp::DPlusM,
            E::Binary(Reg(D), Sub, Reg(A)) => Comp::DMinusA,
            E::Binary(Reg(D), Sub, Reg(M)) => Comp::DMinusM,
            E::Binary(Reg(A), Sub, Reg(D)) => Comp::AMinusD,
            E::Binary(Reg(M), Sub, Reg(D)) => Comp::MMinusD,
            E::Binary(Reg(D), And, Reg(A)) => Comp::DAndA,
            E::Binary(Reg(D), And, Reg(M)) => Comp::DAndM,
            E::Binary(Reg(D), Or, Reg(A)) => Comp::DOrA,
            E::Binary(Reg(D), Or, Reg(M)) => Comp::DOrM,
            _ => return None,
        };

        Some(comp)
    }

    /// The 7-bit comp code: the a-bit (M instead of A) followed by c1..c6.
    pub fn bits(self) -> u16 {
        use Comp::*;
        match self {
            Zero => 0b0_101010,
            One => 0b0_111111,
            MinusOne => 0b0_111010,
            D => 0b0_001100,
            A => 0b0_110000,
            M => 0b1_110000,
            NotD => 0b0_001101,
            NotA => 0b0_110001,
            NotM => 0b1_110001,
            NegD => 0b0_001111,
            NegA => 0b0_110011,
            NegM => 0b1_110011,
            DPlusOne => 0b0_011111,
            APlusOne => 0b0_110111,
            MPlusOne => 0b1_110111,
            DMinusOne => 0b0_001110,
            AMinusOne => 0b0_110010,
            MMinusOne => 0b1_110010,
            DPlusA => 0b0_000010,
            DPlusM => 0b1_000010,
            DMinusA => 0b0_010011,
            DMinusM => 0b1_010011,
            AMinusD => 0b0_000111,
            MMinusD => 0b1_000111,
            DAndA => 0b0_000000,
            DAndM => 0b1_000000,
            DOrA => 0b0_010101,
            DOrM => 0b1_010101,
        }
    }

    /// The canonical mnemonic, e.g. `D+M`.
    pub fn mnemonic(self) -> &'static str {
        use Comp::*;
        match self {
            Zero => "0",
            One => "1",
            MinusOne => "-1",
            D => "D",
            A => "A",
            M => "M",
            NotD => "!D",
            NotA => "!A",
            NotM => "!M",
            NegD => "-D",
            NegA => "-A",
            NegM => "-M",
            DPlusOne => "D+1",
            APlusOne => "A+1",
            MPlusOne => "M+1",
            DMinusOne => "D-1",
            AMinusOne => "A-1",
            MMinusOne => "M-1",
            DPlusA => "D+A",
            DPlusM => "D+M",
            DMinusA => "D-A",
            DMinusM => "D-M",
            AMinusD => "A-D",
            MMinusD => "M-D",
            DAndA => "D&A",
            DAndM => "D&M",
            DOrA => "D|A",
            DOrM => "D|M",
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
