//! The Parser module takes the token stream from the Lexer
//! and converts it into a list of statements.
//!
//! Statements end at the end of their source line. When a statement fails
//! to parse, the error is recorded, the rest of its line is discarded and
//! parsing resumes on the next line, so one run reports every bad statement.
use super::ast::*;
use super::codegen::MAX_ADDRESS;
use super::error::Error;
use super::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'a> {
    tokens: Lexer<'a>,
    peeked: Option<Token>,
    statements: Vec<Statement>,
    errors: Vec<Error>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Lexer<'a>) -> Self {
        Parser { tokens, peeked: None, statements: Vec::with_capacity(256), errors: Vec::new() }
    }

    /// Run the parser, consuming itself and returning the list of statements,
    /// or every lexical, syntax and encoding error found along the way.
    pub fn run(mut self) -> Result<Vec<Statement>, Vec<Error>> {
        'mainloop: loop {
            match self.statement() {
                Ok(Some(st)) => {
                    trace!("line {}: {}", st.line, st);
                    self.statements.push(st)
                }
                Ok(None) => break 'mainloop,
                Err(e) => {
                    let line = e.line();
                    self.errors.push(e);
                    self.skip_line(line);
                }
            };
        }

        if !self.errors.is_empty() {
            debug!("parser stopped with {} error(s)", self.errors.len());
            return Err(self.errors);
        }

        debug!("parsed {} statement(s)", self.statements.len());
        Ok(self.statements)
    }

    /// Consumes the tokens of one statement to produce a Statement.
    fn statement(&mut self) -> Result<Option<Statement>, Error> {
        let first = match self.consume() {
            Some(tok) => tok,
            // No tokens left to parse means we're out of statements.
            None => return Ok(None),
        };
        let line = first.line;

        let instruction = match first.kind {
            TokenKind::At => self.a_instruction(line)?,
            TokenKind::LParen => self.l_instruction(line)?,
            _ => self.c_instruction(first)?,
        };

        if let Some(tok) = self.consume_on(line) {
            return Err(unexpected(&tok, "end of line"));
        }

        Ok(Some(Statement { instruction, line }))
    }

    /// `@` has been consumed; parses the operand.
    fn a_instruction(&mut self, line: usize) -> Result<Instruction, Error> {
        let tok = self.expect_on(line, "a symbol or number after `@`")?;

        match tok.kind {
            TokenKind::Number => match tok.number() {
                Some(value) if value <= u32::from(MAX_ADDRESS) => Ok(Instruction::A(Operand::Literal(value as u16))),
                _ => Err(Error::AddressOutOfRange { value: tok.text, line }),
            },
            TokenKind::Symbol => Ok(Instruction::A(Operand::Symbol(tok.text))),
            _ => Err(unexpected(&tok, "a symbol or number after `@`")),
        }
    }

    /// `(` has been consumed; parses the label and the closing paren.
    fn l_instruction(&mut self, line: usize) -> Result<Instruction, Error> {
        let tok = self.expect_on(line, "a label name")?;
        if tok.kind != TokenKind::Symbol {
            return Err(unexpected(&tok, "a label name"));
        }

        let close = self.expect_on(line, "`)`")?;
        if close.kind != TokenKind::RParen {
            return Err(unexpected(&close, "`)`"));
        }

        Ok(Instruction::L(tok.text))
    }

    /// Parses `[dest=]comp[;jump]` starting from its first token.
    fn c_instruction(&mut self, first: Token) -> Result<Instruction, Error> {
        let line = first.line;
        let mut first = first;

        let dest = if first.kind.is_register_set() && self.peek_kind_on(line) == Some(TokenKind::Equal) {
            self.consume();
            let dest = Dest::from_registers(
                first.text.contains('A'),
                first.text.contains('D'),
                first.text.contains('M'),
            );
            first = self.expect_on(line, "a comp expression")?;
            dest
        } else {
            Dest::Null
        };

        let comp = self.comp(first)?;

        let jump = if self.peek_kind_on(line) == Some(TokenKind::Semi) {
            self.consume();
            let tok = self.expect_on(line, "a jump mnemonic")?;
            jump(&tok)?
        } else {
            Jump::Null
        };

        Ok(Instruction::C { dest, comp, jump })
    }

    /// Parses a comp expression and looks up its encoding.
    fn comp(&mut self, first: Token) -> Result<Comp, Error> {
        let line = first.line;

        let lhs = match first.kind {
            TokenKind::Not => CompExpr::Not(self.term(line)?),
            TokenKind::Minus => CompExpr::Neg(self.term(line)?),
            _ => CompExpr::Term(term(&first)?),
        };

        let op = self.peek_kind_on(line).and_then(binary_op);
        let expr = match (lhs, op) {
            (CompExpr::Term(l), Some(op)) => {
                self.consume();
                CompExpr::Binary(l, op, self.term(line)?)
            }
            _ => lhs,
        };

        if let Some(n) = expr.bad_literal() {
            return Err(Error::InvalidLiteral { value: n.to_string(), line });
        }

        match Comp::from_expr(expr) {
            Some(comp) => Ok(comp),
            None => Err(Error::InvalidComp { expr: expr.to_string(), line }),
        }
    }

    fn term(&mut self, line: usize) -> Result<Term, Error> {
        let tok = self.expect_on(line, "a register or literal")?;
        term(&tok)
    }

    /// Discards whatever is left of `line`.
    fn skip_line(&mut self, line: usize) {
        while self.consume_on(line).is_some() {}
    }

    /// Pops a token off the input stream and returns it.
    /// Lexical errors met on the way are recorded and skipped.
    /// Returns None if no tokens are left.
    fn consume(&mut self) -> Option<Token> {
        if let Some(tok) = self.peeked.take() {
            return Some(tok);
        }

        for item in &mut self.tokens {
            match item {
                Ok(tok) => return Some(tok),
                Err(e) => self.errors.push(e),
            }
        }
        None
    }

    fn peek(&mut self) -> Option<&Token> {
        if self.peeked.is_none() {
            self.peeked = self.consume();
        }
        self.peeked.as_ref()
    }

    fn peek_kind_on(&mut self, line: usize) -> Option<TokenKind> {
        match self.peek() {
            Some(tok) if tok.line == line => Some(tok.kind),
            _ => None,
        }
    }

    /// Pops the next token only if it is still on `line`.
    fn consume_on(&mut self, line: usize) -> Option<Token> {
        self.peek_kind_on(line)?;
        self.consume()
    }

    fn expect_on(&mut self, line: usize, expected: &'static str) -> Result<Token, Error> {
        match self.consume_on(line) {
            Some(tok) => Ok(tok),
            None => Err(Error::UnexpectedEndOfLine { expected, line }),
        }
    }
}

/// Parses every statement of `source`.
pub fn parse(source: &str) -> Result<Vec<Statement>, Vec<Error>> {
    Parser::new(Lexer::new(source)).run()
}

fn unexpected(tok: &Token, expected: &'static str) -> Error {
    Error::UnexpectedToken { found: format!("`{}`", tok.text), expected, line: tok.line }
}

fn term(tok: &Token) -> Result<Term, Error> {
    match tok.kind {
        TokenKind::A => Ok(Term::Reg(Register::A)),
        TokenKind::D => Ok(Term::Reg(Register::D)),
        TokenKind::M => Ok(Term::Reg(Register::M)),
        TokenKind::Number => match tok.number() {
            Some(n) => Ok(Term::Num(n)),
            None => Err(Error::InvalidLiteral { value: tok.text.clone(), line: tok.line }),
        },
        _ => Err(unexpected(tok, "a register or literal")),
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        _ => None,
    }
}

fn jump(tok: &Token) -> Result<Jump, Error> {
    match tok.kind {
        TokenKind::JGT => Ok(Jump::JGT),
        TokenKind::JEQ => Ok(Jump::JEQ),
        TokenKind::JGE => Ok(Jump::JGE),
        TokenKind::JLT => Ok(Jump::JLT),
        TokenKind::JNE => Ok(Jump::JNE),
        TokenKind::JLE => Ok(Jump::JLE),
        TokenKind::JMP => Ok(Jump::JMP),
        _ => Err(unexpected(tok, "a jump mnemonic")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> Instruction {
        let mut statements = parse(source).unwrap();
        assert_eq!(statements.len(), 1);
        statements.remove(0).instruction
    }

    fn c(dest: Dest, comp: Comp, jump: Jump) -> Instruction {
        Instruction::C { dest, comp, jump }
    }

    #[test]
    fn test_a_instruction() {
        assert_eq!(single("@2"), Instruction::A(Operand::Literal(2)));
        assert_eq!(single("@32767"), Instruction::A(Operand::Literal(32767)));
        assert_eq!(single("@LOOP"), Instruction::A(Operand::Symbol("LOOP".to_owned())));
        assert_eq!(single("@R15"), Instruction::A(Operand::Symbol("R15".to_owned())));

        assert_eq!(
            parse("@32768"),
            Err(vec![Error::AddressOutOfRange { value: "32768".to_owned(), line: 1 }])
        );
        assert_eq!(
            parse("@99999999999"),
            Err(vec![Error::AddressOutOfRange { value: "99999999999".to_owned(), line: 1 }])
        );
        assert_eq!(
            parse("@\nD=A"),
            Err(vec![Error::UnexpectedEndOfLine { expected: "a symbol or number after `@`", line: 1 }])
        );
    }

    #[test]
    fn test_l_instruction() {
        assert_eq!(single("(LOOP)"), Instruction::L("LOOP".to_owned()));
        assert_eq!(
            parse("(LOOP"),
            Err(vec![Error::UnexpectedEndOfLine { expected: "`)`", line: 1 }])
        );
        assert_eq!(
            parse("(12)"),
            Err(vec![Error::UnexpectedToken {
                found: "`12`".to_owned(),
                expected: "a label name",
                line: 1
            }])
        );
    }

    #[test]
    fn test_c_instruction_fields() {
        assert_eq!(single("D=A"), c(Dest::D, Comp::A, Jump::Null));
        assert_eq!(single("0;JMP"), c(Dest::Null, Comp::Zero, Jump::JMP));
        assert_eq!(single("AMD=M+1;JNE"), c(Dest::AMD, Comp::MPlusOne, Jump::JNE));
        assert_eq!(single("D;JGT"), c(Dest::Null, Comp::D, Jump::JGT));
        assert_eq!(single("M=-1"), c(Dest::M, Comp::MinusOne, Jump::Null));
        assert_eq!(single("A=!D"), c(Dest::A, Comp::NotD, Jump::Null));
        assert_eq!(single("D=D-1"), c(Dest::D, Comp::DMinusOne, Jump::Null));
        assert_eq!(single("D=D|M"), c(Dest::D, Comp::DOrM, Jump::Null));
        assert_eq!(single("M = D & A ; JLE"), c(Dest::M, Comp::DAndA, Jump::JLE));
    }

    #[test]
    fn test_dest_spellings() {
        assert_eq!(single("DM=0"), c(Dest::MD, Comp::Zero, Jump::Null));
        assert_eq!(single("MD=0"), c(Dest::MD, Comp::Zero, Jump::Null));
        assert_eq!(single("ADM=0"), c(Dest::AMD, Comp::Zero, Jump::Null));
        assert_eq!(single("AD=0"), c(Dest::AD, Comp::Zero, Jump::Null));
        assert_eq!(single("AM=0"), c(Dest::AM, Comp::Zero, Jump::Null));
    }

    #[test]
    fn test_every_comp_mnemonic_parses() {
        for comp in Comp::ALL.iter() {
            let source = format!("D={}", comp.mnemonic());
            assert_eq!(single(&source), c(Dest::D, *comp, Jump::Null), "{}", source);
        }
    }

    #[test]
    fn test_invalid_comp() {
        assert_eq!(
            parse("D=A+D"),
            Err(vec![Error::InvalidComp { expr: "A+D".to_owned(), line: 1 }])
        );
        assert_eq!(parse("D=-0"), Err(vec![Error::InvalidComp { expr: "-0".to_owned(), line: 1 }]));
        assert_eq!(
            parse("D=D+2"),
            Err(vec![Error::InvalidLiteral { value: "2".to_owned(), line: 1 }])
        );
        assert_eq!(parse("D=5"), Err(vec![Error::InvalidLiteral { value: "5".to_owned(), line: 1 }]));
        assert_eq!(parse("M=-2"), Err(vec![Error::InvalidLiteral { value: "2".to_owned(), line: 1 }]));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            parse("AD;JMP"),
            Err(vec![Error::UnexpectedToken {
                found: "`AD`".to_owned(),
                expected: "a register or literal",
                line: 1
            }])
        );
        assert_eq!(
            parse("D=A;"),
            Err(vec![Error::UnexpectedEndOfLine { expected: "a jump mnemonic", line: 1 }])
        );
        assert_eq!(
            parse("0;D"),
            Err(vec![Error::UnexpectedToken {
                found: "`D`".to_owned(),
                expected: "a jump mnemonic",
                line: 1
            }])
        );
        assert_eq!(
            parse("@2 D=A"),
            Err(vec![Error::UnexpectedToken { found: "`D`".to_owned(), expected: "end of line", line: 1 }])
        );
    }

    #[test]
    fn test_statements_end_at_newline() {
        let statements = parse("D=A\nM=D\n(END)\n0;JMP").unwrap();
        let lines: Vec<usize> = statements.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
        assert_eq!(statements[1].instruction, c(Dest::M, Comp::D, Jump::Null));

        // The dest on line 1 must not swallow the comp on line 2.
        assert_eq!(
            parse("D=\nA"),
            Err(vec![Error::UnexpectedEndOfLine { expected: "a comp expression", line: 1 }])
        );
    }

    #[test]
    fn test_collects_all_errors() {
        let source = "@1\nD=A+D junk\n@2#\nM=D;JXX\n0;JMP";
        let errors = parse(source).unwrap_err();
        assert_eq!(
            errors,
            vec![
                Error::InvalidComp { expr: "A+D".to_owned(), line: 2 },
                Error::IllegalCharacter { ch: '#', line: 3 },
                Error::UnexpectedToken {
                    found: "`JXX`".to_owned(),
                    expected: "a jump mnemonic",
                    line: 4
                },
            ]
        );
    }

    #[test]
    fn test_lexical_errors_alone_fail_the_parse() {
        assert_eq!(parse("@1 %"), Err(vec![Error::IllegalCharacter { ch: '%', line: 1 }]));
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(parse(""), Ok(vec![]));
        assert_eq!(parse("// nothing here\n\n   \n"), Ok(vec![]));
    }
}
