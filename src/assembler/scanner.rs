use crate::bytecode::{Instruction, Program};
use crate::error::{Error, Result};

/// Literal spellings of the self-clearing loop
const CLEAR_IDIOMS: [&[u8]; 2] = [b"[-]", b"[+]"];

/// Open loop awaiting its close
#[derive(Debug, Clone, Copy)]
struct OpenLoop {
    /// Index of the first body instruction (one past the open jump)
    body_start: usize,
    /// Byte offset of the `[` in the source
    position: usize,
}

/// Single-pass assembler for tape programs
pub struct Assembler<'a> {
    /// Raw source bytes
    source: &'a [u8],
    /// Current position in source
    current: usize,
    /// Instructions emitted so far
    program: Program,
    /// Loops opened but not yet closed
    open_loops: Vec<OpenLoop>,
    /// Net `+`/`-` run not yet emitted
    pending_add: i64,
    /// Net `>`/`<` run not yet emitted
    pending_shift: i64,
}

impl<'a> Assembler<'a> {
    /// Creates a new assembler over source bytes
    pub fn new(source: &'a [u8]) -> Self {
        Assembler {
            source,
            current: 0,
            program: Program::new(),
            open_loops: Vec::new(),
            pending_add: 0,
            pending_shift: 0,
        }
    }

    /// Assembles the whole source and returns the program
    pub fn assemble(mut self) -> Result<Program> {
        while !self.is_at_end() {
            self.scan_symbol()?;
        }
        self.flush_add();
        self.flush_shift();

        if let Some(open) = self.open_loops.pop() {
            return Err(Error::UnmatchedOpen {
                position: open.position,
            });
        }

        tracing::debug!(
            source_bytes = self.source.len(),
            instructions = self.program.len(),
            "assembled program"
        );
        Ok(self.program)
    }

    fn scan_symbol(&mut self) -> Result<()> {
        let position = self.current;
        let c = self.advance();

        match c {
            b'+' => {
                self.flush_shift();
                self.pending_add += 1;
            }
            b'-' => {
                self.flush_shift();
                self.pending_add -= 1;
            }
            b'>' => {
                self.flush_add();
                self.pending_shift += 1;
            }
            b'<' => {
                self.flush_add();
                self.pending_shift -= 1;
            }
            b'[' | b']' | b',' | b'.' => {
                self.flush_add();
                self.flush_shift();
                match c {
                    b'[' => self.open_loop(position),
                    b']' => self.close_loop(position)?,
                    b',' => self.program.push(Instruction::Input),
                    _ => self.program.push(Instruction::Output),
                }
            }
            // Comments
            _ => {}
        }

        Ok(())
    }

    fn open_loop(&mut self, position: usize) {
        // `[-]` and `[+]` are matched literally, never as a loop
        if CLEAR_IDIOMS
            .iter()
            .any(|idiom| self.source[position..].starts_with(idiom))
        {
            self.current = position + 3;
            self.program.push(Instruction::clear());
            return;
        }

        self.program.push(Instruction::open(Instruction::UNRESOLVED));
        self.open_loops.push(OpenLoop {
            body_start: self.program.len(),
            position,
        });
    }

    fn close_loop(&mut self, position: usize) -> Result<()> {
        let Some(open) = self.open_loops.pop() else {
            return Err(Error::UnmatchedClose { position });
        };

        self.program.push(Instruction::close(open.body_start));
        let after_close = self.program.len();
        self.program.instructions_mut()[open.body_start - 1] = Instruction::open(after_close);
        Ok(())
    }

    fn flush_add(&mut self) {
        let net = std::mem::take(&mut self.pending_add);
        // Cells wrap at 32 bits, so the magnitude only matters modulo 2^32
        let magnitude = net.unsigned_abs() as u32;
        if net > 0 {
            self.program.push(Instruction::Inc(magnitude));
        } else if net < 0 {
            self.program.push(Instruction::Dec(magnitude));
        }
    }

    fn flush_shift(&mut self) {
        let net = std::mem::take(&mut self.pending_shift);
        // Pointer moves do not wrap at 32 bits, so oversized runs are split
        let mut remaining = net.unsigned_abs();
        while remaining > 0 {
            let chunk = remaining.min(i32::MAX as u64);
            remaining -= chunk;
            let magnitude = chunk as i32;
            if net > 0 {
                self.program.push(Instruction::ShiftRight(magnitude));
            } else {
                self.program.push(Instruction::ShiftLeft(magnitude));
            }
        }
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::JumpCondition;

    fn assemble(source: &str) -> Result<Program> {
        Assembler::new(source.as_bytes()).assemble()
    }

    #[test]
    fn test_runs_coalesce() {
        let program = assemble("+++--").unwrap();
        assert_eq!(&program[..], &[Instruction::Inc(1)]);

        let program = assemble("+----").unwrap();
        assert_eq!(&program[..], &[Instruction::Dec(3)]);

        let program = assemble(">><<<").unwrap();
        assert_eq!(&program[..], &[Instruction::ShiftLeft(1)]);
    }

    #[test]
    fn test_balanced_run_emits_nothing() {
        assert!(assemble("++--").unwrap().is_empty());
        assert!(assemble("><").unwrap().is_empty());
    }

    #[test]
    fn test_comments_do_not_split_runs() {
        let program = assemble("+ comment +\n+").unwrap();
        assert_eq!(&program[..], &[Instruction::Inc(3)]);
    }

    #[test]
    fn test_class_change_flushes() {
        let program = assemble("++>+").unwrap();
        assert_eq!(
            &program[..],
            &[
                Instruction::Inc(2),
                Instruction::ShiftRight(1),
                Instruction::Inc(1)
            ]
        );
    }

    #[test]
    fn test_oversized_shift_run_is_split() {
        let mut assembler = Assembler::new(b"");
        assembler.pending_shift = i64::from(i32::MAX) + 5;
        assembler.flush_shift();
        assert_eq!(
            &assembler.program[..],
            &[Instruction::ShiftRight(i32::MAX), Instruction::ShiftRight(5)]
        );

        let mut assembler = Assembler::new(b"");
        assembler.pending_shift = -2 * i64::from(i32::MAX);
        assembler.flush_shift();
        assert_eq!(
            &assembler.program[..],
            &[Instruction::ShiftLeft(i32::MAX), Instruction::ShiftLeft(i32::MAX)]
        );
    }

    #[test]
    fn test_clear_idioms() {
        assert_eq!(&assemble("[-]").unwrap()[..], &[Instruction::clear()]);
        assert_eq!(&assemble("[+]").unwrap()[..], &[Instruction::clear()]);
    }

    #[test]
    fn test_spaced_clear_is_a_loop() {
        let program = assemble("[ - ]").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program[0], Instruction::open(3));
    }

    #[test]
    fn test_star_is_a_comment() {
        assert!(assemble("*").unwrap().is_empty());
    }

    #[test]
    fn test_nested_jumps_resolve() {
        // 0:[ 1:[ 2:- 3:] 4:]
        let program = assemble("[[-->]]").unwrap();
        assert_eq!(program[0], Instruction::open(6));
        assert_eq!(program[1], Instruction::open(5));
        assert_eq!(program[4], Instruction::close(2));
        assert_eq!(program[5], Instruction::close(1));
        assert!(program.check_jumps());
    }

    #[test]
    fn test_unmatched_close() {
        assert_eq!(
            assemble("+]").unwrap_err(),
            Error::UnmatchedClose { position: 1 }
        );
    }

    #[test]
    fn test_unmatched_open() {
        assert_eq!(
            assemble("[[-]").unwrap_err(),
            Error::UnmatchedOpen { position: 0 }
        );
    }

    #[test]
    fn test_close_jump_targets_body() {
        let program = assemble("+[>+<-]").unwrap();
        let Instruction::Jump { condition, target } = program[program.len() - 1] else {
            panic!("expected a close jump");
        };
        assert_eq!(condition, JumpCondition::IfNotZero);
        assert_eq!(target, 2);
    }
}
