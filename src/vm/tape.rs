//! Fixed-size tape

use crate::error::{Error, Result};

/// Fixed-size tape of signed 32-bit cells
///
/// Moving the pointer is never checked; reading or writing a cell outside
/// the tape fails with [`Error::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<i32>,
    pointer: i64,
}

impl Tape {
    /// Create a zeroed tape with the pointer at `start`
    pub fn new(size: usize, start: usize) -> Self {
        Self {
            cells: vec![0; size],
            pointer: start as i64,
        }
    }

    /// Current pointer position, possibly off the tape
    pub fn pointer(&self) -> i64 {
        self.pointer
    }

    /// Move the pointer by a signed amount
    pub fn shift(&mut self, amount: i64) {
        self.pointer = self.pointer.wrapping_add(amount);
    }

    /// Read the cell at `pointer + offset`
    pub fn get(&self, offset: i32) -> Result<i32> {
        let index = self.index(offset)?;
        Ok(self.cells[index])
    }

    /// Mutable access to the cell at `pointer + offset`
    pub fn cell_mut(&mut self, offset: i32) -> Result<&mut i32> {
        let index = self.index(offset)?;
        Ok(&mut self.cells[index])
    }

    /// All cells
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    pub(crate) fn into_cells(self) -> Vec<i32> {
        self.cells
    }

    fn index(&self, offset: i32) -> Result<usize> {
        let absolute = self.pointer.wrapping_add(i64::from(offset));
        usize::try_from(absolute)
            .ok()
            .filter(|&index| index < self.cells.len())
            .ok_or(Error::OutOfBounds {
                pointer: absolute,
                tape_size: self.cells.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_is_unchecked() {
        let mut tape = Tape::new(4, 0);
        tape.shift(-3);
        assert_eq!(tape.pointer(), -3);
        tape.shift(5);
        assert_eq!(tape.get(0).unwrap(), 0);
    }

    #[test]
    fn test_access_is_checked() {
        let mut tape = Tape::new(4, 3);
        assert!(tape.get(0).is_ok());
        assert_eq!(
            tape.get(1).unwrap_err(),
            Error::OutOfBounds {
                pointer: 4,
                tape_size: 4
            }
        );
        tape.shift(-4);
        assert!(tape.cell_mut(0).is_err());
        *tape.cell_mut(2).unwrap() = 9;
        assert_eq!(tape.cells(), &[0, 0, 9, 0]);
    }
}
