//! Memory tape for the interpreters
//!
//! A fixed array of [`TAPE_SIZE`] wrapping byte cells and a data pointer.
//! Every pointer move is bounds-checked; leaving `[0, TAPE_SIZE)` fails with
//! `OutOfRangeTapeAccess` carrying the pointer value the move would produce.

use std::io::{self, Read, Write};

use core_types::{BfError, BfResult, TAPE_SIZE};

/// Tape cells plus the data pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTape {
    cells: Vec<u8>,
    pointer: usize,
}

impl MemoryTape {
    /// Create a zeroed tape with the pointer on cell 0
    pub fn new() -> Self {
        Self {
            cells: vec![0; TAPE_SIZE],
            pointer: 0,
        }
    }

    /// Current data pointer
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// All cells
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cell at `index`, if it is on the tape
    pub fn cell(&self, index: usize) -> Option<u8> {
        self.cells.get(index).copied()
    }

    /// Value of the cell under the pointer
    #[inline]
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    /// Overwrite the cell under the pointer
    #[inline]
    pub fn set_current(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    /// Add to the current cell modulo 256
    #[inline]
    pub fn add(&mut self, amount: u8) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(amount);
    }

    /// Subtract from the current cell modulo 256
    #[inline]
    pub fn sub(&mut self, amount: u8) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(amount);
    }

    /// Tape index `delta` cells away from the pointer
    pub fn offset_index(&self, delta: i64) -> BfResult<usize> {
        let target = self.pointer as i64 + delta;
        if target < 0 || target >= TAPE_SIZE as i64 {
            return Err(BfError::out_of_range(target));
        }
        Ok(target as usize)
    }

    /// Move the pointer by `delta` cells
    ///
    /// On failure the pointer is left where it was.
    #[inline]
    pub fn move_by(&mut self, delta: i64) -> BfResult<()> {
        self.pointer = self.offset_index(delta)?;
        Ok(())
    }

    /// Place the pointer at `index`
    pub fn set_pointer(&mut self, index: usize) -> BfResult<()> {
        if index >= TAPE_SIZE {
            return Err(BfError::out_of_range(index as i64));
        }
        self.pointer = index;
        Ok(())
    }

    /// Move by `step` until the current cell is zero (`[>]`, `[<<]`)
    pub fn scan_until_zero(&mut self, step: i64) -> BfResult<()> {
        while self.current() != 0 {
            self.move_by(step)?;
        }
        Ok(())
    }

    /// Add the current cell to the cell `delta` away, then zero it (`[->+<]`)
    ///
    /// Nothing is touched, and no bounds check happens, when the current
    /// cell is already zero.
    pub fn transfer_and_zero(&mut self, delta: i64) -> BfResult<()> {
        let value = self.current();
        if value == 0 {
            return Ok(());
        }
        let target = self.offset_index(delta)?;
        self.cells[target] = self.cells[target].wrapping_add(value);
        self.set_current(0);
        Ok(())
    }

    /// Write the current cell as one byte
    pub fn write_current<W: Write + ?Sized>(&self, output: &mut W) -> BfResult<()> {
        output.write_all(&[self.current()])?;
        Ok(())
    }

    /// Read one byte into the current cell
    ///
    /// At end of input the cell keeps its value.
    pub fn read_current<R: Read + ?Sized>(&mut self, input: &mut R) -> BfResult<()> {
        let mut byte = [0u8; 1];
        loop {
            match input.read(&mut byte) {
                Ok(0) => return Ok(()),
                Ok(_) => {
                    self.set_current(byte[0]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Base address of the cells, for native code
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.cells.as_mut_ptr()
    }

    /// Zero every cell and return the pointer to cell 0
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.pointer = 0;
    }
}

impl Default for MemoryTape {
    fn default() -> Self {
        Self::new()
    }
}
