#![no_std]

//! driver for 20x4 serial character lcd (newhaven style) attached to a uart
//!
//! the display speaks a tiny byte protocol:
//! ```text
//! 0xFE <cmd>          command
//! 0xFE 0x45 <addr>    set cursor to absolute address
//! <bytes>             characters written at the cursor
//! ```
//! this driver is write-only, there's no return channel from the display
//! it doesn't track the current position or keep a frame buffer,
//! the display itself holds all the state
//! you should use set_cursor to change line and position
//!
//! every command is followed by a settle delay (5ms by default),
//! the display drops bytes that arrive while it's still executing a command
//!
//! transport is waited on with busy polling, if the link never becomes ready
//! the driver blocks forever. use `send_byte_bounded` if that matters to you
//!
//! example
//! ```rust,ignore
//! let mut lcd = blocking::Lcd::new(Serial::new(tx), delay, LinkConfig::default(), LcdConfig::default())?;
//!
//! lcd.display_on()?;
//! lcd.clear()?;
//! lcd.home()?;
//! lcd.send_text("This is my LCD")?;
//! lcd.set_cursor(1, 0)?;
//! lcd.send_text("second line")?;
//! ```

#[cfg(test)]
extern crate std;

use core::fmt::{Debug, Formatter};
use embedded_io_async::ErrorKind;

pub mod blocking;
pub mod demo;
pub mod nonblocking;
pub mod transport;
pub mod usart;

pub use transport::{DataBits, LinkConfig, Parity, Serial, StopBits, Transport};

/// prefix of every multi-byte command sequence
pub const ESCAPE: u8 = 0xFE;

/// sub-command following [`ESCAPE`] to move the cursor
pub const SET_CURSOR: u8 = 0x45;

pub const ROWS: u8 = 4;
pub const COLUMNS: u8 = 20;

/// first address of each row, rows are not contiguous in display memory
pub const ROW_BASE: [u8; ROWS as usize] = [0, 64, 20, 84];

/// 5ms, the display needs it after every command
pub const DEFAULT_SETTLE_US: u16 = 5000;

/// commands used by the demo application, values belong to the display's command set
/// any other byte can be sent with `send_command`
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    DisplayOn   = 0x41,
    ClearScreen = 0x51,
    Home        = 0x46
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command as u8
    }
}

/// a cell on the display, always in range once constructed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    row: u8,
    column: u8
}

impl Position {
    /// out of range values are clamped to the last row/column, never wrapped
    pub fn new(row: u8, column: u8) -> Self {
        Self {
            row: row.min(ROWS - 1),
            column: column.min(COLUMNS - 1)
        }
    }

    /// cell `index` counted row by row from the top left, wraps every 80 cells
    pub fn from_cell(index: u64) -> Self {
        let index = (index % (ROWS as u64 * COLUMNS as u64)) as u8;
        Self {
            row: index / COLUMNS,
            column: index % COLUMNS
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn cell(&self) -> u64 {
        self.row as u64 * COLUMNS as u64 + self.column as u64
    }

    /// absolute address used by the set cursor command
    pub fn address(&self) -> u8 {
        ROW_BASE[self.row as usize] + self.column
    }
}

/// absolute cursor address of (row, column), out of range input is clamped
pub fn cursor_address(row: u8, column: u8) -> u8 {
    Position::new(row, column).address()
}

/// driver level errors, `E` is whatever the transport reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Transport(E),
    /// the transport didn't become ready within the allowed number of polls
    LinkTimeout
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Self::Transport(e)
    }
}

/// settle timing of the display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LcdConfig {
    /// delay after every command or cursor move, microseconds
    pub settle_us: u16,
    /// readiness polls allowed per byte before `Error::LinkTimeout`
    /// `None` waits forever
    pub max_polls: Option<u32>
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            settle_us: DEFAULT_SETTLE_US,
            max_polls: None
        }
    }
}

pub(crate) fn text_bytes(text: &str) -> &[u8] {
    let bytes = text.as_bytes();
    // the display protocol is null terminated, nothing after a nul is sent
    match bytes.iter().position(|b| *b == 0) {
        Some(end) => &bytes[..end],
        None => bytes
    }
}

pub struct LcdIOError<T>(pub Option<T>, pub ErrorKind);

impl<T> embedded_io_async::Error for LcdIOError<T> {
    fn kind(&self) -> ErrorKind {
        self.1
    }
}

impl<T> Debug for LcdIOError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        (self.1).fmt(f)
    }
}
