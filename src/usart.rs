//! bare register transport for avr (atmega) usarts
//!
//! for boards without a hal, drives the memory mapped usart registers directly

use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};
use crate::{DataBits, LinkConfig, Parity, StopBits, Transport};

/// atmega2560 usart register blocks (data memory addresses)
pub const USART0: usize = 0xC0;
pub const USART1: usize = 0xC8;
pub const USART2: usize = 0xD0;
pub const USART3: usize = 0x130;

// register offsets from the block base
const UCSRA: usize = 0;
const UCSRB: usize = 1;
const UCSRC: usize = 2;
const UBRRL: usize = 4;
const UBRRH: usize = 5;
const UDR: usize = 6;

/// data register empty
const UDRE: u8 = 1 << 5;
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
const UPM1: u8 = 1 << 5;
const UPM0: u8 = 1 << 4;
const USBS: u8 = 1 << 3;
const UCSZ1: u8 = 1 << 2;
const UCSZ0: u8 = 1 << 1;

pub struct Usart {
    base: *mut u8
}

impl Usart {
    /// # Safety
    /// `base` must point at a usart register block (see [`USART3`] etc.)
    /// and nothing else may touch that usart while this exists
    pub unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u8
        }
    }

    fn read(&self, offset: usize) -> u8 {
        unsafe { read_volatile(self.base.add(offset)) }
    }

    fn write_reg(&mut self, offset: usize, value: u8) {
        unsafe { write_volatile(self.base.add(offset), value) }
    }
}

/// frame format bits for the control/status register c
fn frame_format(config: &LinkConfig) -> u8 {
    let size = match config.data_bits {
        DataBits::Five => 0,
        DataBits::Six => UCSZ0,
        DataBits::Seven => UCSZ1,
        DataBits::Eight => UCSZ1 | UCSZ0
    };
    let parity = match config.parity {
        Parity::None => 0,
        Parity::Even => UPM1,
        Parity::Odd => UPM1 | UPM0
    };
    let stop = match config.stop_bits {
        StopBits::One => 0,
        StopBits::Two => USBS
    };
    size | parity | stop
}

impl Transport for Usart {
    type Error = Infallible;

    fn initialize(&mut self, config: &LinkConfig) -> Result<(), Self::Error> {
        let divisor = config.baud_divisor();
        self.write_reg(UCSRA, 0);
        self.write_reg(UCSRB, RXEN | TXEN);
        self.write_reg(UCSRC, frame_format(config));
        self.write_reg(UBRRL, divisor as u8);
        self.write_reg(UBRRH, (divisor >> 8) as u8);
        #[cfg(feature = "defmt")]
        defmt::trace!("usart at {=usize:#x} divisor {}", self.base as usize, divisor);
        Ok(())
    }

    fn ready(&mut self) -> bool {
        self.read(UCSRA) & UDRE != 0
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_reg(UDR, byte);
        Ok(())
    }
}
