//! byte transport between the driver and the display

use embedded_hal::serial;
use crate::Error;

/// a write-only serial channel
///
/// bytes are delivered in the order they're written,
/// `write` is only called after `ready` returned true
pub trait Transport {
    type Error;

    /// configures the channel, the driver calls this once before anything else
    fn initialize(&mut self, config: &LinkConfig) -> Result<(), Self::Error> {
        let _ = config;
        Ok(())
    }

    /// whether the channel can take another byte right now
    fn ready(&mut self) -> bool;

    fn write(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// waits for the channel then writes
    /// there's no timeout, a stalled link blocks forever
    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        while !self.ready() {
            core::hint::spin_loop();
        }
        self.write(byte)
    }

    /// like `send_byte` but gives up after `polls` failed readiness checks
    fn send_byte_bounded(&mut self, byte: u8, polls: u32) -> Result<(), Error<Self::Error>> {
        for _ in 0..polls {
            if self.ready() {
                return self.write(byte).map_err(Error::Transport);
            }
            core::hint::spin_loop();
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("lcd link not ready after {} polls", polls);
        Err(Error::LinkTimeout)
    }
}

impl<T: Transport> Transport for &mut T {
    type Error = T::Error;

    fn initialize(&mut self, config: &LinkConfig) -> Result<(), Self::Error> {
        T::initialize(self, config)
    }

    fn ready(&mut self) -> bool {
        T::ready(self)
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write(self, byte)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two
}

/// uart frame and speed, defaults are what the display ships with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// reference clock the baud rate is derived from, hz
    pub clock_hz: u32,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits
}

impl LinkConfig {
    /// baud rate register value for a 16x oversampling uart
    /// 9600 baud with 16mhz clock gives 103
    pub fn baud_divisor(&self) -> u16 {
        let divisor = (self.clock_hz / (16 * self.baud_rate.max(1))).saturating_sub(1);
        divisor.min(u16::MAX as u32) as u16
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            clock_hz: 16_000_000,
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One
        }
    }
}

/// adapts an embedded-hal serial port
/// the port is expected to be configured by its hal already
///
/// readiness is probed with `flush`, `WouldBlock` means the previous byte is still going out
pub struct Serial<S> {
    inner: S
}

impl<S: serial::Write<u8>> Serial<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner
        }
    }

    pub fn release(self) -> S {
        self.inner
    }
}

impl<S: serial::Write<u8>> Transport for Serial<S> {
    type Error = S::Error;

    fn ready(&mut self) -> bool {
        !matches!(self.inner.flush(), Err(nb::Error::WouldBlock))
    }

    fn write(&mut self, byte: u8) -> Result<(), Self::Error> {
        nb::block!(self.inner.write(byte))
    }
}
