use core::fmt;
use embedded_hal::blocking::delay::DelayUs;
use crate::{cursor_address, text_bytes, Command, Error, LcdConfig, LinkConfig, Transport, ESCAPE, SET_CURSOR};

pub struct Lcd<
    T: Transport,
    DELAY: DelayUs<u16>
> {
    transport: T,
    delay: DELAY,
    config: LcdConfig
}

impl<
    T: Transport,
    DELAY: DelayUs<u16>
> Lcd<T, DELAY> {
    /// initializes the transport with `link` and returns the driver
    /// the display itself isn't touched, send `display_on` / `clear` when you need them
    ///
    /// ```rust,ignore
    ///     let mut lcd = Lcd::new(
    ///         unsafe { Usart::new(usart::USART3) },
    ///         delay,
    ///         LinkConfig::default(),
    ///         LcdConfig::default()
    ///     ).unwrap();
    ///
    ///     lcd.display_on().unwrap();
    ///     lcd.clear().unwrap();
    ///     lcd.set_cursor(1, 0).unwrap();
    ///     write!(lcd, "count {}", 42).unwrap();
    /// ```
    pub fn new(mut transport: T, delay: DELAY, link: LinkConfig, config: LcdConfig) -> Result<Self, Error<T::Error>> {
        transport.initialize(&link)?;
        #[cfg(feature = "defmt")]
        defmt::trace!("lcd link up, {} baud", link.baud_rate);
        Ok(Self {
            transport,
            delay,
            config
        })
    }

    pub fn release(self) -> (T, DELAY) {
        (self.transport, self.delay)
    }

    /// raw byte, waits for the transport but never for the display
    pub fn send_byte(&mut self, byte: u8) -> Result<(), Error<T::Error>> {
        match self.config.max_polls {
            Some(polls) => self.transport.send_byte_bounded(byte, polls),
            None => Ok(self.transport.send_byte(byte)?)
        }
    }

    fn settle(&mut self) {
        self.delay.delay_us(self.config.settle_us);
    }

    pub fn send_command(&mut self, command: impl Into<u8>) -> Result<(), Error<T::Error>> {
        self.send_byte(ESCAPE)?;
        self.send_byte(command.into())?;
        self.settle();
        Ok(())
    }

    /// `address` is used as is, see [`cursor_address`]
    pub fn send_cursor_address(&mut self, address: u8) -> Result<(), Error<T::Error>> {
        self.send_byte(ESCAPE)?;
        self.send_byte(SET_CURSOR)?;
        self.send_byte(address)?;
        self.settle();
        Ok(())
    }

    /// out of range row/column are clamped
    pub fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), Error<T::Error>> {
        self.send_cursor_address(cursor_address(row, column))
    }

    /// sent byte for byte, control bytes aren't escaped
    /// stops at the first nul if there is one
    pub fn send_text(&mut self, text: &str) -> Result<(), Error<T::Error>> {
        for byte in text_bytes(text) {
            self.send_byte(*byte)?;
        }
        Ok(())
    }

    pub fn send_char(&mut self, c: u8) -> Result<(), Error<T::Error>> {
        self.send_byte(c)
    }

    pub fn display_on(&mut self) -> Result<(), Error<T::Error>> {
        self.send_command(Command::DisplayOn)
    }

    pub fn clear(&mut self) -> Result<(), Error<T::Error>> {
        self.send_command(Command::ClearScreen)
    }

    pub fn home(&mut self) -> Result<(), Error<T::Error>> {
        self.send_command(Command::Home)
    }
}

impl<
    T: Transport,
    DELAY: DelayUs<u16>
> fmt::Write for Lcd<T, DELAY> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_text(s).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use core::cell::RefCell;
    use core::fmt::Write;
    use std::vec::Vec;
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) enum Event {
        Byte(u8),
        Delay(u32)
    }

    /// shared record of everything that reached the wire or the clock, in order
    #[derive(Default)]
    pub(crate) struct Log {
        events: RefCell<Vec<Event>>,
        initialized: RefCell<Option<LinkConfig>>
    }

    impl Log {
        pub(crate) fn bytes(&self) -> Vec<u8> {
            self.events.borrow().iter().filter_map(|e| match e {
                Event::Byte(b) => Some(*b),
                Event::Delay(_) => None
            }).collect()
        }

        pub(crate) fn events(&self) -> Vec<Event> {
            self.events.borrow().clone()
        }

        pub(crate) fn push(&self, event: Event) {
            self.events.borrow_mut().push(event);
        }

        pub(crate) fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    pub(crate) struct Link<'a>(pub(crate) &'a Log);

    impl Transport for Link<'_> {
        type Error = ();

        fn initialize(&mut self, config: &LinkConfig) -> Result<(), ()> {
            *self.0.initialized.borrow_mut() = Some(*config);
            Ok(())
        }

        fn ready(&mut self) -> bool {
            true
        }

        fn write(&mut self, byte: u8) -> Result<(), ()> {
            assert!(self.0.initialized.borrow().is_some(), "used before initialize");
            self.0.push(Event::Byte(byte));
            Ok(())
        }
    }

    /// simulated clock, records instead of sleeping
    pub(crate) struct Clock<'a>(pub(crate) &'a Log);

    impl DelayUs<u16> for Clock<'_> {
        fn delay_us(&mut self, us: u16) {
            self.0.push(Event::Delay(us as u32));
        }
    }

    /// a link that never becomes ready
    struct Stalled;

    impl Transport for Stalled {
        type Error = ();

        fn ready(&mut self) -> bool {
            false
        }

        fn write(&mut self, _byte: u8) -> Result<(), ()> {
            panic!("written while not ready")
        }
    }

    fn lcd(log: &Log) -> Lcd<Link<'_>, Clock<'_>> {
        Lcd::new(Link(log), Clock(log), LinkConfig::default(), LcdConfig::default()).unwrap()
    }

    #[test]
    fn new_initializes_transport() {
        let log = Log::default();
        let _lcd = lcd(&log);
        assert_eq!(*log.initialized.borrow(), Some(LinkConfig::default()));
        assert!(log.events().is_empty());
    }

    #[test]
    fn command_is_escaped_then_settles() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.send_command(0x51u8).unwrap();
        assert_eq!(log.events(), [Event::Byte(0xFE), Event::Byte(0x51), Event::Delay(5000)]);
    }

    #[test]
    fn cursor_address_sequence() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.send_cursor_address(20).unwrap();
        assert_eq!(log.events(), [Event::Byte(0xFE), Event::Byte(0x45), Event::Byte(20), Event::Delay(5000)]);
    }

    #[test]
    fn text_has_no_escape_or_delay() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.send_text("AB").unwrap();
        assert_eq!(log.events(), [Event::Byte(0x41), Event::Byte(0x42)]);
    }

    #[test]
    fn text_passes_control_bytes_through() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.send_text("\u{7f}\n").unwrap();
        lcd.send_char(0xFE).unwrap();
        assert_eq!(log.bytes(), [0x7F, b'\n', 0xFE]);
    }

    #[test]
    fn text_ends_at_nul() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.send_text("ok\0ignored").unwrap();
        assert_eq!(log.bytes(), b"ok");
    }

    #[test]
    fn set_cursor_then_text() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.set_cursor(1, 5).unwrap();
        lcd.send_text("*").unwrap();
        assert_eq!(log.bytes(), [0xFE, 0x45, 69, 0x2A]);
        // the settle delay sits between the cursor move and the text
        assert_eq!(log.events()[3], Event::Delay(5000));
        assert_eq!(log.events()[4], Event::Byte(b'*'));
    }

    #[test]
    fn set_cursor_clamps() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.set_cursor(7, 30).unwrap();
        assert_eq!(log.bytes(), [0xFE, 0x45, 103]);
    }

    #[test]
    fn named_commands() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        lcd.display_on().unwrap();
        lcd.clear().unwrap();
        lcd.home().unwrap();
        assert_eq!(log.bytes(), [0xFE, 0x41, 0xFE, 0x51, 0xFE, 0x46]);
        let delays = log.events().iter().filter(|e| matches!(e, Event::Delay(_))).count();
        assert_eq!(delays, 3);
    }

    #[test]
    fn settle_time_is_configurable() {
        let log = Log::default();
        let config = LcdConfig {
            settle_us: 12000,
            ..LcdConfig::default()
        };
        let mut lcd = Lcd::new(Link(&log), Clock(&log), LinkConfig::default(), config).unwrap();
        lcd.home().unwrap();
        assert_eq!(log.events().last(), Some(&Event::Delay(12000)));
    }

    #[test]
    fn formatted_text() {
        let log = Log::default();
        let mut lcd = lcd(&log);
        write!(lcd, "{} + {}", 1, 2).unwrap();
        assert_eq!(log.bytes(), b"1 + 2");
        log.clear();
        lcd.send_text("").unwrap();
        assert!(log.events().is_empty());
    }

    #[test]
    fn stalled_link_times_out_when_bounded() {
        let log = Log::default();
        let config = LcdConfig {
            max_polls: Some(100),
            ..LcdConfig::default()
        };
        let mut lcd = Lcd::new(Stalled, Clock(&log), LinkConfig::default(), config).unwrap();
        assert_eq!(lcd.send_command(Command::Home), Err(Error::LinkTimeout));
        // nothing settles after a failed command
        assert!(log.events().is_empty());
    }
}
