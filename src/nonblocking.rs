use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Seek, SeekFrom, Write};
use crate::{cursor_address, text_bytes, Command, LcdConfig, LcdIOError, Position, ESCAPE, SET_CURSOR};

/// async variant, the settle delay is awaited instead of spun
///
/// the uart is an `embedded_io_async::Write` and is expected to be configured
/// by its hal (9600 8n1 for a stock display), readiness is whatever the hal awaits on
///
/// example
/// ```rust,ignore
/// pub struct EmbassyDelayNs;
///
/// impl DelayNs for EmbassyDelayNs {
///     async fn delay_ns(&mut self, ns: u32) {
///         embassy_time::Timer::after_micros(ns.div_ceil(1000) as u64).await;
///     }
/// }
///     let mut lcd = Lcd::new(uart_tx, EmbassyDelayNs, LcdConfig::default());
///
///     lcd.display_on().await.unwrap();
///     lcd.clear().await.unwrap();
///     lcd.seek(SeekFrom::Start(20)).await.unwrap(); // second row, first column
///     lcd.write_all("second row".as_bytes()).await.unwrap();
/// ```
pub struct Lcd<
    W: Write,
    DELAY: DelayNs
> {
    uart: W,
    delay: DELAY,
    config: LcdConfig
}

impl<
    W: Write,
    DELAY: DelayNs
> Lcd<W, DELAY> {
    pub fn new(uart: W, delay: DELAY, config: LcdConfig) -> Self {
        Self {
            uart,
            delay,
            config
        }
    }

    pub fn release(self) -> (W, DELAY) {
        (self.uart, self.delay)
    }

    async fn settle(&mut self) {
        self.delay.delay_us(self.config.settle_us as u32).await;
    }

    pub async fn send_command(&mut self, command: impl Into<u8>) -> Result<(), W::Error> {
        self.uart.write_all(&[ESCAPE, command.into()]).await?;
        self.settle().await;
        Ok(())
    }

    pub async fn send_cursor_address(&mut self, address: u8) -> Result<(), W::Error> {
        self.uart.write_all(&[ESCAPE, SET_CURSOR, address]).await?;
        self.settle().await;
        Ok(())
    }

    pub async fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), W::Error> {
        self.send_cursor_address(cursor_address(row, column)).await
    }

    /// stops at the first nul, nothing is escaped
    pub async fn send_text(&mut self, text: &str) -> Result<(), W::Error> {
        self.uart.write_all(text_bytes(text)).await
    }

    pub async fn send_char(&mut self, c: u8) -> Result<(), W::Error> {
        self.uart.write_all(&[c]).await
    }

    pub async fn display_on(&mut self) -> Result<(), W::Error> {
        self.send_command(Command::DisplayOn).await
    }

    pub async fn clear(&mut self) -> Result<(), W::Error> {
        self.send_command(Command::ClearScreen).await
    }

    pub async fn home(&mut self) -> Result<(), W::Error> {
        self.send_command(Command::Home).await
    }
}

impl<
    W: Write,
    DELAY: DelayNs
> ErrorType for Lcd<W, DELAY> {
    type Error = LcdIOError<W::Error>;
}

impl<
    W: Write,
    DELAY: DelayNs
> Write for Lcd<W, DELAY> {
    /// raw bytes, unlike `send_text` a nul is sent like anything else
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.uart.write_all(buf).await
            .map(|_| buf.len())
            .map_err(|e| LcdIOError(Some(e), ErrorKind::Other))
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.flush().await.map_err(|e| LcdIOError(Some(e), ErrorKind::Other))
    }
}

impl<
    W: Write,
    DELAY: DelayNs
> Seek for Lcd<W, DELAY> {
    /// positions are cells counted row by row (0..80), not display addresses
    /// the driver doesn't know where the cursor is so `Current` isn't supported
    async fn seek(&mut self, pos: SeekFrom) -> Result<u64, Self::Error> {
        let cell = match pos {
            SeekFrom::Start(v) => v,
            SeekFrom::End(mut v) => {
                v %= 80;
                v += 80;
                v as u64
            }
            SeekFrom::Current(_) => return Err(LcdIOError(None, ErrorKind::Unsupported))
        };
        let position = Position::from_cell(cell);
        self.send_cursor_address(position.address()).await
            .map(|_| position.cell())
            .map_err(|e| LcdIOError(Some(e), ErrorKind::Other))
    }
}
