//! the two toy screens of the button demo: a fortune teller and a pair of dice
//!
//! only rendering lives here, picking the fortune or the roll is up to the caller

use embedded_hal::blocking::delay::DelayUs;
use crate::blocking::Lcd;
use crate::{Error, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fortune {
    NotToday,
    DefinitelyYes,
    TryAgainLater,
    Yes
}

impl Fortune {
    pub const ALL: [Fortune; 4] = [
        Fortune::NotToday,
        Fortune::DefinitelyYes,
        Fortune::TryAgainLater,
        Fortune::Yes
    ];

    /// any number picks one, wrapping around the four answers
    pub fn from_index(index: u16) -> Self {
        Self::ALL[index as usize % Self::ALL.len()]
    }

    /// padded to sit roughly centered on a 20 column row
    pub fn text(&self) -> &'static str {
        match self {
            Fortune::NotToday => "     Not Today     ",
            Fortune::DefinitelyYes => "   Definitely Yes  ",
            Fortune::TryAgainLater => "  Try Again Later  ",
            Fortune::Yes => "       YES!!!      "
        }
    }
}

/// clears the screen and prints the answer on the second row
pub fn show_fortune<
    T: Transport,
    DELAY: DelayUs<u16>
>(lcd: &mut Lcd<T, DELAY>, fortune: Fortune) -> Result<(), Error<T::Error>> {
    lcd.clear()?;
    lcd.set_cursor(1, 0)?;
    lcd.send_text(fortune.text())
}

/// a die showing 1 to 6 pips
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DieFace(u8);

/// (row, column, text) relative to the die's left edge
type Dots = &'static [(u8, u8, &'static str)];

impl DieFace {
    pub fn new(pips: u8) -> Option<Self> {
        match pips {
            1..=6 => Some(Self(pips)),
            _ => None
        }
    }

    pub fn pips(&self) -> u8 {
        self.0
    }

    fn dots(&self) -> Dots {
        match self.0 {
            1 => &[(2, 2, "*")],
            2 => &[(2, 1, "* *")],
            3 => &[(1, 1, "*  "), (2, 1, " * "), (3, 1, "  *")],
            4 => &[(1, 1, "* *"), (3, 1, "* *")],
            5 => &[(1, 0, "*   *"), (2, 2, "*"), (3, 0, "*   *")],
            _ => &[(1, 1, "* *"), (2, 1, "* *"), (3, 1, "* *")]
        }
    }
}

pub const DICE_HEADER: &str = "   DIE 1     DIE 2  ";

/// left edge of each die, under its header label
const DIE_COLUMNS: [u8; 2] = [3, 13];

/// clears the screen, prints the header and draws both dice below it
pub fn show_dice<
    T: Transport,
    DELAY: DelayUs<u16>
>(lcd: &mut Lcd<T, DELAY>, dice: [DieFace; 2]) -> Result<(), Error<T::Error>> {
    lcd.clear()?;
    lcd.home()?;
    lcd.send_text(DICE_HEADER)?;
    for (die, left) in dice.iter().zip(DIE_COLUMNS) {
        for (row, column, text) in die.dots() {
            lcd.set_cursor(*row, left + column)?;
            lcd.send_text(text)?;
        }
    }
    Ok(())
}
