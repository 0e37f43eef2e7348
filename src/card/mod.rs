mod info;

pub use info::{BootBusWidth, BootPartition, CardConfig, CardSpecInfo, ExtCsd};

use core::fmt::{self, Display};

use crate::constants::{MMC_STATUS_CURR_STATE, MMC_STATUS_CURR_STATE_SHIFT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle = 0,  // idle state
    Ready = 1, // ready state
    Ident = 2, // identification state
    Stby = 3,  // stand-by state
    Tran = 4,  // transfer state
    Data = 5,  // sending-data state
    Rcv = 6,   // receive-data state
    Prg = 7,   // programming state
    Dis = 8,   // disconnect state
}

impl CardState {
    pub fn from_code(code: u8) -> Option<Self> {
        let state = match code {
            0 => CardState::Idle,
            1 => CardState::Ready,
            2 => CardState::Ident,
            3 => CardState::Stby,
            4 => CardState::Tran,
            5 => CardState::Data,
            6 => CardState::Rcv,
            7 => CardState::Prg,
            8 => CardState::Dis,
            _ => return None,
        };
        Some(state)
    }
}

/// First word of an R1 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStatus(pub u32);

impl CardStatus {
    /// CURRENT_STATE, bits 12:9.
    pub fn state_code(&self) -> u8 {
        ((self.0 & MMC_STATUS_CURR_STATE) >> MMC_STATUS_CURR_STATE_SHIFT) as u8
    }

    pub fn state(&self) -> Option<CardState> {
        CardState::from_code(self.state_code())
    }
}

/// How the card interprets data addresses, decided by the OCR the card
/// answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Byte,
    Sector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MmcVersion {
    /// MMC 3.x or older.
    V3x,
    /// eMMC 4.x with x < 4.
    V4x,
    /// eMMC 4.4, DDR capable.
    V44,
}

impl Display for MmcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmcVersion::V3x => write!(f, "MMC 3.X or older"),
            MmcVersion::V4x => write!(f, "eMMC 4.X (X<4)"),
            MmcVersion::V44 => write!(f, "eMMC 4.4"),
        }
    }
}
