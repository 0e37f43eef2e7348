pub mod omap;

use core::fmt::Display;

use crate::{
    card::CardState,
    common::commands::{MmcCommand, MmcResponse, ResponseFormat},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmcHostError {
    /// Command or data lines never became free.
    BusBusyTimeout,
    /// The command never completed.
    CommandTimeout,
    /// The command completed with an error bit set.
    CommandError { status: u32 },
    /// The FIFO never became ready or the transfer never completed.
    DataTimeout,
    /// The data phase completed with an error bit set.
    DataTransferError { status: u32 },
    /// The card stayed busy through the whole voltage negotiation.
    NegotiationTimeout,
    CardStateMismatch { expected: CardState, found: u8 },
    UninitializedCard,
    /// A controller reset, clock or status clear did not settle.
    ResetTimeout,
    InvalidArgument,
}

impl Display for MmcHostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MmcHostError::BusBusyTimeout => write!(f, "Command/data lines busy"),
            MmcHostError::CommandTimeout => write!(f, "Command timed out"),
            MmcHostError::CommandError { status } => {
                write!(f, "Command error, status {:#010x}", status)
            }
            MmcHostError::DataTimeout => write!(f, "Data transfer timed out"),
            MmcHostError::DataTransferError { status } => {
                write!(f, "Data transfer error, status {:#010x}", status)
            }
            MmcHostError::NegotiationTimeout => write!(f, "Voltage negotiation timed out"),
            MmcHostError::CardStateMismatch { expected, found } => {
                match CardState::from_code(*found) {
                    Some(state) => write!(f, "Card in state {:?} instead of {:?}", state, expected),
                    None => write!(f, "Card in reserved state {} instead of {:?}", found, expected),
                }
            }
            MmcHostError::UninitializedCard => write!(f, "Card not initialized"),
            MmcHostError::ResetTimeout => write!(f, "Controller reset timed out"),
            MmcHostError::InvalidArgument => write!(f, "Invalid argument"),
        }
    }
}

impl core::error::Error for MmcHostError {}

pub type MmcHostResult<T = ()> = Result<T, MmcHostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWidth {
    Bit1 = 1,
    Bit4 = 4,
    Bit8 = 8,
}

/// Controller-side primitives the card protocol is built on.
pub trait MmcHostOps {
    /// Module reset, clock bring-up and bus configuration.
    fn init_host(&mut self) -> MmcHostResult;

    /// Clocks the card through its power-up sequence.
    fn send_init_stream(&mut self);

    /// Pulses the command-line reset.
    fn reset_cmd_line(&mut self) -> MmcHostResult;

    fn send_command(&mut self, cmd: &MmcCommand) -> MmcHostResult;

    fn read_response(&self, format: ResponseFormat) -> MmcResponse;

    fn config_block(&mut self, block_len: u32, block_count: u32);

    /// Drops stale FIFO content left by an earlier transfer.
    fn clear_fifo(&mut self);

    /// Drains a `transfer_len` byte transfer from the data FIFO in bursts of
    /// `watermark` words, keeping the first `buf.len()` bytes.
    fn read_data(
        &mut self,
        buf: &mut [u8],
        transfer_len: usize,
        watermark: usize,
    ) -> MmcHostResult;

    fn set_bus_width(&mut self, width: BusWidth);

    fn delay_us(&mut self, us: u32);
}
