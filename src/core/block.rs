use log::{trace, warn};

use crate::{
    card::AddressMode,
    common::commands::{MmcCommand, ResponseFormat},
    constants::*,
    core::MmcHost,
    host::{MmcHostError, MmcHostOps, MmcHostResult},
};

/// Sectors needed to cover `length` bytes.
pub fn sector_count(length: usize, block_len: u32) -> usize {
    length.div_ceil(block_len as usize)
}

/// Address argument for a data command starting at byte `offset`.
pub fn card_address(offset: u32, mode: AddressMode, block_len: u32) -> u32 {
    match mode {
        AddressMode::Sector => offset / block_len,
        AddressMode::Byte => offset,
    }
}

impl<T: MmcHostOps> MmcHost<T> {
    /// Reads `length` bytes starting at byte `offset` into `buf` with one
    /// multiple-block read.
    ///
    /// On failure `buf` may hold part of the data.
    pub fn read_blocks(&mut self, buf: &mut [u8], length: usize, offset: u32) -> MmcHostResult {
        self.require_initialized()?;
        let mode = self.addr_mode.ok_or(MmcHostError::UninitializedCard)?;

        let block_len = self.config.block_len;
        let watermark = self.config.watermark;
        if length == 0 || buf.len() < length {
            warn!("Bad read request: {} bytes into {} byte buffer", length, buf.len());
            return Err(MmcHostError::InvalidArgument);
        }
        let sectors = sector_count(length, block_len);
        if sectors > u16::MAX as usize {
            warn!("{} sectors exceed one transfer", sectors);
            return Err(MmcHostError::InvalidArgument);
        }
        let address = card_address(offset, mode, block_len);

        trace!(
            "read_blocks: {} bytes at {:#x}, {} sectors from address {:#x}",
            length, offset, sectors, address
        );

        self.set_blocklen(block_len)?;
        self.host_ops.clear_fifo();
        self.host_ops.config_block(block_len, sectors as u32);

        let cmd = MmcCommand::new(MMC_READ_MULTIPLE_BLOCK, address, ResponseFormat::R48).with_data();
        self.host_ops.send_command(&cmd)?;

        // The card sends whole sectors; only `length` bytes are kept
        let transfer_len = sectors * block_len as usize;
        self.host_ops
            .read_data(&mut buf[..length], transfer_len, watermark)
    }
}
