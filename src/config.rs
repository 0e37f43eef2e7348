use log::warn;

use crate::{
    constants::*,
    host::{BusWidth, MmcHostError, MmcHostResult},
};

/// Bound on a polled wait: at most `retries` checks, `interval_us` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub retries: u32,
    pub interval_us: u32,
}

impl PollBudget {
    pub const fn new(retries: u32, interval_us: u32) -> Self {
        PollBudget {
            retries,
            interval_us,
        }
    }
}

/// Controller timing and bring-up parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub line_busy: PollBudget,
    pub status_clear: PollBudget,
    pub cmd_complete: PollBudget,
    pub reset: PollBudget,
    pub clock_stable: PollBudget,
    pub buffer_ready: PollBudget,
    pub transfer_complete: PollBudget,
    /// SYSCTL.CLKD used during identification; 240 gives 400 kHz off 96 MHz.
    pub ident_clock_divider: u32,
    /// SYSCTL.DTO, data timeout of TCF x 2^(13 + dto).
    pub data_timeout: u32,
    /// HCTL.SDVS voltage select.
    pub bus_voltage: u32,
    /// SD_CON.DVAL debounce.
    pub debounce: u32,
}

impl HostConfig {
    pub const fn new() -> Self {
        HostConfig {
            line_busy: PollBudget::new(10, 1000),
            status_clear: PollBudget::new(100, 1000),
            cmd_complete: PollBudget::new(1000, 1000),
            reset: PollBudget::new(1000, 100),
            clock_stable: PollBudget::new(1000, 100),
            buffer_ready: PollBudget::new(10_000, 100),
            transfer_complete: PollBudget::new(10_000, 100),
            ident_clock_divider: 240,
            data_timeout: 0xE,
            bus_voltage: 0x5,
            debounce: 0x3,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Card negotiation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    pub rca: u16,
    pub ocr: u32,
    pub op_cond: PollBudget,
    pub bus_width: BusWidth,
    pub block_len: u32,
    /// FIFO burst size in 32-bit words.
    pub watermark: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolConfig {
    pub const fn new() -> Self {
        ProtocolConfig {
            rca: MMC_DEFAULT_RCA,
            ocr: MMC_HV_HC_OCR_VALUE,
            op_cond: PollBudget::new(MMC_VOLT_VALID_COUNT, MMC_VOLT_VALID_DELAY_US),
            bus_width: BusWidth::Bit1,
            block_len: MMC_BLOCK_LEN,
            watermark: 128,
        }
    }

    pub const fn with_bus_width(mut self, bus_width: BusWidth) -> Self {
        self.bus_width = bus_width;
        self
    }

    pub const fn with_watermark(mut self, watermark: usize) -> Self {
        self.watermark = watermark;
        self
    }

    pub const fn with_op_cond(mut self, op_cond: PollBudget) -> Self {
        self.op_cond = op_cond;
        self
    }

    /// Every data transfer is drained in whole FIFO bursts, so a burst has to
    /// divide both the block length and the EXT_CSD size.
    pub fn validate(&self) -> MmcHostResult {
        let burst = 4 * self.watermark;
        let block_len = self.block_len as usize;

        if self.watermark == 0
            || block_len == 0
            || self.block_len > MMC_MAX_BLOCK_LEN
            || block_len % burst != 0
            || EXT_CSD_LEN % burst != 0
        {
            warn!(
                "Unusable configuration: block length {}, watermark {} words",
                self.block_len, self.watermark
            );
            return Err(MmcHostError::InvalidArgument);
        }
        Ok(())
    }
}
