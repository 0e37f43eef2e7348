//! Polled driver for the TI OMAP/AM335x MMCHS controller.

mod block;
mod clock;
pub mod cmd;
pub mod regs;

#[cfg(test)]
pub(crate) mod sim;

use embedded_hal::delay::DelayNs;
use log::info;

use crate::{
    common::commands::{MmcCommand, MmcResponse, ResponseFormat},
    config::{HostConfig, PollBudget},
    host::{BusWidth, MmcHostOps, MmcHostResult},
    regs::RegisterAccess,
};
use regs::{IntStatus, MMCHS_PSTATE, MMCHS_STAT, PresentState};

pub struct OmapSdhc<R: RegisterAccess, D: DelayNs> {
    regs: R,
    delay: D,
    config: HostConfig,
    /// SD_STAT as observed at the end of the last command.
    last_status: u32,
}

impl<R: RegisterAccess, D: DelayNs> OmapSdhc<R, D> {
    pub const fn new(regs: R, delay: D, config: HostConfig) -> Self {
        OmapSdhc {
            regs,
            delay,
            config,
            last_status: 0,
        }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn last_status(&self) -> u32 {
        self.last_status
    }

    fn status(&self) -> IntStatus {
        IntStatus::from_bits_retain(self.regs.read_reg32(MMCHS_STAT))
    }

    fn present_state(&self) -> PresentState {
        PresentState::from_bits_retain(self.regs.read_reg32(MMCHS_PSTATE))
    }

    /// Polls `done` until it holds or `budget` runs out.
    fn poll<F: FnMut(&R) -> bool>(&mut self, budget: PollBudget, mut done: F) -> bool {
        for _ in 0..budget.retries {
            if done(&self.regs) {
                return true;
            }
            self.delay.delay_us(budget.interval_us);
        }
        done(&self.regs)
    }

    // Reset the controller and bring the identification clock up
    pub fn init_host(&mut self) -> MmcHostResult {
        info!("Init MMCHS controller");

        self.reset_module()?;
        self.configure_bus()?;

        info!("MMCHS initialization completed successfully");
        Ok(())
    }
}

impl<R: RegisterAccess, D: DelayNs> MmcHostOps for OmapSdhc<R, D> {
    fn init_host(&mut self) -> MmcHostResult {
        self.init_host()
    }

    fn send_init_stream(&mut self) {
        self.send_init_stream()
    }

    fn reset_cmd_line(&mut self) -> MmcHostResult {
        self.reset_lines(regs::SYSCTL_SRC)
    }

    fn send_command(&mut self, cmd: &MmcCommand) -> MmcHostResult {
        self.send_command(cmd)
    }

    fn read_response(&self, format: ResponseFormat) -> MmcResponse {
        self.read_response(format)
    }

    fn config_block(&mut self, block_len: u32, block_count: u32) {
        self.config_block(block_len, block_count)
    }

    fn clear_fifo(&mut self) {
        self.clear_fifo()
    }

    fn read_data(
        &mut self,
        buf: &mut [u8],
        transfer_len: usize,
        watermark: usize,
    ) -> MmcHostResult {
        self.read_data(buf, transfer_len, watermark)
    }

    fn set_bus_width(&mut self, width: BusWidth) {
        self.set_bus_width(width)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us)
    }
}
