use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use super::{OmapSdhc, regs::*};
use crate::{
    host::{BusWidth, MmcHostError, MmcHostResult},
    regs::RegisterAccess,
};

/// How long the card clock runs with INIT held.
const INIT_STREAM_US: u32 = 10_000;

impl<R: RegisterAccess, D: DelayNs> OmapSdhc<R, D> {
    /// Module soft reset followed by a full SYSCTL reset.
    pub fn reset_module(&mut self) -> MmcHostResult {
        let budget = self.config.reset;

        self.regs.set_bits32(MMCHS_SYSCONFIG, SYSCONFIG_SOFTRESET);
        if !self.poll(budget, |regs| {
            regs.read_reg32(MMCHS_SYSSTATUS) & SYSSTATUS_RESETDONE != 0
        }) {
            warn!("Module reset did not complete");
            return Err(MmcHostError::ResetTimeout);
        }

        self.regs.set_bits32(MMCHS_SYSCTL, SYSCTL_SRA);
        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_SYSCTL) & SYSCTL_SRA == 0) {
            warn!("Controller reset did not complete");
            return Err(MmcHostError::ResetTimeout);
        }

        info!("Software reset done");
        Ok(())
    }

    /// Voltage, debounce, identification clock and bus power.
    pub fn configure_bus(&mut self) -> MmcHostResult {
        debug!(
            "capabilities {:#x}, hctl {:#x}",
            self.regs.read_reg32(MMCHS_CAPA),
            self.regs.read_reg32(MMCHS_HCTL)
        );

        let sdvs = HCTL_SDVS.encode(self.config.bus_voltage);
        self.regs.write_reg32(MMCHS_HCTL, sdvs);
        self.regs
            .write_reg32(MMCHS_CON, CON_DVAL.encode(self.config.debounce));

        self.set_clock(self.config.ident_clock_divider)?;

        self.regs.write_reg32(MMCHS_HCTL, sdvs | HCTL_SDBP);
        self.regs.write_reg32(MMCHS_IE, IE_CMD_MASK);

        info!("Bus configuration done");
        Ok(())
    }

    /// Programs the card clock divider and waits for the internal clock.
    pub fn set_clock(&mut self, divider: u32) -> MmcHostResult {
        self.regs.clear_bits32(MMCHS_SYSCTL, SYSCTL_CEN);

        let dto = self.config.data_timeout;
        self.regs.modify_reg32(MMCHS_SYSCTL, |v| {
            let v = SYSCTL_CLKD.set(v, divider);
            SYSCTL_DTO.set(v, dto) | SYSCTL_ICE
        });

        let budget = self.config.clock_stable;
        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_SYSCTL) & SYSCTL_ICS != 0) {
            warn!("Internal clock not stable");
            return Err(MmcHostError::ResetTimeout);
        }
        debug!("Internal clock stable, divider {}", divider);

        self.regs.set_bits32(MMCHS_SYSCTL, SYSCTL_CEN);
        Ok(())
    }

    /// Sends the 80 power-up clocks with the INIT bit held.
    pub fn send_init_stream(&mut self) {
        self.regs.set_bits32(MMCHS_CON, CON_INIT);
        self.regs.write_reg32(MMCHS_CMD, 0);

        self.delay.delay_us(INIT_STREAM_US);

        self.regs.write_reg32(MMCHS_STAT, IntStatus::CC.bits());
        self.regs.clear_bits32(MMCHS_CON, CON_INIT);
        self.regs.write_reg32(MMCHS_STAT, 0xFFFF_FFFF);

        debug!("80 clocks sent");
    }

    pub fn set_bus_width(&mut self, width: BusWidth) {
        match width {
            BusWidth::Bit8 => {
                self.regs.set_bits32(MMCHS_CON, CON_DW8);
            }
            BusWidth::Bit4 => {
                self.regs.clear_bits32(MMCHS_CON, CON_DW8);
                self.regs.set_bits32(MMCHS_HCTL, HCTL_DTW);
            }
            BusWidth::Bit1 => {
                self.regs.clear_bits32(MMCHS_CON, CON_DW8);
                self.regs.clear_bits32(MMCHS_HCTL, HCTL_DTW);
            }
        }
        debug!("Host bus width set to {}", width as u8);
    }
}
