use embedded_hal::delay::DelayNs;
use log::{trace, warn};

use super::{OmapSdhc, regs::*};
use crate::{
    common::commands::{MmcCommand, MmcResponse, ResponseFormat, TransferDirection, is_multi_block},
    host::{MmcHostError, MmcHostResult},
    regs::RegisterAccess,
};

/// Encodes `cmd` into an SD_CMD word.
///
/// Multiple-block commands always get block counting, multi-block select and
/// auto CMD12, whatever the descriptor says.
pub fn encode_command(cmd: &MmcCommand) -> u32 {
    let (bce, msbs, acen) = if is_multi_block(cmd.opcode) {
        (true, true, true)
    } else {
        (cmd.block_count_enable, cmd.multi_block, cmd.auto_cmd12)
    };

    let rsp_type = match cmd.response {
        ResponseFormat::None => RSP_TYPE_NONE,
        ResponseFormat::R136 => RSP_TYPE_136,
        ResponseFormat::R48 => RSP_TYPE_48,
        ResponseFormat::R48Busy => RSP_TYPE_48_BUSY,
    };
    let ddir = cmd.direction == TransferDirection::Read;

    CMD_DE.encode(cmd.dma_enable as u32)
        | CMD_BCE.encode(bce as u32)
        | CMD_ACEN.encode(acen as u32)
        | CMD_DDIR.encode(ddir as u32)
        | CMD_MSBS.encode(msbs as u32)
        | CMD_RSP_TYPE.encode(rsp_type)
        | CMD_CCCE.encode(cmd.crc_check as u32)
        | CMD_CICE.encode(cmd.index_check as u32)
        | CMD_DP.encode(cmd.data_present as u32)
        | CMD_INDX.encode(cmd.opcode as u32)
}

impl<R: RegisterAccess, D: DelayNs> OmapSdhc<R, D> {
    // Send command
    pub fn send_command(&mut self, cmd: &MmcCommand) -> MmcHostResult {
        self.wait_cmd_data_lines(cmd.data_present)?;

        self.clear_status()?;
        self.regs.write_reg32(MMCHS_ARG, cmd.arg);

        // Completion is polled, the enable mask only makes the bits visible
        self.regs.write_reg32(MMCHS_IE, IE_CMD_MASK);

        let command = encode_command(cmd);
        trace!(
            "Sending command: opcode={}, arg={:#x}, command={:#010x}",
            cmd.opcode, cmd.arg, command
        );
        self.regs.write_reg32(MMCHS_CMD, command);

        let status = self.wait_cmd_complete()?;
        self.check_response(status)
    }

    fn wait_cmd_data_lines(&mut self, data_present: bool) -> MmcHostResult {
        let budget = self.config.line_busy;

        let cmd_free = self.poll(budget, |regs| {
            regs.read_reg32(MMCHS_PSTATE) & PresentState::CMDI.bits() == 0
        });
        if !cmd_free {
            warn!("Command line busy");
            return Err(MmcHostError::BusBusyTimeout);
        }

        if data_present {
            let data_free = self.poll(budget, |regs| {
                regs.read_reg32(MMCHS_PSTATE) & PresentState::DATI.bits() == 0
            });
            if !data_free {
                warn!("Data lines busy");
                return Err(MmcHostError::BusBusyTimeout);
            }
        }

        Ok(())
    }

    fn clear_status(&mut self) -> MmcHostResult {
        self.regs.write_reg32(MMCHS_STAT, 0xFFFF_FFFF);

        let budget = self.config.status_clear;
        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_STAT) == 0) {
            warn!("Status stuck at {:#010x}", self.status().bits());
            return Err(MmcHostError::ResetTimeout);
        }
        Ok(())
    }

    fn wait_cmd_complete(&mut self) -> MmcHostResult<IntStatus> {
        let mask = (IntStatus::CC | IntStatus::CMD_ERROR | IntStatus::ERRI).bits();
        let budget = self.config.cmd_complete;

        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_STAT) & mask != 0) {
            warn!(
                "Command timeout, PSTATE {:#010x}",
                self.present_state().bits()
            );
            return Err(MmcHostError::CommandTimeout);
        }

        Ok(self.status())
    }

    fn check_response(&mut self, status: IntStatus) -> MmcHostResult {
        self.last_status = status.bits();

        if status.contains(IntStatus::CC) && !status.intersects(IntStatus::CMD_ERROR) {
            trace!("Command completed: status={:#010x}", status.bits());
            return Ok(());
        }

        warn!("Command error: status={:#010x}", status.bits());

        // The command error is reported even if the lines stay stuck
        if self
            .present_state()
            .intersects(PresentState::CMDI | PresentState::DATI)
        {
            if let Err(err) = self.reset_lines(SYSCTL_SRC | SYSCTL_SRD) {
                warn!("Line reset after command error failed: {}", err);
            }
        }

        Err(MmcHostError::CommandError {
            status: status.bits(),
        })
    }

    /// Pulses the SYSCTL line reset bits in `mask` and waits for them to drop.
    pub fn reset_lines(&mut self, mask: u32) -> MmcHostResult {
        self.regs.set_bits32(MMCHS_SYSCTL, mask);

        let budget = self.config.reset;
        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_SYSCTL) & mask == 0) {
            warn!("Line reset {:#x} did not complete", mask);
            return Err(MmcHostError::ResetTimeout);
        }
        Ok(())
    }

    pub fn read_response(&self, format: ResponseFormat) -> MmcResponse {
        let mut raw = [0u32; 4];
        for (word, offset) in raw.iter_mut().zip(MMCHS_RSP) {
            *word = self.regs.read_reg32(offset);
        }
        trace!(
            "response: {:#x} {:#x} {:#x} {:#x}",
            raw[0], raw[1], raw[2], raw[3]
        );

        MmcResponse::new(format, raw)
    }
}
