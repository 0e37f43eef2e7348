use log::{debug, info, trace, warn};

use super::MmcHost;
use crate::{
    card::{AddressMode, CardState, CardStatus},
    common::commands::{MmcCommand, MmcResponse, ResponseFormat, TransferDirection},
    constants::*,
    host::{BusWidth, MmcHostError, MmcHostOps, MmcHostResult},
};

impl<T: MmcHostOps> MmcHost<T> {
    fn send(&mut self, cmd: MmcCommand) -> MmcHostResult<MmcResponse> {
        self.host_ops.send_command(&cmd)?;
        Ok(self.host_ops.read_response(cmd.response))
    }

    fn rca_arg(&self) -> MmcHostResult<u32> {
        let rca = self.rca.ok_or(MmcHostError::UninitializedCard)?;
        Ok((rca as u32) << RCA_SHIFT)
    }

    /// CMD0, no response.
    pub fn go_idle(&mut self) -> MmcHostResult {
        let cmd = MmcCommand::new(MMC_GO_IDLE_STATE, NO_ARG, ResponseFormat::None)
            .with_direction(TransferDirection::Write);
        self.send(cmd)?;
        debug!("Card reset to idle");
        Ok(())
    }

    /// Repeats CMD1 until the card leaves busy, then derives the addressing
    /// mode from the OCR it answered with.
    pub fn send_op_cond(&mut self) -> MmcHostResult<AddressMode> {
        let budget = self.config.op_cond;

        for attempt in 1..=budget.retries {
            let cmd = MmcCommand::new(MMC_SEND_OP_COND, self.config.ocr, ResponseFormat::R48)
                .with_direction(TransferDirection::Write)
                .with_checks(false, false);
            let ocr = self.send(cmd)?.as_r3();
            trace!("OCR {:#010x} on attempt {}", ocr, attempt);

            if ocr & OCR_BUSY != 0 {
                let mode = if ocr & MMC_OCR_HC_BIT_MASK == MMC_OCR_HC_RESP_VAL {
                    AddressMode::Sector
                } else {
                    AddressMode::Byte
                };
                debug!("Voltage settled after {} attempts, OCR {:#010x}", attempt, ocr);
                return Ok(mode);
            }

            self.host_ops.delay_us(budget.interval_us);
        }

        warn!("Card still busy after {} CMD1 attempts", budget.retries);
        Err(MmcHostError::NegotiationTimeout)
    }

    /// CMD2, returns the raw CID words.
    pub fn all_send_cid(&mut self) -> MmcHostResult<[u32; 4]> {
        let cmd = MmcCommand::new(MMC_ALL_SEND_CID, NO_ARG, ResponseFormat::R136);
        Ok(self.send(cmd)?.as_r2())
    }

    /// CMD3 with the configured RCA. The card must still report the
    /// identification state.
    pub fn set_relative_addr(&mut self) -> MmcHostResult {
        let rca = self.config.rca;
        let cmd = MmcCommand::new(
            MMC_SET_RELATIVE_ADDR,
            (rca as u32) << RCA_SHIFT,
            ResponseFormat::R48,
        );
        let status = self.send(cmd)?.as_r1();
        self.rca = Some(rca);

        expect_state(status, CardState::Ident)?;
        info!("RCA {} assigned", rca);
        Ok(())
    }

    /// CMD9, caches CSD_STRUCTURE and SPEC_VERS.
    pub fn send_csd(&mut self) -> MmcHostResult {
        let cmd = MmcCommand::new(MMC_SEND_CSD, self.rca_arg()?, ResponseFormat::R136);
        let csd = self.send(cmd)?.as_r2();
        self.spec_info.set_csd(&csd);

        debug!(
            "CSD structure {}, spec version {}",
            self.spec_info.csd_structure, self.spec_info.spec_version
        );
        Ok(())
    }

    /// CMD7 addressed to our RCA.
    pub fn select_card(&mut self) -> MmcHostResult {
        let cmd = MmcCommand::new(MMC_SELECT_CARD, self.rca_arg()?, ResponseFormat::R48Busy);
        self.send(cmd)?;
        Ok(())
    }

    /// CMD13.
    pub fn send_status(&mut self) -> MmcHostResult<CardStatus> {
        let cmd = MmcCommand::new(MMC_SEND_STATUS, self.rca_arg()?, ResponseFormat::R48);
        let status = self.send(cmd)?.as_r1();
        trace!("Card status {:#010x}", status.0);
        Ok(status)
    }

    pub fn check_state(&mut self, expected: CardState) -> MmcHostResult {
        let status = self.send_status()?;
        expect_state(status, expected)
    }

    /// SWITCH to `width` on the card, then on the controller.
    pub fn switch_bus_width(&mut self, width: BusWidth) -> MmcHostResult {
        let arg = MMC_SWITCH_SETBW_ARG | (((width as u32) >> 2) << 8);
        let cmd = MmcCommand::new(MMC_SWITCH, arg, ResponseFormat::R48Busy);
        self.send(cmd)?;
        self.check_state(CardState::Tran)?;

        self.host_ops.set_bus_width(width);
        info!("Bus width switched to {} bit", width as u8);
        Ok(())
    }

    /// CMD16.
    pub fn set_blocklen(&mut self, block_len: u32) -> MmcHostResult {
        let cmd = MmcCommand::new(MMC_SET_BLOCKLEN, block_len, ResponseFormat::R48);
        self.send(cmd)?;
        Ok(())
    }

    /// CMD8 plus a one-block FIFO read into the EXT_CSD cache.
    pub fn read_ext_csd(&mut self) -> MmcHostResult {
        self.host_ops.config_block(EXT_CSD_LEN as u32, 1);

        let cmd = MmcCommand::new(MMC_SEND_EXT_CSD, NO_ARG, ResponseFormat::R48).with_data();
        self.send(cmd)?;

        let watermark = self.config.watermark;
        self.host_ops
            .read_data(self.spec_info.ext_csd.as_bytes_mut(), EXT_CSD_LEN, watermark)?;

        debug!("EXT_CSD read: {:?}", self.spec_info.ext_csd);
        Ok(())
    }
}

fn expect_state(status: CardStatus, expected: CardState) -> MmcHostResult {
    if status.state() == Some(expected) {
        return Ok(());
    }

    warn!(
        "Card in state {} while {:?} was expected, status {:#010x}",
        status.state_code(),
        expected,
        status.0
    );
    Err(MmcHostError::CardStateMismatch {
        expected,
        found: status.state_code(),
    })
}
