use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use super::{OmapSdhc, regs::*};
use crate::{
    host::{MmcHostError, MmcHostResult},
    regs::RegisterAccess,
    tools::unpack_word_le,
};

impl<R: RegisterAccess, D: DelayNs> OmapSdhc<R, D> {
    pub fn config_block(&mut self, block_len: u32, block_count: u32) {
        let blk = BLK_BLEN.encode(block_len) | BLK_NBLK.encode(block_count);
        debug!("SD_BLK register is {:#x}", blk);
        self.regs.write_reg32(MMCHS_BLK, blk);
    }

    pub fn clear_fifo(&mut self) {
        if self.status().contains(IntStatus::BRR) {
            for _ in 0..FIFO_WORDS {
                self.regs.read_reg32(MMCHS_DATA);
            }
        }
        self.regs.write_reg32(MMCHS_STAT, IntStatus::BRR.bits());
    }

    /// Drains a `transfer_len` byte transfer from the data FIFO, keeping the
    /// first `buf.len()` bytes.
    ///
    /// The controller raises buffer-read-ready once per `watermark` words and
    /// always presents whole bursts, so every burst is read completely. Words
    /// past the end of `buf` are read and dropped.
    pub fn read_data(
        &mut self,
        buf: &mut [u8],
        transfer_len: usize,
        watermark: usize,
    ) -> MmcHostResult {
        if watermark == 0 || transfer_len < buf.len() {
            return Err(MmcHostError::InvalidArgument);
        }

        self.regs.set_bits32(MMCHS_IE, IE_DATA_MASK);

        let burst = 4 * watermark;
        let bursts = transfer_len.div_ceil(burst);
        debug!(
            "Reading {} of {} bytes: {} bursts of {} words",
            buf.len(),
            transfer_len,
            bursts,
            watermark
        );

        for index in 0..bursts {
            self.wait_buffer_ready()?;

            let start = index * burst;
            for word in 0..watermark {
                let val = self.regs.read_reg32(MMCHS_DATA);
                let offset = start + 4 * word;
                if offset < buf.len() {
                    let end = buf.len().min(offset + 4);
                    unpack_word_le(val, &mut buf[offset..end]);
                }
            }
        }

        self.wait_transfer_complete()?;
        self.check_transfer()
    }

    fn wait_buffer_ready(&mut self) -> MmcHostResult {
        let budget = self.config.buffer_ready;
        let ready = self.poll(budget, |regs| {
            regs.read_reg32(MMCHS_PSTATE) & PresentState::BRE.bits() != 0
                || regs.read_reg32(MMCHS_STAT) & IntStatus::DATA_ERROR.bits() != 0
        });
        if !ready {
            warn!("Buffer never became ready");
            return Err(MmcHostError::DataTimeout);
        }

        let status = self.status();
        if status.intersects(IntStatus::DATA_ERROR) {
            warn!("Data error while waiting for buffer: {:#010x}", status.bits());
            return Err(MmcHostError::DataTransferError {
                status: status.bits(),
            });
        }

        trace!("Buffer ready");
        Ok(())
    }

    fn wait_transfer_complete(&mut self) -> MmcHostResult {
        let mask = (IntStatus::TC | IntStatus::DATA_ERROR).bits();
        let budget = self.config.transfer_complete;
        if !self.poll(budget, |regs| regs.read_reg32(MMCHS_STAT) & mask != 0) {
            warn!("Transfer never completed");
            return Err(MmcHostError::DataTimeout);
        }
        Ok(())
    }

    fn check_transfer(&mut self) -> MmcHostResult {
        let status = self.status();
        self.last_status = status.bits();

        if status.contains(IntStatus::TC) && !status.intersects(IntStatus::DATA_ERROR) {
            Ok(())
        } else {
            warn!("Error transfer status: {:#010x}", status.bits());
            Err(MmcHostError::DataTransferError {
                status: status.bits(),
            })
        }
    }
}
