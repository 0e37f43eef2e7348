use crate::{
    card::CardStatus,
    constants::{MMC_READ_MULTIPLE_BLOCK, MMC_WRITE_MULTIPLE_BLOCK},
};

/// Data direction as seen from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// No data phase; encodes like a write.
    None,
    Write,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    None,
    /// R2: CID/CSD.
    R136,
    /// R1, R3, R6.
    R48,
    /// R1b.
    R48Busy,
}

/// One command exchange, described semantically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmcCommand {
    pub opcode: u8,
    pub arg: u32,
    pub direction: TransferDirection,
    pub response: ResponseFormat,
    pub data_present: bool,
    pub crc_check: bool,
    pub index_check: bool,
    pub block_count_enable: bool,
    pub multi_block: bool,
    /// No DMA path exists; always false.
    pub dma_enable: bool,
    pub auto_cmd12: bool,
    pub ddr: bool,
}

impl MmcCommand {
    /// Builds a command with the response checks usual for `response`:
    /// 136-bit responses carry no command index, no response has neither.
    pub fn new(opcode: u8, arg: u32, response: ResponseFormat) -> Self {
        let (crc_check, index_check) = match response {
            ResponseFormat::None => (false, false),
            ResponseFormat::R136 => (true, false),
            ResponseFormat::R48 | ResponseFormat::R48Busy => (true, true),
        };
        let multi = is_multi_block(opcode);

        Self {
            opcode,
            arg,
            direction: TransferDirection::Read,
            response,
            data_present: false,
            crc_check,
            index_check,
            block_count_enable: multi,
            multi_block: multi,
            dma_enable: false,
            auto_cmd12: multi,
            ddr: false,
        }
    }

    pub fn with_direction(mut self, direction: TransferDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_checks(mut self, crc_check: bool, index_check: bool) -> Self {
        self.crc_check = crc_check;
        self.index_check = index_check;
        self
    }

    pub fn with_data(mut self) -> Self {
        self.data_present = true;
        self
    }
}

/// Multiple-block transfers always count blocks and stop with an auto CMD12.
pub fn is_multi_block(opcode: u8) -> bool {
    opcode == MMC_READ_MULTIPLE_BLOCK || opcode == MMC_WRITE_MULTIPLE_BLOCK
}

/// Raw content of the four response registers, lowest register first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmcResponse {
    pub format: ResponseFormat,
    pub raw: [u32; 4],
}

impl MmcResponse {
    pub fn new(format: ResponseFormat, raw: [u32; 4]) -> Self {
        Self { format, raw }
    }

    pub fn as_r1(&self) -> CardStatus {
        CardStatus(self.raw[0])
    }

    pub fn as_r2(&self) -> [u32; 4] {
        self.raw
    }

    pub fn as_r3(&self) -> u32 {
        self.raw[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn default_checks_follow_response_format() {
        let cmd = MmcCommand::new(MMC_GO_IDLE_STATE, NO_ARG, ResponseFormat::None);
        assert!(!cmd.crc_check && !cmd.index_check);

        let cmd = MmcCommand::new(MMC_ALL_SEND_CID, NO_ARG, ResponseFormat::R136);
        assert!(cmd.crc_check && !cmd.index_check);

        let cmd = MmcCommand::new(MMC_SELECT_CARD, 1 << RCA_SHIFT, ResponseFormat::R48Busy);
        assert!(cmd.crc_check && cmd.index_check);
    }

    #[test]
    fn single_block_commands_have_no_auto_stop() {
        for opcode in [MMC_SET_BLOCKLEN, MMC_SEND_EXT_CSD, MMC_READ_SINGLE_BLOCK] {
            let cmd = MmcCommand::new(opcode, 0, ResponseFormat::R48).with_data();
            assert!(!cmd.block_count_enable);
            assert!(!cmd.multi_block);
            assert!(!cmd.auto_cmd12);
            assert!(!cmd.dma_enable);
        }
    }

    #[test]
    fn multi_block_commands_set_count_and_auto_stop() {
        for opcode in [MMC_READ_MULTIPLE_BLOCK, MMC_WRITE_MULTIPLE_BLOCK] {
            let cmd = MmcCommand::new(opcode, 0, ResponseFormat::R48);
            assert!(cmd.block_count_enable && cmd.multi_block && cmd.auto_cmd12);
        }
    }

    #[test]
    fn response_views() {
        let resp = MmcResponse::new(ResponseFormat::R48, [0x0000_0900, 1, 2, 3]);
        assert_eq!(resp.as_r1().0, 0x900);
        assert_eq!(resp.as_r3(), 0x900);
        assert_eq!(resp.as_r2(), [0x900, 1, 2, 3]);
    }
}
