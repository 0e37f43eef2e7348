// MMC command indices
pub const MMC_GO_IDLE_STATE: u8 = 0;
pub const MMC_SEND_OP_COND: u8 = 1;
pub const MMC_ALL_SEND_CID: u8 = 2;
pub const MMC_SET_RELATIVE_ADDR: u8 = 3;
pub const MMC_SWITCH: u8 = 6;
pub const MMC_SELECT_CARD: u8 = 7;
pub const MMC_SEND_EXT_CSD: u8 = 8;
pub const MMC_SEND_CSD: u8 = 9;
pub const MMC_SEND_STATUS: u8 = 13;
pub const MMC_SET_BLOCKLEN: u8 = 16;
pub const MMC_READ_SINGLE_BLOCK: u8 = 17;
pub const MMC_READ_MULTIPLE_BLOCK: u8 = 18;
pub const MMC_WRITE_MULTIPLE_BLOCK: u8 = 25;

pub const NO_ARG: u32 = 0;
pub const RCA_SHIFT: u32 = 16;

// R1 card status
pub const MMC_STATUS_CURR_STATE_SHIFT: u32 = 9;
pub const MMC_STATUS_CURR_STATE: u32 = 0xF << MMC_STATUS_CURR_STATE_SHIFT;
pub const MMC_STATUS_READY_FOR_DATA: u32 = 1 << 8;

// OCR
pub const OCR_BUSY: u32 = 0x8000_0000;
pub const MMC_HV_HC_OCR_VALUE: u32 = 0x40FF_8000;
pub const MMC_OCR_HC_BIT_MASK: u32 = 0x6000_0000;
pub const MMC_OCR_HC_RESP_VAL: u32 = 0x4000_0000;

pub const MMC_VOLT_VALID_COUNT: u32 = 3000;
pub const MMC_VOLT_VALID_DELAY_US: u32 = 300;

pub const MMC_DEFAULT_RCA: u16 = 1;
pub const MMC_BLOCK_LEN: u32 = 512;
/// Largest length SD_BLK.BLEN accepts.
pub const MMC_MAX_BLOCK_LEN: u32 = 2048;
pub const EXT_CSD_LEN: usize = 512;

/// SWITCH argument writing EXT_CSD[183] (BUS_WIDTH); the value byte is filled
/// in by the caller.
pub const MMC_SWITCH_SETBW_ARG: u32 = 0x03B7_0001;

// EXT_CSD byte offsets
pub const EXT_CSD_BOOT_BUS_WIDTH: usize = 177;
pub const EXT_CSD_PART_CONF: usize = 179;
pub const EXT_CSD_BUS_WIDTH: usize = 183;
pub const EXT_CSD_STRUCTURE: usize = 194;
pub const EXT_CSD_REV: usize = 192;
pub const EXT_CSD_SEC_CNT: usize = 212;
pub const EXT_CSD_BOOT_INFO: usize = 228;

// EXT_CSD[179] PARTITION_CONFIG
pub const EXT_CSD_BOOT_ACK: u8 = 0x40;
pub const EXT_CSD_BOOT_PART_MASK: u8 = 0x38;
pub const EXT_CSD_BOOT_PART_SHIFT: u8 = 3;

// EXT_CSD[177] BOOT_BUS_CONDITIONS
pub const EXT_CSD_BOOT_BUS_MASK: u8 = 0x03;
pub const EXT_CSD_BOOT_MODE_MASK: u8 = 0x18;
pub const EXT_CSD_BOOT_MODE_DDR: u8 = 0x10;
pub const EXT_CSD_BOOT_BUS_RETAIN: u8 = 0x04;

// EXT_CSD[228] BOOT_INFO
pub const EXT_CSD_BOOT_INFO_DDR: u8 = 0x02;
