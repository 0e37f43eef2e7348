//! MMCHS register map.

use bitflags::bitflags;

use crate::regs::BitField;

pub const MMCHS_SYSCONFIG: u32 = 0x110;
pub const MMCHS_SYSSTATUS: u32 = 0x114;
pub const MMCHS_CON: u32 = 0x12C;
pub const MMCHS_BLK: u32 = 0x204;
pub const MMCHS_ARG: u32 = 0x208;
pub const MMCHS_CMD: u32 = 0x20C;
pub const MMCHS_RSP10: u32 = 0x210;
pub const MMCHS_RSP32: u32 = 0x214;
pub const MMCHS_RSP54: u32 = 0x218;
pub const MMCHS_RSP76: u32 = 0x21C;
pub const MMCHS_DATA: u32 = 0x220;
pub const MMCHS_PSTATE: u32 = 0x224;
pub const MMCHS_HCTL: u32 = 0x228;
pub const MMCHS_SYSCTL: u32 = 0x22C;
pub const MMCHS_STAT: u32 = 0x230;
pub const MMCHS_IE: u32 = 0x234;
pub const MMCHS_CAPA: u32 = 0x240;

pub const MMCHS_RSP: [u32; 4] = [MMCHS_RSP10, MMCHS_RSP32, MMCHS_RSP54, MMCHS_RSP76];

pub const SYSCONFIG_SOFTRESET: u32 = 1 << 1;
pub const SYSSTATUS_RESETDONE: u32 = 1 << 0;

// SD_CON
pub const CON_INIT: u32 = 1 << 1;
pub const CON_DW8: u32 = 1 << 5;
pub const CON_DVAL: BitField = BitField::new(9, 2);

// SD_BLK
pub const BLK_BLEN: BitField = BitField::new(0, 12);
pub const BLK_NBLK: BitField = BitField::new(16, 16);

// SD_CMD
pub const CMD_DE: BitField = BitField::new(0, 1);
pub const CMD_BCE: BitField = BitField::new(1, 1);
pub const CMD_ACEN: BitField = BitField::new(2, 1);
pub const CMD_DDIR: BitField = BitField::new(4, 1);
pub const CMD_MSBS: BitField = BitField::new(5, 1);
pub const CMD_RSP_TYPE: BitField = BitField::new(16, 2);
pub const CMD_CCCE: BitField = BitField::new(19, 1);
pub const CMD_CICE: BitField = BitField::new(20, 1);
pub const CMD_DP: BitField = BitField::new(21, 1);
pub const CMD_TYPE: BitField = BitField::new(22, 2);
pub const CMD_INDX: BitField = BitField::new(24, 6);

pub const RSP_TYPE_NONE: u32 = 0;
pub const RSP_TYPE_136: u32 = 1;
pub const RSP_TYPE_48: u32 = 2;
pub const RSP_TYPE_48_BUSY: u32 = 3;

// SD_HCTL
pub const HCTL_DTW: u32 = 1 << 1;
pub const HCTL_SDBP: u32 = 1 << 8;
pub const HCTL_SDVS: BitField = BitField::new(9, 3);

// SD_SYSCTL
pub const SYSCTL_ICE: u32 = 1 << 0;
pub const SYSCTL_ICS: u32 = 1 << 1;
pub const SYSCTL_CEN: u32 = 1 << 2;
pub const SYSCTL_CLKD: BitField = BitField::new(6, 10);
pub const SYSCTL_DTO: BitField = BitField::new(16, 4);
pub const SYSCTL_SRA: u32 = 1 << 24;
pub const SYSCTL_SRC: u32 = 1 << 25;
pub const SYSCTL_SRD: u32 = 1 << 26;

/// Status bits observable while a command is in flight.
pub const IE_CMD_MASK: u32 = 0x327F_0033;
/// Additional bits observable during a data phase.
pub const IE_DATA_MASK: u32 = 0x007F_013F;

/// Words held by the data FIFO.
pub const FIFO_WORDS: usize = 128;

bitflags! {
    /// SD_PSTATE.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PresentState: u32 {
        const CMDI = 1 << 0;
        const DATI = 1 << 1;
        const BWE = 1 << 10;
        const BRE = 1 << 11;
    }
}

bitflags! {
    /// SD_STAT, write one to clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IntStatus: u32 {
        const CC = 1 << 0;
        const TC = 1 << 1;
        const BWR = 1 << 4;
        const BRR = 1 << 5;
        const ERRI = 1 << 15;
        const CTO = 1 << 16;
        const CCRC = 1 << 17;
        const CEB = 1 << 18;
        const CIE = 1 << 19;
        const DTO = 1 << 20;
        const DCRC = 1 << 21;
        const DEB = 1 << 22;
        const ACE = 1 << 24;

        const CMD_ERROR = Self::CTO.bits() | Self::CCRC.bits() | Self::CEB.bits() | Self::CIE.bits();
        const DATA_ERROR = Self::DTO.bits() | Self::DCRC.bits() | Self::DEB.bits();
    }
}
