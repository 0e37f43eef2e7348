use core::fmt::{self, Display};

use super::MmcVersion;
use crate::{constants::*, tools::read_le_u32};

/// Raw 512-byte EXT_CSD register.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtCsd(pub [u8; EXT_CSD_LEN]);

impl ExtCsd {
    pub const fn new() -> Self {
        ExtCsd([0; EXT_CSD_LEN])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn byte(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    pub fn csd_structure(&self) -> u8 {
        self.0[EXT_CSD_STRUCTURE]
    }

    pub fn boot_info(&self) -> u8 {
        self.0[EXT_CSD_BOOT_INFO]
    }

    pub fn partition_config(&self) -> u8 {
        self.0[EXT_CSD_PART_CONF]
    }

    pub fn boot_bus_conditions(&self) -> u8 {
        self.0[EXT_CSD_BOOT_BUS_WIDTH]
    }

    pub fn revision(&self) -> u8 {
        self.0[EXT_CSD_REV]
    }

    /// SEC_COUNT, device capacity in 512-byte sectors for sector-addressed
    /// cards.
    pub fn sector_count(&self) -> u32 {
        read_le_u32(&self.0, EXT_CSD_SEC_CNT)
    }

    /// Classifies the card by EXT_CSD structure and DDR boot support.
    pub fn version(&self) -> MmcVersion {
        if self.csd_structure() == 2 {
            if self.boot_info() & EXT_CSD_BOOT_INFO_DDR != 0 {
                MmcVersion::V44
            } else {
                MmcVersion::V4x
            }
        } else {
            MmcVersion::V3x
        }
    }
}

impl Default for ExtCsd {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExtCsd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtCsd")
            .field("csd_structure", &self.csd_structure())
            .field("boot_info", &self.boot_info())
            .field("partition_config", &self.partition_config())
            .field("boot_bus_conditions", &self.boot_bus_conditions())
            .field("sector_count", &self.sector_count())
            .finish()
    }
}

/// What negotiation learned about the card's specification level.
#[derive(Debug, Clone, Default)]
pub struct CardSpecInfo {
    pub csd_structure: u8,
    pub spec_version: u8,
    pub ext_csd: ExtCsd,
}

impl CardSpecInfo {
    pub const fn new() -> Self {
        CardSpecInfo {
            csd_structure: 0,
            spec_version: 0,
            ext_csd: ExtCsd::new(),
        }
    }

    /// CSD_STRUCTURE and SPEC_VERS from the top word of an R2 response.
    pub fn set_csd(&mut self, csd: &[u32; 4]) {
        self.csd_structure = ((csd[3] & 0xC000_0000) >> 30) as u8;
        self.spec_version = ((csd[3] & 0x3C00_0000) >> 26) as u8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPartition {
    None,
    Boot1,
    Boot2,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootBusWidth {
    Bit1,
    Bit4,
    Bit8,
    Unknown(u8),
}

/// Boot configuration as reported by EXT_CSD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardConfig {
    pub version: MmcVersion,
    pub boot_partition: BootPartition,
    /// Only reported for 4.4 cards.
    pub boot_ack: Option<bool>,
    pub boot_bus_width: BootBusWidth,
    pub ddr_boot: bool,
    pub retain_boot_bus_width: bool,
}

impl CardConfig {
    pub fn from_ext_csd(ext_csd: &ExtCsd, version: MmcVersion) -> Self {
        let part = ext_csd.partition_config();
        let boot_partition = match (part & EXT_CSD_BOOT_PART_MASK) >> EXT_CSD_BOOT_PART_SHIFT {
            1 => BootPartition::Boot1,
            2 => BootPartition::Boot2,
            7 => BootPartition::User,
            _ => BootPartition::None,
        };
        let boot_ack = (version == MmcVersion::V44).then_some(part & EXT_CSD_BOOT_ACK != 0);

        let bus = ext_csd.boot_bus_conditions();
        let boot_bus_width = match bus & EXT_CSD_BOOT_BUS_MASK {
            0 => BootBusWidth::Bit1,
            1 => BootBusWidth::Bit4,
            2 => BootBusWidth::Bit8,
            other => BootBusWidth::Unknown(other),
        };

        CardConfig {
            version,
            boot_partition,
            boot_ack,
            boot_bus_width,
            ddr_boot: bus & EXT_CSD_BOOT_MODE_MASK == EXT_CSD_BOOT_MODE_DDR,
            retain_boot_bus_width: bus & EXT_CSD_BOOT_BUS_RETAIN != 0,
        }
    }
}

impl Display for CardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partition = match self.boot_partition {
            BootPartition::User => "User Partition",
            BootPartition::Boot1 => "Boot partition #1",
            BootPartition::Boot2 => "Boot partition #2",
            BootPartition::None => "No partition",
        };
        writeln!(f, "{partition} enabled for boot.")?;

        if let Some(ack) = self.boot_ack {
            let ack = if ack { "enabled" } else { "disabled" };
            writeln!(f, "Fast boot acknowledgement {ack}")?;
        }

        match self.boot_bus_width {
            BootBusWidth::Bit1 => writeln!(f, "Fast boot bus width: 1 bit")?,
            BootBusWidth::Bit4 => writeln!(f, "Fast boot bus width: 4 bit")?,
            BootBusWidth::Bit8 => writeln!(f, "Fast boot bus width: 8 bit")?,
            BootBusWidth::Unknown(raw) => writeln!(f, "Fast boot bus width: unknown ({raw})")?,
        }

        let ddr = if self.ddr_boot { "enabled" } else { "disabled" };
        writeln!(f, "DDR boot mode {ddr}")?;

        let retain = if self.retain_boot_bus_width { "Retain" } else { "Discard" };
        write!(f, "{retain} boot bus width settings.")
    }
}
