//! eMMC card protocol on top of an [`MmcHostOps`] controller.

pub mod block;
mod cmd;
mod ext;

use log::{debug, info};

use crate::{
    card::{AddressMode, CardSpecInfo, CardState, MmcVersion},
    config::ProtocolConfig,
    constants::*,
    host::{MmcHostError, MmcHostOps, MmcHostResult},
};

pub struct MmcHost<T: MmcHostOps> {
    host_ops: T,
    config: ProtocolConfig,
    /// Assigned by CMD3; stale after a failed negotiation.
    rca: Option<u16>,
    /// Decided by the OCR the card answers CMD1 with.
    addr_mode: Option<AddressMode>,
    spec_info: CardSpecInfo,
    version: Option<MmcVersion>,
    initialized: bool,
}

impl<T: MmcHostOps> MmcHost<T> {
    pub const fn new(host_ops: T, config: ProtocolConfig) -> Self {
        MmcHost {
            host_ops,
            config,
            rca: None,
            addr_mode: None,
            spec_info: CardSpecInfo::new(),
            version: None,
            initialized: false,
        }
    }

    pub fn host_ops(&self) -> &T {
        &self.host_ops
    }

    pub fn host_ops_mut(&mut self) -> &mut T {
        &mut self.host_ops
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn rca(&self) -> Option<u16> {
        self.rca
    }

    pub fn address_mode(&self) -> Option<AddressMode> {
        self.addr_mode
    }

    pub fn spec_info(&self) -> &CardSpecInfo {
        &self.spec_info
    }

    pub fn version(&self) -> Option<MmcVersion> {
        self.version
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Brings the controller up and walks the card from power-up to the
    /// transfer state.
    ///
    /// An unusable [`ProtocolConfig`] is refused before any register is
    /// touched. Otherwise the first failing step aborts; whatever the earlier steps learned
    /// (RCA, addressing mode) is left in place but the card is reported as
    /// uninitialized until a later call succeeds.
    pub fn init(&mut self) -> MmcHostResult {
        info!("eMMC host initialization started");
        self.initialized = false;
        self.config.validate()?;

        self.host_ops.init_host()?;
        self.host_ops.send_init_stream();

        self.go_idle()?;
        self.host_ops.reset_cmd_line()?;

        let addr_mode = self.send_op_cond()?;
        self.addr_mode = Some(addr_mode);
        info!("Card ready, {:?} addressing", addr_mode);

        let cid = self.all_send_cid()?;
        debug!(
            "CID: {:#010x} {:#010x} {:#010x} {:#010x}",
            cid[3], cid[2], cid[1], cid[0]
        );

        self.set_relative_addr()?;
        self.send_csd()?;

        self.select_card()?;
        self.check_state(CardState::Tran)?;

        self.switch_bus_width(self.config.bus_width)?;

        self.set_blocklen(self.config.block_len)?;
        self.read_ext_csd()?;

        let ext_csd = &self.spec_info.ext_csd;
        debug!(
            "EXT_CSD rev {}, bus width {}, {} sectors",
            ext_csd.revision(),
            ext_csd.byte(EXT_CSD_BUS_WIDTH),
            ext_csd.sector_count()
        );

        let version = ext_csd.version();
        self.version = Some(version);
        self.initialized = true;

        info!("eMMC host initialization complete: {}", version);
        Ok(())
    }

    fn require_initialized(&self) -> MmcHostResult {
        if self.initialized {
            Ok(())
        } else {
            Err(MmcHostError::UninitializedCard)
        }
    }
}
