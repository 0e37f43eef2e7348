use log::info;

use super::MmcHost;
use crate::{
    card::CardConfig,
    host::{MmcHostOps, MmcHostResult},
};

impl<T: MmcHostOps> MmcHost<T> {
    /// Re-reads EXT_CSD and reports the card's boot configuration.
    pub fn query_card_config(&mut self) -> MmcHostResult<CardConfig> {
        self.require_initialized()?;

        self.read_ext_csd()?;
        let version = self.spec_info.ext_csd.version();
        self.version = Some(version);

        let config = CardConfig::from_ext_csd(&self.spec_info.ext_csd, version);
        info!("{} card configuration:\n{}", version, config);
        Ok(config)
    }
}
