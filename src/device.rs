use kspin::SpinNoIrq;

use crate::{
    card::CardConfig,
    core::MmcHost,
    host::{MmcHostOps, MmcHostResult},
};

/// Shareable handle to one controller and its card.
///
/// Every operation holds the lock for its whole command/transfer sequence, so
/// at most one exchange is ever in flight on the controller.
pub struct MmcDevice<T: MmcHostOps> {
    host: SpinNoIrq<MmcHost<T>>,
}

impl<T: MmcHostOps> MmcDevice<T> {
    pub const fn new(host: MmcHost<T>) -> Self {
        MmcDevice {
            host: SpinNoIrq::new(host),
        }
    }

    pub fn initialize(&self) -> MmcHostResult {
        self.host.lock().init()
    }

    pub fn is_initialized(&self) -> bool {
        self.host.lock().is_initialized()
    }

    pub fn read_blocks(&self, buf: &mut [u8], length: usize, offset: u32) -> MmcHostResult {
        self.host.lock().read_blocks(buf, length, offset)
    }

    pub fn query_card_config(&self) -> MmcHostResult<CardConfig> {
        self.host.lock().query_card_config()
    }

    /// Runs `f` with exclusive access to the host.
    pub fn with_host<R>(&self, f: impl FnOnce(&mut MmcHost<T>) -> R) -> R {
        f(&mut self.host.lock())
    }
}
