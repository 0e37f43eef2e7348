//! Register-level model of an MMCHS controller with one eMMC card attached.

extern crate std;

use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    vec::Vec,
};

use embedded_hal::delay::DelayNs;

use super::regs::*;
use crate::{
    card::CardState,
    constants::*,
    regs::RegisterAccess,
};

pub(crate) struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IssuedCommand {
    pub index: u8,
    pub arg: u32,
    pub raw: u32,
}

pub(crate) const SIM_CID: [u32; 4] = [0x1234_5678, 0x9ABC_DEF0, 0x0F1E_2D3C, 0x4B5A_6978];
/// CSD_STRUCTURE 2, SPEC_VERS 4.
pub(crate) const SIM_CSD: [u32; 4] = [0x0000_0001, 0x0000_0002, 0x0000_0003, 0x9000_0000];

struct SimCard {
    state: CardState,
    rca: u16,
    op_cond_calls: u32,
    ready_after: u32,
    high_capacity: bool,
    block_len: u32,
    ext_csd: [u8; EXT_CSD_LEN],
    switch_args: Vec<u32>,
}

impl SimCard {
    fn new() -> Self {
        let mut ext_csd = [0u8; EXT_CSD_LEN];
        ext_csd[EXT_CSD_STRUCTURE] = 2;
        ext_csd[EXT_CSD_BOOT_INFO] = EXT_CSD_BOOT_INFO_DDR;
        ext_csd[EXT_CSD_PART_CONF] = 0x48;
        ext_csd[EXT_CSD_BOOT_BUS_WIDTH] = 0x02;

        SimCard {
            state: CardState::Idle,
            rca: 0,
            op_cond_calls: 0,
            ready_after: 5,
            high_capacity: true,
            block_len: MMC_BLOCK_LEN,
            ext_csd,
            switch_args: Vec::new(),
        }
    }

    fn r1(&self, state: CardState) -> [u32; 4] {
        [
            (state as u32) << MMC_STATUS_CURR_STATE_SHIFT | MMC_STATUS_READY_FOR_DATA,
            0,
            0,
            0,
        ]
    }

    /// Handles one command, returning the response words and any read data.
    fn respond(&mut self, index: u8, arg: u32, block_count: u32) -> ([u32; 4], Vec<u8>) {
        let mut data = Vec::new();
        let resp = match index {
            MMC_GO_IDLE_STATE => {
                self.state = CardState::Idle;
                self.op_cond_calls = 0;
                [0; 4]
            }
            MMC_SEND_OP_COND => {
                self.op_cond_calls += 1;
                let mut ocr = 0x00FF_8080;
                if self.op_cond_calls >= self.ready_after {
                    self.state = CardState::Ready;
                    ocr |= OCR_BUSY;
                    if self.high_capacity {
                        ocr |= MMC_OCR_HC_RESP_VAL;
                    }
                }
                [ocr, 0, 0, 0]
            }
            MMC_ALL_SEND_CID => {
                if self.state == CardState::Ready {
                    self.state = CardState::Ident;
                }
                SIM_CID
            }
            MMC_SET_RELATIVE_ADDR => {
                let resp = self.r1(self.state);
                self.rca = (arg >> RCA_SHIFT) as u16;
                self.state = CardState::Stby;
                resp
            }
            MMC_SEND_CSD => SIM_CSD,
            MMC_SELECT_CARD => {
                let resp = self.r1(self.state);
                if (arg >> RCA_SHIFT) as u16 == self.rca {
                    self.state = CardState::Tran;
                } else if self.state == CardState::Tran {
                    self.state = CardState::Stby;
                }
                resp
            }
            MMC_SEND_STATUS => self.r1(self.state),
            MMC_SWITCH => {
                self.switch_args.push(arg);
                // Write-byte access mode
                if (arg >> 24) & 0x3 == 0x3 {
                    let index = ((arg >> 16) & 0xFF) as usize;
                    self.ext_csd[index] = (arg >> 8) as u8;
                }
                self.r1(self.state)
            }
            MMC_SET_BLOCKLEN => {
                self.block_len = arg;
                self.r1(self.state)
            }
            MMC_SEND_EXT_CSD => {
                data.extend_from_slice(&self.ext_csd);
                self.r1(self.state)
            }
            MMC_READ_MULTIPLE_BLOCK => {
                let lba = if self.high_capacity {
                    arg
                } else {
                    arg / self.block_len
                };
                for block in 0..block_count {
                    data.extend_from_slice(&block_data(lba + block));
                }
                self.r1(self.state)
            }
            _ => self.r1(self.state),
        };
        (resp, data)
    }
}

/// Content the simulated card stores at `lba`.
pub(crate) fn block_data(lba: u32) -> [u8; 512] {
    let mut block = [0u8; 512];
    for (i, byte) in block.iter_mut().enumerate() {
        *byte = (lba as usize * 31 + i * 7) as u8;
    }
    block
}

struct SimState {
    regs: BTreeMap<u32, u32>,
    fifo: VecDeque<u32>,
    /// Words left before the transfer described by SD_BLK completes.
    pending_words: usize,
    data_reads: usize,
    over_reads: usize,
    line_resets: Vec<u32>,
    commands: Vec<IssuedCommand>,
    card: SimCard,
    fail_opcode: Option<u8>,
    silent_opcode: Option<u8>,
    status_state: Option<CardState>,
    lines_busy: bool,
    hold_lines_on_error: bool,
    stall_line_reset: bool,
    clock_unstable: bool,
}

impl SimState {
    fn reg(&self, offset: u32) -> u32 {
        self.regs.get(&offset).copied().unwrap_or(0)
    }

    fn set_status(&mut self, bits: u32) {
        let stat = self.reg(MMCHS_STAT);
        self.regs.insert(MMCHS_STAT, stat | bits);
    }

    fn push_data(&mut self, data: &[u8], transfer_words: usize) {
        for word in data.chunks(4) {
            let mut bytes = [0u8; 4];
            bytes[..word.len()].copy_from_slice(word);
            self.fifo.push_back(u32::from_le_bytes(bytes));
        }
        self.pending_words = transfer_words;
        self.set_status(IntStatus::BRR.bits());
    }

    fn read_data_port(&mut self) -> u32 {
        self.data_reads += 1;
        let Some(word) = self.fifo.pop_front() else {
            self.over_reads += 1;
            return 0;
        };
        if self.pending_words > 0 {
            self.pending_words -= 1;
            if self.pending_words == 0 {
                self.set_status(IntStatus::TC.bits());
            }
        }
        word
    }

    fn command(&mut self, raw: u32) {
        if self.reg(MMCHS_CON) & CON_INIT != 0 {
            self.set_status(IntStatus::CC.bits());
            return;
        }

        let index = CMD_INDX.get(raw) as u8;
        let arg = self.reg(MMCHS_ARG);
        self.commands.push(IssuedCommand { index, arg, raw });

        if self.silent_opcode == Some(index) {
            return;
        }
        if self.fail_opcode == Some(index) {
            self.set_status((IntStatus::CTO | IntStatus::ERRI).bits());
            if self.hold_lines_on_error {
                self.lines_busy = true;
            }
            return;
        }

        let blk = self.reg(MMCHS_BLK);
        let block_count = BLK_NBLK.get(blk);
        let (mut resp, data) = self.card.respond(index, arg, block_count);
        if index == MMC_SEND_STATUS {
            if let Some(state) = self.status_state {
                resp = self.card.r1(state);
            }
        }

        for (offset, word) in MMCHS_RSP.into_iter().zip(resp) {
            self.regs.insert(offset, word);
        }
        self.set_status(IntStatus::CC.bits());
        if CMD_DP.get(raw) != 0 && !data.is_empty() {
            let transfer_words = (block_count * BLK_BLEN.get(blk)) as usize / 4;
            self.push_data(&data, transfer_words);
        }
    }
}

pub(crate) struct SimController {
    state: RefCell<SimState>,
}

impl SimController {
    pub fn new() -> Self {
        SimController {
            state: RefCell::new(SimState {
                regs: BTreeMap::new(),
                fifo: VecDeque::new(),
                pending_words: 0,
                data_reads: 0,
                over_reads: 0,
                line_resets: Vec::new(),
                commands: Vec::new(),
                card: SimCard::new(),
                fail_opcode: None,
                silent_opcode: None,
                status_state: None,
                lines_busy: false,
                hold_lines_on_error: false,
                stall_line_reset: false,
                clock_unstable: false,
            }),
        }
    }

    /// Raw register storage, without computed read-only bits.
    pub fn reg(&self, offset: u32) -> u32 {
        self.state.borrow().reg(offset)
    }

    /// Queues `data` as one transfer, completing once all of it is read.
    pub fn start_read(&self, data: &[u8]) {
        let words = data.len().div_ceil(4);
        self.state.borrow_mut().push_data(data, words);
    }

    pub fn set_status(&self, status: IntStatus) {
        self.state.borrow_mut().set_status(status.bits());
    }

    pub fn inject_data_error(&self, status: IntStatus) {
        self.state
            .borrow_mut()
            .set_status((status | IntStatus::ERRI).bits());
    }

    pub fn fail_command(&self, opcode: u8) {
        self.state.borrow_mut().fail_opcode = Some(opcode);
    }

    pub fn silence_command(&self, opcode: u8) {
        self.state.borrow_mut().silent_opcode = Some(opcode);
    }

    pub fn report_state(&self, state: CardState) {
        self.state.borrow_mut().status_state = Some(state);
    }

    pub fn hold_lines_busy(&self) {
        self.state.borrow_mut().lines_busy = true;
    }

    /// A failed command leaves CMDI/DATI set until a line reset.
    pub fn hold_lines_on_error(&self) {
        self.state.borrow_mut().hold_lines_on_error = true;
    }

    pub fn stall_line_reset(&self) {
        self.state.borrow_mut().stall_line_reset = true;
    }

    pub fn hold_clock_unstable(&self) {
        self.state.borrow_mut().clock_unstable = true;
    }

    pub fn set_ready_after(&self, calls: u32) {
        self.state.borrow_mut().card.ready_after = calls;
    }

    pub fn set_high_capacity(&self, high_capacity: bool) {
        self.state.borrow_mut().card.high_capacity = high_capacity;
    }

    pub fn set_ext_csd_byte(&self, offset: usize, value: u8) {
        self.state.borrow_mut().card.ext_csd[offset] = value;
    }

    pub fn data_reads(&self) -> usize {
        self.state.borrow().data_reads
    }

    /// Data port reads that found the FIFO empty.
    pub fn over_reads(&self) -> usize {
        self.state.borrow().over_reads
    }

    /// SRC/SRD bits of every SYSCTL write that requested a line reset.
    pub fn line_resets(&self) -> Vec<u32> {
        self.state.borrow().line_resets.clone()
    }

    pub fn lines_busy(&self) -> bool {
        self.state.borrow().lines_busy
    }

    pub fn fifo_len(&self) -> usize {
        self.state.borrow().fifo.len()
    }

    pub fn commands(&self) -> Vec<IssuedCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn command_indices(&self) -> Vec<u8> {
        self.state.borrow().commands.iter().map(|c| c.index).collect()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    pub fn op_cond_calls(&self) -> u32 {
        self.state.borrow().card.op_cond_calls
    }

    pub fn card_rca(&self) -> u16 {
        self.state.borrow().card.rca
    }

    pub fn switch_args(&self) -> Vec<u32> {
        self.state.borrow().card.switch_args.clone()
    }
}

impl RegisterAccess for SimController {
    fn read_reg32(&self, offset: u32) -> u32 {
        let mut state = self.state.borrow_mut();
        match offset {
            MMCHS_SYSSTATUS => SYSSTATUS_RESETDONE,
            MMCHS_PSTATE => {
                let mut pstate = PresentState::empty();
                if state.lines_busy {
                    pstate |= PresentState::CMDI | PresentState::DATI;
                }
                if !state.fifo.is_empty() {
                    pstate |= PresentState::BRE;
                }
                pstate.bits()
            }
            MMCHS_SYSCTL => {
                let sysctl = state.reg(MMCHS_SYSCTL);
                if sysctl & SYSCTL_ICE != 0 && !state.clock_unstable {
                    sysctl | SYSCTL_ICS
                } else {
                    sysctl
                }
            }
            MMCHS_DATA => state.read_data_port(),
            _ => state.reg(offset),
        }
    }

    fn write_reg32(&self, offset: u32, value: u32) {
        let mut state = self.state.borrow_mut();
        match offset {
            MMCHS_STAT => {
                let stat = state.reg(MMCHS_STAT);
                state.regs.insert(MMCHS_STAT, stat & !value);
            }
            MMCHS_SYSCTL => {
                let line_reset = value & (SYSCTL_SRC | SYSCTL_SRD);
                if line_reset != 0 {
                    state.line_resets.push(line_reset);
                }

                // Resets complete instantly unless stalled, ICS is read-only
                let mut self_clearing = SYSCTL_ICS | SYSCTL_SRA;
                if !state.stall_line_reset {
                    self_clearing |= SYSCTL_SRC | SYSCTL_SRD;
                    if line_reset != 0 {
                        state.lines_busy = false;
                    }
                }
                state.regs.insert(MMCHS_SYSCTL, value & !self_clearing);
            }
            MMCHS_CMD => {
                state.regs.insert(MMCHS_CMD, value);
                state.command(value);
            }
            _ => {
                state.regs.insert(offset, value);
            }
        }
    }
}
