use core::cell::Cell;
use std::{collections::BTreeMap, vec::Vec};

use crate::{
    Delay, Memory, Transport,
    boot::Boot,
    clock::{ClockConfig, ClockControl},
    indicator::{Indicator, Indicators},
    intent::BackupDomain,
    store::{KeyValueStore, StoreError},
    upload::UploadSignal,
    vectors::VectorTableBase,
};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Event {
    HseOn,
    FlashConfigured { latency: u8, prefetch: bool },
    PllConfigured(ClockConfig),
    PllOn,
    PllSelected,
    Write { addr: u32, value: u32 },
    Vtor(u32),
    BackupClocks(bool),
    BackupUnlocked(bool),
    BackupWrite(u16),
}

impl Event {
    fn is_clock(&self) -> bool {
        matches!(
            self,
            Event::HseOn
                | Event::FlashConfigured { .. }
                | Event::PllConfigured(_)
                | Event::PllOn
                | Event::PllSelected
        )
    }

    fn is_backup(&self) -> bool {
        matches!(
            self,
            Event::BackupClocks(_) | Event::BackupUnlocked(_) | Event::BackupWrite(_)
        )
    }
}

/// Chip without peripherals: records what is done to it.
///
/// Memory that was never written reads as erased flash.
#[derive(Clone, Debug)]
pub struct MockPlatform {
    pub events: Vec<Event>,
    pub memory: BTreeMap<u32, u32>,
    pub vtor: Option<u32>,
    pub backup: u16,
    pub backup_clocks: bool,
    pub backup_unlocked: bool,
    /// Number of polls before each ready flag comes up.
    pub ready_after: u32,
    pub polls: Cell<u32>,
    hse_polls: Cell<u32>,
    pll_polls: Cell<u32>,
    sws_polls: Cell<u32>,
}

impl MockPlatform {
    pub fn new() -> Self {
        MockPlatform {
            events: Vec::new(),
            memory: BTreeMap::new(),
            vtor: None,
            backup: 0,
            backup_clocks: false,
            backup_unlocked: false,
            ready_after: 1,
            polls: Cell::new(0),
            hse_polls: Cell::new(0),
            pll_polls: Cell::new(0),
            sws_polls: Cell::new(0),
        }
    }

    pub fn clock_events(&self) -> Vec<Event> {
        self.events.iter().copied().filter(Event::is_clock).collect()
    }

    pub fn backup_events(&self) -> Vec<Event> {
        self.events.iter().copied().filter(Event::is_backup).collect()
    }

    fn poll(&self, counter: &Cell<u32>) -> bool {
        self.polls.set(self.polls.get() + 1);
        counter.set(counter.get() + 1);
        counter.get() >= self.ready_after
    }
}

impl ClockControl for MockPlatform {
    fn enable_hse(&mut self) {
        self.events.push(Event::HseOn);
    }

    fn hse_ready(&self) -> bool {
        self.poll(&self.hse_polls)
    }

    fn configure_flash(&mut self, latency: u8, prefetch: bool) {
        self.events.push(Event::FlashConfigured { latency, prefetch });
    }

    fn configure_pll(&mut self, config: &ClockConfig) {
        self.events.push(Event::PllConfigured(*config));
    }

    fn enable_pll(&mut self) {
        self.events.push(Event::PllOn);
    }

    fn pll_ready(&self) -> bool {
        self.poll(&self.pll_polls)
    }

    fn select_pll(&mut self) {
        self.events.push(Event::PllSelected);
    }

    fn pll_selected(&self) -> bool {
        self.poll(&self.sws_polls)
    }
}

impl BackupDomain for MockPlatform {
    fn enable_clocks(&mut self) {
        self.backup_clocks = true;
        self.events.push(Event::BackupClocks(true));
    }

    fn disable_clocks(&mut self) {
        self.backup_clocks = false;
        self.events.push(Event::BackupClocks(false));
    }

    fn unlock(&mut self) {
        self.backup_unlocked = true;
        self.events.push(Event::BackupUnlocked(true));
    }

    fn lock(&mut self) {
        self.backup_unlocked = false;
        self.events.push(Event::BackupUnlocked(false));
    }

    fn read(&self) -> u16 {
        assert!(self.backup_clocks, "backup register read without clocks");
        self.backup
    }

    fn write(&mut self, value: u16) {
        assert!(self.backup_unlocked, "backup register write while locked");
        self.backup = value;
        self.events.push(Event::BackupWrite(value));
    }
}

impl Memory for MockPlatform {
    fn read_word(&self, addr: u32) -> u32 {
        self.memory.get(&addr).copied().unwrap_or(0xFFFF_FFFF)
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        self.memory.insert(addr, value);
        self.events.push(Event::Write { addr, value });
    }
}

impl VectorTableBase for MockPlatform {
    fn set_vector_table(&mut self, addr: u32) {
        self.vtor = Some(addr);
        self.events.push(Event::Vtor(addr));
    }
}

/// Way the bootloader left, raised as panic payload by [`MockBoot`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terminal {
    Jump(u32),
    Reset,
}

pub struct MockBoot;

impl Boot for MockBoot {
    unsafe fn boot(addr: *const u32) -> ! {
        std::panic::panic_any(Terminal::Jump(addr as u32))
    }

    fn reset() -> ! {
        std::panic::panic_any(Terminal::Reset)
    }
}

pub struct MockStore(Result<u16, StoreError>);

impl MockStore {
    pub fn absent() -> Self {
        MockStore(Err(StoreError::NotFound))
    }

    pub fn failing() -> Self {
        MockStore(Err(StoreError::Io))
    }

    pub fn with(value: u16) -> Self {
        MockStore(Ok(value))
    }
}

impl KeyValueStore for MockStore {
    fn read(&mut self, _key: u16) -> Result<u16, StoreError> {
        self.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TransportEvent {
    Init,
    Shutdown,
}

#[derive(Default)]
pub struct MockTransport {
    pub events: Vec<TransportEvent>,
}

impl Transport for MockTransport {
    fn init(&mut self) {
        self.events.push(TransportEvent::Init);
    }

    fn shutdown(&mut self) {
        self.events.push(TransportEvent::Shutdown);
    }
}

#[derive(Default)]
pub struct MockIndicators {
    pub initialized: bool,
    pub released: bool,
    pub activity: bool,
    pub activity_toggles: usize,
    pub status: bool,
    pub status_history: Vec<bool>,
}

impl Indicators for MockIndicators {
    fn pins_init(&mut self) {
        self.initialized = true;
    }

    fn set(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Activity => {
                self.activity = on;
                self.activity_toggles += 1;
            }
            Indicator::Status => {
                self.status = on;
                self.status_history.push(on);
            }
        }
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Records delays, and stands in for the transport interrupt by raising the upload flags after
/// a set number of delay calls.
pub struct MockDelay<'a> {
    signal: &'a UploadSignal,
    start_after: Option<usize>,
    finish_after: Option<usize>,
    pub counts: Vec<u32>,
}

impl<'a> MockDelay<'a> {
    pub fn new(signal: &'a UploadSignal) -> Self {
        Self {
            signal,
            start_after: None,
            finish_after: None,
            counts: Vec::new(),
        }
    }

    pub fn start_after(self, calls: usize) -> Self {
        Self {
            start_after: Some(calls),
            ..self
        }
    }

    pub fn finish_after(self, calls: usize) -> Self {
        Self {
            finish_after: Some(calls),
            ..self
        }
    }
}

impl Delay for MockDelay<'_> {
    fn delay(&mut self, count: u32) {
        self.counts.push(count);

        let calls = Some(self.counts.len());
        if calls == self.start_after {
            self.signal.mark_started();
        }
        if calls == self.finish_after {
            self.signal.mark_finished();
        }
    }
}
