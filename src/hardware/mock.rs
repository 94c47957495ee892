//! Scripted in-memory collaborators for driving the core in tests.
//!
//! Each mock is held behind `Rc<RefCell<…>>`: the boxed clone goes into
//! the [`Board`] under test while the test keeps its own handle for
//! scripting inputs and inspecting what the core did. Scripted boolean
//! lines pop queued values and then repeat the last one, which mirrors a
//! level-triggered signal pin.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use super::{
    BlockStorage, Board, Clock, HostLink, Indicators, LogVolume, OpenMode, SerialLink,
    SignalLines, SystemTimer, Timestamp, Watchdog,
};
use crate::disk::StorageGuard;
use crate::settings::Settings;

fn next_level(queue: &mut VecDeque<bool>, last: &mut bool) -> bool {
    if let Some(value) = queue.pop_front() {
        *last = value;
    }
    *last
}

// MockSerial ==================================================================

#[derive(Default)]
pub(crate) struct MockSerial {
    /// Baud rates passed to `initialize`, in call order.
    pub initialized_rates: Vec<u32>,
    /// Scripted `has_line_error` answers; empty means "no error".
    pub line_errors: VecDeque<bool>,
    /// Scripted `available_len` answers; empty falls back to the real
    /// length of `data`.
    pub available: VecDeque<usize>,
    /// Bytes served to `receive` in order.
    pub data: VecDeque<u8>,
    pub cleared: usize,
    /// Everything passed to `transmit`.
    pub sent: Vec<u8>,
}

impl SerialLink for Rc<RefCell<MockSerial>> {
    fn initialize(&mut self, settings: &Settings) {
        self.borrow_mut().initialized_rates.push(settings.baud_rate);
    }

    fn available_len(&mut self) -> usize {
        let mut mock = self.borrow_mut();
        match mock.available.pop_front() {
            Some(len) => len,
            None => mock.data.len(),
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        let mut mock = self.borrow_mut();
        let mut copied = 0;
        while copied < buf.len() {
            match mock.data.pop_front() {
                Some(byte) => {
                    buf[copied] = byte;
                    copied += 1;
                }
                None => break,
            }
        }
        copied
    }

    fn clear_receive(&mut self) {
        // Seeded bytes model traffic arriving after initialization, so
        // clearing only counts; it does not wipe the script.
        self.borrow_mut().cleared += 1;
    }

    fn has_line_error(&mut self) -> bool {
        self.borrow_mut().line_errors.pop_front().unwrap_or(false)
    }

    fn transmit(&mut self, bytes: &[u8]) {
        self.borrow_mut().sent.extend_from_slice(bytes);
    }
}

// MockStorage =================================================================

pub(crate) struct MockStorage {
    pub mounted: bool,
    pub mounts: usize,
    pub unmounts: usize,
    pub fail_init: bool,
    pub fail_mount: bool,
    pub fail_unmount: bool,
    pub block: usize,
}

impl Default for MockStorage {
    fn default() -> Self {
        MockStorage {
            mounted: false,
            mounts: 0,
            unmounts: 0,
            fail_init: false,
            fail_mount: false,
            fail_unmount: false,
            block: 512,
        }
    }
}

impl BlockStorage for Rc<RefCell<MockStorage>> {
    fn init(&mut self) -> bool {
        !self.borrow().fail_init
    }

    fn mount(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_mount {
            return false;
        }
        mock.mounted = true;
        mock.mounts += 1;
        true
    }

    fn unmount(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_unmount {
            return false;
        }
        mock.mounted = false;
        mock.unmounts += 1;
        true
    }

    fn is_mounted(&self) -> bool {
        self.borrow().mounted
    }

    fn format(&mut self) -> bool {
        true
    }

    fn block_size(&self) -> usize {
        self.borrow().block
    }
}

// MockVolume ==================================================================

#[derive(Default)]
pub(crate) struct MockVolume {
    pub files: BTreeMap<String, Vec<u8>>,
    /// Names passed to `create_if_absent`/`create_always`, in call order.
    pub created: Vec<String>,
    pub open: Option<String>,
    pub pos: usize,
    pub fail_create: bool,
    pub fail_open: bool,
    pub fail_seek: bool,
    pub fail_write: bool,
    /// Per-attempt caps on how many bytes `write` accepts; empty means
    /// unlimited. Used to exercise the partial-write retry policy.
    pub write_caps: VecDeque<usize>,
}

impl LogVolume for Rc<RefCell<MockVolume>> {
    fn create_if_absent(&mut self, name: &str) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_create {
            return false;
        }
        mock.files.entry(name.to_owned()).or_insert_with(Vec::new);
        mock.created.push(name.to_owned());
        true
    }

    fn create_always(&mut self, name: &str) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_create {
            return false;
        }
        mock.files.insert(name.to_owned(), Vec::new());
        mock.created.push(name.to_owned());
        true
    }

    fn open(&mut self, name: &str, _mode: OpenMode) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_open || !mock.files.contains_key(name) {
            return false;
        }
        mock.open = Some(name.to_owned());
        mock.pos = 0;
        true
    }

    fn close(&mut self) -> bool {
        self.borrow_mut().open = None;
        true
    }

    fn seek_to_end(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        if mock.fail_seek {
            return false;
        }
        let end = match &mock.open {
            Some(name) => mock.files[name].len(),
            None => return false,
        };
        mock.pos = end;
        true
    }

    fn write(&mut self, bytes: &[u8]) -> Option<usize> {
        let mut mock = self.borrow_mut();
        if mock.fail_write {
            return None;
        }
        let cap = mock.write_caps.pop_front().unwrap_or(usize::MAX);
        let n = bytes.len().min(cap);
        let pos = mock.pos;
        let name = mock.open.clone()?;
        let file = mock.files.get_mut(&name)?;
        if file.len() < pos + n {
            file.resize(pos + n, 0);
        }
        file[pos..pos + n].copy_from_slice(&bytes[..n]);
        mock.pos = pos + n;
        Some(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let mut mock = self.borrow_mut();
        let pos = mock.pos;
        let name = mock.open.clone()?;
        let file = &mock.files[&name];
        let n = buf.len().min(file.len().saturating_sub(pos));
        buf[..n].copy_from_slice(&file[pos..pos + n]);
        mock.pos = pos + n;
        Some(n)
    }

    fn size(&self) -> u64 {
        let mock = self.borrow();
        match &mock.open {
            Some(name) => mock.files[name].len() as u64,
            None => 0,
        }
    }
}

// MockSignals =================================================================

#[derive(Default)]
pub(crate) struct MockSignals {
    pub media: VecDeque<bool>,
    pub media_last: bool,
    pub write_protect: VecDeque<bool>,
    pub write_protect_last: bool,
    pub host: VecDeque<bool>,
    pub host_last: bool,
}

impl SignalLines for Rc<RefCell<MockSignals>> {
    fn media_present(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        let mock = &mut *mock;
        next_level(&mut mock.media, &mut mock.media_last)
    }

    fn write_protected(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        let mock = &mut *mock;
        next_level(&mut mock.write_protect, &mut mock.write_protect_last)
    }

    fn host_present(&mut self) -> bool {
        let mut mock = self.borrow_mut();
        let mock = &mut *mock;
        next_level(&mut mock.host, &mut mock.host_last)
    }
}

// MockHostLink ================================================================

#[derive(Default)]
pub(crate) struct MockHostLink {
    pub exposed: usize,
}

impl HostLink for Rc<RefCell<MockHostLink>> {
    fn expose(&mut self) {
        self.borrow_mut().exposed += 1;
    }
}

// MockWatchdog ================================================================

#[derive(Default)]
pub(crate) struct MockWatchdog {
    pub refreshes: usize,
}

impl Watchdog for Rc<RefCell<MockWatchdog>> {
    fn refresh(&mut self) {
        self.borrow_mut().refreshes += 1;
    }
}

// MockTimer ===================================================================

#[derive(Default)]
pub(crate) struct MockTimer {
    pub delays: Vec<u32>,
}

impl SystemTimer for Rc<RefCell<MockTimer>> {
    fn delay_ms(&mut self, ms: u32) {
        self.borrow_mut().delays.push(ms);
    }
}

// MockClock ===================================================================

pub(crate) struct MockClock {
    /// Scripted timestamps, served first.
    pub times: VecDeque<Timestamp>,
    /// Once the script runs dry, each call returns this and then advances
    /// it by one minute, so consecutive log file names stay distinct.
    pub last: Timestamp,
}

impl Default for MockClock {
    fn default() -> Self {
        MockClock {
            times: VecDeque::new(),
            last: Timestamp {
                hour: 12,
                minute: 0,
                day: 3,
                month: 4,
                year: 19,
            },
        }
    }
}

impl Clock for Rc<RefCell<MockClock>> {
    fn now(&mut self) -> Timestamp {
        let mut mock = self.borrow_mut();
        if let Some(time) = mock.times.pop_front() {
            mock.last = time;
            return time;
        }
        let time = mock.last;
        mock.last.minute = (mock.last.minute + 1) % 60;
        if mock.last.minute == 0 {
            mock.last.hour = (mock.last.hour + 1) % 24;
        }
        time
    }
}

// MockIndicators ==============================================================

#[derive(Default)]
pub(crate) struct MockIndicators {
    pub run: bool,
    pub fault: bool,
    /// Indicator edges in call order, for asserting blink sequences.
    pub events: Vec<&'static str>,
}

impl Indicators for Rc<RefCell<MockIndicators>> {
    fn run_on(&mut self) {
        let mut mock = self.borrow_mut();
        mock.run = true;
        mock.events.push("run_on");
    }

    fn run_off(&mut self) {
        let mut mock = self.borrow_mut();
        mock.run = false;
        mock.events.push("run_off");
    }

    fn fault_on(&mut self) {
        let mut mock = self.borrow_mut();
        mock.fault = true;
        mock.events.push("fault_on");
    }

    fn fault_off(&mut self) {
        let mut mock = self.borrow_mut();
        mock.fault = false;
        mock.events.push("fault_off");
    }
}

// MockBoard ===================================================================

/// Handles to every mock on a [`Board`] under test.
pub(crate) struct MockBoard {
    pub serial: Rc<RefCell<MockSerial>>,
    pub storage: Rc<RefCell<MockStorage>>,
    pub volume: Rc<RefCell<MockVolume>>,
    pub signals: Rc<RefCell<MockSignals>>,
    pub host_link: Rc<RefCell<MockHostLink>>,
    pub watchdog: Rc<RefCell<MockWatchdog>>,
    pub timer: Rc<RefCell<MockTimer>>,
    pub clock: Rc<RefCell<MockClock>>,
    pub indicators: Rc<RefCell<MockIndicators>>,
}

impl MockBoard {
    /// A board wired entirely to fresh mocks, plus the handles to drive
    /// them.
    pub fn new() -> (Board, MockBoard) {
        let handles = MockBoard {
            serial: Rc::new(RefCell::new(MockSerial::default())),
            storage: Rc::new(RefCell::new(MockStorage::default())),
            volume: Rc::new(RefCell::new(MockVolume::default())),
            signals: Rc::new(RefCell::new(MockSignals::default())),
            host_link: Rc::new(RefCell::new(MockHostLink::default())),
            watchdog: Rc::new(RefCell::new(MockWatchdog::default())),
            timer: Rc::new(RefCell::new(MockTimer::default())),
            clock: Rc::new(RefCell::new(MockClock::default())),
            indicators: Rc::new(RefCell::new(MockIndicators::default())),
        };
        let board = Board {
            link: Box::new(handles.serial.clone()),
            disk: StorageGuard::new(Box::new(handles.storage.clone())),
            volume: Box::new(handles.volume.clone()),
            signals: Box::new(handles.signals.clone()),
            host_link: Box::new(handles.host_link.clone()),
            watchdog: Box::new(handles.watchdog.clone()),
            timer: Box::new(handles.timer.clone()),
            clock: Box::new(handles.clock.clone()),
            indicators: Box::new(handles.indicators.clone()),
        };
        (board, handles)
    }
}
