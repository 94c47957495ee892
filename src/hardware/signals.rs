//! Signal lines, indicators and the host-facing storage link.

/// The polled board signal lines.
pub trait SignalLines {
    /// `true` while removable media sits in the tray.
    fn media_present(&mut self) -> bool;

    /// `true` while the media's write-protect line is asserted.
    fn write_protected(&mut self) -> bool;

    /// `true` while a host requests mass-storage access.
    fn host_present(&mut self) -> bool;
}

/// Mass-storage passthrough towards a connected host.
pub trait HostLink {
    /// Expose the block storage device over the host link. The device
    /// keeps servicing the host from interrupt context until it reboots.
    fn expose(&mut self);
}

/// The run and fault indicator LEDs.
pub trait Indicators {
    fn run_on(&mut self);
    fn run_off(&mut self);
    fn fault_on(&mut self);
    fn fault_off(&mut self);
}
