//! The captured serial link.

use crate::settings::Settings;

/// The serial receiver/transmitter whose traffic is being logged.
///
/// Reception happens inside the implementation (typically in interrupt
/// context or a driver thread); the core polls [`available_len`] and
/// drains complete blocks with [`receive`]. The single-producer /
/// single-consumer handoff is the implementation's responsibility — the
/// core only requires that `available_len` never reports more bytes than
/// a subsequent `receive` can deliver.
///
/// [`available_len`]: SerialLink::available_len
/// [`receive`]: SerialLink::receive
pub trait SerialLink {
    /// Apply the line parameters. Called once for a manually configured
    /// rate, repeatedly with candidate rates during automatic detection.
    fn initialize(&mut self, settings: &Settings);

    /// Number of received bytes waiting to be drained.
    fn available_len(&mut self) -> usize;

    /// Drain up to `buf.len()` received bytes into `buf`, returning how
    /// many were copied. Bytes are delivered in arrival order.
    fn receive(&mut self, buf: &mut [u8]) -> usize;

    /// Discard all buffered received bytes.
    fn clear_receive(&mut self);

    /// `true` when the receiver latched a line error (framing, noise,
    /// overrun) since the last `initialize` or `clear_receive`.
    fn has_line_error(&mut self) -> bool;

    /// Send bytes out the link. Used for the capture echo.
    fn transmit(&mut self, bytes: &[u8]);
}
