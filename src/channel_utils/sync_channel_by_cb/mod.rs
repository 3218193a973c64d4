//! Module about native channel of Rust. See [crossbeam].
//! Bytes travel through an in-memory queue, so both parties have to live in the same process.

use scuttlebutt::SyncChannel;
pub mod crossbeam_wrapper;
use crossbeam_wrapper::cbch_pair;
pub use crossbeam_wrapper::{CrossbeamReceiver, CrossbeamSender};

/// Milliseconds a read waits for the next byte before reporting a short read.
pub const READ_TIMEOUT_MS: u64 = 10_000;

/// Channel over a pair of crossbeam queues.
pub type CrossbeamChannel = SyncChannel<CrossbeamReceiver<READ_TIMEOUT_MS>, CrossbeamSender>;

/// Create a connected pair of crossbeam channels.
///
/// Return `(sender side, receiver side)`.
pub fn create_crossbeam_channels() -> (CrossbeamChannel, CrossbeamChannel) {
    let (sr, rl) = cbch_pair();
    let (sl, rr) = cbch_pair();
    let left = SyncChannel::new(rl, sl);
    let right = SyncChannel::new(rr, sr);

    (left, right)
}
