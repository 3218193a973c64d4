//! Module about unix domain socket channel. See [UnixStream].

use anyhow::{Context, Result};
use scuttlebutt::SyncChannel;
use std::{
    io::{BufReader, BufWriter},
    os::unix::net::UnixStream,
};

/// Channel over a [UnixStream].
pub type UnixChannel = SyncChannel<BufReader<UnixStream>, BufWriter<UnixStream>>;

/// Create a connected pair of unix domain socket channels.
///
/// Return `(sender side, receiver side)`.
pub fn create_unix_channels() -> Result<(UnixChannel, UnixChannel)> {
    let (s, r) = UnixStream::pair().with_context(|| format!("@{}:{}", file!(), line!()))?;
    let rs = s
        .try_clone()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    let rr = r
        .try_clone()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    let left = SyncChannel::new(BufReader::new(rs), BufWriter::new(s));
    let right = SyncChannel::new(BufReader::new(rr), BufWriter::new(r));

    Ok((left, right))
}
