//! Transport between the two parties.
//!
//! Every channel is a [scuttlebutt::AbstractChannel]: ordered, reliable and bidirectional, with an explicit flush.
//! This module provides the batch codec for [GrElement]s and the constructors of TCP, Unix domain socket and crossbeam channels.

use crate::ring::{GrElement, GR_BYTES};
use anyhow::{Context, Result};
use scuttlebutt::AbstractChannel;

pub mod sync_channel;
pub mod sync_channel_by_cb;
pub mod tcp_channel;

/// Write `v` as `v.len()` fixed-size records and flush.
///
/// No length prefix is sent: both parties agree on the batch size beforehand.
pub fn write_vec_gr<C>(channel: &mut C, v: &[GrElement]) -> Result<usize>
where
    C: AbstractChannel,
{
    let bytes = v.iter().flat_map(|x| x.to_bytes()).collect::<Vec<_>>();

    let len = bytes.len();

    channel
        .write_bytes(&bytes)
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    channel
        .flush()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    Ok(len)
}

/// Read exactly `m` records written by [write_vec_gr].
pub fn read_vec_gr<C>(channel: &mut C, m: usize) -> Result<Vec<GrElement>>
where
    C: AbstractChannel,
{
    let mut res = vec![0u8; m * GR_BYTES];

    channel
        .read_bytes(&mut res)
        .with_context(|| format!("expected {} elements @{}:{}", m, file!(), line!()))?;

    let res = res
        .chunks_exact(GR_BYTES)
        .map(|x| GrElement::from_bytes(x).with_context(|| format!("@{}:{}", file!(), line!())))
        .collect::<Result<Vec<_>>>()?;

    Ok(res)
}

/// Write a single element without flushing.
pub fn write_gr<C: AbstractChannel>(channel: &mut C, x: &GrElement) -> Result<()> {
    channel
        .write_bytes(&x.to_bytes())
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    Ok(())
}

/// Read a single element.
pub fn read_gr<C: AbstractChannel>(channel: &mut C) -> Result<GrElement> {
    let mut buf = [0u8; GR_BYTES];
    channel
        .read_bytes(&mut buf)
        .with_context(|| format!("@{}:{}", file!(), line!()))?;
    GrElement::from_bytes(&buf)
}
