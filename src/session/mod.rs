//! Two-party session: channel setup and one commit phase.
//!
//! The sender connects, the receiver listens. Nothing is negotiated on the wire: both sides must agree on the batch size,
//! the security level and the VOLE kind out of band.

use crate::channel_utils::tcp_channel::{connect, listen, TcpChannel, TIMEOUT};
use crate::commitment::{
    CommitError, CommitmentReceiver, CommitmentSender, Phase, ReceiverCommitment,
    SenderCommitment,
};
use crate::ring::GrElement;
use crate::vole::{
    MaliciousVoleReceiver, MaliciousVoleSender, SecurityLevel, SemiHonestVoleReceiver,
    SemiHonestVoleSender, VoleReceiver, VoleSender,
};
use log::info;
use rand::{CryptoRng, Rng};
use scuttlebutt::AbstractChannel;
use std::net::ToSocketAddrs;

pub mod bin;

/// Commit to `x` over an already established channel.
pub fn commit_over<C, V, RNG>(
    channel: &mut C,
    vole: V,
    x: &[GrElement],
    rng: &mut RNG,
) -> Result<SenderCommitment, CommitError>
where
    C: AbstractChannel,
    V: VoleSender,
    RNG: CryptoRng + Rng,
{
    CommitmentSender::new(x.len(), vole).commit(channel, rng, x)
}

/// Receive a commitment to `m` elements over an already established channel.
pub fn receive_over<C, V, RNG>(
    channel: &mut C,
    vole: V,
    m: usize,
    rng: &mut RNG,
) -> Result<ReceiverCommitment, CommitError>
where
    C: AbstractChannel,
    V: VoleReceiver,
    RNG: CryptoRng + Rng,
{
    CommitmentReceiver::new(m, vole).receive(channel, rng)
}

/// Connect to `addr` and commit to `x` with the OT based VOLE at `level`.
///
/// The channel is returned along with the commitment so that the opening can follow on the same connection.
pub fn run_sender<A, RNG>(
    addr: A,
    m: usize,
    x: &[GrElement],
    level: SecurityLevel,
    rng: &mut RNG,
) -> Result<(SenderCommitment, TcpChannel), CommitError>
where
    A: ToSocketAddrs,
    RNG: CryptoRng + Rng,
{
    if x.len() != m {
        return Err(CommitError::LengthMismatch {
            expected: m,
            actual: x.len(),
        });
    }

    let mut channel = connect(addr, TIMEOUT).map_err(CommitError::transport(Phase::Connect))?;

    info!("sender session: m = {}, level = {}", m, level);

    let commitment = match level {
        SecurityLevel::SemiHonest => {
            commit_over(&mut channel, SemiHonestVoleSender::semi_honest(), x, rng)?
        }
        SecurityLevel::Malicious => {
            commit_over(&mut channel, MaliciousVoleSender::malicious(), x, rng)?
        }
    };

    Ok((commitment, channel))
}

/// Listen on `port`, accept one sender and receive its commitment to `m` elements.
pub fn run_receiver<RNG>(
    port: u16,
    m: usize,
    level: SecurityLevel,
    rng: &mut RNG,
) -> Result<(ReceiverCommitment, TcpChannel), CommitError>
where
    RNG: CryptoRng + Rng,
{
    let mut channel = listen(port).map_err(CommitError::transport(Phase::Connect))?;

    info!("receiver session: m = {}, level = {}", m, level);

    let commitment = match level {
        SecurityLevel::SemiHonest => {
            receive_over(&mut channel, SemiHonestVoleReceiver::semi_honest(), m, rng)?
        }
        SecurityLevel::Malicious => {
            receive_over(&mut channel, MaliciousVoleReceiver::malicious(), m, rng)?
        }
    };

    Ok((commitment, channel))
}
