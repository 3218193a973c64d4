//! CLI (CommandLine Interface) utilities for the `vole_commit` binary.
//!
//! Here, you can know the options for the protocol through enum types and structs.
//! See other modules for the actual implementation of the protocol or details of what options mean.

use crate::channel_utils::sync_channel::{create_unix_channels, UnixChannel};
use crate::channel_utils::sync_channel_by_cb::{create_crossbeam_channels, CrossbeamChannel};
use crate::channel_utils::tcp_channel::{create_tcp_channels, TcpChannel};
use crate::vole::{
    DummyVoleReceiver, DummyVoleSender, MaliciousVoleReceiver, MaliciousVoleSender,
    SecurityLevel, SemiHonestVoleReceiver, SemiHonestVoleSender, VoleReceiver, VoleSender,
    VoleShareReceiver, VoleShareSender,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use scuttlebutt::AbstractChannel;
use std::fmt::Display;

/// Which party this process plays.
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum Role {
    /// Commit to random values, connecting to `--addr`.
    Sender,
    /// Receive the commitment, listening on `--port`.
    Receiver,
    /// Run both parties in this process.
    Local,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sender => write!(f, "sender"),
            Role::Receiver => write!(f, "receiver"),
            Role::Local => write!(f, "local"),
        }
    }
}

/// How to share VOLE (a kind of correlated randomness). More details: [vole](crate::vole).
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum VoleType {
    /// Use Oblivious Transfer. See [OtVoleSender](crate::vole::OtVoleSender) or [OtVoleReceiver](crate::vole::OtVoleReceiver).
    Ot,
    /// Insecure, for testing. See [DummyVoleSender] or [DummyVoleReceiver].
    Dummy,
}

impl Display for VoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoleType::Ot => write!(f, "ot"),
            VoleType::Dummy => write!(f, "dummy"),
        }
    }
}

/// Channel types used by the `local` role. More details: [channel_utils](crate::channel_utils).
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum ChannelType {
    /// Unix domain socket. See [UnixChannel].
    Unix,
    /// TCP socket on localhost. See [TcpChannel].
    Tcp,
    /// Native channel of Rust. See [CrossbeamChannel].
    CrossBeam,
}

impl Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::Unix => write!(f, "unix"),
            ChannelType::Tcp => write!(f, "tcp"),
            ChannelType::CrossBeam => write!(f, "cross-beam"),
        }
    }
}

/// Arguments for the commitment protocol.
/// This struct implements [clap::Parser] to make that this binary has CommandLine Arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, next_line_help = true)]
pub struct Args {
    /// Party to play.
    #[arg(value_enum)]
    pub role: Role,

    /// Batch size, i.e. number of committed ring elements.
    #[arg(short = 'm', long, default_value_t = 4)]
    pub batch_size: usize,

    /// Security level of the OT based VOLE.
    #[arg(short = 'l', long = "level", default_value_t = SecurityLevel::Malicious)]
    pub level: SecurityLevel,

    /// Address of the receiver (sender role).
    #[arg(short = 'a', long = "addr", default_value = "127.0.0.1:10000")]
    pub addr: String,

    /// Port to listen on (receiver role) or to use for the TCP channel (local role).
    #[arg(short = 'p', long = "port", default_value_t = 10000)]
    pub port: u16,

    /// Channel Types (local role).
    #[arg(short = 'c', long = "channel", default_value_t = ChannelType::Unix)]
    pub channel_type: ChannelType,

    /// VOLE Sharing Methods.
    #[arg(short = 'v', long = "vole", default_value_t = VoleType::Ot)]
    pub vole_type: VoleType,

    /// Also run the opening phase.
    #[arg(long = "open", default_value_t = false)]
    pub open: bool,

    /// Verbose mode.
    ///
    /// If specified, print the committed and opened values.
    #[arg(long = "verbose", default_value_t = false)]
    pub verbose: bool,
}

/// Enum type to handle multiple channel types on runtime.
pub enum ChannelUnion {
    /// Unix domain socket. See [UnixChannel].
    Unix(UnixChannel),
    /// TCP socket. See [TcpChannel].
    Tcp(TcpChannel),
    /// Native channel of Rust. See [CrossbeamChannel].
    CrossBeam(CrossbeamChannel),
}

use ChannelUnion::*;

impl AbstractChannel for ChannelUnion {
    #[inline(always)]
    fn write_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Unix(c) => c.write_bytes(bytes),
            Tcp(c) => c.write_bytes(bytes),
            CrossBeam(c) => c.write_bytes(bytes),
        }
    }

    #[inline(always)]
    fn read_bytes(&mut self, bytes: &mut [u8]) -> std::io::Result<()> {
        match self {
            Unix(c) => c.read_bytes(bytes),
            Tcp(c) => c.read_bytes(bytes),
            CrossBeam(c) => c.read_bytes(bytes),
        }
    }

    #[inline(always)]
    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Unix(c) => c.flush(),
            Tcp(c) => c.flush(),
            CrossBeam(c) => c.flush(),
        }
    }

    #[inline(always)]
    fn clone(&self) -> Self {
        match self {
            Unix(c) => Unix(c.clone()),
            Tcp(c) => Tcp(c.clone()),
            CrossBeam(c) => CrossBeam(c.clone()),
        }
    }
}

/// Create a connected pair of channels in this process. Runtime utility.
///
/// Return `(sender side, receiver side)`.
pub fn create_channels(type_: ChannelType, port: u16) -> Result<(ChannelUnion, ChannelUnion)> {
    match type_ {
        ChannelType::Unix => {
            let (s, r) = create_unix_channels()?;
            Ok((Unix(s), Unix(r)))
        }
        ChannelType::Tcp => {
            let (s, r) = create_tcp_channels(port)?;
            Ok((Tcp(s), Tcp(r)))
        }
        ChannelType::CrossBeam => {
            let (s, r) = create_crossbeam_channels();
            Ok((CrossBeam(s), CrossBeam(r)))
        }
    }
}

/// Enum type to handle multiple VOLE generators for senders on runtime.
#[derive(Clone, Copy)]
pub enum VoleSenderUnion {
    /// See [DummyVoleSender].
    Dummy(DummyVoleSender),
    /// See [SemiHonestVoleSender].
    SemiHonest(SemiHonestVoleSender),
    /// See [MaliciousVoleSender].
    Malicious(MaliciousVoleSender),
}

/// Enum type to handle multiple VOLE generators for receivers on runtime.
#[derive(Clone, Copy)]
pub enum VoleReceiverUnion {
    /// See [DummyVoleReceiver].
    Dummy(DummyVoleReceiver),
    /// See [SemiHonestVoleReceiver].
    SemiHonest(SemiHonestVoleReceiver),
    /// See [MaliciousVoleReceiver].
    Malicious(MaliciousVoleReceiver),
}

impl VoleSender for VoleSenderUnion {
    fn generate<C: AbstractChannel, RNG: rand::CryptoRng + rand::Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareSender> {
        match self {
            VoleSenderUnion::Dummy(v) => v.generate(channel, rng, m),
            VoleSenderUnion::SemiHonest(v) => v.generate(channel, rng, m),
            VoleSenderUnion::Malicious(v) => v.generate(channel, rng, m),
        }
    }
}

impl VoleReceiver for VoleReceiverUnion {
    fn generate<C: AbstractChannel, RNG: rand::CryptoRng + rand::Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareReceiver> {
        match self {
            VoleReceiverUnion::Dummy(v) => v.generate(channel, rng, m),
            VoleReceiverUnion::SemiHonest(v) => v.generate(channel, rng, m),
            VoleReceiverUnion::Malicious(v) => v.generate(channel, rng, m),
        }
    }
}

/// Create VOLE sender and receiver for the protocol. Runtime utility.
///
/// `level` is ignored by the dummy generator.
pub fn create_vole_sr(
    vole_type: VoleType,
    level: SecurityLevel,
) -> (VoleSenderUnion, VoleReceiverUnion) {
    match (vole_type, level) {
        (VoleType::Dummy, _) => (
            VoleSenderUnion::Dummy(DummyVoleSender),
            VoleReceiverUnion::Dummy(DummyVoleReceiver),
        ),
        (VoleType::Ot, SecurityLevel::SemiHonest) => (
            VoleSenderUnion::SemiHonest(SemiHonestVoleSender::semi_honest()),
            VoleReceiverUnion::SemiHonest(SemiHonestVoleReceiver::semi_honest()),
        ),
        (VoleType::Ot, SecurityLevel::Malicious) => (
            VoleSenderUnion::Malicious(MaliciousVoleSender::malicious()),
            VoleReceiverUnion::Malicious(MaliciousVoleReceiver::malicious()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let args = Args::parse_from(["vole_commit", "local", "-m", "8", "-v", "dummy", "--open"]);
        assert_eq!(args.role, Role::Local);
        assert_eq!(args.batch_size, 8);
        assert_eq!(args.vole_type, VoleType::Dummy);
        assert_eq!(args.level, SecurityLevel::Malicious);
        assert_eq!(args.channel_type, ChannelType::Unix);
        assert!(args.open);

        let args = Args::parse_from(["vole_commit", "receiver", "-l", "semi-honest", "-p", "9000"]);
        assert_eq!(args.role, Role::Receiver);
        assert_eq!(args.level, SecurityLevel::SemiHonest);
        assert_eq!(args.port, 9000);

        assert!(Args::try_parse_from(["vole_commit", "observer"]).is_err());
    }

    #[test]
    fn test_create_vole_sr() {
        let (s, r) = create_vole_sr(VoleType::Ot, SecurityLevel::SemiHonest);
        assert!(matches!(s, VoleSenderUnion::SemiHonest(_)));
        assert!(matches!(r, VoleReceiverUnion::SemiHonest(_)));

        let (s, _) = create_vole_sr(VoleType::Dummy, SecurityLevel::Malicious);
        assert!(matches!(s, VoleSenderUnion::Dummy(_)));
    }

    #[test]
    fn test_channel_union() {
        let (mut s, mut r) = create_channels(ChannelType::CrossBeam, 0).unwrap();
        s.write_u64(7).unwrap();
        s.flush().unwrap();
        assert_eq!(r.read_u64().unwrap(), 7);
    }
}
