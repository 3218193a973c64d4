//! Batch commitment from a VOLE correlation.
//!
//! The sender holds $`\bm{X} \in R^m`$ and a VOLE share $`(\bm{A}, \bm{C})`$, the receiver holds $`(\Delta, \bm{B})`$ with
//! $`\bm{B} = \bm{A} \Delta + \bm{C}`$. The only message of the commit phase is the blinding
//!
//! ```math
//! \bm{D} = \bm{X} - \bm{A}
//! ```
//!
//! which is a one-time pad of $`\bm{X}`$. The receiver then holds the keys
//!
//! ```math
//! \bm{K} = \bm{B} + \bm{D} \Delta = \bm{X} \Delta + \bm{C}
//! ```
//!
//! and an opening $`(\bm{X}, \bm{C})`$ is accepted iff $`\bm{K} = \bm{X} \Delta + \bm{C}`$. Opening to another value requires
//! guessing $`\Delta`$.
//!
//! A [CommitmentSender] or [CommitmentReceiver] is consumed by its single protocol run, together with the VOLE share it obtains,
//! so correlated randomness can never be used for two commitments:
//!
//! ```compile_fail
//! use scuttlebutt::AesRng;
//! use vole_commit::channel_utils::sync_channel_by_cb::create_crossbeam_channels;
//! use vole_commit::commitment::CommitmentSender;
//! use vole_commit::ring::GrElement;
//! use vole_commit::vole::DummyVoleSender;
//!
//! let (mut channel, _peer) = create_crossbeam_channels();
//! let mut rng = AesRng::new();
//! let x = [GrElement::ONE];
//!
//! let sender = CommitmentSender::new(1, DummyVoleSender);
//! let _ = sender.commit(&mut channel, &mut rng, &x);
//! let _ = sender.commit(&mut channel, &mut rng, &x);
//! ```

use crate::ring::GrElement;
use std::fmt::Display;
use thiserror::Error;

mod receiver;
mod sender;
pub use receiver::{CommitmentReceiver, ReceiverCommitment};
pub use sender::{CommitmentSender, SenderCommitment};

/// Step of a session in which a transport failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Establishing the connection.
    Connect,
    /// Sender writes $`\bm{D}`$.
    SendBlinding,
    /// Receiver reads $`\bm{D}`$.
    ReceiveBlinding,
    /// Sender writes an [Opening].
    SendOpening,
    /// Receiver reads an [Opening].
    ReceiveOpening,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::SendBlinding => write!(f, "send blinding"),
            Phase::ReceiveBlinding => write!(f, "receive blinding"),
            Phase::SendOpening => write!(f, "send opening"),
            Phase::ReceiveOpening => write!(f, "receive opening"),
        }
    }
}

/// Errors of the commitment protocol. None of them leaves a usable partial result behind.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The VOLE step failed or aborted.
    #[error("VOLE correlation failed")]
    Correlation(#[source] anyhow::Error),
    /// A vector does not have the agreed batch size.
    #[error("vector has length {actual}, agreed batch size is {expected}")]
    LengthMismatch {
        /// Agreed batch size.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// Sending, receiving or flushing failed.
    #[error("transport failed during {phase}")]
    Transport {
        /// Where it failed.
        phase: Phase,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
    /// An opening does not match the receiver's keys.
    #[error("opening does not match the commitment at index {index}")]
    Equivocation {
        /// First mismatching position.
        index: usize,
    },
}

impl CommitError {
    pub(crate) fn transport(phase: Phase) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| CommitError::Transport { phase, source }
    }

    /// Whether starting a brand-new session (with fresh correlations) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CommitError::Correlation(_) | CommitError::Transport { .. }
        )
    }
}

/// Revealed values $`\bm{X}`$ and tags $`\bm{C}`$.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opening {
    values: Vec<GrElement>,
    tags: Vec<GrElement>,
}

impl Opening {
    /// `values` and `tags` must have the same length.
    pub fn new(values: Vec<GrElement>, tags: Vec<GrElement>) -> Result<Self, CommitError> {
        if values.len() != tags.len() {
            return Err(CommitError::LengthMismatch {
                expected: values.len(),
                actual: tags.len(),
            });
        }
        Ok(Self { values, tags })
    }

    /// Batch size.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// $`\bm{X}`$
    pub fn values(&self) -> &[GrElement] {
        &self.values
    }

    /// $`\bm{C}`$
    pub fn tags(&self) -> &[GrElement] {
        &self.tags
    }

    /// Consume the opening.
    pub fn into_parts(self) -> (Vec<GrElement>, Vec<GrElement>) {
        (self.values, self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_utils::sync_channel::create_unix_channels;
    use crate::channel_utils::sync_channel_by_cb::create_crossbeam_channels;
    use crate::channel_utils::sync_channel_by_cb::crossbeam_wrapper::cbch_pair;
    use crate::vole::{
        DummyVoleReceiver, DummyVoleSender, MaliciousVoleReceiver, MaliciousVoleSender,
        SemiHonestVoleReceiver, SemiHonestVoleSender, VoleReceiver, VoleSender,
        VoleShareReceiver,
    };
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use scuttlebutt::{AbstractChannel, AesRng, Block, SyncChannel};

    fn secrets(m: usize) -> Vec<GrElement> {
        (1..=m as u64).map(GrElement::from_u64).collect_vec()
    }

    fn run_session<VS, VR>(
        vole_sender: VS,
        vole_receiver: VR,
        x: Vec<GrElement>,
    ) -> (SenderCommitment, ReceiverCommitment)
    where
        VS: VoleSender + Send + 'static,
        VR: VoleReceiver,
    {
        let m = x.len();
        let (mut s_ch, mut r_ch) = create_unix_channels().unwrap();

        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            CommitmentSender::new(m, vole_sender)
                .commit(&mut s_ch, &mut rng, &x)
                .unwrap()
        });

        let mut rng = AesRng::new();
        let r = CommitmentReceiver::new(m, vole_receiver)
            .receive(&mut r_ch, &mut rng)
            .unwrap();

        (handle.join().unwrap(), r)
    }

    #[test]
    fn test_commit_open_dummy() {
        let x = secrets(10);
        let (s, r) = run_session(DummyVoleSender, DummyVoleReceiver, x.clone());

        assert_eq!(s.values(), &x[..]);
        assert_eq!(r.keys().len(), 10);
        assert_eq!(r.verify(&s.open()).unwrap(), x);
    }

    #[test]
    fn test_commit_open_semi_honest() {
        let x = secrets(2);
        let (s, r) = run_session(
            SemiHonestVoleSender::semi_honest(),
            SemiHonestVoleReceiver::semi_honest(),
            x.clone(),
        );

        assert_eq!(r.verify(&s.open()).unwrap(), x);
    }

    #[test]
    fn test_commit_open_malicious() {
        let mut rng = AesRng::new();
        let x = (0..4).map(|_| rng.gen::<GrElement>()).collect_vec();
        let (s, r) = run_session(
            MaliciousVoleSender::malicious(),
            MaliciousVoleReceiver::malicious(),
            x.clone(),
        );

        for i in 0..4 {
            assert_eq!(r.keys()[i], x[i] * r.delta() + s.tags()[i]);
        }
        assert_eq!(r.verify(&s.open()).unwrap(), x);
    }

    #[test]
    fn test_end_to_end_example() {
        // M = 4, X = [1, 2, 3, 4] as constant polynomials
        let m = 4;
        let x = secrets(m);
        let seed = Block::from(0x1234_5678_u128);

        let (mut s_ch, mut r_ch) = create_crossbeam_channels();
        let xs = x.clone();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::from_seed(seed);
            CommitmentSender::new(m, DummyVoleSender)
                .commit(&mut s_ch, &mut rng, &xs)
                .unwrap()
        });

        let mut rng = AesRng::new();
        let r = CommitmentReceiver::new(m, DummyVoleReceiver)
            .receive(&mut r_ch, &mut rng)
            .unwrap();
        let s = handle.join().unwrap();

        // the dummy sender draws A first from the injected rng
        let mut replay = AesRng::from_seed(seed);
        let a = (0..m).map(|_| replay.gen::<GrElement>()).collect_vec();

        assert_eq!(s.masks(), &a[..]);
        for i in 0..m {
            let d = x[i] - a[i];
            // B = A * delta + C, K = B + D * delta
            let b = a[i] * r.delta() + s.tags()[i];
            assert_eq!(r.keys()[i], b + d * r.delta());
        }
        assert_eq!(r.verify(&s.open()).unwrap(), x);
    }

    #[test]
    fn test_length_mismatch_before_io() {
        let (s0, r0) = cbch_pair::<50>();
        let (s1, r1) = cbch_pair::<50>();
        let mut s_ch = SyncChannel::new(r0, s1);
        let mut r_ch = SyncChannel::new(r1, s0);

        let mut rng = AesRng::new();
        let e = CommitmentSender::new(3, DummyVoleSender)
            .commit(&mut s_ch, &mut rng, &secrets(2))
            .unwrap_err();

        assert!(matches!(
            e,
            CommitError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(!e.is_retryable());

        // nothing reached the peer
        assert!(r_ch.read_u8().is_err());
    }

    #[test]
    fn test_blinding_hides_secrets() {
        let m = 64;
        let x = vec![GrElement::ZERO; m];

        let (mut s_ch, mut r_ch) = create_crossbeam_channels();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            let s = CommitmentSender::new(m, DummyVoleSender)
                .commit(&mut s_ch, &mut rng, &x)
                .unwrap();
            s.masks().to_vec()
        });

        let mut rng = AesRng::new();
        let share = DummyVoleReceiver.generate(&mut r_ch, &mut rng, m).unwrap();
        let d = crate::channel_utils::read_vec_gr(&mut r_ch, m).unwrap();
        let a = handle.join().unwrap();
        drop(share);

        // with X = 0 the blinding is -A
        for (di, ai) in d.iter().zip(a.iter()) {
            assert_eq!(*di, -*ai);
        }

        // 64 * 64 * 64 bits, mean 131072 and sd 256
        let ones: u32 = d
            .iter()
            .flat_map(|e| e.coeffs().iter())
            .map(|c| c.count_ones())
            .sum();
        assert!((131072 - 2560..=131072 + 2560).contains(&ones), "ones = {}", ones);
    }

    #[test]
    fn test_equivocation_rejected() {
        let x = secrets(5);
        let (s, r) = run_session(DummyVoleSender, DummyVoleReceiver, x.clone());

        let (mut values, tags) = s.open().into_parts();
        values[3] += GrElement::ONE;
        let e = r.verify(&Opening::new(values, tags).unwrap()).unwrap_err();
        assert!(matches!(e, CommitError::Equivocation { index: 3 }));

        let (values, mut tags) = s.open().into_parts();
        tags[0] = tags[0].mul_x();
        let e = r.verify(&Opening::new(values, tags).unwrap()).unwrap_err();
        assert!(matches!(e, CommitError::Equivocation { index: 0 }));
    }

    #[test]
    fn test_binding_needs_delta() {
        let mut rng = AesRng::new();
        let x = secrets(3);
        let (s, r) = run_session(
            MaliciousVoleSender::malicious(),
            MaliciousVoleReceiver::malicious(),
            x.clone(),
        );

        // shifting X by e requires shifting the tag by e * delta; a guessed key fails
        for _ in 0..20 {
            let e: GrElement = rng.gen();
            let guess: GrElement = rng.gen();
            let (mut values, mut tags) = s.open().into_parts();
            values[1] += e;
            tags[1] -= e * guess;
            assert!(r.verify(&Opening::new(values, tags).unwrap()).is_err());
        }

        // with the true key the relation is linear
        let e = GrElement::x();
        let (mut values, mut tags) = s.open().into_parts();
        values[1] += e;
        tags[1] -= e * r.delta();
        assert!(r.verify(&Opening::new(values, tags).unwrap()).is_ok());
    }

    #[test]
    fn test_opening_length_checked() {
        let x = secrets(2);
        let (s, r) = run_session(DummyVoleSender, DummyVoleReceiver, x);

        let (mut values, mut tags) = s.open().into_parts();
        values.pop();
        tags.pop();
        let e = r.verify(&Opening::new(values, tags).unwrap()).unwrap_err();
        assert!(matches!(
            e,
            CommitError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        ));

        assert!(Opening::new(vec![GrElement::ONE], vec![]).is_err());
    }

    #[test]
    fn test_opening_over_channel() {
        let m = 6;
        let x = secrets(m);
        let (mut s_ch, mut r_ch) = create_unix_channels().unwrap();

        let xs = x.clone();
        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            let s = CommitmentSender::new(m, DummyVoleSender)
                .commit(&mut s_ch, &mut rng, &xs)
                .unwrap();
            s.send_opening(&mut s_ch).unwrap();
        });

        let mut rng = AesRng::new();
        let r = CommitmentReceiver::new(m, DummyVoleReceiver)
            .receive(&mut r_ch, &mut rng)
            .unwrap();
        let opened = r.receive_opening(&mut r_ch).unwrap();

        handle.join().unwrap();

        assert_eq!(opened, x);
    }

    #[test]
    fn test_keys_are_deterministic() {
        let mut rng = AesRng::new();
        let delta: GrElement = rng.gen();
        let b = (0..4).map(|_| rng.gen::<GrElement>()).collect_vec();
        let d = (0..4).map(|_| rng.gen::<GrElement>()).collect_vec();

        let r1 = ReceiverCommitment::from_blinding(
            VoleShareReceiver::new(delta, b.clone(), 4).unwrap(),
            &d,
        )
        .unwrap();
        let r2 = ReceiverCommitment::from_blinding(
            VoleShareReceiver::new(delta, b, 4).unwrap(),
            &d,
        )
        .unwrap();

        assert_eq!(r1.keys(), r2.keys());
    }

    #[test]
    fn test_transport_error_on_lost_blinding() {
        let (mut s_ch, mut r_ch) = create_crossbeam_channels();

        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            // finish the VOLE, then hang up before sending D
            DummyVoleSender.generate(&mut s_ch, &mut rng, 3).unwrap();
        });

        let mut rng = AesRng::new();
        let e = CommitmentReceiver::new(3, DummyVoleReceiver)
            .receive(&mut r_ch, &mut rng)
            .unwrap_err();
        handle.join().unwrap();

        assert!(matches!(
            e,
            CommitError::Transport {
                phase: Phase::ReceiveBlinding,
                ..
            }
        ));
        assert!(e.is_retryable());
    }

    #[test]
    fn test_correlation_error() {
        let (mut s_ch, r_ch) = create_crossbeam_channels();
        drop(r_ch);

        let mut rng = AesRng::new();
        let e = CommitmentSender::new(2, DummyVoleSender)
            .commit(&mut s_ch, &mut rng, &secrets(2))
            .unwrap_err();

        assert!(matches!(e, CommitError::Correlation(_)));
    }
}
