use super::{CommitError, Opening, Phase};
use crate::channel_utils::read_vec_gr;
use crate::ring::GrElement;
use crate::vole::{VoleReceiver, VoleShareReceiver};
use itertools::Itertools;
use log::{debug, info, warn};
use rand::{CryptoRng, Rng};
use scuttlebutt::AbstractChannel;
use std::time::Instant;

/// Verifying party, before the commit phase.
///
/// Consumed by [CommitmentReceiver::receive].
#[derive(Debug)]
pub struct CommitmentReceiver<V: VoleReceiver> {
    m: usize,
    vole: V,
}

impl<V: VoleReceiver> CommitmentReceiver<V> {
    /// Verifier for a batch of `m` elements using the correlation generator `vole`.
    pub fn new(m: usize, vole: V) -> Self {
        Self { m, vole }
    }

    /// Agreed batch size.
    pub fn batch_size(&self) -> usize {
        self.m
    }

    /// Run the commit phase: obtain $`(\Delta, \bm{B})`$, read $`\bm{D}`$ and derive the keys.
    pub fn receive<C, RNG>(
        self,
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<ReceiverCommitment, CommitError>
    where
        C: AbstractChannel,
        RNG: CryptoRng + Rng,
    {
        let Self { m, mut vole } = self;

        let start = Instant::now();

        let share = vole
            .generate(channel, rng, m)
            .map_err(CommitError::Correlation)?;
        debug!("VOLE done: {:?}", start.elapsed());

        let d = read_vec_gr(channel, m).map_err(CommitError::transport(Phase::ReceiveBlinding))?;

        let res = ReceiverCommitment::from_blinding(share, &d)?;

        info!("received commitment to {} elements, {:?}", m, start.elapsed());

        Ok(res)
    }
}

/// Receiver's record of a completed commit phase: $`\Delta`$ and $`\bm{K} = \bm{B} + \bm{D} \Delta`$.
#[derive(Debug)]
pub struct ReceiverCommitment {
    delta: GrElement,
    keys: Vec<GrElement>,
}

impl ReceiverCommitment {
    /// Derive the keys from a VOLE share and the received blinding.
    pub fn from_blinding(share: VoleShareReceiver, d: &[GrElement]) -> Result<Self, CommitError> {
        if d.len() != share.len() {
            return Err(CommitError::LengthMismatch {
                expected: share.len(),
                actual: d.len(),
            });
        }

        let (delta, b) = share.into_parts();
        let keys = b
            .into_iter()
            .zip(d.iter())
            .map(|(b, &d)| b + d * delta)
            .collect_vec();

        Ok(Self { delta, keys })
    }

    /// Batch size.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// MAC key $`\Delta`$. Never leaves the receiver.
    pub fn delta(&self) -> GrElement {
        self.delta
    }

    /// $`\bm{K}`$
    pub fn keys(&self) -> &[GrElement] {
        &self.keys
    }

    /// Check $`K_i = X_i \Delta + C_i`$ for every position and return the opened values.
    pub fn verify(&self, opening: &Opening) -> Result<Vec<GrElement>, CommitError> {
        if opening.len() != self.len() {
            return Err(CommitError::LengthMismatch {
                expected: self.len(),
                actual: opening.len(),
            });
        }

        let bad = self
            .keys
            .iter()
            .zip(opening.values().iter().zip(opening.tags().iter()))
            .position(|(&k, (&x, &c))| k != x * self.delta + c);

        if let Some(index) = bad {
            warn!("opening rejected at index {}", index);
            return Err(CommitError::Equivocation { index });
        }

        Ok(opening.values().to_vec())
    }

    /// Read an opening written by [SenderCommitment::send_opening](super::SenderCommitment::send_opening) and verify it.
    pub fn receive_opening<C: AbstractChannel>(
        &self,
        channel: &mut C,
    ) -> Result<Vec<GrElement>, CommitError> {
        let m = self.len();
        let values =
            read_vec_gr(channel, m).map_err(CommitError::transport(Phase::ReceiveOpening))?;
        let tags = read_vec_gr(channel, m).map_err(CommitError::transport(Phase::ReceiveOpening))?;

        self.verify(&Opening { values, tags })
    }
}
