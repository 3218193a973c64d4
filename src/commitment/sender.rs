use super::{CommitError, Opening, Phase};
use crate::channel_utils::write_vec_gr;
use crate::ring::GrElement;
use crate::vole::VoleSender;
use itertools::Itertools;
use log::{debug, info};
use rand::{CryptoRng, Rng};
use scuttlebutt::AbstractChannel;
use std::time::Instant;

/// Committing party, before the commit phase.
///
/// Consumed by [CommitmentSender::commit].
#[derive(Debug)]
pub struct CommitmentSender<V: VoleSender> {
    m: usize,
    vole: V,
}

impl<V: VoleSender> CommitmentSender<V> {
    /// Committer for a batch of `m` elements using the correlation generator `vole`.
    pub fn new(m: usize, vole: V) -> Self {
        Self { m, vole }
    }

    /// Agreed batch size.
    pub fn batch_size(&self) -> usize {
        self.m
    }

    /// Commit to `x`.
    ///
    /// The length of `x` is checked before anything is sent. Then a fresh VOLE share $`(\bm{A}, \bm{C})`$ is obtained
    /// from the peer and the blinding $`\bm{D} = \bm{X} - \bm{A}`$ is sent.
    pub fn commit<C, RNG>(
        self,
        channel: &mut C,
        rng: &mut RNG,
        x: &[GrElement],
    ) -> Result<SenderCommitment, CommitError>
    where
        C: AbstractChannel,
        RNG: CryptoRng + Rng,
    {
        let Self { m, mut vole } = self;

        if x.len() != m {
            return Err(CommitError::LengthMismatch {
                expected: m,
                actual: x.len(),
            });
        }

        let start = Instant::now();

        let share = vole
            .generate(channel, rng, m)
            .map_err(CommitError::Correlation)?;
        debug!("VOLE done: {:?}", start.elapsed());

        let (a, c) = share.into_parts();

        let d = x.iter().zip(a.iter()).map(|(&x, &a)| x - a).collect_vec();

        let bytes =
            write_vec_gr(channel, &d).map_err(CommitError::transport(Phase::SendBlinding))?;

        info!(
            "committed to {} elements: {} bytes of blinding, {:?}",
            m,
            bytes,
            start.elapsed()
        );

        Ok(SenderCommitment {
            values: x.to_vec(),
            masks: a,
            tags: c,
        })
    }
}

/// Sender's record of a completed commit phase.
#[derive(Debug)]
pub struct SenderCommitment {
    values: Vec<GrElement>,
    masks: Vec<GrElement>,
    tags: Vec<GrElement>,
}

impl SenderCommitment {
    /// Batch size.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Committed values $`\bm{X}`$.
    pub fn values(&self) -> &[GrElement] {
        &self.values
    }

    /// VOLE masks $`\bm{A}`$. $`\bm{X} - \bm{A}`$ is what the receiver saw.
    pub fn masks(&self) -> &[GrElement] {
        &self.masks
    }

    /// VOLE tags $`\bm{C}`$, revealed on opening.
    pub fn tags(&self) -> &[GrElement] {
        &self.tags
    }

    /// Build the opening $`(\bm{X}, \bm{C})`$.
    pub fn open(&self) -> Opening {
        Opening {
            values: self.values.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Send the opening to the peer. Values first, then tags, `m` records each.
    pub fn send_opening<C: AbstractChannel>(&self, channel: &mut C) -> Result<(), CommitError> {
        write_vec_gr(channel, &self.values).map_err(CommitError::transport(Phase::SendOpening))?;
        write_vec_gr(channel, &self.tags).map_err(CommitError::transport(Phase::SendOpening))?;

        debug!("opening of {} elements sent", self.len());

        Ok(())
    }
}
