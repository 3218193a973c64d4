//! VOLE (Vector Oblivious Linear Evaluation) module.
//!
//! VOLE is tuples of vector of correlated randomness shared between two parties.
//!
//! The sender has vectors $`\bm{A}, \bm{C} \in R^m`$, and the receiver has vector $`\bm{B} \in R^m`$ and scalar $`\Delta \in R`$,
//! where $`R = GR(2^{64}, 64)`$ (see [ring](crate::ring)) and $`m`$ is the batch size of the commitment.
//!
//! VOLE vectors satisfy the following property:
//!
//! ```math
//! \bm{B} = \bm{A} \Delta + \bm{C}
//! ```
//!
//! Neither party learns the share of the other. Shares are single-use: [VoleShareSender] and [VoleShareReceiver]
//! are neither `Clone` nor `Copy` and are consumed by the commitment that uses them.
//!
//! For more detail about how the correlation is produced, see:
//!
//! - [Wolverine: Fast, Scalable, and Communication-Efficient Zero-Knowledge Proofs for Boolean and Arithmetic Circuits](https://eprint.iacr.org/2020/925)

use crate::ring::GrElement;
use anyhow::{bail, Result};
use clap::ValueEnum;
use rand::{CryptoRng, Rng};
use scuttlebutt::channel::AbstractChannel;
use std::fmt::Display;
use thiserror::Error;

pub mod dummy;
pub use dummy::{DummyVoleReceiver, DummyVoleSender};
pub mod ot_based;
pub use ot_based::{
    MaliciousVoleReceiver, MaliciousVoleSender, OtVoleReceiver, OtVoleSender,
    SemiHonestVoleReceiver, SemiHonestVoleSender,
};

/// Adversary model the correlation generator is secure against.
#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
pub enum SecurityLevel {
    /// Honest-but-curious peer.
    SemiHonest,
    /// Peer that may deviate arbitrarily. A consistency check is run on top of maliciously secure OT.
    Malicious,
}

impl Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityLevel::SemiHonest => write!(f, "semi-honest"),
            SecurityLevel::Malicious => write!(f, "malicious"),
        }
    }
}

/// Errors raised by correlation generators themselves.
#[derive(Debug, Error)]
pub enum VoleError {
    /// The linear-combination check of the malicious generator failed.
    #[error("VOLE correlation check failed")]
    CorrelationCheckFailed,
    /// A generator produced a share of the wrong length.
    #[error("VOLE share has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Requested batch size.
        expected: usize,
        /// Produced length.
        actual: usize,
    },
}

/// Sender share $`(\bm{A}, \bm{C})`$.
#[derive(Debug)]
pub struct VoleShareSender {
    a: Vec<GrElement>,
    c: Vec<GrElement>,
}

impl VoleShareSender {
    /// Bundle a share. `a` and `c` must both have length `m`.
    pub fn new(a: Vec<GrElement>, c: Vec<GrElement>, m: usize) -> Result<Self> {
        for len in [a.len(), c.len()] {
            if len != m {
                bail!(VoleError::LengthMismatch {
                    expected: m,
                    actual: len
                });
            }
        }
        Ok(Self { a, c })
    }

    /// Batch size.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// $`\bm{A}`$
    pub fn a(&self) -> &[GrElement] {
        &self.a
    }

    /// $`\bm{C}`$
    pub fn c(&self) -> &[GrElement] {
        &self.c
    }

    /// Consume the share.
    pub fn into_parts(self) -> (Vec<GrElement>, Vec<GrElement>) {
        (self.a, self.c)
    }
}

/// Receiver share $`(\Delta, \bm{B})`$.
#[derive(Debug)]
pub struct VoleShareReceiver {
    delta: GrElement,
    b: Vec<GrElement>,
}

impl VoleShareReceiver {
    /// Bundle a share. `b` must have length `m`.
    pub fn new(delta: GrElement, b: Vec<GrElement>, m: usize) -> Result<Self> {
        if b.len() != m {
            bail!(VoleError::LengthMismatch {
                expected: m,
                actual: b.len()
            });
        }
        Ok(Self { delta, b })
    }

    /// Batch size.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    /// `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Global MAC key $`\Delta`$.
    pub fn delta(&self) -> GrElement {
        self.delta
    }

    /// $`\bm{B}`$
    pub fn b(&self) -> &[GrElement] {
        &self.b
    }

    /// Consume the share.
    pub fn into_parts(self) -> (GrElement, Vec<GrElement>) {
        (self.delta, self.b)
    }
}

/// Trait for VOLE sender.
///
/// Implementors are configuration only and can be copied freely; every call to [VoleSender::generate] runs a fresh protocol.
pub trait VoleSender: Clone + Copy {
    /// Obtain $`\bm{A}, \bm{C} \in R^m`$. Blocks until the protocol with the peer completes.
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareSender>;
}

/// Trait for VOLE receiver.
pub trait VoleReceiver: Clone + Copy {
    /// Obtain $`\Delta \in R, \bm{B} \in R^m`$. Blocks until the protocol with the peer completes.
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareReceiver>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use scuttlebutt::AesRng;

    #[test]
    fn test_share_length_checked() {
        let mut rng = AesRng::new();
        let a = (0..3).map(|_| rng.gen::<GrElement>()).collect::<Vec<_>>();
        let c = (0..2).map(|_| rng.gen::<GrElement>()).collect::<Vec<_>>();

        let e = VoleShareSender::new(a, c, 3).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<VoleError>(),
            Some(VoleError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let e = VoleShareReceiver::new(rng.gen(), vec![], 1).unwrap_err();
        assert!(e.downcast_ref::<VoleError>().is_some());
    }
}
