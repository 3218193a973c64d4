//! VOLE over $`GR(2^{64}, 64)`$ from random oblivious transfer.
//!
//! The receiver samples $`\Delta`$ and plays OT receiver with the $`64 \cdot 64`$ bits $`\delta_{k,j}`$ of $`\Delta`$ as choices,
//! where $`\Delta = \sum_{k,j} \delta_{k,j} 2^j x^k`$. For each pair of random keys $`(K^0_{k,j}, K^1_{k,j})`$ both parties expand
//! the keys they hold with [AesRng] into vectors $`\bm{R}^0_{k,j}, \bm{R}^1_{k,j} \in R^n`$. The sender sends
//!
//! ```math
//! \bm{U}_{k,j} = \bm{R}^0_{k,j} - \bm{R}^1_{k,j} + 2^j x^k \bm{A}
//! ```
//!
//! and keeps $`\bm{C} = \sum_{k,j} \bm{R}^0_{k,j}`$. The receiver computes $`\bm{B} = \sum_{k,j} (\bm{R}^{\delta_{k,j}}_{k,j} + \delta_{k,j} \bm{U}_{k,j})`$,
//! so that $`\bm{B} = \bm{A} \Delta + \bm{C}`$.
//!
//! With [SecurityLevel::Malicious] one extra mask entry is generated and a random linear combination is checked afterwards,
//! in the manner of the base sVOLE of Wolverine (<https://eprint.iacr.org/2020/925>, Figure 5).

use super::{SecurityLevel, VoleError, VoleReceiver, VoleSender, VoleShareReceiver, VoleShareSender};
use crate::channel_utils::{read_gr, read_vec_gr, write_gr};
use crate::ring::{GrElement, D};
use anyhow::{bail, Context, Result};
use itertools::Itertools;
use log::{debug, info};
use ocelot::ot::{
    AlszReceiver, AlszSender, KosReceiver, KosSender, RandomReceiver as RotReceiver,
    RandomSender as RotSender,
};
use rand::{CryptoRng, Rng, SeedableRng};
use scuttlebutt::channel::AbstractChannel;
use scuttlebutt::{AesRng, Block, Malicious, SemiHonest};
use std::marker::PhantomData;
use std::time::Instant;

/// Bits per coefficient.
const K: usize = 64;

/// Number of random OTs, one per bit of $`\Delta`$.
pub const NUM_OTS: usize = D * K;

/// Sender over ALSZ semi-honest OT extension.
pub type SemiHonestVoleSender = OtVoleSender<AlszSender>;
/// Receiver over ALSZ semi-honest OT extension.
pub type SemiHonestVoleReceiver = OtVoleReceiver<AlszReceiver>;
/// Sender over KOS malicious OT extension, with the correlation check.
pub type MaliciousVoleSender = OtVoleSender<KosSender>;
/// Receiver over KOS malicious OT extension, with the correlation check.
pub type MaliciousVoleReceiver = OtVoleReceiver<KosReceiver>;

fn choices_of(delta: &GrElement) -> Vec<bool> {
    (0..D)
        .flat_map(|k| (0..K).map(move |j| delta.bit(k, j)))
        .collect_vec()
}

fn chis(seed: Block, n: usize) -> Vec<GrElement> {
    let mut rng_chi = AesRng::from_seed(seed);
    (0..n).map(|_| rng_chi.gen::<GrElement>()).collect_vec()
}

/// Expand the OT key pairs and send the corrections $`\bm{U}_{k,j}`$ for `a`. Returns $`\bm{C}`$.
pub(crate) fn send_corrections<C: AbstractChannel>(
    channel: &mut C,
    keys: &[(Block, Block)],
    a: &[GrElement],
) -> Result<Vec<GrElement>> {
    if keys.len() != NUM_OTS {
        bail!(
            "keys.len() (={}) != NUM_OTS (={}) @{}:{}",
            keys.len(),
            NUM_OTS,
            file!(),
            line!()
        );
    }

    let n = a.len();
    let mut c = vec![GrElement::ZERO; n];
    // x^k * a
    let mut xa = a.to_vec();

    for (k, row) in keys.chunks_exact(K).enumerate() {
        for (j, (k0, k1)) in row.iter().enumerate() {
            let mut prg0 = AesRng::from_seed(*k0);
            let mut prg1 = AesRng::from_seed(*k1);
            for (ci, xai) in c.iter_mut().zip(xa.iter()) {
                let r0: GrElement = prg0.gen();
                let r1: GrElement = prg1.gen();
                *ci += r0;
                let u = r0 - r1 + xai.shl_coeffs(j as u32);
                write_gr(channel, &u).with_context(|| format!("k={} j={} @{}:{}", k, j, file!(), line!()))?;
            }
        }
        xa.iter_mut().for_each(|v| *v = v.mul_x());
    }

    channel
        .flush()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    Ok(c)
}

/// Answer the receiver's challenge with $`(x, z)`$ computed from the last (mask) entry and the rest.
pub(crate) fn respond_check<C: AbstractChannel>(
    channel: &mut C,
    a: &[GrElement],
    c: &[GrElement],
) -> Result<()> {
    let Some((a_mask, a)) = a.split_last() else {
        bail!("empty share @{}:{}", file!(), line!());
    };
    let Some((c_mask, c)) = c.split_last() else {
        bail!("empty share @{}:{}", file!(), line!());
    };

    let seed = channel
        .read_block()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    let mut x = *a_mask;
    let mut z = *c_mask;
    for ((chi, ai), ci) in chis(seed, a.len()).into_iter().zip(a.iter()).zip(c.iter()) {
        x += chi * *ai;
        z += chi * *ci;
    }

    write_gr(channel, &x)?;
    write_gr(channel, &z)?;
    channel
        .flush()
        .with_context(|| format!("@{}:{}", file!(), line!()))?;

    Ok(())
}

/// VOLE sender over a random OT extension `OT`.
///
/// Build it with [OtVoleSender::semi_honest] or [OtVoleSender::malicious]; the latter is only available for maliciously secure OT.
pub struct OtVoleSender<OT>
where
    OT: RotSender<Msg = Block>,
{
    check: bool,
    _p: PhantomData<fn() -> OT>,
}

impl<OT> Clone for OtVoleSender<OT>
where
    OT: RotSender<Msg = Block>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<OT> Copy for OtVoleSender<OT> where OT: RotSender<Msg = Block> {}

impl<OT> OtVoleSender<OT>
where
    OT: RotSender<Msg = Block>,
{
    /// Without the correlation check.
    pub fn semi_honest() -> Self
    where
        OT: SemiHonest,
    {
        Self {
            check: false,
            _p: PhantomData,
        }
    }

    /// With the correlation check.
    pub fn malicious() -> Self
    where
        OT: Malicious,
    {
        Self {
            check: true,
            _p: PhantomData,
        }
    }

    /// Level this generator was built for.
    pub fn security_level(&self) -> SecurityLevel {
        if self.check {
            SecurityLevel::Malicious
        } else {
            SecurityLevel::SemiHonest
        }
    }
}

impl<OT> VoleSender for OtVoleSender<OT>
where
    OT: RotSender<Msg = Block>,
{
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareSender> {
        let start = Instant::now();
        let n = if self.check { m + 1 } else { m };

        let a = (0..n).map(|_| rng.gen::<GrElement>()).collect_vec();

        let mut ot = OT::init(channel, rng).with_context(|| format!("@{}:{}", file!(), line!()))?;
        let keys = ot
            .send_random(channel, NUM_OTS, rng)
            .with_context(|| format!("@{}:{}", file!(), line!()))?;

        debug!("{} random OTs done in {:?}", NUM_OTS, start.elapsed());

        let mut c = send_corrections(channel, &keys, &a)
            .with_context(|| format!("@{}:{}", file!(), line!()))?;

        let mut a = a;
        if self.check {
            respond_check(channel, &a, &c).with_context(|| format!("@{}:{}", file!(), line!()))?;
            a.truncate(m);
            c.truncate(m);
        }

        info!(
            "VOLE sender ({}) generated {} entries in {:?}",
            self.security_level(),
            m,
            start.elapsed()
        );

        VoleShareSender::new(a, c, m)
    }
}

/// VOLE receiver over a random OT extension `OT`.
pub struct OtVoleReceiver<OT>
where
    OT: RotReceiver<Msg = Block>,
{
    check: bool,
    _p: PhantomData<fn() -> OT>,
}

impl<OT> Clone for OtVoleReceiver<OT>
where
    OT: RotReceiver<Msg = Block>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<OT> Copy for OtVoleReceiver<OT> where OT: RotReceiver<Msg = Block> {}

impl<OT> OtVoleReceiver<OT>
where
    OT: RotReceiver<Msg = Block>,
{
    /// Without the correlation check.
    pub fn semi_honest() -> Self
    where
        OT: SemiHonest,
    {
        Self {
            check: false,
            _p: PhantomData,
        }
    }

    /// With the correlation check.
    pub fn malicious() -> Self
    where
        OT: Malicious,
    {
        Self {
            check: true,
            _p: PhantomData,
        }
    }

    /// Level this generator was built for.
    pub fn security_level(&self) -> SecurityLevel {
        if self.check {
            SecurityLevel::Malicious
        } else {
            SecurityLevel::SemiHonest
        }
    }
}

impl<OT> VoleReceiver for OtVoleReceiver<OT>
where
    OT: RotReceiver<Msg = Block>,
{
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareReceiver> {
        let start = Instant::now();
        let n = if self.check { m + 1 } else { m };

        let delta: GrElement = rng.gen();
        let choices = choices_of(&delta);

        let mut ot = OT::init(channel, rng).with_context(|| format!("@{}:{}", file!(), line!()))?;
        let keys = ot
            .receive_random(channel, &choices, rng)
            .with_context(|| format!("@{}:{}", file!(), line!()))?;

        debug!("{} random OTs done in {:?}", NUM_OTS, start.elapsed());

        let mut b = vec![GrElement::ZERO; n];
        for (key, &choice) in keys.iter().zip(choices.iter()) {
            let mut prg = AesRng::from_seed(*key);
            let u = read_vec_gr(channel, n).with_context(|| format!("@{}:{}", file!(), line!()))?;
            for (bi, ui) in b.iter_mut().zip(u.into_iter()) {
                let r: GrElement = prg.gen();
                *bi += r;
                if choice {
                    *bi += ui;
                }
            }
        }

        if self.check {
            let seed = rng.gen::<Block>();
            channel
                .write_block(&seed)
                .with_context(|| format!("@{}:{}", file!(), line!()))?;
            channel
                .flush()
                .with_context(|| format!("@{}:{}", file!(), line!()))?;

            let x = read_gr(channel).with_context(|| format!("@{}:{}", file!(), line!()))?;
            let z = read_gr(channel).with_context(|| format!("@{}:{}", file!(), line!()))?;

            let mut y = b[m];
            for (chi, bi) in chis(seed, m).into_iter().zip(b.iter()) {
                y += chi * *bi;
            }

            if y != x * delta + z {
                bail!(VoleError::CorrelationCheckFailed);
            }
            b.truncate(m);
        }

        info!(
            "VOLE receiver ({}) generated {} entries in {:?}",
            self.security_level(),
            m,
            start.elapsed()
        );

        VoleShareReceiver::new(delta, b, m)
    }
}
