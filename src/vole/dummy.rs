//! A dummy and completely insecure VOLE for testing purposes.
//!
//! The receiver sends $`\Delta`$ in the clear and the sender answers with $`\bm{B}`$. The relation holds, but the sender learns the MAC key.

use super::{VoleReceiver, VoleSender, VoleShareReceiver, VoleShareSender};
use crate::channel_utils::{read_gr, read_vec_gr, write_gr, write_vec_gr};
use crate::ring::GrElement;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::warn;
use rand::{CryptoRng, Rng};
use scuttlebutt::channel::AbstractChannel;

/// Dummy VOLE sender.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyVoleSender;

/// Dummy VOLE receiver.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyVoleReceiver;

impl VoleSender for DummyVoleSender {
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareSender> {
        warn!("dummy VOLE in use, the commitment is not binding");

        let delta = read_gr(channel).with_context(|| format!("@{}:{}", file!(), line!()))?;

        let a = (0..m).map(|_| rng.gen::<GrElement>()).collect_vec();
        let c = (0..m).map(|_| rng.gen::<GrElement>()).collect_vec();
        let b = a
            .iter()
            .zip(c.iter())
            .map(|(&a, &c)| a * delta + c)
            .collect_vec();

        write_vec_gr(channel, &b).with_context(|| format!("@{}:{}", file!(), line!()))?;

        VoleShareSender::new(a, c, m)
    }
}

impl VoleReceiver for DummyVoleReceiver {
    fn generate<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        rng: &mut RNG,
        m: usize,
    ) -> Result<VoleShareReceiver> {
        let delta: GrElement = rng.gen();

        write_gr(channel, &delta).with_context(|| format!("@{}:{}", file!(), line!()))?;
        channel
            .flush()
            .with_context(|| format!("@{}:{}", file!(), line!()))?;

        let b = read_vec_gr(channel, m).with_context(|| format!("@{}:{}", file!(), line!()))?;

        VoleShareReceiver::new(delta, b, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_utils::sync_channel_by_cb::create_crossbeam_channels;
    use scuttlebutt::AesRng;

    #[test]
    fn test_dummy_vole() {
        let (mut s_ch, mut r_ch) = create_crossbeam_channels();

        let handle = std::thread::spawn(move || {
            let mut rng = AesRng::new();
            DummyVoleSender.generate(&mut s_ch, &mut rng, 7).unwrap()
        });

        let mut rng = AesRng::new();
        let share_r = DummyVoleReceiver.generate(&mut r_ch, &mut rng, 7).unwrap();
        let share_s = handle.join().unwrap();

        for i in 0..7 {
            assert_eq!(share_s.a()[i] * share_r.delta() + share_s.c()[i], share_r.b()[i]);
        }
    }
}
