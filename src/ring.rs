//! Galois ring $`GR(2^{64}, 64)`$.
//!
//! An element is a polynomial of degree $`< 64`$ whose coefficients live in $`\mathbb{Z}_{2^{64}}`$,
//! taken modulo the monic polynomial
//!
//! ```math
//! f(x) = x^{64} + x^4 + x^3 + x + 1
//! ```
//!
//! which is irreducible over $`\mathbb{F}_2`$, so the ring is a Galois ring. Additions are done coefficient-wise and wrap modulo $`2^{64}`$.
//! Multiplication is the product of polynomials reduced by $`x^{64} = -(1 + x + x^3 + x^4)`$.
//!
//! The global MAC key $`\Delta`$ of a commitment session is itself a [GrElement] and acts on other elements by ring multiplication.

use anyhow::{bail, Result};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Number of coefficients of a ring element.
pub const D: usize = 64;

/// Number of bytes of a serialized ring element.
pub const GR_BYTES: usize = D * 8;

// x^64 = -(x^0 + x^1 + x^3 + x^4)
const REDUCER: [usize; 4] = [0, 1, 3, 4];

/// Element of $`GR(2^{64}, 64)`$ held as its $`D`$ coefficients, lowest degree first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrElement([u64; D]);

impl GrElement {
    /// Additive identity.
    pub const ZERO: Self = Self([0; D]);

    /// Multiplicative identity.
    pub const ONE: Self = {
        let mut c = [0; D];
        c[0] = 1;
        Self(c)
    };

    /// Build an element from its coefficients.
    pub fn new(coeffs: [u64; D]) -> Self {
        Self(coeffs)
    }

    /// Embed $`v \in \mathbb{Z}_{2^{64}}`$ as a constant polynomial.
    pub fn from_u64(v: u64) -> Self {
        let mut c = [0; D];
        c[0] = v;
        Self(c)
    }

    /// The indeterminate $`x`$.
    pub fn x() -> Self {
        let mut c = [0; D];
        c[1] = 1;
        Self(c)
    }

    /// Sample an element with every coefficient uniform over `u64`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.gen()
    }

    /// Coefficients, lowest degree first.
    pub fn coeffs(&self) -> &[u64; D] {
        &self.0
    }

    /// `true` for the additive identity.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Bit `j` of coefficient `k`.
    #[inline]
    pub fn bit(&self, k: usize, j: usize) -> bool {
        (self.0[k] >> j) & 1 == 1
    }

    /// Multiply by $`x`$. Cheaper than a full [Mul].
    pub fn mul_x(&self) -> Self {
        let top = self.0[D - 1];
        let mut c = [0; D];
        c[1..].copy_from_slice(&self.0[..D - 1]);
        for &r in REDUCER.iter() {
            c[r] = c[r].wrapping_sub(top);
        }
        Self(c)
    }

    /// Multiply by $`2^j`$.
    pub fn shl_coeffs(&self, j: u32) -> Self {
        let mut c = self.0;
        for v in c.iter_mut() {
            *v = v.wrapping_shl(j);
        }
        Self(c)
    }

    /// Little-endian serialization of the coefficients.
    pub fn to_bytes(&self) -> [u8; GR_BYTES] {
        let mut res = [0u8; GR_BYTES];
        for (chunk, c) in res.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&c.to_le_bytes());
        }
        res
    }

    /// Inverse of [GrElement::to_bytes]. `bytes` must be exactly [GR_BYTES] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != GR_BYTES {
            bail!(
                "bytes.len() (={}) != GR_BYTES (={}) @{}:{}",
                bytes.len(),
                GR_BYTES,
                file!(),
                line!()
            );
        }

        let mut c = [0; D];
        for (v, chunk) in c.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            *v = u64::from_le_bytes(b);
        }
        Ok(Self(c))
    }
}

impl Default for GrElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for GrElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrElement([{}, {}, ...])", self.0[0], self.0[1])
    }
}

impl Distribution<GrElement> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GrElement {
        let mut c = [0; D];
        for v in c.iter_mut() {
            *v = rng.gen();
        }
        GrElement(c)
    }
}

impl AddAssign for GrElement {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a = a.wrapping_add(*b);
        }
    }
}

impl SubAssign for GrElement {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a = a.wrapping_sub(*b);
        }
    }
}

impl Add for GrElement {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Sub for GrElement {
    type Output = Self;

    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl Neg for GrElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self::ZERO - self
    }
}

impl Mul for GrElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut prod = [0u64; 2 * D - 1];
        for (i, &a) in self.0.iter().enumerate() {
            if a == 0 {
                continue;
            }
            for (j, &b) in rhs.0.iter().enumerate() {
                prod[i + j] = prod[i + j].wrapping_add(a.wrapping_mul(b));
            }
        }

        // fold degrees 126..=64 downwards; a fold may land on a degree >= 64 that is handled later
        for i in (D..2 * D - 1).rev() {
            let c = prod[i];
            if c == 0 {
                continue;
            }
            let base = i - D;
            for &r in REDUCER.iter() {
                prod[base + r] = prod[base + r].wrapping_sub(c);
            }
        }

        let mut c = [0; D];
        c.copy_from_slice(&prod[..D]);
        Self(c)
    }
}

impl MulAssign for GrElement {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for GrElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}
