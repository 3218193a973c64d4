//! # VOLE based batch commitment
//!
//! A sender commits to a vector of elements of the Galois ring $`GR(2^{64}, 64)`$ ([ring]) by masking it with
//! VOLE (Vector Oblivious Linear Evaluation) correlated randomness ([vole]). The receiver ends up with MAC keys
//! that bind the sender to the values without revealing them, and can later check an opening.
//!
//! [commitment] is the main module of this library.
#![warn(missing_docs)]

pub mod channel_utils;
pub mod cli_utils;
pub mod commitment;
pub mod ring;
pub mod session;
pub mod vole;
