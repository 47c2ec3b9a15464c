//! Whole-module checks that span several instructions or computations.

pub mod verify;

pub use verify::VerifyPass;
