//! HLO: the instruction layer of a tensor-program dataflow IR.
//!
//! Data model:
//!
//! ```text
//! HloModule → [HloComputation] → [HloInstruction]
//!                   ↑                    │
//!                   └── to_apply ────────┘   (Reduce, Map)
//! ```
//!
//! Every instruction variant supports the same four operations:
//! 1. `extra_attributes_to_string` renders `key=value` attributes
//! 2. `identical_slow_path` compares variant state structurally
//! 3. `clone_with_new_operands` rebuilds against new operands, sharing
//!    sub-computations through a `CloneContext`
//! 4. `to_proto` produces the serializable record (see `proto`)

pub mod error;
pub mod ir;
pub mod pass;
pub mod printer;
pub mod proto;

pub use error::Error;
pub use ir::{HloComputation, HloComputationBuilder, HloInstruction, HloModule, HloOpcode, Shape};
