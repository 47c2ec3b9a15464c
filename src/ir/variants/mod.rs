//! Per-family constructors, accessors and attribute helpers.
//!
//! Each family file adds `create_*` constructors and typed accessors to
//! `HloInstruction` and defines the payload struct its variants carry. The
//! generic operations in `instr.rs` dispatch into these payloads.

pub mod batch_norm;
pub mod elementwise;
pub mod fft;
pub mod layout;
pub mod reduce_map;
pub mod send_recv;

pub use batch_norm::BatchNormAttrs;
pub use fft::FftAttrs;
pub use layout::SliceAttrs;
pub use reduce_map::{MapAttrs, ReduceAttrs};
pub use send_recv::{ChannelAttrs, MAX_CHANNEL_ID};
