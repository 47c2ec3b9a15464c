pub mod channel;
pub mod clone_context;
pub mod computation;
pub mod instr;
pub mod module;
pub mod opcode;
pub mod types;
pub mod variants;

pub use channel::{verify_channels, ChannelState, ChannelStatus};
pub use clone_context::CloneContext;
pub use computation::{ComputationId, HloComputation, HloComputationBuilder};
pub use instr::{EqComputations, EqOperands, HloInstruction, InstrId, InstrKind, DETACHED_ID};
pub use module::HloModule;
pub use opcode::HloOpcode;
pub use types::{slice_dim_size, FftType, PrimitiveType, Shape};
pub use variants::{
    BatchNormAttrs, ChannelAttrs, FftAttrs, MapAttrs, ReduceAttrs, SliceAttrs, MAX_CHANNEL_ID,
};
