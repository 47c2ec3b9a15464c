//! Point-to-point communication: Send, SendDone, Recv, RecvDone.
//!
//! A Send and a Recv with the same channel id form one logical channel.
//! Each start instruction is completed by a Done instruction whose single
//! operand is that start:
//!
//! ```text
//! send(data)      -> (data_shape, u32[])    send-done(send) -> ()
//! recv()          -> (data_shape, u32[])    recv-done(recv) -> data_shape
//! ```
//!
//! The `u32[]` element is the transfer context the Done consumes. Done
//! instructions copy the channel id of their start.

use crate::error::InstrError;
use crate::ir::instr::{HloInstruction, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::{PrimitiveType, Shape};

/// Largest channel id an instruction may carry. The module's allocator keeps
/// its next id one above the largest id in use, which must stay an `i64`.
pub const MAX_CHANNEL_ID: i64 = i64::MAX - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAttrs {
    pub(crate) channel_id: i64,
}

impl ChannelAttrs {
    fn new(opcode: HloOpcode, channel_id: i64) -> Result<Self, InstrError> {
        if !(0..=MAX_CHANNEL_ID).contains(&channel_id) {
            return Err(InstrError::invalid(
                opcode,
                format!("channel_id must be in [0, {}], got {}", MAX_CHANNEL_ID, channel_id),
            ));
        }
        Ok(Self { channel_id })
    }

    pub(crate) fn extra_attributes(&self) -> Vec<String> {
        vec![format!("channel_id={}", self.channel_id)]
    }
}

fn start_shape(data: Shape) -> Shape {
    Shape::tuple(vec![data, Shape::scalar(PrimitiveType::U32)])
}

/// Checks that `operand` is the start instruction a Done of `done` pairs with.
fn expect_start(done: HloOpcode, start: HloOpcode, operand: &HloInstruction) -> Result<i64, InstrError> {
    match (&operand.kind, start) {
        (InstrKind::Send(attrs), HloOpcode::Send) | (InstrKind::Recv(attrs), HloOpcode::Recv) => {
            Ok(attrs.channel_id)
        }
        _ => Err(InstrError::invalid(
            done,
            format!(
                "operand '{}' must be a {} instruction, got {}",
                operand.name(),
                start,
                operand.opcode()
            ),
        )),
    }
}

impl HloInstruction {
    /// Starts sending `operand` on `channel_id`.
    pub fn create_send(operand: &HloInstruction, channel_id: i64) -> Result<Self, InstrError> {
        let attrs = ChannelAttrs::new(HloOpcode::Send, channel_id)?;
        if !operand.shape().is_array() {
            return Err(InstrError::invalid(
                HloOpcode::Send,
                format!("sent data must be an array, got {}", operand.shape()),
            ));
        }
        let shape = start_shape(operand.shape().clone());
        HloInstruction::assemble(shape, &[operand], InstrKind::Send(attrs))
    }

    /// Completes `send`. Fails unless `send` is a Send instruction.
    pub fn create_send_done(send: &HloInstruction) -> Result<Self, InstrError> {
        let channel_id = expect_start(HloOpcode::SendDone, HloOpcode::Send, send)?;
        HloInstruction::assemble(
            Shape::nil(),
            &[send],
            InstrKind::SendDone(ChannelAttrs { channel_id }),
        )
    }

    /// Starts receiving a value of `data_shape` on `channel_id`.
    pub fn create_recv(data_shape: Shape, channel_id: i64) -> Result<Self, InstrError> {
        let attrs = ChannelAttrs::new(HloOpcode::Recv, channel_id)?;
        if !data_shape.is_array() {
            return Err(InstrError::invalid(
                HloOpcode::Recv,
                format!("received data must be an array, got {}", data_shape),
            ));
        }
        HloInstruction::assemble(start_shape(data_shape), &[], InstrKind::Recv(attrs))
    }

    /// Completes `recv` and yields the received data. Fails unless `recv` is
    /// a Recv instruction.
    pub fn create_recv_done(recv: &HloInstruction) -> Result<Self, InstrError> {
        let channel_id = expect_start(HloOpcode::RecvDone, HloOpcode::Recv, recv)?;
        let data = recv.shape().tuple_element(0).cloned().ok_or_else(|| {
            InstrError::invalid(
                HloOpcode::RecvDone,
                format!("recv shape {} has no data element", recv.shape()),
            )
        })?;
        HloInstruction::assemble(data, &[recv], InstrKind::RecvDone(ChannelAttrs { channel_id }))
    }

    /// Identifier shared by a Send/Recv pair and their Done instructions.
    pub fn channel_id(&self) -> Result<i64, InstrError> {
        match &self.kind {
            InstrKind::Send(attrs)
            | InstrKind::SendDone(attrs)
            | InstrKind::Recv(attrs)
            | InstrKind::RecvDone(attrs) => Ok(attrs.channel_id),
            _ => Err(InstrError::unsupported(self.opcode(), "channel_id")),
        }
    }
}
