//! Send/Recv channel pairing.
//!
//! Per channel id there is at most one Send and one Recv. Each start moves
//! from `Started` to `Completed` when its Done instruction is seen. The kind
//! of a Done's operand is already checked at construction; this module checks
//! the cross-instruction rules a single constructor cannot see.

use std::collections::BTreeMap;

use crate::error::PassError;
use crate::ir::instr::InstrKind;
use crate::ir::module::HloModule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// The start instruction exists; its Done has not been seen.
    Started,
    /// The matching Done instruction exists.
    Completed,
}

/// State of both endpoints of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStatus {
    pub send: Option<ChannelState>,
    pub recv: Option<ChannelState>,
}

impl ChannelStatus {
    /// Both a Send and a Recv exist and both were completed.
    pub fn is_complete(&self) -> bool {
        self.send == Some(ChannelState::Completed) && self.recv == Some(ChannelState::Completed)
    }
}

#[derive(Clone, Copy)]
enum Endpoint {
    Send,
    Recv,
}

impl Endpoint {
    fn name(self) -> &'static str {
        match self {
            Endpoint::Send => "send",
            Endpoint::Recv => "recv",
        }
    }
}

fn channel_error(channel_id: i64, detail: String) -> PassError {
    PassError::Channel { channel_id, detail }
}

fn start(status: &mut ChannelStatus, endpoint: Endpoint, channel_id: i64, instr: &str) -> Result<(), PassError> {
    let slot = match endpoint {
        Endpoint::Send => &mut status.send,
        Endpoint::Recv => &mut status.recv,
    };
    if slot.is_some() {
        return Err(channel_error(
            channel_id,
            format!("'{}' is a second {} on this channel", instr, endpoint.name()),
        ));
    }
    *slot = Some(ChannelState::Started);
    Ok(())
}

fn complete(status: &mut ChannelStatus, endpoint: Endpoint, channel_id: i64, instr: &str) -> Result<(), PassError> {
    let slot = match endpoint {
        Endpoint::Send => &mut status.send,
        Endpoint::Recv => &mut status.recv,
    };
    match *slot {
        Some(ChannelState::Started) => {
            *slot = Some(ChannelState::Completed);
            Ok(())
        }
        Some(ChannelState::Completed) => Err(channel_error(
            channel_id,
            format!("'{}' completes a {} that was already completed", instr, endpoint.name()),
        )),
        None => Err(channel_error(
            channel_id,
            format!("'{}' completes a {} that was never started", instr, endpoint.name()),
        )),
    }
}

/// Walks every computation in arena order and returns the final state of
/// each channel.
///
/// Rejects a second Send or Recv on one channel, a Done without its start
/// and a second Done for one start. A channel with only one endpoint, or
/// with a start that is never completed, is reported in the result rather
/// than rejected.
pub fn verify_channels(module: &HloModule) -> Result<BTreeMap<i64, ChannelStatus>, PassError> {
    let mut channels: BTreeMap<i64, ChannelStatus> = BTreeMap::new();
    for comp in module.computations() {
        for instr in comp.instructions() {
            let (attrs, endpoint, is_done) = match instr.kind() {
                InstrKind::Send(attrs) => (attrs, Endpoint::Send, false),
                InstrKind::SendDone(attrs) => (attrs, Endpoint::Send, true),
                InstrKind::Recv(attrs) => (attrs, Endpoint::Recv, false),
                InstrKind::RecvDone(attrs) => (attrs, Endpoint::Recv, true),
                _ => continue,
            };
            let channel_id = attrs.channel_id;
            let status = channels.entry(channel_id).or_default();
            if is_done {
                complete(status, endpoint, channel_id, instr.name())?;
            } else {
                start(status, endpoint, channel_id, instr.name())?;
            }
        }
    }
    tracing::debug!(module = %module.name, channels = channels.len(), "verified channels");
    Ok(channels)
}
