//! Send/Recv construction, channel pairing and module verification.

use hlo::error::PassError;
use hlo::ir::{
    verify_channels, ChannelState, HloComputationBuilder, HloInstruction, HloModule, InstrId,
    PrimitiveType, Shape, MAX_CHANNEL_ID,
};
use hlo::pass::VerifyPass;

fn f32_shape(dims: &[i64]) -> Shape {
    Shape::array(PrimitiveType::F32, dims.to_vec())
}

fn add(builder: &mut HloComputationBuilder, instr: HloInstruction) -> InstrId {
    builder.add_instruction(instr).expect("instruction should be added")
}

/// `send`/`send-done` of a parameter on `channel`, plus `recv`/`recv-done`
/// when `with_recv` is set.
fn exchange_module(channel: i64, with_recv: bool) -> HloModule {
    let mut module = HloModule::new("exchange");
    let mut b = HloComputationBuilder::new("main");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[16])).unwrap());
    let send = HloInstruction::create_send(b.instruction(x).unwrap(), channel).unwrap();
    let send = add(&mut b, send);
    let done = HloInstruction::create_send_done(b.instruction(send).unwrap()).unwrap();
    add(&mut b, done);
    if with_recv {
        let recv = add(&mut b, HloInstruction::create_recv(f32_shape(&[16]), channel).unwrap());
        let done = HloInstruction::create_recv_done(b.instruction(recv).unwrap()).unwrap();
        add(&mut b, done);
    }
    module.add_entry_computation(b.build().unwrap()).unwrap();
    module
}

#[test]
fn test_done_requires_matching_start() {
    let mut b = HloComputationBuilder::new("main");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[4])).unwrap());
    let recv = add(&mut b, HloInstruction::create_recv(f32_shape(&[4]), 7).unwrap());
    let send = HloInstruction::create_send(b.instruction(x).unwrap(), 7).unwrap();
    let send = add(&mut b, send);

    let err = HloInstruction::create_send_done(b.instruction(recv).unwrap()).unwrap_err();
    assert!(err.is_invalid_argument());
    let err = HloInstruction::create_recv_done(b.instruction(send).unwrap()).unwrap_err();
    assert!(err.is_invalid_argument());
    let err = HloInstruction::create_send_done(b.instruction(x).unwrap()).unwrap_err();
    assert!(err.is_invalid_argument());

    let send_done = HloInstruction::create_send_done(b.instruction(send).unwrap()).unwrap();
    assert_eq!(
        send_done.channel_id().unwrap(),
        b.instruction(send).unwrap().channel_id().unwrap()
    );
    assert_eq!(send_done.shape(), &Shape::nil());

    let recv_done = HloInstruction::create_recv_done(b.instruction(recv).unwrap()).unwrap();
    assert_eq!(recv_done.channel_id().unwrap(), 7);
    assert_eq!(recv_done.shape(), &f32_shape(&[4]));
}

#[test]
fn test_start_shapes_carry_a_context_element() {
    let recv = HloInstruction::create_recv(f32_shape(&[2, 2]), 1).unwrap();
    assert_eq!(
        recv.shape(),
        &Shape::tuple(vec![f32_shape(&[2, 2]), Shape::scalar(PrimitiveType::U32)])
    );
    assert_eq!(recv.extra_attributes_to_string(), vec!["channel_id=1".to_string()]);

    assert!(HloInstruction::create_recv(f32_shape(&[2]), -1)
        .unwrap_err()
        .is_invalid_argument());
    assert!(HloInstruction::create_recv(Shape::nil(), 1)
        .unwrap_err()
        .is_invalid_argument());
}

#[test]
fn test_cloning_done_checks_the_new_operand() {
    let mut b = HloComputationBuilder::new("main");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[4])).unwrap());
    let send = HloInstruction::create_send(b.instruction(x).unwrap(), 2).unwrap();
    let send = add(&mut b, send);
    let recv = add(&mut b, HloInstruction::create_recv(f32_shape(&[4]), 2).unwrap());
    let done = HloInstruction::create_send_done(b.instruction(send).unwrap()).unwrap();

    let err = done
        .clone_with_new_operands(&Shape::nil(), &[b.instruction(recv).unwrap()], None)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let clone = done
        .clone_with_new_operands(&Shape::nil(), &[b.instruction(send).unwrap()], None)
        .unwrap();
    assert_eq!(clone.channel_id().unwrap(), 2);
}

#[test]
fn test_channel_ids_must_match_for_identity() {
    let a = HloInstruction::create_recv(f32_shape(&[4]), 1).unwrap();
    let b = HloInstruction::create_recv(f32_shape(&[4]), 2).unwrap();
    let same = |_: hlo::ir::ComputationId, _: hlo::ir::ComputationId| true;
    assert!(!a.identical_slow_path(&b, &same));
    assert!(a.identical_slow_path(&a, &same));
}

#[test]
fn test_verify_channels_reports_state() {
    let module = exchange_module(3, true);
    let channels = verify_channels(&module).unwrap();
    let status = channels[&3];
    assert_eq!(status.send, Some(ChannelState::Completed));
    assert_eq!(status.recv, Some(ChannelState::Completed));
    assert!(status.is_complete());

    let module = exchange_module(4, false);
    let channels = verify_channels(&module).unwrap();
    assert_eq!(channels[&4].recv, None);
    assert!(!channels[&4].is_complete());
}

#[test]
fn test_second_send_on_channel_is_rejected() {
    let mut module = HloModule::new("dup");
    let mut b = HloComputationBuilder::new("main");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[4])).unwrap());
    for _ in 0..2 {
        let send = HloInstruction::create_send(b.instruction(x).unwrap(), 9).unwrap();
        add(&mut b, send);
    }
    module.add_entry_computation(b.build().unwrap()).unwrap();

    let err = verify_channels(&module).unwrap_err();
    assert!(matches!(err, PassError::Channel { channel_id: 9, .. }));
}

#[test]
fn test_second_done_for_one_start_is_rejected() {
    let mut module = HloModule::new("dup");
    let mut b = HloComputationBuilder::new("main");
    let recv = add(&mut b, HloInstruction::create_recv(f32_shape(&[4]), 5).unwrap());
    for _ in 0..2 {
        let done = HloInstruction::create_recv_done(b.instruction(recv).unwrap()).unwrap();
        add(&mut b, done);
    }
    module.add_entry_computation(b.build().unwrap()).unwrap();

    assert!(matches!(
        verify_channels(&module),
        Err(PassError::Channel { channel_id: 5, .. })
    ));
}

#[test]
fn test_channel_ids_are_allocated_past_used_ids() {
    let mut module = exchange_module(5, true);
    assert_eq!(module.next_channel_id().unwrap(), 6);
    assert_eq!(module.next_channel_id().unwrap(), 7);

    let mut empty = HloModule::new("empty");
    assert_eq!(empty.next_channel_id().unwrap(), 0);
}

#[test]
fn test_channel_id_ceiling() {
    let x = HloInstruction::create_parameter(0, f32_shape(&[4])).unwrap();
    assert!(HloInstruction::create_send(&x, i64::MAX)
        .unwrap_err()
        .is_invalid_argument());
    assert!(HloInstruction::create_recv(f32_shape(&[4]), i64::MAX)
        .unwrap_err()
        .is_invalid_argument());

    // the largest id registers, and leaves the allocator exhausted
    let mut module = exchange_module(MAX_CHANNEL_ID, true);
    let err = module.next_channel_id().unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(verify_channels(&module).unwrap()[&MAX_CHANNEL_ID].is_complete());
}

#[test]
fn test_verify_pass() {
    let complete = exchange_module(1, true);
    VerifyPass::default()
        .run(&complete)
        .expect("complete channel should verify");

    let half = exchange_module(1, false);
    let err = VerifyPass::default().run(&half).unwrap_err();
    assert!(matches!(err, PassError::Channel { channel_id: 1, .. }));

    let lenient = VerifyPass {
        require_complete_channels: false,
    };
    lenient.run(&half).expect("one-sided channel is allowed");
}
