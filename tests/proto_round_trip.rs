//! Serializable records: module encode/decode, JSON transport and decode
//! errors.

mod common;

use common::{f32_shape, kitchen_sink};
use hlo::error::ProtoError;
use hlo::ir::{ComputationId, HloComputationBuilder, HloInstruction, HloModule, HloOpcode, PrimitiveType};
use hlo::proto::{HloModuleProto, PROTO_VERSION};

#[test]
fn test_module_record_round_trips() {
    let module = kitchen_sink();
    let proto = module.to_proto();
    assert_eq!(proto.version, PROTO_VERSION);

    let decoded = HloModule::from_proto(&proto).expect("record should decode");
    assert_eq!(decoded.to_proto(), proto);

    let entry = module.entry_computation_id().unwrap();
    let decoded_entry = decoded.entry_computation_id().unwrap();
    assert!(module.computations_equal(entry, &decoded, decoded_entry));
}

#[test]
fn test_json_transport_round_trips() {
    let proto = kitchen_sink().to_proto();
    let text = proto.to_json().unwrap();
    let parsed = HloModuleProto::from_json(&text).unwrap();
    assert_eq!(parsed, proto);

    let decoded = HloModule::from_proto(&parsed).unwrap();
    let bn = decoded
        .entry_computation()
        .unwrap()
        .instructions()
        .iter()
        .find(|i| i.opcode() == HloOpcode::BatchNormTraining)
        .unwrap();
    assert_eq!(bn.epsilon().unwrap(), 0.001);
}

#[test]
fn test_every_family_survives_decode() {
    let module = kitchen_sink();
    let decoded = HloModule::from_proto(&module.to_proto()).unwrap();
    let before = module.entry_computation().unwrap().instructions();
    let after = decoded.entry_computation().unwrap().instructions();
    assert_eq!(before.len(), after.len());
    let same = |a: ComputationId, b: ComputationId| module.computations_equal(a, &decoded, b);
    for (lhs, rhs) in before.iter().zip(after) {
        assert_eq!(lhs.opcode(), rhs.opcode());
        assert!(lhs.identical_slow_path(rhs, &same), "'{}' changed on decode", lhs.name());
    }
    assert!(after.iter().any(|i| i.opcode() == HloOpcode::BatchNormInference));
    assert!(after.iter().any(|i| i.opcode() == HloOpcode::BatchNormGrad));
}

#[test]
fn test_non_finite_constants_survive_json() {
    let mut module = HloModule::new("consts");
    let mut b = HloComputationBuilder::new("main");
    for (n, value) in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -0.0].into_iter().enumerate() {
        let constant = HloInstruction::create_constant(value, PrimitiveType::F32)
            .unwrap()
            .with_name(format!("c{}", n));
        b.add_instruction(constant).unwrap();
    }
    module.add_entry_computation(b.build().unwrap()).unwrap();

    let text = module.to_proto().to_json().unwrap();
    let decoded = HloModule::from_proto(&HloModuleProto::from_json(&text).unwrap()).unwrap();
    let before = module.entry_computation().unwrap().instructions();
    let after = decoded.entry_computation().unwrap().instructions();
    assert_eq!(before.len(), after.len());
    for (lhs, rhs) in before.iter().zip(after) {
        assert_eq!(
            lhs.constant_value().unwrap().to_bits(),
            rhs.constant_value().unwrap().to_bits()
        );
        assert!(lhs.identical_slow_path(rhs, &|_: ComputationId, _: ComputationId| true));
    }
}

#[test]
fn test_in_place_flag_is_not_serialized() {
    let module = kitchen_sink();
    let decoded = HloModule::from_proto(&module.to_proto()).unwrap();
    let slice = decoded
        .entry_computation()
        .unwrap()
        .instructions()
        .iter()
        .find(|i| i.opcode() == HloOpcode::Slice)
        .unwrap();
    assert!(!slice.is_in_place_slice().unwrap());
}

#[test]
fn test_instruction_record_carries_only_its_attributes() {
    let module = kitchen_sink();
    let entry = module.entry_computation().unwrap();
    let send = entry
        .instructions()
        .iter()
        .find(|i| i.opcode() == HloOpcode::Send)
        .unwrap();
    let proto = send.to_proto();
    assert_eq!(proto.opcode, "send");
    assert_eq!(proto.channel_id, Some(0));
    assert_eq!(proto.epsilon, None);
    assert!(proto.dimensions.is_empty());

    let detached = HloInstruction::create_parameter(7, f32_shape(&[2])).unwrap();
    assert_eq!(detached.to_proto().id, hlo::ir::DETACHED_ID);
    assert_eq!(detached.to_proto().parameter_number, Some(7));
}

#[test]
fn test_next_channel_id_survives_round_trip() {
    let mut module = kitchen_sink();
    let mut decoded = HloModule::from_proto(&module.to_proto()).unwrap();
    assert_eq!(decoded.next_channel_id().unwrap(), module.next_channel_id().unwrap());
}

fn entry_record_mut(proto: &mut HloModuleProto) -> &mut hlo::proto::HloComputationProto {
    proto.computations.last_mut().unwrap()
}

#[test]
fn test_unknown_opcode_is_rejected() {
    let mut proto = kitchen_sink().to_proto();
    entry_record_mut(&mut proto).instructions[5].opcode = "frobnicate".into();
    assert!(matches!(
        HloModule::from_proto(&proto),
        Err(ProtoError::UnknownOpcode { .. })
    ));
}

#[test]
fn test_dangling_operand_is_rejected() {
    let mut proto = kitchen_sink().to_proto();
    let record = entry_record_mut(&mut proto)
        .instructions
        .iter_mut()
        .find(|i| i.opcode == "reverse")
        .unwrap();
    record.operand_ids[0] = 999;
    assert!(matches!(
        HloModule::from_proto(&proto),
        Err(ProtoError::DanglingOperand { id: 999, .. })
    ));
}

#[test]
fn test_missing_and_invalid_attributes_are_rejected() {
    let mut proto = kitchen_sink().to_proto();
    let bn = entry_record_mut(&mut proto)
        .instructions
        .iter_mut()
        .find(|i| i.opcode == "batch-norm-training")
        .unwrap();
    bn.epsilon = None;
    assert!(matches!(
        HloModule::from_proto(&proto),
        Err(ProtoError::MissingField { field: "epsilon", .. })
    ));

    let mut proto = kitchen_sink().to_proto();
    let bn = entry_record_mut(&mut proto)
        .instructions
        .iter_mut()
        .find(|i| i.opcode == "batch-norm-training")
        .unwrap();
    bn.feature_index = Some(3);
    match HloModule::from_proto(&proto) {
        Err(ProtoError::Instr(err)) => assert!(err.is_invalid_argument()),
        other => panic!("expected an instruction error, got {:?}", other.map(|m| m.name)),
    }
}

#[test]
fn test_unknown_computation_is_rejected() {
    let mut proto = kitchen_sink().to_proto();
    let reduce = entry_record_mut(&mut proto)
        .instructions
        .iter_mut()
        .find(|i| i.opcode == "reduce")
        .unwrap();
    reduce.called_computation_ids = vec![42];
    assert!(matches!(
        HloModule::from_proto(&proto),
        Err(ProtoError::DanglingComputation { id: 42 })
    ));
}

#[test]
fn test_version_mismatch_is_rejected() {
    let mut proto = kitchen_sink().to_proto();
    proto.version = PROTO_VERSION + 1;
    assert!(matches!(
        HloModule::from_proto(&proto),
        Err(ProtoError::Version { .. })
    ));
}
