//! Builders shared by the integration tests.

#![allow(dead_code)]

use hlo::ir::{
    ComputationId, FftType, HloComputationBuilder, HloInstruction, HloModule, HloOpcode, InstrId,
    PrimitiveType, Shape,
};

pub fn f32_shape(dims: &[i64]) -> Shape {
    Shape::array(PrimitiveType::F32, dims.to_vec())
}

pub fn add(builder: &mut HloComputationBuilder, instr: HloInstruction) -> InstrId {
    builder.add_instruction(instr).expect("instruction should be added")
}

pub fn add_computation(module: &mut HloModule) -> ComputationId {
    let mut b = HloComputationBuilder::new("add");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[])).unwrap());
    let y = add(&mut b, HloInstruction::create_parameter(1, f32_shape(&[])).unwrap());
    let sum = HloInstruction::create_binary(
        HloOpcode::Add,
        f32_shape(&[]),
        b.instruction(x).unwrap(),
        b.instruction(y).unwrap(),
    )
    .unwrap();
    add(&mut b, sum);
    module.add_computation(b.build().unwrap()).unwrap()
}

/// A module with one instruction of every family in its entry computation
/// and a scalar `add` called by Reduce and Map.
pub fn kitchen_sink() -> HloModule {
    let mut module = HloModule::new("sink");
    let add_comp = add_computation(&mut module);
    let channel = module.next_channel_id().unwrap();

    let mut b = HloComputationBuilder::new("main");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[2, 3, 4])).unwrap().with_name("x"));
    let scale = add(&mut b, HloInstruction::create_parameter(1, f32_shape(&[3])).unwrap());
    let offset = add(&mut b, HloInstruction::create_parameter(2, f32_shape(&[3])).unwrap());
    let mean = add(&mut b, HloInstruction::create_parameter(4, f32_shape(&[3])).unwrap());
    let variance = add(&mut b, HloInstruction::create_parameter(5, f32_shape(&[3])).unwrap());
    let grad = add(&mut b, HloInstruction::create_parameter(6, f32_shape(&[2, 3, 4])).unwrap());
    let cx = add(
        &mut b,
        HloInstruction::create_parameter(3, Shape::array(PrimitiveType::C64, vec![8, 16])).unwrap(),
    );
    let zero = add(&mut b, HloInstruction::create_constant(0.0, PrimitiveType::F32).unwrap());

    macro_rules! push {
        ($e:expr) => {{
            let instr = $e.expect("valid instruction");
            add(&mut b, instr)
        }};
    }
    push!(HloInstruction::create_batch_norm_training(
        Shape::tuple(vec![f32_shape(&[2, 3, 4]), f32_shape(&[3]), f32_shape(&[3])]),
        b.instruction(x).unwrap(),
        b.instruction(scale).unwrap(),
        b.instruction(offset).unwrap(),
        0.001,
        1,
    ));
    push!(HloInstruction::create_batch_norm_inference(
        f32_shape(&[2, 3, 4]),
        b.instruction(x).unwrap(),
        b.instruction(scale).unwrap(),
        b.instruction(offset).unwrap(),
        b.instruction(mean).unwrap(),
        b.instruction(variance).unwrap(),
        0.001,
        1,
    ));
    push!(HloInstruction::create_batch_norm_grad(
        Shape::tuple(vec![f32_shape(&[2, 3, 4]), f32_shape(&[3]), f32_shape(&[3])]),
        b.instruction(x).unwrap(),
        b.instruction(scale).unwrap(),
        b.instruction(mean).unwrap(),
        b.instruction(variance).unwrap(),
        b.instruction(grad).unwrap(),
        0.001,
        1,
    ));
    let rev = push!(HloInstruction::create_reverse(f32_shape(&[2, 3, 4]), b.instruction(x).unwrap(), &[0, 2]));
    push!(HloInstruction::create_concatenate(
        f32_shape(&[4, 3, 4]),
        &[b.instruction(x).unwrap(), b.instruction(rev).unwrap()],
        0,
    ));
    push!(HloInstruction::create_transpose(f32_shape(&[4, 3, 2]), b.instruction(x).unwrap(), &[2, 1, 0]));
    let br = push!(HloInstruction::create_broadcast(
        f32_shape(&[2, 3, 4]),
        b.instruction(scale).unwrap(),
        &[1],
    ));
    let slice = push!(HloInstruction::create_slice(
        f32_shape(&[1, 3, 2]),
        b.instruction(x).unwrap(),
        &[0, 0, 0],
        &[1, 3, 4],
        &[1, 1, 2],
    ));
    push!(HloInstruction::create_reduce(
        f32_shape(&[3]),
        b.instruction(x).unwrap(),
        b.instruction(zero).unwrap(),
        &[0, 2],
        add_comp,
    ));
    push!(HloInstruction::create_map_with_static_operands(
        f32_shape(&[2, 3, 4]),
        &[b.instruction(x).unwrap(), b.instruction(br).unwrap()],
        add_comp,
        &[b.instruction(zero).unwrap()],
    ));
    push!(HloInstruction::create_fft(
        Shape::array(PrimitiveType::C64, vec![8, 16]),
        b.instruction(cx).unwrap(),
        FftType::Fft,
        &[8, 16],
    ));
    let send = push!(HloInstruction::create_send(b.instruction(x).unwrap(), channel));
    push!(HloInstruction::create_send_done(b.instruction(send).unwrap()));
    let recv = push!(HloInstruction::create_recv(f32_shape(&[3]), channel));
    push!(HloInstruction::create_recv_done(b.instruction(recv).unwrap()));

    let mut comp = b.build().unwrap();
    comp.instruction_mut(slice).unwrap().set_is_in_place_slice(true).unwrap();
    module.add_entry_computation(comp).unwrap();
    module
}
