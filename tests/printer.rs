//! Text rendering of modules, computations and single instructions.

use hlo::ir::{ComputationId, HloComputationBuilder, HloInstruction, HloModule, HloOpcode, InstrId, PrimitiveType, Shape};
use hlo::printer::{emit_computation_text, emit_module_text, PrintOptions};

fn f32_shape(dims: &[i64]) -> Shape {
    Shape::array(PrimitiveType::F32, dims.to_vec())
}

fn add(builder: &mut HloComputationBuilder, instr: HloInstruction) -> InstrId {
    builder.add_instruction(instr).expect("instruction should be added")
}

fn build_module() -> (HloModule, ComputationId) {
    let mut module = HloModule::new("m");

    let mut b = HloComputationBuilder::new("add");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[])).unwrap().with_name("x"));
    let y = add(&mut b, HloInstruction::create_parameter(1, f32_shape(&[])).unwrap().with_name("y"));
    let sum = HloInstruction::create_binary(
        HloOpcode::Add,
        f32_shape(&[]),
        b.instruction(x).unwrap(),
        b.instruction(y).unwrap(),
    )
    .unwrap()
    .with_name("sum");
    add(&mut b, sum);
    let add_comp = module.add_computation(b.build().unwrap()).unwrap();

    let mut b = HloComputationBuilder::new("main");
    let a = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[4, 8])).unwrap().with_name("a"));
    let zero = add(
        &mut b,
        HloInstruction::create_constant(0.0, PrimitiveType::F32).unwrap().with_name("zero"),
    );
    let r = HloInstruction::create_reduce(
        f32_shape(&[4]),
        b.instruction(a).unwrap(),
        b.instruction(zero).unwrap(),
        &[1],
        add_comp,
    )
    .unwrap()
    .with_name("r");
    add(&mut b, r);
    let entry = module.add_entry_computation(b.build().unwrap()).unwrap();
    (module, entry)
}

#[test]
fn test_module_text() {
    let (module, _) = build_module();
    let text = emit_module_text(&module, &PrintOptions::default()).unwrap();
    let expected = "\
HloModule m, entry=%main

%add {
  %x = f32[] parameter(0)
  %y = f32[] parameter(1)
  ROOT %sum = f32[] add(%x, %y)
}

ENTRY %main {
  %a = f32[4,8] parameter(0)
  %zero = f32[] constant(0)
  ROOT %r = f32[4] reduce(%a, %zero), dimensions={1}, to_apply=%add
}
";
    assert_eq!(text, expected);
}

#[test]
fn test_print_options() {
    let (module, entry) = build_module();
    let comp = module.computation(entry).unwrap();
    let options = PrintOptions {
        print_operand_shapes: true,
        print_ids: true,
    };
    let r = comp.root_instruction();
    let line = r.to_string_with(Some(&module), comp, &options).unwrap();
    assert_eq!(
        line,
        "%r = f32[4] reduce(f32[4,8] %a, f32[] %zero), dimensions={1}, to_apply=%add  // #2"
    );

    // without a module the callee is named by id
    let line = r.to_string_with(None, comp, &PrintOptions::default()).unwrap();
    assert!(line.ends_with("to_apply=computation0"));

    let text = emit_computation_text(Some(&module), comp, &PrintOptions::default()).unwrap();
    assert!(text.starts_with("ENTRY %main {\n"));
}

#[test]
fn test_slice_renders_in_place_marker() {
    let mut b = HloComputationBuilder::new("s");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[8])).unwrap().with_name("x"));
    let slice = HloInstruction::create_slice(f32_shape(&[3]), b.instruction(x).unwrap(), &[1], &[7], &[2])
        .unwrap()
        .with_name("s");
    let s = add(&mut b, slice);
    let mut comp = b.build().unwrap();
    comp.instruction_mut(s).unwrap().set_is_in_place_slice(true).unwrap();

    let text = emit_computation_text(None, &comp, &PrintOptions::default()).unwrap();
    assert!(text.contains("ROOT %s = f32[3] slice(%x), slice={[1:7:2]}, in_place=true"));
}

#[test]
fn test_map_static_operands_render_by_name() {
    let (mut module, _) = build_module();
    let add_comp = module.computation_by_name("add").unwrap().id();

    let mut b = HloComputationBuilder::new("mapped");
    let x = add(&mut b, HloInstruction::create_parameter(0, f32_shape(&[4])).unwrap().with_name("x"));
    let bias = add(
        &mut b,
        HloInstruction::create_constant(2.0, PrimitiveType::F32).unwrap().with_name("bias"),
    );
    let map = HloInstruction::create_map_with_static_operands(
        f32_shape(&[4]),
        &[b.instruction(x).unwrap()],
        add_comp,
        &[b.instruction(bias).unwrap()],
    )
    .unwrap()
    .with_name("m");
    add(&mut b, map);
    let mapped = module.add_computation(b.build().unwrap()).unwrap();

    let comp = module.computation(mapped).unwrap();
    let line = comp
        .root_instruction()
        .to_string_with(Some(&module), comp, &PrintOptions::default())
        .unwrap();
    assert_eq!(
        line,
        "%m = f32[4] map(%x), dimensions={0}, static_operands={%bias}, to_apply=%add"
    );
    // the detached form has no names to resolve
    assert_eq!(
        comp.root_instruction().extra_attributes_to_string(),
        vec!["dimensions={0}".to_string(), "static_operands={#1}".to_string()]
    );
}
