//! Property tests for slice arithmetic and the generic operations.

use proptest::prelude::*;

use hlo::ir::{
    slice_dim_size, ComputationId, HloComputationBuilder, HloInstruction, InstrId, PrimitiveType,
    Shape,
};

/// Per dimension: (size, start seed, limit seed, stride).
fn slice_dims() -> impl Strategy<Value = Vec<(i64, i64, i64, i64)>> {
    prop::collection::vec((1i64..10, 0i64..10, 0i64..10, 1i64..5), 1..4)
}

/// Turns seeds into valid `0 <= start < limit <= size` ranges.
fn ranges(dims: &[(i64, i64, i64, i64)]) -> (Vec<i64>, Vec<i64>, Vec<i64>, Vec<i64>) {
    let mut sizes = Vec::new();
    let mut starts = Vec::new();
    let mut limits = Vec::new();
    let mut strides = Vec::new();
    for &(size, a, b, stride) in dims {
        let start = a % size;
        let limit = start + 1 + b % (size - start);
        sizes.push(size);
        starts.push(start);
        limits.push(limit);
        strides.push(stride);
    }
    (sizes, starts, limits, strides)
}

fn same_id(a: InstrId, b: InstrId) -> bool {
    a == b
}

fn same_computation(a: ComputationId, b: ComputationId) -> bool {
    a == b
}

proptest! {
    #[test]
    fn slice_dim_size_covers_range(start in -50i64..50, len in 1i64..40, stride in 1i64..6) {
        let size = slice_dim_size(start, start + len, stride);
        prop_assert!(size >= 1);
        prop_assert!(size * stride >= len);
        prop_assert!((size - 1) * stride < len);
    }

    #[test]
    fn slice_result_matches_shape_arithmetic(dims in slice_dims()) {
        let (sizes, starts, limits, strides) = ranges(&dims);
        let operand_shape = Shape::array(PrimitiveType::F32, sizes);
        let expected = operand_shape.sliced(&starts, &limits, &strides).unwrap();

        let mut b = HloComputationBuilder::new("slice");
        let x = b
            .add_instruction(HloInstruction::create_parameter(0, operand_shape).unwrap())
            .unwrap();
        let x = b.instruction(x).unwrap();
        let slice = HloInstruction::create_slice(expected.clone(), x, &starts, &limits, &strides);
        prop_assert!(slice.is_ok());
        let slice = slice.unwrap();
        prop_assert_eq!(slice.shape(), &expected);

        // rendering is stable and the clone is indistinguishable
        prop_assert_eq!(slice.extra_attributes_to_string(), slice.extra_attributes_to_string());
        let clone = slice.clone_with_new_operands(slice.shape(), &[x], None).unwrap();
        prop_assert!(slice.identical(&clone, &same_id, &same_computation));
        prop_assert_eq!(clone.extra_attributes_to_string(), slice.extra_attributes_to_string());
    }

    #[test]
    fn transpose_round_trips_through_its_inverse(perm in Just(vec![0i64, 1, 2]).prop_shuffle()) {
        let dims = [2i64, 3, 5];
        let mut b = HloComputationBuilder::new("transpose");
        let x = b
            .add_instruction(
                HloInstruction::create_parameter(0, Shape::array(PrimitiveType::F32, dims.to_vec()))
                    .unwrap(),
            )
            .unwrap();
        let permuted: Vec<i64> = perm.iter().map(|&d| dims[d as usize]).collect();
        let tr = HloInstruction::create_transpose(
            Shape::array(PrimitiveType::F32, permuted),
            b.instruction(x).unwrap(),
            &perm,
        )
        .unwrap();
        let tr = b.add_instruction(tr).unwrap();

        let mut inverse = vec![0i64; perm.len()];
        for (i, &p) in perm.iter().enumerate() {
            inverse[p as usize] = i as i64;
        }
        let back = HloInstruction::create_transpose(
            Shape::array(PrimitiveType::F32, dims.to_vec()),
            b.instruction(tr).unwrap(),
            &inverse,
        );
        prop_assert!(back.is_ok());
        let back = back.unwrap();
        prop_assert_eq!(back.shape(), b.instruction(x).unwrap().shape());
    }
}
