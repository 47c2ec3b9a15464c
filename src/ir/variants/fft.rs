use crate::error::InstrError;
use crate::ir::instr::{join_i64, HloInstruction, InstrKind};
use crate::ir::opcode::HloOpcode;
use crate::ir::types::{FftType, Shape};

/// At most this many trailing dimensions are transformed.
pub const MAX_FFT_RANK: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FftAttrs {
    pub(crate) fft_type: FftType,
    /// One length per transformed (trailing) dimension.
    pub(crate) fft_length: Vec<i64>,
}

impl FftAttrs {
    pub(crate) fn extra_attributes(&self) -> Vec<String> {
        vec![
            format!("fft_type={}", self.fft_type),
            format!("fft_length={{{}}}", join_i64(&self.fft_length)),
        ]
    }
}

/// Result shape of an FFT over the trailing dimensions of `operand`.
///
/// FFT and IFFT map complex to complex. RFFT maps real to complex and keeps
/// `n / 2 + 1` entries of the last dimension. IRFFT maps that half spectrum
/// back to `n` real entries. Returns `None` when the operand's element type
/// does not fit `fft_type`.
fn fft_result_shape(operand: &Shape, fft_type: FftType, fft_length: &[i64]) -> Option<Shape> {
    let element_type = operand.element_type()?;
    let mut dims = operand.dims().to_vec();
    let last_len = *fft_length.last()?;
    let last = dims.last_mut()?;
    let element_type = match fft_type {
        FftType::Fft | FftType::Ifft => element_type.is_complex().then_some(element_type)?,
        FftType::Rfft => {
            *last = last_len / 2 + 1;
            element_type.to_complex()?
        }
        FftType::Irfft => {
            *last = last_len;
            element_type.complex_component()?
        }
    };
    Some(Shape::array(element_type, dims))
}

impl HloInstruction {
    /// Fourier transform over the trailing `fft_length.len()` dimensions.
    ///
    /// For FFT, IFFT and RFFT the operand's trailing dimensions equal
    /// `fft_length`. IRFFT consumes the half spectrum, so its last operand
    /// dimension is `fft_length.last() / 2 + 1`. The result shape is checked
    /// in full, element type included.
    pub fn create_fft(
        shape: Shape,
        operand: &HloInstruction,
        fft_type: FftType,
        fft_length: &[i64],
    ) -> Result<Self, InstrError> {
        let opcode = HloOpcode::Fft;
        let in_dims = operand.shape().dims();
        if !operand.shape().is_array() {
            return Err(InstrError::invalid(
                opcode,
                format!("operand must be an array, got {}", operand.shape()),
            ));
        }
        if fft_length.is_empty() || fft_length.len() > MAX_FFT_RANK {
            return Err(InstrError::invalid(
                opcode,
                format!("between 1 and {} fft lengths are required, got {}", MAX_FFT_RANK, fft_length.len()),
            ));
        }
        if fft_length.len() > in_dims.len() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "{} fft lengths given for rank-{} operand",
                    fft_length.len(),
                    in_dims.len()
                ),
            ));
        }
        if let Some(bad) = fft_length.iter().find(|&&n| n < 1) {
            return Err(InstrError::invalid(opcode, format!("fft length {} is not positive", bad)));
        }
        let trailing = &in_dims[in_dims.len() - fft_length.len()..];
        let mut expected = fft_length.to_vec();
        if fft_type == FftType::Irfft {
            if let Some(last) = expected.last_mut() {
                *last = *last / 2 + 1;
            }
        }
        if trailing != expected.as_slice() {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "{} over lengths {{{}}} expects trailing operand dimensions [{}], got [{}]",
                    fft_type,
                    join_i64(fft_length),
                    join_i64(&expected),
                    join_i64(trailing)
                ),
            ));
        }
        let expected = fft_result_shape(operand.shape(), fft_type, fft_length).ok_or_else(|| {
            InstrError::invalid(
                opcode,
                format!("{} is not defined for operand {}", fft_type, operand.shape()),
            )
        })?;
        if shape != expected {
            return Err(InstrError::invalid(
                opcode,
                format!(
                    "result shape {} does not match {} of {}, expected {}",
                    shape,
                    fft_type,
                    operand.shape(),
                    expected
                ),
            ));
        }
        HloInstruction::assemble(
            shape,
            &[operand],
            InstrKind::Fft(FftAttrs {
                fft_type,
                fft_length: fft_length.to_vec(),
            }),
        )
    }

    pub fn fft_type(&self) -> Result<FftType, InstrError> {
        match &self.kind {
            InstrKind::Fft(attrs) => Ok(attrs.fft_type),
            _ => Err(InstrError::unsupported(self.opcode(), "fft_type")),
        }
    }

    pub fn fft_length(&self) -> Result<&[i64], InstrError> {
        match &self.kind {
            InstrKind::Fft(attrs) => Ok(&attrs.fft_length),
            _ => Err(InstrError::unsupported(self.opcode(), "fft_length")),
        }
    }
}
