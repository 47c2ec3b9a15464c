/// Element type of an array shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Pred,
    S32,
    S64,
    U32,
    F16,
    F32,
    F64,
    /// Complex with `f32` components.
    C64,
    /// Complex with `f64` components.
    C128,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Pred => "pred",
            PrimitiveType::S32 => "s32",
            PrimitiveType::S64 => "s64",
            PrimitiveType::U32 => "u32",
            PrimitiveType::F16 => "f16",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
            PrimitiveType::C64 => "c64",
            PrimitiveType::C128 => "c128",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "pred" => PrimitiveType::Pred,
            "s32" => PrimitiveType::S32,
            "s64" => PrimitiveType::S64,
            "u32" => PrimitiveType::U32,
            "f16" => PrimitiveType::F16,
            "f32" => PrimitiveType::F32,
            "f64" => PrimitiveType::F64,
            "c64" => PrimitiveType::C64,
            "c128" => PrimitiveType::C128,
            _ => return None,
        };
        Some(ty)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, PrimitiveType::C64 | PrimitiveType::C128)
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, PrimitiveType::F16 | PrimitiveType::F32 | PrimitiveType::F64)
    }

    /// Real component of a complex type: `c64 -> f32`, `c128 -> f64`.
    pub fn complex_component(self) -> Option<PrimitiveType> {
        match self {
            PrimitiveType::C64 => Some(PrimitiveType::F32),
            PrimitiveType::C128 => Some(PrimitiveType::F64),
            _ => None,
        }
    }

    /// Complex type with `self` as its component: `f32 -> c64`, `f64 -> c128`.
    pub fn to_complex(self) -> Option<PrimitiveType> {
        match self {
            PrimitiveType::F32 => Some(PrimitiveType::C64),
            PrimitiveType::F64 => Some(PrimitiveType::C128),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result type of an instruction: a dense array or a tuple of shapes.
///
/// Shapes are plain values. Two shapes are equal iff they have the same
/// element type and dimensions (arrays) or pairwise-equal elements (tuples).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Array {
        element_type: PrimitiveType,
        dims: Vec<i64>,
    },
    Tuple(Vec<Shape>),
}

impl Shape {
    pub fn array(element_type: PrimitiveType, dims: impl Into<Vec<i64>>) -> Self {
        Shape::Array {
            element_type,
            dims: dims.into(),
        }
    }

    pub fn scalar(element_type: PrimitiveType) -> Self {
        Shape::array(element_type, Vec::new())
    }

    pub fn tuple(elements: Vec<Shape>) -> Self {
        Shape::Tuple(elements)
    }

    /// The empty tuple.
    pub fn nil() -> Self {
        Shape::Tuple(Vec::new())
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Shape::Array { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Shape::Tuple(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Array { dims, .. } if dims.is_empty())
    }

    /// Number of dimensions. Tuples have rank 0.
    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Dimension sizes of an array shape; empty for tuples.
    pub fn dims(&self) -> &[i64] {
        match self {
            Shape::Array { dims, .. } => dims,
            Shape::Tuple(_) => &[],
        }
    }

    pub fn element_type(&self) -> Option<PrimitiveType> {
        match self {
            Shape::Array { element_type, .. } => Some(*element_type),
            Shape::Tuple(_) => None,
        }
    }

    pub fn tuple_element(&self, index: usize) -> Option<&Shape> {
        match self {
            Shape::Tuple(elements) => elements.get(index),
            Shape::Array { .. } => None,
        }
    }

    /// Shape produced by slicing `self` with the given index ranges.
    ///
    /// Returns `None` for tuples, on a rank mismatch, or when a stride is
    /// not positive. Range bounds are not checked here.
    pub fn sliced(&self, starts: &[i64], limits: &[i64], strides: &[i64]) -> Option<Shape> {
        let Shape::Array { element_type, dims } = self else {
            return None;
        };
        if starts.len() != dims.len() || limits.len() != dims.len() || strides.len() != dims.len() {
            return None;
        }
        let mut out = Vec::with_capacity(dims.len());
        for d in 0..dims.len() {
            if strides[d] < 1 {
                return None;
            }
            out.push(slice_dim_size(starts[d], limits[d], strides[d]));
        }
        Some(Shape::array(*element_type, out))
    }
}

/// Number of elements selected along one dimension: `ceil((limit - start) / stride)`.
pub fn slice_dim_size(start: i64, limit: i64, stride: i64) -> i64 {
    if limit <= start {
        return 0;
    }
    (limit - start + stride - 1) / stride
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Array { element_type, dims } => {
                let dims_str: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "{}[{}]", element_type, dims_str.join(","))
            }
            Shape::Tuple(elements) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Flavor of a fast Fourier transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FftType {
    /// Complex to complex forward.
    Fft,
    /// Complex to complex inverse.
    Ifft,
    /// Real to complex forward.
    Rfft,
    /// Complex to real inverse.
    Irfft,
}

impl FftType {
    pub fn name(self) -> &'static str {
        match self {
            FftType::Fft => "FFT",
            FftType::Ifft => "IFFT",
            FftType::Rfft => "RFFT",
            FftType::Irfft => "IRFFT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FFT" => Some(FftType::Fft),
            "IFFT" => Some(FftType::Ifft),
            "RFFT" => Some(FftType::Rfft),
            "IRFFT" => Some(FftType::Irfft),
            _ => None,
        }
    }
}

impl std::fmt::Display for FftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
