//! Constant tensor values carried by graph node attributes
//!
//! A [`TensorValue`] is a fully known numeric array attached to a node
//! (typically a `Const` node's `value` attribute). Transforms read these at
//! rewrite time to infer parameters such as dilation rates.

pub mod convert;

pub use convert::{tensor_to_array_i32, tensor_to_array_i64};

/// Element type of a tensor or of a node's `T` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Boolean
    Bool,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Float
    }
}

/// A statically known tensor: dtype, shape, and element payload
///
/// The payload vector used is determined by `dtype`; the others stay empty.
/// Element order is row-major over `dims`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TensorValue {
    /// Element type
    pub dtype: DataType,
    /// Shape; empty means scalar
    pub dims: Vec<i64>,
    /// Elements when `dtype` is [`DataType::Float`]
    pub float_data: Vec<f32>,
    /// Elements when `dtype` is [`DataType::Int32`]
    pub int_data: Vec<i32>,
    /// Elements when `dtype` is [`DataType::Int64`]
    pub int64_data: Vec<i64>,
}

impl TensorValue {
    /// Create an int32 tensor with the given shape and elements
    pub fn from_i32(dims: Vec<i64>, values: Vec<i32>) -> Self {
        Self {
            dtype: DataType::Int32,
            dims,
            int_data: values,
            ..Default::default()
        }
    }

    /// Create an int64 tensor with the given shape and elements
    pub fn from_i64(dims: Vec<i64>, values: Vec<i64>) -> Self {
        Self {
            dtype: DataType::Int64,
            dims,
            int64_data: values,
            ..Default::default()
        }
    }

    /// Create a float tensor with the given shape and elements
    pub fn from_f32(dims: Vec<i64>, values: Vec<f32>) -> Self {
        Self {
            dtype: DataType::Float,
            dims,
            float_data: values,
            ..Default::default()
        }
    }

    /// Number of elements implied by the shape (scalar shape implies 1)
    pub fn element_count(&self) -> usize {
        self.dims.iter().map(|&d| d.max(0) as usize).product()
    }

    /// Tensor rank
    pub fn rank(&self) -> usize {
        self.dims.len()
    }
}
