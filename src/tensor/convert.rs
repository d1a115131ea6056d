//! Checked conversion from [`TensorValue`] to ndarray arrays
//!
//! Conversions validate dtype, non-negative dims, and element count before
//! building the array, surfacing [`TransformError::InvalidTensor`] instead
//! of panicking.

use ndarray::{ArrayD, IxDyn};

use crate::error::{GraphResult, TransformError};
use crate::tensor::{DataType, TensorValue};

fn checked_shape(tensor: &TensorValue, actual_len: usize) -> GraphResult<Vec<usize>> {
    let mut shape = Vec::with_capacity(tensor.dims.len());
    for &dim in &tensor.dims {
        if dim < 0 {
            return Err(TransformError::InvalidTensor(format!(
                "negative dimension {} in shape {:?}",
                dim, tensor.dims
            )));
        }
        shape.push(dim as usize);
    }
    let expected: usize = shape.iter().product();
    if expected != actual_len {
        return Err(TransformError::InvalidTensor(format!(
            "shape {:?} implies {} elements, payload has {}",
            tensor.dims, expected, actual_len
        )));
    }
    Ok(shape)
}

/// Convert an int32 tensor to an `ArrayD<i32>`
pub fn tensor_to_array_i32(tensor: &TensorValue) -> GraphResult<ArrayD<i32>> {
    if tensor.dtype != DataType::Int32 {
        return Err(TransformError::InvalidTensor(format!(
            "expected int32 tensor, got {:?}",
            tensor.dtype
        )));
    }
    let shape = checked_shape(tensor, tensor.int_data.len())?;
    ArrayD::from_shape_vec(IxDyn(&shape), tensor.int_data.clone())
        .map_err(|e| TransformError::InvalidTensor(e.to_string()))
}

/// Convert an int64 tensor to an `ArrayD<i64>`
pub fn tensor_to_array_i64(tensor: &TensorValue) -> GraphResult<ArrayD<i64>> {
    if tensor.dtype != DataType::Int64 {
        return Err(TransformError::InvalidTensor(format!(
            "expected int64 tensor, got {:?}",
            tensor.dtype
        )));
    }
    let shape = checked_shape(tensor, tensor.int64_data.len())?;
    ArrayD::from_shape_vec(IxDyn(&shape), tensor.int64_data.clone())
        .map_err(|e| TransformError::InvalidTensor(e.to_string()))
}
