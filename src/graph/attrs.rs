//! Typed attribute values attached to graph nodes

use crate::tensor::{DataType, TensorValue};

/// A typed node attribute value
///
/// Nodes carry a name → `AttrValue` map; the variant tags what kind of value
/// the producing system stored under the name.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A data type tag (e.g. the `T` attribute of a convolution)
    Type(DataType),
    /// A statically known tensor (e.g. a `Const` node's `value`)
    Tensor(TensorValue),
    /// A scalar integer
    Int(i64),
    /// A scalar float
    Float(f32),
    /// A string (e.g. `padding`, `data_format`)
    Str(String),
    /// A boolean flag (e.g. `use_cudnn_on_gpu`)
    Bool(bool),
    /// A list of integers (e.g. `strides`, `dilations`)
    IntList(Vec<i64>),
}

impl AttrValue {
    /// View as a tensor, if this is a `Tensor` attribute
    pub fn as_tensor(&self) -> Option<&TensorValue> {
        match self {
            AttrValue::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// View as a string, if this is a `Str` attribute
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// View as an integer list, if this is an `IntList` attribute
    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::IntList(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// View as a scalar integer, if this is an `Int` attribute
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// View as a boolean, if this is a `Bool` attribute
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// View as a data type tag, if this is a `Type` attribute
    pub fn as_type(&self) -> Option<DataType> {
        match self {
            AttrValue::Type(t) => Some(*t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(AttrValue::Int(7).as_int(), Some(7));
        assert_eq!(AttrValue::Int(7).as_bool(), None);
        assert_eq!(AttrValue::Str("SAME".into()).as_str(), Some("SAME"));
        assert_eq!(
            AttrValue::IntList(vec![1, 2, 2, 1]).as_ints(),
            Some(&[1, 2, 2, 1][..])
        );
        assert_eq!(AttrValue::Type(DataType::Float).as_type(), Some(DataType::Float));
    }

    #[test]
    fn test_tensor_accessor() {
        let attr = AttrValue::Tensor(TensorValue::from_i32(vec![2], vec![2, 2]));
        assert_eq!(attr.as_tensor().unwrap().int_data, vec![2, 2]);
        assert!(attr.as_str().is_none());
    }
}
