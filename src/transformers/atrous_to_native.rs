//! Rewrite space-to-batch wrapped convolutions into native dilated ones
//!
//! Frameworks without a native dilation parameter emulate atrous convolution
//! by wrapping a stride-1 convolution in `SpaceToBatchND`/`BatchToSpaceND`
//! reshaping. This rule recognizes that wrapper and collapses it into a
//! single convolution carrying a `dilations` attribute, with the dilation
//! rate inferred from the constant block-shape tensor.
//!
//! The rewrite assumes the wrapper was semantically sound; it does not check
//! that the paddings and crops cancel.

use std::sync::OnceLock;

use crate::error::{GraphResult, TransformError};
use crate::graph::{AttrValue, GraphDef, NodeDef};
use crate::pattern::{NodeMatch, OpTypePattern};
use crate::tensor::{tensor_to_array_i32, tensor_to_array_i64, DataType, TensorValue};
use crate::transform::{replace_matching_op_types, TransformConfig};

/// Stable identifier this transform is registered under
pub const TRANSFORM_NAME: &str = "atrous_to_native";

/// Per-variant attribute handling for convolution-like ops
///
/// Adding a new convolution variant is a row here, not a code change:
/// `copied_attrs` are carried over from the matched convolution when
/// present; `padding` and `dilations` are always force-set by the rule.
struct ConvAttrRule {
    op: &'static str,
    copied_attrs: &'static [&'static str],
}

const CONV_ATTR_RULES: &[ConvAttrRule] = &[
    ConvAttrRule {
        op: "Conv2D",
        copied_attrs: &["T", "strides", "data_format", "use_cudnn_on_gpu"],
    },
    ConvAttrRule {
        op: "DepthwiseConv2dNative",
        copied_attrs: &["T", "strides", "data_format"],
    },
];

/// The wrapped-convolution pattern, built once per process
fn atrous_pattern() -> &'static OpTypePattern {
    static PATTERN: OnceLock<OpTypePattern> = OnceLock::new();
    PATTERN.get_or_init(|| {
        OpTypePattern::op(
            "BatchToSpaceND",
            vec![
                OpTypePattern::op(
                    "Conv2D|DepthwiseConv2dNative",
                    vec![
                        OpTypePattern::op(
                            "SpaceToBatchND",
                            vec![
                                OpTypePattern::any(), // input
                                OpTypePattern::any(), // block_shape
                                OpTypePattern::any(), // paddings
                            ],
                        ),
                        OpTypePattern::any(), // filter
                    ],
                ),
                OpTypePattern::any(), // block_shape
                OpTypePattern::any(), // crops
            ],
        )
    })
}

fn match_input<'a, 'g>(m: &'a NodeMatch<'g>, index: usize) -> GraphResult<&'a NodeMatch<'g>> {
    m.inputs
        .get(index)
        .ok_or_else(|| TransformError::PatternInputCountMismatch {
            node: m.node.name.clone(),
            expected: index + 1,
            actual: m.inputs.len(),
        })
}

fn integer_elements(tensor: &TensorValue) -> GraphResult<Vec<i64>> {
    match tensor.dtype {
        DataType::Int32 => {
            Ok(tensor_to_array_i32(tensor)?.iter().map(|&v| i64::from(v)).collect())
        }
        DataType::Int64 => Ok(tensor_to_array_i64(tensor)?.iter().copied().collect()),
        other => Err(TransformError::InvalidTensor(format!(
            "expected an integer tensor, got {other:?}"
        ))),
    }
}

/// Read the block shape from a bound constant node
///
/// The node must be a `Const` whose `value` attribute holds a 1-D integer
/// tensor (int32 or int64) of length 2; anything else is
/// `MissingConstantValue`. No default is substituted.
fn block_shape_values(node: &NodeDef) -> GraphResult<(i64, i64)> {
    let missing = |reason: &str| {
        TransformError::MissingConstantValue(format!(
            "block_shape node '{}' {}",
            node.name, reason
        ))
    };

    if node.op != "Const" {
        return Err(missing("is not a Const node"));
    }
    let tensor = node
        .attr_tensor("value")
        .ok_or_else(|| missing("carries no value tensor"))?;
    let elements =
        integer_elements(tensor).map_err(|_| missing("does not hold an integer tensor"))?;
    if tensor.rank() != 1 || elements.len() != 2 {
        return Err(missing("is not a 1-D tensor of length 2"));
    }

    Ok((elements[0], elements[1]))
}

/// Generate the replacement nodes for one matched wrapper
///
/// Returns `[input, filter, native_conv]`. The native convolution takes the
/// match root's name so every downstream reference keeps resolving, and the
/// convolution's op so `Conv2D` vs `DepthwiseConv2dNative` is preserved.
/// The block-shape, paddings, and crops constants are dropped with the
/// wrapper nodes.
fn flatten_match(m: &NodeMatch<'_>) -> GraphResult<Vec<NodeDef>> {
    let batch_to_space = m.node;
    let conv_match = match_input(m, 0)?;
    let conv = conv_match.node;
    let space_to_batch_match = match_input(conv_match, 0)?;
    let input_node = match_input(space_to_batch_match, 0)?.node;
    let block_shape_node = match_input(space_to_batch_match, 1)?.node;
    let filter_node = match_input(conv_match, 1)?.node;

    let (block_height, block_width) = block_shape_values(block_shape_node)?;

    // Unreachable given the pattern's accepted set, but keep the invariant
    // explicit rather than trusting call distance.
    let rule = CONV_ATTR_RULES
        .iter()
        .find(|rule| rule.op == conv.op)
        .ok_or_else(|| TransformError::UnsupportedOpVariant(conv.op.clone()))?;

    let mut native = NodeDef::new(&batch_to_space.name, &conv.op);
    native.device = conv.device.clone();
    native.add_input(&input_node.name);
    native.add_input(&filter_node.name);
    for &attr in rule.copied_attrs {
        if let Some(value) = conv.get_attr(attr) {
            native.set_attr(attr, value.clone());
        }
    }
    native.set_attr("padding", AttrValue::Str("SAME".to_string()));
    native.set_attr(
        "dilations",
        AttrValue::IntList(vec![1, block_height, block_width, 1]),
    );

    Ok(vec![input_node.clone(), filter_node.clone(), native])
}

/// The `atrous_to_native` transform entry point
///
/// The configuration is accepted for uniform dispatch and ignored. The pass
/// is atomic: a failed rewrite (e.g. a non-constant block shape) aborts the
/// whole transform; graphs without the pattern pass through unchanged.
pub fn atrous_to_native(graph: &GraphDef, _config: &TransformConfig) -> GraphResult<GraphDef> {
    replace_matching_op_types(graph, atrous_pattern(), flatten_match)
}
