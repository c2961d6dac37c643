//! Rejection of schemas whose values could never be finite
//!
//! A record that reaches itself exclusively through record fields (no union
//! to opt out of the recursion, no array or map that may be empty) has no
//! finite value, and a codec compiled for it would recurse forever the
//! first time it runs. Such schemas are rejected at construction.

use super::SchemaNode;
use crate::error::SchemaError;

pub(super) fn check_for_unconditional_cycles(nodes: &[SchemaNode]) -> Result<(), SchemaError> {
	#[derive(Clone, Copy, PartialEq)]
	enum Mark {
		Unvisited,
		OnStack,
		Checked,
	}

	fn visit(
		nodes: &[SchemaNode],
		marks: &mut [Mark],
		idx: usize,
	) -> Result<(), SchemaError> {
		match marks[idx] {
			Mark::Checked => return Ok(()),
			Mark::OnStack => {
				let name = match &nodes[idx] {
					SchemaNode::Record(record) => record.name.fully_qualified_name(),
					_ => nodes[idx].kind_name(),
				};
				return Err(SchemaError::msg(format_args!(
					"record {name:?} unconditionally contains itself - no value of this schema \
						could be finite"
				)));
			}
			Mark::Unvisited => {}
		}
		marks[idx] = Mark::OnStack;
		// Only record fields are followed: a union may select another branch
		// and an array or map may be empty, so those edges break the cycle.
		if let SchemaNode::Record(record) = &nodes[idx] {
			for field in &record.fields {
				visit(nodes, marks, field.schema.idx)?;
			}
		}
		marks[idx] = Mark::Checked;
		Ok(())
	}

	let mut marks = vec![Mark::Unvisited; nodes.len()];
	for idx in 0..nodes.len() {
		visit(nodes, &mut marks, idx)?;
	}
	Ok(())
}
