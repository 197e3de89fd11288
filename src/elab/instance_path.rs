use std::collections::HashMap;
use std::fmt;

/// Identity of one dynamic instantiation - the path of spawns leading
/// from a top template down to the instance, with a per-call-site
/// index distinguishing repeated spawns of the same callee.
///
/// Only meaningful during one top's elaboration; not retained in the
/// flattened output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InstancePath {
	elems: Vec<(String, u32)>,
}

impl InstancePath {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.elems.is_empty()
	}

	pub fn len(&self) -> usize {
		self.elems.len()
	}

	pub fn elems(&self) -> &[(String, u32)] {
		&self.elems
	}
}

impl fmt::Display for InstancePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.elems.is_empty() {
			return write!(f, "<root>");
		}

		for (n, (template, index)) in self.elems.iter().enumerate() {
			if n > 0 {
				write!(f, "/")?;
			}
			write!(f, "{}#{}", template, index)?;
		}
		Ok(())
	}
}

/// Assigns unique instantiation identities. One allocator serves one
/// top's elaboration; counters persist for its lifetime.
#[derive(Default)]
pub struct InstancePathAllocator {
	instance_counts: HashMap<(InstancePath, String), u32>,
}

impl InstancePathAllocator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the identity of a `callee` instantiation under `parent`.
	///
	/// `new_instance` advances the per-call-site counter after it is
	/// read, so the next spawn of the same callee under the same parent
	/// receives the next index. Passing `false` re-derives the identity
	/// of an existing instance without claiming a new one.
	pub fn child_path(&mut self, parent: &InstancePath, callee: &str, new_instance: bool) -> InstancePath {
		let count = self
			.instance_counts
			.entry((parent.clone(), callee.to_string()))
			.or_insert(0);

		let mut elems = parent.elems.clone();
		elems.push((callee.to_string(), *count));
		if new_instance {
			*count += 1;
		}
		InstancePath { elems }
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_repeated_spawns_get_distinct_indices() {
		let mut alloc = InstancePathAllocator::new();
		let root = alloc.child_path(&InstancePath::new(), "top", true);

		let first = alloc.child_path(&root, "worker", true);
		let second = alloc.child_path(&root, "worker", true);

		assert_eq!(first.elems().last(), Some(&("worker".to_string(), 0)));
		assert_eq!(second.elems().last(), Some(&("worker".to_string(), 1)));
		assert_ne!(first, second);
	}

	#[test]
	fn test_redescend_keeps_index() {
		let mut alloc = InstancePathAllocator::new();
		let root = alloc.child_path(&InstancePath::new(), "top", true);

		let peek = alloc.child_path(&root, "worker", false);
		let claimed = alloc.child_path(&root, "worker", true);
		let next = alloc.child_path(&root, "worker", true);

		assert_eq!(peek, claimed);
		assert_ne!(claimed, next);
	}

	#[test]
	fn test_counters_are_per_call_site() {
		let mut alloc = InstancePathAllocator::new();
		let a = alloc.child_path(&InstancePath::new(), "a", true);
		let b = alloc.child_path(&InstancePath::new(), "b", true);

		let under_a = alloc.child_path(&a, "worker", true);
		let under_b = alloc.child_path(&b, "worker", true);

		// both are first instances under their own parents
		assert_eq!(under_a.elems().last(), Some(&("worker".to_string(), 0)));
		assert_eq!(under_b.elems().last(), Some(&("worker".to_string(), 0)));
		assert_ne!(under_a, under_b);
	}

	#[test]
	fn test_display() {
		let mut alloc = InstancePathAllocator::new();
		let root = alloc.child_path(&InstancePath::new(), "top", true);
		let child = alloc.child_path(&root, "worker", true);
		let child2 = alloc.child_path(&root, "worker", true);

		assert_eq!(InstancePath::new().to_string(), "<root>");
		assert_eq!(child.to_string(), "top#0/worker#0");
		assert_eq!(child2.to_string(), "top#0/worker#1");
	}
}
