use super::body::ProcBody;
use super::ProcId;

/// A concrete process produced by elaboration.
///
/// The body is a copy of the originating template's body with all
/// channel references resolved to flat channel symbols. Once created
/// a process is final - it is never re-elaborated or merged.
#[derive(Clone, Debug)]
pub struct Proc {
	/// Self-reference
	pub(super) id: ProcId,

	/// Netlist-unique name of the process
	pub name: String,

	/// Per-cycle logic
	pub body: ProcBody,
}

impl Proc {
	pub fn new(name: &str, body: ProcBody) -> Self {
		Self {
			id: ProcId { id: 0 },
			name: name.to_string(),
			body,
		}
	}

	pub fn id(&self) -> ProcId {
		self.id
	}
}
