pub mod body;
pub mod channel;
pub mod numeric_constant;
pub mod process;
pub mod template;
mod utils;

pub use body::{BinaryOp, BodyStmt, ChannelUse, ProcBody, ReceiveStmt, SendStmt, UnaryOp, ValueId};
pub use channel::{Channel, ChannelType};
pub use numeric_constant::NumericConstant;
pub use process::Proc;
pub use template::{
	ChanRef, ChannelDirection, ChannelEnd, ChannelParam, LocalChannel, ProcTemplate, SetupStmt, SpawnStmt,
	TemplateHandle,
};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// References a process template in a design
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct TemplateId {
	id: usize,
}

impl TemplateId {
	/// Checks if the reference is valid
	pub fn is_null(&self) -> bool {
		self.id == 0
	}
}

/// References a flat channel in a design
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct ChannelId {
	id: usize,
}

impl ChannelId {
	/// Checks if the reference is valid
	pub fn is_null(&self) -> bool {
		self.id == 0
	}
}

/// References an elaborated process in a design
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct ProcId {
	id: usize,
}

impl ProcId {
	/// Checks if the reference is valid
	pub fn is_null(&self) -> bool {
		self.id == 0
	}
}

/// Core part of the process network representation.
/// Referred to via multiple handles with reference counting.
pub struct DesignCore {
	weak: WeakDesignHandle,
	templates: Vec<ProcTemplate>,
	channels: Vec<Channel>,
	procs: Vec<Proc>,
	next_template_id: usize,
	next_channel_id: usize,
	next_proc_id: usize,
}

impl DesignCore {
	/// Creates a new empty design
	pub fn new() -> Self {
		Self {
			weak: WeakDesignHandle::new(),
			templates: Vec::new(),
			channels: Vec::new(),
			procs: Vec::new(),
			next_template_id: 1,
			next_channel_id: 1,
			next_proc_id: 1,
		}
	}

	/// Checks whether a name is taken by a channel or an elaborated process.
	///
	/// Templates are not part of this namespace. They never survive
	/// elaboration, and a process may take its template's name verbatim.
	pub fn symbol_exists(&self, name: &str) -> bool {
		self.channels.iter().any(|c| c.name == name) || self.procs.iter().any(|p| p.name == name)
	}

	/// Adds an existing template to the design
	///
	/// Performs check for conflicting template names.
	fn add_template(&mut self, template: ProcTemplate) -> Result<TemplateHandle, DesignError> {
		utils::validate_name(&template.name)?;

		let id = TemplateId { id: self.next_template_id };
		self.next_template_id += 1;

		let mut t = template;
		t.id = id;

		for other in &self.templates {
			if other.name == t.name {
				return Err(DesignError::TemplateNameConflict {
					first: other.id,
					second: t.id,
				});
			}
		}

		self.templates.push(t);
		Ok(TemplateHandle::new(self.weak.upgrade().unwrap(), id))
	}

	/// Adds an existing channel to the design
	///
	/// Performs check for conflicting netlist symbols.
	pub(crate) fn add_channel(&mut self, channel: Channel) -> Result<ChannelId, DesignError> {
		utils::validate_name(&channel.name)?;

		if self.symbol_exists(&channel.name) {
			return Err(DesignError::SymbolConflict {
				name: channel.name.clone(),
			});
		}

		let id = ChannelId { id: self.next_channel_id };
		self.next_channel_id += 1;

		let mut c = channel;
		c.id = id;
		self.channels.push(c);
		Ok(id)
	}

	/// Adds an existing elaborated process to the design
	///
	/// Performs check for conflicting netlist symbols.
	pub(crate) fn add_proc(&mut self, proc: Proc) -> Result<ProcId, DesignError> {
		utils::validate_name(&proc.name)?;

		if self.symbol_exists(&proc.name) {
			return Err(DesignError::SymbolConflict { name: proc.name.clone() });
		}

		let id = ProcId { id: self.next_proc_id };
		self.next_proc_id += 1;

		let mut p = proc;
		p.id = id;
		self.procs.push(p);
		Ok(id)
	}

	/// Returns a reference to the template with the given ID
	pub fn get_template(&self, template: TemplateId) -> Option<&ProcTemplate> {
		self.templates.get(template.id.wrapping_sub(1))
	}

	/// Returns a mutable reference to the template with the given ID
	pub(crate) fn get_template_mut(&mut self, template: TemplateId) -> Option<&mut ProcTemplate> {
		self.templates.get_mut(template.id.wrapping_sub(1))
	}

	/// Looks a template up by name
	pub fn get_template_by_name(&self, name: &str) -> Option<&ProcTemplate> {
		self.templates.iter().find(|t| t.name == name)
	}

	/// Returns a reference to the channel with the given ID
	pub fn get_channel(&self, channel: ChannelId) -> Option<&Channel> {
		self.channels.get(channel.id.wrapping_sub(1))
	}

	/// Looks a channel up by name
	pub fn get_channel_by_name(&self, name: &str) -> Option<&Channel> {
		self.channels.iter().find(|c| c.name == name)
	}

	/// Returns a reference to the elaborated process with the given ID
	pub fn get_proc(&self, proc: ProcId) -> Option<&Proc> {
		self.procs.get(proc.id.wrapping_sub(1))
	}

	/// Looks an elaborated process up by name
	pub fn get_proc_by_name(&self, name: &str) -> Option<&Proc> {
		self.procs.iter().find(|p| p.name == name)
	}

	/// IDs of all templates, in declaration order
	pub fn template_ids(&self) -> Vec<TemplateId> {
		self.templates.iter().map(|t| t.id).collect()
	}

	/// IDs of all templates marked as elaboration tops, in declaration order
	pub fn top_template_ids(&self) -> Vec<TemplateId> {
		self.templates.iter().filter(|t| t.is_top).map(|t| t.id).collect()
	}

	pub fn template_count(&self) -> usize {
		self.templates.len()
	}

	/// Names of all channels, in creation order
	pub fn channel_names(&self) -> Vec<String> {
		self.channels.iter().map(|c| c.name.clone()).collect()
	}

	/// Names of all elaborated processes, in creation order
	pub fn proc_names(&self) -> Vec<String> {
		self.procs.iter().map(|p| p.name.clone()).collect()
	}

	/// Removes every template from the design. Channels and
	/// elaborated processes are left untouched. Outstanding
	/// template IDs become dangling.
	pub fn clear_templates(&mut self) {
		self.templates.clear();
	}

	/// Creates a new template in the design
	pub fn new_template(&mut self, name: &str) -> Result<TemplateHandle, DesignError> {
		self.add_template(ProcTemplate::new(name))
	}
}

/// Weak reference to a design
pub type WeakDesignHandle = Weak<RefCell<DesignCore>>;

/// Strong reference to a design
pub type DesignHandle = Rc<RefCell<DesignCore>>;

/// Represents a process network design
pub struct Design {
	handle: DesignHandle,
}

impl Design {
	/// Creates a new empty design
	pub fn new() -> Self {
		let d = Self {
			handle: Rc::new(RefCell::new(DesignCore::new())),
		};

		d.handle.borrow_mut().weak = Rc::downgrade(&d.handle);
		d
	}

	pub fn handle(&self) -> DesignHandle {
		self.handle.clone()
	}

	/// Creates a new template with provided name and returns a handle to it
	pub fn new_template(&mut self, name: &str) -> Result<TemplateHandle, DesignError> {
		self.handle.borrow_mut().new_template(name)
	}

	pub fn get_template(&self, template: TemplateId) -> Option<ProcTemplate> {
		self.handle.borrow().get_template(template).cloned()
	}

	pub fn get_channel(&self, channel: ChannelId) -> Option<Channel> {
		self.handle.borrow().get_channel(channel).cloned()
	}

	pub fn get_channel_by_name(&self, name: &str) -> Option<Channel> {
		self.handle.borrow().get_channel_by_name(name).cloned()
	}

	pub fn get_proc_by_name(&self, name: &str) -> Option<Proc> {
		self.handle.borrow().get_proc_by_name(name).cloned()
	}

	pub fn template_count(&self) -> usize {
		self.handle.borrow().template_count()
	}

	pub fn channel_names(&self) -> Vec<String> {
		self.handle.borrow().channel_names()
	}

	pub fn proc_names(&self) -> Vec<String> {
		self.handle.borrow().proc_names()
	}
}

/// Represents an error that can occur during design construction.
/// Elaboration diagnostics are not accounted for here.
#[derive(Clone, Debug, Error)]
pub enum DesignError {
	#[error("Invalid name")]
	InvalidName,

	#[error("Template name conflict")]
	TemplateNameConflict { first: TemplateId, second: TemplateId },

	#[error("Netlist symbol '{name}' already defined")]
	SymbolConflict { name: String },

	#[error("Boundary name list length does not match parameter count ({expected} parameters, {actual} names)")]
	BoundaryNameCountMismatch { expected: usize, actual: usize },

	#[error("Channel parameter {index} is not bound to any channel")]
	UnboundChannelParam { index: usize },

	#[error("Reference to undeclared local channel {index}")]
	UndeclaredLocalChannel { index: usize },
}
