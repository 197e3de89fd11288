use log::debug;

use super::body::ProcBody;
use super::channel::ChannelType;
use super::{utils, DesignError, DesignHandle, TemplateId};

/// Direction of a channel parameter, relative to its template
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelDirection {
	Input,
	Output,
}

/// Endpoint of a locally declared channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelEnd {
	Send,
	Recv,
}

/// Typed, directed channel parameter of a process template
#[derive(Clone, Debug)]
pub struct ChannelParam {
	pub name: String,
	pub ty: ChannelType,
	pub direction: ChannelDirection,
}

/// Local channel declaration inside a template's setup program.
/// Declaring a channel yields both of its endpoints at once, bound
/// to one flat channel during elaboration.
#[derive(Clone, Debug)]
pub struct LocalChannel {
	pub name: String,
	pub ty: ChannelType,
}

/// Reference to a structured channel value within a template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChanRef {
	/// n-th channel parameter of the enclosing template
	Param(usize),

	/// Endpoint of the n-th local channel declaration
	Local(usize, ChannelEnd),
}

/// Instantiates another template, binding its channel parameters
/// to the given arguments, positionally
#[derive(Clone, Debug)]
pub struct SpawnStmt {
	pub callee: String,
	pub args: Vec<ChanRef>,
}

/// Statement in a template's setup program
#[derive(Clone, Debug)]
pub enum SetupStmt {
	/// Declares a local channel
	Channel(LocalChannel),

	/// Instantiates another template
	Spawn(SpawnStmt),

	/// Marks the end of one-time setup logic
	Suspend,
}

/// A reusable process definition, not yet bound to concrete channels.
///
/// Templates are read-only during elaboration and are all removed
/// from the design once every top has been processed.
#[derive(Clone, Debug)]
pub struct ProcTemplate {
	/// Self-reference
	pub(super) id: TemplateId,

	/// Name of the template
	pub name: String,

	/// Channel parameters, in declaration order
	pub params: Vec<ChannelParam>,

	/// Setup program - channel declarations and spawns
	pub setup: Vec<SetupStmt>,

	/// Per-cycle logic, written against the channel parameters
	pub body: ProcBody,

	/// Is this template an elaboration entry point
	pub is_top: bool,

	/// External names for boundary channels, one per parameter
	pub boundary_names: Option<Vec<String>>,
}

impl ProcTemplate {
	pub(super) fn new(name: &str) -> Self {
		Self {
			id: TemplateId { id: 0 },
			name: name.to_string(),
			params: Vec::new(),
			setup: Vec::new(),
			body: ProcBody::new(),
			is_top: false,
			boundary_names: None,
		}
	}

	pub fn id(&self) -> TemplateId {
		self.id
	}

	/// Spawn statements of the setup program, in order
	pub fn spawns(&self) -> impl Iterator<Item = &SpawnStmt> {
		self.setup.iter().filter_map(|stmt| match stmt {
			SetupStmt::Spawn(spawn) => Some(spawn),
			_ => None,
		})
	}

	/// Number of local channel declarations in the setup program
	pub fn local_channel_count(&self) -> usize {
		self.setup
			.iter()
			.filter(|stmt| matches!(stmt, SetupStmt::Channel(_)))
			.count()
	}
}

/// Helper macro to get a mutable reference to the current template
/// in the TemplateHandle
macro_rules! this_template {
	($self:ident) => {
		$self
			.design
			.borrow_mut()
			.get_template_mut($self.id)
			.expect("template not in design")
	};
}

/// References a template in the design
pub struct TemplateHandle {
	/// Handle to the design
	design: DesignHandle,

	/// ID of the template
	id: TemplateId,
}

impl TemplateHandle {
	pub(super) fn new(design: DesignHandle, id: TemplateId) -> Self {
		Self { design, id }
	}

	pub fn id(&self) -> TemplateId {
		self.id
	}

	pub fn name(&self) -> String {
		self.design
			.borrow()
			.get_template(self.id)
			.expect("template not in design")
			.name
			.clone()
	}

	/// Appends a channel parameter, returns a reference to it
	pub fn add_param(
		&mut self,
		name: &str,
		ty: ChannelType,
		direction: ChannelDirection,
	) -> Result<ChanRef, DesignError> {
		utils::validate_name(name)?;

		let mut core = self.design.borrow_mut();
		let template = core.get_template_mut(self.id).expect("template not in design");
		template.params.push(ChannelParam {
			name: name.to_string(),
			ty,
			direction,
		});
		Ok(ChanRef::Param(template.params.len() - 1))
	}

	/// Declares a local channel, returns its (send, recv) endpoints
	pub fn declare_channel(&mut self, name: &str, ty: ChannelType) -> Result<(ChanRef, ChanRef), DesignError> {
		utils::validate_name(name)?;

		let mut core = self.design.borrow_mut();
		let template = core.get_template_mut(self.id).expect("template not in design");
		let index = template.local_channel_count();
		template.setup.push(SetupStmt::Channel(LocalChannel {
			name: name.to_string(),
			ty,
		}));
		Ok((ChanRef::Local(index, ChannelEnd::Send), ChanRef::Local(index, ChannelEnd::Recv)))
	}

	/// Appends a spawn of `callee`. The callee is resolved by name
	/// during elaboration, so templates may reference each other
	/// in any declaration order.
	pub fn spawn(&mut self, callee: &str, args: Vec<ChanRef>) -> Result<(), DesignError> {
		utils::validate_name(callee)?;

		debug!("Template '{}' spawns '{}'", self.name(), callee);
		this_template!(self).setup.push(SetupStmt::Spawn(SpawnStmt {
			callee: callee.to_string(),
			args,
		}));
		Ok(())
	}

	/// Appends a suspension marker
	pub fn suspend(&mut self) {
		this_template!(self).setup.push(SetupStmt::Suspend);
	}

	/// Marks this template as an elaboration entry point
	pub fn make_top(&mut self) {
		this_template!(self).is_top = true;
	}

	/// Declares external names for this template's boundary channels,
	/// one per channel parameter
	pub fn expose_boundary(&mut self, names: &[&str]) -> Result<(), DesignError> {
		for name in names {
			utils::validate_name(name)?;
		}

		let mut core = self.design.borrow_mut();
		let template = core.get_template_mut(self.id).expect("template not in design");
		if names.len() != template.params.len() {
			return Err(DesignError::BoundaryNameCountMismatch {
				expected: template.params.len(),
				actual: names.len(),
			});
		}

		template.boundary_names = Some(names.iter().map(|n| n.to_string()).collect());
		Ok(())
	}

	/// Gives mutable access to the template's per-cycle body
	pub fn body<F>(&mut self, f: F)
	where
		F: FnOnce(&mut ProcBody),
	{
		f(&mut this_template!(self).body)
	}
}
