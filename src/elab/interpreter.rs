use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::design::{ChanRef, ChannelId, DesignError, DesignHandle, ProcTemplate, SetupStmt, SpawnStmt, TemplateId};

use super::context::ElabCtx;
use super::instance_path::{InstancePath, InstancePathAllocator};
use super::report::ElabMessageKind;

/// One entry of the traversal stack
#[derive(Clone, Debug)]
struct TraversalFrame {
	template: String,
	path: InstancePath,
}

/// Stack of templates currently being evaluated. Shared with scope
/// guards so that frames are popped on every exit path.
#[derive(Clone, Default)]
struct TraversalStack {
	frames: Rc<RefCell<Vec<TraversalFrame>>>,
}

impl TraversalStack {
	fn enter(&self, frame: TraversalFrame) -> TraversalScope {
		debug!("Elaborating '{}' ({}), depth {}", frame.template, frame.path, self.depth());
		self.frames.borrow_mut().push(frame);
		TraversalScope {
			frames: self.frames.clone(),
		}
	}

	fn depth(&self) -> usize {
		self.frames.borrow().len()
	}
}

/// Pops its frame when dropped, also when unwinding an error
struct TraversalScope {
	frames: Rc<RefCell<Vec<TraversalFrame>>>,
}

impl Drop for TraversalScope {
	fn drop(&mut self) {
		self.frames.borrow_mut().pop();
	}
}

/// Recursive evaluator for setup programs of all templates reachable
/// from one top. Channels and processes it creates are added to the
/// design as evaluation proceeds; materialization is bottom-up, each
/// template after all of its spawned children.
pub(super) struct Interpreter {
	design: DesignHandle,
	ctx: ElabCtx,
	paths: InstancePathAllocator,
	stack: TraversalStack,
}

impl Interpreter {
	pub fn new(design: DesignHandle) -> Self {
		Self {
			design: design.clone(),
			ctx: ElabCtx::new(design),
			paths: InstancePathAllocator::new(),
			stack: TraversalStack::default(),
		}
	}

	/// Elaborates `top` with externally bound `boundary` channels
	pub fn elaborate_top(&mut self, top: TemplateId, boundary: Vec<ChannelId>) -> Result<(), ElabMessageKind> {
		let template = self
			.design
			.borrow()
			.get_template(top)
			.cloned()
			.expect("top template not in design");

		let path = self.paths.child_path(&InstancePath::new(), &template.name, true);
		let _scope = self.stack.enter(TraversalFrame {
			template: template.name.clone(),
			path: path.clone(),
		});

		self.eval_template(&template, boundary, &path)
	}

	/// Evaluates all setup statements in declaration order, then
	/// materializes the template itself
	fn eval_template(
		&mut self,
		template: &ProcTemplate,
		bound: Vec<ChannelId>,
		path: &InstancePath,
	) -> Result<(), ElabMessageKind> {
		let mut locals: Vec<ChannelId> = Vec::new();

		for stmt in &template.setup {
			match stmt {
				SetupStmt::Channel(decl) => {
					let channel = self.ctx.create_channel(&decl.name, decl.ty.clone())?;
					locals.push(channel);
				},
				SetupStmt::Suspend => (),
				SetupStmt::Spawn(spawn) => self.eval_spawn(spawn, &locals, &bound, path)?,
			}
		}

		self.ctx.create_proc(template, &bound)?;
		Ok(())
	}

	fn eval_spawn(
		&mut self,
		spawn: &SpawnStmt,
		locals: &[ChannelId],
		bound: &[ChannelId],
		parent: &InstancePath,
	) -> Result<(), ElabMessageKind> {
		let callee = self
			.design
			.borrow()
			.get_template_by_name(&spawn.callee)
			.cloned()
			.ok_or_else(|| ElabMessageKind::UnresolvedTemplate {
				name: spawn.callee.clone(),
			})?;

		let path = self.paths.child_path(parent, &spawn.callee, true);
		let _scope = self.stack.enter(TraversalFrame {
			template: callee.name.clone(),
			path: path.clone(),
		});

		let args = self.resolve_args(&spawn.args, locals, bound)?;
		if args.len() != callee.params.len() {
			return Err(ElabMessageKind::SpawnArityMismatch {
				callee: callee.name.clone(),
				expected: callee.params.len(),
				actual: args.len(),
			});
		}

		self.eval_template(&callee, args, &path)
	}

	fn resolve_args(
		&self,
		args: &[ChanRef],
		locals: &[ChannelId],
		bound: &[ChannelId],
	) -> Result<Vec<ChannelId>, ElabMessageKind> {
		args.iter().map(|arg| self.resolve_chan_ref(arg, locals, bound)).collect()
	}

	/// Resolves a structured channel value to the flat channel it is
	/// currently bound to. Both endpoints of a local declaration
	/// resolve to the same channel.
	fn resolve_chan_ref(
		&self,
		chan_ref: &ChanRef,
		locals: &[ChannelId],
		bound: &[ChannelId],
	) -> Result<ChannelId, ElabMessageKind> {
		match chan_ref {
			ChanRef::Param(index) => bound
				.get(*index)
				.copied()
				.ok_or_else(|| DesignError::UnboundChannelParam { index: *index }.into()),
			ChanRef::Local(index, _end) => locals
				.get(*index)
				.copied()
				.ok_or_else(|| DesignError::UndeclaredLocalChannel { index: *index }.into()),
		}
	}
}
