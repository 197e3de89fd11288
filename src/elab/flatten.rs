use std::collections::HashSet;

use log::{error, info};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::design::{Channel, ChannelDirection, ChannelId, DesignHandle, ProcTemplate, TemplateId};

use super::interpreter::Interpreter;
use super::report::{ElabMessage, ElabMessageKind, ElabReport};
use super::{ElabError, Elaborator};

/// Flattens every top template of a design into concrete processes
/// connected by globally named channels. Afterwards no templates
/// remain in the design, only channels and elaborated processes.
pub struct FlattenElaborator;

impl FlattenElaborator {
	pub fn new() -> Self {
		Self {}
	}

	fn elaborate_top(&self, design: &DesignHandle, top: TemplateId, report: &mut ElabReport) {
		let template = design
			.borrow()
			.get_template(top)
			.cloned()
			.expect("top template not in design");

		info!("Elaborating top template '{}'", template.name);
		if let Err(kind) = self.try_elaborate_top(design, &template) {
			error!("Elaboration of '{}' failed: {}", template.name, kind);
			report.add_message(ElabMessage::new(kind, &template.name));
		}
	}

	fn try_elaborate_top(&self, design: &DesignHandle, template: &ProcTemplate) -> Result<(), ElabMessageKind> {
		check_instantiation_cycles(design, template)?;

		// Boundary channels keep their declared names verbatim. The
		// outside world uses each one in the direction opposite to the
		// parameter's, hence the disabled capability.
		let mut boundary: Vec<ChannelId> = Vec::new();
		if let Some(names) = &template.boundary_names {
			for (param, name) in template.params.iter().zip(names.iter()) {
				let mut channel = Channel::new(name, param.ty.clone());
				match param.direction {
					ChannelDirection::Input => channel.send_supported = false,
					ChannelDirection::Output => channel.recv_supported = false,
				}
				boundary.push(design.borrow_mut().add_channel(channel)?);
			}
		}

		let mut interpreter = Interpreter::new(design.clone());
		interpreter.elaborate_top(template.id(), boundary)
	}
}

impl Elaborator<ElabReport> for FlattenElaborator {
	fn elaborate(&mut self, design: DesignHandle) -> Result<ElabReport, ElabError> {
		let mut report = ElabReport::default();

		let tops = design.borrow().top_template_ids();
		for top in tops {
			self.elaborate_top(&design, top, &mut report);
		}

		// The reference graph among templates may be cyclic and
		// callees are shared between tops, so removal is deferred
		// until every top has been attempted.
		design.borrow_mut().clear_templates();
		Ok(report)
	}
}

/// Rejects tops whose reachable template-reference graph contains a
/// cycle. Spawns are unconditional, so such a top would instantiate
/// without bound. Unresolved callee names are skipped here and
/// reported by the interpreter at the offending spawn.
fn check_instantiation_cycles(design: &DesignHandle, top: &ProcTemplate) -> Result<(), ElabMessageKind> {
	let design = design.borrow();
	let mut graph: DiGraphMap<TemplateId, ()> = DiGraphMap::new();
	let mut visited: HashSet<TemplateId> = HashSet::new();
	let mut pending = vec![top.id()];

	graph.add_node(top.id());
	visited.insert(top.id());

	while let Some(id) = pending.pop() {
		let template = design.get_template(id).expect("reachable template not in design");
		for spawn in template.spawns() {
			if let Some(callee) = design.get_template_by_name(&spawn.callee) {
				graph.add_edge(id, callee.id(), ());
				if visited.insert(callee.id()) {
					pending.push(callee.id());
				}
			}
		}
	}

	for scc in tarjan_scc(&graph) {
		if scc.len() > 1 || scc.iter().any(|&node| graph.contains_edge(node, node)) {
			let cycle = scc
				.iter()
				.map(|&node| {
					design
						.get_template(node)
						.expect("cycle template not in design")
						.name
						.clone()
				})
				.collect();
			return Err(ElabMessageKind::RecursiveInstantiation { cycle });
		}
	}
	Ok(())
}
