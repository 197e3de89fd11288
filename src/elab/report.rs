use std::fmt::Display;

use log::debug;
use thiserror::Error;

use crate::design::DesignError;

pub trait SeverityPolicy {
	fn severity(&self, kind: &ElabMessageKind) -> ElabMessageSeverity;
}

pub struct DefaultSeverityPolicy;

impl SeverityPolicy for DefaultSeverityPolicy {
	fn severity(&self, kind: &ElabMessageKind) -> ElabMessageSeverity {
		use ElabMessageKind::*;
		use ElabMessageSeverity::*;
		match kind {
			Notice(_) => Info,
			UnresolvedTemplate { .. } => Error,
			SpawnArityMismatch { .. } => Error,
			RecursiveInstantiation { .. } => Error,
			Design(_) => Error,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct ElabReport {
	messages: Vec<ElabMessage>,
}

impl ElabReport {
	pub fn extend(&mut self, other: &ElabReport) {
		for msg in other.messages.iter() {
			self.add_message(msg.clone());
		}
	}

	pub fn add_message(&mut self, msg: ElabMessage) {
		debug!("Elab message: {}", msg);
		self.messages.push(msg);
	}

	pub fn messages(&self) -> &[ElabMessage] {
		&self.messages
	}

	/// True if any message is an error under the default policy
	pub fn has_errors(&self) -> bool {
		self.messages
			.iter()
			.any(|m| m.default_severity() == ElabMessageSeverity::Error)
	}
}

/// A diagnostic produced while elaborating one top template
#[derive(Clone, Debug)]
pub struct ElabMessage {
	kind: ElabMessageKind,

	/// Name of the top template being elaborated when the message
	/// was emitted. Templates do not survive the pass, hence a name
	/// and not an ID.
	template: String,
}

impl ElabMessage {
	pub fn new(kind: ElabMessageKind, template: &str) -> Self {
		Self {
			kind,
			template: template.to_string(),
		}
	}

	pub fn kind(&self) -> &ElabMessageKind {
		&self.kind
	}

	pub fn template(&self) -> &str {
		&self.template
	}

	pub fn default_severity(&self) -> ElabMessageSeverity {
		DefaultSeverityPolicy.severity(&self.kind)
	}

	pub fn severity(&self, policy: &dyn SeverityPolicy) -> ElabMessageSeverity {
		policy.severity(&self.kind)
	}
}

impl Display for ElabMessage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?} in '{}': {}", self.default_severity(), self.template, self.kind)
	}
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ElabMessageSeverity {
	Info,
	Warning,
	Error,
}

#[derive(Clone, Debug, Error)]
pub enum ElabMessageKind {
	#[error("Cannot resolve spawned template '{name}'")]
	UnresolvedTemplate { name: String },

	#[error("Spawn of '{callee}' requires {expected} channel arguments but got {actual}")]
	SpawnArityMismatch {
		callee: String,
		expected: usize,
		actual: usize,
	},

	#[error("Unbounded recursive instantiation among templates {cycle:?}")]
	RecursiveInstantiation { cycle: Vec<String> },

	#[error(transparent)]
	Design(#[from] DesignError),

	#[error("{0}")]
	Notice(String),
}
