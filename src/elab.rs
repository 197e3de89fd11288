mod context;
mod flatten;
mod instance_path;
mod interpreter;
mod report;

pub use flatten::FlattenElaborator;
pub use instance_path::{InstancePath, InstancePathAllocator};
pub use report::{
	DefaultSeverityPolicy, ElabMessage, ElabMessageKind, ElabMessageSeverity, ElabReport, SeverityPolicy,
};

use thiserror::Error;

use crate::design::DesignHandle;

/// Trait which must be implemented by all elaborators
pub trait Elaborator<R> {
	fn elaborate(&mut self, design: DesignHandle) -> Result<R, ElabError>;
}

/// Hard elaborator failure. Diagnostics concerning the design being
/// elaborated are reported through [`ElabReport`] instead.
#[derive(Clone, Copy, Debug, Error)]
pub enum ElabError {}
