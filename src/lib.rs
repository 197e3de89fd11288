pub mod design;
pub mod elab;

pub use design::{Channel, ChannelType, Design, DesignError, ProcBody, ProcTemplate};
pub use elab::{ElabReport, Elaborator, FlattenElaborator};
