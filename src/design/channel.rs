use std::fmt;

use super::ChannelId;

/// Payload type carried by a channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelType {
	/// Raw bit vector of the given width
	Bits(u64),

	/// Ordered aggregate of payload types
	Tuple(Vec<ChannelType>),
}

impl fmt::Display for ChannelType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use ChannelType::*;
		match self {
			Bits(width) => write!(f, "bits[{}]", width),
			Tuple(fields) => {
				write!(f, "(")?;
				for (n, field) in fields.iter().enumerate() {
					if n > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{}", field)?;
				}
				write!(f, ")")
			},
		}
	}
}

/// A globally named channel in the flattened network.
///
/// Boundary channels have exactly one of the capability flags
/// disabled, according to the direction of the parameter they
/// were synthesized for.
#[derive(Clone, Debug)]
pub struct Channel {
	/// Self-reference
	pub(super) id: ChannelId,

	/// Netlist-unique name of the channel
	pub name: String,

	/// Payload type
	pub ty: ChannelType,

	/// Can the flattened network send on this channel
	pub send_supported: bool,

	/// Can the flattened network receive on this channel
	pub recv_supported: bool,
}

impl Channel {
	/// Creates a new channel supporting both directions
	pub fn new(name: &str, ty: ChannelType) -> Self {
		Self {
			id: ChannelId { id: 0 },
			name: name.to_string(),
			ty,
			send_supported: true,
			recv_supported: true,
		}
	}

	pub fn id(&self) -> ChannelId {
		self.id
	}
}
