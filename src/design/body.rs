use std::fmt;

use super::numeric_constant::NumericConstant;
use super::DesignError;

/// References an SSA value within one process body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId {
	id: usize,
}

impl fmt::Display for ValueId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "%{}", self.id)
	}
}

/// Channel operand of a send/receive statement.
///
/// Bodies are written against the positional channel parameters of
/// their template. Elaboration resolves each parameter reference to
/// the symbolic name of a flat channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelUse {
	/// n-th channel parameter of the enclosing template
	Param(usize),

	/// Named flat channel
	Flat(String),
}

/// Binary operators available in process bodies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
	Add,
	Subtract,
	BitwiseAnd,
	BitwiseOr,
	BitwiseXor,
	Equal,
	NotEqual,
	Less,
}

/// Unary operators available in process bodies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
	Negate,
	BitwiseNot,
	ReductionOr,
}

/// Sends `data` over a channel once `token` is available.
/// With a predicate, the send is skipped when the predicate is zero.
#[derive(Clone, Debug)]
pub struct SendStmt {
	pub token: ValueId,
	pub data: ValueId,
	pub predicate: Option<ValueId>,
	pub channel: ChannelUse,

	/// Output token ordering this send against later operations
	pub token_out: ValueId,
}

/// Receives data from a channel once `token` is available.
/// Non-blocking receives complete immediately with a zero payload
/// when no data is pending.
#[derive(Clone, Debug)]
pub struct ReceiveStmt {
	pub token: ValueId,
	pub predicate: Option<ValueId>,
	pub channel: ChannelUse,
	pub blocking: bool,
	pub token_out: ValueId,
	pub data_out: ValueId,
}

/// Statement of a per-cycle process body
#[derive(Clone, Debug)]
pub enum BodyStmt {
	Const {
		dest: ValueId,
		value: NumericConstant,
	},
	Unary {
		dest: ValueId,
		op: UnaryOp,
		arg: ValueId,
	},
	Binary {
		dest: ValueId,
		op: BinaryOp,
		lhs: ValueId,
		rhs: ValueId,
	},
	/// Token join; with no operands yields a fresh initial token
	AfterAll {
		dest: ValueId,
		tokens: Vec<ValueId>,
	},
	Send(SendStmt),
	Receive(ReceiveStmt),
}

/// Per-cycle logic of a process template or an elaborated process
#[derive(Clone, Debug, Default)]
pub struct ProcBody {
	stmts: Vec<BodyStmt>,
	next_value_id: usize,
}

impl ProcBody {
	pub fn new() -> Self {
		Self {
			stmts: Vec::new(),
			next_value_id: 0,
		}
	}

	fn alloc_value(&mut self) -> ValueId {
		let id = ValueId { id: self.next_value_id };
		self.next_value_id += 1;
		id
	}

	pub fn constant(&mut self, value: NumericConstant) -> ValueId {
		let dest = self.alloc_value();
		self.stmts.push(BodyStmt::Const { dest, value });
		dest
	}

	pub fn unary(&mut self, op: UnaryOp, arg: ValueId) -> ValueId {
		let dest = self.alloc_value();
		self.stmts.push(BodyStmt::Unary { dest, op, arg });
		dest
	}

	pub fn binary(&mut self, op: BinaryOp, lhs: ValueId, rhs: ValueId) -> ValueId {
		let dest = self.alloc_value();
		self.stmts.push(BodyStmt::Binary { dest, op, lhs, rhs });
		dest
	}

	pub fn after_all(&mut self, tokens: Vec<ValueId>) -> ValueId {
		let dest = self.alloc_value();
		self.stmts.push(BodyStmt::AfterAll { dest, tokens });
		dest
	}

	/// Emits a blocking send, returns the output token
	pub fn send(&mut self, token: ValueId, channel: ChannelUse, data: ValueId) -> ValueId {
		self.push_send(token, channel, data, None)
	}

	/// Emits a predicated blocking send, returns the output token
	pub fn send_if(&mut self, token: ValueId, channel: ChannelUse, predicate: ValueId, data: ValueId) -> ValueId {
		self.push_send(token, channel, data, Some(predicate))
	}

	/// Emits a blocking receive, returns (token, data)
	pub fn receive(&mut self, token: ValueId, channel: ChannelUse) -> (ValueId, ValueId) {
		self.push_receive(token, channel, None, true)
	}

	/// Emits a predicated blocking receive, returns (token, data)
	pub fn receive_if(&mut self, token: ValueId, channel: ChannelUse, predicate: ValueId) -> (ValueId, ValueId) {
		self.push_receive(token, channel, Some(predicate), true)
	}

	/// Emits a non-blocking receive, returns (token, data)
	pub fn receive_nonblocking(&mut self, token: ValueId, channel: ChannelUse) -> (ValueId, ValueId) {
		self.push_receive(token, channel, None, false)
	}

	fn push_send(
		&mut self,
		token: ValueId,
		channel: ChannelUse,
		data: ValueId,
		predicate: Option<ValueId>,
	) -> ValueId {
		let token_out = self.alloc_value();
		self.stmts.push(BodyStmt::Send(SendStmt {
			token,
			data,
			predicate,
			channel,
			token_out,
		}));
		token_out
	}

	fn push_receive(
		&mut self,
		token: ValueId,
		channel: ChannelUse,
		predicate: Option<ValueId>,
		blocking: bool,
	) -> (ValueId, ValueId) {
		let token_out = self.alloc_value();
		let data_out = self.alloc_value();
		self.stmts.push(BodyStmt::Receive(ReceiveStmt {
			token,
			predicate,
			channel,
			blocking,
			token_out,
			data_out,
		}));
		(token_out, data_out)
	}

	pub fn stmts(&self) -> &[BodyStmt] {
		&self.stmts
	}

	/// True if any send/receive still references a channel parameter
	pub fn has_structured_refs(&self) -> bool {
		self.channel_uses().any(|c| matches!(c, ChannelUse::Param(_)))
	}

	/// Symbols of all flat channels referenced by this body
	pub fn flat_channels(&self) -> Vec<&str> {
		self.channel_uses()
			.filter_map(|c| match c {
				ChannelUse::Flat(name) => Some(name.as_str()),
				ChannelUse::Param(_) => None,
			})
			.collect()
	}

	fn channel_uses(&self) -> impl Iterator<Item = &ChannelUse> {
		self.stmts.iter().filter_map(|stmt| match stmt {
			BodyStmt::Send(send) => Some(&send.channel),
			BodyStmt::Receive(recv) => Some(&recv.channel),
			_ => None,
		})
	}

	/// Rewrites all channel-parameter references to flat channel
	/// symbols, positionally. Predicates, token dependencies and the
	/// blocking flag of every statement are left untouched.
	pub(crate) fn bind_channels(&mut self, channels: &[String]) -> Result<(), DesignError> {
		for stmt in &mut self.stmts {
			let channel = match stmt {
				BodyStmt::Send(send) => &mut send.channel,
				BodyStmt::Receive(recv) => &mut recv.channel,
				_ => continue,
			};

			if let ChannelUse::Param(index) = *channel {
				match channels.get(index) {
					Some(symbol) => *channel = ChannelUse::Flat(symbol.clone()),
					None => return Err(DesignError::UnboundChannelParam { index }),
				}
			}
		}
		Ok(())
	}

	/// Copies this body, resolving channel parameters to the given
	/// flat channel symbols
	pub(crate) fn cloned_with_channels(&self, channels: &[String]) -> Result<ProcBody, DesignError> {
		let mut body = self.clone();
		body.bind_channels(channels)?;
		Ok(body)
	}
}
