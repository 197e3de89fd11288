use std::collections::HashSet;

use log::debug;

use crate::design::{Channel, ChannelId, ChannelType, DesignHandle, Proc, ProcId, ProcTemplate};

use super::report::ElabMessageKind;

/// Mutable bookkeeping for one top's elaboration: symbols handed out
/// so far and the design being extended with flattened output.
pub(super) struct ElabCtx {
	design: DesignHandle,
	added_symbols: HashSet<String>,
}

impl ElabCtx {
	pub fn new(design: DesignHandle) -> Self {
		Self {
			design,
			added_symbols: HashSet::new(),
		}
	}

	fn symbol_taken(&self, name: &str) -> bool {
		self.added_symbols.contains(name) || self.design.borrow().symbol_exists(name)
	}

	/// Returns `requested` verbatim when it is free, otherwise the
	/// first free name of the form `{requested}_{n}` for n = 1, 2, ...
	/// The chosen name is recorded as allocated.
	pub fn make_unique_symbol(&mut self, requested: &str) -> String {
		if !self.symbol_taken(requested) {
			self.added_symbols.insert(requested.to_string());
			return requested.to_string();
		}

		let mut counter = 1usize;
		loop {
			let candidate = format!("{}_{}", requested, counter);
			if !self.symbol_taken(&candidate) {
				debug!("Symbol '{}' taken, allocating '{}'", requested, candidate);
				self.added_symbols.insert(candidate.clone());
				return candidate;
			}
			counter += 1;
		}
	}

	/// Creates a flat channel under a uniquified version of `requested`
	pub fn create_channel(&mut self, requested: &str, ty: ChannelType) -> Result<ChannelId, ElabMessageKind> {
		let symbol = self.make_unique_symbol(requested);
		let channel = Channel::new(&symbol, ty);
		Ok(self.design.borrow_mut().add_channel(channel)?)
	}

	/// Materializes `template` as a concrete process bound to
	/// `channels`, positionally. The body is cloned with every
	/// channel-parameter reference resolved to a flat channel symbol.
	pub fn create_proc(&mut self, template: &ProcTemplate, channels: &[ChannelId]) -> Result<ProcId, ElabMessageKind> {
		let symbol = self.make_unique_symbol(&template.name);

		let channel_symbols: Vec<String> = channels
			.iter()
			.map(|id| {
				self.design
					.borrow()
					.get_channel(*id)
					.expect("bound channel not in design")
					.name
					.clone()
			})
			.collect();

		let body = template.body.cloned_with_channels(&channel_symbols)?;

		debug!("Materializing process '{}' from template '{}'", symbol, template.name);
		Ok(self.design.borrow_mut().add_proc(Proc::new(&symbol, body))?)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::design::Design;

	#[test]
	fn test_unique_symbols() {
		let d = Design::new();
		d.handle()
			.borrow_mut()
			.add_channel(Channel::new("data", ChannelType::Bits(8)))
			.unwrap();

		let mut ctx = ElabCtx::new(d.handle());
		assert_eq!(ctx.make_unique_symbol("ctl"), "ctl");
		assert_eq!(ctx.make_unique_symbol("ctl"), "ctl_1");
		assert_eq!(ctx.make_unique_symbol("ctl"), "ctl_2");

		// collides with a pre-existing design symbol
		assert_eq!(ctx.make_unique_symbol("data"), "data_1");
	}

	#[test]
	fn test_symbols_shared_across_contexts_through_design() {
		let d = Design::new();

		let mut ctx = ElabCtx::new(d.handle());
		let chan = ctx.create_channel("lnk", ChannelType::Bits(1)).unwrap();
		assert_eq!(d.get_channel(chan).unwrap().name, "lnk");

		// a fresh context sees the materialized channel
		let mut ctx2 = ElabCtx::new(d.handle());
		let chan2 = ctx2.create_channel("lnk", ChannelType::Bits(1)).unwrap();
		assert_eq!(d.get_channel(chan2).unwrap().name, "lnk_1");
	}
}
