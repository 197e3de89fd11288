extern crate fluss;

use fluss::design::{ChanRef, ChannelDirection, ChannelType, ChannelUse, Design};
use fluss::elab::{Elaborator, FlattenElaborator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let mut d = Design::new();

	let mut stage = d.new_template("stage")?;
	stage.add_param("din", ChannelType::Bits(8), ChannelDirection::Input)?;
	stage.add_param("dout", ChannelType::Bits(8), ChannelDirection::Output)?;
	stage.body(|b| {
		let tok = b.after_all(vec![]);
		let (tok, data) = b.receive(tok, ChannelUse::Param(0));
		b.send(tok, ChannelUse::Param(1), data);
	});

	let mut top = d.new_template("pipeline")?;
	top.add_param("in", ChannelType::Bits(8), ChannelDirection::Input)?;
	top.add_param("out", ChannelType::Bits(8), ChannelDirection::Output)?;
	let (tx, rx) = top.declare_channel("link", ChannelType::Bits(8))?;
	top.spawn("stage", vec![ChanRef::Param(0), tx])?;
	top.spawn("stage", vec![rx, ChanRef::Param(1)])?;
	top.make_top();
	top.expose_boundary(&["in", "out"])?;

	let report = FlattenElaborator::new().elaborate(d.handle())?;
	for msg in report.messages() {
		eprintln!("{}", msg);
	}

	println!("channels:");
	for name in d.channel_names() {
		let chan = d.get_channel_by_name(&name).unwrap();
		println!(
			"  {}: {} (send: {}, recv: {})",
			chan.name, chan.ty, chan.send_supported, chan.recv_supported
		);
	}

	println!("processes:");
	for name in d.proc_names() {
		let proc = d.get_proc_by_name(&name).unwrap();
		println!("  {} -> {:?}", proc.name, proc.body.flat_channels());
	}

	Ok(())
}
