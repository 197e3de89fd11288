extern crate fluss;

use fluss::design::{
	BinaryOp, BodyStmt, ChanRef, ChannelDirection, ChannelType, ChannelUse, Design, NumericConstant, TemplateHandle,
};
use fluss::elab::{ElabMessageKind, ElabReport, Elaborator, FlattenElaborator};
use rstest::*;

fn elaborate(d: &Design) -> ElabReport {
	FlattenElaborator::new()
		.elaborate(d.handle())
		.expect("elaborator must not hard-fail")
}

/// Two-parameter relay template: receives on the first channel,
/// forwards to the second
fn add_relay(d: &mut Design, name: &str) -> TemplateHandle {
	let mut t = d.new_template(name).unwrap();
	t.add_param("din", ChannelType::Bits(8), ChannelDirection::Input).unwrap();
	t.add_param("dout", ChannelType::Bits(8), ChannelDirection::Output)
		.unwrap();
	t.body(|b| {
		let tok = b.after_all(vec![]);
		let (tok, data) = b.receive(tok, ChannelUse::Param(0));
		b.send(tok, ChannelUse::Param(1), data);
	});
	t
}

/// The double-spawn scenario: `Top` exposes boundary channels
/// `in`/`out` and spawns `C` twice, each spawn wired through its own
/// local channel named `c_chan`
fn build_double_spawn_design() -> Design {
	let mut d = Design::new();
	add_relay(&mut d, "C");

	let mut top = d.new_template("Top").unwrap();
	top.add_param("in", ChannelType::Bits(8), ChannelDirection::Input).unwrap();
	top.add_param("out", ChannelType::Bits(8), ChannelDirection::Output)
		.unwrap();

	let (tx, _rx) = top.declare_channel("c_chan", ChannelType::Bits(8)).unwrap();
	top.spawn("C", vec![ChanRef::Param(0), tx]).unwrap();

	let (_tx, rx) = top.declare_channel("c_chan", ChannelType::Bits(8)).unwrap();
	top.spawn("C", vec![rx, ChanRef::Param(1)]).unwrap();

	top.make_top();
	top.expose_boundary(&["in", "out"]).unwrap();
	d
}

#[test]
fn test_double_spawn_scenario() {
	let d = build_double_spawn_design();
	let report = elaborate(&d);
	assert!(report.messages().is_empty());

	// locals uniquified, boundary names taken verbatim
	assert_eq!(d.channel_names(), vec!["in", "out", "c_chan", "c_chan_1"]);

	// children materialize before their spawner
	assert_eq!(d.proc_names(), vec!["C", "C_1", "Top"]);

	// all structured references are gone
	for name in d.proc_names() {
		let proc = d.get_proc_by_name(&name).unwrap();
		assert!(!proc.body.has_structured_refs(), "{} still structured", name);
	}

	assert_eq!(d.get_proc_by_name("C").unwrap().body.flat_channels(), vec!["in", "c_chan"]);
	assert_eq!(
		d.get_proc_by_name("C_1").unwrap().body.flat_channels(),
		vec!["c_chan_1", "out"]
	);

	// no templates survive the pass
	assert_eq!(d.template_count(), 0);
}

#[rstest]
#[case(ChannelDirection::Input, false, true)]
#[case(ChannelDirection::Output, true, false)]
fn test_boundary_direction(
	#[case] direction: ChannelDirection,
	#[case] send_supported: bool,
	#[case] recv_supported: bool,
) {
	let mut d = Design::new();
	let mut top = d.new_template("Top").unwrap();
	top.add_param("p", ChannelType::Bits(4), direction).unwrap();
	top.make_top();
	top.expose_boundary(&["port"]).unwrap();

	let report = elaborate(&d);
	assert!(report.messages().is_empty());

	let chan = d.get_channel_by_name("port").unwrap();
	assert_eq!(chan.send_supported, send_supported);
	assert_eq!(chan.recv_supported, recv_supported);
	assert_eq!(chan.ty, ChannelType::Bits(4));
}

#[test]
fn test_arity_mismatch_fails_only_its_top() {
	let mut d = Design::new();
	add_relay(&mut d, "C");

	// C takes two channels, this spawn binds one
	let mut bad = d.new_template("bad").unwrap();
	let (tx, _rx) = bad.declare_channel("only", ChannelType::Bits(8)).unwrap();
	bad.spawn("C", vec![tx]).unwrap();
	bad.make_top();

	let mut good = d.new_template("good").unwrap();
	let (tx, rx) = good.declare_channel("fwd", ChannelType::Bits(8)).unwrap();
	good.spawn("C", vec![rx, tx]).unwrap();
	good.make_top();

	let report = elaborate(&d);
	assert_eq!(report.messages().len(), 1);

	let msg = &report.messages()[0];
	assert_eq!(msg.template(), "bad");
	match msg.kind() {
		ElabMessageKind::SpawnArityMismatch { callee, expected, actual } => {
			assert_eq!(callee, "C");
			assert_eq!(*expected, 2);
			assert_eq!(*actual, 1);
		},
		other => panic!("expected arity mismatch, got {:?}", other),
	}

	// the failing top never materialized
	assert!(d.get_proc_by_name("bad").is_none());

	// the independent top did
	assert!(d.get_proc_by_name("good").is_some());
	assert!(d.get_proc_by_name("C").is_some());
}

#[test]
fn test_unresolved_callee_fails_only_its_top() {
	let mut d = Design::new();

	let mut broken = d.new_template("broken").unwrap();
	broken.spawn("no_such_template", vec![]).unwrap();
	broken.make_top();

	let mut intact = d.new_template("intact").unwrap();
	intact.make_top();

	let report = elaborate(&d);
	assert_eq!(report.messages().len(), 1);
	assert_eq!(report.messages()[0].template(), "broken");
	assert!(matches!(
		report.messages()[0].kind(),
		ElabMessageKind::UnresolvedTemplate { name } if name == "no_such_template"
	));

	assert!(d.get_proc_by_name("broken").is_none());
	assert!(d.get_proc_by_name("intact").is_some());
}

#[test]
fn test_deterministic_naming() {
	let first = build_double_spawn_design();
	let second = build_double_spawn_design();

	elaborate(&first);
	elaborate(&second);

	assert_eq!(first.channel_names(), second.channel_names());
	assert_eq!(first.proc_names(), second.proc_names());
}

#[test]
fn test_templates_removed_even_after_failures() {
	let mut d = Design::new();

	let mut broken = d.new_template("broken").unwrap();
	broken.spawn("missing", vec![]).unwrap();
	broken.make_top();

	// never reached from any top, removed regardless
	add_relay(&mut d, "orphan");

	let broken_id = broken.id();
	elaborate(&d);

	assert_eq!(d.template_count(), 0);
	assert!(d.get_template(broken_id).is_none());
}

#[test]
fn test_names_unique_across_tops() {
	let mut d = Design::new();
	add_relay(&mut d, "C");

	for top_name in ["alpha", "beta"] {
		let mut top = d.new_template(top_name).unwrap();
		let (tx, rx) = top.declare_channel("link", ChannelType::Bits(8)).unwrap();
		top.spawn("C", vec![rx, tx]).unwrap();
		top.make_top();
	}

	let report = elaborate(&d);
	assert!(report.messages().is_empty());

	// shared callee and shared local names get disambiguated
	assert_eq!(d.channel_names(), vec!["link", "link_1"]);
	assert_eq!(d.proc_names(), vec!["C", "alpha", "C_1", "beta"]);

	let mut all_names = d.channel_names();
	all_names.extend(d.proc_names());
	let count = all_names.len();
	all_names.sort();
	all_names.dedup();
	assert_eq!(all_names.len(), count);
}

#[test]
fn test_recursive_instantiation_rejected() {
	let mut d = Design::new();

	let mut loopy = d.new_template("loopy").unwrap();
	loopy.spawn("loopy", vec![]).unwrap();
	loopy.make_top();

	let mut sane = d.new_template("sane").unwrap();
	sane.make_top();

	let report = elaborate(&d);
	assert_eq!(report.messages().len(), 1);
	assert_eq!(report.messages()[0].template(), "loopy");
	match report.messages()[0].kind() {
		ElabMessageKind::RecursiveInstantiation { cycle } => {
			assert!(cycle.contains(&"loopy".to_string()));
		},
		other => panic!("expected recursion error, got {:?}", other),
	}

	assert!(d.get_proc_by_name("loopy").is_none());
	assert!(d.get_proc_by_name("sane").is_some());
	assert_eq!(d.template_count(), 0);
}

#[test]
fn test_suspension_marker_is_transparent() {
	let mut d = Design::new();
	add_relay(&mut d, "C");

	let mut top = d.new_template("Top").unwrap();
	let (tx, rx) = top.declare_channel("link", ChannelType::Bits(8)).unwrap();
	top.suspend();
	top.spawn("C", vec![rx, tx]).unwrap();
	top.suspend();
	top.make_top();

	let report = elaborate(&d);
	assert!(report.messages().is_empty());
	assert_eq!(d.channel_names(), vec!["link"]);
	assert_eq!(d.proc_names(), vec!["C", "Top"]);
}

/// Renaming channels must not disturb predicates, token order or the
/// blocking flag of any rewritten operation
#[test]
fn test_handshake_semantics_preserved() {
	let mut d = Design::new();

	let mut probe = d.new_template("probe").unwrap();
	probe
		.add_param("req", ChannelType::Bits(8), ChannelDirection::Input)
		.unwrap();
	probe
		.add_param("rsp", ChannelType::Bits(8), ChannelDirection::Output)
		.unwrap();
	probe.body(|b| {
		let tok = b.after_all(vec![]);
		let threshold = b.constant(NumericConstant::from_u64(42, 8));
		let (tok, data) = b.receive_nonblocking(tok, ChannelUse::Param(0));
		let pred = b.binary(BinaryOp::NotEqual, data, threshold);
		b.send_if(tok, ChannelUse::Param(1), pred, data);
	});

	let mut top = d.new_template("Top").unwrap();
	let (tx, rx) = top.declare_channel("loop_back", ChannelType::Bits(8)).unwrap();
	top.spawn("probe", vec![rx, tx]).unwrap();
	top.make_top();

	let report = elaborate(&d);
	assert!(report.messages().is_empty());

	let body = d.get_proc_by_name("probe").unwrap().body;
	let recv = body
		.stmts()
		.iter()
		.find_map(|s| match s {
			BodyStmt::Receive(recv) => Some(recv.clone()),
			_ => None,
		})
		.unwrap();
	assert!(!recv.blocking);
	assert_eq!(recv.predicate, None);
	assert_eq!(recv.channel, ChannelUse::Flat("loop_back".to_string()));

	let send = body
		.stmts()
		.iter()
		.find_map(|s| match s {
			BodyStmt::Send(send) => Some(send.clone()),
			_ => None,
		})
		.unwrap();
	assert!(send.predicate.is_some());
	assert_eq!(send.token, recv.token_out);
	assert_eq!(send.data, recv.data_out);
	assert_eq!(send.channel, ChannelUse::Flat("loop_back".to_string()));
}

/// Channels created before a top fails stay in the design and keep
/// their names reserved
#[test]
fn test_no_rollback_after_failure() {
	let mut d = Design::new();

	let mut bad = d.new_template("bad").unwrap();
	bad.declare_channel("scratch", ChannelType::Bits(1)).unwrap();
	bad.spawn("missing", vec![]).unwrap();
	bad.make_top();

	let mut other = d.new_template("other").unwrap();
	other.declare_channel("scratch", ChannelType::Bits(1)).unwrap();
	other.make_top();

	let report = elaborate(&d);
	assert_eq!(report.messages().len(), 1);

	// the failed top's local channel survived, the later top's
	// declaration was pushed to the next free suffix
	assert_eq!(d.channel_names(), vec!["scratch", "scratch_1"]);
}
