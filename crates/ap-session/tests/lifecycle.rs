use ap_core::{ApError, EntityKind};
use ap_host::{
    AutomationServer, HostError, HostResult, MemoryNode, MemoryServer, ProcessTable, ServerCall,
};
use ap_session::*;
use std::cell::RefCell;
use std::path::Path;

/// Process table that lists a fixed number of lines and records every call.
struct RecordingTable {
    lines: usize,
    calls: RefCell<Vec<String>>,
}

impl RecordingTable {
    fn listing(lines: usize) -> Self {
        Self {
            lines,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ProcessTable for RecordingTable {
    fn list(&self, image: &str) -> HostResult<Vec<String>> {
        self.calls.borrow_mut().push(format!("list {}", image));
        Ok(vec!["line".to_string(); self.lines])
    }

    fn terminate_all(&self, image: &str) -> HostResult<()> {
        self.calls.borrow_mut().push(format!("terminate {}", image));
        Ok(())
    }
}

fn flowsheet() -> (MemoryServer, MemoryNode) {
    let doc = MemoryNode::document();
    doc.insert_folder(r"Data\Streams\S1");
    doc.insert_folder(r"Data\Blocks\B1");
    let server = MemoryServer::new().with_document("flowsheet.bkp", doc.clone());
    (server, doc)
}

#[test]
fn open_unknown_file_is_connection_error() {
    let (server, _) = flowsheet();
    let err = Simulation::open(server, "missing.bkp").err().unwrap();
    match err {
        ApError::Connection { message } => assert!(message.contains("missing.bkp")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn configuration_is_forwarded_verbatim() {
    let (server, _) = flowsheet();
    let sim = Simulation::open(server.clone(), "flowsheet.bkp").unwrap();
    sim.set_visible(true).unwrap();
    sim.set_popups_suppressed(true).unwrap();
    sim.run().unwrap();
    sim.reinit().unwrap();
    sim.run().unwrap();
    assert!(server.is_visible());
    assert!(server.dialogs_suppressed());

    sim.close(&CloseOptions::soft(), &RecordingTable::listing(0))
        .unwrap();
    assert_eq!(
        server.calls(),
        vec![
            ServerCall::LoadDocument("flowsheet.bkp".into()),
            ServerCall::SetVisible(true),
            ServerCall::SetSuppressDialogs(true),
            ServerCall::Run,
            ServerCall::Reinit,
            ServerCall::Run,
            ServerCall::CloseDocument("flowsheet.bkp".into()),
            ServerCall::Quit,
        ]
    );
}

#[test]
fn open_with_applies_only_configured_settings() {
    let (server, _) = flowsheet();
    let config = SessionConfig {
        suppress_dialogs: Some(true),
        ..SessionConfig::default()
    };
    let sim = Simulation::open_with(server.clone(), "flowsheet.bkp", &config).unwrap();
    sim.close(&CloseOptions::soft(), &RecordingTable::listing(0))
        .unwrap();
    assert!(!server.calls().iter().any(|c| matches!(c, ServerCall::SetVisible(_))));
    assert!(server.calls().contains(&ServerCall::SetSuppressDialogs(true)));
}

#[test]
fn locator_finds_streams_and_blocks() {
    let (server, _) = flowsheet();
    let sim = Simulation::open(server, "flowsheet.bkp").unwrap();

    assert_eq!(sim.get_stream("S1").unwrap().unwrap().name(), "S1");
    assert_eq!(sim.get_block("B1").unwrap().unwrap().name(), "B1");
    // Streams and blocks live in separate sub-trees.
    assert!(sim.get_stream("B1").unwrap().is_none());
    assert!(sim.get_block("S1").unwrap().is_none());

    sim.close(&CloseOptions::soft(), &RecordingTable::listing(0))
        .unwrap();
}

#[test]
fn missing_stream_is_absent_not_error() {
    let (server, _) = flowsheet();
    let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
    assert!(sim.get_stream("NOPE").unwrap().is_none());

    let err = sim.require_stream("NOPE").err().unwrap();
    assert_eq!(
        err,
        ApError::LookupAbsent {
            kind: EntityKind::Stream,
            name: "NOPE".into()
        }
    );
    assert!(sim.require_block("NOPE").is_err());
    sim.close(&CloseOptions::soft(), &RecordingTable::listing(0))
        .unwrap();
}

#[test]
fn soft_close_never_touches_process_table() {
    let (server, _) = flowsheet();
    let table = RecordingTable::listing(10);
    let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
    let report = sim.close(&CloseOptions::soft(), &table).unwrap();
    assert_eq!(report, CloseReport::default());
    assert!(table.calls().is_empty());
}

#[test]
fn hard_close_terminates_only_above_threshold() {
    for (lines, expect_kill) in [(0, false), (2, false), (3, true), (7, true)] {
        let (server, _) = flowsheet();
        let table = RecordingTable::listing(lines);
        let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
        let report = sim.close(&CloseOptions::default(), &table).unwrap();

        assert_eq!(report.forced(), expect_kill, "lines = {lines}");
        assert_eq!(report.stray.unwrap().listed, lines);
        let mut expected = vec!["list AspenPlus.exe".to_string()];
        if expect_kill {
            expected.push("terminate AspenPlus.exe".to_string());
        }
        assert_eq!(table.calls(), expected);
    }
}

#[test]
fn configured_threshold_and_image() {
    let (server, _) = flowsheet();
    let table = RecordingTable::listing(3);
    let options = CloseOptions {
        kill_stray: true,
        stray_threshold: 3,
        process_image: "Other.exe".to_string(),
    };
    let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
    let report = sim.close(&options, &table).unwrap();
    assert!(!report.forced());
    assert_eq!(table.calls(), vec!["list Other.exe".to_string()]);
}

#[test]
fn dropped_simulation_is_closed_softly() {
    let (server, _) = flowsheet();
    {
        let _sim = Simulation::open(server.clone(), "flowsheet.bkp").unwrap();
    }
    let calls = server.calls();
    assert_eq!(
        &calls[1..],
        &[
            ServerCall::CloseDocument("flowsheet.bkp".into()),
            ServerCall::Quit
        ]
    );
}

#[test]
fn scoped_closes_after_error() {
    let (server, _) = flowsheet();
    let table = RecordingTable::listing(5);
    let result: Result<((), CloseReport), ApError> = Simulation::scoped(
        server.clone(),
        "flowsheet.bkp",
        &SessionConfig::default(),
        &table,
        |sim| sim.require_stream("NOPE").map(|_| ()),
    );
    assert!(matches!(result, Err(ApError::LookupAbsent { .. })));
    assert!(server.calls().contains(&ServerCall::Quit));
    // Default close options still run the stray cleanup.
    assert!(table.calls().contains(&"terminate AspenPlus.exe".to_string()));
}

#[test]
fn scoped_returns_value_and_close_report() {
    let (server, _) = flowsheet();
    let table = RecordingTable::listing(1);
    let (name, report) = Simulation::scoped(
        server,
        "flowsheet.bkp",
        &SessionConfig::default(),
        &table,
        |sim| Ok(sim.require_stream("S1")?.name().to_string()),
    )
    .unwrap();
    assert_eq!(name, "S1");
    assert!(!report.forced());
}

/// Host whose document refuses to close; everything else is in memory.
struct BusyServer(MemoryServer);

impl AutomationServer for BusyServer {
    type Node = MemoryNode;

    fn load_document(&self, path: &Path) -> HostResult<()> {
        self.0.load_document(path)
    }

    fn set_visible(&self, visible: bool) -> HostResult<()> {
        self.0.set_visible(visible)
    }

    fn set_suppress_dialogs(&self, suppress: bool) -> HostResult<()> {
        self.0.set_suppress_dialogs(suppress)
    }

    fn run(&self) -> HostResult<()> {
        self.0.run()
    }

    fn reinit(&self) -> HostResult<()> {
        self.0.reinit()
    }

    fn close_document(&self, _path: &Path) -> HostResult<()> {
        Err(HostError::Call {
            member: "Close",
            message: "busy".into(),
        })
    }

    fn quit(&self) -> HostResult<()> {
        self.0.quit()
    }

    fn tree(&self) -> HostResult<MemoryNode> {
        self.0.tree()
    }
}

#[test]
fn failed_document_close_still_quits_and_reaps() {
    let (server, _) = flowsheet();
    let table = RecordingTable::listing(5);
    let sim = Simulation::open(BusyServer(server.clone()), "flowsheet.bkp").unwrap();

    let err = sim.close(&CloseOptions::default(), &table).unwrap_err();
    assert_eq!(
        err,
        ApError::Host {
            message: "Close failed: busy".into()
        }
    );
    assert_eq!(server.calls().last(), Some(&ServerCall::Quit));
    assert_eq!(
        table.calls(),
        vec![
            "list AspenPlus.exe".to_string(),
            "terminate AspenPlus.exe".to_string()
        ]
    );
}

#[test]
fn failed_process_listing_does_not_fail_close() {
    struct NoWmic;
    impl ProcessTable for NoWmic {
        fn list(&self, _image: &str) -> HostResult<Vec<String>> {
            Err(HostError::Process {
                message: "failed to run WMIC: not found".into(),
            })
        }
        fn terminate_all(&self, _image: &str) -> HostResult<()> {
            unreachable!()
        }
    }

    let (server, _) = flowsheet();
    let sim = Simulation::open(server.clone(), "flowsheet.bkp").unwrap();
    let report = sim.close(&CloseOptions::default(), &NoWmic).unwrap();

    assert_eq!(report.stray, None);
    assert!(!report.forced());
    assert!(report.stray_error.unwrap().contains("WMIC"));
    assert_eq!(server.calls().last(), Some(&ServerCall::Quit));
}
