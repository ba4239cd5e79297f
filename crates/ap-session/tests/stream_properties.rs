use ap_core::{PropertyKey, PropertyMap, Value};
use ap_host::{MemoryNode, MemoryServer};
use ap_session::{CloseOptions, Diagnostic, Simulation};

fn open(doc: &MemoryNode) -> Simulation<MemoryServer> {
    let server = MemoryServer::new().with_document("flowsheet.bkp", doc.clone());
    Simulation::open(server, "flowsheet.bkp").unwrap()
}

fn close(sim: Simulation<MemoryServer>) {
    struct NoProcesses;
    impl ap_host::ProcessTable for NoProcesses {
        fn list(&self, _image: &str) -> ap_host::HostResult<Vec<String>> {
            Ok(Vec::new())
        }
        fn terminate_all(&self, _image: &str) -> ap_host::HostResult<()> {
            Ok(())
        }
    }
    sim.close(&CloseOptions::soft(), &NoProcesses).unwrap();
}

fn results_doc() -> MemoryNode {
    let doc = MemoryNode::document();
    let s1 = r"Data\Streams\S1";
    doc.insert_path(&format!(r"{s1}\Output\TEMP_OUT\MIXED"), 350.0);
    doc.insert_path(&format!(r"{s1}\Output\PRES_OUT\MIXED"), 1.5);
    doc.insert_path(&format!(r"{s1}\Output\MOLEFLMX\MIXED"), 100.0);
    doc.insert_path(&format!(r"{s1}\Output\MOLEFLOW\MIXED\CO2"), 4.0);
    doc.insert_path(&format!(r"{s1}\Output\MOLEFRAC\MIXED\CO2"), 0.04);
    doc
}

#[test]
fn temperature_read() {
    let doc = results_doc();
    let sim = open(&doc);
    let s1 = sim.get_stream("S1").unwrap().unwrap();

    let props = s1.get_properties(["TEMP"]);
    let expected: PropertyMap = [(PropertyKey::from("TEMP"), Value::Real(350.0))].into();
    assert_eq!(props, expected);

    drop(s1);
    close(sim);
}

#[test]
fn empty_request_gives_empty_mapping() {
    let doc = results_doc();
    let sim = open(&doc);
    let s1 = sim.get_stream("S1").unwrap().unwrap();
    assert!(s1.get_properties(Vec::<PropertyKey>::new()).is_empty());
    drop(s1);
    close(sim);
}

#[test]
fn mixed_batch_keeps_good_keys() {
    let doc = results_doc();
    let sim = open(&doc);
    let s1 = sim.get_stream("S1").unwrap().unwrap();

    let keys: Vec<PropertyKey> = vec![
        "TEMP".into(),
        ("COMPMOLEFLOW", "CO2").into(),
        "VISCOSITY".into(),
        "MOLEFLOW".into(),
        ("COMPMOLEFRAC", "H2O").into(),
        "PRES".into(),
    ];
    let outcome = s1.get_properties_report(keys);

    assert_eq!(outcome.values.len(), 4);
    assert_eq!(
        outcome.values[&PropertyKey::from(("COMPMOLEFLOW", "CO2"))],
        Value::Real(4.0)
    );
    assert_eq!(outcome.values[&PropertyKey::from("PRES")], Value::Real(1.5));
    assert_eq!(outcome.diagnostics.len(), 2);
    assert_eq!(
        outcome.diagnostics[0],
        Diagnostic::UnknownKey {
            key: "VISCOSITY".into()
        }
    );
    match &outcome.diagnostics[1] {
        Diagnostic::HostAccess { key, path, .. } => {
            assert_eq!(key, &PropertyKey::from(("COMPMOLEFRAC", "H2O")));
            assert_eq!(path, r"Output\MOLEFRAC\MIXED\H2O");
        }
        other => panic!("unexpected diagnostic: {other:?}"),
    }

    drop(s1);
    close(sim);
}

#[test]
fn write_keys_are_rejected_for_reads() {
    let doc = results_doc();
    let sim = open(&doc);
    let s1 = sim.get_stream("S1").unwrap().unwrap();
    let outcome = s1.get_properties_report(["FLOWBASIS"]);
    assert!(outcome.values.is_empty());
    assert!(matches!(
        outcome.diagnostics[0],
        Diagnostic::UnknownKey { .. }
    ));
    drop(s1);
    close(sim);
}

#[test]
fn set_properties_writes_input_paths() {
    let doc = MemoryNode::document();
    let s1 = r"Data\Streams\FEED\Input";
    for leaf in [
        r"TEMP\MIXED",
        r"PRES\MIXED",
        r"TOTFLOW\MIXED",
        r"FLOWBASE\MIXED",
        r"FLOW\MIXED\CO2",
        r"BASIS\MIXED",
        r"MIXED_SPEC\MIXED",
    ] {
        doc.insert_path(&format!(r"{s1}\{leaf}"), Value::Empty);
    }
    let sim = open(&doc);
    let feed = sim.get_stream("FEED").unwrap().unwrap();

    let values: PropertyMap = [
        (PropertyKey::from("TEMP"), Value::Real(320.0)),
        (PropertyKey::from("FLOWBASIS"), Value::from("MOLE")),
        (PropertyKey::from("FLOW"), Value::Real(50.0)),
        (PropertyKey::from(("COMPFLOW", "CO2")), Value::Real(0.2)),
        (PropertyKey::from("COMPBASIS"), Value::from("MOLE-FRAC")),
        (PropertyKey::from("FLASHTYPE"), Value::from("TP")),
        (PropertyKey::from("MOLEFLOW"), Value::Real(1.0)),
        (PropertyKey::from("VAPFRAC"), Value::Real(0.5)),
    ]
    .into();
    let outcome = feed.set_properties_report(&values);

    assert_eq!(doc.get_path(&format!(r"{s1}\TEMP\MIXED")), Some(Value::Real(320.0)));
    assert_eq!(
        doc.get_path(&format!(r"{s1}\FLOWBASE\MIXED")),
        Some(Value::from("MOLE"))
    );
    assert_eq!(doc.get_path(&format!(r"{s1}\TOTFLOW\MIXED")), Some(Value::Real(50.0)));
    assert_eq!(doc.get_path(&format!(r"{s1}\FLOW\MIXED\CO2")), Some(Value::Real(0.2)));
    assert_eq!(
        doc.get_path(&format!(r"{s1}\BASIS\MIXED")),
        Some(Value::from("MOLE-FRAC"))
    );
    assert_eq!(
        doc.get_path(&format!(r"{s1}\MIXED_SPEC\MIXED")),
        Some(Value::from("TP"))
    );
    // PRES was not requested and stays blank.
    assert_eq!(doc.get_path(&format!(r"{s1}\PRES\MIXED")), Some(Value::Empty));

    assert_eq!(outcome.values.len(), 6);
    let failed: Vec<String> = outcome
        .diagnostics
        .iter()
        .map(|d| d.key().to_string())
        .collect();
    // MOLEFLOW is read-only; VAPFRAC has no node in this document.
    assert_eq!(failed, vec!["MOLEFLOW".to_string(), "VAPFRAC".to_string()]);

    // The void form has the same effect.
    let again: PropertyMap = [(PropertyKey::from("TEMP"), Value::Real(330.0))].into();
    feed.set_properties(&again);
    assert_eq!(doc.get_path(&format!(r"{s1}\TEMP\MIXED")), Some(Value::Real(330.0)));

    drop(feed);
    close(sim);
}

#[test]
fn run_updates_results_seen_by_stream() {
    let doc = MemoryNode::document();
    doc.insert_path(r"Data\Streams\S1\Input\TEMP\MIXED", 300.0);
    doc.insert_path(r"Data\Streams\S1\Output\TEMP_OUT\MIXED", Value::Empty);
    let server = MemoryServer::new()
        .with_document("flowsheet.bkp", doc.clone())
        .on_run(|tree| {
            let t = tree
                .get_path(r"Data\Streams\S1\Input\TEMP\MIXED")
                .and_then(|v| v.as_f64())
                .unwrap_or_default();
            tree.insert_path(r"Data\Streams\S1\Output\TEMP_OUT\MIXED", t);
        });
    let sim = Simulation::open(server, "flowsheet.bkp").unwrap();
    let s1 = sim.get_stream("S1").unwrap().unwrap();

    assert_eq!(s1.get_property("TEMP").unwrap(), Value::Empty);
    s1.set_property("TEMP", 345.0).unwrap();
    sim.run().unwrap();
    assert_eq!(s1.get_property("TEMP").unwrap(), Value::Real(345.0));

    drop(s1);
    close(sim);
}
