//! End-to-end pipeline test over a miniature release laid out on disk.

use std::fs;
use std::path::Path;

use loinc_graph::{default_schema, OntologyGraph};
use loinc_loader::{LoincReleaseLoader, LoincTreeLoader, Module, TreeSource};
use loinc_types::{EdgeKey, NodeKey, PropKey};

fn write_csv(path: &Path, columns: usize, rows: &[Vec<(usize, &str)>]) {
    let header: Vec<String> = (0..columns).map(|i| format!("c{i}")).collect();
    let mut out = header.join(",") + "\n";
    for row in rows {
        let mut fields = vec![String::new(); columns];
        for (index, value) in row {
            fields[*index] = (*value).to_string();
        }
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, out).unwrap();
}

fn write_release(root: &Path) {
    write_csv(
        &root.join("LoincTable/Loinc.csv"),
        42,
        &[vec![
            (0, "1"),
            (1, "100021-5"),
            (2, "Albumin"),
            (8, "CHEM"),
            (12, "ACTIVE"),
            (26, "Albumin [Mass/volume] in Serum or Plasma"),
        ]],
    );
    write_csv(
        &root.join("AccessoryFiles/PartFile/Part.csv"),
        6,
        &[vec![
            (0, "1"),
            (1, "LP14082-9"),
            (2, "COMPONENT"),
            (3, "Albumin"),
            (5, "ACTIVE"),
        ]],
    );
    write_csv(
        &root.join("AccessoryFiles/PartFile/LoincPartLink_Primary.csv"),
        9,
        &[vec![
            (0, "1"),
            (1, "100021-5"),
            (3, "LP14082-9"),
            (5, "http://loinc.org"),
            (8, "COMPONENT"),
        ]],
    );
    write_csv(
        &root.join("AccessoryFiles/PartFile/LoincPartLink_Supplementary.csv"),
        9,
        &[vec![
            (0, "1"),
            (1, "100021-5"),
            (3, "LP14082-9"),
            (5, "http://loinc.org"),
            (8, "analyte"),
        ]],
    );
}

fn write_trees(root: &Path) {
    for source in TreeSource::all() {
        let rows = if source == TreeSource::Component {
            vec![
                vec![(0, "1"), (1, "10"), (4, "LP31755-9"), (6, "Chem")],
                vec![(0, "1"), (1, "11"), (2, "10"), (4, "LP14082-9"), (6, "Albumin")],
            ]
        } else {
            vec![]
        };
        write_csv(&root.join(source.file_name()), 13, &rows);
    }
}

#[test]
fn test_load_release_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let release = dir.path().join("release");
    let trees = dir.path().join("trees");
    write_release(&release);
    write_trees(&trees);

    let mut graph = OntologyGraph::new(default_schema(true).unwrap());
    let rows = LoincReleaseLoader::new(&mut graph, &release).load_all().unwrap();
    assert_eq!(rows, 4);
    LoincTreeLoader::new(&mut graph, &trees).load_all().unwrap();

    // term node carries its table properties and both part links
    let term = graph.get_node(&NodeKey::LoincTerm, "100021-5").unwrap();
    assert_eq!(term.get_property(&PropKey::Class), Some("CHEM"));
    assert_eq!(term.get_out_edges(&[EdgeKey::PrimaryComponent]).len(), 1);
    assert_eq!(term.get_out_edges(&[EdgeKey::DetailedComponent]).len(), 1);

    // part hierarchy from the component tree
    let part = graph.get_node(&NodeKey::LoincPart, "LP14082-9").unwrap();
    let parents = part.get_out_edges(&[EdgeKey::TreeParent]);
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0].to_node().code(), "LP31755-9");

    // a second run over the same release is a no-op
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    assert_eq!(
        LoincReleaseLoader::new(&mut graph, &release).load_all().unwrap(),
        0
    );
    LoincTreeLoader::new(&mut graph, &trees).load_all().unwrap();
    assert_eq!(graph.node_count(), node_count);
    assert_eq!(graph.edge_count(), edge_count);
}

#[test]
fn test_persisted_graph_projects_identically() {
    let dir = tempfile::tempdir().unwrap();
    let release = dir.path().join("release");
    write_release(&release);

    let mut graph = OntologyGraph::new(default_schema(true).unwrap());
    LoincReleaseLoader::new(&mut graph, &release).load_all().unwrap();

    let graph_path = dir.path().join("graph.json");
    graph.save(&graph_path).unwrap();
    let reloaded = OntologyGraph::load(&graph_path).unwrap();

    let mut module = Module::new("main");
    module.instantiate_terms(&reloaded);
    module.annotate_terms(&reloaded);
    module.add_labels(&reloaded);

    let term = &module.terms()["100021-5"];
    assert_eq!(term.id, "https://loinc.org/100021-5");
    assert_eq!(
        term.label.as_deref(),
        Some("LT   Albumin [Mass/volume] in Serum or Plasma")
    );
    assert_eq!(
        term.primary_component.as_deref(),
        Some("https://loinc.org/LP14082-9")
    );

    // the reloaded registry still suppresses reloading
    assert_eq!(
        LoincReleaseLoader::new(&mut OntologyGraph::load(&graph_path).unwrap(), &release)
            .load_all()
            .unwrap(),
        0
    );
}
