use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use sysdoc::{Document, Node, NodeKind, Provenance, ResultSet, Scalar};

extern crate sysdoc;

#[derive(Debug, Serialize)]
struct Mount {
    filesystem: String,
    mounted_on: String,
    used: u64,
}

fn mounts(rows: &[(&str, &str, u64)]) -> Vec<Arc<Mount>> {
    rows.iter()
        .map(|(filesystem, mounted_on, used)| {
            Arc::new(Mount {
                filesystem: filesystem.to_string(),
                mounted_on: mounted_on.to_string(),
                used: *used,
            })
        })
        .collect()
}

#[test]
fn it_builds_documents_from_dict() {
    let doc = Document::from_value(json!({"a": [1, 2, {"b": "x"}]}));
    let items = doc.get("a").and_then(Node::as_sequence).unwrap();
    let kinds: Vec<NodeKind> = items.iter().map(Node::kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Scalar, NodeKind::Scalar, NodeKind::Mapping]
    );
    assert_eq!(items[0].as_scalar(), Some(&Scalar::Number(1.into())));
    assert_eq!(items[1].as_scalar(), Some(&Scalar::Number(2.into())));
}

#[test]
fn it_falls_back_to_the_first_non_empty_producer() {
    // `df -al` printed nothing, `df -alP` found two filesystems
    let long_format = mounts(&[]);
    let posix_format = mounts(&[("/dev/sda1", "/", 1024), ("/dev/sda2", "/boot", 64)]);

    let first = ResultSet::collect(&long_format, Document::from_serialize).unwrap();
    let second = ResultSet::collect(&posix_format, Document::from_serialize).unwrap();
    let chosen = ResultSet::first_non_empty(vec![first, second.clone()]);

    assert_eq!(chosen, second);
    let mounted: Vec<&str> = chosen
        .iter()
        .filter_map(|doc| doc.get("mounted_on")?.as_scalar()?.as_str())
        .collect();
    assert_eq!(mounted, vec!["/", "/boot"]);
}

#[test]
fn it_keeps_documents_valid_after_sources_are_dropped() {
    let rows = mounts(&[("tmpfs", "/run", 8)]);
    let result = ResultSet::collect(&rows, Document::from_serialize).unwrap();
    let resolved = result.children()[0].source().and_then(Provenance::resolve::<Mount>);
    assert_eq!(resolved.map(|m| m.used), Some(8));

    drop(rows);
    let doc = &result.children()[0];
    assert!(doc.source().and_then(Provenance::resolve::<Mount>).is_none());
    assert_eq!(
        doc.get("filesystem").and_then(Node::as_scalar).and_then(Scalar::as_str),
        Some("tmpfs")
    );
}

#[test]
fn it_labels_instances() {
    let interface = Arc::new(json!({"speed": "1000Mb/s", "link": true}));
    let doc = Document::from_value((*interface).clone())
        .with_source(Provenance::of(&interface).with_label("eth0"));
    assert_eq!(doc.source().and_then(Provenance::label), Some("eth0"));
    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        json!({"speed": "1000Mb/s", "link": true})
    );
}
