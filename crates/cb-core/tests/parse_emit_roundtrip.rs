//! Integration tests: parse → emit → re-parse round-trip.
//!
//! Verifies that no card or link data is lost when a document travels to the
//! host and back.

use cb_core::emitter::emit_document;
use cb_core::id::{EdgeId, NodeId};
use cb_core::model::*;
use cb_core::parser::parse_document;
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn assert_roundtrip(doc: &Document) {
    let emitted = emit_document(doc).expect("emit failed");
    let reparsed = parse_document(&emitted);
    assert_eq!(&reparsed, doc, "document changed after round-trip.\nEmitted:\n{emitted}");

    // Emitting the re-parsed document reproduces the same string.
    let again = emit_document(&reparsed).expect("second emit failed");
    assert_eq!(again, emitted);
}

fn board() -> Document {
    let mut doc = Document::new();
    let colors = CardColor::ALL;
    for (i, color) in colors.into_iter().enumerate() {
        let mut node = Node::new(
            NodeId::intern(&format!("card-{i}")),
            i as f64 * 217.5 - 300.0,
            (i % 3) as f64 * -91.25,
        );
        node.width = 120.0 + i as f64 * 13.0;
        node.height = 60.0 + i as f64 * 7.5;
        node.text = format!("Card {i}\nsecond line with \"quotes\" and ünïcødé ✓");
        node.color = color;
        doc.add_node(node);
    }
    let sides = Side::ALL;
    for i in 0..6 {
        doc.add_edge(Edge {
            id: EdgeId::intern(&format!("link-{i}")),
            from_node: NodeId::intern(&format!("card-{i}")),
            from_side: sides[i % 4],
            to_node: NodeId::intern(&format!("card-{}", i + 1)),
            to_side: sides[(i + 2) % 4],
        });
    }
    doc
}

// ─── Round-trips ─────────────────────────────────────────────────────────

#[test]
fn roundtrip_empty() {
    assert_roundtrip(&Document::default());
}

#[test]
fn roundtrip_board_with_every_color_and_side() {
    assert_roundtrip(&board());
}

#[test]
fn roundtrip_keeps_dangling_links() {
    let mut doc = board();
    doc.edges.push(Edge {
        id: EdgeId::intern("orphan"),
        from_node: NodeId::intern("card-0"),
        from_side: Side::Top,
        to_node: NodeId::intern("deleted-elsewhere"),
        to_side: Side::Bottom,
    });
    assert_roundtrip(&doc);
}

#[test]
fn roundtrip_after_cascade_delete() {
    let mut doc = board();
    doc.remove_node(NodeId::intern("card-3"));
    assert!(doc.edges.iter().all(|e| !e.touches(NodeId::intern("card-3"))));
    assert_roundtrip(&doc);
}

#[test]
fn roundtrip_fractional_coordinates() {
    let mut doc = Document::new();
    let mut node = Node::new(NodeId::intern("frac"), 0.1 + 0.2, -1e-7);
    node.width = 133.333_333_333_333_3;
    doc.add_node(node);
    assert_roundtrip(&doc);
}

// ─── Host-written documents ──────────────────────────────────────────────

#[test]
fn host_written_document_survives_reemit() {
    let raw = r#"{"edges":[{"toSide":"left","toNode":"b","fromSide":"right","fromNode":"a","id":"e"}],
                  "nodes":[{"color":"blue","text":"A","height":80,"width":180,"y":0,"x":0,"id":"a"},
                           {"color":"red","text":"B","height":80,"width":180,"y":0,"x":300,"id":"b"}]}"#;
    let doc = parse_document(raw);
    assert_eq!(doc.nodes.len(), 2);
    assert_eq!(doc.edges.len(), 1);
    assert_roundtrip(&doc);
}
