//! Outline building and rendering over generated heading sequences

mod common;

use common::{level_sequence, records};
use sky_toc::{
    heading::HeadingNode,
    render::{render, MemoryTarget},
    Outline,
};
use test_log::test;

fn check_children_deeper(node: &HeadingNode) {
    for child in &node.children {
        assert!(
            child.level > node.level,
            "child {} (h{}) under {} (h{})",
            child.id,
            child.level,
            node.id,
            node.level
        );
        check_children_deeper(child);
    }
}

#[test]
fn generated_sequences_preserve_order_and_nesting() {
    for seed in 1..=64 {
        let levels = level_sequence(seed, 1 + (seed as usize * 7) % 40);
        let mut headings = records(&levels);
        let outline = Outline::build(&mut headings).unwrap();

        let walked: Vec<_> = outline.walk().map(|n| n.text.as_str()).collect();
        let input: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(walked, input, "seed {seed}");

        let walked_ids: Vec<_> = outline.walk().map(|n| n.id.as_str()).collect();
        let entry_ids: Vec<_> = outline.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(walked_ids, entry_ids, "seed {seed}");

        outline.roots().iter().for_each(check_children_deeper);
    }
}

#[test]
fn each_node_is_a_child_of_the_nearest_preceding_shallower_heading() {
    for seed in 1..=32 {
        let levels = level_sequence(seed * 31, 30);
        let mut headings = records(&levels);
        let outline = Outline::build(&mut headings).unwrap();

        let mut parents = std::collections::HashMap::new();
        for node in outline.walk() {
            for child in &node.children {
                parents.insert(child.id.clone(), node.id.clone());
            }
        }

        for (index, level) in levels.iter().enumerate() {
            let expected = levels[..index]
                .iter()
                .rposition(|prior| prior < level)
                .map(|prior| format!("heading-{prior}"));
            assert_eq!(
                parents.get(&format!("heading-{index}")).cloned(),
                expected,
                "seed {seed}, index {index}"
            );
        }
    }
}

#[test]
fn rendered_markup_has_one_entry_per_heading() {
    let mut headings = records(&level_sequence(7, 25));
    let outline = Outline::build(&mut headings).unwrap();
    let mut desktop = MemoryTarget::new();

    render(outline.roots(), &mut desktop);
    render(outline.roots(), &mut desktop);

    assert_eq!(desktop.entry_count(), 25);
    for entry in outline.entries() {
        assert!(desktop
            .markup()
            .contains(&format!(r#"data-level="{}""#, entry.level)));
        assert!(desktop
            .markup()
            .contains(&format!(r##"href="#{}""##, entry.id)));
    }
}

#[test]
fn outline_round_trips_through_json() {
    let mut headings = records(&[1, 2, 2, 3, 1]);
    let outline = Outline::build(&mut headings).unwrap();

    let json = serde_json::to_value(outline.roots()).unwrap();
    assert_eq!(json[0]["id"], "heading-0");
    assert_eq!(json[0]["level"], 1);
    assert_eq!(json[0]["children"][1]["children"][0]["text"], "Heading 3");
    assert_eq!(json[1]["children"].as_array().map(Vec::len), Some(0));
}
