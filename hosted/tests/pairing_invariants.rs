use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::rstest;

use almanac_core::edit::{BaseEdit, EditLog};
use almanac_hosted::{
    ActivateEdit, DeactivateEdit, Endpoint, HostId, Hosted, HostedDataList, HostedGraph,
    HostedListEdit, PairingDecl, PairingId, PairingRegistry, Role,
};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Tag(String),
    Note(String),
}

impl Hosted for Item {
    fn kind(&self) -> &'static str {
        match self {
            Item::Tag(_) => "tag",
            Item::Note(_) => "note",
        }
    }
}

const TAGGED: PairingId = PairingId("note.tags");

struct World {
    graph: HostedGraph<Item>,
    log: EditLog<HostedGraph<Item>>,
    tags: HostedDataList,
    tagged: HostedDataList,
    notes: Vec<HostId>,
    labels: Vec<HostId>,
}

fn world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = PairingRegistry::new()
        .with(PairingDecl::new(
            TAGGED,
            Endpoint::many(["note"]),
            Endpoint::many(["tag"]),
        ))
        .unwrap();
    let tags = HostedDataList::new(&registry, TAGGED, Role::Driver, "note").unwrap();
    let tagged = HostedDataList::new(&registry, TAGGED, Role::Driven, "tag").unwrap();
    let mut graph = HostedGraph::new(Arc::new(registry));
    let mut log: EditLog<HostedGraph<Item>> = EditLog::default();

    let mut spawn = |graph: &mut HostedGraph<Item>, item: Item| {
        let id = graph.insert(item);
        log.run(BaseEdit::new(ActivateEdit::new(id)), graph).unwrap();
        id
    };
    let notes = (0..3)
        .map(|i| spawn(&mut graph, Item::Note(format!("note {i}"))))
        .collect();
    let labels = (0..3)
        .map(|i| spawn(&mut graph, Item::Tag(format!("tag {i}"))))
        .collect();
    log.clear();

    World {
        graph,
        log,
        tags,
        tagged,
        notes,
        labels,
    }
}

/// Every tag's driven side equals the set of active notes listing it.
fn assert_pairing_invariant(w: &World) {
    for &tag in &w.labels {
        let expected: BTreeSet<HostId> = w
            .notes
            .iter()
            .copied()
            .filter(|&note| w.graph.list(note, &w.tags).contains(&tag))
            .collect();
        let actual: BTreeSet<HostId> = w.graph.list(tag, &w.tagged).into_iter().collect();
        if w.graph.is_active(tag) {
            assert_eq!(actual, expected, "driven side of {tag}");
        } else {
            assert!(actual.is_empty());
        }
    }
    assert!(w.graph.audit().is_empty(), "{:?}", w.graph.audit());
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Add(usize, usize),
    Remove(usize, usize),
    Deactivate(usize),
    Undo,
    Redo,
}

fn perform(w: &mut World, step: Step) {
    let edit = match step {
        Step::Add(n, t) => {
            BaseEdit::new(HostedListEdit::add(w.notes[n], &w.tags, [w.labels[t]]).unwrap())
        }
        Step::Remove(n, t) => {
            BaseEdit::new(HostedListEdit::remove(w.notes[n], &w.tags, [w.labels[t]]).unwrap())
        }
        Step::Deactivate(n) => BaseEdit::new(DeactivateEdit::new(w.notes[n])),
        Step::Undo => {
            w.log.undo(&mut w.graph).unwrap();
            return;
        }
        Step::Redo => {
            w.log.redo(&mut w.graph).unwrap();
            return;
        }
    };
    w.log.run(edit, &mut w.graph).unwrap();
}

#[rstest]
#[case::adds(vec![Step::Add(0, 0), Step::Add(1, 0), Step::Add(0, 1), Step::Add(2, 2)])]
#[case::add_remove(vec![Step::Add(0, 0), Step::Add(1, 0), Step::Remove(0, 0), Step::Add(0, 0)])]
#[case::duplicates(vec![Step::Add(0, 0), Step::Add(0, 0), Step::Remove(0, 1)])]
#[case::undo_redo(vec![Step::Add(0, 0), Step::Add(1, 0), Step::Undo, Step::Undo, Step::Redo, Step::Remove(0, 0)])]
#[case::deactivate_owner(vec![Step::Add(0, 0), Step::Add(1, 0), Step::Deactivate(1), Step::Add(2, 0), Step::Undo, Step::Undo])]
fn pairing_invariant_holds_after_every_step(#[case] steps: Vec<Step>) {
    let mut w = world();
    assert_pairing_invariant(&w);
    for step in steps {
        perform(&mut w, step);
        assert_pairing_invariant(&w);
    }
}

#[test]
fn undoing_everything_restores_empty_relationships() {
    let mut w = world();
    for (n, t) in [(0, 0), (0, 1), (1, 1), (2, 0), (2, 2)] {
        perform(&mut w, Step::Add(n, t));
    }
    perform(&mut w, Step::Remove(2, 0));
    while w.log.undo(&mut w.graph).unwrap() {
        assert_pairing_invariant(&w);
    }
    for &tag in &w.labels {
        assert!(w.graph.list(tag, &w.tagged).is_empty());
    }
}

#[test]
fn defunct_entity_is_isolated_and_comes_back_identical() {
    let mut w = world();
    let note = w.notes[0];
    let tag = w.labels[0];
    perform(&mut w, Step::Add(0, 0));
    let before: *const Item = w.graph.get(note).unwrap();

    perform(&mut w, Step::Deactivate(0));
    assert!(w.graph.get(note).is_none());
    assert!(w.graph.iter().all(|(id, _)| id != note));
    assert!(w.graph.list(tag, &w.tagged).is_empty());
    assert!(w.graph.list(note, &w.tags).is_empty());
    assert_eq!(w.graph.get_any(note), Some(&Item::Note("note 0".into())));

    w.log.undo(&mut w.graph).unwrap();
    let after: *const Item = w.graph.get(note).unwrap();
    assert!(std::ptr::eq(before, after));
    assert_eq!(w.graph.list(tag, &w.tagged), [note]);
    assert_eq!(w.graph.list(note, &w.tags), [tag]);
}

#[test]
fn defunct_partner_disappears_from_owner_lists() {
    let mut w = world();
    perform(&mut w, Step::Add(0, 0));
    perform(&mut w, Step::Add(0, 1));
    let tag = w.labels[0];
    w.log
        .run(BaseEdit::new(DeactivateEdit::new(tag)), &mut w.graph)
        .unwrap();
    assert_eq!(w.graph.list(w.notes[0], &w.tags), [w.labels[1]]);

    w.log.undo(&mut w.graph).unwrap();
    assert_eq!(w.graph.list(w.notes[0], &w.tags), [tag, w.labels[1]]);
}
