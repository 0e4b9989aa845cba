use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use almanac_core::OrderedMap;
use almanac_core::edit::{
    ApplyContext, BaseEdit, ContainerEdit, DiffContainer, DiffEntry, EditFlags, EditLog, Editable,
    Locator, MapOp, SeqKey, SeqOp, Sort, Tree, leaves, nested,
};

// ---------------------------------------------------------------------------
// Raw diff application
// ---------------------------------------------------------------------------

fn ctx(flags: EditFlags) -> ApplyContext {
    ApplyContext {
        recursive: true,
        flags,
    }
}

fn sample_map(len: usize) -> OrderedMap<String, i64> {
    (0..len).map(|i| (format!("key{i}"), i as i64)).collect()
}

fn bench_map_add_remove(c: &mut Criterion) {
    let op = MapOp::Add(leaves((0..100).map(|i| (format!("new{i}"), i))));
    c.bench_function("map_add_100_then_inverse", |b| {
        b.iter_batched(
            || sample_map(1_000),
            |mut map| {
                let applied = map.apply_op(&op, &ctx(EditFlags::empty())).unwrap();
                map.apply_op(&applied.inverse, &ctx(EditFlags::empty()))
                    .unwrap();
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_map_sort(c: &mut Criterion) {
    let op: MapOp<String, i64> = MapOp::Sort(Sort::by(|a: &(String, i64), b: &(String, i64)| b.1.cmp(&a.1)));
    c.bench_function("map_sort_1000_then_restore", |b| {
        b.iter_batched(
            || sample_map(1_000),
            |mut map| {
                let applied = map.apply_op(&op, &ctx(EditFlags::empty())).unwrap();
                map.apply_op(&applied.inverse, &ctx(EditFlags::empty()))
                    .unwrap();
                black_box(map)
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_nested_modify(c: &mut Criterion) {
    type Record = Tree<String, i64>;
    let op: MapOp<String, Record> = MapOp::Modify(
        (0..50)
            .map(|d| {
                let entry = nested([("key3".to_string(), DiffEntry::Leaf(Tree::Leaf(-1)))]);
                (format!("day{d}"), entry)
            })
            .collect(),
    );
    c.bench_function("nested_modify_50_days", |b| {
        b.iter_batched(
            || {
                (0..100)
                    .map(|d| {
                        let record = (0..10)
                            .map(|i| (format!("key{i}"), Tree::Leaf(i)))
                            .collect::<OrderedMap<_, _>>();
                        (format!("day{d}"), Tree::Branch(record))
                    })
                    .collect::<OrderedMap<String, Record>>()
            },
            |mut history| black_box(history.apply_op(&op, &ctx(EditFlags::empty())).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_seq_remove_by_value(c: &mut Criterion) {
    let op = SeqOp::remove_values((0..1_000).step_by(10));
    c.bench_function("seq_remove_100_by_value", |b| {
        b.iter_batched(
            || (0..1_000).collect::<Vec<i32>>(),
            |mut list| black_box(list.apply_op(&op, &ctx(EditFlags::FIND_BY_VALUE)).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_seq_move(c: &mut Criterion) {
    let op = SeqOp::Move((0..100).map(|i| (SeqKey::Index(i * 5), 999 - i)).collect());
    c.bench_function("seq_move_100", |b| {
        b.iter_batched(
            || (0..1_000).collect::<Vec<i32>>(),
            |mut list| black_box(list.apply_op(&op, &ctx(EditFlags::empty())).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

// ---------------------------------------------------------------------------
// Undo / redo replay
// ---------------------------------------------------------------------------

struct Board {
    cards: Vec<u32>,
}

impl Editable for Board {}

fn cards() -> Locator<Board, Vec<u32>> {
    Locator::new("cards", |b: &mut Board| Some(&mut b.cards))
}

fn bench_undo_redo_replay(c: &mut Criterion) {
    c.bench_function("log_undo_redo_100_edits", |b| {
        b.iter_batched(
            || {
                let mut log = EditLog::default();
                let mut board = Board { cards: Vec::new() };
                for i in 0..100 {
                    let edit = ContainerEdit::new(cards(), SeqOp::Add(vec![i]));
                    log.run(BaseEdit::new(edit), &mut board).unwrap();
                }
                (log, board)
            },
            |(mut log, mut board)| {
                while log.undo(&mut board).unwrap() {}
                while log.redo(&mut board).unwrap() {}
                black_box(board.cards.len())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    diff_benches,
    bench_map_add_remove,
    bench_map_sort,
    bench_nested_modify,
    bench_seq_remove_by_value,
    bench_seq_move,
);

criterion_group!(log_benches, bench_undo_redo_replay);

criterion_main!(diff_benches, log_benches);
