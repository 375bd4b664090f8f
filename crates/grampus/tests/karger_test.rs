use grampus::graphlib::{Edge, EdgeFlags, Undirected};
use grampus::{
    fast_min_cut, fast_min_cut_par, fast_min_cut_sharded, fast_min_cut_with_target, rand_min_cut,
    rand_min_cut_with_target,
};

// 40-node benchmark graph with a known global minimum cut of weight 3.
// Every edge is listed at both of its nodes; the builder keeps the copy
// where the first id is smaller.
const BENCH: &[(usize, &[usize])] = &[
    (1, &[19, 15, 36, 23, 18, 39]),
    (2, &[36, 23, 4, 18, 26, 9]),
    (3, &[35, 6, 16, 11]),
    (4, &[23, 2, 18, 24]),
    (5, &[14, 8, 29, 21]),
    (6, &[34, 35, 3, 16]),
    (7, &[30, 33, 38, 28]),
    (8, &[12, 14, 5, 29, 31]),
    (9, &[39, 13, 20, 10, 17, 2]),
    (10, &[9, 20, 12, 14, 29]),
    (11, &[3, 16, 30, 33, 26]),
    (12, &[20, 10, 14, 8]),
    (13, &[24, 39, 9, 20]),
    (14, &[10, 12, 8, 5]),
    (15, &[26, 19, 1, 36]),
    (16, &[6, 3, 11, 30, 17, 35, 32]),
    (17, &[38, 28, 32, 40, 9, 16]),
    (18, &[2, 4, 24, 39, 1]),
    (19, &[27, 26, 15, 1]),
    (20, &[13, 9, 10, 12]),
    (21, &[5, 29, 25, 37]),
    (22, &[32, 40, 34, 35]),
    (23, &[1, 36, 2, 4]),
    (24, &[4, 18, 39, 13]),
    (25, &[29, 21, 37, 31]),
    (26, &[31, 27, 19, 15, 11, 2]),
    (27, &[37, 31, 26, 19, 29]),
    (28, &[7, 38, 17, 32]),
    (29, &[8, 5, 21, 25, 10, 27]),
    (30, &[16, 11, 33, 7, 37]),
    (31, &[25, 37, 27, 26, 8]),
    (32, &[28, 17, 40, 22, 16]),
    (33, &[11, 30, 7, 38]),
    (34, &[40, 22, 35, 6]),
    (35, &[22, 34, 6, 3, 16]),
    (36, &[15, 1, 23, 2]),
    (37, &[21, 25, 31, 27, 30]),
    (38, &[33, 7, 28, 17, 40]),
    (39, &[18, 24, 13, 9, 1]),
    (40, &[17, 32, 22, 34, 38]),
];

// Two clusters joined by the single bridge 4--5: minimum cut weight 1.
const BRIDGE: &[(usize, &[usize])] = &[
    (1, &[4]),
    (2, &[3, 4]),
    (3, &[2, 4]),
    (4, &[1, 2, 3, 5]),
    (5, &[4, 6]),
    (6, &[5]),
];

fn create_graph(nodes: &[(usize, &[usize])]) -> Undirected {
    let mut g = Undirected::new();
    for &(id, tails) in nodes {
        let _ = g.add_id(id);
        for &tid in tails {
            let _ = g.add_id(tid);
            if id < tid {
                g.connect(id, tid, 1.0, EdgeFlags::NONE).unwrap();
            }
        }
    }
    g
}

fn rand_trials(g: &Undirected) -> usize {
    let n = g.order() as f64;
    (n * n * n.ln()).ceil() as usize
}

const FAST_TRIALS: usize = 25;

fn assert_unit_cut(g: &Undirected, cut: &[usize], w: f64, expected: f64) {
    assert_eq!(w, expected);
    // With unit weights the edge count equals the cut weight.
    assert_eq!(cut.len(), expected as usize);
    for &eid in cut {
        assert!(g.edge(eid).is_some());
    }
}

#[test]
fn rand_min_cut_finds_known_cuts() {
    for (fixture, expected) in [(BENCH, 3.0), (BRIDGE, 1.0)] {
        let g = create_graph(fixture);
        let (cut, w) = rand_min_cut(&g, rand_trials(&g), 0);
        assert_unit_cut(&g, &cut, w, expected);
    }
}

#[test]
fn fast_min_cut_finds_known_cuts() {
    for (fixture, expected) in [(BENCH, 3.0), (BRIDGE, 1.0)] {
        let g = create_graph(fixture);
        let (cut, w) = fast_min_cut(&g, FAST_TRIALS, 0);
        assert_unit_cut(&g, &cut, w, expected);
    }
}

#[test]
fn fast_min_cut_par_finds_known_cuts() {
    for (fixture, expected) in [(BENCH, 3.0), (BRIDGE, 1.0)] {
        let g = create_graph(fixture);
        let (cut, w) = fast_min_cut_par(&g, FAST_TRIALS, 4, 0);
        assert_unit_cut(&g, &cut, w, expected);
    }
}

#[test]
fn fast_min_cut_sharded_finds_known_cuts() {
    for (fixture, expected) in [(BENCH, 3.0), (BRIDGE, 1.0)] {
        let g = create_graph(fixture);
        let (cut, w) = fast_min_cut_sharded(&g, 32, 4, 0);
        assert_unit_cut(&g, &cut, w, expected);
    }
}

#[test]
fn target_weight_short_circuits_the_drivers() {
    let g = create_graph(BRIDGE);
    let (cut, w) = rand_min_cut_with_target(&g, rand_trials(&g), 1.0, 0);
    assert_unit_cut(&g, &cut, w, 1.0);

    let (cut, w) = fast_min_cut_with_target(&g, FAST_TRIALS, 1.0, 0);
    assert_unit_cut(&g, &cut, w, 1.0);
}

#[test]
fn equal_seeds_give_equal_results() {
    let g = create_graph(BENCH);
    let a = fast_min_cut(&g, 5, 42);
    let b = fast_min_cut(&g, 5, 42);
    assert_eq!(a, b);

    let c = fast_min_cut_sharded(&g, 16, 4, 42);
    let d = fast_min_cut_sharded(&g, 16, 4, 42);
    assert_eq!(c, d);
}

#[test]
fn disconnected_graphs_report_an_empty_cut() {
    let mut g = Undirected::new();
    for _ in 0..6 {
        g.add();
    }
    for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
        g.connect(u, v, 1.0, EdgeFlags::NONE).unwrap();
    }

    let (cut, w) = rand_min_cut(&g, 4, 0);
    assert_eq!(w, 0.0);
    assert!(cut.is_empty());

    let (cut, w) = fast_min_cut(&g, 4, 0);
    assert_eq!(w, 0.0);
    assert!(cut.is_empty());
}

#[test]
fn zero_iterations_find_nothing() {
    let g = create_graph(BRIDGE);
    let (cut, w) = rand_min_cut(&g, 0, 0);
    assert!(cut.is_empty());
    assert_eq!(w, f64::INFINITY);
}

#[test]
fn searches_never_mutate_the_graph() {
    let g = create_graph(BENCH);
    let order = g.order();
    let size = g.size();
    let endpoints: Vec<(usize, usize, usize)> =
        g.edges().map(|e| (e.id(), e.tail(), e.head())).collect();

    let _ = fast_min_cut(&g, 5, 0);
    let _ = fast_min_cut_par(&g, 5, 4, 0);
    let _ = fast_min_cut_sharded(&g, 8, 4, 0);

    assert_eq!(g.order(), order);
    assert_eq!(g.size(), size);
    for (i, n) in g.nodes().enumerate() {
        assert_eq!(n.index(), i);
    }
    let after: Vec<(usize, usize, usize)> =
        g.edges().map(|e| (e.id(), e.tail(), e.head())).collect();
    assert_eq!(after, endpoints);
}

// Contraction skips edges whose endpoints already share a super-node; the
// cut it reports can only contain edges crossing between groups.
#[test]
fn reported_cuts_actually_disconnect_the_graph() {
    let g = create_graph(BRIDGE);
    let (cut, _) = fast_min_cut(&g, FAST_TRIALS, 7);

    let excluded = |e: &Edge| !cut.contains(&e.id());
    assert_eq!(g.connected_components(excluded).len(), 2);
}
