//! End-to-end scenarios seeding the behavioral test suite.
//!
//! Each test here corresponds to one numbered scenario in the
//! specification this engine implements.

use tis100_core::{Direction, Grid, Mode, Node};

#[test]
fn scenario_1_add_then_save() {
    let mut node = Node::new("add 1\nsav", None);
    step_node_many(&mut node, 2);
    assert_eq!(node.acc, 1);
    assert_eq!(node.bak, 1);
    assert_eq!(node.pc, 0);
}

#[test]
fn scenario_2_two_adds_then_save_six_steps() {
    let mut node = Node::new("add 1\nadd 2\nsav", None);
    step_node_many(&mut node, 6);
    assert_eq!(node.acc, 6);
    assert_eq!(node.bak, 6);
    assert_eq!(node.pc, 0);
}

#[test]
fn scenario_3_add_save_negate() {
    let mut node = Node::new("add 12\nsav\nneg", None);
    step_node_many(&mut node, 3);
    assert_eq!(node.acc, -12);
    assert_eq!(node.bak, 12);
    assert_eq!(node.pc, 0);
}

#[test]
fn scenario_4_mov_literal_to_acc() {
    let mut node = Node::new("mov 12, acc\nnop", None);
    step_node_many(&mut node, 1);
    assert_eq!(node.acc, 12);
    assert_eq!(node.pc, 1);
}

#[test]
fn scenario_5_simple_write_then_read() {
    let mut grid = Grid::new();
    let a = grid.add_node(Node::new("mov 12, right\nnop", Some("a")));
    let b = grid.add_node(Node::new("mov left, acc\nnop", Some("b")));
    grid.connect(a, Direction::Right, b);

    grid.step().unwrap();
    assert_eq!(grid.node(a).mode, Mode::Write { dir: Direction::Right, value: 12, issue_cycle: 0 });
    assert_eq!(grid.node(a).pc, 0);
    assert!(matches!(grid.node(b).mode, Mode::Read { .. }));
    assert_eq!(grid.node(b).pc, 0);

    grid.step().unwrap();
    assert_eq!(grid.node(a).mode, Mode::Run);
    assert_eq!(grid.node(a).pc, 1);
    assert_eq!(grid.node(b).mode, Mode::Run);
    assert_eq!(grid.node(b).pc, 1);
    assert_eq!(grid.node(b).acc, 12);
}

#[test]
fn scenario_6_crossed_wiring_round_trip() {
    let mut grid = Grid::new();
    let a = grid.add_node(Node::new("mov 12, right\nadd right", Some("a")));
    let b = grid.add_node(Node::new("mov left, acc\nmov acc, left", Some("b")));
    grid.connect(a, Direction::Right, b);

    grid.step_many(4).unwrap();

    assert_eq!(grid.node(a).pc, 0);
    assert_eq!(grid.node(b).pc, 0);
    assert_eq!(grid.node(a).acc, 12);
}

#[test]
fn scenario_7_jro_acc_self_loop() {
    let mut node = Node::new("add 3\njro acc\nadd 100\nadd 200\nadd 300", None);
    step_node_many(&mut node, 3);
    assert_eq!(node.acc, 303);
    assert_eq!(node.pc, 0);
}

#[test]
fn scenario_8_label_forms_and_blank_lines() {
    // Label on its own line, label sharing a line with an instruction, and
    // trailing blank lines, should all behave identically.
    let variants = [
        "jmp l\nadd 10\nl:\nadd 5",
        "jmp l\nadd 10\nl: add 5",
        "jmp l\nadd 10\n\nl:\nadd 5\n\n",
    ];
    for source in variants {
        let mut node = Node::new(source, None);
        step_node_many(&mut node, 2);
        assert_eq!(node.acc, 5, "source: {source:?}");
        assert_eq!(node.pc, 0, "source: {source:?}");
        assert_eq!(node.cycle, 2, "source: {source:?}");
    }
}

/// Step a lone, unconnected node `n` times through a single-node grid,
/// mirroring the spec's `run_many`/`step_many` semantics for isolated
/// nodes with no pending `READ`/`WRITE`.
fn step_node_many(node: &mut Node, n: usize) {
    let mut grid = Grid::new();
    let id = grid.add_node(std::mem::replace(node, Node::new("", None)));
    grid.step_many(n).unwrap();
    *node = std::mem::replace(grid.node_mut(id), Node::new("", None));
}
