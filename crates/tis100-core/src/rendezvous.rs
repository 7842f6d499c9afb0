//! The port handshake protocol: rendezvous between a `READ` node and a
//! `WRITE` neighbor.
//!
//! Only the `READ` side ever attempts completion (spec.md §4.5) — a `WRITE`
//! is entirely passive and is mutated only as a side effect of some
//! neighbor's successful read. That cross-node mutation is why this logic
//! cannot live on [`crate::node::Node`] itself: it needs two disjoint
//! `&mut Node` borrows into the same arena at once, which only
//! [`crate::grid::Grid`] can provide (spec.md §9's arena/split-borrow
//! guidance).

use crate::direction::{Direction, ANY_PROBE_ORDER};
use crate::grid::{Grid, NodeId};
use crate::node::Mode;
use crate::operand::ReadDest;

/// Candidate cardinal directions a `dir` request resolves to, from the
/// perspective of the node holding that request.
///
/// A cardinal direction resolves to itself. `Any` resolves to the fixed
/// probe order [`ANY_PROBE_ORDER`]. `Last` resolves to whatever `last`
/// currently holds, or no candidates at all if `last` is `None` — which
/// stalls the request indefinitely, exactly as spec.md §4.5 requires.
fn candidate_directions(requested: Direction, last: Option<Direction>) -> Vec<Direction> {
    match requested {
        Direction::Up | Direction::Right | Direction::Down | Direction::Left => vec![requested],
        Direction::Any => ANY_PROBE_ORDER.to_vec(),
        Direction::Last => last.into_iter().collect(),
    }
}

/// Whether a writer's (possibly symbolic) direction matches a reader
/// probing from `probe_dir` (i.e. the writer is `reverse(probe_dir)` away
/// from the reader).
///
/// `Any` matches every probe (an undirected write is claimed by whichever
/// neighbor reads it first). `Last` resolves via the writer's own `last`.
fn writer_faces_reader(writer_dir: Direction, writer_last: Option<Direction>, reverse_probe: Direction) -> bool {
    match writer_dir {
        Direction::Any => true,
        Direction::Last => writer_last == Some(reverse_probe),
        cardinal => cardinal == reverse_probe,
    }
}

/// Attempt to complete `reader_id`'s pending `READ`.
///
/// Returns `true` if a rendezvous completed this call (the reader may have
/// transitioned to `Run` or cascaded into `Write`); `false` if no matching
/// neighbor was found and the reader remains blocked in `Read`.
///
/// # Panics
///
/// Panics if `reader_id`'s node is not currently in `Read` mode — this is
/// an internal invariant of [`Grid::step`], never reachable from outside
/// this crate.
pub(crate) fn attempt_read(grid: &mut Grid, reader_id: NodeId, global_cycle: u64) -> bool {
    let Mode::Read { dir, dest, issue_cycle } = grid.node(reader_id).mode else {
        panic!("attempt_read called on a node not in Read mode");
    };
    let reader_last = grid.node(reader_id).last();

    for probe_dir in candidate_directions(dir, reader_last) {
        let Some(writer_id) = grid.node(reader_id).neighbor(probe_dir) else {
            continue;
        };
        // reverse() only fails for Any/Last, and probe_dir is always
        // cardinal here (candidate_directions never yields Any/Last).
        let reverse_probe = probe_dir.reverse().expect("probe direction is cardinal");

        let writer = grid.node(writer_id);
        let Mode::Write { dir: writer_dir, issue_cycle: writer_issue, .. } = writer.mode else {
            continue;
        };
        let dir_matches = writer_faces_reader(writer_dir, writer.last(), reverse_probe);
        let cycle_matches = issue_cycle < writer_issue
            || (issue_cycle == writer_issue && issue_cycle < global_cycle);

        if dir_matches && cycle_matches {
            complete_rendezvous(grid, reader_id, writer_id, probe_dir, reverse_probe, dest, global_cycle);
            return true;
        }
    }
    false
}

/// Apply the effects of a matched rendezvous to both nodes.
///
/// `probe_dir` is the reader's view (the direction from reader toward the
/// writer); `reverse_probe` is the writer's view (toward the reader).
fn complete_rendezvous(
    grid: &mut Grid,
    reader_id: NodeId,
    writer_id: NodeId,
    probe_dir: Direction,
    reverse_probe: Direction,
    dest: ReadDest,
    global_cycle: u64,
) {
    let (reader_requested_any, writer_requested_any, value) = {
        let reader_req = match grid.node(reader_id).mode {
            Mode::Read { dir, .. } => dir,
            _ => unreachable!(),
        };
        let (writer_req, value) = match grid.node(writer_id).mode {
            Mode::Write { dir, value, .. } => (dir, value),
            _ => unreachable!(),
        };
        (reader_req == Direction::Any, writer_req == Direction::Any, value)
    };

    let (reader, writer) = grid.nodes_mut(reader_id, writer_id);

    if reader_requested_any {
        reader.set_last(probe_dir);
    }
    if writer_requested_any {
        writer.set_last(reverse_probe);
    }

    match dest {
        ReadDest::Port(cascade_dir) => {
            // Cascade: the received value is immediately re-issued as a
            // write. pc does not advance this tick; the chained write
            // stamps the current global cycle.
            reader.mode = Mode::Write {
                dir: cascade_dir,
                value,
                issue_cycle: global_cycle,
            };
        }
        ReadDest::AccAdd => {
            reader.acc = crate::limits::saturate(reader.acc + value);
            reader.mode = Mode::Run;
            reader.advance_pc();
        }
        ReadDest::AccSub => {
            reader.acc = crate::limits::saturate(reader.acc - value);
            reader.mode = Mode::Run;
            reader.advance_pc();
        }
        ReadDest::AccMov => {
            reader.acc = crate::limits::saturate(value);
            reader.mode = Mode::Run;
            reader.advance_pc();
        }
        ReadDest::Nil => {
            reader.mode = Mode::Run;
            reader.advance_pc();
        }
    }

    // Writer post-state: pc must advance exactly once across the whole
    // transaction regardless of which neighbor's step() runs first in a
    // tick. A node's `cycle` counts *completed* step() calls, so if the
    // writer already completed its own step this tick, its cycle has
    // already ticked past the reader's (whose own call is not yet
    // complete) — finish it now. Otherwise its own upcoming step() call
    // (still to come this tick) will finish it via `Mode::Pass`.
    if writer.cycle > reader.cycle {
        writer.mode = Mode::Run;
        writer.advance_pc();
    } else {
        writer.mode = Mode::Pass;
    }
}
