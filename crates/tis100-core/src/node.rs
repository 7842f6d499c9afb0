//! Node state and the per-node execution engine.
//!
//! A [`Node`] owns its registers, its decoded-on-demand program, and its
//! current [`Mode`]. Everything a single node can do on its own — execute a
//! `RUN`-mode instruction, or complete a `PASS` — lives here. Completing a
//! `READ` requires reaching into a neighbor, which requires the arena-wide
//! view only [`crate::grid::Grid`] has; that half of the protocol lives in
//! [`crate::rendezvous`].

use crate::direction::Direction;
use crate::error::{CoreError, Result};
use crate::grid::NodeId;
use crate::instruction::{decode, Instruction};
use crate::limits::saturate;
use crate::operand::{Operand, ReadDest};
use crate::parser::{self, ParsedProgram};

/// A node's current execution mode.
///
/// Modeled as a tagged variant whose payload differs by tag, per the
/// state-machine re-architecture in spec.md §9, rather than a single
/// sentinel-typed buffer shared across modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decoding and executing instructions from `program[pc]`.
    Run,
    /// Blocked attempting to read from `dir`, with pending effect `dest`.
    /// `dir` may be a cardinal direction, `Any`, or `Last`; resolution
    /// happens at rendezvous time (see [`crate::rendezvous`]).
    Read {
        dir: Direction,
        dest: ReadDest,
        issue_cycle: u64,
    },
    /// Blocked offering `value` toward `dir` for some neighbor's `READ` to
    /// consume. Passive: a node in this mode makes no progress on its own
    /// `step()` call.
    Write {
        dir: Direction,
        value: i32,
        issue_cycle: u64,
    },
    /// A rendezvous completed on this tick via the peer's step call; this
    /// node's own `step()` will transition it to `Run` and advance `pc`.
    /// Exists purely to preserve pc-advancement-exactly-once semantics
    /// regardless of per-tick step ordering.
    Pass,
}

/// One compute node: registers, program, and adjacency.
#[derive(Debug, Clone)]
pub struct Node {
    /// Accumulator register, always within `[-999, 999]`.
    pub acc: i32,
    /// Backup register, always within `[-999, 999]`.
    pub bak: i32,
    /// Index into `program` of the instruction about to execute in `Run`
    /// mode. Never rests on a blank/label-only slot.
    pub pc: usize,
    /// Current execution mode.
    pub mode: Mode,
    /// Count of completed `step()` calls on this node.
    pub cycle: u64,

    name: String,
    last: Option<Direction>,
    neighbors: [Option<NodeId>; 4],
    program: ParsedProgram,
}

/// Index order backing [`Node::neighbors`], matching the cardinal subset
/// of [`Direction`].
const CARDINALS: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

fn cardinal_index(dir: Direction) -> Option<usize> {
    CARDINALS.iter().position(|&d| d == dir)
}

impl Node {
    /// Parse `program_text` and construct a node ready to run from its
    /// first non-blank instruction slot, in `Run` mode.
    #[must_use]
    pub fn new(program_text: &str, name: Option<&str>) -> Self {
        let program = parser::parse(program_text);
        let pc = first_non_blank(&program);
        Node {
            acc: 0,
            bak: 0,
            pc,
            mode: Mode::Run,
            cycle: 0,
            name: name.map_or_else(|| "node".to_string(), str::to_string),
            last: None,
            neighbors: [None; 4],
            program,
        }
    }

    /// This node's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set (or clear) the neighbor reachable by going up.
    pub fn set_up(&mut self, id: Option<NodeId>) {
        self.neighbors[cardinal_index(Direction::Up).unwrap()] = id;
    }

    /// Set (or clear) the neighbor reachable by going right.
    pub fn set_right(&mut self, id: Option<NodeId>) {
        self.neighbors[cardinal_index(Direction::Right).unwrap()] = id;
    }

    /// Set (or clear) the neighbor reachable by going down.
    pub fn set_down(&mut self, id: Option<NodeId>) {
        self.neighbors[cardinal_index(Direction::Down).unwrap()] = id;
    }

    /// Set (or clear) the neighbor reachable by going left.
    pub fn set_left(&mut self, id: Option<NodeId>) {
        self.neighbors[cardinal_index(Direction::Left).unwrap()] = id;
    }

    /// The neighbor in a cardinal direction, or `None` if unset or if
    /// `dir` is not cardinal.
    #[must_use]
    pub(crate) fn neighbor(&self, dir: Direction) -> Option<NodeId> {
        cardinal_index(dir).and_then(|i| self.neighbors[i])
    }

    /// The direction most recently resolved by an `Any` operation on this
    /// node, if one ever has.
    #[must_use]
    pub fn last(&self) -> Option<Direction> {
        self.last
    }

    pub(crate) fn set_last(&mut self, dir: Direction) {
        self.last = Some(dir);
    }

    fn has_instructions(&self) -> bool {
        self.program.slots.iter().any(|s| !s.is_empty())
    }

    /// Advance `pc` by one slot, wrapping and skipping blank/label-only
    /// slots. A no-op if the program has no executable slots.
    pub(crate) fn advance_pc(&mut self) {
        if !self.has_instructions() {
            return;
        }
        let len = self.program.slots.len();
        let mut pc = (self.pc + 1) % len;
        while self.program.is_blank(pc) {
            pc = (pc + 1) % len;
        }
        self.pc = pc;
    }

    /// Land `pc` on `target` (already wrapped into range by the caller, or
    /// not — this normalizes), skipping forward over any blank/label-only
    /// slots, without the auto-increment `advance_pc` performs. Used by
    /// jumps and `JRO`.
    pub(crate) fn land_pc(&mut self, target: usize) {
        if !self.has_instructions() {
            return;
        }
        let len = self.program.slots.len();
        let mut pc = target % len;
        while self.program.is_blank(pc) {
            pc = (pc + 1) % len;
        }
        self.pc = pc;
    }

    /// A rendezvous completed on this node's behalf by a neighbor's `step`
    /// call while this node had not yet stepped this tick. This node's own
    /// `step()` finishes the transaction: `Run`, advance `pc`.
    pub(crate) fn complete_pass(&mut self) {
        self.mode = Mode::Run;
        self.advance_pc();
    }

    fn enter_write(&mut self, dir: Direction, value: i32, global_cycle: u64) {
        self.mode = Mode::Write {
            dir,
            value: saturate(value),
            issue_cycle: global_cycle,
        };
    }

    fn enter_read(&mut self, dir: Direction, dest: ReadDest, global_cycle: u64) {
        self.mode = Mode::Read {
            dir,
            dest,
            issue_cycle: global_cycle,
        };
    }

    /// Decode and execute the instruction at `pc`, in `Run` mode.
    ///
    /// May mutate registers, advance `pc`, or transition into `Read`/
    /// `Write`. A no-op if the program has no executable slots.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError`] from decode or from an unresolved label
    /// reference. Decode always precedes mutation, so no partial state is
    /// left behind when an error is raised.
    pub(crate) fn execute_run(&mut self, global_cycle: u64) -> Result<()> {
        if !self.has_instructions() {
            return Ok(());
        }
        let text = self.program.slots[self.pc].clone();
        let instr = decode(&text)?;
        log::trace!("{}: pc={} executing {:?}", self.name, self.pc, instr);

        match instr {
            Instruction::Nop => self.advance_pc(),
            Instruction::Mov { src, dst } => self.exec_mov(src, dst, global_cycle),
            Instruction::Add(operand) => self.exec_add(operand, global_cycle),
            Instruction::Sub(operand) => self.exec_sub(operand, global_cycle),
            Instruction::Neg => {
                self.acc = -self.acc;
                self.advance_pc();
            }
            Instruction::Sav => {
                self.bak = self.acc;
                self.advance_pc();
            }
            Instruction::Swp => {
                std::mem::swap(&mut self.acc, &mut self.bak);
                self.advance_pc();
            }
            Instruction::Jmp(label) => self.exec_jump(&label)?,
            Instruction::Jez(label) => self.exec_conditional_jump(&label, self.acc == 0)?,
            Instruction::Jnz(label) => self.exec_conditional_jump(&label, self.acc != 0)?,
            Instruction::Jgz(label) => self.exec_conditional_jump(&label, self.acc > 0)?,
            Instruction::Jlz(label) => self.exec_conditional_jump(&label, self.acc < 0)?,
            Instruction::Jro(operand) => self.exec_jro(operand),
        }
        Ok(())
    }

    fn exec_mov(&mut self, src: Operand, dst: Operand, global_cycle: u64) {
        match (src, dst) {
            (Operand::Literal(_), Operand::Nil)
            | (Operand::Acc, Operand::Nil)
            | (Operand::Acc, Operand::Acc) => self.advance_pc(),
            (Operand::Literal(v), Operand::Acc) => {
                self.acc = saturate(v);
                self.advance_pc();
            }
            (Operand::Literal(v), Operand::Port(dir)) => self.enter_write(dir, v, global_cycle),
            (Operand::Acc, Operand::Port(dir)) => {
                let value = self.acc;
                self.enter_write(dir, value, global_cycle);
            }
            (Operand::Port(dir), Operand::Acc) => self.enter_read(dir, ReadDest::AccMov, global_cycle),
            (Operand::Port(dir), Operand::Nil) => self.enter_read(dir, ReadDest::Nil, global_cycle),
            (Operand::Port(dir), Operand::Port(dst_dir)) => {
                self.enter_read(dir, ReadDest::Port(dst_dir), global_cycle);
            }
            // decode() only ever produces the shapes matched above for Mov.
            (Operand::Nil, _) | (_, Operand::Literal(_)) => {
                unreachable!("decode() rejects this Mov operand shape")
            }
        }
    }

    fn exec_add(&mut self, operand: Operand, global_cycle: u64) {
        match operand {
            Operand::Literal(v) => {
                self.acc = saturate(self.acc + v);
                self.advance_pc();
            }
            Operand::Acc => {
                self.acc = saturate(self.acc + self.acc);
                self.advance_pc();
            }
            Operand::Port(dir) => self.enter_read(dir, ReadDest::AccAdd, global_cycle),
            Operand::Nil => unreachable!("decode() turns ADD NIL into Nop"),
        }
    }

    fn exec_sub(&mut self, operand: Operand, global_cycle: u64) {
        match operand {
            Operand::Literal(v) => {
                self.acc = saturate(self.acc - v);
                self.advance_pc();
            }
            Operand::Acc => {
                self.acc = saturate(self.acc - self.acc);
                self.advance_pc();
            }
            Operand::Port(dir) => self.enter_read(dir, ReadDest::AccSub, global_cycle),
            Operand::Nil => unreachable!("decode() rejects SUB NIL"),
        }
    }

    fn exec_jump(&mut self, label: &str) -> Result<()> {
        let target = *self
            .program
            .labels
            .get(label)
            .ok_or_else(|| CoreError::UnknownLabel(label.to_string()))?;
        self.land_pc(target);
        Ok(())
    }

    fn exec_conditional_jump(&mut self, label: &str, taken: bool) -> Result<()> {
        if taken {
            self.exec_jump(label)
        } else {
            self.advance_pc();
            Ok(())
        }
    }

    fn exec_jro(&mut self, operand: Operand) {
        let offset = match operand {
            Operand::Literal(v) => v,
            Operand::Acc => self.acc,
            Operand::Port(_) | Operand::Nil => unreachable!("decode() rejects this JRO operand"),
        };
        let len = self.program.slots.len() as i64;
        let target = (self.pc as i64 + i64::from(offset)).rem_euclid(len) as usize;
        self.land_pc(target);
    }
}

fn first_non_blank(program: &ParsedProgram) -> usize {
    if program.slots.is_empty() || program.slots.iter().all(|s| s.is_empty()) {
        return 0;
    }
    let mut pc = 0;
    while program.is_blank(pc) {
        pc += 1;
    }
    pc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(node: &mut Node, n: usize) {
        for cycle in 0..n as u64 {
            node.cycle = cycle;
            node.execute_run(cycle).unwrap();
        }
    }

    #[test]
    fn add_then_save() {
        let mut node = Node::new("add 1\nsav", None);
        run(&mut node, 2);
        assert_eq!(node.acc, 1);
        assert_eq!(node.bak, 1);
        assert_eq!(node.pc, 0);
    }

    #[test]
    fn swp_round_trip() {
        let mut node = Node::new("add 1\nsav\nadd 3\nswp\nswp", None);
        run(&mut node, 5);
        assert_eq!(node.acc, 1);
        assert_eq!(node.bak, 4);
    }

    #[test]
    fn jro_self_relative_loop() {
        // add 3; jro acc; add 100; add 200; add 300
        let mut node = Node::new("add 3\njro acc\nadd 100\nadd 200\nadd 300", None);
        run(&mut node, 3);
        assert_eq!(node.acc, 303);
        assert_eq!(node.pc, 0);
    }

    #[test]
    fn jmp_lands_on_next_non_blank_slot() {
        let mut node = Node::new("jmp l\nadd 10\nl:\nadd 5", None);
        run(&mut node, 2);
        assert_eq!(node.acc, 5);
        assert_eq!(node.pc, 0);
        assert_eq!(node.cycle, 1);
    }

    #[test]
    fn initial_pc_skips_leading_label_only_slot() {
        let node = Node::new("l:\nadd 1", None);
        assert_eq!(node.pc, 1);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let mut node = Node::new("jmp nowhere", None);
        assert!(node.execute_run(0).is_err());
    }

    #[test]
    fn illegal_instruction_is_an_error_and_does_not_mutate() {
        let mut node = Node::new("frobnicate acc", None);
        let acc_before = node.acc;
        assert!(node.execute_run(0).is_err());
        assert_eq!(node.acc, acc_before);
    }
}
