#![forbid(unsafe_code)]

//! Clockwise outline of a block, traced along neighbor slots.

use domino_core::logging::TARGET_BLOCK;
use domino_core::{Direction, Point};

use crate::node::{NodeArena, NodeId};

/// Trace the outline of the connected nodes containing `start`.
///
/// Walks from the topmost-then-leftmost node heading east, keeping the
/// block on the right-hand side and emitting a corner at every turn. The
/// walk stops after `max_steps` moves, so malformed grids still terminate.
pub fn trace_outline(arena: &NodeArena, start: NodeId, max_steps: usize) -> Vec<Point> {
    let mut origin = start;
    for _ in 0..max_steps {
        match arena
            .neighbor(origin, Direction::North)
            .or_else(|| arena.neighbor(origin, Direction::West))
        {
            Some(next) => origin = next,
            None => break,
        }
    }

    let mut points = Vec::new();
    let mut node = origin;
    let mut dir = Direction::East;
    for _ in 0..max_steps {
        if node == origin && dir == Direction::East && !points.is_empty() {
            return points;
        }
        let bounds = arena[node].bounds();
        let Some(next) = arena.neighbor(node, dir) else {
            points.push(bounds.corner(dir));
            dir = dir.rot90();
            continue;
        };
        let turn = dir.opposite().rot90();
        if let Some(up) = arena.neighbor(next, turn) {
            points.push(bounds.corner(dir));
            node = up;
            dir = turn;
            continue;
        }
        let across = dir.axis().opposite();
        let shift = arena[node].location().along(across) - arena[next].location().along(across);
        if shift != 0.0 {
            points.push(bounds.corner(dir));
            points.push(arena[next].bounds().corner(turn));
        }
        node = next;
    }
    domino_core::warn!(
        target: TARGET_BLOCK,
        start = start.get(),
        max_steps,
        corners = points.len(),
        "outline walk hit its step bound"
    );
    points
}
