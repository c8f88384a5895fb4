//! Turn-by-turn instructions derived from a node path.

use serde::Serialize;

use super::models::Node;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Step {
    Planar(i32, i32),
    Level(i32),
}

fn movement_dir(from: Node, to: Node) -> Option<Step> {
    if from.level != to.level {
        return Some(Step::Level(to.level));
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0 && dy == 0 {
        None
    } else {
        Some(Step::Planar(dx.signum(), dy.signum()))
    }
}

/// Indices of the path nodes where the direction of travel changes, always
/// including the first and last node.
pub fn breakpoint_indices(path: &[Node]) -> Vec<usize> {
    match path.len() {
        0 => Vec::new(),
        1 => vec![0],
        n => {
            let mut out = Vec::with_capacity(n);
            out.push(0);
            for (i, window) in path.windows(3).enumerate() {
                let dir_in = movement_dir(window[0], window[1]);
                let dir_out = movement_dir(window[1], window[2]);
                let level_hop = matches!(dir_in, Some(Step::Level(_))) || matches!(dir_out, Some(Step::Level(_)));
                if dir_in != dir_out || level_hop {
                    out.push(i + 1);
                }
            }
            if out.last() != Some(&(n - 1)) {
                out.push(n - 1);
            }
            out
        }
    }
}

/// Path reduced to its breakpoints.
pub fn breakpoints(path: &[Node]) -> Vec<Node> {
    breakpoint_indices(path).into_iter().map(|i| path[i]).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Depart,
    Continue,
    TurnLeft,
    TurnRight,
    UTurn,
    ChangeLevel { to_level: i32 },
    Arrive,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instruction {
    #[serde(flatten)]
    pub action: Action,
    pub at: Node,
    /// Distance to the next instruction.
    pub distance: f64,
}

fn turn(dir_in: Option<Step>, dir_out: Option<Step>) -> Action {
    match (dir_in, dir_out) {
        (_, Some(Step::Level(to_level))) => Action::ChangeLevel { to_level },
        (Some(Step::Planar(ix, iy)), Some(Step::Planar(ox, oy))) => {
            let cross = ix * oy - iy * ox;
            let dot = ix * ox + iy * oy;
            if cross > 0 {
                Action::TurnLeft
            } else if cross < 0 {
                Action::TurnRight
            } else if dot < 0 {
                Action::UTurn
            } else {
                Action::Continue
            }
        }
        _ => Action::Continue,
    }
}

/// Builds instructions for `path`; `weight` gives the length of each hop.
pub fn instructions(path: &[Node], weight: impl Fn(Node, Node) -> f64) -> Vec<Instruction> {
    let idx = breakpoint_indices(path);
    if idx.is_empty() {
        return Vec::new();
    }
    let span = |from: usize, to: usize| -> f64 { path[from..=to].windows(2).map(|w| weight(w[0], w[1])).sum() };

    let mut out = Vec::with_capacity(idx.len() + 1);
    for (n, &i) in idx.iter().enumerate() {
        let next = idx.get(n + 1).copied();
        let action = if n == 0 {
            Action::Depart
        } else if next.is_none() {
            Action::Arrive
        } else {
            turn(movement_dir(path[i - 1], path[i]), movement_dir(path[i], path[i + 1]))
        };
        let distance = next.map(|j| span(i, j)).unwrap_or(0.0);
        out.push(Instruction { action, at: path[i], distance });
    }
    if idx.len() == 1 {
        out.push(Instruction { action: Action::Arrive, at: path[0], distance: 0.0 });
    }
    out
}
