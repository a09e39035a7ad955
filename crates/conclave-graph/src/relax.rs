//! Cosmetic force relaxation — optional, deterministic
//!
//! A fixed-iteration pairwise repulsion pass callers may layer on top of
//! the projection for visual settling motion. It is never applied inside
//! [`crate::project`]; correctness tests run against the raw placement.
//! Determinism holds here too: the pass is seeded only by node order and
//! coordinates, no randomness.

use crate::model::GraphNode;

/// Nodes closer than this (center distance) repel.
pub const MIN_SEPARATION: f64 = 140.0;
/// Fraction of the overlap corrected per iteration.
const STEP: f64 = 0.35;

/// Run `iterations` repulsion passes over the node list in place.
pub fn relax(nodes: &mut [GraphNode], iterations: usize) {
    for _ in 0..iterations {
        let mut shift = vec![(0.0f64, 0.0f64); nodes.len()];

        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= MIN_SEPARATION {
                    continue;
                }
                // Exactly coincident nodes separate along x, lower index
                // pushed left, so the result stays order-stable.
                let (ux, uy) = if dist > 0.0 {
                    (dx / dist, dy / dist)
                } else {
                    (1.0, 0.0)
                };
                let push = (MIN_SEPARATION - dist) * STEP / 2.0;
                shift[i].0 -= ux * push;
                shift[i].1 -= uy * push;
                shift[j].0 += ux * push;
                shift[j].1 += uy * push;
            }
        }

        for (node, (dx, dy)) in nodes.iter_mut().zip(shift) {
            node.x += dx;
            node.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64, y: f64) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            agent_id: None,
            text: String::new(),
            x,
            y,
            color: "#000000".to_string(),
            phase: None,
            is_streaming: false,
        }
    }

    #[test]
    fn coincident_nodes_separate() {
        let mut nodes = vec![node("a", 100.0, 100.0), node("b", 100.0, 100.0)];
        relax(&mut nodes, 10);
        assert!(nodes[0].x < nodes[1].x);
    }

    #[test]
    fn relax_is_deterministic() {
        let mut a = vec![node("a", 0.0, 0.0), node("b", 50.0, 0.0), node("c", 10.0, 30.0)];
        let mut b = a.clone();
        relax(&mut a, 25);
        relax(&mut b, 25);
        assert_eq!(a, b);
    }

    #[test]
    fn distant_nodes_do_not_move() {
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 1000.0, 0.0)];
        relax(&mut nodes, 5);
        assert_eq!(nodes[0].x, 0.0);
        assert_eq!(nodes[1].x, 1000.0);
    }
}
