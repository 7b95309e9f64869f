//! Discrete Eikonal solve by multi-source Dijkstra over the 8-connected mesh.
//!
//! Crossing from a cell into neighbour `c` costs `edge / speed(c)`, with
//! `edge` 1 for axis neighbours and √2 for diagonals. The heap uses lazy
//! deletion: stale entries for a cell that is already finalized are popped
//! and dropped instead of being decreased in place.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use crate::mesh::MeshState;
use crate::sources::HeatSourceRegistry;

/// `(dx, dy, edge length)` for the 8 neighbours.
const NEIGHBOURS: [(isize, isize, f64); 8] = [
    (-1, -1, SQRT_2),
    (-1, 0, 1.0),
    (-1, 1, SQRT_2),
    (0, -1, 1.0),
    (0, 1, 1.0),
    (1, -1, SQRT_2),
    (1, 0, 1.0),
    (1, 1, SQRT_2),
];

#[derive(Debug, Clone, Copy)]
struct Node {
    index: usize,
    distance: f64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    // Reversed so the max-heap pops the smallest distance.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Outcome of one full Eikonal solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EikonalReport {
    /// Cells finalized with a finite arrival time
    pub reached: usize,
    /// Heap entries discarded because their cell was already final
    pub stale_pops: usize,
}

/// Reusable Dijkstra workspace.
///
/// The heap and the finalized bitmap are kept between calls so repeated
/// solves on the same mesh do not reallocate.
#[derive(Debug, Clone, Default)]
pub struct EikonalSolver {
    heap: BinaryHeap<Node>,
    finalized: Vec<bool>,
}

impl EikonalSolver {
    pub fn new(n: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(n * n),
            finalized: vec![false; n * n],
        }
    }

    /// Recompute the arrival-time field from every registered source.
    pub fn solve(&mut self, mesh: &mut MeshState, sources: &HeatSourceRegistry) -> EikonalReport {
        let n = mesh.n();
        let (dist, speed) = mesh.eikonal_buffers();

        dist.fill(f64::INFINITY);
        self.finalized.clear();
        self.finalized.resize(n * n, false);
        self.heap.clear();

        for s in sources.all() {
            let index = s.y * n + s.x;
            dist[index] = 0.0;
            self.heap.push(Node {
                index,
                distance: 0.0,
            });
        }

        let mut report = EikonalReport {
            reached: 0,
            stale_pops: 0,
        };

        while let Some(Node { index, distance }) = self.heap.pop() {
            if self.finalized[index] {
                report.stale_pops += 1;
                continue;
            }
            self.finalized[index] = true;
            report.reached += 1;

            let x = (index % n) as isize;
            let y = (index / n) as isize;

            for &(dx, dy, edge) in &NEIGHBOURS {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= n as isize || ny >= n as isize {
                    continue;
                }
                let j = ny as usize * n + nx as usize;
                if self.finalized[j] {
                    continue;
                }

                let candidate = distance + edge / speed[j];
                if candidate < dist[j] {
                    dist[j] = candidate;
                    self.heap.push(Node {
                        index: j,
                        distance: candidate,
                    });
                }
            }
        }

        report
    }
}
