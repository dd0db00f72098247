//! Point adjacency for graph-connected centerlines.
//!
//! Provides the undirected neighbour lists of a centerline and the rooted
//! tree derived from them. Rooting the graph is where cycles and
//! disconnected points are detected.

use std::collections::VecDeque;

use centerline_types::{CenterlineError, CenterlineResult};
use hashbrown::HashSet;
use tracing::{debug, warn};

/// Undirected adjacency of centerline points.
///
/// Neighbour lists are sorted by point index, so every traversal built on
/// top of the graph is deterministic.
#[derive(Debug, Clone)]
pub struct CenterlineGraph {
    /// Neighbour indices per point, ascending.
    neighbors: Vec<Vec<usize>>,
    /// Number of distinct edges.
    edge_count: usize,
}

impl CenterlineGraph {
    /// Build adjacency from a list of edges.
    ///
    /// Duplicate edges (in either direction) are kept once.
    ///
    /// # Errors
    ///
    /// Returns [`CenterlineError::MalformedCenterline`] if an edge refers to a
    /// point at or beyond `point_count`, or joins a point to itself.
    ///
    /// # Example
    ///
    /// ```
    /// use centerline_route::CenterlineGraph;
    ///
    /// let graph = CenterlineGraph::build(4, [[0, 1], [1, 2], [1, 3], [2, 1]]).unwrap();
    ///
    /// assert_eq!(graph.edge_count(), 3);
    /// assert_eq!(graph.neighbors(1), &[0, 2, 3]);
    /// assert!(CenterlineGraph::build(2, [[0, 5]]).is_err());
    /// ```
    pub fn build(
        point_count: usize,
        edges: impl IntoIterator<Item = [usize; 2]>,
    ) -> CenterlineResult<Self> {
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); point_count];
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut duplicates = 0usize;

        for [a, b] in edges {
            if a >= point_count || b >= point_count {
                return Err(CenterlineError::malformed(format!(
                    "edge ({a}, {b}) refers to a point outside 0..{point_count}"
                )));
            }
            if a == b {
                return Err(CenterlineError::malformed(format!(
                    "edge ({a}, {b}) connects a point to itself"
                )));
            }
            if !seen.insert(normalize_edge(a, b)) {
                duplicates += 1;
                continue;
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }

        if duplicates > 0 {
            warn!(duplicates, "Ignoring duplicate centerline edges");
        }

        for list in &mut neighbors {
            list.sort_unstable();
        }

        Ok(Self {
            neighbors,
            edge_count: seen.len(),
        })
    }

    /// Build adjacency for a plain polyline: point `i` joins point `i + 1`.
    #[must_use]
    pub fn sequential(point_count: usize) -> Self {
        let neighbors = (0..point_count)
            .map(|i| {
                let previous = i.checked_sub(1);
                let next = Some(i + 1).filter(|&j| j < point_count);
                previous.into_iter().chain(next).collect()
            })
            .collect();

        Self {
            neighbors,
            edge_count: point_count.saturating_sub(1),
        }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns the number of distinct edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns the neighbours of a point, or an empty slice if it does not
    /// exist.
    #[must_use]
    pub fn neighbors(&self, point: usize) -> &[usize] {
        self.neighbors.get(point).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of neighbours of a point.
    #[must_use]
    pub fn degree(&self, point: usize) -> usize {
        self.neighbors(point).len()
    }

    /// Iterates over every edge once, as `(low, high)` index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors.iter().enumerate().flat_map(|(a, list)| {
            list.iter()
                .copied()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }

    /// Roots the graph at `root` with a breadth-first walk.
    ///
    /// # Errors
    ///
    /// - [`CenterlineError::InvalidConfig`] if `root` is not a point.
    /// - [`CenterlineError::MalformedCenterline`] if the graph contains a
    ///   cycle or points that cannot be reached from `root`.
    pub fn root_at(&self, root: usize) -> CenterlineResult<RootedTree> {
        let n = self.point_count();
        if root >= n {
            return Err(CenterlineError::invalid_config(format!(
                "root index {root} is outside 0..{n}"
            )));
        }

        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut order = Vec::with_capacity(n);
        let mut queue = VecDeque::from([root]);
        visited[root] = true;

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &next in self.neighbors(current) {
                if parent[current] == Some(next) {
                    continue;
                }
                if visited[next] {
                    return Err(CenterlineError::malformed(format!(
                        "cycle detected: edge ({current}, {next}) closes a loop"
                    )));
                }
                visited[next] = true;
                parent[next] = Some(current);
                children[current].push(next);
                queue.push_back(next);
            }
        }

        if let Some(unreached) = visited.iter().position(|&v| !v) {
            return Err(CenterlineError::malformed(format!(
                "disconnected centerline: point {unreached} is not reachable from root {root} \
                 ({} of {n} points reached)",
                order.len()
            )));
        }

        debug!(root, points = n, edges = self.edge_count, "Rooted centerline graph");

        Ok(RootedTree {
            root,
            parent,
            children,
            order,
        })
    }
}

/// A centerline graph with a chosen root.
#[derive(Debug, Clone)]
pub struct RootedTree {
    root: usize,
    parent: Vec<Option<usize>>,
    /// Children per point, ascending.
    children: Vec<Vec<usize>>,
    /// Breadth-first visiting order, root first.
    order: Vec<usize>,
}

impl RootedTree {
    /// Returns the root point.
    #[must_use]
    pub const fn root(&self) -> usize {
        self.root
    }

    /// Returns the parent of a point (`None` for the root).
    #[must_use]
    pub fn parent(&self, point: usize) -> Option<usize> {
        self.parent.get(point).copied().flatten()
    }

    /// Returns the children of a point.
    #[must_use]
    pub fn children(&self, point: usize) -> &[usize] {
        self.children.get(point).map_or(&[], Vec::as_slice)
    }

    /// Returns the points in breadth-first order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns `true` if the point splits into more than one child.
    #[must_use]
    pub fn is_bifurcation(&self, point: usize) -> bool {
        self.children(point).len() > 1
    }

    /// Counts bifurcation events: every child beyond the first at each point.
    ///
    /// A trifurcation counts twice. Branch decomposition produces exactly one
    /// more branch than this count.
    #[must_use]
    pub fn bifurcation_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.len().saturating_sub(1))
            .sum()
    }

    /// Number of points in the subtree below each point, including itself.
    #[must_use]
    pub fn subtree_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![1usize; self.parent.len()];
        for &point in self.order.iter().rev() {
            if let Some(parent) = self.parent[point] {
                sizes[parent] += sizes[point];
            }
        }
        sizes
    }
}

/// Normalize edge direction so that the smaller index comes first.
#[inline]
const fn normalize_edge(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}
