//! Nearest-neighbor connections for the web layout.
//!
//! All-pairs distances, O(N^2) per call. Gallery sizes are tens to low
//! hundreds, so no spatial index is used. The resulting graph is not
//! guaranteed to be globally connected; the repair pass only links nodes
//! that would otherwise have no edge at all.

/// Neighbors considered per node when building edges.
const NEAREST_NEIGHBORS: usize = 2;

/// Build the web-mode connection edges for a set of positions.
///
/// Each node is linked toward its nearest neighbors; an edge is kept only
/// in canonical `(lower, higher)` index order, so the result has no
/// self-loops and no duplicates in either direction. Nodes left isolated
/// by the canonical filter are then linked to their single nearest
/// neighbor.
pub fn connections(positions: &[[f64; 3]]) -> Vec<(usize, usize)> {
    let n = positions.len();
    if n < 2 {
        return Vec::new();
    }

    let mut edges: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        for j in nearest(positions, i, NEAREST_NEIGHBORS) {
            if i < j {
                edges.push((i, j));
            }
        }
    }

    // Repair pass: a node whose nearest neighbors all have lower indices
    // can end up with no incident edge. Link each such node to its nearest
    // neighbor; global connectivity is still not guaranteed.
    let mut degree = vec![0usize; n];
    for &(a, b) in &edges {
        degree[a] += 1;
        degree[b] += 1;
    }
    for i in 0..n {
        if degree[i] == 0
            && let Some(&j) = nearest(positions, i, 1).first()
        {
            edges.push((i.min(j), i.max(j)));
            degree[i] += 1;
            degree[j] += 1;
        }
    }

    edges
}

/// Indices of the `count` nearest nodes to `i`, closest first.
fn nearest(positions: &[[f64; 3]], i: usize, count: usize) -> Vec<usize> {
    let mut by_distance: Vec<(usize, f64)> = (0..positions.len())
        .filter(|&j| j != i)
        .map(|j| (j, distance_sq(positions[i], positions[j])))
        .collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_distance.into_iter().take(count).map(|(j, _)| j).collect()
}

fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}
