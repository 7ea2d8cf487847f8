//! Breadth-first route finding over a transform graph.

use backdate_types::{Edge, Route, Version};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Finds the shortest chain of versions from `start` to `end` over `edges`.
///
/// Edges are explored per node in the order they are supplied, and nodes in
/// FIFO order, so a version's predecessor is fixed the first time it is
/// discovered. Among several shortest routes the one whose first diverging
/// edge was supplied earlier wins, which makes the result reproducible for a
/// fixed registration order.
///
/// `start == end` yields the one-node route without consulting `edges`.
pub fn find_route<'a>(
    edges: impl IntoIterator<Item = &'a Edge>,
    start: &'a Version,
    end: &'a Version,
) -> Option<Route> {
    if start == end {
        return Some(Route::trivial(start.clone()));
    }

    let mut next_nodes: HashMap<&Version, Vec<&Version>> = HashMap::new();
    for edge in edges {
        next_nodes.entry(&edge.from).or_default().push(&edge.to);
    }

    let mut queue = VecDeque::from([start]);
    let mut discovered_from: HashMap<&Version, &Version> = HashMap::new();

    while let Some(node) = queue.pop_front() {
        if node == end {
            return reconstruct(&discovered_from, start, end);
        }

        for &next in next_nodes.get(node).into_iter().flatten() {
            if next != start && !discovered_from.contains_key(next) {
                trace!(from = %node, to = %next, "discovered version");
                discovered_from.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    trace!(%start, %end, explored = discovered_from.len(), "no route");
    None
}

fn reconstruct<'a>(
    discovered_from: &HashMap<&'a Version, &'a Version>,
    start: &'a Version,
    end: &'a Version,
) -> Option<Route> {
    let mut path = vec![end.clone()];
    let mut cursor = end;
    while cursor != start {
        cursor = *discovered_from.get(cursor)?;
        path.push(cursor.clone());
    }
    path.reverse();
    Route::from_versions(path)
}
