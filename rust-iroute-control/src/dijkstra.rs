//! Per-source next-hop Dijkstra over the weight matrix.

use rust_iroute_common::types::{AdjMatrix, NodeId};
use rust_iroute_common::{Error, Result};

/// Distance bound for unreached nodes. Large and finite; weights are small
/// positive integers, so this can never be produced by a real path.
const MAX_DISTANCE: i64 = i64::MAX / 4;

/// Compute, for every destination reachable from `source`, the next-hop
/// node on a shortest path from `source`.
///
/// `next[d]` is `None` for the source itself and for unreachable
/// destinations. Absent edges (`NO_LINK`) are excluded from relaxation.
/// Ties between equal-cost paths keep the first-discovered hop; both scans
/// run in ascending node-id order, so the lowest-numbered candidate wins
/// deterministically.
pub fn next_hops(adj: &AdjMatrix, source: NodeId) -> Result<Vec<Option<NodeId>>> {
    let n = adj.node_count();
    if n == 0 {
        return Err(Error::RouteComputation("adjacency matrix is empty".into()));
    }
    if !adj.is_square() {
        return Err(Error::RouteComputation(
            "adjacency matrix is not square".into(),
        ));
    }
    if source >= n {
        return Err(Error::RouteComputation(format!(
            "source {source} out of range [0, {n})"
        )));
    }

    let mut next: Vec<Option<NodeId>> = vec![None; n];
    let mut distance: Vec<i64> = vec![MAX_DISTANCE; n];
    let mut settled: Vec<bool> = vec![false; n];
    distance[source] = 0;
    settled[source] = true;

    let mut cursor = source;
    for _ in 0..n.saturating_sub(1) {
        relax_neighbors(adj, source, cursor, &mut distance, &mut next, &settled);

        // Settle the closest unsettled node.
        let mut closest: Option<NodeId> = None;
        let mut min = MAX_DISTANCE;
        for j in 0..n {
            if !settled[j] && distance[j] < min {
                min = distance[j];
                closest = Some(j);
            }
        }
        match closest {
            Some(j) => {
                settled[j] = true;
                cursor = j;
            }
            // Everything still unsettled is unreachable.
            None => break,
        }
    }

    Ok(next)
}

/// Relax every edge out of `v`. The next hop of a newly-improved node is
/// the node itself when `v` is the source, otherwise it inherits `v`'s next
/// hop: both lie on the same shortest path out of the source.
fn relax_neighbors(
    adj: &AdjMatrix,
    source: NodeId,
    v: NodeId,
    distance: &mut [i64],
    next: &mut [Option<NodeId>],
    settled: &[bool],
) {
    for i in 0..adj.node_count() {
        if !adj.has_edge(v, i) || settled[i] {
            continue;
        }
        let candidate = distance[v] + i64::from(adj.weight(v, i));
        if candidate < distance[i] {
            distance[i] = candidate;
            next[i] = if v == source { Some(i) } else { next[v] };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_iroute_common::types::NO_LINK;

    fn diamond() -> AdjMatrix {
        // 0-1 (1), 0-2 (1), 1-3 (2), 2-3 (1)
        let mut adj = AdjMatrix::unconnected(4);
        adj.set_symmetric(0, 1, 1);
        adj.set_symmetric(0, 2, 1);
        adj.set_symmetric(1, 3, 2);
        adj.set_symmetric(2, 3, 1);
        adj
    }

    /// Follow next hops from `from` toward `source`'s tree until reaching
    /// `dest`, accumulating path cost. Panics after n steps (cycle).
    fn path_cost(adj: &AdjMatrix, source: NodeId, dest: NodeId) -> i64 {
        let n = adj.node_count();
        let mut cost = 0;
        let mut at = source;
        for _ in 0..n {
            if at == dest {
                return cost;
            }
            let hops = next_hops(adj, at).unwrap();
            let hop = hops[dest].expect("destination must stay reachable");
            assert!(adj.has_edge(at, hop), "next hop must use a present edge");
            cost += i64::from(adj.weight(at, hop));
            at = hop;
        }
        panic!("next hops formed a cycle");
    }

    #[test]
    fn diamond_next_hops() {
        let adj = diamond();
        let hops = next_hops(&adj, 0).unwrap();

        assert_eq!(hops[0], None);
        assert_eq!(hops[1], Some(1));
        assert_eq!(hops[2], Some(2));
        // 0->2->3 costs 2, cheaper than 0->1->3 at 3.
        assert_eq!(hops[3], Some(2));
        assert_eq!(path_cost(&adj, 0, 3), 2);
    }

    #[test]
    fn equal_cost_tie_total_cost_is_stable() {
        // Make both branches cost 3: 0-1 (1), 1-3 (2) and 0-2 (2), 2-3 (1).
        let mut adj = AdjMatrix::unconnected(4);
        adj.set_symmetric(0, 1, 1);
        adj.set_symmetric(0, 2, 2);
        adj.set_symmetric(1, 3, 2);
        adj.set_symmetric(2, 3, 1);

        let hops = next_hops(&adj, 0).unwrap();
        let via = hops[3].unwrap();
        assert!(via == 1 || via == 2);
        // The policy choice may pick either branch, the cost may not vary.
        assert_eq!(path_cost(&adj, 0, 3), 3);
    }

    #[test]
    fn next_hops_follow_to_source_without_cycles() {
        let adj = diamond();
        for source in 0..4 {
            for dest in 0..4 {
                if source == dest {
                    continue;
                }
                // path_cost panics on a cycle or a missing edge.
                assert!(path_cost(&adj, source, dest) > 0);
            }
        }
    }

    #[test]
    fn unreachable_destination_is_none() {
        let mut adj = AdjMatrix::unconnected(4);
        adj.set_symmetric(0, 1, 1);
        // Nodes 2 and 3 form a separate component.
        adj.set_symmetric(2, 3, 1);

        let hops = next_hops(&adj, 0).unwrap();
        assert_eq!(hops[1], Some(1));
        assert_eq!(hops[2], None);
        assert_eq!(hops[3], None);
    }

    #[test]
    fn asymmetric_weights_are_respected() {
        let mut adj = AdjMatrix::unconnected(3);
        // 0 -> 1 cheap one way, expensive the other; 0 -> 2 -> 1 in between.
        adj.set_weight(0, 1, 10);
        adj.set_weight(1, 0, 1);
        adj.set_symmetric(0, 2, 1);
        adj.set_symmetric(2, 1, 2);

        let hops = next_hops(&adj, 0).unwrap();
        assert_eq!(hops[1], Some(2));

        let back = next_hops(&adj, 1).unwrap();
        assert_eq!(back[0], Some(0));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(next_hops(&AdjMatrix::unconnected(0), 0).is_err());

        let ragged = AdjMatrix::from_rows(vec![vec![NO_LINK, 1], vec![1]]);
        assert!(next_hops(&ragged, 0).is_err());

        let adj = diamond();
        assert!(next_hops(&adj, 4).is_err());
    }
}
