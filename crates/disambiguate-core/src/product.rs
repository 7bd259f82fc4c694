use crate::fst::Fst;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Self-product graph: nodes are state pairs `(p, q)`, edges carry the
/// shared label.
type ProductGraph = DiGraph<(u32, u32), u32>;

/// Pairs of original states that are reachable on a common prefix and can
/// both reach acceptance on a common suffix.
///
/// Computed once from the self-product of the input and immutable
/// afterwards. The product graph itself does not outlive [`CommonFutures::compute`].
#[derive(Debug, Default)]
pub struct CommonFutures {
    /// Normalized `(min, max)` pairs.
    pairs: FxHashSet<(u32, u32)>,
    pub product_nodes: usize,
    pub product_edges: usize,
}

#[inline]
fn normalize(p: u32, q: u32) -> (u32, u32) {
    if p <= q {
        (p, q)
    } else {
        (q, p)
    }
}

impl CommonFutures {
    pub fn compute(fst: &Fst) -> Self {
        let Some(start) = fst.start() else {
            return CommonFutures::default();
        };

        let graph = self_product(fst, start);
        let coaccess = coaccessible(&graph, fst);

        let pairs: FxHashSet<(u32, u32)> = graph
            .node_indices()
            .filter(|n| coaccess[n.index()])
            .map(|n| {
                let (p, q) = graph[n];
                normalize(p, q)
            })
            .collect();

        CommonFutures {
            pairs,
            product_nodes: graph.node_count(),
            product_edges: graph.edge_count(),
        }
    }

    /// Symmetric membership test.
    #[inline]
    pub fn contains(&self, p: u32, q: u32) -> bool {
        self.pairs.contains(&normalize(p, q))
    }

    /// Number of distinct unordered pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Accessible part of the self-composition of `fst`, explored breadth-first
/// from `(start, start)`.
fn self_product(fst: &Fst, start: u32) -> ProductGraph {
    let mut graph = ProductGraph::new();
    let mut index: FxHashMap<(u32, u32), NodeIndex> = FxHashMap::default();
    let mut worklist: VecDeque<NodeIndex> = VecDeque::new();

    let root = graph.add_node((start, start));
    index.insert((start, start), root);
    worklist.push_back(root);

    while let Some(node) = worklist.pop_front() {
        let (p, q) = graph[node];
        for a in fst.arcs_from(p) {
            for b in fst.arcs_from(q) {
                if a.input != b.input {
                    continue;
                }
                let pair = (a.dest, b.dest);
                let dest = match index.get(&pair) {
                    Some(&d) => d,
                    None => {
                        let d = graph.add_node(pair);
                        index.insert(pair, d);
                        worklist.push_back(d);
                        d
                    }
                };
                graph.add_edge(node, dest, a.input);
            }
        }
    }

    graph
}

/// Mark product nodes that reach a node whose components are both final.
fn coaccessible(graph: &ProductGraph, fst: &Fst) -> Vec<bool> {
    let mut coaccess = vec![false; graph.node_count()];

    // Components come out in reverse topological order, so every component
    // a node can leave to has already been decided.
    for scc in tarjan_scc(graph) {
        let live = scc.iter().any(|&n| {
            let (p, q) = graph[n];
            (fst.is_final(p) && fst.is_final(q))
                || graph.neighbors(n).any(|m| coaccess[m.index()])
        });
        if live {
            for n in scc {
                coaccess[n.index()] = true;
            }
        }
    }

    coaccess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_final_future() {
        // 0 --a--> 1(F), 0 --a--> 2(F)
        let fst = Fst::acceptor(3, vec![0], &[1, 2], &[0, 0], &[1, 1], &[1, 2]).unwrap();
        let cf = CommonFutures::compute(&fst);
        assert!(cf.contains(1, 2));
        assert!(cf.contains(2, 1));
        assert!(cf.contains(0, 0));
        assert!(cf.contains(1, 1));
        assert_eq!(cf.product_nodes, 5);
    }

    #[test]
    fn test_divergent_futures() {
        // 0 --a--> 1 --b--> 3(F), 0 --a--> 2(F)
        let fst =
            Fst::acceptor(4, vec![0], &[2, 3], &[0, 0, 1], &[1, 1, 2], &[1, 2, 3]).unwrap();
        let cf = CommonFutures::compute(&fst);
        assert!(!cf.contains(1, 2));
        assert!(cf.contains(1, 1));
        assert!(cf.contains(2, 2));
        assert!(cf.contains(3, 3));
    }

    #[test]
    fn test_cycle_reaches_final() {
        // 0 --a--> 1, 1 --a--> 0, 1 --b--> 2(F), 0 --a--> 3, 3 --a--> 3, 3 --b--> 2
        // Pairs inside the a-cycles must be found live through the SCC.
        let fst = Fst::acceptor(
            4,
            vec![0],
            &[2],
            &[0, 1, 1, 0, 3, 3],
            &[1, 1, 2, 1, 1, 2],
            &[1, 0, 2, 3, 3, 2],
        )
        .unwrap();
        let cf = CommonFutures::compute(&fst);
        assert!(cf.contains(1, 3));
        assert!(cf.contains(0, 3));
        assert!(cf.contains(1, 1));
    }

    #[test]
    fn test_dead_pairs_excluded() {
        // 0 --a--> 1(F), 0 --a--> 2 (dead end)
        let fst = Fst::acceptor(3, vec![0], &[1], &[0, 0], &[1, 1], &[1, 2]).unwrap();
        let cf = CommonFutures::compute(&fst);
        assert!(!cf.contains(1, 2));
        assert!(!cf.contains(2, 2));
        assert!(cf.contains(1, 1));
    }

    #[test]
    fn test_no_start() {
        let fst = Fst::acceptor(1, vec![], &[0], &[], &[], &[]).unwrap();
        let cf = CommonFutures::compute(&fst);
        assert!(cf.is_empty());
        assert_eq!(cf.product_nodes, 0);
    }
}
