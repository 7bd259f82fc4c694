use crate::fsa::FsaResult;
use std::collections::VecDeque;

/// Remove states not reachable from start or not co-reachable to any final state.
/// Renumbers states contiguously, preserving relative order.
pub fn connect(fsa: &FsaResult) -> FsaResult {
    connect_with_map(fsa).0
}

/// Like [`connect`], also returning `old_to_new` (`u32::MAX` for removed states).
pub fn connect_with_map(fsa: &FsaResult) -> (FsaResult, Vec<u32>) {
    let n = fsa.num_states as usize;
    if n == 0 {
        return (FsaResult::default(), vec![]);
    }

    let num_arcs = fsa.arc_src.len();

    // Build forward and reverse adjacency lists
    let mut fwd: Vec<Vec<u32>> = vec![vec![]; n];
    let mut rev: Vec<Vec<u32>> = vec![vec![]; n];
    for i in 0..num_arcs {
        let s = fsa.arc_src[i];
        let d = fsa.arc_dst[i];
        if (s as usize) < n && (d as usize) < n {
            fwd[s as usize].push(d);
            rev[d as usize].push(s);
        }
    }

    let fwd_reach = reach(n, &fsa.start, &fwd);
    let bwd_reach = reach(n, &fsa.stop, &rev);

    let mut old_to_new = vec![u32::MAX; n];
    let mut new_id: u32 = 0;
    for i in 0..n {
        if fwd_reach[i] && bwd_reach[i] {
            old_to_new[i] = new_id;
            new_id += 1;
        }
    }

    let remap = |states: &[u32]| -> Vec<u32> {
        states
            .iter()
            .filter(|&&s| (s as usize) < n && old_to_new[s as usize] != u32::MAX)
            .map(|&s| old_to_new[s as usize])
            .collect()
    };

    let mut out = FsaResult {
        num_states: new_id,
        start: remap(&fsa.start),
        stop: remap(&fsa.stop),
        ..FsaResult::default()
    };

    let lookup = |s: u32| old_to_new.get(s as usize).copied().unwrap_or(u32::MAX);
    for i in 0..num_arcs {
        let s = lookup(fsa.arc_src[i]);
        let d = lookup(fsa.arc_dst[i]);
        if s != u32::MAX && d != u32::MAX {
            out.add_arc(s, fsa.arc_lbl[i], d);
        }
    }

    (out, old_to_new)
}

/// BFS marking every state reachable from `roots` along `adj`.
fn reach(n: usize, roots: &[u32], adj: &[Vec<u32>]) -> Vec<bool> {
    let mut seen = vec![false; n];
    let mut queue: VecDeque<u32> = VecDeque::new();
    for &s in roots {
        let si = s as usize;
        if si < n && !seen[si] {
            seen[si] = true;
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        for &d in &adj[s as usize] {
            if !seen[d as usize] {
                seen[d as usize] = true;
                queue.push_back(d);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fsa(num_states: u32, stop: Vec<u32>, arcs: &[(u32, u32, u32)]) -> FsaResult {
        FsaResult {
            num_states,
            start: vec![0],
            stop,
            arc_src: arcs.iter().map(|a| a.0).collect(),
            arc_lbl: arcs.iter().map(|a| a.1).collect(),
            arc_dst: arcs.iter().map(|a| a.2).collect(),
        }
    }

    #[test]
    fn test_connect_empty() {
        let (m, map) = connect_with_map(&FsaResult::default());
        assert_eq!(m.num_states, 0);
        assert!(map.is_empty());
    }

    #[test]
    fn test_connect_nothing_to_trim() {
        let f = fsa(2, vec![1], &[(0, 1, 1)]);
        assert_eq!(connect(&f), f);
    }

    #[test]
    fn test_connect_removes_unreachable() {
        // State 2 is unreachable from start
        let f = fsa(3, vec![1], &[(0, 1, 1), (2, 1, 1)]);
        let m = connect(&f);
        assert_eq!(m.num_states, 2);
        assert_eq!(m.num_arcs(), 1);
    }

    #[test]
    fn test_connect_removes_dead_and_renumbers() {
        // 0 --1--> 1 (dead), 0 --2--> 2(F)
        let f = fsa(3, vec![2], &[(0, 1, 1), (0, 2, 2)]);
        let (m, map) = connect_with_map(&f);
        assert_eq!(map, vec![0, u32::MAX, 1]);
        assert_eq!(m.num_states, 2);
        assert_eq!(m.stop, vec![1]);
        assert_eq!((m.arc_src.clone(), m.arc_lbl.clone(), m.arc_dst.clone()), (vec![0], vec![2], vec![1]));
    }

    #[test]
    fn test_connect_dead_start() {
        // Start cannot reach a final state: everything goes
        let f = fsa(2, vec![], &[(0, 1, 1)]);
        let m = connect(&f);
        assert_eq!(m.num_states, 0);
        assert!(m.start.is_empty());
    }

    #[test]
    fn test_connect_ignores_out_of_range_states() {
        // start/stop/arcs mention state 9 of a 2-state machine
        let f = FsaResult {
            num_states: 2,
            start: vec![0, 9],
            stop: vec![1, 9],
            arc_src: vec![0, 9, 0],
            arc_lbl: vec![1, 1, 2],
            arc_dst: vec![1, 1, 9],
        };
        let m = connect(&f);
        assert_eq!(m.num_states, 2);
        assert_eq!(m.start, vec![0]);
        assert_eq!(m.stop, vec![1]);
        assert_eq!((m.arc_src, m.arc_lbl, m.arc_dst), (vec![0], vec![1], vec![1]));
    }
}
