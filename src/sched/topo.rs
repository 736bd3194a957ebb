//! 直通依赖图的拓扑排序
//!
//! Kahn 算法；就绪集合按插入序号取最小者，保证结果确定。

use std::collections::BTreeSet;

/// 对 `n` 个节点、边集 `edges`（a -> b，a 必须先于 b）做拓扑排序。
///
/// 成功返回顺序；存在环时返回环上的节点（按边的方向）。
pub(crate) fn stable_toposort(n: usize, edges: &[(usize, usize)]) -> Result<Vec<usize>, Vec<usize>> {
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(a, b) in edges {
        succ[a].push(b);
    }
    for s in &mut succ {
        s.sort_unstable();
        s.dedup();
    }

    let mut indegree = vec![0usize; n];
    for s in &succ {
        for &b in s {
            indegree[b] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(node) = ready.pop_first() {
        order.push(node);
        for &next in &succ[node] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    let remaining: Vec<bool> = indegree.iter().map(|&d| d > 0).collect();
    Err(find_cycle(n, &succ, &remaining))
}

/// 剩余节点的入度都 > 0，因此沿前驱一直走必然回到已访问节点。
fn find_cycle(n: usize, succ: &[Vec<usize>], remaining: &[bool]) -> Vec<usize> {
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (a, s) in succ.iter().enumerate() {
        for &b in s {
            if remaining[a] && remaining[b] {
                preds[b].push(a);
            }
        }
    }

    let Some(start) = (0..n).find(|&i| remaining[i]) else {
        return Vec::new();
    };

    let mut pos_in_path: Vec<Option<usize>> = vec![None; n];
    let mut path = Vec::new();
    let mut cur = start;
    loop {
        if let Some(pos) = pos_in_path[cur] {
            let mut cycle = path[pos..].to_vec();
            cycle.reverse();
            return cycle;
        }
        pos_in_path[cur] = Some(path.len());
        path.push(cur);
        match preds[cur].first() {
            Some(&p) => cur = p,
            None => return path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_break_by_insertion_order() {
        // 3 -> 0；1、2 无依赖
        let order = stable_toposort(4, &[(3, 0)]).expect("acyclic");
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn reports_cycle_members_in_edge_order() {
        let err = stable_toposort(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]).expect_err("cycle");
        let mut sorted = err.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let err = stable_toposort(2, &[(1, 1)]).expect_err("cycle");
        assert_eq!(err, vec![1]);
    }
}
