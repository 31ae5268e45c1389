//! Blossom-based minimum-weight perfect matching.
//!
//! Implements maximum-weight matching in general graphs with the blossom
//! method for finding augmenting paths and the primal-dual method for
//! weight optimality, following Galil's formulation (ACM Computing
//! Surveys, 1986) of Edmonds' algorithm. Minimum-weight perfect matching
//! is obtained by negating the weights and requiring maximum cardinality.
//!
//! Vertices are numbered `0..n`; non-trivial blossoms are numbered
//! `n..2n`. Edge endpoints are numbered `0..2m` such that endpoints `2k`
//! and `2k + 1` belong to edge `k`. Vertex dual variables are stored
//! pre-multiplied by two so every slack computation stays a plain
//! sum-and-difference of previously computed values.
//!
//! Runs in O(n³) time, which dominates the solve for graphs with many
//! odd-degree vertices.

use crate::error::Result;
use crate::solver::CancelToken;

use super::{ensure_even, normalize, PairWeights, WeightedMatcher};

/// Sentinel for "no vertex / no endpoint / no edge".
pub(crate) const NONE: usize = usize::MAX;

/// Maximum-weight matching over vertices `0..vertex_count` given sparse
/// `(i, j, weight)` edges. Returns `mate`, where `mate[v]` is the vertex
/// matched to `v` or [`NONE`]. With `max_cardinality`, only matchings of
/// maximum cardinality are considered; [`BlossomMatcher`] wraps this with
/// negated weights for the dense minimum-weight formulation.
pub(crate) fn maximum_weight_matching(
    edges: &[(usize, usize, f64)],
    vertex_count: usize,
    max_cardinality: bool,
    cancel: &CancelToken,
) -> Result<Vec<usize>> {
    MatchingState::new(edges, vertex_count, max_cardinality).solve(cancel)
}

/// Label of an unreached top-level blossom.
const FREE: u8 = 0;
/// Outer (even-level) blossom in the alternating forest.
const LABEL_S: u8 = 1;
/// Inner (odd-level) blossom in the alternating forest.
const LABEL_T: u8 = 2;
/// Temporary mark used while tracing back a pair of alternating paths;
/// chosen so `label & 4 != 0` identifies a breadcrumb.
const BREADCRUMB: u8 = 5;

/// Reference [`WeightedMatcher`]: Edmonds primal-dual blossom matching.
///
/// Deterministic for a fixed input: the auxiliary edges are enumerated in
/// a fixed order and the algorithm itself contains no randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlossomMatcher;

impl BlossomMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WeightedMatcher for BlossomMatcher {
    fn pair_all(
        &self,
        weights: &PairWeights,
        cancel: &CancelToken,
    ) -> Result<Vec<(usize, usize)>> {
        ensure_even(weights)?;
        let n = weights.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        // Maximizing negated distances minimizes the matched distance sum;
        // maximum cardinality forces the matching to be perfect.
        let mut edges = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j, -weights.weight(i, j)));
            }
        }

        let mate = maximum_weight_matching(&edges, n, true, cancel)?;
        let mut pairs = Vec::with_capacity(n / 2);
        for (vertex, &partner) in mate.iter().enumerate() {
            debug_assert!(partner != NONE, "perfect matching left {vertex} single");
            if vertex < partner {
                pairs.push((vertex, partner));
            }
        }
        Ok(normalize(pairs))
    }
}

/// Working state of one matching computation.
///
/// Index conventions follow the module docs; the individual field
/// invariants are documented where subtle.
struct MatchingState {
    /// Input edges as `(i, j, weight)` with `i != j`.
    edges: Vec<(usize, usize, f64)>,
    vertex_count: usize,
    edge_count: usize,
    max_cardinality: bool,
    /// Greatest input edge weight; initial vertex dual value.
    max_weight: f64,
    /// `endpoints[p]` is the vertex to which endpoint `p` is attached.
    endpoints: Vec<usize>,
    /// `adjacent[v]` lists the remote endpoints of v's edges.
    adjacent: Vec<Vec<usize>>,
    /// `mate[v]` is the remote endpoint of v's matched edge (NONE if single).
    mate: Vec<usize>,
    /// Top-level blossom labels; for a vertex inside a T-blossom, LABEL_T
    /// means the vertex is reachable from outside the blossom.
    label: Vec<u8>,
    /// Remote endpoint of the edge through which a label was obtained.
    label_end: Vec<usize>,
    /// `in_blossom[v]` is the top-level blossom containing v.
    in_blossom: Vec<usize>,
    /// Immediate parent of a sub-blossom (NONE at top level).
    blossom_parent: Vec<usize>,
    /// Ordered sub-blossoms, starting with the base and going round.
    blossom_children: Vec<Vec<usize>>,
    /// Base vertex of each (sub-)blossom.
    blossom_base: Vec<usize>,
    /// `blossom_endpoints[b][i]` connects `blossom_children[b][i]` to its
    /// successor round the blossom.
    blossom_endpoints: Vec<Vec<usize>>,
    /// Least-slack edge to an S-blossom, per vertex and per S-blossom.
    best_edge: Vec<usize>,
    /// Per top-level S-blossom: least-slack edges to neighbouring
    /// S-blossoms (empty when not yet computed).
    blossom_best_edges: Vec<Vec<usize>>,
    /// Recyclable blossom numbers.
    free_blossom_ids: Vec<usize>,
    /// Dual variables: `dual[v] = 2u(v)` for vertices, `dual[b] = z(b)`
    /// for blossoms.
    dual: Vec<f64>,
    /// `allowed_edge[k]` means edge k has zero slack.
    allowed_edge: Vec<bool>,
    /// Newly discovered S-vertices awaiting a scan.
    queue: Vec<usize>,
}

impl MatchingState {
    fn new(edges: &[(usize, usize, f64)], vertex_count: usize, max_cardinality: bool) -> Self {
        let edge_count = edges.len();
        let max_weight = edges.iter().map(|e| e.2).fold(f64::NEG_INFINITY, f64::max);

        let endpoints = (0..2 * edge_count)
            .map(|p| if p % 2 == 0 { edges[p / 2].0 } else { edges[p / 2].1 })
            .collect();

        let mut adjacent = vec![Vec::new(); vertex_count];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            debug_assert!(i != j, "self-edges are not matchable");
            adjacent[i].push(2 * k + 1);
            adjacent[j].push(2 * k);
        }

        let mut dual = vec![max_weight; vertex_count];
        dual.extend(std::iter::repeat(0.0).take(vertex_count));

        let mut blossom_base: Vec<usize> = (0..vertex_count).collect();
        blossom_base.extend(std::iter::repeat(NONE).take(vertex_count));

        Self {
            edges: edges.to_vec(),
            vertex_count,
            edge_count,
            max_cardinality,
            max_weight,
            endpoints,
            adjacent,
            mate: vec![NONE; vertex_count],
            label: vec![FREE; 2 * vertex_count],
            label_end: vec![NONE; 2 * vertex_count],
            in_blossom: (0..vertex_count).collect(),
            blossom_parent: vec![NONE; 2 * vertex_count],
            blossom_children: vec![Vec::new(); 2 * vertex_count],
            blossom_base,
            blossom_endpoints: vec![Vec::new(); 2 * vertex_count],
            best_edge: vec![NONE; 2 * vertex_count],
            blossom_best_edges: vec![Vec::new(); 2 * vertex_count],
            free_blossom_ids: (vertex_count..2 * vertex_count).collect(),
            dual,
            allowed_edge: vec![false; edge_count],
            queue: Vec::new(),
        }
    }

    /// Twice the slack of edge k. Not meaningful for edges internal to a
    /// blossom.
    fn slack(&self, k: usize) -> f64 {
        let (i, j, weight) = self.edges[k];
        self.dual[i] + self.dual[j] - 2.0 * weight
    }

    /// Leaf vertices of (sub-)blossom b.
    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        if b < self.vertex_count {
            return vec![b];
        }
        let mut leaves = Vec::new();
        for &child in &self.blossom_children[b] {
            if child < self.vertex_count {
                leaves.push(child);
            } else {
                leaves.extend(self.blossom_leaves(child));
            }
        }
        leaves
    }

    /// Assigns label `t` to the top-level blossom containing vertex `w`,
    /// reached through the edge with remote endpoint `p`.
    fn assign_label(&mut self, w: usize, t: u8, p: usize) {
        let b = self.in_blossom[w];
        debug_assert!(self.label[w] == FREE && self.label[b] == FREE);

        self.label[w] = t;
        self.label[b] = t;
        self.label_end[w] = p;
        self.label_end[b] = p;
        self.best_edge[w] = NONE;
        self.best_edge[b] = NONE;

        if t == LABEL_S {
            // b became an S-blossom; scan its vertices.
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
        } else if t == LABEL_T {
            // b became a T-blossom; its base's mate becomes an S-vertex.
            // (The base is the only vertex with an external mate.)
            let base = self.blossom_base[b];
            debug_assert!(self.mate[base] != NONE);
            let mate_endpoint = self.mate[base];
            let vertex = self.endpoints[mate_endpoint];
            self.assign_label(vertex, LABEL_S, mate_endpoint ^ 1);
        }
    }

    /// Traces back from two S-vertices joined by an edge to find either a
    /// new blossom (returns its base) or an augmenting path (returns
    /// NONE).
    fn scan_blossom(&mut self, v: usize, w: usize) -> usize {
        let mut path = Vec::new();
        let mut base = NONE;
        let mut v = v;
        let mut w = w;
        while v != NONE || w != NONE {
            // Look for a breadcrumb in v's blossom, or drop a new one.
            let mut b = self.in_blossom[v];
            if self.label[b] & 4 != 0 {
                base = self.blossom_base[b];
                break;
            }
            debug_assert!(self.label[b] == LABEL_S);
            path.push(b);
            self.label[b] = BREADCRUMB;
            // Trace one step back.
            debug_assert!(self.label_end[b] == self.mate[self.blossom_base[b]]);
            if self.label_end[b] == NONE {
                // The base of blossom b is single; this path ends here.
                v = NONE;
            } else {
                v = self.endpoints[self.label_end[b]];
                b = self.in_blossom[v];
                debug_assert!(self.label[b] == LABEL_T);
                // b is a T-blossom; trace one more step back.
                debug_assert!(self.label_end[b] != NONE);
                v = self.endpoints[self.label_end[b]];
            }
            // Alternate between the two paths.
            if w != NONE {
                std::mem::swap(&mut v, &mut w);
            }
        }
        // Remove breadcrumbs.
        for b in path {
            self.label[b] = LABEL_S;
        }
        base
    }

    /// Constructs a new blossom with the given base, containing edge k
    /// which connects a pair of S-vertices. Labels the new blossom as S,
    /// sets its dual variable to zero, and relabels its T-vertices to S.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (mut v, mut w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = self.free_blossom_ids.pop().expect("blossom numbers exhausted");
        self.blossom_base[b] = base;
        self.blossom_parent[b] = NONE;
        self.blossom_parent[bb] = b;

        let mut children = Vec::new();
        let mut endpoints = Vec::new();

        // Trace back from v to base.
        while bv != bb {
            self.blossom_parent[bv] = b;
            children.push(bv);
            endpoints.push(self.label_end[bv]);
            debug_assert!(
                self.label[bv] == LABEL_T
                    || (self.label[bv] == LABEL_S
                        && self.label_end[bv] == self.mate[self.blossom_base[bv]])
            );
            debug_assert!(self.label_end[bv] != NONE);
            v = self.endpoints[self.label_end[bv]];
            bv = self.in_blossom[v];
        }
        // Add the base and reverse so the list starts there, then record
        // the endpoint joining the two S-vertices.
        children.push(bb);
        children.reverse();
        endpoints.reverse();
        endpoints.push(2 * k);

        // Trace back from w to base.
        while bw != bb {
            self.blossom_parent[bw] = b;
            children.push(bw);
            endpoints.push(self.label_end[bw] ^ 1);
            debug_assert!(
                self.label[bw] == LABEL_T
                    || (self.label[bw] == LABEL_S
                        && self.label_end[bw] == self.mate[self.blossom_base[bw]])
            );
            debug_assert!(self.label_end[bw] != NONE);
            w = self.endpoints[self.label_end[bw]];
            bw = self.in_blossom[w];
        }
        self.blossom_children[b] = children;
        self.blossom_endpoints[b] = endpoints;

        debug_assert!(self.label[bb] == LABEL_S);
        self.label[b] = LABEL_S;
        self.label_end[b] = self.label_end[bb];
        self.dual[b] = 0.0;

        // Relabel vertices now inside b.
        for vertex in self.blossom_leaves(b) {
            if self.label[self.in_blossom[vertex]] == LABEL_T {
                // Former T-vertex turned S; scan it.
                self.queue.push(vertex);
            }
            self.in_blossom[vertex] = b;
        }

        // Compute the least-slack edge lists for delta3.
        let mut best_edge_to = vec![NONE; 2 * self.vertex_count];
        let children = self.blossom_children[b].clone();
        for bv in children {
            let edge_lists: Vec<Vec<usize>> = if self.blossom_best_edges[bv].is_empty() {
                // No cached list; gather from the leaf vertices.
                self.blossom_leaves(bv)
                    .into_iter()
                    .map(|v| self.adjacent[v].iter().map(|p| p / 2).collect())
                    .collect()
            } else {
                vec![self.blossom_best_edges[bv].clone()]
            };
            for edge_list in edge_lists {
                for k in edge_list {
                    let (mut i, mut j, _) = self.edges[k];
                    if self.in_blossom[j] == b {
                        std::mem::swap(&mut i, &mut j);
                    }
                    let bj = self.in_blossom[j];
                    let best = best_edge_to[bj];
                    if bj != b
                        && self.label[bj] == LABEL_S
                        && (best == NONE || self.slack(k) < self.slack(best))
                    {
                        best_edge_to[bj] = k;
                    }
                }
            }
            self.blossom_best_edges[bv] = Vec::new();
            self.best_edge[bv] = NONE;
        }
        self.blossom_best_edges[b] = best_edge_to.into_iter().filter(|&k| k != NONE).collect();

        self.best_edge[b] = NONE;
        for k in self.blossom_best_edges[b].clone() {
            if self.best_edge[b] == NONE || self.slack(k) < self.slack(self.best_edge[b]) {
                self.best_edge[b] = k;
            }
        }
    }

    /// Expands the given top-level blossom, converting its sub-blossoms
    /// into top-level blossoms. During a stage (`end_stage == false`) a
    /// T-blossom's sub-blossoms must be relabeled.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) {
        for s in self.blossom_children[b].clone() {
            self.blossom_parent[s] = NONE;
            if s < self.vertex_count {
                self.in_blossom[s] = s;
            } else if end_stage && self.dual[s] == 0.0 {
                // Zero dual: recursively expand this sub-blossom too.
                self.expand_blossom(s, end_stage);
            } else {
                for v in self.blossom_leaves(s) {
                    self.in_blossom[v] = s;
                }
            }
        }

        if !end_stage && self.label[b] == LABEL_T {
            // Relabel sub-blossoms from the entry point round to the base.
            debug_assert!(self.label_end[b] != NONE);
            let entry_child = self.in_blossom[self.endpoints[self.label_end[b] ^ 1]];

            let children_len = self.blossom_children[b].len() as i64;
            let mut j = self.blossom_children[b]
                .iter()
                .position(|&child| child == entry_child)
                .expect("entry child must be a sub-blossom") as i64;
            let (j_step, endpoint_flip): (i64, usize) = if j % 2 != 0 {
                // Odd entry index: go forward and wrap around.
                j -= children_len;
                (1, 0)
            } else {
                // Even entry index: go backward.
                (-1, 1)
            };

            // Move along the blossom until the base.
            let mut p = self.label_end[b];
            while j != 0 {
                // Relabel the T-sub-blossom.
                self.label[self.endpoints[p ^ 1]] = FREE;
                let q = self.cyclic_endpoint(b, j - endpoint_flip as i64) ^ endpoint_flip;
                self.label[self.endpoints[q ^ 1]] = FREE;
                let vertex = self.endpoints[p ^ 1];
                self.assign_label(vertex, LABEL_T, p);

                // Step to the next S-sub-blossom and note its forward
                // endpoint.
                self.allowed_edge[q / 2] = true;
                j += j_step;
                p = self.cyclic_endpoint(b, j - endpoint_flip as i64) ^ endpoint_flip;

                // Step to the next T-sub-blossom.
                self.allowed_edge[p / 2] = true;
                j += j_step;
            }

            // Relabel the base T-sub-blossom without stepping through to
            // its mate.
            let bv = self.cyclic_child(b, j);
            self.label[self.endpoints[p ^ 1]] = LABEL_T;
            self.label[bv] = LABEL_T;
            self.label_end[self.endpoints[p ^ 1]] = p;
            self.label_end[bv] = p;
            self.best_edge[bv] = NONE;

            // Continue along the blossom until back at the entry child,
            // relabeling sub-blossoms reached from outside as T.
            j += j_step;
            while self.cyclic_child(b, j) != entry_child {
                let bv = self.cyclic_child(b, j);
                if self.label[bv] == LABEL_S {
                    // Already labeled through one of its neighbours.
                    j += j_step;
                    continue;
                }
                let mut reached = NONE;
                for v in self.blossom_leaves(bv) {
                    reached = v;
                    if self.label[v] != FREE {
                        break;
                    }
                }
                if reached != NONE && self.label[reached] != FREE {
                    debug_assert!(self.label[reached] == LABEL_T);
                    debug_assert!(self.in_blossom[reached] == bv);
                    self.label[reached] = FREE;
                    let base_mate = self.mate[self.blossom_base[bv]];
                    self.label[self.endpoints[base_mate]] = FREE;
                    let through = self.label_end[reached];
                    self.assign_label(reached, LABEL_T, through);
                }
                j += j_step;
            }
        }

        // Recycle the blossom number.
        self.label[b] = FREE;
        self.label_end[b] = NONE;
        self.blossom_base[b] = NONE;
        self.best_edge[b] = NONE;
        self.blossom_children[b] = Vec::new();
        self.blossom_endpoints[b] = Vec::new();
        self.blossom_best_edges[b] = Vec::new();
        self.free_blossom_ids.push(b);
    }

    /// Swaps matched/unmatched edges over an alternating path through
    /// blossom b between vertex v and the base vertex, rotating the
    /// blossom so v becomes the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        // Bubble up from v to an immediate sub-blossom of b.
        let mut t = v;
        while self.blossom_parent[t] != b {
            t = self.blossom_parent[t];
        }
        if t != NONE && t >= self.vertex_count {
            self.augment_blossom(t, v);
        }

        let i = self.blossom_children[b]
            .iter()
            .position(|&child| child == t)
            .expect("augment target must be a sub-blossom");
        let children_len = self.blossom_children[b].len() as i64;
        let mut j = i as i64;
        let (j_step, endpoint_flip): (i64, usize) = if i % 2 != 0 {
            j -= children_len;
            (1, 0)
        } else {
            (-1, 1)
        };

        // Move along the blossom until the base, augmenting alternately.
        while j != 0 {
            j += j_step;
            let mut t = self.cyclic_child(b, j);
            let p = self.cyclic_endpoint(b, j - endpoint_flip as i64) ^ endpoint_flip;
            if t != NONE && t >= self.vertex_count {
                let entry = self.endpoints[p];
                self.augment_blossom(t, entry);
            }
            j += j_step;
            t = self.cyclic_child(b, j);
            if t != NONE && t >= self.vertex_count {
                let entry = self.endpoints[p ^ 1];
                self.augment_blossom(t, entry);
            }
            // Match the edge connecting those sub-blossoms.
            self.mate[self.endpoints[p]] = p ^ 1;
            self.mate[self.endpoints[p ^ 1]] = p;
        }

        // Rotate so the new base is at the front.
        self.blossom_children[b].rotate_left(i);
        self.blossom_endpoints[b].rotate_left(i);
        self.blossom_base[b] = self.blossom_base[self.blossom_children[b][0]];
        debug_assert!(self.blossom_base[b] == v);
    }

    /// Swaps matched/unmatched edges over the augmenting path through
    /// edge k, which connects a pair of S-vertices.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (start, start_endpoint) in [(v, 2 * k + 1), (w, 2 * k)] {
            // Match vertex `start` to remote endpoint, then trace back
            // until reaching a single vertex, swapping matched and
            // unmatched edges along the way.
            let mut s = start;
            let mut p = start_endpoint;
            loop {
                let bs = self.in_blossom[s];
                debug_assert!(self.label[bs] == LABEL_S);
                debug_assert!(self.label_end[bs] == self.mate[self.blossom_base[bs]]);
                if bs >= self.vertex_count {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;

                if self.label_end[bs] == NONE {
                    // Reached a single vertex; stop.
                    break;
                }
                let t = self.endpoints[self.label_end[bs]];
                let bt = self.in_blossom[t];
                debug_assert!(self.label[bt] == LABEL_T);
                debug_assert!(self.label_end[bt] != NONE);
                s = self.endpoints[self.label_end[bt]];
                let j = self.endpoints[self.label_end[bt] ^ 1];
                debug_assert!(self.blossom_base[bt] == t);
                if bt >= self.vertex_count {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.label_end[bt];
                // Keep the opposite endpoint; it is assigned to mate[s]
                // on the next pass round the loop.
                p = self.label_end[bt] ^ 1;
            }
        }
    }

    /// Runs the algorithm and returns `mate`, where `mate[v]` is the
    /// vertex matched to v or NONE if v remained single.
    fn solve(&mut self, cancel: &CancelToken) -> Result<Vec<usize>> {
        if self.edges.is_empty() {
            return Ok(Vec::new());
        }

        // Each stage augments the matching by one edge (or proves no
        // further augmentation exists), so n stages suffice.
        for _ in 0..self.vertex_count {
            cancel.check()?;

            self.label = vec![FREE; 2 * self.vertex_count];
            self.best_edge = vec![NONE; 2 * self.vertex_count];
            for b in self.vertex_count..2 * self.vertex_count {
                self.blossom_best_edges[b] = Vec::new();
            }
            // Labels were lost, so allowability must be recomputed.
            self.allowed_edge = vec![false; self.edge_count];
            self.queue = Vec::new();

            // Label all single blossoms as S and scan them.
            for v in 0..self.vertex_count {
                if self.mate[v] == NONE && self.label[self.in_blossom[v]] == FREE {
                    self.assign_label(v, LABEL_S, NONE);
                }
            }

            let mut augmented = false;
            loop {
                // Substage: either find an augmenting path, or pump slack
                // out of the dual variables and retry.
                while let Some(v) = self.queue.pop() {
                    debug_assert!(self.label[self.in_blossom[v]] == LABEL_S);
                    let mut found_augmenting_path = false;
                    for p in self.adjacent[v].clone() {
                        let k = p / 2;
                        let w = self.endpoints[p];
                        if self.in_blossom[v] == self.in_blossom[w] {
                            // Internal to a blossom; ignore.
                            continue;
                        }
                        let mut k_slack = 0.0;
                        if !self.allowed_edge[k] {
                            k_slack = self.slack(k);
                            if k_slack <= 0.0 {
                                self.allowed_edge[k] = true;
                            }
                        }
                        if self.allowed_edge[k] {
                            if self.label[self.in_blossom[w]] == FREE {
                                // w is free; label it T and its mate S.
                                self.assign_label(w, LABEL_T, p ^ 1);
                            } else if self.label[self.in_blossom[w]] == LABEL_S {
                                // Two S-blossoms meet: either a new
                                // blossom or an augmenting path.
                                let base = self.scan_blossom(v, w);
                                if base != NONE {
                                    self.add_blossom(base, k);
                                } else {
                                    self.augment_matching(k);
                                    augmented = true;
                                    found_augmenting_path = true;
                                    break;
                                }
                            } else if self.label[w] == FREE {
                                // w sits unreached inside a T-blossom;
                                // mark it for relabeling on expansion.
                                debug_assert!(self.label[self.in_blossom[w]] == LABEL_T);
                                self.label[w] = LABEL_T;
                                self.label_end[w] = p ^ 1;
                            }
                        } else if self.label[self.in_blossom[w]] == LABEL_S {
                            // Track the least-slack edge between a pair of
                            // S-blossoms.
                            let b = self.in_blossom[v];
                            if self.best_edge[b] == NONE
                                || k_slack < self.slack(self.best_edge[b])
                            {
                                self.best_edge[b] = k;
                            }
                        } else if self.label[w] == FREE {
                            // w is free (or unreached inside a T-blossom);
                            // track the least-slack edge reaching it.
                            if self.best_edge[w] == NONE
                                || k_slack < self.slack(self.best_edge[w])
                            {
                                self.best_edge[w] = k;
                            }
                        }
                    }
                    if found_augmenting_path {
                        break;
                    }
                }

                if augmented {
                    break;
                }

                // No augmenting path under the current duals: compute the
                // largest safe delta. (Duals and slacks are
                // pre-multiplied by two.)
                let mut delta_type = -1;
                let mut delta = 0.0;
                let mut delta_edge = NONE;
                let mut delta_blossom = NONE;

                if !self.max_cardinality {
                    delta_type = 1;
                    delta = self.dual[..self.vertex_count]
                        .iter()
                        .fold(f64::INFINITY, |acc, &d| acc.min(d));
                }

                // delta2: least slack between an S-vertex and a free
                // vertex.
                for v in 0..self.vertex_count {
                    if self.label[self.in_blossom[v]] == FREE && self.best_edge[v] != NONE {
                        let d = self.slack(self.best_edge[v]);
                        if delta_type == -1 || d < delta {
                            delta = d;
                            delta_type = 2;
                            delta_edge = self.best_edge[v];
                        }
                    }
                }

                // delta3: half the least slack between a pair of
                // S-blossoms.
                for b in 0..2 * self.vertex_count {
                    if self.blossom_parent[b] == NONE
                        && self.label[b] == LABEL_S
                        && self.best_edge[b] != NONE
                    {
                        let d = self.slack(self.best_edge[b]) / 2.0;
                        if delta_type == -1 || d < delta {
                            delta = d;
                            delta_type = 3;
                            delta_edge = self.best_edge[b];
                        }
                    }
                }

                // delta4: least dual of a T-blossom.
                for b in self.vertex_count..2 * self.vertex_count {
                    if self.blossom_base[b] != NONE
                        && self.blossom_parent[b] == NONE
                        && self.label[b] == LABEL_T
                        && (delta_type == -1 || self.dual[b] < delta)
                    {
                        delta = self.dual[b];
                        delta_type = 4;
                        delta_blossom = b;
                    }
                }

                if delta_type == -1 {
                    // No further improvement possible; a final update
                    // makes the optimum verifiable.
                    debug_assert!(self.max_cardinality);
                    delta_type = 1;
                    delta = self.dual[..self.vertex_count]
                        .iter()
                        .fold(f64::INFINITY, |acc, &d| acc.min(d))
                        .max(0.0);
                }

                // Update duals.
                for v in 0..self.vertex_count {
                    match self.label[self.in_blossom[v]] {
                        FREE => {}
                        LABEL_S => self.dual[v] -= delta,
                        LABEL_T => self.dual[v] += delta,
                        label => unreachable!("unexpected vertex label {label}"),
                    }
                }
                for b in self.vertex_count..2 * self.vertex_count {
                    if self.blossom_base[b] != NONE && self.blossom_parent[b] == NONE {
                        match self.label[b] {
                            FREE => {}
                            LABEL_S => self.dual[b] += delta,
                            LABEL_T => self.dual[b] -= delta,
                            label => unreachable!("unexpected blossom label {label}"),
                        }
                    }
                }

                // Act where the minimum delta occurred.
                match delta_type {
                    1 => break, // Optimum reached.
                    2 => {
                        self.allowed_edge[delta_edge] = true;
                        let (mut i, j, _) = self.edges[delta_edge];
                        if self.label[self.in_blossom[i]] == FREE {
                            i = j;
                        }
                        debug_assert!(self.label[self.in_blossom[i]] == LABEL_S);
                        self.queue.push(i);
                    }
                    3 => {
                        self.allowed_edge[delta_edge] = true;
                        let (i, _, _) = self.edges[delta_edge];
                        debug_assert!(self.label[self.in_blossom[i]] == LABEL_S);
                        self.queue.push(i);
                    }
                    4 => self.expand_blossom(delta_blossom, false),
                    t => unreachable!("unexpected delta type {t}"),
                }
            }

            if !augmented {
                break;
            }

            // End of stage: expand all S-blossoms with zero dual.
            for b in self.vertex_count..2 * self.vertex_count {
                if self.blossom_parent[b] == NONE
                    && self.blossom_base[b] != NONE
                    && self.label[b] == LABEL_S
                    && self.dual[b] == 0.0
                {
                    self.expand_blossom(b, true);
                }
            }
        }

        #[cfg(test)]
        self.verify_optimum();

        // Transform mate[] from remote endpoints to partner vertices.
        let mut mate = vec![NONE; self.vertex_count];
        for v in 0..self.vertex_count {
            if self.mate[v] != NONE {
                mate[v] = self.endpoints[self.mate[v]];
            }
        }
        for v in 0..self.vertex_count {
            debug_assert!(mate[v] == NONE || mate[mate[v]] == v);
        }
        Ok(mate)
    }

    /// Element of `blossom_children[b]` at a cyclic (possibly negative)
    /// index.
    fn cyclic_child(&self, b: usize, index: i64) -> usize {
        cyclic(&self.blossom_children[b], index)
    }

    /// Element of `blossom_endpoints[b]` at a cyclic (possibly negative)
    /// index.
    fn cyclic_endpoint(&self, b: usize, index: i64) -> usize {
        cyclic(&self.blossom_endpoints[b], index)
    }

    /// Checks the complementary-slackness conditions of the final duals.
    /// Exact in the reference integer formulation; the float adaptation
    /// tolerates rounding proportional to the weight scale.
    #[cfg(test)]
    fn verify_optimum(&self) {
        let eps = 1e-8 * (1.0 + self.max_weight.abs());
        let offset = if self.max_cardinality {
            // Vertex duals may go negative; shift them all up.
            (-self.dual[..self.vertex_count]
                .iter()
                .fold(f64::INFINITY, |acc, &d| acc.min(d)))
            .max(0.0)
        } else {
            0.0
        };

        // Every edge has non-negative slack and every matched edge has
        // zero slack.
        for k in 0..self.edge_count {
            let (i, j, _) = self.edges[k];
            let mut s = self.slack(k);
            let mut i_blossoms = vec![i];
            let mut j_blossoms = vec![j];
            while self.blossom_parent[*i_blossoms.last().unwrap()] != NONE {
                i_blossoms.push(self.blossom_parent[*i_blossoms.last().unwrap()]);
            }
            while self.blossom_parent[*j_blossoms.last().unwrap()] != NONE {
                j_blossoms.push(self.blossom_parent[*j_blossoms.last().unwrap()]);
            }
            i_blossoms.reverse();
            j_blossoms.reverse();
            for (&bi, &bj) in i_blossoms.iter().zip(j_blossoms.iter()) {
                if bi != bj {
                    break;
                }
                s += 2.0 * self.dual[bi];
            }
            assert!(s >= -eps, "edge {k} has negative slack {s}");
            if self.mate[i] / 2 == k || self.mate[j] / 2 == k {
                assert!(self.mate[i] / 2 == k && self.mate[j] / 2 == k);
                assert!(s.abs() <= eps, "matched edge {k} has nonzero slack {s}");
            }
        }
        // Every single vertex has zero (shifted) dual.
        for v in 0..self.vertex_count {
            assert!(
                self.mate[v] != NONE || (self.dual[v] + offset).abs() <= eps,
                "single vertex {v} has nonzero dual"
            );
        }
        // Every blossom with positive dual is full.
        for b in self.vertex_count..2 * self.vertex_count {
            if self.blossom_base[b] != NONE && self.dual[b] > eps {
                assert!(self.blossom_endpoints[b].len() % 2 == 1);
                for (index, &p) in self.blossom_endpoints[b].iter().enumerate() {
                    if index % 2 == 1 {
                        assert!(self.mate[self.endpoints[p]] == p ^ 1);
                        assert!(self.mate[self.endpoints[p ^ 1]] == p);
                    }
                }
            }
        }
    }
}

/// Cyclic indexing: negative indices count back from the end.
fn cyclic(list: &[usize], index: i64) -> usize {
    let len = list.len() as i64;
    let actual = if index >= 0 { index } else { index + len };
    list[usize::try_from(actual).expect("cyclic index out of range")]
}
