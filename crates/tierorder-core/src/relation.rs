//! Relation store: discovered strict-order facts between nodes.
//!
//! `less(i, j)` is true once it has been established, directly or through
//! closure, that node `i` orders strictly before node `j`. Rows are bitsets,
//! so recording a fact ORs the successor set of `v` into the row of every
//! predecessor of `u` instead of touching individual cells.
//!
//! Invariants after every [`RelationMatrix::record`]:
//! - irreflexive: `less(i, i)` is never set
//! - antisymmetric: never both `less(i, j)` and `less(j, i)` (callers only
//!   record facts consistent with a strict order)
//! - transitively closed

/// Result of looking up a node pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Less,
    Greater,
    Unknown,
}

const WORD_BITS: usize = 64;

/// Square boolean matrix over all nodes of one trial.
#[derive(Debug, Clone)]
pub struct RelationMatrix {
    nodes: usize,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl RelationMatrix {
    /// Empty matrix over `nodes` nodes: nothing is known yet.
    pub fn new(nodes: usize) -> Self {
        let words_per_row = nodes.div_ceil(WORD_BITS);
        Self {
            nodes,
            words_per_row,
            bits: vec![0; nodes * words_per_row],
        }
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    #[inline]
    fn row(&self, i: usize) -> &[u64] {
        let start = i * self.words_per_row;
        &self.bits[start..start + self.words_per_row]
    }

    #[inline]
    fn row_mut(&mut self, i: usize) -> &mut [u64] {
        let start = i * self.words_per_row;
        &mut self.bits[start..start + self.words_per_row]
    }

    /// True iff `i < j` has been established.
    #[inline]
    pub fn less(&self, i: usize, j: usize) -> bool {
        assert!(
            i < self.nodes && j < self.nodes,
            "node out of range: ({i}, {j}) with {} nodes",
            self.nodes
        );
        (self.row(i)[j / WORD_BITS] >> (j % WORD_BITS)) & 1 == 1
    }

    pub fn query(&self, i: usize, j: usize) -> Relation {
        if self.less(i, j) {
            Relation::Less
        } else if self.less(j, i) {
            Relation::Greater
        } else {
            Relation::Unknown
        }
    }

    /// True when the pair is ordered in either direction.
    #[inline]
    pub fn is_known(&self, i: usize, j: usize) -> bool {
        self.less(i, j) || self.less(j, i)
    }

    /// Assert `u < v` and propagate every consequence.
    ///
    /// Every `j` in `{u} ∪ {x : x < u}` becomes less than every `k` in
    /// `{v} ∪ {y : v < y}`. Because the matrix is already closed, this single
    /// step keeps it closed. Re-recording an implied fact changes nothing.
    /// Returns the number of newly established facts.
    pub fn record(&mut self, u: usize, v: usize) -> usize {
        assert!(u != v, "cannot order node {u} before itself");
        if self.less(u, v) {
            return 0;
        }

        let mut successors = self.row(v).to_vec();
        successors[v / WORD_BITS] |= 1 << (v % WORD_BITS);

        let u_word = u / WORD_BITS;
        let u_mask = 1u64 << (u % WORD_BITS);
        let mut added = 0;
        for j in 0..self.nodes {
            if j != u && (self.row(j)[u_word] & u_mask) == 0 {
                continue;
            }
            for (word, &succ) in self.row_mut(j).iter_mut().zip(&successors) {
                added += (succ & !*word).count_ones() as usize;
                *word |= succ;
            }
        }
        added
    }

    /// Number of established facts.
    pub fn fact_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Check `less(a, b) ∧ less(b, c) ⇒ less(a, c)` for every triple.
    pub fn is_transitively_closed(&self) -> bool {
        (0..self.nodes).all(|a| {
            (0..self.nodes)
                .filter(|&b| self.less(a, b))
                .all(|b| (0..self.nodes).all(|c| !self.less(b, c) || self.less(a, c)))
        })
    }

    /// Check that no node is less than itself and no pair is ordered both ways.
    pub fn is_strict(&self) -> bool {
        (0..self.nodes).all(|a| {
            !self.less(a, a) && (a + 1..self.nodes).all(|b| !(self.less(a, b) && self.less(b, a)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_knows_nothing() {
        let m = RelationMatrix::new(70);
        assert_eq!(m.fact_count(), 0);
        assert_eq!(m.query(0, 69), Relation::Unknown);
        assert!(m.is_strict());
    }

    #[test]
    fn test_record_sets_direct_fact() {
        let mut m = RelationMatrix::new(3);
        assert_eq!(m.record(0, 1), 1);
        assert_eq!(m.query(0, 1), Relation::Less);
        assert_eq!(m.query(1, 0), Relation::Greater);
        assert_eq!(m.query(0, 2), Relation::Unknown);
    }

    #[test]
    fn test_record_propagates_chain() {
        let mut m = RelationMatrix::new(4);
        m.record(0, 1);
        m.record(2, 3);
        // 1 < 2 joins both chains: {0,1} < {2,3}
        assert_eq!(m.record(1, 2), 4);
        assert!(m.less(0, 3));
        assert!(m.less(0, 2));
        assert!(m.less(1, 3));
        assert!(m.is_transitively_closed());
        assert_eq!(m.fact_count(), 6);
    }

    #[test]
    fn test_record_is_idempotent() {
        let mut m = RelationMatrix::new(3);
        m.record(0, 1);
        m.record(1, 2);
        let before = m.fact_count();
        assert_eq!(m.record(0, 2), 0);
        assert_eq!(m.record(1, 2), 0);
        assert_eq!(m.fact_count(), before);
    }

    #[test]
    fn test_crosses_word_boundary() {
        let mut m = RelationMatrix::new(130);
        m.record(5, 64);
        m.record(64, 129);
        assert!(m.less(5, 129));
        assert!(m.is_known(129, 5));
        assert!(!m.is_known(5, 128));
    }

    #[test]
    #[should_panic(expected = "before itself")]
    fn test_self_fact_panics() {
        RelationMatrix::new(2).record(1, 1);
    }
}
