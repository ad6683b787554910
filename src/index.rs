//! Flat in-memory vector index over squared Euclidean distance.
//!
//! Nothing approximate here: every query scans all rows, exactly like a flat
//! L2 index. The dimension is pinned by the first vector at build time and
//! every later vector (and every query) must match it.

use crate::types::DiagError;

/// One search hit: the insertion position of the vector and its squared
/// Euclidean distance to the query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub distance: f32,
}

/// An ownership-exclusive collection of fixed-dimension vectors.
#[derive(Clone, Debug)]
pub struct VectorIndex {
    dimension: usize,
    rows: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Builds an index from a non-empty sequence of equal-dimension vectors.
    ///
    /// The dimension is taken from the first vector. Fails with
    /// [`DiagError::EmptyIndex`] on zero vectors and
    /// [`DiagError::DimensionMismatch`] on inconsistent lengths.
    pub fn build(rows: Vec<Vec<f32>>) -> Result<Self, DiagError> {
        let Some(first) = rows.first() else {
            return Err(DiagError::EmptyIndex);
        };
        let dimension = first.len();
        for row in &rows {
            if row.len() != dimension {
                return Err(DiagError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
        }
        Ok(Self { dimension, rows })
    }

    /// The fixed vector dimension `d`.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the `k` nearest stored vectors to `query`, ascending by
    /// squared Euclidean distance.
    ///
    /// Returns all stored vectors when fewer than `k` exist. Ties are broken
    /// by insertion order (stable sort). Fails with
    /// [`DiagError::DimensionMismatch`] when the query length differs from
    /// the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>, DiagError> {
        if query.len() != self.dimension {
            return Err(DiagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<Hit> = self
            .rows
            .iter()
            .enumerate()
            .map(|(position, row)| Hit {
                position,
                distance: squared_l2(query, row),
            })
            .collect();
        // Stable sort: equal distances keep insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_two_of_three() {
        let index = VectorIndex::build(vec![
            vec![0.0, 0.0],
            vec![5.0, 5.0],
            vec![1.0, 1.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].position, 2);
        assert_eq!(hits[1].distance, 2.0);
    }

    #[test]
    fn returns_min_of_k_and_len() {
        let index = VectorIndex::build(vec![vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0], 1).unwrap().len(), 1);
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn distances_are_non_decreasing() {
        let index = VectorIndex::build(vec![
            vec![3.0, 0.0],
            vec![1.0, 0.0],
            vec![2.0, 0.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert_eq!(
            hits.iter().map(|h| h.position).collect::<Vec<_>>(),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(
            hits.iter().map(|h| h.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn empty_build_is_rejected() {
        assert!(matches!(
            VectorIndex::build(Vec::new()),
            Err(DiagError::EmptyIndex)
        ));
    }

    #[test]
    fn inconsistent_dimensions_are_rejected() {
        let err = VectorIndex::build(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(
            err,
            DiagError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn query_dimension_is_checked() {
        let index = VectorIndex::build(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            index.search(&[1.0], 1),
            Err(DiagError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
