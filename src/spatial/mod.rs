//! Radius queries over 2D points.
//!
//! `PointIndex` wraps an [`rstar::RTree`] and answers "every point within `r` of
//! each query point". Answers for a batch of queries come back as a
//! [`NeighborTable`]: a rectangular block of indices where short rows are padded
//! by repeating their first neighbor, plus a parallel mask flagging rows that
//! have no neighbor at all. Padding is never a neighbor on its own.

use crate::float_types::Real;
use rstar::{RTree, primitives::GeomWithData};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of queries materialized at once by [`PointIndex::map_chunks`].
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

type Entry = GeomWithData<[Real; 2], usize>;

/// Spatial index over a fixed set of points; the payload is the point's index.
#[derive(Clone, Debug)]
pub struct PointIndex {
    tree: RTree<Entry>,
    len: usize,
}

impl Default for PointIndex {
    fn default() -> Self {
        Self { tree: RTree::new(), len: 0 }
    }
}

impl PointIndex {
    pub fn new(points: &[[Real; 2]]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(*p, i))
            .collect();
        Self { tree: RTree::bulk_load(entries), len: points.len() }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indices of the points within `radius` of `query`, ascending.
    pub fn within_one(&self, query: [Real; 2], radius: Real) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .tree
            .locate_within_distance(query, radius * radius)
            .map(|entry| entry.data)
            .collect();
        found.sort_unstable();
        found
    }

    /// Neighbor table for every query.
    pub fn within(&self, queries: &[[Real; 2]], radius: Real) -> NeighborTable {
        NeighborTable::from_jagged(
            queries
                .iter()
                .map(|q| self.within_one(*q, radius))
                .collect(),
        )
    }

    /// Runs `f` over consecutive chunks of `queries` and concatenates the per-chunk
    /// outputs in query order. `f` receives the offset of the chunk in `queries`,
    /// the chunk and its neighbor table, and must return one value per query.
    #[cfg(not(feature = "parallel"))]
    pub fn map_chunks<R, F>(
        &self,
        queries: &[[Real; 2]],
        radius: Real,
        chunk_size: usize,
        f: F,
    ) -> Vec<R>
    where
        R: Send,
        F: Fn(usize, &[[Real; 2]], &NeighborTable) -> Vec<R> + Send + Sync,
    {
        let chunk_size = chunk_size.max(1);
        let mut results = Vec::with_capacity(queries.len());
        for (c, chunk) in queries.chunks(chunk_size).enumerate() {
            let table = self.within(chunk, radius);
            let out = f(c * chunk_size, chunk, &table);
            debug_assert_eq!(out.len(), chunk.len());
            results.extend(out);
        }
        results
    }

    /// Parallel version of `map_chunks`; chunks are dispatched to rayon.
    #[cfg(feature = "parallel")]
    pub fn map_chunks<R, F>(
        &self,
        queries: &[[Real; 2]],
        radius: Real,
        chunk_size: usize,
        f: F,
    ) -> Vec<R>
    where
        R: Send,
        F: Fn(usize, &[[Real; 2]], &NeighborTable) -> Vec<R> + Send + Sync,
    {
        let chunk_size = chunk_size.max(1);
        let per_chunk: Vec<Vec<R>> = queries
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(c, chunk)| {
                let table = self.within(chunk, radius);
                f(c * chunk_size, chunk, &table)
            })
            .collect();
        per_chunk.into_iter().flatten().collect()
    }
}

/// Rectangular neighbor lists with an explicit "no neighbor" mask.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborTable {
    width: usize,
    indices: Vec<usize>,
    counts: Vec<usize>,
    empty: Vec<bool>,
}

impl NeighborTable {
    /// Normalizes jagged rows: rows shorter than the widest one are padded by
    /// repeating their first index. Rows without neighbors are zero-filled and
    /// flagged in the empty mask.
    pub fn from_jagged(rows: Vec<Vec<usize>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut indices = Vec::with_capacity(width * rows.len());
        let mut counts = Vec::with_capacity(rows.len());
        let mut empty = Vec::with_capacity(rows.len());

        for row in rows {
            counts.push(row.len());
            empty.push(row.is_empty());
            let pad = row.first().copied().unwrap_or(0);
            let missing = width - row.len();
            indices.extend(row);
            indices.extend(std::iter::repeat_n(pad, missing));
        }

        Self { width, indices, counts, empty }
    }

    pub fn rows(&self) -> usize {
        self.counts.len()
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    /// The padded row.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.indices[row * self.width..(row + 1) * self.width]
    }

    /// Only the genuine neighbors of `row`.
    pub fn neighbors(&self, row: usize) -> &[usize] {
        &self.row(row)[..self.counts[row]]
    }

    pub fn is_empty(&self, row: usize) -> bool {
        self.empty[row]
    }

    pub fn empty_mask(&self) -> &[bool] {
        &self.empty
    }
}
