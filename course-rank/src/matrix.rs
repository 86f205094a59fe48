// ---------------------------------------------------------------------------
// Sparse term vectors and the term-document matrix capability
// ---------------------------------------------------------------------------
//
// A course's term vector is stored sparsely: ascending feature positions with
// one non-negative weight each. `TermMatrix` is the capability the scorer
// needs from whatever holds those vectors: column selection ("which rows have
// a non-zero weight at feature f") and row-to-row cosine similarity.
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SparseVector
// ---------------------------------------------------------------------------

/// A sparse, non-negative term-weight vector.
///
/// `indices` must be strictly ascending and the same length as `weights`;
/// [`SparseVector::validate`] checks this for vectors read from a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
	pub indices: Vec<u32>,
	pub weights: Vec<f32>,
}

impl SparseVector {
	pub fn new(indices: Vec<u32>, weights: Vec<f32>) -> Self {
		Self { indices, weights }
	}

	/// Build from unordered `(feature, weight)` pairs, summing repeats and
	/// dropping zero weights.
	pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
		let mut pairs: Vec<(u32, f32)> = pairs.into_iter().collect();
		pairs.sort_by_key(|(i, _)| *i);

		let mut indices: Vec<u32> = Vec::with_capacity(pairs.len());
		let mut weights: Vec<f32> = Vec::with_capacity(pairs.len());
		for (i, w) in pairs {
			match indices.last() {
				Some(&last) if last == i => {
					if let Some(acc) = weights.last_mut() {
						*acc += w;
					}
				}
				_ => {
					indices.push(i);
					weights.push(w);
				}
			}
		}

		let (indices, weights) = indices
			.into_iter()
			.zip(weights)
			.filter(|(_, w)| *w != 0.0)
			.unzip();
		Self { indices, weights }
	}

	pub fn nnz(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	/// Weight at `feature`, 0.0 when the feature is absent.
	pub fn weight(&self, feature: u32) -> f32 {
		match self.indices.binary_search(&feature) {
			Ok(pos) => self.weights[pos],
			Err(_) => 0.0,
		}
	}

	/// Lowest feature position carrying a non-zero weight.
	pub fn first_feature(&self) -> Option<u32> {
		self.indices
			.iter()
			.zip(&self.weights)
			.find(|(_, w)| **w != 0.0)
			.map(|(i, _)| *i)
	}

	/// Iterate `(feature, weight)` pairs in ascending feature order.
	pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
		self.indices.iter().copied().zip(self.weights.iter().copied())
	}

	/// Check the structural invariants against a vocabulary of `dimensions`
	/// features. Returns a human-readable reason on failure.
	pub fn validate(&self, dimensions: usize) -> Result<(), String> {
		if self.indices.len() != self.weights.len() {
			return Err(format!(
				"{} indices but {} weights",
				self.indices.len(),
				self.weights.len()
			));
		}
		for pair in self.indices.windows(2) {
			if pair[0] >= pair[1] {
				return Err(format!(
					"indices not strictly ascending at {} -> {}",
					pair[0], pair[1]
				));
			}
		}
		if let Some(&last) = self.indices.last() {
			if last as usize >= dimensions {
				return Err(format!(
					"feature {} outside vocabulary of {} terms",
					last, dimensions
				));
			}
		}
		if let Some(w) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
			return Err(format!("invalid weight {}", w));
		}
		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

/// Dot product of two sparse vectors (merge join over sorted indices).
pub fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
	let (mut i, mut j) = (0usize, 0usize);
	let mut sum: f64 = 0.0;
	while i < a.indices.len() && j < b.indices.len() {
		match a.indices[i].cmp(&b.indices[j]) {
			std::cmp::Ordering::Less => i += 1,
			std::cmp::Ordering::Greater => j += 1,
			std::cmp::Ordering::Equal => {
				sum += (a.weights[i] as f64) * (b.weights[j] as f64);
				i += 1;
				j += 1;
			}
		}
	}
	sum
}

/// Compute the magnitude (L2 norm) of a vector.
pub fn compute_magnitude(v: &SparseVector) -> f64 {
	let mut sum: f64 = 0.0;
	for &w in &v.weights {
		let wf = w as f64;
		sum += wf * wf;
	}
	sum.sqrt()
}

/// Compute cosine similarity between two sparse vectors.
/// Returns 0.0 when either vector has zero magnitude.
/// Result clamped to [-1.0, 1.0].
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
	cosine_similarity_with_magnitude(a, b, compute_magnitude(a), compute_magnitude(b))
}

/// Cosine similarity using pre-computed magnitudes.
pub fn cosine_similarity_with_magnitude(
	a: &SparseVector,
	b: &SparseVector,
	mag_a: f64,
	mag_b: f64,
) -> f64 {
	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 0.0;
	}

	let result = dot(a, b) / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// TermMatrix
// ---------------------------------------------------------------------------

/// Read-only term-document matrix: one sparse row per course, in catalog
/// order.
pub trait TermMatrix {
	/// Number of rows (courses).
	fn row_count(&self) -> usize;

	/// Rows whose weight at `feature` is non-zero, ascending.
	fn direct_matches(&self, feature: usize) -> &[usize];

	/// Cosine similarity between rows `a` and `b`.
	fn similarity(&self, a: usize, b: usize) -> f64;

	/// Cosine similarity of every row in `rows_a` against every row in
	/// `rows_b`; result is `rows_a.len()` x `rows_b.len()`.
	fn pairwise_similarity(&self, rows_a: &[usize], rows_b: &[usize]) -> Vec<Vec<f64>> {
		rows_a
			.iter()
			.map(|&a| rows_b.iter().map(|&b| self.similarity(a, b)).collect())
			.collect()
	}

	/// For every row, the mean cosine similarity against `targets`.
	/// An empty target set yields all zeros.
	fn mean_similarity(&self, targets: &[usize]) -> Vec<f64> {
		if targets.is_empty() {
			return vec![0.0; self.row_count()];
		}
		let all: Vec<usize> = (0..self.row_count()).collect();
		self.pairwise_similarity(&all, targets)
			.into_iter()
			.map(|row| row.iter().sum::<f64>() / targets.len() as f64)
			.collect()
	}
}

/// Sum of the L2-normalized `vectors`, densified over `dimensions` features.
/// Zero-magnitude vectors contribute nothing.
///
/// For non-negative rows, `dot(v, centroid) / (|v| * n)` equals the mean
/// cosine similarity of `v` against the `n` summed vectors.
pub fn normalized_centroid<'a>(
	vectors: impl IntoIterator<Item = (&'a SparseVector, f64)>,
	dimensions: usize,
) -> Vec<f64> {
	let mut centroid = vec![0.0f64; dimensions];
	for (v, magnitude) in vectors {
		if magnitude == 0.0 {
			continue;
		}
		for (i, w) in v.iter() {
			if let Some(slot) = centroid.get_mut(i as usize) {
				*slot += (w as f64) / magnitude;
			}
		}
	}
	centroid
}

/// Dot product of a sparse vector against a dense one.
pub fn dot_dense(v: &SparseVector, dense: &[f64]) -> f64 {
	v.iter()
		.map(|(i, w)| dense.get(i as usize).copied().unwrap_or(0.0) * (w as f64))
		.sum()
}
