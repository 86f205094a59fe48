// ---------------------------------------------------------------------------
// Catalog: row-ordered course store and its term-document matrix
// ---------------------------------------------------------------------------
//
// Each row holds a course record together with its term vector, so the
// record order and the matrix row order cannot drift apart. A column postings
// list (feature -> rows with a non-zero weight) is built once at construction
// and answers direct-match lookups without scanning the matrix.
// ---------------------------------------------------------------------------

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::RankError;
use crate::matrix::{
	compute_magnitude, cosine_similarity_with_magnitude, dot_dense, normalized_centroid,
	SparseVector, TermMatrix,
};
use crate::types::{Course, FacetOptions, RequisiteLinks, ANY, TOP_CHOICES};

// ---------------------------------------------------------------------------
// CatalogRow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CatalogRow {
	pub course: Course,
	pub vector: SparseVector,
	magnitude: f64,
}

impl CatalogRow {
	pub fn new(course: Course, vector: SparseVector) -> Self {
		let magnitude = compute_magnitude(&vector);
		Self {
			course,
			vector,
			magnitude,
		}
	}

	pub fn magnitude(&self) -> f64 {
		self.magnitude
	}
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Catalog {
	rows: Vec<CatalogRow>,
	by_code: HashMap<String, usize>,
	/// feature -> ascending row indices with a non-zero weight
	postings: Vec<Vec<usize>>,
	dimensions: usize,
}

impl Catalog {
	/// Build a catalog over `dimensions` vocabulary features.
	///
	/// Fails with [`RankError::Corruption`] on duplicate course codes or on a
	/// term vector that does not fit the vocabulary.
	pub fn new(rows: Vec<CatalogRow>, dimensions: usize) -> Result<Self, RankError> {
		let mut by_code = HashMap::with_capacity(rows.len());
		let mut postings: Vec<Vec<usize>> = vec![Vec::new(); dimensions];

		for (pos, row) in rows.iter().enumerate() {
			if by_code.insert(row.course.code.clone(), pos).is_some() {
				return Err(RankError::Corruption(format!(
					"duplicate course code '{}'",
					row.course.code
				)));
			}
			row.vector.validate(dimensions).map_err(|reason| {
				RankError::Corruption(format!(
					"term vector of '{}': {}",
					row.course.code, reason
				))
			})?;
			for (feature, weight) in row.vector.iter() {
				if weight != 0.0 {
					postings[feature as usize].push(pos);
				}
			}
		}

		Ok(Self {
			rows,
			by_code,
			postings,
			dimensions,
		})
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn rows(&self) -> &[CatalogRow] {
		&self.rows
	}

	pub fn row(&self, position: usize) -> Option<&CatalogRow> {
		self.rows.get(position)
	}

	pub fn courses(&self) -> impl Iterator<Item = &Course> {
		self.rows.iter().map(|r| &r.course)
	}

	pub fn position(&self, code: &str) -> Option<usize> {
		self.by_code.get(code).copied()
	}

	pub fn contains(&self, code: &str) -> bool {
		self.by_code.contains_key(code)
	}

	pub fn get(&self, code: &str) -> Option<&Course> {
		self.position(code).map(|pos| &self.rows[pos].course)
	}

	// -- Detail-view helpers ------------------------------------------------

	/// Map a possibly unknown code onto a catalog code.
	///
	/// A known code resolves to itself. Otherwise the last character is
	/// dropped until some catalog code contains what is left; the first such
	/// code in catalog order wins. `None` once nothing is left.
	pub fn resolve_code(&self, code: &str) -> Option<String> {
		if self.contains(code) {
			return Some(code.to_string());
		}

		let mut prefix: Vec<char> = code.chars().collect();
		loop {
			prefix.pop();
			if prefix.is_empty() {
				return None;
			}
			let needle: String = prefix.iter().collect();
			if let Some(course) = self.courses().find(|c| c.code.contains(&needle)) {
				return Some(course.code.clone());
			}
		}
	}

	/// Requisite neighbours of `code`, or `None` if it is not in the catalog.
	pub fn requisite_links(&self, code: &str) -> Option<RequisiteLinks> {
		let course = self.get(code)?;

		let mut seen = HashSet::new();
		let requires = course
			.references()
			.filter(|r| self.contains(r) && seen.insert(*r))
			.map(str::to_string)
			.collect();

		let required_by = self
			.courses()
			.filter(|c| c.references().any(|r| r == code))
			.map(|c| c.code.clone())
			.collect();

		Some(RequisiteLinks {
			requires,
			required_by,
		})
	}

	/// Highest course level in the catalog, `None` when it is empty.
	pub fn max_level(&self) -> Option<i64> {
		self.courses().map(|c| c.level).max()
	}

	/// Distinct facet values, sorted, each list led by the "Any" sentinel.
	pub fn facet_options(&self) -> FacetOptions {
		fn with_any(values: BTreeSet<&str>) -> Vec<String> {
			std::iter::once(ANY)
				.chain(values)
				.map(str::to_string)
				.collect()
		}

		FacetOptions {
			divisions: with_any(self.courses().map(|c| c.division.as_str()).collect()),
			departments: with_any(self.courses().map(|c| c.department.as_str()).collect()),
			campuses: with_any(self.courses().map(|c| c.campus.as_str()).collect()),
			years: self
				.courses()
				.map(|c| c.level)
				.collect::<BTreeSet<_>>()
				.into_iter()
				.collect(),
			top: TOP_CHOICES.to_vec(),
		}
	}
}

// ---------------------------------------------------------------------------
// TermMatrix
// ---------------------------------------------------------------------------

impl TermMatrix for Catalog {
	fn row_count(&self) -> usize {
		self.rows.len()
	}

	fn direct_matches(&self, feature: usize) -> &[usize] {
		self.postings.get(feature).map(Vec::as_slice).unwrap_or(&[])
	}

	fn similarity(&self, a: usize, b: usize) -> f64 {
		let (ra, rb) = (&self.rows[a], &self.rows[b]);
		cosine_similarity_with_magnitude(&ra.vector, &rb.vector, ra.magnitude, rb.magnitude)
	}

	/// Single pass per row against the normalized centroid of `targets`
	/// instead of the full pairwise matrix.
	fn mean_similarity(&self, targets: &[usize]) -> Vec<f64> {
		if targets.is_empty() {
			return vec![0.0; self.rows.len()];
		}

		let n = targets.len() as f64;
		let centroid = normalized_centroid(
			targets
				.iter()
				.map(|&t| (&self.rows[t].vector, self.rows[t].magnitude)),
			self.dimensions,
		);

		self.rows
			.iter()
			.map(|row| {
				if row.magnitude == 0.0 {
					return 0.0;
				}
				let mean = dot_dense(&row.vector, &centroid) / (row.magnitude * n);
				if mean.is_finite() {
					mean.clamp(-1.0, 1.0)
				} else {
					0.0
				}
			})
			.collect()
	}
}
