// ---------------------------------------------------------------------------
// Requisite score propagation
// ---------------------------------------------------------------------------
//
// Courses hand their relevance to the courses they list as prerequisites or
// recommended preparation. A referenced course's requisite score is the mean
// relevance of the referrers that qualified; references outside the catalog
// are ignored.
//
// Which referrers qualify depends on `PropagationMode`:
//
// - `Literal` walks rows in catalog order and stops at the first row whose
//   score reaches the cutoff. Everything after that row is ignored, whatever
//   its score.
// - `Sorted` walks rows by descending score and skips every row at or above
//   the cutoff, so exactly the rows below the cutoff qualify.
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

pub const DEFAULT_REQUISITE_CUTOFF: f64 = 100.0;

// ---------------------------------------------------------------------------
// PropagationMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
	#[default]
	Literal,
	Sorted,
}

impl FromStr for PropagationMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"literal" => Ok(Self::Literal),
			"sorted" => Ok(Self::Sorted),
			other => Err(format!(
				"unknown propagation mode '{}' (expected 'literal' or 'sorted')",
				other
			)),
		}
	}
}

impl fmt::Display for PropagationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal => f.write_str("literal"),
			Self::Sorted => f.write_str("sorted"),
		}
	}
}

// ---------------------------------------------------------------------------
// RequisiteScores
// ---------------------------------------------------------------------------

/// Averaged requisite score per referenced course code, kept in the order
/// each code was first referenced during the walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequisiteScores {
	entries: Vec<(String, f64)>,
	index: HashMap<String, usize>,
}

impl RequisiteScores {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, code: &str) -> Option<f64> {
		self.index.get(code).map(|&i| self.entries[i].1)
	}

	/// Entries in first-reference order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.entries.iter().map(|(c, s)| (c.as_str(), *s))
	}

	/// Entries by descending score; ties keep first-reference order.
	pub fn ranked(&self) -> Vec<(&str, f64)> {
		let mut ranked: Vec<(&str, f64)> = self.iter().collect();
		ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
		ranked
	}
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Propagate `scores` (one per catalog row, catalog order) onto referenced
/// courses.
pub fn propagate(
	scores: &[f64],
	catalog: &Catalog,
	mode: PropagationMode,
	cutoff: f64,
) -> RequisiteScores {
	debug_assert_eq!(scores.len(), catalog.len());

	let walk: Vec<usize> = match mode {
		PropagationMode::Literal => (0..scores.len()).collect(),
		PropagationMode::Sorted => {
			let mut order: Vec<usize> = (0..scores.len()).collect();
			order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
			order
		}
	};

	// Pass 1: sums and counts per referenced code.
	let mut totals: Vec<(String, f64, usize)> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for pos in walk {
		let score = scores[pos];
		let qualifies = score < cutoff;
		if !qualifies {
			match mode {
				PropagationMode::Literal => break,
				PropagationMode::Sorted => continue,
			}
		}

		let Some(row) = catalog.row(pos) else {
			continue;
		};
		for code in row.course.references() {
			if !catalog.contains(code) {
				tracing::debug!(referrer = %row.course.code, code, "Skipping reference outside catalog");
				continue;
			}
			let slot = *index.entry(code.to_string()).or_insert_with(|| {
				totals.push((code.to_string(), 0.0, 0));
				totals.len() - 1
			});
			totals[slot].1 += score;
			totals[slot].2 += 1;
		}
	}

	// Pass 2: reduce to means.
	let entries = totals
		.into_iter()
		.map(|(code, sum, count)| (code, sum / count as f64))
		.collect();

	RequisiteScores { entries, index }
}
