//! Small synthetic catalogs shared by unit tests.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, CatalogRow};
use crate::matrix::SparseVector;
use crate::types::Course;
use crate::vocabulary::{AnalyzerConfig, Vocabulary};

pub(crate) fn course(code: &str, level: i64) -> Course {
	Course {
		code: code.to_string(),
		label: String::new(),
		name: format!("{} name", code),
		division: "Science".to_string(),
		department: "Computer Science".to_string(),
		campus: "St. George".to_string(),
		level,
		description: format!("{} description", code),
		prerequisites: Vec::new(),
		recommended_preparation: Vec::new(),
		extra: BTreeMap::new(),
	}
}

pub(crate) fn row(course: Course, pairs: &[(u32, f32)]) -> CatalogRow {
	CatalogRow::new(course, SparseVector::from_pairs(pairs.iter().copied()))
}

pub(crate) fn vocabulary(terms: &[&str]) -> Vocabulary {
	Vocabulary::new(
		terms.iter().map(|t| t.to_string()).collect(),
		AnalyzerConfig::default(),
	)
	.unwrap()
}

/// Vocabulary `["biology", "learning", "machine", "machine learning"]` and:
///
/// | row | code   | level | vector                  | references        |
/// |-----|--------|-------|-------------------------|-------------------|
/// | 0   | ML300  | 3     | learning, machine, ml   | pre: PROG200      |
/// | 1   | BIO300 | 3     | biology                 | pre: BIO200       |
/// | 2   | PROG200| 2     | machine                 | pre: INTRO100     |
/// | 3   | BIO200 | 2     | biology                 |                   |
/// | 4   | STAT200| 2     | learning                | rec: INTRO100     |
/// | 5   | INTRO100| 1    | (empty)                 |                   |
/// | 6   | ML310  | 3     | learning, ml            | pre: STAT200, X   |
pub(crate) fn ml_catalog() -> (Vocabulary, Catalog) {
	let vocab = vocabulary(&["biology", "learning", "machine", "machine learning"]);

	let mut ml = course("ML300", 3);
	ml.prerequisites = vec!["PROG200".into()];
	let mut bio = course("BIO300", 3);
	bio.prerequisites = vec!["BIO200".into()];
	bio.division = "Arts".into();
	let mut prog = course("PROG200", 2);
	prog.prerequisites = vec!["INTRO100".into()];
	let mut bio2 = course("BIO200", 2);
	bio2.division = "Arts".into();
	let mut stat = course("STAT200", 2);
	stat.recommended_preparation = vec!["INTRO100".into()];
	let intro = course("INTRO100", 1);
	let mut ml2 = course("ML310", 3);
	ml2.prerequisites = vec!["STAT200".into(), "X999".into()];

	let catalog = Catalog::new(
		vec![
			row(ml, &[(1, 1.0), (2, 1.0), (3, 1.0)]),
			row(bio, &[(0, 1.0)]),
			row(prog, &[(2, 1.0)]),
			row(bio2, &[(0, 2.0)]),
			row(stat, &[(1, 1.0)]),
			row(intro, &[]),
			row(ml2, &[(1, 1.0), (3, 1.0)]),
		],
		vocab.len(),
	)
	.unwrap();

	(vocab, catalog)
}
