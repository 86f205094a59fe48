// ---------------------------------------------------------------------------
// Year stratification
// ---------------------------------------------------------------------------
//
// The requested year's table ranks every course by direct relevance. Each
// earlier year, down to year 1, ranks only the courses that received a
// requisite score. All tables apply the same level, facet and row-cap rules.
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::propagation::RequisiteScores;
use crate::types::{Course, CourseRow, FacetFilters, Table};

/// Keep courses of `year` that pass `facets`, in the given order, capped at
/// `top` rows.
fn select<'a>(
	ranked: impl Iterator<Item = &'a Course>,
	year: i64,
	facets: &FacetFilters,
	top: usize,
) -> Table {
	ranked
		.filter(|c| c.level == year && facets.matches(c))
		.take(top)
		.map(CourseRow::from)
		.collect()
}

/// Catalog rows ordered by descending relevance; ties keep catalog order.
pub fn relevance_order(scores: &[f64]) -> Vec<usize> {
	let mut order: Vec<usize> = (0..scores.len()).collect();
	order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
	order
}

/// Table for the requested year, ranked by relevance.
pub fn primary_table(
	catalog: &Catalog,
	scores: &[f64],
	year: i64,
	facets: &FacetFilters,
	top: usize,
) -> Table {
	let order = relevance_order(scores);
	select(
		order.iter().filter_map(|&pos| catalog.row(pos)).map(|r| &r.course),
		year,
		facets,
		top,
	)
}

/// Table for an earlier year, ranked by requisite score. Courses without a
/// requisite score are not eligible.
pub fn prior_year_table(
	catalog: &Catalog,
	requisite: &RequisiteScores,
	year: i64,
	facets: &FacetFilters,
	top: usize,
) -> Table {
	let ranked = requisite.ranked();
	select(
		ranked.iter().filter_map(|(code, _)| catalog.get(code)),
		year,
		facets,
		top,
	)
}

/// One table per year from `year` down to 1, nearest first. A year below 1
/// yields no tables.
pub fn stratify(
	catalog: &Catalog,
	scores: &[f64],
	requisite: &RequisiteScores,
	year: i64,
	facets: &FacetFilters,
	top: usize,
) -> Vec<Table> {
	if year <= 0 {
		return Vec::new();
	}

	// No row can match above the highest level.
	let max_level = catalog.max_level().unwrap_or(0);

	let mut tables = Vec::new();
	for y in (1..=year).rev() {
		let table = if y > max_level {
			Table::new()
		} else if y == year {
			primary_table(catalog, scores, y, facets, top)
		} else {
			prior_year_table(catalog, requisite, y, facets, top)
		};
		tables.push(table);
	}

	tables
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::propagation::{propagate, PropagationMode, DEFAULT_REQUISITE_CUTOFF};
	use crate::scorer::score;
	use crate::test_support::ml_catalog;

	fn codes(table: &Table) -> Vec<&str> {
		table.iter().map(|r| r.course.as_str()).collect()
	}

	fn setup() -> (Catalog, Vec<f64>, RequisiteScores) {
		let (vocab, catalog) = ml_catalog();
		let scores = score(&["machine learning".to_string()], &vocab, &catalog);
		let req = propagate(&scores, &catalog, PropagationMode::Literal, DEFAULT_REQUISITE_CUTOFF);
		(catalog, scores, req)
	}

	#[test]
	fn relevance_order_is_stable() {
		assert_eq!(relevance_order(&[0.0, 0.5, 0.0, 0.5, 1.0]), vec![4, 1, 3, 0, 2]);
	}

	#[test]
	fn tables_for_each_year_nearest_first() {
		let (catalog, scores, req) = setup();
		let tables = stratify(&catalog, &scores, &req, 3, &FacetFilters::default(), 10);

		assert_eq!(tables.len(), 3);
		assert_eq!(codes(&tables[0]), vec!["ML310", "ML300", "BIO300"]);
		assert_eq!(codes(&tables[1]), vec!["STAT200", "PROG200", "BIO200"]);
		assert_eq!(codes(&tables[2]), vec!["INTRO100"]);
		assert!(tables.iter().enumerate().all(|(i, t)| t
			.iter()
			.all(|r| r.level == 3 - i as i64)));
	}

	#[test]
	fn row_cap_applies_to_every_table() {
		let (catalog, scores, req) = setup();
		let tables = stratify(&catalog, &scores, &req, 3, &FacetFilters::default(), 1);
		assert_eq!(codes(&tables[0]), vec!["ML310"]);
		assert_eq!(codes(&tables[1]), vec!["STAT200"]);
		assert_eq!(codes(&tables[2]), vec!["INTRO100"]);

		let empty = stratify(&catalog, &scores, &req, 3, &FacetFilters::default(), 0);
		assert_eq!(empty.len(), 3);
		assert!(empty.iter().all(|t| t.is_empty()));
	}

	#[test]
	fn facets_filter_every_table() {
		let (catalog, scores, req) = setup();
		let arts = FacetFilters::new("Arts", "Any", "Any");
		let tables = stratify(&catalog, &scores, &req, 3, &arts, 10);
		assert_eq!(codes(&tables[0]), vec!["BIO300"]);
		assert_eq!(codes(&tables[1]), vec!["BIO200"]);
		assert!(tables[2].is_empty());
		assert!(tables.iter().flatten().all(|r| r.division == "Arts"));

		let nowhere = FacetFilters::new("Any", "Any", "Scarborough");
		let tables = stratify(&catalog, &scores, &req, 3, &nowhere, 10);
		assert_eq!(tables.len(), 3);
		assert!(tables.iter().all(|t| t.is_empty()));
	}

	#[test]
	fn non_positive_year_yields_nothing() {
		let (catalog, scores, req) = setup();
		assert!(stratify(&catalog, &scores, &req, 0, &FacetFilters::default(), 10).is_empty());
		assert!(stratify(&catalog, &scores, &req, -2, &FacetFilters::default(), 10).is_empty());
	}

	#[test]
	fn year_above_all_levels_gives_empty_primary() {
		let (catalog, scores, req) = setup();
		let tables = stratify(&catalog, &scores, &req, 5, &FacetFilters::default(), 10);
		assert_eq!(tables.len(), 5);
		assert!(tables[0].is_empty());
		assert!(tables[1].is_empty());
		// Level-3 courses are never referenced, so year 3 is empty as a prior year.
		assert!(tables[2].is_empty());
		assert_eq!(codes(&tables[3]), vec!["STAT200", "PROG200", "BIO200"]);
		assert_eq!(codes(&tables[4]), vec!["INTRO100"]);
	}

	#[test]
	fn far_future_year_is_all_empty_above_catalog_levels() {
		let (catalog, scores, req) = setup();
		let tables = stratify(&catalog, &scores, &req, 100, &FacetFilters::default(), 10);
		assert_eq!(tables.len(), 100);
		assert!(tables[..98].iter().all(|t| t.is_empty()));
		assert_eq!(codes(&tables[98]), vec!["STAT200", "PROG200", "BIO200"]);
		assert_eq!(codes(&tables[99]), vec!["INTRO100"]);
	}

	#[test]
	fn empty_catalog_yields_empty_tables() {
		let catalog = Catalog::new(Vec::new(), 0).unwrap();
		let tables = stratify(
			&catalog,
			&[],
			&RequisiteScores::default(),
			2,
			&FacetFilters::default(),
			10,
		);
		assert_eq!(tables.len(), 2);
		assert!(tables.iter().all(|t| t.is_empty()));
	}

	#[test]
	fn prior_year_only_ranks_referenced_courses() {
		let (catalog, _, req) = setup();
		let table = prior_year_table(&catalog, &req, 3, &FacetFilters::default(), 10);
		// No level-3 course is referenced by anything.
		assert!(table.is_empty());
	}
}
