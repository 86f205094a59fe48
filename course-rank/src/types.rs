use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facet sentinel meaning "no filter".
pub const ANY: &str = "Any";

/// Result-cap choices offered to clients.
pub const TOP_CHOICES: [usize; 3] = [10, 25, 50];

pub const DEFAULT_TOP: usize = 10;

/// Highest year a rank request may ask for. One table is returned per year,
/// so the request year bounds the response size.
pub const MAX_YEAR: i64 = 100;

// ---------------------------------------------------------------------------
// Course record
// ---------------------------------------------------------------------------

/// One course as stored in the corpus. Field names follow the corpus column
/// names; columns the ranker does not use are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
	#[serde(rename = "Code")]
	pub code: String,
	/// Display label for the course column; falls back to `code` when empty.
	#[serde(rename = "Course", default)]
	pub label: String,
	#[serde(rename = "Name", default)]
	pub name: String,
	#[serde(rename = "Division", default)]
	pub division: String,
	#[serde(rename = "Department", default)]
	pub department: String,
	#[serde(rename = "Campus", default)]
	pub campus: String,
	#[serde(rename = "Course Level")]
	pub level: i64,
	#[serde(rename = "Course Description", default)]
	pub description: String,
	#[serde(rename = "Pre-requisites", default)]
	pub prerequisites: Vec<String>,
	#[serde(rename = "Recommended Preparation", default)]
	pub recommended_preparation: Vec<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

impl Course {
	/// Referenced course codes: prerequisites first, then recommended
	/// preparation. May contain codes absent from the catalog.
	pub fn references(&self) -> impl Iterator<Item = &str> {
		self.prerequisites
			.iter()
			.chain(self.recommended_preparation.iter())
			.map(String::as_str)
	}
}

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// A course projected onto the display columns of a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
	#[serde(rename = "Course")]
	pub course: String,
	#[serde(rename = "Name")]
	pub name: String,
	#[serde(rename = "Division")]
	pub division: String,
	#[serde(rename = "Course Description")]
	pub description: String,
	#[serde(rename = "Department")]
	pub department: String,
	#[serde(rename = "Course Level")]
	pub level: i64,
}

impl From<&Course> for CourseRow {
	fn from(c: &Course) -> Self {
		let course = if c.label.is_empty() {
			c.code.clone()
		} else {
			c.label.clone()
		};
		Self {
			course,
			name: c.name.clone(),
			division: c.division.clone(),
			description: c.description.clone(),
			department: c.department.clone(),
			level: c.level,
		}
	}
}

/// One year's ranked, filtered, capped result rows.
pub type Table = Vec<CourseRow>;

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// An exact-match categorical filter, or the "Any" pass-through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Facet {
	#[default]
	Any,
	Exact(String),
}

impl Facet {
	pub fn parse(value: &str) -> Self {
		if value == ANY {
			Self::Any
		} else {
			Self::Exact(value.to_string())
		}
	}

	pub fn matches(&self, value: &str) -> bool {
		match self {
			Self::Any => true,
			Self::Exact(expected) => expected == value,
		}
	}
}

impl From<String> for Facet {
	fn from(value: String) -> Self {
		if value == ANY {
			Self::Any
		} else {
			Self::Exact(value)
		}
	}
}

impl From<Facet> for String {
	fn from(facet: Facet) -> Self {
		match facet {
			Facet::Any => ANY.to_string(),
			Facet::Exact(v) => v,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFilters {
	#[serde(default)]
	pub division: Facet,
	#[serde(default)]
	pub department: Facet,
	#[serde(default)]
	pub campus: Facet,
}

impl FacetFilters {
	pub fn new(division: &str, department: &str, campus: &str) -> Self {
		Self {
			division: Facet::parse(division),
			department: Facet::parse(department),
			campus: Facet::parse(campus),
		}
	}

	pub fn matches(&self, course: &Course) -> bool {
		self.division.matches(&course.division)
			&& self.department.matches(&course.department)
			&& self.campus.matches(&course.campus)
	}
}

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

fn default_top() -> usize {
	DEFAULT_TOP
}

/// A ranking request: comma-separated search phrases, the primary year,
/// facet filters and the per-table row cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
	pub search: String,
	pub year: i64,
	#[serde(flatten)]
	pub facets: FacetFilters,
	#[serde(default = "default_top")]
	pub top: usize,
}

impl RankRequest {
	pub fn new(search: impl Into<String>, year: i64) -> Self {
		Self {
			search: search.into(),
			year,
			facets: FacetFilters::default(),
			top: DEFAULT_TOP,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCourse {
	pub code: String,
	pub score: f64,
}

/// Intermediate ranking state for one request, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankExplanation {
	pub matched_phrases: Vec<String>,
	/// Highest relevance scores, descending, capped at the request's `top`.
	pub relevance: Vec<ScoredCourse>,
	/// Requisite scores, descending.
	pub requisite_scores: Vec<ScoredCourse>,
}

/// Choices for the search form's drop-downs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetOptions {
	pub divisions: Vec<String>,
	pub departments: Vec<String>,
	pub campuses: Vec<String>,
	pub years: Vec<i64>,
	pub top: Vec<usize>,
}

/// Requisite neighbours of a course within the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequisiteLinks {
	/// Catalog courses this course lists as prerequisite or recommended
	/// preparation.
	pub requires: Vec<String>,
	/// Catalog courses that list this course.
	pub required_by: Vec<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn facet_any_is_pass_through() {
		assert!(Facet::parse("Any").matches("Arts"));
		assert!(Facet::parse("Arts").matches("Arts"));
		assert!(!Facet::parse("Arts").matches("Engineering"));
		assert!(!Facet::parse("arts").matches("Arts"));
	}

	#[test]
	fn course_deserializes_corpus_columns() {
		let course: Course = serde_json::from_value(json!({
			"Code": "CSC311H1",
			"Course": "CSC311H1: Intro ML",
			"Name": "Introduction to Machine Learning",
			"Division": "Arts and Science",
			"Department": "Computer Science",
			"Campus": "St. George",
			"Course Level": 3,
			"Course Description": "Learning from data.",
			"Pre-requisites": ["CSC207H1", "MAT235Y1"],
			"Recommended Preparation": ["STA302H1"],
			"Term": ["Fall"]
		}))
		.unwrap();
		assert_eq!(course.level, 3);
		assert_eq!(
			course.references().collect::<Vec<_>>(),
			vec!["CSC207H1", "MAT235Y1", "STA302H1"]
		);
		assert_eq!(course.extra["Term"], json!(["Fall"]));
	}

	#[test]
	fn row_uses_code_when_label_missing() {
		let course: Course = serde_json::from_value(json!({
			"Code": "BIO120H1",
			"Course Level": 1
		}))
		.unwrap();
		let row = CourseRow::from(&course);
		assert_eq!(row.course, "BIO120H1");
		let value = serde_json::to_value(&row).unwrap();
		assert_eq!(value["Course Level"], 1);
		assert!(value.get("Course Description").is_some());
	}

	#[test]
	fn rank_request_defaults() {
		let req: RankRequest = serde_json::from_value(json!({
			"search": "biology",
			"year": 2,
			"division": "Arts"
		}))
		.unwrap();
		assert_eq!(req.top, DEFAULT_TOP);
		assert_eq!(req.facets.division, Facet::Exact("Arts".into()));
		assert_eq!(req.facets.campus, Facet::Any);
	}
}
