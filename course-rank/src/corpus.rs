// ---------------------------------------------------------------------------
// Corpus loading: precomputed catalog + term vectors, optionally gzipped
// ---------------------------------------------------------------------------
//
// File format (v1): JSON, optionally gzip-compressed (detected by magic
// bytes, not by extension):
//
//   {
//     "version": 1,
//     "vocabulary": ["biology", "learning", ...],
//     "analyzer": { "lowercase": true, "ngramRange": [1, 2], "minTokenLen": 2 },
//     "courses": [
//       { "Code": "BIO120H1", "Course Level": 1, ...,
//         "vector": { "indices": [0, 7], "weights": [0.41, 0.12] } },
//       ...
//     ]
//   }
//
// A term's feature position is its index in `vocabulary`. Every course row
// carries its own term vector. `analyzer` is optional. Any structural
// problem is a load failure; nothing is repaired.
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogRow};
use crate::error::RankError;
use crate::matrix::SparseVector;
use crate::types::Course;
use crate::vocabulary::{AnalyzerConfig, Vocabulary};

pub const CORPUS_VERSION: u32 = 1;

const VECTOR_KEY: &str = "vector";

// ---------------------------------------------------------------------------
// Corpus
// ---------------------------------------------------------------------------

/// A loaded corpus: the vocabulary and the catalog rows vectorized over it.
#[derive(Debug)]
pub struct Corpus {
	pub vocabulary: Vocabulary,
	pub catalog: Catalog,
}

#[derive(Deserialize)]
struct CorpusFile {
	version: u32,
	vocabulary: Vec<String>,
	#[serde(default)]
	analyzer: AnalyzerConfig,
	courses: Vec<serde_json::Map<String, serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// Gzip helpers
// ---------------------------------------------------------------------------

/// Gzip-compress a byte slice.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, RankError> {
	let mut encoder = GzEncoder::new(data, Compression::new(6));
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(compressed)
}

/// Gunzip-decompress a byte slice.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, RankError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.map_err(|e| RankError::Corruption(format!("Invalid gzip stream: {}", e)))?;
	Ok(decompressed)
}

/// Check if data starts with gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read and validate a corpus file.
pub fn load_corpus(path: &Path) -> Result<Corpus, RankError> {
	let bytes = std::fs::read(path)?;
	let corpus = parse_corpus(&bytes)?;
	tracing::info!(
		path = %path.display(),
		courses = corpus.catalog.len(),
		terms = corpus.vocabulary.len(),
		"Corpus loaded"
	);
	Ok(corpus)
}

/// Parse and validate corpus bytes (plain or gzipped JSON).
pub fn parse_corpus(bytes: &[u8]) -> Result<Corpus, RankError> {
	let decompressed;
	let json = if is_gzipped(bytes) {
		decompressed = decompress(bytes)?;
		decompressed.as_slice()
	} else {
		bytes
	};

	let file: CorpusFile = serde_json::from_slice(json)?;
	if file.version != CORPUS_VERSION {
		return Err(RankError::Corruption(format!(
			"Unsupported corpus version {} (expected {})",
			file.version, CORPUS_VERSION
		)));
	}

	let vocabulary = Vocabulary::new(file.vocabulary, file.analyzer)?;

	let mut rows = Vec::with_capacity(file.courses.len());
	for (pos, mut fields) in file.courses.into_iter().enumerate() {
		let vector = match fields.remove(VECTOR_KEY) {
			Some(v) => serde_json::from_value::<SparseVector>(v).map_err(|e| {
				RankError::Corruption(format!("Course row {}: invalid term vector: {}", pos, e))
			})?,
			None => {
				return Err(RankError::Corruption(format!(
					"Course row {}: missing term vector",
					pos
				)));
			}
		};
		let course: Course = serde_json::from_value(serde_json::Value::Object(fields))
			.map_err(|e| RankError::Corruption(format!("Course row {}: {}", pos, e)))?;
		rows.push(CatalogRow::new(course, vector));
	}

	let catalog = Catalog::new(rows, vocabulary.len())?;
	Ok(Corpus {
		vocabulary,
		catalog,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample() -> serde_json::Value {
		json!({
			"version": 1,
			"vocabulary": ["biology", "cells"],
			"courses": [
				{
					"Code": "BIO120H1",
					"Name": "Adaptation and Biodiversity",
					"Course Level": 1,
					"Pre-requisites": [],
					"vector": { "indices": [0, 1], "weights": [0.8, 0.6] }
				},
				{
					"Code": "BIO230H1",
					"Course Level": 2,
					"Pre-requisites": ["BIO120H1"],
					"Exclusion": ["BIO240H1"],
					"vector": { "indices": [1], "weights": [1.0] }
				}
			]
		})
	}

	fn bytes(value: &serde_json::Value) -> Vec<u8> {
		serde_json::to_vec(value).unwrap()
	}

	#[test]
	fn parses_plain_json() {
		let corpus = parse_corpus(&bytes(&sample())).unwrap();
		assert_eq!(corpus.vocabulary.len(), 2);
		assert_eq!(corpus.catalog.len(), 2);
		let row = corpus.catalog.row(1).unwrap();
		assert_eq!(row.course.code, "BIO230H1");
		assert_eq!(row.vector.indices, vec![1]);
		assert!(row.course.extra.contains_key("Exclusion"));
		assert!(!row.course.extra.contains_key("vector"));
	}

	#[test]
	fn parses_gzipped_json() {
		let gz = compress(&bytes(&sample())).unwrap();
		assert!(is_gzipped(&gz));
		let corpus = parse_corpus(&gz).unwrap();
		assert_eq!(corpus.catalog.position("BIO120H1"), Some(0));
	}

	#[test]
	fn analyzer_section_is_honoured() {
		let mut value = sample();
		value["analyzer"] = json!({ "ngramRange": [1, 3], "lowercase": false });
		let corpus = parse_corpus(&bytes(&value)).unwrap();
		assert_eq!(corpus.vocabulary.ngram_range(), (1, 3));
	}

	#[test]
	fn rejects_wrong_version() {
		let mut value = sample();
		value["version"] = json!(2);
		let err = parse_corpus(&bytes(&value)).unwrap_err();
		assert!(matches!(err, RankError::Corruption(_)));
	}

	#[test]
	fn rejects_missing_vector() {
		let mut value = sample();
		value["courses"][0].as_object_mut().unwrap().remove("vector");
		let err = parse_corpus(&bytes(&value)).unwrap_err();
		assert!(err.to_string().contains("missing term vector"));
	}

	#[test]
	fn rejects_misaligned_vector() {
		let mut value = sample();
		value["courses"][1]["vector"] = json!({ "indices": [2], "weights": [1.0] });
		let err = parse_corpus(&bytes(&value)).unwrap_err();
		assert_eq!(err.code(), "RANK_CORRUPT");

		let mut value = sample();
		value["courses"][1]["vector"] = json!({ "indices": [0, 1], "weights": [1.0] });
		assert!(parse_corpus(&bytes(&value)).is_err());
	}

	#[test]
	fn rejects_duplicate_codes_and_terms() {
		let mut value = sample();
		value["courses"][1]["Code"] = json!("BIO120H1");
		assert!(parse_corpus(&bytes(&value)).is_err());

		let mut value = sample();
		value["vocabulary"] = json!(["biology", "biology"]);
		assert!(parse_corpus(&bytes(&value)).is_err());
	}

	#[test]
	fn rejects_course_without_level() {
		let mut value = sample();
		value["courses"][0].as_object_mut().unwrap().remove("Course Level");
		let err = parse_corpus(&bytes(&value)).unwrap_err();
		assert!(err.to_string().contains("Course row 0"));
	}

	#[test]
	fn malformed_json_is_serialization_error() {
		let err = parse_corpus(b"{ not json").unwrap_err();
		assert_eq!(err.code(), "RANK_SERIALIZATION");
	}

	#[test]
	fn load_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("corpus.json.gz");
		std::fs::write(&path, compress(&bytes(&sample())).unwrap()).unwrap();
		let corpus = load_corpus(&path).unwrap();
		assert_eq!(corpus.catalog.len(), 2);

		let missing = dir.path().join("nope.json");
		assert_eq!(load_corpus(&missing).unwrap_err().code(), "RANK_IO");
	}
}
