// ---------------------------------------------------------------------------
// Vocabulary: recognized search terms and the phrase analyzer
// ---------------------------------------------------------------------------
//
// The vocabulary is the fixed list of terms the corpus was vectorized with;
// a term's feature position is its index in that list. Membership checks are
// exact after trimming. The analyzer turns a phrase into the same word n-grams
// the corpus vectorizer produced, so a phrase can be mapped onto its own term
// vector.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::RankError;
use crate::matrix::SparseVector;

// ---------------------------------------------------------------------------
// Analyzer configuration
// ---------------------------------------------------------------------------

fn default_lowercase() -> bool {
	true
}

fn default_min_token_len() -> usize {
	2
}

/// How phrases are split into n-grams. Stored alongside the vocabulary in
/// the corpus file; every field is optional there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
	#[serde(default = "default_lowercase")]
	pub lowercase: bool,
	/// Inclusive `[min, max]` n-gram sizes in words. Defaults to
	/// `[1, longest vocabulary term]`.
	#[serde(default)]
	pub ngram_range: Option<(usize, usize)>,
	/// Tokens shorter than this many characters are dropped.
	#[serde(default = "default_min_token_len")]
	pub min_token_len: usize,
}

impl Default for AnalyzerConfig {
	fn default() -> Self {
		Self {
			lowercase: default_lowercase(),
			ngram_range: None,
			min_token_len: default_min_token_len(),
		}
	}
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

pub struct Vocabulary {
	terms: Vec<String>,
	positions: HashMap<String, usize>,
	lowercase: bool,
	min_token_len: usize,
	ngram_range: (usize, usize),
}

impl Vocabulary {
	/// Build a vocabulary from terms in feature order.
	///
	/// Fails with [`RankError::Corruption`] on duplicate terms or an invalid
	/// n-gram range.
	pub fn new(terms: Vec<String>, config: AnalyzerConfig) -> Result<Self, RankError> {
		let mut positions = HashMap::with_capacity(terms.len());
		for (pos, term) in terms.iter().enumerate() {
			if positions.insert(term.clone(), pos).is_some() {
				return Err(RankError::Corruption(format!(
					"duplicate vocabulary term '{}'",
					term
				)));
			}
		}

		let mut vocab = Self {
			terms,
			positions,
			lowercase: config.lowercase,
			min_token_len: config.min_token_len,
			ngram_range: (1, 1),
		};

		let ngram_range = match config.ngram_range {
			Some((min, max)) if min == 0 || min > max => {
				return Err(RankError::Corruption(format!(
					"invalid n-gram range [{}, {}]",
					min, max
				)));
			}
			Some(range) => range,
			None => {
				let longest = vocab
					.terms
					.iter()
					.map(|t| vocab.tokenize(t).len())
					.max()
					.unwrap_or(1);
				(1, longest.max(1))
			}
		};
		vocab.ngram_range = ngram_range;

		Ok(vocab)
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	pub fn terms(&self) -> &[String] {
		&self.terms
	}

	pub fn term(&self, position: usize) -> Option<&str> {
		self.terms.get(position).map(String::as_str)
	}

	pub fn ngram_range(&self) -> (usize, usize) {
		self.ngram_range
	}

	/// Feature position of `term`, matched exactly after trimming whitespace.
	pub fn position(&self, term: &str) -> Option<usize> {
		self.positions.get(term.trim()).copied()
	}

	pub fn contains(&self, term: &str) -> bool {
		self.position(term).is_some()
	}

	/// Split text into word tokens. Word characters are alphanumerics and `_`;
	/// anything else separates tokens, and tokens shorter than the minimum
	/// length are dropped.
	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let text = if self.lowercase {
			text.to_lowercase()
		} else {
			text.to_string()
		};
		text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
			.filter(|t| t.chars().count() >= self.min_token_len)
			.map(|t| t.to_string())
			.collect()
	}

	/// All word n-grams of `text` within the configured range, in order of
	/// increasing size.
	pub fn ngrams(&self, text: &str) -> Vec<String> {
		let tokens = self.tokenize(text);
		let (min_n, max_n) = self.ngram_range;
		let mut grams = Vec::new();
		for n in min_n..=max_n.min(tokens.len()) {
			for window in tokens.windows(n) {
				grams.push(window.join(" "));
			}
		}
		grams
	}

	/// Count vector of the phrase's n-grams over this vocabulary. N-grams the
	/// vocabulary does not know are ignored.
	pub fn term_vector(&self, phrase: &str) -> SparseVector {
		SparseVector::from_pairs(
			self.ngrams(phrase)
				.iter()
				.filter_map(|g| self.positions.get(g))
				.map(|&pos| (pos as u32, 1.0f32)),
		)
	}

	/// First non-zero feature position of the phrase's own term vector.
	///
	/// Falls back to the phrase's exact vocabulary position when the analyzer
	/// cannot reproduce it (for example a term made of punctuation).
	pub fn first_feature(&self, phrase: &str) -> Option<usize> {
		self.term_vector(phrase)
			.first_feature()
			.map(|f| f as usize)
			.or_else(|| self.position(phrase))
	}
}

impl std::fmt::Debug for Vocabulary {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Vocabulary")
			.field("terms", &self.terms.len())
			.field("ngram_range", &self.ngram_range)
			.finish()
	}
}
