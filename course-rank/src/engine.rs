// ---------------------------------------------------------------------------
// RankEngine: the ranking pipeline over one immutable corpus
// ---------------------------------------------------------------------------
//
// search text -> matched phrases -> relevance scores -> requisite scores
// -> one table per year. The engine only reads the catalog and vocabulary,
// so one instance can serve concurrent requests through a shared reference.
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::config::RankConfig;
use crate::corpus::Corpus;
use crate::error::RankError;
use crate::propagation::{propagate, RequisiteScores};
use crate::scorer::{matched_phrases, score};
use crate::stratify::{relevance_order, stratify};
use crate::types::{RankExplanation, RankRequest, ScoredCourse, Table, MAX_YEAR};
use crate::vocabulary::Vocabulary;

pub struct RankEngine {
	catalog: Catalog,
	vocabulary: Vocabulary,
	config: RankConfig,
}

impl RankEngine {
	/// Fails with [`RankError::Corruption`] when the catalog was not built
	/// over this vocabulary.
	pub fn new(
		catalog: Catalog,
		vocabulary: Vocabulary,
		config: RankConfig,
	) -> Result<Self, RankError> {
		if catalog.dimensions() != vocabulary.len() {
			return Err(RankError::Corruption(format!(
				"catalog vectors span {} features but the vocabulary has {} terms",
				catalog.dimensions(),
				vocabulary.len()
			)));
		}
		Ok(Self {
			catalog,
			vocabulary,
			config,
		})
	}

	pub fn from_corpus(corpus: Corpus, config: RankConfig) -> Result<Self, RankError> {
		Self::new(corpus.catalog, corpus.vocabulary, config)
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn vocabulary(&self) -> &Vocabulary {
		&self.vocabulary
	}

	pub fn config(&self) -> &RankConfig {
		&self.config
	}

	/// Ranked tables for `request`, index 0 being the requested year.
	///
	/// Empty when no search phrase is in the vocabulary or the year is below 1.
	/// Fails with [`RankError::InvalidParams`] for a year above [`MAX_YEAR`].
	pub fn rank(&self, request: &RankRequest) -> Result<Vec<Table>, RankError> {
		if request.year > MAX_YEAR {
			return Err(RankError::InvalidParams(format!(
				"year {} exceeds the maximum of {}",
				request.year, MAX_YEAR
			)));
		}
		let phrases = matched_phrases(&request.search, &self.vocabulary);
		if phrases.is_empty() {
			tracing::debug!(search = %request.search, "No search phrase in vocabulary");
			return Ok(Vec::new());
		}
		if request.year <= 0 {
			return Ok(Vec::new());
		}

		tracing::debug!(?phrases, year = request.year, top = request.top, "Ranking");
		let (scores, requisite) = self.score(&phrases);
		Ok(stratify(
			&self.catalog,
			&scores,
			&requisite,
			request.year,
			&request.facets,
			request.top,
		))
	}

	/// Intermediate scores for `request`: matched phrases, the `top` most
	/// relevant courses overall, and every requisite score.
	pub fn explain(&self, request: &RankRequest) -> RankExplanation {
		let phrases = matched_phrases(&request.search, &self.vocabulary);
		if phrases.is_empty() {
			return RankExplanation {
				matched_phrases: phrases,
				relevance: Vec::new(),
				requisite_scores: Vec::new(),
			};
		}

		let (scores, requisite) = self.score(&phrases);
		let relevance = relevance_order(&scores)
			.into_iter()
			.take(request.top)
			.filter_map(|pos| {
				self.catalog.row(pos).map(|r| ScoredCourse {
					code: r.course.code.clone(),
					score: scores[pos],
				})
			})
			.collect();
		let requisite_scores = requisite
			.ranked()
			.into_iter()
			.map(|(code, score)| ScoredCourse {
				code: code.to_string(),
				score,
			})
			.collect();

		RankExplanation {
			matched_phrases: phrases,
			relevance,
			requisite_scores,
		}
	}

	fn score(&self, phrases: &[String]) -> (Vec<f64>, RequisiteScores) {
		let scores = score(phrases, &self.vocabulary, &self.catalog);
		let requisite = propagate(
			&scores,
			&self.catalog,
			self.config.propagation_mode,
			self.config.requisite_cutoff,
		);
		(scores, requisite)
	}
}
