// ---------------------------------------------------------------------------
// Relevance scoring
// ---------------------------------------------------------------------------
//
// A search string is split on commas into phrases; phrases the vocabulary
// does not know are dropped. For each remaining phrase the courses with a
// non-zero weight at the phrase's first feature form its direct-match set,
// and every course scores its mean cosine similarity against that set.
// Contributions add up across phrases without normalization.
// ---------------------------------------------------------------------------

use crate::matrix::TermMatrix;
use crate::vocabulary::Vocabulary;

/// Trimmed search phrases present in the vocabulary, in search order.
/// Repeated phrases are kept and count once per occurrence.
pub fn matched_phrases(search: &str, vocabulary: &Vocabulary) -> Vec<String> {
	search
		.split(',')
		.map(str::trim)
		.filter(|p| vocabulary.contains(p))
		.map(str::to_string)
		.collect()
}

/// Relevance score per matrix row for the given phrases.
pub fn score<M>(phrases: &[String], vocabulary: &Vocabulary, matrix: &M) -> Vec<f64>
where
	M: TermMatrix + ?Sized,
{
	let mut scores = vec![0.0f64; matrix.row_count()];

	for phrase in phrases {
		let Some(feature) = vocabulary.first_feature(phrase) else {
			continue;
		};

		let direct = matrix.direct_matches(feature);
		if direct.is_empty() {
			tracing::warn!(phrase = %phrase, feature, "No course carries this term");
			continue;
		}

		tracing::debug!(phrase = %phrase, feature, direct = direct.len(), "Scoring phrase");
		let contribution = matrix.mean_similarity(direct);
		for (s, c) in scores.iter_mut().zip(contribution) {
			*s += c;
		}
	}

	scores
}
