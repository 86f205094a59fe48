use std::path::PathBuf;

use clap::Parser;

use crate::propagation::{PropagationMode, DEFAULT_REQUISITE_CUTOFF};

#[derive(Parser, Debug)]
#[command(
	name = "course-rank-engine",
	about = "Course catalog ranking server over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
	/// Corpus file to load before serving (JSON, optionally gzipped).
	/// Without it, clients call `catalog/initialize`.
	#[arg(long, env = "COURSE_RANK_CORPUS")]
	pub corpus: Option<PathBuf>,

	/// Requisite propagation walk: "literal" (catalog order, stop at cutoff)
	/// or "sorted" (descending score, skip rows at or above cutoff)
	#[arg(long, default_value = "literal", env = "COURSE_RANK_PROPAGATION")]
	pub propagation: PropagationMode,

	/// Relevance score at which a course stops passing relevance to its
	/// requisites
	#[arg(long, default_value_t = DEFAULT_REQUISITE_CUTOFF, env = "COURSE_RANK_CUTOFF")]
	pub requisite_cutoff: f64,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "COURSE_RANK_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn rank_config(&self) -> RankConfig {
		RankConfig {
			propagation_mode: self.propagation,
			requisite_cutoff: self.requisite_cutoff,
		}
	}
}

/// Ranking knobs shared by every request against one catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RankConfig {
	pub propagation_mode: PropagationMode,
	pub requisite_cutoff: f64,
}

impl Default for RankConfig {
	fn default() -> Self {
		Self {
			propagation_mode: PropagationMode::default(),
			requisite_cutoff: DEFAULT_REQUISITE_CUTOFF,
		}
	}
}
