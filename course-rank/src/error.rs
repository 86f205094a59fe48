use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
	#[error("Catalog not loaded: call catalog/initialize first")]
	NotInitialized,
	#[error("Course not found: {0}")]
	NotFound(String),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("Unknown method: {0}")]
	UnknownMethod(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Corpus corruption: {0}")]
	Corruption(String),
}

impl RankError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotInitialized => "RANK_NOT_LOADED",
			Self::NotFound(_) => "RANK_COURSE_NOT_FOUND",
			Self::InvalidParams(_) => "RANK_INVALID_PARAMS",
			Self::UnknownMethod(_) => "RANK_UNKNOWN_METHOD",
			Self::Io(_) => "RANK_IO",
			Self::Serialization(_) => "RANK_SERIALIZATION",
			Self::Corruption(_) => "RANK_CORRUPT",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"rankCode": self.code(),
			"message": self.to_string(),
		})
	}
}

impl From<serde_json::Error> for RankError {
	fn from(e: serde_json::Error) -> Self {
		Self::Serialization(e.to_string())
	}
}
