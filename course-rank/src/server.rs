// ---------------------------------------------------------------------------
// RankServer: JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to a RankEngine:
// a `run()` loop, a `call()` match over method names, a `with_loaded` helper,
// and free-standing handler functions for each method.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::RankConfig;
use crate::corpus::load_corpus;
use crate::engine::RankEngine;
use crate::error::RankError;
use crate::propagation::PropagationMode;
use crate::protocol::*;
use crate::transport::NdjsonTransport;
use crate::types::RankRequest;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// JSON-RPC server that dispatches requests to a [`RankEngine`].
pub struct RankServer {
	transport: NdjsonTransport,
	config: RankConfig,
	engine: Option<RankEngine>,
}

impl RankServer {
	/// Create a server with no catalog; clients load one with
	/// `catalog/initialize`.
	pub fn new(transport: NdjsonTransport, config: RankConfig) -> Self {
		Self {
			transport,
			config,
			engine: None,
		}
	}

	/// Create a server around an already loaded engine.
	pub fn with_engine(transport: NdjsonTransport, engine: RankEngine) -> Self {
		Self {
			transport,
			config: engine.config().clone(),
			engine: Some(engine),
		}
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), RankError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Serve requests read line by line from `reader` until EOF.
	pub fn serve(&mut self, reader: impl BufRead) -> Result<(), RankError> {
		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		match self.call(&req.method, req.params) {
			Ok(value) => self.transport.write_response(id, value),
			Err(RankError::UnknownMethod(method)) => self.transport.write_error(
				id,
				METHOD_NOT_FOUND,
				format!("Unknown method: {}", method),
				None,
			),
			Err(e) => {
				let code = match e {
					RankError::InvalidParams(_) => INVALID_PARAMS,
					_ => RANK_ERROR,
				};
				self.transport
					.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()))
			}
		}
	}

	/// Execute one method and return its JSON result.
	pub fn call(
		&mut self,
		method: &str,
		params: serde_json::Value,
	) -> Result<serde_json::Value, RankError> {
		match method {
			// -- Catalog -------------------------------------------------
			"catalog/initialize" => self.handle_initialize(params),
			"catalog/info" => self.with_loaded(handle_info),
			"catalog/facets" => self.with_loaded(|e| {
				Ok(serde_json::to_value(e.catalog().facet_options())?)
			}),

			// -- Search --------------------------------------------------
			"search/rank" => self.with_loaded(|e| handle_rank(e, params)),
			"search/explain" => self.with_loaded(|e| handle_explain(e, params)),

			// -- Course detail -------------------------------------------
			"course/get" => self.with_loaded(|e| handle_course_get(e, params)),
			"course/resolve" => self.with_loaded(|e| handle_course_resolve(e, params)),

			_ => Err(RankError::UnknownMethod(method.to_string())),
		}
	}

	// ── Engine accessor ───────────────────────────────────────────────────

	fn with_loaded<F>(&self, f: F) -> Result<serde_json::Value, RankError>
	where
		F: FnOnce(&RankEngine) -> Result<serde_json::Value, RankError>,
	{
		match &self.engine {
			Some(e) => f(e),
			None => Err(RankError::NotInitialized),
		}
	}

	// ── Initialize ────────────────────────────────────────────────────────

	fn handle_initialize(
		&mut self,
		params: serde_json::Value,
	) -> Result<serde_json::Value, RankError> {
		let p: InitializeParams = parse_params(params)?;

		let config = RankConfig {
			propagation_mode: p
				.propagation_mode
				.unwrap_or(self.config.propagation_mode),
			requisite_cutoff: p.requisite_cutoff.unwrap_or(self.config.requisite_cutoff),
		};

		let corpus = load_corpus(&p.corpus_path)?;
		let engine = RankEngine::from_corpus(corpus, config)?;
		let info = handle_info(&engine)?;
		self.engine = Some(engine);

		Ok(info)
	}
}

// ---------------------------------------------------------------------------
// Param types
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, RankError> {
	serde_json::from_value(params).map_err(|e| RankError::InvalidParams(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitializeParams {
	corpus_path: PathBuf,
	propagation_mode: Option<PropagationMode>,
	requisite_cutoff: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeParams {
	code: String,
}

// ---------------------------------------------------------------------------
// Free-standing handler functions
// ---------------------------------------------------------------------------

fn handle_info(engine: &RankEngine) -> Result<serde_json::Value, RankError> {
	Ok(serde_json::json!({
		"courses": engine.catalog().len(),
		"vocabulary": engine.vocabulary().len(),
		"propagationMode": engine.config().propagation_mode,
		"requisiteCutoff": engine.config().requisite_cutoff,
	}))
}

fn handle_rank(
	engine: &RankEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let request: RankRequest = parse_params(params)?;
	let tables = engine.rank(&request)?;
	Ok(serde_json::json!({ "tables": tables }))
}

fn handle_explain(
	engine: &RankEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let request: RankRequest = parse_params(params)?;
	Ok(serde_json::to_value(engine.explain(&request))?)
}

fn handle_course_get(
	engine: &RankEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let p: CodeParams = parse_params(params)?;
	let catalog = engine.catalog();
	let course = catalog
		.get(&p.code)
		.ok_or_else(|| RankError::NotFound(p.code.clone()))?;
	let links = catalog.requisite_links(&p.code).unwrap_or_default();
	Ok(serde_json::json!({
		"course": course,
		"requires": links.requires,
		"requiredBy": links.required_by,
	}))
}

fn handle_course_resolve(
	engine: &RankEngine,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let p: CodeParams = parse_params(params)?;
	let code = engine.catalog().resolve_code(&p.code);
	Ok(serde_json::json!({ "code": code }))
}
