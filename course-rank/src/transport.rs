use std::io::{self, Write};

use crate::protocol::{JsonRpcError, JsonRpcResponse};

/// NDJSON transport for JSON-RPC 2.0 responses: one JSON object per line.
///
/// Writes to stdout unless built with [`NdjsonTransport::with_writer`].
pub struct NdjsonTransport {
	writer: Option<Box<dyn Write + Send>>,
}

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	/// Create a transport writing to stdout.
	pub fn new() -> Self {
		Self { writer: None }
	}

	/// Create a transport writing to `writer` instead of stdout.
	pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
		Self {
			writer: Some(Box::new(writer)),
		}
	}

	/// Write a successful JSON-RPC response.
	pub fn write_response(&mut self, id: u64, result: serde_json::Value) {
		let msg = JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		};
		self.write_line(&msg);
	}

	/// Write a JSON-RPC error response.
	pub fn write_error(
		&mut self,
		id: u64,
		code: i32,
		message: impl Into<String>,
		data: Option<serde_json::Value>,
	) {
		let msg = JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcError {
				code,
				message: message.into(),
				data,
			}),
		};
		self.write_line(&msg);
	}

	fn write_line(&mut self, value: &impl serde::Serialize) {
		match self.writer.as_mut() {
			Some(w) => write_json_line(w, value),
			None => write_json_line(&mut io::stdout().lock(), value),
		}
	}
}

fn write_json_line(out: &mut impl Write, value: &impl serde::Serialize) {
	if let Err(e) = serde_json::to_writer(&mut *out, value) {
		tracing::error!("Failed to serialize response: {}", e);
		return;
	}
	if let Err(e) = writeln!(out) {
		tracing::error!("Failed to write newline: {}", e);
	}
	if let Err(e) = out.flush() {
		tracing::error!("Failed to flush output: {}", e);
	}
}
