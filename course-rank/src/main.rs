use anyhow::{Context, Result};
use clap::Parser;
use course_rank_engine::config::CliArgs;
use course_rank_engine::corpus::load_corpus;
use course_rank_engine::engine::RankEngine;
use course_rank_engine::server::RankServer;
use course_rank_engine::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries the JSON-RPC stream.
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let config = args.rank_config();
	tracing::info!(
		propagation = %config.propagation_mode,
		cutoff = config.requisite_cutoff,
		"Ranking configuration"
	);

	let transport = NdjsonTransport::new();
	let mut server = match &args.corpus {
		Some(path) => {
			let corpus = load_corpus(path)
				.with_context(|| format!("failed to load corpus {}", path.display()))?;
			let engine = RankEngine::from_corpus(corpus, config)?;
			RankServer::with_engine(transport, engine)
		}
		None => RankServer::new(transport, config),
	};

	tracing::info!("course-rank-engine ready");
	server.run()?;
	Ok(())
}
