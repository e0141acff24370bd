//! Command-line entrypoint for the QA backend.
//!
//! Usage:
//!
//! ```text
//! rag-qa-backend [--health | --stats] [--no-cache] [--k N] [--threshold T] QUESTION...
//! ```
//!
//! One question prints a single result; several questions run as a
//! batch. Results are printed as pretty JSON on stdout.

use anyhow::{Context, bail};
use qa_pipeline::{QaEngine, RetrievalOptions};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

enum Command {
    Health,
    Stats,
    Answer {
        questions: Vec<String>,
        options: RetrievalOptions,
    },
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut questions = Vec::new();
    let mut options = RetrievalOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--health" => return Ok(Command::Health),
            "--stats" => return Ok(Command::Stats),
            "--no-cache" => options.use_cache = false,
            "--k" => {
                let raw = iter.next().context("--k requires a value")?;
                options.k = Some(raw.parse().context("--k must be a positive integer")?);
            }
            "--threshold" => {
                let raw = iter.next().context("--threshold requires a value")?;
                options.similarity_threshold =
                    Some(raw.parse().context("--threshold must be a number")?);
            }
            other if other.starts_with("--") => bail!("unknown flag: {other}"),
            question => questions.push(question.to_string()),
        }
    }

    if questions.is_empty() {
        bail!(
            "usage: rag-qa-backend [--health | --stats] [--no-cache] [--k N] [--threshold T] QUESTION..."
        );
    }
    Ok(Command::Answer { questions, options })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional outside local development.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let command = parse_args(&std::env::args().skip(1).collect::<Vec<_>>())?;
    let engine = QaEngine::from_env().context("engine startup failed")?;

    match command {
        Command::Health => {
            let report = engine.health().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.ok {
                bail!("one or more backends are unhealthy");
            }
        }
        Command::Stats => {
            let stats = engine.stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Answer { questions, options } => {
            if let [question] = questions.as_slice() {
                let result = engine.answer(question, &options).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let results = engine.answer_batch(&questions, &options).await;
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_questions() {
        let cmd = parse_args(&args(&["--no-cache", "--k", "3", "what is this?"])).unwrap();
        match cmd {
            Command::Answer { questions, options } => {
                assert_eq!(questions, vec!["what is this?".to_string()]);
                assert_eq!(options.k, Some(3));
                assert!(!options.use_cache);
            }
            _ => panic!("expected answer command"),
        }
    }

    #[test]
    fn health_flag_wins() {
        assert!(matches!(
            parse_args(&args(&["--health"])).unwrap(),
            Command::Health
        ));
    }

    #[test]
    fn rejects_unknown_flags_and_empty_input() {
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&args(&[])).is_err());
    }
}
