use std::path::PathBuf;

use anyhow::{bail, Result};

use linear_advance::job::{load_job, run_job};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let job_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: linear-advance <job.json>"),
    };

    let job = load_job(&job_path)?;
    run_job(&job)?;
    Ok(())
}
