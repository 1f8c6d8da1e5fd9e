use std::{error::Error, path::PathBuf};

use clap::Parser;
use postcode_joiner::{JoinConfig, Metric, PostcodeJoiner};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Infer the nearest postcode for every address and check it against the
/// postcode in the address text.
#[derive(Parser, Debug)]
#[command(name = "postcode_joiner", version)]
struct Args {
    /// JSON config file; flags below override it.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Address list csv.
    #[arg(long, short = 'a')]
    addresses: Option<PathBuf>,

    /// Postcode reference csv.
    #[arg(long, short = 'p')]
    postcodes: Option<PathBuf>,

    /// Output tsv.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// geodesic (accuracy) or planar (speed).
    #[arg(long, short = 'm')]
    metric: Option<Metric>,

    /// Addresses per distance matrix.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Evaluate chunks on all cores. `--parallel false` turns off a config-file setting.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    parallel: Option<bool>,
}

impl Args {
    fn into_config(self) -> Result<JoinConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => JoinConfig::from_json_file(path)?,
            None => JoinConfig::default(),
        };

        if let Some(p) = self.addresses {
            config.address_path = p;
        }
        if let Some(p) = self.postcodes {
            config.postcode_path = p;
        }
        if let Some(p) = self.output {
            config.output_path = p;
        }
        if let Some(m) = self.metric {
            config.metric = m;
        }
        if let Some(n) = self.chunk_size {
            config.chunk_size = n;
        }
        if let Some(parallel) = self.parallel {
            config.parallel = parallel;
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config()?;

    let joiner = PostcodeJoiner::load(&config)?;
    let outcome = joiner.run(&config)?;

    info!(
        addresses = outcome.validated.len(),
        validated = outcome.validated_count(),
        output = %config.output_path.display(),
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parallel_config_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(br#"{ "parallel": true, "chunk_size": 100 }"#).unwrap();
        f
    }

    fn config_from(args: &[&str]) -> JoinConfig {
        Args::try_parse_from(args).unwrap().into_config().unwrap()
    }

    #[test]
    fn parallel_flag_overrides_config_both_ways() {
        let file = parallel_config_file();
        let path = file.path().to_str().unwrap();

        assert!(config_from(&["postcode_joiner", "-c", path]).parallel);
        assert!(!config_from(&["postcode_joiner", "-c", path, "--parallel", "false"]).parallel);
        assert!(config_from(&["postcode_joiner", "--parallel"]).parallel);
        assert!(!config_from(&["postcode_joiner"]).parallel);
    }

    #[test]
    fn scalar_flags_override_config() {
        let file = parallel_config_file();
        let cfg = config_from(&[
            "postcode_joiner",
            "-c",
            file.path().to_str().unwrap(),
            "--chunk-size",
            "7",
            "--metric",
            "accuracy",
        ]);
        assert_eq!(cfg.chunk_size, 7);
        assert_eq!(cfg.metric, Metric::Geodesic);
    }

    #[test]
    fn bad_metric_rejected_by_parser() {
        assert!(Args::try_parse_from(["postcode_joiner", "--metric", "bad-tradeoff-arg"]).is_err());
    }
}
