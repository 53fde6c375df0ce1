use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use intonalyzer::audio::{decoder, encoder, pcm};
use intonalyzer::config::IntonationConfig;
use intonalyzer::critique::TextCritique;
use intonalyzer::intonation::{fusion, IntonationAnalyzer, ScoreOutcome};
use intonalyzer::types::AudioData;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PCM_EXTENSIONS: [&str; 3] = ["raw", "pcm", "s16le"];

/// Intonalyzer - dialect intonation scorer
///
/// Scores how closely a recorded utterance follows the rising / sustained
/// phrase-final melody of Kansai speech, optionally fused with a text score.
#[derive(Parser, Debug)]
#[command(name = "intonalyzer")]
#[command(version = "0.1.0")]
#[command(about = "Dialect intonation scorer", long_about = None)]
struct Args {
    /// Recording to score: raw s16le mono PCM or any container symphonia decodes
    #[arg(value_name = "INPUT")]
    input_file: PathBuf,

    /// How to read INPUT
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// JSON file overriding scoring thresholds and weights
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Text-similarity score (0-100) from the external critic
    #[arg(
        long,
        value_name = "SCORE",
        value_parser = clap::value_parser!(u8).range(0..=100),
        conflicts_with = "critique_file"
    )]
    text_score: Option<u8>,

    /// File holding the critic's raw reply ("関西弁レベル: N / 分析: ...")
    #[arg(long, value_name = "PATH", conflicts_with = "text_score")]
    critique_file: Option<PathBuf>,

    /// Standard-language transcript, echoed in the report
    #[arg(long, value_name = "TEXT")]
    standard_text: Option<String>,

    /// Dialect transcript, echoed in the report
    #[arg(long, value_name = "TEXT")]
    dialect_text: Option<String>,

    /// Write the samples actually analysed to a 16-bit WAV file
    #[arg(long, value_name = "PATH")]
    dump_wav: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Pick by file extension (.raw/.pcm/.s16le are PCM)
    Auto,
    /// Signed 16-bit little-endian mono PCM at the configured rate
    Pcm,
    /// Decode, downmix and resample an audio container
    Audio,
}

impl InputFormat {
    fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto => {
                let is_pcm = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|ext| PCM_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false);
                if is_pcm {
                    Self::Pcm
                } else {
                    Self::Audio
                }
            }
            other => other,
        }
    }
}

impl Args {
    fn validate(&self) -> Result<()> {
        if !self.input_file.is_file() {
            anyhow::bail!("Input file does not exist: {:?}", self.input_file);
        }
        if let Some(path) = &self.critique_file {
            if !path.is_file() {
                anyhow::bail!("Critique file does not exist: {:?}", path);
            }
        }
        Ok(())
    }

    fn critique(&self) -> Result<Option<TextCritique>> {
        if let Some(level) = self.text_score {
            return Ok(Some(TextCritique {
                level,
                analysis: String::new(),
            }));
        }
        match &self.critique_file {
            Some(path) => {
                let reply = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read critique file {:?}", path))?;
                Ok(Some(TextCritique::parse(&reply)))
            }
            None => Ok(None),
        }
    }
}

/// Mirrors the response of the dialect analysis endpoint.
#[derive(Debug, Serialize)]
struct AnalysisOutput {
    intonation_score: u8,
    outcome: ScoreOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    kansai_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    standard_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dialect_text: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let config = IntonationConfig::from_override(args.config.as_deref())
        .context("Failed to load scoring configuration")?;
    let analyzer = IntonationAnalyzer::new(config)?;

    let audio = load_samples(&args, analyzer.config())?;
    info!(
        samples = audio.samples.len(),
        duration_secs = audio.duration_secs(),
        "loaded recording"
    );

    if let Some(path) = &args.dump_wav {
        encoder::encode_audio(&audio, path)
            .with_context(|| format!("Failed to write analysed audio to {:?}", path))?;
        info!(path = %path.display(), "wrote analysed samples");
    }

    let outcome = analyzer.analyze(&audio.samples);
    let intonation_score = outcome.score();
    let critique = args.critique()?;
    let final_score = critique
        .as_ref()
        .map(|c| fusion::final_score(c.level, intonation_score));
    info!(intonation_score, ?final_score, "scoring complete");

    let (kansai_level, analysis) = match critique {
        Some(c) => (Some(c.level), Some(c.analysis).filter(|a| !a.is_empty())),
        None => (None, None),
    };
    let output = AnalysisOutput {
        intonation_score,
        outcome,
        kansai_level,
        final_score,
        analysis,
        standard_text: args.standard_text.clone(),
        dialect_text: args.dialect_text.clone(),
    };
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to render report")?;
    println!("{rendered}");

    Ok(())
}

fn load_samples(args: &Args, config: &IntonationConfig) -> Result<AudioData> {
    match args.format.resolve(&args.input_file) {
        InputFormat::Pcm => {
            let bytes = fs::read(&args.input_file)
                .with_context(|| format!("Failed to read PCM file {:?}", args.input_file))?;
            Ok(AudioData {
                samples: pcm::samples_from_pcm_bytes(&bytes, config),
                sample_rate: config.sample_rate,
            })
        }
        _ => decoder::decode_for_scoring(&args.input_file, config.sample_rate)
            .context("Failed to decode input audio"),
    }
}
