//! Shared building blocks for the embedding storage benchmark: the record
//! type, deterministic test data, vector codecs and logger setup.

use anyhow::Context;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::{Encode, pattern::PatternEncoder},
    filter::threshold::ThresholdFilter,
};
use std::{backtrace, env};

pub mod codec;
pub mod embedding;

pub use codec::{BinaryCodec, CodecError, JsonCodec, VectorCodec};
pub use embedding::{Embedding, generate_embeddings};

#[derive(Debug)]
struct BacktracePatternEncoder {
    pattern_encoder: PatternEncoder,
    is_backtrace_enabled: bool,
}

impl BacktracePatternEncoder {
    fn new(pattern: &str) -> Self {
        BacktracePatternEncoder {
            pattern_encoder: PatternEncoder::new(pattern),
            is_backtrace_enabled: env::var("RUST_BACKTRACE").is_ok()
                || env::var("RUST_LIB_BACKTRACE").is_ok(),
        }
    }
}

impl Encode for BacktracePatternEncoder {
    fn encode(
        &self,
        w: &mut dyn log4rs::encode::Write,
        record: &log::Record<'_>,
    ) -> anyhow::Result<()> {
        if record.level() == log::Level::Error && self.is_backtrace_enabled {
            let args = format_args!(
                "{}\nBacktrace:\n{}",
                record.args(),
                backtrace::Backtrace::capture()
            );
            let new_record = log::Record::builder()
                .args(args)
                .level(record.level())
                .target(record.target())
                .module_path(record.module_path())
                .file(record.file())
                .line(record.line())
                .build();
            self.pattern_encoder.encode(w, &new_record)?;
        } else {
            self.pattern_encoder.encode(w, record)?;
        }
        Ok(())
    }
}

/// Install the global logger.
///
/// Records at `log_level` and above go to stderr. When `file_path` is given the
/// same records are also appended to that file.
pub fn initialize_logger(log_level: LevelFilter, file_path: Option<&str>) -> anyhow::Result<()> {
    const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}\n";

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(log_level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            .encoder(Box::new(BacktracePatternEncoder::new(LOGGING_PATTERN)))
            .build(path)
            .with_context(|| format!("failed to open log file {path}"))?;

        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config_builder
        .build(root.build(log_level))
        .context("invalid logger configuration")?;

    log4rs::init_config(config).context("logger already initialized")?;

    Ok(())
}
