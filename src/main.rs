use clap::{Args, Parser};
use glue_judge::data::JobConfig;
use glue_judge::judge;
use glue_judge::prelude::*;
use glue_judge::report::ReportChannel;
use glue_judge::run::RunLimit;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use std::fs::create_dir_all;
use std::process::exit;

#[derive(serde_with::DeserializeFromStr, Debug, Clone, Copy)]
struct LogLevel(log::LevelFilter);

impl std::str::FromStr for LogLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "error" | "Error" => Self(log::LevelFilter::Error),
            "warn" | "Warn" => Self(log::LevelFilter::Warn),
            "info" | "Info" => Self(log::LevelFilter::Info),
            "debug" | "Debug" => Self(log::LevelFilter::Debug),
            "trace" | "Trace" => Self(log::LevelFilter::Trace),
            _ => return Err(Error::BadLogLevel(s.to_string())),
        })
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        l.0
    }
}

#[derive(Debug, Default, Args, Deserialize)]
struct Flags {
    /// Dump the log onto stderr.
    #[clap(long)]
    #[serde(default)]
    stderr: Option<bool>,
    /// Log level.
    #[clap(long)]
    log_level: Option<LogLevel>,
    /// Runtime dir.
    #[clap(long)]
    run_dir: Option<PathBuf>,
}

fn python3_solution() -> Vec<String> {
    vec!["python3".to_string(), "solution/main.py".to_string()]
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: Flags,
    /// Command launching the solution.
    #[serde(default = "python3_solution")]
    run: Vec<String>,
    #[serde(default)]
    solution_limit: RunLimit,
    #[serde(default)]
    job: JobConfig,
}

impl ConfigFile {
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = util::load_file(path)?;
        toml::from_str(&content).map_err(Error::TOMLParseError)
    }

    /// The configuration used when the problem ships no judge.toml:
    /// run the solution script and apply the trivial check.
    fn builtin() -> Self {
        Self {
            config: Flags::default(),
            run: python3_solution(),
            solution_limit: RunLimit::default(),
            job: JobConfig::default(),
        }
    }
}

#[derive(Debug, Parser)]
struct Cli {
    /// Where the live status stream goes; falls back to GLUE_REPORT.
    #[clap(long, parse(from_os_str))]
    report: Option<PathBuf>,
    /// Where the final details document goes; falls back to
    /// GLUE_DETAILS.
    #[clap(long, parse(from_os_str))]
    details: Option<PathBuf>,
    /// Override config file
    #[clap(long, parse(from_os_str))]
    etc: Option<PathBuf>,

    #[clap(flatten)]
    cfg: Flags,
}

fn resolve_target(flag: Option<&PathBuf>, env_key: &str) -> Option<PathBuf> {
    flag.cloned()
        .or_else(|| std::env::var_os(env_key).map(PathBuf::from))
}

fn change_dir(d: &Path) {
    create_dir_all(d).unwrap();
    if std::env::set_current_dir(d).is_err() {
        panic!("cannot change to {}", d.display());
    }
}

#[async_std::main]
async fn main() {
    let cli = Cli::parse();

    // Change to working directory first: problem/judge.toml lives
    // relative to it.
    if let Some(d) = cli.cfg.run_dir.as_ref() {
        change_dir(d);
    }

    let etc_path = cli
        .etc
        .clone()
        .unwrap_or_else(|| PathBuf::from("problem/judge.toml"));
    let etc = if cli.etc.is_some() || etc_path.is_file() {
        ConfigFile::load(&etc_path)
    } else {
        Ok(ConfigFile::builtin())
    };

    // There is no report channel yet, so a broken configuration can
    // only abort the process.
    if let Err(e) = etc {
        panic!("config file {} is broken: {}", etc_path.display(), e);
    }

    let etc = etc.unwrap();

    // A run_dir from the config file can only take effect after the
    // config is read.
    if cli.cfg.run_dir.is_none() {
        if let Some(d) = etc.config.run_dir.as_ref() {
            change_dir(d);
        }
    }

    // Initialize logging.
    let log_level = cli
        .cfg
        .log_level
        .or(etc.config.log_level)
        .map_or_else(|| log::LevelFilter::Info, LogLevel::into);

    let use_stderr = cli.cfg.stderr.or(etc.config.stderr).unwrap_or(false);

    let stderr_level = if use_stderr {
        log_level
    } else {
        // Dump errors to stderr even if it's not enabled for normal log.
        log::LevelFilter::Error
    };

    let console_fmt = "{h({d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n})}";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(console_fmt)))
        .build();

    let text_fmt = "{d(%Y-%m-%d %H:%M:%S)(utc)} - {l}: {m}{n}";
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(text_fmt)))
        .append(false)
        .build("judge.log")
        .unwrap();

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        )
        .appender(Appender::builder().build("file", Box::new(log_file)))
        .build(
            Root::builder()
                .appenders(["stderr", "file"])
                .build(log_level),
        )
        .unwrap();
    log4rs::init_config(config).unwrap();

    // Both sinks must be resolvable before anything is launched.
    let report_target = match resolve_target(cli.report.as_ref(), "GLUE_REPORT") {
        Some(x) => x,
        None => {
            error!("report target is not configured (use --report or GLUE_REPORT)");
            exit(1);
        }
    };
    let details_target = match resolve_target(cli.details.as_ref(), "GLUE_DETAILS") {
        Some(x) => x,
        None => {
            error!("details target is not configured (use --details or GLUE_DETAILS)");
            exit(1);
        }
    };

    let mut report = match ReportChannel::open(&report_target).await {
        Ok(x) => x,
        Err(e) => {
            error!(
                "cannot open report stream {}: {}",
                report_target.display(),
                e
            );
            exit(1);
        }
    };

    let spec = match etc.job.to_spec() {
        Ok(x) => x,
        Err(e) => {
            error!("bad testcase configuration: {}", e);
            exit(1);
        }
    };

    // Real judging logic goes here.
    let r = judge::judge_feedback(
        &spec,
        &etc.run,
        &etc.solution_limit,
        &mut report,
        &details_target,
    )
    .await;

    if let Err(e) = r {
        error!("error: {}", e);
        exit(1);
    }
}
