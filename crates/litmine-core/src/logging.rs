//! Log output that cooperates with live progress bars.

use std::io::Write;

use indicatif::MultiProgress;

use crate::progress::ProgressContext;

fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "error",
        log::Level::Warn => "warn ",
        log::Level::Info => "info ",
        log::Level::Debug => "debug",
        log::Level::Trace => "trace",
    }
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug | log::Level::Trace => "\x1b[36m",
    }
}

/// Routes log lines through a `MultiProgress` so they print above the
/// bars instead of tearing them. Only installed when stderr is a TTY,
/// so color is unconditional.
struct BarLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for BarLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            let line = format!(
                "{}{}\x1b[0m {}",
                level_color(record.level()),
                level_label(record.level()),
                record.args()
            );
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger. `RUST_LOG` overrides the level derived
/// from the flags.
pub fn init_logging(quiet: bool, debug: bool, progress: &ProgressContext) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let env = env_logger::Env::default().default_filter_or(default_level);

    if progress.is_tty() {
        let inner = env_logger::Builder::from_env(env).build();
        let max_level = inner.filter();
        let logger = BarLogger {
            inner,
            multi: progress.multi().clone(),
        };
        log::set_boxed_logger(Box::new(logger)).expect("logger already installed");
        log::set_max_level(max_level);
    } else {
        env_logger::Builder::from_env(env)
            .format(|buf, record| {
                writeln!(buf, "{} {}", level_label(record.level()), record.args())
            })
            .init();
    }
}
