mod application;
mod command;
mod components;
mod message;
mod shell;

use std::path::PathBuf;

use application::App;
use docket::config::DocketConfig;
use docket::core::resource::SessionResources;
use docket::core::store::Store;
use docket::metadata::HttpTitleFetcher;
use docket::storage::{FileStore, StorageAdapter};

struct Flags {
    data_dir: Option<PathBuf>,
    debug: bool,
    print: bool,
}

fn parse_flags() -> Result<Flags, String> {
    let mut flags = Flags {
        data_dir: None,
        debug: false,
        print: false,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = args.next().ok_or("--data-dir needs a path")?;
                flags.data_dir = Some(PathBuf::from(dir));
            }
            "--debug" => flags.debug = true,
            "--print" => flags.print = true,
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(flags)
}

/// Send logs to the systemd user journal (`journalctl --user -t docket -f`).
/// docket targets log at info, or debug when enabled; everything else at warn.
fn init_logging() {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("docket") {
                let max = if docket::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("docket".to_string()),
        Err(e) => {
            eprintln!("Journal unavailable, logging disabled: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so docket debug logs can pass when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flags = parse_flags()?;

    let config_path = DocketConfig::default_path();
    let mut config = DocketConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("{}; using defaults", e);
        DocketConfig::default()
    });
    if let Some(dir) = flags.data_dir {
        config.data_dir = dir;
    }

    docket::set_debug_logging(config.debug_logging || flags.debug);
    init_logging();
    log::info!(
        "Starting docket {} with data in {}",
        env!("CARGO_PKG_VERSION"),
        config.data_dir.display()
    );

    let adapter = StorageAdapter::new(FileStore::new(&config.data_dir), config.storage_key.clone());
    let (store, warning) = Store::open(adapter, SessionResources::new(config.session_dir()));
    let mut app = App::new(store, warning);

    if flags.print {
        for note in app.take_notifications() {
            eprintln!("{}", note.message);
        }
        println!("{}", app.view(chrono::Local::now().date_naive()));
        return Ok(());
    }

    let fetcher = HttpTitleFetcher::new(config.fetch_timeout(), &config.user_agent)?;
    let app = shell::run(app, fetcher).await?;
    log::info!(
        "Exiting with {} sections saved to {}",
        app.store().sections().len(),
        config.snapshot_path().display()
    );
    drop(app);

    // A Ctrl-C leaves tokio's stdin thread parked in a read the runtime would wait on.
    std::process::exit(0)
}
