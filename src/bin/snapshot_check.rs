use docket::config::DocketConfig;
use docket::storage::{FileStore, KeyValueStore, StorageAdapter, StorageError};

fn main() {
    let config_path = DocketConfig::default_path();
    let mut config = DocketConfig::load(&config_path).unwrap_or_else(|e| {
        println!("Config error: {} (using defaults)", e);
        DocketConfig::default()
    });
    if let Some(dir) = std::env::args().nth(1) {
        config.data_dir = dir.into();
    }

    println!("=== Snapshot check ===\n");
    println!("Snapshot: {}", config.snapshot_path().display());

    let adapter = StorageAdapter::new(FileStore::new(&config.data_dir), config.storage_key.clone());
    match adapter.store().get(adapter.key()) {
        Ok(Some(raw)) => println!("Size: {} bytes\n", raw.len()),
        Ok(None) => {
            println!("No snapshot yet.");
            return;
        }
        Err(e) => {
            println!("Read error: {}", e);
            std::process::exit(1);
        }
    }

    let sections = match adapter.load() {
        Ok(sections) => sections,
        Err(StorageError::Corrupt(e)) => {
            println!("CORRUPT: {}", e);
            println!("docket will start empty and overwrite this file on the next change.");
            std::process::exit(1);
        }
        Err(e) => {
            println!("Load error: {}", e);
            std::process::exit(1);
        }
    };

    let today = chrono::Local::now().date_naive();
    let mut total = 0;
    let mut overdue = 0;
    for section in &sections {
        let (done, count) = section.completion_ratio();
        println!(
            "--- {} ({}) ---\n  {}/{} done ({:.2}%), {} upcoming",
            section.title,
            section.id,
            done,
            count,
            section.completion_percentage(),
            section.upcoming_count(today)
        );
        for task in section.tasks.iter().filter(|t| t.is_overdue(today)) {
            println!("  overdue since {}: {}", task.due_date, task.title);
            overdue += 1;
        }
        total += count;
    }

    println!(
        "\n{} sections, {} tasks, {} overdue",
        sections.len(),
        total,
        overdue
    );
}
