//! Example: Browse a directory on a file server and upload into it
//!
//! Usage:
//!   cargo run --example browse -- [--base-url URL] [--path docs/img]
//!       [--search TEXT] [--sort name|size|time[:desc]] [--upload FILE]...
//!
//! Without `--base-url` the `FILEDECK_*` environment variables apply.

mod cli;

use cli::{ArgParser, usage_and_exit};
use filedeck::fs::format_size;
use filedeck::{
    Browser, ClientConfig, ListingStatus, PendingUpload, RemotePath, SortKey, SortSpec,
    UploadState,
};
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "Usage: cargo run --example browse -- [--base-url URL] [--path PATH] \
[--search TEXT] [--sort name|size|time[:desc]] [--upload FILE]...";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("filedeck=debug"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn parse_sort(raw: &str) -> Option<SortSpec> {
    let (key, desc) = match raw.split_once(':') {
        Some((key, "desc")) => (key, true),
        Some((key, "asc")) => (key, false),
        Some(_) => return None,
        None => (raw, false),
    };
    let key = match key {
        "name" => SortKey::Name,
        "size" => SortKey::Size,
        "time" | "modified" => SortKey::ModifiedTime,
        _ => return None,
    };
    Some(if desc {
        SortSpec::descending(key)
    } else {
        SortSpec::ascending(key)
    })
}

async fn print_listing(browser: &mut Browser) {
    browser.run_until_idle().await;

    println!("\n📁 {}\n", browser.path());
    if let ListingStatus::Error(e) = browser.status() {
        eprintln!("❌ Listing failed: {}", e);
    }

    let view = browser.view();
    for entry in &view.entries {
        if entry.is_dir() {
            println!("  📁 {}/", entry.name);
        } else {
            println!(
                "  📄 {:<40} {:>10}  {}",
                entry.name,
                format_size(entry.size),
                entry.modified_time.format("%Y-%m-%d %H:%M")
            );
        }
    }
    if view.ignored > 0 {
        println!("\n  ({} entries hidden by search)", view.ignored);
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let mut parser = ArgParser::new(USAGE);

    let config = match parser.take_value(&["--base-url", "-u"]) {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env().unwrap_or_else(|e| {
            eprintln!("❌ {}", e);
            usage_and_exit(USAGE)
        }),
    };
    let path = parser
        .take_value(&["--path", "-p"])
        .map(|p| RemotePath::normalize(&p))
        .unwrap_or_default();
    let search = parser.take_value(&["--search", "-s"]);
    let sort = parser
        .take_value(&["--sort"])
        .map(|s| parse_sort(&s).unwrap_or_else(|| usage_and_exit(USAGE)));
    let uploads = parser.take_all(&["--upload"]);
    if !parser.remaining().is_empty() {
        usage_and_exit(USAGE);
    }

    println!("Connecting to {}...", config.base_url);
    let mut browser = match Browser::connect(config) {
        Ok(browser) => browser,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if let Some(search) = search {
        browser.set_search(search);
    }
    browser.set_sort(sort);

    browser.navigate(path);
    print_listing(&mut browser).await;

    if uploads.is_empty() {
        return;
    }

    let mut files = Vec::new();
    for file in &uploads {
        match PendingUpload::from_path(file) {
            Ok(pending) => files.push(pending),
            Err(e) => eprintln!("❌ {}: {}", file, e),
        }
    }

    println!("\n⬆️  Uploading {} file(s) to {}", files.len(), browser.path());
    browser.enqueue(files);
    while browser.is_busy() {
        browser.next_event().await;
    }

    for task in browser.uploads() {
        match &task.state {
            UploadState::Done => println!("  ✅ {} {}", task.id, task.file_name),
            UploadState::Failed(e) => println!("  ❌ {} {}: {}", task.id, task.file_name, e),
            state => println!("  … {} {}: {:?}", task.id, task.file_name, state),
        }
    }
    browser.dismiss_finished();

    print_listing(&mut browser).await;
}
