//! Watch command - rebuild on input changes

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use color_eyre::eyre::{Result, WrapErr};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{sync::mpsc, time::timeout};
use trailmark_core::Config;
use trailmark_generator::Builder;

/// Quiet period after the last change before a rebuild starts.
const DEBOUNCE_MS: u64 = 100;

/// Outcome of waiting for the next burst of changes.
#[derive(Debug, PartialEq, Eq)]
enum Wake {
    /// Paths changed and the quiet period has passed.
    Changed(Vec<PathBuf>),
    /// Shutdown was requested or the watcher went away.
    Stopped,
}

/// Whether an event touched a locale, template or partial file.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|path| is_input_file(path))
}

/// Input files are `*.json` locales and `*.html` templates or partials.
fn is_input_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "json" || ext == "html")
}

/// Run the watch command.
///
/// Builds once, then rebuilds into `root` whenever an input changes. Bursts of
/// events are coalesced: every event restarts the quiet period, and builds
/// never overlap.
pub async fn run(root: &Path, config: Config) -> Result<()> {
    let builder = Builder::new(config.clone(), root, root);

    tracing::info!("Running initial build...");
    rebuild(&builder).await?;

    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if is_relevant(&event) => {
                for path in event.paths {
                    let _ = tx.blocking_send(path);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("watch error: {e}"),
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to create file watcher")?;

    for dir in [
        &config.paths.locales,
        &config.paths.templates,
        &config.paths.partials,
    ] {
        let dir = root.join(dir);
        if dir.is_dir() {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .wrap_err_with(|| format!("Failed to watch {}", dir.display()))?;
            tracing::debug!(dir = %dir.display(), "watching");
        }
    }

    println!();
    println!("  Watching for changes in locales, templates and partials...");
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let quiet = Duration::from_millis(DEBOUNCE_MS);

    while let Wake::Changed(paths) = next_batch(&mut rx, quiet, &mut shutdown).await {
        for path in &paths {
            log_change(root, path);
        }

        println!("  Changes detected, rebuilding...");
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            result = rebuild(&builder) => {
                if let Err(e) = result {
                    tracing::error!("Rebuild failed: {e:#}");
                    eprintln!("  ✗ Rebuild failed: {e}");
                }
            }
        }
    }

    tracing::info!("Stopping watch mode");
    drop(watcher);
    Ok(())
}

/// Wait for the next change, then for `quiet` to pass without another one.
///
/// Every further change restarts the quiet period. `shutdown` is observed
/// throughout.
async fn next_batch<F>(
    rx: &mut mpsc::Receiver<PathBuf>,
    quiet: Duration,
    shutdown: &mut F,
) -> Wake
where
    F: Future + Unpin,
{
    let mut changed = tokio::select! {
        biased;
        _ = &mut *shutdown => return Wake::Stopped,
        first = rx.recv() => match first {
            Some(path) => vec![path],
            None => return Wake::Stopped,
        },
    };

    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => return Wake::Stopped,
            next = timeout(quiet, rx.recv()) => match next {
                Ok(Some(path)) => changed.push(path),
                Ok(None) | Err(_) => return Wake::Changed(changed),
            },
        }
    }
}

/// Log one changed path relative to the project root.
fn log_change(root: &Path, path: &Path) {
    let shown = path.strip_prefix(root).unwrap_or(path);
    tracing::info!(path = %shown.display(), "File changed");
}

/// Run one build on the blocking pool.
async fn rebuild(builder: &Builder) -> Result<()> {
    let builder = builder.clone();
    let stats = tokio::task::spawn_blocking(move || builder.build())
        .await
        .wrap_err("Build task panicked")?
        .wrap_err("Build failed")?;

    println!(
        "  ✓ Built {} pages in {}ms, waiting for changes...",
        stats.pages, stats.duration_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use super::*;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_relevant_events() {
        assert!(is_relevant(&event(
            EventKind::Modify(ModifyKind::Any),
            "locales/en.json"
        )));
        assert!(is_relevant(&event(
            EventKind::Create(CreateKind::File),
            "partials/footer.html"
        )));
    }

    #[test]
    fn test_irrelevant_events() {
        assert!(!is_relevant(&event(
            EventKind::Access(AccessKind::Any),
            "locales/en.json"
        )));
        assert!(!is_relevant(&event(
            EventKind::Modify(ModifyKind::Any),
            "templates/.index.html.swp"
        )));
    }

    #[tokio::test]
    async fn test_next_batch_coalesces_burst() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(PathBuf::from("locales/en.json")).await.unwrap();
        tx.send(PathBuf::from("locales/zh.json")).await.unwrap();
        let mut never = std::future::pending::<()>();

        let wake = next_batch(&mut rx, Duration::from_millis(10), &mut never).await;

        assert_eq!(
            wake,
            Wake::Changed(vec![
                PathBuf::from("locales/en.json"),
                PathBuf::from("locales/zh.json"),
            ])
        );
        drop(tx);
    }

    #[tokio::test]
    async fn test_next_batch_stops_during_quiet_period() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(PathBuf::from("templates/index.html")).await.unwrap();
        let mut stop = Box::pin(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
        });

        // The quiet period is far longer than the shutdown delay.
        let wake = next_batch(&mut rx, Duration::from_secs(60), &mut stop).await;

        assert_eq!(wake, Wake::Stopped);
        drop(tx);
    }

    #[tokio::test]
    async fn test_next_batch_stops_when_channel_closes() {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(8);
        drop(tx);
        let mut never = std::future::pending::<()>();

        let wake = next_batch(&mut rx, Duration::from_millis(10), &mut never).await;
        assert_eq!(wake, Wake::Stopped);
    }
}
