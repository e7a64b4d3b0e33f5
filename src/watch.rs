//! Watch Mode
//!
//! Compiles once, then recompiles whenever the main file (or, in project mode,
//! any sibling source) changes. Bursts of filesystem events collapse into a
//! single recompile through a trailing debounce window.

use crate::api::CompileBackend;
use crate::compile::CompileRunner;
use crate::config::WatchSettings;
use crate::error::CetError;
use crate::project::path::canonicalize_path;
use crate::project::{resolve_search_dir, CollectOptions};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// How long the loop sleeps between stop-flag checks when nothing is pending
const IDLE_POLL: Duration = Duration::from_millis(200);

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Quiet period after the last relevant event
    pub debounce: Duration,
    /// Clear the terminal before each recompile
    pub clear_screen: bool,
    /// Watch every project source instead of only the main file
    pub project: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::from(&WatchSettings::default())
    }
}

impl From<&WatchSettings> for WatchConfig {
    fn from(settings: &WatchSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.debounce_ms),
            clear_screen: settings.clear_screen,
            project: settings.project,
        }
    }
}

/// Trailing-edge debounce: fires once the window passes with no new events.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record an event at `now`, pushing the deadline out by one window.
    pub fn record(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.map_or(false, |deadline| now >= deadline)
    }

    /// Time to block waiting for the next event.
    pub fn wait_timeout(&self, now: Instant, idle: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => idle,
        }
    }

    pub fn reset(&mut self) {
        self.deadline = None;
    }
}

/// Writes and creations only; metadata and access events never trigger.
pub(crate) fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// Decides which changed paths warrant a recompile
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    main: PathBuf,
    project: Option<ProjectScope>,
}

#[derive(Debug, Clone)]
struct ProjectScope {
    root: PathBuf,
    extension: Option<OsString>,
    options: CollectOptions,
}

impl ChangeFilter {
    /// Only the main file (canonical) counts.
    pub fn main_only(main: PathBuf) -> Self {
        Self {
            main,
            project: None,
        }
    }

    /// The main file plus any file under `root` that the collector would send.
    pub fn project(main: PathBuf, root: PathBuf, options: CollectOptions) -> Self {
        let extension = main.extension().map(|ext| ext.to_os_string());
        Self {
            main,
            project: Some(ProjectScope {
                root,
                extension,
                options,
            }),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        is_content_change(&event.kind) && event.paths.iter().any(|path| self.matches_path(path))
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        if path == self.main {
            return true;
        }
        let Some(scope) = &self.project else {
            return false;
        };
        let Some(ext) = &scope.extension else {
            return false;
        };
        if path.extension() != Some(ext.as_os_str()) {
            return false;
        }
        if path
            .file_name()
            .map_or(true, |name| scope.options.skips_file(name))
        {
            return false;
        }
        // Only directories are pruned; the file name itself was checked above.
        match path.strip_prefix(&scope.root) {
            Ok(relative) => !relative
                .parent()
                .map_or(false, |dirs| {
                    dirs.components().any(|component| match component {
                        Component::Normal(name) => scope.options.skips_dir(name),
                        _ => false,
                    })
                }),
            Err(_) => false,
        }
    }
}

/// Stops a running [`WatchSession`] from another thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<RwLock<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        *self.running.write() = false;
    }
}

/// Watch loop around a [`CompileRunner`]
pub struct WatchSession<B> {
    runner: CompileRunner<B>,
    config: WatchConfig,
    running: Arc<RwLock<bool>>,
}

impl<B: CompileBackend> WatchSession<B> {
    pub fn new(runner: CompileRunner<B>, config: WatchConfig) -> Self {
        Self {
            runner,
            config,
            running: Arc::new(RwLock::new(true)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn runner(&self) -> &CompileRunner<B> {
        &self.runner
    }

    /// Print the banner, compile once, then block recompiling on change until stopped.
    ///
    /// Compile failures are printed and the loop keeps going; only watcher
    /// setup and output errors end the session.
    pub fn start<W: Write>(&self, runtime: &Runtime, out: &mut W) -> Result<(), CetError> {
        let settings = self.runner.settings();
        let main = canonicalize_path(&settings.file)?;

        let main_dir = main
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CetError::InvalidPath(format!("{} has no parent", main.display())))?;

        // (directory, mode) pairs; the main file's directory is always covered.
        let (watches, filter) = if self.config.project {
            let root = resolve_search_dir(&main, settings.root.as_deref())?;
            let filter = ChangeFilter::project(
                main.clone(),
                root.clone(),
                settings.collect_options.clone(),
            );
            let mut watches = vec![(root.clone(), RecursiveMode::Recursive)];
            if !main.starts_with(&root) {
                watches.push((main_dir, RecursiveMode::NonRecursive));
            }
            (watches, filter)
        } else {
            (
                vec![(main_dir, RecursiveMode::NonRecursive)],
                ChangeFilter::main_only(main.clone()),
            )
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| CetError::WatchError(format!("Failed to create watcher: {}", e)))?;
        for (dir, mode) in &watches {
            watcher.watch(dir, *mode).map_err(|e| {
                CetError::WatchError(format!("Failed to watch {}: {}", dir.display(), e))
            })?;
            info!(
                file = %main.display(),
                dir = %dir.display(),
                project = self.config.project,
                "Watching"
            );
        }

        let renderer = self.runner.renderer();
        write!(
            out,
            "{}",
            renderer.watch_banner(
                &settings.display_name(),
                &settings.compiler,
                &settings.args,
                self.runner.backend().server(),
            )
        )?;
        self.compile_once(runtime, out)?;

        let mut debouncer = Debouncer::new(self.config.debounce);
        loop {
            if !*self.running.read() {
                break;
            }

            let timeout = debouncer.wait_timeout(Instant::now(), IDLE_POLL);
            match rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if filter.matches(&event) {
                        debug!(kind = ?event.kind, paths = ?event.paths, "Change detected");
                        debouncer.record(Instant::now());
                    }
                }
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                    writeln!(out, "{}", renderer.error(&format!("Watcher error: {}", e)))?;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if debouncer.is_due(Instant::now()) {
                debouncer.reset();
                self.recompile(runtime, out)?;
            }
        }

        info!("Watch stopped");
        Ok(())
    }

    fn recompile<W: Write>(&self, runtime: &Runtime, out: &mut W) -> Result<(), CetError> {
        if self.config.clear_screen {
            write!(out, "{}", self.runner.renderer().clear_screen())?;
        }
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        write!(
            out,
            "{}",
            self.runner
                .renderer()
                .recompile_header(&self.runner.settings().display_name(), &time)
        )?;
        self.compile_once(runtime, out)
    }

    fn compile_once<W: Write>(&self, runtime: &Runtime, out: &mut W) -> Result<(), CetError> {
        match runtime.block_on(self.runner.run(out)) {
            Ok(code) => debug!(code, "Compile cycle finished"),
            Err(e) => {
                warn!(error = %e, "Compile cycle failed");
                writeln!(out, "{}", self.runner.renderer().error(&format!("Error: {}", e)))?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
