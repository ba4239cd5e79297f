//! Session manager: one open simulation document.

use crate::block::ProcessBlock;
use crate::config::{CloseOptions, SessionConfig};
use crate::reaper::{ReapOutcome, StrayProcessReaper};
use crate::stream::ProcessStream;
use ap_core::{ApError, ApResult, EntityKind};
use ap_host::{AutomationServer, HostError, HostNode, ProcessTable};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What `close` did beyond closing the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseReport {
    /// `None` when stray process cleanup was not requested or failed.
    pub stray: Option<ReapOutcome>,
    /// Why the stray process cleanup failed, if it did.
    pub stray_error: Option<String>,
}

impl CloseReport {
    pub fn forced(&self) -> bool {
        self.stray.is_some_and(|s| s.terminated)
    }
}

/// An open simulation document on an automation server.
///
/// Must be closed with [`Simulation::close`]. A simulation dropped without
/// closing still closes its document and quits the host, but never runs the
/// stray process cleanup.
pub struct Simulation<S: AutomationServer> {
    server: S,
    path: PathBuf,
    closed: bool,
}

impl<S: AutomationServer> Simulation<S> {
    /// Load the document at `path` into `server`.
    ///
    /// Any failure is reported as [`ApError::Connection`] with the host's own
    /// diagnostic.
    pub fn open(server: S, path: impl AsRef<Path>) -> ApResult<Self> {
        let path = path.as_ref().to_path_buf();
        server
            .load_document(&path)
            .map_err(|e| ApError::Connection {
                message: e.to_string(),
            })?;
        info!(path = %path.display(), "simulation opened");
        Ok(Self {
            server,
            path,
            closed: false,
        })
    }

    /// Open and apply the visibility and dialog settings of `config`.
    pub fn open_with(server: S, path: impl AsRef<Path>, config: &SessionConfig) -> ApResult<Self> {
        let sim = Self::open(server, path)?;
        if let Some(visible) = config.visible {
            sim.set_visible(visible)?;
        }
        if let Some(suppress) = config.suppress_dialogs {
            sim.set_popups_suppressed(suppress)?;
        }
        Ok(sim)
    }

    /// Open, hand the simulation to `f`, then close it whatever `f` returned.
    ///
    /// Closing follows `config.close`, stray process cleanup included. An
    /// error from `f` takes precedence over an error from closing.
    pub fn scoped<P, T, F>(
        server: S,
        path: impl AsRef<Path>,
        config: &SessionConfig,
        processes: &P,
        f: F,
    ) -> ApResult<(T, CloseReport)>
    where
        P: ProcessTable + ?Sized,
        F: FnOnce(&Simulation<S>) -> ApResult<T>,
    {
        let sim = Self::open_with(server, path, config)?;
        let result = f(&sim);
        let closed = sim.close(&config.close, processes);
        match (result, closed) {
            (Ok(value), Ok(report)) => Ok((value, report)),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(close_err)) => {
                error!(error = %close_err, "closing after a failed session also failed");
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    /// Show or hide the host's main window.
    pub fn set_visible(&self, visible: bool) -> ApResult<()> {
        Ok(self.server.set_visible(visible)?)
    }

    /// Suppress (or allow) the host's confirmation pop-ups, e.g. on reinitialize.
    pub fn set_popups_suppressed(&self, suppress: bool) -> ApResult<()> {
        Ok(self.server.set_suppress_dialogs(suppress)?)
    }

    /// Run the simulation. Blocks until the host finishes; there is no timeout.
    pub fn run(&self) -> ApResult<()> {
        info!(path = %self.path.display(), "running simulation");
        self.server.run()?;
        info!(path = %self.path.display(), "simulation run finished");
        Ok(())
    }

    pub fn reinit(&self) -> ApResult<()> {
        info!(path = %self.path.display(), "reinitializing simulation");
        Ok(self.server.reinit()?)
    }

    /// The `Data\Blocks` folder of the variable tree.
    pub fn block_root(&self) -> ApResult<S::Node> {
        self.data_folder("Blocks")
    }

    /// The `Data\Streams` folder of the variable tree.
    pub fn stream_root(&self) -> ApResult<S::Node> {
        self.data_folder("Streams")
    }

    fn data_folder(&self, name: &str) -> ApResult<S::Node> {
        let data = self
            .server
            .tree()?
            .element("Data")?
            .ok_or_else(|| HostError::NodeMissing {
                path: "Data".to_string(),
            })?;
        let folder = data.element(name)?.ok_or_else(|| HostError::NodeMissing {
            path: format!(r"Data\{}", name),
        })?;
        Ok(folder)
    }

    /// Look up a stream by name. Absence is logged and returned as `None`.
    pub fn get_stream(&self, name: &str) -> ApResult<Option<ProcessStream<'_, S>>> {
        let node = self.lookup(EntityKind::Stream, name)?;
        Ok(node.map(|node| ProcessStream::new(name, node)))
    }

    /// Look up a block by name. Absence is logged and returned as `None`.
    pub fn get_block(&self, name: &str) -> ApResult<Option<ProcessBlock<'_, S>>> {
        let node = self.lookup(EntityKind::Block, name)?;
        Ok(node.map(|node| ProcessBlock::new(name, node)))
    }

    /// Like [`Simulation::get_stream`], but absence is an error.
    pub fn require_stream(&self, name: &str) -> ApResult<ProcessStream<'_, S>> {
        self.get_stream(name)?.ok_or_else(|| ApError::LookupAbsent {
            kind: EntityKind::Stream,
            name: name.to_string(),
        })
    }

    /// Like [`Simulation::get_block`], but absence is an error.
    pub fn require_block(&self, name: &str) -> ApResult<ProcessBlock<'_, S>> {
        self.get_block(name)?.ok_or_else(|| ApError::LookupAbsent {
            kind: EntityKind::Block,
            name: name.to_string(),
        })
    }

    fn lookup(&self, kind: EntityKind, name: &str) -> ApResult<Option<S::Node>> {
        let root = match kind {
            EntityKind::Stream => self.stream_root()?,
            EntityKind::Block => self.block_root()?,
        };
        let found = root.find_node(name)?;
        if found.is_none() {
            let absent = ApError::LookupAbsent {
                kind,
                name: name.to_string(),
            };
            warn!("{}", absent);
        }
        Ok(found)
    }

    /// Close the document and quit the host.
    ///
    /// Unless `options.kill_stray` is false, every process running
    /// `options.process_image` is then terminated if the process table lists
    /// more than `options.stray_threshold` lines for it. This is system-wide
    /// and may close unrelated instances of the host.
    ///
    /// Quit and the stray cleanup are attempted even when closing the document
    /// fails; the first host error is returned afterwards. The cleanup itself
    /// is best effort: its failure is logged and recorded in the report.
    pub fn close<P>(mut self, options: &CloseOptions, processes: &P) -> ApResult<CloseReport>
    where
        P: ProcessTable + ?Sized,
    {
        self.closed = true;
        let closed = self.server.close_document(&self.path);
        if let Err(e) = &closed {
            error!(path = %self.path.display(), error = %e, "failed to close document");
        }
        let quit = self.server.quit();
        if let Err(e) = &quit {
            error!(path = %self.path.display(), error = %e, "failed to quit host");
        }

        let mut report = CloseReport::default();
        if options.kill_stray {
            match StrayProcessReaper::new(processes, options.stray_threshold)
                .reap(&options.process_image)
            {
                Ok(outcome) => report.stray = Some(outcome),
                Err(e) => {
                    error!(
                        image = %options.process_image,
                        error = %e,
                        "stray process cleanup failed"
                    );
                    report.stray_error = Some(e.to_string());
                }
            }
        }

        closed.and(quit)?;
        info!(path = %self.path.display(), "simulation closed");
        Ok(report)
    }
}

impl<S: AutomationServer> Drop for Simulation<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!(
            path = %self.path.display(),
            "simulation dropped without close; closing document without stray process cleanup"
        );
        let result = self
            .server
            .close_document(&self.path)
            .and_then(|_| self.server.quit());
        if let Err(e) = result {
            error!(path = %self.path.display(), error = %e, "failed to close simulation");
        }
    }
}
