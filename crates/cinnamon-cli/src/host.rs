use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use cinnamon_core::config::ScriptingConfig;
use cinnamon_core::CinnamonConfig;
use cinnamon_runner::{FrameLoop, TickReport};
use cinnamon_scripting_host::{setup_reload_signal, ScriptRuntime};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Owns the frame loop and drives it from a timer, standing in for a game's
/// per-frame update.
pub struct Host {
    frame_loop: FrameLoop,
    scripting: ScriptingConfig,
    tick_interval: Duration,
}

impl Host {
    /// Build the loop (with a script runtime when scripting is enabled) and
    /// make it the process-wide current loop.
    pub fn new(config: &CinnamonConfig) -> anyhow::Result<Self> {
        let frame_loop = if config.scripting.enabled {
            let runtime = ScriptRuntime::new(&config.scripting)
                .context("Failed to create script runtime")?;
            FrameLoop::with_scripts(runtime)
        } else {
            info!(target: "cinnamon::host", "Scripting disabled");
            FrameLoop::new()
        };
        frame_loop.make_current();

        Ok(Self {
            frame_loop,
            scripting: config.scripting.clone(),
            tick_interval: config.frame.tick_interval(),
        })
    }

    pub fn frame_loop(&mut self) -> &mut FrameLoop {
        &mut self.frame_loop
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Schedule the autorun scripts followed by `extra`. Returns how many were
    /// scheduled.
    pub fn schedule_startup(&self, extra: &[PathBuf]) -> usize {
        let mut scripts = self.scripting.autorun_paths();
        scripts.extend(extra.iter().cloned());
        self.schedule_scripts(scripts)
    }

    /// Drop compiled scripts and schedule the autorun scripts again
    pub fn reload(&mut self) -> usize {
        info!(target: "cinnamon::host", "Reloading scripts");
        if let Some(runtime) = self.frame_loop.scripts() {
            runtime.clear_cache();
        }
        self.schedule_scripts(self.scripting.autorun_paths())
    }

    pub fn tick(&mut self, dt: Duration) -> TickReport {
        let report = self.frame_loop.tick(dt);
        if !report.invoked.is_empty() {
            debug!(
                target: "cinnamon::host",
                "Frame {}: ran {} invocation(s), {} failed",
                report.frame,
                report.invoked.len(),
                report.failed_count()
            );
        }
        report
    }

    /// Tick on a timer until Ctrl-C or until `max_frames` frames have run
    pub async fn run(&mut self, max_frames: Option<u64>) {
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut reload_rx = setup_reload_signal();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut last = time::Instant::now();
        loop {
            tokio::select! {
                instant = interval.tick() => {
                    let dt = instant.saturating_duration_since(last);
                    last = instant;
                    self.tick(dt);

                    if max_frames.is_some_and(|max| self.frame_loop.frame() >= max) {
                        info!(target: "cinnamon::host", "Ran {} frames, stopping", self.frame_loop.frame());
                        break;
                    }
                }
                Ok(()) = reload_rx.changed() => {
                    self.reload();
                }
                _ = &mut ctrl_c => {
                    info!(target: "cinnamon::host", "Received Ctrl-C, shutting down");
                    break;
                }
            }
        }
    }

    pub fn shutdown(self) {
        info!(target: "cinnamon::host", "Shutting down after {} frames", self.frame_loop.frame());
        self.frame_loop.shutdown();
    }

    fn schedule_scripts(&self, scripts: Vec<PathBuf>) -> usize {
        if scripts.is_empty() {
            return 0;
        }
        if !self.scripting.enabled {
            warn!(
                target: "cinnamon::host",
                "Scripting disabled, not running {} script(s)",
                scripts.len()
            );
            return 0;
        }

        let dispatcher = self.frame_loop.dispatcher();
        let mut scheduled = 0;
        for path in scripts {
            match dispatcher.schedule_script_file(path.clone()) {
                Ok(id) => {
                    debug!(target: "cinnamon::host", "Scheduled {} as {}", path.display(), id);
                    scheduled += 1;
                }
                Err(e) => warn!(target: "cinnamon::host", "Could not schedule {}: {}", path.display(), e),
            }
        }
        scheduled
    }
}
