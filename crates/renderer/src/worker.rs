//! Render worker protocol
//!
//! The controller and the render thread exchange messages over crossbeam
//! channels: `Initialize` must arrive exactly once before the first `Render`;
//! the worker acquires the drawing surface itself and hands a shared handle
//! back in the `Initialized` acknowledgement. Every executed render is
//! acknowledged with `RenderComplete`. Requests arriving faster than
//! [`RENDER_THROTTLE`] are coalesced: only the newest queued payload is
//! painted once the interval elapses, and superseded requests are dropped
//! without an acknowledgement.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use ephys_charts_shared::ChartsError;

use crate::frame::{self, RenderPayload};
use crate::surface::Surface;

/// Minimum interval between executed renders.
pub const RENDER_THROTTLE: Duration = Duration::from_millis(100);

/// The drawing surface owned by the worker. The worker paints into it; the
/// controller reads it out after each `RenderComplete`.
pub type SharedSurface = Arc<Mutex<Surface>>;

pub enum RenderCommand {
    Initialize { width: u32, height: u32 },
    Render(Box<RenderPayload>),
}

#[derive(Debug, Clone)]
pub enum RenderEvent {
    Initialized { surface: SharedSurface },
    RenderComplete { revision: u64 },
    Error { error: ChartsError },
}

/// Controller-side handle. Dropping it closes the command channel and joins
/// the worker thread.
#[derive(Debug)]
pub struct RenderWorker {
    commands: Option<Sender<RenderCommand>>,
    events: Receiver<RenderEvent>,
    handle: Option<thread::JoinHandle<()>>,
}

impl RenderWorker {
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (evt_tx, evt_rx) = crossbeam_channel::unbounded();
        let handle = thread::spawn(move || worker_loop(cmd_rx, evt_tx));
        Self {
            commands: Some(cmd_tx),
            events: evt_rx,
            handle: Some(handle),
        }
    }

    pub fn initialize(&self, width: u32, height: u32) {
        self.send(RenderCommand::Initialize { width, height });
    }

    pub fn render(&self, payload: RenderPayload) {
        self.send(RenderCommand::Render(Box::new(payload)));
    }

    pub fn events(&self) -> &Receiver<RenderEvent> {
        &self.events
    }

    fn send(&self, command: RenderCommand) {
        if let Some(commands) = &self.commands {
            if commands.send(command).is_err() {
                log::warn!("render worker is gone; command dropped");
            }
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(commands: Receiver<RenderCommand>, events: Sender<RenderEvent>) {
    let mut surface: Option<SharedSurface> = None;
    let mut last_render: Option<Instant> = None;

    while let Ok(command) = commands.recv() {
        match command {
            RenderCommand::Initialize { width, height } => {
                handle_initialize(&mut surface, width, height, &events);
            }
            RenderCommand::Render(payload) => {
                let mut payload = payload;

                // Coalesce whatever is already queued; the newest request
                // wins and the rest never acknowledge.
                while let Ok(next) = commands.try_recv() {
                    match next {
                        RenderCommand::Render(p) => payload = p,
                        RenderCommand::Initialize { width, height } => {
                            handle_initialize(&mut surface, width, height, &events);
                        }
                    }
                }

                // Honor the throttle interval, still absorbing newer
                // requests while waiting it out.
                if let Some(started) = last_render {
                    let deadline = started + RENDER_THROTTLE;
                    loop {
                        match commands.recv_deadline(deadline) {
                            Ok(RenderCommand::Render(p)) => payload = p,
                            Ok(RenderCommand::Initialize { width, height }) => {
                                handle_initialize(&mut surface, width, height, &events);
                            }
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                }

                let Some(shared) = surface.as_ref() else {
                    let _ = events.send(RenderEvent::Error {
                        error: ChartsError::RenderContext {
                            message: "render requested before initialize".to_string(),
                        },
                    });
                    continue;
                };

                {
                    let mut surface = shared.lock();
                    frame::paint(&mut surface, &payload);
                }
                last_render = Some(Instant::now());
                log::debug!("rendered revision {}", payload.revision);
                let _ = events.send(RenderEvent::RenderComplete {
                    revision: payload.revision,
                });
            }
        }
    }
}

fn handle_initialize(
    surface: &mut Option<SharedSurface>,
    width: u32,
    height: u32,
    events: &Sender<RenderEvent>,
) {
    if surface.is_some() {
        let _ = events.send(RenderEvent::Error {
            error: ChartsError::RenderContext {
                message: "worker already initialized".to_string(),
            },
        });
        return;
    }
    match Surface::new(width, height) {
        Ok(created) => {
            let shared = Arc::new(Mutex::new(created));
            *surface = Some(shared.clone());
            let _ = events.send(RenderEvent::Initialized { surface: shared });
        }
        Err(error) => {
            let _ = events.send(RenderEvent::Error { error });
        }
    }
}
