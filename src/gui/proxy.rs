//! Window system proxy.
//!
//! Sessions run on the scheduler thread, but overlay windows must be created
//! by the UI event loop on the main thread. [`ProxyWindowSystem`] turns every
//! window operation into an [`OverlayCommand`] sent over a crossbeam channel;
//! the UI drains the [`OverlayCommands`] receiver on each poll.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::session::{OverlayContent, OverlaySpec, SessionError, WindowHandle, WindowSystem};

/// A window operation for the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    Open {
        handle: WindowHandle,
        spec: OverlaySpec,
    },
    SetContent {
        handle: WindowHandle,
        content: OverlayContent,
    },
    Close(WindowHandle),
}

/// Creates a connected proxy and receiver pair.
#[must_use]
pub fn overlay_channel() -> (ProxyWindowSystem, OverlayCommands) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let alive = Arc::new(AtomicBool::new(true));
    (
        ProxyWindowSystem {
            tx,
            next_id: AtomicU64::new(0),
            alive: Arc::clone(&alive),
        },
        OverlayCommands { rx, alive },
    )
}

/// Scheduler-side half: a [`WindowSystem`] that forwards to the UI.
#[derive(Debug)]
pub struct ProxyWindowSystem {
    tx: Sender<OverlayCommand>,
    next_id: AtomicU64,
    alive: Arc<AtomicBool>,
}

impl ProxyWindowSystem {
    fn send(&self, command: OverlayCommand) -> Result<(), SessionError> {
        if !self.is_available() {
            return Err(SessionError::WindowSystemUnavailable);
        }
        self.tx
            .send(command)
            .map_err(|_| SessionError::WindowSystemUnavailable)
    }
}

impl WindowSystem for ProxyWindowSystem {
    fn is_available(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn open(&self, spec: &OverlaySpec) -> Result<WindowHandle, SessionError> {
        let handle = WindowHandle(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.send(OverlayCommand::Open {
            handle,
            spec: spec.clone(),
        })
        .map_err(|e| SessionError::WindowCreation {
            display: spec.display.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(handle)
    }

    fn set_content(
        &self,
        window: WindowHandle,
        content: &OverlayContent,
    ) -> Result<(), SessionError> {
        self.send(OverlayCommand::SetContent {
            handle: window,
            content: content.clone(),
        })
        .map_err(|e| SessionError::WindowUpdate(e.to_string()))
    }

    fn close(&self, window: WindowHandle) -> Result<(), SessionError> {
        self.send(OverlayCommand::Close(window))
            .map_err(|e| SessionError::WindowTeardown(e.to_string()))
    }
}

/// UI-side half.
///
/// Dropping it marks the proxy unavailable, so sessions stop trying to open
/// windows once the UI is gone.
#[derive(Debug)]
pub struct OverlayCommands {
    rx: Receiver<OverlayCommand>,
    alive: Arc<AtomicBool>,
}

impl OverlayCommands {
    /// Takes every pending command.
    ///
    /// Returns `None` once the proxy has been dropped and nothing is pending.
    pub fn drain(&self) -> Option<Vec<OverlayCommand>> {
        let mut commands = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(command) => commands.push(command),
                Err(TryRecvError::Empty) => return Some(commands),
                Err(TryRecvError::Disconnected) if commands.is_empty() => return None,
                Err(TryRecvError::Disconnected) => return Some(commands),
            }
        }
    }
}

impl Drop for OverlayCommands {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
