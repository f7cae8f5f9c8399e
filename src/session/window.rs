//! Window system and display contracts used by enforcement sessions.
//!
//! The session decides *what* windows exist and what they show; a
//! [`WindowSystem`] implementation decides how they are drawn. This keeps
//! the fan-out, countdown and teardown logic platform-independent and fully
//! testable with [`MockWindowSystem`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::error::SessionError;

// ============================================================================
// Displays
// ============================================================================

/// One attached display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
    /// What the OS reports; the session itself treats the *first* display
    /// as primary regardless.
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub name: String,
}

impl DisplayInfo {
    /// Creates a display descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32, x: i32, y: i32) -> Self {
        Self {
            width,
            height,
            x,
            y,
            is_primary: false,
            name: name.into(),
        }
    }

    /// Marks the display as the OS primary.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Geometry string in `WIDTHxHEIGHT+X+Y` form.
    #[must_use]
    pub fn geometry(&self) -> String {
        format!("{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Source of the attached display list.
pub trait DisplayEnumerator: Send + Sync {
    /// Returns the displays in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DisplayEnumeration` if the platform query fails.
    fn displays(&self) -> Result<Vec<DisplayInfo>, SessionError>;
}

/// A fixed display list, e.g. from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDisplays {
    displays: Vec<DisplayInfo>,
}

impl StaticDisplays {
    #[must_use]
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        Self { displays }
    }
}

impl DisplayEnumerator for StaticDisplays {
    fn displays(&self) -> Result<Vec<DisplayInfo>, SessionError> {
        Ok(self.displays.clone())
    }
}

// ============================================================================
// Windows
// ============================================================================

/// Opaque handle to a window created by a [`WindowSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(pub u64);

/// Role of a window within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    /// First display: grabs input and suppresses escape gestures
    Primary,
    /// Any other display: visual blackout only
    Secondary,
}

/// Key combinations that must do nothing while the primary window is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeGesture {
    Escape,
    AltF4,
    AltTab,
    CtrlAltDelete,
    SuperLeft,
    SuperRight,
}

/// Gestures suppressed on the primary window.
pub const ESCAPE_GESTURES: &[EscapeGesture] = &[
    EscapeGesture::Escape,
    EscapeGesture::AltF4,
    EscapeGesture::AltTab,
    EscapeGesture::CtrlAltDelete,
    EscapeGesture::SuperLeft,
    EscapeGesture::SuperRight,
];

/// Everything a window system needs to create one blackout window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpec {
    /// Display to cover exactly
    pub display: DisplayInfo,
    pub role: WindowRole,
    pub title: String,
    pub decorated: bool,
    pub resizable: bool,
    pub always_on_top: bool,
    /// Close requests are ignored for the whole session
    pub refuse_close: bool,
    /// Keep keyboard focus for the whole session
    pub capture_input: bool,
    /// Gestures bound to no-op handlers
    pub suppressed_gestures: Vec<EscapeGesture>,
}

impl OverlaySpec {
    /// Builds the spec for a display and role.
    #[must_use]
    pub fn for_display(display: DisplayInfo, role: WindowRole) -> Self {
        let primary = role == WindowRole::Primary;
        Self {
            display,
            role,
            title: "Break Time".to_string(),
            decorated: false,
            resizable: false,
            always_on_top: true,
            refuse_close: true,
            capture_input: primary,
            suppressed_gestures: if primary {
                ESCAPE_GESTURES.to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

/// Static indicator shown under the wellness message.
pub const MUSIC_INDICATOR: &str = "Music is playing...";

/// What the content window shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    /// Countdown label, e.g. `Break Time - 1:59`
    pub countdown: String,
    /// Rest guidance for this break
    pub message: String,
    pub music_indicator: String,
}

impl OverlayContent {
    #[must_use]
    pub fn new(countdown: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            countdown: countdown.into(),
            message: message.into(),
            music_indicator: MUSIC_INDICATOR.to_string(),
        }
    }
}

/// Creates, updates and destroys blackout windows.
pub trait WindowSystem: Send + Sync {
    /// Returns true if windows can be created at all.
    fn is_available(&self) -> bool;

    /// Creates one window.
    ///
    /// # Errors
    ///
    /// `WindowCreation` or `WindowSystemUnavailable`.
    fn open(&self, spec: &OverlaySpec) -> Result<WindowHandle, SessionError>;

    /// Replaces the content shown by `window`.
    fn set_content(&self, window: WindowHandle, content: &OverlayContent)
        -> Result<(), SessionError>;

    /// Destroys `window`.
    fn close(&self, window: WindowHandle) -> Result<(), SessionError>;
}

/// Window system for builds or environments without a GUI.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindowSystem;

impl WindowSystem for NoWindowSystem {
    fn is_available(&self) -> bool {
        false
    }

    fn open(&self, _spec: &OverlaySpec) -> Result<WindowHandle, SessionError> {
        Err(SessionError::WindowSystemUnavailable)
    }

    fn set_content(
        &self,
        _window: WindowHandle,
        _content: &OverlayContent,
    ) -> Result<(), SessionError> {
        Err(SessionError::WindowSystemUnavailable)
    }

    fn close(&self, _window: WindowHandle) -> Result<(), SessionError> {
        Err(SessionError::WindowSystemUnavailable)
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Mock window system for testing.
///
/// Clones share state so a test can inspect what a session did.
#[derive(Debug, Clone)]
pub struct MockWindowSystem {
    state: Arc<MockWindowState>,
}

#[derive(Debug, Default)]
struct MockWindowState {
    next_id: AtomicU64,
    available: AtomicBool,
    open: Mutex<BTreeMap<WindowHandle, OverlaySpec>>,
    opened: Mutex<Vec<OverlaySpec>>,
    contents: Mutex<Vec<(WindowHandle, OverlayContent)>>,
    closed: Mutex<Vec<WindowHandle>>,
    fail_open_for: Mutex<Vec<String>>,
    should_fail_close: AtomicBool,
}

impl Default for MockWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWindowSystem {
    #[must_use]
    pub fn new() -> Self {
        let state = MockWindowState::default();
        state.available.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.state.available.store(available, Ordering::SeqCst);
    }

    /// Makes window creation fail on the display with this name.
    pub fn fail_open_on(&self, display_name: impl Into<String>) {
        self.state
            .fail_open_for
            .lock()
            .unwrap()
            .push(display_name.into());
    }

    pub fn set_should_fail_close(&self, should_fail: bool) {
        self.state
            .should_fail_close
            .store(should_fail, Ordering::SeqCst);
    }

    /// Windows currently alive.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.open.lock().unwrap().len()
    }

    /// Every spec passed to a successful `open`, in order.
    #[must_use]
    pub fn opened_specs(&self) -> Vec<OverlaySpec> {
        self.state.opened.lock().unwrap().clone()
    }

    /// Every `set_content` call, in order.
    #[must_use]
    pub fn contents(&self) -> Vec<(WindowHandle, OverlayContent)> {
        self.state.contents.lock().unwrap().clone()
    }

    /// Every `close` call, in order (including failed ones).
    #[must_use]
    pub fn closed(&self) -> Vec<WindowHandle> {
        self.state.closed.lock().unwrap().clone()
    }
}

impl WindowSystem for MockWindowSystem {
    fn is_available(&self) -> bool {
        self.state.available.load(Ordering::SeqCst)
    }

    fn open(&self, spec: &OverlaySpec) -> Result<WindowHandle, SessionError> {
        if !self.is_available() {
            return Err(SessionError::WindowSystemUnavailable);
        }
        if self
            .state
            .fail_open_for
            .lock()
            .unwrap()
            .contains(&spec.display.name)
        {
            return Err(SessionError::WindowCreation {
                display: spec.display.name.clone(),
                reason: "Mock failure".to_string(),
            });
        }
        let handle = WindowHandle(self.state.next_id.fetch_add(1, Ordering::SeqCst));
        self.state.open.lock().unwrap().insert(handle, spec.clone());
        self.state.opened.lock().unwrap().push(spec.clone());
        Ok(handle)
    }

    fn set_content(
        &self,
        window: WindowHandle,
        content: &OverlayContent,
    ) -> Result<(), SessionError> {
        if !self.state.open.lock().unwrap().contains_key(&window) {
            return Err(SessionError::WindowUpdate(format!("{:?} is not open", window)));
        }
        self.state
            .contents
            .lock()
            .unwrap()
            .push((window, content.clone()));
        Ok(())
    }

    fn close(&self, window: WindowHandle) -> Result<(), SessionError> {
        self.state.closed.lock().unwrap().push(window);
        // A failed destroy still leaves the window gone from the mock's view,
        // like a native window that errored mid-teardown.
        let removed = self.state.open.lock().unwrap().remove(&window);
        if self.state.should_fail_close.load(Ordering::SeqCst) {
            return Err(SessionError::WindowTeardown("Mock failure".to_string()));
        }
        match removed {
            Some(_) => Ok(()),
            None => Err(SessionError::WindowTeardown(format!(
                "{:?} already closed",
                window
            ))),
        }
    }
}
