//! Blackout overlay UI.
//!
//! An iced multi-window daemon that lives on the main thread for the whole
//! process. It owns no timers: it only applies [`OverlayCommand`]s sent by
//! sessions through the proxy, polling for them every [`COMMAND_POLL`].
//!
//! A window whose spec captures input takes focus back whenever it loses
//! it, and swallows its suppressed escape gestures.

use std::collections::HashMap;
use std::time::Duration;

use iced::keyboard::{self, key, Key, Location, Modifiers};
use iced::widget::{column, container, text, Space};
use iced::{event, window, Alignment, Color, Element, Event, Length, Point, Size, Subscription, Task};
use tracing::{debug, info};

use super::proxy::{OverlayCommand, OverlayCommands};
use crate::session::{EscapeGesture, OverlayContent, OverlaySpec, WindowHandle};

/// How often pending window commands are applied.
pub const COMMAND_POLL: Duration = Duration::from_millis(50);

const COUNTDOWN_SIZE: f32 = 72.0;
const MESSAGE_SIZE: f32 = 32.0;
const INDICATOR_SIZE: f32 = 18.0;

#[derive(Debug, Clone)]
pub enum Message {
    Poll,
    Opened(WindowHandle),
    CloseRequested(window::Id),
    FocusLost(window::Id),
    Gesture(window::Id, EscapeGesture),
}

struct OverlayWindow {
    handle: WindowHandle,
    spec: OverlaySpec,
    content: Option<OverlayContent>,
}

/// State of the overlay daemon.
pub struct OverlayApp {
    commands: OverlayCommands,
    windows: HashMap<window::Id, OverlayWindow>,
    ids: HashMap<WindowHandle, window::Id>,
}

impl OverlayApp {
    fn new(commands: OverlayCommands) -> Self {
        Self {
            commands,
            windows: HashMap::new(),
            ids: HashMap::new(),
        }
    }

    fn title(&self, id: window::Id) -> String {
        self.windows
            .get(&id)
            .map(|w| w.spec.title.clone())
            .unwrap_or_default()
    }

    /// True if `id` must keep keyboard focus.
    fn captures_input(&self, id: window::Id) -> bool {
        self.windows.get(&id).is_some_and(|w| w.spec.capture_input)
    }

    fn suppresses(&self, id: window::Id, gesture: EscapeGesture) -> bool {
        self.windows
            .get(&id)
            .is_some_and(|w| w.spec.suppressed_gestures.contains(&gesture))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Poll => match self.commands.drain() {
                Some(commands) => {
                    Task::batch(commands.into_iter().map(|command| self.apply(command)))
                }
                None => {
                    info!("Scheduler finished, closing overlay UI");
                    iced::exit()
                }
            },
            Message::Opened(handle) => {
                let Some(id) = self.ids.get(&handle).copied() else {
                    return Task::none();
                };
                if self.captures_input(id) {
                    window::gain_focus(id)
                } else {
                    Task::none()
                }
            }
            Message::CloseRequested(id) => {
                debug!("Ignoring close request for {:?}", id);
                Task::none()
            }
            Message::FocusLost(id) => {
                if self.captures_input(id) {
                    debug!("Overlay {:?} lost focus, taking it back", id);
                    window::gain_focus(id)
                } else {
                    Task::none()
                }
            }
            Message::Gesture(id, gesture) => {
                if self.suppresses(id, gesture) {
                    debug!("Suppressed {:?}", gesture);
                    window::gain_focus(id)
                } else {
                    Task::none()
                }
            }
        }
    }

    fn apply(&mut self, command: OverlayCommand) -> Task<Message> {
        match command {
            OverlayCommand::Open { handle, spec } => {
                let settings = window_settings(&spec);
                let (id, open) = window::open(settings);
                self.ids.insert(handle, id);
                self.windows.insert(
                    id,
                    OverlayWindow {
                        handle,
                        spec,
                        content: None,
                    },
                );
                open.map(move |_| Message::Opened(handle))
            }
            OverlayCommand::SetContent { handle, content } => {
                if let Some(window) = self
                    .ids
                    .get(&handle)
                    .and_then(|id| self.windows.get_mut(id))
                {
                    window.content = Some(content);
                }
                Task::none()
            }
            OverlayCommand::Close(handle) => match self.ids.remove(&handle) {
                Some(id) => {
                    self.windows.remove(&id);
                    window::close(id)
                }
                None => Task::none(),
            },
        }
    }

    fn view(&self, id: window::Id) -> Element<'_, Message> {
        let body: Element<'_, Message> = match self.windows.get(&id).and_then(|w| w.content.as_ref())
        {
            Some(content) => column![
                text(content.countdown.as_str()).size(COUNTDOWN_SIZE),
                text(content.message.as_str()).size(MESSAGE_SIZE),
                text(content.music_indicator.as_str()).size(INDICATOR_SIZE),
            ]
            .spacing(32)
            .align_x(Alignment::Center)
            .into(),
            None => Space::new(Length::Fill, Length::Fill).into(),
        };

        container(body)
            .center(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::BLACK.into()),
                text_color: Some(Color::WHITE),
                ..container::Style::default()
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(COMMAND_POLL).map(|_| Message::Poll),
            window::close_requests().map(Message::CloseRequested),
            event::listen_with(input_event),
        ])
    }

    #[cfg(test)]
    fn window_count(&self) -> usize {
        self.windows.len()
    }

    #[cfg(test)]
    fn handle_of(&self, id: window::Id) -> Option<WindowHandle> {
        self.windows.get(&id).map(|w| w.handle)
    }
}

/// Maps raw window and keyboard events to overlay messages.
///
/// Captured events are still offered: the escape gestures must be seen even
/// when a widget claims them.
fn input_event(event: Event, _status: event::Status, id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Unfocused) => Some(Message::FocusLost(id)),
        Event::Keyboard(keyboard::Event::KeyPressed {
            key,
            location,
            modifiers,
            ..
        }) => gesture_for(&key, location, modifiers).map(|g| Message::Gesture(id, g)),
        _ => None,
    }
}

/// The escape gesture a key press forms, if any.
fn gesture_for(key: &Key, location: Location, modifiers: Modifiers) -> Option<EscapeGesture> {
    let Key::Named(named) = key else {
        return None;
    };
    match named {
        key::Named::Escape => Some(EscapeGesture::Escape),
        key::Named::F4 if modifiers.alt() => Some(EscapeGesture::AltF4),
        key::Named::Tab if modifiers.alt() => Some(EscapeGesture::AltTab),
        key::Named::Delete if modifiers.control() && modifiers.alt() => {
            Some(EscapeGesture::CtrlAltDelete)
        }
        key::Named::Super | key::Named::Meta => match location {
            Location::Right => Some(EscapeGesture::SuperRight),
            _ => Some(EscapeGesture::SuperLeft),
        },
        _ => None,
    }
}

/// Native window settings covering one display.
fn window_settings(spec: &OverlaySpec) -> window::Settings {
    window::Settings {
        size: Size::new(spec.display.width as f32, spec.display.height as f32),
        position: window::Position::Specific(Point::new(
            spec.display.x as f32,
            spec.display.y as f32,
        )),
        decorations: spec.decorated,
        resizable: spec.resizable,
        level: if spec.always_on_top {
            window::Level::AlwaysOnTop
        } else {
            window::Level::Normal
        },
        exit_on_close_request: !spec.refuse_close,
        ..window::Settings::default()
    }
}

/// Runs the overlay daemon until the proxy is dropped.
///
/// Must be called on the main thread.
pub fn run_overlay_daemon(commands: OverlayCommands) -> iced::Result {
    iced::daemon(OverlayApp::title, OverlayApp::update, OverlayApp::view)
        .subscription(OverlayApp::subscription)
        .run_with(move || (OverlayApp::new(commands), Task::none()))
}
