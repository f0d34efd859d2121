// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! Native window and keyboard events are turned into top-level messages:
//! file drops only on the upload screen, close requests everywhere, and key
//! presses that no widget captured for carousel navigation.

use super::{Message, Screen};
use crate::config::NOTIFICATION_TICK_MS;
use iced::{event, keyboard, time, window, Event, Subscription};
use std::time::Duration;

pub fn create_event_subscription(screen: Screen) -> Subscription<Message> {
    match screen {
        Screen::Upload => event::listen_with(|event, status, window_id| {
            if let Event::Window(window::Event::FileDropped(path)) = &event {
                return Some(Message::FileDropped(path.clone()));
            }
            route_common(event, status, window_id)
        }),
        Screen::Results => event::listen_with(route_common),
    }
}

fn route_common(event: Event, status: event::Status, window_id: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::CloseRequested) => {
            Some(Message::WindowCloseRequested(window_id))
        }
        Event::Keyboard(keyboard::Event::KeyPressed { key, .. })
            if status == event::Status::Ignored =>
        {
            Some(Message::KeyPressed(key))
        }
        _ => None,
    }
}

/// Ticks only while notifications are on screen.
pub fn create_tick_subscription(has_notifications: bool) -> Subscription<Message> {
    if has_notifications {
        time::every(Duration::from_millis(NOTIFICATION_TICK_MS)).map(Message::Tick)
    } else {
        Subscription::none()
    }
}
