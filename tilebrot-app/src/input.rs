use eframe::egui;

use tilebrot_core::ViewEvent;

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputAction {
    View(ViewEvent),
    Back,
    Forward,
    CancelRender,
    ToggleHud,
}

/// Map one key press to an action.
pub(crate) fn key_action(key: egui::Key, modifiers: egui::Modifiers) -> Option<InputAction> {
    let action = match key {
        egui::Key::ArrowUp => InputAction::View(ViewEvent::PanUp),
        egui::Key::ArrowDown => InputAction::View(ViewEvent::PanDown),
        egui::Key::ArrowLeft => InputAction::View(ViewEvent::PanLeft),
        egui::Key::ArrowRight => InputAction::View(ViewEvent::PanRight),
        egui::Key::Plus | egui::Key::Equals => InputAction::View(ViewEvent::ZoomIn),
        egui::Key::Minus => InputAction::View(ViewEvent::ZoomOut),
        egui::Key::R if !modifiers.ctrl => InputAction::View(ViewEvent::Reset),
        egui::Key::Backspace if modifiers.shift => InputAction::Forward,
        egui::Key::Backspace => InputAction::Back,
        egui::Key::Escape => InputAction::CancelRender,
        egui::Key::H => InputAction::ToggleHud,
        _ => return None,
    };
    Some(action)
}

/// Collect the actions for every key pressed this frame, in order.
pub(crate) fn pressed_actions(ctx: &egui::Context) -> Vec<InputAction> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => key_action(*key, *modifiers),
                _ => None,
            })
            .collect()
    })
}
