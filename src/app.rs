use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;

use crate::bridge::CapabilityRegistry;
use crate::host;
use crate::msg::Msg;
use crate::view::ClickHandlerView;

pub struct App {
    view: ClickHandlerView,
    pub should_quit: bool,
}

impl App {
    /// Fails when the bridge lacks a capability the view depends on, so a
    /// missing host function shows up at startup instead of on first click.
    pub fn new(bridge: Arc<CapabilityRegistry>) -> Result<Self> {
        bridge
            .ensure_all(&host::required())
            .context("host bridge is missing a required capability")?;

        tracing::debug!(target: "aknet::ui", capabilities = ?bridge.names(), "bridge validated");

        Ok(Self {
            view: ClickHandlerView::mount(bridge),
            should_quit: false,
        })
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Activate => self.activate(),
            Msg::Resize(..) | Msg::Tick => {}
            Msg::Quit => self.should_quit = true,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            // The button is the only control, so it always has focus.
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) && self.view.hit(mouse.column, mouse.row) {
            self.activate();
        }
    }

    fn activate(&mut self) {
        match self.view.activate() {
            Ok(()) => tracing::debug!(target: "aknet::ui", "button activated"),
            Err(err) => tracing::error!(target: "aknet::ui", capability = err.capability_name(), "activation failed: {err}"),
        }
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        self.view.render(frame, frame.area());
    }
}
