use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::bridge::capabilities::LOG_TEST_MSG;
use crate::bridge::{BridgeError, CapabilityRegistry};

pub const LABEL: &str = "Click me";

/// Borders plus one column of padding on each side.
const BUTTON_WIDTH: u16 = LABEL.len() as u16 + 4;
const BUTTON_HEIGHT: u16 = 3;

/// A single centered button that calls `log_test_msg` on the host.
///
/// Holds no state besides where the button was last drawn, which is needed
/// to hit-test mouse presses.
#[derive(Debug)]
pub struct ClickHandlerView {
    bridge: Arc<CapabilityRegistry>,
    button: Option<Rect>,
}

impl ClickHandlerView {
    pub fn mount(bridge: Arc<CapabilityRegistry>) -> Self {
        Self {
            bridge,
            button: None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::default().style(Style::default().bg(Color::Reset)), area);

        let button = button_rect(area);
        let widget = Paragraph::new(LABEL).centered().block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .style(Style::default().add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(widget, button);

        self.button = Some(button);
    }

    /// Where the button was last rendered; `None` before the first frame.
    #[cfg(test)]
    pub(crate) fn button_area(&self) -> Option<Rect> {
        self.button
    }

    pub fn hit(&self, column: u16, row: u16) -> bool {
        self.button
            .is_some_and(|button| button.contains(Position::new(column, row)))
    }

    /// One host call per activation; the result is discarded and failures
    /// are returned to the caller untouched.
    pub fn activate(&self) -> Result<(), BridgeError> {
        self.bridge.invoke(LOG_TEST_MSG, ())
    }
}

fn button_rect(area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(BUTTON_HEIGHT)])
        .flex(Flex::Center)
        .areas(area);
    let [button] = Layout::horizontal([Constraint::Length(BUTTON_WIDTH)])
        .flex(Flex::Center)
        .areas(row);
    button
}
