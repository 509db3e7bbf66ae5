//! Floating widgets drawn over the current screen.

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::application::Operation;
use crate::presentation::Notifications;
use crate::tui::styles::MedicalTheme;

const NOTIFICATION_WIDTH: u16 = 48;
const NOTIFICATION_HEIGHT: u16 = 4;
const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Stack notifications in the top-right corner, newest on top.
pub fn render_notifications(f: &mut Frame, area: Rect, notifications: &Notifications) {
    let width = NOTIFICATION_WIDTH.min(area.width);
    let x = area.x + area.width.saturating_sub(width + 1);
    let mut y = area.y + 1;

    let items: Vec<_> = notifications.iter().collect();
    for notification in items.iter().rev() {
        if y + NOTIFICATION_HEIGHT > area.y + area.height {
            break;
        }

        let rect = Rect::new(x, y, width, NOTIFICATION_HEIGHT);
        let style = MedicalTheme::notification(notification.kind);
        let p = Paragraph::new(Span::styled(notification.message.clone(), MedicalTheme::text()))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(style)
                    .title_bottom(Span::styled(" [Esc] dismiss ", MedicalTheme::text_muted())),
            );

        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
        y += NOTIFICATION_HEIGHT;
    }
}

fn loading_text(operation: Operation) -> &'static str {
    match operation {
        Operation::Analyze => "Analyzing patient data...",
        Operation::UploadCsv => "Uploading CSV file...",
        Operation::GenerateSample => "Generating sample patient...",
    }
}

/// Modal shown while a request is in flight.
pub fn render_loading(f: &mut Frame, area: Rect, operation: Operation, elapsed: Duration) {
    let rect = centered_rect(area, 44, 7);
    let frame = (elapsed.as_millis() / 150) as usize % SPINNER.len();

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} ", SPINNER[frame]), MedicalTheme::focused()),
            Span::styled(loading_text(operation), MedicalTheme::text()),
        ]),
        Line::from(Span::styled(
            format!("{}s elapsed", elapsed.as_secs()),
            MedicalTheme::text_muted(),
        )),
        Line::from(vec![
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ]),
    ];

    let p = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .title(Span::styled(" Please wait ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );

    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Path input for the CSV upload.
pub fn render_csv_prompt(f: &mut Frame, area: Rect, path: &str) {
    let rect = centered_rect(area, 64, 7);

    let text = vec![
        Line::from(Span::styled(
            "Path to a CSV file of patient records:",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" > ", MedicalTheme::focused()),
            Span::styled(path.to_string(), MedicalTheme::text()),
            Span::styled("▌", MedicalTheme::cursor()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Upload ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Cancel", MedicalTheme::key_desc()),
        ]),
    ];

    let p = Paragraph::new(text).block(
        Block::default()
            .title(Span::styled(" Upload CSV ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );

    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// A `width` x `height` rectangle centred in `area`, shrunk to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(area, 44, 7);
        assert_eq!(rect.width, 44);
        assert_eq!(rect.height, 7);
        assert_eq!(rect.x, 28);
        assert_eq!(rect.y, 16);

        let small = centered_rect(Rect::new(0, 0, 20, 5), 44, 7);
        assert_eq!((small.width, small.height), (20, 5));
    }
}
