//! Analysis report view: bar chart, radar chart and the results panel.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use crate::domain::format_measurement;
use crate::presentation::{
    charts::RadarChart, results::NO_CONDITIONS_MESSAGE, results::PLACEHOLDER_MESSAGE,
    ChartColor, Charts, ResultSection, ResultsPanel,
};
use crate::tui::styles::MedicalTheme;

/// Render the report screen
pub fn render_report(f: &mut Frame, area: Rect, charts: &Charts, results: &ResultsPanel, scroll: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(45), // Charts
            Constraint::Min(6),         // Results
            Constraint::Length(3),      // Footer
        ])
        .split(area);

    render_report_header(f, chunks[0], results);

    let chart_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_bar_chart(f, chart_row[0], charts);
    render_radar_chart(f, chart_row[1], &charts.radar);

    render_results(f, chunks[2], results, scroll);
    render_report_footer(f, chunks[3]);
}

fn render_report_header(f: &mut Frame, area: Rect, results: &ResultsPanel) {
    let generated = results
        .report()
        .map(|r| format!(" │ {}", r.generated_at.format("%Y-%m-%d %H:%M:%S")))
        .unwrap_or_default();

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Diagnostic Results", MedicalTheme::title()),
        Span::styled(generated, MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_bar_chart(f: &mut Frame, area: Rect, charts: &Charts) {
    let block = Block::default()
        .title(Span::styled(" Patient Health Metrics ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let bar = &charts.bar;
    let bars: Vec<Bar> = bar
        .labels
        .iter()
        .zip(&bar.values)
        .enumerate()
        .map(|(i, (label, value))| {
            let color = MedicalTheme::chart(bar.border.get(i).copied().unwrap_or(ChartColor::PATIENT));
            Bar::default()
                .value(bar_height(*value))
                .text_value(format_measurement(*value))
                .label(Line::from(short_label(label)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(MedicalTheme::BG_DARK).bg(color))
        })
        .collect();

    let n = u16::try_from(bars.len().max(1)).unwrap_or(u16::MAX);
    let gap = 1;
    let inner = area.width.saturating_sub(2);
    let width = (inner.saturating_sub(gap * n.saturating_sub(1)) / n).clamp(3, 12);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(width)
        .bar_gap(gap);

    f.render_widget(chart, area);
}

fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Abbreviate multi-word labels so they fit under a bar.
fn short_label(label: &str) -> String {
    let words: Vec<&str> = label.split_whitespace().collect();
    if words.len() > 1 {
        words
            .iter()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase()
    } else {
        label.to_string()
    }
}

/// Point on spoke `i` of `n` at distance `r` from the centre, first spoke up.
fn spoke_point(i: usize, n: usize, r: f64) -> (f64, f64) {
    let angle = FRAC_PI_2 - TAU * i as f64 / n as f64;
    (r * angle.cos(), r * angle.sin())
}

fn draw_polygon(ctx: &mut Context, values: &[f64], color: Color) {
    let n = values.len();
    for i in 0..n {
        let (x1, y1) = spoke_point(i, n, values[i].clamp(0.0, 1.0));
        let (x2, y2) = spoke_point((i + 1) % n, n, values[(i + 1) % n].clamp(0.0, 1.0));
        ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
    }
}

fn render_radar_chart(f: &mut Frame, area: Rect, radar: &RadarChart) {
    let block = Block::default()
        .title(Span::styled(" Health Metrics vs Normal Range ", MedicalTheme::subtitle()))
        .title_bottom(Line::from(vec![
            Span::styled(" ● Patient ", Style::default().fg(MedicalTheme::chart(ChartColor::PATIENT))),
            Span::styled("● Normal Range ", Style::default().fg(MedicalTheme::chart(ChartColor::NORMAL_RANGE))),
        ]))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let n = radar.labels.len();
    if n < 3 {
        let empty = Paragraph::new(Span::styled("Not enough metrics to plot", MedicalTheme::text_muted()))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let labels = radar.labels.clone();
    let patient = radar.patient.clone();
    let normal = radar.normal_range.clone();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-1.4, 1.4])
        .y_bounds([-1.25, 1.25])
        .paint(move |ctx| {
            for ring in [0.5, 1.0] {
                draw_polygon(ctx, &vec![ring; n], MedicalTheme::SECONDARY);
            }
            for i in 0..n {
                let (x, y) = spoke_point(i, n, 1.0);
                ctx.draw(&CanvasLine::new(0.0, 0.0, x, y, MedicalTheme::SECONDARY));
            }
            ctx.layer();

            draw_polygon(ctx, &normal, MedicalTheme::chart(ChartColor::NORMAL_RANGE));
            draw_polygon(ctx, &patient, MedicalTheme::chart(ChartColor::PATIENT));

            for (i, label) in labels.iter().enumerate() {
                let (x, y) = spoke_point(i, n, 1.12);
                let x = if x < -0.1 { x - 0.02 * label.len() as f64 } else { x };
                ctx.print(x, y, Line::styled(label.clone(), MedicalTheme::text_secondary()));
            }
        });

    f.render_widget(canvas, area);
}

fn render_results(f: &mut Frame, area: Rect, results: &ResultsPanel, scroll: u16) {
    let block = Block::default()
        .title(Span::styled(" Analysis ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let p = match results.report() {
        None => Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(PLACEHOLDER_MESSAGE, MedicalTheme::text_muted())),
        ])
        .alignment(Alignment::Center),
        Some(report) => {
            let mut lines = Vec::new();
            for section in &report.sections {
                lines.extend(section_lines(section));
                lines.push(Line::from(""));
            }
            Paragraph::new(lines).scroll((scroll, 0))
        }
    };

    f.render_widget(p.block(block).wrap(Wrap { trim: false }), area);
}

fn section_lines(section: &ResultSection) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {}", section.title()),
        MedicalTheme::subtitle(),
    ))];

    match section {
        ResultSection::PatientInfo(who) => {
            lines.push(field_line("ID", who.patient_id.clone()));
            lines.push(field_line("Age", format!("{} years", who.age)));
            lines.push(field_line("Gender", who.gender.clone()));
        }
        ResultSection::Conditions(conditions) if conditions.is_empty() => {
            lines.push(Line::from(Span::styled(
                format!("   {NO_CONDITIONS_MESSAGE}"),
                MedicalTheme::success(),
            )));
        }
        ResultSection::Conditions(conditions) => {
            lines.extend(conditions.iter().map(|c| {
                Line::from(vec![
                    Span::styled("   ⚠ ", MedicalTheme::warning()),
                    Span::styled(c.clone(), MedicalTheme::text()),
                ])
            }));
        }
        ResultSection::RiskAssessment(badge) => {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(badge.label(), MedicalTheme::risk_level(&badge.level)),
            ]));
        }
        ResultSection::ModelPrediction(prediction) => {
            lines.push(field_line("Predicted Risk", prediction.predicted_risk.clone()));
            lines.push(field_line(
                "Confidence",
                format!("{}%", format_measurement(prediction.confidence)),
            ));
        }
        ResultSection::Recommendations(items) => {
            lines.extend(items.iter().map(|r| {
                Line::from(vec![
                    Span::styled("   • ", MedicalTheme::info()),
                    Span::styled(r.clone(), MedicalTheme::text()),
                ])
            }));
        }
        ResultSection::Disclaimer => {
            lines.pop();
            lines.push(Line::from(vec![
                Span::styled(" Disclaimer: ", MedicalTheme::warning()),
                Span::styled(
                    crate::presentation::results::DISCLAIMER,
                    MedicalTheme::text_muted(),
                ),
            ]));
        }
    }

    lines
}

fn field_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("   {label}: "), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::text()),
    ])
}

fn render_report_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[↑↓] ", MedicalTheme::key_hint()),
        Span::styled("Scroll ", MedicalTheme::key_desc()),
        Span::styled("[E] ", MedicalTheme::key_hint()),
        Span::styled("Export HTML ", MedicalTheme::key_desc()),
        Span::styled("[F5] ", MedicalTheme::key_hint()),
        Span::styled("Clear ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back to Form", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("Systolic BP"), "SB");
        assert_eq!(short_label("Glucose"), "Glucose");
    }

    #[test]
    fn test_bar_height_clamps_negative_and_nan() {
        assert_eq!(bar_height(-3.0), 0);
        assert_eq!(bar_height(f64::NAN), 0);
        assert_eq!(bar_height(119.6), 120);
    }

    #[test]
    fn test_first_spoke_points_up() {
        let (x, y) = spoke_point(0, 5, 1.0);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }
}
