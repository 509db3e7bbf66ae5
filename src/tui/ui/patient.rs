//! Patient data entry form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{FieldId, FieldKind, PatientForm, ValidationError};
use crate::tui::styles::MedicalTheme;

/// Form state: the typed buffers plus cursor and inline errors.
#[derive(Debug, Default)]
pub struct PatientFormState {
    pub form: PatientForm,
    pub selected_field: usize,
    pub error_message: Option<String>,
    /// Fields flagged by the last failed submission
    pub flagged: Vec<FieldId>,
}

impl PatientFormState {
    #[must_use]
    pub fn selected(&self) -> FieldId {
        FieldId::ALL[self.selected_field]
    }

    pub fn select(&mut self, field: FieldId) {
        if let Some(idx) = FieldId::ALL.iter().position(|f| *f == field) {
            self.selected_field = idx;
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % FieldId::ALL.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = FieldId::ALL.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Type into the current field. Choice fields cycle on Space.
    pub fn input_char(&mut self, c: char) {
        let field = self.selected();
        let changed = if field.kind() == FieldKind::Choice {
            if c == ' ' {
                self.form.cycle_choice(field, true);
                true
            } else {
                false
            }
        } else {
            self.form.push_char(field, c)
        };

        if changed {
            self.clear_feedback(field);
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let field = self.selected();
        if field.kind() == FieldKind::Choice {
            self.form.cycle_choice(field, forward);
            self.clear_feedback(field);
        }
    }

    pub fn delete_char(&mut self) {
        let field = self.selected();
        self.form.pop_char(field);
        self.clear_feedback(field);
    }

    pub fn clear_field(&mut self) {
        let field = self.selected();
        self.form.clear_field(field);
        self.clear_feedback(field);
    }

    /// Show validation failures and jump to the first offending field.
    pub fn show_invalid(&mut self, errors: &[ValidationError]) {
        self.flagged = errors.iter().map(ValidationError::field).collect();
        self.error_message = Some(
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        );
        if let Some(first) = self.flagged.first().copied() {
            self.select(first);
        }
    }

    pub fn show_missing(&mut self, fields: &[FieldId]) {
        self.flagged = fields.to_vec();
        self.error_message = None;
        if let Some(first) = fields.first().copied() {
            self.select(first);
        }
    }

    /// Replace every buffer, e.g. after a CSV import or a sample.
    pub fn replace(&mut self, form: PatientForm) {
        self.form = form;
        self.selected_field = 0;
        self.error_message = None;
        self.flagged.clear();
    }

    /// Wipe all buffers.
    pub fn reset(&mut self) {
        self.form.clear();
        self.selected_field = 0;
        self.error_message = None;
        self.flagged.clear();
    }

    fn clear_feedback(&mut self, field: FieldId) {
        self.error_message = None;
        self.flagged.retain(|f| *f != field);
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Data Entry", MedicalTheme::title()),
        Span::styled(
            " │ Demographics and lab results",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = FieldId::ALL.len().div_ceil(2);

    render_field_column(f, columns[0], &FieldId::ALL[..mid], 0, state);
    render_field_column(f, columns[1], &FieldId::ALL[mid..], mid, state);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FieldId],
    offset: usize,
    state: &PatientFormState,
) {
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected_field;
        let is_flagged = state.flagged.contains(field);

        let border_style = if is_flagged {
            MedicalTheme::danger()
        } else if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };

        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let label = if FieldId::REQUIRED.contains(field) {
            format!(" {} * ", field.label())
        } else {
            format!(" {} ", field.label())
        };

        let block = Block::default()
            .title(Span::styled(label, title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = state.form.get(*field);
        let value_display = if value.is_empty() {
            Span::styled(field.hint(), MedicalTheme::text_muted())
        } else {
            Span::styled(value, MedicalTheme::text())
        };

        let mut spans = vec![Span::raw(" "), value_display];
        if is_selected {
            if field.kind() == FieldKind::Choice {
                spans.push(Span::styled("  ◂ ▸", MedicalTheme::cursor()));
            } else {
                spans.push(Span::styled("▌", MedicalTheme::cursor()));
            }
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Analyze ", MedicalTheme::key_desc()),
            Span::styled("[F2] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[F3] ", MedicalTheme::key_hint()),
            Span::styled("Upload CSV ", MedicalTheme::key_desc()),
            Span::styled("[F4] ", MedicalTheme::key_hint()),
            Span::styled("Results ", MedicalTheme::key_desc()),
            Span::styled("[F5] ", MedicalTheme::key_hint()),
            Span::styled("Clear ", MedicalTheme::key_desc()),
            Span::styled("[^Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

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
    use crate::domain::validation::LAB_RANGES;

    #[test]
    fn test_navigation_wraps() {
        let mut state = PatientFormState::default();
        state.prev_field();
        assert_eq!(state.selected(), FieldId::Bmi);
        state.next_field();
        assert_eq!(state.selected(), FieldId::PatientId);
    }

    #[test]
    fn test_space_cycles_gender_only() {
        let mut state = PatientFormState::default();
        state.select(FieldId::Gender);
        state.input_char('x');
        assert_eq!(state.form.get(FieldId::Gender), "");
        state.input_char(' ');
        assert_eq!(state.form.get(FieldId::Gender), "Male");
        state.cycle_choice(true);
        assert_eq!(state.form.get(FieldId::Gender), "Female");
    }

    #[test]
    fn test_invalid_flags_and_focuses_field() {
        let mut state = PatientFormState::default();
        let err = ValidationError::OutOfRange {
            field: FieldId::Cholesterol,
            value: 1200.0,
            min: LAB_RANGES[3].min,
            max: LAB_RANGES[3].max,
        };
        state.show_invalid(&[err]);

        assert_eq!(state.selected(), FieldId::Cholesterol);
        assert!(state.flagged.contains(&FieldId::Cholesterol));
        assert!(state.error_message.is_some());

        state.input_char('5');
        assert!(state.flagged.is_empty());
        assert!(state.error_message.is_none());
    }
}
