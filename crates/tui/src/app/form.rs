use api_types::record::{Record, RecordPatch, RecordType};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::Tz;
use engine::Amount;

use crate::provider::RecordDraft;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Amount,
    Kind,
    DueDate,
    Notes,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Amount,
        FormField::Kind,
        FormField::DueDate,
        FormField::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Amount => "Amount",
            Self::Kind => "Type",
            Self::DueDate => "Due date",
            Self::Notes => "Notes",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Title => Self::Amount,
            Self::Amount => Self::Kind,
            Self::Kind => Self::DueDate,
            Self::DueDate => Self::Notes,
            Self::Notes => Self::Title,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Add,
    Edit(Box<Record>),
}

/// Text fields of the add/edit record form.
#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    pub title: String,
    pub amount: String,
    pub kind: RecordType,
    pub due_date: String,
    pub notes: String,
    pub focus: FormField,
    pub message: Option<String>,
}

impl FormState {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            title: String::new(),
            amount: String::new(),
            kind: RecordType::Expense,
            due_date: String::new(),
            notes: String::new(),
            focus: FormField::Title,
            message: None,
        }
    }

    /// Form prefilled with `record`; the due date is shown in `tz`.
    pub fn edit(record: &Record, tz: Tz) -> Self {
        Self {
            mode: FormMode::Edit(Box::new(record.clone())),
            title: record.title.clone(),
            amount: record.amount.to_string(),
            kind: record.kind,
            due_date: format_date(record.due_date, tz),
            notes: record.notes.clone().unwrap_or_default(),
            focus: FormField::Title,
            message: None,
        }
    }

    pub fn title_label(&self) -> &'static str {
        match self.mode {
            FormMode::Add => " new record ",
            FormMode::Edit(_) => " edit record ",
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Amount => &self.amount,
            FormField::Kind => self.kind.as_str(),
            FormField::DueDate => &self.due_date,
            FormField::Notes => &self.notes,
        }
    }

    pub fn advance_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Types `ch` into the focused field. On the type field any key toggles.
    pub fn input(&mut self, ch: char) {
        match self.focus {
            FormField::Title => self.title.push(ch),
            FormField::Amount => self.amount.push(ch),
            FormField::Kind => self.kind = self.kind.toggled(),
            FormField::DueDate => self.due_date.push(ch),
            FormField::Notes => self.notes.push(ch),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Amount => {
                self.amount.pop();
            }
            FormField::Kind => {}
            FormField::DueDate => {
                self.due_date.pop();
            }
            FormField::Notes => {
                self.notes.pop();
            }
        }
    }

    pub fn to_draft(&self, tz: Tz) -> Result<RecordDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_string());
        }
        let amount = parse_amount(&self.amount)?;

        Ok(RecordDraft {
            title: title.to_string(),
            amount,
            kind: self.kind,
            due_date: parse_date(&self.due_date, tz)?,
            notes: non_empty(&self.notes),
        })
    }

    /// Patch holding only the fields that differ from `original`.
    pub fn to_patch(&self, original: &Record, tz: Tz) -> Result<RecordPatch, String> {
        let draft = self.to_draft(tz)?;
        let mut patch = RecordPatch::default();

        if draft.title != original.title.trim() {
            patch.title = Some(draft.title);
        }
        if draft.amount != original.amount {
            patch.amount = Some(draft.amount);
        }
        if draft.kind != original.kind {
            patch.kind = Some(draft.kind);
        }
        // Compared as text: the stored due date may carry a time of day.
        if self.due_date.trim() != format_date(original.due_date, tz) {
            patch.due_date = Some(draft.due_date);
        }
        if draft.notes != original.notes.as_deref().and_then(non_empty) {
            patch.notes = Some(draft.notes);
        }

        Ok(patch)
    }
}

fn parse_amount(input: &str) -> Result<i64, String> {
    input
        .parse::<Amount>()
        .map(Amount::units)
        .map_err(|err| err.to_string())
}

fn parse_date(input: &str, tz: Tz) -> Result<Option<DateTime<FixedOffset>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let invalid = || format!("Due date must be {DATE_FORMAT}, got \"{input}\".");
    let date = NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    let local = tz.from_local_datetime(&midnight).earliest().ok_or_else(invalid)?;

    Ok(Some(local.fixed_offset()))
}

fn format_date(date: Option<DateTime<FixedOffset>>, tz: Tz) -> String {
    date.map(|d| d.with_timezone(&tz).format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn non_empty(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: Tz = chrono_tz::Asia::Kolkata;

    fn record() -> Record {
        Record {
            id: "r1".to_string(),
            title: "Rent".to_string(),
            amount: 15_000,
            kind: RecordType::Expense,
            created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            due_date: Some("2026-02-01T10:00:00+05:30".parse().unwrap()),
            notes: Some("flat".to_string()),
        }
    }

    fn type_text(form: &mut FormState, text: &str) {
        for ch in text.chars() {
            form.input(ch);
        }
    }

    #[test]
    fn add_form_builds_a_draft() {
        let mut form = FormState::add();
        type_text(&mut form, "Salary");
        form.advance_focus();
        type_text(&mut form, "60,000");
        form.advance_focus();
        form.input(' ');
        form.advance_focus();
        type_text(&mut form, "2026-03-01");

        let draft = form.to_draft(TZ).unwrap();
        assert_eq!(draft.title, "Salary");
        assert_eq!(draft.amount, 60_000);
        assert_eq!(draft.kind, RecordType::Income);
        assert_eq!(
            draft.due_date,
            Some("2026-03-01T00:00:00+05:30".parse().unwrap())
        );
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn draft_requires_title_and_valid_amount() {
        let mut form = FormState::add();
        form.amount = "100".to_string();
        assert!(form.to_draft(TZ).is_err());

        form.title = "Fuel".to_string();
        form.amount = "-3".to_string();
        assert!(form.to_draft(TZ).is_err());

        form.amount = "3".to_string();
        form.due_date = "01/03/2026".to_string();
        assert!(form.to_draft(TZ).is_err());
    }

    #[test]
    fn unchanged_edit_form_yields_empty_patch() {
        let original = record();
        let form = FormState::edit(&original, TZ);
        assert_eq!(form.due_date, "2026-02-01");

        let patch = form.to_patch(&original, TZ).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_holds_only_changed_fields() {
        let original = record();
        let mut form = FormState::edit(&original, TZ);
        form.amount = "16000".to_string();
        form.notes.clear();

        let patch = form.to_patch(&original, TZ).unwrap();
        assert_eq!(
            patch,
            RecordPatch {
                amount: Some(16_000),
                notes: Some(None),
                ..RecordPatch::default()
            }
        );
    }

    #[test]
    fn padded_stored_values_do_not_count_as_changes() {
        let original = Record {
            title: "  Rent ".to_string(),
            notes: Some(" flat\n".to_string()),
            ..record()
        };
        let form = FormState::edit(&original, TZ);

        let patch = form.to_patch(&original, TZ).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn whitespace_only_notes_compare_as_cleared() {
        let original = Record {
            notes: Some("   ".to_string()),
            ..record()
        };
        let form = FormState::edit(&original, TZ);

        assert!(form.to_patch(&original, TZ).unwrap().is_empty());
    }

    #[test]
    fn backspace_on_type_field_is_a_no_op() {
        let mut form = FormState::add();
        form.focus = FormField::Kind;
        form.backspace();
        assert_eq!(form.kind, RecordType::Expense);
    }
}
