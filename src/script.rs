//! Session scripts: booking actions read from csv, breakdown written as csv.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::BookingAction;
use crate::confirmation::Breakdown;
use crate::model::{CustomerForm, TicketTypeId, UnknownTicketType};

/// Errors that can occur when reading a script or writing the breakdown
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot open script: {0}")]
    Open(csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing ticket")]
    MissingTicket { line: usize, action: String },

    #[error("line {line}: {source}")]
    UnknownTicket {
        line: usize,
        source: UnknownTicketType,
    },

    #[error("line {line}: set missing quantity")]
    MissingQuantity { line: usize },

    #[error("failed to write breakdown: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush breakdown: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActionRow {
    action: String,
    ticket: Option<String>,
    quantity: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Serialize)]
struct BreakdownRow<'a> {
    item: &'a str,
    quantity: Option<u32>,
    amount: String,
}

/// Read booking actions from a csv file
pub fn read_actions(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<BookingAction, ScriptError>>, ScriptError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(ScriptError::Open)?;

    Ok(reader
        .into_deserialize::<ActionRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| ScriptError::Parse { line, source })?;
            row.into_action(line)
        }))
}

impl ActionRow {
    fn into_action(self, line: usize) -> Result<BookingAction, ScriptError> {
        match self.action.as_str() {
            "increment" => Ok(BookingAction::Increment(self.ticket(line)?)),
            "decrement" => Ok(BookingAction::Decrement(self.ticket(line)?)),
            "set" => {
                let id = self.ticket(line)?;
                let quantity = self
                    .quantity
                    .ok_or(ScriptError::MissingQuantity { line })?;
                Ok(BookingAction::TypeQuantity(id, quantity))
            }
            "continue" => Ok(BookingAction::ContinueToDetails),
            "back" => Ok(BookingAction::Back),
            "submit" => Ok(BookingAction::Submit(CustomerForm {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                ..CustomerForm::default()
            })),
            other => Err(ScriptError::UnrecognizedAction {
                line,
                action: other.to_string(),
            }),
        }
    }

    fn ticket(&self, line: usize) -> Result<TicketTypeId, ScriptError> {
        let ticket = self
            .ticket
            .as_deref()
            .ok_or_else(|| ScriptError::MissingTicket {
                line,
                action: self.action.clone(),
            })?;
        ticket
            .parse()
            .map_err(|source| ScriptError::UnknownTicket { line, source })
    }
}

/// Write the order breakdown in csv format
pub fn write_breakdown(writer: impl io::Write, breakdown: &Breakdown) -> Result<(), ScriptError> {
    let mut writer = csv::Writer::from_writer(writer);

    for line in &breakdown.lines {
        writer.serialize(BreakdownRow {
            item: line.name,
            quantity: Some(line.quantity),
            amount: line.amount.to_string(),
        })?;
    }
    for (item, amount) in [
        ("Service Fee", breakdown.totals.fee),
        ("Total", breakdown.totals.total),
    ] {
        writer.serialize(BreakdownRow {
            item,
            quantity: None,
            amount: amount.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::confirmation::ConfirmationView;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "action,ticket,quantity,first_name,last_name,email,phone\n";

    fn write_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file
    }

    fn read(rows: &str) -> Vec<Result<BookingAction, ScriptError>> {
        let file = write_csv(rows);
        read_actions(file.path()).unwrap().collect()
    }

    #[test]
    fn read_selection_actions() {
        let results = read("increment,vip,,,,,\nset,general,3,,,,\ndecrement,vip,,,,,\n");
        let actions: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            actions,
            [
                BookingAction::Increment(TicketTypeId::Vip),
                BookingAction::TypeQuantity(TicketTypeId::General, "3".into()),
                BookingAction::Decrement(TicketTypeId::Vip),
            ]
        );
    }

    #[test]
    fn read_submit_with_whitespace() {
        let results = read("submit, , , Jane , Doe, jane@example.com, +1 555 0100\n");
        let action = results.into_iter().next().unwrap().unwrap();
        match action {
            BookingAction::Submit(form) => {
                assert_eq!(form.first_name, "Jane");
                assert_eq!(form.email, "jane@example.com");
                assert_eq!(form.phone, "+1 555 0100");
                assert_eq!(form.date_of_birth, None);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn read_navigation() {
        let results = read("continue,,,,,,\nback,,,,,,\n");
        assert!(matches!(results[0], Ok(BookingAction::ContinueToDetails)));
        assert!(matches!(results[1], Ok(BookingAction::Back)));
    }

    #[test]
    fn read_returns_error_for_unknown_action() {
        let results = read("refund,vip,,,,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, ScriptError::UnrecognizedAction { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_unknown_ticket() {
        let results = read("increment,vip,,,,,\nincrement,balcony,,,,,\n");
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(err, ScriptError::UnknownTicket { line: 3, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_fields() {
        let results = read("increment,,,,,,\nset,vip,,,,,\n");
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            ScriptError::MissingTicket { line: 2, .. }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            ScriptError::MissingQuantity { line: 3 }
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_actions(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(ScriptError::Open(_))));
    }

    #[test]
    fn write_demo_breakdown() {
        let view = ConfirmationView::demo();
        let breakdown = view.breakdown(&Catalog::builtin());
        let mut out = Vec::new();
        write_breakdown(&mut out, &breakdown).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "item,quantity,amount\nGeneral Admission,2,250.00\nService Fee,,12.50\nTotal,,262.50\n"
        );
    }
}
