//! Bulk import from a JSON file.
//!
//! The file holds an array of contact objects. Rows are checked locally
//! first, the remainder goes to the bulk endpoint in one request, and local
//! and server rejections are reported together by 1-based row number.

use crate::client::ContactsClient;
use crate::error::ClientError;
use crate::session::Session;
use crate::types::{Contact, ContactDraft};
use contacts_store::phone::is_local_number;
use serde_json::Value;
use std::path::Path;
use tracing::{info, instrument};

/// One rejected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based row in the import file.
    pub row: usize,
    pub message: String,
}

/// Result of one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Rows sent to the server after local checks.
    pub submitted: usize,
    pub created: Vec<Contact>,
    /// Sorted by row.
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub fn rows(&self) -> usize {
        self.created.len() + self.errors.len()
    }
}

/// Why a row cannot be imported, checked before anything is sent.
pub fn check_row(draft: &ContactDraft) -> Option<String> {
    let missing = [
        ("firstName", &draft.first_name),
        ("lastName", &draft.last_name),
        ("phone", &draft.phone),
        ("email", &draft.email),
    ]
    .into_iter()
    .find(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| format!("Missing {}", field));

    missing.or_else(|| {
        (!is_local_number(&draft.phone)).then(|| {
            format!(
                "Invalid phone number for {} {}: {}",
                draft.first_name.trim(),
                draft.last_name.trim(),
                draft.phone
            )
        })
    })
}

impl ContactsClient {
    /// Read, check and submit an import file.
    #[instrument(skip(self, session, path), fields(path = %path.as_ref().display()))]
    pub async fn import_contacts_file(
        &self,
        session: &Session,
        path: impl AsRef<Path>,
    ) -> Result<ImportReport, ClientError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ClientError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let rows: Vec<Value> = serde_json::from_str(&text)?;
        let rows = rows
            .into_iter()
            .map(|row| serde_json::from_value::<ContactDraft>(row).map_err(|e| e.to_string()))
            .collect();
        self.import_rows(session, rows).await
    }

    /// Check and submit rows already in memory.
    pub async fn import_contacts(
        &self,
        session: &Session,
        rows: Vec<ContactDraft>,
    ) -> Result<ImportReport, ClientError> {
        self.import_rows(session, rows.into_iter().map(Ok).collect())
            .await
    }

    async fn import_rows(
        &self,
        session: &Session,
        rows: Vec<Result<ContactDraft, String>>,
    ) -> Result<ImportReport, ClientError> {
        let mut report = ImportReport::default();
        let mut accepted = Vec::new();
        let mut accepted_rows = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let checked = row
                .map_err(|reason| format!("Invalid contact data: {}", reason))
                .and_then(|draft| match check_row(&draft) {
                    Some(message) => Err(message),
                    None => Ok(draft),
                });

            match checked {
                Err(message) => report.errors.push(RowError {
                    row: index + 1,
                    message,
                }),
                Ok(draft) => {
                    accepted_rows.push(index + 1);
                    accepted.push(draft);
                }
            }
        }

        report.submitted = accepted.len();
        if !accepted.is_empty() {
            let result = self.create_contacts_bulk(session, &accepted).await?;
            report.created = result.valid_contacts;
            report
                .errors
                .extend(result.errors.into_iter().map(|e| RowError {
                    row: accepted_rows.get(e.index).copied().unwrap_or(0),
                    message: e.message,
                }));
        }

        report.errors.sort_by_key(|e| e.row);

        info!(
            submitted = report.submitted,
            created = report.created.len(),
            rejected = report.errors.len(),
            "Import finished"
        );
        Ok(report)
    }
}
