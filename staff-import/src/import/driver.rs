//! Sequential per-row import workflow

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use colored::*;
use log::debug;
use serde_json::json;

use super::linkage::{LinkageError, StaffId, await_staff_record};
use super::photo::{content_type, load_photo, storage_path};
use super::context::{FailurePolicy, ImportContext, STAFF_TABLE, TIMETABLE_TABLE};
use super::report::{AccountStatus, ImportReport, ImportStage, RowOutcome};
use crate::api::{Backend, NewUser, Query, StorageObject};
use crate::sheet::EmbeddedImage;
use crate::timetable::{ImportRow, build_week};

/// Why a row stopped
#[derive(Debug)]
struct RowFailure {
    stage: ImportStage,
    kind: FailureKind,
    error: anyhow::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    /// Bad data in the row itself
    Invalid,
    /// Staff row never appeared
    LinkageTimeout,
    /// A backend or I/O call failed
    Call,
}

impl RowFailure {
    fn call(stage: ImportStage, error: anyhow::Error) -> Self {
        Self {
            stage,
            kind: FailureKind::Call,
            error,
        }
    }

    /// Whether this failure ends the run under `policy`
    fn halts(&self, policy: FailurePolicy) -> bool {
        policy == FailurePolicy::FailFast && self.kind == FailureKind::Call
    }
}

/// Runs the import workflow against a [`Backend`]
pub struct Importer<B> {
    backend: B,
    ctx: ImportContext,
    http: reqwest::Client,
}

impl<B: Backend> Importer<B> {
    pub fn new(backend: B, ctx: ImportContext) -> Self {
        Self {
            backend,
            ctx,
            http: reqwest::Client::new(),
        }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Import every row in order.
    ///
    /// `images` maps one-based row numbers to pictures anchored on them.
    /// Failures are recorded in the report. Under [`FailurePolicy::FailFast`]
    /// the first backend failure also ends the run and the report marks the
    /// row it stopped at.
    pub async fn run(
        &self,
        rows: &[ImportRow],
        images: &HashMap<u32, EmbeddedImage>,
    ) -> ImportReport {
        let mut report = ImportReport::default();

        for row in rows {
            match self.import_row(row, images.get(&row.row_number)).await {
                Ok(outcome) => report.push(outcome),
                Err(failure) => {
                    let email = row.email.clone().unwrap_or_default();
                    println!(
                        "{} Row {} failed at {} stage: {:#}",
                        "✗".red(),
                        row.row_number,
                        failure.stage,
                        failure.error
                    );
                    let halts = failure.halts(self.ctx.failure_policy);
                    report.push(RowOutcome::Failed {
                        row_number: row.row_number,
                        email,
                        stage: failure.stage,
                        error: format!("{:#}", failure.error),
                    });
                    if halts {
                        report.stop_at(row.row_number);
                        break;
                    }
                }
            }
        }

        report
    }

    /// Process one row through identity, linkage, photo and timetable steps
    async fn import_row(
        &self,
        row: &ImportRow,
        image: Option<&EmbeddedImage>,
    ) -> Result<RowOutcome, RowFailure> {
        let Some((email, full_name)) = row.identity() else {
            let reason = format!("missing {}", row.missing_identity().join(" and "));
            println!("{} Skipping row {} ({})", "⏭".yellow(), row.row_number, reason);
            return Ok(RowOutcome::Skipped {
                row_number: row.row_number,
                reason,
            });
        };

        println!("\n{} Processing {}", "▶".cyan(), email.bold());

        // Built before any backend call so a malformed row has no side effects
        let week = build_week(row).map_err(|e| RowFailure {
            stage: ImportStage::Transform,
            kind: FailureKind::Invalid,
            error: e.into(),
        })?;

        let (account_id, account) = self
            .resolve_account(email, full_name)
            .await
            .map_err(|e| RowFailure::call(ImportStage::Identity, e))?;
        match account {
            AccountStatus::Created => println!("{} Auth user created", "✔".green()),
            AccountStatus::Existing => println!("{} Auth user exists", "ℹ".blue()),
        }

        let staff_id = await_staff_record(&self.backend, &account_id, &self.ctx.linkage)
            .await
            .map_err(|e| match e {
                LinkageError::TimedOut { .. } => RowFailure {
                    stage: ImportStage::Linkage,
                    kind: FailureKind::LinkageTimeout,
                    error: anyhow!(e),
                },
                LinkageError::Backend(err) => RowFailure::call(ImportStage::Linkage, err),
            })?;
        debug!("Row {}: staff id {}", row.row_number, staff_id);

        let photo_uploaded = self
            .upload_photo(row, image, &account_id, &staff_id)
            .await
            .map_err(|e| RowFailure::call(ImportStage::Photo, e))?;
        if photo_uploaded {
            println!("{} Photo uploaded", "✔".green());
        }

        self.backend
            .upsert(TIMETABLE_TABLE, &week.to_record(staff_id.as_json()), "staff_id")
            .await
            .map_err(|e| RowFailure::call(ImportStage::Timetable, e))?;
        println!(
            "{} Timetable saved ({} period(s))",
            "✔".green(),
            week.filled_slots()
        );

        Ok(RowOutcome::Imported {
            row_number: row.row_number,
            email: email.to_string(),
            account,
            photo_uploaded,
        })
    }

    /// Existing account id for `email`, or a freshly created confirmed account
    async fn resolve_account(&self, email: &str, full_name: &str) -> Result<(String, AccountStatus)> {
        if let Some(user) = self.backend.find_user_by_email(email).await? {
            return Ok((user.id, AccountStatus::Existing));
        }

        let user = self
            .backend
            .create_user(&NewUser::confirmed(email, full_name))
            .await?;
        Ok((user.id, AccountStatus::Created))
    }

    /// Upload the row's photo and point the staff row at it.
    /// Returns whether a photo was uploaded.
    async fn upload_photo(
        &self,
        row: &ImportRow,
        image: Option<&EmbeddedImage>,
        account_id: &str,
        staff_id: &StaffId,
    ) -> Result<bool> {
        let Some(photo) = load_photo(row, image, &self.ctx.photo_dir, &self.http).await? else {
            return Ok(false);
        };
        debug!("Row {}: uploading photo from {}", row.row_number, photo.source);

        let object = StorageObject {
            bucket: self.ctx.avatar_bucket.clone(),
            path: storage_path(account_id, &photo.extension),
            content_type: content_type(&photo.extension),
            bytes: photo.bytes,
            upsert: true,
        };
        let photo_url = self.backend.upload(&object).await?;

        let query = Query::new(STAFF_TABLE).eq("id", staff_id.filter_value());
        self.backend
            .update(&query, &json!({ "photo_url": photo_url }))
            .await?;
        Ok(true)
    }
}
