//! Per-row outcomes and the end-of-run summary

use colored::*;

/// Step of the per-row workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    /// Building the week grid from the row
    Transform,
    /// Account lookup or creation
    Identity,
    /// Waiting for the staff row
    Linkage,
    /// Photo load, upload or `photo_url` update
    Photo,
    /// Timetable upsert
    Timetable,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportStage::Transform => write!(f, "transform"),
            ImportStage::Identity => write!(f, "identity"),
            ImportStage::Linkage => write!(f, "linkage"),
            ImportStage::Photo => write!(f, "photo"),
            ImportStage::Timetable => write!(f, "timetable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Created,
    Existing,
}

/// Result of processing one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported {
        row_number: u32,
        email: String,
        account: AccountStatus,
        photo_uploaded: bool,
    },
    Skipped {
        row_number: u32,
        reason: String,
    },
    Failed {
        row_number: u32,
        email: String,
        stage: ImportStage,
        error: String,
    },
}

impl RowOutcome {
    pub fn row_number(&self) -> u32 {
        match self {
            RowOutcome::Imported { row_number, .. }
            | RowOutcome::Skipped { row_number, .. }
            | RowOutcome::Failed { row_number, .. } => *row_number,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RowOutcome::Failed { .. })
    }
}

/// Outcomes of a whole run, in row order
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    outcomes: Vec<RowOutcome>,
    /// Row at which a fail-fast run ended
    stopped_at: Option<u32>,
}

impl ImportReport {
    pub fn push(&mut self, outcome: RowOutcome) {
        self.outcomes.push(outcome);
    }

    /// Record that the run ended early at `row_number`
    pub fn stop_at(&mut self, row_number: u32) {
        self.stopped_at = Some(row_number);
    }

    pub fn stopped_at(&self) -> Option<u32> {
        self.stopped_at
    }

    #[cfg(test)]
    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Imported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(RowOutcome::is_failure)
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    /// Plain-text outcome table, one line per row
    pub fn table_lines(&self) -> Vec<String> {
        let email_width = self
            .outcomes
            .iter()
            .map(|o| match o {
                RowOutcome::Imported { email, .. } | RowOutcome::Failed { email, .. } => {
                    email.len()
                }
                RowOutcome::Skipped { .. } => 1,
            })
            .max()
            .unwrap_or(0)
            .max("Email".len());

        let mut lines = vec![format!(
            "{:>5}  {:<width$}  {:<8}  {}",
            "Row",
            "Email",
            "Result",
            "Detail",
            width = email_width
        )];

        for outcome in &self.outcomes {
            let (email, result, detail) = match outcome {
                RowOutcome::Imported {
                    email,
                    account,
                    photo_uploaded,
                    ..
                } => {
                    let mut detail = match account {
                        AccountStatus::Created => "account created".to_string(),
                        AccountStatus::Existing => "account existed".to_string(),
                    };
                    if *photo_uploaded {
                        detail.push_str(", photo uploaded");
                    }
                    (email.as_str(), "imported", detail)
                }
                RowOutcome::Skipped { reason, .. } => ("-", "skipped", reason.clone()),
                RowOutcome::Failed {
                    email,
                    stage,
                    error,
                    ..
                } => (email.as_str(), "failed", format!("{}: {}", stage, error)),
            };
            lines.push(format!(
                "{:>5}  {:<width$}  {:<8}  {}",
                outcome.row_number(),
                email,
                result,
                detail,
                width = email_width
            ));
        }
        lines
    }

    /// Print the outcome table, totals and the final banner
    pub fn print_summary(&self) {
        println!();
        for (i, line) in self.table_lines().iter().enumerate() {
            if i == 0 {
                println!("{}", line.bold());
                continue;
            }
            match &self.outcomes[i - 1] {
                RowOutcome::Imported { .. } => println!("{}", line),
                RowOutcome::Skipped { .. } => println!("{}", line.dimmed()),
                RowOutcome::Failed { .. } => println!("{}", line.red()),
            }
        }

        println!();
        println!(
            "{} imported, {} skipped, {} failed",
            self.imported().to_string().green(),
            self.skipped().to_string().yellow(),
            self.failed().to_string().red()
        );

        if let Some(row_number) = self.stopped_at {
            println!(
                "\n{}",
                format!("Import stopped at row {} (--fail-fast)", row_number)
                    .bright_red()
                    .bold()
            );
        } else if self.failed() == 0 {
            println!("\n{}", "Import completed successfully".bright_green().bold());
        } else {
            println!(
                "\n{}",
                format!("Import completed with {} failed row(s)", self.failed())
                    .bright_red()
                    .bold()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ImportReport {
        let mut report = ImportReport::default();
        report.push(RowOutcome::Imported {
            row_number: 2,
            email: "a@x.com".into(),
            account: AccountStatus::Created,
            photo_uploaded: true,
        });
        report.push(RowOutcome::Skipped {
            row_number: 3,
            reason: "missing Mail id".into(),
        });
        report.push(RowOutcome::Failed {
            row_number: 4,
            email: "c@x.com".into(),
            stage: ImportStage::Linkage,
            error: "staff row did not appear after 10 lookup(s)".into(),
        });
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_stop_is_recorded() {
        let mut report = sample();
        assert_eq!(report.stopped_at(), None);
        report.stop_at(4);
        assert_eq!(report.stopped_at(), Some(4));
        assert_eq!(report.outcomes().len(), 3);
    }

    #[test]
    fn test_table_lines() {
        let lines = sample().table_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("  Row  Email"));
        assert!(lines[1].contains("account created, photo uploaded"));
        assert!(lines[2].contains("skipped"));
        assert!(lines[3].contains("linkage: staff row did not appear"));
    }
}
