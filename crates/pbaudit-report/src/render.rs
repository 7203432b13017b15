//! Fixed-width text rendering of an [`AuditReport`]

use crate::stats::{percent, AuditReport};

const WIDTH: usize = 60;
const NOT_AVAILABLE: &str = "N/A";

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(WIDTH));
}

impl AuditReport {
    /// Renders the report as plain text, lines joined by `\n`
    pub fn render(&self) -> String {
        let mut lines = vec![
            "=".repeat(WIDTH),
            "AUDIT RECORDS REPORT".to_string(),
            "=".repeat(WIDTH),
            String::new(),
        ];

        lines.push(format!("Total Accounts: {}", self.total_accounts));
        lines.push(format!("Total Audits: {}", self.total_audits));
        lines.push(format!(
            "Audits Missing Scores: {} ({:.1}% of all audits)",
            self.missing_scores,
            self.missing_percent()
        ));
        lines.push(String::new());

        section(&mut lines, "AUDITS BY YEAR");
        for entry in &self.audits_by_year {
            lines.push(format!(
                "{}: {} audits ({:.1}%)",
                entry.year,
                entry.audits,
                percent(entry.audits, self.total_audits)
            ));
        }
        lines.push(String::new());

        section(&mut lines, "TOP 10 MOST FREQUENTLY VISITED FLOORS");
        for entry in &self.top_floors {
            lines.push(format!(
                "Floor {}: {} visits ({:.1}%)",
                entry.floor,
                entry.visits,
                percent(entry.visits, self.total_audits)
            ));
        }
        lines.push(String::new());

        section(&mut lines, "ACCOUNT SUMMARY");
        for account in &self.accounts {
            let date = |d: Option<chrono::NaiveDate>| {
                d.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            lines.push(format!("Account: {}", account.id));
            lines.push(format!("  Audit Count: {}", account.audit_count));
            lines.push(format!("  First Audit: {}", date(account.first_audit)));
            lines.push(format!("  Last Audit: {}", date(account.last_audit)));
            lines.push(format!(
                "  Missing Scores: {} ({:.1}%)",
                account.missing_scores,
                account.missing_percent()
            ));
            lines.push(format!(
                "  Avg. Days Between Audits: {}",
                account
                    .avg_days_between
                    .map(|avg| format!("{:.1}", avg))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            ));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
