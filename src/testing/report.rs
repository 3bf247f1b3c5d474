//! Step outcomes and the end-of-run summary

use colored::Colorize;

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed(String),
    /// The step ran but an expectation did not hold; not a failure by default
    Warned(String),
    Failed(String),
    /// A prerequisite (token, id) was missing so the call was never made
    Skipped(String),
}

impl Outcome {
    pub fn detail(&self) -> &str {
        match self {
            Outcome::Passed(d) | Outcome::Warned(d) | Outcome::Failed(d) | Outcome::Skipped(d) => d,
        }
    }
}

/// A recorded step
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub name: &'static str,
    pub outcome: Outcome,
}

/// Ordered ledger of step outcomes, echoed to the console as they arrive
#[derive(Debug, Default)]
pub struct Report {
    steps: Vec<StepRecord>,
    quiet: bool,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report that records without printing
    pub fn quiet() -> Self {
        Self {
            steps: Vec::new(),
            quiet: true,
        }
    }

    pub fn pass(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, Outcome::Passed(detail.into()));
    }

    pub fn warn(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, Outcome::Warned(detail.into()));
    }

    pub fn fail(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, Outcome::Failed(detail.into()));
    }

    pub fn skip(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, Outcome::Skipped(detail.into()));
    }

    fn record(&mut self, name: &'static str, outcome: Outcome) {
        if !self.quiet {
            println!("{}", format_line(name, &outcome));
        }
        self.steps.push(StepRecord { name, outcome });
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Last outcome recorded under `name`
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.name == name)
            .map(|s| &s.outcome)
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn warnings(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Warned(_)))
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.steps.iter().filter(|s| pred(&s.outcome)).count()
    }
}

fn format_line(name: &str, outcome: &Outcome) -> String {
    let (mark, detail) = match outcome {
        Outcome::Passed(d) => ("✓".green(), d.normal()),
        Outcome::Warned(d) => ("⚠".yellow(), d.yellow()),
        Outcome::Failed(d) => ("✗".red(), d.red()),
        Outcome::Skipped(d) => ("-".dimmed(), d.dimmed()),
    };
    if outcome.detail().is_empty() {
        format!("  {} {}", mark, name)
    } else {
        format!("  {} {}: {}", mark, name, detail)
    }
}

/// Result of a full workflow run that got past every fatal step
#[derive(Debug)]
pub struct RunSummary {
    pub report: Report,
    pub teacher_id: Option<i64>,
    pub course_id: i64,
    pub assignment_id: Option<i64>,
    pub crud_passed: bool,
}

impl RunSummary {
    /// The assignment workflow works end to end
    pub fn succeeded(&self) -> bool {
        self.assignment_id.is_some() && self.crud_passed
    }

    /// Nothing failed or warned anywhere in the run
    pub fn is_clean(&self) -> bool {
        self.succeeded() && self.report.failures() == 0 && self.report.warnings() == 0
    }

    pub fn print(&self) {
        println!("\n{}", "=".repeat(50));

        if self.succeeded() {
            println!(
                "{} {}",
                "✓".green().bold(),
                "Assignment management workflow passed".green().bold()
            );
        } else {
            println!(
                "{} {}",
                "✗".red().bold(),
                "Some assignment operations did not work as expected"
                    .red()
                    .bold()
            );
        }

        println!("  Assignment ID: {}", id_label(self.assignment_id));
        println!("  Course ID:     {}", self.course_id);
        println!("  Teacher ID:    {}", id_label(self.teacher_id));
        println!(
            "  Steps: {} passed, {} warned, {} failed, {} skipped",
            self.report.passed().to_string().green(),
            self.report.warnings().to_string().yellow(),
            self.report.failures().to_string().red(),
            self.report.skipped().to_string().dimmed()
        );

        let problems: Vec<_> = self
            .report
            .steps()
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Failed(_) | Outcome::Warned(_)))
            .collect();
        if !problems.is_empty() {
            println!("\n{}", "Problems:".cyan());
            for step in problems {
                println!("{}", format_line(step.name, &step.outcome));
            }
        }
        println!();
    }
}

fn id_label(id: Option<i64>) -> String {
    id.map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(report: Report, assignment_id: Option<i64>, crud_passed: bool) -> RunSummary {
        RunSummary {
            report,
            teacher_id: Some(2),
            course_id: 1,
            assignment_id,
            crud_passed,
        }
    }

    #[test]
    fn test_counts_by_outcome() {
        let mut report = Report::quiet();
        report.pass("health check", "HTTP 200");
        report.warn("verify count", "5 found, expected 4");
        report.fail("approve teacher", "HTTP 400");
        report.skip("assign teacher", "no teacher id");
        report.pass("teacher login", "");

        assert_eq!(report.passed(), 2);
        assert_eq!(report.warnings(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.steps().len(), 5);
    }

    #[test]
    fn test_outcome_returns_latest_record() {
        let mut report = Report::quiet();
        report.fail("admin login", "HTTP 401");
        report.pass("admin login", "after signup");

        assert_eq!(
            report.outcome("admin login"),
            Some(&Outcome::Passed("after signup".to_string()))
        );
        assert!(report.outcome("missing").is_none());
    }

    #[test]
    fn test_success_requires_assignment_and_crud() {
        assert!(summary(Report::quiet(), Some(3), true).succeeded());
        assert!(!summary(Report::quiet(), None, true).succeeded());
        assert!(!summary(Report::quiet(), Some(3), false).succeeded());
    }

    #[test]
    fn test_warnings_make_a_run_unclean() {
        let mut report = Report::quiet();
        report.warn("verify count", "mismatch");
        let run = summary(report, Some(3), true);

        assert!(run.succeeded());
        assert!(!run.is_clean());
    }

    #[test]
    fn test_format_line_omits_empty_detail() {
        colored::control::set_override(false);
        assert_eq!(format_line("teacher login", &Outcome::Passed(String::new())), "  ✓ teacher login");
        assert_eq!(
            format_line("approve teacher", &Outcome::Failed("HTTP 400".into())),
            "  ✗ approve teacher: HTTP 400"
        );
    }
}
