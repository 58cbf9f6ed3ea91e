//! Narrative insights from an external generator.
//!
//! The generator receives the finished report as JSON and answers with
//! short sentences. It runs after the report is built, so a failing
//! generator never affects `report.json`.

use log::{debug, info};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{Error, Result};
use crate::report::Report;

/// Anything that can turn a report into insight sentences.
pub trait InsightSource {
    fn generate(&self, report: &Report) -> Result<Vec<String>>;
}

/// Runs a command, writes the report JSON to its stdin and reads one insight
/// per non-empty stdout line.
#[derive(Debug, Clone)]
pub struct CommandInsights {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandInsights {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` when empty.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl InsightSource for CommandInsights {
    fn generate(&self, report: &Report) -> Result<Vec<String>> {
        let payload = serde_json::to_vec(report).map_err(|e| Error::Insights(e.to_string()))?;

        debug!("[Insights] Running {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Insights(format!("cannot start `{}`: {}", self.program, e)))?;

        // Written from a separate thread while stdout drains
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Insights(format!("`{}` failed: {}", self.program, e)))?;
        match writer.join() {
            Ok(Ok(())) => {}
            // A child that ignores stdin closes the pipe early
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => debug!("[Insights] Writing report to `{}` failed: {}", self.program, e),
            Err(_) => debug!("[Insights] Report writer for `{}` panicked", self.program),
        }

        if !output.status.success() {
            return Err(Error::Insights(format!("`{}` exited with {}", self.program, output.status)));
        }

        let insights: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        info!("[Insights] {} insights from `{}`", insights.len(), self.program);
        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_sequential;

    fn empty_report() -> Report {
        Report::assemble(aggregate_sequential(&[]).finish(0), None, None)
    }

    #[test]
    fn test_from_command_line() {
        let cmd = CommandInsights::from_command_line("  llm-insights --model small ").unwrap();
        assert_eq!(cmd.program, "llm-insights");
        assert_eq!(cmd.args, vec!["--model", "small"]);
        assert!(CommandInsights::from_command_line("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_error() {
        let cmd = CommandInsights::new("definitely-not-a-real-program-xyz", vec![]);
        assert!(matches!(cmd.generate(&empty_report()), Err(Error::Insights(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_lines_become_insights() {
        let script = "cat > /dev/null; printf 'You travelled far.\\n\\n  Mostly by train.  \\n'";
        let cmd = CommandInsights::new("sh", vec!["-c".into(), script.into()]);
        let insights = cmd.generate(&empty_report()).unwrap();
        assert_eq!(insights, vec!["You travelled far.", "Mostly by train."]);
    }

    #[cfg(unix)]
    #[test]
    fn test_report_json_reaches_stdin() {
        let cmd = CommandInsights::new("sh", vec!["-c".into(), "grep -o totalRawRecords".into()]);
        let insights = cmd.generate(&empty_report()).unwrap();
        assert_eq!(insights, vec!["totalRawRecords"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_child_ignoring_stdin_still_succeeds() {
        let mut report = empty_report();
        // Large enough to overflow the pipe buffer
        report.monthly_stats = (0..5000)
            .map(|i| crate::aggregate::MonthlyStat {
                month: format!("{:04}-01", i),
                visits: 1,
                activities: 0,
                total_km: 0.0,
                km_by_mode: Default::default(),
            })
            .collect();

        let cmd = CommandInsights::new("sh", vec!["-c".into(), "echo done".into()]);
        assert_eq!(cmd.generate(&report).unwrap(), vec!["done"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_error() {
        let cmd = CommandInsights::new("sh", vec!["-c".into(), "cat > /dev/null; exit 3".into()]);
        assert!(cmd.generate(&empty_report()).is_err());
    }
}
