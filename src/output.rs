//! Console reporting of captured command output

use crate::config::Task;
use crate::orchestrator::{StartFailure, StopReport};
use std::io::{self, Write};

const RULE: &str = "+-------------------------------------------+";

/// Write a framed block of captured output
pub fn write_output_block<W: Write>(out: &mut W, label: &str, output: &str) -> io::Result<()> {
    writeln!(out, "{} {}", label, RULE)?;
    out.write_all(output.as_bytes())?;
    if !output.is_empty() && !output.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out, "{}", RULE)
}

/// Write every failure of a stop sweep
pub fn write_stop_report<W: Write>(
    out: &mut W,
    tasks: &[Task],
    report: &StopReport,
) -> io::Result<()> {
    for (idx, error) in &report.errors {
        let label = tasks
            .get(*idx)
            .map(|t| t.label(*idx))
            .unwrap_or_else(|| format!("task {}", idx));
        writeln!(out, "{} service: error while stopping: {}", idx, error)?;
        let output = report.outputs.get(idx).map(String::as_str).unwrap_or("");
        write_output_block(out, &label, output)?;
    }
    Ok(())
}

/// Write a failed start and the failures of its rollback
pub fn write_start_failure<W: Write>(
    out: &mut W,
    tasks: &[Task],
    failure: &StartFailure,
) -> io::Result<()> {
    writeln!(out, "error starting {}: {}", failure.label, failure.error)?;
    write_output_block(out, &failure.label, failure.output().unwrap_or(""))?;

    if !failure.rollback.is_success() {
        writeln!(out, "rollback could not stop every service:")?;
        write_stop_report(out, tasks, &failure.rollback)?;
    }
    Ok(())
}
