// --- Fixed-width task table ---

use std::io::{self, Write};

use crate::model::Task;

const RULE: &str = "---------------------------------------------------------------------";

/// Write `tasks` as a table. Long values are not truncated; they push the
/// row wider instead.
pub fn render_table<W: Write>(mut out: W, tasks: &[Task]) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "| ID  | Description      | Status     | Due Date     | Priority     |"
    )?;
    writeln!(out, "{RULE}")?;

    for t in tasks {
        writeln!(
            out,
            "| {:<3} | {:<16} | {:<10} | {:<12} | {:<12} |",
            t.id,
            t.description,
            t.status,
            t.due_date.as_deref().unwrap_or(""),
            t.priority
        )?;
    }

    writeln!(out, "{RULE}")
}
