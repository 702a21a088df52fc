//! Plain-text report.
//!
//! ```text
//! Exact matches:
//! /photos/a.txt
//!   - /photos/b.txt
//!
//! Image matches:
//! /photos/img1.png
//!   - /photos/img2.png (distance 2)
//! ```
//!
//! Groups are separated by a blank line; an empty section prints
//! `  (none)`.

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanReport, ScanSummary, SimilarGroup};

/// Text renderer for one report.
#[derive(Debug)]
pub struct TextOutput<'a> {
    exact_groups: &'a [DuplicateGroup],
    similar_groups: &'a [SimilarGroup],
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Render `report`, with bold section headers when `color` is set.
    #[must_use]
    pub fn new(report: &'a ScanReport, color: bool) -> Self {
        Self {
            exact_groups: &report.exact_groups,
            similar_groups: &report.similar_groups,
            color,
        }
    }

    fn header(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn canonical(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Write both sections.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", self.header("Exact matches:"))?;
        if self.exact_groups.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for (i, group) in self.exact_groups.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            writeln!(w, "{}", self.canonical(&group.canonical.to_string_lossy()))?;
            for path in &group.duplicates {
                writeln!(w, "  - {}", path.display())?;
            }
        }

        writeln!(w)?;
        writeln!(w, "{}", self.header("Image matches:"))?;
        if self.similar_groups.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for (i, group) in self.similar_groups.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            writeln!(w, "{}", self.canonical(&group.canonical.to_string_lossy()))?;
            for member in &group.members {
                writeln!(
                    w,
                    "  - {} (distance {})",
                    member.path.display(),
                    member.distance
                )?;
            }
        }
        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// One-line summary for stderr.
#[must_use]
pub fn format_summary(summary: &ScanSummary) -> String {
    let mut line = format!(
        "Scanned {} files ({}) in {:.2}s: {} exact {} ({} duplicates, {} reclaimable), {} image {} ({} similar), {} {}",
        summary.total_files,
        summary.hashed_display(),
        summary.duration.as_secs_f64(),
        summary.exact_groups,
        plural(summary.exact_groups, "group", "groups"),
        summary.duplicate_files,
        summary.reclaimable_display(),
        summary.similar_groups,
        plural(summary.similar_groups, "group", "groups"),
        summary.similar_files,
        summary.error_count,
        plural(summary.error_count, "error", "errors"),
    );
    if summary.interrupted {
        line.push_str(" [interrupted]");
    }
    line
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
