//! Plain-text report.
//!
//! ```text
//! Duplicate files found for hash 2cf24dba... (5 B):
//!     /data/a.txt
//!     /data/b.txt
//!
//! Scanned 4 files in 1 directories: 1 duplicate groups, 10 B reclaimable
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Human-readable rendering of a finished scan.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Wrap a scan result for printing.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write every group, then the summary line.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for group in self.groups {
            writeln!(
                writer,
                "Duplicate files found for hash {} ({}):",
                group.digest,
                ByteSize(group.size)
            )?;
            for path in &group.paths {
                writeln!(writer, "    {}", path)?;
            }
            writeln!(writer)?;
        }

        let s = self.summary;
        write!(
            writer,
            "Scanned {} files in {} directories: {} duplicate groups, {} reclaimable",
            s.total_files,
            s.total_dirs,
            s.duplicate_groups,
            s.reclaimable_display()
        )?;
        if s.failed_files > 0 || s.walk_errors > 0 {
            write!(
                writer,
                " ({} files unreadable, {} walk errors)",
                s.failed_files, s.walk_errors
            )?;
        }
        writeln!(writer)
    }
}
