//! Plain-text tables printed after a run and by `harvester collections`.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use harvester_core::{BatchReport, Collection, CollectionOutcome};

const RULE_WIDTH: usize = 60;

/// `Xm Ys`, whole seconds.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Per-collection results with status, count and total.
#[must_use]
pub fn render_batch_summary(report: &BatchReport, output_root: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, " Complete");
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "Time: {}\n", format_elapsed(report.elapsed));
    let _ = writeln!(out, "{:<21}{:>6}  {}", "Collection", "Images", "Note");
    let _ = writeln!(out, "{}", rule());

    for result in &report.results {
        let images = result.outcome.images();
        let status = if images > 0 { "OK" } else { "--" };
        let note = match &result.outcome {
            CollectionOutcome::Completed(report) => report.stop_reason.to_string(),
            CollectionOutcome::Failed { error, .. } => format!("failed: {error}"),
            CollectionOutcome::Interrupted { .. } => "interrupted".to_string(),
            CollectionOutcome::Skipped => "no URL".to_string(),
        };
        let _ = writeln!(
            out,
            "{status:>4} {:<16}{images:>6}  {note} ({})",
            result.name,
            format_elapsed(result.elapsed)
        );
    }

    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(out, "{:<21}{:>6}", "TOTAL", report.total_images());
    let _ = writeln!(out, "\nLocation: {}", output_root.display());
    let _ = write!(out, "{}", rule());
    out
}

/// Configured collections with expected counts and target directories.
#[must_use]
pub fn render_collections(collections: &[Collection], output_root: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<4}{:<20}{:<5}{:>9}  {}", "#", "Collection", "URL", "Expected", "Output");
    let _ = writeln!(out, "{}", rule());
    for (index, collection) in collections.iter().enumerate() {
        let has_url = if collection.has_url() { "Yes" } else { "No" };
        let expected = collection
            .expected
            .map_or_else(|| "-".to_string(), |count| count.to_string());
        let _ = writeln!(
            out,
            "{:<4}{:<20}{has_url:<5}{expected:>9}  {}",
            index + 1,
            collection.name,
            collection.output_dir(output_root).display()
        );
    }
    let _ = write!(out, "{}", rule());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use harvester_core::batch::CollectionResult;
    use harvester_core::{CollectionReport, StopReason};

    use super::*;

    fn result(name: &str, outcome: CollectionOutcome) -> CollectionResult {
        CollectionResult {
            name: name.to_string(),
            outcome,
            elapsed: Duration::from_secs(61),
        }
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "0m 0s");
        assert_eq!(format_elapsed(Duration::from_millis(185_900)), "3m 5s");
    }

    #[test]
    fn test_render_batch_summary() {
        let report = BatchReport {
            results: vec![
                result(
                    "standard",
                    CollectionOutcome::Completed(CollectionReport {
                        images_written: 12,
                        stop_reason: StopReason::PageCap,
                        ..CollectionReport::default()
                    }),
                ),
                result(
                    "white",
                    CollectionOutcome::Failed {
                        error: "disk full".to_string(),
                        written: 3,
                    },
                ),
                result("beige", CollectionOutcome::Interrupted { written: 4 }),
                result("pink_white", CollectionOutcome::Skipped),
            ],
            elapsed: Duration::from_secs(125),
        };

        let text = render_batch_summary(&report, Path::new("data"));
        assert!(text.contains("Time: 2m 5s"), "{text}");
        assert!(text.contains("  OK standard"), "{text}");
        assert!(text.contains("page cap reached"), "{text}");
        assert!(text.contains("  -- white"), "{text}");
        assert!(text.contains("failed: disk full"), "{text}");
        assert!(text.contains("  OK beige"), "{text}");
        assert!(text.contains("interrupted"), "{text}");
        assert!(text.contains("no URL"), "{text}");
        assert!(text.contains("TOTAL                    16"), "{text}");
        assert!(text.contains("Location: data"), "{text}");
    }

    #[test]
    fn test_render_collections() {
        let collections = vec![
            Collection::new("white", "https://example.com/").with_expected(964),
            Collection::new("violet", ""),
        ];
        let text = render_collections(&collections, Path::new("out"));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].starts_with("1   white"), "{text}");
        assert!(lines[2].contains("Yes"), "{text}");
        assert!(lines[2].contains("964"), "{text}");
        assert!(lines[3].contains("No"), "{text}");
        assert!(lines[3].contains(" - "), "{text}");
    }
}
