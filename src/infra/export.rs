//! Letter report exporters.
//!
//! Read-only consumers of the letter ledger: one human-readable text
//! format and one JSON format. IO failures are exporter errors reported
//! with context, never core status codes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::core::error::AppResult;
use crate::core::letter::{Letter, LetterCategory, LetterState};
use crate::core::system::MailSystem;

fn category_label(category: LetterCategory) -> &'static str {
    match category {
        LetterCategory::Ordinary => "ordinary",
        LetterCategory::Urgent => "urgent",
    }
}

fn state_label(state: LetterState) -> &'static str {
    match state {
        LetterState::InTransit => "in transit",
        LetterState::Delivered => "delivered",
        LetterState::Undeliverable => "undeliverable",
    }
}

fn write_letter_block(out: &mut impl Write, letter: &Letter) -> std::io::Result<()> {
    writeln!(out, "Letter #{}", letter.id)?;
    writeln!(out, "  category: {}", category_label(letter.category))?;
    writeln!(out, "  state:    {}", state_label(letter.state))?;
    writeln!(out, "  priority: {}", letter.priority)?;
    writeln!(
        out,
        "  route:    {} -> {} (currently at {})",
        letter.origin, letter.destination, letter.current_office
    )?;
    writeln!(out, "  payload:  {}", letter.payload)?;
    writeln!(out)
}

/// Write one human-readable block per letter to `path`.
///
/// # Errors
///
/// Returns the underlying IO error with path context.
pub fn write_text_report(system: &MailSystem, path: impl AsRef<Path>) -> AppResult<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("creating letter report {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "Letters: {}", system.ledger().len())?;
    writeln!(out)?;
    for letter in system.ledger().letters() {
        write_letter_block(&mut out, letter)?;
    }
    out.flush()
        .with_context(|| format!("flushing letter report {}", path.display()))?;
    Ok(())
}

/// Write the full letter collection to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns IO or serialization errors with path context.
pub fn write_json_report(system: &MailSystem, path: impl AsRef<Path>) -> AppResult<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("creating letter report {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), system.ledger().letters())
        .with_context(|| format!("serializing letter report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::letter::LetterCategory;

    fn sample_system() -> MailSystem {
        let mut system = MailSystem::new();
        system.add_office(100, 10, &[]).unwrap();
        system.add_office(200, 15, &[]).unwrap();
        system
            .add_letter(LetterCategory::Ordinary, 5, 100, 200, "test letter")
            .unwrap();
        system
    }

    #[test]
    fn test_text_report_contains_letter() {
        let system = sample_system();
        let path = std::env::temp_dir().join("mail_relay_text_report_test.txt");
        write_text_report(&system, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Letter #1"));
        assert!(contents.contains("route:    100 -> 200 (currently at 100)"));
        assert!(contents.contains("test letter"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_report_round_trips() {
        let system = sample_system();
        let path = std::env::temp_dir().join("mail_relay_json_report_test.json");
        write_json_report(&system, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let letters: Vec<Letter> = serde_json::from_str(&contents).unwrap();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].id, 1);
        assert_eq!(letters[0].payload, "test letter");
        let _ = std::fs::remove_file(&path);
    }
}
