// Appkeys Config Parser - remap record file
// Three whitespace-separated fields per line: <from> <class> <to>

use std::fs;
use std::path::Path;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected 3 fields (from, class, to), found {found}")]
    MalformedLine { line: usize, found: usize },
}

/// One decoded line of the remap file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    /// Source hotkey string, e.g. "ctrl-alt-t"
    pub from: String,
    /// Window class the remap applies to, or "*"
    pub class: String,
    /// Target hotkey string
    pub to: String,
    /// 1-based line number in the source file
    pub line: usize,
}

impl ConfigRecord {
    /// Create a record not tied to a file line
    pub fn new(from: &str, class: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            class: class.to_string(),
            to: to.to_string(),
            line: 0,
        }
    }
}

/// Parse a single line.
///
/// Blank lines and lines starting with `#` yield `Ok(None)`.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<ConfigRecord>, ConfigError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    match fields.as_slice() {
        [from, class, to] => Ok(Some(ConfigRecord {
            from: from.to_string(),
            class: class.to_string(),
            to: to.to_string(),
            line: line_no,
        })),
        _ => Err(ConfigError::MalformedLine {
            line: line_no,
            found: fields.len(),
        }),
    }
}

/// Parse every line of a remap file.
///
/// With `strict` a malformed line aborts the whole read; otherwise the line
/// is skipped with a warning and later lines are still read.
pub fn parse_records(content: &str, strict: bool) -> Result<Vec<ConfigRecord>, ConfigError> {
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        match parse_line(line, index + 1) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) if !strict => log::warn!("Skipping config {}", e),
            Err(e) => return Err(e),
        }
    }
    log::debug!("Parsed {} remap record(s)", records.len());
    Ok(records)
}

/// Read and parse a remap file
pub fn read_records(path: &Path, strict: bool) -> Result<Vec<ConfigRecord>, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_records(&content, strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line() {
        let record = parse_line("ctrl-alt-t * ctrl-alt-x\n", 3).unwrap().unwrap();
        assert_eq!(record.from, "ctrl-alt-t");
        assert_eq!(record.class, "*");
        assert_eq!(record.to, "ctrl-alt-x");
        assert_eq!(record.line, 3);
    }

    #[test]
    fn test_parse_line_collapses_whitespace() {
        let record = parse_line("  b1\tfirefox   b2  ", 1).unwrap().unwrap();
        assert_eq!(record, ConfigRecord { line: 1, ..ConfigRecord::new("b1", "firefox", "b2") });
    }

    #[test]
    fn test_parse_line_skips_blank_and_comments() {
        assert!(parse_line("", 1).unwrap().is_none());
        assert!(parse_line("   \n", 2).unwrap().is_none());
        assert!(parse_line("# ctrl-t * ctrl-x", 3).unwrap().is_none());
    }

    #[test]
    fn test_parse_line_wrong_field_count() {
        let err = parse_line("ctrl-t firefox", 7).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine { line: 7, found: 2 }));

        let err = parse_line("a b c d", 8).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine { line: 8, found: 4 }));
    }

    #[test]
    fn test_parse_records_tolerant_skips_malformed() {
        let content = "ctrl-t * ctrl-x\nctrl-w firefox\nalt-q xterm ctrl-q\n";
        let records = parse_records(content, false).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].from, "ctrl-t");
        assert_eq!(records[1].class, "xterm");
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_parse_records_strict_fails() {
        let content = "ctrl-t * ctrl-x\nctrl-w firefox\n";
        let err = parse_records(content, true).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine { line: 2, found: 2 }));
    }

    #[test]
    fn test_read_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ctrl-alt-t * ctrl-alt-x").unwrap();
        writeln!(file, "b1 firefox b2").unwrap();

        let records = read_records(file.path(), true).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], ConfigRecord { line: 2, ..ConfigRecord::new("b1", "firefox", "b2") });
    }

    #[test]
    fn test_read_records_missing_file() {
        let err = read_records(Path::new("/nonexistent/appkeys/remaps"), false).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::MalformedLine { line: 4, found: 2 };
        assert_eq!(
            err.to_string(),
            "line 4: expected 3 fields (from, class, to), found 2"
        );
    }
}
