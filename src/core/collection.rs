//! Whole-file load and save.
//!
//! A missing file loads as an empty collection; a new store simply has no
//! file yet. Saving truncates and rewrites the file in place with no backup
//! or atomic rename, so a failure part-way leaves a partially written file.

use crate::domain::model::{Loaded, ParsePolicy};
use crate::domain::ports::Record;
use crate::utils::error::{CatalogError, Result};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::Path;

pub fn load_records<T: Record>(path: impl AsRef<Path>, policy: ParsePolicy) -> Result<Loaded<T>> {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist, starting empty", path.display());
            return Ok(Loaded::default());
        }
        Err(e) => return Err(e.into()),
    };

    // 只以 \n 分行，行號才會對應 CRLF 檔案；空行由 csv reader 直接略過
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(file);

    let mut loaded = Loaded::default();
    let mut row = StringRecord::new();
    while reader.read_record(&mut row)? {
        let line = row.position().map(|p| p.line() as usize).unwrap_or(0);
        let mut fields: Vec<&str> = row.iter().collect();
        if let Some(last) = fields.last_mut() {
            let text = *last;
            *last = text.strip_suffix('\r').unwrap_or(text);
        }
        // CRLF 檔案中的空行
        if fields == [""] {
            continue;
        }

        let decoded = T::from_fields(&fields, policy).map_err(|e| e.at_line(line))?;
        loaded
            .issues
            .extend(decoded.issues.into_iter().map(|mut issue| {
                issue.line = line;
                issue
            }));
        loaded.records.push(decoded.record);
    }

    tracing::debug!(
        "Loaded {} records from {} ({} field issues)",
        loaded.records.len(),
        path.display(),
        loaded.issues.len()
    );
    Ok(loaded)
}

pub fn save_records<T: Record>(path: impl AsRef<Path>, records: &[T]) -> Result<()> {
    let path = path.as_ref();
    let write_failure = |source: io::Error| CatalogError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_failure)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);

    for record in records {
        writer
            .write_record(record.to_fields())
            .map_err(|e| write_failure(csv_to_io(e)))?;
    }
    writer.flush().map_err(write_failure)?;

    tracing::debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

fn csv_to_io(err: csv::Error) -> io::Error {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => e,
        other => io::Error::other(format!("{:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Book, User};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded: Loaded<Book> =
            load_records(dir.path().join("nope.txt"), ParsePolicy::Strict).unwrap();
        assert!(loaded.records.is_empty());
        assert!(loaded.issues.is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "\n0,alice,pw1,user\n\n\n1,bob,pw2,librarian\n\n").unwrap();

        let loaded: Loaded<User> = load_records(&path, ParsePolicy::Strict).unwrap();
        assert_eq!(
            loaded.records,
            vec![
                User::new(0, "alice", "pw1", "user"),
                User::new(1, "bob", "pw2", "librarian"),
            ]
        );
    }

    #[test]
    fn test_save_writes_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.txt");
        let books = vec![
            Book::new("Jane Austen", "Emma", 101, false),
            Book::new("Leo Tolstoy", "War and Peace", 102, true),
        ];

        save_records(&path, &books).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Jane Austen,Emma,101,false\nLeo Tolstoy,War and Peace,102,true\n"
        );
    }

    #[test]
    fn test_save_truncates_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.txt");
        std::fs::write(&path, "old,stuff,1,true\nmore,old,2,false\n").unwrap();

        save_records(&path, &[Book::new("A", "B", 3, false)]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A,B,3,false\n");
    }

    #[test]
    fn test_save_empty_collection_empties_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "0,alice,pw1,user\n").unwrap();

        save_records::<User>(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_strict_load_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.txt");
        std::fs::write(&path, "A,B,1,true\n\nC,D,oops,false\n").unwrap();

        match load_records::<Book>(&path, ParsePolicy::Strict) {
            Err(CatalogError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed record, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.txt");
        std::fs::write(&path, "A,B,1,true\r\nC,D,2,true\r\n\r\nE,F,3,maybe\r\n").unwrap();

        let loaded: Loaded<Book> = load_records(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.records[0], Book::new("A", "B", 1, true));
        assert_eq!(loaded.issues.len(), 1);
        assert_eq!(loaded.issues[0].line, 4);
        assert_eq!(loaded.issues[0].value, "maybe");

        match load_records::<Book>(&path, ParsePolicy::Strict) {
            Err(CatalogError::MalformedRecord { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected malformed record, got {:?}", other),
        }
    }

    #[test]
    fn test_lenient_load_reports_issue_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.txt");
        std::fs::write(&path, "A,B,1,true\nC,D,2,maybe\n").unwrap();

        let loaded: Loaded<Book> = load_records(&path, ParsePolicy::Lenient).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.issues.len(), 1);
        assert_eq!(loaded.issues[0].line, 2);
        assert_eq!(loaded.issues[0].field, "checked_out");
    }

    #[test]
    fn test_save_into_missing_directory_is_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("books.txt");

        let err = save_records(&path, &[Book::new("A", "B", 1, false)]).unwrap_err();
        assert!(matches!(err, CatalogError::WriteFailure { .. }));
    }
}
