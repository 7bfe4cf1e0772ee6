//! Merge exported CSV files and drop duplicate places
//!
//! Overlapping searches (neighbouring postcodes, related categories) return
//! many of the same businesses. Merging keeps the first row seen for each
//! value of the dedupe column (`place_id` by default).

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::WebsiteFilter;

pub const DEFAULT_DEDUPE_FIELD: &str = "place_id";

/// Outcome of a merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub files_processed: usize,
    pub total_rows_read: usize,
    pub unique_rows_written: usize,
    pub duplicates_removed: usize,
    /// None when nothing was written
    pub output_file: Option<PathBuf>,
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Merge Complete:")?;
        writeln!(f, "  Files processed: {}", self.files_processed)?;
        writeln!(f, "  Total rows read: {}", self.total_rows_read)?;
        writeln!(f, "  Unique rows written: {}", self.unique_rows_written)?;
        writeln!(f, "  Duplicates removed: {}", self.duplicates_removed)?;
        match &self.output_file {
            Some(path) => write!(f, "  Output: {}", path.display()),
            None => write!(f, "  Output: (none)"),
        }
    }
}

/// A kept row together with the header of the file it came from
struct Row {
    header_index: usize,
    record: StringRecord,
}

/// Merges CSV files, removing duplicates by one column
#[derive(Debug, Clone)]
pub struct CsvMerger {
    dedupe_field: String,
}

impl Default for CsvMerger {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_FIELD)
    }
}

impl CsvMerger {
    pub fn new(dedupe_field: impl Into<String>) -> Self {
        Self {
            dedupe_field: dedupe_field.into(),
        }
    }

    /// Merge `input_files` in order into `output_file`.
    ///
    /// Missing or unreadable files are skipped with a warning. Rows with an
    /// empty dedupe value are dropped. The output uses the header of the last
    /// file read; columns a row does not have are left empty.
    pub fn merge_files<P: AsRef<Path>>(
        &self,
        input_files: &[P],
        output_file: impl AsRef<Path>,
    ) -> Result<MergeStats> {
        let mut headers: Vec<StringRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut total_rows = 0;
        let mut files_processed = 0;

        for path in input_files {
            let path = path.as_ref();
            if !path.exists() {
                warn!("File not found: {:?}", path);
                continue;
            }

            // Ragged rows are aligned by column name on write
            let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
                Ok(reader) => reader,
                Err(e) => {
                    warn!("Error processing {:?}: {}", path, e);
                    continue;
                }
            };
            let header = match reader.headers() {
                Ok(header) => header.clone(),
                Err(e) => {
                    warn!("Error processing {:?}: {}", path, e);
                    continue;
                }
            };
            let key_column = header.iter().position(|h| h == self.dedupe_field);
            headers.push(header);
            let header_index = headers.len() - 1;

            let mut failed = false;
            for record in reader.records() {
                let record = match record {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("Error processing {:?}: {}", path, e);
                        failed = true;
                        break;
                    }
                };
                total_rows += 1;

                let key = key_column.and_then(|i| record.get(i)).unwrap_or("");
                if key.is_empty() || !seen.insert(key.to_string()) {
                    continue;
                }
                rows.push(Row {
                    header_index,
                    record,
                });
            }

            if !failed {
                files_processed += 1;
                info!("Processed: {:?}", path.file_name().unwrap_or(path.as_os_str()));
            }
        }

        let mut stats = MergeStats {
            files_processed,
            total_rows_read: total_rows,
            unique_rows_written: rows.len(),
            duplicates_removed: total_rows - rows.len(),
            output_file: None,
        };

        let Some(output_header) = headers.last() else {
            info!("No data to merge.");
            return Ok(stats);
        };
        if rows.is_empty() {
            info!("No data to merge.");
            return Ok(stats);
        }

        let output_path = output_file.as_ref().to_path_buf();
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&output_path)?;
        writer.write_record(output_header)?;
        for row in &rows {
            let source = &headers[row.header_index];
            let aligned: Vec<&str> = output_header
                .iter()
                .map(|column| {
                    source
                        .iter()
                        .position(|h| h == column)
                        .and_then(|i| row.record.get(i))
                        .unwrap_or("")
                })
                .collect();
            writer.write_record(&aligned)?;
        }
        writer.flush()?;

        stats.output_file = Some(output_path);
        info!("{}", stats);
        Ok(stats)
    }

    /// Merge every file under `base_dir` matching the glob `pattern`
    /// (e.g. `lu*_hairdresser_*.csv`), in sorted path order
    pub fn merge_by_pattern(
        &self,
        pattern: &str,
        output_file: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
    ) -> Result<MergeStats> {
        let matches = glob_sorted(&base_dir.as_ref().join(pattern))?;
        if matches.is_empty() {
            warn!("No files found matching pattern: {}", pattern);
            return Ok(MergeStats::default());
        }

        info!("Found {} files matching pattern: {}", matches.len(), pattern);
        self.merge_files(&matches, output_file)
    }

    /// Merge the exports for each postcode/category pair, optionally only
    /// one website half
    pub fn merge_categories(
        &self,
        categories: &[String],
        postcodes: &[String],
        output_file: impl AsRef<Path>,
        base_dir: impl AsRef<Path>,
        website_filter: Option<WebsiteFilter>,
    ) -> Result<MergeStats> {
        let base_dir = base_dir.as_ref();
        let suffix = website_filter.map(|f| f.as_suffix()).unwrap_or("*");

        let mut files: BTreeSet<PathBuf> = BTreeSet::new();
        for postcode in postcodes {
            for category in categories {
                let pattern = format!("{}_{}_{}.csv", postcode, category, suffix);
                files.extend(glob_sorted(&base_dir.join(pattern))?);
            }
        }

        if files.is_empty() {
            warn!(
                "No files found for categories {:?} in postcodes {:?}",
                categories, postcodes
            );
            return Ok(MergeStats::default());
        }

        let files: Vec<PathBuf> = files.into_iter().collect();
        info!("Found {} files to merge", files.len());
        self.merge_files(&files, output_file)
    }
}

fn glob_sorted(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern = pattern.to_string_lossy();
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Error reading glob entry: {}", e),
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "name,address,phone,website,google_maps_url,rating,user_ratings_total,place_id";

    fn write(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut contents = String::from(HEADER);
        for row in rows {
            contents.push('\n');
            contents.push_str(row);
        }
        contents.push('\n');
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn read_ids(path: &Path) -> Vec<String> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|r| r.unwrap().get(7).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_merge_files_dedupes_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", &["One,1 St,,,,,,p1", "Two,2 St,,,,,,p2"]);
        let b = write(
            dir.path(),
            "b.csv",
            &["One again,1 St,,,,,,p1", "Three,3 St,,,,,,p3", "No id,4 St,,,,,,"],
        );
        let missing = dir.path().join("missing.csv");
        let out = dir.path().join("merged").join("all.csv");

        let stats = CsvMerger::default()
            .merge_files(&[a, missing, b], &out)
            .unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.total_rows_read, 5);
        assert_eq!(stats.unique_rows_written, 3);
        assert_eq!(stats.duplicates_removed, 2);
        assert_eq!(stats.output_file.as_deref(), Some(out.as_path()));
        assert_eq!(read_ids(&out), vec!["p1", "p2", "p3"]);

        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.starts_with(HEADER));
        assert!(contents.contains("One,1 St"));
        assert!(!contents.contains("One again"));
    }

    #[test]
    fn test_merge_nothing_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", &[]);
        let out = dir.path().join("out.csv");

        let stats = CsvMerger::default().merge_files(&[a], &out).unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.unique_rows_written, 0);
        assert!(stats.output_file.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_custom_dedupe_field() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", &["Same,1 St,,,,,,p1", "Same,2 St,,,,,,p2"]);
        let out = dir.path().join("out.csv");

        let stats = CsvMerger::new("name").merge_files(&[a], &out).unwrap();
        assert_eq!(stats.unique_rows_written, 1);
        assert_eq!(stats.duplicates_removed, 1);
    }

    #[test]
    fn test_merge_by_pattern_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lu2_hairdresser_with_website.csv", &["B,2,,,,,,p2", "A dup,1,,,,,,p1"]);
        write(dir.path(), "lu1_hairdresser_with_website.csv", &["A,1,,,,,,p1"]);
        write(dir.path(), "lu1_barber_with_website.csv", &["C,3,,,,,,p3"]);
        let out = dir.path().join("merged.csv");

        let stats = CsvMerger::default()
            .merge_by_pattern("lu*_hairdresser_*.csv", &out, dir.path())
            .unwrap();

        assert_eq!(stats.files_processed, 2);
        assert_eq!(read_ids(&out), vec!["p1", "p2"]);
        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.contains("A,1"));
        assert!(!contents.contains("A dup"));
    }

    #[test]
    fn test_merge_by_pattern_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let stats = CsvMerger::default()
            .merge_by_pattern("*.csv", dir.path().join("out.csv"), dir.path())
            .unwrap();
        assert_eq!(stats, MergeStats::default());
    }

    #[test]
    fn test_merge_categories_with_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lu1_hairdresser_with_website.csv", &["A,1,,,,,,p1"]);
        write(dir.path(), "lu1_hairdresser_without_website.csv", &["B,2,,,,,,p2"]);
        write(dir.path(), "lu2_beautician_with_website.csv", &["C,3,,,,,,p3", "A,1,,,,,,p1"]);
        write(dir.path(), "lu3_beautician_with_website.csv", &["D,4,,,,,,p4"]);

        let categories = vec!["hairdresser".to_string(), "beautician".to_string()];
        let postcodes = vec!["lu1".to_string(), "lu2".to_string()];

        let out = dir.path().join("both.csv");
        let stats = CsvMerger::default()
            .merge_categories(&categories, &postcodes, &out, dir.path(), None)
            .unwrap();
        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.unique_rows_written, 3);
        assert_eq!(stats.duplicates_removed, 1);

        let out = dir.path().join("with.csv");
        let stats = CsvMerger::default()
            .merge_categories(
                &categories,
                &postcodes,
                &out,
                dir.path(),
                Some(WebsiteFilter::WithWebsite),
            )
            .unwrap();
        assert_eq!(stats.files_processed, 2);
        assert_eq!(read_ids(&out), vec!["p1", "p3"]);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        std::fs::write(&a, "name,place_id\nOne,p1\nTwo,p2,extra\nThree,p3\nFour\n").unwrap();
        let out = dir.path().join("out.csv");

        let stats = CsvMerger::default().merge_files(&[a], &out).unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.total_rows_read, 4);
        assert_eq!(stats.unique_rows_written, 3);

        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["name,place_id", "One,p1", "Two,p2", "Three,p3"]);
    }

    #[test]
    fn test_columns_aligned_to_last_header() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        std::fs::write(&a, "place_id,name\np1,One\n").unwrap();
        let b = dir.path().join("b.csv");
        std::fs::write(&b, "name,place_id,phone\nTwo,p2,0123\n").unwrap();
        let out = dir.path().join("out.csv");

        CsvMerger::default().merge_files(&[a, b], &out).unwrap();
        let contents = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["name,place_id,phone", "One,p1,", "Two,p2,0123"]);
    }
}
