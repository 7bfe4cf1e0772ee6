//! CSV export of collected leads

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::{BusinessLead, WebsiteFilter};

/// Writes leads to CSV, one row per lead
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export `leads` to `path`, creating parent directories.
    ///
    /// Returns the number of rows written. An empty slice writes no file.
    pub fn export(&self, path: impl AsRef<Path>, leads: &[BusinessLead]) -> Result<usize> {
        let path = path.as_ref();
        if leads.is_empty() {
            info!("No leads to export for {:?}", path);
            return Ok(0);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        for lead in leads {
            writer.serialize(lead)?;
        }
        writer.flush()?;

        info!("Exported {} leads to {:?}", leads.len(), path);
        Ok(leads.len())
    }
}

/// `{area}_{keyword}_{with_website|without_website}.csv`, lowercased with
/// spaces replaced by underscores
pub fn output_file_name(area: &str, keyword: &str, filter: WebsiteFilter) -> String {
    format!(
        "{}_{}_{}.csv",
        slug(area),
        slug(keyword),
        filter.as_suffix()
    )
}

/// Full export path under `output_dir`
pub fn output_path(
    output_dir: &Path,
    area: &str,
    keyword: &str,
    filter: WebsiteFilter,
) -> PathBuf {
    output_dir.join(output_file_name(area, keyword, filter))
}

fn slug(value: &str) -> String {
    value.trim().replace(' ', "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(
            output_file_name("Luton, UK", "Eyelash Extensions", WebsiteFilter::WithWebsite),
            "luton,_uk_eyelash_extensions_with_website.csv"
        );
        assert_eq!(
            output_file_name("lu1", "hairdresser", WebsiteFilter::WithoutWebsite),
            "lu1_hairdresser_without_website.csv"
        );
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("leads.csv");

        let mut lead = BusinessLead::new("Lash Lounge", "2 George St, Luton")
            .with_website("https://lashlounge.example")
            .with_place_id("p1");
        lead.rating = Some(4.5);
        lead.user_ratings_total = Some(12);
        let bare = BusinessLead::new("Cuts", "3 Park St");

        let written = CsvExporter::new().export(&path, &[lead, bare]).unwrap();
        assert_eq!(written, 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "name,address,phone,website,google_maps_url,rating,user_ratings_total,place_id"
        );
        assert_eq!(
            lines[1],
            "Lash Lounge,\"2 George St, Luton\",,https://lashlounge.example,,4.5,12,p1"
        );
        assert_eq!(lines[2], "Cuts,3 Park St,,,,,,");
    }

    #[test]
    fn test_empty_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(CsvExporter::new().export(&path, &[]).unwrap(), 0);
        assert!(!path.exists());
    }
}
