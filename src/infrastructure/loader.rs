// CSV loader for the retail store workbook exports

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{
    error::DataIntegrityError,
    site_data::{SiteData, StoreLocation},
    value_objects::StoreCategory,
};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}, line {line}: column {column} is missing")]
    MissingColumn {
        path: PathBuf,
        line: u64,
        column: usize,
    },

    #[error("{path}, line {line}: `{value}` is not a number")]
    Parse {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),
}

/// Where each input table lives.
///
/// File names default to the workbook's CSV export; all of them are resolved
/// against `directory`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub directory: PathBuf,
    pub demand_locations: String,
    pub candidate_sites: String,
    pub stores: String,
    pub segments: String,
    pub demand: String,
    pub distance: String,
    pub no_choice_utility: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            demand_locations: "RetailStores-Set I.csv".to_string(),
            candidate_sites: "RetailStores-Set J.csv".to_string(),
            stores: "RetailStores-Set M.csv".to_string(),
            segments: "RetailStores-Set S.csv".to_string(),
            demand: "RetailStores-h_is.csv".to_string(),
            distance: "RetailStores-d_ij.csv".to_string(),
            no_choice_utility: "RetailStores-V_j=0.csv".to_string(),
        }
    }
}

impl DataFiles {
    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.directory.join(file)
    }
}

/// Reads the seven input tables into [`SiteData`].
///
/// Layout per file:
/// - set files: one header row, identifiers in the first column
/// - `h_is` and `d_ij`: one header row, then `location,key,value`
/// - `V_j=0`: two header rows, then `location,value`
///
/// Stores in M are tagged from their identifier prefix (`E`, `C`, `P`).
pub struct CsvLoader {
    files: DataFiles,
}

impl CsvLoader {
    pub fn new(files: DataFiles) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &DataFiles {
        &self.files
    }

    pub fn load(&self) -> Result<SiteData, LoadError> {
        let files = &self.files;

        let stores = read_set(&files.path(&files.stores))?
            .into_iter()
            .map(|id| match StoreCategory::from_prefix(&id) {
                Some(category) => Ok(StoreLocation::new(id, category)),
                None => Err(DataIntegrityError::UnclassifiedStore { identifier: id }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data = SiteData {
            demand_locations: read_set(&files.path(&files.demand_locations))?,
            candidate_sites: read_set(&files.path(&files.candidate_sites))?,
            stores,
            segments: read_set(&files.path(&files.segments))?,
            demand: read_pairs(&files.path(&files.demand))?,
            distance: read_pairs(&files.path(&files.distance))?,
            no_choice_utility: read_singles(&files.path(&files.no_choice_utility))?
                .into_iter()
                .collect(),
        };

        debug!(
            directory = %files.directory.display(),
            locations = data.demand_locations.len(),
            candidates = data.candidate_sites.len(),
            stores = data.stores.len(),
            segments = data.segments.len(),
            demand_entries = data.demand.len(),
            distance_entries = data.distance.len(),
            "site data loaded"
        );
        Ok(data)
    }
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Non-blank records after `skip` header rows, with their line numbers
fn records(path: &Path, skip: usize) -> Result<Vec<(u64, csv::StringRecord)>, LoadError> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for result in reader.records().skip(skip) {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.get(0).map_or(true, str::is_empty) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        rows.push((line, record));
    }
    Ok(rows)
}

fn field<'r>(
    path: &Path,
    line: u64,
    record: &'r csv::StringRecord,
    column: usize,
) -> Result<&'r str, LoadError> {
    record.get(column).ok_or_else(|| LoadError::MissingColumn {
        path: path.to_path_buf(),
        line,
        column,
    })
}

fn number(path: &Path, line: u64, value: &str) -> Result<f64, LoadError> {
    value.parse().map_err(|_| LoadError::Parse {
        path: path.to_path_buf(),
        line,
        value: value.to_string(),
    })
}

fn read_set(path: &Path) -> Result<Vec<String>, LoadError> {
    Ok(records(path, 1)?
        .into_iter()
        .filter_map(|(_, record)| record.get(0).map(str::to_string))
        .collect())
}

fn read_pairs(path: &Path) -> Result<BTreeMap<(String, String), f64>, LoadError> {
    let mut table = BTreeMap::new();
    for (line, record) in records(path, 1)? {
        let first = field(path, line, &record, 0)?;
        let second = field(path, line, &record, 1)?;
        let value = number(path, line, field(path, line, &record, 2)?)?;
        table.insert((first.to_string(), second.to_string()), value);
    }
    Ok(table)
}

fn read_singles(path: &Path) -> Result<Vec<(String, f64)>, LoadError> {
    records(path, 2)?
        .into_iter()
        .map(|(line, record)| {
            let key = field(path, line, &record, 0)?;
            let value = number(path, line, field(path, line, &record, 1)?)?;
            Ok((key.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    fn sample_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(&dir, "RetailStores-Set I.csv", "I\nA\nB\n");
        write(&dir, "RetailStores-Set J.csv", "J\nP1\nP2\n");
        write(&dir, "RetailStores-Set M.csv", "M\nE1\nC1\nP1\nP2\n");
        write(&dir, "RetailStores-Set S.csv", "S\nlow\nhigh\n\n");
        write(
            &dir,
            "RetailStores-h_is.csv",
            "i,s,h\nA,low,60\nA,high,40\nB,low,25.5\n",
        );
        write(
            &dir,
            "RetailStores-d_ij.csv",
            "i,j,d\nA,E1,1.5\nA,C1,2\nA,P1,3\nB,P2, 0.5 \n",
        );
        write(
            &dir,
            "RetailStores-V_j=0.csv",
            "No-choice utility,\ni,V\nA,-1.25\nB,0\n",
        );
        dir
    }

    #[test]
    fn test_loads_workbook_layout() {
        let dir = sample_dir();
        let data = CsvLoader::new(DataFiles::in_directory(dir.path()))
            .load()
            .unwrap();

        assert_eq!(data.demand_locations, vec!["A", "B"]);
        assert_eq!(data.candidate_sites, vec!["P1", "P2"]);
        assert_eq!(data.segments, vec!["low", "high"]);
        assert_eq!(
            data.stores,
            vec![
                StoreLocation::existing("E1"),
                StoreLocation::competitor("C1"),
                StoreLocation::potential("P1"),
                StoreLocation::potential("P2"),
            ]
        );
        assert_eq!(data.demand[&("B".to_string(), "low".to_string())], 25.5);
        assert_eq!(data.distance[&("B".to_string(), "P2".to_string())], 0.5);
        assert_eq!(data.no_choice_utility["A"], -1.25);
        assert_eq!(data.no_choice_utility.len(), 2);
    }

    #[test]
    fn test_unprefixed_store_is_rejected() {
        let dir = sample_dir();
        write(&dir, "RetailStores-Set M.csv", "M\nE1\nX9\n");

        let err = CsvLoader::new(DataFiles::in_directory(dir.path()))
            .load()
            .unwrap_err();
        match err {
            LoadError::Integrity(DataIntegrityError::UnclassifiedStore { identifier }) => {
                assert_eq!(identifier, "X9")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_names_the_line() {
        let dir = sample_dir();
        write(&dir, "RetailStores-d_ij.csv", "i,j,d\nA,P1,3\nA,P2,far\n");

        let err = CsvLoader::new(DataFiles::in_directory(dir.path()))
            .load()
            .unwrap_err();
        match err {
            LoadError::Parse { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "far");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_short_row_is_reported() {
        let dir = sample_dir();
        write(&dir, "RetailStores-h_is.csv", "i,s,h\nA,low\n");

        let err = CsvLoader::new(DataFiles::in_directory(dir.path()))
            .load()
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = CsvLoader::new(DataFiles::in_directory(dir.path()))
            .load()
            .unwrap_err();

        assert!(matches!(err, LoadError::Csv { .. }));
        assert!(err.to_string().contains("RetailStores-Set M.csv"));
    }
}
