use crate::constants;
use crate::error::{Result, ScraperError};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// The exported task table, loaded whole: one header row plus data rows in
/// portal order. Passthrough columns are carried without interpretation.
#[derive(Debug, Clone)]
pub struct TaskTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TaskTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        TaskTable { headers, rows }
    }

    /// Read an exported delimited file in full.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(TaskTable { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ScraperError::MissingColumn(name.to_string()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Positions of the columns the exclusion policy reads.
#[derive(Debug, Clone, Copy)]
struct PolicyColumns {
    deadline_type: usize,
    owner: usize,
    matter_title: usize,
    matter_type: usize,
    task_type: usize,
}

impl PolicyColumns {
    fn resolve(table: &TaskTable) -> Result<Self> {
        Ok(PolicyColumns {
            deadline_type: table.column_index(constants::COL_DEADLINE_TYPE)?,
            owner: table.column_index(constants::COL_OWNER)?,
            matter_title: table.column_index(constants::COL_MATTER_TITLE)?,
            matter_type: table.column_index(constants::COL_MATTER_TYPE)?,
            task_type: table.column_index(constants::COL_TASK_TYPE)?,
        })
    }
}

/// A short row yields "" for trailing columns; an absent value never matches
/// a substring test.
fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn is_internal_deadline(row: &[String], cols: &PolicyColumns) -> bool {
    field(row, cols.deadline_type) == constants::INTERNAL_DEADLINE
}

/// The compound exclusion condition applied after the internal-deadline
/// pre-filter. Owner matches are exact; `Matter.Title` is case-sensitive;
/// the `TaskType` and `Matter.Type` keyword tests are case-insensitive.
fn matches_exclusion(row: &[String], cols: &PolicyColumns) -> bool {
    let owner = field(row, cols.owner);
    if constants::EXCLUDED_OWNERS.contains(&owner) {
        return true;
    }
    if field(row, cols.matter_title).contains(constants::FTO_KEYWORD) {
        return true;
    }
    if field(row, cols.task_type)
        .to_lowercase()
        .contains(constants::REVIEW_KEYWORD)
    {
        return true;
    }
    field(row, cols.matter_type)
        .to_lowercase()
        .contains(constants::OPPOSITION_KEYWORD)
}

/// The two derived projections of the surviving rows.
#[derive(Debug)]
pub struct FilteredViews {
    pub patent: TaskTable,
    pub trademark: TaskTable,
    pub input_rows: usize,
    pub internal_deadline_dropped: usize,
    pub excluded_dropped: usize,
}

/// Result of a complete filter run, ready for the run report.
#[derive(Debug, Serialize)]
pub struct FilterSummary {
    pub input_rows: usize,
    pub internal_deadline_dropped: usize,
    pub excluded_dropped: usize,
    pub retained_rows: usize,
    pub patent_file: String,
    pub trademark_file: String,
}

/// Apply the exclusion policy and derive both views, consuming the table.
///
/// The policy runs as two distinct passes over the original row values:
/// the `Internal Deadline` pre-filter, then the compound condition on the
/// survivors. Both passes read the same unmodified row.
pub fn apply_exclusion_policy(table: TaskTable) -> Result<FilteredViews> {
    let cols = PolicyColumns::resolve(&table)?;
    let input_rows = table.row_count();

    let (after_prefilter, internal_deadline_dropped) = {
        let mut kept = Vec::new();
        let mut dropped = 0usize;
        for row in table.rows {
            if is_internal_deadline(&row, &cols) {
                dropped += 1;
            } else {
                kept.push(row);
            }
        }
        (kept, dropped)
    };
    debug!(
        "Pre-filter dropped {} internal-deadline rows",
        internal_deadline_dropped
    );

    let mut retained = Vec::new();
    let mut excluded_dropped = 0usize;
    for row in after_prefilter {
        if matches_exclusion(&row, &cols) {
            excluded_dropped += 1;
        } else {
            retained.push(row);
        }
    }
    debug!("Secondary filter dropped {} rows", excluded_dropped);

    // Trademark view keeps every column; patent view drops Matter.Title.
    let trademark = TaskTable::new(table.headers.clone(), retained.clone());

    let mut patent_headers = table.headers;
    patent_headers.remove(cols.matter_title);
    let patent_rows = retained
        .into_iter()
        .map(|mut row| {
            if cols.matter_title < row.len() {
                row.remove(cols.matter_title);
            }
            row
        })
        .collect();
    let patent = TaskTable::new(patent_headers, patent_rows);

    Ok(FilteredViews {
        patent,
        trademark,
        input_rows,
        internal_deadline_dropped,
        excluded_dropped,
    })
}

/// Load the exported file, filter it, and write both output files.
pub fn run(input: &Path, data_dir: &Path) -> Result<FilterSummary> {
    info!("Filtering exported table {}", input.display());
    let table = TaskTable::from_csv_path(input)?;
    let views = apply_exclusion_policy(table)?;

    fs::create_dir_all(data_dir)?;
    let patent_path = data_dir.join(constants::PATENT_OUTPUT_FILE);
    let trademark_path = data_dir.join(constants::TRADEMARK_OUTPUT_FILE);
    views.patent.write_csv(&patent_path)?;
    views.trademark.write_csv(&trademark_path)?;

    let retained_rows = views.trademark.row_count();
    info!(
        "Retained {}/{} rows ({} internal deadlines, {} excluded)",
        retained_rows,
        views.input_rows,
        views.internal_deadline_dropped,
        views.excluded_dropped
    );

    Ok(FilterSummary {
        input_rows: views.input_rows,
        internal_deadline_dropped: views.internal_deadline_dropped,
        excluded_dropped: views.excluded_dropped,
        retained_rows,
        patent_file: path_string(&patent_path),
        trademark_file: path_string(&trademark_path),
    })
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
