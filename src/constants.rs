/// Column-name constants to ensure consistency across the codebase.
/// These are the headers exactly as the portal emits them in the export.

// Columns the exclusion policy reads
pub const COL_DEADLINE_TYPE: &str = "DeadlineType";
pub const COL_OWNER: &str = "Owner";
pub const COL_MATTER_TITLE: &str = "Matter.Title";
pub const COL_MATTER_TYPE: &str = "Matter.Type";
pub const COL_TASK_TYPE: &str = "TaskType";

// Passthrough columns carried into both outputs untouched
pub const COL_TASK_STATUS: &str = "TaskStatus";
pub const COL_MATTER: &str = "Matter";
pub const COL_COMMENTS: &str = "Comments";

/// Columns that must be selected in the export UI before triggering the export.
pub const EXPORT_COLUMNS: &[&str] = &[
    COL_DEADLINE_TYPE,
    COL_OWNER,
    COL_MATTER_TITLE,
    COL_MATTER_TYPE,
    COL_TASK_TYPE,
    COL_TASK_STATUS,
    COL_MATTER,
    COL_COMMENTS,
];

/// Columns the filter references; absence of any of these is a hard error.
pub const FILTER_COLUMNS: &[&str] = &[
    COL_DEADLINE_TYPE,
    COL_OWNER,
    COL_MATTER_TITLE,
    COL_MATTER_TYPE,
    COL_TASK_TYPE,
];

// Exclusion policy values
pub const INTERNAL_DEADLINE: &str = "Internal Deadline";
pub const EXCLUDED_OWNERS: &[&str] = &["Brittany Steele", "Faisal Khan"];
pub const FTO_KEYWORD: &str = "FTO";
pub const REVIEW_KEYWORD: &str = "review";
pub const OPPOSITION_KEYWORD: &str = "trademark: opposition";

// Output file names under the configured data directory
pub const PATENT_OUTPUT_FILE: &str = "patent_data.csv";
pub const TRADEMARK_OUTPUT_FILE: &str = "trademark_data.csv";

// Default wait windows observed against the live portal
pub const DEFAULT_IMPLICIT_WAIT_SECS: u64 = 10;
pub const DEFAULT_ELEMENT_WAIT_SECS: u64 = 30;
pub const DEFAULT_REDIRECT_WAIT_SECS: u64 = 120;
pub const DEFAULT_EXPORT_WAIT_SECS: u64 = 120;
