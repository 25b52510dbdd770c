use crate::config::Credentials;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Port for the browser-automation collaborator.
///
/// Implementations own all element lookup and waiting; the step runner only
/// sequences these calls, enforces each step's wait window, and checks
/// post-conditions. No data flows back out of the portal beyond the
/// exported file path.
#[async_trait]
pub trait PortalDriver: Send {
    /// Navigate to the portal landing page and let any redirect settle.
    async fn open_portal(&mut self, base_url: &str) -> Result<()>;

    /// Submit credentials on the sign-in form.
    async fn sign_in(&mut self, credentials: &Credentials) -> Result<()>;

    /// URL the browser ended up on, used for post-login verification.
    async fn current_url(&mut self) -> Result<String>;

    /// Open the tasks report view that hosts the export UI.
    async fn open_task_report(&mut self) -> Result<()>;

    /// Move one column into the export's selected-columns set.
    async fn add_export_column(&mut self, column: &str) -> Result<()>;

    /// Columns currently in the selected-columns set.
    async fn selected_columns(&mut self) -> Result<Vec<String>>;

    /// Trigger the CSV export and return the path of the landed file.
    async fn trigger_export(&mut self) -> Result<PathBuf>;

    /// Tear the browser session down. Idempotent.
    async fn close(&mut self) -> Result<()>;
}
