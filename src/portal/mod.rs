pub mod driver;
pub mod steps;
#[cfg(feature = "webdriver")]
pub mod webdriver;

pub use driver::PortalDriver;
pub use steps::{run_plan, step_plan, RetryPolicy, Step, StepKind};
