use serde::{Deserialize, Serialize};
use strum::Display;

/// Status of a repair job as stored on the job row.
///
/// Upload flow sets `uploaded`; the analysis handler owns every later
/// transition and never reverts one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Uploaded,
    Analyzing,
    Done,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_row_tags() {
        assert_eq!(serde_json::to_value(JobStatus::Analyzing).unwrap(), "analyzing");
        assert_eq!(serde_json::to_value(JobStatus::Done).unwrap(), "done");
        assert_eq!(JobStatus::Error.to_string(), "error");
    }
}
