//! Wire types for the Qiskit Runtime REST API.
//!
//! Only the fields we read are modelled; unknown fields are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct IamToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendsResponse {
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// `true` when the device accepts jobs.
    #[serde(default)]
    pub state: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub length_queue: u64,
}

impl BackendStatus {
    pub fn is_operational(&self) -> bool {
        self.state && (self.status.is_empty() || self.status.eq_ignore_ascii_case("active"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfiguration {
    pub n_qubits: usize,
    #[serde(default)]
    pub basis_gates: Vec<String>,
    #[serde(default)]
    pub coupling_map: Vec<[usize; 2]>,
    #[serde(default)]
    pub simulator: bool,
}

/// What least-busy selection needs to know about one device.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSummary {
    pub name: String,
    pub num_qubits: usize,
    pub operational: bool,
    pub simulator: bool,
    pub pending_jobs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobRequest {
    pub program_id: &'static str,
    pub backend: String,
    pub params: SamplerParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplerParams {
    /// One PUB per circuit; a PUB without parameters is a 1-element array.
    pub pubs: Vec<[String; 1]>,
    pub shots: u64,
    pub version: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobCreated {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobInfo {
    pub status: String,
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Lifecycle of a runtime job as reported by `GET /jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "queued" | "initializing" | "validating" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "completed" | "done" => Some(JobStatus::Completed),
            "failed" | "error" => Some(JobStatus::Failed),
            "cancelled" | "canceled" | "cancelled - ran too long" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerResults {
    pub results: Vec<PubResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubResult {
    /// Keyed by classical register name.
    pub data: HashMap<String, RegisterSamples>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSamples {
    /// One hex string per shot, e.g. `"0x5"`.
    pub samples: Vec<String>,
    #[serde(default)]
    pub num_bits: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_request_shape() {
        let req = JobRequest {
            program_id: "sampler",
            backend: "ibm_torino".into(),
            params: SamplerParams {
                pubs: vec![["OPENQASM 3.0;".into()]],
                shots: 4096,
                version: 2,
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["params"]["pubs"][0][0], "OPENQASM 3.0;");
        assert_eq!(v["params"]["version"], 2);
    }

    #[test]
    fn results_parse() {
        let body = r#"{"results":[{"data":{"c":{"samples":["0x0","0x3"],"num_bits":4}},"metadata":{}}]}"#;
        let r: SamplerResults = serde_json::from_str(body).unwrap();
        assert_eq!(r.results[0].data["c"].samples.len(), 2);
    }

    #[test]
    fn job_bodies_keep_only_what_polling_reads() {
        let created: JobCreated =
            serde_json::from_str(r#"{"id":"job-1","backend":"ibm_torino"}"#).unwrap();
        assert_eq!(created.id, "job-1");

        let info: JobInfo = serde_json::from_str(
            r#"{"id":"job-1","status":"Failed","state":{"status":"Failed","reason":"boom"}}"#,
        )
        .unwrap();
        assert_eq!(info.status, "Failed");
        assert_eq!(info.state.and_then(|s| s.reason).as_deref(), Some("boom"));
    }

    #[test]
    fn status_strings() {
        assert_eq!(JobStatus::parse("Completed"), Some(JobStatus::Completed));
        assert!(JobStatus::parse("Cancelled").unwrap().is_terminal());
        assert!(!JobStatus::parse("Queued").unwrap().is_terminal());
        assert_eq!(JobStatus::parse("???"), None);
    }
}
