//! IBM Quantum Platform integration (Qiskit Runtime REST API).
//!
//! Blocking, single-shot calls: no retries or caching. A job is polled at a
//! fixed interval until it reaches a terminal state or the timeout expires.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::circuit::{Circuit, Sampler, SamplerJob, Target, to_qasm3_physical, transpile};
use crate::domain::Counts;
use crate::error::AppError;
use crate::ibm::types::{
    BackendConfiguration, BackendStatus, BackendSummary, BackendsResponse, IamToken, JobCreated,
    JobInfo, JobRequest, JobStatus, SamplerParams, SamplerResults,
};

const DEFAULT_BASE_URL: &str = "https://quantum.cloud.ibm.com/api/v1";
const IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
const API_VERSION: &str = "2025-05-01";
/// Classical register written by our QASM.
const CREG: &str = "c";

/// How the client authenticates.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Pre-issued bearer token.
    Bearer(String),
    /// IBM Cloud API key, exchanged once at the IAM endpoint.
    ApiKey(String),
}

#[derive(Debug, Clone)]
pub struct IbmConfig {
    pub credential: Credential,
    pub crn: String,
    pub base_url: String,
}

impl IbmConfig {
    /// Read `IBM_QUANTUM_TOKEN` / `IBM_CLOUD_API_KEY`, `IBM_QUANTUM_CRN` and the
    /// optional `IBM_QUANTUM_URL` (a `.env` file is honoured).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let credential = match (
            std::env::var("IBM_QUANTUM_TOKEN").ok().filter(|s| !s.is_empty()),
            std::env::var("IBM_CLOUD_API_KEY").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(token), _) => Credential::Bearer(token),
            (None, Some(key)) => Credential::ApiKey(key),
            (None, None) => {
                return Err(AppError::config(
                    "Missing IBM_QUANTUM_TOKEN or IBM_CLOUD_API_KEY in environment (.env).",
                ));
            }
        };
        let crn = std::env::var("IBM_QUANTUM_CRN")
            .map_err(|_| AppError::config("Missing IBM_QUANTUM_CRN in environment (.env)."))?;
        let base_url = std::env::var("IBM_QUANTUM_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            credential,
            crn,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Clone)]
pub struct IbmClient {
    client: Client,
    base_url: String,
    crn: String,
    token: String,
}

impl IbmClient {
    pub fn connect(config: IbmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::remote(format!("HTTP client setup failed: {e}")))?;
        let token = match config.credential {
            Credential::Bearer(t) => t,
            Credential::ApiKey(key) => exchange_api_key(&client, &key)?,
        };
        Ok(Self {
            client,
            base_url: config.base_url,
            crn: config.crn,
            token,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::connect(IbmConfig::from_env()?)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
            .header("Service-CRN", &self.crn)
            .header("IBM-API-Version", API_VERSION)
            .header("Accept", "application/json")
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .map_err(|e| AppError::remote(format!("IBM Quantum request failed: {e}")))?;
        parse_response(resp, path)
    }

    pub fn list_backends(&self) -> Result<Vec<String>, AppError> {
        let body: BackendsResponse = self.get_json("/backends")?;
        Ok(body.devices)
    }

    pub fn backend_status(&self, name: &str) -> Result<BackendStatus, AppError> {
        self.get_json(&format!("/backends/{name}/status"))
    }

    pub fn backend_configuration(&self, name: &str) -> Result<BackendConfiguration, AppError> {
        self.get_json(&format!("/backends/{name}/configuration"))
    }

    pub fn backend_summary(&self, name: &str) -> Result<BackendSummary, AppError> {
        let status = self.backend_status(name)?;
        let config = self.backend_configuration(name)?;
        Ok(BackendSummary {
            name: name.to_string(),
            num_qubits: config.n_qubits,
            operational: status.is_operational(),
            simulator: config.simulator,
            pending_jobs: status.length_queue,
        })
    }

    /// Summaries of every device; devices whose status cannot be read are skipped.
    pub fn backend_summaries(&self) -> Result<Vec<BackendSummary>, AppError> {
        let names = self.list_backends()?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            match self.backend_summary(&name) {
                Ok(s) => out.push(s),
                Err(e) => tracing::warn!(backend = %name, error = %e, "skipping backend"),
            }
        }
        Ok(out)
    }

    /// Operational, non-simulator devices with at least `min_qubits`, shortest queue first.
    pub fn eligible_backends(&self, min_qubits: usize) -> Result<Vec<BackendSummary>, AppError> {
        Ok(rank_backends(self.backend_summaries()?, min_qubits))
    }

    pub fn least_busy(&self, min_qubits: usize) -> Result<BackendSummary, AppError> {
        self.eligible_backends(min_qubits)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::remote(format!(
                    "No operational backend with at least {min_qubits} qubits."
                ))
            })
    }

    pub fn submit_sampler_job(
        &self,
        backend: &str,
        qasm: Vec<String>,
        shots: u64,
    ) -> Result<String, AppError> {
        let body = JobRequest {
            program_id: "sampler",
            backend: backend.to_string(),
            params: SamplerParams {
                pubs: qasm.into_iter().map(|q| [q]).collect(),
                shots,
                version: 2,
            },
        };
        let url = format!("{}/jobs", self.base_url);
        let resp = self
            .authed(self.client.post(&url))
            .json(&body)
            .send()
            .map_err(|e| AppError::remote(format!("Job submission failed: {e}")))?;
        let created: JobCreated = parse_response(resp, "/jobs")?;
        tracing::info!(job_id = %created.id, backend, "sampler job submitted");
        Ok(created.id)
    }

    pub fn job_status(&self, job_id: &str) -> Result<(JobStatus, Option<String>), AppError> {
        let info: JobInfo = self.get_json(&format!("/jobs/{job_id}"))?;
        let raw = info
            .state
            .as_ref()
            .and_then(|s| s.status.clone())
            .unwrap_or(info.status);
        let status = JobStatus::parse(&raw)
            .ok_or_else(|| AppError::remote(format!("Unknown job status '{raw}' for {job_id}.")))?;
        Ok((status, info.state.and_then(|s| s.reason)))
    }

    /// Poll until the job finishes; errors on failure, cancellation or timeout.
    pub fn wait_for_job(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<(), AppError> {
        let started = Utc::now();
        loop {
            let (status, reason) = self.job_status(job_id)?;
            let elapsed = (Utc::now() - started).to_std().unwrap_or_default();
            tracing::debug!(job_id, ?status, elapsed_s = elapsed.as_secs(), "job status");
            if status == JobStatus::Completed {
                tracing::info!(job_id, elapsed_s = elapsed.as_secs(), "job completed");
                return Ok(());
            }
            if status.is_terminal() {
                return Err(AppError::remote(format!(
                    "Job {job_id} ended as {status:?}: {}",
                    reason.unwrap_or_else(|| "no reason given".to_string())
                )));
            }
            if elapsed >= timeout {
                return Err(AppError::remote(format!(
                    "Job {job_id} still {status:?} after {}s.",
                    timeout.as_secs()
                )));
            }
            thread::sleep(poll_interval);
        }
    }

    pub fn job_results(&self, job_id: &str, num_bits: usize) -> Result<Vec<Counts>, AppError> {
        let body: SamplerResults = self.get_json(&format!("/jobs/{job_id}/results"))?;
        body.results
            .iter()
            .map(|pub_result| {
                let reg = pub_result.data.get(CREG).ok_or_else(|| {
                    AppError::remote(format!("Result has no '{CREG}' register."))
                })?;
                decode_samples(&reg.samples, reg.num_bits.unwrap_or(num_bits))
            })
            .collect()
    }
}

fn exchange_api_key(client: &Client, api_key: &str) -> Result<String, AppError> {
    let resp = client
        .post(IAM_URL)
        .header("Accept", "application/json")
        .form(&[
            ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
            ("apikey", api_key),
        ])
        .send()
        .map_err(|e| AppError::remote(format!("IAM token request failed: {e}")))?;
    let token: IamToken = parse_response(resp, "IAM token")?;
    tracing::debug!(expires_in = ?token.expires_in, "IAM token issued");
    Ok(token.access_token)
}

fn parse_response<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, AppError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(AppError::remote(format!(
            "IBM Quantum request {what} failed with status {status}: {}",
            body.chars().take(300).collect::<String>()
        )));
    }
    resp.json()
        .map_err(|e| AppError::remote(format!("Failed to parse IBM Quantum response for {what}: {e}")))
}

/// Filter to usable devices and sort by queue length (then name, for ties).
pub fn rank_backends(mut backends: Vec<BackendSummary>, min_qubits: usize) -> Vec<BackendSummary> {
    backends.retain(|b| b.operational && !b.simulator && b.num_qubits >= min_qubits);
    backends.sort_by(|a, b| a.pending_jobs.cmp(&b.pending_jobs).then_with(|| a.name.cmp(&b.name)));
    backends
}

/// Turn per-shot hex samples into a bitstring histogram.
pub fn decode_samples(samples: &[String], num_bits: usize) -> Result<Counts, AppError> {
    let mut counts = Counts::new();
    for s in samples {
        let hex = s.trim_start_matches("0x").trim_start_matches("0X");
        let value = u64::from_str_radix(hex, 16)
            .map_err(|e| AppError::remote(format!("Bad sample '{s}': {e}")))?;
        if num_bits < 64 && value >> num_bits != 0 {
            return Err(AppError::remote(format!(
                "Sample '{s}' does not fit in {num_bits} bits."
            )));
        }
        *counts.entry(format!("{value:0num_bits$b}")).or_insert(0) += 1;
    }
    Ok(counts)
}

/// `Sampler` backed by a real device.
pub struct IbmSampler {
    client: IbmClient,
    backend: String,
    target: Target,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl IbmSampler {
    pub fn new(client: IbmClient, backend: &str) -> Result<Self, AppError> {
        let config = client.backend_configuration(backend)?;
        tracing::info!(
            backend,
            qubits = config.n_qubits,
            basis = ?config.basis_gates,
            "backend configuration loaded"
        );
        Ok(Self {
            client,
            backend: backend.to_string(),
            target: Target {
                num_qubits: config.n_qubits,
                coupling_map: config.coupling_map,
            },
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(3600),
        })
    }
}

impl Sampler for IbmSampler {
    fn backend_name(&self) -> &str {
        &self.backend
    }

    fn run(&self, circuits: &[Circuit], shots: u64, _seed: u64) -> Result<SamplerJob, AppError> {
        let Some(first) = circuits.first() else {
            return Err(AppError::config("No circuits to submit."));
        };
        let num_bits = first.num_qubits;

        let mut qasm = Vec::with_capacity(circuits.len());
        let mut transpiled_gates = Vec::with_capacity(circuits.len());
        for c in circuits {
            let t = transpile(c, &self.target)?;
            transpiled_gates.push(t.gate_count());
            qasm.push(to_qasm3_physical(&t));
        }

        let job_id = self.client.submit_sampler_job(&self.backend, qasm, shots)?;
        self.client
            .wait_for_job(&job_id, self.poll_interval, self.timeout)?;
        let counts = self.client.job_results(&job_id, num_bits)?;
        if counts.len() != circuits.len() {
            return Err(AppError::remote(format!(
                "Job {job_id} returned {} results for {} circuits.",
                counts.len(),
                circuits.len()
            )));
        }
        Ok(SamplerJob {
            counts,
            transpiled_gates,
            job_id: Some(job_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, qubits: usize, operational: bool, simulator: bool, pending: u64) -> BackendSummary {
        BackendSummary {
            name: name.into(),
            num_qubits: qubits,
            operational,
            simulator,
            pending_jobs: pending,
        }
    }

    #[test]
    fn hex_samples_decode_to_counts() {
        let samples: Vec<String> = ["0x0", "0x0", "0xf", "0x5"].iter().map(|s| s.to_string()).collect();
        let counts = decode_samples(&samples, 4).unwrap();
        assert_eq!(counts.get("0000"), Some(&2));
        assert_eq!(counts.get("1111"), Some(&1));
        assert_eq!(counts.get("0101"), Some(&1));
    }

    #[test]
    fn oversized_sample_is_rejected() {
        let err = decode_samples(&["0x10".to_string()], 4).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn least_busy_prefers_short_queue_and_skips_unusable() {
        let ranked = rank_backends(
            vec![
                summary("ibm_busy", 133, true, false, 40),
                summary("ibm_down", 156, false, false, 0),
                summary("sim", 32, true, true, 0),
                summary("ibm_small", 2, true, false, 0),
                summary("ibm_torino", 133, true, false, 3),
            ],
            4,
        );
        let names: Vec<&str> = ranked.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["ibm_torino", "ibm_busy"]);
    }
}
