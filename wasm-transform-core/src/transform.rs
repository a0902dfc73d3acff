//! The transform pipeline
//!
//! One call walks `Start → Fetched → Decoded → Mutated → Encoded → Sent → Done`.
//! Fetching, decoding and submitting can fail; any failure ends the call with
//! `0` and nothing half-mutated is ever handed to the host.
//!
//! The return value is lossy. `0` never says which step failed, and `1` is
//! returned even when the request had no headers to touch; [`Mutation`] keeps
//! that distinction for Rust callers only.

use crate::abi::{APPLY, DISCARD};
use crate::config::TransformConfig;
use crate::env::Environment;
use crate::error::Result;
use crate::request::RequestDocument;
use std::fmt;
use tracing::{debug, warn};

/// The request-descriptor exchange with the host
pub trait HostAbi {
    /// Copy the current request descriptor out of the host
    fn fetch_request(&mut self) -> Result<Vec<u8>>;

    /// Hand a new request descriptor to the host
    fn submit_request(&mut self, json: &[u8]) -> Result<()>;
}

impl<H: HostAbi + ?Sized> HostAbi for &mut H {
    fn fetch_request(&mut self) -> Result<Vec<u8>> {
        (**self).fetch_request()
    }

    fn submit_request(&mut self, json: &[u8]) -> Result<()> {
        (**self).submit_request(json)
    }
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing done yet
    Start,
    /// Descriptor bytes copied out of the host
    Fetched,
    /// Descriptor parsed
    Decoded,
    /// Headers updated
    Mutated,
    /// Descriptor serialized
    Encoded,
    /// Descriptor accepted by the host
    Sent,
    /// Finished
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Fetched => "fetched",
            Stage::Decoded => "decoded",
            Stage::Mutated => "mutated",
            Stage::Encoded => "encoded",
            Stage::Sent => "sent",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a successful call did to the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// Whether a headers object was found and updated
    pub headers_present: bool,
}

/// Runs the pipeline with a given configuration
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    /// Create a transformer
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Run one call against the host
    pub fn run<H, E>(&self, host: &mut H, env: &E) -> Result<Mutation>
    where
        H: HostAbi + ?Sized,
        E: Environment + ?Sized,
    {
        let mut stage = Stage::Start;
        let result = self.run_stages(host, env, &mut stage);
        match &result {
            Ok(_) => debug!(stage = %stage, "transform complete"),
            Err(err) => warn!(stage = %stage, kind = ?err.kind(), "transform failed: {}", err),
        }
        result
    }

    fn run_stages<H, E>(&self, host: &mut H, env: &E, stage: &mut Stage) -> Result<Mutation>
    where
        H: HostAbi + ?Sized,
        E: Environment + ?Sized,
    {
        self.config.validate()?;

        let bytes = host.fetch_request()?;
        *stage = Stage::Fetched;

        let mut request = RequestDocument::decode(&bytes)?;
        drop(bytes);
        *stage = Stage::Decoded;

        let headers_present = self.mutate(&mut request, env);
        *stage = Stage::Mutated;

        let encoded = request.encode();
        *stage = Stage::Encoded;

        host.submit_request(&encoded)?;
        *stage = Stage::Sent;
        debug!(bytes = encoded.len(), "request descriptor accepted by host");

        *stage = Stage::Done;
        Ok(Mutation { headers_present })
    }

    /// Update the headers of a decoded request
    ///
    /// Sets the marker header and, when the secret key is configured in `env`,
    /// the secret header. Returns `false` without touching the request when it
    /// has no headers object. Applying it twice gives the same result.
    pub fn mutate<E>(&self, request: &mut RequestDocument, env: &E) -> bool
    where
        E: Environment + ?Sized,
    {
        let config = &self.config;
        let Some(mut headers) = request.get_child(&config.headers_field) else {
            debug!("request has no {} object, leaving it unchanged", config.headers_field);
            return false;
        };

        debug!(
            "setting {}[{}] = {}",
            config.headers_field, config.marker_header, config.marker_value
        );
        headers.set_field(&config.marker_header, config.marker_value.as_str());

        if env.has(&config.secret_env_key) {
            if let Some(secret) = env.get(&config.secret_env_key) {
                debug!(
                    "setting {}[{}] = <redacted>",
                    config.headers_field, config.secret_header
                );
                headers.set_field(&config.secret_header, secret);
            }
        }

        true
    }
}

/// Value returned from the `transform` export for a pipeline result
pub fn return_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => APPLY,
        Err(_) => DISCARD,
    }
}
