//! Integration tests for the transform pipeline
//!
//! These tests drive a full call through an in-memory host that behaves like
//! the gateway: it serves one request descriptor and records what the guest
//! hands back.

use proptest::prelude::*;
use serde_json::{json, Value};
use tracing_test::traced_test;
use wasm_transform_core::prelude::*;

/// In-memory host
struct MockHost {
    request: Vec<u8>,
    fetch_status: Status,
    submit_status: Status,
    submitted: Vec<Vec<u8>>,
}

impl MockHost {
    fn new(request: impl Into<Vec<u8>>) -> Self {
        Self {
            request: request.into(),
            fetch_status: Status::Ok,
            submit_status: Status::Ok,
            submitted: Vec::new(),
        }
    }

    fn fetch_fails(mut self, status: Status) -> Self {
        self.fetch_status = status;
        self
    }

    fn submit_fails(mut self, status: Status) -> Self {
        self.submit_status = status;
        self
    }

    fn last_submitted(&self) -> Value {
        let bytes = self.submitted.last().expect("nothing submitted");
        serde_json::from_slice(bytes).expect("submitted invalid JSON")
    }
}

impl HostAbi for MockHost {
    fn fetch_request(&mut self) -> Result<Vec<u8>> {
        if !self.fetch_status.is_ok() {
            return Err(Error::Fetch(self.fetch_status));
        }
        Ok(self.request.clone())
    }

    fn submit_request(&mut self, json: &[u8]) -> Result<()> {
        self.submitted.push(json.to_vec());
        if !self.submit_status.is_ok() {
            return Err(Error::Reject(self.submit_status));
        }
        Ok(())
    }
}

fn transform(host: &mut MockHost, env: &MapEnv) -> i32 {
    return_code(&Transformer::default().run(host, env))
}

/// Test the basic header scenario without a secret
#[test]
fn test_adds_marker_header() {
    let mut host = MockHost::new(r#"{"headers":{"foo":"bar"}}"#);
    assert_eq!(transform(&mut host, &MapEnv::new()), APPLY);
    assert_eq!(
        host.last_submitted(),
        json!({"headers": {"foo": "bar", "x-wasm-transform": "true"}})
    );
}

/// Test that a configured secret is copied into the headers
#[test]
fn test_adds_secret_header() {
    let mut host = MockHost::new(r#"{"headers":{"foo":"bar"}}"#);
    let env = MapEnv::new().with("secret", "shh");
    assert_eq!(transform(&mut host, &env), APPLY);
    assert_eq!(
        host.last_submitted(),
        json!({"headers": {"foo": "bar", "x-wasm-transform": "true", "x-wasm-secret": "shh"}})
    );
}

/// Test that opaque fields pass through unchanged
#[test]
fn test_preserves_payload() {
    let input = r#"{"method":"PUT","headers":{"foo":"bar"},"payload":"{\"key\":\"value\"}"}"#;
    let mut host = MockHost::new(input);
    assert_eq!(transform(&mut host, &MapEnv::new()), APPLY);

    let output = host.last_submitted();
    assert_eq!(output["payload"], json!(r#"{"key":"value"}"#));
    assert_eq!(output["method"], json!("PUT"));

    let text = String::from_utf8(host.submitted[0].clone()).unwrap();
    assert!(text.contains(r#""payload":"{\"key\":\"value\"}""#));
}

/// Test the full descriptor the gateway sends
#[test]
fn test_gateway_descriptor() {
    let input = r#"{"url":"https://example.com","method":"GET","headers":{},"payload":""}"#;
    let mut host = MockHost::new(input);
    assert_eq!(transform(&mut host, &MapEnv::new()), APPLY);
    assert_eq!(
        host.last_submitted(),
        json!({
            "url": "https://example.com",
            "method": "GET",
            "headers": {"x-wasm-transform": "true"},
            "payload": ""
        })
    );
}

/// Test that a request without headers is passed back as-is
#[test]
fn test_missing_headers_is_not_a_failure() {
    let input = r#"{"url":"https://example.com","method":"POST"}"#;
    let mut host = MockHost::new(input);
    let env = MapEnv::new().with("secret", "shh");
    assert_eq!(transform(&mut host, &env), APPLY);
    assert_eq!(host.last_submitted(), serde_json::from_str::<Value>(input).unwrap());
}

/// Test that a fetch failure never reaches the host setter
#[test]
fn test_fetch_failure() {
    let mut host = MockHost::new("{}").fetch_fails(Status::InternalFailure);
    assert_eq!(transform(&mut host, &MapEnv::new()), DISCARD);
    assert!(host.submitted.is_empty());

    let err = Transformer::default().run(&mut host, &MapEnv::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

/// Test that malformed JSON fails closed
#[test]
fn test_malformed_json() {
    for input in ["{not json", "", "{\"headers\":", "\u{feff}{}"] {
        let mut host = MockHost::new(input);
        assert_eq!(transform(&mut host, &MapEnv::new()), DISCARD, "input {:?}", input);
        assert!(host.submitted.is_empty());
    }

    let mut host = MockHost::new(vec![b'{', 0xff, b'}']);
    let err = Transformer::default().run(&mut host, &MapEnv::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

/// Test that a rejected submission returns zero
#[test]
fn test_rejected_submission() {
    let mut host = MockHost::new(r#"{"headers":{}}"#).submit_fails(Status::InvalidJson);
    assert_eq!(transform(&mut host, &MapEnv::new()), DISCARD);
    assert_eq!(host.submitted.len(), 1);

    let err = Transformer::default().run(&mut host, &MapEnv::new()).unwrap_err();
    assert!(matches!(err, Error::Reject(Status::InvalidJson)));
}

/// Test that numbers outside the native ranges are carried through as written
#[test]
fn test_preserves_numbers_verbatim() {
    let input = r#"{"id":123456789012345678901234567890,"ratio":1e400,"price":1.50,"headers":{}}"#;
    let mut host = MockHost::new(input);
    assert_eq!(transform(&mut host, &MapEnv::new()), APPLY);

    let text = String::from_utf8(host.submitted[0].clone()).unwrap();
    assert!(text.contains(r#""id":123456789012345678901234567890"#), "{}", text);
    assert!(text.contains(r#""ratio":1e400"#), "{}", text);
    assert!(text.contains(r#""price":1.50"#), "{}", text);
    assert!(text.contains(r#""x-wasm-transform":"true""#), "{}", text);
}

/// Test that non-object headers are treated as absent
#[test]
fn test_non_object_headers() {
    let mut host = MockHost::new(r#"{"headers":null}"#);
    let result = Transformer::default().run(&mut host, &MapEnv::new());
    assert_eq!(result.unwrap(), Mutation { headers_present: false });
    assert_eq!(host.last_submitted(), json!({"headers": null}));
}

/// Test that calls do not influence each other
#[test]
fn test_calls_are_independent() {
    let transformer = Transformer::default();
    let env = MapEnv::new().with("secret", "shh");

    let mut first = MockHost::new(r#"{"headers":{"a":"1"}}"#);
    transformer.run(&mut first, &env).unwrap();

    let mut second = MockHost::new(r#"{"headers":{"b":"2"}}"#);
    transformer.run(&mut second, &MapEnv::new()).unwrap();

    assert_eq!(
        second.last_submitted(),
        json!({"headers": {"b": "2", "x-wasm-transform": "true"}})
    );
}

#[traced_test]
#[test]
fn test_logs_mutations_without_secret_value() {
    let mut host = MockHost::new(r#"{"headers":{}}"#);
    let env = MapEnv::new().with("secret", "hunter2");
    assert_eq!(transform(&mut host, &env), APPLY);

    assert!(logs_contain("setting headers[x-wasm-transform] = true"));
    assert!(logs_contain("setting headers[x-wasm-secret] = <redacted>"));
    assert!(!logs_contain("hunter2"));
}

#[traced_test]
#[test]
fn test_logs_failure_stage() {
    let mut host = MockHost::new("{not json");
    assert_eq!(transform(&mut host, &MapEnv::new()), DISCARD);
    assert!(logs_contain("transform failed"));
    assert!(logs_contain("stage=fetched"));
}

fn header_map() -> impl Strategy<Value = serde_json::Map<String, Value>> {
    prop::collection::btree_map("[a-zA-Z-]{1,12}", "[ -~]{0,16}", 0..8)
        .prop_map(|headers| {
            headers
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        })
}

/// Any well-formed JSON number lexeme, including ones no native type can hold
fn number_lexeme() -> impl Strategy<Value = String> {
    "-?(0|[1-9][0-9]{0,40})(\\.[0-9]{1,12})?([eE][+-]?[0-9]{1,4})?"
}

proptest! {
    #[test]
    fn prop_mutation_is_idempotent(headers in header_map(), secret in proptest::option::of("[a-z0-9]{0,8}")) {
        let transformer = Transformer::default();
        let env = match &secret {
            Some(secret) => MapEnv::new().with("secret", secret.clone()),
            None => MapEnv::new(),
        };
        let mut once = RequestDocument::from(json!({"headers": Value::Object(headers)}));
        transformer.mutate(&mut once, &env);
        let mut twice = once.clone();
        transformer.mutate(&mut twice, &env);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_encode_decode_round_trip(
        headers in header_map(),
        url in "[ -~]{0,24}",
        payload in "\\PC{0,24}",
        count in any::<i64>(),
        weight in any::<f64>(),
        id in number_lexeme()
    ) {
        let id: Value = serde_json::from_str(&id).unwrap();
        let doc = RequestDocument::from(json!({
            "url": url,
            "headers": Value::Object(headers),
            "payload": payload,
            "count": count,
            "weight": weight,
            "id": id,
        }));
        let decoded = RequestDocument::decode(&doc.encode()).unwrap();
        prop_assert_eq!(decoded, doc);
    }

    #[test]
    fn prop_number_lexemes_pass_through(id in number_lexeme()) {
        let input = format!(r#"{{"id":{},"headers":{{}}}}"#, id);
        let mut host = MockHost::new(input);
        prop_assert_eq!(transform(&mut host, &MapEnv::new()), APPLY);

        let text = String::from_utf8(host.submitted[0].clone()).unwrap();
        let expected = format!(r#""id":{}"#, id);
        prop_assert!(text.contains(&expected), "{} not in {}", expected, text);
    }
}
