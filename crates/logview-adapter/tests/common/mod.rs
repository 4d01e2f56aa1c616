/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, NDJSON fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for logview-adapter tests

use logview_adapter::{ByteSource, NdjsonDecoder, Record};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// NDJSON document with `count` records shaped like the production feed
#[allow(dead_code)]
pub fn ndjson_fixture(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        out.push_str(&format!(
            "{{\"_time\":\"{}\",\"cid\":\"api\",\"message\":\"m{}\"}}\n",
            1_724_323_612_592_u64 + i as u64,
            i
        ));
    }
    out
}

/// Drain a decoder, panicking on a fatal error
pub async fn collect_records<S: ByteSource>(decoder: &mut NdjsonDecoder<S>) -> Vec<Record> {
    let mut records = Vec::new();
    while let Some(record) = decoder
        .next_record()
        .await
        .expect("decoder should not fail")
    {
        records.push(record);
    }
    records
}

/// Field value of a record as a string slice
#[allow(dead_code)]
pub fn field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(|value| value.as_str())
}
