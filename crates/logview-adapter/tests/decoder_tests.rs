/*
[INPUT]:  NDJSON documents split into arbitrary chunk sequences
[OUTPUT]: Test results for the incremental decoder
[POS]:    Integration tests - stream decoding
[UPDATE]: When decoder semantics change
*/

mod common;

use bytes::Bytes;
use common::{collect_records, field, ndjson_fixture};
use futures_util::StreamExt;
use logview_adapter::{ChunkSource, NdjsonDecoder, Record};
use rstest::rstest;

const MIXED_DOC: &str = concat!(
    "{\"_time\":\"1\",\"message\":\"héllo wörld\"}\n",
    "{\"_time\":\"2\",\"message\":\"日本語のログ\",\"nested\":{\"k\":[1,2,3]}}\n",
    "\n",
    "{\"_time\":\"3\",\"message\":\"emoji 🚀 done\"}\n",
);

async fn decode_whole(doc: &str) -> Vec<Record> {
    let mut decoder = NdjsonDecoder::new(ChunkSource::from_chunks(vec![doc.to_string()]));
    collect_records(&mut decoder).await
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(5)]
#[case(7)]
#[case(64)]
#[tokio::test]
async fn test_chunk_boundary_independence(#[case] chunk_size: usize) {
    let expected = decode_whole(MIXED_DOC).await;
    assert_eq!(expected.len(), 3);

    let mut decoder = NdjsonDecoder::new(ChunkSource::split_every(MIXED_DOC, chunk_size));
    let records = collect_records(&mut decoder).await;
    assert_eq!(records, expected);
}

#[tokio::test]
async fn test_split_inside_multibyte_character() {
    let doc = "{\"message\":\"🚀\"}\n";
    let bytes = doc.as_bytes();
    let rocket_start = doc.find('🚀').expect("rocket present");

    // Cut after the first and then the third byte of the 4-byte sequence.
    let chunks = vec![
        Bytes::copy_from_slice(&bytes[..rocket_start + 1]),
        Bytes::copy_from_slice(&bytes[rocket_start + 1..rocket_start + 3]),
        Bytes::copy_from_slice(&bytes[rocket_start + 3..]),
    ];
    let mut decoder = NdjsonDecoder::new(ChunkSource::from_chunks(chunks));
    let records = collect_records(&mut decoder).await;

    assert_eq!(records.len(), 1);
    assert_eq!(field(&records[0], "message"), Some("🚀"));
    assert_eq!(decoder.stats().malformed_lines, 0);
}

#[tokio::test]
async fn test_invalid_line_does_not_affect_neighbours() {
    let doc = "{\"_time\":\"1\",\"m\":\"x\"}\ninvalid\n{\"_time\":\"2\",\"m\":\"y\"}\n";
    let records = decode_whole(doc).await;

    assert_eq!(records.len(), 2);
    assert_eq!(field(&records[0], "m"), Some("x"));
    assert_eq!(field(&records[1], "m"), Some("y"));
}

#[tokio::test]
async fn test_final_line_without_trailing_newline() {
    let mut decoder = NdjsonDecoder::new(ChunkSource::from_chunks(vec![
        "{\"_time\":\"1\",\"message\":\"a\"}\n{\"_time\":\"2\",",
        "\"message\":\"x\"}",
    ]));
    let records = collect_records(&mut decoder).await;

    assert_eq!(records.len(), 2);
    assert_eq!(field(&records[1], "message"), Some("x"));
}

#[tokio::test]
async fn test_malformed_final_line_is_only_a_warning() {
    let mut decoder = NdjsonDecoder::new(ChunkSource::from_chunks(vec!["{\"a\":1}\n{\"a\":"]));
    let records = collect_records(&mut decoder).await;

    assert_eq!(records.len(), 1);
    assert_eq!(decoder.stats().malformed_lines, 1);
}

#[rstest]
#[case::no_chunks(Vec::new())]
#[case::one_empty_chunk(vec![""])]
#[case::whitespace_only(vec!["\n", "   \n\t"])]
#[tokio::test]
async fn test_empty_documents_yield_nothing(#[case] chunks: Vec<&'static str>) {
    let mut decoder = NdjsonDecoder::new(ChunkSource::from_chunks(chunks));
    let records = collect_records(&mut decoder).await;

    assert!(records.is_empty());
    assert_eq!(decoder.stats().malformed_lines, 0);
    assert!(decoder.is_released());
}

#[tokio::test]
async fn test_crlf_line_endings_parse() {
    let records = decode_whole("{\"a\":1}\r\n{\"a\":2}\r\n").await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_decoder_stream_adapter_matches_pull_api() {
    let doc = ndjson_fixture(250);
    let decoder = NdjsonDecoder::new(ChunkSource::split_every(&doc, 97));
    let streamed: Vec<Record> = decoder
        .into_stream()
        .map(|item| item.expect("no fatal error"))
        .collect()
        .await;

    assert_eq!(streamed.len(), 250);
    assert_eq!(field(&streamed[0], "message"), Some("m0"));
    assert_eq!(field(&streamed[249], "message"), Some("m249"));
}

#[tokio::test]
async fn test_key_order_survives_decoding() {
    let records = decode_whole("{\"z\":1,\"_time\":\"5\",\"a\":2}\n").await;
    assert_eq!(records[0].to_compact_json(), "{\"z\":1,\"_time\":\"5\",\"a\":2}");
}
