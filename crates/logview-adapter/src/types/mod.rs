/*
[INPUT]:  Parsed NDJSON values
[OUTPUT]: Record data model shared by decoder and viewer
[POS]:    Types layer - data model
[UPDATE]: When adding new shared data types
*/

pub mod record;

pub use record::{Record, TIME_KEY};
