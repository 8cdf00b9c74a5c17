//! Execution primitives shared by the workflow runner.
//!
//! - `runner::ApplicationApi` abstracts how each service call is made
//! - `repeat` owns the bounded polling loop
//! - [`decode_reply`] turns a successful reply into a typed payload

use jobapp_api::ApiReply;
use jobapp_util::http::parse_response_json_strict;
use serde::de::DeserializeOwned;

use crate::error::{ResponseDecodeError, body_preview};

pub mod repeat;
pub mod runner;

pub use repeat::{PollOutcome, poll_until_completed};
pub use runner::ApplicationApi;

/// Parse a reply body as JSON and deserialize it into `T`.
///
/// Non-JSON (including empty) bodies and JSON of the wrong shape are both
/// reported as [`ResponseDecodeError`] instead of panicking.
pub fn decode_reply<T: DeserializeOwned>(reply: &ApiReply) -> Result<T, ResponseDecodeError> {
    let value = parse_response_json_strict(&reply.body, Some(reply.status))?;
    serde_json::from_value(value).map_err(|source| ResponseDecodeError::Shape {
        source,
        body_preview: body_preview(&reply.body),
    })
}
