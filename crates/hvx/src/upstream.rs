//! 📡 Upstream API access — one HTTP GET per (region, dataset) pair, plus
//! the XML payload parsing that turns a response into a [`Fetched`] outcome.

mod client;
mod response;

pub(crate) use client::UpstreamClient;

use crate::common::Record;

/// 📬 Outcome of a well-formed, accepted upstream response.
///
/// `Empty` is a success at the transport and status level that simply
/// carried no `<item>` — the API picked up the phone and had nothing to
/// say. The collector tallies it as a failed unit of work, with its own
/// line in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Item(Record),
    Empty,
}
