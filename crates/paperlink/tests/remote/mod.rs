//! Tests that talk to a mock arXiv, PDF host, or model over HTTP.

use super::*;

mod feed;
mod pdf;
mod pipeline;
