//! Reader for the whitespace-separated dataset format:
//!
//! ```text
//! V E R C X
//! size_0 .. size_{V-1}
//! E blocks of: origin_latency K, then K lines of: cache_id latency
//! R lines of: item_id endpoint_id request_count
//! ```

use crate::instance::{
    CacheId, Endpoint, EndpointId, InstanceError, Item, ItemId, ProblemInstance, Request,
};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("Invalid number '{token}' for {expected} at line {line}")]
    InvalidNumber {
        token: String,
        expected: &'static str,
        line: usize,
    },
    #[error("Unexpected trailing input '{token}' at line {line}")]
    TrailingInput { token: String, line: usize },
    #[error("Invalid instance: {0}")]
    Instance(#[from] InstanceError),
}

/// Token scanner keeping 1-based line numbers for diagnostics
struct Scanner<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    words: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            words: "".split_whitespace(),
            line: 0,
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        loop {
            if let Some(word) = self.words.next() {
                return Some(word);
            }
            let (index, line) = self.lines.next()?;
            self.line = index + 1;
            self.words = line.split_whitespace();
        }
    }

    fn next_u64(&mut self, expected: &'static str) -> Result<u64, ReadError> {
        let token = self
            .next_token()
            .ok_or(ReadError::UnexpectedEof { expected })?;
        token.parse().map_err(|_| ReadError::InvalidNumber {
            token: token.to_string(),
            expected,
            line: self.line,
        })
    }

    fn next_usize(&mut self, expected: &'static str) -> Result<usize, ReadError> {
        let value = self.next_u64(expected)?;
        usize::try_from(value).map_err(|_| ReadError::InvalidNumber {
            token: value.to_string(),
            expected,
            line: self.line,
        })
    }
}

/// Parses a dataset held in memory
pub fn parse_instance(source: &str) -> Result<ProblemInstance, ReadError> {
    let mut scanner = Scanner::new(source);

    let num_items = scanner.next_usize("item count")?;
    let num_endpoints = scanner.next_usize("endpoint count")?;
    let num_requests = scanner.next_usize("request count")?;
    let num_caches = scanner.next_usize("cache count")?;
    let capacity = scanner.next_u64("cache capacity")?;

    let mut items = Vec::new();
    for _ in 0..num_items {
        items.push(Item {
            size: scanner.next_u64("item size")?,
        });
    }

    let mut endpoints = Vec::new();
    for _ in 0..num_endpoints {
        let mut endpoint = Endpoint::new(scanner.next_u64("origin latency")?);
        let connections = scanner.next_usize("connected cache count")?;
        for _ in 0..connections {
            let cache = CacheId(scanner.next_usize("cache id")?);
            let latency = scanner.next_u64("cache latency")?;
            // Repeated connections keep the last latency
            endpoint.cache_latencies.insert(cache, latency);
        }
        endpoints.push(endpoint);
    }

    let mut requests = Vec::new();
    for _ in 0..num_requests {
        let item = ItemId(scanner.next_usize("request item id")?);
        let endpoint = EndpointId(scanner.next_usize("request endpoint id")?);
        let weight = scanner.next_u64("request count")?;
        requests.push(Request {
            item,
            endpoint,
            weight,
        });
    }

    if let Some(token) = scanner.next_token() {
        return Err(ReadError::TrailingInput {
            token: token.to_string(),
            line: scanner.line,
        });
    }

    let caches = ProblemInstance::uniform_caches(num_caches, capacity);
    Ok(ProblemInstance::new(items, caches, endpoints, requests)?)
}

/// Reads and parses a dataset file
pub fn read_instance(path: impl AsRef<Path>) -> Result<ProblemInstance, ReadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading dataset");
    let source = std::fs::read_to_string(path)?;
    let instance = parse_instance(&source)?;
    info!(
        items = instance.num_items(),
        endpoints = instance.num_endpoints(),
        requests = instance.num_requests(),
        caches = instance.num_caches(),
        "dataset loaded"
    );
    Ok(instance)
}
