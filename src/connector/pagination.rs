//! Pagination helper
//!
//! Re-issues a list request until the server has nothing more or the
//! caller's limit is reached. Three continuation styles are supported:
//! absolute offsets, page indexes and opaque cursors.

use super::path_extractor::{extract_by_path, extract_list};
use crate::error::Result;
use crate::http::{ApiClient, HttpRequest};
use serde_json::{json, Value};
use tracing::debug;

/// How many records the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    All,
    Max(usize),
}

impl Limit {
    /// Records still wanted after `have` were collected
    pub fn remaining(self, have: usize) -> Option<usize> {
        match self {
            Limit::All => None,
            Limit::Max(n) => Some(n.saturating_sub(have)),
        }
    }

    pub fn truncate(self, items: &mut Vec<Value>) {
        if let Limit::Max(n) = self {
            items.truncate(n);
        }
    }
}

/// Where continuation parameters are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Query,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// `offset_param` counts records already returned
    Offset {
        offset_param: &'static str,
        size_param: &'static str,
        page_size: usize,
        location: ParamLocation,
        /// Path of the server-reported total, when the API has one
        total_path: Option<&'static str>,
    },
    /// `page_param` counts pages; the page size must not change between pages
    Page {
        page_param: &'static str,
        size_param: &'static str,
        page_size: usize,
    },
    /// Server hands back an opaque token for the next page
    Cursor {
        cursor_param: &'static str,
        next_path: &'static str,
        size_param: &'static str,
        page_size: usize,
        location: ParamLocation,
        /// Path of a boolean "this was the last page" flag
        last_path: Option<&'static str>,
    },
}

fn set_param(request: &mut HttpRequest, location: ParamLocation, name: &str, value: Value) {
    match location {
        ParamLocation::Query => request.set_query(name, super::path_extractor::value_to_string(&value)),
        ParamLocation::Body => {
            if let Value::Object(map) = request.json_body_mut() {
                map.insert(name.to_string(), value);
            }
        }
    }
}

/// Fetch records across pages
///
/// # Arguments
/// * `client` - Client for the target service
/// * `request` - Base request; continuation parameters are added per page
/// * `strategy` - Continuation style of the endpoint
/// * `items_path` - Where the records sit in each response
/// * `limit` - `Limit::All` or a cap; the last page is truncated to the cap
pub async fn fetch_paged(
    client: &ApiClient,
    request: HttpRequest,
    strategy: PageStrategy,
    items_path: &str,
    limit: Limit,
) -> Result<Vec<Value>> {
    let mut results: Vec<Value> = Vec::new();
    let mut offset = 0usize;
    let mut page = 0usize;
    let mut cursor: Option<String> = None;

    loop {
        if limit.remaining(results.len()) == Some(0) {
            break;
        }

        let mut page_request = request.clone();
        let requested = match strategy {
            PageStrategy::Offset {
                offset_param,
                size_param,
                page_size,
                location,
                ..
            } => {
                let size = limit
                    .remaining(results.len())
                    .map_or(page_size, |r| r.min(page_size));
                set_param(&mut page_request, location, offset_param, json!(offset));
                set_param(&mut page_request, location, size_param, json!(size));
                size
            }
            PageStrategy::Page {
                page_param,
                size_param,
                page_size,
            } => {
                let size = match limit {
                    Limit::Max(n) => n.min(page_size),
                    Limit::All => page_size,
                };
                page_request.set_query(page_param, page);
                page_request.set_query(size_param, size);
                size
            }
            PageStrategy::Cursor {
                cursor_param,
                size_param,
                page_size,
                location,
                ..
            } => {
                let size = limit
                    .remaining(results.len())
                    .map_or(page_size, |r| r.min(page_size));
                if let Some(token) = &cursor {
                    set_param(&mut page_request, location, cursor_param, json!(token));
                }
                set_param(&mut page_request, location, size_param, json!(size));
                size
            }
        };

        let response = client.json(page_request).await?;
        let items = extract_list(&response, items_path);
        let fetched = items.len();
        results.extend(items);
        debug!(
            "Fetched page with {} records ({} collected)",
            fetched,
            results.len()
        );

        if fetched == 0 {
            break;
        }

        match strategy {
            PageStrategy::Offset { total_path, .. } => {
                offset += fetched;
                // A reported total wins over page length; servers may cap page sizes
                let total = total_path.and_then(|p| extract_by_path(&response, p).as_u64());
                let done = match total {
                    Some(t) => offset as u64 >= t,
                    None => fetched < requested,
                };
                if done {
                    break;
                }
            }
            PageStrategy::Page { .. } => {
                page += 1;
                if fetched < requested {
                    break;
                }
            }
            PageStrategy::Cursor {
                next_path,
                last_path,
                ..
            } => {
                let is_last = last_path
                    .map(|p| extract_by_path(&response, p).as_bool() == Some(true))
                    .unwrap_or(false);
                let next = extract_by_path(&response, next_path)
                    .as_str()
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string());
                match next {
                    Some(token) if !is_last && cursor.as_deref() != Some(token.as_str()) => {
                        cursor = Some(token);
                    }
                    _ => break,
                }
            }
        }
    }

    limit.truncate(&mut results);
    Ok(results)
}
