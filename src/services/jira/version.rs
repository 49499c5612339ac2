//! Cloud versus Server API differences
//!
//! Jira Cloud and Jira Server share most of REST v2 but differ in how users
//! are referenced, how rich text is encoded, how issue search pages and
//! where an issue's changelog lives. `JiraApi` captures exactly those
//! differences; everything else is version independent.

use crate::connector::pagination::{fetch_paged, Limit, PageStrategy, ParamLocation};
use crate::connector::path_extractor::extract_list;
use crate::error::Result;
use crate::http::{ApiClient, HttpRequest};
use serde_json::{json, Value};

const SEARCH_PAGE_SIZE: usize = 50;
const CHANGELOG_PAGE_SIZE: usize = 100;

/// A list endpoint: either paged, or returning everything at once
pub enum Listing {
    Paged {
        request: HttpRequest,
        strategy: PageStrategy,
        items_path: &'static str,
    },
    /// Truncated locally after the single fetch
    Single {
        request: HttpRequest,
        items_path: &'static str,
    },
}

impl Listing {
    pub async fn fetch(self, client: &ApiClient, limit: Limit) -> Result<Vec<Value>> {
        match self {
            Listing::Paged {
                request,
                strategy,
                items_path,
            } => fetch_paged(client, request, strategy, items_path, limit).await,
            Listing::Single { request, items_path } => {
                let response = client.json(request).await?;
                let mut items = extract_list(&response, items_path);
                limit.truncate(&mut items);
                Ok(items)
            }
        }
    }
}

/// Issue search options shared by both versions
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub jql: String,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
}

pub trait JiraApi: Send + Sync {
    /// REST version used for comments
    fn comment_api(&self) -> &'static str;

    /// Comment body for plain text
    fn comment_body(&self, text: &str) -> Value;

    /// Reference to a user by the identifier this version understands
    fn user_ref(&self, id: &str) -> Value;

    /// Query parameter identifying a user on the user endpoints
    fn user_param(&self) -> &'static str;

    /// Additional field carrying issue labels
    fn labels_field(&self) -> &'static str;

    fn search(&self, options: &SearchOptions) -> Listing;

    fn changelog(&self, issue_key: &str) -> Listing;
}

pub struct CloudApi;

pub struct ServerApi;

impl JiraApi for CloudApi {
    fn comment_api(&self) -> &'static str {
        "3"
    }

    /// Atlassian Document Format with a single paragraph
    fn comment_body(&self, text: &str) -> Value {
        json!({
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }]
            }]
        })
    }

    fn user_ref(&self, id: &str) -> Value {
        json!({ "accountId": id })
    }

    fn user_param(&self) -> &'static str {
        "accountId"
    }

    fn labels_field(&self) -> &'static str {
        "labels"
    }

    fn search(&self, options: &SearchOptions) -> Listing {
        let fields = if options.fields.is_empty() {
            vec!["*navigable".to_string()]
        } else {
            options.fields.clone()
        };
        let mut body = json!({ "jql": options.jql, "fields": fields });
        if !options.expand.is_empty() {
            body["expand"] = json!(options.expand.join(","));
        }
        Listing::Paged {
            request: HttpRequest::post("/api/3/search/jql").json(body),
            strategy: PageStrategy::Cursor {
                cursor_param: "nextPageToken",
                next_path: "/nextPageToken",
                size_param: "maxResults",
                page_size: SEARCH_PAGE_SIZE,
                location: ParamLocation::Body,
                last_path: Some("/isLast"),
            },
            items_path: "/issues",
        }
    }

    fn changelog(&self, issue_key: &str) -> Listing {
        Listing::Paged {
            request: HttpRequest::get(format!("/api/2/issue/{}/changelog", issue_key)),
            strategy: PageStrategy::Offset {
                offset_param: "startAt",
                size_param: "maxResults",
                page_size: CHANGELOG_PAGE_SIZE,
                location: ParamLocation::Query,
                total_path: Some("/total"),
            },
            items_path: "/values",
        }
    }
}

impl JiraApi for ServerApi {
    fn comment_api(&self) -> &'static str {
        "2"
    }

    fn comment_body(&self, text: &str) -> Value {
        json!(text)
    }

    fn user_ref(&self, id: &str) -> Value {
        json!({ "name": id })
    }

    fn user_param(&self) -> &'static str {
        "username"
    }

    fn labels_field(&self) -> &'static str {
        "serverLabels"
    }

    fn search(&self, options: &SearchOptions) -> Listing {
        let mut body = json!({ "jql": options.jql });
        if !options.fields.is_empty() {
            body["fields"] = json!(options.fields);
        }
        if !options.expand.is_empty() {
            body["expand"] = json!(options.expand);
        }
        Listing::Paged {
            request: HttpRequest::post("/api/2/search").json(body),
            strategy: PageStrategy::Offset {
                offset_param: "startAt",
                size_param: "maxResults",
                page_size: SEARCH_PAGE_SIZE,
                location: ParamLocation::Body,
                total_path: Some("/total"),
            },
            items_path: "/issues",
        }
    }

    fn changelog(&self, issue_key: &str) -> Listing {
        Listing::Single {
            request: HttpRequest::get(format!("/api/2/issue/{}", issue_key)).query("expand", "changelog"),
            items_path: "/changelog/histories",
        }
    }
}
