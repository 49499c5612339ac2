//! Jira issue, comment, attachment and user operations
//!
//! One connector serves Jira Cloud (REST v3 where it differs) and Jira
//! Server (REST v2). The node-level `jiraVersion` field picks the `JiraApi`
//! implementation and the credentials used for the record.

mod attachment;
mod comment;
mod fields;
mod issue;
mod user;
mod version;

pub use version::{CloudApi, JiraApi, Listing, SearchOptions, ServerApi};

use crate::connector::schema::FieldSpec;
use crate::connector::{OutputItem, Params, RequestContext, ServiceOperation};
use crate::error::Result;
use std::fmt;
use std::str::FromStr;

/// Jira deployment flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JiraVersion {
    #[default]
    Cloud,
    Server,
    /// Server with a personal access token
    ServerPat,
}

impl JiraVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            JiraVersion::Cloud => "cloud",
            JiraVersion::Server => "server",
            JiraVersion::ServerPat => "serverPat",
        }
    }

    /// Version selected by the record's `jiraVersion` field; cloud when unset
    pub fn from_params(params: &Params) -> Self {
        params
            .str("jiraVersion")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn api(self) -> &'static dyn JiraApi {
        match self {
            JiraVersion::Cloud => &CloudApi,
            JiraVersion::Server | JiraVersion::ServerPat => &ServerApi,
        }
    }
}

impl fmt::Display for JiraVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JiraVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cloud" => Ok(JiraVersion::Cloud),
            "server" => Ok(JiraVersion::Server),
            "serverPat" => Ok(JiraVersion::ServerPat),
            other => Err(format!("unknown Jira version '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JiraOperation {
    IssueCreate,
    IssueUpdate,
    IssueDelete,
    IssueGet,
    IssueGetAll,
    IssueChangelog,
    IssueNotify,
    IssueTransitions,
    AttachmentAdd,
    AttachmentGet,
    AttachmentGetAll,
    AttachmentRemove,
    CommentAdd,
    CommentGet,
    CommentGetAll,
    CommentRemove,
    CommentUpdate,
    UserCreate,
    UserDelete,
    UserGet,
}

impl ServiceOperation for JiraOperation {
    const ALL: &'static [Self] = &[
        Self::IssueCreate,
        Self::IssueUpdate,
        Self::IssueDelete,
        Self::IssueGet,
        Self::IssueGetAll,
        Self::IssueChangelog,
        Self::IssueNotify,
        Self::IssueTransitions,
        Self::AttachmentAdd,
        Self::AttachmentGet,
        Self::AttachmentGetAll,
        Self::AttachmentRemove,
        Self::CommentAdd,
        Self::CommentGet,
        Self::CommentGetAll,
        Self::CommentRemove,
        Self::CommentUpdate,
        Self::UserCreate,
        Self::UserDelete,
        Self::UserGet,
    ];

    fn resource(self) -> &'static str {
        use JiraOperation::*;
        match self {
            IssueCreate | IssueUpdate | IssueDelete | IssueGet | IssueGetAll | IssueChangelog
            | IssueNotify | IssueTransitions => "issue",
            AttachmentAdd | AttachmentGet | AttachmentGetAll | AttachmentRemove => "issueAttachment",
            CommentAdd | CommentGet | CommentGetAll | CommentRemove | CommentUpdate => "issueComment",
            UserCreate | UserDelete | UserGet => "user",
        }
    }

    fn operation(self) -> &'static str {
        use JiraOperation::*;
        match self {
            IssueCreate | UserCreate => "create",
            IssueUpdate | CommentUpdate => "update",
            IssueDelete | UserDelete => "delete",
            IssueGet | AttachmentGet | CommentGet | UserGet => "get",
            IssueGetAll | AttachmentGetAll | CommentGetAll => "getAll",
            IssueChangelog => "changelog",
            IssueNotify => "notify",
            IssueTransitions => "transitions",
            AttachmentAdd | CommentAdd => "add",
            AttachmentRemove | CommentRemove => "remove",
        }
    }

    fn description(self) -> &'static str {
        use JiraOperation::*;
        match self {
            IssueCreate => "Create an issue",
            IssueUpdate => "Update an issue",
            IssueDelete => "Delete an issue",
            IssueGet => "Get an issue",
            IssueGetAll => "Search issues with JQL",
            IssueChangelog => "Get an issue's changelog",
            IssueNotify => "Send a notification about an issue",
            IssueTransitions => "List the transitions available for an issue",
            AttachmentAdd => "Add an attachment to an issue",
            AttachmentGet => "Get an attachment",
            AttachmentGetAll => "List an issue's attachments",
            AttachmentRemove => "Remove an attachment",
            CommentAdd => "Add a comment to an issue",
            CommentGet => "Get a comment",
            CommentGetAll => "List an issue's comments",
            CommentRemove => "Remove a comment",
            CommentUpdate => "Update a comment",
            UserCreate => "Create a user",
            UserDelete => "Delete a user",
            UserGet => "Get a user",
        }
    }

    fn fields(self) -> Vec<FieldSpec> {
        use JiraOperation::*;
        let specific = match self {
            IssueCreate => fields::issue_create(),
            IssueUpdate => fields::issue_update(),
            IssueDelete => fields::issue_delete(),
            IssueGet => fields::issue_get(),
            IssueGetAll => fields::issue_get_all(),
            IssueChangelog => fields::issue_changelog(),
            IssueNotify => fields::issue_notify(),
            IssueTransitions => fields::issue_transitions(),
            AttachmentAdd => fields::attachment_add(),
            AttachmentGet => fields::attachment_get(),
            AttachmentGetAll => fields::attachment_get_all(),
            AttachmentRemove => fields::attachment_remove(),
            CommentAdd => fields::comment_add(),
            CommentGet => fields::comment_get(),
            CommentGetAll => fields::comment_get_all(),
            CommentRemove => fields::comment_remove(),
            CommentUpdate => fields::comment_update(),
            UserCreate => fields::user_create(),
            UserDelete => fields::user_delete(),
            UserGet => fields::user_get(),
        };
        let mut all = vec![fields::jira_version()];
        all.extend(specific);
        all
    }
}

pub async fn execute(op: JiraOperation, ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    use JiraOperation::*;

    let api = JiraVersion::from_params(ctx.params).api();
    match op {
        IssueCreate => issue::create(ctx, api).await,
        IssueUpdate => issue::update(ctx, api).await,
        IssueDelete => issue::delete(ctx).await,
        IssueGet => issue::get(ctx).await,
        IssueGetAll => issue::get_all(ctx, api).await,
        IssueChangelog => issue::changelog(ctx, api).await,
        IssueNotify => issue::notify(ctx, api).await,
        IssueTransitions => issue::transitions(ctx).await,
        AttachmentAdd => attachment::add(ctx).await,
        AttachmentGet => attachment::get(ctx).await,
        AttachmentGetAll => attachment::get_all(ctx).await,
        AttachmentRemove => attachment::remove(ctx).await,
        CommentAdd => comment::add(ctx, api).await,
        CommentGet => comment::get(ctx, api).await,
        CommentGetAll => comment::get_all(ctx, api).await,
        CommentRemove => comment::remove(ctx, api).await,
        CommentUpdate => comment::update(ctx, api).await,
        UserCreate => user::create(ctx).await,
        UserDelete => user::delete(ctx, api).await,
        UserGet => user::get(ctx, api).await,
    }
}
