//! Jira field schemas

use crate::connector::schema::{return_all_and_limit, FieldSpec};

pub fn jira_version() -> FieldSpec {
    FieldSpec::options(
        "jiraVersion",
        "Jira Version",
        &[
            ("Cloud", "cloud"),
            ("Server (Self Hosted)", "server"),
            ("Server Pat (Self Hosted)", "serverPat"),
        ],
    )
    .default_str("cloud")
}

fn issue_key() -> FieldSpec {
    FieldSpec::string("issueKey", "Issue Key").required()
}

fn json_parameters() -> FieldSpec {
    FieldSpec::boolean("jsonParameters", "JSON Parameters")
        .describe("Whether to send raw JSON instead of the fields below")
}

fn custom_fields() -> FieldSpec {
    FieldSpec::fixed_collection(
        "customFieldsUi",
        "Custom Fields",
        vec![FieldSpec::collection(
            "customFieldsValues",
            "Custom Field",
            vec![
                FieldSpec::string("fieldId", "Field ID").required(),
                FieldSpec::string("fieldValue", "Field Value"),
            ],
        )
        .multiple()],
    )
}

/// Issue fields shared by create (additional fields) and update
fn issue_common() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("assignee", "Assignee")
            .describe("Account ID on cloud, username on server"),
        FieldSpec::string("componentIds", "Component IDs")
            .describe("Comma-separated component IDs"),
        custom_fields(),
        FieldSpec::string("description", "Description"),
        FieldSpec::multi_options("labels", "Labels", &[])
            .describe("Labels, used on cloud"),
        FieldSpec::string("serverLabels", "Labels (Server)")
            .describe("Comma-separated labels, used on server"),
        FieldSpec::string("parentIssueKey", "Parent Issue Key")
            .describe("Required when the issue type is a sub-task"),
        FieldSpec::string("priority", "Priority ID"),
        FieldSpec::string("reporter", "Reporter"),
        FieldSpec::boolean("updateHistory", "Update History")
            .describe("Whether the project is added to the user's recently viewed list"),
    ]
}

pub fn issue_create() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("project", "Project ID").required(),
        FieldSpec::string("issueType", "Issue Type ID").required(),
        FieldSpec::string("summary", "Summary").required(),
        FieldSpec::collection("additionalFields", "Additional Fields", issue_common()),
    ]
}

pub fn issue_update() -> Vec<FieldSpec> {
    let mut update = issue_common();
    update.extend([
        FieldSpec::string("issueType", "Issue Type ID"),
        FieldSpec::string("summary", "Summary"),
        FieldSpec::string("statusId", "Status ID")
            .describe("Transition to apply before updating the fields"),
    ]);
    vec![
        issue_key(),
        FieldSpec::collection("updateFields", "Update Fields", update),
    ]
}

pub fn issue_delete() -> Vec<FieldSpec> {
    vec![
        issue_key(),
        FieldSpec::boolean("deleteSubtasks", "Delete Subtasks"),
    ]
}

pub fn issue_get() -> Vec<FieldSpec> {
    vec![
        issue_key(),
        FieldSpec::boolean("simplifyOutput", "Simplify")
            .describe("Whether to replace custom field IDs with their names"),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::string("expand", "Expand"),
                FieldSpec::string("fields", "Fields"),
                FieldSpec::boolean("fieldsByKeys", "Fields by Key"),
                FieldSpec::string("properties", "Properties"),
                FieldSpec::boolean("updateHistory", "Update History"),
            ],
        ),
    ]
}

pub fn issue_get_all() -> Vec<FieldSpec> {
    let mut fields = return_all_and_limit(50.0, None);
    fields.push(FieldSpec::collection(
        "options",
        "Options",
        vec![
            FieldSpec::string("jql", "JQL"),
            FieldSpec::string("fields", "Fields")
                .describe("Comma-separated fields to return; '*all' for everything"),
            FieldSpec::string("expand", "Expand")
                .describe("Comma-separated entities to expand, e.g. names,changelog"),
        ],
    ));
    fields
}

pub fn issue_changelog() -> Vec<FieldSpec> {
    let mut fields = vec![issue_key()];
    fields.extend(return_all_and_limit(50.0, None));
    fields
}

pub fn issue_notify() -> Vec<FieldSpec> {
    vec![
        issue_key(),
        json_parameters(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::string("htmlBody", "HTML Body"),
                FieldSpec::string("subject", "Subject"),
                FieldSpec::string("textBody", "Text Body"),
            ],
        ),
        FieldSpec::collection(
            "notificationRecipientsUi",
            "Notification Recipients",
            vec![
                FieldSpec::boolean("assignee", "Assignee"),
                FieldSpec::string("groups", "Groups").describe("Comma-separated group names"),
                FieldSpec::boolean("reporter", "Reporter"),
                FieldSpec::string("users", "Users")
                    .describe("Comma-separated account IDs on cloud, usernames on server"),
                FieldSpec::boolean("voters", "Voters"),
                FieldSpec::boolean("watchers", "Watchers"),
            ],
        )
        .show_when_bool("jsonParameters", false),
        FieldSpec::json("notificationRecipientsJson", "Notification Recipients")
            .show_when_bool("jsonParameters", true),
        FieldSpec::collection(
            "notificationRecipientsRestrictionsUi",
            "Notification Recipients Restrictions",
            vec![
                FieldSpec::string("groups", "Groups").describe("Comma-separated group names"),
                FieldSpec::string("permissions", "Permissions")
                    .describe("Comma-separated permission keys"),
            ],
        )
        .show_when_bool("jsonParameters", false),
        FieldSpec::json(
            "notificationRecipientsRestrictionsJson",
            "Notification Recipients Restrictions",
        )
        .show_when_bool("jsonParameters", true),
    ]
}

pub fn issue_transitions() -> Vec<FieldSpec> {
    vec![
        issue_key(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::string("expand", "Expand"),
                FieldSpec::boolean("skipRemoteOnlyCondition", "Skip Remote Only Condition"),
                FieldSpec::string("transitionId", "Transition ID"),
            ],
        ),
    ]
}

fn binary_property(show_on_download: bool) -> FieldSpec {
    let field = FieldSpec::string("binaryPropertyName", "Binary Property")
        .required()
        .default_str("data");
    if show_on_download {
        field
            .show_when_bool("download", true)
            .describe("Output property the downloaded file is stored under")
    } else {
        field.describe("Input property holding the file to upload")
    }
}

fn download() -> FieldSpec {
    FieldSpec::boolean("download", "Download")
        .describe("Whether to download the attachment content")
}

pub fn attachment_add() -> Vec<FieldSpec> {
    vec![issue_key(), binary_property(false)]
}

pub fn attachment_get() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("attachmentId", "Attachment ID").required(),
        download(),
        binary_property(true),
    ]
}

pub fn attachment_get_all() -> Vec<FieldSpec> {
    let mut fields = vec![issue_key()];
    fields.extend(return_all_and_limit(50.0, None));
    fields.push(download());
    fields.push(binary_property(true));
    fields
}

pub fn attachment_remove() -> Vec<FieldSpec> {
    vec![FieldSpec::string("attachmentId", "Attachment ID").required()]
}

fn comment_id() -> FieldSpec {
    FieldSpec::string("commentId", "Comment ID").required()
}

fn comment_body() -> Vec<FieldSpec> {
    vec![
        json_parameters(),
        FieldSpec::string("comment", "Comment")
            .required()
            .show_when_bool("jsonParameters", false),
        FieldSpec::json("commentJson", "Document Format (JSON)")
            .required()
            .show_when_bool("jsonParameters", true)
            .describe("Comment body as raw JSON, sent verbatim"),
    ]
}

fn expand_option() -> FieldSpec {
    FieldSpec::collection(
        "options",
        "Options",
        vec![FieldSpec::string("expand", "Expand")
            .describe("Use 'renderedBody' to return the comment body rendered in HTML")],
    )
}

pub fn comment_add() -> Vec<FieldSpec> {
    let mut fields = vec![issue_key()];
    fields.extend(comment_body());
    fields.push(expand_option());
    fields
}

pub fn comment_get() -> Vec<FieldSpec> {
    vec![issue_key(), comment_id(), expand_option()]
}

pub fn comment_get_all() -> Vec<FieldSpec> {
    let mut fields = vec![issue_key()];
    fields.extend(return_all_and_limit(50.0, None));
    fields.push(FieldSpec::collection(
        "options",
        "Options",
        vec![
            FieldSpec::string("expand", "Expand"),
            FieldSpec::options(
                "orderBy",
                "Order By",
                &[("Created Ascending", "+created"), ("Created Descending", "-created")],
            ),
        ],
    ));
    fields
}

pub fn comment_remove() -> Vec<FieldSpec> {
    vec![issue_key(), comment_id()]
}

pub fn comment_update() -> Vec<FieldSpec> {
    let mut fields = vec![issue_key(), comment_id()];
    fields.extend(comment_body());
    fields.push(expand_option());
    fields
}

fn user_identifier() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("accountId", "Account ID")
            .required()
            .show_when_str("jiraVersion", &["cloud"]),
        FieldSpec::string("username", "Username")
            .required()
            .show_when_str("jiraVersion", &["server", "serverPat"]),
    ]
}

pub fn user_create() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("emailAddress", "Email Address").required(),
        FieldSpec::string("displayName", "Display Name").required(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::string("password", "Password"),
                FieldSpec::boolean("notification", "Send Notification Email"),
            ],
        ),
    ]
}

pub fn user_delete() -> Vec<FieldSpec> {
    user_identifier()
}

pub fn user_get() -> Vec<FieldSpec> {
    let mut fields = user_identifier();
    fields.push(FieldSpec::collection(
        "additionalFields",
        "Additional Fields",
        vec![FieldSpec::multi_options(
            "expand",
            "Expand",
            &[("Groups", "groups"), ("Application Roles", "applicationRoles")],
        )],
    ));
    fields
}
