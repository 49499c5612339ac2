//! Lemlist field schemas

use crate::connector::schema::{return_all_and_limit, FieldSpec};

fn campaign_id() -> FieldSpec {
    FieldSpec::string("campaignId", "Campaign ID")
        .required()
        .describe("ID of the campaign the lead belongs to")
}

fn email() -> FieldSpec {
    FieldSpec::string("email", "Email").required()
}

const ACTIVITY_TYPES: &[(&str, &str)] = &[
    ("Email Bounced", "emailsBounced"),
    ("Email Clicked", "emailsClicked"),
    ("Email Failed", "emailsFailed"),
    ("Email Interested", "emailsInterested"),
    ("Email Not Interested", "emailsNotInterested"),
    ("Email Opened", "emailsOpened"),
    ("Email Replied", "emailsReplied"),
    ("Email Send Failed", "emailsSendFailed"),
    ("Email Sent", "emailsSent"),
    ("Email Unsubscribed", "emailsUnsubscribed"),
];

pub fn activity_get_all() -> Vec<FieldSpec> {
    let mut fields = return_all_and_limit(5.0, Some(1000.0));
    fields.push(FieldSpec::collection(
        "filters",
        "Filters",
        vec![
            FieldSpec::string("campaignId", "Campaign ID"),
            FieldSpec::options("type", "Type", ACTIVITY_TYPES),
        ],
    ));
    fields
}

pub fn campaign_get_all() -> Vec<FieldSpec> {
    return_all_and_limit(5.0, Some(1000.0))
}

pub fn lead_create() -> Vec<FieldSpec> {
    vec![
        campaign_id(),
        email(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::string("companyName", "Company Name"),
                FieldSpec::boolean("deduplicate", "Deduplicate")
                    .describe("Skip the lead when it already exists in another campaign"),
                FieldSpec::string("firstName", "First Name"),
                FieldSpec::string("icebreaker", "Icebreaker"),
                FieldSpec::string("lastName", "Last Name"),
                FieldSpec::string("linkedinUrl", "LinkedIn URL"),
                FieldSpec::string("phone", "Phone"),
                FieldSpec::string("picture", "Picture").describe("URL of the lead's picture"),
            ],
        ),
    ]
}

pub fn lead_delete() -> Vec<FieldSpec> {
    vec![campaign_id(), email()]
}

pub fn lead_get() -> Vec<FieldSpec> {
    vec![email()]
}

pub fn lead_unsubscribe() -> Vec<FieldSpec> {
    vec![campaign_id(), email()]
}

pub fn team_get() -> Vec<FieldSpec> {
    Vec::new()
}

pub fn unsubscribe_add() -> Vec<FieldSpec> {
    vec![email().describe("Email to add to the unsubscribes")]
}

pub fn unsubscribe_delete() -> Vec<FieldSpec> {
    vec![email().describe("Email to remove from the unsubscribes")]
}

pub fn unsubscribe_get_all() -> Vec<FieldSpec> {
    return_all_and_limit(5.0, Some(1000.0))
}
