//! Lemlist activity, campaign, lead, team and unsubscribe operations

mod fields;

use super::segment;
use crate::connector::field_mapper::{apply_field_mappings, ensure_mapped, FieldMapping};
use crate::connector::normalize::records_from;
use crate::connector::pagination::{fetch_paged, PageStrategy, ParamLocation};
use crate::connector::schema::FieldSpec;
use crate::connector::{OutputItem, RequestContext, ServiceOperation};
use crate::error::Result;
use crate::http::HttpRequest;
use serde_json::Value;

const PAGE_SIZE: usize = 100;

const OFFSET_PAGING: PageStrategy = PageStrategy::Offset {
    offset_param: "offset",
    size_param: "limit",
    page_size: PAGE_SIZE,
    location: ParamLocation::Query,
    total_path: None,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LemlistOperation {
    ActivityGetAll,
    CampaignGetAll,
    LeadCreate,
    LeadDelete,
    LeadGet,
    LeadUnsubscribe,
    TeamGet,
    UnsubscribeAdd,
    UnsubscribeDelete,
    UnsubscribeGetAll,
}

impl ServiceOperation for LemlistOperation {
    const ALL: &'static [Self] = &[
        Self::ActivityGetAll,
        Self::CampaignGetAll,
        Self::LeadCreate,
        Self::LeadDelete,
        Self::LeadGet,
        Self::LeadUnsubscribe,
        Self::TeamGet,
        Self::UnsubscribeAdd,
        Self::UnsubscribeDelete,
        Self::UnsubscribeGetAll,
    ];

    fn resource(self) -> &'static str {
        use LemlistOperation::*;
        match self {
            ActivityGetAll => "activity",
            CampaignGetAll => "campaign",
            LeadCreate | LeadDelete | LeadGet | LeadUnsubscribe => "lead",
            TeamGet => "team",
            UnsubscribeAdd | UnsubscribeDelete | UnsubscribeGetAll => "unsubscribe",
        }
    }

    fn operation(self) -> &'static str {
        use LemlistOperation::*;
        match self {
            ActivityGetAll | CampaignGetAll | UnsubscribeGetAll => "getAll",
            LeadCreate => "create",
            LeadDelete | UnsubscribeDelete => "delete",
            LeadGet | TeamGet => "get",
            LeadUnsubscribe => "unsubscribe",
            UnsubscribeAdd => "add",
        }
    }

    fn description(self) -> &'static str {
        use LemlistOperation::*;
        match self {
            ActivityGetAll => "List campaign activities",
            CampaignGetAll => "List campaigns",
            LeadCreate => "Add a lead to a campaign",
            LeadDelete => "Remove a lead from a campaign",
            LeadGet => "Get a lead by email",
            LeadUnsubscribe => "Unsubscribe a lead from a campaign",
            TeamGet => "Get the team",
            UnsubscribeAdd => "Add an email to the unsubscribes",
            UnsubscribeDelete => "Remove an email from the unsubscribes",
            UnsubscribeGetAll => "List unsubscribed emails",
        }
    }

    fn fields(self) -> Vec<FieldSpec> {
        use LemlistOperation::*;
        match self {
            ActivityGetAll => fields::activity_get_all(),
            CampaignGetAll => fields::campaign_get_all(),
            LeadCreate => fields::lead_create(),
            LeadDelete => fields::lead_delete(),
            LeadGet => fields::lead_get(),
            LeadUnsubscribe => fields::lead_unsubscribe(),
            TeamGet => fields::team_get(),
            UnsubscribeAdd => fields::unsubscribe_add(),
            UnsubscribeDelete => fields::unsubscribe_delete(),
            UnsubscribeGetAll => fields::unsubscribe_get_all(),
        }
    }
}

const LEAD_FIELDS: &[FieldMapping] = &[
    FieldMapping::body("companyName", "companyName"),
    FieldMapping::body("firstName", "firstName"),
    FieldMapping::body("lastName", "lastName"),
    FieldMapping::body("icebreaker", "icebreaker"),
    FieldMapping::body("phone", "phone"),
    FieldMapping::body("picture", "picture"),
    FieldMapping::body("linkedinUrl", "linkedinUrl"),
    FieldMapping::query("deduplicate", "deduplicate"),
];

const ACTIVITY_FILTERS: &[FieldMapping] = &[
    FieldMapping::query("campaignId", "campaignId"),
    FieldMapping::query("type", "type"),
];

/// `/campaigns/{campaignId}/leads/{email}`
fn campaign_lead_path(ctx: &RequestContext<'_>) -> Result<String> {
    let campaign = segment(ctx.params.required_str("campaignId")?);
    let email = segment(ctx.params.required_str("email")?);
    Ok(format!("/campaigns/{}/leads/{}", campaign, email))
}

fn unsubscribe_path(ctx: &RequestContext<'_>) -> Result<String> {
    let email = segment(ctx.params.required_str("email")?);
    Ok(format!("/unsubscribes/{}", email))
}

async fn list(ctx: &RequestContext<'_>, request: HttpRequest) -> Result<Vec<OutputItem>> {
    let items = fetch_paged(ctx.client, request, OFFSET_PAGING, "", ctx.params.limit()).await?;
    Ok(records_from(items, ctx.index))
}

async fn one(ctx: &RequestContext<'_>, request: HttpRequest) -> Result<Vec<OutputItem>> {
    let response: Value = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}

pub async fn execute(op: LemlistOperation, ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    use LemlistOperation::*;

    match op {
        ActivityGetAll => {
            let mut request = HttpRequest::get("/activities");
            apply_field_mappings(ACTIVITY_FILTERS, &ctx.params.collection("filters"), &mut request)?;
            list(ctx, request).await
        }
        CampaignGetAll => list(ctx, HttpRequest::get("/campaigns")).await,
        LeadCreate => {
            let values = ctx.params.collection("additionalFields");
            ensure_mapped(LEAD_FIELDS, &values, &[])?;
            let mut request = HttpRequest::post(campaign_lead_path(ctx)?);
            apply_field_mappings(LEAD_FIELDS, &values, &mut request)?;
            one(ctx, request).await
        }
        LeadDelete => {
            let request = HttpRequest::delete(campaign_lead_path(ctx)?).query("action", "remove");
            one(ctx, request).await
        }
        LeadGet => {
            let email = segment(ctx.params.required_str("email")?);
            one(ctx, HttpRequest::get(format!("/leads/{}", email))).await
        }
        LeadUnsubscribe => one(ctx, HttpRequest::delete(campaign_lead_path(ctx)?)).await,
        TeamGet => one(ctx, HttpRequest::get("/team")).await,
        UnsubscribeAdd => one(ctx, HttpRequest::post(unsubscribe_path(ctx)?)).await,
        UnsubscribeDelete => one(ctx, HttpRequest::delete(unsubscribe_path(ctx)?)).await,
        UnsubscribeGetAll => list(ctx, HttpRequest::get("/unsubscribes")).await,
    }
}
