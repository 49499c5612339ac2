//! Raindrop field schemas

use crate::connector::schema::{return_all_and_limit, FieldSpec, Literal};

fn bookmark_id() -> FieldSpec {
    FieldSpec::string("bookmarkId", "Bookmark ID").required()
}

fn collection_id() -> FieldSpec {
    FieldSpec::string("collectionId", "Collection ID").required()
}

fn bookmark_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::boolean("important", "Important")
            .describe("Whether the bookmark is marked as favorite"),
        FieldSpec::number("order", "Order").describe("Sort order, ascending"),
        FieldSpec::boolean("pleaseParse", "Parse Metadata")
            .describe("Whether Raindrop should load the page title, description and cover"),
        FieldSpec::string("tags", "Tags").describe("Comma-separated tags"),
        FieldSpec::string("title", "Title"),
    ]
}

pub fn bookmark_create() -> Vec<FieldSpec> {
    vec![
        collection_id(),
        FieldSpec::string("link", "Link").required(),
        FieldSpec::collection("additionalFields", "Additional Fields", bookmark_fields()),
    ]
}

pub fn bookmark_delete() -> Vec<FieldSpec> {
    vec![bookmark_id()]
}

pub fn bookmark_get() -> Vec<FieldSpec> {
    vec![bookmark_id()]
}

pub fn bookmark_get_all() -> Vec<FieldSpec> {
    let mut fields = vec![collection_id()
        .describe("Use 0 for all bookmarks, -1 for unsorted and -99 for trash")];
    fields.extend(return_all_and_limit(50.0, Some(50.0)));
    fields
}

pub fn bookmark_update() -> Vec<FieldSpec> {
    let mut update = bookmark_fields();
    update.push(FieldSpec::string("collectionId", "Collection ID"));
    update.push(FieldSpec::string("link", "Link"));
    vec![
        bookmark_id(),
        FieldSpec::collection("updateFields", "Update Fields", update),
    ]
}

fn collection_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("cover", "Cover").describe("URL of the cover image"),
        FieldSpec::string("parentId", "Parent ID")
            .describe("ID of the parent collection; empty for a root collection"),
        FieldSpec::boolean("public", "Public"),
        FieldSpec::number("sort", "Sort").describe("Order among sibling collections, descending"),
        FieldSpec::options(
            "view",
            "View",
            &[
                ("Card", "grid"),
                ("List", "list"),
                ("Masonry", "masonry"),
                ("Simple", "simple"),
            ],
        ),
    ]
}

pub fn collection_create() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("title", "Title").required(),
        FieldSpec::collection("additionalFields", "Additional Fields", collection_fields()),
    ]
}

pub fn collection_delete() -> Vec<FieldSpec> {
    vec![collection_id()]
}

pub fn collection_get() -> Vec<FieldSpec> {
    vec![collection_id()]
}

pub fn collection_get_all() -> Vec<FieldSpec> {
    let mut fields = vec![FieldSpec::options(
        "type",
        "Type",
        &[("Parent", "parent"), ("Children", "children")],
    )
    .default_str("parent")];
    fields.extend(return_all_and_limit(10.0, None));
    fields
}

pub fn collection_update() -> Vec<FieldSpec> {
    let mut update = collection_fields();
    update.push(FieldSpec::string("title", "Title"));
    vec![
        collection_id(),
        FieldSpec::collection("updateFields", "Update Fields", update),
    ]
}

fn tag_scope() -> FieldSpec {
    FieldSpec::string("collectionId", "Collection ID")
        .describe("Limit to one collection; all collections when empty")
}

pub fn tag_delete() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("tags", "Tags")
            .required()
            .describe("Comma-separated tags to delete"),
        FieldSpec::collection("additionalFields", "Additional Fields", vec![tag_scope()]),
    ]
}

pub fn tag_get_all() -> Vec<FieldSpec> {
    let mut fields = return_all_and_limit(10.0, None);
    fields.push(FieldSpec::collection("filters", "Filters", vec![tag_scope()]));
    fields
}

pub fn user_get() -> Vec<FieldSpec> {
    vec![
        FieldSpec::boolean("self", "Self")
            .default(Literal::Bool(true))
            .describe("Whether to return the authenticated user"),
        FieldSpec::string("userId", "User ID")
            .required()
            .show_when_bool("self", false),
    ]
}
