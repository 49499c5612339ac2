//! Elasticsearch field schemas

use crate::connector::schema::{return_all_and_limit, FieldSpec, Literal};

fn index_id() -> FieldSpec {
    FieldSpec::string("indexId", "Index ID")
        .required()
        .describe("ID of the index")
}

fn document_id(required: bool) -> FieldSpec {
    let field = FieldSpec::string("documentId", "Document ID");
    if required {
        field.required().describe("ID of the document")
    } else {
        field.describe("ID of the document to create; generated by Elasticsearch when empty")
    }
}

/// `dataToSend` discriminator with its two mutually exclusive groups
fn document_data() -> Vec<FieldSpec> {
    vec![
        FieldSpec::options(
            "dataToSend",
            "Data to Send",
            &[
                ("Define Below for Each Column", "defineBelow"),
                ("Auto-Map Input Data to Columns", "autoMapInputData"),
            ],
        )
        .default_str("defineBelow"),
        FieldSpec::string("inputsToIgnore", "Inputs to Ignore")
            .show_when_str("dataToSend", &["autoMapInputData"])
            .describe("Comma-separated list of input properties to leave out of the document"),
        FieldSpec::fixed_collection(
            "fieldsUi",
            "Fields to Send",
            vec![FieldSpec::collection(
                "fieldValues",
                "Field",
                vec![
                    FieldSpec::string("fieldId", "Field Name").required(),
                    FieldSpec::string("fieldValue", "Field Value"),
                ],
            )
            .multiple()],
        )
        .show_when_str("dataToSend", &["defineBelow"]),
    ]
}

fn simple() -> FieldSpec {
    FieldSpec::boolean("simple", "Simplify")
        .default(Literal::Bool(true))
        .describe("Whether to return the stored source merged with the document ID")
}

pub fn document_create() -> Vec<FieldSpec> {
    let mut fields = vec![index_id(), document_id(false)];
    fields.extend(document_data());
    fields.push(FieldSpec::collection(
        "additionalOptions",
        "Additional Options",
        vec![
            FieldSpec::string("pipeline", "Pipeline ID")
                .describe("Ingest pipeline to preprocess the document with"),
            FieldSpec::options(
                "refresh",
                "Refresh",
                &[("True", "true"), ("Wait For", "wait_for"), ("False", "false")],
            ),
            FieldSpec::string("routing", "Routing"),
            FieldSpec::string("timeout", "Timeout")
                .describe("Period to wait for active shards, e.g. 1m"),
        ],
    ));
    fields
}

pub fn document_delete() -> Vec<FieldSpec> {
    vec![index_id(), document_id(true)]
}

pub fn document_get() -> Vec<FieldSpec> {
    vec![
        index_id(),
        document_id(true),
        simple(),
        FieldSpec::collection(
            "options",
            "Options",
            vec![
                FieldSpec::string("_source_excludes", "Source Excludes"),
                FieldSpec::string("_source_includes", "Source Includes"),
                FieldSpec::string("stored_fields", "Stored Fields"),
            ],
        ),
    ]
}

pub fn document_get_all() -> Vec<FieldSpec> {
    let mut fields = vec![index_id()];
    fields.extend(return_all_and_limit(50.0, None));
    fields.push(simple());
    fields.push(FieldSpec::collection(
        "options",
        "Options",
        vec![
            FieldSpec::json("query", "Query")
                .describe("Query DSL as JSON, e.g. {\"query\": {\"match_all\": {}}}"),
            FieldSpec::string("q", "Query String"),
            FieldSpec::boolean("analyze_wildcard", "Analyze Wildcard"),
            FieldSpec::options("default_operator", "Default Operator", &[("AND", "AND"), ("OR", "OR")]),
            FieldSpec::string("df", "Default Field"),
            FieldSpec::string("sort", "Sort").describe("Comma-separated field:direction pairs"),
            FieldSpec::string("_source", "Source"),
            FieldSpec::string("_source_excludes", "Source Excludes"),
            FieldSpec::string("_source_includes", "Source Includes"),
            FieldSpec::string("stored_fields", "Stored Fields"),
            FieldSpec::number("terminate_after", "Terminate After").min(0.0),
            FieldSpec::string("timeout", "Timeout"),
            FieldSpec::boolean("track_scores", "Track Scores"),
            FieldSpec::boolean("track_total_hits", "Track Total Hits"),
        ],
    ));
    fields
}

pub fn document_update() -> Vec<FieldSpec> {
    let mut fields = vec![index_id(), document_id(true)];
    fields.extend(document_data());
    fields
}

pub fn index_create() -> Vec<FieldSpec> {
    vec![
        index_id(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::json("aliases", "Aliases"),
                FieldSpec::json("mappings", "Mappings"),
                FieldSpec::json("settings", "Settings"),
                FieldSpec::string("master_timeout", "Master Timeout"),
                FieldSpec::string("timeout", "Timeout"),
                FieldSpec::string("wait_for_active_shards", "Wait for Active Shards"),
            ],
        ),
    ]
}

pub fn index_delete() -> Vec<FieldSpec> {
    vec![index_id()]
}

pub fn index_get() -> Vec<FieldSpec> {
    vec![
        index_id(),
        FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![
                FieldSpec::boolean("allow_no_indices", "Allow No Indices"),
                FieldSpec::options(
                    "expand_wildcards",
                    "Expand Wildcards",
                    &[
                        ("All", "all"),
                        ("Closed", "closed"),
                        ("Hidden", "hidden"),
                        ("None", "none"),
                        ("Open", "open"),
                    ],
                ),
                FieldSpec::boolean("flat_settings", "Flat Settings"),
                FieldSpec::boolean("ignore_unavailable", "Ignore Unavailable"),
                FieldSpec::boolean("include_defaults", "Include Defaults"),
                FieldSpec::boolean("local", "Local"),
                FieldSpec::string("master_timeout", "Master Timeout"),
            ],
        ),
    ]
}

pub fn index_get_all() -> Vec<FieldSpec> {
    return_all_and_limit(50.0, None)
}
