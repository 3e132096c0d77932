//! Collects [`OperationSpec`]s and component schemas into a utoipa OpenAPI fragment.

use std::collections::BTreeMap;

use axum::http::Method;
use parking_lot::Mutex;
use utoipa::openapi::{
    content::ContentBuilder,
    path::{
        HttpMethod, Operation, OperationBuilder as DocOperationBuilder, Parameter,
        ParameterBuilder, ParameterIn, PathItem, PathsBuilder,
    },
    request_body::RequestBodyBuilder,
    response::ResponseBuilder,
    schema::{ObjectBuilder, Schema, Type},
    ComponentsBuilder, Info, OpenApi, OpenApiBuilder, Ref, RefOr, Required,
};

use super::operation_builder::{
    OpenApiRegistry, OperationSpec, ParamLocation, ParamSpec, SchemaCollection,
};

/// In-memory [`OpenApiRegistry`]. Duplicate `(method, path)` registrations
/// are rejected: the first one wins.
#[derive(Default)]
pub struct OpenApiDocRegistry {
    operations: Mutex<BTreeMap<(String, String), OperationSpec>>,
    schemas: Mutex<BTreeMap<String, RefOr<Schema>>>,
}

impl OpenApiDocRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.lock().len()
    }

    /// Build the fragment; modules return it from `RestfulModule::openapi`.
    pub fn build(&self, title: &str, version: &str) -> OpenApi {
        let mut paths = PathsBuilder::new();
        for ((_, path), spec) in self.operations.lock().iter() {
            let Some(method) = http_method(&spec.method) else {
                tracing::warn!(method = %spec.method, %path, "Unsupported method skipped in docs");
                continue;
            };
            paths = paths.path(path.clone(), PathItem::new(method, to_operation(spec)));
        }

        let mut components = ComponentsBuilder::new();
        for (name, schema) in self.schemas.lock().iter() {
            components = components.schema(name.clone(), schema.clone());
        }

        OpenApiBuilder::new()
            .info(Info::new(title, version))
            .paths(paths.build())
            .components(Some(components.build()))
            .build()
    }
}

impl OpenApiRegistry for OpenApiDocRegistry {
    fn register_operation(&self, spec: &OperationSpec) {
        let key = (spec.method.as_str().to_string(), spec.path.clone());
        let mut ops = self.operations.lock();
        if ops.contains_key(&key) {
            tracing::error!(
                method = %spec.method,
                path = %spec.path,
                "Duplicate (method, path) detected; ignoring subsequent registration"
            );
            return;
        }
        tracing::debug!(
            method = %spec.method,
            path = %spec.path,
            summary = spec.summary.as_deref().unwrap_or("No summary"),
            "Registered API operation"
        );
        ops.insert(key, spec.clone());
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        let mut registered = self.schemas.lock();
        for (component, schema) in schemas {
            registered.entry(component).or_insert(schema);
        }
        name.to_string()
    }
}

fn http_method(method: &Method) -> Option<HttpMethod> {
    match *method {
        Method::GET => Some(HttpMethod::Get),
        Method::POST => Some(HttpMethod::Post),
        Method::PUT => Some(HttpMethod::Put),
        Method::DELETE => Some(HttpMethod::Delete),
        Method::PATCH => Some(HttpMethod::Patch),
        _ => None,
    }
}

fn schema_ref(name: &str) -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(name))
}

fn parameter(p: &ParamSpec) -> Parameter {
    let location = match p.location {
        ParamLocation::Path => ParameterIn::Path,
        ParamLocation::Header => ParameterIn::Header,
    };
    ParameterBuilder::new()
        .name(p.name.clone())
        .parameter_in(location)
        .required(if p.required { Required::True } else { Required::False })
        .description(Some(p.description.clone()))
        .schema(Some(RefOr::T(Schema::Object(
            ObjectBuilder::new().schema_type(Type::String).build(),
        ))))
        .build()
}

fn to_operation(spec: &OperationSpec) -> Operation {
    let mut op = DocOperationBuilder::new()
        .operation_id(Some(spec.effective_operation_id()))
        .summary(spec.summary.clone())
        .description(spec.description.clone());

    if !spec.tags.is_empty() {
        op = op.tags(Some(spec.tags.clone()));
    }
    for p in &spec.params {
        op = op.parameter(parameter(p));
    }

    if let Some(body) = &spec.request_body {
        let mut content = ContentBuilder::new();
        if let Some(name) = &body.schema_name {
            content = content.schema(Some(schema_ref(name)));
        }
        op = op.request_body(Some(
            RequestBodyBuilder::new()
                .description(Some(body.description.clone()))
                .content(body.content_type, content.build())
                .required(Some(Required::True))
                .build(),
        ));
    }

    for r in &spec.responses {
        let mut resp = ResponseBuilder::new().description(r.description.clone());
        if let Some((content_type, name)) = &r.content {
            resp = resp.content(
                *content_type,
                ContentBuilder::new().schema(Some(schema_ref(name))).build(),
            );
        }
        op = op.response(r.status.to_string(), resp.build());
    }

    op.build()
}
