//! Route registration that documents itself.
//!
//! [`OperationBuilder`] tracks two facts in its type: whether a handler is
//! attached and whether a response is declared. `register` exists only when
//! both are, so a route cannot reach the router without its OpenAPI entry.

use std::marker::PhantomData;

use axum::{
    handler::Handler,
    http::Method,
    routing::{MethodFilter, MethodRouter},
    Router,
};
use utoipa::openapi::{schema::Schema, RefOr};

use crate::api::problem::{Problem, APPLICATION_PROBLEM_JSON};

const APPLICATION_JSON: &str = "application/json";

pub type SchemaCollection = Vec<(String, RefOr<Schema>)>;

/// Type-state marker: component not supplied yet.
#[derive(Debug, Clone, Copy)]
pub struct Missing;

/// Type-state marker: component supplied.
#[derive(Debug, Clone, Copy)]
pub struct Present;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Missing {}
    impl Sealed for super::Present {}
}

/// What the builder holds for the handler in each state.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}

impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Header,
}

/// A string-typed parameter.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub description: String,
}

/// Required request body. No schema means an opaque payload (e.g. image bytes).
#[derive(Clone, Debug)]
pub struct BodySpec {
    pub content_type: &'static str,
    pub description: String,
    pub schema_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    pub description: String,
    /// `(content type, component name)`; `None` for bodiless responses.
    pub content: Option<(&'static str, String)>,
}

#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<BodySpec>,
    pub responses: Vec<ResponseSpec>,
}

impl OperationSpec {
    /// `operation_id`, or one derived from method and path:
    /// `GET /sessions/{id}` → `get_sessions_id`.
    pub fn effective_operation_id(&self) -> String {
        if let Some(id) = &self.operation_id {
            return id.clone();
        }
        let mut id = self.method.as_str().to_ascii_lowercase();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            id.push('_');
            id.push_str(segment.trim_matches(|c| c == '{' || c == '}'));
        }
        id
    }
}

/// Sink for operation specs and component schemas.
pub trait OpenApiRegistry {
    fn register_operation(&self, spec: &OperationSpec);

    /// Store `schemas` (the root plus everything it references) and return
    /// the component name for `$ref`.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;
}

/// Register `T` and the schemas it references; returns `T`'s component name.
pub fn ensure_schema<T: utoipa::ToSchema + 'static>(registry: &dyn OpenApiRegistry) -> String {
    let name = T::name().into_owned();
    // Root first so the component holds the object itself
    let mut schemas: SchemaCollection =
        vec![(name.clone(), <T as utoipa::PartialSchema>::schema())];
    T::schemas(&mut schemas);
    registry.ensure_schema_raw(&name, schemas)
}

/// `H`: handler state, `R`: response state, `S`: router state.
pub struct OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    route: H::Slot,
    _state: PhantomData<(H, R, fn() -> S)>,
}

impl<S> OperationBuilder<Missing, Missing, S> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            spec: OperationSpec {
                method,
                path: path.into(),
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
            },
            route: (),
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    fn param(
        mut self,
        location: ParamLocation,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            location,
            required,
            description: description.into(),
        });
        self
    }

    pub fn path_param(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.param(ParamLocation::Path, name, true, description)
    }

    pub fn header_param(
        self,
        name: impl Into<String>,
        required: bool,
        description: impl Into<String>,
    ) -> Self {
        self.param(ParamLocation::Header, name, required, description)
    }

    pub fn json_request<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        desc: impl Into<String>,
    ) -> Self
    where
        T: utoipa::ToSchema + 'static,
    {
        self.spec.request_body = Some(BodySpec {
            content_type: APPLICATION_JSON,
            description: desc.into(),
            schema_name: Some(ensure_schema::<T>(registry)),
        });
        self
    }

    pub fn raw_request(mut self, content_type: &'static str, desc: impl Into<String>) -> Self {
        self.spec.request_body = Some(BodySpec {
            content_type,
            description: desc.into(),
            schema_name: None,
        });
        self
    }
}

impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let route = match MethodFilter::try_from(self.spec.method.clone()) {
            Ok(filter) => axum::routing::on(filter, h),
            Err(_) => axum::routing::any(h),
        };
        OperationBuilder {
            spec: self.spec,
            route,
            _state: PhantomData,
        }
    }
}

impl<H, S> OperationBuilder<H, Missing, S>
where
    H: HandlerSlot<S>,
{
    fn first_response(mut self, resp: ResponseSpec) -> OperationBuilder<H, Present, S> {
        self.spec.responses.push(resp);
        OperationBuilder {
            spec: self.spec,
            route: self.route,
            _state: PhantomData,
        }
    }

    pub fn json_response_with_schema<T>(
        self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.first_response(ResponseSpec {
            status,
            description: description.into(),
            content: Some((APPLICATION_JSON, name)),
        })
    }

    /// Bodiless success such as `204 No Content`.
    pub fn empty_response(
        self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.first_response(ResponseSpec {
            status,
            description: description.into(),
            content: None,
        })
    }
}

impl<H, S> OperationBuilder<H, Present, S>
where
    H: HandlerSlot<S>,
{
    /// Error outcome rendered as a [`Problem`].
    pub fn problem_response(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        let name = ensure_schema::<Problem>(registry);
        self.spec.responses.push(ResponseSpec {
            status,
            description: description.into(),
            content: Some((APPLICATION_PROBLEM_JSON, name)),
        });
        self
    }
}

impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Add the route to `router` and its spec to `openapi`.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.route)
    }
}
