use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, OriginalUri, Path, Query, Request},
    http::{request::Parts, Extensions, Method, Uri},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::response::ApiError;

pub const INVALID_USER_ID: &str = "Invalid user ID";

/// Where a DTO is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    Json,
    Query,
}

impl BindingSource {
    /// POST, PUT and PATCH carry the DTO in the JSON body; every other
    /// method reads it from the query string.
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
            BindingSource::Json
        } else {
            BindingSource::Query
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingSource::Json => "json",
            BindingSource::Query => "query",
        }
    }
}

/// Binds and validates a DTO, choosing the source from the request method.
///
/// On body-carrying methods this consumes the body, so it has to be the
/// last handler argument. Any further DTO of such a route is taken with
/// [`BindQuery`].
#[derive(Debug, Clone)]
pub struct Bind<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Bind<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let path = request_path(req.uri(), req.extensions());
        let source = BindingSource::for_method(&method);

        tracing::debug!(
            method = %method,
            path = %path,
            binding_type = source.as_str(),
            "Binding request parameters"
        );

        let bound = match source {
            BindingSource::Json => Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|rejection| rejection.body_text()),
            BindingSource::Query => bind_query::<T>(req.uri()),
        };

        let value = bound.map_err(|message| {
            tracing::error!(method = %method, path = %path, error = %message, "Parameter binding failed");
            ApiError::BadRequest(message)
        })?;

        validate(value, &method, &path).map(Bind)
    }
}

/// Binds and validates a DTO from the query string regardless of method
#[derive(Debug, Clone)]
pub struct BindQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for BindQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = request_path(&parts.uri, &parts.extensions);

        tracing::debug!(
            method = %parts.method,
            path = %path,
            binding_type = BindingSource::Query.as_str(),
            "Binding request parameters"
        );

        let value = bind_query::<T>(&parts.uri).map_err(|message| {
            tracing::error!(method = %parts.method, path = %path, error = %message, "Parameter binding failed");
            ApiError::BadRequest(message)
        })?;

        validate(value, &parts.method, &path).map(BindQuery)
    }
}

/// Numeric `{id}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest(INVALID_USER_ID.to_string()))?;

        parse_id(&raw)
            .map(PathId)
            .ok_or_else(|| ApiError::BadRequest(INVALID_USER_ID.to_string()))
    }
}

/// Ids are unsigned 32-bit integers
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<u32>().ok().map(i64::from)
}

/// Full request path; nested routers only see the stripped remainder in `uri`
fn request_path(uri: &Uri, extensions: &Extensions) -> String {
    extensions
        .get::<OriginalUri>()
        .map(|OriginalUri(original)| original.path())
        .unwrap_or_else(|| uri.path())
        .to_string()
}

fn bind_query<T: DeserializeOwned>(uri: &Uri) -> Result<T, String> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(value)| value)
        .map_err(|rejection| rejection.body_text())
}

fn validate<T: Validate>(value: T, method: &Method, path: &str) -> Result<T, ApiError> {
    if let Err(errors) = value.validate() {
        tracing::error!(method = %method, path = %path, error = %errors, "Parameter validation failed");
        return Err(errors.into());
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[validate(range(min = 1, max = 5))]
        level: i64,
    }

    fn request(method: Method, uri: &str, body: &str) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_source_follows_method() {
        assert_eq!(BindingSource::for_method(&Method::GET), BindingSource::Query);
        assert_eq!(BindingSource::for_method(&Method::DELETE), BindingSource::Query);
        assert_eq!(BindingSource::for_method(&Method::POST), BindingSource::Json);
        assert_eq!(BindingSource::for_method(&Method::PUT), BindingSource::Json);
        assert_eq!(BindingSource::for_method(&Method::PATCH), BindingSource::Json);
    }

    #[tokio::test]
    async fn test_get_binds_from_query_and_ignores_body() {
        let req = request(Method::GET, "/probe?level=3", r#"{"level": 9}"#);
        let Bind(probe) = Bind::<Probe>::from_request(req, &()).await.unwrap();
        assert_eq!(probe.level, 3);
    }

    #[tokio::test]
    async fn test_post_binds_from_body_and_ignores_query() {
        let req = request(Method::POST, "/probe?level=9", r#"{"level": 2}"#);
        let Bind(probe) = Bind::<Probe>::from_request(req, &()).await.unwrap();
        assert_eq!(probe.level, 2);
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        let req = request(Method::PUT, "/probe", r#"{"level": 7}"#);
        let err = Bind::<Probe>::from_request(req, &()).await.unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.to_string().contains("level"));
    }

    #[tokio::test]
    async fn test_malformed_input_is_bad_request() {
        let req = request(Method::POST, "/probe", "{not json");
        let err = Bind::<Probe>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let req = request(Method::DELETE, "/probe?level=high", "");
        let err = Bind::<Probe>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_query_binding_on_body_methods() {
        let req = request(Method::POST, "/probe?level=4", "{}");
        let (mut parts, _body) = req.into_parts();

        let BindQuery(probe) = BindQuery::<Probe>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(probe.level, 4);
    }

    #[test]
    fn test_logged_path_prefers_original_uri() {
        let mut req = request(Method::POST, "/", "{}");
        assert_eq!(request_path(req.uri(), req.extensions()), "/");

        req.extensions_mut()
            .insert(OriginalUri("/api/v1/users?page=2".parse().unwrap()));
        assert_eq!(request_path(req.uri(), req.extensions()), "/api/v1/users");
    }

    #[test]
    fn test_path_id_parsing() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), Some(0));
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("4294967296"), None);
    }
}
