//! Request dispatch against a [`Registry`]

use crate::error::{ApiError, ApiResult};
use crate::protocol::{Request, Response};
use crate::registry::Registry;
use crate::transform::Transform;

/// Decode one line of JSON and handle it; failures become error responses
pub fn handle_line(registry: &Registry, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable request");
            return ApiError::bad_request("Missing or malformed request body").into();
        }
    };

    handle_request(registry, &request).unwrap_or_else(Response::from)
}

/// Handle a decoded request
pub fn handle_request(registry: &Registry, request: &Request) -> ApiResult<Response> {
    match request {
        Request::List { category } => {
            let transforms = registry
                .all(category.as_deref())
                .into_iter()
                .map(|t| t.to_info())
                .collect();
            Ok(Response::Transforms { transforms })
        }
        Request::Fields {
            transform,
            category,
        } => {
            let transform = find(registry, transform.as_deref(), category.as_deref())?;
            Ok(Response::Fields {
                fields: transform.fields(),
            })
        }
        Request::Transform {
            transform,
            category,
            inputs,
        } => {
            let transform = find(registry, transform.as_deref(), category.as_deref())?;
            let inputs = inputs
                .as_ref()
                .ok_or_else(|| ApiError::bad_request("Missing input data"))?;

            tracing::debug!(transform = %transform.key(), "running transform");
            let outputs = transform.transform_many(inputs)?;
            Ok(Response::Outputs { outputs })
        }
    }
}

fn find<'r>(
    registry: &'r Registry,
    name: Option<&str>,
    category: Option<&str>,
) -> ApiResult<&'r dyn Transform> {
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing transform"))?;

    registry
        .lookup(name, category)
        .ok_or_else(|| ApiError::not_found(format!("Transform \"{}\" not found", name)))
}
