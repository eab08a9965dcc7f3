use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::actions::{ActionDescriptor, ActionOutcome};
use crate::errors::AppError;
use crate::llm_client::json_kind;
use crate::state::AppState;

/// GET /api/v1/actions
pub async fn handle_list_actions(State(state): State<AppState>) -> Json<Vec<ActionDescriptor>> {
    Json(state.registry.list_actions().to_vec())
}

/// POST /api/v1/actions/:name
///
/// The body is a flat JSON object of string arguments. A `null` value counts
/// as absent, so a required argument sent as `null` is reported missing.
pub async fn handle_invoke_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActionOutcome>, AppError> {
    let Json(body) = payload?;
    let args = arguments_from_json(body)?;
    let outcome = state.registry.invoke(&name, &args).await?;
    Ok(Json(outcome))
}

fn arguments_from_json(body: Value) -> Result<HashMap<String, String>, AppError> {
    let Value::Object(fields) = body else {
        return Err(AppError::Validation(
            "action arguments must be a JSON object".to_string(),
        ));
    };

    let mut args = HashMap::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) => {
                args.insert(key, s);
            }
            other => {
                return Err(AppError::Validation(format!(
                    "argument '{key}' must be a string, got {}",
                    json_kind(&other)
                )))
            }
        }
    }
    Ok(args)
}
