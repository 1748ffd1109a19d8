use axum::http::StatusCode;

use stockdesk_auth::{authorize, Capability};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Enforce one capability for the current request.
///
/// Returns the ready-made 403 response on failure so handlers can `?` out.
pub fn require(
    principal: &PrincipalContext,
    capability: Capability,
) -> Result<(), axum::response::Response> {
    authorize(&principal.principal(), capability)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}
