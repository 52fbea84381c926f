//! Shared response body types for API handlers.
//!
//! Mutating endpoints answer `{ "success": true, ... }`; read endpoints return
//! their payload directly. Bodies are camelCase.

use serde::Serialize;

/// `{ "success": true }` acknowledgement for mutations with nothing to return.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// `{ "success": true, ...data }` acknowledgement carrying extra fields.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessWith::new(CreatedInvitation { invitation_id })))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessWith<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessWith<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
