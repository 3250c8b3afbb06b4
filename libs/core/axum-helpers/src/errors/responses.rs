//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorEnvelope;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "statusCode": 500,
        "timestamp": "2024-01-01T00:00:00.000Z",
        "path": "/api/users",
        "method": "POST",
        "message": "Internal server error",
        "error": "InternalServerError",
        "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "statusCode": 400,
        "timestamp": "2024-01-01T00:00:00.000Z",
        "path": "/api/users",
        "method": "POST",
        "message": "Validation failed",
        "error": "ValidationError",
        "details": {
            "email": ["email must be an email"]
        },
        "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid UUID",
    content_type = "application/json",
    example = json!({
        "statusCode": 400,
        "timestamp": "2024-01-01T00:00:00.000Z",
        "path": "/api/users/not-a-uuid",
        "method": "GET",
        "message": "Validation failed (uuid is expected)",
        "error": "BadRequest",
        "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
    })
)]
pub struct BadRequestUuidResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "statusCode": 404,
        "timestamp": "2024-01-01T00:00:00.000Z",
        "path": "/api/users/0b5e3d2a-5c1e-4d7f-9a55-0a4f2f3c2c11",
        "method": "GET",
        "message": "User not found",
        "error": "NotFound",
        "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
    })
)]
pub struct NotFoundResponse(pub ErrorEnvelope);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Resource already exists",
    content_type = "application/json",
    example = json!({
        "statusCode": 409,
        "timestamp": "2024-01-01T00:00:00.000Z",
        "path": "/api/users",
        "method": "POST",
        "message": "User with this email already exists",
        "error": "Conflict",
        "requestId": "6f1c2b3a-8d4e-4f6a-9b7c-1d2e3f4a5b6c"
    })
)]
pub struct ConflictResponse(pub ErrorEnvelope);
