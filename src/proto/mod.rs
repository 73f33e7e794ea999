//! Wire types for the `user.UserService` protobuf service.
//!
//! # Data Flow
//! ```text
//! user.proto (checked in next to this file)
//!     → build.rs (tonic-build)
//!     → messages (prost, serde for the REST surface)
//!     → user_service_client (typed unary calls over a tonic channel)
//!     → user_service_server (tonic service routing by method path)
//! ```
//!
//! # Design Decisions
//! - Messages double as REST payloads; request fields default to empty
//!   strings like proto3 does on the wire

tonic::include_proto!("user");

/// Fully-qualified protobuf service name.
pub const SERVICE_NAME: &str = "user.UserService";

/// Method path prefix shared by every `user.UserService` call.
pub const METHOD_PREFIX: &str = "/user.UserService/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_default_like_proto3() {
        let request: CreateUserRequest = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email, "");

        let request: GetUserRequest = serde_json::from_str("{}").unwrap();
        assert!(request.user_id.is_empty());
    }

    #[test]
    fn responses_serialize_with_proto_field_names() {
        let user = GetUserResponse {
            id: "1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        };
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"id": "1", "name": "Ada", "email": "ada@example.com"})
        );
    }
}
