//! `user.UserService` implementation that forwards to the upstream.

use tonic::{Request, Response, Status};

use crate::diagnostics::{Diagnostics, EventKind};
use crate::proto::user_service_server::UserService;
use crate::proto::{CreateUserRequest, CreateUserResponse, GetUserRequest, GetUserResponse};
use crate::upstream::UpstreamClient;

/// Passthrough handler behind the RPC front-end.
#[derive(Debug, Clone)]
pub struct GatewayService {
    upstream: UpstreamClient,
    diagnostics: Diagnostics,
}

impl GatewayService {
    pub fn new(upstream: UpstreamClient, diagnostics: Diagnostics) -> Self {
        Self {
            upstream,
            diagnostics,
        }
    }
}

#[tonic::async_trait]
impl UserService for GatewayService {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<GetUserResponse>, Status> {
        self.diagnostics.log(
            EventKind::Handler,
            format!("[Gateway] Processing gRPC request GetUser: {:?}", request.get_ref()),
        );
        let user = self.upstream.get_user(request).await?;
        Ok(Response::new(user))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<CreateUserResponse>, Status> {
        self.diagnostics.log(
            EventKind::Handler,
            format!("[Gateway] Processing gRPC request CreateUser: {:?}", request.get_ref()),
        );
        let user = self.upstream.create_user(request).await?;
        Ok(Response::new(user))
    }
}
