use crate::errors::CepRouterError;
use crate::handler::{CepHandler, HandlerBody};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use shared::http::make_error_response;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Routes `GET /{cep}` to the [`CepHandler`].
#[derive(Clone)]
pub struct CepRouterService {
    handler: Arc<CepHandler>,
}

impl CepRouterService {
    pub fn new(handler: CepHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub async fn route<B>(&self, req: Request<B>) -> Response<HandlerBody> {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            tracing::debug!(method = %req.method(), "Method not allowed");
            return make_error_response(StatusCode::METHOD_NOT_ALLOWED);
        }

        // `/` carries an empty postal code and is rejected by the handler
        let path = req.uri().path();
        let cep = path.strip_prefix('/').unwrap_or(path);
        if cep.contains('/') {
            tracing::debug!(path, "No route matched");
            return make_error_response(StatusCode::NOT_FOUND);
        }

        let cep = cep.to_owned();
        drop(req);
        self.handler.get_cep(&cep).await
    }
}

impl Service<Request<Incoming>> for CepRouterService {
    type Response = Response<HandlerBody>;
    type Error = CepRouterError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.route(req).await) })
    }
}
