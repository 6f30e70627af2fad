// SPDX-FileCopyrightText: 2026 Volman Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! axum handlers serving a [`Driver`] over the route table.
//!
//! Every handler answers 200. Consumers of this protocol ignore the HTTP
//! status and inspect the body's `Err`, so read, decode and driver failures
//! are all folded into the operation's own response shape.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, info_span, Instrument};

use crate::driver::Driver;
use crate::error::DriverError;
use crate::routes::{routes, Route, RouteName};
use crate::wire::{
    ActivateResponse, CreateRequest, ErrorResponse, GetRequest, GetResponse, MountRequest,
    MountResponse, PathRequest, PathResponse, RemoveRequest, UnmountRequest, WireResponse,
};

/// Largest request body a handler will read.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

type DriverState = Arc<dyn Driver>;

/// Builds a router serving all seven driver operations.
pub fn driver_router(driver: Arc<dyn Driver>) -> Router {
    let mut router: Router<DriverState> = Router::new();
    for route in routes() {
        router = router.route(route.path, method_router(route));
    }
    info!(routes = routes().len(), "driver routes registered");
    router.with_state(driver)
}

fn method_filter(route: &Route) -> MethodFilter {
    let filter = MethodFilter::try_from(route.method.clone()).unwrap_or(MethodFilter::POST);
    if route.name == RouteName::Get {
        filter.or(MethodFilter::GET)
    } else {
        filter
    }
}

fn method_router(route: &Route) -> MethodRouter<DriverState> {
    let filter = method_filter(route);
    match route.name {
        RouteName::Activate => on(filter, handle_activate),
        RouteName::Get => on(filter, handle_get),
        RouteName::Path => on(filter, handle_path),
        RouteName::Create => on(filter, handle_create),
        RouteName::Mount => on(filter, handle_mount),
        RouteName::Unmount => on(filter, handle_unmount),
        RouteName::Remove => on(filter, handle_remove),
    }
}

fn write_response<R: Serialize>(response: R) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

async fn read_request<Req: DeserializeOwned>(
    body: Body,
    operation: RouteName,
) -> Result<Req, DriverError> {
    let bytes = axum::body::to_bytes(body, MAX_REQUEST_BYTES)
        .await
        .map_err(|e| {
            error!(%operation, error = %e, "failed to read request body");
            DriverError::decode(e)
        })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        error!(%operation, error = %e, "failed to unmarshal request body");
        DriverError::decode(e)
    })
}

/// read -> unmarshal -> invoke -> respond, bracketed by start/end markers.
async fn serve_request<Req, Resp, F, Fut>(body: Body, operation: RouteName, call: F) -> Response
where
    Req: DeserializeOwned,
    Resp: WireResponse,
    F: FnOnce(Req) -> Fut,
    Fut: Future<Output = Result<Resp::Payload, DriverError>>,
{
    info!("start");
    let response = match read_request::<Req>(body, operation).await {
        Ok(request) => {
            let result = call(request).await;
            if let Err(e) = &result {
                error!(%operation, error = %e, "driver reported failure");
            }
            Resp::from_result(result)
        }
        Err(e) => Resp::failure(&e),
    };
    info!("end");
    write_response(response)
}

async fn handle_activate(State(driver): State<DriverState>) -> Response {
    async move {
        info!("start");
        let result = driver.activate().await;
        match &result {
            Ok(implements) => debug!(?implements, "activate response"),
            Err(e) => error!(error = %e, "failed activating driver"),
        }
        let response = ActivateResponse::from_result(result);
        info!("end");
        write_response(response)
    }
    .instrument(info_span!("handle-activate"))
    .await
}

async fn handle_get(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<GetRequest, GetResponse, _, _>(body, RouteName::Get, move |request| async move {
        debug!(volume = %request.name, "getting volume");
        driver.get(request).await
    })
    .instrument(info_span!("handle-get"))
    .await
}

async fn handle_path(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<PathRequest, PathResponse, _, _>(body, RouteName::Path, move |request| async move {
        driver.path(request).await
    })
    .instrument(info_span!("handle-path"))
    .await
}

async fn handle_create(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<CreateRequest, ErrorResponse, _, _>(
        body,
        RouteName::Create,
        move |request| async move {
            debug!(volume = %request.name, "creating volume");
            driver.create(request).await
        },
    )
    .instrument(info_span!("handle-create"))
    .await
}

async fn handle_mount(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<MountRequest, MountResponse, _, _>(
        body,
        RouteName::Mount,
        move |request| async move {
            debug!(volume = %request.name, "mounting volume");
            driver.mount(request).await
        },
    )
    .instrument(info_span!("handle-mount"))
    .await
}

async fn handle_unmount(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<UnmountRequest, ErrorResponse, _, _>(
        body,
        RouteName::Unmount,
        move |request| async move {
            debug!(volume = %request.name, "unmounting volume");
            driver.unmount(request).await
        },
    )
    .instrument(info_span!("handle-unmount"))
    .await
}

async fn handle_remove(State(driver): State<DriverState>, body: Body) -> Response {
    serve_request::<RemoveRequest, ErrorResponse, _, _>(
        body,
        RouteName::Remove,
        move |request| async move { driver.remove(request).await },
    )
    .instrument(info_span!("handle-remove"))
    .await
}
