//! HTTP routes over a shared [`BucketedWindow`]
//!
//! | Route                   | Result                                                   |
//! |-------------------------|----------------------------------------------------------|
//! | `POST /transactions`    | 201 recorded, 204 too old, 422 future/unparseable/huge   |
//! | `DELETE /transactions`  | 204                                                      |
//! | `GET /statistics`       | 200 with [`StatisticsView`] JSON                         |
//!
//! Window calls are synchronous and may wait on bucket locks, so they run on
//! the blocking pool. A panic inside the window is a fault: it is logged at
//! error level and answered with a bare 500.

use super::dto::TransactionDto;
use super::outcome::ProcessingError;
use super::view::StatisticsView;
use crate::window_core::BucketedWindow;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::task::JoinError;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// All routes, with rejection recovery applied
pub fn routes(
    window: Arc<BucketedWindow>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let create = warp::path("transactions")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_window(window.clone()))
        .and_then(create_transaction);

    let delete = warp::path("transactions")
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_window(window.clone()))
        .and_then(delete_transactions);

    let statistics = warp::path("statistics")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_window(window))
        .and_then(get_statistics);

    create.or(delete).or(statistics).recover(handle_rejection)
}

fn with_window(
    window: Arc<BucketedWindow>,
) -> impl Filter<Extract = (Arc<BucketedWindow>,), Error = Infallible> + Clone {
    warp::any().map(move || window.clone())
}

async fn create_transaction(
    dto: TransactionDto,
    window: Arc<BucketedWindow>,
) -> Result<Response, Infallible> {
    let event = match dto.parse() {
        Ok(event) => event,
        Err(err) => {
            log::debug!("Rejected transaction {:?}: {}", dto, err);
            return Ok(status_only(err.http_status()));
        }
    };

    let outcome =
        tokio::task::spawn_blocking(move || window.ingest(event.amount, event.timestamp)).await;

    Ok(match outcome {
        Ok(Ok(())) => status_only(StatusCode::CREATED),
        Ok(Err(rejected)) => {
            log::debug!("Rejected transaction {:?}: {}", dto, rejected);
            status_only(ProcessingError::from(rejected).http_status())
        }
        Err(err) => fault_response("create transaction", err),
    })
}

async fn delete_transactions(window: Arc<BucketedWindow>) -> Result<Response, Infallible> {
    Ok(match tokio::task::spawn_blocking(move || window.reset_all()).await {
        Ok(()) => status_only(StatusCode::NO_CONTENT),
        Err(err) => fault_response("reset window", err),
    })
}

async fn get_statistics(window: Arc<BucketedWindow>) -> Result<Response, Infallible> {
    Ok(match tokio::task::spawn_blocking(move || window.snapshot()).await {
        Ok(stats) => warp::reply::json(&StatisticsView::from(&stats)).into_response(),
        Err(err) => fault_response("read statistics", err),
    })
}

fn status_only(status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply(), status).into_response()
}

fn fault_response(operation: &str, err: JoinError) -> Response {
    log::error!("❌ Unhandled error during {}: {}", operation, err);
    status_only(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Map warp's own rejections (unknown path, bad JSON, ...) to bare status codes
async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        StatusCode::BAD_REQUEST
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        StatusCode::LENGTH_REQUIRED
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        StatusCode::METHOD_NOT_ALLOWED
    } else {
        log::error!("❌ Unhandled rejection: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok(status_only(status))
}
