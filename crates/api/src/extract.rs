//! Extractors whose rejections render through [`AppError`].
//!
//! Axum's stock `Json` and `Query` extractors reject with plain-text bodies;
//! these wrappers keep malformed requests on the `{ success, message }`
//! contract.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor rejecting with a 400 [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor rejecting with a 400 [`AppError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
