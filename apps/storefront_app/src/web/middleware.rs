// apps/storefront_app/src/web/middleware.rs

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::web;
use chrono::Utc;
use std::time::Instant;
use storefront::models::ApiLog;
use uuid::Uuid;

use super::extractors::bearer_token;
use crate::state::AppState;

/// Queues one [`ApiLog`] entry per request. The write happens on the access
/// log task, never on the request path.
pub async fn record_access(
  req: ServiceRequest,
  next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
  let started = Instant::now();
  let state = req.app_data::<web::Data<AppState>>().cloned();
  let user_id = state.as_ref().and_then(|s| {
    let token = bearer_token(req.request())?;
    s.tokens.verify(token).ok().map(|claims| claims.sub)
  });
  let method = req.method().to_string();
  let endpoint = req.path().to_string();
  let ip_address = req.connection_info().realip_remote_addr().map(str::to_string);
  let user_agent = req
    .headers()
    .get(header::USER_AGENT)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string);

  let res = next.call(req).await?;

  if let Some(state) = state {
    let status = res.status();
    let error_message = res.response().error().map(|e| e.to_string());
    state.access_log.record(ApiLog {
      id: Uuid::new_v4(),
      user_id,
      method,
      endpoint,
      status_code: i32::from(status.as_u16()),
      response_time_ms: i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX),
      ip_address,
      user_agent,
      error_message,
      created_at: Utc::now(),
    });
  }
  Ok(res)
}
