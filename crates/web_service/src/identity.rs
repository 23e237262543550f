//! Request identity
//!
//! Viewers present the session token they obtained from `POST /v1/session`
//! in the `X-Party-Session` header. Requests without one act as a fresh
//! anonymous identity; a header that does not parse is rejected.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use party_sync::Identity;

use crate::error::AppError;

pub const SESSION_HEADER: &str = "X-Party-Session";

#[derive(Debug, Clone)]
pub struct SessionIdentity(pub Identity);

impl SessionIdentity {
    pub fn into_inner(self) -> Identity {
        self.0
    }
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, AppError> {
    match req.headers().get(SESSION_HEADER) {
        None => Ok(Identity::anonymous()),
        Some(value) => {
            let token = value
                .to_str()
                .map_err(|_| AppError::Identity("session header is not valid text".to_string()))?;
            Ok(Identity::from_token(token)?)
        }
    }
}

impl FromRequest for SessionIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req).map(SessionIdentity))
    }
}
