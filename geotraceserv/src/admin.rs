use actix_web::HttpRequest;

use crate::error::ApiError;

/// Header carrying the admin shared secret
pub const ADMIN_PIN_HEADER: &str = "x-admin-pin";

/// Gate for the admin API: a single static shared secret
pub struct AdminAuth {
    pin: String,
}

impl AdminAuth {
    pub fn new(pin: impl Into<String>) -> Self {
        AdminAuth { pin: pin.into() }
    }

    /// An empty header never matches, even if the configured pin is empty
    pub fn is_authorized(&self, req: &HttpRequest) -> bool {
        match req.headers().get(ADMIN_PIN_HEADER).and_then(|v| v.to_str().ok()) {
            Some(provided) => !provided.is_empty() && provided == self.pin,
            None => false,
        }
    }

    pub fn require(&self, req: &HttpRequest) -> Result<(), ApiError> {
        if self.is_authorized(req) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
