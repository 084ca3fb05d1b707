//! Responses and the conversion trait used when claiming a request.

/// A response produced by a route handler or by the not-found fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Option<String>,
    location: Option<String>,
}

impl Response {
    /// A `200` response with a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    /// A response with an explicit status and body.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            location: None,
        }
    }

    /// A `404` response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::with_status(404, body)
    }

    /// A redirect to `location`.
    pub fn redirect(location: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            body: None,
            location: Some(location.into()),
        }
    }

    /// A bodiless response with the given status.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: None,
            location: None,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body text, if any.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether this is a redirect.
    pub fn is_redirect(&self) -> bool {
        self.location.is_some()
    }

    /// Take the body out.
    pub fn into_body(self) -> Option<String> {
        self.body
    }

    /// Transform the body, leaving bodiless responses untouched.
    pub fn map_body(mut self, f: impl FnOnce(String) -> String) -> Self {
        self.body = self.body.map(f);
        self
    }
}

/// Conversion of handler output into a [`Response`].
///
/// # Default Implementations
///
/// - `Response` → as is
/// - `String` / `&str` → `200` with that body
/// - `(u16, body)` → the given status with that body
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoResponse`",
    label = "missing `IntoResponse` implementation",
    note = "Claim a request with a `Response`, a string, or a `(status, body)` pair."
)]
pub trait IntoResponse {
    /// Convert into a response.
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        Response::ok(self)
    }
}

impl IntoResponse for &str {
    fn into_response(self) -> Response {
        Response::ok(self)
    }
}

impl IntoResponse for (u16, String) {
    fn into_response(self) -> Response {
        Response::with_status(self.0, self.1)
    }
}

impl IntoResponse for (u16, &str) {
    fn into_response(self) -> Response {
        Response::with_status(self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_become_ok_responses() {
        let response = "OK".into_response();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), Some("OK"));
    }

    #[test]
    fn map_body_skips_redirects() {
        let redirect = Response::redirect("/login", 302).map_body(|b| b.to_uppercase());
        assert_eq!(redirect.body(), None);
        assert_eq!(redirect.location(), Some("/login"));

        let page = Response::ok("hi").map_body(|b| b.to_uppercase());
        assert_eq!(page.body(), Some("HI"));
    }
}
