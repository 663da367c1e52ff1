//! Alert system for displaying error messages to users.
//!
//! Alerts are rendered as HTML fragments which HTMX swaps into the
//! `#alert-container` element of the base page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An error message with a short summary and optional details.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    message: String,
    details: String,
}

impl Alert {
    /// Create a new error alert
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        html!(
            div
                role="alert"
                class="flex items-start p-4 mb-4 text-sm border rounded-lg
                    text-red-800 border-red-300 bg-red-50
                    dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            {
                span class="shrink-0 me-3 font-bold" { "!" }

                div
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p class="mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    class="ms-auto -mx-1.5 -my-1.5 p-1.5 rounded-lg"
                    aria-label="Close"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        )
    }

    /// Render the alert as a response with `status_code`.
    ///
    /// The `HX-Reswap` header makes HTMX swap the alert into the alert
    /// container instead of replacing the element that made the request.
    pub fn into_response(self, status_code: StatusCode) -> Response {
        (
            status_code,
            [("HX-Retarget", "#alert-container"), ("HX-Reswap", "innerHTML")],
            self.into_html(),
        )
            .into_response()
    }
}
