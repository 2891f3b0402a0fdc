use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::services::ics::{DEFAULT_ICS_FILENAME, ICS_CONTENT_TYPE};

/// A calendar file delivered as a browser download
#[derive(Debug, Clone)]
pub struct IcsDownload {
    content: String,
    filename: String,
}

// Quotes, backslashes and control or non-ASCII characters cannot appear in
// a quoted header parameter
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .trim()
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();

    if cleaned.trim().is_empty() {
        DEFAULT_ICS_FILENAME.to_string()
    } else {
        cleaned
    }
}

/// Wrap serialized calendar text so it is served as an attachment
pub fn trigger_download(text: String, filename: &str) -> IcsDownload {
    IcsDownload {
        content: text,
        filename: sanitize_filename(filename),
    }
}

impl IcsDownload {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl IntoResponse for IcsDownload {
    fn into_response(self) -> Response {
        let disposition =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", self.filename))
                .unwrap_or_else(|_| {
                    HeaderValue::from_static("attachment; filename=\"meeting.ics\"")
                });

        debug!(
            "Serving calendar download {} ({} bytes)",
            self.filename,
            self.content.len()
        );

        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(ICS_CONTENT_TYPE)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.content,
        )
            .into_response()
    }
}
