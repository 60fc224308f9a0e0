use serde::Serialize;

/// Longest payload rendering handed to a log event.
pub(crate) const PAYLOAD_PREVIEW_CHARS: usize = 2000;

/// Renders `payload` as pretty JSON, truncated to [`PAYLOAD_PREVIEW_CHARS`],
/// and passes it to `log_action`. Does nothing unless DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(payload: &T, log_action: F)
where
    T: Serialize + ?Sized,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    log_action(&render_preview(payload));
}

fn render_preview<T: Serialize + ?Sized>(payload: &T) -> String {
    match serde_json::to_string_pretty(payload) {
        Ok(json) if json.chars().count() > PAYLOAD_PREVIEW_CHARS => {
            format!("{:.len$}...", json, len = PAYLOAD_PREVIEW_CHARS)
        }
        Ok(json) => json,
        Err(error) => format!("<pretty serialize failed: {error}>"),
    }
}
