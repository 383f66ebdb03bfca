//! Browser bindings, built with `--features wasm` for `wasm32` targets.

use wasm_bindgen::prelude::*;

/// Format untrusted text into an HTML fragment safe for `innerHTML`.
#[wasm_bindgen(js_name = formatMessage)]
pub fn format_message(content: &str) -> String {
    crate::format::format_message(content)
}

#[wasm_bindgen(js_name = escapeHtml)]
pub fn escape_html(text: &str) -> String {
    crate::escape::escape_html(text)
}

#[wasm_bindgen(js_name = isSafeAudioUrl)]
pub fn is_safe_audio_url(url: &str) -> bool {
    crate::chat::is_safe_audio_url(url)
}
