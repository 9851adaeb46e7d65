//! HTML escaping for user-facing messages

/// Escapes text for safe interpolation into HTML
pub trait HtmlEscaper: Send + Sync {
    fn escape(&self, input: &str) -> String;
}

/// Entity encoder backed by `html_escape::encode_safe`
///
/// `& < > " ' /` are replaced with entities; everything else passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEncoder;

impl HtmlEscaper for HtmlEncoder {
    fn escape(&self, input: &str) -> String {
        html_escape::encode_safe(input).into_owned()
    }
}
