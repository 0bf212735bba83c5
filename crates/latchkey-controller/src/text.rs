//! Fitting free-form text onto the two display lines.

/// Split `message` into two display lines: the first `columns` characters,
/// then the next `columns`. Anything beyond is dropped.
///
/// # Examples
///
/// ```
/// use latchkey_controller::text::split_two_lines;
///
/// let (line1, line2) = split_two_lines("Capture failed: Camera timeout", 16);
/// assert_eq!(line1, "Capture failed: ");
/// assert_eq!(line2, "Camera timeout");
/// ```
pub fn split_two_lines(message: &str, columns: usize) -> (String, String) {
    let mut chars = message.chars();
    let line1: String = chars.by_ref().take(columns).collect();
    let line2: String = chars.take(columns).collect();
    (line1, line2)
}
