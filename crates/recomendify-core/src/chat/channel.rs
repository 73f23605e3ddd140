//! Live channel naming.

/// Prefix of every conversation channel.
pub const CHANNEL_PREFIX: &str = "msg:";

/// Channel name for the conversation between `a` and `b`.
///
/// The ids are sorted so both participants derive the same name.
pub fn channel_name(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{CHANNEL_PREFIX}{first}-{second}")
}
