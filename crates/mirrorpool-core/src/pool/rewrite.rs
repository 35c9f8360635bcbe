/// Replace the leading `from` of `url` with `to`.
///
/// Purely textual; no URL parsing. Returns `None` when `url` does not start
/// with `from`, in which case nothing should be rewritten.
pub fn replace_mirror_prefix(url: &str, from: &str, to: &str) -> Option<String> {
    let rest = url.strip_prefix(from)?;
    let mut out = String::with_capacity(to.len() + rest.len());
    out.push_str(to);
    out.push_str(rest);
    Some(out)
}
