//! `descriptor.mod` rewriting
//!
//! A descriptor is a list of `key="value"` lines. The launcher needs a `path`
//! key pointing at the installed mod folder, and dev builds get a suffix on the
//! display name so both versions can be told apart in the launcher.

use std::path::Path;

/// File name of the descriptor at the mod root.
pub const DESCRIPTOR_FILE_NAME: &str = "descriptor.mod";

/// Rewrite descriptor text for installation at `output_path`.
///
/// Any existing `path=` lines are dropped and a single
/// `path="<output_path>"` line is appended. When `name_suffix` is given it is
/// inserted before the closing quote of the first `name` line; a descriptor
/// without a `name` line is left alone.
pub fn rewrite_descriptor(text: &str, output_path: &str, name_suffix: Option<&str>) -> String {
    let mut out = String::with_capacity(text.len() + output_path.len() + 16);
    let mut name_done = name_suffix.is_none();

    for line in text.split_inclusive('\n') {
        if line.split_once('=').is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("path")) {
            continue;
        }

        if !name_done && key_matches(line, "name") {
            name_done = true;
            if let (Some(suffix), Some(quote)) = (name_suffix, line.rfind('"')) {
                out.push_str(&line[..quote]);
                out.push_str(suffix);
                out.push_str(&line[quote..]);
                continue;
            }
        }

        out.push_str(line);
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("path=\"{}\"\n", output_path));
    out
}

/// Render a path the way descriptors expect it (forward slashes).
pub fn descriptor_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Read the value of a key, e.g. `name`, from descriptor text.
pub fn descriptor_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().filter(|line| key_matches(line, key)).find_map(|line| {
        let (_, value) = line.split_once('=')?;
        let value = value.trim();
        Some(value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value))
    })
}

/// Case-insensitive check that a trimmed line starts with `key`.
fn key_matches(line: &str, key: &str) -> bool {
    let line = line.trim_start();
    line.len() >= key.len()
        && line.is_char_boundary(key.len())
        && line[..key.len()].eq_ignore_ascii_case(key)
}
