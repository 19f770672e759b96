//! Filename recovery from a `Content-Disposition` header.
//!
//! Forms are tried in order: RFC 5987 `filename*=UTF-8''...`, then
//! `filename="..."`, then a bare `filename=token`. Parameter names match
//! case-insensitively.

use percent_encoding::percent_decode_str;

pub const FALLBACK_FILENAME: &str = "archivo";

pub fn filename_from_disposition(header: Option<&str>) -> Option<String> {
    let header = header?;
    extended_filename(header)
        .or_else(|| quoted_filename(header))
        .or_else(|| bare_filename(header))
}

fn extended_filename(header: &str) -> Option<String> {
    values_after(header, "filename*=utf-8''").find_map(|rest| {
        let raw = until(rest, ';')?;
        percent_decode_str(raw)
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
    })
}

fn quoted_filename(header: &str) -> Option<String> {
    values_after(header, "filename=\"").find_map(|rest| {
        let end = rest.find('"')?;
        let value = &rest[..end];
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn bare_filename(header: &str) -> Option<String> {
    let raw = values_after(header, "filename=").find_map(|rest| until(rest, ';'))?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Non-empty prefix of `rest` up to `stop`.
fn until(rest: &str, stop: char) -> Option<&str> {
    let value = rest.split(stop).next().unwrap_or_default();
    (!value.is_empty()).then_some(value)
}

/// Every remainder of `header` following a case-insensitive `needle`.
fn values_after<'a>(header: &'a str, needle: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let lowered = header.to_ascii_lowercase();
    let starts: Vec<usize> = lowered
        .match_indices(needle)
        .map(|(index, _)| index + needle.len())
        .collect();
    starts.into_iter().map(move |start| &header[start..])
}

/// Reduces a server-provided name to a single safe path component.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(&['/', '\\'][..]).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|ch| !ch.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_FILENAME.to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
#[path = "tests/disposition_tests.rs"]
mod tests;
