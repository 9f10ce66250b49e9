use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use url::Url;

/// Decodes a query-style string into a flat key/value map.
///
/// The whole input is URL-decoded once before splitting, so `&` and `=`
/// escaped inside the input act as separators after decoding. Empty
/// segments are skipped, a segment without `=` maps to an empty value and
/// a repeated key keeps its last value.
pub fn decode_parameters(encoded: Option<&str>) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let encoded = match encoded {
        Some(s) if !s.is_empty() => s,
        _ => return params,
    };

    let decoded = decode_component(encoded);

    for pair in decoded.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name, value),
            None => (pair, ""),
        };
        params.insert(name.to_string(), value.to_string());
    }

    params
}

/// Returns the raw (still encoded) value of the `state` parameter of `url`.
pub fn extract_state(url: &Url) -> Option<&str> {
    let query = url.query().filter(|q| !q.is_empty())?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("state="))
}

/// Parameters carried by the query part of a request URL given as plain text,
/// i.e. everything after the first `?`.
pub fn request_url_parameters(request_url: &str) -> HashMap<String, String> {
    match request_url.split_once('?') {
        Some((_, query)) => decode_parameters(Some(query)),
        None => HashMap::new(),
    }
}

/// Decodes a single form-urlencoded value: `+` is a space, `%XX` escapes
/// are decoded and invalid UTF-8 is replaced.
pub fn decode_component(s: &str) -> String {
    let plus_as_space = s.replace('+', " ");
    percent_decode_str(&plus_as_space)
        .decode_utf8_lossy()
        .into_owned()
}
