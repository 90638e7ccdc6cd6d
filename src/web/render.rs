//! HTML rendering and URL escaping for the viewer

use std::fmt::Write;

/// Escape text for an HTML body or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a path segment or query value (RFC 3986 unreserved kept)
pub fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// Decode `%XX` escapes; malformed escapes are kept literally
pub fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// =============================================================================
// Pages
// =============================================================================

fn page(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// List of buckets, each linking to its keys
pub fn bucket_list(title: &str, buckets: &[String]) -> String {
    let mut body = format!("<h1>{}</h1>\n<ul>\n", escape_html(title));
    for bucket in buckets {
        let _ = writeln!(
            body,
            "<li><a href=\"/get/{}/\">{}</a></li>",
            percent_encode(bucket),
            escape_html(bucket)
        );
    }
    body.push_str("</ul>\n");
    page(title, &body)
}

/// List of keys in a bucket, with an optional link to the following page
pub fn key_list(bucket: &str, heading: &str, keys: &[String], next: Option<&str>) -> String {
    let mut body = format!(
        "<h1>{} - {}</h1>\n<ul>\n",
        escape_html(bucket),
        escape_html(heading)
    );
    for key in keys {
        let _ = writeln!(
            body,
            "<li><a href=\"/get/{}/{}/\">{}</a></li>",
            percent_encode(bucket),
            percent_encode(key),
            escape_html(key)
        );
    }
    body.push_str("</ul>\n");

    if let Some(next) = next {
        let _ = writeln!(
            body,
            "<a href=\"/get/{}/?after={}\">next</a>",
            percent_encode(bucket),
            percent_encode(next)
        );
    }

    page(&format!("{} - {}", bucket, heading), &body)
}

/// A single value, shown as (lossy) UTF-8 text
pub fn value_page(bucket: &str, key: &str, value: &[u8]) -> String {
    let body = format!(
        "<h1>{} - {}</h1>\n<pre>{}</pre>\n",
        escape_html(bucket),
        escape_html(key),
        escape_html(&String::from_utf8_lossy(value))
    );
    page(&format!("{} - {}", bucket, key), &body)
}

/// Error page
pub fn error_page(status: u16, message: &str) -> String {
    let body = format!("<h1>{}</h1>\n<p>{}</p>\n", status, escape_html(message));
    page("Error", &body)
}
