//! Minimal inline page rendering. User-supplied text is escaped before it is
//! interpolated into markup.

use storage::StoredResult;

pub struct Flash {
    pub message: String,
    pub is_error: bool,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Maps the short tokens carried in redirect query strings back to
/// human-readable transient messages. Unknown tokens render nothing.
pub fn flash_from_query(notice: Option<&str>, error: Option<&str>) -> Option<Flash> {
    if let Some(token) = notice {
        let message = match token {
            "deleted" => "Result deleted.",
            "updated" => "Result updated.",
            _ => return None,
        };
        return Some(Flash::notice(message));
    }
    if let Some(token) = error {
        let message = match token {
            "not_found" => "Result not found.",
            "invalid_number" => "Volumes must be numeric.",
            "storage" => "An internal error occurred.",
            _ => return None,
        };
        return Some(Flash::error(message));
    }
    None
}

pub fn index_page(
    result: Option<(f64, f64)>,
    location_name: &str,
    site_name: &str,
    flash: Option<Flash>,
) -> String {
    let result_block = match result {
        Some((liters, barrels)) => format!(
            r#"<section class="result">
  <p>Volume: <strong>{liters:.1} L</strong> ({barrels:.1} bbl)</p>
</section>"#
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<h1>Well volume calculator</h1>
{flash}
<form method="post" action="/">
  <label>Distance (m) <input name="distance" required></label>
  <label>Option
    <select name="selector">
      <option value="A">A (2.019 L/m)</option>
      <option value="B">B (3.020 L/m)</option>
      <option value="C">C (4.513 L/m)</option>
    </select>
  </label>
  <label>Location <input name="location_name" value="{location}" required></label>
  <label>Site <input name="site_name" value="{site}" required></label>
  <button type="submit">Calculate</button>
</form>
{result_block}"#,
        flash = flash_block(flash),
        location = escape_html(location_name),
        site = escape_html(site_name),
    );
    page("Well volume calculator", &body)
}

pub fn history_page(results: &[StoredResult], flash: Option<Flash>) -> String {
    let mut rows = String::new();
    for r in results {
        rows.push_str(&format!(
            r#"<tr>
  <td>{id}</td>
  <td>{location}</td>
  <td>{site}</td>
  <td>{liters:.1}</td>
  <td>{barrels:.1}</td>
  <td>{recorded_at}</td>
  <td><a href="/history/{id}/edit">Edit</a></td>
  <td>
    <form method="post" action="/history/{id}/delete">
      <button type="submit">Delete</button>
    </form>
  </td>
</tr>
"#,
            id = r.id,
            location = escape_html(&r.location_name),
            site = escape_html(&r.site_name),
            liters = r.volume_liters,
            barrels = r.volume_barrels,
            recorded_at = escape_html(&r.recorded_at),
        ));
    }

    let table = if results.is_empty() {
        "<p>No results recorded yet.</p>".to_string()
    } else {
        format!(
            r#"<table>
<thead>
<tr><th>Id</th><th>Location</th><th>Site</th><th>Liters</th><th>Barrels</th><th>Recorded at</th><th></th><th></th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>"#
        )
    };

    let body = format!(
        "<h1>History</h1>\n{flash}\n{table}\n<p><a href=\"/\">Back to calculator</a></p>",
        flash = flash_block(flash),
    );
    page("History", &body)
}

pub fn edit_page(result: &StoredResult, flash: Option<Flash>) -> String {
    let body = format!(
        r#"<h1>Edit result {id}</h1>
{flash}
<form method="post" action="/history/{id}/edit">
  <label>Location <input name="location_name" value="{location}" required></label>
  <label>Site <input name="site_name" value="{site}" required></label>
  <label>Liters <input name="volume_liters" value="{liters:.1}" required></label>
  <label>Barrels <input name="volume_barrels" value="{barrels:.1}" required></label>
  <button type="submit">Save</button>
</form>
<p><a href="/history">Back to history</a></p>"#,
        id = result.id,
        flash = flash_block(flash),
        location = escape_html(&result.location_name),
        site = escape_html(&result.site_name),
        liters = result.volume_liters,
        barrels = result.volume_barrels,
    );
    page("Edit result", &body)
}

pub fn about_page() -> String {
    let body = "<h1>About</h1>\n\
        <p>This tool converts a measured distance into a well volume using one \
        of three fixed factors, keeps the most recent results, and lets you \
        review, edit, or delete them.</p>\n\
        <p><a href=\"/\">Back to calculator</a></p>";
    page("About", body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav><a href="/">Calculator</a> | <a href="/history">History</a> | <a href="/about">About</a></nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn flash_block(flash: Option<Flash>) -> String {
    match flash {
        Some(flash) => {
            let class = if flash.is_error { "error" } else { "notice" };
            format!(
                r#"<p class="{class}">{}</p>"#,
                escape_html(&flash.message)
            )
        }
        None => String::new(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ResultId;

    fn sample() -> StoredResult {
        StoredResult {
            id: ResultId(3),
            location_name: "Springfield".to_string(),
            site_name: "Well 7".to_string(),
            volume_liters: 201.9,
            volume_barrels: 1.3,
            recorded_at: "01/02/2026 10:20:30".to_string(),
        }
    }

    #[test]
    fn escapes_markup_in_user_text() {
        assert_eq!(
            escape_html(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn history_rows_escape_names() {
        let mut result = sample();
        result.location_name = "<script>".to_string();
        let html = history_page(&[result], None);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn index_shows_rounded_result_when_present() {
        let html = index_page(Some((201.9, 1.3)), "Springfield", "Well 7", None);
        assert!(html.contains("201.9"));
        assert!(html.contains("1.3"));
        assert!(html.contains("Springfield"));
    }

    #[test]
    fn known_flash_tokens_map_to_messages() {
        let deleted = flash_from_query(Some("deleted"), None).expect("flash");
        assert_eq!(deleted.message, "Result deleted.");
        assert!(!deleted.is_error);

        let not_found = flash_from_query(None, Some("not_found")).expect("flash");
        assert!(not_found.is_error);

        assert!(flash_from_query(Some("bogus"), None).is_none());
        assert!(flash_from_query(None, None).is_none());
    }

    #[test]
    fn edit_page_prefills_current_values() {
        let html = edit_page(&sample(), None);
        assert!(html.contains(r#"action="/history/3/edit""#));
        assert!(html.contains(r#"value="Well 7""#));
        assert!(html.contains(r#"value="201.9""#));
    }
}
