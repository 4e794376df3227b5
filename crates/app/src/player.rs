//! HTML rendering for the video player.
//!
//! [`render_player_page`] builds the full document that mounts the bundled
//! `<tutorial-video-player>` element. [`player_markup`] is the element's
//! own rendering as a pure function; the page uses it as light-DOM
//! fallback, shown until the script upgrades the element.

use crate::catalog::VideoRecord;
use crate::embed::embed_url;

/// Custom element tag defined by the bundled script.
pub const PLAYER_TAG: &str = "tutorial-video-player";

/// Escape `"` for use inside a double-quoted attribute.
///
/// This is the only escaping applied to title and description attributes;
/// other markup characters pass through unchanged.
pub fn escape_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Full HTML text escaping, as the browser element applies to text nodes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Heading shown for a record without a title.
pub const DEFAULT_TITLE: &str = "Tutorial Video";

/// Render the player element's contents for `record`.
pub fn player_markup(record: &VideoRecord) -> String {
    let title: &str = if record.title.is_empty() {
        DEFAULT_TITLE
    } else {
        &record.title
    };
    let mut header = format!(
        "<div class=\"video-header\"><h3 class=\"video-title\">{}</h3>",
        escape_html(title)
    );
    if !record.description.is_empty() {
        header.push_str(&format!(
            "<p class=\"video-description\">{}</p>",
            escape_html(&record.description)
        ));
    }
    header.push_str("</div>");

    format!(
        r#"<style>
      .video-container {{ background: #f9fafb; border: 1px solid #e5e7eb; border-radius: 12px; padding: 16px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }}
      .video-header {{ margin-bottom: 12px; }}
      .video-title {{ font-size: 16px; font-weight: 600; color: #111827; margin: 0 0 4px 0; }}
      .video-description {{ font-size: 14px; color: #6b7280; margin: 0; }}
      .video-wrapper {{ position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden; border-radius: 8px; background: #000; }}
      .video-wrapper iframe {{ position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: none; }}
      .video-link {{ margin-top: 8px; font-size: 12px; }}
      .video-link a {{ color: #2563eb; text-decoration: none; }}
    </style>
    <div class="video-container">
      {header}
      <div class="video-wrapper">
        <iframe src="{src}?rel=0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen loading="lazy"></iframe>
      </div>
      <div class="video-link">
        <a href="https://www.youtube.com/watch?v={id}" target="_blank" rel="noopener noreferrer">Watch on YouTube</a>
      </div>
    </div>"#,
        header = header,
        src = embed_url(&record.id),
        id = record.id,
    )
}

/// Render the complete player document with `bundled_script` inlined.
pub fn render_player_page(record: &VideoRecord, bundled_script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>
    body {{
      margin: 0;
      padding: 20px;
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
      background: #f5f5f5;
    }}
    .container {{
      max-width: 900px;
      margin: 0 auto;
    }}
  </style>
</head>
<body>
  <div class="container">
    <{tag}
      video-id="{id}"
      title="{title_attr}"
      description="{description_attr}"
    >
    {fallback}
    </{tag}>
  </div>

  <script type="module">
{script}
  </script>
</body>
</html>"#,
        title = record.title,
        tag = PLAYER_TAG,
        id = record.id,
        title_attr = escape_attr(&record.title),
        description_attr = escape_attr(&record.description),
        fallback = player_markup(record),
        script = bundled_script,
    )
}

/// Page returned for an unknown video id.
pub fn not_found_page(id: &str) -> String {
    format!(
        r#"<html>
  <body>
    <h1>Video not found</h1>
    <p>Video ID: {}</p>
    <a href="/">Back to home</a>
  </body>
</html>"#,
        id
    )
}

/// Page returned while the bundled player script is unavailable.
pub fn bundle_unavailable_page() -> &'static str {
    r#"<html>
  <body>
    <h1>Error: Web component not loaded</h1>
    <p>Please run: tutorial-build</p>
  </body>
</html>"#
}
