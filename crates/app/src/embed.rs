use serde::Serialize;

/// Embed URL and iframe snippet for one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Embed {
    pub embed_url: String,
    pub embed_code: String,
}

pub fn embed_url(id: &str) -> String {
    format!("https://www.youtube.com/embed/{}", id)
}

/// Build the embed for `id`. No lookup happens here; callers decide
/// whether the id is known.
pub fn embed(id: &str) -> Embed {
    let embed_url = embed_url(id);
    let embed_code = format!(
        r#"<iframe width="560" height="315" src="{}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#,
        embed_url
    );
    Embed {
        embed_url,
        embed_code,
    }
}
