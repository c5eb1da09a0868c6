use super::RenderRequest;

const BACKGROUND: &str = "#2563eb";
const FONT_FAMILY: &str = "Arial, sans-serif";
const CAPTION: &str = "AWS Lambda + Rust";

/// Vector description of the label: background, the requested text
/// centered, and a fixed caption underneath.
pub(super) fn label_svg(request: &RenderRequest) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">
    <rect width="100%" height="100%" fill="{BACKGROUND}"/>
    <text x="50%" y="50%" font-family="{FONT_FAMILY}" font-size="30" fill="white" text-anchor="middle" dy=".3em">{text}</text>
    <text x="50%" y="60%" font-family="{FONT_FAMILY}" font-size="16" fill="white" text-anchor="middle">{CAPTION}</text>
</svg>"#,
        width = request.width,
        height = request.height,
        text = escape_xml(&request.text),
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
