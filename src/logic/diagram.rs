use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

use crate::model::Diagram;

/// Id of the element wrapping the diagram in generated HTML documentation
pub const DEFAULT_CONTAINER_ID: &str = "diagram";

pub const ZOOM_IN_FACTOR: f64 = 1.1;
pub const ZOOM_OUT_FACTOR: f64 = 0.9;
pub const MIN_ZOOM: f64 = 0.1;
pub const TRANSFORM_ORIGIN: &str = "center center";

fn svg_open_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<svg\b[^>]*>").expect("valid svg tag pattern"))
}

fn svg_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(/?)svg\b[^>]*>").expect("valid svg tags pattern"))
}

fn size_attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)\s(width|height)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("valid size attribute pattern")
    })
}

fn img_src() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("valid img pattern")
    })
}

/// Extract the diagram from a generated HTML fragment.
///
/// Looks inside the element whose id is `container_id`. Inline SVG wins over
/// a raster `<img>`; relative image references are resolved against
/// `asset_base` when one is given.
pub fn load_diagram(html: &str, container_id: &str, asset_base: Option<&str>) -> Option<Diagram> {
    let body = container_body(html, container_id)?;

    if let Some(svg) = first_element(body, svg_open_tag(), svg_tags()) {
        return Some(Diagram::Svg {
            markup: make_scalable(svg),
        });
    }

    let caps = img_src().captures(body)?;
    let src = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    if src.is_empty() {
        return None;
    }
    let src = match asset_base {
        Some(base) => resolve_asset_url(src, base),
        None => src.to_string(),
    };
    Some(Diagram::Image { src })
}

/// Inner markup of the element carrying `id="<container_id>"`
fn container_body<'h>(html: &'h str, container_id: &str) -> Option<&'h str> {
    let open_pattern = format!(
        r#"(?is)<([a-z][a-z0-9-]*)\b[^>]*?\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(container_id)
    );
    let open = Regex::new(&open_pattern).ok()?;
    let caps = open.captures(html)?;
    let whole = caps.get(0)?;
    if whole.as_str().ends_with("/>") {
        return Some("");
    }

    let tag = regex::escape(caps.get(1)?.as_str());
    let tags = Regex::new(&format!(r"(?is)<(/?){}\b[^>]*>", tag)).ok()?;
    let rest = &html[whole.end()..];
    match closing_offset(rest, &tags) {
        Some((start, _)) => Some(&rest[..start]),
        None => Some(rest),
    }
}

/// Start and end of the tag closing the element opened just before `rest`
fn closing_offset(rest: &str, tags: &Regex) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for caps in tags.captures_iter(rest) {
        let m = caps.get(0)?;
        let closing = caps.get(1).map_or(false, |c| !c.as_str().is_empty());
        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((m.start(), m.end()));
            }
        } else if !m.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

fn first_element<'b>(body: &'b str, open: &Regex, tags: &Regex) -> Option<&'b str> {
    let start = open.find(body)?;
    if start.as_str().ends_with("/>") {
        return Some(start.as_str());
    }
    let rest = &body[start.end()..];
    let end = match closing_offset(rest, tags) {
        Some((_, end)) => start.end() + end,
        None => body.len(),
    };
    Some(&body[start.start()..end])
}

/// Drop fixed width/height from the root `<svg>` tag so it follows its container
fn make_scalable(svg: &str) -> String {
    let Some(open) = svg_open_tag().find(svg) else {
        return svg.to_string();
    };
    let tag = open.as_str();

    let mut width = None;
    let mut height = None;
    for caps in size_attribute().captures_iter(tag) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|v| v.as_str().trim().trim_end_matches("px").to_string());
        match caps.get(1).map(|n| n.as_str().to_ascii_lowercase()).as_deref() {
            Some("width") => width = value,
            Some("height") => height = value,
            _ => {}
        }
    }

    let stripped = size_attribute().replace_all(tag, "").into_owned();
    let (head, close) = match stripped.strip_suffix("/>") {
        Some(head) => (head.trim_end().to_string(), "/>"),
        None => (
            stripped
                .strip_suffix('>')
                .unwrap_or(&stripped)
                .trim_end()
                .to_string(),
            ">",
        ),
    };

    let lower = head.to_ascii_lowercase();
    let mut rebuilt = head;
    if !lower.contains("viewbox") {
        let w = width.as_deref().and_then(|w| w.parse::<f64>().ok());
        let h = height.as_deref().and_then(|h| h.parse::<f64>().ok());
        if let (Some(w), Some(h)) = (w, h) {
            rebuilt.push_str(&format!(r#" viewBox="0 0 {} {}""#, w, h));
        }
    }
    if !lower.contains("preserveaspectratio") {
        rebuilt.push_str(r#" preserveAspectRatio="xMidYMid meet""#);
    }
    rebuilt.push_str(close);

    format!("{}{}{}", &svg[..open.start()], rebuilt, &svg[open.end()..])
}

/// Resolve an image reference found in a fragment against the fragment's directory URL
pub fn resolve_asset_url(src: &str, base_dir: &str) -> String {
    let base = format!("{}/", base_dir.trim_end_matches('/'));
    match Url::parse(&base).and_then(|base| base.join(src)) {
        Ok(url) => url.into(),
        Err(err) => {
            log::debug!("keeping unresolvable asset reference {}: {}", src, err);
            src.to_string()
        }
    }
}

/// Pan/zoom state of a rendered diagram, applied as translate then scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    #[serde(skip)]
    drag_anchor: Option<(f64, f64)>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            drag_anchor: None,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// One wheel tick; positive delta zooms out
    pub fn wheel(&mut self, delta_y: f64) -> f64 {
        let factor = if delta_y > 0.0 {
            ZOOM_OUT_FACTOR
        } else {
            ZOOM_IN_FACTOR
        };
        self.zoom = (self.zoom * factor).max(MIN_ZOOM);
        self.zoom
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.drag_anchor = Some((x, y));
    }

    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.drag_anchor {
            self.translate_x += x - last_x;
            self.translate_y += y - last_y;
            self.drag_anchor = Some((x, y));
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// CSS transform value; pair with `transform-origin: center center`
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.zoom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG_FRAGMENT: &str = r#"<html><body>
<div class="header"><svg width="10" height="10"><rect/></svg></div>
<div id="diagram" class="box"><div class="inner">
<svg xmlns="http://www.w3.org/2000/svg" width="800px" height="600" class="d"><g><svg width="5"></svg></g></svg>
</div></div>
<p>after</p>
</body></html>"#;

    #[test]
    fn test_svg_is_made_scalable() {
        let diagram = load_diagram(SVG_FRAGMENT, DEFAULT_CONTAINER_ID, None).unwrap();
        let Diagram::Svg { markup } = diagram else {
            panic!("expected svg");
        };

        assert!(markup.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="d" viewBox="0 0 800 600" preserveAspectRatio="xMidYMid meet">"#
        ));
        // nested svg is untouched and the outer element is closed
        assert!(markup.contains(r#"<svg width="5"></svg>"#));
        assert!(markup.ends_with("</g></svg>"));
    }

    #[test]
    fn test_existing_viewbox_is_kept() {
        let html = r#"<div id='diagram'><svg viewBox="0 0 1 1" width="9" height="9" preserveAspectRatio="none"></svg></div>"#;
        let Some(Diagram::Svg { markup }) = load_diagram(html, "diagram", None) else {
            panic!("expected svg");
        };
        assert_eq!(markup, r#"<svg viewBox="0 0 1 1" preserveAspectRatio="none"></svg>"#);
    }

    #[test]
    fn test_raster_image_source() {
        let html = r#"<section id="diagram"><img alt="d" src="Batch.png"></section>"#;
        let diagram = load_diagram(
            html,
            "diagram",
            Some("https://raw.githubusercontent.com/org/repo/main/io.catenax.batch/2.0.0/gen"),
        );
        assert_eq!(
            diagram,
            Some(Diagram::Image {
                src: "https://raw.githubusercontent.com/org/repo/main/io.catenax.batch/2.0.0/gen/Batch.png"
                    .to_string()
            })
        );

        let inline = r#"<div id="diagram"><img src="data:image/png;base64,AAAA"/></div>"#;
        assert_eq!(
            load_diagram(inline, "diagram", Some("https://x")),
            Some(Diagram::Image {
                src: "data:image/png;base64,AAAA".to_string()
            })
        );
    }

    #[test]
    fn test_missing_container_or_graphic() {
        assert_eq!(load_diagram("<div><svg></svg></div>", "diagram", None), None);
        assert_eq!(load_diagram(r#"<div id="diagram"><p>none</p></div>"#, "diagram", None), None);
        // graphics outside the container are ignored
        let html = r#"<div id="diagram"></div><img src="a.png">"#;
        assert_eq!(load_diagram(html, "diagram", None), None);
    }

    #[test]
    fn test_resolve_asset_url() {
        assert_eq!(resolve_asset_url("../img/a.png", "https://h/r/m/1.0/gen"), "https://h/r/m/1.0/img/a.png");
        assert_eq!(resolve_asset_url("/a.png", "https://h/r/m"), "https://h/a.png");
        assert_eq!(resolve_asset_url("https://cdn/a.png", "https://h"), "https://cdn/a.png");
        assert_eq!(
            resolve_asset_url("HTTPS://cdn.example/a.png", "https://raw.example/r/m/1.0/gen"),
            "https://cdn.example/a.png"
        );
        assert_eq!(resolve_asset_url("blob:https://x/1", "https://raw.example/r/gen"), "blob:https://x/1");
        assert_eq!(
            resolve_asset_url("../../../../x.png?v=2#top", "https://h/r/gen/"),
            "https://h/x.png?v=2#top"
        );
        assert_eq!(resolve_asset_url("//cdn/a.png", "https://h/r"), "https://cdn/a.png");
    }

    #[test]
    fn test_container_id_is_matched_exactly() {
        let html = r#"<div data-id="diagram"><img src="wrong.png"></div>
<div class="c" id="diagram"><img src="right.png"></div>"#;
        assert_eq!(
            load_diagram(html, "diagram", None),
            Some(Diagram::Image {
                src: "right.png".to_string()
            })
        );
        assert_eq!(load_diagram(r#"<div data-id="diagram"><svg></svg></div>"#, "diagram", None), None);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut transform = ViewTransform::new();
        transform.wheel(-1.0);
        assert!((transform.zoom - 1.1).abs() < 1e-9);
        transform.wheel(1.0);
        assert!((transform.zoom - 0.99).abs() < 1e-9);

        for _ in 0..100 {
            transform.wheel(1.0);
        }
        assert_eq!(transform.zoom, MIN_ZOOM);

        // no ceiling
        for _ in 0..100 {
            transform.wheel(-1.0);
        }
        assert!(transform.zoom > 1000.0);
    }

    #[test]
    fn test_drag_pans_and_reset() {
        let mut transform = ViewTransform::new();
        transform.drag_to(50.0, 50.0);
        assert_eq!(transform.translate_x, 0.0);

        transform.begin_drag(10.0, 10.0);
        transform.drag_to(20.0, 15.0);
        transform.drag_to(25.0, 5.0);
        transform.end_drag();
        assert!(!transform.is_dragging());
        assert_eq!((transform.translate_x, transform.translate_y), (15.0, -5.0));

        transform.wheel(-1.0);
        assert_eq!(transform.css_transform(), "translate(15px, -5px) scale(1.1)");

        transform.reset();
        assert_eq!(transform, ViewTransform::default());
    }
}
