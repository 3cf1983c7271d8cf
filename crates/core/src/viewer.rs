//! Standalone viewer document rendering.
//!
//! Produces a single HTML page that loads A-Frame and AR.js from their CDNs,
//! declares one marker element per target and places each bound asset under
//! its target with the stored transform. Detections are reported back to the
//! metrics endpoint.

use std::fmt::Write;

use serde::Serialize;

use crate::asset::AssetType;
use crate::experience_config::{MarkerType, Transform};
use crate::types::DbId;

const AFRAME_SRC: &str = "https://aframe.io/releases/1.4.2/aframe.min.js";
const ARJS_SRC: &str =
    "https://raw.githack.com/AR-js-org/AR.js/3.4.5/aframe/build/aframe-ar-nft.js";

/// Everything the viewer needs about one experience.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerScene {
    pub experience_id: DbId,
    pub name: String,
    pub slug: String,
    pub marker_type: MarkerType,
    /// Endpoint the page POSTs detections to.
    pub metrics_url: String,
    pub targets: Vec<ViewerTarget>,
}

/// A tracked target and the items anchored to it.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerTarget {
    pub target_id: DbId,
    pub name: String,
    /// URL of the marker descriptor (prefix for NFT, `.patt` for pattern).
    pub descriptor_url: Option<String>,
    pub items: Vec<ViewerItem>,
}

/// One asset placed on a target.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerItem {
    pub binding_id: DbId,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub asset_url: String,
    pub transform: Transform,
    pub autoplay: bool,
    pub looped: bool,
    pub face_user: bool,
}

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a value as JSON that is safe to inline inside `<script>`.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn vec3(v: &[f64; 3]) -> String {
    format!("{} {} {}", v[0], v[1], v[2])
}

fn render_item(out: &mut String, item: &ViewerItem) {
    let src = escape_html(&item.asset_url);
    let t = &item.transform;
    let placement = format!(
        r#"position="{}" rotation="{}" scale="{}""#,
        vec3(&t.pos),
        vec3(&t.rot),
        vec3(&t.scale)
    );
    let look_at = if item.face_user {
        r#" look-at="[camera]""#
    } else {
        ""
    };
    let id = item.binding_id;

    let _ = match item.asset_type {
        AssetType::Model => writeln!(
            out,
            r#"      <a-entity id="item-{id}" gltf-model="url({src})" {placement}{look_at}></a-entity>"#
        ),
        AssetType::Image => writeln!(
            out,
            r#"      <a-image id="item-{id}" src="{src}" {placement}{look_at}></a-image>"#
        ),
        AssetType::Video => writeln!(
            out,
            r##"      <a-video id="item-{id}" src="#media-{id}" {placement}{look_at}></a-video>"##
        ),
        AssetType::Audio => writeln!(
            out,
            r#"      <a-entity id="item-{id}" sound="src: url({src}); autoplay: {}; loop: {}" {placement}></a-entity>"#,
            item.autoplay, item.looped
        ),
    };
}

fn render_assets(out: &mut String, scene: &ViewerScene) {
    out.push_str("    <a-assets>\n");
    for target in &scene.targets {
        for item in target.items.iter().filter(|i| i.asset_type == AssetType::Video) {
            let _ = writeln!(
                out,
                r#"      <video id="media-{}" src="{}" preload="auto" playsinline webkit-playsinline crossorigin="anonymous"{}{}></video>"#,
                item.binding_id,
                escape_html(&item.asset_url),
                if item.autoplay { " autoplay muted" } else { "" },
                if item.looped { " loop" } else { "" },
            );
        }
    }
    out.push_str("    </a-assets>\n");
}

fn render_target(out: &mut String, target: &ViewerTarget, marker_type: MarkerType) {
    let name = escape_html(&target.name);
    let url = target
        .descriptor_url
        .as_deref()
        .map(escape_html)
        .unwrap_or_default();
    let id = target.target_id;

    let (open, close) = match marker_type {
        MarkerType::Pattern => (
            format!(
                r#"    <a-marker id="target-{id}" data-target="{id}" data-name="{name}" type="pattern" url="{url}" emitevents="true">"#
            ),
            "    </a-marker>",
        ),
        MarkerType::Nft => (
            format!(
                r#"    <a-nft id="target-{id}" data-target="{id}" data-name="{name}" type="nft" url="{url}" smooth="true" smoothCount="10" emitevents="true">"#
            ),
            "    </a-nft>",
        ),
    };

    out.push_str(&open);
    out.push('\n');
    for item in &target.items {
        render_item(out, item);
    }
    out.push_str(close);
    out.push('\n');
}

/// Render the complete viewer document for `scene`.
pub fn render_viewer(scene: &ViewerScene) -> String {
    let mut out = String::with_capacity(4096);
    let title = escape_html(&scene.name);
    let arjs_mode = match scene.marker_type {
        MarkerType::Pattern => "sourceType: webcam; debugUIEnabled: false; detectionMode: mono_and_matrix;",
        MarkerType::Nft => "sourceType: webcam; debugUIEnabled: false; trackingMethod: best;",
    };

    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <script src="{AFRAME_SRC}"></script>
  <script src="{ARJS_SRC}"></script>
  <style>body {{ margin: 0; overflow: hidden; }}</style>
</head>
<body data-experience="{id}" data-slug="{slug}">
  <a-scene embedded vr-mode-ui="enabled: false" renderer="logarithmicDepthBuffer: true;" arjs="{arjs_mode}">
"#,
        id = scene.experience_id,
        slug = escape_html(&scene.slug),
    );

    render_assets(&mut out, scene);
    for target in &scene.targets {
        render_target(&mut out, target, scene.marker_type);
    }

    let _ = write!(
        out,
        r#"    <a-entity camera></a-entity>
  </a-scene>
  <script id="scene-data" type="application/json">{data}</script>
  <script>
    (function () {{
      var scene = JSON.parse(document.getElementById('scene-data').textContent);
      document.querySelectorAll('[data-target]').forEach(function (marker) {{
        marker.addEventListener('markerFound', function () {{
          marker.querySelectorAll('a-video').forEach(function (v) {{
            var media = document.querySelector(v.getAttribute('src'));
            if (media && media.hasAttribute('autoplay')) media.play();
          }});
          fetch(scene.metrics_url, {{
            method: 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            body: JSON.stringify({{ experience: scene.experience_id }})
          }}).catch(function () {{}});
        }});
      }});
    }})();
  </script>
</body>
</html>
"#,
        data = script_json(scene),
    );

    out
}
