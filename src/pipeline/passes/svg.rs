//! SVG structure passes (priorities 15 and 18).
//!
//! The generator decomposes vector art into stacks of absolutely positioned
//! `<img>` layers, each pointing at a tiny asset file, and wraps single
//! images in positioning-only containers. Both passes rewrite structure, not
//! just attributes, so they walk child lists and replace whole nodes.
//!
//! Both are fail-open: any condition that cannot be verified (missing asset,
//! unparseable file, expression-valued `src`) leaves the subtree untouched.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::debug;
use crate::markup::{Document, Element, Node};
use crate::pipeline::Pass;
use crate::pipeline::context::RewriteContext;

// ============================================================================
// Composite inlining
// ============================================================================

/// Replaces a stack of three or more full-bleed `<img>` layers with one
/// `<svg>` whose paths are read out of the layers' asset files.
pub struct SvgCompositeInline;

impl Pass for SvgCompositeInline {
    fn name(&self) -> &'static str {
        "svg-inline"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        rewrite_nodes(&mut doc.roots, ctx, &mut |elem, ctx| {
            try_inline_composite(elem, ctx)
        });
        Ok(())
    }
}

/// Minimum stacked layers before a container is treated as a decomposed
/// vector. Below this the images are likely genuine content.
const MIN_COMPOSITE_LAYERS: usize = 3;

fn try_inline_composite(elem: &Element, ctx: &mut RewriteContext) -> Option<Element> {
    let source_dir = ctx.source_dir.clone()?;

    if elem.children.len() < MIN_COMPOSITE_LAYERS {
        return None;
    }
    let layers: Vec<&Element> = elem.child_elements().collect();
    if layers.len() != elem.children.len() || layers.len() < MIN_COMPOSITE_LAYERS {
        return None;
    }
    if !layers.iter().all(|img| is_full_bleed_img(img)) {
        return None;
    }

    let mut view_box: Option<String> = None;
    let mut paths: Vec<SvgPath> = Vec::new();
    for img in &layers {
        // Expression-valued src cannot be resolved to a file
        let src = img.get_attr("src")?;
        let asset = resolve_asset(src, &source_dir)?;
        match read_svg_asset(&asset) {
            Ok(parsed) => {
                if view_box.is_none() {
                    view_box = parsed.view_box;
                }
                paths.extend(parsed.paths);
            }
            Err(e) => {
                debug!("svg"; "skipping composite, asset {}: {e:#}", asset.display());
                return None;
            }
        }
    }
    let view_box = view_box?;
    if paths.is_empty() {
        return None;
    }

    let mut svg = Element::new("svg");
    if let Some(class) = elem.get_attr("className").or_else(|| elem.get_attr("class")) {
        svg.set_attr("className", class);
    }
    if let Some(name) = elem.get_attr("data-name") {
        svg.set_attr("data-name", name);
    }
    svg.set_attr("viewBox", view_box);
    svg.set_attr("fill", "none");
    svg.set_attr("xmlns", "http://www.w3.org/2000/svg");

    for path in paths {
        let mut node = Element::new("path");
        node.set_attr("d", path.d);
        if let Some(fill) = path.fill {
            node.set_attr("fill", fill);
        }
        svg.children.push(Node::element(node));
    }

    ctx.stats.composites_inlined += 1;
    Some(svg)
}

fn is_full_bleed_img(elem: &Element) -> bool {
    elem.is_tag("img") && elem.has_class("absolute") && elem.has_class("inset-0")
}

// ============================================================================
// Wrapper flattening
// ============================================================================

/// Collapses `<div class="absolute ..."><img class="size-full" .../></div>`
/// into the image alone, carrying the container's positioning.
pub struct SvgWrapperFlatten;

impl Pass for SvgWrapperFlatten {
    fn name(&self) -> &'static str {
        "svg-flatten"
    }

    fn apply(&self, doc: &mut Document, ctx: &mut RewriteContext) -> Result<()> {
        rewrite_nodes(&mut doc.roots, ctx, &mut |elem, ctx| {
            try_flatten_wrapper(elem, ctx)
        });
        Ok(())
    }
}

fn try_flatten_wrapper(elem: &Element, ctx: &mut RewriteContext) -> Option<Element> {
    // Positioning-only container: absolute, sized by inset, nothing else.
    if !elem.has_class("absolute") {
        return None;
    }
    let has_explicit_size = elem.classes().iter().any(|t| {
        t.starts_with("w-") || t.starts_with("h-") || t.starts_with("size-")
    });
    if has_explicit_size {
        return None;
    }
    // Attributes beyond class and data-name may carry behavior; leave those.
    let attrs_ok = elem
        .attrs
        .iter()
        .all(|a| matches!(a.name.as_str(), "className" | "class" | "data-name"));
    if !attrs_ok {
        return None;
    }

    if elem.children.len() != 1 {
        return None;
    }
    let img = elem.children[0].as_element()?;
    if !img.is_tag("img") || !is_full_size(img) {
        return None;
    }

    let mut merged = elem.classes();
    for token in img.classes() {
        let is_size = matches!(token.as_str(), "size-full" | "w-full" | "h-full");
        if !is_size && !merged.contains(&token) {
            merged.push(token);
        }
    }

    let mut flat = img.clone();
    flat.set_classes(&merged);
    if flat.get_attr("data-name").is_none()
        && let Some(name) = elem.get_attr("data-name")
    {
        flat.set_attr("data-name", name);
    }

    ctx.stats.wrappers_flattened += 1;
    Some(flat)
}

fn is_full_size(img: &Element) -> bool {
    img.has_class("size-full") || (img.has_class("w-full") && img.has_class("h-full"))
}

// ============================================================================
// Tree walk
// ============================================================================

/// Depth-first walk that lets `rewrite` replace a whole node. A replaced
/// node is not descended into; its content was just synthesized.
fn rewrite_nodes(
    nodes: &mut Vec<Node>,
    ctx: &mut RewriteContext,
    rewrite: &mut impl FnMut(&Element, &mut RewriteContext) -> Option<Element>,
) {
    for node in nodes.iter_mut() {
        if let Node::Element(elem) = node {
            if let Some(replacement) = rewrite(elem, ctx) {
                *node = Node::element(replacement);
                continue;
            }
            rewrite_nodes(&mut elem.children, ctx, rewrite);
        }
    }
}

// ============================================================================
// Asset reading
// ============================================================================

#[derive(Debug, Default)]
struct SvgAsset {
    view_box: Option<String>,
    paths: Vec<SvgPath>,
}

#[derive(Debug)]
struct SvgPath {
    d: String,
    fill: Option<String>,
}

/// Asset references are root-relative (`/assets/x.svg`) or relative to the
/// markup's own directory.
fn resolve_asset(src: &str, source_dir: &Path) -> Option<PathBuf> {
    if !src.ends_with(".svg") {
        return None;
    }
    Some(source_dir.join(src.trim_start_matches('/')))
}

fn read_svg_asset(path: &Path) -> Result<SvgAsset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read asset {}", path.display()))?;
    let mut reader = Reader::from_str(&text);
    let mut asset = SvgAsset::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) | Ok(Event::Empty(elem)) => match elem.name().as_ref() {
                b"svg" => asset.view_box = xml_attr(&elem, b"viewBox"),
                b"path" => {
                    if let Some(d) = xml_attr(&elem, b"d") {
                        asset.paths.push(SvgPath {
                            d,
                            fill: xml_attr(&elem, b"fill"),
                        });
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!(
                "XML parse error at position {}: {e:?}",
                reader.error_position()
            ),
            Ok(_) => {}
        }
    }
    Ok(asset)
}

fn xml_attr(elem: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_document, print_document};
    use crate::vars::VariableTable;
    use std::fs;

    fn write_asset(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn layer_asset(d: &str, fill: &str) -> String {
        format!(
            r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><path d="{d}" fill="{fill}"/></svg>"#
        )
    }

    fn run_inline(input: &str, dir: Option<PathBuf>) -> (Document, RewriteContext) {
        let mut doc = parse_document(input).unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), dir);
        SvgCompositeInline.apply(&mut doc, &mut ctx).unwrap();
        (doc, ctx)
    }

    #[test]
    fn test_three_layer_stack_becomes_single_svg() {
        let tmp = tempfile::tempdir().unwrap();
        write_asset(tmp.path(), "v1.svg", &layer_asset("M0 0h24v24H0z", "#111111"));
        write_asset(tmp.path(), "v2.svg", &layer_asset("M2 2h20v20H2z", "#222222"));
        write_asset(tmp.path(), "v3.svg", &layer_asset("M4 4h16v16H4z", "#333333"));

        let input = r#"
            <div className="relative size-6" data-name="icon">
              <img className="absolute inset-0" src="/v1.svg" />
              <img className="absolute inset-0" src="/v2.svg" />
              <img className="absolute inset-0" src="/v3.svg" />
            </div>
        "#;
        let (mut doc, ctx) = run_inline(input, Some(tmp.path().to_path_buf()));
        assert_eq!(ctx.stats.composites_inlined, 1);

        let svg = doc.root_element_mut().unwrap();
        assert_eq!(svg.tag, "svg");
        assert_eq!(svg.get_attr("viewBox"), Some("0 0 24 24"));
        assert_eq!(svg.get_attr("className"), Some("relative size-6"));
        assert_eq!(svg.get_attr("data-name"), Some("icon"));
        let paths: Vec<_> = svg.child_elements().collect();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[1].get_attr("fill"), Some("#222222"));
    }

    #[test]
    fn test_two_layers_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        write_asset(tmp.path(), "v1.svg", &layer_asset("M0 0", "#111111"));
        write_asset(tmp.path(), "v2.svg", &layer_asset("M1 1", "#222222"));

        let input = r#"
            <div className="relative">
              <img className="absolute inset-0" src="/v1.svg" />
              <img className="absolute inset-0" src="/v2.svg" />
            </div>
        "#;
        let (mut doc, ctx) = run_inline(input, Some(tmp.path().to_path_buf()));
        assert_eq!(ctx.stats.composites_inlined, 0);
        assert_eq!(doc.root_element_mut().unwrap().tag, "div");
    }

    #[test]
    fn test_missing_asset_fails_open() {
        let tmp = tempfile::tempdir().unwrap();
        write_asset(tmp.path(), "v1.svg", &layer_asset("M0 0", "#111111"));
        // v2.svg and v3.svg intentionally absent

        let input = r#"
            <div className="relative">
              <img className="absolute inset-0" src="/v1.svg" />
              <img className="absolute inset-0" src="/v2.svg" />
              <img className="absolute inset-0" src="/v3.svg" />
            </div>
        "#;
        let (mut doc, ctx) = run_inline(input, Some(tmp.path().to_path_buf()));
        assert_eq!(ctx.stats.composites_inlined, 0);
        assert_eq!(doc.root_element_mut().unwrap().tag, "div");
    }

    #[test]
    fn test_no_source_dir_disables_inlining() {
        let input = r#"
            <div className="relative">
              <img className="absolute inset-0" src="/v1.svg" />
              <img className="absolute inset-0" src="/v2.svg" />
              <img className="absolute inset-0" src="/v3.svg" />
            </div>
        "#;
        let (_, ctx) = run_inline(input, None);
        assert_eq!(ctx.stats.composites_inlined, 0);
    }

    fn run_flatten(input: &str) -> (Document, RewriteContext) {
        let mut doc = parse_document(input).unwrap();
        let mut ctx = RewriteContext::new(VariableTable::empty(), None);
        SvgWrapperFlatten.apply(&mut doc, &mut ctx).unwrap();
        (doc, ctx)
    }

    #[test]
    fn test_wrapper_collapsed_into_image() {
        let input = r#"
            <div className="absolute inset-[12.5%_8.33%]" data-name="Vector">
              <img className="block max-w-none size-full" src="/vec.svg" />
            </div>
        "#;
        let (mut doc, ctx) = run_flatten(input);
        assert_eq!(ctx.stats.wrappers_flattened, 1);

        let img = doc.root_element_mut().unwrap();
        assert_eq!(img.tag, "img");
        assert_eq!(img.get_attr("src"), Some("/vec.svg"));
        assert_eq!(img.get_attr("data-name"), Some("Vector"));
        assert_eq!(
            img.classes(),
            vec!["absolute", "inset-[12.5%_8.33%]", "block", "max-w-none"]
        );
    }

    #[test]
    fn test_wrapper_with_explicit_size_kept() {
        let input = r#"
            <div className="absolute w-10 inset-0">
              <img className="size-full" src="/vec.svg" />
            </div>
        "#;
        let (mut doc, ctx) = run_flatten(input);
        assert_eq!(ctx.stats.wrappers_flattened, 0);
        assert_eq!(doc.root_element_mut().unwrap().tag, "div");
    }

    #[test]
    fn test_wrapper_with_two_children_kept() {
        let input = r#"
            <div className="absolute inset-0">
              <img className="size-full" src="/a.svg" />
              <img className="size-full" src="/b.svg" />
            </div>
        "#;
        let (_, ctx) = run_flatten(input);
        assert_eq!(ctx.stats.wrappers_flattened, 0);
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let input = r#"
            <div className="absolute inset-0">
              <img className="size-full" src="/vec.svg" />
            </div>
        "#;
        let (doc, _) = run_flatten(input);
        let printed = print_document(&doc);
        let (doc2, ctx2) = run_flatten(&printed);
        assert_eq!(ctx2.stats.wrappers_flattened, 0);
        assert_eq!(print_document(&doc2), printed);
    }
}
