//! SVG export of an embroidery document
//! Writes the tree as nested `<g>` elements with shape leaves, keeping
//! layer flags, transforms, styles and `inkstitch:*` attributes.

use std::fmt::Write;

use crate::document::{Document, Node, NodeId, NodeKind};
use crate::model::{Point, Shape};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";
const INKSTITCH_NS: &str = "http://inkstitch.org/namespace";

/// Render the whole document as a standalone SVG file.
pub fn render_svg(doc: &Document) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<svg xmlns=\"{}\" xmlns:inkscape=\"{}\" xmlns:inkstitch=\"{}\">",
        SVG_NS, INKSCAPE_NS, INKSTITCH_NS
    );
    if let Ok(children) = doc.children(doc.root()) {
        for &child in children {
            render_node(doc, child, 1, &mut out);
        }
    }
    out.push_str("</svg>\n");
    out
}

fn render_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = doc.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);

    match &node.kind {
        NodeKind::Root => {}
        NodeKind::Group { layer } => {
            let _ = write!(out, "{}<g id=\"node{}\"", indent, id);
            if *layer {
                out.push_str(" inkscape:groupmode=\"layer\"");
            }
            if let Some(label) = &node.label {
                let _ = write!(out, " inkscape:label=\"{}\"", escape(label));
            }
            common_attributes(node, out);
            out.push_str(">\n");
            for &child in &node.children {
                render_node(doc, child, depth + 1, out);
            }
            let _ = writeln!(out, "{}</g>", indent);
        }
        NodeKind::Shape { shape } => {
            let _ = write!(
                out,
                "{}<{} id=\"node{}\"",
                indent,
                shape.shape_type().tag(),
                id
            );
            shape_attributes(shape, out);
            common_attributes(node, out);
            out.push_str(" />\n");
        }
    }
}

fn shape_attributes(shape: &Shape, out: &mut String) {
    let _ = match shape {
        Shape::Path { d } => write!(out, " d=\"{}\"", d),
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => write!(
            out,
            " x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
            x, y, width, height
        ),
        Shape::Circle { cx, cy, r } => write!(out, " cx=\"{}\" cy=\"{}\" r=\"{}\"", cx, cy, r),
        Shape::Ellipse { cx, cy, rx, ry } => write!(
            out,
            " cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"",
            cx, cy, rx, ry
        ),
        Shape::Line { from, to } => write!(
            out,
            " x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
            from.x, from.y, to.x, to.y
        ),
        Shape::Polyline { points, .. } => write!(out, " points=\"{}\"", points_attr(points)),
    };
}

fn common_attributes(node: &Node, out: &mut String) {
    if !node.transform.is_identity() {
        let _ = write!(out, " transform=\"{}\"", node.transform);
    }
    let style = node.style.to_string();
    if !style.is_empty() {
        let _ = write!(out, " style=\"{}\"", escape(&style));
    }
    for (name, value) in &node.params {
        let _ = write!(out, " inkstitch:{}=\"{}\"", name, escape(value));
    }
    if !node.commands.is_empty() {
        let _ = write!(out, " inkstitch:commands=\"{}\"", escape(&node.commands.join(" ")));
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{params, NewNode};
    use crate::model::DesignPath;
    use jumpstitch_core::Transform;

    #[test]
    fn test_render_layers_and_paths() {
        let mut doc = Document::new();
        let layer = doc
            .append(
                doc.root(),
                NewNode::layer("Layer \"1\"").transform(Transform::translate(5.0, 0.0)),
            )
            .unwrap();
        doc.append(
            layer,
            NewNode::path(DesignPath::from_points(&[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
            ]))
            .style("stroke:#ff0000;fill:none")
            .param(params::RUNNING_STITCH_LENGTH_MM, 2.5)
            .command("trim"),
        )
        .unwrap();

        let svg = render_svg(&doc);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("inkscape:groupmode=\"layer\""));
        assert!(svg.contains("inkscape:label=\"Layer &quot;1&quot;\""));
        assert!(svg.contains("transform=\"matrix(1,0,0,1,5,0)\""));
        assert!(svg.contains("d=\"M 0 0 L 10 0\""));
        assert!(svg.contains("style=\"stroke:#ff0000;fill:none;\""));
        assert!(svg.contains("inkstitch:running_stitch_length_mm=\"2.5\""));
        assert!(svg.contains("inkstitch:commands=\"trim\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_basic_shapes() {
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            NewNode::shape(Shape::Circle {
                cx: 1.0,
                cy: 2.0,
                r: 3.0,
            }),
        )
        .unwrap();
        doc.append(
            doc.root(),
            NewNode::shape(Shape::Polyline {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                closed: true,
            }),
        )
        .unwrap();

        let svg = render_svg(&doc);
        assert!(svg.contains("<circle id=\"node1\" cx=\"1\" cy=\"2\" r=\"3\" />"));
        assert!(svg.contains("<polygon id=\"node2\" points=\"0,0 1,1\" />"));
    }
}
