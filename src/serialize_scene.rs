/// Scene serialization module - writes SceneNode trees to the text scene form
///
/// Elements always get an explicit end tag so the output can be embedded in
/// HTML. Tagless nodes write only their children.

use crate::{SceneError, SceneNode};
use std::io::{self, Write};

/// Serializes a SceneNode and all its descendants
///
/// # Arguments
/// * `node` - The root node to serialize
/// * `writer` - Output sink
/// * `pretty` - Indent nested elements, one per line
pub fn write_scene<W: Write>(node: &SceneNode, writer: &mut W, pretty: bool) -> io::Result<()> {
    if pretty {
        write_node_pretty(node, writer, 0)
    } else {
        write_node_compact(node, writer)
    }
}

/// Serializes a SceneNode tree to a string
pub fn scene_to_string(node: &SceneNode, pretty: bool) -> Result<String, SceneError> {
    let mut buffer = Vec::with_capacity(1024);
    write_scene(node, &mut buffer, pretty)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the HTML placeholder document
///
/// The placeholder carries no vector content.
pub fn write_html<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    writer.write_all(b"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>")?;
    write_escaped_text(writer, title)?;
    writer.write_all(b"</title>\n</head>\n<body>\n</body>\n</html>\n")?;
    Ok(())
}

fn write_start_tag<W: Write>(node: &SceneNode, tag: &str, writer: &mut W) -> io::Result<()> {
    writer.write_all(b"<")?;
    writer.write_all(tag.as_bytes())?;
    for (key, value) in &node.attributes {
        writer.write_all(b" ")?;
        writer.write_all(key.as_bytes())?;
        writer.write_all(b"=\"")?;
        write_escaped_attr(writer, value)?;
        writer.write_all(b"\"")?;
    }
    writer.write_all(b">")
}

fn write_end_tag<W: Write>(tag: &str, writer: &mut W) -> io::Result<()> {
    writer.write_all(b"</")?;
    writer.write_all(tag.as_bytes())?;
    writer.write_all(b">")
}

fn write_node_pretty<W: Write>(node: &SceneNode, writer: &mut W, indent_level: usize) -> io::Result<()> {
    let Some(tag) = node.tag.as_deref() else {
        for child in &node.children {
            write_node_pretty(child, writer, indent_level)?;
        }
        return Ok(());
    };

    write_indent(writer, indent_level)?;
    write_start_tag(node, tag, writer)?;

    let text = node.text.as_deref().map(str::trim).unwrap_or_default();
    if node.children.is_empty() {
        write_escaped_text(writer, text)?;
        write_end_tag(tag, writer)?;
        return writer.write_all(b"\n");
    }

    writer.write_all(b"\n")?;
    if !text.is_empty() {
        write_indent(writer, indent_level + 1)?;
        write_escaped_text(writer, text)?;
        writer.write_all(b"\n")?;
    }
    for child in &node.children {
        write_node_pretty(child, writer, indent_level + 1)?;
    }
    write_indent(writer, indent_level)?;
    write_end_tag(tag, writer)?;
    writer.write_all(b"\n")
}

fn write_node_compact<W: Write>(node: &SceneNode, writer: &mut W) -> io::Result<()> {
    let Some(tag) = node.tag.as_deref() else {
        for child in &node.children {
            write_node_compact(child, writer)?;
        }
        return Ok(());
    };

    write_start_tag(node, tag, writer)?;
    if let Some(text) = node.text.as_deref() {
        write_escaped_text(writer, text.trim())?;
    }
    for child in &node.children {
        write_node_compact(child, writer)?;
    }
    write_end_tag(tag, writer)
}

fn write_indent<W: Write>(writer: &mut W, indent_level: usize) -> io::Result<()> {
    for _ in 0..indent_level {
        writer.write_all(b"  ")?;
    }
    Ok(())
}

/// Escapes special XML characters in attribute values
fn write_escaped_attr<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    write_escaped(writer, input, true)
}

fn write_escaped_text<W: Write>(writer: &mut W, input: &str) -> io::Result<()> {
    write_escaped(writer, input, false)
}

fn write_escaped<W: Write>(writer: &mut W, input: &str, quotes: bool) -> io::Result<()> {
    let mut last = 0;
    for (idx, ch) in input.char_indices() {
        let entity = match ch {
            '&' => Some(b"&amp;" as &[u8]),
            '<' => Some(b"&lt;" as &[u8]),
            '>' => Some(b"&gt;" as &[u8]),
            '"' if quotes => Some(b"&quot;" as &[u8]),
            '\'' if quotes => Some(b"&apos;" as &[u8]),
            _ => None,
        };

        if let Some(bytes) = entity {
            if last < idx {
                writer.write_all(input[last..idx].as_bytes())?;
            }
            writer.write_all(bytes)?;
            last = idx + ch.len_utf8();
        }
    }

    if last < input.len() {
        writer.write_all(input[last..].as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_scene_str;

    fn create_test_node() -> SceneNode {
        let mut mesh = SceneNode::new("mesh").with_attribute("type", "triangles");
        let mut index = SceneNode::new("int").with_attribute("name", "index");
        index.set_text("0 1 2");
        mesh.add_child(index);

        let mut group = SceneNode::new("group")
            .with_attribute("id", "Polygon")
            .with_attribute("class", "layer");
        group.add_child(mesh);

        let mut root = SceneNode::container();
        root.add_child(group);
        root
    }

    #[test]
    fn test_serialize_compact() {
        let text = scene_to_string(&create_test_node(), false).unwrap();
        assert_eq!(
            text,
            r#"<group id="Polygon" class="layer"><mesh type="triangles"><int name="index">0 1 2</int></mesh></group>"#
        );
    }

    #[test]
    fn test_container_writes_only_children() {
        let mut root = SceneNode::container();
        root.add_child(SceneNode::new("a"));
        root.add_child(SceneNode::new("b"));
        assert_eq!(scene_to_string(&root, false).unwrap(), "<a></a><b></b>");
        assert_eq!(scene_to_string(&SceneNode::container(), false).unwrap(), "");
    }

    #[test]
    fn test_serialize_pretty() {
        let text = scene_to_string(&create_test_node(), true).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"<group id="Polygon" class="layer">"#);
        assert_eq!(lines[1], r#"  <mesh type="triangles">"#);
        assert_eq!(lines[2], r#"    <int name="index">0 1 2</int>"#);
        assert_eq!(lines[4], "</group>");
    }

    #[test]
    fn test_pretty_and_compact_parse_alike() {
        let node = create_test_node();
        let compact = parse_scene_str(&scene_to_string(&node, false).unwrap()).unwrap();
        let pretty = parse_scene_str(&scene_to_string(&node, true).unwrap()).unwrap();
        assert_eq!(compact, node);
        assert_eq!(pretty, node);
    }

    #[test]
    fn test_escape_xml_chars() {
        let mut node = SceneNode::new("mesh").with_attribute("src", "models/a&b \"1\".xml");
        node.set_text("x<y>z");
        let text = scene_to_string(&node, false).unwrap();
        assert!(text.contains("&amp;"));
        assert!(text.contains("&quot;"));
        assert!(text.contains("x&lt;y&gt;z"));
    }

    #[test]
    fn test_html_placeholder() {
        let mut buf = Vec::new();
        write_html(&mut buf, "Roads & rails").unwrap();
        let html = String::from_utf8(buf).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Roads &amp; rails</title>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
