use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::XmlNode;

/// Re-serializes an element's children as markup inside a `<div>`.
///
/// The wrapper carries the element's own attributes, so an Atom
/// `<content type="xhtml">` becomes `<div type="xhtml">…</div>`.
pub fn wrapped_markup(node: &XmlNode) -> Result<String, quick_xml::Error> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut wrapper = BytesStart::new("div");
    for (key, value) in node.attributes() {
        wrapper.push_attribute((key, value));
    }
    writer.write_event(Event::Start(wrapper))?;
    write_contents(&mut writer, node)?;
    writer.write_event(Event::End(BytesEnd::new("div")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_contents(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    node: &XmlNode,
) -> Result<(), quick_xml::Error> {
    if let Some(text) = node.text() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in node.children() {
        write_node(writer, child)?;
    }
    Ok(())
}

fn write_node(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    node: &XmlNode,
) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(node.name());
    for (key, value) in node.attributes() {
        start.push_attribute((key, value));
    }

    let has_text = node.text().is_some_and(|t| !t.is_empty());
    if node.children().is_empty() && !has_text {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    write_contents(writer, node)?;
    writer.write_event(Event::End(BytesEnd::new(node.name())))?;
    Ok(())
}
