//! Incremental SPDX 3.0 document writer.

use super::json::JsonStreamWriter;
use super::{WriteError, WriterOptions};
use crate::model::spdx30::Spdx30Element;
use std::io::Write;

/// Writes `{"@context": ..., "@graph": [...]}` one element at a time.
///
/// [`begin`](Self::begin) opens the document, [`finish`](Self::finish)
/// closes it. Elements are never buffered; each is serialized and written
/// as it arrives.
pub struct Spdx30DocumentWriter<W: Write> {
    json: Option<JsonStreamWriter<W>>,
    elements: usize,
}

impl<W: Write> Spdx30DocumentWriter<W> {
    /// Write the document prologue and open `@graph`.
    pub fn begin(sink: W, options: &WriterOptions) -> Result<Self, WriteError> {
        let mut json = JsonStreamWriter::new(sink, options.pretty).with_flush_interval(options.flush_interval);
        json.start_object()?;
        json.property("@context", options.spdx30_context.as_str())?;
        json.property_name("@graph")?;
        json.start_array()?;
        Ok(Self {
            json: Some(json),
            elements: 0,
        })
    }

    /// Append one element to `@graph`.
    pub fn write_element(&mut self, element: &Spdx30Element) -> Result<(), WriteError> {
        let json = self.json.as_mut().ok_or_else(finished)?;
        json.value(element)?;
        self.elements += 1;
        Ok(())
    }

    /// Number of elements written.
    pub fn elements_written(&self) -> usize {
        self.elements
    }

    /// Close `@graph` and the document, returning the sink.
    pub fn finish(mut self) -> Result<W, WriteError> {
        let mut json = self.json.take().ok_or_else(finished)?;
        json.end_array()?;
        json.end_object()?;
        tracing::debug!(elements = self.elements, "SPDX 3.0 document written");
        json.finish()
    }
}

fn finished() -> WriteError {
    WriteError::Unbalanced("document already finished".to_string())
}

impl<W: Write> Drop for Spdx30DocumentWriter<W> {
    fn drop(&mut self) {
        if self.json.is_some() {
            tracing::warn!(
                elements = self.elements,
                "SPDX 3.0 writer dropped without finish(); output is incomplete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spdx30::{decode_element, AgentKind, Spdx30Agent, CREATION_INFO_ID};
    use serde_json::Value;

    fn agent(name: &str) -> Spdx30Element {
        Spdx30Element::Agent(Spdx30Agent {
            kind: AgentKind::Organization,
            spdx_id: format!("SPDXRef-Agent-{name}"),
            creation_info: CREATION_INFO_ID.to_string(),
            name: name.to_string(),
        })
    }

    #[test]
    fn test_writes_context_and_graph() {
        for pretty in [false, true] {
            let options = WriterOptions {
                pretty,
                ..WriterOptions::default()
            };
            let mut writer = Spdx30DocumentWriter::begin(Vec::new(), &options).unwrap();
            writer.write_element(&agent("a")).unwrap();
            writer.write_element(&agent("b")).unwrap();
            assert_eq!(writer.elements_written(), 2);
            let out = writer.finish().unwrap();

            let doc: Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(doc["@context"], options.spdx30_context.as_str());
            let graph = doc["@graph"].as_array().unwrap();
            assert_eq!(graph.len(), 2);
            assert_eq!(decode_element(graph[1].clone()).unwrap(), agent("b"));
        }
    }

    #[test]
    fn test_empty_graph() {
        let writer = Spdx30DocumentWriter::begin(Vec::new(), &WriterOptions::default()).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"{"@context":"https://spdx.org/rdf/3.0.1/spdx-context.jsonld","@graph":[]}"#
        );
    }
}
