//! Token-level streaming JSON writer.
//!
//! Values are written straight to the sink as they are produced. A frame
//! stack tracks open objects and arrays so that separators are placed
//! correctly and misuse (a value without a property name, closing the wrong
//! container, finishing with containers open) is reported as
//! [`WriteError::Unbalanced`] instead of producing malformed output.

use super::WriteError;
use serde::Serialize;
use std::io::Write;

/// Items written between flushes unless configured otherwise.
pub const DEFAULT_FLUSH_INTERVAL: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object { count: usize, awaiting_value: bool },
    Array { count: usize },
}

/// A streaming JSON writer that writes incrementally.
pub struct JsonStreamWriter<W: Write> {
    writer: W,
    pretty: bool,
    stack: Vec<Frame>,
    root_written: bool,
    flush_interval: usize,
    items_written: usize,
}

impl<W: Write> JsonStreamWriter<W> {
    /// Create a new streaming JSON writer.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            stack: Vec::new(),
            root_written: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            items_written: 0,
        }
    }

    /// Set the flush interval (number of array items between flushes).
    #[must_use]
    pub fn with_flush_interval(mut self, interval: usize) -> Self {
        self.flush_interval = interval.max(1);
        self
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of array items written so far, at any depth.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn start_object(&mut self) -> Result<(), WriteError> {
        self.before_value()?;
        self.write_raw("{")?;
        self.stack.push(Frame::Object {
            count: 0,
            awaiting_value: false,
        });
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), WriteError> {
        match self.stack.last() {
            Some(Frame::Object {
                count,
                awaiting_value: false,
            }) => {
                let count = *count;
                self.stack.pop();
                self.close("}", count)
            }
            Some(Frame::Object { .. }) => Err(unbalanced("object closed while a property awaits its value")),
            Some(Frame::Array { .. }) => Err(unbalanced("end_object called inside an array")),
            None => Err(unbalanced("end_object called with no open object")),
        }
    }

    pub fn start_array(&mut self) -> Result<(), WriteError> {
        self.before_value()?;
        self.write_raw("[")?;
        self.stack.push(Frame::Array { count: 0 });
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), WriteError> {
        match self.stack.last() {
            Some(Frame::Array { count }) => {
                let count = *count;
                self.stack.pop();
                self.close("]", count)
            }
            Some(Frame::Object { .. }) => Err(unbalanced("end_array called inside an object")),
            None => Err(unbalanced("end_array called with no open array")),
        }
    }

    /// Write a property name inside the current object.
    pub fn property_name(&mut self, name: &str) -> Result<(), WriteError> {
        let Some(Frame::Object {
            count,
            awaiting_value,
        }) = self.stack.last_mut()
        else {
            return Err(unbalanced(format!("property '{name}' written outside an object")));
        };
        if *awaiting_value {
            return Err(unbalanced(format!("property '{name}' written before the previous value")));
        }
        let first = *count == 0;
        *awaiting_value = true;

        if !first {
            self.write_raw(",")?;
        }
        self.write_newline()?;
        self.write_indent()?;
        let key = serde_json::to_string(name)?;
        self.write_raw(&key)?;
        self.write_raw(if self.pretty { ": " } else { ":" })
    }

    /// Write a complete value.
    pub fn value<V: Serialize + ?Sized>(&mut self, value: &V) -> Result<(), WriteError> {
        self.before_value()?;
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        // For pretty printing, re-indent multi-line values
        if self.pretty && json.contains('\n') {
            let indented = self.indent_multiline(&json);
            self.write_raw(&indented)?;
        } else {
            self.write_raw(&json)?;
        }
        self.after_value()
    }

    /// Write a property name and its value.
    pub fn property<V: Serialize + ?Sized>(&mut self, name: &str, value: &V) -> Result<(), WriteError> {
        self.property_name(name)?;
        self.value(value)
    }

    /// Check that the document is complete, flush, and return the sink.
    pub fn finish(mut self) -> Result<W, WriteError> {
        if !self.stack.is_empty() {
            return Err(unbalanced(format!("{} container(s) still open", self.stack.len())));
        }
        if !self.root_written {
            return Err(unbalanced("no value was written"));
        }
        if self.pretty {
            self.write_raw("\n")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn before_value(&mut self) -> Result<(), WriteError> {
        match self.stack.last().copied() {
            None if self.root_written => Err(unbalanced("a second root value was written")),
            None => {
                self.root_written = true;
                Ok(())
            }
            Some(Frame::Object {
                awaiting_value: true,
                ..
            }) => Ok(()),
            Some(Frame::Object { .. }) => Err(unbalanced("value written without a property name")),
            Some(Frame::Array { count }) => {
                if count > 0 {
                    self.write_raw(",")?;
                }
                self.write_newline()?;
                self.write_indent()
            }
        }
    }

    fn after_value(&mut self) -> Result<(), WriteError> {
        match self.stack.last_mut() {
            Some(Frame::Object {
                count,
                awaiting_value,
            }) => {
                *count += 1;
                *awaiting_value = false;
            }
            Some(Frame::Array { count }) => {
                *count += 1;
                self.items_written += 1;
                if self.items_written % self.flush_interval == 0 {
                    self.writer.flush()?;
                }
            }
            None => {}
        }
        Ok(())
    }

    fn close(&mut self, bracket: &str, count: usize) -> Result<(), WriteError> {
        if count > 0 {
            self.write_newline()?;
            self.write_indent()?;
        }
        self.write_raw(bracket)?;
        self.after_value()
    }

    /// Write raw bytes.
    fn write_raw(&mut self, s: &str) -> Result<(), WriteError> {
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Write a newline if pretty printing.
    fn write_newline(&mut self) -> Result<(), WriteError> {
        if self.pretty {
            self.write_raw("\n")?;
        }
        Ok(())
    }

    /// Write indentation if pretty printing.
    fn write_indent(&mut self) -> Result<(), WriteError> {
        if self.pretty {
            let indent = "  ".repeat(self.stack.len());
            self.write_raw(&indent)?;
        }
        Ok(())
    }

    /// Re-indent a multi-line JSON string.
    fn indent_multiline(&self, json: &str) -> String {
        let base_indent = "  ".repeat(self.stack.len());
        let mut lines = json.lines();
        let mut result = String::with_capacity(json.len());
        if let Some(first) = lines.next() {
            result.push_str(first);
        }
        for line in lines {
            result.push('\n');
            result.push_str(&base_indent);
            result.push_str(line);
        }
        result
    }
}

fn unbalanced(message: impl Into<String>) -> WriteError {
    WriteError::Unbalanced(message.into())
}
