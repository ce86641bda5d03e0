//! Character sinks consumed by the renderer.
//!
//! A [`Sink`] is the only thing a [`RenderContext`](crate::RenderContext)
//! writes to. Buffering, line wrapping and filtering belong to the sink;
//! the renderer only decides what text reaches it.

pub mod quoted;

pub use quoted::*;

use std::cell::{Ref, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

/// Destination for rendered text
#[cfg_attr(test, mockall::automock)]
pub trait Sink {
    /// Write text through the sink's normal (filtered) path.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn write_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf))
    }

    /// Write diagnostic text that must bypass any filtering or paging.
    fn write_unfiltered(&mut self, text: &str) -> io::Result<()> {
        self.write_str(text)
    }

    /// A soft line-wrap point. `marker` is the indentation to use if the
    /// sink decides to wrap here. Sinks without wrapping ignore it.
    fn wrap_hint(&mut self, _marker: &str) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        (**self).write_str(text)
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        (**self).write_char(c)
    }

    fn write_unfiltered(&mut self, text: &str) -> io::Result<()> {
        (**self).write_unfiltered(text)
    }

    fn wrap_hint(&mut self, marker: &str) -> io::Result<()> {
        (**self).wrap_hint(marker)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// In-memory sink, handy for capturing output.
impl Sink for String {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Plain console sink over any writer.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// A writer shared by several sinks on one thread.
///
/// Used when two quoting adapters with different markers feed the same
/// destination. No locking is involved; writes interleave in call order.
#[derive(Debug, Default)]
pub struct SharedWriter<W> {
    inner: Rc<RefCell<W>>,
}

impl<W> SharedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Rc::new(RefCell::new(writer)),
        }
    }

    pub fn borrow(&self) -> Ref<'_, W> {
        self.inner.borrow()
    }
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.borrow_mut().flush()
    }
}
