use std::cell::{Ref, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Handle to the single diagnostic output stream.
///
/// Headers, the machine-code dump and error lines all go through clones of one
/// handle, so they interleave in program order.
pub struct SharedOutput<W> {
    inner: Rc<RefCell<W>>,
}

impl<W: Write> SharedOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Rc::new(RefCell::new(out)),
        }
    }

    pub fn write_line(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.inner.borrow_mut(), "{args}")
    }

    /// Borrow the underlying sink, e.g. to inspect captured output in tests.
    pub fn get_ref(&self) -> Ref<'_, W> {
        self.inner.borrow()
    }
}

impl<W> Clone for SharedOutput<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W: Write> Write for SharedOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.borrow_mut().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_stream() {
        let out = SharedOutput::new(Vec::new());
        let mut other = out.clone();

        out.write_line(format_args!("first")).unwrap();
        writeln!(other, "second").unwrap();
        out.write_line(format_args!("third {}", 3)).unwrap();

        let text = String::from_utf8(out.get_ref().clone()).unwrap();
        assert_eq!(text, "first\nsecond\nthird 3\n");
    }
}
