// Bounded history buffer for raw line snapshots.
// Invariants: fixed capacity, oldest entries overwritten first.

#[derive(Debug)]
pub struct RingBuffer<T> {
    buf: Vec<T>,
    cap: usize,
    head: usize,
    len: usize,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            cap,
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.len < self.cap {
            self.buf.push(item);
            self.len += 1;
        } else {
            self.buf[self.head] = item;
            self.head = (self.head + 1) % self.cap;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
        self.len = 0;
    }

    /// Most recently pushed entry, if any.
    pub fn latest(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        if self.len < self.cap {
            self.buf.last()
        } else {
            let idx = (self.head + self.cap - 1) % self.cap;
            self.buf.get(idx)
        }
    }

    pub fn to_vec_ordered(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        if self.len == 0 {
            return out;
        }

        if self.len < self.cap {
            out.extend(self.buf.iter().cloned());
            return out;
        }

        out.extend(self.buf[self.head..].iter().cloned());
        out.extend(self.buf[..self.head].iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_then_wraps_in_order() {
        let mut ring = RingBuffer::new(3);
        for value in 1..=5 {
            ring.push(value);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec_ordered(), vec![3, 4, 5]);
        assert_eq!(ring.latest(), Some(&5));
    }

    #[test]
    fn partial_fill_keeps_insertion_order() {
        let mut ring = RingBuffer::new(4);
        ring.push("a");
        ring.push("b");
        assert_eq!(ring.to_vec_ordered(), vec!["a", "b"]);
        assert_eq!(ring.latest(), Some(&"b"));
    }

    #[test]
    fn clear_resets() {
        let mut ring = RingBuffer::new(2);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.latest(), None);
        ring.push(7);
        assert_eq!(ring.to_vec_ordered(), vec![7]);
    }
}
