use crate::Pc;

/// Tracks, for each pc, the pcs from which steps arrived at it.
///
/// All of the lists live in a single buffer that is sized up front from the
/// maximum number of incoming steps of each pc. The first `program_len`
/// entries hold the current length of each list, `offsets` points to the
/// start of each list in the rest of the buffer.
#[derive(Debug)]
pub(crate) struct FromBuffer {
    buffer: Box<[u32]>,
    offsets: Box<[usize]>,
}

impl FromBuffer {
    pub fn new(max_from_by_pc: &[usize]) -> FromBuffer {
        let mut offset = max_from_by_pc.len();
        let mut offsets = Vec::with_capacity(max_from_by_pc.len());
        for max in max_from_by_pc {
            offsets.push(offset);
            offset += max;
        }

        FromBuffer {
            buffer: vec![0; offset].into(),
            offsets: offsets.into(),
        }
    }

    /// Clear the lengths only, which makes the old entries inaccessible
    pub fn clear(&mut self) {
        let len = self.offsets.len();
        self.buffer[..len].fill(0);
    }

    /// Add a step `from -> to`. The caller must not add more entries for
    /// `to` than the maximum given in the constructor.
    pub fn add(&mut self, from: Pc, to: Pc) {
        let len = self.buffer[to] as usize;
        let offset = self.offsets[to];
        debug_assert!(
            offset + len < self.offsets.get(to + 1).copied().unwrap_or(self.buffer.len()),
            "Too many incoming steps for pc {to}"
        );
        self.buffer[to] += 1;
        self.buffer[offset + len] = from as u32;
    }

    /// Whether any step arrived at `to`
    pub fn has(&self, to: Pc) -> bool {
        self.buffer[to] > 0
    }

    /// Pcs from which steps arrived at `to`, in insertion order
    pub fn iter(&self, to: Pc) -> impl Iterator<Item = Pc> + '_ {
        let len = self.buffer[to] as usize;
        let offset = self.offsets[to];
        self.buffer[offset..offset + len]
            .iter()
            .map(|from| *from as Pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec(buffer: &FromBuffer, to: Pc) -> Vec<Pc> {
        buffer.iter(to).collect()
    }

    #[test]
    fn packed_lists() {
        let mut buffer = FromBuffer::new(&[1, 2, 3, 0, 2]);
        assert!((0..5).all(|pc| !buffer.has(pc)));

        buffer.add(123, 0);
        assert!(buffer.has(0));
        assert!((1..5).all(|pc| !buffer.has(pc)));

        buffer.add(111, 1);
        buffer.add(1111, 1);
        buffer.add(22, 2);
        buffer.add(222, 2);
        buffer.add(2222, 2);
        buffer.add(44, 4);
        buffer.add(444, 4);

        assert!(buffer.has(1));
        assert!(buffer.has(2));
        assert!(!buffer.has(3));
        assert!(buffer.has(4));

        assert_eq!(vec![123], to_vec(&buffer, 0));
        assert_eq!(vec![111, 1111], to_vec(&buffer, 1));
        assert_eq!(vec![22, 222, 2222], to_vec(&buffer, 2));
        assert_eq!(Vec::<Pc>::new(), to_vec(&buffer, 3));
        assert_eq!(vec![44, 444], to_vec(&buffer, 4));
    }

    #[test]
    fn clear() {
        let mut buffer = FromBuffer::new(&[2, 2]);
        buffer.add(1, 0);
        buffer.add(0, 1);
        buffer.clear();
        assert!(!buffer.has(0));
        assert!(!buffer.has(1));

        buffer.add(1, 0);
        assert_eq!(vec![1], to_vec(&buffer, 0));
    }
}
