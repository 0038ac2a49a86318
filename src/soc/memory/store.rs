//! Sparse Backing Store.
//!
//! Functional memory contents, allocated in 4 KiB pages on first write.
//! Unwritten memory reads as zero.

use std::collections::HashMap;

const PAGE_SHIFT: u32 = 12;
const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Page-granular sparse byte store.
#[derive(Debug, Default)]
pub struct SparseStore {
    pages: HashMap<u64, Box<[u8; PAGE_SIZE]>>,
}

impl SparseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `buf.len()` bytes starting at `addr` into `buf`.
    pub fn read(&self, addr: u64, buf: &mut [u8]) {
        let mut done = 0;
        while done < buf.len() {
            let cur = addr + done as u64;
            let offset = (cur as usize) & (PAGE_SIZE - 1);
            let len = (PAGE_SIZE - offset).min(buf.len() - done);
            match self.pages.get(&(cur >> PAGE_SHIFT)) {
                Some(page) => buf[done..done + len].copy_from_slice(&page[offset..offset + len]),
                None => buf[done..done + len].fill(0),
            }
            done += len;
        }
    }

    /// Writes `data` starting at `addr`.
    pub fn write(&mut self, addr: u64, data: &[u8]) {
        let mut done = 0;
        while done < data.len() {
            let cur = addr + done as u64;
            let offset = (cur as usize) & (PAGE_SIZE - 1);
            let len = (PAGE_SIZE - offset).min(data.len() - done);
            let page = self
                .pages
                .entry(cur >> PAGE_SHIFT)
                .or_insert_with(|| Box::new([0; PAGE_SIZE]));
            page[offset..offset + len].copy_from_slice(&data[done..done + len]);
            done += len;
        }
    }

    /// Pages allocated so far.
    pub fn resident_pages(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_across_page_boundary_reads_back() {
        let mut store = SparseStore::new();
        let data: Vec<u8> = (0..32).collect();
        store.write(0x0ff0, &data);
        assert_eq!(store.resident_pages(), 2);

        let mut buf = vec![0xff; 32];
        store.read(0x0ff0, &mut buf);
        assert_eq!(buf, data);
    }

    #[test]
    fn unwritten_memory_reads_zero() {
        let store = SparseStore::new();
        let mut buf = [0xaa; 8];
        store.read(0x1234_5678, &mut buf);
        assert_eq!(buf, [0; 8]);
    }
}
