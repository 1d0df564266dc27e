/// Bounded history of recently delivered samples.
///
/// Writers append from the capture thread (behind a mutex); readers take
/// non-consuming snapshots. When full, the oldest samples are overwritten
/// and counted, so starvation vs. overrun is visible in diagnostics.
#[derive(Debug)]
pub struct SampleRing {
    buffer: Vec<f32>,
    head: usize,
    len: usize,
    overwritten: u64,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
            overwritten: 0,
        }
    }

    /// Append samples, overwriting the oldest on overflow.
    pub fn write(&mut self, samples: &[f32]) {
        let capacity = self.buffer.len();
        for &sample in samples {
            let tail = (self.head + self.len) % capacity;
            self.buffer[tail] = sample;
            if self.len < capacity {
                self.len += 1;
            } else {
                self.head = (self.head + 1) % capacity;
                self.overwritten += 1;
            }
        }
    }

    /// Copy of the buffered samples, oldest first. Does not consume.
    pub fn snapshot(&self) -> Vec<f32> {
        let capacity = self.buffer.len();
        (0..self.len)
            .map(|i| self.buffer[(self.head + i) % capacity])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Samples lost to overflow since construction or the last `clear`.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.overwritten = 0;
    }
}
