/// Fixed-length clip that a capture device writes into.
///
/// With looping enabled the write cursor wraps at the end and overwrites the
/// oldest samples. Without looping, writes past the end are dropped.
///
/// Not synchronized; backends sharing a clip with an audio thread wrap it in
/// `Arc<parking_lot::Mutex<LoopClip>>`.
#[derive(Debug, Clone)]
pub struct LoopClip {
    samples: Vec<f32>,
    write_index: usize,
    looping: bool,
}

impl LoopClip {
    pub fn new(length: usize, looping: bool) -> Self {
        Self {
            samples: vec![0.0; length],
            write_index: 0,
            looping,
        }
    }

    /// Append captured samples at the write cursor.
    pub fn write(&mut self, samples: &[f32]) {
        let capacity = self.samples.len();
        if samples.is_empty() || capacity == 0 {
            return;
        }

        if !self.looping {
            let room = capacity - self.write_index;
            let n = samples.len().min(room);
            self.samples[self.write_index..self.write_index + n].copy_from_slice(&samples[..n]);
            self.write_index += n;
            return;
        }

        // Only the tail can survive a write longer than the clip
        let skipped = samples.len().saturating_sub(capacity);
        if skipped > 0 {
            self.write_index = (self.write_index + skipped) % capacity;
        }
        for &sample in &samples[skipped..] {
            self.samples[self.write_index] = sample;
            self.write_index = (self.write_index + 1) % capacity;
        }
    }

    /// Fill `buffer` with clip samples starting at `offset`, wrapping around.
    ///
    /// Reading at the write cursor yields the oldest sample first and the
    /// newest sample last.
    pub fn read_into(&self, buffer: &mut [f32], offset: usize) {
        let capacity = self.samples.len();
        if capacity == 0 {
            buffer.fill(0.0);
            return;
        }
        let mut index = offset % capacity;
        for out in buffer.iter_mut() {
            *out = self.samples[index];
            index += 1;
            if index == capacity {
                index = 0;
            }
        }
    }

    /// Current write cursor.
    pub fn position(&self) -> usize {
        self.write_index
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}

/// Average interleaved frames down to one channel, replacing the contents
/// of `out`. Keeps `out`'s allocation so audio callbacks can reuse it.
pub fn downmix_into(samples: &[f32], channels: usize, out: &mut Vec<f32>) {
    out.clear();
    if channels <= 1 {
        out.extend_from_slice(samples);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}
