//! Single-cycle sample ring
//!
//! Lock-free SPSC ring with capacity of exactly one acquisition cycle. The
//! producer lives in the timer context, the consumer in the main loop. A full
//! ring refuses further writes, so a new acquisition can never overwrite a
//! cycle that has not been copied out yet.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Create a ring holding `capacity` samples and split it into both ends
pub fn sample_ring(capacity: usize) -> (SampleProducer, SampleConsumer) {
    let rb = HeapRb::<f32>::new(capacity);
    let (producer, consumer) = rb.split();

    (
        SampleProducer { producer },
        SampleConsumer { consumer },
    )
}

/// Writing end (timer context)
pub struct SampleProducer {
    producer: HeapProducer<f32>,
}

impl SampleProducer {
    /// Push one sample
    ///
    /// # Returns
    /// `false` if the ring is full and the sample was dropped
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.producer.push(sample).is_ok()
    }

    /// Number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }
}

/// Reading end (main loop)
pub struct SampleConsumer {
    consumer: HeapConsumer<f32>,
}

impl SampleConsumer {
    /// Move up to `buffer.len()` samples out of the ring
    ///
    /// # Returns
    /// Number of samples actually read
    pub fn read(&mut self, buffer: &mut [f32]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Get number of available samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if ring is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_write_read() {
        let (mut producer, mut consumer) = sample_ring(8);

        for v in [1.0, 2.0, 3.0] {
            assert!(producer.push(v));
        }
        assert_eq!(consumer.len(), 3);

        let mut out = [0.0; 3];
        assert_eq!(consumer.read(&mut out), 3);
        assert_eq!(out, [1.0, 2.0, 3.0]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_full_ring_refuses_writes() {
        let (mut producer, consumer) = sample_ring(4);

        for i in 0..4 {
            assert!(producer.push(i as f32));
        }
        assert_eq!(producer.free_len(), 0);
        assert!(!producer.push(99.0));
        assert_eq!(consumer.len(), 4);
    }
}
