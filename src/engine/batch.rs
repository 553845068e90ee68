use crate::error::{EngineError, SourceError};
use crate::packet::PacketRecord;

/// A contiguous, order-preserving slice of the packet stream
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub sequence: usize,  // Emission order, 0-based
    pub start_index: u64, // 1-based global index of records[0]
    pub records: Vec<PacketRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Global index one past the last record
    pub fn next_index(&self) -> u64 {
        self.start_index + self.records.len() as u64
    }
}

/// Groups a record source into fixed-size batches
///
/// Reads the source strictly in order from the calling thread. The final
/// batch may be shorter than `batch_size`; empty batches are never emitted.
/// A source error ends the stream after being yielded once.
pub struct BatchPartitioner<I> {
    source: I,
    batch_size: usize,
    next_sequence: usize,
    records_seen: u64,
    finished: bool,
}

impl<I> BatchPartitioner<I>
where
    I: Iterator<Item = Result<PacketRecord, SourceError>>,
{
    pub fn new(source: I, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
            next_sequence: 0,
            records_seen: 0,
            finished: false,
        }
    }

    /// Total records pulled from the source, including any short final batch
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Number of batches emitted so far
    pub fn batches_emitted(&self) -> usize {
        self.next_sequence
    }

    fn emit(&mut self, records: Vec<PacketRecord>) -> Batch {
        let batch = Batch {
            sequence: self.next_sequence,
            start_index: self.records_seen - records.len() as u64 + 1,
            records,
        };
        self.next_sequence += 1;
        batch
    }
}

impl<I> Iterator for BatchPartitioner<I>
where
    I: Iterator<Item = Result<PacketRecord, SourceError>>,
{
    type Item = Result<Batch, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut records = Vec::with_capacity(self.batch_size);
        while records.len() < self.batch_size {
            match self.source.next() {
                Some(Ok(record)) => {
                    records.push(record);
                    self.records_seen += 1;
                }
                Some(Err(source)) => {
                    self.finished = true;
                    return Some(Err(EngineError::Source {
                        packet: self.records_seen + 1,
                        source,
                    }));
                }
                None => {
                    self.finished = true;
                    break;
                }
            }
        }

        if records.is_empty() {
            None
        } else {
            Some(Ok(self.emit(records)))
        }
    }
}
