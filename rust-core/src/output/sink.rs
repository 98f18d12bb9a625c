//! Series publishing
//!
//! Each series goes out as one JSON line, `{"<label>":[v0,v1,...]}`, values
//! with two decimals. This is what the serial plotter parses.

use std::io::{self, Write};

/// Labels of the series published every cycle
pub mod labels {
    pub const FREQS: &str = "freqs";
    pub const FFT_REAL: &str = "fft_real";
    pub const FFT_FILTERED: &str = "fft_filtered";
    pub const TIME: &str = "time";
    pub const IFFT_REAL: &str = "ifft_real";
    pub const IFFT_FILTERED: &str = "ifft_filtered";
}

/// Destination for named series
pub trait SeriesSink {
    /// Emit one labelled series
    fn publish(&mut self, label: &str, values: &[f32]) -> io::Result<()>;

    /// Push any buffered output through
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes JSON lines to any `io::Write`
pub struct JsonLineSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLineSink<W> {
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

impl<W: Write> SeriesSink for JsonLineSink<W> {
    fn publish(&mut self, label: &str, values: &[f32]) -> io::Result<()> {
        self.writer.write_all(b"{")?;
        serde_json::to_writer(&mut self.writer, label)?;
        self.writer.write_all(b":[")?;

        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b",")?;
            }
            write!(self.writer, "{:.2}", value)?;
        }

        self.writer.write_all(b"]}\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps every published series in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    series: Vec<(String, Vec<f32>)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All series in publish order
    pub fn series(&self) -> &[(String, Vec<f32>)] {
        &self.series
    }

    /// Most recent series published under `label`
    pub fn latest(&self, label: &str) -> Option<&[f32]> {
        self.series
            .iter()
            .rev()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_slice())
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}

impl SeriesSink for RecordingSink {
    fn publish(&mut self, label: &str, values: &[f32]) -> io::Result<()> {
        self.series.push((label.to_string(), values.to_vec()));
        Ok(())
    }
}

impl<S: SeriesSink + ?Sized> SeriesSink for &mut S {
    fn publish(&mut self, label: &str, values: &[f32]) -> io::Result<()> {
        (**self).publish(label, values)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_format() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.publish(labels::FREQS, &[0.0, 0.488, 12.345, -1.5]).unwrap();

        let line = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(line, "{\"freqs\":[0.00,0.49,12.35,-1.50]}\n");
    }

    #[test]
    fn test_json_line_empty_series() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.publish("time", &[]).unwrap();

        let line = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(line, "{\"time\":[]}\n");
    }

    #[test]
    fn test_json_line_parses_back() {
        let mut sink = JsonLineSink::new(Vec::new());
        sink.publish(labels::IFFT_FILTERED, &[1.0, 2.25]).unwrap();

        let line = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["ifft_filtered"][1], 2.25);
    }

    #[test]
    fn test_recording_sink_latest() {
        let mut sink = RecordingSink::new();
        sink.publish("a", &[1.0]).unwrap();
        sink.publish("b", &[2.0]).unwrap();
        sink.publish("a", &[3.0]).unwrap();

        assert_eq!(sink.series().len(), 3);
        assert_eq!(sink.latest("a"), Some(&[3.0][..]));
        assert!(sink.latest("c").is_none());
    }
}
