//! JSON lines output of generated objects.

use anyhow::Context;
use fixture_core::TypeDescriptor;
use fixture_generator::ObjectGenerator;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default buffer size for JSONL writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Metrics from a generate operation.
#[derive(Debug, Clone, Default)]
pub struct OutputMetrics {
    /// Number of objects written.
    pub objects_written: u64,
    /// Diagnostics raised while populating.
    pub diagnostics: u64,
    /// Bytes written.
    pub bytes_written: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent populating objects.
    pub generation_duration: Duration,
    /// Time spent writing objects.
    pub write_duration: Duration,
}

impl OutputMetrics {
    /// Calculate objects per second.
    pub fn objects_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.objects_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Counts bytes passed through to the inner writer.
struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Populate objects `start_index..start_index + count` and write one JSON
/// document per object.
pub fn write_objects<W: Write>(
    generator: &ObjectGenerator,
    desc: &TypeDescriptor,
    start_index: u64,
    count: u64,
    pretty: bool,
    writer: W,
) -> anyhow::Result<OutputMetrics> {
    let start_time = Instant::now();
    let mut metrics = OutputMetrics::default();
    let mut writer = CountingWriter {
        inner: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, writer),
        written: 0,
    };

    let mut generation_time = Duration::ZERO;
    let mut write_time = Duration::ZERO;

    for index in start_index..start_index.saturating_add(count) {
        let gen_start = Instant::now();
        let population = generator
            .report_at(desc, index)
            .with_context(|| format!("Failed to populate '{desc}' #{index}"))?;
        generation_time += gen_start.elapsed();

        for diagnostic in &population.diagnostics {
            debug!("#{index}: {diagnostic}");
        }
        metrics.diagnostics += population.diagnostics.len() as u64;

        let write_start = Instant::now();
        if pretty {
            serde_json::to_writer_pretty(&mut writer, &population.value)?;
        } else {
            serde_json::to_writer(&mut writer, &population.value)?;
        }
        writeln!(writer)?;
        write_time += write_start.elapsed();

        metrics.objects_written += 1;

        if metrics.objects_written % 10000 == 0 {
            debug!("Written {} objects", metrics.objects_written);
        }
    }

    writer.flush()?;

    metrics.bytes_written = writer.written;
    metrics.total_duration = start_time.elapsed();
    metrics.generation_duration = generation_time;
    metrics.write_duration = write_time;

    info!(
        "Generation complete: {} objects of '{}', {} bytes in {:?} ({:.2} objects/sec)",
        metrics.objects_written,
        desc,
        metrics.bytes_written,
        metrics.total_duration,
        metrics.objects_per_second()
    );

    Ok(metrics)
}

/// Write objects to a file, replacing its contents.
pub fn write_objects_to_file(
    generator: &ObjectGenerator,
    desc: &TypeDescriptor,
    start_index: u64,
    count: u64,
    pretty: bool,
    path: &Path,
) -> anyhow::Result<OutputMetrics> {
    info!(
        "Generating '{}' with {} objects of '{}'",
        path.display(),
        count,
        desc
    );
    let file = File::create(path).with_context(|| format!("Failed to create {path:?}"))?;
    write_objects(generator, desc, start_index, count, pretty, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_core::TypeCatalog;
    use fixture_generator::Parameters;

    fn generator() -> ObjectGenerator {
        let catalog = TypeCatalog::from_yaml(
            r#"
types:
  - name: Point
    fields:
      - name: x
        type: int
      - name: y
        type: int
"#,
        )
        .unwrap();
        ObjectGenerator::new(catalog, Parameters::new().seed(3)).unwrap()
    }

    #[test]
    fn test_one_line_per_object() {
        let generator = generator();
        let desc = generator.resolve_type("Point").unwrap();
        let mut buffer = Vec::new();
        let metrics = write_objects(&generator, &desc, 0, 3, false, &mut buffer).unwrap();

        assert_eq!(metrics.objects_written, 3);
        assert_eq!(metrics.bytes_written, buffer.len() as u64);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let json: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(json["@type"], "Point");
            assert!(json["x"].is_i64());
        }
    }

    #[test]
    fn test_start_index_matches_stream() {
        let generator = generator();
        let desc = generator.resolve_type("Point").unwrap();

        let mut all = Vec::new();
        write_objects(&generator, &desc, 0, 4, false, &mut all).unwrap();
        let mut tail = Vec::new();
        write_objects(&generator, &desc, 2, 2, false, &mut tail).unwrap();

        let all = String::from_utf8(all).unwrap();
        let tail = String::from_utf8(tail).unwrap();
        assert_eq!(all.lines().skip(2).collect::<Vec<_>>(), tail.lines().collect::<Vec<_>>());
    }
}
