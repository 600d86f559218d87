//! Telemetry sink
//!
//! Components register named numeric probes with the sink, which samples them
//! all on its own schedule and, if an archive is attached, appends one CSV row
//! per sample. The control loop is single threaded, so probes share state with
//! their owner through `Rc<Cell<_>>` rather than locks.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{debug, warn};
use std::cell::Cell;
use std::rc::Rc;

// Internal imports
use crate::archive::{ArchiveError, Archiver};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shared scalar that a component updates each cycle and the telemetry sink
/// reads when sampling.
#[derive(Clone, Default, Debug)]
pub struct Probe(Rc<Cell<f64>>);

/// A source of samples for one telemetry channel.
pub type SampleSource = Box<dyn Fn() -> f64>;

struct Channel {
    name: String,
    source: SampleSource,
}

/// Collects named probes and samples them.
pub struct Telemetry {
    /// If false, only persistent channels are sampled.
    full_logging: bool,

    channels: Vec<Channel>,

    /// Values from the most recent call to `sample`, in channel order.
    latest: Vec<f64>,

    archiver: Option<Archiver>,

    /// Number of channels in the archive header, fixed by the first sample.
    num_archived: Option<usize>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, value: f64) {
        self.0.set(value)
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    /// Get a sample source which reads this probe.
    pub fn source(&self) -> impl Fn() -> f64 + 'static {
        let cell = self.0.clone();
        move || cell.get()
    }
}

impl Telemetry {
    /// Create a new sink.
    ///
    /// With `full_logging` false, channels registered as non-persistent are
    /// dropped at registration.
    pub fn new(full_logging: bool) -> Self {
        Self {
            full_logging,
            channels: Vec::new(),
            latest: Vec::new(),
            archiver: None,
            num_archived: None,
        }
    }

    /// Attach an archive which receives one row per sample.
    pub fn with_archive(mut self, archiver: Archiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Register a named probe.
    pub fn register<F, S>(&mut self, persistent: bool, source: F, name: S) -> &mut Self
    where
        F: Fn() -> f64 + 'static,
        S: Into<String>,
    {
        let name = name.into();

        if !persistent && !self.full_logging {
            debug!("Telemetry channel {} not persistent, skipping", name);
            return self;
        }

        if self.num_archived.is_some() {
            warn!(
                "Telemetry channel {} registered after archiving started, it will not be archived",
                name
            );
        }

        self.channels.push(Channel {
            name,
            source: Box::new(source),
        });

        self
    }

    /// Names of all active channels, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// The value a channel had at the most recent sample.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.channels
            .iter()
            .position(|c| c.name == name)
            .and_then(|i| self.latest.get(i).copied())
    }

    /// Read every channel and archive the values, if an archive is attached.
    pub fn sample(&mut self, time_s: f64) -> Result<(), ArchiveError> {
        self.latest = self.channels.iter().map(|c| (c.source)()).collect();

        let archiver = match self.archiver {
            Some(ref mut a) => a,
            None => return Ok(()),
        };

        let num_archived = match self.num_archived {
            Some(n) => n,
            None => {
                let header = std::iter::once("time_s")
                    .chain(self.channels.iter().map(|c| c.name.as_str()));
                archiver.write_record(header)?;
                self.num_archived = Some(self.channels.len());
                self.channels.len()
            }
        };

        let row = std::iter::once(time_s)
            .chain(self.latest.iter().take(num_archived).copied())
            .map(|v| v.to_string());

        archiver.write_record(row)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_probe_source_tracks_value() {
        let p = Probe::new();
        let src = p.source();
        p.set(2.5);
        assert_eq!(src(), 2.5);
        p.set(-1.0);
        assert_eq!(src(), -1.0);
    }

    #[test]
    fn test_non_persistent_channels_dropped() {
        let mut t = Telemetry::new(false);
        t.register(true, || 1.0, "a")
            .register(false, || 2.0, "b");
        assert_eq!(t.names(), vec!["a"]);

        let mut t = Telemetry::new(true);
        t.register(true, || 1.0, "a")
            .register(false, || 2.0, "b");
        assert_eq!(t.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_sample_reads_latest() {
        let p = Probe::new();
        let mut t = Telemetry::new(true);
        t.register(true, p.source(), "Drive/x");

        assert_eq!(t.latest("Drive/x"), None);

        p.set(3.0);
        t.sample(0.0).unwrap();
        assert_eq!(t.latest("Drive/x"), Some(3.0));

        p.set(4.0);
        assert_eq!(t.latest("Drive/x"), Some(3.0));
        t.sample(0.02).unwrap();
        assert_eq!(t.latest("Drive/x"), Some(4.0));
        assert_eq!(t.latest("Drive/y"), None);
    }

    #[test]
    fn test_sample_archives_rows() {
        let path = std::env::temp_dir()
            .join(format!("util_telemetry_test_{}", std::process::id()))
            .join("telemetry.csv");

        let mut t = Telemetry::new(true).with_archive(Archiver::create(&path).unwrap());
        t.register(true, || 1.5, "a");
        t.sample(0.0).unwrap();

        // Registered after the header, sampled but not archived
        t.register(true, || 9.0, "b");
        t.sample(1.0).unwrap();
        assert_eq!(t.latest("b"), Some(9.0));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "time_s,a\n0,1.5\n1,1.5\n");
    }
}
