#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! Provides [`SessionRecorder`] for recording host gesture callbacks during a
//! session, and [`replay`] for re-running them through a fresh controller to
//! verify that the control state matches at every step.
//!
//! # Trace layout
//!
//! - **Header**: schema version and the screen height used for pan scaling.
//! - **Input**: one gesture callback, numbered from 1.
//! - **Checkpoint**: heading, telegraph and the pulse kinds requested by that
//!   callback, with a FNV-1a checksum chained over all previous checkpoints.
//! - **Summary**: total inputs and the final checksum chain.
//!
//! Replay recomputes the chain and checks it against every checkpoint and
//! the summary, so an edited trace fails verification even when its
//! readouts still match.
//!
//! # Determinism contract
//!
//! Given identical inputs, screen height and configuration, replay **must**
//! reproduce every checkpoint. The adapter holds no clocks and no randomness,
//! so any mismatch points at a behavioral change.

use podctl_core::{ControlConfig, ControlReadout, PulseKind};

use crate::gesture_adapter::{GestureDispatch, GestureInput};
use crate::host::{PodControl, RecordingHost};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "podctl-trace-v2";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, &next.to_le_bytes())
}

/// Checksum of the observable state after one callback.
#[must_use]
pub fn checkpoint_checksum(readout: ControlReadout, pulses: &[PulseKind]) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &readout.heading.to_le_bytes());
    let hash = fnv1a64_bytes(hash, &readout.telegraph.to_le_bytes());
    let hash = fnv1a64_bytes(hash, &(pulses.len() as u32).to_le_bytes());
    pulses.iter().fold(hash, |hash, kind| {
        let tag = match kind {
            PulseKind::Long => 1u8,
            PulseKind::Short => 2u8,
        };
        fnv1a64_bytes(hash, &[tag])
    })
}

fn pulse_kinds(dispatch: &GestureDispatch) -> Vec<PulseKind> {
    dispatch.feedback.iter().map(|event| event.kind).collect()
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "record", rename_all = "snake_case"))]
pub enum TraceRecord {
    /// Session header (must be first).
    Header { schema: String, screen_height: f64 },
    /// A host gesture callback.
    Input { seq: u64, input: GestureInput },
    /// Control state after input `seq`.
    Checkpoint {
        seq: u64,
        heading: i32,
        telegraph: i32,
        pulses: Vec<PulseKind>,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_inputs: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of recorded inputs.
    #[must_use]
    pub fn input_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Input { .. }))
            .count() as u64
    }

    /// Final checksum chain from the summary record.
    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }
}

/// Records a session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    control: PodControl<RecordingHost>,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    next_seq: u64,
}

impl SessionRecorder {
    #[must_use]
    pub fn new(config: ControlConfig, screen_height: f64) -> Self {
        Self {
            control: PodControl::new(config, RecordingHost::new(screen_height)),
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_string(),
                screen_height,
            }],
            checksum_chain: 0,
            next_seq: 1,
        }
    }

    /// Run and record one callback, followed by its checkpoint.
    pub fn push(&mut self, input: GestureInput) -> GestureDispatch {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(TraceRecord::Input { seq, input });

        let dispatch = self.control.dispatch(input);
        let readout = self.control.readout();
        let pulses = pulse_kinds(&dispatch);
        self.checksum_chain =
            fnv1a64_pair(self.checksum_chain, checkpoint_checksum(readout, &pulses));
        self.records.push(TraceRecord::Checkpoint {
            seq,
            heading: readout.heading,
            telegraph: readout.telegraph,
            pulses,
            checksum_chain: self.checksum_chain,
        });
        dispatch
    }

    /// Access the controller being recorded.
    #[must_use]
    pub fn control(&self) -> &PodControl<RecordingHost> {
        &self.control
    }

    /// Finish recording and return the completed trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_inputs: self.next_seq - 1,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_inputs: u64,
    pub final_readout: ControlReadout,
    pub final_checksum_chain: u64,
    /// First checkpoint that differed, if any.
    pub first_mismatch: Option<ReplayMismatch>,
    /// Input count stored in the summary record, if present.
    pub recorded_total_inputs: Option<u64>,
    /// Final chain stored in the summary record, if present.
    pub recorded_checksum_chain: Option<u64>,
}

impl ReplayResult {
    /// Whether the summary record is present and agrees with the replay.
    #[must_use]
    pub fn summary_matches(&self) -> bool {
        self.recorded_total_inputs == Some(self.total_inputs)
            && self.recorded_checksum_chain == Some(self.final_checksum_chain)
    }

    /// Whether every checkpoint and the summary matched.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none() && self.summary_matches()
    }
}

/// Description of a checkpoint mismatch during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub seq: u64,
    pub expected: ControlReadout,
    pub actual: ControlReadout,
    pub expected_pulses: Vec<PulseKind>,
    pub actual_pulses: Vec<PulseKind>,
    pub expected_chain: u64,
    pub actual_chain: u64,
}

impl core::fmt::Display for ReplayMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.expected != self.actual {
            write!(f, "expected {}, got {}", self.expected, self.actual)
        } else if self.expected_pulses != self.actual_pulses {
            write!(
                f,
                "expected pulses {:?}, got {:?}",
                self.expected_pulses, self.actual_pulses
            )
        } else {
            write!(
                f,
                "checksum chain {:#018x} recorded, {:#018x} replayed",
                self.expected_chain, self.actual_chain
            )
        }
    }
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace does not start with a header record.
    MissingHeader,
    /// The header names a schema this build does not understand.
    UnsupportedSchema(String),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::UnsupportedSchema(schema) => write!(f, "unsupported trace schema: {schema}"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Replay a recorded session trace through a fresh controller.
///
/// Inputs are fed in order; each checkpoint is compared against the state
/// reached at that point. Replay continues past a mismatch so the final chain
/// reflects the whole session. The summary record is compared separately; see
/// [`ReplayResult::summary_matches`].
pub fn replay(config: ControlConfig, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let screen_height = match trace.records.first() {
        Some(TraceRecord::Header {
            schema,
            screen_height,
        }) => {
            if schema != SCHEMA_VERSION {
                return Err(ReplayError::UnsupportedSchema(schema.clone()));
            }
            *screen_height
        }
        _ => return Err(ReplayError::MissingHeader),
    };

    let mut control = PodControl::new(config, RecordingHost::new(screen_height));
    let mut checksum_chain: u64 = 0;
    let mut total_inputs: u64 = 0;
    let mut last_pulses: Vec<PulseKind> = Vec::new();
    let mut first_mismatch: Option<ReplayMismatch> = None;
    let mut recorded_total_inputs = None;
    let mut recorded_checksum_chain = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { input, .. } => {
                last_pulses = pulse_kinds(&control.dispatch(*input));
                total_inputs += 1;
            }
            TraceRecord::Checkpoint {
                seq,
                heading,
                telegraph,
                pulses,
                checksum_chain: expected_chain,
            } => {
                let actual = control.readout();
                checksum_chain =
                    fnv1a64_pair(checksum_chain, checkpoint_checksum(actual, &last_pulses));
                let expected = ControlReadout::new(*heading, *telegraph);
                let diverged = actual != expected
                    || last_pulses != *pulses
                    || checksum_chain != *expected_chain;
                if diverged && first_mismatch.is_none() {
                    first_mismatch = Some(ReplayMismatch {
                        seq: *seq,
                        expected,
                        actual,
                        expected_pulses: pulses.clone(),
                        actual_pulses: last_pulses.clone(),
                        expected_chain: *expected_chain,
                        actual_chain: checksum_chain,
                    });
                }
            }
            TraceRecord::Summary {
                total_inputs,
                final_checksum_chain,
            } => {
                recorded_total_inputs = Some(*total_inputs);
                recorded_checksum_chain = Some(*final_checksum_chain);
            }
            TraceRecord::Header { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_inputs,
        final_readout: control.readout(),
        final_checksum_chain: checksum_chain,
        first_mismatch,
        recorded_total_inputs,
        recorded_checksum_chain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use podctl_core::TelegraphConfig;
    use pretty_assertions::assert_eq;

    fn script() -> Vec<GestureInput> {
        vec![
            GestureInput::PanStart { pointers: 1 },
            GestureInput::PanUpdate {
                translation_y: -20.0,
                pointers: 1,
            },
            GestureInput::PanUpdate {
                translation_y: -40.0,
                pointers: 1,
            },
            GestureInput::PanUpdate {
                translation_y: -20.0,
                pointers: 1,
            },
            GestureInput::Finalize,
            GestureInput::RotationStart { rotation: 0.0 },
            GestureInput::RotationUpdate { rotation: 0.2 },
            GestureInput::Finalize,
        ]
    }

    fn record(config: ControlConfig) -> SessionTrace {
        let mut rec = SessionRecorder::new(config, 800.0);
        for input in script() {
            rec.push(input);
        }
        rec.finish()
    }

    #[test]
    fn trace_structure() {
        let trace = record(ControlConfig::default());
        assert!(matches!(trace.records[0], TraceRecord::Header { .. }));
        assert!(matches!(
            trace.records.last(),
            Some(TraceRecord::Summary { total_inputs: 8, .. })
        ));
        assert_eq!(trace.input_count(), 8);
        // Header + (input, checkpoint) per callback + summary.
        assert_eq!(trace.records.len(), 1 + 2 * 8 + 1);
    }

    #[test]
    fn replay_matches_recording() {
        let trace = record(ControlConfig::default());
        let result = replay(ControlConfig::default(), &trace).unwrap();
        assert!(result.ok());
        assert_eq!(result.total_inputs, 8);
        assert_eq!(Some(result.final_checksum_chain), trace.final_checksum_chain());
        assert_eq!(result.final_readout, ControlReadout::new(11, 5));
    }

    #[test]
    fn replay_with_different_config_reports_first_mismatch() {
        let trace = record(ControlConfig::default());
        let config = ControlConfig::default().with_telegraph(TelegraphConfig {
            step: 10.0,
            ..TelegraphConfig::default()
        });
        let result = replay(config, &trace).unwrap();
        assert!(!result.ok());
        let mismatch = result.first_mismatch.unwrap();
        assert_eq!(mismatch.seq, 2);
        assert_eq!(mismatch.expected, ControlReadout::new(0, 5));
        assert_eq!(mismatch.actual, ControlReadout::new(0, 0));
    }

    #[test]
    fn replay_requires_header() {
        let trace = SessionTrace { records: vec![] };
        assert_eq!(
            replay(ControlConfig::default(), &trace),
            Err(ReplayError::MissingHeader)
        );
    }

    #[test]
    fn replay_rejects_unknown_schema() {
        let trace = SessionTrace {
            records: vec![TraceRecord::Header {
                schema: "other".to_string(),
                screen_height: 800.0,
            }],
        };
        assert_eq!(
            replay(ControlConfig::default(), &trace),
            Err(ReplayError::UnsupportedSchema("other".to_string()))
        );
    }

    #[test]
    fn checksum_depends_on_every_field() {
        let base = checkpoint_checksum(ControlReadout::new(1, 2), &[]);
        assert_ne!(base, checkpoint_checksum(ControlReadout::new(2, 2), &[]));
        assert_ne!(base, checkpoint_checksum(ControlReadout::new(1, 3), &[]));
        let long = checkpoint_checksum(ControlReadout::new(1, 2), &[PulseKind::Long]);
        let short = checkpoint_checksum(ControlReadout::new(1, 2), &[PulseKind::Short]);
        assert_ne!(base, long);
        assert_ne!(long, short);
    }

    fn checkpoint_chain_mut(trace: &mut SessionTrace, target: u64) -> &mut u64 {
        trace
            .records
            .iter_mut()
            .find_map(|r| match r {
                TraceRecord::Checkpoint {
                    seq,
                    checksum_chain,
                    ..
                } if *seq == target => Some(checksum_chain),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn edited_checkpoint_chain_is_reported() {
        let mut trace = record(ControlConfig::default());
        *checkpoint_chain_mut(&mut trace, 3) ^= 1;

        let result = replay(ControlConfig::default(), &trace).unwrap();
        assert!(!result.ok());
        let mismatch = result.first_mismatch.unwrap();
        assert_eq!(mismatch.seq, 3);
        assert_eq!(mismatch.expected, mismatch.actual);
        assert_ne!(mismatch.expected_chain, mismatch.actual_chain);
        assert!(mismatch.to_string().starts_with("checksum chain"));
    }

    #[test]
    fn edited_summary_chain_is_reported() {
        let mut trace = record(ControlConfig::default());
        if let Some(TraceRecord::Summary {
            final_checksum_chain,
            ..
        }) = trace.records.last_mut()
        {
            *final_checksum_chain ^= 1;
        }

        let result = replay(ControlConfig::default(), &trace).unwrap();
        assert_eq!(result.first_mismatch, None);
        assert!(!result.summary_matches());
        assert!(!result.ok());
    }

    #[test]
    fn truncated_trace_fails_summary_check() {
        let mut trace = record(ControlConfig::default());
        trace.records.pop();
        let result = replay(ControlConfig::default(), &trace).unwrap();
        assert_eq!(result.recorded_checksum_chain, None);
        assert!(!result.ok());
    }

    #[test]
    fn swapped_pulse_kind_is_reported() {
        let mut rec = SessionRecorder::new(ControlConfig::default(), 800.0);
        rec.push(GestureInput::PanStart { pointers: 1 });
        rec.push(GestureInput::PanUpdate {
            translation_y: -20.0,
            pointers: 1,
        });
        // Back to the start position: telegraph returns to zero.
        rec.push(GestureInput::PanUpdate {
            translation_y: 0.0,
            pointers: 1,
        });
        let mut trace = rec.finish();

        let pulses = trace
            .records
            .iter_mut()
            .find_map(|r| match r {
                TraceRecord::Checkpoint { seq: 3, pulses, .. } => Some(pulses),
                _ => None,
            })
            .unwrap();
        assert_eq!(pulses, &vec![PulseKind::Long]);
        *pulses = vec![PulseKind::Short];

        let mismatch = replay(ControlConfig::default(), &trace)
            .unwrap()
            .first_mismatch
            .unwrap();
        assert_eq!(mismatch.seq, 3);
        assert_eq!(mismatch.expected, mismatch.actual);
        assert_eq!(mismatch.expected_pulses, vec![PulseKind::Short]);
        assert_eq!(mismatch.actual_pulses, vec![PulseKind::Long]);
        assert!(mismatch.to_string().starts_with("expected pulses"));
    }
}
