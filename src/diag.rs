//! Diagnostic checkpoints emitted by the encode/decode pipelines.
//!
//! The core stays pure: callers that want visibility pass a sink by
//! reference; everyone else gets `NopSink`. No global logger, no env vars.

use crate::models::Point;

/// A checkpoint event from inside the pipeline.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DiagEvent {
    /// Finder candidates confirmed after clustering
    FinderPatterns { count: usize },
    /// A confirmed finder center, in image coordinates
    FinderCenter { center: Point, module_size: f32 },
    /// Version estimated from finder spacing
    VersionEstimated { version: u8 },
    /// Version confirmed (or corrected) by BCH-protected version info
    VersionConfirmed { version: u8 },
    /// Mask selected during encoding, with its penalty score
    MaskChosen { mask: u8, penalty: i32 },
    /// One format-info copy failed BCH matching; the other was used
    FormatCopyFailed { location: usize },
    /// Alignment pattern was not found; estimated corner used instead
    AlignmentMissed { predicted: Point },
    /// A Reed-Solomon block was corrected
    BlockCorrected { block: usize, errors: usize },
}

/// Narrow sink the pipelines report progress through.
pub trait DiagnosticSink {
    /// Expected-path checkpoint
    fn note(&self, event: &DiagEvent);
    /// Something was tolerated that degrades confidence
    fn warn(&self, event: &DiagEvent);
}

/// Default sink: drops everything.
pub struct NopSink;

impl DiagnosticSink for NopSink {
    fn note(&self, _event: &DiagEvent) {}
    fn warn(&self, _event: &DiagEvent) {}
}
