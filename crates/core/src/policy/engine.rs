//! Policy engine implementation.

use tracing::debug;

use super::error::PolicyError;
use super::types::{EncodePlan, RewriteTargets, SkipGateThresholds};
use crate::probe::MediaProfile;

/// Decides per file whether and how to re-encode.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    gate: SkipGateThresholds,
    targets: RewriteTargets,
}

impl PolicyEngine {
    /// Creates a new engine from explicit thresholds and targets.
    pub fn new(gate: SkipGateThresholds, targets: RewriteTargets) -> Self {
        Self { gate, targets }
    }

    /// Creates an engine with the standard gate and the given targets.
    pub fn with_targets(targets: RewriteTargets) -> Self {
        Self::new(SkipGateThresholds::STANDARD, targets)
    }

    /// Plans the encode for a probed file.
    pub fn plan(&self, profile: &MediaProfile) -> Result<EncodePlan, PolicyError> {
        plan(profile, &self.gate, &self.targets)
    }
}

/// Plans the encode for a probed file against explicit thresholds and targets.
pub fn plan(
    profile: &MediaProfile,
    gate: &SkipGateThresholds,
    targets: &RewriteTargets,
) -> Result<EncodePlan, PolicyError> {
    validate_source(profile)?;

    if passes_skip_gate(profile, gate, targets) {
        debug!(path = %profile.path.display(), "Within bounds, skipping");
        return Ok(EncodePlan::skip());
    }

    // Downsample only; a source already below target keeps its rate.
    let new_audio_sample_rate_hz = profile
        .audio_sample_rate_hz
        .filter(|&rate| rate >= targets.target_audio_sample_rate_hz)
        .map(|_| targets.target_audio_sample_rate_hz);

    // Low or unknown audio bitrates are preserved.
    let new_audio_bitrate_kbps = profile
        .audio_bitrate_kbps
        .filter(|&kbps| kbps >= gate.audio_bitrate_kbps);

    let new_frame_rate =
        (targets.target_frame_rate < profile.frame_rate).then_some(targets.target_frame_rate);

    let new_height = (profile.width > targets.max_width || profile.height > targets.max_height)
        .then_some(targets.max_height);

    let plan = EncodePlan {
        needs_work: true,
        new_frame_rate,
        new_height,
        new_audio_bitrate_kbps,
        new_audio_sample_rate_hz,
        video_bitrate_kbps: targets.target_video_bitrate_kbps,
        default_audio_bitrate_kbps: targets.target_audio_bitrate_kbps,
    };
    debug!(path = %profile.path.display(), ?plan, "Planned re-encode");
    Ok(plan)
}

fn validate_source(profile: &MediaProfile) -> Result<(), PolicyError> {
    if !profile.frame_rate.is_finite() || profile.frame_rate <= 0.0 {
        return Err(PolicyError::invalid_source(
            &profile.path,
            format!("frame rate {} is not positive", profile.frame_rate),
        ));
    }
    if profile.width == 0 || profile.height == 0 {
        return Err(PolicyError::invalid_source(
            &profile.path,
            format!("resolution {}x{} is empty", profile.width, profile.height),
        ));
    }
    Ok(())
}

/// All comparisons are strict. A missing audio stream satisfies the audio
/// checks; an unknown bitrate on an existing stream does not.
fn passes_skip_gate(
    profile: &MediaProfile,
    gate: &SkipGateThresholds,
    targets: &RewriteTargets,
) -> bool {
    let audio_ok = match profile.audio_sample_rate_hz {
        None => true,
        Some(rate) => {
            rate < gate.audio_sample_rate_hz
                && profile
                    .audio_bitrate_kbps
                    .is_some_and(|kbps| kbps < gate.audio_bitrate_kbps)
        }
    };

    let video_bitrate_ok = profile
        .video_bitrate_kbps
        .is_some_and(|kbps| kbps < gate.video_bitrate_kbps);

    profile.height < targets.max_height
        && profile.width < targets.max_width
        && profile.frame_rate < targets.target_frame_rate
        && audio_ok
        && video_bitrate_ok
}
