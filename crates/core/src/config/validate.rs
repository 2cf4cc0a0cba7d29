use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Resolution, bitrate and sample rate targets are not 0
/// - Target frame rate is a positive number
/// - Worker count and encoder timeout are not 0
/// - The file extension is not empty
/// - The output container matches the file extension, since files are
///   replaced under their original names
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let targets = &config.targets;

    let zero_fields = [
        ("targets.max_width", targets.max_width),
        ("targets.max_height", targets.max_height),
        (
            "targets.target_video_bitrate_kbps",
            targets.target_video_bitrate_kbps,
        ),
        (
            "targets.target_audio_bitrate_kbps",
            targets.target_audio_bitrate_kbps,
        ),
        (
            "targets.target_audio_sample_rate_hz",
            targets.target_audio_sample_rate_hz,
        ),
    ];
    if let Some((name, _)) = zero_fields.iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ValidationError(format!("{name} cannot be 0")));
    }

    if !targets.target_frame_rate.is_finite() || targets.target_frame_rate <= 0.0 {
        return Err(ConfigError::ValidationError(
            "targets.target_frame_rate must be a positive number".to_string(),
        ));
    }

    if config.batch.workers == Some(0) {
        return Err(ConfigError::ValidationError(
            "batch.workers cannot be 0".to_string(),
        ));
    }

    if config.batch.extension.trim_start_matches('.').is_empty() {
        return Err(ConfigError::ValidationError(
            "batch.extension cannot be empty".to_string(),
        ));
    }

    let container = config.encoder.container;
    if !container
        .extension()
        .eq_ignore_ascii_case(config.batch.extension.trim_start_matches('.'))
    {
        return Err(ConfigError::ValidationError(format!(
            "encoder.container {:?} writes .{} files but batch.extension is {:?}",
            container,
            container.extension(),
            config.batch.extension
        )));
    }

    if config.encoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
