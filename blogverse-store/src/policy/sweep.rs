//! Transient-key naming convention used by the cleanup sweep.

/// Default markers: any key containing one of these is sweep-eligible.
pub const DEFAULT_SWEEP_MARKERS: [&str; 3] = ["_temp_", "_cache_", "_backup"];

/// Whether `key` names a transient entry the sweep may delete.
pub fn is_sweep_eligible<S: AsRef<str>>(key: &str, markers: &[S]) -> bool {
    markers
        .iter()
        .map(AsRef::as_ref)
        .any(|marker| !marker.is_empty() && key.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let markers = DEFAULT_SWEEP_MARKERS;
        assert!(is_sweep_eligible("blogverse_temp_draft", &markers));
        assert!(is_sweep_eligible("blogverse_cache_feed", &markers));
        assert!(is_sweep_eligible("blogverse_blogs_backup", &markers));
        assert!(is_sweep_eligible("blogverse_backup_2024", &markers));

        assert!(!is_sweep_eligible("blogverse_blogs", &markers));
        assert!(!is_sweep_eligible("blogverse_user", &markers));
        assert!(!is_sweep_eligible("blogverse_template", &markers));
        assert!(!is_sweep_eligible("cachedUsers", &markers));
    }

    #[test]
    fn test_empty_marker_matches_nothing() {
        assert!(!is_sweep_eligible("anything", &[""]));
        assert!(!is_sweep_eligible::<&str>("anything", &[]));
    }
}
