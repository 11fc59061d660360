//! Millisecond-timestamp formatting shared by transcript rendering and
//! `Status` snapshots.

/// Formats a millisecond offset as zero-padded `HH:MM:SS`. Hours are
/// uncapped — a meeting exceeding 24 hours still renders sensibly.
pub fn format_hms(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_all_zero() {
        assert_eq!(format_hms(0), "00:00:00");
    }

    #[test]
    fn just_under_an_hour() {
        assert_eq!(format_hms(3_599_000), "00:59:59");
    }

    #[test]
    fn exactly_an_hour() {
        assert_eq!(format_hms(3_600_000), "01:00:00");
    }

    #[test]
    fn hours_are_uncapped() {
        assert_eq!(format_hms(90_061_000), "25:01:01");
    }

    proptest::proptest! {
        /// For any non-negative millisecond offset, the formatted string has
        /// the fixed `HH:MM:SS` shape (two-or-more-digit hours, two-digit
        /// minutes/seconds) and decoding it back to seconds never exceeds the
        /// input (formatting truncates to whole seconds, never rounds up).
        #[test]
        fn formats_to_hh_mm_ss_and_never_overshoots(ms in 0i64..=i64::MAX / 2) {
            let formatted = format_hms(ms);
            let parts: Vec<&str> = formatted.split(':').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[0].len() >= 2);
            prop_assert_eq!(parts[1].len(), 2);
            prop_assert_eq!(parts[2].len(), 2);

            let hours: i64 = parts[0].parse().unwrap();
            let minutes: i64 = parts[1].parse().unwrap();
            let seconds: i64 = parts[2].parse().unwrap();
            prop_assert!(minutes < 60);
            prop_assert!(seconds < 60);

            let decoded_seconds = hours * 3600 + minutes * 60 + seconds;
            prop_assert!(decoded_seconds * 1000 <= ms);
            prop_assert!(ms - decoded_seconds * 1000 < 1000);
        }

        /// Negative offsets (should never occur in practice, since timestamps
        /// are measured from session start) clamp to zero rather than
        /// producing a malformed or negative-looking string.
        #[test]
        fn negative_offsets_clamp_to_zero(ms in i64::MIN..0i64) {
            prop_assert_eq!(format_hms(ms), "00:00:00");
        }
    }
}
