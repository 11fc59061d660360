//! Crate-wide constants to eliminate magic numbers and provide a single source of truth.

// Frame capture
pub const FRAME_INTERVAL_MS: u64 = 500; // 2 Hz
pub const FRAME_INDEX_WIDTH: usize = 6;

// Caption scraping
pub const CAPTION_POLL_INTERVAL_MS: u64 = 2000; // 0.5 Hz
pub const CAPTION_DEFAULT_CONFIDENCE: f32 = 0.95;
pub const CAPTION_MIN_LEN: usize = 3;

// Join / admission
pub const NAVIGATION_TIMEOUT_SECS: u64 = 60;
pub const ADMISSION_POLL_INTERVAL_SECS: u64 = 1;
pub const ADMISSION_POLL_MAX_TICKS: u64 = 120;
pub const TYPE_TEXT_KEY_DELAY_MS: u64 = 40;

// Audio capture / encoding
pub const AUDIO_SAMPLE_RATE_HZ: &str = "16000";
pub const AUDIO_BITRATE_KBPS: &str = "64k";
pub const AUDIO_STOP_GRACE_MS: u64 = 500;
pub const AUDIO_FINALIZE_WAIT_MS: u64 = 1000;
pub const AUDIO_MIN_USABLE_BYTES: u64 = 5 * 1024; // 5 KB

pub const ENCODER_TIMEOUT_SECS: u64 = 300;
pub const ENCODER_VIDEO_BITRATE_KBPS: &str = "128k";
pub const ENCODER_CRF: &str = "23";

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

pub const STATUS_TRANSCRIPT_TAIL: usize = 20;

pub const RECOVERY_TRANSCRIPT: &str =
    "Session recovered after server restart. No live transcript available.";
pub const EMPTY_TRANSCRIPT: &str = "No captions were captured during this session.";
