//! The three concurrent recorder tasks that run once a session reaches
//! `recording`: periodic frame screenshots, a long-lived FFmpeg audio
//! capture, and periodic caption scraping.

pub mod audio;
pub mod caption;
pub mod frame;
