//! HTTP request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check endpoint
//! - `pdf` - PDF text extraction
//! - `stt` - Speech-to-text uploads
//! - `translate` - Text translation
//! - `tts` - Text-to-speech and generated audio retrieval
//! - `voices` - Voice listing endpoint

pub mod api;
pub mod pdf;
pub mod stt;
pub mod translate;
pub mod tts;
mod upload;
pub mod voices;
