//! Perceiva: an assistive image tool for visually impaired users.
//!
//! An uploaded image is routed to one of four features: scene understanding,
//! object detection and personalized assistance go to a hosted multimodal
//! model; text-to-speech conversion runs a local OCR engine.  Every result is
//! read aloud by a local speech engine.

pub mod animation;
pub mod app;
pub mod audio;
pub mod codec;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod speech;
pub mod vision;

#[cfg(test)]
mod test_support;
