//! Neural voice service (Azure Speech REST) synthesis.

mod config;
mod provider;

pub use config::{
    MP3_OUTPUT_FORMAT, NeuralTtsSettings, OUTPUT_FORMAT_HEADER, SUBSCRIPTION_KEY_HEADER,
    build_ssml, escape_xml, regional_endpoint,
};
pub use provider::NeuralTts;
