pub mod decoder;
pub mod encoder;

pub use decoder::{decode_audio, decode_media, DecodedMedia};
pub use encoder::StagedAudio;
