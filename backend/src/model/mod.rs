// Data model for accumulated run samples.

mod sample;

pub use sample::Sample;
