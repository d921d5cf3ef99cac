pub mod image_file_reader;
pub mod jpeg_encoder;
