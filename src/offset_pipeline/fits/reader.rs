use crate::offset_pipeline::common::error::Result;
use crate::offset_pipeline::fits::header::FitsHeader;
use crate::offset_pipeline::fits::types::FitsImage;

pub trait FitsReader {
    fn read_fits(&self, data: &[u8]) -> Result<(FitsImage, FitsHeader)>;
}
