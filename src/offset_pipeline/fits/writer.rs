use std::io::Write;

use crate::offset_pipeline::common::error::Result;
use crate::offset_pipeline::fits::header::FitsHeader;
use crate::offset_pipeline::fits::types::FitsImage;

pub trait FitsWriter {
    fn write_fits(
        &self,
        image: &FitsImage,
        header: &FitsHeader,
        output: &mut dyn Write,
    ) -> Result<()>;
}
