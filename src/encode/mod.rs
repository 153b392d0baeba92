/// PNG/JPEG encoding and export naming.
pub mod raster;
