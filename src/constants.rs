//! Fixed constants for the server and the upload pipeline.

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Maximum accepted upload payload, enforced before any processing runs.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Longest side of the full-size variant. Sources smaller than this are
/// never upscaled.
pub const FULL_MAX_DIMENSION: u32 = 2048;

/// JPEG quality for the full-size variant.
pub const FULL_JPEG_QUALITY: u8 = 85;

/// Edge length of the square thumbnail variant.
pub const THUMBNAIL_SIZE: u32 = 512;

/// JPEG quality for the thumbnail variant.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// URL prefix under which derived files are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// Default page size for image listings.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Hard cap on page size (also the layout endpoint's fetch limit).
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default number of records returned by the trending endpoint.
pub const DEFAULT_TRENDING_LIMIT: u32 = 10;

/// Uploader recorded when the form does not name one.
pub const ANONYMOUS_UPLOADER: &str = "Anonymous";
