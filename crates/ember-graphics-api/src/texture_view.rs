use crate::backends::BackendRawImageView;

/// A reference to an image view created by the texture collaborator.
#[derive(Clone, Copy, Debug)]
pub struct TextureView {
    pub(crate) raw_image_view: BackendRawImageView,
}

impl TextureView {
    pub fn from_raw(raw_image_view: BackendRawImageView) -> Self {
        Self { raw_image_view }
    }
}
