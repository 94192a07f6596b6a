use crate::foundation::core::ImageId;

/// Read-only image entry supplied by the host's image library.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Image {
    /// Catalog identifier.
    pub id: ImageId,
    /// Where the host loads the picture from.
    pub url: String,
    /// Short description; also used as the scene label in generated scripts.
    pub alt: String,
    /// Default scene duration in seconds when the image is dropped on the timeline.
    pub duration: f64,
}

/// Ordered, immutable set of images scenes can reference.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImageCatalog {
    images: Vec<Image>,
}

impl ImageCatalog {
    /// Wrap an ordered image list.
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Look up an image by id.
    pub fn get(&self, id: &ImageId) -> Option<&Image> {
        self.images.iter().find(|img| &img.id == id)
    }

    /// Images in catalog order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when the catalog holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
