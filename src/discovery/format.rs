use crate::config::GalleryConfig;
use crate::foundation::core::PageNumber;

/// Image encodings a page may be published in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    Avif,
    Webp,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    Png,
}

impl PageFormat {
    /// File extension, also used as the per-format folder name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Matching `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Avif => image::ImageFormat::Avif,
            Self::Webp => image::ImageFormat::WebP,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

impl std::fmt::Display for PageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Maps `(page, format)` to an asset path: `{base}/{format}/{prefix}{page:0N}.{ext}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetLayout {
    base: String,
    prefix: String,
    pad_width: usize,
}

impl AssetLayout {
    pub fn new(base: impl Into<String>, prefix: impl Into<String>, pad_width: usize) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_owned(),
            prefix: prefix.into(),
            pad_width,
        }
    }

    pub fn from_config(cfg: &GalleryConfig) -> Self {
        Self::new(cfg.base.clone(), cfg.prefix.clone(), cfg.pad_width)
    }

    pub fn path(&self, page: PageNumber, format: PageFormat) -> String {
        let file = format!(
            "{}{:0width$}.{}",
            self.prefix,
            page.get(),
            format.extension(),
            width = self.pad_width
        );
        if self.base.is_empty() {
            format!("{format}/{file}")
        } else {
            format!("{}/{format}/{file}", self.base)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/discovery/format.rs"]
mod tests;
