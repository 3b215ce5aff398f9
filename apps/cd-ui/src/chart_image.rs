//! Loading the stacked chart image and uploading it as a texture.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Failed to open image {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Image {path} is empty")]
    Empty { path: PathBuf },
}

/// A decoded chart image living on the GPU.
pub struct ChartImage {
    pub path: PathBuf,
    pub texture: egui::TextureHandle,
    /// Width and height in pixels.
    pub size: [usize; 2],
}

impl ChartImage {
    pub fn load(ctx: &egui::Context, path: &Path) -> Result<Self, ImageLoadError> {
        let decoded = image::open(path).map_err(|source| ImageLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        if size[0] == 0 || size[1] == 0 {
            return Err(ImageLoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let pixels = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
        let texture = ctx.load_texture("chart-image", pixels, egui::TextureOptions::LINEAR);
        tracing::info!(path = %path.display(), width = size[0], height = size[1], "image loaded");
        Ok(Self {
            path: path.to_path_buf(),
            texture,
            size,
        })
    }

    pub fn width(&self) -> f64 {
        self.size[0] as f64
    }

    pub fn height(&self) -> f64 {
        self.size[1] as f64
    }

    /// Whether an image-space point lies on the image.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..self.width()).contains(&x) && (0.0..self.height()).contains(&y)
    }
}
