use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

use eink_palette::bilevel;
use image::{ImageError, ImageFormat};

use super::canvas::Canvas;
use crate::error::PersistError;
use crate::models::RenderConfig;

/// Write the canvas to the configured output path, creating the working
/// directory first if needed. Returns the path written.
pub fn persist(canvas: &Canvas, config: &RenderConfig) -> Result<PathBuf, PersistError> {
    let work_dir = config.work_dir();
    if !work_dir.as_os_str().is_empty() && !work_dir.exists() {
        std::fs::create_dir_all(work_dir).map_err(|source| PersistError::CreateDir {
            path: work_dir.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %work_dir.display(), "Created working directory");
    }

    let path = config.output_path();
    save_canvas(canvas, &path)?;
    Ok(path)
}

/// Encode the canvas in the format implied by the file extension.
///
/// PNG goes through the `png` encoder so 1-bit canvases stay 1-bit on disk;
/// other formats are handed to `image`.
pub fn save_canvas(canvas: &Canvas, path: &Path) -> Result<(), PersistError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    if ext == "png" {
        let data = encode_png(canvas).map_err(|e| PersistError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, data).map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    } else {
        let format = ImageFormat::from_extension(&ext)
            .filter(|f| f.writing_enabled())
            .ok_or_else(|| PersistError::UnsupportedFormat(ext.clone()))?;
        save_with_image(canvas, path, format)?;
    }

    tracing::info!(
        path = %path.display(),
        width = canvas.width(),
        height = canvas.height(),
        "Saved image"
    );
    Ok(())
}

fn save_with_image(canvas: &Canvas, path: &Path, format: ImageFormat) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    canvas
        .clone()
        .into_dynamic()
        .write_to(&mut writer, format)
        .map_err(|e| match e {
            ImageError::IoError(source) => PersistError::Write {
                path: path.to_path_buf(),
                source,
            },
            other => PersistError::Encode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })
}

/// Mono canvases become 1-bit grayscale, RGB canvases 8-bit RGB.
fn encode_png(canvas: &Canvas) -> Result<Vec<u8>, png::EncodingError> {
    let (width, height) = canvas.dimensions();
    let (color_type, bit_depth, data) = match canvas {
        Canvas::Mono(img) => (
            png::ColorType::Grayscale,
            png::BitDepth::One,
            bilevel::pack_rows(img.as_raw(), width),
        ),
        Canvas::Rgb(img) => (png::ColorType::Rgb, png::BitDepth::Eight, img.as_raw().clone()),
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
    }
    Ok(buf.into_inner())
}
