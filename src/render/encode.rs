//! Animated GIF output.

use std::path::Path;
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{Delay, RgbaImage};

use crate::domain::LoopMode;

/// GIF quantizer speed (1 = best quality, 30 = fastest). 10 is the codec's own default.
const GIF_SPEED: i32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no frames to encode")]
    Empty,
    #[error("gif encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Encode `frames` (in order) into a GIF at `path`, overwriting any existing file.
///
/// Frames whose size differs from the first frame are resized to match it.
pub fn encode_animation(
    frames: &[RgbaImage],
    path: &Path,
    frame_delay: Duration,
    loop_mode: LoopMode,
) -> Result<usize, EncodeError> {
    let first = frames.first().ok_or(EncodeError::Empty)?;
    let (width, height) = first.dimensions();
    let delay = Delay::from_saturating_duration(frame_delay);

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, GIF_SPEED);
        encoder.set_repeat(match loop_mode {
            LoopMode::Once => Repeat::Finite(0),
            LoopMode::Forever => Repeat::Infinite,
        })?;

        let gif_frames = frames.iter().map(|img| {
            let img = if img.dimensions() == (width, height) {
                img.clone()
            } else {
                image::imageops::resize(img, width, height, FilterType::Triangle)
            };
            image::Frame::from_parts(img, 0, 0, delay)
        });
        encoder.encode_frames(gif_frames)?;
    }

    write_file(path, &buf)?;
    tracing::info!(
        path = %path.display(),
        frames = frames.len(),
        bytes = buf.len(),
        "animation written"
    );
    Ok(frames.len())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), EncodeError> {
    let err = |source| EncodeError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    std::fs::write(path, bytes).map_err(err)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::BufReader;

    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};

    use super::*;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    fn decode(path: &Path) -> Vec<image::Frame> {
        let reader = BufReader::new(File::open(path).unwrap());
        GifDecoder::new(reader)
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
    }

    #[test]
    fn empty_sequence_is_rejected_and_nothing_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let err = encode_animation(&[], &path, Duration::from_millis(100), LoopMode::Forever)
            .unwrap_err();
        assert!(matches!(err, EncodeError::Empty));
        assert!(!path.exists());
    }

    #[test]
    fn single_frame_animation_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.gif");
        let n = encode_animation(
            &[solid(40, 30, 10)],
            &path,
            Duration::from_millis(1500),
            LoopMode::Once,
        )
        .unwrap();
        assert_eq!(n, 1);
        assert_eq!(decode(&path).len(), 1);
    }

    #[test]
    fn frames_keep_count_size_and_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("anim.gif");
        let frames = vec![solid(40, 30, 0), solid(20, 10, 120), solid(40, 30, 250)];
        encode_animation(&frames, &path, Duration::from_millis(1500), LoopMode::Forever).unwrap();

        let decoded = decode(&path);
        assert_eq!(decoded.len(), 3);
        for f in &decoded {
            assert_eq!(f.buffer().dimensions(), (40, 30));
            let (num, den) = f.delay().numer_denom_ms();
            assert_eq!(num / den, 1500);
        }
    }

    #[test]
    fn existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"stale").unwrap();
        encode_animation(&[solid(4, 4, 1)], &path, Duration::from_millis(100), LoopMode::Forever)
            .unwrap();
        assert_eq!(decode(&path).len(), 1);
    }
}
