use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use egui::ColorImage;
use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::metadata::LoopCount as FileLoopCount;
use image::{AnimationDecoder, DynamicImage, Frames, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, warn};

use crate::animation::{Animation, AnimationFrame, LoopCount};
use crate::Result;

/// Formats that may contain more than one frame. PNG is here because it can
/// be an APNG.
pub const ANIMATED_MIME_TYPES: [&str; 4] = ["image/webp", "image/gif", "image/apng", "image/png"];

/// Frames shorter than this are played at [`DEFAULT_FRAME_DELAY`], like browsers do for gifs
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

pub fn is_supported(mime_type: &str) -> bool {
    ANIMATED_MIME_TYPES.contains(&mime_type)
}

/// Guess a mime type from the file extension
pub fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first_raw()
        .map(ToOwned::to_owned)
}

/// Decode every frame of the image at `path`. Formats without animation
/// support decode to a single frame.
#[profiling::function]
pub fn decode(path: &Path) -> Result<Animation> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;

    match reader.format() {
        Some(ImageFormat::Gif) => {
            let decoder = GifDecoder::new(open(path)?)?;
            let loop_count = decoder.loop_count();
            from_frames(decoder.into_frames(), loop_count)
        }
        Some(ImageFormat::Png) => {
            let decoder = PngDecoder::new(open(path)?)?;
            if decoder.is_apng()? {
                let decoder = decoder.apng()?;
                let loop_count = decoder.loop_count();
                from_frames(decoder.into_frames(), loop_count)
            } else {
                Ok(still(DynamicImage::from_decoder(decoder)?))
            }
        }
        Some(ImageFormat::WebP) => {
            let decoder = WebPDecoder::new(open(path)?)?;
            if decoder.has_animation() {
                let loop_count = decoder.loop_count();
                from_frames(decoder.into_frames(), loop_count)
            } else {
                Ok(still(DynamicImage::from_decoder(decoder)?))
            }
        }
        _ => Ok(still(reader.decode()?)),
    }
}

/// [`decode`], logging failures
pub fn load(path: &Path) -> Result<Animation> {
    decode(path).inspect_err(|e| {
        warn!("Failed to load animated thumbnail {}: {e}", path.display());
    })
}

/// Whether the file decodes to more than one frame. Unreadable files are not animated.
pub fn is_animated(path: &Path) -> bool {
    match decode(path) {
        Ok(animation) => !animation.is_static(),
        Err(e) => {
            debug!("Failed to check if {} is animated: {e}", path.display());
            false
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn normalize_delay(delay: Duration) -> Duration {
    if delay < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}

fn to_loop_count(file: FileLoopCount) -> LoopCount {
    match file {
        FileLoopCount::Infinite => LoopCount::Infinite,
        FileLoopCount::Finite(n) => LoopCount::Finite(n),
    }
}

#[profiling::function]
fn from_frames(frames: Frames<'_>, file_loops: FileLoopCount) -> Result<Animation> {
    let frames = frames
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let delay = normalize_delay(Duration::from(frame.delay()));
            AnimationFrame::new(rgba_to_color_image(&frame.into_buffer()), delay)
        })
        .collect();

    Animation::new(frames, to_loop_count(file_loops))
}

fn still(image: DynamicImage) -> Animation {
    Animation::still(rgba_to_color_image(&image.into_rgba8()))
}

fn rgba_to_color_image(buffer: &RgbaImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [buffer.width() as usize, buffer.height() as usize],
        buffer.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame, Rgba};
    use std::num::NonZeroU32;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const COLORS: [[u8; 4]; 3] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];

    fn write_gif(dir: &TempDir, name: &str, delays_ms: &[u32]) -> PathBuf {
        write_gif_repeating(dir, name, delays_ms, Repeat::Infinite)
    }

    fn write_gif_repeating(
        dir: &TempDir,
        name: &str,
        delays_ms: &[u32],
        repeat: Repeat,
    ) -> PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder.set_repeat(repeat).unwrap();

        for (i, delay) in delays_ms.iter().enumerate() {
            let buf = RgbaImage::from_pixel(8, 6, Rgba(COLORS[i % COLORS.len()]));
            let frame = Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(*delay, 1));
            encoder.encode_frame(frame).unwrap();
        }

        path
    }

    /// `plays` of 0 loops forever
    fn write_apng(dir: &TempDir, name: &str, plays: u32) -> PathBuf {
        let path = dir.path().join(name);
        let (width, height) = (3, 2);

        let mut encoder = png::Encoder::new(File::create(&path).unwrap(), width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_animated(COLORS.len() as u32, plays).unwrap();
        encoder.set_frame_delay(150, 1000).unwrap();

        let mut writer = encoder.write_header().unwrap();
        for color in COLORS {
            let data = color.repeat((width * height) as usize);
            writer.write_image_data(&data).unwrap();
        }
        writer.finish().unwrap();

        path
    }

    fn write_png(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(5, 7, Rgba(COLORS[0]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn decodes_every_gif_frame() {
        let dir = TempDir::new().unwrap();
        let path = write_gif(&dir, "spinner.gif", &[100, 100, 200]);

        let anim = decode(&path).unwrap();

        assert_eq!(anim.frame_count(), 3);
        assert_eq!((anim.width(), anim.height()), (8, 6));
        assert!(!anim.is_static());
        assert_eq!(anim.frame(2).unwrap().delay, Duration::from_millis(200));
        assert_eq!(
            anim.frame(1).unwrap().image.pixels[0],
            egui::Color32::from_rgb(0, 255, 0)
        );
    }

    #[test]
    fn gif_loop_count_is_kept() {
        let dir = TempDir::new().unwrap();
        let once = write_gif_repeating(&dir, "once.gif", &[100, 100], Repeat::Finite(1));
        let forever = write_gif(&dir, "forever.gif", &[100, 100]);

        assert_ne!(decode(&once).unwrap().loop_count(), LoopCount::Infinite);
        assert_eq!(decode(&forever).unwrap().loop_count(), LoopCount::Infinite);
    }

    #[test]
    fn decodes_every_apng_frame() {
        let dir = TempDir::new().unwrap();
        let path = write_apng(&dir, "spinner.png", 0);

        let anim = decode(&path).unwrap();

        assert_eq!(anim.frame_count(), 3);
        assert_eq!((anim.width(), anim.height()), (3, 2));
        assert_eq!(anim.loop_count(), LoopCount::Infinite);
        assert_eq!(anim.frame(0).unwrap().delay, Duration::from_millis(150));
        assert_eq!(
            anim.frame(2).unwrap().image.pixels[0],
            egui::Color32::from_rgb(0, 0, 255)
        );
        assert!(is_animated(&path));
    }

    #[test]
    fn apng_played_once_is_finite() {
        let dir = TempDir::new().unwrap();
        let path = write_apng(&dir, "once.png", 1);

        let anim = decode(&path).unwrap();
        assert_eq!(anim.loop_count(), LoopCount::Finite(NonZeroU32::MIN));
    }

    #[test]
    fn tiny_gif_delays_play_at_default_speed() {
        let dir = TempDir::new().unwrap();
        let path = write_gif(&dir, "fast.gif", &[0, 10]);

        let anim = decode(&path).unwrap();
        assert!(anim.frames().iter().all(|f| f.delay == DEFAULT_FRAME_DELAY));
    }

    #[test]
    fn plain_png_is_static() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "still.png");

        let anim = decode(&path).unwrap();
        assert!(anim.is_static());
        assert_eq!((anim.width(), anim.height()), (5, 7));
        assert!(!is_animated(&path));
    }

    #[test]
    fn gif_is_animated() {
        let dir = TempDir::new().unwrap();
        let path = write_gif(&dir, "anim.gif", &[100, 100]);
        assert!(is_animated(&path));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"GIF89a definitely not a gif").unwrap();

        assert!(load(&path).is_err());
        assert!(!is_animated(&path));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let res = decode(&dir.path().join("missing.webp"));
        assert!(matches!(res, Err(Error::Io(_))));
    }

    #[test]
    fn mime_allow_list() {
        for mime in ["image/gif", "image/webp", "image/png", "image/apng"] {
            assert!(is_supported(mime), "{mime}");
        }
        for mime in ["image/jpeg", "image/svg+xml", "video/mp4", ""] {
            assert!(!is_supported(mime), "{mime}");
        }
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_mime(Path::new("a/b/cat.gif")).as_deref(), Some("image/gif"));
        assert_eq!(guess_mime(Path::new("cat.webp")).as_deref(), Some("image/webp"));
        assert_eq!(guess_mime(Path::new("noext")), None);
    }
}
