//! Raster extraction: decodes the embedded bitmap tags and writes each one
//! out as a scaled PNG next to the SAM file
//!
//! Five wire kinds are supported: DefineBits (JPEG body sharing an external
//! JPEGTables tag), DefineBitsJPEG2 (self-contained, with an encoder quirk
//! that prepends a dummy image before an EOI/SOI boundary), DefineBitsJPEG3
//! (JPEG plus a zlib-compressed alpha plane) and the two lossless variants
//! (zlib-compressed palettized, RGB555 or (A)RGB rows).

use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use image::imageops::FilterType;
use image::RgbaImage;
use tracing::info;

use swf_tag::{SwfReader, Tag, TagCode};

use crate::error::ConvertError;
use crate::model::Image;

/// Scaled output dimensions must stay within this bound
const MAX_IMAGE_DIMENSION: u32 = 16386;

fn bad_data(what: &str) -> ConvertError {
    ConvertError::InputFileBadData(what.into())
}

/// Position of the last EOI/SOI marker pair, if any
fn find_jpeg_boundary(data: &[u8]) -> Option<usize> {
    let mut pos = None;
    if data.len() < 4 {
        return None;
    }
    for t in 0..data.len() - 4 {
        if data[t] == 0xFF && data[t + 1] == 0xD9 && data[t + 2] == 0xFF && data[t + 3] == 0xD8 {
            pos = Some(t);
        }
    }
    pos
}

/// Inflate a zlib stream that must hold exactly `expected` bytes
fn inflate_exact(data: &[u8], expected: usize, what: &str) -> Result<Vec<u8>, ConvertError> {
    let mut out = Vec::with_capacity(expected);
    let mut decoder = ZlibDecoder::new(data);
    decoder
        .read_to_end(&mut out)
        .map_err(|_| bad_data(what))?;
    if out.len() != expected {
        return Err(bad_data(what));
    }
    Ok(out)
}

fn decode_jpeg(bytes: &[u8]) -> Result<RgbaImage, ConvertError> {
    let img = image::load_from_memory(bytes).map_err(|_| bad_data("Jpeg load failed"))?;
    Ok(img.to_rgba8())
}

/// DefineBits / DefineBitsJPEG2: reassemble the JPEG byte stream
fn decode_jpeg_tag(
    code: TagCode,
    body: &[u8],
    jpeg_tables: Option<&[u8]>,
) -> Result<RgbaImage, ConvertError> {
    if body.len() < 2 {
        return Err(bad_data("Jpeg load failed"));
    }
    let mut bytes = Vec::new();
    let mut skip = 2usize; // character id

    match code {
        TagCode::DefineBitsJpeg => {
            if let Some(tables) = jpeg_tables {
                if tables.len() >= 2 {
                    // strip the tables' trailing EOI and the body's leading SOI
                    bytes.extend_from_slice(&tables[..tables.len() - 2]);
                    skip += 2;
                }
            }
        }
        TagCode::DefineBitsJpeg2 => {
            if let Some(pos) = find_jpeg_boundary(&body[2..]) {
                bytes.extend_from_slice(&body[2..2 + pos]);
                skip += pos + 4;
            }
        }
        _ => unreachable!(),
    }

    if body.len() > skip {
        bytes.extend_from_slice(&body[skip..]);
    }
    decode_jpeg(&bytes)
}

/// DefineBitsJPEG3: JPEG image plus a separately deflated alpha plane
fn decode_jpeg3(body: &[u8]) -> Result<RgbaImage, ConvertError> {
    if body.len() <= 6 {
        return Err(bad_data("Jpeg load failed"));
    }
    let jpeg_len = u32::from_le_bytes([body[2], body[3], body[4], body[5]]) as usize;
    let jpeg_end = 6 + jpeg_len;
    if jpeg_end > body.len() {
        return Err(bad_data("Jpeg load failed"));
    }

    let mut img = decode_jpeg(&body[6..jpeg_end])?;

    let alpha_data = &body[jpeg_end..];
    if !alpha_data.is_empty() {
        let alpha_size = img.width() as usize * img.height() as usize;
        let alpha = inflate_exact(alpha_data, alpha_size, "Jpeg alpha failed")?;
        for (pixel, a) in img.pixels_mut().zip(alpha) {
            pixel.0[3] = a;
        }
    }
    Ok(img)
}

fn read_lossless_header(
    r: &mut SwfReader<'_>,
) -> Result<(u32, u32, u32, usize), swf_tag::SwfError> {
    r.read_u16()?; // character id
    let format = r.read_u8()?;
    let bpp = if format < 8 { 1u32 << format } else { 0 };
    let width = u32::from(r.read_u16()?);
    let height = u32::from(r.read_u16()?);
    let color_table_size = if bpp == 8 {
        usize::from(r.read_u8()?) + 1
    } else {
        0
    };
    Ok((bpp, width, height, color_table_size))
}

/// DefineBitsLossless / DefineBitsLossless2: deflated pixel rows, padded to
/// 4-byte boundaries, with an optional palette
fn decode_lossless(code: TagCode, body: &[u8]) -> Result<RgbaImage, ConvertError> {
    let with_alpha = code == TagCode::DefineBitsLossless2;

    let mut r = SwfReader::new(body);
    let (bpp, width, height, color_table_size) =
        read_lossless_header(&mut r).map_err(|_| bad_data("Bad image data"))?;

    if width == 0 || height == 0 {
        return Err(bad_data("Bad image data"));
    }
    if !matches!(bpp, 8 | 16 | 32) {
        return Err(bad_data("Bad bits per pixel"));
    }

    let width_bytes = width as usize * (bpp as usize / 8);
    let bytes_per_line = (width_bytes + 3) & !3;
    let image_size = bytes_per_line * height as usize;
    let palette_entry = if with_alpha { 4 } else { 3 };

    let data = inflate_exact(
        r.remaining(),
        image_size + color_table_size * palette_entry,
        "Bad image data",
    )?;

    let mut palette = Vec::with_capacity(color_table_size);
    for entry in data[..color_table_size * palette_entry].chunks_exact(palette_entry) {
        let a = if with_alpha { entry[3] } else { 255 };
        palette.push([entry[0], entry[1], entry[2], a]);
    }
    let rows = &data[color_table_size * palette_entry..];

    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        let line = &rows[y as usize * bytes_per_line..];
        for x in 0..width {
            let rgba = match bpp {
                8 => *palette
                    .get(line[x as usize] as usize)
                    .ok_or_else(|| bad_data("Bad image data"))?,
                16 => {
                    // big-endian RGB555, top bit reserved
                    let v = u16::from_be_bytes([line[x as usize * 2], line[x as usize * 2 + 1]]);
                    let expand = |c: u16| ((c << 3) | (c >> 2)) as u8;
                    [
                        expand((v >> 10) & 0x1F),
                        expand((v >> 5) & 0x1F),
                        expand(v & 0x1F),
                        255,
                    ]
                }
                _ => {
                    let px = &line[x as usize * 4..x as usize * 4 + 4];
                    let (a, r, g, b) = (px[0], px[1], px[2], px[3]);
                    if with_alpha {
                        // stored premultiplied
                        let unmul = |c: u8| {
                            if a == 0 {
                                0
                            } else {
                                ((u16::from(c) * 255 / u16::from(a)).min(255)) as u8
                            }
                        };
                        [unmul(r), unmul(g), unmul(b), a]
                    } else {
                        [r, g, b, 255]
                    }
                }
            };
            img.put_pixel(x, y, image::Rgba(rgba));
        }
    }
    Ok(img)
}

/// Decode one bitmap tag, scale it and commit it as
/// `{prefix}_{index+1:04}.png`
pub fn export_image(
    tag: &Tag<'_>,
    jpeg_tables: Option<&[u8]>,
    index: usize,
    prefix: &str,
    scale: f64,
) -> Result<Image, ConvertError> {
    let code = TagCode::from_u16(tag.code).ok_or(ConvertError::UnsupportedTag(tag.code))?;

    let img = match code {
        TagCode::DefineBitsJpeg | TagCode::DefineBitsJpeg2 => {
            decode_jpeg_tag(code, tag.body, jpeg_tables)?
        }
        TagCode::DefineBitsJpeg3 => decode_jpeg3(tag.body)?,
        TagCode::DefineBitsLossless | TagCode::DefineBitsLossless2 => {
            decode_lossless(code, tag.body)?
        }
        _ => return Err(ConvertError::UnsupportedTag(tag.code)),
    };

    let scaled_width = (f64::from(img.width()) * scale).ceil() as i64;
    let scaled_height = (f64::from(img.height()) * scale).ceil() as i64;
    if scaled_width <= 0
        || scaled_width > i64::from(MAX_IMAGE_DIMENSION)
        || scaled_height <= 0
        || scaled_height > i64::from(MAX_IMAGE_DIMENSION)
    {
        return Err(ConvertError::BadScaleValue);
    }
    let (scaled_width, scaled_height) = (scaled_width as u32, scaled_height as u32);

    let img = if scaled_width != img.width() || scaled_height != img.height() {
        image::imageops::resize(&img, scaled_width, scaled_height, FilterType::CatmullRom)
    } else {
        img
    };

    let image_path = format!("{}_{:04}.png", prefix, index + 1);
    let file_name = Path::new(&image_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_path.clone());

    if let Some(parent) = Path::new(&image_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|_| ConvertError::OutputDir)?;
        }
    }

    // write to a sibling temp file, rename into place on success
    let tmp_path = format!("{image_path}.tmp");
    let write_err = || ConvertError::OutputFileWrite(file_name.clone());
    img.save_with_format(&tmp_path, image::ImageFormat::Png)
        .map_err(|_| write_err())?;
    std::fs::rename(&tmp_path, &image_path).map_err(|_| write_err())?;

    info!("{file_name}");

    Ok(Image {
        index,
        width: scaled_width as u16,
        height: scaled_height as u16,
        file_name,
    })
}
