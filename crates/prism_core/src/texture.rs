//! Textures: pure functions from surface coordinates to color.
//!
//! Image pixels are decoded once into linear float RGB and shared through an
//! `Arc`, so cloning a texture (or the material holding it) is cheap and the
//! same pixels can be sampled from every render thread.

use std::path::Path;
use std::sync::Arc;

use prism_math::Vec3;
use thiserror::Error;

/// Linear RGB color.
pub type Color = Vec3;

/// Errors that can occur while loading or building textures.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("expected {expected} pixels for {width}x{height}, got {actual}")]
    PixelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded image in linear RGB, row-major with row 0 at the top.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageData {
    /// Decode an image file. 8-bit sRGB values are converted to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
        Self::from_pixels(width, height, pixels)
    }

    /// Wrap already-linear pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at integer coordinates; callers keep them in range.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// How a continuous texture position maps onto discrete pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// How pixel coordinates outside the image are brought back inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    Repeat,
    #[default]
    Clamp,
}

impl Wrap {
    fn apply(self, coord: i64, size: u32) -> u32 {
        let size = size as i64;
        let wrapped = match self {
            Wrap::Clamp => coord.clamp(0, size - 1),
            Wrap::Repeat => coord.rem_euclid(size),
        };
        wrapped as u32
    }
}

/// Samples an image at `(u, v)`, with `(0, 0)` the top-left pixel.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    image: Arc<ImageData>,
    interpolation: Interpolation,
    wrap_x: Wrap,
    wrap_y: Wrap,
}

impl ImageTexture {
    /// Bilinear, clamped on both axes.
    pub fn new(image: Arc<ImageData>) -> Self {
        Self {
            image,
            interpolation: Interpolation::default(),
            wrap_x: Wrap::default(),
            wrap_y: Wrap::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        Ok(Self::new(Arc::new(ImageData::load(path)?)))
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_wrap(mut self, wrap_x: Wrap, wrap_y: Wrap) -> Self {
        self.wrap_x = wrap_x;
        self.wrap_y = wrap_y;
        self
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn value(&self, u: f32, v: f32) -> Color {
        match self.interpolation {
            Interpolation::Nearest => self.nearest(u, v),
            Interpolation::Bilinear => self.bilinear(u, v),
        }
    }

    fn pixel(&self, x: i64, y: i64) -> Color {
        let x = self.wrap_x.apply(x, self.image.width);
        let y = self.wrap_y.apply(y, self.image.height);
        self.image.get(x, y)
    }

    fn nearest(&self, u: f32, v: f32) -> Color {
        let x = (u * (self.image.width - 1) as f32) as i64;
        let y = (v * (self.image.height - 1) as f32) as i64;
        self.pixel(x, y)
    }

    fn bilinear(&self, u: f32, v: f32) -> Color {
        let fx = u * (self.image.width - 1) as f32;
        let fy = v * (self.image.height - 1) as f32;

        let rx = fx - fx.floor();
        let ry = fy - fy.floor();

        let (x0, x1) = (fx.floor() as i64, fx.ceil() as i64);
        let (y0, y1) = (fy.floor() as i64, fy.ceil() as i64);

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), rx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), rx);
        top.lerp(bottom, ry)
    }
}

/// Face order of a [`CubeMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    Right = 0,
    Left = 1,
    Top = 2,
    Bottom = 3,
    Back = 4,
    Front = 5,
}

impl CubeFace {
    /// Face hit by a direction from the cube center: the dominant axis picks
    /// the face pair, its sign picks the face.
    pub fn from_direction(p: Vec3) -> Self {
        let dir = p.normalize_or_zero();
        let a = dir.abs();

        if a.x >= a.y && a.x >= a.z {
            if dir.x < 0.0 {
                CubeFace::Left
            } else {
                CubeFace::Right
            }
        } else if a.y >= a.x && a.y >= a.z {
            if dir.y < 0.0 {
                CubeFace::Bottom
            } else {
                CubeFace::Top
            }
        } else if dir.z < 0.0 {
            CubeFace::Back
        } else {
            CubeFace::Front
        }
    }
}

/// Six image textures selected by the object-local hit direction.
#[derive(Clone, Debug)]
pub struct CubeMap {
    faces: [ImageTexture; 6],
}

impl CubeMap {
    /// Faces in order right, left, top, bottom, back, front.
    pub fn new(faces: [ImageTexture; 6]) -> Self {
        Self { faces }
    }

    pub fn load<P: AsRef<Path>>(paths: [P; 6]) -> TextureResult<Self> {
        let [right, left, top, bottom, back, front] = paths;
        Ok(Self::new([
            ImageTexture::load(right)?,
            ImageTexture::load(left)?,
            ImageTexture::load(top)?,
            ImageTexture::load(bottom)?,
            ImageTexture::load(back)?,
            ImageTexture::load(front)?,
        ]))
    }

    /// Sets the interpolation of all six faces.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        for face in &mut self.faces {
            face.set_interpolation(interpolation);
        }
        self
    }

    pub fn face(&self, face: CubeFace) -> &ImageTexture {
        &self.faces[face as usize]
    }

    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.face(CubeFace::from_direction(p)).value(u, v)
    }
}

/// Color source for materials.
#[derive(Clone, Debug)]
pub enum Texture {
    Constant(Color),
    Image(ImageTexture),
    CubeMap(CubeMap),
}

impl Texture {
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        Texture::Constant(Color::new(r, g, b))
    }

    /// Color at surface coordinates `(u, v)` and object-local point `p`.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Texture::Constant(color) => *color,
            Texture::Image(image) => image.value(u, v),
            Texture::CubeMap(cube) => cube.value(u, v, p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Constant(color)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(image)
    }
}

impl From<CubeMap> for Texture {
    fn from(cube: CubeMap) -> Self {
        Texture::CubeMap(cube)
    }
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
