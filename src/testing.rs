//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::app::notify::{Notice, Notifier};
use crate::data::google::{
    GeocodeResponse, GeocodeResult, Geometry, ImageRequest, LatLng, MapsApi, MetadataResponse,
    ProviderError,
};
use crate::domain::Coordinate;

type ImageHandler = Box<dyn Fn(&ImageRequest) -> Result<Vec<u8>, ProviderError>>;

/// In-memory `MapsApi` that records every call.
pub struct FakeMaps {
    geocode: Result<GeocodeResponse, ProviderError>,
    metadata: Result<MetadataResponse, ProviderError>,
    images: ImageHandler,
    geocode_calls: RefCell<Vec<String>>,
    image_calls: RefCell<Vec<ImageRequest>>,
    metadata_calls: RefCell<Vec<Coordinate>>,
}

impl FakeMaps {
    pub fn new() -> Self {
        Self {
            geocode: Ok(GeocodeResponse {
                status: "ZERO_RESULTS".into(),
                results: Vec::new(),
                error_message: None,
            }),
            metadata: Ok(MetadataResponse {
                status: "ZERO_RESULTS".into(),
                date: None,
                pano_id: None,
            }),
            images: Box::new(|_| Err(ProviderError::Status(404))),
            geocode_calls: RefCell::new(Vec::new()),
            image_calls: RefCell::new(Vec::new()),
            metadata_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_geocode_ok(mut self, lat: f64, lng: f64) -> Self {
        self.geocode = Ok(GeocodeResponse {
            status: "OK".into(),
            results: vec![GeocodeResult {
                geometry: Geometry {
                    location: LatLng { lat, lng },
                },
                formatted_address: None,
            }],
            error_message: None,
        });
        self
    }

    pub fn with_geocode_status(mut self, status: &str) -> Self {
        self.geocode = Ok(GeocodeResponse {
            status: status.into(),
            results: Vec::new(),
            error_message: None,
        });
        self
    }

    pub fn with_geocode_error(mut self, err: ProviderError) -> Self {
        self.geocode = Err(err);
        self
    }

    pub fn with_metadata_date(mut self, date: &str) -> Self {
        self.metadata = Ok(MetadataResponse {
            status: "OK".into(),
            date: Some(date.into()),
            pano_id: Some("pano".into()),
        });
        self
    }

    pub fn with_metadata_error(mut self, err: ProviderError) -> Self {
        self.metadata = Err(err);
        self
    }

    pub fn with_images(
        mut self,
        handler: impl Fn(&ImageRequest) -> Result<Vec<u8>, ProviderError> + 'static,
    ) -> Self {
        self.images = Box::new(handler);
        self
    }

    pub fn geocode_calls(&self) -> Vec<String> {
        self.geocode_calls.borrow().clone()
    }

    pub fn image_calls(&self) -> Vec<ImageRequest> {
        self.image_calls.borrow().clone()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.borrow().len()
    }
}

impl MapsApi for FakeMaps {
    fn geocode(&self, address: &str) -> Result<GeocodeResponse, ProviderError> {
        self.geocode_calls.borrow_mut().push(address.to_string());
        self.geocode.clone()
    }

    fn street_view_image(&self, request: &ImageRequest) -> Result<Vec<u8>, ProviderError> {
        self.image_calls.borrow_mut().push(*request);
        (self.images)(request)
    }

    fn street_view_metadata(&self, location: Coordinate) -> Result<MetadataResponse, ProviderError> {
        self.metadata_calls.borrow_mut().push(location);
        self.metadata.clone()
    }
}

/// Notifier that keeps everything it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: RefCell<Vec<Notice>>,
    pub shown: RefCell<Vec<PathBuf>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> usize {
        self.count(|n| matches!(n, Notice::Error(_)))
    }

    pub fn warnings(&self) -> usize {
        self.count(|n| matches!(n, Notice::Warning(_)))
    }

    fn count(&self, pred: impl Fn(&Notice) -> bool) -> usize {
        self.notices.borrow().iter().filter(|n| pred(n)).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    fn show_animation(&self, path: &std::path::Path) {
        self.shown.borrow_mut().push(path.to_path_buf());
    }
}

/// A PNG of pseudo-random pixels. Noise does not compress, so this is comfortably above the
/// default probe threshold.
pub fn noisy_png(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let img = RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let [r, g, b, _] = state.to_le_bytes();
        Rgba([r, g, b, 255])
    });
    encode_png(&img)
}

/// A tiny single-colour PNG, like a provider "no imagery" placeholder.
pub fn flat_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    encode_png(&img)
}

fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}
