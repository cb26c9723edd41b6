use super::{
    Camera, Canvas, CanvasPoint, CAMERA_DISTANCE_BEHIND_CAR_M, CAMERA_HEIGHT_ABOVE_TRACK_M,
    FAR_PLANE_M,
};
use crate::simulation::{Orientation, Race, Sprite, SpriteImage};
use crate::track::{track_size, Track, Vec3, SEGMENT_SPACING_M};
use std::collections::HashMap;
use std::f32::consts::PI;

/// The fewest track segments drawn in a frame.
pub const TRACK_RENDER_MIN_DEPTH: usize = 60;

/// The backdrop strip is a 3200px panorama, padded so that a rolled canvas never shows
/// its edge.
pub const BACKDROP_PANORAMA_WIDTH: f32 = 3200.0;
pub const BACKDROP_HEIGHT: f32 = 360.0;
pub const BACKDROP_ROLL_FACTOR: f32 = 1.7;

/// Reports the pixel size of each image; zero width means the image has not loaded yet.
pub trait ImageSource {
    fn dimensions(&self, image: SpriteImage) -> (u32, u32);

    /// Images still loading, checked before a race may start.
    fn pending(&self) -> usize {
        0
    }
}

/// In-memory image table, for hosts that record sizes as their assets arrive.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalogue {
    sizes: HashMap<SpriteImage, (u32, u32)>,
    default: Option<(u32, u32)>,
}

impl ImageCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalogue that reports `size` for every image it has no entry for.
    pub fn with_default(size: (u32, u32)) -> Self {
        Self {
            sizes: HashMap::new(),
            default: Some(size),
        }
    }

    pub fn insert(&mut self, image: SpriteImage, size: (u32, u32)) {
        self.sizes.insert(image, size);
    }
}

impl ImageSource for ImageCatalogue {
    fn dimensions(&self, image: SpriteImage) -> (u32, u32) {
        self.sizes
            .get(&image)
            .copied()
            .or(self.default)
            .unwrap_or((0, 0))
    }

    fn pending(&self) -> usize {
        self.sizes.values().filter(|(width, _)| *width == 0).count()
    }
}

/// Frame-rate adaptive draw distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDepth {
    depth: usize,
    fast_frame_s: f32,
    slow_frame_s: f32,
}

impl RenderDepth {
    pub fn new(fast_frame_s: f32, slow_frame_s: f32) -> Self {
        Self {
            depth: TRACK_RENDER_MIN_DEPTH,
            fast_frame_s,
            slow_frame_s,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Draws one segment further when frames come in fast, one fewer when they lag.
    pub fn adjust(&mut self, average_interval: f32) {
        if average_interval < self.fast_frame_s {
            self.depth += 1;
        } else if average_interval > self.slow_frame_s {
            self.depth = self.depth.saturating_sub(1);
        }
    }

    /// Segments to draw on a track of `track_length` segments. Short tracks are drawn once
    /// round, never more.
    pub fn segments(&mut self, track_length: usize) -> usize {
        self.depth = self.depth.max(TRACK_RENDER_MIN_DEPTH).min(track_length.max(1));
        self.depth
    }
}

impl Default for RenderDepth {
    fn default() -> Self {
        Self::new(0.031, 0.035)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub centre: CanvasPoint,
    pub width: f32,
    pub height: f32,
    /// Radians, the camera roll.
    pub rotation: f32,
    pub image: SpriteImage,
    pub image_size: (u32, u32),
}

/// The part of the backdrop panorama to copy and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonDraw {
    pub source_centre: CanvasPoint,
    pub source_size: (f32, f32),
    pub centre: CanvasPoint,
    pub size: (f32, f32),
    pub rotation: f32,
}

/// Everything the host has to draw for one frame, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub background: Option<HorizonDraw>,
    pub sprites: Vec<SpriteDraw>,
    /// Sprites dropped because their image reported zero width.
    pub skipped_unloaded: usize,
}

/// Follows the human car and turns a race into a painter's-order draw list.
pub struct RaceRenderer {
    pub camera: Camera,
    pub canvas: Canvas,
    pub depth: RenderDepth,
    road: Vec<Sprite>,
}

impl RaceRenderer {
    pub fn new(track: &Track, canvas: Canvas, depth: RenderDepth) -> Self {
        let size = track_size();
        let road = track
            .segments()
            .iter()
            .map(|segment| Sprite {
                position: segment.position,
                size,
                orientation: Orientation::Fixed(segment.heading),
                image: SpriteImage::Surface(segment.surface),
            })
            .collect();

        Self {
            camera: Camera::new(),
            canvas,
            depth,
            road,
        }
    }

    /// Track position the camera sits at, a fixed distance behind the human car.
    pub fn camera_track_position(&self, race: &Race) -> f32 {
        let track_position = race.human().map_or(0.0, |car| race.track_position(car));
        track_position - CAMERA_DISTANCE_BEHIND_CAR_M / SEGMENT_SPACING_M
    }

    /// Places the camera behind and above the human car, facing along the track. `lead_s`
    /// moves it on by that many seconds of the car's forward speed.
    pub fn follow_car(&mut self, race: &Race, lead_s: f32) {
        let Some(car) = race.human() else { return };
        let track = race.track();
        let track_position = race.track_position(car);
        let index = track_position.floor() as i64;
        let (mut position, heading) = track.interpolate(track_position);

        self.camera.set_yaw(heading);

        // Tilt on hills and drop the camera so the road ahead stays in view
        let climb = track.segment(index + 1).position.y - track.segment(index).position.y;
        self.camera.set_pitch(climb * PI / 2.0);
        position.y -= climb * 5.0;

        let (sine, cosine) = self.camera.sin_cos_yaw();
        let lateral = car.position.x;
        let behind = CAMERA_DISTANCE_BEHIND_CAR_M + car.velocity.y * lead_s;
        position.x += cosine * lateral - sine * behind;
        position.y += CAMERA_HEIGHT_ABOVE_TRACK_M;
        position.z -= sine * lateral + cosine * behind;

        self.camera.position = position;
    }

    pub fn render<I: ImageSource>(&mut self, race: &Race, images: &I) -> DrawList {
        let mut list = DrawList {
            background: self.horizon(images),
            ..DrawList::default()
        };
        if list.background.is_none() {
            list.skipped_unloaded += 1;
        }

        let track = race.track();
        let depth = self.depth.segments(track.len());
        let first = self.camera_track_position(race).floor() as i64 - 1;

        for i in 0..depth {
            let index = track.wrap_index(first + (depth - i) as i64);
            if let Some(road) = self.road.get(index) {
                self.draw_sprite(&mut list, road, images);
            }
            for sprite in race.sprites_at(index) {
                self.draw_sprite(&mut list, sprite, images);
            }
        }

        list
    }

    fn draw_sprite<I: ImageSource>(&self, list: &mut DrawList, sprite: &Sprite, images: &I) {
        let Some(draw) = self.project_sprite(sprite) else { return };

        let image_size = images.dimensions(sprite.image);
        if image_size.0 == 0 {
            list.skipped_unloaded += 1;
            return;
        }

        list.sprites.push(SpriteDraw { image_size, ..draw });
    }

    /// Screen placement of one sprite, `None` when culled by depth.
    pub fn project_sprite(&self, sprite: &Sprite) -> Option<SpriteDraw> {
        let view = self.camera.world_to_view(&sprite.position);
        if !Canvas::is_drawable(&view) {
            return None;
        }

        let centre = self.canvas.view_to_canvas(&view);
        let apparent_width = match sprite.orientation {
            Orientation::Billboard => sprite.size.x,
            Orientation::Fixed(heading) => {
                let rotation = heading - self.camera.yaw();
                (sprite.size.x * rotation.cos()).abs() + (sprite.size.z * rotation.sin()).abs()
            }
        };

        let mut horizontal = view;
        horizontal.x -= apparent_width / 2.0;
        let mut vertical = view;
        vertical.y += sprite.size.y / 2.0;

        let width = (centre.x - self.canvas.view_to_canvas(&horizontal).x) * 2.0;
        let height = (centre.y - self.canvas.view_to_canvas(&vertical).y) * 2.0;

        Some(SpriteDraw {
            centre: self.canvas.roll_about_centre(&self.camera, centre),
            width,
            height,
            rotation: self.camera.roll(),
            image: sprite.image,
            image_size: (0, 0),
        })
    }

    /// Slice of the backdrop panorama for the current yaw, pinned to the projected horizon.
    pub fn horizon<I: ImageSource>(&self, images: &I) -> Option<HorizonDraw> {
        if images.dimensions(SpriteImage::Backdrop).0 == 0 {
            return None;
        }

        let camera = &self.camera;
        let (sine_pitch, cosine_pitch) = camera.sin_cos_pitch();
        let (sine_roll, _) = camera.sin_cos_roll();

        let hy = -(CAMERA_HEIGHT_ABOVE_TRACK_M + camera.position.y);
        let hz = FAR_PLANE_M;
        let horizon = Vec3::new(
            0.0,
            hy * cosine_pitch - hz * sine_pitch,
            hy * sine_pitch + hz * cosine_pitch,
        );
        let horizon_y = self.canvas.view_to_canvas(&horizon).y;

        let mut angle = camera.yaw() + PI / 4.0;
        if camera.yaw() - camera.roll().abs() < 0.0 {
            angle += 2.0 * PI;
        }

        let margin = sine_roll.abs() * BACKDROP_HEIGHT * 2.0;
        let source_size = (BACKDROP_PANORAMA_WIDTH / 4.0 + margin, BACKDROP_HEIGHT);
        let height = BACKDROP_HEIGHT * BACKDROP_ROLL_FACTOR;
        let centre = CanvasPoint::new(self.canvas.width / 2.0, horizon_y - height / 2.0);

        Some(HorizonDraw {
            source_centre: CanvasPoint::new(
                BACKDROP_PANORAMA_WIDTH * angle / (2.0 * PI),
                BACKDROP_HEIGHT / 2.0,
            ),
            source_size,
            centre: self.canvas.roll_about_centre(camera, centre),
            size: (source_size.0, height),
            rotation: camera.roll(),
        })
    }
}
