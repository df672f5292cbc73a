// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless sketch gallery.
//!
//! Drives each sketch with a synthetic fixed-rate frame source, renders it
//! through the software rasterizer into a window framebuffer, and captures the
//! sketch's region to a PNG when the run ends. Every frame is traced in three
//! phases (clock, draw, present). Trace events always reach the `log` facade
//! (set `RUST_LOG=sketchloop=debug` to see them), and optionally stderr and a
//! Chrome trace file.

mod sketches;

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::{Parser, ValueEnum};
use kurbo::Point;

use sketchloop_core::clock::TransitionSpec;
use sketchloop_core::runner::{
    AccumulatingSketchRunner, CachedSketchRunner, SketchRunner, StatelessSketchRunner,
};
use sketchloop_core::sketch::{Sketch, SketchParams};
use sketchloop_core::surface::{Color, DrawSurface, PixelBuffer, SurfaceSize};
use sketchloop_core::time::{Duration, HostTime};
use sketchloop_core::timing::{FixedRateSource, FrameSource, FrameTick};
use sketchloop_core::trace::{
    FrameSummary, FrameSummaryBuilder, FrameTickEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    TraceSink, Tracer,
};
use sketchloop_debug::Fanout;
use sketchloop_debug::chrome::ChromeTraceSink;
use sketchloop_debug::log_sink::LogSink;
use sketchloop_debug::pretty::PrettyPrintSink;
use sketchloop_raster::{FramebufferCapture, PixelCanvas, SoftwareRasterizer};

/// Window pixels around the sketch on every side.
const MARGIN: u32 = 24;
const WINDOW_BACKGROUND: Color = Color::rgb8(0xF4, 0xF1, 0xEA);

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(args.hz > 0, "--hz must be greater than zero");
    ensure!(
        args.width > 0 && args.height > 0,
        "sketch size must not be empty"
    );
    fs::create_dir_all(&args.out_directory)
        .with_context(|| format!("creating {}", args.out_directory.display()))?;

    let mut log_sink = LogSink;
    let mut chrome = ChromeTraceSink::new();
    let mut pretty = PrettyPrintSink::stderr();
    {
        let mut sinks: Vec<&mut dyn TraceSink> = vec![&mut log_sink];
        if args.trace.is_some() {
            sinks.push(&mut chrome);
        }
        if args.verbose {
            sinks.push(&mut pretty);
        }
        let mut fanout = Fanout::new(sinks);
        run_gallery(&args, &mut fanout)?;
    }

    if let Some(path) = &args.trace {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        chrome.write_to(&mut writer)?;
        writer.flush()?;
        println!("Wrote {} ({} events)", path.display(), chrome.len());
    }
    Ok(())
}

fn run_gallery(args: &Args, sink: &mut dyn TraceSink) -> Result<()> {
    let selected = |which: Which| args.sketch == which || args.sketch == Which::All;

    if selected(Which::Harmonic) {
        let runner = StatelessSketchRunner::new(sketches::harmonic).with_background(Color::WHITE);
        let params = SketchParams::default().with_speed(4.0).with_controls(true);
        run("harmonic", Sketch::new(params, runner)?, args, sink, |_, _| {})?;
    }

    if selected(Which::Parametric) {
        let runner = AccumulatingSketchRunner::new(
            SoftwareRasterizer::new(),
            sketches::parametric_harmonic,
        )
        .with_background(Color::WHITE);
        // A short linear transition keeps the orbit moving at a steady pace.
        let params = SketchParams::default()
            .with_transition(TransitionSpec::linear_millis(1000))
            .with_speed(0.1)
            .with_controls(true);
        run("parametric", Sketch::new(params, runner)?, args, sink, |_, _| {})?;
    }

    if selected(Which::Mesh) {
        let runner = CachedSketchRunner::new(SoftwareRasterizer::new(), sketches::dot_mesh);
        let reshuffle_at = args.frames / 2;
        run(
            "mesh",
            Sketch::new(SketchParams::default(), runner)?,
            args,
            sink,
            |frame, sketch| {
                if frame == reshuffle_at {
                    sketch.runner_mut().invalidate();
                }
            },
        )?;
    }
    Ok(())
}

/// Runs one sketch for `args.frames` frames, then captures and disposes it.
///
/// `after_frame` is called with each frame index once the frame is presented.
fn run<R: SketchRunner>(
    name: &str,
    mut sketch: Sketch<R>,
    args: &Args,
    sink: &mut dyn TraceSink,
    mut after_frame: impl FnMut(u64, &mut Sketch<R>),
) -> Result<()> {
    let size = SurfaceSize::new(args.width, args.height);
    let origin = Point::new(f64::from(MARGIN), f64::from(MARGIN));
    let bounds = size.to_rect().with_origin(origin);
    let mut window = PixelBuffer::filled(
        SurfaceSize::new(size.width + 2 * MARGIN, size.height + 2 * MARGIN),
        WINDOW_BACKGROUND,
    );
    let mut layer = PixelBuffer::new(size);
    sketch.on_layout(bounds);
    log::info!(
        "running {name} ({:?}) for {} frames at {} Hz",
        sketch.runner().kind(),
        args.frames,
        args.hz
    );

    let mut source = FixedRateSource::new(HostTime::ZERO, Duration::from_hz(args.hz));
    let mut tracer = Tracer::new(sink);
    for _ in 0..args.frames {
        let tick = source.next_tick();
        let mut timer = FrameTimer::new(&tick);

        timer.begin(PhaseKind::Clock, &mut tracer);
        let time = sketch.advance(&tick, &mut tracer);
        timer.end(PhaseKind::Clock, &mut tracer);

        timer.begin(PhaseKind::Draw, &mut tracer);
        layer.fill(Color::TRANSPARENT);
        let outcome = sketch.draw(&mut PixelCanvas::new(&mut layer), &mut tracer);
        timer.end(PhaseKind::Draw, &mut tracer);
        timer.summary.set_draw(time, outcome);

        timer.begin(PhaseKind::Present, &mut tracer);
        if outcome.presented() {
            let mut canvas = PixelCanvas::new(&mut window);
            canvas.fill_rect(bounds, WINDOW_BACKGROUND);
            canvas.draw_image(&layer, origin);
        }
        timer.end(PhaseKind::Present, &mut tracer);

        tracer.frame_summary(&timer.finish());
        after_frame(tick.frame_index, &mut sketch);
    }

    let mut bridge = FramebufferCapture::new(window);
    let slot = Rc::new(RefCell::new(None));
    let result = Rc::clone(&slot);
    sketch.capture_traced(
        &mut bridge,
        Box::new(move |captured| *result.borrow_mut() = Some(captured)),
        &mut tracer,
    );
    let image = slot
        .borrow_mut()
        .take()
        .context("capture callback was not invoked")??;
    let path = args.out_directory.join(name).with_extension("png");
    save_png(&image, &path)?;

    let fps = sketch
        .fps()
        .map_or_else(|| "-".to_owned(), |fps| fps.to_string());
    println!(
        "{name}: {} frames, time = {:.3}, fps = {fps}, wrote {} ({})",
        sketch.frames_rendered(),
        sketch.time(),
        path.display(),
        image.size(),
    );
    sketch.dispose();
    Ok(())
}

/// Timestamps the phases of one frame.
///
/// Frame ticks are synthetic, so phase timestamps are placed on the tick's
/// timeline: the tick time plus the wall-clock time spent in the frame so far.
struct FrameTimer {
    frame_index: u64,
    now: HostTime,
    started: Instant,
    summary: FrameSummaryBuilder,
}

impl FrameTimer {
    fn new(tick: &FrameTick) -> Self {
        Self {
            frame_index: tick.frame_index,
            now: tick.now,
            started: Instant::now(),
            summary: FrameSummaryBuilder::new(&FrameTickEvent::from(tick)),
        }
    }

    fn stamp(&self) -> HostTime {
        let elapsed = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        HostTime(self.now.nanos().saturating_add(elapsed))
    }

    fn begin(&mut self, phase: PhaseKind, tracer: &mut Tracer<'_>) {
        let timestamp = self.stamp();
        self.summary.phase_begin(phase, timestamp);
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn end(&mut self, phase: PhaseKind, tracer: &mut Tracer<'_>) {
        let timestamp = self.stamp();
        self.summary.phase_end(phase, timestamp);
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn finish(self) -> FrameSummary {
        self.summary.finish()
    }
}

fn save_png(image: &PixelBuffer, path: &Path) -> Result<()> {
    let size = image.size();
    let rgba = image::RgbaImage::from_raw(size.width, size.height, image.as_bytes().to_vec())
        .context("pixel buffer does not match its size")?;
    rgba.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Which {
    /// Stateless: a ring redrawn from scratch every frame
    Harmonic,
    /// Accumulating: a dot tracing an orbit that never fades
    Parametric,
    /// Cached: a dot mesh drawn once and reshuffled halfway through
    Mesh,
    /// Every sketch in turn
    All,
}

#[derive(Parser, Debug)]
#[command(about, long_about = None, bin_name = "cargo run -p gallery --")]
struct Args {
    /// Which sketch to run
    #[arg(long, short, value_enum, default_value_t = Which::All)]
    sketch: Which,
    /// Frames to render per sketch
    #[arg(long, short, default_value_t = 600)]
    frames: u64,
    /// Refresh rate of the synthetic frame source, in Hz
    #[arg(long, default_value_t = 60)]
    hz: u32,
    /// Sketch width in pixels
    #[arg(long, default_value_t = 600)]
    width: u32,
    /// Sketch height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Directory to store captures into
    #[arg(long, default_value_os_t = default_directory())]
    out_directory: PathBuf,
    /// Write a Chrome trace of the whole run to this file
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Print every trace event to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn default_directory() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("outputs")
}
